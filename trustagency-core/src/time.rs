//! Timestamp decoding for backend payloads.
//!
//! The backend emits a mix of RFC 3339 strings and naive ISO-8601 values
//! (no offset). Naive values are interpreted as UTC.

use crate::Timestamp;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serializer};

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse a backend timestamp, accepting RFC 3339 or naive ISO-8601.
pub fn parse_timestamp(value: &str) -> Option<Timestamp> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|naive| naive.and_utc())
}

/// `#[serde(with = "flexible")]` for required timestamps.
pub mod flexible {
    use super::*;

    pub fn serialize<S: Serializer>(value: &Timestamp, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Timestamp, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_timestamp(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {}", raw)))
    }
}

/// `#[serde(with = "flexible_option")]` for optional timestamps.
pub mod flexible_option {
    use super::*;

    pub fn serialize<S: Serializer>(
        value: &Option<Timestamp>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(ts) => serializer.serialize_some(&ts.to_rfc3339()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Timestamp>, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        match raw {
            None => Ok(None),
            Some(s) if s.is_empty() => Ok(None),
            Some(s) => parse_timestamp(&s)
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {}", s))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn parses_rfc3339_with_offset() {
        let ts = parse_timestamp("2024-03-01T10:00:00+08:00").unwrap();
        assert_eq!(ts.hour(), 2);
    }

    #[test]
    fn parses_naive_iso_as_utc() {
        let ts = parse_timestamp("2024-03-01T10:00:00.123456").unwrap();
        assert_eq!(ts.day(), 1);
        assert_eq!(ts.hour(), 10);

        let spaced = parse_timestamp("2024-03-01 10:00:00").unwrap();
        assert_eq!(spaced, parse_timestamp("2024-03-01T10:00:00").unwrap());
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_timestamp("yesterday").is_none());
    }
}

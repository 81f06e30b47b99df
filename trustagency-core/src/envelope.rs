//! Tagged response envelopes.
//!
//! Each endpoint declares how its list payload is laid out on the wire;
//! decoding follows that declaration instead of probing for `data`,
//! `items` or a bare array at the call site.

use crate::error::{kind_of, EnvelopeError};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Wire layout of a list response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ListShape {
    /// `{"data": [...], "total": n, ...}`
    DataTotal,
    /// `{"items": [...], "total": n, ...}`
    ItemsTotal,
    /// `[...]`, total is the array length.
    Bare,
}

/// What an endpoint returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointContract {
    List(ListShape),
    Single,
}

/// One page of a list response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
}

impl<T> Page<T> {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether more items exist on the server beyond `offset + len`.
    pub fn has_more(&self, offset: u64) -> bool {
        offset.saturating_add(self.items.len() as u64) < self.total
    }
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            total: 0,
        }
    }
}

impl<T: DeserializeOwned> Page<T> {
    /// Decode a list payload laid out as `shape`.
    pub fn decode(value: Value, shape: ListShape) -> Result<Self, EnvelopeError> {
        match shape {
            ListShape::Bare => {
                let items = decode_items(value, shape)?;
                let total = items.len() as u64;
                Ok(Page { items, total })
            }
            ListShape::DataTotal => decode_keyed(value, shape, "data"),
            ListShape::ItemsTotal => decode_keyed(value, shape, "items"),
        }
    }
}

/// A decoded response body.
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope<T> {
    List(Page<T>),
    Single(T),
}

impl<T: DeserializeOwned> Envelope<T> {
    /// Decode according to the endpoint's declared contract.
    pub fn decode(value: Value, contract: EndpointContract) -> Result<Self, EnvelopeError> {
        match contract {
            EndpointContract::List(shape) => Page::decode(value, shape).map(Envelope::List),
            EndpointContract::Single => serde_json::from_value(value)
                .map(Envelope::Single)
                .map_err(EnvelopeError::invalid),
        }
    }
}

impl<T> Envelope<T> {
    /// All records carried by the envelope.
    pub fn into_items(self) -> Vec<T> {
        match self {
            Envelope::List(page) => page.items,
            Envelope::Single(value) => vec![value],
        }
    }

    pub fn total(&self) -> u64 {
        match self {
            Envelope::List(page) => page.total,
            Envelope::Single(_) => 1,
        }
    }

    pub fn into_single(self) -> Option<T> {
        match self {
            Envelope::Single(value) => Some(value),
            Envelope::List(_) => None,
        }
    }
}

fn decode_keyed<T: DeserializeOwned>(
    value: Value,
    shape: ListShape,
    items_key: &'static str,
) -> Result<Page<T>, EnvelopeError> {
    let mut object = match value {
        Value::Object(map) => map,
        other => {
            return Err(EnvelopeError::UnexpectedShape {
                shape,
                expected: "object",
                found: kind_of(&other),
            })
        }
    };
    let raw_items = object
        .remove(items_key)
        .ok_or(EnvelopeError::MissingField { field: items_key })?;
    let items = decode_items(raw_items, shape)?;
    let total = match object.get("total").and_then(Value::as_u64) {
        Some(total) => total,
        None => items.len() as u64,
    };
    Ok(Page { items, total })
}

fn decode_items<T: DeserializeOwned>(value: Value, shape: ListShape) -> Result<Vec<T>, EnvelopeError> {
    match value {
        Value::Array(raw) => raw
            .into_iter()
            .map(|item| serde_json::from_value(item).map_err(EnvelopeError::invalid))
            .collect(),
        other => Err(EnvelopeError::UnexpectedShape {
            shape,
            expected: "array",
            found: kind_of(&other),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, PartialEq, Deserialize)]
    struct Row {
        id: i64,
    }

    #[test]
    fn data_total_shape() {
        let page: Page<Row> = Page::decode(
            json!({"data": [{"id": 1}, {"id": 2}], "total": 40, "skip": 0, "limit": 2}),
            ListShape::DataTotal,
        )
        .unwrap();
        assert_eq!(page.items, vec![Row { id: 1 }, Row { id: 2 }]);
        assert_eq!(page.total, 40);
        assert!(page.has_more(0));
        assert!(!page.has_more(38));
        assert!(!page.has_more(u64::MAX));
    }

    #[test]
    fn items_total_shape_defaults_total_to_len() {
        let page: Page<Row> =
            Page::decode(json!({"items": [{"id": 7}]}), ListShape::ItemsTotal).unwrap();
        assert_eq!(page.total, 1);
    }

    #[test]
    fn bare_shape() {
        let page: Page<Row> = Page::decode(json!([{"id": 3}]), ListShape::Bare).unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page.total, 1);
    }

    #[test]
    fn shape_mismatch_is_reported() {
        let err = Page::<Row>::decode(json!([{"id": 3}]), ListShape::DataTotal).unwrap_err();
        assert!(matches!(
            err,
            EnvelopeError::UnexpectedShape { expected: "object", found: "array", .. }
        ));

        let err = Page::<Row>::decode(json!({"items": []}), ListShape::DataTotal).unwrap_err();
        assert_eq!(err, EnvelopeError::MissingField { field: "data" });
    }

    #[test]
    fn envelope_follows_contract() {
        let single: Envelope<Row> =
            Envelope::decode(json!({"id": 9}), EndpointContract::Single).unwrap();
        assert_eq!(single.total(), 1);
        assert_eq!(single.into_single(), Some(Row { id: 9 }));

        let list: Envelope<Row> = Envelope::decode(
            json!({"data": [{"id": 1}], "total": 1}),
            EndpointContract::List(ListShape::DataTotal),
        )
        .unwrap();
        assert_eq!(list.into_items(), vec![Row { id: 1 }]);
    }
}

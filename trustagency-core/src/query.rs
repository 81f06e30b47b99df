//! Query-string building.
//!
//! Keys whose value is null or an empty string are dropped entirely; the
//! builder never emits `key=`. Zero and `false` are real values and are
//! kept.

use std::fmt;

/// A single query parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl QueryValue {
    /// Whether this value is omitted from the query string.
    pub fn is_omitted(&self) -> bool {
        match self {
            QueryValue::Null => true,
            QueryValue::Str(s) => s.is_empty(),
            _ => false,
        }
    }
}

impl fmt::Display for QueryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryValue::Null => Ok(()),
            QueryValue::Bool(b) => write!(f, "{}", b),
            QueryValue::Int(i) => write!(f, "{}", i),
            QueryValue::Float(x) => write!(f, "{}", x),
            QueryValue::Str(s) => f.write_str(s),
        }
    }
}

impl From<bool> for QueryValue {
    fn from(value: bool) -> Self {
        QueryValue::Bool(value)
    }
}

impl From<i32> for QueryValue {
    fn from(value: i32) -> Self {
        QueryValue::Int(i64::from(value))
    }
}

impl From<i64> for QueryValue {
    fn from(value: i64) -> Self {
        QueryValue::Int(value)
    }
}

impl From<u32> for QueryValue {
    fn from(value: u32) -> Self {
        QueryValue::Int(i64::from(value))
    }
}

impl From<f64> for QueryValue {
    fn from(value: f64) -> Self {
        QueryValue::Float(value)
    }
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        QueryValue::Str(value.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(value: String) -> Self {
        QueryValue::Str(value)
    }
}

impl<T: Into<QueryValue>> From<Option<T>> for QueryValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(QueryValue::Null)
    }
}

/// Ordered query parameters. Insertion order is preserved in the output.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryParams {
    pairs: Vec<(String, QueryValue)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parameter, consuming and returning the builder.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Add or replace a parameter. A replaced key keeps its original position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<QueryValue>) {
        let key = key.into();
        let value = value.into();
        match self.pairs.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.pairs.push((key, value)),
        }
    }

    /// Merge another set of parameters over this one.
    pub fn extend(&mut self, other: QueryParams) {
        for (key, value) in other.pairs {
            self.insert(key, value);
        }
    }

    pub fn get(&self, key: &str) -> Option<&QueryValue> {
        self.pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &QueryValue)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Encoded `key=value` pairs joined by `&`, without the leading `?`.
    pub fn encode(&self) -> String {
        self.pairs
            .iter()
            .filter(|(_, value)| !value.is_omitted())
            .map(|(key, value)| {
                format!(
                    "{}={}",
                    urlencoding::encode(key),
                    urlencoding::encode(&value.to_string())
                )
            })
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Append the encoded parameters to `endpoint`, using `&` when it
    /// already carries a query.
    pub fn append_to(&self, endpoint: &str) -> String {
        let query = self.encode();
        if query.is_empty() {
            return endpoint.to_string();
        }
        let separator = if endpoint.contains('?') { '&' } else { '?' };
        format!("{}{}{}", endpoint, separator, query)
    }
}

impl<K, V> FromIterator<(K, V)> for QueryParams
where
    K: Into<String>,
    V: Into<QueryValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = QueryParams::new();
        for (key, value) in iter {
            params.insert(key, value);
        }
        params
    }
}

/// Build `?k=v&...` from parameters, or an empty string when nothing survives.
pub fn build_query_string(params: &QueryParams) -> String {
    let query = params.encode();
    if query.is_empty() {
        String::new()
    } else {
        format!("?{}", query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn zero_is_kept_and_empty_string_dropped() {
        let params = QueryParams::new()
            .with("skip", 0)
            .with("limit", 20)
            .with("search", "");
        assert_eq!(build_query_string(&params), "?skip=0&limit=20");
    }

    #[test]
    fn null_values_are_dropped() {
        let params = QueryParams::new()
            .with("a", 1)
            .with("b", QueryValue::Null)
            .with("c", "");
        assert_eq!(build_query_string(&params), "?a=1");
    }

    #[test]
    fn empty_params_build_nothing() {
        assert_eq!(build_query_string(&QueryParams::new()), "");
        let only_empty = QueryParams::new().with("q", Option::<String>::None);
        assert_eq!(build_query_string(&only_empty), "");
    }

    #[test]
    fn values_are_percent_encoded() {
        let params = QueryParams::new().with("search", "外汇 平台&x");
        let query = build_query_string(&params);
        assert!(query.starts_with("?search="));
        assert!(!query.contains(' '));
        assert!(!query[1..].contains("&x"));
    }

    #[test]
    fn insert_replaces_in_place() {
        let mut params = QueryParams::new().with("page", 1).with("size", 20);
        params.insert("page", 2);
        assert_eq!(params.encode(), "page=2&size=20");
    }

    #[test]
    fn append_to_respects_existing_query() {
        let params = QueryParams::new().with("limit", 5);
        assert_eq!(params.append_to("/api/articles"), "/api/articles?limit=5");
        assert_eq!(
            params.append_to("/api/articles?skip=10"),
            "/api/articles?skip=10&limit=5"
        );
        assert_eq!(QueryParams::new().append_to("/x"), "/x");
    }

    proptest! {
        #[test]
        fn omitted_keys_never_appear(
            keep in "[a-z]{1,8}",
            value in 0i64..10_000,
        ) {
            let params = QueryParams::new()
                .with(keep.clone(), value)
                .with("zz_null", QueryValue::Null)
                .with("zz_empty", "");
            let query = build_query_string(&params);
            prop_assert_eq!(query, format!("?{}={}", keep, value));
        }

        #[test]
        fn never_emits_dangling_equals(values in proptest::collection::vec(proptest::option::of("[a-z0-9]{0,4}"), 0..8)) {
            let params: QueryParams = values
                .iter()
                .enumerate()
                .map(|(i, v)| (format!("k{}", i), QueryValue::from(v.clone())))
                .collect();
            let query = build_query_string(&params);
            prop_assert!(!query.contains("=&"));
            prop_assert!(!query.ends_with('='));
        }
    }
}

//! Request parameters handed to hooks and handlers.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::resource::error::HandlerError;

/// Merged query-string and body parameters.
///
/// Later inserts win, so the HTTP layer inserts query pairs first and body
/// fields second.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params {
    inner: Map<String, Value>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.inner.insert(key.into(), value.into());
    }

    /// Insert every `(key, value)` pair of `other`, replacing existing keys.
    pub fn merge(&mut self, other: Map<String, Value>) {
        for (key, value) in other {
            self.inner.insert(key, value);
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.inner.get(key)
    }

    /// String value for `key`; non-string JSON values are not coerced.
    pub fn str(&self, key: &str) -> Option<&str> {
        self.inner.get(key).and_then(Value::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.inner.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.inner.iter()
    }

    /// Deserialize the params into a handler's form type. A mismatch is
    /// reported as a rejection.
    pub fn parse<T: DeserializeOwned>(&self) -> Result<T, HandlerError> {
        serde_json::from_value(Value::Object(self.inner.clone()))
            .map_err(|e| HandlerError::rejected(e.to_string()))
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Params::new();
        for (key, value) in iter {
            params.insert(key, value);
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Form {
        title: String,
        #[serde(default)]
        body: Option<String>,
    }

    #[test]
    fn test_merge_replaces_keys() {
        let mut params: Params = [("title", "from query"), ("page", "2")].into_iter().collect();
        let body = json!({"title": "from body"});
        if let Value::Object(map) = body {
            params.merge(map);
        }
        assert_eq!(params.str("title"), Some("from body"));
        assert_eq!(params.str("page"), Some("2"));
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_parse_form() {
        let params: Params = [("title", "hello")].into_iter().collect();
        let form: Form = params.parse().unwrap();
        assert_eq!(form.title, "hello");
        assert!(form.body.is_none());
    }

    #[test]
    fn test_parse_rejects_missing_field() {
        let params = Params::new();
        let err = params.parse::<Form>().unwrap_err();
        assert!(matches!(err, HandlerError::Rejected(_)));
    }
}

//! Request handling and transformation.
//!
//! # Responsibilities
//! - Generate unique request ID (UUID v4)
//! - Extract dispatch parameters from the query string and body
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - Repeated keys: last one wins; body fields override query pairs
//! - Only JSON objects and urlencoded forms contribute body parameters

use axum::http::{header, HeaderMap, HeaderValue, Request};
use serde_json::{Map, Value};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

use crate::resource::Params;

pub const X_REQUEST_ID: &str = "x-request-id";

/// Issues a fresh UUID v4 for every request lacking an `x-request-id`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// Request ID carried by `headers`, or `"unknown"`.
pub fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

/// Body that could not be turned into parameters.
#[derive(Debug, thiserror::Error)]
pub enum BodyError {
    #[error("invalid JSON body: {0}")]
    Json(#[from] serde_json::Error),

    #[error("JSON body must be an object")]
    NotAnObject,
}

/// Merge query pairs and body fields into dispatch parameters.
pub fn extract_params(query: Option<&str>, headers: &HeaderMap, body: &[u8]) -> Result<Params, BodyError> {
    let mut params = Params::new();

    if let Some(query) = query {
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            params.insert(key.into_owned(), value.into_owned());
        }
    }

    if body.is_empty() {
        return Ok(params);
    }

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    if content_type.starts_with("application/json") {
        match serde_json::from_slice::<Value>(body)? {
            Value::Object(fields) => params.merge(fields),
            _ => return Err(BodyError::NotAnObject),
        }
    } else if content_type.starts_with("application/x-www-form-urlencoded") {
        let fields: Map<String, Value> = url::form_urlencoded::parse(body)
            .map(|(k, v)| (k.into_owned(), Value::String(v.into_owned())))
            .collect();
        params.merge(fields);
    }

    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(content_type: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_str(content_type).unwrap());
        headers
    }

    #[test]
    fn test_query_only() {
        let params = extract_params(Some("a=1&b=two%20words&a=3"), &HeaderMap::new(), b"").unwrap();
        assert_eq!(params.str("a"), Some("3"));
        assert_eq!(params.str("b"), Some("two words"));
    }

    #[test]
    fn test_json_body_overrides_query() {
        let params = extract_params(
            Some("title=old&page=2"),
            &headers("application/json"),
            br#"{"title":"new","draft":true}"#,
        )
        .unwrap();
        assert_eq!(params.str("title"), Some("new"));
        assert_eq!(params.str("page"), Some("2"));
        assert_eq!(params.get("draft"), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_form_body() {
        let params = extract_params(
            None,
            &headers("application/x-www-form-urlencoded"),
            b"fullname=Bob+Smith&email=bob%40example.com",
        )
        .unwrap();
        assert_eq!(params.str("fullname"), Some("Bob Smith"));
        assert_eq!(params.str("email"), Some("bob@example.com"));
    }

    #[test]
    fn test_json_array_rejected() {
        let err = extract_params(None, &headers("application/json"), b"[1,2]").unwrap_err();
        assert!(matches!(err, BodyError::NotAnObject));

        let err = extract_params(None, &headers("application/json"), b"{oops").unwrap_err();
        assert!(matches!(err, BodyError::Json(_)));
    }

    #[test]
    fn test_unknown_content_type_ignored() {
        let params = extract_params(None, &headers("text/plain"), b"hello").unwrap();
        assert!(params.is_empty());
    }

    #[test]
    fn test_request_id_fallback() {
        assert_eq!(request_id(&HeaderMap::new()), "unknown");
    }
}

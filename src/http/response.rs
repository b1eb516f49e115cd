//! Response rendering.
//!
//! # Responsibilities
//! - Render handler replies (JSON, text, empty)
//! - Map dispatch errors to HTTP status codes with a JSON error body
//!
//! # Design Decisions
//! - Error bodies have a stable shape: `{"error": code, "message": text}`
//! - Handler failures never leak their source error to the client

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::resource::{DispatchError, Reply, ReplyBody};

pub fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    (
        status,
        Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        match self.body {
            ReplyBody::Json(value) => (self.status, Json(value)).into_response(),
            ReplyBody::Text(text) => (self.status, text).into_response(),
            ReplyBody::Empty => self.status.into_response(),
        }
    }
}

impl IntoResponse for DispatchError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            DispatchError::Handler { .. } => "internal error".to_string(),
            other => other.to_string(),
        };
        json_error(status, self.code(), message)
    }
}

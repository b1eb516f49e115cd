//! Handler replies.

use axum::http::StatusCode;
use serde::Serialize;
use serde_json::Value;

use crate::resource::error::HandlerError;

#[derive(Debug, Clone, PartialEq)]
pub enum ReplyBody {
    Json(Value),
    Text(String),
    Empty,
}

/// What a handler produced. The HTTP layer renders it.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub status: StatusCode,
    pub body: ReplyBody,
}

impl Reply {
    pub fn json(value: impl Serialize) -> Result<Self, HandlerError> {
        let value = serde_json::to_value(value).map_err(HandlerError::failed)?;
        Ok(Self {
            status: StatusCode::OK,
            body: ReplyBody::Json(value),
        })
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self {
            status: StatusCode::OK,
            body: ReplyBody::Text(text.into()),
        }
    }

    pub fn no_content() -> Self {
        Self {
            status: StatusCode::NO_CONTENT,
            body: ReplyBody::Empty,
        }
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    pub fn as_json(&self) -> Option<&Value> {
        match &self.body {
            ReplyBody::Json(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match &self.body {
            ReplyBody::Text(s) => Some(s),
            _ => None,
        }
    }
}

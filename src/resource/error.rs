//! Dispatch error types.
//!
//! # Error Taxonomy
//! - `NotFound` (404): unknown id, unmapped segment, unsupported method,
//!   hidden or declining handler
//! - `BadRequest` (400): a verb maps to a handler the type does not register
//! - `Rejected` (400): a handler refused its input
//! - `Handler` (500): a handler failed

use axum::http::StatusCode;
use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Outcome of a failed hook or handler.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// The handler legitimately has nothing to serve.
    #[error("declined")]
    Declined,

    /// The request input was unacceptable.
    #[error("rejected: {0}")]
    Rejected(String),

    /// The handler crashed.
    #[error(transparent)]
    Failed(BoxError),
}

impl HandlerError {
    pub fn failed(err: impl Into<BoxError>) -> Self {
        HandlerError::Failed(err.into())
    }

    pub fn rejected(reason: impl Into<String>) -> Self {
        HandlerError::Rejected(reason.into())
    }
}

/// Why a request did not resolve.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotFound {
    #[error("no collection mounted at `{0}`")]
    UnknownMount(String),

    #[error("{collection} `{id}` does not exist")]
    UnknownResource { collection: String, id: String },

    #[error("{collection} has nothing at `{segment}`")]
    UnmappedSegment { collection: String, segment: String },

    #[error("{collection} does not support {method}")]
    UnsupportedMethod { collection: String, method: String },

    #[error("{collection} handler `{handler}` is not exposed")]
    NotExposed { collection: String, handler: String },

    #[error("{collection} handler `{handler}` declined the request")]
    Declined { collection: String, handler: String },
}

/// Error surfaced to the HTTP boundary.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("not found: {0}")]
    NotFound(#[from] NotFound),

    #[error("{collection}: {verb} maps to `{handler}` which is not registered")]
    BadRequest {
        collection: String,
        verb: String,
        handler: String,
    },

    #[error("{collection} `{handler}` rejected the request: {reason}")]
    Rejected {
        collection: String,
        handler: String,
        reason: String,
    },

    #[error("{collection} handler `{handler}` failed: {source}")]
    Handler {
        collection: String,
        handler: String,
        #[source]
        source: BoxError,
    },
}

impl DispatchError {
    pub fn status(&self) -> StatusCode {
        match self {
            DispatchError::NotFound(_) => StatusCode::NOT_FOUND,
            DispatchError::BadRequest { .. } | DispatchError::Rejected { .. } => {
                StatusCode::BAD_REQUEST
            }
            DispatchError::Handler { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable code for response bodies.
    pub fn code(&self) -> &'static str {
        match self {
            DispatchError::NotFound(_) => "not_found",
            DispatchError::BadRequest { .. } => "unsupported_method",
            DispatchError::Rejected { .. } => "rejected",
            DispatchError::Handler { .. } => "handler_failed",
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, DispatchError::NotFound(_))
    }
}

/// Registry inconsistency detected while building a dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("{collection}: handler `{handler}` registered twice")]
    DuplicateHandler { collection: String, handler: String },

    #[error("{collection}: child `{child}` registered twice")]
    DuplicateChild { collection: String, child: String },

    #[error("{collection}: invalid segment name `{name}`")]
    InvalidName { collection: String, name: String },
}

//! HTTP front end.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, blocking dispatch)
//!     → request.rs (request ID, query + body → Params)
//!     → Root::dispatch_segments
//!     → response.rs (Reply / DispatchError → HTTP response)
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{extract_params, MakeRequestUuid, X_REQUEST_ID};
pub use response::json_error;
pub use server::HttpServer;

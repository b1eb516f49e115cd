//! Hierarchical REST dispatch.
//!
//! A request path such as `/users/bob/posts/my-first-post` is walked one
//! segment at a time through a tree of [`Dispatcher`]s. Each level turns a
//! segment into a resource, then either descends into a child collection,
//! runs a named action, or maps the HTTP method to a handler.

pub mod blog;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resource;

pub use config::ServiceConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use resource::{Collection, Dispatch, DispatchOptions, Dispatcher, Root};

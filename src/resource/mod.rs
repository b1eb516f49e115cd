//! Resource dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! Root::dispatch(method, "/users/bob/posts/my-first-post", params)
//!     → root.rs (split path, pick mount "users")
//!     → dispatcher.rs (users: instantiate "bob")
//!     → dispatcher.rs (posts, parent = bob: instantiate "my-first-post")
//!     → verb.rs (GET → "index")
//!     → handler.rs (exposed handler runs) → Reply
//! ```
//!
//! # Design Decisions
//! - Per-type configuration (verb map, handlers, children) is frozen at build
//! - Parent context is an argument, never dispatcher state
//! - Handler failures are distinct from declines; fail-soft is opt-in

pub mod ancestry;
pub mod collection;
pub mod dispatcher;
pub mod error;
pub mod handler;
pub mod params;
pub mod reply;
pub mod root;
pub mod verb;

pub use ancestry::Ancestry;
pub use collection::Collection;
pub use dispatcher::{Dispatch, DispatchOptions, DispatchRequest, Dispatcher, DispatcherBuilder};
pub use error::{BoxError, BuildError, DispatchError, HandlerError, NotFound};
pub use handler::{Call, Exposure, Handlers};
pub use params::Params;
pub use reply::{Reply, ReplyBody};
pub use root::{split_path, Root};
pub use verb::{MethodMap, Verb};

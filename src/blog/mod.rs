//! Demo application: users with nested posts.
//!
//! # Data Flow
//! ```text
//! GET    /users                         → list users (?prefix=)
//! GET    /users/bob                     → users.index(bob)
//! PUT    /users/joe                     → create joe → users.update
//! GET    /users/bob/summary             → users.summary(bob)
//! GET    /users/bob/posts               → list bob's posts
//! POST   /users/bob/posts/my-first-post → posts.add(post, parent = bob)
//! ```

pub mod posts;
pub mod store;
pub mod users;

use std::sync::Arc;

use crate::resource::{BuildError, DispatchOptions, Root};

pub use store::{BlogStore, Post, User};

/// Mount the blog at `/users`.
pub fn build(store: Arc<BlogStore>, options: DispatchOptions) -> Result<Root, BuildError> {
    let posts = posts::dispatcher(Arc::clone(&store)).build()?;
    let users = users::dispatcher(store, posts).build()?;
    Root::new(options).mount("users", users)
}

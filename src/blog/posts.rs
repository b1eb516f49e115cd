//! `/users/{username}/posts/{slug}`
//!
//! Posts only exist under a user; the owning [`User`] is read from the
//! ancestry, never from shared state.

use std::sync::Arc;

use axum::http::StatusCode;
use serde::Deserialize;

use crate::blog::store::{BlogStore, Post, User};
use crate::resource::{
    Ancestry, Call, Collection, Dispatcher, DispatcherBuilder, HandlerError, Params, Reply,
};

pub struct PostCollection {
    store: Arc<BlogStore>,
}

impl PostCollection {
    pub fn new(store: Arc<BlogStore>) -> Self {
        Self { store }
    }
}

fn author<'a>(parent: Option<&Ancestry<'a>>) -> Result<&'a User, HandlerError> {
    parent
        .and_then(|p| p.find::<User>())
        .ok_or_else(|| HandlerError::failed("posts reached without an owning user"))
}

#[derive(Debug, Default, Deserialize)]
struct PostForm {
    title: Option<String>,
    body: Option<String>,
}

impl PostForm {
    fn apply(self, post: &Post) -> Post {
        Post {
            slug: post.slug.clone(),
            author: post.author.clone(),
            title: self.title.unwrap_or_else(|| post.title.clone()),
            body: self.body.unwrap_or_else(|| post.body.clone()),
        }
    }
}

impl Collection for PostCollection {
    type Resource = Post;

    fn instantiate(&self, id: &str, parent: Option<&Ancestry<'_>>) -> Result<Option<Post>, HandlerError> {
        let user = author(parent)?;
        Ok(self.store.post(&user.username, id))
    }

    fn create(&self, id: &str, parent: Option<&Ancestry<'_>>) -> Result<Post, HandlerError> {
        let user = author(parent)?;
        Ok(Post::new(id, user.username.clone()))
    }

    fn list(&self, _: &Params, parent: Option<&Ancestry<'_>>) -> Result<Reply, HandlerError> {
        let user = author(parent)?;
        Reply::json(self.store.posts_by(&user.username))
    }
}

pub fn dispatcher(store: Arc<BlogStore>) -> DispatcherBuilder<PostCollection> {
    let update = {
        let store = Arc::clone(&store);
        move |c: Call<'_, Post>| {
            let post = c.params.parse::<PostForm>()?.apply(c.resource);
            // A PUT along a fresh path creates the owning user as well.
            if let Some(user) = c.parent.and_then(|p| p.find::<User>()) {
                store.ensure_user(user);
            }
            let status = if store.save_post(post.clone()) {
                StatusCode::CREATED
            } else {
                StatusCode::OK
            };
            Ok(Reply::json(post)?.with_status(status))
        }
    };
    let add = {
        let store = Arc::clone(&store);
        move |c: Call<'_, Post>| {
            let post = c.params.parse::<PostForm>()?.apply(c.resource);
            store.save_post(post.clone());
            Reply::json(post)
        }
    };
    let delete = {
        let store = Arc::clone(&store);
        move |c: Call<'_, Post>| match store.remove_post(&c.resource.author, &c.resource.slug) {
            Some(_) => Ok(Reply::no_content()),
            None => Err(HandlerError::Declined),
        }
    };

    Dispatcher::builder("posts", PostCollection::new(store))
        .expose("index", |c| Reply::json(c.resource))
        .expose("update", update)
        .expose("add", add)
        .expose("delete", delete)
}

//! `/users/{username}`

use std::sync::Arc;

use axum::http::StatusCode;
use serde::Deserialize;

use crate::blog::store::{BlogStore, User};
use crate::resource::{
    Ancestry, Call, Collection, Dispatch, Dispatcher, DispatcherBuilder, HandlerError, Params, Reply,
};

pub struct UserCollection {
    store: Arc<BlogStore>,
}

impl UserCollection {
    pub fn new(store: Arc<BlogStore>) -> Self {
        Self { store }
    }
}

#[derive(Debug, Default, Deserialize)]
struct UserForm {
    fullname: Option<String>,
    email: Option<String>,
}

impl UserForm {
    fn apply(self, user: &User) -> User {
        User {
            username: user.username.clone(),
            fullname: self.fullname.unwrap_or_else(|| user.fullname.clone()),
            email: self.email.unwrap_or_else(|| user.email.clone()),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ListQuery {
    #[serde(default)]
    prefix: String,
}

impl Collection for UserCollection {
    type Resource = User;

    fn instantiate(&self, id: &str, _: Option<&Ancestry<'_>>) -> Result<Option<User>, HandlerError> {
        Ok(self.store.user(id))
    }

    fn create(&self, id: &str, _: Option<&Ancestry<'_>>) -> Result<User, HandlerError> {
        Ok(User::new(id))
    }

    fn list(&self, params: &Params, _: Option<&Ancestry<'_>>) -> Result<Reply, HandlerError> {
        let query: ListQuery = params.parse()?;
        Reply::json(self.store.users(&query.prefix))
    }
}

/// Dispatcher for users with `posts` nested under each user.
pub fn dispatcher(store: Arc<BlogStore>, posts: impl Dispatch + 'static) -> DispatcherBuilder<UserCollection> {
    let update = {
        let store = Arc::clone(&store);
        move |c: Call<'_, User>| {
            let user = c.params.parse::<UserForm>()?.apply(c.resource);
            let status = if store.save_user(user.clone()) {
                StatusCode::CREATED
            } else {
                StatusCode::OK
            };
            Ok(Reply::json(user)?.with_status(status))
        }
    };
    let add = {
        let store = Arc::clone(&store);
        move |c: Call<'_, User>| {
            let user = c.params.parse::<UserForm>()?.apply(c.resource);
            store.save_user(user.clone());
            Reply::json(user)
        }
    };
    let delete = {
        let store = Arc::clone(&store);
        move |c: Call<'_, User>| match store.remove_user(&c.resource.username) {
            Some(_) => Ok(Reply::no_content()),
            None => Err(HandlerError::Declined),
        }
    };
    let summary = {
        let store = Arc::clone(&store);
        move |c: Call<'_, User>| {
            if !c.rest.is_empty() {
                return Err(HandlerError::Declined);
            }
            let posts = store.posts_by(&c.resource.username);
            Reply::json(serde_json::json!({
                "username": c.resource.username,
                "fullname": c.resource.fullname,
                "posts": posts.len(),
                "slugs": posts.iter().map(|p| p.slug.as_str()).collect::<Vec<_>>(),
            }))
        }
    };
    let purge = {
        let store = Arc::clone(&store);
        move |c: Call<'_, User>| {
            for post in store.posts_by(&c.resource.username) {
                store.remove_post(&post.author, &post.slug);
            }
            Ok(Reply::no_content())
        }
    };

    Dispatcher::builder("users", UserCollection::new(store))
        .expose("index", |c| Reply::json(c.resource))
        .expose("update", update)
        .expose("add", add)
        .expose("delete", delete)
        .expose("summary", summary)
        .hidden("purge", purge)
        .child("posts", posts)
}

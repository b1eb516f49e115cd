//! In-memory storage for the blog.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub fullname: String,
    pub email: String,
}

impl User {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            fullname: String::new(),
            email: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub slug: String,
    pub author: String,
    pub title: String,
    pub body: String,
}

impl Post {
    pub fn new(slug: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            author: author.into(),
            title: String::new(),
            body: String::new(),
        }
    }
}

/// Thread-safe user and post tables. Posts are keyed by (author, slug).
#[derive(Debug, Default)]
pub struct BlogStore {
    users: DashMap<String, User>,
    posts: DashMap<(String, String), Post>,
}

impl BlogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store with one user, `bob`, and two posts.
    pub fn seeded() -> Self {
        let store = Self::new();
        store.save_user(User {
            username: "bob".into(),
            fullname: "Bob Example".into(),
            email: "bob@example.com".into(),
        });
        for (slug, title) in [("my-first-post", "Hello"), ("my-second-post", "Again")] {
            store.save_post(Post {
                slug: slug.into(),
                author: "bob".into(),
                title: title.into(),
                body: format!("{title} from bob"),
            });
        }
        store
    }

    pub fn user(&self, username: &str) -> Option<User> {
        self.users.get(username).map(|r| r.value().clone())
    }

    /// Insert or replace. Returns true when the user is new.
    pub fn save_user(&self, user: User) -> bool {
        self.users.insert(user.username.clone(), user).is_none()
    }

    /// Insert `user` unless one with the same name exists.
    pub fn ensure_user(&self, user: &User) {
        self.users
            .entry(user.username.clone())
            .or_insert_with(|| user.clone());
    }

    /// Remove a user together with their posts.
    pub fn remove_user(&self, username: &str) -> Option<User> {
        let removed = self.users.remove(username).map(|(_, user)| user);
        if removed.is_some() {
            self.posts.retain(|(author, _), _| author != username);
        }
        removed
    }

    /// Users whose name starts with `prefix`, sorted by name.
    pub fn users(&self, prefix: &str) -> Vec<User> {
        let mut users: Vec<User> = self
            .users
            .iter()
            .filter(|r| r.key().starts_with(prefix))
            .map(|r| r.value().clone())
            .collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        users
    }

    pub fn post(&self, author: &str, slug: &str) -> Option<Post> {
        self.posts
            .get(&(author.to_string(), slug.to_string()))
            .map(|r| r.value().clone())
    }

    /// Insert or replace. Returns true when the post is new.
    pub fn save_post(&self, post: Post) -> bool {
        let key = (post.author.clone(), post.slug.clone());
        self.posts.insert(key, post).is_none()
    }

    pub fn remove_post(&self, author: &str, slug: &str) -> Option<Post> {
        self.posts
            .remove(&(author.to_string(), slug.to_string()))
            .map(|(_, post)| post)
    }

    /// Posts by `author`, sorted by slug.
    pub fn posts_by(&self, author: &str) -> Vec<Post> {
        let mut posts: Vec<Post> = self
            .posts
            .iter()
            .filter(|r| r.key().0 == author)
            .map(|r| r.value().clone())
            .collect();
        posts.sort_by(|a, b| a.slug.cmp(&b.slug));
        posts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remove_user_cascades() {
        let store = BlogStore::seeded();
        assert_eq!(store.posts_by("bob").len(), 2);

        assert!(store.remove_user("bob").is_some());
        assert!(store.user("bob").is_none());
        assert!(store.posts_by("bob").is_empty());
    }

    #[test]
    fn test_save_reports_new() {
        let store = BlogStore::new();
        assert!(store.save_user(User::new("ann")));
        assert!(!store.save_user(User::new("ann")));

        store.ensure_user(&User {
            fullname: "ignored".into(),
            ..User::new("ann")
        });
        assert_eq!(store.user("ann").map(|u| u.fullname), Some(String::new()));
    }

    #[test]
    fn test_users_prefix_sorted() {
        let store = BlogStore::new();
        for name in ["carl", "ann", "anna"] {
            store.save_user(User::new(name));
        }
        let names: Vec<_> = store.users("ann").into_iter().map(|u| u.username).collect();
        assert_eq!(names, vec!["ann", "anna"]);
    }
}

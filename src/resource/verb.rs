//! HTTP verbs and the verb → handler name mapping.
//!
//! # Design Decisions
//! - Only GET, POST, PUT and DELETE take part in verb dispatch
//! - Overrides win verb by verb; verbs absent from the override map fall
//!   back to the defaults
//! - Maps are built once per resource type and never mutated afterwards

use std::collections::HashMap;
use std::fmt;

use axum::http::Method;

/// A verb that can be routed to a resource handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    Get,
    Post,
    Put,
    Delete,
}

impl Verb {
    pub const ALL: [Verb; 4] = [Verb::Get, Verb::Post, Verb::Put, Verb::Delete];

    /// Map a request method onto a verb. Methods outside the four routable
    /// verbs (HEAD, PATCH, ...) return `None`.
    pub fn from_method(method: &Method) -> Option<Self> {
        match *method {
            Method::GET => Some(Verb::Get),
            Method::POST => Some(Verb::Post),
            Method::PUT => Some(Verb::Put),
            Method::DELETE => Some(Verb::Delete),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Get => "GET",
            Verb::Post => "POST",
            Verb::Put => "PUT",
            Verb::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Verb → handler name mapping for one resource type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodMap {
    defaults: HashMap<Verb, String>,
    overrides: HashMap<Verb, String>,
}

impl MethodMap {
    /// The standard mapping: DELETE→delete, GET→index, POST→add, PUT→update.
    pub fn standard() -> Self {
        let defaults = [
            (Verb::Delete, "delete"),
            (Verb::Get, "index"),
            (Verb::Post, "add"),
            (Verb::Put, "update"),
        ]
        .into_iter()
        .map(|(verb, name)| (verb, name.to_string()))
        .collect();

        Self {
            defaults,
            overrides: HashMap::new(),
        }
    }

    /// A map with custom defaults and no overrides. Verbs missing from
    /// `defaults` are unsupported on the resource type.
    pub fn with_defaults<I, S>(defaults: I) -> Self
    where
        I: IntoIterator<Item = (Verb, S)>,
        S: Into<String>,
    {
        Self {
            defaults: defaults.into_iter().map(|(v, s)| (v, s.into())).collect(),
            overrides: HashMap::new(),
        }
    }

    /// Route `verb` to `handler`, taking precedence over the defaults.
    pub fn override_verb(mut self, verb: Verb, handler: impl Into<String>) -> Self {
        self.overrides.insert(verb, handler.into());
        self
    }

    /// Handler name for `verb`, if any.
    pub fn resolve(&self, verb: Verb) -> Option<&str> {
        self.overrides
            .get(&verb)
            .or_else(|| self.defaults.get(&verb))
            .map(String::as_str)
    }

    /// All verbs this map routes, with their handler names.
    pub fn routes(&self) -> impl Iterator<Item = (Verb, &str)> + '_ {
        Verb::ALL
            .into_iter()
            .filter_map(|verb| self.resolve(verb).map(|name| (verb, name)))
    }
}

impl Default for MethodMap {
    fn default() -> Self {
        Self::standard()
    }
}

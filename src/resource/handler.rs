//! Typed handler registry.
//!
//! # Responsibilities
//! - Hold the per-type table of named handlers
//! - Record which handlers are resource-exposed
//!
//! # Design Decisions
//! - Exposure is decided at registration; a hidden handler can never be
//!   reached by verb or path dispatch, whatever its name
//! - Verb handlers and path actions share one signature; verb dispatch
//!   passes an empty `rest`

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use axum::http::Method;

use crate::resource::ancestry::Ancestry;
use crate::resource::error::{BuildError, HandlerError};
use crate::resource::params::Params;
use crate::resource::reply::Reply;

/// Arguments for one handler invocation.
pub struct Call<'a, R> {
    /// The resolved resource.
    pub resource: &'a R,
    /// Segment the resource was resolved from.
    pub id: &'a str,
    /// Path segments left after the handler name (path actions only).
    pub rest: &'a [String],
    pub params: &'a Params,
    pub parent: Option<&'a Ancestry<'a>>,
    pub method: &'a Method,
}

pub type HandlerFn<R> = dyn Fn(Call<'_, R>) -> Result<Reply, HandlerError> + Send + Sync;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exposure {
    /// Reachable through dispatch.
    Resource,
    /// Registered on the type but invisible to dispatch.
    Hidden,
}

pub struct HandlerEntry<R> {
    func: Arc<HandlerFn<R>>,
    exposure: Exposure,
}

impl<R> HandlerEntry<R> {
    pub fn is_exposed(&self) -> bool {
        self.exposure == Exposure::Resource
    }

    pub fn exposure(&self) -> Exposure {
        self.exposure
    }

    pub fn call(&self, call: Call<'_, R>) -> Result<Reply, HandlerError> {
        (self.func)(call)
    }
}

impl<R> Clone for HandlerEntry<R> {
    fn clone(&self) -> Self {
        Self {
            func: Arc::clone(&self.func),
            exposure: self.exposure,
        }
    }
}

impl<R> fmt::Debug for HandlerEntry<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerEntry")
            .field("exposure", &self.exposure)
            .finish_non_exhaustive()
    }
}

/// Named handlers of one resource type.
pub struct Handlers<R> {
    collection: String,
    entries: HashMap<String, HandlerEntry<R>>,
}

impl<R> Handlers<R> {
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            entries: HashMap::new(),
        }
    }

    pub fn insert<F>(&mut self, name: &str, exposure: Exposure, func: F) -> Result<(), BuildError>
    where
        F: Fn(Call<'_, R>) -> Result<Reply, HandlerError> + Send + Sync + 'static,
    {
        if name.is_empty() || name.contains('/') {
            return Err(BuildError::InvalidName {
                collection: self.collection.clone(),
                name: name.to_string(),
            });
        }
        if self.entries.contains_key(name) {
            return Err(BuildError::DuplicateHandler {
                collection: self.collection.clone(),
                handler: name.to_string(),
            });
        }
        self.entries.insert(
            name.to_string(),
            HandlerEntry {
                func: Arc::new(func),
                exposure,
            },
        );
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&HandlerEntry<R>> {
        self.entries.get(name)
    }

    /// Exposed handler by name. Hidden handlers are reported as absent.
    pub fn exposed(&self, name: &str) -> Option<&HandlerEntry<R>> {
        self.entries.get(name).filter(|entry| entry.is_exposed())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<R> fmt::Debug for Handlers<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.entries.iter()).finish()
    }
}

//! Mount table: the entry point the HTTP layer calls.
//!
//! # Responsibilities
//! - Split a request path into segments
//! - Pick the root dispatcher named by the first segment
//! - Hand the remaining segments to it with no parent context

use std::collections::HashMap;
use std::sync::Arc;

use axum::http::Method;
use tracing::debug;

use crate::resource::dispatcher::{Dispatch, DispatchOptions, DispatchRequest};
use crate::resource::error::{BuildError, DispatchError, NotFound};
use crate::resource::params::Params;
use crate::resource::reply::Reply;

/// Top-level collections by mount name.
#[derive(Default)]
pub struct Root {
    mounts: HashMap<String, Arc<dyn Dispatch>>,
    options: DispatchOptions,
}

impl Root {
    pub fn new(options: DispatchOptions) -> Self {
        Self {
            mounts: HashMap::new(),
            options,
        }
    }

    /// Mount `dispatcher` at `/{name}`.
    pub fn mount<D: Dispatch + 'static>(mut self, name: &str, dispatcher: D) -> Result<Self, BuildError> {
        if name.is_empty() || name.contains('/') {
            return Err(BuildError::InvalidName {
                collection: "/".to_string(),
                name: name.to_string(),
            });
        }
        if self.mounts.contains_key(name) {
            return Err(BuildError::DuplicateChild {
                collection: "/".to_string(),
                child: name.to_string(),
            });
        }
        self.mounts.insert(name.to_string(), Arc::new(dispatcher));
        Ok(self)
    }

    pub fn has_mount(&self, name: &str) -> bool {
        self.mounts.contains_key(name)
    }

    /// Dispatch a raw, already percent-decoded path.
    pub fn dispatch(&self, method: &Method, path: &str, params: &Params) -> Result<Reply, DispatchError> {
        let segments = split_path(path);
        self.dispatch_segments(method, &segments, params)
    }

    pub fn dispatch_segments(
        &self,
        method: &Method,
        segments: &[String],
        params: &Params,
    ) -> Result<Reply, DispatchError> {
        let Some((mount, rest)) = segments.split_first() else {
            return Err(NotFound::UnknownMount(String::new()).into());
        };
        let Some(dispatcher) = self.mounts.get(mount.as_str()) else {
            debug!(mount = %mount, "no such mount");
            return Err(NotFound::UnknownMount(mount.clone()).into());
        };

        let req = DispatchRequest::new(method).with_options(self.options);
        dispatcher.dispatch(&req, rest, params, None)
    }
}

/// Path segments with empty ones (leading, trailing or doubled slashes)
/// dropped.
pub fn split_path(path: &str) -> Vec<String> {
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect()
}

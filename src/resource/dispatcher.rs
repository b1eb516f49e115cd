//! Resource dispatcher: path walk and verb dispatch for one resource type.
//!
//! # Data Flow
//! ```text
//! segments = [id, next, rest..]
//!     []            → Collection::list(params)
//!     [id]          → instantiate(id) (create(id) on PUT) → verb dispatch
//!     [id, child..] → child.dispatch(rest, parent = resolved id)
//!     [id, action..]→ exposed handler `action`(resource, rest, params)
//! ```
//!
//! # Design Decisions
//! - Dispatchers are immutable after `build()`; the parent resource travels
//!   as an argument, so one child instance serves overlapping requests
//! - Children shadow handlers of the same name
//! - Strictly descending walk, no backtracking

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use axum::http::Method;
use tracing::{debug, error, warn};

use crate::resource::ancestry::Ancestry;
use crate::resource::collection::Collection;
use crate::resource::error::{BuildError, DispatchError, HandlerError, NotFound};
use crate::resource::handler::{Call, Exposure, Handlers};
use crate::resource::params::Params;
use crate::resource::reply::Reply;
use crate::resource::verb::{MethodMap, Verb};

/// Process-wide dispatch behavior.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchOptions {
    /// Legacy compatibility: a verb handler that fails answers 404 instead
    /// of 500.
    pub fail_soft: bool,
}

/// Per-request inputs that stay constant during the walk.
#[derive(Debug, Clone, Copy)]
pub struct DispatchRequest<'a> {
    pub method: &'a Method,
    pub options: DispatchOptions,
}

impl<'a> DispatchRequest<'a> {
    pub fn new(method: &'a Method) -> Self {
        Self {
            method,
            options: DispatchOptions::default(),
        }
    }

    pub fn with_options(mut self, options: DispatchOptions) -> Self {
        self.options = options;
        self
    }
}

/// Object-safe dispatch entry point, so dispatchers of different resource
/// types can be nested.
pub trait Dispatch: Send + Sync {
    /// Collection name used in logs and errors.
    fn name(&self) -> &str;

    fn dispatch(
        &self,
        req: &DispatchRequest<'_>,
        segments: &[String],
        params: &Params,
        parent: Option<&Ancestry<'_>>,
    ) -> Result<Reply, DispatchError>;
}

impl<D: Dispatch + ?Sized> Dispatch for Arc<D> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn dispatch(
        &self,
        req: &DispatchRequest<'_>,
        segments: &[String],
        params: &Params,
        parent: Option<&Ancestry<'_>>,
    ) -> Result<Reply, DispatchError> {
        (**self).dispatch(req, segments, params, parent)
    }
}

/// Dispatcher for the resources of collection `C`.
pub struct Dispatcher<C: Collection> {
    name: String,
    collection: C,
    methods: MethodMap,
    handlers: Handlers<C::Resource>,
    children: HashMap<String, Arc<dyn Dispatch>>,
}

impl<C: Collection> Dispatcher<C> {
    pub fn builder(name: impl Into<String>, collection: C) -> DispatcherBuilder<C> {
        DispatcherBuilder::new(name, collection)
    }

    /// Route the request method to this type's handler for `resource`.
    pub fn dispatch_verb(
        &self,
        req: &DispatchRequest<'_>,
        id: &str,
        resource: &C::Resource,
        params: &Params,
        parent: Option<&Ancestry<'_>>,
    ) -> Result<Reply, DispatchError> {
        let handler = Verb::from_method(req.method).and_then(|verb| self.methods.resolve(verb));
        let Some(handler) = handler else {
            debug!(collection = %self.name, method = %req.method, "method not mapped");
            return Err(NotFound::UnsupportedMethod {
                collection: self.name.clone(),
                method: req.method.to_string(),
            }
            .into());
        };

        let Some(entry) = self.handlers.get(handler) else {
            warn!(
                collection = %self.name,
                method = %req.method,
                handler,
                resource = id,
                "Unsupported method for resource"
            );
            return Err(DispatchError::BadRequest {
                collection: self.name.clone(),
                verb: req.method.to_string(),
                handler: handler.to_string(),
            });
        };

        if !entry.is_exposed() {
            debug!(collection = %self.name, handler, "handler is not exposed");
            return Err(NotFound::NotExposed {
                collection: self.name.clone(),
                handler: handler.to_string(),
            }
            .into());
        }

        debug!(collection = %self.name, handler, resource = id, "verb dispatch");
        let call = Call {
            resource,
            id,
            rest: &[],
            params,
            parent,
            method: req.method,
        };
        entry
            .call(call)
            .map_err(|e| self.handler_failure(handler, e, req.options.fail_soft))
    }

    fn resolve(
        &self,
        req: &DispatchRequest<'_>,
        id: &str,
        parent: Option<&Ancestry<'_>>,
    ) -> Result<C::Resource, DispatchError> {
        match self.collection.instantiate(id, parent) {
            Ok(Some(resource)) => return Ok(resource),
            Ok(None) => {}
            Err(e) => {
                warn!(collection = %self.name, id, error = %e, "Lookup failed, treating as not found");
            }
        }

        if *req.method == Method::PUT {
            debug!(collection = %self.name, id, "creating resource");
            return self
                .collection
                .create(id, parent)
                .map_err(|e| self.handler_failure("create", e, false));
        }

        Err(NotFound::UnknownResource {
            collection: self.name.clone(),
            id: id.to_string(),
        }
        .into())
    }

    fn handler_failure(&self, handler: &str, err: HandlerError, fail_soft: bool) -> DispatchError {
        let declined = || -> DispatchError {
            NotFound::Declined {
                collection: self.name.clone(),
                handler: handler.to_string(),
            }
            .into()
        };

        match err {
            HandlerError::Declined => declined(),
            HandlerError::Rejected(_) | HandlerError::Failed(_) if fail_soft => {
                warn!(collection = %self.name, handler, error = %err, "Handler failed, answering not found");
                declined()
            }
            HandlerError::Rejected(reason) => DispatchError::Rejected {
                collection: self.name.clone(),
                handler: handler.to_string(),
                reason,
            },
            HandlerError::Failed(source) => {
                error!(collection = %self.name, handler, error = %source, "Handler failed");
                DispatchError::Handler {
                    collection: self.name.clone(),
                    handler: handler.to_string(),
                    source,
                }
            }
        }
    }
}

impl<C: Collection> Dispatch for Dispatcher<C> {
    fn name(&self) -> &str {
        &self.name
    }

    fn dispatch(
        &self,
        req: &DispatchRequest<'_>,
        segments: &[String],
        params: &Params,
        parent: Option<&Ancestry<'_>>,
    ) -> Result<Reply, DispatchError> {
        let Some((id, rest)) = segments.split_first() else {
            debug!(collection = %self.name, "listing");
            return self
                .collection
                .list(params, parent)
                .map_err(|e| self.handler_failure("list", e, false));
        };

        let resource = self.resolve(req, id, parent)?;

        let Some((next, rest)) = rest.split_first() else {
            return self.dispatch_verb(req, id, &resource, params, parent);
        };

        if let Some(child) = self.children.get(next.as_str()) {
            debug!(collection = %self.name, id = %id, child = %next, "descending");
            let frame = Ancestry::new(&self.name, id, &resource, parent);
            return child.dispatch(req, rest, params, Some(&frame));
        }

        let Some(entry) = self.handlers.exposed(next) else {
            return Err(NotFound::UnmappedSegment {
                collection: self.name.clone(),
                segment: next.clone(),
            }
            .into());
        };

        debug!(collection = %self.name, id = %id, action = %next, "path action");
        let call = Call {
            resource: &resource,
            id,
            rest,
            params,
            parent,
            method: req.method,
        };
        entry
            .call(call)
            .map_err(|e| self.handler_failure(next, e, false))
    }
}

impl<C: Collection> fmt::Debug for Dispatcher<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("name", &self.name)
            .field("methods", &self.methods)
            .field("handlers", &self.handlers)
            .field("children", &self.children.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Configuration-time builder for a [`Dispatcher`].
pub struct DispatcherBuilder<C: Collection> {
    name: String,
    collection: C,
    methods: MethodMap,
    handlers: Handlers<C::Resource>,
    children: HashMap<String, Arc<dyn Dispatch>>,
    error: Option<BuildError>,
}

impl<C: Collection> DispatcherBuilder<C> {
    pub fn new(name: impl Into<String>, collection: C) -> Self {
        let name = name.into();
        Self {
            handlers: Handlers::new(name.clone()),
            name,
            collection,
            methods: MethodMap::default(),
            children: HashMap::new(),
            error: None,
        }
    }

    /// Replace the verb mapping.
    pub fn methods(mut self, methods: MethodMap) -> Self {
        self.methods = methods;
        self
    }

    /// Register a resource-exposed handler.
    pub fn expose<F>(self, name: &str, func: F) -> Self
    where
        F: Fn(Call<'_, C::Resource>) -> Result<Reply, HandlerError> + Send + Sync + 'static,
    {
        self.register(name, Exposure::Resource, func)
    }

    /// Register a handler that dispatch must never reach.
    pub fn hidden<F>(self, name: &str, func: F) -> Self
    where
        F: Fn(Call<'_, C::Resource>) -> Result<Reply, HandlerError> + Send + Sync + 'static,
    {
        self.register(name, Exposure::Hidden, func)
    }

    fn register<F>(mut self, name: &str, exposure: Exposure, func: F) -> Self
    where
        F: Fn(Call<'_, C::Resource>) -> Result<Reply, HandlerError> + Send + Sync + 'static,
    {
        if self.error.is_none() {
            if let Err(e) = self.handlers.insert(name, exposure, func) {
                self.error = Some(e);
            }
        }
        self
    }

    /// Nest `dispatcher` under `name`.
    pub fn child<D: Dispatch + 'static>(mut self, name: &str, dispatcher: D) -> Self {
        if self.error.is_some() {
            return self;
        }
        if name.is_empty() || name.contains('/') {
            self.error = Some(BuildError::InvalidName {
                collection: self.name.clone(),
                name: name.to_string(),
            });
        } else if self.children.contains_key(name) {
            self.error = Some(BuildError::DuplicateChild {
                collection: self.name.clone(),
                child: name.to_string(),
            });
        } else {
            self.children.insert(name.to_string(), Arc::new(dispatcher));
        }
        self
    }

    /// Finish configuration. Registry inconsistencies that still allow
    /// serving are logged here, once.
    pub fn build(self) -> Result<Dispatcher<C>, BuildError> {
        if let Some(e) = self.error {
            return Err(e);
        }

        for (verb, handler) in self.methods.routes() {
            match self.handlers.get(handler) {
                None => warn!(
                    collection = %self.name,
                    verb = %verb,
                    handler,
                    "Verb maps to an unregistered handler; requests will be rejected"
                ),
                Some(entry) if !entry.is_exposed() => warn!(
                    collection = %self.name,
                    verb = %verb,
                    handler,
                    "Verb maps to a hidden handler; requests will not be found"
                ),
                Some(_) => {}
            }
        }

        for child in self.children.keys() {
            if self.handlers.get(child).is_some() {
                warn!(collection = %self.name, child = %child, "Child shadows handler of the same name");
            }
        }

        Ok(Dispatcher {
            name: self.name,
            collection: self.collection,
            methods: self.methods,
            handlers: self.handlers,
            children: self.children,
        })
    }
}

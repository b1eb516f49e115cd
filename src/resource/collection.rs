//! Application hooks for one resource type.

use crate::resource::ancestry::Ancestry;
use crate::resource::error::HandlerError;
use crate::resource::params::Params;
use crate::resource::reply::Reply;

/// Lookup, creation and listing for the resources of one type.
///
/// `parent` is the resolved ancestor chain when the collection is nested
/// under another dispatcher, `None` at a mount point.
pub trait Collection: Send + Sync + 'static {
    type Resource: Send + Sync + 'static;

    /// Resolve `id` to a resource.
    ///
    /// A resource that does not exist is `Ok(None)`. Errors are logged and
    /// treated as not found.
    fn instantiate(
        &self,
        id: &str,
        parent: Option<&Ancestry<'_>>,
    ) -> Result<Option<Self::Resource>, HandlerError>;

    /// Build a new resource for `id`. Only called for PUT requests whose
    /// `id` did not resolve.
    fn create(
        &self,
        id: &str,
        parent: Option<&Ancestry<'_>>,
    ) -> Result<Self::Resource, HandlerError> {
        let _ = (id, parent);
        Err(HandlerError::Declined)
    }

    /// Listing fallback for a request that names no resource.
    fn list(&self, params: &Params, parent: Option<&Ancestry<'_>>) -> Result<Reply, HandlerError> {
        let _ = (params, parent);
        Err(HandlerError::Declined)
    }
}

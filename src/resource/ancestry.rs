//! Parent context threaded through nested dispatch.
//!
//! Each level of a nested walk pushes one `Ancestry` frame on the stack and
//! hands a reference to the child dispatcher. Frames borrow the resolved
//! resource of the enclosing call, so they live exactly as long as the
//! request's walk and are never stored on a dispatcher.

use std::any::Any;
use std::fmt;

/// One resolved ancestor, linked to its own parent.
#[derive(Clone, Copy)]
pub struct Ancestry<'a> {
    collection: &'a str,
    id: &'a str,
    resource: &'a (dyn Any + Send + Sync),
    parent: Option<&'a Ancestry<'a>>,
}

impl<'a> Ancestry<'a> {
    pub fn new(
        collection: &'a str,
        id: &'a str,
        resource: &'a (dyn Any + Send + Sync),
        parent: Option<&'a Ancestry<'a>>,
    ) -> Self {
        Self {
            collection,
            id,
            resource,
            parent,
        }
    }

    /// Collection name of the dispatcher that resolved this ancestor.
    pub fn collection(&self) -> &'a str {
        self.collection
    }

    /// Path segment the ancestor was resolved from.
    pub fn id(&self) -> &'a str {
        self.id
    }

    /// The ancestor itself, if it has type `T`.
    pub fn resource<T: Any>(&self) -> Option<&'a T> {
        self.resource.downcast_ref::<T>()
    }

    pub fn parent(&self) -> Option<&'a Ancestry<'a>> {
        self.parent
    }

    /// Nearest ancestor of type `T`, starting at this frame.
    pub fn find<T: Any>(&self) -> Option<&'a T> {
        let mut frame = Some(self);
        while let Some(current) = frame {
            if let Some(found) = current.resource::<T>() {
                return Some(found);
            }
            frame = current.parent;
        }
        None
    }

    /// Number of frames from this one up to the root, inclusive.
    pub fn depth(&self) -> usize {
        let mut depth = 1;
        let mut frame = self.parent;
        while let Some(current) = frame {
            depth += 1;
            frame = current.parent;
        }
        depth
    }
}

impl fmt::Debug for Ancestry<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ancestry")
            .field("collection", &self.collection)
            .field("id", &self.id)
            .field("parent", &self.parent)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Org(&'static str);
    struct Team(&'static str);

    #[test]
    fn test_find_walks_up() {
        let org = Org("acme");
        let team = Team("infra");
        let root = Ancestry::new("orgs", "acme", &org, None);
        let leaf = Ancestry::new("teams", "infra", &team, Some(&root));

        assert_eq!(leaf.resource::<Team>().map(|t| t.0), Some("infra"));
        assert!(leaf.resource::<Org>().is_none());
        assert_eq!(leaf.find::<Org>().map(|o| o.0), Some("acme"));
        assert_eq!(leaf.depth(), 2);
        assert_eq!(leaf.parent().map(|p| p.id()), Some("acme"));
    }

    #[test]
    fn test_find_missing_type() {
        let org = Org("acme");
        let root = Ancestry::new("orgs", "acme", &org, None);
        assert!(root.find::<Team>().is_none());
        assert_eq!(root.collection(), "orgs");
    }
}

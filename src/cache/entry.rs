//! Cache Entry Module
//!
//! Defines a stored key/value pair and the handle used to address it.

use std::fmt;

// == Handle ==
/// Stable address of an entry inside the cache's arena.
///
/// A handle stays valid until its entry is evicted, removed or cleared; the
/// slot may then be recycled for a different entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle(usize);

impl Handle {
    pub(crate) fn new(slot: usize) -> Self {
        Self(slot)
    }

    /// Returns the arena slot this handle points to.
    pub fn slot(self) -> usize {
        self.0
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// == Entry ==
/// One stored key/value pair plus its ordering links.
///
/// `prev` points toward the head of the sequence, `next` toward the tail.
/// The key is read-only outside the crate: renaming it without re-indexing
/// would leave the entry unreachable.
#[derive(Debug, Clone)]
pub struct Entry {
    pub(crate) key: String,
    pub(crate) value: String,
    pub(crate) prev: Option<Handle>,
    pub(crate) next: Option<Handle>,
}

impl Entry {
    // == Constructor ==
    /// Creates an unlinked entry.
    pub fn new(key: String, value: String) -> Self {
        Self {
            key,
            value,
            prev: None,
            next: None,
        }
    }

    /// The key the entry is indexed under.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Returns true when the entry is not linked to any neighbour.
    pub fn is_detached(&self) -> bool {
        self.prev.is_none() && self.next.is_none()
    }
}

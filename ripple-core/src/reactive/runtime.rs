//! Dependency Registry
//!
//! The registry maps every (reactive object, property) pair that has been
//! read to its [`Dep`].
//!
//! # Ownership
//!
//! The registry is a side table keyed by [`ObjectId`], not by the object
//! itself, so it never keeps a state object alive. When the last handle to
//! a reactive object is dropped the object releases its entries.
//!
//! # Thread Confinement
//!
//! The registry is thread-local. All reactive reads, writes, and effect
//! re-runs for an object happen on the thread that created it.

use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::trace;

use super::dep::Dep;

/// Identity of a reactive object within the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectId(u64);

impl ObjectId {
    /// Generate a new unique object ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

thread_local! {
    static TARGET_MAP: RefCell<HashMap<ObjectId, HashMap<String, Dep>>> =
        RefCell::new(HashMap::new());
}

/// Entry point to the thread's dependency registry.
pub struct Runtime;

impl Runtime {
    /// Get the entry for `(object, key)`, creating an empty one on first access.
    pub fn dep(object: ObjectId, key: &str) -> Dep {
        TARGET_MAP.with(|map| {
            let mut map = map.borrow_mut();
            let deps = map.entry(object).or_default();
            if let Some(dep) = deps.get(key) {
                return dep.clone();
            }
            trace!(?object, key, "creating dependency entry");
            let dep = Dep::new();
            deps.insert(key.to_owned(), dep.clone());
            dep
        })
    }

    /// Get the entry for `(object, key)` without creating it.
    pub fn existing_dep(object: ObjectId, key: &str) -> Option<Dep> {
        TARGET_MAP.with(|map| map.borrow().get(&object).and_then(|deps| deps.get(key).cloned()))
    }

    /// Drop every entry belonging to `object`.
    ///
    /// Called when the object itself is dropped.
    pub(crate) fn release(object: ObjectId) {
        // The registry may already be gone during thread teardown.
        let released = TARGET_MAP
            .try_with(|map| map.try_borrow_mut().ok().and_then(|mut map| map.remove(&object)))
            .ok()
            .flatten();

        // Entries are dropped after the borrow ends: their effects may own
        // other reactive objects that release themselves in turn.
        if let Some(deps) = released {
            trace!(?object, entries = deps.len(), "released dependency entries");
            drop(deps);
        }
    }

    /// Check whether the registry holds any entries for `object`.
    pub fn is_tracked(object: ObjectId) -> bool {
        TARGET_MAP.with(|map| map.borrow().contains_key(&object))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::context::TrackingContext;
    use crate::reactive::subscriber::Effect;

    #[test]
    fn dep_is_created_lazily() {
        let object = ObjectId::new();

        assert!(Runtime::existing_dep(object, "count").is_none());
        assert!(!Runtime::is_tracked(object));

        let _dep = Runtime::dep(object, "count");

        assert!(Runtime::existing_dep(object, "count").is_some());
        assert!(Runtime::is_tracked(object));
    }

    #[test]
    fn same_pair_resolves_same_entry() {
        let object = ObjectId::new();
        let effect = Effect::new(|| {});

        {
            let _ctx = TrackingContext::enter(&effect).unwrap();
            Runtime::dep(object, "count").depend();
        }

        // A second lookup sees the subscriber registered through the first
        assert!(Runtime::dep(object, "count").contains(effect.id()));
        assert_eq!(Runtime::dep(object, "other").subscriber_count(), 0);
    }

    #[test]
    fn release_drops_entries() {
        let object = ObjectId::new();
        let _dep = Runtime::dep(object, "count");

        Runtime::release(object);

        assert!(!Runtime::is_tracked(object));
    }
}

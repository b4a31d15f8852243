//! Effect handles for the reactive system.
//!
//! An effect is any zero-argument computation that depends on reactive
//! properties. Application render loops are effects, and so is anything
//! passed to [`watch_effect`](super::watch_effect).

use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Unique identifier for an effect.
///
/// Dependency entries are keyed by this ID, which is what makes
/// registration idempotent: the same effect reading the same property
/// twice is still one subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EffectId(u64);

impl EffectId {
    /// Generate a new unique effect ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl Default for EffectId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EffectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A shared, identity-carrying effect callback.
///
/// Cloning an `Effect` produces another handle to the same computation;
/// both clones have the same [`EffectId`].
#[derive(Clone)]
pub struct Effect {
    id: EffectId,
    run: Rc<dyn Fn()>,
}

impl Effect {
    /// Wrap a callback as a new effect with a fresh ID.
    pub fn new<F>(run: F) -> Self
    where
        F: Fn() + 'static,
    {
        Self {
            id: EffectId::new(),
            run: Rc::new(run),
        }
    }

    /// Get the effect's unique ID.
    pub fn id(&self) -> EffectId {
        self.id
    }

    /// Invoke the callback without touching the tracking context.
    pub fn call(&self) {
        (self.run)();
    }
}

impl PartialEq for Effect {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Effect {}

impl fmt::Debug for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Effect").field("id", &self.id).finish()
    }
}

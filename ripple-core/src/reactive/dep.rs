//! Dependency entries.
//!
//! A [`Dep`] is the subscriber set of one property of one reactive object.
//! Subscribers are kept in subscription order and each effect appears at
//! most once.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use smallvec::SmallVec;
use tracing::trace;

use super::context::TrackingContext;
use super::effect;
use super::subscriber::{Effect, EffectId};

/// Subscriber set for a single (object, property) pair.
///
/// `Dep` is a cheap handle; clones share the same subscriber set.
#[derive(Clone, Default)]
pub struct Dep {
    subscribers: Rc<RefCell<IndexMap<EffectId, Effect>>>,
}

impl Dep {
    /// Create an empty entry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe the active effect, if any.
    ///
    /// Reads outside a tracked evaluation register nothing.
    pub fn depend(&self) {
        if let Some(effect) = TrackingContext::current() {
            let mut subscribers = self.subscribers.borrow_mut();
            if !subscribers.contains_key(&effect.id()) {
                trace!(effect = %effect.id(), "subscribed");
                subscribers.insert(effect.id(), effect);
            }
        }
    }

    /// Run every subscriber, in subscription order, on the calling thread.
    ///
    /// The subscriber list is snapshotted first, so effects that subscribe
    /// to this entry while running are picked up by the next notification.
    pub fn notify(&self) {
        let snapshot: SmallVec<[Effect; 4]> =
            self.subscribers.borrow().values().cloned().collect();
        trace!(subscribers = snapshot.len(), "notifying");

        for subscriber in &snapshot {
            effect::rerun(subscriber);
        }
    }

    /// Get the number of subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.borrow().len()
    }

    /// Check whether `effect` is subscribed to this entry.
    pub fn contains(&self, effect: EffectId) -> bool {
        self.subscribers.borrow().contains_key(&effect)
    }
}

impl fmt::Debug for Dep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dep")
            .field("subscribers", &self.subscribers.borrow().keys().collect::<Vec<_>>())
            .finish()
    }
}

//! Effect Tracking Context
//!
//! The tracking context records which effect is currently running so that
//! property reads can be attributed to it without the effect passing itself
//! around.
//!
//! # Implementation
//!
//! The context is a single thread-local slot, not a stack. Tracked
//! evaluations do not nest: entering the context while it is occupied is
//! an error rather than a silent overwrite of the slot. Code that must run
//! another effect from inside a tracked evaluation first moves the active
//! effect aside with [`TrackingContext::suspend`].

use std::cell::RefCell;

use tracing::trace;

use super::subscriber::Effect;
use crate::error::ReactiveError;

thread_local! {
    static ACTIVE_EFFECT: RefCell<Option<Effect>> = const { RefCell::new(None) };
}

/// Guard that clears the active-effect slot when dropped.
///
/// Dropping the guard also runs during unwinding, so a panicking effect
/// does not leave the slot occupied.
#[must_use = "the effect stops being tracked when the guard is dropped"]
pub struct TrackingContext {
    effect: Effect,
}

impl TrackingContext {
    /// Make `effect` the active effect.
    ///
    /// While the returned guard is alive, every reactive read registers
    /// `effect` as a subscriber of the property being read.
    pub fn enter(effect: &Effect) -> Result<Self, ReactiveError> {
        ACTIVE_EFFECT.with(|slot| {
            let mut slot = slot.borrow_mut();
            if let Some(active) = slot.as_ref() {
                return Err(ReactiveError::NestedTracking {
                    active: active.id().raw(),
                });
            }
            trace!(effect = %effect.id(), "tracking started");
            *slot = Some(effect.clone());
            Ok(Self {
                effect: effect.clone(),
            })
        })
    }

    /// Check if an effect is currently being tracked.
    pub fn is_active() -> bool {
        ACTIVE_EFFECT.with(|slot| slot.borrow().is_some())
    }

    /// Get the effect currently being tracked, if any.
    pub fn current() -> Option<Effect> {
        ACTIVE_EFFECT.with(|slot| slot.borrow().clone())
    }

    /// Run `f` with the slot empty, then put the active effect back.
    ///
    /// Reads inside `f` are not attributed to the suspended effect.
    pub fn suspend<R>(f: impl FnOnce() -> R) -> R {
        let suspended = ACTIVE_EFFECT.with(|slot| slot.borrow_mut().take());
        if let Some(effect) = &suspended {
            trace!(effect = %effect.id(), "tracking suspended");
        }
        let _restore = Restore(suspended);
        f()
    }
}

/// Puts a suspended effect back into the slot, also during unwinding.
struct Restore(Option<Effect>);

impl Drop for Restore {
    fn drop(&mut self) {
        if let Some(effect) = self.0.take() {
            trace!(effect = %effect.id(), "tracking resumed");
            ACTIVE_EFFECT.with(|slot| *slot.borrow_mut() = Some(effect));
        }
    }
}

impl Drop for TrackingContext {
    fn drop(&mut self) {
        ACTIVE_EFFECT.with(|slot| {
            let cleared = slot.borrow_mut().take();
            debug_assert_eq!(
                cleared.as_ref().map(Effect::id),
                Some(self.effect.id()),
                "tracking slot was overwritten"
            );
            trace!(effect = %self.effect.id(), "tracking finished");
        });
    }
}

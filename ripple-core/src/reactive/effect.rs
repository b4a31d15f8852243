//! Effect registration.
//!
//! [`watch_effect`] is the only way to subscribe a computation. It runs the
//! computation once inside the tracking context; every reactive property
//! read during that run subscribes it. From then on the computation re-runs
//! synchronously, once per notifying write to any of those properties.
//!
//! There is no unsubscribe. A registered effect stays subscribed until the
//! reactive objects it read are dropped.

use tracing::debug;

use super::context::TrackingContext;
use super::subscriber::Effect;
use crate::error::ReactiveError;

/// Run `run` once while tracking its reads, subscribing it for re-runs.
///
/// # Errors
///
/// Returns [`ReactiveError::NestedTracking`] when called from inside
/// another tracked evaluation. The slot holds a single effect, so nesting
/// would misattribute the outer effect's remaining reads.
///
/// # Example
///
/// ```rust
/// use ripple_core::reactive::{reactive, watch_effect};
/// use serde_json::json;
///
/// let state = reactive(json!({ "count": 0 }));
/// let observed = state.clone();
/// watch_effect(move || {
///     println!("count = {}", observed.get("count"));
/// })?;
///
/// state.set("count", 5); // prints "count = 5"
/// # Ok::<(), ripple_core::error::ReactiveError>(())
/// ```
pub fn watch_effect<F>(run: F) -> Result<Effect, ReactiveError>
where
    F: Fn() + 'static,
{
    let effect = Effect::new(run);
    let ctx = TrackingContext::enter(&effect)?;
    debug!(effect = %effect.id(), "watching effect");
    effect.call();
    drop(ctx);
    Ok(effect)
}

/// Re-run a subscribed effect after one of its dependencies changed.
///
/// The re-run is tracked, so properties first read on a later run also
/// subscribe the effect. A re-run nested inside another tracked evaluation
/// suspends the outer effect, which never inherits the inner reads.
pub(crate) fn rerun(effect: &Effect) {
    TrackingContext::suspend(|| {
        // The slot is empty inside `suspend`, so entering cannot fail.
        let _ctx = TrackingContext::enter(effect).ok();
        effect.call();
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::reactive;
    use serde_json::json;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn effect_runs_once_on_watch() {
        let runs = Rc::new(Cell::new(0));
        let runs_clone = runs.clone();

        watch_effect(move || runs_clone.set(runs_clone.get() + 1)).unwrap();

        assert_eq!(runs.get(), 1);
        assert!(!TrackingContext::is_active());
    }

    #[test]
    fn effect_is_active_while_running() {
        let seen = Rc::new(Cell::new(None));
        let seen_clone = seen.clone();

        let effect = watch_effect(move || {
            seen_clone.set(TrackingContext::current().map(|e| e.id()));
        })
        .unwrap();

        assert_eq!(seen.get(), Some(effect.id()));
    }

    #[test]
    fn nested_watch_effect_is_rejected() {
        let inner_result = Rc::new(Cell::new(None));
        let inner_clone = inner_result.clone();

        watch_effect(move || {
            let nested = watch_effect(|| {});
            inner_clone.set(Some(nested.is_err()));
        })
        .unwrap();

        assert_eq!(inner_result.get(), Some(true));
        assert!(!TrackingContext::is_active());
    }

    #[test]
    fn rerun_is_tracked_when_idle() {
        let seen = Rc::new(Cell::new(false));
        let seen_clone = seen.clone();
        let effect = Effect::new(move || seen_clone.set(TrackingContext::is_active()));

        rerun(&effect);

        assert!(seen.get());
        assert!(!TrackingContext::is_active());
    }

    #[test]
    fn nested_rerun_suspends_outer_effect() {
        let state = reactive(json!({ "x": 0 }));
        let observed = state.clone();
        let inner = Effect::new(move || {
            observed.get("x");
        });
        let outer = Effect::new(|| {});

        let ctx = TrackingContext::enter(&outer).unwrap();
        rerun(&inner);
        assert_eq!(TrackingContext::current(), Some(outer.clone()));
        drop(ctx);

        let dep = crate::reactive::Runtime::dep(state.id(), "x");
        assert!(dep.contains(inner.id()));
        assert!(!dep.contains(outer.id()));
    }

    #[test]
    fn idle_rerun_is_tracked() {
        let state = reactive(json!({ "x": 0 }));
        let observed = state.clone();
        let effect = Effect::new(move || {
            observed.get("x");
        });

        rerun(&effect);

        let dep = crate::reactive::Runtime::dep(state.id(), "x");
        assert!(dep.contains(effect.id()));
        assert!(!TrackingContext::is_active());
    }
}

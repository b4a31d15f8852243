//! Dependency Tracking
//!
//! This module implements the reactive half of Ripple: state objects whose
//! property reads and writes are intercepted, and effects that re-run when
//! the properties they read change.
//!
//! # Concepts
//!
//! ## Reactive objects
//!
//! A [`Reactive`] wraps a plain state object. Reading a property inside an
//! effect subscribes the effect to that property; writing a different value
//! re-runs every subscriber of that property.
//!
//! ## Dependency entries
//!
//! Each (object, property) pair that has been read owns a [`Dep`], the
//! ordered set of effects subscribed to it. Entries live in a thread-local
//! registry ([`Runtime`]) that does not own the objects it indexes.
//!
//! ## Effects
//!
//! An [`Effect`] is a zero-argument computation. [`watch_effect`] runs it
//! once inside the [`TrackingContext`] to collect its dependencies.
//!
//! # Implementation Notes
//!
//! Propagation is fully synchronous. A write runs every subscriber to
//! completion, in subscription order, before `set` returns. There is no
//! batching and no scheduler.

mod context;
mod dep;
mod effect;
mod object;
mod runtime;
mod subscriber;

pub use context::TrackingContext;
pub use dep::Dep;
pub use effect::watch_effect;
pub use object::{reactive, Reactive, WeakReactive};
pub use runtime::{ObjectId, Runtime};
pub use subscriber::{Effect, EffectId};

//! Ripple Core
//!
//! This crate provides the core runtime for the Ripple reactive renderer.
//! It implements:
//!
//! - Dependency tracking over reactive state objects
//! - Render trees and the `h` builder
//! - Mount and patch engines over a pluggable render target
//! - An application driver that re-renders on state changes
//!
//! Everything runs synchronously on one thread. A state write re-runs its
//! subscribers, and through them the whole render and patch cycle, before
//! the write returns.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - `reactive`: reactive objects, dependency entries, and effects
//! - `render`: render trees, the renderer, and render targets
//! - `app`: binds a component to a renderer through an effect
//! - `config`: renderer settings
//! - `error`: error types
//!
//! # Example
//!
//! ```rust
//! use ripple_core::{create_app, h, reactive, Listener, MemoryTarget, VNode};
//! use serde_json::json;
//!
//! let doc = MemoryTarget::new();
//! doc.create_root("div", "app")?;
//!
//! let state = reactive(json!({ "counter": 0 }));
//! let data = state.clone();
//! let app = create_app(move || -> VNode {
//!     let writer = data.downgrade();
//!     let increment = Listener::keyed("increment", move || {
//!         if let Some(state) = writer.upgrade() {
//!             state.update("counter", |n| json!(n.as_i64().unwrap_or(0) + 1));
//!         }
//!     });
//!     h("div", (), vec![
//!         h("span", (), data.get("counter").to_string()),
//!         h("button", [("onClick", increment)], "+1"),
//!     ])
//! })
//! .mount(doc.clone(), "#app")?;
//!
//! let root = app.root_el().unwrap();
//! let button = doc.children(root)[1];
//! doc.dispatch(button, "click")?;
//!
//! assert_eq!(doc.text(doc.children(root)[0]), "1");
//! # Ok::<(), ripple_core::error::RenderError>(())
//! ```

pub mod app;
pub mod config;
pub mod error;
pub mod reactive;
pub mod render;

pub use app::{create_app, Component};
pub use reactive::{reactive, watch_effect, Reactive};
pub use render::{h, Listener, MemoryTarget, Renderer, VNode};

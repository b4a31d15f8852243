//! Render trees and the engines that project them.
//!
//! This module contains:
//!
//! - [`VNode`] trees built with [`h`]
//! - [`Renderer`], which mounts trees and patches them against their
//!   successors
//! - [`RenderTarget`], the boundary to whatever displays the nodes
//! - [`MemoryTarget`], an in-memory document implementing that boundary
//!
//! # Example
//!
//! ```rust
//! use ripple_core::render::{h, MemoryTarget, Renderer};
//!
//! let doc = MemoryTarget::new();
//! let mut renderer = Renderer::new(doc.clone());
//!
//! let mut tree = h("p", [("class", "greeting")], "hello");
//! renderer.mount(&mut tree, doc.body())?;
//!
//! let mut next = h("p", [("class", "greeting")], "hello again");
//! renderer.patch(&tree, &mut next)?;
//!
//! assert_eq!(doc.to_html(next.el().unwrap()), r#"<p class="greeting">hello again</p>"#);
//! # Ok::<(), ripple_core::error::RenderError>(())
//! ```

mod ledger;
mod listener;
mod memory;
mod renderer;
mod strategy;
mod target;
mod vnode;

pub use ledger::{LedgerEntry, LedgerPolicy, ListenerLedger};
pub use listener::{event_type, Listener, ListenerId};
pub use memory::{MemoryTarget, MutationStats};
pub use renderer::Renderer;
pub use strategy::{ListStrategy, Positional};
pub use target::{Container, NodeHandle, RenderTarget};
pub use vnode::{h, Children, IntoChildren, IntoProps, PropValue, Props, VNode};

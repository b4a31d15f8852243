//! Child list reconciliation strategies.
//!
//! The patch engine hands every list-vs-list child comparison to a
//! [`ListStrategy`]. [`Positional`] is the only strategy shipped: it pairs
//! children by index. A keyed strategy can be plugged into
//! [`Renderer`](super::Renderer) without touching the rest of the engine.

use tracing::debug;

use super::renderer::Renderer;
use super::target::{NodeHandle, RenderTarget};
use super::vnode::VNode;
use crate::error::Result;

/// Reconciles the old and new child lists of one parent node.
pub trait ListStrategy: Sized {
    /// Bring `parent`'s children from `old` to `new`.
    ///
    /// `old` is fully mounted. On success every node in `new` is mounted,
    /// either reused from `old` through [`Renderer::patch`] or created with
    /// [`Renderer::mount`], and every node of `old` that was not reused has
    /// been removed with [`Renderer::remove`].
    fn reconcile<T: RenderTarget>(
        renderer: &mut Renderer<T, Self>,
        parent: NodeHandle,
        old: &[VNode],
        new: &mut [VNode],
    ) -> Result<()>;
}

/// Pairs children by position.
///
/// Insertions or removals in the middle of a list patch every later sibling
/// against a misaligned counterpart instead of matching by identity.
#[derive(Debug, Clone, Copy, Default)]
pub struct Positional;

impl ListStrategy for Positional {
    fn reconcile<T: RenderTarget>(
        renderer: &mut Renderer<T, Self>,
        parent: NodeHandle,
        old: &[VNode],
        new: &mut [VNode],
    ) -> Result<()> {
        let common = old.len().min(new.len());

        for (old_child, new_child) in old.iter().zip(new.iter_mut()) {
            renderer.patch(old_child, new_child)?;
        }

        if new.len() > common {
            debug!(count = new.len() - common, "mounting trailing children");
            for child in &mut new[common..] {
                renderer.mount(child, parent)?;
            }
        }

        if old.len() > common {
            debug!(count = old.len() - common, "removing trailing children");
            for child in &old[common..] {
                renderer.remove(parent, child)?;
            }
        }

        Ok(())
    }
}

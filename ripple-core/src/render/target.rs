//! Render target boundary.
//!
//! The [`RenderTarget`] trait lists the only primitives the mount and patch
//! engines need from the system that actually displays nodes (a browser
//! document, a native widget tree, or the in-memory
//! [`MemoryTarget`](super::MemoryTarget)).

use std::fmt;

use super::listener::Listener;
use crate::error::TargetError;

/// Opaque handle to a node owned by a render target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeHandle(u64);

impl NodeHandle {
    /// Wrap a backend-specific node key.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw node key.
    pub const fn raw(&self) -> u64 {
        self.0
    }
}

impl From<u64> for NodeHandle {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

/// Where an application is mounted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Container {
    /// A selector resolved by the render target, e.g. `#app`.
    Selector(String),
    /// A node the caller already holds.
    Node(NodeHandle),
}

impl From<&str> for Container {
    fn from(selector: &str) -> Self {
        Self::Selector(selector.to_owned())
    }
}

impl From<String> for Container {
    fn from(selector: String) -> Self {
        Self::Selector(selector)
    }
}

impl From<NodeHandle> for Container {
    fn from(node: NodeHandle) -> Self {
        Self::Node(node)
    }
}

impl fmt::Display for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Selector(selector) => f.write_str(selector),
            Self::Node(node) => write!(f, "node {}", node.raw()),
        }
    }
}

/// Primitives a render target exposes to the mount and patch engines.
///
/// Methods take `&self`: targets are shared between the renderer and the
/// code that dispatches events into them, so implementations use interior
/// mutability. Listeners may write reactive state, which re-enters the
/// renderer synchronously, so implementations must not hold internal
/// borrows while invoking a listener.
pub trait RenderTarget {
    /// Create a detached node of type `tag`.
    fn create_node(&self, tag: &str) -> Result<NodeHandle, TargetError>;

    fn set_attribute(&self, node: NodeHandle, name: &str, value: &str) -> Result<(), TargetError>;

    fn remove_attribute(&self, node: NodeHandle, name: &str) -> Result<(), TargetError>;

    fn add_event_listener(
        &self,
        node: NodeHandle,
        event_type: &str,
        listener: &Listener,
    ) -> Result<(), TargetError>;

    /// Detach the listener registered under `event_type` with the same
    /// [`ListenerId`](super::ListenerId) as `listener`.
    fn remove_event_listener(
        &self,
        node: NodeHandle,
        event_type: &str,
        listener: &Listener,
    ) -> Result<(), TargetError>;

    /// Append `child` as the last child of `parent`, detaching it from any
    /// previous parent.
    fn append_child(&self, parent: NodeHandle, child: NodeHandle) -> Result<(), TargetError>;

    fn remove_child(&self, parent: NodeHandle, child: NodeHandle) -> Result<(), TargetError>;

    /// Get the parent of `node`, if it is attached.
    fn parent(&self, node: NodeHandle) -> Result<Option<NodeHandle>, TargetError>;

    /// Replace all children of `node` with a single text run.
    fn set_text_content(&self, node: NodeHandle, text: &str) -> Result<(), TargetError>;

    /// Replace all children of `node` with parsed markup.
    ///
    /// The renderer only ever passes an empty string, to clear a node.
    fn set_markup_content(&self, node: NodeHandle, markup: &str) -> Result<(), TargetError>;

    /// Resolve the node an application is mounted into.
    fn resolve_container(&self, container: &Container) -> Result<NodeHandle, TargetError>;
}

impl<T: RenderTarget + ?Sized> RenderTarget for &T {
    fn create_node(&self, tag: &str) -> Result<NodeHandle, TargetError> {
        (**self).create_node(tag)
    }

    fn set_attribute(&self, node: NodeHandle, name: &str, value: &str) -> Result<(), TargetError> {
        (**self).set_attribute(node, name, value)
    }

    fn remove_attribute(&self, node: NodeHandle, name: &str) -> Result<(), TargetError> {
        (**self).remove_attribute(node, name)
    }

    fn add_event_listener(
        &self,
        node: NodeHandle,
        event_type: &str,
        listener: &Listener,
    ) -> Result<(), TargetError> {
        (**self).add_event_listener(node, event_type, listener)
    }

    fn remove_event_listener(
        &self,
        node: NodeHandle,
        event_type: &str,
        listener: &Listener,
    ) -> Result<(), TargetError> {
        (**self).remove_event_listener(node, event_type, listener)
    }

    fn append_child(&self, parent: NodeHandle, child: NodeHandle) -> Result<(), TargetError> {
        (**self).append_child(parent, child)
    }

    fn remove_child(&self, parent: NodeHandle, child: NodeHandle) -> Result<(), TargetError> {
        (**self).remove_child(parent, child)
    }

    fn parent(&self, node: NodeHandle) -> Result<Option<NodeHandle>, TargetError> {
        (**self).parent(node)
    }

    fn set_text_content(&self, node: NodeHandle, text: &str) -> Result<(), TargetError> {
        (**self).set_text_content(node, text)
    }

    fn set_markup_content(&self, node: NodeHandle, markup: &str) -> Result<(), TargetError> {
        (**self).set_markup_content(node, markup)
    }

    fn resolve_container(&self, container: &Container) -> Result<NodeHandle, TargetError> {
        (**self).resolve_container(container)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn container_conversions() {
        assert_eq!(Container::from("#app"), Container::Selector("#app".into()));
        assert_eq!(
            Container::from(NodeHandle::new(3)),
            Container::Node(NodeHandle::new(3))
        );
        assert_eq!(Container::from("#app").to_string(), "#app");
    }
}

//! Error types
//!
//! The error taxonomy is narrow. Render target failures
//! propagate out of mount and patch unchanged; nothing is retried or
//! recovered locally.

use thiserror::Error;

use crate::render::NodeHandle;

/// Failures reported by a render target backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TargetError {
    /// The backend refused to create a node for this tag.
    #[error("unknown tag: {0}")]
    UnknownTag(String),

    /// The handle does not refer to a live node.
    #[error("unknown node: {0:?}")]
    UnknownNode(NodeHandle),

    /// `remove_child` was called with a node that is not a child of `parent`.
    #[error("{child:?} is not a child of {parent:?}")]
    NotAChild {
        parent: NodeHandle,
        child: NodeHandle,
    },

    /// No node matched the selector passed to `resolve_container`.
    #[error("no node matches selector {0:?}")]
    ContainerNotFound(String),
}

/// Failures of the dependency tracking engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReactiveError {
    /// `watch_effect` was invoked while another effect was being tracked.
    #[error("watch_effect called while effect {active} is already being tracked")]
    NestedTracking { active: u64 },
}

/// Failures of the mount, patch, and application driver layers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error(transparent)]
    Target(#[from] TargetError),

    #[error(transparent)]
    Reactive(#[from] ReactiveError),

    /// A node that should already be mounted has no target node.
    #[error("<{tag}> has not been mounted")]
    Unmounted { tag: String },

    /// The node being replaced has no parent to mount its replacement into.
    #[error("<{tag}> is detached from the target tree")]
    Detached { tag: String },

    /// A render was triggered while the same application was already rendering.
    #[error("re-render requested while a render is in progress")]
    Reentrant,
}

/// Failures while loading a [`RenderConfig`](crate::config::RenderConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid render config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("ledger capacity must be at least 1")]
    ZeroCapacity,

    #[error("event prefix must not be empty")]
    EmptyEventPrefix,
}

/// Result type for mount, patch, and driver operations.
pub type Result<T, E = RenderError> = std::result::Result<T, E>;

//! Event listeners and their identity.
//!
//! Render functions rebuild every closure on every render, so closure
//! identity alone cannot tell the patch engine whether a listener really
//! changed. Each [`Listener`] therefore carries a [`ListenerId`]:
//!
//! - [`Listener::new`] assigns a fresh unique ID. Clones share it, so a
//!   listener built once and reused across renders is never re-attached.
//! - [`Listener::keyed`] uses a caller-supplied key. Listeners with equal
//!   keys are treated as the same handler, even when built separately.

use std::borrow::Cow;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Identity of an event listener.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ListenerId {
    /// Assigned by [`Listener::new`].
    Unique(u64),
    /// Supplied by the caller through [`Listener::keyed`].
    Keyed(Cow<'static, str>),
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unique(id) => write!(f, "#{id}"),
            Self::Keyed(key) => write!(f, "{key:?}"),
        }
    }
}

/// A zero-argument event handler with an identity.
#[derive(Clone)]
pub struct Listener {
    id: ListenerId,
    handler: Rc<dyn Fn()>,
}

impl Listener {
    /// Wrap a handler with a fresh identity.
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn() + 'static,
    {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self {
            id: ListenerId::Unique(COUNTER.fetch_add(1, Ordering::Relaxed)),
            handler: Rc::new(handler),
        }
    }

    /// Wrap a handler under a caller-chosen key.
    ///
    /// The caller promises that listeners sharing a key behave the same.
    /// Once a key has been attached, re-renders that produce it again leave
    /// the attached handler in place.
    pub fn keyed<K, F>(key: K, handler: F) -> Self
    where
        K: Into<Cow<'static, str>>,
        F: Fn() + 'static,
    {
        Self {
            id: ListenerId::Keyed(key.into()),
            handler: Rc::new(handler),
        }
    }

    /// Get the listener's identity.
    pub fn id(&self) -> &ListenerId {
        &self.id
    }

    /// Invoke the handler.
    pub fn call(&self) {
        (self.handler)();
    }
}

impl PartialEq for Listener {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Listener {}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Listener").field(&self.id).finish()
    }
}

/// Derive the event type from a prop key, e.g. `onClick` → `click`.
///
/// The prefix is matched case-insensitively and the remainder is
/// lowercased. Keys without the prefix are lowercased as a whole.
pub fn event_type(key: &str, prefix: &str) -> String {
    let name = match key.get(..prefix.len()) {
        Some(head) if head.eq_ignore_ascii_case(prefix) => &key[prefix.len()..],
        _ => key,
    };
    name.to_lowercase()
}

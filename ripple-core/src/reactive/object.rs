//! Reactive Wrapper
//!
//! A [`Reactive`] wraps a plain state object (a JSON value) and intercepts
//! property traffic:
//!
//! - reading property `k` subscribes the active effect to `(object, k)`;
//! - writing a different value to `k` stores it and re-runs every effect
//!   subscribed to `(object, k)`;
//! - writing an equal value does nothing and reports "no change".
//!
//! Values are compared by value equality, so writing `1` over `1` is a
//! no-op even if the two values were built separately.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::trace;

use super::runtime::{ObjectId, Runtime};

/// Wrap `raw` so that reads and writes of its properties are tracked.
///
/// `raw` is expected to be a JSON object. Any other value has no
/// properties: reads return `null` and writes report no change.
pub fn reactive(raw: Value) -> Reactive {
    Reactive::new(raw)
}

/// A tracked handle to a state object.
///
/// Cloning the handle shares the underlying object. The object's dependency
/// entries are released when the last handle is dropped.
#[derive(Clone)]
pub struct Reactive {
    inner: Rc<ReactiveInner>,
}

struct ReactiveInner {
    id: ObjectId,
    raw: RefCell<Value>,
}

impl Drop for ReactiveInner {
    fn drop(&mut self) {
        Runtime::release(self.id);
    }
}

impl Reactive {
    /// Wrap a raw state value.
    pub fn new(raw: Value) -> Self {
        Self {
            inner: Rc::new(ReactiveInner {
                id: ObjectId::new(),
                raw: RefCell::new(raw),
            }),
        }
    }

    /// Wrap any serializable value.
    pub fn from_serialize<T: Serialize>(raw: &T) -> Result<Self, serde_json::Error> {
        Ok(Self::new(serde_json::to_value(raw)?))
    }

    /// Get the registry identity of this object.
    pub fn id(&self) -> ObjectId {
        self.inner.id
    }

    /// Read property `key`, subscribing the active effect to it.
    ///
    /// Absent properties read as `null` and are still tracked, so an
    /// effect that reads a property before it exists re-runs once it is
    /// written.
    pub fn get(&self, key: &str) -> Value {
        Runtime::dep(self.inner.id, key).depend();
        self.get_untracked(key)
    }

    /// Read property `key` and deserialize it.
    ///
    /// Returns `None` when the property is absent or has a different shape.
    /// The read is tracked either way.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        serde_json::from_value(self.get(key)).ok()
    }

    /// Read property `key` without subscribing anything.
    pub fn get_untracked(&self, key: &str) -> Value {
        self.inner
            .raw
            .borrow()
            .get(key)
            .cloned()
            .unwrap_or(Value::Null)
    }

    /// Write property `key`.
    ///
    /// Returns `false`, without notifying, when `value` equals the stored
    /// value or when the wrapped value is not an object. Numbers compare by
    /// numeric value, so `1.0` over `1` is unchanged. Other values compare
    /// structurally. Otherwise stores
    /// the value, re-runs the subscribers of `key`, and returns `true`.
    pub fn set(&self, key: &str, value: impl Into<Value>) -> bool {
        let value = value.into();
        let dep = Runtime::dep(self.inner.id, key);

        {
            let mut raw = self.inner.raw.borrow_mut();
            let Some(object) = raw.as_object_mut() else {
                return false;
            };
            if object.get(key).is_some_and(|current| same_value(current, &value)) {
                trace!(object = ?self.inner.id, key, "write unchanged");
                return false;
            }
            object.insert(key.to_owned(), value);
        }

        trace!(object = ?self.inner.id, key, "write");
        dep.notify();
        true
    }

    /// Read property `key`, compute a new value from it, and write it back.
    ///
    /// Returns the result of the write, see [`Reactive::set`].
    pub fn update<F>(&self, key: &str, f: F) -> bool
    where
        F: FnOnce(&Value) -> Value,
    {
        let next = f(&self.get(key));
        self.set(key, next)
    }

    /// Clone the whole state without tracking.
    pub fn snapshot(&self) -> Value {
        self.inner.raw.borrow().clone()
    }

    /// Create a non-owning handle.
    ///
    /// Effects are stored in the registry, so an effect closure holding a
    /// strong handle keeps its own state object alive. Capture a weak
    /// handle instead when the object should be collectable.
    pub fn downgrade(&self) -> WeakReactive {
        WeakReactive {
            inner: Rc::downgrade(&self.inner),
        }
    }
}

/// Value equality used for change detection.
fn same_value(current: &Value, next: &Value) -> bool {
    match (current, next) {
        (Value::Number(a), Value::Number(b)) => {
            if let (Some(a), Some(b)) = (a.as_i64(), b.as_i64()) {
                a == b
            } else if let (Some(a), Some(b)) = (a.as_u64(), b.as_u64()) {
                a == b
            } else {
                a.as_f64() == b.as_f64()
            }
        }
        _ => current == next,
    }
}

/// Non-owning handle to a [`Reactive`], see [`Reactive::downgrade`].
#[derive(Clone)]
pub struct WeakReactive {
    inner: Weak<ReactiveInner>,
}

impl WeakReactive {
    /// Get a strong handle if the object is still alive.
    pub fn upgrade(&self) -> Option<Reactive> {
        self.inner.upgrade().map(|inner| Reactive { inner })
    }
}

impl fmt::Debug for Reactive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reactive")
            .field("id", &self.inner.id)
            .field("raw", &self.inner.raw.borrow())
            .finish()
    }
}

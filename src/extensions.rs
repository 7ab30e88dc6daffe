//! Type-keyed extension storage attached to each request.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;

/// Type-based extension storage, typically written by middleware.
/// Each type can have exactly one value, so a slot is addressed by its
/// Rust type rather than by a string key.
pub struct Params {
    inner: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl Params {
    /// Stores a value in the type-based storage.
    /// Any previous value of the same type will be replaced.
    pub fn set<T: 'static + Send + Sync>(&mut self, value: T) {
        self.inner.insert(TypeId::of::<T>(), Box::new(value));
    }

    /// Retrieves a reference to a value of type `T`.
    /// Returns `None` if no value of this type has been stored.
    pub fn get<T: 'static + Send + Sync>(&self) -> Option<&T> {
        self.inner
            .get(&TypeId::of::<T>())
            .and_then(|boxed| boxed.downcast_ref::<T>())
    }

    /// Removes a value of type `T` from the storage and returns it.
    pub fn take<T: 'static + Send + Sync>(&mut self) -> Option<T> {
        self.inner
            .remove(&TypeId::of::<T>())
            .and_then(|boxed| boxed.downcast::<T>().ok())
            .map(|boxed| *boxed)
    }
}

impl Default for Params {
    fn default() -> Self {
        Self {
            inner: HashMap::new(),
        }
    }
}

impl fmt::Debug for Params {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let types: Vec<_> = self.inner.keys().collect();
        f.debug_struct("Params").field("types", &types).finish()
    }
}

//! Per-object attribute store
//!
//! String keys map to values of any type. The store does no type checking on
//! insert; readers ask for the type they expect and get `None` when the key is
//! missing or holds something else.

use std::any::{Any, TypeId};
use std::collections::HashMap;

/// Key-unique mapping of attribute values
#[derive(Default)]
pub struct AttributeStore {
    values: HashMap<String, Box<dyn Any>>,
}

impl AttributeStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a value; returns whether a previous value was replaced
    pub fn set<T: Any>(&mut self, key: impl Into<String>, value: T) -> bool {
        self.values.insert(key.into(), Box::new(value)).is_some()
    }

    /// Get a value if it exists and has type `T`
    pub fn get<T: Any>(&self, key: &str) -> Option<&T> {
        self.values.get(key)?.downcast_ref::<T>()
    }

    /// Get a mutable value if it exists and has type `T`
    pub fn get_mut<T: Any>(&mut self, key: &str) -> Option<&mut T> {
        self.values.get_mut(key)?.downcast_mut::<T>()
    }

    /// Remove a value; returns it if it had type `T`
    pub fn remove<T: Any>(&mut self, key: &str) -> Option<T> {
        let value = self.values.remove(key)?;
        match value.downcast::<T>() {
            Ok(value) => Some(*value),
            Err(value) => {
                // wrong type requested: keep the value where it was
                self.values.insert(key.to_string(), value);
                None
            }
        }
    }

    /// Remove a value regardless of its type; returns whether the key existed
    pub fn discard(&mut self, key: &str) -> bool {
        self.values.remove(key).is_some()
    }

    /// Check whether a key exists
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Check whether a key exists and holds a `T`
    pub fn holds<T: Any>(&self, key: &str) -> bool {
        self.values
            .get(key)
            .is_some_and(|value| (**value).type_id() == TypeId::of::<T>())
    }

    /// Iterate over keys (unordered)
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Number of stored attributes
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check whether the store is empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Drop every attribute
    pub fn clear(&mut self) {
        self.values.clear();
    }
}

impl std::fmt::Debug for AttributeStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut keys: Vec<&str> = self.keys().collect();
        keys.sort_unstable();
        f.debug_struct("AttributeStore").field("keys", &keys).finish()
    }
}

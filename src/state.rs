use std::{
    any::type_name,
    collections::{btree_map, BTreeMap},
    ops::Index,
};

use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::{
    value::{from_value, to_value},
    StateError, Value,
};

#[cfg(test)]
mod tests;

/// Per-session key-value store that survives across execution passes.
///
/// Values are stored as [`Value`] so that any serializable Rust value can be kept,
/// inspected, and shown to the client.
/// A widget declared with a key reads and writes its value here.
#[derive(Default, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionState(BTreeMap<String, Value>);

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value stored under `key`, or `None` if the key was never set or has been deleted.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Returns the value stored under `key` converted to `T`.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StateError> {
        match self.0.get(key) {
            Some(value) => from_value(value)
                .map(Some)
                .map_err(|source| StateError::Decode {
                    key: key.to_owned(),
                    expected: type_name::<T>(),
                    source,
                }),
            None => Ok(None),
        }
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// Stores any serializable value under `key`.
    pub fn set_as<T: Serialize + ?Sized>(
        &mut self,
        key: impl Into<String>,
        value: &T,
    ) -> Result<(), StateError> {
        let key = key.into();
        match to_value(value) {
            Ok(value) => {
                self.0.insert(key, value);
                Ok(())
            }
            Err(source) => Err(StateError::Encode { key, source }),
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Removes `key` and returns the value it held.
    pub fn delete(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    /// Returns a snapshot of every key and value.
    ///
    /// Later writes to the store are not reflected in the snapshot.
    pub fn enumerate(&self) -> BTreeMap<String, Value> {
        self.0.clone()
    }

    /// Returns the value under `key`, inserting the result of `f` first if the key is absent.
    pub fn get_or_insert_with(
        &mut self,
        key: impl Into<String>,
        f: impl FnOnce() -> Value,
    ) -> &mut Value {
        self.0.entry(key.into()).or_insert_with(f)
    }

    /// Mutates the value under `key` in place.
    ///
    /// If the key is absent, `f` receives [`Value::Null`] and the result is stored.
    pub fn update<T>(&mut self, key: impl Into<String>, f: impl FnOnce(&mut Value) -> T) -> T {
        f(self.0.entry(key.into()).or_insert(Value::Null))
    }

    /// Adds `delta` to the integer stored under `key`, treating a missing or non-integer value as `0`.
    ///
    /// Returns the new value.
    pub fn increment(&mut self, key: impl Into<String>, delta: i64) -> i64 {
        self.update(key, |value| {
            let n = value.as_i64().unwrap_or(0) + delta;
            *value = Value::from(n);
            n
        })
    }

    /// Appends `item` to the array stored under `key`, creating the array if necessary.
    ///
    /// A non-array value under `key` is replaced.
    pub fn push(&mut self, key: impl Into<String>, item: impl Into<Value>) {
        self.update(key, |value| match value {
            Value::Array(items) => items.push(item.into()),
            other => *other = Value::Array(vec![item.into()]),
        })
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(|k| k.as_str())
    }
    pub fn iter(&self) -> btree_map::Iter<'_, String, Value> {
        self.0.iter()
    }
    pub fn len(&self) -> usize {
        self.0.len()
    }
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
    pub fn clear(&mut self) {
        self.0.clear()
    }
}

impl Index<&str> for SessionState {
    type Output = Value;

    /// Returns [`Value::Null`] for missing keys, like `serde_json::Value` indexing.
    fn index(&self, key: &str) -> &Value {
        static NULL: Value = Value::Null;
        self.0.get(key).unwrap_or(&NULL)
    }
}

impl<'a> IntoIterator for &'a SessionState {
    type Item = (&'a String, &'a Value);
    type IntoIter = btree_map::Iter<'a, String, Value>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

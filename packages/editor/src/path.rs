//! # Paths
//!
//! A [`Path`] addresses a position inside a JSON value as an ordered list of
//! [`Key`]s. Object properties are addressed by name, array elements by
//! index. The empty path is the root.
//!
//! Paths print as their keys joined with `.` (`list.2.name`) and serialize
//! as JSON arrays (`["list", 2, "name"]`).

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::mutations::MutationError;

/// One step in a [`Path`]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Key {
    /// Array index
    Index(usize),
    /// Object property
    Name(String),
}

impl Key {
    pub fn as_index(&self) -> Option<usize> {
        match self {
            Key::Index(index) => Some(*index),
            Key::Name(_) => None,
        }
    }

    /// The property name this key addresses when applied to an object.
    /// Numeric keys address their decimal form.
    pub fn to_property(&self) -> String {
        match self {
            Key::Index(index) => index.to_string(),
            Key::Name(name) => name.clone(),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Index(index) => write!(f, "{}", index),
            Key::Name(name) => f.write_str(name),
        }
    }
}

impl From<usize> for Key {
    fn from(index: usize) -> Self {
        Key::Index(index)
    }
}

impl From<&str> for Key {
    fn from(name: &str) -> Self {
        Key::Name(name.to_string())
    }
}

impl From<String> for Key {
    fn from(name: String) -> Self {
        Key::Name(name)
    }
}

/// Ordered sequence of keys from the root to a node
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Path(Vec<Key>);

impl Path {
    /// The empty path, addressing the root value
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn keys(&self) -> &[Key] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn last(&self) -> Option<&Key> {
        self.0.last()
    }

    /// Path of the containing collection. The root's parent is the root.
    pub fn parent(&self) -> Path {
        let end = self.0.len().saturating_sub(1);
        Self(self.0[..end].to_vec())
    }

    /// Path of a direct child
    pub fn child(&self, key: impl Into<Key>) -> Path {
        let mut keys = self.0.clone();
        keys.push(key.into());
        Self(keys)
    }

    /// True when `prefix` addresses this node or one of its ancestors
    pub fn starts_with(&self, prefix: &Path) -> bool {
        self.0.starts_with(&prefix.0)
    }

    pub(crate) fn replace_key(&mut self, position: usize, key: Key) {
        if let Some(slot) = self.0.get_mut(position) {
            *slot = key;
        }
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, key) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{}", key)?;
        }
        Ok(())
    }
}

/// Parses `a.b.0` style paths. All-digit segments become indices; the empty
/// string is the root.
impl FromStr for Path {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Ok(Path::root());
        }

        let keys = s
            .split('.')
            .map(|segment| match segment.parse::<usize>() {
                Ok(index) if segment.bytes().all(|b| b.is_ascii_digit()) => Key::Index(index),
                _ => Key::Name(segment.to_string()),
            })
            .collect();

        Ok(Self(keys))
    }
}

impl From<&str> for Path {
    fn from(s: &str) -> Self {
        match s.parse() {
            Ok(path) => path,
            Err(never) => match never {},
        }
    }
}

impl From<Vec<Key>> for Path {
    fn from(keys: Vec<Key>) -> Self {
        Self(keys)
    }
}

impl FromIterator<Key> for Path {
    fn from_iter<I: IntoIterator<Item = Key>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Look up the direct child of `value` addressed by `key`
pub(crate) fn step<'a>(value: &'a Value, key: &Key) -> Option<&'a Value> {
    match (value, key) {
        (Value::Object(map), key) => map.get(&key.to_property()),
        (Value::Array(items), Key::Index(index)) => items.get(*index),
        _ => None,
    }
}

/// Resolve `path` against `root`.
///
/// Fails with [`MutationError::NotFound`] when any key is missing, out of
/// bounds, or applied to a scalar.
pub fn resolve<'a>(root: &'a Value, path: &Path) -> Result<&'a Value, MutationError> {
    let mut current = root;

    for (depth, key) in path.keys().iter().enumerate() {
        current = step(current, key)
            .ok_or_else(|| MutationError::NotFound(Path(path.0[..=depth].to_vec())))?;
    }

    Ok(current)
}

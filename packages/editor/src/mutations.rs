//! # Tree Mutations
//!
//! Path-addressed operations on a JSON tree.
//!
//! ## Design Principles
//!
//! 1. **Pure**: the input tree is never modified; every container on the
//!    path to the edited node is rebuilt, so the original root can always be
//!    handed back on rollback
//! 2. **Validated**: malformed paths fail synchronously with a [`MutationError`]
//! 3. **Descriptive**: every mutation reports the prior and installed values
//!
//! ## Mutation Semantics
//!
//! ### Update
//! - Replaces the value at the path, appending when the final key is new
//! - The empty path replaces the whole tree verbatim
//!
//! ### Delete
//! - Removes an object key, or an array element shifting later indices down
//! - The root cannot be deleted
//!
//! ### Add
//! - Like update, but never reports a prior value
//! - [`Placement`] controls ordering: insert-and-shift for arrays,
//!   before/after an anchor key for objects
//!
//! ### Move
//! - Delete at source, then add at destination, as one logical edit
//!   (see [`crate::moves`])

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::moves::{compose_move, DropPosition};
use crate::path::{resolve, step, Key, Path};

/// Mutation request (intent-preserving operations)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Mutation {
    /// Replace the value at a path
    Update { path: Path, value: Value },

    /// Remove the value at a path
    Delete { path: Path },

    /// Install a new value, optionally positioned relative to its siblings
    Add {
        path: Path,
        value: Value,
        #[serde(default)]
        placement: Placement,
    },

    /// Relocate a value next to the destination node
    Move {
        source: Path,
        dest: Path,
        position: DropPosition,
    },
}

/// Low-level operation understood by [`mutate`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Update,
    Delete,
    Add(Placement),
}

/// Ordering hint for [`Operation::Add`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Placement {
    /// Overwrite the key, or append when it is new
    #[default]
    Assign,

    /// Array targets: insert at the index, shifting later elements right
    Insert,

    /// Object targets: place the new key before this sibling
    InsertBefore(String),

    /// Object targets: place the new key after this sibling
    InsertAfter(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MutationError {
    #[error("Path not found: {0}")]
    NotFound(Path),

    #[error("Index {index} out of range for array of length {len} at {path}")]
    IndexOutOfRange { path: Path, index: usize, len: usize },

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Key {key} already exists at {path}")]
    KeyCollision { path: Path, key: String },
}

/// Outcome of a mutation: the tree before and after, and the value before
/// and after at the edited path
#[derive(Debug, Clone, PartialEq)]
pub struct MutationResult {
    /// The tree the mutation was computed from
    pub current_data: Value,

    /// The tree with the mutation applied
    pub new_data: Value,

    /// Value previously at the path (absent for adds and new keys)
    pub current_value: Option<Value>,

    /// Value installed at the path (absent for deletes)
    pub new_value: Option<Value>,
}

impl Mutation {
    /// Compute the tree that results from applying this mutation to `root`
    pub fn apply(&self, root: &Value) -> Result<MutationResult, MutationError> {
        match self {
            Mutation::Update { path, value } => mutate(root, path, value.clone(), &Operation::Update),

            Mutation::Delete { path } => mutate(root, path, Value::Null, &Operation::Delete),

            Mutation::Add { path, value, placement } => {
                mutate(root, path, value.clone(), &Operation::Add(placement.clone()))
            }

            Mutation::Move { source, dest, position } => compose_move(root, source, dest, *position),
        }
    }

    /// The path reported to handlers (the destination, for moves)
    pub fn path(&self) -> &Path {
        match self {
            Mutation::Update { path, .. } | Mutation::Delete { path } | Mutation::Add { path, .. } => path,
            Mutation::Move { dest, .. } => dest,
        }
    }

    /// Last key of [`Mutation::path`]
    pub fn name(&self) -> Option<Key> {
        self.path().last().cloned()
    }

    /// Get a debug name for this mutation
    pub fn kind(&self) -> &'static str {
        match self {
            Mutation::Update { .. } => "update",
            Mutation::Delete { .. } => "delete",
            Mutation::Add { .. } => "add",
            Mutation::Move { .. } => "move",
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Mutation::Move { source, dest, .. } => format!("move {} to {}", source, dest),
            other => format!("{} {}", other.kind(), other.path()),
        }
    }
}

/// Apply `op` at `path`, returning a fresh tree.
///
/// The zero-length path is special-cased: update and add hand back
/// `value` as the new tree and `root` as the prior value.
pub fn mutate(
    root: &Value,
    path: &Path,
    value: Value,
    op: &Operation,
) -> Result<MutationResult, MutationError> {
    if path.is_empty() {
        if *op == Operation::Delete {
            return Err(MutationError::InvalidOperation(
                "cannot delete the root value".to_string(),
            ));
        }

        return Ok(MutationResult {
            current_data: root.clone(),
            new_data: value.clone(),
            current_value: Some(root.clone()),
            new_value: Some(value),
        });
    }

    let current_value = match op {
        Operation::Add(_) => None,
        Operation::Update => resolve(root, path).ok().cloned(),
        Operation::Delete => Some(resolve(root, path)?.clone()),
    };

    let new_value = match op {
        Operation::Delete => None,
        _ => Some(value.clone()),
    };

    let new_data = rebuild(root, path, 0, value, op)?;

    Ok(MutationResult {
        current_data: root.clone(),
        new_data,
        current_value,
        new_value,
    })
}

/// Rebuild `node` (found at `path[..depth]`) with the edit applied below it
fn rebuild(
    node: &Value,
    path: &Path,
    depth: usize,
    value: Value,
    op: &Operation,
) -> Result<Value, MutationError> {
    let keys = path.keys();
    let key = &keys[depth];

    if depth + 1 == keys.len() {
        return apply_leaf(node, path, key, value, op);
    }

    let child = step(node, key)
        .ok_or_else(|| MutationError::NotFound(keys[..=depth].iter().cloned().collect()))?;
    let new_child = rebuild(child, path, depth + 1, value, op)?;

    Ok(replace_child(node, key, new_child))
}

/// Copy of `container` with the child at `key` swapped out
fn replace_child(container: &Value, key: &Key, new_child: Value) -> Value {
    match container {
        Value::Object(map) => {
            let property = key.to_property();
            let mut slot = Some(new_child);
            let rebuilt = map
                .iter()
                .map(|(k, v)| {
                    if *k == property {
                        (k.clone(), slot.take().unwrap_or(Value::Null))
                    } else {
                        (k.clone(), v.clone())
                    }
                })
                .collect();
            Value::Object(rebuilt)
        }
        Value::Array(items) => {
            let mut rebuilt = items.clone();
            if let Some(index) = key.as_index() {
                if let Some(slot) = rebuilt.get_mut(index) {
                    *slot = new_child;
                }
            }
            Value::Array(rebuilt)
        }
        scalar => scalar.clone(),
    }
}

fn apply_leaf(
    container: &Value,
    path: &Path,
    key: &Key,
    value: Value,
    op: &Operation,
) -> Result<Value, MutationError> {
    match container {
        Value::Object(map) => apply_to_object(map, path, key.to_property(), value, op),
        Value::Array(items) => {
            let index = key.as_index().ok_or_else(|| {
                MutationError::InvalidOperation(format!(
                    "array at {} cannot be addressed by key \"{}\"",
                    path.parent(),
                    key
                ))
            })?;
            apply_to_array(items, path, index, value, op)
        }
        _ => Err(MutationError::NotFound(path.clone())),
    }
}

fn apply_to_object(
    map: &Map<String, Value>,
    path: &Path,
    property: String,
    value: Value,
    op: &Operation,
) -> Result<Value, MutationError> {
    let mut rebuilt = Map::new();

    match op {
        Operation::Delete => {
            if !map.contains_key(&property) {
                return Err(MutationError::NotFound(path.clone()));
            }
            for (k, v) in map.iter().filter(|(k, _)| **k != property) {
                rebuilt.insert(k.clone(), v.clone());
            }
        }

        Operation::Update | Operation::Add(Placement::Assign) => {
            // Existing keys keep their position; new keys are appended
            rebuilt = map.clone();
            rebuilt.insert(property, value);
        }

        Operation::Add(Placement::InsertBefore(anchor)) | Operation::Add(Placement::InsertAfter(anchor)) => {
            let before = matches!(op, Operation::Add(Placement::InsertBefore(_)));
            let mut pending = Some(value);

            for (k, v) in map.iter().filter(|(k, _)| **k != property) {
                if before && k == anchor {
                    if let Some(value) = pending.take() {
                        rebuilt.insert(property.clone(), value);
                    }
                }
                rebuilt.insert(k.clone(), v.clone());
                if !before && k == anchor {
                    if let Some(value) = pending.take() {
                        rebuilt.insert(property.clone(), value);
                    }
                }
            }

            // Missing anchor: append
            if let Some(value) = pending {
                rebuilt.insert(property, value);
            }
        }

        Operation::Add(Placement::Insert) => {
            return Err(MutationError::InvalidOperation(format!(
                "positional insert requires an array at {}",
                path.parent()
            )));
        }
    }

    Ok(Value::Object(rebuilt))
}

fn apply_to_array(
    items: &[Value],
    path: &Path,
    index: usize,
    value: Value,
    op: &Operation,
) -> Result<Value, MutationError> {
    let len = items.len();
    let mut rebuilt = items.to_vec();

    match op {
        Operation::Delete => {
            if index >= len {
                return Err(MutationError::NotFound(path.clone()));
            }
            rebuilt.remove(index);
        }

        Operation::Update | Operation::Add(Placement::Assign) => {
            if index < len {
                rebuilt[index] = value;
            } else if index == len {
                rebuilt.push(value);
            } else {
                return Err(MutationError::IndexOutOfRange {
                    path: path.clone(),
                    index,
                    len,
                });
            }
        }

        Operation::Add(Placement::Insert) => {
            if index > len {
                return Err(MutationError::IndexOutOfRange {
                    path: path.clone(),
                    index,
                    len,
                });
            }
            rebuilt.insert(index, value);
        }

        Operation::Add(Placement::InsertBefore(_)) | Operation::Add(Placement::InsertAfter(_)) => {
            return Err(MutationError::InvalidOperation(format!(
                "anchored insert requires an object at {}",
                path.parent()
            )));
        }
    }

    Ok(Value::Array(rebuilt))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_mutation_serialization() {
        let mutation = Mutation::Add {
            path: Path::from("list.1"),
            value: json!("b"),
            placement: Placement::Insert,
        };

        let json = serde_json::to_string(&mutation).unwrap();
        let deserialized: Mutation = serde_json::from_str(&json).unwrap();

        assert_eq!(mutation, deserialized);
    }

    #[test]
    fn test_request_shape() {
        let request = json!({ "kind": "update", "path": ["a", 0], "value": 5 });
        let mutation: Mutation = serde_json::from_value(request).unwrap();

        assert_eq!(
            mutation,
            Mutation::Update {
                path: Path::from("a.0"),
                value: json!(5),
            }
        );
        assert_eq!(mutation.name(), Some(Key::Index(0)));
    }

    #[test]
    fn test_update_does_not_touch_input() {
        let data = json!({ "a": { "b": 1 }, "c": [1, 2] });
        let result = mutate(&data, &Path::from("a.b"), json!(2), &Operation::Update).unwrap();

        assert_eq!(result.new_data, json!({ "a": { "b": 2 }, "c": [1, 2] }));
        assert_eq!(result.current_value, Some(json!(1)));
        assert_eq!(result.new_value, Some(json!(2)));
        assert_eq!(data, json!({ "a": { "b": 1 }, "c": [1, 2] }));
    }

    #[test]
    fn test_update_keeps_key_order() {
        let data = json!({ "x": 1, "y": 2, "z": 3 });
        let result = mutate(&data, &Path::from("y"), json!(20), &Operation::Update).unwrap();

        let keys: Vec<_> = result.new_data.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["x", "y", "z"]);
    }

    #[test]
    fn test_root_update_is_verbatim() {
        let data = json!([1, 2]);
        let result = mutate(&data, &Path::root(), json!("new"), &Operation::Update).unwrap();

        assert_eq!(result.current_data, data);
        assert_eq!(result.new_data, json!("new"));
        assert_eq!(result.current_value, Some(data));
        assert_eq!(result.new_value, Some(json!("new")));
    }

    #[test]
    fn test_delete_root_is_invalid() {
        let data = json!({});
        assert!(matches!(
            mutate(&data, &Path::root(), Value::Null, &Operation::Delete),
            Err(MutationError::InvalidOperation(_))
        ));
    }

    #[test]
    fn test_delete_shifts_array() {
        let data = json!(["a", "b", "c"]);
        let result = mutate(&data, &Path::from("1"), Value::Null, &Operation::Delete).unwrap();

        assert_eq!(result.new_data, json!(["a", "c"]));
        assert_eq!(result.current_value, Some(json!("b")));
        assert_eq!(result.new_value, None);
    }

    #[test]
    fn test_delete_missing_key() {
        let data = json!({ "a": 1 });
        assert_eq!(
            mutate(&data, &Path::from("b"), Value::Null, &Operation::Delete),
            Err(MutationError::NotFound(Path::from("b")))
        );
    }

    #[test]
    fn test_add_has_no_prior_value() {
        let data = json!({ "a": 1 });
        let result = mutate(&data, &Path::from("b"), json!(2), &Operation::Add(Placement::Assign)).unwrap();

        assert_eq!(result.new_data, json!({ "a": 1, "b": 2 }));
        assert_eq!(result.current_value, None);
    }

    #[test]
    fn test_array_extends_by_one() {
        let data = json!([1, 2]);

        let extended = mutate(&data, &Path::from("2"), json!(3), &Operation::Update).unwrap();
        assert_eq!(extended.new_data, json!([1, 2, 3]));
        assert_eq!(extended.current_value, None);

        assert_eq!(
            mutate(&data, &Path::from("4"), json!(3), &Operation::Update),
            Err(MutationError::IndexOutOfRange {
                path: Path::from("4"),
                index: 4,
                len: 2,
            })
        );
    }

    #[test]
    fn test_anchored_insert() {
        let data = json!({ "a": 1, "c": 3 });

        let before = mutate(
            &data,
            &Path::from("b"),
            json!(2),
            &Operation::Add(Placement::InsertBefore("c".to_string())),
        )
        .unwrap();
        let keys: Vec<_> = before.new_data.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["a", "b", "c"]);

        let after = mutate(
            &data,
            &Path::from("b"),
            json!(2),
            &Operation::Add(Placement::InsertAfter("c".to_string())),
        )
        .unwrap();
        let keys: Vec<_> = after.new_data.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["a", "c", "b"]);
    }

    #[test]
    fn test_anchored_insert_missing_anchor_appends() {
        let data = json!({ "a": 1 });
        let result = mutate(
            &data,
            &Path::from("b"),
            json!(2),
            &Operation::Add(Placement::InsertBefore("zzz".to_string())),
        )
        .unwrap();

        let keys: Vec<_> = result.new_data.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["a", "b"]);
    }

    #[test]
    fn test_placement_must_match_container() {
        let object = json!({ "a": 1 });
        let array = json!([1]);

        assert!(matches!(
            mutate(&object, &Path::from("b"), json!(2), &Operation::Add(Placement::Insert)),
            Err(MutationError::InvalidOperation(_))
        ));
        assert!(matches!(
            mutate(
                &array,
                &Path::from("0"),
                json!(2),
                &Operation::Add(Placement::InsertAfter("a".to_string()))
            ),
            Err(MutationError::InvalidOperation(_))
        ));
        assert!(matches!(
            mutate(&array, &Path::from("name"), json!(2), &Operation::Update),
            Err(MutationError::InvalidOperation(_))
        ));
    }

    #[test]
    fn test_missing_intermediate() {
        let data = json!({ "a": {} });
        assert_eq!(
            mutate(&data, &Path::from("a.b.c"), json!(1), &Operation::Update),
            Err(MutationError::NotFound(Path::from("a.b")))
        );
    }
}

//! # Move Composition
//!
//! A move is a delete at the source followed by an add at the destination,
//! reported as a single [`MutationResult`] so handlers see one edit.
//!
//! When the source and destination share an array, the delete has already
//! shifted every later element down by one, so the insert index is
//! corrected before the add runs.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::mutations::{mutate, MutationError, MutationResult, Operation, Placement};
use crate::path::{resolve, Key, Path};

/// Prefix for keys synthesized when an array element lands in an object
pub const ARRAY_KEY_PREFIX: &str = "arr_";

/// Where a dragged node is dropped relative to the destination node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DropPosition {
    Above,
    Below,
}

/// Move the value at `source` next to `dest`.
///
/// The returned result describes the whole move: `current_data` is `root`,
/// `current_value` is the moved value and `new_value` is what was installed.
pub fn compose_move(
    root: &Value,
    source: &Path,
    dest: &Path,
    position: DropPosition,
) -> Result<MutationResult, MutationError> {
    let (original_key, anchor) = match (source.last(), dest.last()) {
        (Some(original_key), Some(anchor)) => (original_key, anchor),
        _ => {
            return Err(MutationError::InvalidOperation(
                "move requires non-empty source and destination paths".to_string(),
            ))
        }
    };

    // `o.0` parses to an index even when `o` is an object
    let original_key = &key_for(resolve(root, &source.parent())?, original_key);
    let anchor = &key_for(resolve(root, &dest.parent())?, anchor);

    if dest.starts_with(source) {
        return Err(MutationError::InvalidOperation(format!(
            "cannot move {} into itself",
            source
        )));
    }

    let removed = mutate(root, source, Value::Null, &Operation::Delete)?;
    let moved = removed.current_value.clone().unwrap_or(Value::Null);

    let source_parent = source.parent();
    let mut target_path = dest.parent();

    let mut target_key = match anchor {
        Key::Index(index) => Key::Index(match position {
            DropPosition::Above => *index,
            DropPosition::Below => index + 1,
        }),
        Key::Name(_) => match original_key {
            Key::Index(index) => Key::Name(format!("{}{}", ARRAY_KEY_PREFIX, index)),
            Key::Name(name) => Key::Name(name.clone()),
        },
    };

    if let Key::Index(original) = original_key {
        if source_parent == target_path {
            if let Key::Index(target) = &mut target_key {
                if *original < *target {
                    *target -= 1;
                }
            }
        } else if target_path.len() > source_parent.len() && target_path.starts_with(&source_parent) {
            // Destination lives under a later sibling of the source
            let depth = source_parent.len();
            if let Some(Key::Index(branch)) = target_path.keys().get(depth).cloned() {
                if *original < branch {
                    target_path.replace_key(depth, Key::Index(branch - 1));
                }
            }
        }
    }

    let placement = match (&target_key, anchor) {
        (Key::Index(_), _) => Placement::Insert,
        (Key::Name(_), anchor) => match position {
            DropPosition::Above => Placement::InsertBefore(anchor.to_property()),
            DropPosition::Below => Placement::InsertAfter(anchor.to_property()),
        },
    };

    let target = target_path.child(target_key.clone());

    if let Key::Name(name) = &target_key {
        if resolve(&removed.new_data, &target).is_ok() {
            return Err(MutationError::KeyCollision {
                path: target_path,
                key: name.clone(),
            });
        }
    }

    let added = mutate(&removed.new_data, &target, moved.clone(), &Operation::Add(placement))?;

    Ok(MutationResult {
        current_data: removed.current_data,
        new_data: added.new_data,
        current_value: Some(moved),
        new_value: added.new_value,
    })
}

/// `key` as the container at its position reads it: object keys are always
/// names, array positions stay indices
fn key_for(container: &Value, key: &Key) -> Key {
    match container {
        Value::Object(_) => Key::Name(key.to_property()),
        _ => key.clone(),
    }
}

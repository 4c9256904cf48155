//! Node descriptors: read-only views of one position in the tree, handed to
//! filter, search and custom-node predicates.

use serde_json::Value;

use crate::mutations::MutationError;
use crate::path::{resolve, step, Key, Path};

/// Metadata for a tree position, built fresh for every evaluation
#[derive(Debug, Clone)]
pub struct NodeData<'a> {
    /// Last path segment, or the root name at the root
    pub key: Key,
    pub path: Path,
    /// Nesting depth (path length)
    pub level: usize,
    pub value: &'a Value,
    /// Key count for objects, length for arrays, 1 for scalars
    pub size: usize,
    /// The containing collection (none at the root)
    pub parent_data: Option<&'a Value>,
    pub full_data: &'a Value,
}

impl<'a> NodeData<'a> {
    /// Descriptor for the root value
    pub fn root(full_data: &'a Value, root_name: &str) -> Self {
        Self {
            key: Key::from(root_name),
            path: Path::root(),
            level: 0,
            value: full_data,
            size: size_of(full_data),
            parent_data: None,
            full_data,
        }
    }

    /// Descriptor for the node at `path`
    pub fn at(full_data: &'a Value, path: &Path, root_name: &str) -> Result<Self, MutationError> {
        let Some(key) = path.last() else {
            return Ok(Self::root(full_data, root_name));
        };

        let parent = resolve(full_data, &path.parent())?;
        let value = step(parent, key).ok_or_else(|| MutationError::NotFound(path.clone()))?;

        Ok(Self {
            key: key.clone(),
            path: path.clone(),
            level: path.len(),
            value,
            size: size_of(value),
            parent_data: Some(parent),
            full_data,
        })
    }

    /// Descriptors for the direct children of this node, in display order
    pub fn children(&self) -> Vec<NodeData<'a>> {
        let value: &'a Value = self.value;
        match value {
            Value::Object(map) => map
                .iter()
                .map(|(k, v)| self.child(Key::Name(k.clone()), v))
                .collect(),
            Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(i, v)| self.child(Key::Index(i), v))
                .collect(),
            _ => Vec::new(),
        }
    }

    fn child(&self, key: Key, value: &'a Value) -> NodeData<'a> {
        NodeData {
            path: self.path.child(key.clone()),
            key,
            level: self.level + 1,
            value,
            size: size_of(value),
            parent_data: Some(self.value),
            full_data: self.full_data,
        }
    }

    pub fn is_collection(&self) -> bool {
        self.value.is_object() || self.value.is_array()
    }
}

/// Logical size of a value
pub fn size_of(value: &Value) -> usize {
    match value {
        Value::Object(map) => map.len(),
        Value::Array(items) => items.len(),
        _ => 1,
    }
}

/// Visit every node depth-first, parents before children
pub fn walk<'a>(full_data: &'a Value, root_name: &str, visit: &mut dyn FnMut(&NodeData<'a>)) {
    fn visit_node<'a>(node: &NodeData<'a>, visit: &mut dyn FnMut(&NodeData<'a>)) {
        visit(node);
        for child in node.children() {
            visit_node(&child, visit);
        }
    }

    visit_node(&NodeData::root(full_data, root_name), visit);
}

//! # Filter Policies
//!
//! Collapse-by-default and the edit/delete/add/drag restrictions all share
//! one shape: a policy that is either a constant, a depth threshold, or a
//! predicate over [`NodeData`]. [`FilterPolicy::normalize`] turns any of them
//! into a [`NodeFilter`].

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::node::NodeData;
use crate::search::SearchMatcher;

pub type FilterFn = Arc<dyn Fn(&NodeData<'_>) -> bool + Send + Sync>;

/// Policy input for collapse and restriction settings
#[derive(Clone)]
pub enum FilterPolicy {
    /// Same answer for every node
    Bool(bool),
    /// True for nodes at this level or deeper
    Depth(usize),
    Predicate(FilterFn),
}

impl FilterPolicy {
    pub fn predicate(f: impl Fn(&NodeData<'_>) -> bool + Send + Sync + 'static) -> Self {
        FilterPolicy::Predicate(Arc::new(f))
    }

    pub fn normalize(&self) -> NodeFilter {
        match self {
            FilterPolicy::Bool(value) => {
                let value = *value;
                NodeFilter(Arc::new(move |_: &NodeData<'_>| value))
            }
            FilterPolicy::Depth(depth) => {
                let depth = *depth;
                NodeFilter(Arc::new(move |node: &NodeData<'_>| node.level >= depth))
            }
            FilterPolicy::Predicate(f) => NodeFilter(f.clone()),
        }
    }
}

impl fmt::Debug for FilterPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterPolicy::Bool(value) => write!(f, "Bool({})", value),
            FilterPolicy::Depth(depth) => write!(f, "Depth({})", depth),
            FilterPolicy::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

impl From<bool> for FilterPolicy {
    fn from(value: bool) -> Self {
        FilterPolicy::Bool(value)
    }
}

impl From<usize> for FilterPolicy {
    fn from(depth: usize) -> Self {
        FilterPolicy::Depth(depth)
    }
}

#[derive(Deserialize)]
#[serde(untagged, expecting = "a boolean or a non-negative integer")]
enum PolicyRepr {
    Bool(bool),
    Depth(usize),
}

impl<'de> Deserialize<'de> for FilterPolicy {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match PolicyRepr::deserialize(deserializer)? {
            PolicyRepr::Bool(value) => FilterPolicy::Bool(value),
            PolicyRepr::Depth(depth) => FilterPolicy::Depth(depth),
        })
    }
}

impl Serialize for FilterPolicy {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FilterPolicy::Bool(value) => serializer.serialize_bool(*value),
            FilterPolicy::Depth(depth) => serializer.serialize_u64(*depth as u64),
            FilterPolicy::Predicate(_) => Err(serde::ser::Error::custom(
                "predicate policies cannot be serialized",
            )),
        }
    }
}

/// Normalized policy: a predicate over node descriptors
#[derive(Clone)]
pub struct NodeFilter(FilterFn);

impl NodeFilter {
    pub fn matches(&self, node: &NodeData<'_>) -> bool {
        (*self.0)(node)
    }
}

impl fmt::Debug for NodeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("NodeFilter(..)")
    }
}

/// Per-node actions that can be restricted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Restriction {
    Edit,
    Delete,
    Add,
    Drag,
}

impl fmt::Display for Restriction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Restriction::Edit => "edit",
            Restriction::Delete => "delete",
            Restriction::Add => "add",
            Restriction::Drag => "drag",
        })
    }
}

/// Runtime form of the editor's policy settings
#[derive(Debug, Clone)]
pub struct Policies {
    pub collapse: NodeFilter,
    pub restrict_edit: NodeFilter,
    pub restrict_delete: NodeFilter,
    pub restrict_add: NodeFilter,
    pub restrict_drag: NodeFilter,
    pub search: Option<SearchMatcher>,
}

impl Policies {
    pub fn restriction(&self, kind: Restriction) -> &NodeFilter {
        match kind {
            Restriction::Edit => &self.restrict_edit,
            Restriction::Delete => &self.restrict_delete,
            Restriction::Add => &self.restrict_add,
            Restriction::Drag => &self.restrict_drag,
        }
    }

    pub fn is_restricted(&self, kind: Restriction, node: &NodeData<'_>) -> bool {
        self.restriction(kind).matches(node)
    }

    /// Replace one restriction policy
    pub fn restrict(mut self, kind: Restriction, policy: impl Into<FilterPolicy>) -> Self {
        let filter = policy.into().normalize();
        match kind {
            Restriction::Edit => self.restrict_edit = filter,
            Restriction::Delete => self.restrict_delete = filter,
            Restriction::Add => self.restrict_add = filter,
            Restriction::Drag => self.restrict_drag = filter,
        }
        self
    }

    pub fn collapse(mut self, policy: impl Into<FilterPolicy>) -> Self {
        self.collapse = policy.into().normalize();
        self
    }
}

impl Default for Policies {
    fn default() -> Self {
        crate::config::EditorConfig::default().policies()
    }
}

//! # Search Matching
//!
//! Normalizes a [`SearchMode`] into a single predicate over a node and the
//! query text. The key and value matchers themselves are replaceable; the
//! defaults do case-insensitive substring matching.

use std::fmt;
use std::sync::Arc;

use serde::{de, Deserialize, Deserializer};
use serde_json::Value;

use crate::node::{walk, NodeData};
use crate::path::Path;

pub type SearchFn = Arc<dyn Fn(&NodeData<'_>, &str) -> bool + Send + Sync>;

/// What a search query is matched against
#[derive(Clone)]
pub enum SearchMode {
    Key,
    Value,
    /// Key or value
    All,
    Custom(SearchFn),
}

impl SearchMode {
    pub fn custom(f: impl Fn(&NodeData<'_>, &str) -> bool + Send + Sync + 'static) -> Self {
        SearchMode::Custom(Arc::new(f))
    }
}

impl fmt::Debug for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchMode::Key => f.write_str("Key"),
            SearchMode::Value => f.write_str("Value"),
            SearchMode::All => f.write_str("All"),
            SearchMode::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl<'de> Deserialize<'de> for SearchMode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mode = String::deserialize(deserializer)?;
        match mode.as_str() {
            "key" => Ok(SearchMode::Key),
            "value" => Ok(SearchMode::Value),
            "all" => Ok(SearchMode::All),
            other => Err(de::Error::unknown_variant(other, &["key", "value", "all"])),
        }
    }
}

/// Normalized search predicate
#[derive(Clone)]
pub struct SearchMatcher {
    predicate: SearchFn,
}

impl SearchMatcher {
    /// Matcher using the default key and value matchers
    pub fn new(mode: &SearchMode) -> Self {
        Self::with_matchers(mode, Arc::new(match_node_key), Arc::new(match_node_value))
    }

    /// Matcher combining caller-supplied key and value matchers
    pub fn with_matchers(mode: &SearchMode, key_matcher: SearchFn, value_matcher: SearchFn) -> Self {
        let predicate: SearchFn = match mode {
            SearchMode::Key => key_matcher,
            SearchMode::Value => value_matcher,
            SearchMode::All => Arc::new(move |node: &NodeData<'_>, query: &str| {
                (*value_matcher)(node, query) || (*key_matcher)(node, query)
            }),
            SearchMode::Custom(f) => f.clone(),
        };

        Self { predicate }
    }

    pub fn matches(&self, node: &NodeData<'_>, query: &str) -> bool {
        (*self.predicate)(node, query)
    }

    /// Paths of every node matching `query`, in display order
    pub fn search(&self, data: &Value, root_name: &str, query: &str) -> Vec<Path> {
        let mut found = Vec::new();
        walk(data, root_name, &mut |node| {
            if self.matches(node, query) {
                found.push(node.path.clone());
            }
        });
        found
    }
}

impl fmt::Debug for SearchMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SearchMatcher(..)")
    }
}

/// Default key matcher: case-insensitive substring of the key
pub fn match_node_key(node: &NodeData<'_>, query: &str) -> bool {
    contains_ignore_case(&node.key.to_string(), query)
}

/// Default value matcher: case-insensitive substring of the scalar's text.
/// Collections only match the empty query.
pub fn match_node_value(node: &NodeData<'_>, query: &str) -> bool {
    let text = match node.value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(_) | Value::Object(_) => return query.is_empty(),
    };
    contains_ignore_case(&text, query)
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    needle.is_empty() || haystack.to_lowercase().contains(&needle.to_lowercase())
}

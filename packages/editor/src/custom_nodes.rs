//! # Custom Nodes
//!
//! Callers can swap in their own presentation for nodes matching a
//! condition. Definitions are checked in order and the first match wins;
//! there is no specificity ranking.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::node::NodeData;

pub type ConditionFn = Arc<dyn Fn(&NodeData<'_>) -> bool + Send + Sync>;

/// One (condition, overrides) pair. `E` is whatever the host uses to
/// render a node.
#[derive(Clone)]
pub struct CustomNodeDefinition<E> {
    pub condition: ConditionFn,
    pub element: Option<E>,
    pub name: Option<String>,
    pub props: Option<Value>,
    pub hide_key: Option<bool>,
    pub default_value: Option<Value>,
    pub show_in_types_selector: Option<bool>,
    pub show_on_edit: Option<bool>,
    pub show_on_view: Option<bool>,
    pub show_edit_tools: Option<bool>,
}

impl<E> CustomNodeDefinition<E> {
    pub fn new(condition: impl Fn(&NodeData<'_>) -> bool + Send + Sync + 'static) -> Self {
        Self {
            condition: Arc::new(condition),
            element: None,
            name: None,
            props: None,
            hide_key: None,
            default_value: None,
            show_in_types_selector: None,
            show_on_edit: None,
            show_on_view: None,
            show_edit_tools: None,
        }
    }

    pub fn element(mut self, element: E) -> Self {
        self.element = Some(element);
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn props(mut self, props: Value) -> Self {
        self.props = Some(props);
        self
    }

    pub fn hide_key(mut self, hide: bool) -> Self {
        self.hide_key = Some(hide);
        self
    }

    pub fn default_value(mut self, value: Value) -> Self {
        self.default_value = Some(value);
        self
    }

    pub fn show_in_types_selector(mut self, show: bool) -> Self {
        self.show_in_types_selector = Some(show);
        self
    }

    pub fn show_on_edit(mut self, show: bool) -> Self {
        self.show_on_edit = Some(show);
        self
    }

    pub fn show_on_view(mut self, show: bool) -> Self {
        self.show_on_view = Some(show);
        self
    }

    pub fn show_edit_tools(mut self, show: bool) -> Self {
        self.show_edit_tools = Some(show);
        self
    }
}

impl<E: fmt::Debug> fmt::Debug for CustomNodeDefinition<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomNodeDefinition")
            .field("element", &self.element)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Overrides for a node. All fields are `None` when no definition matched.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomNodeData<E> {
    pub element: Option<E>,
    pub name: Option<String>,
    pub props: Option<Value>,
    pub hide_key: Option<bool>,
    pub default_value: Option<Value>,
    pub show_in_types_selector: Option<bool>,
    pub show_on_edit: Option<bool>,
    pub show_on_view: Option<bool>,
    pub show_edit_tools: Option<bool>,
}

impl<E> Default for CustomNodeData<E> {
    fn default() -> Self {
        Self {
            element: None,
            name: None,
            props: None,
            hide_key: None,
            default_value: None,
            show_in_types_selector: None,
            show_on_edit: None,
            show_on_view: None,
            show_edit_tools: None,
        }
    }
}

impl<E> CustomNodeData<E> {
    /// True when no definition matched
    pub fn is_empty(&self) -> bool {
        self.element.is_none() && self.show_edit_tools.is_none()
    }
}

/// Overrides from the first definition whose condition holds for `node`,
/// with unset display flags filled from the defaults.
pub fn resolve_custom_node<E: Clone>(
    definitions: &[CustomNodeDefinition<E>],
    node: &NodeData<'_>,
) -> CustomNodeData<E> {
    let Some(definition) = definitions.iter().find(|d| (*d.condition)(node)) else {
        return CustomNodeData::default();
    };

    CustomNodeData {
        element: definition.element.clone(),
        name: definition.name.clone(),
        props: definition.props.clone(),
        hide_key: Some(definition.hide_key.unwrap_or(false)),
        default_value: definition.default_value.clone(),
        show_in_types_selector: definition.show_in_types_selector,
        show_on_edit: Some(definition.show_on_edit.unwrap_or(false)),
        show_on_view: Some(definition.show_on_view.unwrap_or(true)),
        show_edit_tools: Some(definition.show_edit_tools.unwrap_or(true)),
    }
}

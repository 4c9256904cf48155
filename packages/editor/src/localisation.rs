//! Message lookup for the handful of strings the editor produces itself.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

pub const ERROR_UPDATE: &str = "ERROR_UPDATE";
pub const ERROR_RESTRICTED: &str = "ERROR_RESTRICTED";
pub const ERROR_EDIT_IN_PROGRESS: &str = "ERROR_EDIT_IN_PROGRESS";

fn default_text(key: &str) -> Option<&'static str> {
    match key {
        ERROR_UPDATE => Some("Update unsuccessful"),
        ERROR_RESTRICTED => Some("This node cannot be changed"),
        ERROR_EDIT_IN_PROGRESS => Some("Another node is being edited"),
        _ => None,
    }
}

/// Caller overrides on top of the default English table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Translations(HashMap<String, String>);

impl Translations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, text: impl Into<String>) -> Self {
        self.0.insert(key.into(), text.into());
        self
    }

    /// Override, then default text, then the key itself
    pub fn translate(&self, key: &str) -> String {
        self.0
            .get(key)
            .map(String::as_str)
            .or_else(|| default_text(key))
            .unwrap_or(key)
            .to_string()
    }
}

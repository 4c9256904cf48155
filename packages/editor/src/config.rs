use std::path::{Path as FsPath, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::ConfigError;
use crate::filter::{FilterPolicy, Policies};
use crate::localisation::Translations;
use crate::search::{SearchMatcher, SearchMode};

pub const DEFAULT_CONFIG_NAME: &str = "jsontree.config.json";

/// Editor configuration file format
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditorConfig {
    /// Key shown for the root node
    pub root_name: String,

    /// Nodes collapsed when first shown
    pub collapse: FilterPolicy,

    pub restrict_edit: FilterPolicy,
    pub restrict_delete: FilterPolicy,
    pub restrict_add: FilterPolicy,
    pub restrict_drag: FilterPolicy,

    /// "key", "value" or "all"
    #[serde(skip_serializing)]
    pub search_filter: Option<SearchMode>,

    /// Message overrides by id
    pub translations: Translations,

    /// How long rejection messages stay visible
    pub error_message_timeout_ms: u64,

    /// Undo history depth (0 = unlimited)
    pub undo_levels: usize,
}

impl EditorConfig {
    /// Load config from a file
    pub fn load(path: &FsPath) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: EditorConfig = serde_json::from_str(&content)?;
        debug!(path = %path.display(), "loaded editor config");
        Ok(config)
    }

    /// Load `jsontree.config.json` from a directory, or defaults if absent
    pub fn load_or_default(dir: &FsPath) -> Result<Self, ConfigError> {
        let config_path: PathBuf = dir.join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            Self::load(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn error_message_timeout(&self) -> Duration {
        Duration::from_millis(self.error_message_timeout_ms)
    }

    /// Normalize every policy into its runtime predicate
    pub fn policies(&self) -> Policies {
        Policies {
            collapse: self.collapse.normalize(),
            restrict_edit: self.restrict_edit.normalize(),
            restrict_delete: self.restrict_delete.normalize(),
            restrict_add: self.restrict_add.normalize(),
            restrict_drag: self.restrict_drag.normalize(),
            search: self.search_filter.as_ref().map(SearchMatcher::new),
        }
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            root_name: "root".to_string(),
            collapse: FilterPolicy::Bool(false),
            restrict_edit: FilterPolicy::Bool(false),
            restrict_delete: FilterPolicy::Bool(false),
            restrict_add: FilterPolicy::Bool(false),
            restrict_drag: FilterPolicy::Bool(true),
            search_filter: None,
            translations: Translations::default(),
            error_message_timeout_ms: 2500,
            undo_levels: 100,
        }
    }
}

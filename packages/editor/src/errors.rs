//! Error types for the editor

use thiserror::Error;

use crate::filter::Restriction;
use crate::path::Path;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Mutation error: {0}")]
    Mutation(#[from] crate::mutations::MutationError),

    /// The update handler declined the edit; the tree has been rolled back
    #[error("{0}")]
    ValidationRejected(String),

    #[error("Cannot {action} node at {path}")]
    Restricted { action: Restriction, path: Path },

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Tree state error: {0}")]
    TreeState(#[from] crate::tree_state::TreeStateError),

    /// Another edit committed while this one waited on its handler
    #[error("The document changed while the edit was pending")]
    Conflict,

    #[error("No drag in progress")]
    NoDragSource,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

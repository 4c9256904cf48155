pub mod edit;
pub mod query;

pub use edit::{add, delete, move_node, set, types, AddArgs, DeleteArgs, MoveArgs, SetArgs, TypesArgs};
pub use query::{get, search, GetArgs, SearchArgs};

use anyhow::{anyhow, Context, Result};
use colored::Colorize;
use jsontree_editor::{Document, EditorConfig, EditorError, ERROR_EDIT_IN_PROGRESS, ERROR_RESTRICTED};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A document loaded from disk for one command
pub struct Session {
    pub doc: Document,
    file: PathBuf,
    write: bool,
}

impl Session {
    pub fn open(file: &Path, config: &EditorConfig, write: bool) -> Result<Self> {
        let content =
            std::fs::read_to_string(file).with_context(|| format!("Cannot read {}", file.display()))?;
        let data: Value =
            serde_json::from_str(&content).with_context(|| format!("{} is not valid JSON", file.display()))?;

        debug!(file = %file.display(), "opened document");

        Ok(Self {
            doc: Document::with_config(data, config),
            file: file.to_path_buf(),
            write,
        })
    }

    /// Write the edited document back, or print it
    pub fn finish(self) -> Result<()> {
        let output = serde_json::to_string_pretty(&self.doc.data())?;

        if self.write {
            std::fs::write(&self.file, format!("{}\n", output))
                .with_context(|| format!("Cannot write {}", self.file.display()))?;
            println!("{} {}", "Saved".green().bold(), self.file.display());
        } else {
            println!("{}", output);
        }

        Ok(())
    }

    /// Turn an editor error into the user-facing message
    pub fn explain(&self, err: EditorError) -> anyhow::Error {
        let translations = self.doc.translations();
        match err {
            EditorError::Restricted { action, path } => {
                anyhow!("{} ({} at {})", translations.translate(ERROR_RESTRICTED), action, display_path(&path))
            }
            EditorError::TreeState(_) => anyhow!(translations.translate(ERROR_EDIT_IN_PROGRESS)),
            other => anyhow!(other),
        }
    }
}

/// Parse a command-line value as JSON, falling back to a plain string
pub fn parse_value(text: &str) -> Value {
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

pub fn display_path(path: &jsontree_editor::Path) -> String {
    if path.is_empty() {
        "<root>".to_string()
    } else {
        path.to_string()
    }
}

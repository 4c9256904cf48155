//! # JSON Tree Editor
//!
//! Core editing engine for a path-addressed JSON tree.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ path: dotted paths → keys → values          │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ mutations + moves: pure tree rebuilds       │
//! │  - update / delete / add / move             │
//! │  - never touch the input tree               │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ document: editor session                    │
//! │  - restriction policies                     │
//! │  - async update handlers (commit/rollback)  │
//! │  - tree state: editing, drag, collapse      │
//! │  - undo history                             │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use jsontree_editor::{Document, Handlers, HandlerResponse, Path};
//! use serde_json::json;
//!
//! let handlers = Handlers::new().on_edit(|change| async move {
//!     if change.new_value == Some(json!("")) {
//!         HandlerResponse::error("Name required")
//!     } else {
//!         HandlerResponse::Unit
//!     }
//! });
//!
//! let doc = Document::new(json!({ "name": "Ada" })).with_handlers(handlers);
//! doc.edit(Path::from("name"), json!("Grace")).await?;
//! ```

mod config;
mod coordinator;
mod custom_nodes;
mod data_type;
mod document;
mod errors;
mod filter;
mod localisation;
mod moves;
mod mutations;
mod node;
mod path;
mod search;
mod tree_state;
mod undo_stack;

pub use config::{EditorConfig, DEFAULT_CONFIG_NAME};
pub use coordinator::{
    coordinate, AcceptAll, ChangeDescriptor, FnHandler, HandlerResponse, Handlers, Resolution,
    UpdateHandler, UpdateOutcome,
};
pub use custom_nodes::{resolve_custom_node, ConditionFn, CustomNodeData, CustomNodeDefinition};
pub use data_type::{convert_value, display_text, DataType};
pub use document::Document;
pub use errors::{ConfigError, EditorError};
pub use filter::{FilterFn, FilterPolicy, NodeFilter, Policies, Restriction};
pub use localisation::{Translations, ERROR_EDIT_IN_PROGRESS, ERROR_RESTRICTED, ERROR_UPDATE};
pub use moves::{compose_move, DropPosition, ARRAY_KEY_PREFIX};
pub use mutations::{mutate, Mutation, MutationError, MutationResult, Operation, Placement};
pub use node::{size_of, walk, NodeData};
pub use path::{resolve, Key, Path};
pub use search::{match_node_key, match_node_value, SearchFn, SearchMatcher, SearchMode};
pub use tree_state::{CollapseState, DragSource, TreeState, TreeStateError, COLLAPSE_PULSE_DURATION};
pub use undo_stack::{HistoryEntry, UndoStack};

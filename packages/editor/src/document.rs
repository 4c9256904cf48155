//! # Document Handle
//!
//! A [`Document`] is one editor session over a JSON tree: the current data,
//! the policies that restrict editing, the external update handlers, the
//! shared [`TreeState`], and the undo history.
//!
//! ## Lifecycle
//!
//! ```text
//! Request → Restrictions → Mutate → Handler → Commit | Rollback
//!              ↓             ↓         ↓          ↓
//!          Restricted   MutationError  async   data + history
//! ```
//!
//! The data lock is never held across the handler await, so the tree can be
//! read while a handler is deciding. An edit only commits if nothing else
//! committed while its handler ran; otherwise it fails with
//! [`EditorError::Conflict`] and the newer tree stays.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, warn};

use crate::config::EditorConfig;
use crate::coordinator::{coordinate, ChangeDescriptor, Handlers, Resolution};
use crate::filter::{Policies, Restriction};
use crate::localisation::Translations;
use crate::moves::DropPosition;
use crate::mutations::{Mutation, MutationError, Placement};
use crate::node::NodeData;
use crate::path::Path;
use crate::tree_state::TreeState;
use crate::undo_stack::{HistoryEntry, UndoStack};
use crate::EditorError;

/// Editable JSON document
pub struct Document {
    data: RwLock<Value>,

    /// Increments on each commit, undo and redo
    version: AtomicU64,

    root_name: String,
    policies: Policies,
    handlers: Handlers,
    translations: Translations,
    error_message_timeout: Duration,
    tree_state: Arc<TreeState>,
    history: Mutex<UndoStack>,
}

impl Document {
    /// Document with the default configuration
    pub fn new(data: Value) -> Self {
        Self::with_config(data, &EditorConfig::default())
    }

    pub fn with_config(data: Value, config: &EditorConfig) -> Self {
        Self {
            data: RwLock::new(data),
            version: AtomicU64::new(0),
            root_name: config.root_name.clone(),
            policies: config.policies(),
            handlers: Handlers::default(),
            translations: config.translations.clone(),
            error_message_timeout: config.error_message_timeout(),
            tree_state: Arc::new(TreeState::new()),
            history: Mutex::new(UndoStack::with_max_levels(config.undo_levels)),
        }
    }

    pub fn with_handlers(mut self, handlers: Handlers) -> Self {
        self.handlers = handlers;
        self
    }

    pub fn with_policies(mut self, policies: Policies) -> Self {
        self.policies = policies;
        self
    }

    pub fn with_translations(mut self, translations: Translations) -> Self {
        self.translations = translations;
        self
    }

    /// Snapshot of the current tree
    pub fn data(&self) -> Value {
        self.read_data().clone()
    }

    pub fn version(&self) -> u64 {
        self.version.load(Ordering::SeqCst)
    }

    pub fn root_name(&self) -> &str {
        &self.root_name
    }

    pub fn policies(&self) -> &Policies {
        &self.policies
    }

    pub fn translations(&self) -> &Translations {
        &self.translations
    }

    /// How long a refused edit's message stays in [`TreeState::error_message`]
    pub fn error_message_timeout(&self) -> Duration {
        self.error_message_timeout
    }

    /// The session's shared coordination state
    pub fn tree_state(&self) -> Arc<TreeState> {
        Arc::clone(&self.tree_state)
    }

    /// Replace the tree from outside the editor (e.g. the caller reloaded
    /// it). The old tree becomes the previous value; history is cleared.
    pub fn replace_data(&self, data: Value) {
        let previous = self.swap_data(data);
        self.tree_state.set_previous_value(Some(previous));
        self.lock_history().clear();
    }

    /// Run `f` against the descriptor for `path`
    pub fn with_node<R>(&self, path: &Path, f: impl FnOnce(&NodeData<'_>) -> R) -> Result<R, MutationError> {
        let data = self.read_data();
        let node = NodeData::at(&data, path, &self.root_name)?;
        Ok(f(&node))
    }

    pub fn is_restricted(&self, kind: Restriction, path: &Path) -> Result<bool, MutationError> {
        self.with_node(path, |node| self.policies.is_restricted(kind, node))
    }

    /// Whether the node at `path` should render collapsed: an active
    /// collapse pulse over it wins, otherwise the collapse policy decides.
    pub fn is_collapsed(&self, path: &Path) -> Result<bool, MutationError> {
        if let Some(pulse) = self.tree_state.collapse_state() {
            if path.starts_with(&pulse.path) {
                return Ok(pulse.collapsed);
            }
        }
        self.with_node(path, |node| self.policies.collapse.matches(node))
    }

    /// Paths matching `query` under the configured search filter.
    /// Without a search filter every node matches.
    pub fn search(&self, query: &str) -> Vec<Path> {
        let data = self.read_data();
        match &self.policies.search {
            Some(matcher) => matcher.search(&data, &self.root_name, query),
            None => {
                let mut all = Vec::new();
                crate::node::walk(&data, &self.root_name, &mut |node| all.push(node.path.clone()));
                all
            }
        }
    }

    /// Apply a mutation through the update handler.
    ///
    /// Exactly one of commit or rollback happens. A rejected edit leaves the
    /// tree untouched and returns [`EditorError::ValidationRejected`].
    pub async fn apply(&self, mutation: Mutation) -> Result<(), EditorError> {
        let (current, version) = {
            let data = self.read_data();
            (data.clone(), self.version())
        };

        if let Err(err) = self.check_restrictions(&mutation, &current) {
            self.tree_state.show_error(err.to_string(), self.error_message_timeout);
            return Err(err);
        }

        let result = mutation.apply(&current)?;

        if matches!(mutation, Mutation::Update { .. }) && result.current_value == result.new_value {
            debug!(path = %mutation.path(), "unchanged value, skipping update");
            return Ok(());
        }

        let change = ChangeDescriptor::new(result, &mutation);
        let handler = self.handlers.for_mutation(&mutation);

        match coordinate(handler.as_ref(), change, &self.translations).await {
            Resolution::Commit(data) => {
                debug!(mutation = %mutation.describe(), "committing edit");
                self.commit(version, current, data, mutation.describe())
            }
            Resolution::Rollback { message, .. } => {
                // Nothing was written, so whatever is in the tree now stays
                warn!(mutation = %mutation.describe(), %message, "edit rejected");
                self.tree_state.show_error(message.clone(), self.error_message_timeout);
                Err(EditorError::ValidationRejected(message))
            }
        }
    }

    pub async fn edit(&self, path: Path, value: Value) -> Result<(), EditorError> {
        self.apply(Mutation::Update { path, value }).await
    }

    pub async fn delete(&self, path: Path) -> Result<(), EditorError> {
        self.apply(Mutation::Delete { path }).await
    }

    pub async fn add(&self, path: Path, value: Value, placement: Placement) -> Result<(), EditorError> {
        self.apply(Mutation::Add { path, value, placement }).await
    }

    pub async fn move_node(&self, source: Path, dest: Path, position: DropPosition) -> Result<(), EditorError> {
        self.apply(Mutation::Move { source, dest, position }).await
    }

    /// Complete a drag started with [`TreeState::start_drag`] by dropping
    /// next to `dest`. The drag source is cleared whatever the outcome.
    pub async fn drop_on(&self, dest: Path, position: DropPosition) -> Result<(), EditorError> {
        let source = self.tree_state.take_drag_source().ok_or(EditorError::NoDragSource)?;
        self.move_node(source, dest, position).await
    }

    /// Restore the tree from before the last committed edit
    pub fn undo(&self) -> bool {
        let restored = self.lock_history().undo();
        self.restore(restored)
    }

    /// Reapply the last undone edit
    pub fn redo(&self) -> bool {
        let restored = self.lock_history().redo();
        self.restore(restored)
    }

    pub fn can_undo(&self) -> bool {
        self.lock_history().can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.lock_history().can_redo()
    }

    /// Group the following edits into one undo step
    pub fn begin_batch(&self, description: impl Into<String>) {
        let mut history = self.lock_history();
        history.begin_batch();
        history.set_batch_description(description);
    }

    pub fn end_batch(&self) {
        self.lock_history().end_batch();
    }

    fn restore(&self, restored: Option<Value>) -> bool {
        let Some(data) = restored else {
            return false;
        };

        let previous = self.swap_data(data);
        self.tree_state.set_previous_value(Some(previous));
        true
    }

    /// Replace the tree and bump the version under one write lock
    fn swap_data(&self, data: Value) -> Value {
        let mut current = self.write_data();
        self.version.fetch_add(1, Ordering::SeqCst);
        std::mem::replace(&mut *current, data)
    }

    /// Write `after` if the tree is still at `expected_version`
    fn commit(
        &self,
        expected_version: u64,
        before: Value,
        after: Value,
        description: String,
    ) -> Result<(), EditorError> {
        {
            let mut data = self.write_data();
            if self.version() != expected_version {
                warn!(mutation = %description, "document changed during edit");
                return Err(EditorError::Conflict);
            }
            *data = after.clone();
            self.version.fetch_add(1, Ordering::SeqCst);
        }

        self.lock_history()
            .record(HistoryEntry::new(before, after).with_description(description));
        Ok(())
    }

    fn check_restrictions(&self, mutation: &Mutation, data: &Value) -> Result<(), EditorError> {
        let (kind, path) = match mutation {
            Mutation::Update { path, .. } => {
                // A new key counts as an add on its parent
                if crate::path::resolve(data, path).is_ok() {
                    (Restriction::Edit, path.clone())
                } else {
                    (Restriction::Add, path.parent())
                }
            }
            Mutation::Delete { path } => (Restriction::Delete, path.clone()),
            Mutation::Add { path, .. } => (Restriction::Add, path.parent()),
            Mutation::Move { source, .. } => (Restriction::Drag, source.clone()),
        };

        let node = NodeData::at(data, &path, &self.root_name)?;
        if self.policies.is_restricted(kind, &node) {
            warn!(action = %kind, path = %path, "restricted");
            return Err(EditorError::Restricted { action: kind, path });
        }

        Ok(())
    }

    fn read_data(&self) -> std::sync::RwLockReadGuard<'_, Value> {
        self.data.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_data(&self) -> std::sync::RwLockWriteGuard<'_, Value> {
        self.data.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_history(&self) -> MutexGuard<'_, UndoStack> {
        self.history.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("version", &self.version())
            .field("root_name", &self.root_name)
            .field("data", &self.data())
            .finish_non_exhaustive()
    }
}

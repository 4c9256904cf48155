//! # Undo/Redo Stack
//!
//! Tracks committed edits as before/after snapshots of the whole tree.
//!
//! ## Design
//!
//! - Each committed edit records the tree before and after it
//! - Undo restores the "before" snapshot and moves the entry to the redo stack
//! - Redo restores the "after" snapshot
//! - New commits clear the redo stack
//! - Batching groups several commits into one undo step
//!
//! Snapshots are used rather than inverse operations because handlers may
//! replace the computed tree with their own, which has no inverse.

use serde_json::Value;

/// One undo step
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    /// Tree before the step
    pub before: Value,

    /// Tree after the step
    pub after: Value,

    /// Optional description of this step
    pub description: Option<String>,
}

impl HistoryEntry {
    pub fn new(before: Value, after: Value) -> Self {
        Self {
            before,
            after,
            description: None,
        }
    }

    /// Add a description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Undo/redo history for one document
#[derive(Debug)]
pub struct UndoStack {
    /// Applied steps (most recent last)
    undo_stack: Vec<HistoryEntry>,

    /// Undone steps (most recent last)
    redo_stack: Vec<HistoryEntry>,

    /// Maximum number of undo levels (0 = unlimited)
    max_levels: usize,

    /// Currently building a batch
    current_batch: Option<HistoryEntry>,

    /// Description applied when the batch ends
    batch_description: Option<String>,

    batching: bool,
}

impl UndoStack {
    /// Create a new undo stack with default max levels (100)
    pub fn new() -> Self {
        Self::with_max_levels(100)
    }

    /// Create an undo stack with custom max levels
    pub fn with_max_levels(max_levels: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_levels,
            current_batch: None,
            batch_description: None,
            batching: false,
        }
    }

    /// Record a committed edit
    pub fn record(&mut self, entry: HistoryEntry) {
        if !self.batching {
            self.push_entry(entry);
            return;
        }

        match &mut self.current_batch {
            // Keep the first "before" and the latest "after"
            Some(batch) => batch.after = entry.after,
            None => self.current_batch = Some(entry),
        }
    }

    /// Start a batch of edits (will be undone/redone together)
    pub fn begin_batch(&mut self) {
        self.batching = true;
        self.current_batch = None;
        self.batch_description = None;
    }

    /// End the current batch and push to undo stack
    pub fn end_batch(&mut self) {
        self.batching = false;
        if let Some(mut batch) = self.current_batch.take() {
            if let Some(description) = self.batch_description.take() {
                batch.description = Some(description);
            }
            self.push_entry(batch);
        }
    }

    /// Set description for current batch (if batching)
    pub fn set_batch_description(&mut self, description: impl Into<String>) {
        if self.batching {
            self.batch_description = Some(description.into());
        }
    }

    fn push_entry(&mut self, entry: HistoryEntry) {
        self.undo_stack.push(entry);

        // Trim if exceeded max levels
        if self.max_levels > 0 && self.undo_stack.len() > self.max_levels {
            self.undo_stack.remove(0);
        }

        // New action invalidates future
        self.redo_stack.clear();
    }

    /// Step back; returns the tree to restore
    pub fn undo(&mut self) -> Option<Value> {
        let entry = self.undo_stack.pop()?;
        let restored = entry.before.clone();
        self.redo_stack.push(entry);
        Some(restored)
    }

    /// Step forward again; returns the tree to restore
    pub fn redo(&mut self) -> Option<Value> {
        let entry = self.redo_stack.pop()?;
        let restored = entry.after.clone();
        self.undo_stack.push(entry);
        Some(restored)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Get the number of undo levels available
    pub fn undo_levels(&self) -> usize {
        self.undo_stack.len()
    }

    /// Get the number of redo levels available
    pub fn redo_levels(&self) -> usize {
        self.redo_stack.len()
    }

    /// Clear all undo/redo history
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.current_batch = None;
        self.batch_description = None;
        self.batching = false;
    }

    /// Get description of the next undo operation
    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack
            .last()
            .and_then(|entry| entry.description.as_deref())
    }

    /// Get description of the next redo operation
    pub fn redo_description(&self) -> Option<&str> {
        self.redo_stack
            .last()
            .and_then(|entry| entry.description.as_deref())
    }
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new()
    }
}

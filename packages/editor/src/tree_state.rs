//! # Tree Coordination State
//!
//! State that every rendered node of one editor must agree on:
//!
//! - the collapse pulse, a short-lived "expand/collapse everything under
//!   this path" signal that clears itself after [`COLLAPSE_PULSE_DURATION`]
//! - the node currently being edited, so only one node is editable at a time
//! - the drag source, so the node it is dropped on can perform the move
//! - the last externally-known value of the tree
//! - the message of the last refused edit, until its timeout passes
//!
//! One `TreeState` exists per [`Document`](crate::Document) and is shared as
//! an `Arc`; it is never constructed by consumers.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde_json::Value;
use thiserror::Error;
use tokio::time::Instant;
use tracing::debug;

use crate::path::Path;

/// How long a collapse pulse stays visible to path queries
pub const COLLAPSE_PULSE_DURATION: Duration = Duration::from_millis(2000);

/// Pending whole-subtree collapse or expand
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollapseState {
    pub path: Path,
    pub collapsed: bool,
}

/// Node being dragged, with its serialized path
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DragSource {
    pub path: Option<Path>,
    pub path_string: Option<String>,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeStateError {
    #[error("Node {current} is already being edited")]
    AlreadyEditing { current: String },
}

#[derive(Debug, Default)]
struct Inner {
    collapse: Option<(CollapseState, Instant)>,
    editing: Option<Path>,
    drag_source: DragSource,
    previous_value: Option<Value>,
    error: Option<(String, Instant)>,
}

/// Shared coordination state for one editor session
#[derive(Debug)]
pub struct TreeState {
    inner: Mutex<Inner>,
    pulse_duration: Duration,
}

impl TreeState {
    pub(crate) fn new() -> Self {
        Self::with_pulse_duration(COLLAPSE_PULSE_DURATION)
    }

    pub(crate) fn with_pulse_duration(pulse_duration: Duration) -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            pulse_duration,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // Collapse

    /// Start a collapse pulse, replacing any pending one, or clear it with `None`
    pub fn set_collapse_state(&self, state: Option<CollapseState>) {
        debug!(?state, "collapse pulse");
        self.lock().collapse = state.map(|state| (state, Instant::now() + self.pulse_duration));
    }

    /// The active pulse, if it has not expired
    pub fn collapse_state(&self) -> Option<CollapseState> {
        let mut inner = self.lock();
        let expired = matches!(&inner.collapse, Some((_, expires_at)) if Instant::now() >= *expires_at);
        if expired {
            inner.collapse = None;
        }
        inner.collapse.as_ref().map(|(state, _)| state.clone())
    }

    /// True when an active pulse targets `path` or one of its ancestors
    pub fn does_path_match(&self, path: &Path) -> bool {
        self.collapse_state()
            .is_some_and(|state| path.starts_with(&state.path))
    }

    // Editing

    /// Claim edit mode for `path`.
    ///
    /// Fails while a different node holds it; claiming the same node again
    /// is a no-op.
    pub fn start_editing(&self, path: &Path) -> Result<(), TreeStateError> {
        let mut inner = self.lock();
        match &inner.editing {
            Some(current) if current != path => Err(TreeStateError::AlreadyEditing {
                current: current.to_string(),
            }),
            _ => {
                debug!(path = %path, "editing started");
                inner.editing = Some(path.clone());
                Ok(())
            }
        }
    }

    /// Release edit mode if `path` holds it. Returns whether it did.
    pub fn stop_editing(&self, path: &Path) -> bool {
        let mut inner = self.lock();
        if inner.editing.as_ref() == Some(path) {
            debug!(path = %path, "editing stopped");
            inner.editing = None;
            true
        } else {
            false
        }
    }

    /// Release edit mode regardless of holder
    pub fn cancel_editing(&self) {
        self.lock().editing = None;
    }

    /// Serialized path of the node in edit mode
    pub fn currently_editing(&self) -> Option<String> {
        self.lock().editing.as_ref().map(Path::to_string)
    }

    pub fn is_editing(&self, path: &Path) -> bool {
        self.lock().editing.as_ref() == Some(path)
    }

    /// True when the node in edit mode is `path` or below it
    pub fn are_children_being_edited(&self, path: &Path) -> bool {
        self.lock()
            .editing
            .as_ref()
            .is_some_and(|editing| editing.starts_with(path))
    }

    // Drag-n-drop

    pub fn start_drag(&self, path: Path) {
        debug!(path = %path, "drag started");
        self.lock().drag_source = DragSource {
            path_string: Some(path.to_string()),
            path: Some(path),
        };
    }

    pub fn drag_source(&self) -> DragSource {
        self.lock().drag_source.clone()
    }

    /// Remove and return the drag source (on drop)
    pub fn take_drag_source(&self) -> Option<Path> {
        std::mem::take(&mut self.lock().drag_source).path
    }

    /// Forget the drag source (on cancel)
    pub fn clear_drag_source(&self) {
        self.lock().drag_source = DragSource::default();
    }

    // Previous value

    pub fn previous_value(&self) -> Option<Value> {
        self.lock().previous_value.clone()
    }

    pub fn set_previous_value(&self, value: Option<Value>) {
        self.lock().previous_value = value;
    }

    // Error message

    /// Show `message` for `timeout`, replacing any visible one
    pub fn show_error(&self, message: impl Into<String>, timeout: Duration) {
        self.lock().error = Some((message.into(), Instant::now() + timeout));
    }

    /// The visible error message, if its timeout has not passed
    pub fn error_message(&self) -> Option<String> {
        let mut inner = self.lock();
        let expired = matches!(&inner.error, Some((_, expires_at)) if Instant::now() >= *expires_at);
        if expired {
            inner.error = None;
        }
        inner.error.as_ref().map(|(message, _)| message.clone())
    }
}

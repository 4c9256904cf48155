//! # Update Coordination
//!
//! Every edit is offered to an external [`UpdateHandler`] before it is
//! committed. Handlers may accept it, reject it with a message, or replace
//! the proposed tree with one of their own.
//!
//! Handlers have historically returned several loose shapes (nothing, a
//! bool, a string, an `["error" | "value", payload]` pair). Those arrive as
//! a [`HandlerResponse`] and are normalized into a closed [`UpdateOutcome`]
//! at this boundary.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::data_type::display_text;
use crate::localisation::{Translations, ERROR_UPDATE};
use crate::mutations::{Mutation, MutationResult};
use crate::path::{Key, Path};

/// Everything a handler needs to judge an edit
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeDescriptor {
    pub current_data: Value,
    pub new_data: Value,
    pub current_value: Option<Value>,
    pub new_value: Option<Value>,
    /// Last key of `path`
    pub name: Option<Key>,
    pub path: Path,
}

impl ChangeDescriptor {
    pub fn new(result: MutationResult, mutation: &Mutation) -> Self {
        Self {
            current_data: result.current_data,
            new_data: result.new_data,
            current_value: result.current_value,
            new_value: result.new_value,
            name: mutation.name(),
            path: mutation.path().clone(),
        }
    }
}

/// Raw handler return value
#[derive(Debug, Clone, PartialEq)]
pub enum HandlerResponse {
    /// No return value
    Unit,
    Bool(bool),
    Text(String),
    /// A two-element `[tag, payload]` result
    Tagged { tag: String, payload: Value },
    /// Any other JSON value
    Json(Value),
}

impl HandlerResponse {
    /// `["error", message]`
    pub fn error(message: impl Into<String>) -> Self {
        HandlerResponse::Tagged {
            tag: "error".to_string(),
            payload: Value::String(message.into()),
        }
    }

    /// `["value", data]`
    pub fn value(data: Value) -> Self {
        HandlerResponse::Tagged {
            tag: "value".to_string(),
            payload: data,
        }
    }

    /// Interpret a handler result expressed as JSON
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Null => HandlerResponse::Unit,
            Value::Bool(b) => HandlerResponse::Bool(b),
            Value::String(s) => HandlerResponse::Text(s),
            Value::Array(mut items) if items.len() == 2 && items[0].is_string() => {
                let payload = items.pop().unwrap_or(Value::Null);
                let tag = items.pop().map(|t| display_text(&t)).unwrap_or_default();
                HandlerResponse::Tagged { tag, payload }
            }
            other => HandlerResponse::Json(other),
        }
    }

    pub fn into_outcome(self) -> UpdateOutcome {
        match self {
            HandlerResponse::Unit | HandlerResponse::Bool(true) => UpdateOutcome::Accept,
            HandlerResponse::Bool(false) => UpdateOutcome::Reject(None),
            HandlerResponse::Text(text) => UpdateOutcome::Reject(non_empty(text)),
            HandlerResponse::Json(value) => UpdateOutcome::Reject(non_empty(display_text(&value))),
            HandlerResponse::Tagged { tag, payload } if tag == "error" => match payload {
                Value::Bool(false) => UpdateOutcome::Reject(None),
                other => UpdateOutcome::Reject(non_empty(display_text(&other))),
            },
            HandlerResponse::Tagged { payload, .. } => UpdateOutcome::ReplaceWith(payload),
        }
    }
}

fn non_empty(text: String) -> Option<String> {
    (!text.is_empty()).then_some(text)
}

impl From<()> for HandlerResponse {
    fn from(_: ()) -> Self {
        HandlerResponse::Unit
    }
}

impl From<bool> for HandlerResponse {
    fn from(b: bool) -> Self {
        HandlerResponse::Bool(b)
    }
}

impl From<String> for HandlerResponse {
    fn from(s: String) -> Self {
        HandlerResponse::Text(s)
    }
}

impl From<&str> for HandlerResponse {
    fn from(s: &str) -> Self {
        HandlerResponse::Text(s.to_string())
    }
}

/// Normalized handler verdict
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOutcome {
    Accept,
    /// Roll back; `None` means use the generic failure message
    Reject(Option<String>),
    /// Commit this tree instead of the computed one
    ReplaceWith(Value),
}

/// External validation / side-effect hook
#[async_trait]
pub trait UpdateHandler: Send + Sync {
    async fn handle(&self, change: ChangeDescriptor) -> HandlerResponse;
}

/// Handler that accepts every edit
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

#[async_trait]
impl UpdateHandler for AcceptAll {
    async fn handle(&self, _change: ChangeDescriptor) -> HandlerResponse {
        HandlerResponse::Unit
    }
}

/// Adapts an async closure into an [`UpdateHandler`]
pub struct FnHandler<F>(pub F);

#[async_trait]
impl<F, Fut> UpdateHandler for FnHandler<F>
where
    F: Fn(ChangeDescriptor) -> Fut + Send + Sync,
    Fut: Future<Output = HandlerResponse> + Send + 'static,
{
    async fn handle(&self, change: ChangeDescriptor) -> HandlerResponse {
        (self.0)(change).await
    }
}

/// Handlers per operation kind. Each falls back to `on_update`, and to
/// [`AcceptAll`] when nothing is registered.
#[derive(Clone, Default)]
pub struct Handlers {
    on_update: Option<Arc<dyn UpdateHandler>>,
    on_edit: Option<Arc<dyn UpdateHandler>>,
    on_delete: Option<Arc<dyn UpdateHandler>>,
    on_add: Option<Arc<dyn UpdateHandler>>,
}

fn wrap<F, Fut>(f: F) -> Arc<dyn UpdateHandler>
where
    F: Fn(ChangeDescriptor) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResponse> + Send + 'static,
{
    Arc::new(FnHandler(f))
}

impl Handlers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_update<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(ChangeDescriptor) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResponse> + Send + 'static,
    {
        self.on_update = Some(wrap(f));
        self
    }

    pub fn on_edit<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(ChangeDescriptor) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResponse> + Send + 'static,
    {
        self.on_edit = Some(wrap(f));
        self
    }

    pub fn on_delete<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(ChangeDescriptor) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResponse> + Send + 'static,
    {
        self.on_delete = Some(wrap(f));
        self
    }

    pub fn on_add<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(ChangeDescriptor) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResponse> + Send + 'static,
    {
        self.on_add = Some(wrap(f));
        self
    }

    /// Register a prebuilt handler as the general fallback
    pub fn with_update_handler(mut self, handler: Arc<dyn UpdateHandler>) -> Self {
        self.on_update = Some(handler);
        self
    }

    /// Handler responsible for `mutation`. Moves go to the edit handler.
    pub fn for_mutation(&self, mutation: &Mutation) -> Arc<dyn UpdateHandler> {
        let specific = match mutation {
            Mutation::Update { .. } | Mutation::Move { .. } => &self.on_edit,
            Mutation::Delete { .. } => &self.on_delete,
            Mutation::Add { .. } => &self.on_add,
        };

        specific
            .as_ref()
            .or(self.on_update.as_ref())
            .cloned()
            .unwrap_or_else(|| Arc::new(AcceptAll) as Arc<dyn UpdateHandler>)
    }
}

/// The handler's verdict on an edit
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Tree to store
    Commit(Value),
    /// `data` is the tree the edit was computed from
    Rollback { data: Value, message: String },
}

/// Offer `change` to `handler` and decide between commit and rollback
pub async fn coordinate(
    handler: &dyn UpdateHandler,
    change: ChangeDescriptor,
    translations: &Translations,
) -> Resolution {
    let current_data = change.current_data.clone();
    let new_data = change.new_data.clone();

    match handler.handle(change).await.into_outcome() {
        UpdateOutcome::Accept => Resolution::Commit(new_data),
        UpdateOutcome::ReplaceWith(data) => Resolution::Commit(data),
        UpdateOutcome::Reject(message) => Resolution::Rollback {
            data: current_data,
            message: message.unwrap_or_else(|| translations.translate(ERROR_UPDATE)),
        },
    }
}

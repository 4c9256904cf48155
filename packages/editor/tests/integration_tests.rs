//! Integration tests for the editor session

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use jsontree_editor::{
    ChangeDescriptor, Document, DropPosition, EditorConfig, EditorError, FilterPolicy,
    HandlerResponse, Handlers, NodeData, Placement, Path, Policies, Restriction, SearchMode,
    Translations, ERROR_UPDATE,
};
use serde_json::json;
use tokio::sync::Notify;

fn draggable(data: serde_json::Value) -> Document {
    Document::new(data).with_policies(Policies::default().restrict(Restriction::Drag, false))
}

#[tokio::test]
async fn test_unchanged_edit_skips_handler() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();

    let handlers = Handlers::new().on_update(move |_: ChangeDescriptor| {
        counter.fetch_add(1, Ordering::SeqCst);
        async { HandlerResponse::Unit }
    });

    let doc = Document::new(json!({ "a": { "b": [1, 2] } })).with_handlers(handlers);
    doc.edit(Path::from("a.b.1"), json!(2)).await.unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(doc.version(), 0);
    assert!(!doc.can_undo());
}

#[tokio::test]
async fn test_delete_then_insert_restores_array() {
    let original = json!({ "list": ["x", "y", "z"] });
    let doc = Document::new(original.clone());

    doc.delete(Path::from("list.1")).await.unwrap();
    assert_eq!(doc.data(), json!({ "list": ["x", "z"] }));

    doc.add(Path::from("list.1"), json!("y"), Placement::Insert).await.unwrap();
    assert_eq!(doc.data(), original);
}

#[tokio::test]
async fn test_handler_sees_change_descriptor() {
    let seen = Arc::new(std::sync::Mutex::new(None));
    let sink = seen.clone();

    let handlers = Handlers::new().on_edit(move |change: ChangeDescriptor| {
        *sink.lock().unwrap() = Some(change);
        async { HandlerResponse::Unit }
    });

    let doc = Document::new(json!({ "user": { "name": "Ada" } })).with_handlers(handlers);
    doc.edit(Path::from("user.name"), json!("Grace")).await.unwrap();

    let change = seen.lock().unwrap().take().unwrap();
    assert_eq!(change.path, Path::from("user.name"));
    assert_eq!(change.name, Some("name".into()));
    assert_eq!(change.current_value, Some(json!("Ada")));
    assert_eq!(change.new_value, Some(json!("Grace")));
    assert_eq!(change.current_data, json!({ "user": { "name": "Ada" } }));
    assert_eq!(change.new_data, json!({ "user": { "name": "Grace" } }));
}

#[tokio::test]
async fn test_rejection_restores_data() {
    let handlers = Handlers::new().on_update(|_: ChangeDescriptor| async { HandlerResponse::error("bad") });

    let original = json!({ "age": 30 });
    let doc = Document::new(original.clone()).with_handlers(handlers);

    let err = doc.edit(Path::from("age"), json!(-1)).await.unwrap_err();

    assert!(matches!(&err, EditorError::ValidationRejected(message) if message == "bad"));
    assert_eq!(err.to_string(), "bad");
    assert_eq!(doc.data(), original);
    assert_eq!(doc.version(), 0);
    assert!(!doc.can_undo());
}

#[tokio::test]
async fn test_rejection_without_text_uses_generic_message() {
    let handlers = Handlers::new().on_delete(|_: ChangeDescriptor| async { HandlerResponse::from(false) });
    let doc = Document::new(json!({ "a": 1 })).with_handlers(handlers);

    let err = doc.delete(Path::from("a")).await.unwrap_err();
    assert!(matches!(err, EditorError::ValidationRejected(message) if message == "Update unsuccessful"));

    let translated = Handlers::new().on_delete(|_: ChangeDescriptor| async { HandlerResponse::from("") });
    let doc = Document::new(json!({ "a": 1 }))
        .with_handlers(translated)
        .with_translations(Translations::new().with(ERROR_UPDATE, "Échec"));

    let err = doc.delete(Path::from("a")).await.unwrap_err();
    assert!(matches!(err, EditorError::ValidationRejected(message) if message == "Échec"));
}

#[tokio::test]
async fn test_handler_replacement_value_is_committed() {
    let handlers = Handlers::new().on_add(|change: ChangeDescriptor| async move {
        let mut data = change.new_data;
        data["stamped"] = json!(true);
        HandlerResponse::value(data)
    });

    let doc = Document::new(json!({ "a": 1 })).with_handlers(handlers);
    doc.add(Path::from("b"), json!(2), Placement::Assign).await.unwrap();

    assert_eq!(doc.data(), json!({ "a": 1, "b": 2, "stamped": true }));
    assert!(doc.can_undo());
}

#[tokio::test]
async fn test_specific_handler_wins_over_general() {
    let general = Arc::new(AtomicUsize::new(0));
    let counter = general.clone();

    let handlers = Handlers::new()
        .on_update(move |_: ChangeDescriptor| {
            counter.fetch_add(1, Ordering::SeqCst);
            async { HandlerResponse::Unit }
        })
        .on_delete(|_: ChangeDescriptor| async { HandlerResponse::error("keep it") });

    let doc = Document::new(json!({ "a": 1, "b": 2 })).with_handlers(handlers);

    assert!(doc.delete(Path::from("a")).await.is_err());
    doc.edit(Path::from("b"), json!(3)).await.unwrap();

    assert_eq!(general.load(Ordering::SeqCst), 1);
    assert_eq!(doc.data(), json!({ "a": 1, "b": 3 }));
}

#[tokio::test]
async fn test_restrictions_block_before_handler() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let handlers = Handlers::new().on_update(move |_: ChangeDescriptor| {
        counter.fetch_add(1, Ordering::SeqCst);
        async { HandlerResponse::Unit }
    });

    let policies = Policies::default()
        .restrict(Restriction::Delete, true)
        .restrict(
            Restriction::Edit,
            FilterPolicy::predicate(|node: &NodeData<'_>| node.key.to_property() == "id"),
        );

    let doc = Document::new(json!({ "id": 7, "name": "x" }))
        .with_policies(policies)
        .with_handlers(handlers);

    let err = doc.delete(Path::from("name")).await.unwrap_err();
    assert!(matches!(err, EditorError::Restricted { action: Restriction::Delete, .. }));

    let err = doc.edit(Path::from("id"), json!(8)).await.unwrap_err();
    assert!(matches!(err, EditorError::Restricted { action: Restriction::Edit, .. }));

    doc.edit(Path::from("name"), json!("y")).await.unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(doc.data(), json!({ "id": 7, "name": "y" }));
}

#[tokio::test]
async fn test_new_key_edit_checks_add_on_parent() {
    let policies = Policies::default().restrict(Restriction::Add, 1usize);
    let doc = Document::new(json!({ "nested": {} })).with_policies(policies);

    // Root is level 0, so adding directly under it is allowed
    doc.edit(Path::from("top"), json!(1)).await.unwrap();

    let err = doc.edit(Path::from("nested.inner"), json!(1)).await.unwrap_err();
    assert!(matches!(err, EditorError::Restricted { action: Restriction::Add, .. }));
}

#[tokio::test]
async fn test_drag_is_restricted_by_default() {
    let doc = Document::new(json!(["a", "b"]));
    let err = doc
        .move_node(Path::from("0"), Path::from("1"), DropPosition::Below)
        .await
        .unwrap_err();

    assert!(matches!(err, EditorError::Restricted { action: Restriction::Drag, .. }));
}

#[tokio::test]
async fn test_move_within_array_corrects_index() {
    let doc = draggable(json!({ "items": ["a", "b", "c", "d"] }));

    doc.move_node(Path::from("items.0"), Path::from("items.2"), DropPosition::Below)
        .await
        .unwrap();

    assert_eq!(doc.data(), json!({ "items": ["b", "c", "a", "d"] }));
}

#[tokio::test]
async fn test_move_array_element_into_object_synthesizes_key() {
    let doc = draggable(json!({ "list": [10, 20, 30], "obj": { "x": 1, "y": 2 } }));

    doc.move_node(Path::from("list.2"), Path::from("obj.x"), DropPosition::Below)
        .await
        .unwrap();

    let data = doc.data();
    assert_eq!(data["list"], json!([10, 20]));
    let keys: Vec<&String> = data["obj"].as_object().unwrap().keys().collect();
    assert_eq!(keys, ["x", "arr_2", "y"]);
    assert_eq!(data["obj"]["arr_2"], json!(30));
}

#[tokio::test]
async fn test_move_reports_destination_to_edit_handler() {
    let seen = Arc::new(std::sync::Mutex::new(None));
    let sink = seen.clone();
    let handlers = Handlers::new().on_edit(move |change: ChangeDescriptor| {
        *sink.lock().unwrap() = Some(change);
        async { HandlerResponse::Unit }
    });

    let doc = draggable(json!({ "a": 1, "b": { "c": 2 } })).with_handlers(handlers);
    doc.move_node(Path::from("a"), Path::from("b.c"), DropPosition::Above)
        .await
        .unwrap();

    let change = seen.lock().unwrap().take().unwrap();
    assert_eq!(change.path, Path::from("b.c"));
    assert_eq!(change.current_value, Some(json!(1)));
    assert_eq!(doc.data(), json!({ "b": { "a": 1, "c": 2 } }));
}

#[tokio::test]
async fn test_drop_on_uses_drag_source() {
    let doc = draggable(json!(["a", "b", "c"]));

    let err = doc.drop_on(Path::from("0"), DropPosition::Above).await.unwrap_err();
    assert!(matches!(err, EditorError::NoDragSource));

    doc.tree_state().start_drag(Path::from("2"));
    assert_eq!(doc.tree_state().drag_source().path_string.as_deref(), Some("2"));

    doc.drop_on(Path::from("0"), DropPosition::Above).await.unwrap();

    assert_eq!(doc.data(), json!(["c", "a", "b"]));
    assert_eq!(doc.tree_state().drag_source().path, None);
}

#[tokio::test]
async fn test_single_node_edit_mode() {
    let doc = Document::new(json!({ "a": { "b": 1 }, "c": 2 }));
    let state = doc.tree_state();

    state.start_editing(&Path::from("a.b")).unwrap();
    assert!(state.start_editing(&Path::from("c")).is_err());
    assert!(state.are_children_being_edited(&Path::from("a")));
    assert!(!state.are_children_being_edited(&Path::from("c")));

    assert!(state.stop_editing(&Path::from("a.b")));
    state.start_editing(&Path::from("c")).unwrap();
    assert_eq!(state.currently_editing(), Some("c".to_string()));
}

#[tokio::test]
async fn test_reads_while_handler_is_pending() {
    let started = Arc::new(Notify::new());
    let gate = Arc::new(Notify::new());

    let handlers = {
        let started = started.clone();
        let gate = gate.clone();
        Handlers::new().on_update(move |_: ChangeDescriptor| {
            let started = started.clone();
            let gate = gate.clone();
            async move {
                started.notify_one();
                gate.notified().await;
                HandlerResponse::Unit
            }
        })
    };

    let doc = Arc::new(Document::new(json!({ "n": 1 })).with_handlers(handlers));

    let pending = {
        let doc = doc.clone();
        tokio::spawn(async move { doc.edit(Path::from("n"), json!(2)).await })
    };

    started.notified().await;

    // The edit is not visible until the handler accepts it
    assert_eq!(doc.data(), json!({ "n": 1 }));
    assert_eq!(doc.search("n").len(), 2);

    gate.notify_one();
    pending.await.unwrap().unwrap();

    assert_eq!(doc.data(), json!({ "n": 2 }));
}

#[tokio::test]
async fn test_search_uses_configured_filter() {
    let config = EditorConfig {
        search_filter: Some(SearchMode::Value),
        ..EditorConfig::default()
    };
    let doc = Document::with_config(json!({ "name": "Alice", "friend": { "name": "bob" } }), &config);

    assert_eq!(doc.search("BOB"), vec![Path::from("friend.name")]);
    assert!(doc.search("name").is_empty());
}

#[tokio::test]
async fn test_undo_after_rejected_edit_skips_it() {
    let handlers = Handlers::new().on_update(|change: ChangeDescriptor| async move {
        if change.new_value == Some(json!("bad")) {
            HandlerResponse::error("no")
        } else {
            HandlerResponse::Unit
        }
    });

    let doc = Document::new(json!({ "v": "a" })).with_handlers(handlers);

    doc.edit(Path::from("v"), json!("b")).await.unwrap();
    assert!(doc.edit(Path::from("v"), json!("bad")).await.is_err());

    assert!(doc.undo());
    assert_eq!(doc.data(), json!({ "v": "a" }));
    assert!(!doc.undo());
}

/// Handlers that hold edits of `"slow"` until `gate` opens, rejecting them
/// when `reject` is set
fn gated(started: Arc<Notify>, gate: Arc<Notify>, reject: bool) -> Handlers {
    Handlers::new().on_update(move |change: ChangeDescriptor| {
        let started = started.clone();
        let gate = gate.clone();
        async move {
            if change.new_value != Some(json!("slow")) {
                return HandlerResponse::Unit;
            }
            started.notify_one();
            gate.notified().await;
            if reject {
                HandlerResponse::error("late")
            } else {
                HandlerResponse::Unit
            }
        }
    })
}

#[tokio::test]
async fn test_edit_committed_during_handler_wins() {
    let started = Arc::new(Notify::new());
    let gate = Arc::new(Notify::new());
    let doc = Arc::new(
        Document::new(json!({ "a": 1, "b": 1 })).with_handlers(gated(started.clone(), gate.clone(), false)),
    );

    let pending = {
        let doc = doc.clone();
        tokio::spawn(async move { doc.edit(Path::from("a"), json!("slow")).await })
    };
    started.notified().await;

    doc.edit(Path::from("b"), json!(2)).await.unwrap();
    gate.notify_one();

    let err = pending.await.unwrap().unwrap_err();
    assert!(matches!(err, EditorError::Conflict));
    assert_eq!(doc.data(), json!({ "a": 1, "b": 2 }));
    assert_eq!(doc.version(), 1);

    assert!(doc.undo());
    assert_eq!(doc.data(), json!({ "a": 1, "b": 1 }));
}

#[tokio::test]
async fn test_late_rejection_keeps_newer_edit() {
    let started = Arc::new(Notify::new());
    let gate = Arc::new(Notify::new());
    let doc = Arc::new(
        Document::new(json!({ "a": 1, "b": 1 })).with_handlers(gated(started.clone(), gate.clone(), true)),
    );

    let pending = {
        let doc = doc.clone();
        tokio::spawn(async move { doc.edit(Path::from("a"), json!("slow")).await })
    };
    started.notified().await;

    doc.edit(Path::from("b"), json!(2)).await.unwrap();
    gate.notify_one();

    let err = pending.await.unwrap().unwrap_err();
    assert!(matches!(err, EditorError::ValidationRejected(message) if message == "late"));
    assert_eq!(doc.data(), json!({ "a": 1, "b": 2 }));
}

#[tokio::test(start_paused = true)]
async fn test_rejection_message_expires() {
    let config = EditorConfig {
        error_message_timeout_ms: 1000,
        ..EditorConfig::default()
    };
    let handlers = Handlers::new().on_update(|_: ChangeDescriptor| async { HandlerResponse::error("bad") });
    let doc = Document::with_config(json!({ "a": 1 }), &config).with_handlers(handlers);
    assert_eq!(doc.error_message_timeout(), std::time::Duration::from_millis(1000));

    assert!(doc.edit(Path::from("a"), json!(2)).await.is_err());
    assert_eq!(doc.tree_state().error_message(), Some("bad".to_string()));

    tokio::time::advance(std::time::Duration::from_millis(1000)).await;
    assert_eq!(doc.tree_state().error_message(), None);
}

#[tokio::test]
async fn test_move_between_numeric_object_keys() {
    let doc = draggable(json!({ "o": { "0": "a", "1": "b" }, "l": [10] }));

    doc.move_node(Path::from("o.0"), Path::from("o.1"), DropPosition::Below)
        .await
        .unwrap();
    let data = doc.data();
    let keys: Vec<&String> = data["o"].as_object().unwrap().keys().collect();
    assert_eq!(keys, ["1", "0"]);

    doc.move_node(Path::from("l.0"), Path::from("o.1"), DropPosition::Above)
        .await
        .unwrap();
    let data = doc.data();
    let keys: Vec<&String> = data["o"].as_object().unwrap().keys().collect();
    assert_eq!(keys, ["arr_0", "1", "0"]);
    assert_eq!(data["l"], json!([]));
}

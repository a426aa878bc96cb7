//! Tests for selection routing through composites.

mod common;

use std::sync::Arc;

use horizon_mosaic::model::{
    CompositeCollection, CompositionMode, ListProvider, Provider, SelectionHandler,
    SelectionPolicy,
};
use horizon_mosaic::{IndexPath, LocalIndex};

use common::{FixedProvider, RecordingHandler, init_tracing};

#[test]
fn test_default_policy_without_handler() {
    let composite = CompositeCollection::new(CompositionMode::Single);
    composite.add(FixedProvider::single(3)).unwrap();
    let router = composite.selection();
    let index = IndexPath::item(2);

    assert!(router.should_highlight(index).unwrap());
    assert!(router.should_select(index).unwrap());
    assert!(router.should_deselect(index).unwrap());
    router.did_highlight(index).unwrap();
    router.did_unhighlight(index).unwrap();
    router.did_select(index).unwrap();
    router.did_deselect(index).unwrap();
}

#[test]
fn test_hooks_reach_the_owner_with_local_index() {
    init_tracing();
    let handler = RecordingHandler::allowing();
    let a = FixedProvider::new(&[2, 2]);
    let b = FixedProvider::with_handler(&[4, 4], handler.clone());

    let composite = CompositeCollection::new(CompositionMode::Multi);
    composite.add(a.clone()).unwrap();
    composite.add(b.clone()).unwrap();
    let router = composite.selection();

    // Global section 3 is b's section 1
    let global = IndexPath::new(3, 1);
    assert!(router.should_highlight(global).unwrap());
    router.did_highlight(global).unwrap();
    router.did_unhighlight(global).unwrap();
    assert!(router.should_select(global).unwrap());
    router.did_select(global).unwrap();
    assert!(router.should_deselect(global).unwrap());
    router.did_deselect(global).unwrap();

    // Items owned by a never reach b's handler
    router.did_select(IndexPath::new(1, 0)).unwrap();

    let local = LocalIndex::new(1, 1);
    assert_eq!(
        handler.calls(),
        vec![
            ("should_highlight", local),
            ("did_highlight", local),
            ("did_unhighlight", local),
            ("should_select", local),
            ("did_select", local),
            ("should_deselect", local),
            ("did_deselect", local),
        ]
    );
}

#[test]
fn test_handler_answers_override_policy() {
    let composite = CompositeCollection::new(CompositionMode::Single);
    composite.add(FixedProvider::single(2)).unwrap();
    composite
        .add(FixedProvider::with_handler(&[2], RecordingHandler::refusing()))
        .unwrap();
    let router = composite.selection();

    assert!(router.should_select(IndexPath::item(1)).unwrap());
    assert!(!router.should_select(IndexPath::item(2)).unwrap());
    assert!(!router.should_highlight(IndexPath::item(3)).unwrap());
    assert!(!router.should_deselect(IndexPath::item(3)).unwrap());
}

#[test]
fn test_configured_policy_applies_without_handler() {
    let composite = CompositeCollection::builder()
        .mode(CompositionMode::Single)
        .selection_policy(SelectionPolicy::read_only())
        .build();
    composite.add(FixedProvider::single(1)).unwrap();
    composite
        .add(FixedProvider::with_handler(&[1], RecordingHandler::allowing()))
        .unwrap();
    let router = composite.selection();

    assert!(router.should_highlight(IndexPath::item(0)).unwrap());
    assert!(!router.should_select(IndexPath::item(0)).unwrap());
    assert!(!router.should_deselect(IndexPath::item(0)).unwrap());

    // The handler still decides for its own items
    assert!(router.should_select(IndexPath::item(1)).unwrap());
}

#[test]
fn test_routing_errors_propagate() {
    let composite = CompositeCollection::new(CompositionMode::Multi);
    composite.add(FixedProvider::single(3)).unwrap();
    let router = composite.selection();

    assert!(router.should_select(IndexPath::new(0, 3)).unwrap_err().is_out_of_range());
    assert!(router.did_select(IndexPath::new(1, 0)).unwrap_err().is_out_of_range());
}

#[test]
fn test_nested_composites_route_to_the_leaf() {
    init_tracing();
    let handler = RecordingHandler::refusing();
    let leaf = Arc::new(ListProvider::new(vec!["x", "y", "z"]));
    leaf.set_selection_handler(Some(handler.clone()));

    let inner = CompositeCollection::new(CompositionMode::Single);
    inner.add(Arc::new(ListProvider::new(vec!["a", "b"]))).unwrap();
    inner.add(leaf.clone()).unwrap();

    let outer = CompositeCollection::new(CompositionMode::Multi);
    outer.add(FixedProvider::new(&[1, 1])).unwrap();
    outer.add(inner.clone()).unwrap();
    let router = outer.selection();

    // outer (2, 4) -> inner (0, 4) -> leaf (0, 2)
    assert!(!router.should_select(IndexPath::new(2, 4)).unwrap());
    router.did_deselect(IndexPath::new(2, 3)).unwrap();

    // inner's other child has no handler and gets inner's default
    assert!(router.should_select(IndexPath::new(2, 0)).unwrap());

    assert_eq!(
        handler.calls(),
        vec![
            ("should_select", LocalIndex::item(2)),
            ("did_deselect", LocalIndex::item(1)),
        ]
    );
}

#[test]
fn test_composite_as_handler_falls_back_on_bad_index() {
    let composite = CompositeCollection::builder()
        .mode(CompositionMode::Single)
        .selection_policy(SelectionPolicy::read_only())
        .build();
    composite.add(FixedProvider::single(1)).unwrap();

    let handler = composite.selection_handler().unwrap();
    let bad = LocalIndex::item(5);

    assert!(handler.should_highlight(&bad));
    assert!(!handler.should_select(&bad));
    assert!(!handler.should_deselect(&bad));
    // No panic, nothing to notify
    handler.did_select(&bad);
}

//! Dispatcher tests: picker flow, pagination guards, stale searches, events.

mod common;

use std::time::{Duration, Instant};

use common::FakeCatalog;
use rust_decimal::Decimal;
use upsell_picker::{
    DiscountType, FetchKind, FetchOutcome, ScrollMetrics, StoreEvent, UpsellEditor,
};

fn editor_with(catalog: FakeCatalog) -> UpsellEditor<FakeCatalog> {
    UpsellEditor::with_source(catalog)
}

fn shop() -> FakeCatalog {
    FakeCatalog::new().with_results("", vec![common::shoe(), common::hat()])
}

fn slot_ids<S: upsell_picker::CatalogSource>(editor: &UpsellEditor<S>) -> Vec<i64> {
    editor.selection().slots().iter().map(|p| p.id).collect()
}

const NEAR: ScrollMetrics = ScrollMetrics {
    scroll_top: 350.0,
    scroll_height: 800.0,
    client_height: 400.0,
};

const FAR: ScrollMetrics = ScrollMetrics {
    scroll_top: 0.0,
    scroll_height: 800.0,
    client_height: 400.0,
};

// ---------------------------------------------------------------------------
// picker flow
// ---------------------------------------------------------------------------

#[test]
fn pick_variant_into_placeholder() {
    let mut editor = editor_with(shop());

    let ticket = editor.open_picker(0).expect("first open fetches page 1");
    assert_eq!(ticket.page, 1);
    assert_eq!(ticket.kind, FetchKind::Search);
    assert_eq!(editor.resolve(ticket), FetchOutcome::Applied(2));

    editor.toggle_variant(1, 11);
    assert!(editor.confirm_picker());
    assert_eq!(editor.picker_slot(), None);

    let slots = editor.selection().slots();
    assert_eq!(slots.len(), 1);
    assert_eq!(slots[0].id, 1);
    assert_eq!(slots[0].title, "Shoe");
    let variants: Vec<i64> = slots[0].variants.iter().map(|v| v.id).collect();
    assert_eq!(variants, vec![11]);
}

#[test]
fn removing_only_real_slot_restores_placeholder() {
    let mut editor = editor_with(shop());
    let ticket = editor.open_picker(0).unwrap();
    editor.resolve(ticket);
    editor.toggle_product(2);
    editor.confirm_picker();
    assert_eq!(slot_ids(&editor), vec![2]);

    assert!(editor.remove_slot(2));
    let slots = editor.selection().slots();
    assert_eq!(slots.len(), 1);
    assert!(slots[0].is_placeholder());
}

#[test]
fn confirm_replaces_the_slot_being_edited() {
    let mut editor = editor_with(shop());
    editor.add_empty_slot();
    editor.add_empty_slot();
    let before = slot_ids(&editor);

    let ticket = editor.open_picker(1).unwrap();
    editor.resolve(ticket);
    editor.toggle_product(1);
    editor.toggle_product(2);
    assert!(editor.confirm_picker());

    assert_eq!(slot_ids(&editor), vec![before[0], 1, 2, before[2]]);
}

#[test]
fn open_picker_out_of_range_stays_closed() {
    let mut editor = editor_with(shop());
    assert!(editor.open_picker(3).is_none());
    assert_eq!(editor.picker_slot(), None);
    assert!(editor.source().calls().is_empty());
}

#[test]
fn reopening_picker_reuses_loaded_catalog() {
    let mut editor = editor_with(shop());
    let ticket = editor.open_picker(0).unwrap();
    editor.resolve(ticket);
    editor.close_picker();

    assert!(editor.open_picker(0).is_none());
    assert_eq!(editor.picker_slot(), Some(0));
    assert_eq!(editor.source().calls().len(), 1);
}

#[test]
fn confirm_without_selection_keeps_slot() {
    let mut editor = editor_with(shop());
    let placeholder = slot_ids(&editor);
    let ticket = editor.open_picker(0).unwrap();
    editor.resolve(ticket);

    assert!(!editor.confirm_picker());
    assert_eq!(editor.picker_slot(), None);
    assert_eq!(slot_ids(&editor), placeholder);
}

#[test]
fn close_picker_discards_selection() {
    let mut editor = editor_with(shop());
    let placeholder = slot_ids(&editor);
    let ticket = editor.open_picker(0).unwrap();
    editor.resolve(ticket);
    editor.toggle_product(1);

    editor.close_picker();
    assert!(!editor.confirm_picker());
    assert_eq!(slot_ids(&editor), placeholder);
}

#[test]
fn discount_and_reorder_through_editor() {
    let mut editor = editor_with(shop());
    let ticket = editor.open_picker(0).unwrap();
    editor.resolve(ticket);
    editor.toggle_product(1);
    editor.toggle_product(2);
    editor.confirm_picker();

    assert!(editor.apply_discount(2, DiscountType::Percentage, Decimal::new(20, 0)));
    assert!(editor.reorder_slots(1, 0));
    assert!(editor.reorder_variants(2, 0, 2));

    let first = &editor.selection().slots()[0];
    assert_eq!(first.id, 2);
    assert_eq!(first.discount.unwrap().kind, DiscountType::Percentage);
    let order: Vec<i64> = first.variants.iter().map(|v| v.id).collect();
    assert_eq!(order, vec![22, 23, 21]);
    assert!(editor.selection().find(1).unwrap().discount.is_none());
}

#[test]
fn hydrate_from_catalog_copies_selection() {
    let mut editor = editor_with(shop());
    editor.search("");
    editor.toggle_variant(2, 23);
    editor.hydrate_from_catalog();

    assert_eq!(slot_ids(&editor), vec![2]);
    assert_eq!(editor.selection().slots()[0].variants.len(), 1);
}

// ---------------------------------------------------------------------------
// pagination
// ---------------------------------------------------------------------------

#[test]
fn load_more_pages_until_short_page() {
    let catalog = FakeCatalog::new().with_results("", common::numbered(1, 25, "Item"));
    let mut editor = editor_with(catalog);

    let ticket = editor.open_picker(0).unwrap();
    editor.resolve(ticket);
    assert_eq!(editor.catalog().products().len(), 10);

    assert_eq!(editor.load_more(), Some(FetchOutcome::Applied(10)));
    assert_eq!(editor.load_more(), Some(FetchOutcome::Applied(5)));
    assert!(!editor.catalog().has_more());
    assert_eq!(editor.load_more(), None);

    assert_eq!(editor.catalog().products().len(), 25);
    let pages: Vec<u32> = editor.source().calls().iter().map(|(_, p)| *p).collect();
    assert_eq!(pages, vec![1, 2, 3]);
}

#[test]
fn second_load_more_suppressed_while_first_in_flight() {
    let catalog = FakeCatalog::new().with_results("", common::numbered(1, 30, "Item"));
    let mut editor = editor_with(catalog);
    editor.search("");

    let first = editor.begin_load_more().expect("first load more dispatches");
    assert!(editor.load_more_in_flight());
    assert!(editor.begin_load_more().is_none());

    editor.resolve(first);
    assert!(!editor.load_more_in_flight());
    assert!(editor.begin_load_more().is_some());
}

#[test]
fn load_more_suppressed_while_search_loading() {
    let catalog = FakeCatalog::new().with_results("", common::numbered(1, 30, "Item"));
    let mut editor = editor_with(catalog);
    editor.search("");

    let pending = editor.begin_search("");
    assert!(editor.begin_load_more().is_none());
    editor.resolve(pending);
    assert!(editor.begin_load_more().is_some());
}

#[test]
fn failed_load_more_is_retryable() {
    let catalog = FakeCatalog::new().with_results("", common::numbered(1, 20, "Item"));
    let mut editor = editor_with(catalog);
    editor.search("");

    editor.source().fail_with(Some(500));
    let outcome = editor.load_more().unwrap();
    assert!(matches!(outcome, FetchOutcome::Failed(_)));
    assert_eq!(editor.catalog().error(), Some("HTTP Error! Status: 500"));
    assert!(!editor.load_more_in_flight());
    assert_eq!(editor.catalog().products().len(), 10);

    editor.source().fail_with(None);
    assert_eq!(editor.load_more(), Some(FetchOutcome::Applied(10)));
    assert!(editor.catalog().error().is_none());
    assert_eq!(editor.catalog().products().len(), 20);
}

// ---------------------------------------------------------------------------
// overlapping searches
// ---------------------------------------------------------------------------

#[test]
fn abandoned_search_does_not_overwrite_newer_results() {
    let catalog = FakeCatalog::new()
        .with_results("a", common::numbered(100, 10, "Alpha"))
        .with_results("b", vec![common::hat()]);
    let mut editor = editor_with(catalog);

    let for_a = editor.begin_search("a");
    let for_b = editor.begin_search("b");
    assert_eq!(editor.resolve(for_b), FetchOutcome::Applied(1));
    assert_eq!(editor.resolve(for_a), FetchOutcome::Stale);

    let ids: Vec<i64> = editor.catalog().products().iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![2]);
    assert_eq!(editor.catalog().search_query(), "b");
    assert!(!editor.catalog().loading());
}

#[test]
fn stale_load_more_from_previous_query_is_dropped() {
    let catalog = FakeCatalog::new()
        .with_results("", common::numbered(1, 20, "Item"))
        .with_results("hat", vec![common::hat()]);
    let mut editor = editor_with(catalog);
    editor.search("");

    let more = editor.begin_load_more().unwrap();
    let search = editor.begin_search("hat");
    editor.resolve(search);
    assert_eq!(editor.resolve(more), FetchOutcome::Stale);

    assert_eq!(editor.catalog().products().len(), 1);
    assert!(!editor.load_more_in_flight());
}

#[test]
fn repeated_search_drops_older_load_more_resolved_first() {
    let catalog = FakeCatalog::new().with_results("a", common::numbered(1, 30, "Item"));
    let mut editor = editor_with(catalog);
    editor.search("a");

    let more = editor.begin_load_more().unwrap();
    let again = editor.begin_search("a");
    assert_eq!(editor.resolve(more), FetchOutcome::Stale);
    assert_eq!(editor.resolve(again), FetchOutcome::Applied(10));

    let ids: Vec<i64> = editor.catalog().products().iter().map(|p| p.id).collect();
    assert_eq!(ids, (1..=10).collect::<Vec<i64>>());
    assert_eq!(editor.catalog().page(), 2);

    assert_eq!(editor.load_more(), Some(FetchOutcome::Applied(10)));
    let ids: Vec<i64> = editor.catalog().products().iter().map(|p| p.id).collect();
    assert_eq!(ids, (1..=20).collect::<Vec<i64>>());
}

#[test]
fn repeated_search_drops_older_load_more_resolved_last() {
    let catalog = FakeCatalog::new().with_results("a", common::numbered(1, 30, "Item"));
    let mut editor = editor_with(catalog);
    editor.search("a");

    let more = editor.begin_load_more().unwrap();
    let again = editor.begin_search("a");
    assert_eq!(editor.resolve(again), FetchOutcome::Applied(10));
    assert_eq!(editor.resolve(more), FetchOutcome::Stale);

    assert_eq!(editor.catalog().products().len(), 10);
    assert_eq!(editor.catalog().page(), 2);
    assert!(!editor.load_more_in_flight());
    assert!(!editor.catalog().loading());

    let next = editor.begin_load_more().unwrap();
    assert_eq!(next.page, 2);
}

#[test]
fn abandoned_load_more_releases_guards() {
    let catalog = FakeCatalog::new().with_results("", common::numbered(1, 30, "Item"));
    let mut editor = editor_with(catalog);
    editor.search("");

    let dropped = editor.begin_load_more().unwrap();
    assert!(editor.begin_load_more().is_none());

    editor.abandon_fetch(&dropped);
    assert!(!editor.load_more_in_flight());
    assert!(!editor.catalog().loading());
    assert_eq!(editor.begin_load_more().map(|t| t.page), Some(2));
}

// ---------------------------------------------------------------------------
// search input and scrolling
// ---------------------------------------------------------------------------

#[test]
fn search_input_waits_for_quiet_period() {
    let catalog = FakeCatalog::new().with_results("sh", vec![common::shoe()]);
    let mut editor = editor_with(catalog);
    let t0 = Instant::now();

    editor.on_search_input("s", t0);
    editor.on_search_input("sh", t0 + Duration::from_millis(200));
    assert!(editor.poll_search(t0 + Duration::from_millis(600)).is_none());

    let ticket = editor
        .poll_search(t0 + Duration::from_millis(700))
        .expect("settled after 500ms");
    assert_eq!(ticket.query, "sh");
    assert_eq!(ticket.page, 1);
    assert_eq!(editor.catalog().search_query(), "sh");

    editor.resolve(ticket);
    assert_eq!(editor.catalog().visible_products().len(), 1);
    assert!(editor.poll_search(t0 + Duration::from_secs(5)).is_none());
}

#[test]
fn closing_picker_cancels_pending_search() {
    let mut editor = editor_with(shop());
    let t0 = Instant::now();
    editor.open_picker(0);
    editor.on_search_input("hat", t0);
    editor.close_picker();
    assert!(editor.poll_search(t0 + Duration::from_secs(1)).is_none());
}

#[test]
fn scroll_near_bottom_loads_next_page_throttled() {
    let catalog = FakeCatalog::new().with_results("", common::numbered(1, 40, "Item"));
    let mut editor = editor_with(catalog);
    let t0 = Instant::now();
    let ticket = editor.open_picker(0).unwrap();
    editor.resolve(ticket);

    let ticket = editor.on_scroll(NEAR, t0).expect("near bottom");
    assert_eq!(ticket.kind, FetchKind::LoadMore);
    assert_eq!(ticket.page, 2);
    editor.resolve(ticket);

    assert!(editor.on_scroll(NEAR, t0 + Duration::from_millis(500)).is_none());
    let ticket = editor
        .on_scroll(NEAR, t0 + Duration::from_millis(1000))
        .expect("throttle window passed");
    assert_eq!(ticket.page, 3);
}

#[test]
fn scroll_far_from_bottom_does_nothing() {
    let catalog = FakeCatalog::new().with_results("", common::numbered(1, 40, "Item"));
    let mut editor = editor_with(catalog);
    editor.search("");
    assert!(editor.on_scroll(FAR, Instant::now()).is_none());
    assert!(!editor.load_more_in_flight());
}

// ---------------------------------------------------------------------------
// events
// ---------------------------------------------------------------------------

#[test]
fn search_emits_catalog_and_status_events() {
    let mut editor = editor_with(shop());
    editor.search("");
    assert_eq!(
        editor.drain_events(),
        vec![
            StoreEvent::CatalogChanged,
            StoreEvent::StatusChanged { loading: true, error: None },
            StoreEvent::CatalogChanged,
            StoreEvent::StatusChanged { loading: false, error: None },
        ]
    );
    assert!(editor.drain_events().is_empty());
}

#[test]
fn toggles_emit_selection_count() {
    let mut editor = editor_with(shop());
    editor.search("");
    editor.drain_events();

    editor.toggle_product(1);
    editor.toggle_variant(2, 21);
    assert_eq!(
        editor.drain_events(),
        vec![
            StoreEvent::CatalogChanged,
            StoreEvent::SelectionCountChanged(1),
            StoreEvent::CatalogChanged,
            StoreEvent::SelectionCountChanged(2),
        ]
    );
}

#[test]
fn failure_surfaces_error_in_status_event() {
    let mut editor = editor_with(shop());
    editor.source().fail_with(Some(404));
    editor.search("");
    assert_eq!(
        editor.drain_events(),
        vec![
            StoreEvent::CatalogChanged,
            StoreEvent::StatusChanged { loading: true, error: None },
            StoreEvent::StatusChanged {
                loading: false,
                error: Some("HTTP Error! Status: 404".to_string()),
            },
        ]
    );
}

#[test]
fn list_noops_emit_nothing() {
    let mut editor = editor_with(shop());
    editor.drain_events();
    assert!(!editor.remove_slot(12345));
    assert!(!editor.reorder_slots(0, 4));
    assert!(!editor.apply_discount(12345, DiscountType::Flat, Decimal::ONE));
    assert!(editor.drain_events().is_empty());

    editor.add_empty_slot();
    assert_eq!(editor.drain_events(), vec![StoreEvent::SlotsChanged]);
}

#[test]
fn display_summarises_state() {
    let editor = editor_with(shop());
    let text = editor.to_string();
    assert!(text.starts_with("UpsellEditor(slots=1"));
    assert!(text.contains("page=1"));
}

//! State core for an upsell offer editor.
//!
//! An operator builds an ordered list of product offers ("slots"), each with
//! an optional discount, by picking products and variants from a remote,
//! paginated, searchable catalog. This crate owns that state; rendering,
//! drag-and-drop plumbing and timers live in the host.
//!
//! Two stores cooperate:
//!
//! - [`SelectionList`]: the ordered slots, never empty.
//! - [`CatalogState`]: the accumulated search results with selection flags
//!   and fetch status.
//!
//! [`UpsellEditor`] owns both plus a [`CatalogSource`] and routes every
//! mutation through one place, queueing [`StoreEvent`]s for the UI.
//!
//! # Quick start
//!
//! ```no_run
//! use upsell_picker::UpsellEditor;
//!
//! let mut editor = UpsellEditor::builder().api_key("secret").build().unwrap();
//!
//! // Pick products for the first slot
//! if let Some(ticket) = editor.open_picker(0) {
//!     editor.resolve(ticket);
//! }
//! editor.toggle_product(77);
//! editor.confirm_picker();
//! ```

#[cfg(feature = "async")]
pub mod async_client;
pub mod bridge;
pub mod catalog;
pub mod client;
pub mod config;
pub mod error;
pub mod events;
pub mod models;
pub mod pacing;
pub mod selection;

#[cfg(feature = "async")]
pub use async_client::AsyncCatalogClient;
pub use catalog::{CatalogAction, CatalogState, FetchKind, FetchOutcome, FetchTicket};
pub use client::{CatalogClient, CatalogSource};
pub use error::{Result, UpsellError};
pub use events::StoreEvent;
pub use models::{Discount, DiscountType, Product, ProductImage, Variant};
pub use pacing::{Debouncer, ScrollMetrics, Throttle};
pub use selection::{ListAction, SelectionList};

use rust_decimal::Decimal;
use std::fmt;
use std::time::{Duration, Instant};

// ---------------------------------------------------------------------------
// UpsellEditorBuilder
// ---------------------------------------------------------------------------

/// Builder for an [`UpsellEditor`] backed by the live catalog endpoint.
///
/// Use [`UpsellEditor::builder()`] to obtain one.
pub struct UpsellEditorBuilder {
    api_key: Option<String>,
    base_url: Option<String>,
    timeout: Duration,
}

impl Default for UpsellEditorBuilder {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: None,
            timeout: config::DEFAULT_TIMEOUT,
        }
    }
}

impl UpsellEditorBuilder {
    /// Set the catalog API key.
    ///
    /// If not set, the `PRODUCTS_API_KEY` environment variable is used.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Override the catalog search URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the HTTP request timeout. Defaults to 30 seconds.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Resolve configuration and build the editor.
    ///
    /// Fails with [`UpsellError::MissingApiKey`] if no key was given and none
    /// is in the environment. No request is sent until the picker opens.
    pub fn build(self) -> Result<UpsellEditor<CatalogClient>> {
        let config = config::ClientConfig::resolve(self.base_url, self.api_key, self.timeout)?;
        let client = CatalogClient::new(config)?;
        Ok(UpsellEditor::with_source(client))
    }
}

// ---------------------------------------------------------------------------
// UpsellEditor
// ---------------------------------------------------------------------------

/// Observable bits of the catalog, compared before and after a transition.
#[derive(PartialEq)]
struct CatalogStatus {
    loading: bool,
    error: Option<String>,
    selected: usize,
}

/// Single-threaded dispatcher over the selection list and the catalog.
///
/// Network work is split into tickets: a `begin_*`/`open_picker`/
/// `poll_search`/`on_scroll` call returns a [`FetchTicket`], and the result
/// is merged later with [`finish_fetch`](Self::finish_fetch). Several tickets
/// may be outstanding and may finish in any order. [`resolve`](Self::resolve)
/// does both halves synchronously through the editor's own source.
pub struct UpsellEditor<S = CatalogClient> {
    list: SelectionList,
    catalog: CatalogState,
    source: S,
    picker_slot: Option<usize>,
    search_input: Debouncer,
    scroll: Throttle,
    load_more_in_flight: bool,
    events: Vec<StoreEvent>,
}

impl UpsellEditor<CatalogClient> {
    /// Create a new builder for the live-endpoint editor.
    pub fn builder() -> UpsellEditorBuilder {
        UpsellEditorBuilder::default()
    }
}

impl<S: CatalogSource> UpsellEditor<S> {
    /// Create an editor that fetches catalog pages from `source`.
    pub fn with_source(source: S) -> Self {
        Self {
            list: SelectionList::new(),
            catalog: CatalogState::new(),
            source,
            picker_slot: None,
            search_input: Debouncer::new(config::SEARCH_DEBOUNCE),
            scroll: Throttle::new(config::SCROLL_THROTTLE),
            load_more_in_flight: false,
            events: Vec::new(),
        }
    }

    // -- Accessors ---------------------------------------------------------

    pub fn selection(&self) -> &SelectionList {
        &self.list
    }

    pub fn catalog(&self) -> &CatalogState {
        &self.catalog
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Index of the slot the picker is editing, if it is open.
    pub fn picker_slot(&self) -> Option<usize> {
        self.picker_slot
    }

    pub fn load_more_in_flight(&self) -> bool {
        self.load_more_in_flight
    }

    /// Take all queued UI notifications, oldest first.
    pub fn drain_events(&mut self) -> Vec<StoreEvent> {
        std::mem::take(&mut self.events)
    }

    // -- Selection list ----------------------------------------------------

    /// Apply a selection-list transition, queueing `SlotsChanged` if it changed anything.
    pub fn dispatch_list(&mut self, action: ListAction) -> bool {
        let changed = self.list.apply(action);
        if changed {
            self.events.push(StoreEvent::SlotsChanged);
        }
        changed
    }

    pub fn add_empty_slot(&mut self) {
        self.dispatch_list(ListAction::AddEmptySlot);
    }

    pub fn replace_slot(&mut self, index: usize, products: Vec<Product>) -> bool {
        self.dispatch_list(ListAction::ReplaceSlot { index, products })
    }

    pub fn remove_slot(&mut self, id: i64) -> bool {
        self.dispatch_list(ListAction::RemoveSlot { id })
    }

    pub fn reorder_slots(&mut self, from: usize, to: usize) -> bool {
        self.dispatch_list(ListAction::ReorderSlots { from, to })
    }

    pub fn reorder_variants(&mut self, slot_id: i64, from: usize, to: usize) -> bool {
        self.dispatch_list(ListAction::ReorderVariants { slot_id, from, to })
    }

    pub fn apply_discount(&mut self, slot_id: i64, kind: DiscountType, value: Decimal) -> bool {
        self.dispatch_list(ListAction::ApplyDiscount {
            slot_id,
            discount: Discount::new(kind, value),
        })
    }

    /// Replace the whole list with the catalog's current selection.
    pub fn hydrate_from_catalog(&mut self) {
        self.list.load_from_catalog(&self.catalog);
        self.events.push(StoreEvent::SlotsChanged);
    }

    // -- Catalog -----------------------------------------------------------

    fn catalog_status(&self) -> CatalogStatus {
        CatalogStatus {
            loading: self.catalog.loading(),
            error: self.catalog.error().map(str::to_string),
            selected: self.catalog.selected_count(),
        }
    }

    fn emit_catalog(&mut self, before: CatalogStatus, products_changed: bool) {
        if products_changed {
            self.events.push(StoreEvent::CatalogChanged);
        }
        let after = self.catalog_status();
        if after.loading != before.loading || after.error != before.error {
            self.events.push(StoreEvent::StatusChanged {
                loading: after.loading,
                error: after.error.clone(),
            });
        }
        if after.selected != before.selected {
            self.events.push(StoreEvent::SelectionCountChanged(after.selected));
        }
    }

    /// Apply a synchronous catalog transition.
    pub fn dispatch_catalog(&mut self, action: CatalogAction) -> bool {
        let before = self.catalog_status();
        let changed = self.catalog.apply(action);
        self.emit_catalog(before, changed);
        changed
    }

    pub fn set_search_query(&mut self, query: impl Into<String>) {
        self.dispatch_catalog(CatalogAction::SetSearchQuery(query.into()));
    }

    pub fn toggle_product(&mut self, product_id: i64) -> bool {
        self.dispatch_catalog(CatalogAction::ToggleProduct { product_id })
    }

    pub fn toggle_variant(&mut self, product_id: i64, variant_id: i64) -> bool {
        self.dispatch_catalog(CatalogAction::ToggleVariant {
            product_id,
            variant_id,
        })
    }

    /// Dispatch a request for `page` of `query`.
    pub fn begin_fetch(&mut self, page: u32, query: &str, kind: FetchKind) -> FetchTicket {
        let before = self.catalog_status();
        let ticket = self.catalog.begin_fetch(page, query, kind);
        if kind == FetchKind::LoadMore {
            self.load_more_in_flight = true;
        }
        self.emit_catalog(before, false);
        ticket
    }

    /// Switch to `query` and dispatch its first page.
    pub fn begin_search(&mut self, query: impl Into<String>) -> FetchTicket {
        let query = query.into();
        self.set_search_query(query.clone());
        self.begin_fetch(1, &query, FetchKind::Search)
    }

    /// Dispatch the next page, unless a fetch is already running or the
    /// catalog is exhausted.
    pub fn begin_load_more(&mut self) -> Option<FetchTicket> {
        if self.load_more_in_flight || self.catalog.loading() || !self.catalog.has_more() {
            tracing::debug!(
                in_flight = self.load_more_in_flight,
                loading = self.catalog.loading(),
                has_more = self.catalog.has_more(),
                "load more suppressed"
            );
            return None;
        }
        let page = self.catalog.page();
        let query = self.catalog.search_query().to_string();
        Some(self.begin_fetch(page, &query, FetchKind::LoadMore))
    }

    /// Merge the response for `ticket` into the catalog.
    pub fn finish_fetch(&mut self, ticket: &FetchTicket, result: Result<Vec<Product>>) -> FetchOutcome {
        if ticket.kind == FetchKind::LoadMore {
            self.load_more_in_flight = false;
        }
        let before = self.catalog_status();
        let outcome = self.catalog.complete_fetch(ticket, result);
        let changed = matches!(outcome, FetchOutcome::Applied(_));
        self.emit_catalog(before, changed);
        outcome
    }

    /// Give up on `ticket` without a response (e.g. the host dropped the request).
    ///
    /// Clears its share of `loading` and, for a load-more, the in-flight guard.
    pub fn abandon_fetch(&mut self, ticket: &FetchTicket) {
        if ticket.kind == FetchKind::LoadMore {
            self.load_more_in_flight = false;
        }
        let before = self.catalog_status();
        self.catalog.abandon_fetch(ticket);
        self.emit_catalog(before, false);
    }

    /// Run `ticket` through the editor's source and merge the result.
    pub fn resolve(&mut self, ticket: FetchTicket) -> FetchOutcome {
        let result = self.source.search(&ticket.query, ticket.page);
        self.finish_fetch(&ticket, result)
    }

    /// Search for `query` and wait for the first page.
    pub fn search(&mut self, query: impl Into<String>) -> FetchOutcome {
        let ticket = self.begin_search(query);
        self.resolve(ticket)
    }

    /// Fetch the next page synchronously. `None` if suppressed.
    pub fn load_more(&mut self) -> Option<FetchOutcome> {
        let ticket = self.begin_load_more()?;
        Some(self.resolve(ticket))
    }

    // -- Picker ------------------------------------------------------------

    /// Open the picker for the slot at `index`.
    ///
    /// Returns the first-page ticket when the catalog has nothing loaded yet.
    /// An out-of-range index leaves the picker closed.
    pub fn open_picker(&mut self, index: usize) -> Option<FetchTicket> {
        if index >= self.list.len() {
            tracing::debug!(index, len = self.list.len(), "open_picker: no such slot");
            return None;
        }
        self.picker_slot = Some(index);
        self.scroll.reset();
        if self.catalog.products().is_empty() && self.catalog.page() == 1 {
            let query = self.catalog.search_query().to_string();
            Some(self.begin_fetch(1, &query, FetchKind::Search))
        } else {
            None
        }
    }

    /// Close the picker without touching the selection list.
    pub fn close_picker(&mut self) {
        self.picker_slot = None;
        self.search_input.cancel();
    }

    /// Copy the catalog selection into the slot being edited and close the picker.
    ///
    /// Returns `true` if the slot was replaced. With nothing selected the slot
    /// is left as it was.
    pub fn confirm_picker(&mut self) -> bool {
        let Some(index) = self.picker_slot else {
            return false;
        };
        let picked = bridge::snapshot_selected(self.catalog.products());
        self.close_picker();
        self.replace_slot(index, picked)
    }

    /// Feed a keystroke from the search box.
    pub fn on_search_input(&mut self, text: impl Into<String>, now: Instant) {
        self.search_input.input(text, now);
    }

    /// Start a search once the input has settled.
    pub fn poll_search(&mut self, now: Instant) -> Option<FetchTicket> {
        let query = self.search_input.poll(now)?;
        Some(self.begin_search(query))
    }

    /// React to the picker list being scrolled.
    pub fn on_scroll(&mut self, metrics: ScrollMetrics, now: Instant) -> Option<FetchTicket> {
        if !self.scroll.admit(now) || !metrics.near_bottom() {
            return None;
        }
        self.begin_load_more()
    }
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

impl<S> fmt::Display for UpsellEditor<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "UpsellEditor(slots={}, catalog={}, query={:?}, page={}, picker={:?})",
            self.list.len(),
            self.catalog.products().len(),
            self.catalog.search_query(),
            self.catalog.page(),
            self.picker_slot
        )
    }
}

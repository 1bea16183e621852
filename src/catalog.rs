//! Catalog store: the paginated, searchable, selectable view of the remote catalog.
//!
//! Fetching is split in two halves so several requests can be outstanding at
//! once. [`CatalogState::begin_fetch`] records the dispatch and hands back a
//! [`FetchTicket`] tagged with the search generation active at that moment;
//! [`CatalogState::complete_fetch`] takes the ticket and the response. Every
//! [`CatalogState::set_search_query`] starts a new generation, even when the
//! text is unchanged, so a response dispatched before the most recent search
//! is dropped. There is no cancellation: stale results are detected after the
//! fact.

use crate::config::PAGE_SIZE;
use crate::error::Result;
use crate::models::Product;

// ---------------------------------------------------------------------------
// FetchTicket
// ---------------------------------------------------------------------------

/// Why a fetch was dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchKind {
    /// First page for a (new) query.
    Search,
    /// Next page for infinite scroll.
    LoadMore,
}

/// Handle for one in-flight catalog request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub page: u32,
    pub query: String,
    pub kind: FetchKind,
    /// Search generation the request belongs to.
    pub generation: u64,
}

/// What [`CatalogState::complete_fetch`] did with a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Products merged; carries the number received.
    Applied(usize),
    /// A new search started while the request was in flight; nothing merged.
    Stale,
    /// The request failed; the message is now the store's `error`.
    Failed(String),
}

// ---------------------------------------------------------------------------
// CatalogAction
// ---------------------------------------------------------------------------

/// A synchronous transition of the catalog store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogAction {
    SetSearchQuery(String),
    ToggleProduct { product_id: i64 },
    ToggleVariant { product_id: i64, variant_id: i64 },
}

// ---------------------------------------------------------------------------
// CatalogState
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct CatalogState {
    products: Vec<Product>,
    page: u32,
    has_more: bool,
    in_flight: usize,
    error: Option<String>,
    search_query: String,
    generation: u64,
}

impl Default for CatalogState {
    fn default() -> Self {
        Self {
            products: Vec::new(),
            page: 1,
            has_more: true,
            in_flight: 0,
            error: None,
            search_query: String::new(),
            generation: 0,
        }
    }
}

impl CatalogState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Local page counter. Starts at 1 and advances once per merged response,
    /// so it is also the next page to request.
    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    /// `true` while at least one request is outstanding.
    ///
    /// Every ticket from [`begin_fetch`](Self::begin_fetch) must come back
    /// through [`complete_fetch`](Self::complete_fetch) or
    /// [`abandon_fetch`](Self::abandon_fetch), or this stays set.
    pub fn loading(&self) -> bool {
        self.in_flight > 0
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    /// Bumped by every [`set_search_query`](Self::set_search_query).
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn product(&self, product_id: i64) -> Option<&Product> {
        self.products.iter().find(|p| p.id == product_id)
    }

    /// Number of products currently flagged as selected.
    pub fn selected_count(&self) -> usize {
        self.products.iter().filter(|p| p.selected).count()
    }

    /// Products whose title contains the current query, ignoring case.
    pub fn visible_products(&self) -> Vec<&Product> {
        let needle = self.search_query.to_lowercase();
        self.products
            .iter()
            .filter(|p| p.title.to_lowercase().contains(&needle))
            .collect()
    }

    /// Dispatch a [`CatalogAction`]. Returns `true` if the state changed.
    pub fn apply(&mut self, action: CatalogAction) -> bool {
        match action {
            CatalogAction::SetSearchQuery(query) => {
                self.set_search_query(query);
                true
            }
            CatalogAction::ToggleProduct { product_id } => {
                self.toggle_product_selection(product_id)
            }
            CatalogAction::ToggleVariant {
                product_id,
                variant_id,
            } => self.toggle_variant_selection(product_id, variant_id),
        }
    }

    /// Start a new search: clears results, resets pagination and
    /// invalidates every request dispatched before it.
    pub fn set_search_query(&mut self, query: impl Into<String>) {
        self.search_query = query.into();
        self.generation += 1;
        self.products.clear();
        self.page = 1;
        self.has_more = true;
    }

    /// Record the dispatch of a request for `page` of `query`.
    pub fn begin_fetch(&mut self, page: u32, query: &str, kind: FetchKind) -> FetchTicket {
        self.in_flight += 1;
        self.error = None;
        tracing::debug!(page, query, ?kind, "dispatching catalog fetch");
        FetchTicket {
            page,
            query: query.to_string(),
            kind,
            generation: self.generation,
        }
    }

    /// Release a ticket whose response will never be delivered.
    pub fn abandon_fetch(&mut self, ticket: &FetchTicket) {
        self.in_flight = self.in_flight.saturating_sub(1);
        tracing::debug!(page = ticket.page, query = %ticket.query, "catalog fetch abandoned");
    }

    /// Merge the result of the request identified by `ticket`.
    ///
    /// Responses (successful or not) from an earlier search generation are
    /// discarded without touching `error`. On success page 1 replaces the
    /// product list and later pages append; `has_more` becomes "the page was
    /// full" and the local page counter advances by one. On failure only
    /// `error` changes.
    pub fn complete_fetch(&mut self, ticket: &FetchTicket, result: Result<Vec<Product>>) -> FetchOutcome {
        self.in_flight = self.in_flight.saturating_sub(1);

        if ticket.generation != self.generation {
            tracing::debug!(
                page = ticket.page,
                stale_query = %ticket.query,
                current_query = %self.search_query,
                stale_generation = ticket.generation,
                current_generation = self.generation,
                "dropping stale catalog response"
            );
            return FetchOutcome::Stale;
        }

        match result {
            Ok(products) => {
                let received = products.len();
                if ticket.page == 1 {
                    self.products = products;
                } else {
                    self.products.extend(products);
                }
                self.has_more = received == PAGE_SIZE;
                self.page += 1;
                tracing::info!(
                    page = ticket.page,
                    received,
                    total = self.products.len(),
                    has_more = self.has_more,
                    "catalog page merged"
                );
                FetchOutcome::Applied(received)
            }
            Err(e) => {
                let message = e.to_string();
                tracing::warn!(page = ticket.page, query = %ticket.query, "catalog fetch failed: {}", message);
                self.error = Some(message.clone());
                FetchOutcome::Failed(message)
            }
        }
    }

    /// Flip a product's flag and cascade it to all of its variants.
    ///
    /// A product without variants cannot be selected; toggling it is a no-op.
    pub fn toggle_product_selection(&mut self, product_id: i64) -> bool {
        match self.products.iter_mut().find(|p| p.id == product_id) {
            Some(product) if product.variants.is_empty() => {
                tracing::debug!(product_id, "toggle_product_selection: product has no variants");
                false
            }
            Some(product) => {
                let selected = !product.selected;
                product.select_all(selected);
                true
            }
            None => false,
        }
    }

    /// Flip one variant, then recompute the product flag from its variants.
    pub fn toggle_variant_selection(&mut self, product_id: i64, variant_id: i64) -> bool {
        let Some(product) = self.products.iter_mut().find(|p| p.id == product_id) else {
            return false;
        };
        let found = match product.variant_mut(variant_id) {
            Some(variant) => {
                variant.selected = !variant.selected;
                true
            }
            None => false,
        };
        let before = product.selected;
        product.recompute_selected();
        found || before != product.selected
    }
}

//! Selection list store: the ordered upsell slots the operator is building.
//!
//! Every mutation is total. Unknown ids and out-of-range indices leave the
//! list untouched, and each transition reports whether anything changed so
//! the dispatcher knows when to emit [`StoreEvent::SlotsChanged`].
//!
//! [`StoreEvent::SlotsChanged`]: crate::events::StoreEvent::SlotsChanged

use crate::bridge;
use crate::catalog::CatalogState;
use crate::config::{PLACEHOLDER_TITLE, REFILL_PLACEHOLDER_TITLE};
use crate::models::{Discount, DiscountType, Product};
use rust_decimal::Decimal;

// ---------------------------------------------------------------------------
// ListAction
// ---------------------------------------------------------------------------

/// A transition of the selection list.
#[derive(Debug, Clone, PartialEq)]
pub enum ListAction {
    AddEmptySlot,
    ReplaceSlot { index: usize, products: Vec<Product> },
    RemoveSlot { id: i64 },
    ReorderSlots { from: usize, to: usize },
    ReorderVariants { slot_id: i64, from: usize, to: usize },
    ApplyDiscount { slot_id: i64, discount: Discount },
    /// Replace the whole list; an empty input leaves one placeholder.
    Hydrate(Vec<Product>),
}

/// Move one element from `from` to `to`, shifting the ones in between.
///
/// Returns `false` (and does nothing) if either index is out of range or the
/// move would not change the order.
pub(crate) fn move_item<T>(items: &mut Vec<T>, from: usize, to: usize) -> bool {
    if from >= items.len() || to >= items.len() || from == to {
        return false;
    }
    let item = items.remove(from);
    items.insert(to, item);
    true
}

// ---------------------------------------------------------------------------
// SelectionList
// ---------------------------------------------------------------------------

/// Ordered list of slots. Never empty.
#[derive(Debug, Clone)]
pub struct SelectionList {
    slots: Vec<Product>,
    next_placeholder_id: i64,
}

impl Default for SelectionList {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionList {
    /// A list holding a single "Select Product" placeholder.
    pub fn new() -> Self {
        let mut list = Self {
            slots: Vec::new(),
            next_placeholder_id: -1,
        };
        let first = list.placeholder(PLACEHOLDER_TITLE);
        list.slots.push(first);
        list
    }

    pub fn slots(&self) -> &[Product] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Always `false`; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Product> {
        self.slots.get(index)
    }

    pub fn find(&self, slot_id: i64) -> Option<&Product> {
        self.slots.iter().find(|p| p.id == slot_id)
    }

    /// Placeholder ids count down from -1 so they never collide with catalog ids.
    fn placeholder(&mut self, title: &str) -> Product {
        let id = self.next_placeholder_id;
        self.next_placeholder_id -= 1;
        Product::placeholder(id, title)
    }

    /// Dispatch a [`ListAction`]. Returns `true` if the list changed.
    pub fn apply(&mut self, action: ListAction) -> bool {
        match action {
            ListAction::AddEmptySlot => {
                self.add_empty_slot();
                true
            }
            ListAction::ReplaceSlot { index, products } => self.replace_slot(index, products),
            ListAction::RemoveSlot { id } => self.remove_slot(id),
            ListAction::ReorderSlots { from, to } => self.reorder_slots(from, to),
            ListAction::ReorderVariants { slot_id, from, to } => {
                self.reorder_variants(slot_id, from, to)
            }
            ListAction::ApplyDiscount { slot_id, discount } => {
                self.apply_discount(slot_id, discount.kind, discount.value)
            }
            ListAction::Hydrate(products) => {
                self.hydrate(products);
                true
            }
        }
    }

    /// Append one placeholder slot.
    pub fn add_empty_slot(&mut self) {
        let slot = self.placeholder(PLACEHOLDER_TITLE);
        self.slots.push(slot);
    }

    /// Replace the slot at `index` with `products`, one slot each, in order.
    ///
    /// Only variants flagged `selected` survive. An out-of-range `index` is a
    /// no-op; so is an empty `products` (a slot is never replaced by nothing).
    pub fn replace_slot(&mut self, index: usize, products: Vec<Product>) -> bool {
        if index >= self.slots.len() {
            tracing::debug!(index, len = self.slots.len(), "replace_slot: index out of range");
            return false;
        }
        if products.is_empty() {
            tracing::debug!(index, "replace_slot: no products to place");
            return false;
        }
        let filtered = products.into_iter().map(bridge::retain_selected_variants);
        self.slots.splice(index..=index, filtered);
        true
    }

    /// Remove every slot whose id is `id`.
    ///
    /// If that empties the list an "Empty Product" placeholder is put back.
    pub fn remove_slot(&mut self, id: i64) -> bool {
        let before = self.slots.len();
        self.slots.retain(|p| p.id != id);
        if self.slots.len() == before {
            return false;
        }
        if self.slots.is_empty() {
            let refill = self.placeholder(REFILL_PLACEHOLDER_TITLE);
            self.slots.push(refill);
        }
        true
    }

    pub fn reorder_slots(&mut self, from: usize, to: usize) -> bool {
        move_item(&mut self.slots, from, to)
    }

    /// Move a variant within the slot `slot_id`. Unknown slot or bad indices: no-op.
    pub fn reorder_variants(&mut self, slot_id: i64, from: usize, to: usize) -> bool {
        match self.slots.iter_mut().find(|p| p.id == slot_id) {
            Some(slot) => move_item(&mut slot.variants, from, to),
            None => false,
        }
    }

    /// Set or overwrite the discount on slot `slot_id`.
    pub fn apply_discount(&mut self, slot_id: i64, kind: DiscountType, value: Decimal) -> bool {
        match self.slots.iter_mut().find(|p| p.id == slot_id) {
            Some(slot) => {
                slot.discount = Some(Discount::new(kind, value));
                true
            }
            None => {
                tracing::debug!(slot_id, "apply_discount: no such slot");
                false
            }
        }
    }

    fn hydrate(&mut self, products: Vec<Product>) {
        if products.is_empty() {
            let first = self.placeholder(PLACEHOLDER_TITLE);
            self.slots = vec![first];
        } else {
            self.slots = products;
        }
    }

    /// Replace the whole list with the catalog's current selection.
    ///
    /// Used to hydrate the editor; per-slot edits go through
    /// [`replace_slot`](Self::replace_slot).
    pub fn load_from_catalog(&mut self, catalog: &CatalogState) {
        self.hydrate(bridge::snapshot_selected(catalog.products()));
    }
}

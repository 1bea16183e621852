//! Catalog → selection list hand-off.
//!
//! Turns the products flagged in the catalog into detached slot contents.
//! The returned values are owned clones, so later catalog mutations never
//! reach a slot that has already been placed.

use crate::models::Product;

/// Keep only the variants that are currently selected.
pub fn retain_selected_variants(mut product: Product) -> Product {
    product.variants.retain(|v| v.selected);
    product
}

/// Snapshot every selected catalog product, dropping its unselected variants.
///
/// Input order is preserved.
pub fn snapshot_selected(catalog: &[Product]) -> Vec<Product> {
    catalog
        .iter()
        .filter(|p| p.selected)
        .cloned()
        .map(retain_selected_variants)
        .collect()
}

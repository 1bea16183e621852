//! Shared fixtures for the integration tests.
//!
//! Provides small product builders and `FakeCatalog`, an in-memory
//! `CatalogSource` that pages through fixed result sets per query and can be
//! told to fail.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use rust_decimal::Decimal;
use upsell_picker::models::{Product, ProductImage, Variant};
use upsell_picker::{CatalogSource, Result, UpsellError};

pub fn variant(id: i64, product_id: i64, title: &str) -> Variant {
    Variant {
        id,
        product_id,
        title: title.to_string(),
        price: Decimal::new(1999, 2),
        selected: false,
    }
}

/// A product with the given `(variant_id, title)` variants, nothing selected.
pub fn product(id: i64, title: &str, variants: &[(i64, &str)]) -> Product {
    Product {
        id,
        title: title.to_string(),
        variants: variants
            .iter()
            .map(|(vid, vt)| variant(*vid, id, vt))
            .collect(),
        image: ProductImage {
            id: Some(id * 100),
            product_id: Some(id),
            src: format!("https://cdn.example.com/{}.png", id),
        },
        selected: false,
        is_empty: false,
        discount: None,
    }
}

/// Product 1 "Shoe" with variants 11 "Small" and 12 "Large".
pub fn shoe() -> Product {
    product(1, "Shoe", &[(11, "Small"), (12, "Large")])
}

/// Product 2 "Hat" with variants 21 "Red", 22 "Green", 23 "Blue".
pub fn hat() -> Product {
    product(2, "Hat", &[(21, "Red"), (22, "Green"), (23, "Blue")])
}

/// `count` single-variant products with ids starting at `first_id`.
pub fn numbered(first_id: i64, count: usize, prefix: &str) -> Vec<Product> {
    (0..count as i64)
        .map(|i| {
            let id = first_id + i;
            product(id, &format!("{} {}", prefix, id), &[(id * 10, "Default")])
        })
        .collect()
}

// ---------------------------------------------------------------------------
// FakeCatalog
// ---------------------------------------------------------------------------

/// In-memory catalog: each query maps to a full result list served in pages of 10.
#[derive(Default)]
pub struct FakeCatalog {
    results: HashMap<String, Vec<Product>>,
    fail_status: Mutex<Option<u16>>,
    calls: Mutex<Vec<(String, u32)>>,
}

impl FakeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_results(mut self, query: &str, products: Vec<Product>) -> Self {
        self.results.insert(query.to_string(), products);
        self
    }

    /// Make every following request fail with `status` (`None` to recover).
    pub fn fail_with(&self, status: Option<u16>) {
        *self.fail_status.lock().unwrap() = status;
    }

    pub fn calls(&self) -> Vec<(String, u32)> {
        self.calls.lock().unwrap().clone()
    }
}

impl CatalogSource for FakeCatalog {
    fn search(&self, query: &str, page: u32) -> Result<Vec<Product>> {
        self.calls.lock().unwrap().push((query.to_string(), page));
        if let Some(status) = *self.fail_status.lock().unwrap() {
            return Err(UpsellError::Status(status));
        }
        let all = self.results.get(query).cloned().unwrap_or_default();
        let start = (page.saturating_sub(1) as usize) * 10;
        Ok(all.into_iter().skip(start).take(10).collect())
    }
}

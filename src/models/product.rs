use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use super::discount::Discount;

/// Treat an explicit JSON `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ---------------------------------------------------------------------------
// Variant
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub product_id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub price: Decimal,
    /// Transient picker state; each store keeps its own copy.
    #[serde(default, deserialize_with = "null_as_default")]
    pub selected: bool,
}

// ---------------------------------------------------------------------------
// ProductImage
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductImage {
    pub id: Option<i64>,
    pub product_id: Option<i64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub src: String,
}

// ---------------------------------------------------------------------------
// Product
// ---------------------------------------------------------------------------

/// A catalog product, or one slot of the selection list.
///
/// In the catalog `selected` is derived from the variants (see
/// [`Product::recompute_selected`]). In the selection list a product is
/// either a placeholder (`is_empty`) or a detached snapshot that may carry a
/// per-slot [`Discount`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub variants: Vec<Variant>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub image: ProductImage,
    #[serde(default, deserialize_with = "null_as_default")]
    pub selected: bool,
    #[serde(rename = "isEmpty", default, deserialize_with = "null_as_default")]
    pub is_empty: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount: Option<Discount>,
}

impl Product {
    /// A slot standing in for "no product chosen yet".
    pub fn placeholder(id: i64, title: &str) -> Self {
        Self {
            id,
            title: title.to_string(),
            variants: Vec::new(),
            image: ProductImage::default(),
            selected: false,
            is_empty: true,
            discount: None,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.is_empty
    }

    /// Set `selected` to whether any variant is selected.
    pub fn recompute_selected(&mut self) {
        self.selected = self.variants.iter().any(|v| v.selected);
    }

    /// Set the product flag and cascade it to every variant.
    pub fn select_all(&mut self, selected: bool) {
        self.selected = selected;
        for variant in &mut self.variants {
            variant.selected = selected;
        }
    }

    pub fn variant_mut(&mut self, variant_id: i64) -> Option<&mut Variant> {
        self.variants.iter_mut().find(|v| v.id == variant_id)
    }

    pub fn selected_variant_count(&self) -> usize {
        self.variants.iter().filter(|v| v.selected).count()
    }
}

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::UpsellError;

// ---------------------------------------------------------------------------
// DiscountType
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountType {
    Flat,
    Percentage,
}

impl fmt::Display for DiscountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiscountType::Flat => f.write_str("flat"),
            DiscountType::Percentage => f.write_str("percentage"),
        }
    }
}

impl FromStr for DiscountType {
    type Err = UpsellError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "flat" => Ok(DiscountType::Flat),
            "percentage" => Ok(DiscountType::Percentage),
            other => Err(UpsellError::InvalidArgument(format!(
                "Unknown discount type: {}",
                other
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Discount
// ---------------------------------------------------------------------------

/// A discount attached to one selection-list slot.
///
/// `value` is stored as given; sign and range checks belong to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Discount {
    #[serde(rename = "type")]
    pub kind: DiscountType,
    pub value: Decimal,
}

impl Discount {
    pub fn new(kind: DiscountType, value: Decimal) -> Self {
        Self { kind, value }
    }
}

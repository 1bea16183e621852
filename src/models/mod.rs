pub mod discount;
pub mod product;

pub use discount::*;
pub use product::*;

//! Data model: inventory items with their adjustment ledgers, and recipe
//! ingredient lines with their normalized shadows.

pub mod inventory;
pub mod recipe;

pub use inventory::{
    AdjustmentOutcome, AdjustmentType, InventoryItem, ItemFilter, NewInventoryItem,
    StockAdjustment, StockAdjustmentRequest, StockStatus,
};
pub use recipe::{ProductIngredient, Recipe, StockSufficiency};

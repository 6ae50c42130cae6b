//! Service layer: the inventory item ledger and the recipe ingredient
//! normalizer.

pub mod inventory;
pub mod recipes;

pub use inventory::InventoryService;
pub use recipes::RecipeService;

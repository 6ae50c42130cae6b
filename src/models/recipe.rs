use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::units::Unit;

/// One ingredient line of a recipe, as entered by the recipe editor, plus the
/// derived normalized shadow.
///
/// The shadow (`base_quantity`, `base_unit`, `display_quantity`,
/// `display_unit`, `conversion_note`) is cached so cost and sufficiency reads
/// never re-derive conversions from the raw entry. It is re-derived whenever
/// `quantity` or `unit` changes and is never hand-edited. `conversion_note`
/// is non-empty exactly when `unit` differs from the item's canonical unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductIngredient {
    /// Non-owning reference to the inventory item this line draws from.
    pub inventory_item_id: Uuid,
    pub name: String,
    pub quantity: Decimal,
    pub unit: Unit,
    pub base_quantity: Option<Decimal>,
    pub base_unit: Option<Unit>,
    pub display_quantity: Option<Decimal>,
    pub display_unit: Option<Unit>,
    pub conversion_note: Option<String>,
}

impl ProductIngredient {
    pub fn new(
        inventory_item_id: Uuid,
        name: impl Into<String>,
        quantity: Decimal,
        unit: Unit,
    ) -> Self {
        Self {
            inventory_item_id,
            name: name.into(),
            quantity,
            unit,
            base_quantity: None,
            base_unit: None,
            display_quantity: None,
            display_unit: None,
            conversion_note: None,
        }
    }

    /// Whether the shadow has been derived for the current entry.
    pub fn is_normalized(&self) -> bool {
        self.base_quantity.is_some() && self.base_unit.is_some()
    }
}

/// An ordered list of ingredient lines for one sellable product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipe {
    pub id: Uuid,
    pub name: String,
    pub ingredients: Vec<ProductIngredient>,
}

impl Recipe {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            ingredients: Vec::new(),
        }
    }
}

/// Read-only projection comparing a line's requirement against an item's
/// available stock, both in the item's canonical unit.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StockSufficiency {
    pub sufficient: bool,
    pub required: Decimal,
    pub available: Decimal,
    pub unit: Unit,
}

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::EnumIter;
use uuid::Uuid;
use validator::Validate;

use crate::units::Unit;

/// Stock level relative to the item's thresholds.
///
/// Evaluated critical -> low -> warning -> ok, first match wins.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StockStatus {
    Ok,
    Warning,
    Low,
    Critical,
}

/// The typed reasons a stock level can change.
///
/// All types are deltas except `Correction`, which replaces the stock level
/// absolutely (a recount).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AdjustmentType {
    Restock,
    Usage,
    Waste,
    Correction,
    Deduction,
}

impl AdjustmentType {
    /// True for the types that subtract from stock.
    pub fn is_subtractive(self) -> bool {
        matches!(
            self,
            AdjustmentType::Usage | AdjustmentType::Waste | AdjustmentType::Deduction
        )
    }
}

/// One immutable entry in an item's adjustment ledger.
///
/// Created atomically with the stock mutation it records; never edited or
/// deleted independently of the item. Quantities are in the item's canonical
/// unit, post-conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockAdjustment {
    pub id: Uuid,
    pub adjustment_type: AdjustmentType,
    pub quantity: Decimal,
    pub previous_stock: Decimal,
    pub new_stock: Decimal,
    pub notes: Option<String>,
    pub actor: Option<String>,
    pub reference: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

/// A stock record.
///
/// `unit` is the immutable canonical unit every persisted quantity on this
/// item is expressed in: `current_stock` and the thresholds are always
/// directly comparable without conversion. Only I/O boundaries convert.
/// `display_unit` is what humans see and must share the canonical unit's
/// category. The item owns its append-only adjustment history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: Uuid,
    pub name: String,
    pub category: Option<String>,
    pub unit: Unit,
    pub display_unit: Unit,
    pub current_stock: Decimal,
    pub min_stock: Decimal,
    pub max_stock: Option<Decimal>,
    pub reorder_point: Option<Decimal>,
    /// g/mL, for items that cross weight/volume in recipes.
    pub density: Option<Decimal>,
    /// Priced per `display_unit`.
    pub price_per_unit: Decimal,
    pub status: StockStatus,
    pub last_restocked: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub adjustments: Vec<StockAdjustment>,
}

impl InventoryItem {
    /// Status of a hypothetical stock level against this item's thresholds.
    /// `critical_ratio` is the fraction of `min_stock` below which stock is
    /// critical.
    pub fn status_for(&self, stock: Decimal, critical_ratio: Decimal) -> StockStatus {
        if stock <= self.min_stock * critical_ratio {
            StockStatus::Critical
        } else if stock <= self.min_stock {
            StockStatus::Low
        } else if self.reorder_point.is_some_and(|rp| stock <= rp) {
            StockStatus::Warning
        } else {
            StockStatus::Ok
        }
    }

    /// Status of the current stock level.
    pub fn compute_status(&self, critical_ratio: Decimal) -> StockStatus {
        self.status_for(self.current_stock, critical_ratio)
    }

    /// The price normalized to one canonical unit.
    ///
    /// `price_per_unit` is per `display_unit`; dividing by the factor ratio
    /// re-expresses it per `unit`, so recipe cost sums never mix prices quoted
    /// in different display units.
    pub fn price_per_base_unit(&self) -> Decimal {
        self.price_per_unit * self.unit.factor() / self.display_unit.factor()
    }
}

/// Creation input for an inventory item.
///
/// The opening stock may be supplied in `stock_unit`; it is converted to the
/// canonical `unit` before anything is persisted.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewInventoryItem {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    #[validate(length(max = 60))]
    pub category: Option<String>,
    /// The canonical ledger unit. Immutable after creation.
    pub unit: Unit,
    /// Defaults to `unit`; must share its category.
    pub display_unit: Option<Unit>,
    pub current_stock: Decimal,
    /// Unit the opening stock is expressed in, when not `unit`.
    pub stock_unit: Option<Unit>,
    pub min_stock: Decimal,
    pub max_stock: Option<Decimal>,
    pub reorder_point: Option<Decimal>,
    pub density: Option<Decimal>,
    /// Priced per display unit.
    pub price_per_unit: Decimal,
}

impl NewInventoryItem {
    pub fn new(name: impl Into<String>, unit: Unit) -> Self {
        Self {
            name: name.into(),
            category: None,
            unit,
            display_unit: None,
            current_stock: Decimal::ZERO,
            stock_unit: None,
            min_stock: Decimal::ZERO,
            max_stock: None,
            reorder_point: None,
            density: None,
            price_per_unit: Decimal::ZERO,
        }
    }
}

/// Input for a single stock adjustment.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct StockAdjustmentRequest {
    pub adjustment_type: AdjustmentType,
    pub quantity: Decimal,
    /// Unit the quantity is expressed in; defaults to the item's canonical
    /// unit. Any unit convertible to it is accepted, including across the
    /// weight/volume bridge when a density is resolvable.
    pub unit: Option<Unit>,
    #[validate(length(max = 500))]
    pub notes: Option<String>,
    #[validate(length(max = 120))]
    pub actor: Option<String>,
    #[validate(length(max = 120))]
    pub reference: Option<String>,
}

impl StockAdjustmentRequest {
    pub fn new(adjustment_type: AdjustmentType, quantity: Decimal) -> Self {
        Self {
            adjustment_type,
            quantity,
            unit: None,
            notes: None,
            actor: None,
            reference: None,
        }
    }

    pub fn in_unit(mut self, unit: Unit) -> Self {
        self.unit = Some(unit);
        self
    }
}

/// Result of a successfully applied adjustment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdjustmentOutcome {
    pub new_stock: Decimal,
    pub status: StockStatus,
    pub adjustment: StockAdjustment,
}

/// Read-side filter for listing inventory items.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItemFilter {
    pub category: Option<String>,
    pub status: Option<StockStatus>,
    /// Case-insensitive substring match over the item name.
    pub search: Option<String>,
}

impl ItemFilter {
    pub fn by_status(status: StockStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn matches(&self, item: &InventoryItem) -> bool {
        if let Some(category) = &self.category {
            match &item.category {
                Some(c) if c.eq_ignore_ascii_case(category) => {}
                _ => return false,
            }
        }
        if let Some(status) = self.status {
            if item.status != status {
                return false;
            }
        }
        if let Some(search) = &self.search {
            if !item
                .name
                .to_lowercase()
                .contains(&search.trim().to_lowercase())
            {
                return false;
            }
        }
        true
    }
}

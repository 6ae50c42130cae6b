//! The inventory item ledger.
//!
//! Every `(quantity, unit)` pair a caller supplies flows through the
//! conversion engine before it is stored; `current_stock` and the thresholds
//! are always in the item's canonical unit. Applying an adjustment is the
//! only way stock changes, and the adjustment record is appended atomically
//! with the mutation it causes.

use chrono::Utc;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

use crate::config::EngineConfig;
use crate::errors::InventoryError;
use crate::events::{Event, EventSender};
use crate::models::{
    AdjustmentOutcome, AdjustmentType, InventoryItem, ItemFilter, NewInventoryItem,
    StockAdjustment, StockAdjustmentRequest, StockStatus,
};
use crate::store::InventoryStore;
use crate::units::convert::{convert, format_quantity_with_scale};
use crate::units::density::DensityTable;

/// Service managing inventory items and their adjustment ledgers.
#[derive(Clone)]
pub struct InventoryService {
    store: Arc<dyn InventoryStore>,
    densities: Arc<DensityTable>,
    event_sender: EventSender,
    config: EngineConfig,
}

impl InventoryService {
    pub fn new(
        store: Arc<dyn InventoryStore>,
        densities: Arc<DensityTable>,
        event_sender: EventSender,
        config: EngineConfig,
    ) -> Self {
        Self {
            store,
            densities,
            event_sender,
            config,
        }
    }

    /// Create an inventory item.
    ///
    /// The canonical `unit` is fixed here for the item's lifetime. An opening
    /// stock supplied in another unit is converted before anything is
    /// persisted, so the stored `current_stock` is always in `unit`.
    #[instrument(skip(self, new_item), fields(item_name = %new_item.name))]
    pub fn create_item(&self, new_item: NewInventoryItem) -> Result<InventoryItem, InventoryError> {
        new_item.validate()?;
        self.check_creation_bounds(&new_item)?;

        let display_unit = new_item.display_unit.unwrap_or(new_item.unit);
        if display_unit.category() != new_item.unit.category() {
            return Err(InventoryError::ValidationError(format!(
                "display unit {display_unit} must share the category of the canonical unit {}",
                new_item.unit
            )));
        }

        let opening_stock = match new_item.stock_unit {
            Some(stock_unit) if stock_unit != new_item.unit => convert(
                new_item.current_stock,
                stock_unit,
                new_item.unit,
                Some(&new_item.name),
                new_item.density,
                &self.densities,
            )?,
            _ => new_item.current_stock,
        };

        let now = Utc::now();
        let mut item = InventoryItem {
            id: Uuid::new_v4(),
            name: new_item.name,
            category: new_item.category,
            unit: new_item.unit,
            display_unit,
            current_stock: format_quantity_with_scale(
                opening_stock,
                new_item.unit,
                self.config.decimal_scale,
            ),
            min_stock: new_item.min_stock,
            max_stock: new_item.max_stock,
            reorder_point: new_item.reorder_point,
            density: new_item.density,
            price_per_unit: new_item.price_per_unit,
            status: StockStatus::Ok,
            last_restocked: None,
            created_at: now,
            updated_at: now,
            adjustments: Vec::new(),
        };
        item.status = item.compute_status(self.config.critical_stock_ratio);

        self.store.insert(item.clone())?;
        info!(
            item_id = %item.id,
            unit = %item.unit,
            opening_stock = %item.current_stock,
            status = %item.status,
            "inventory item created"
        );
        self.emit(Event::ItemCreated {
            item_id: item.id,
            name: item.name.clone(),
        });
        Ok(item)
    }

    /// Apply one stock adjustment and append it to the item's ledger.
    ///
    /// Validation or conversion failure aborts the whole operation: no ledger
    /// entry, no stock change. Subtractive types clamp at zero; `Correction`
    /// replaces the stock level absolutely.
    #[instrument(
        skip(self, request),
        fields(item_id = %item_id, adjustment_type = %request.adjustment_type)
    )]
    pub fn adjust_stock(
        &self,
        item_id: Uuid,
        request: StockAdjustmentRequest,
    ) -> Result<AdjustmentOutcome, InventoryError> {
        request.validate()?;
        if request.quantity < Decimal::ZERO {
            return Err(InventoryError::InvalidQuantity(format!(
                "adjustment quantity cannot be negative, got {}",
                request.quantity
            )));
        }
        if request.quantity > self.config.max_adjustment_quantity {
            return Err(InventoryError::InvalidQuantity(format!(
                "adjustment quantity {} exceeds the sanity ceiling {}",
                request.quantity, self.config.max_adjustment_quantity
            )));
        }

        let mut outcome: Option<AdjustmentOutcome> = None;
        let mut previous_status: Option<StockStatus> = None;

        let committed = self.store.update_with(item_id, &mut |item| {
            // Translate the request into the item's canonical unit, failing
            // closed before anything is touched.
            let quantity_in_unit = match request.unit {
                Some(unit) if unit != item.unit => convert(
                    request.quantity,
                    unit,
                    item.unit,
                    Some(&item.name),
                    item.density,
                    &self.densities,
                )?,
                _ => request.quantity,
            };
            let quantity =
                format_quantity_with_scale(quantity_in_unit, item.unit, self.config.decimal_scale);

            let previous_stock = item.current_stock;
            let new_stock = match request.adjustment_type {
                AdjustmentType::Restock => previous_stock + quantity,
                AdjustmentType::Correction => quantity,
                AdjustmentType::Usage | AdjustmentType::Waste | AdjustmentType::Deduction => {
                    (previous_stock - quantity).max(Decimal::ZERO)
                }
            };

            let now = Utc::now();
            previous_status = Some(item.status);
            item.current_stock = new_stock;
            item.status = item.compute_status(self.config.critical_stock_ratio);
            item.updated_at = now;
            if request.adjustment_type == AdjustmentType::Restock {
                item.last_restocked = Some(now);
            }

            let adjustment = StockAdjustment {
                id: Uuid::new_v4(),
                adjustment_type: request.adjustment_type,
                quantity,
                previous_stock,
                new_stock,
                notes: request.notes.clone(),
                actor: request.actor.clone(),
                reference: request.reference.clone(),
                recorded_at: now,
            };
            item.adjustments.push(adjustment.clone());

            outcome = Some(AdjustmentOutcome {
                new_stock,
                status: item.status,
                adjustment,
            });
            Ok(())
        })?;

        let outcome = outcome.expect("update closure ran on success");
        let previous_status = previous_status.expect("update closure ran on success");

        info!(
            quantity = %outcome.adjustment.quantity,
            previous_stock = %outcome.adjustment.previous_stock,
            new_stock = %outcome.new_stock,
            status = %outcome.status,
            "stock adjusted"
        );

        self.emit(Event::StockAdjusted {
            item_id,
            adjustment_type: request.adjustment_type,
            previous_stock: outcome.adjustment.previous_stock,
            new_stock: outcome.new_stock,
        });
        match (previous_status, outcome.status) {
            (prev, StockStatus::Critical) if prev != StockStatus::Critical => {
                self.emit(Event::StockCritical {
                    item_id,
                    current_stock: outcome.new_stock,
                    min_stock: committed.min_stock,
                });
            }
            (prev, StockStatus::Low) if prev != StockStatus::Low && prev != StockStatus::Critical => {
                self.emit(Event::StockLow {
                    item_id,
                    current_stock: outcome.new_stock,
                    min_stock: committed.min_stock,
                });
            }
            _ => {}
        }

        Ok(outcome)
    }

    /// One item by id.
    pub fn get_item(&self, item_id: Uuid) -> Result<InventoryItem, InventoryError> {
        self.store
            .get(item_id)
            .ok_or(InventoryError::ItemNotFound(item_id))
    }

    /// Items matching the filter, name-ordered.
    #[instrument(skip(self, filter))]
    pub fn list_items(&self, filter: &ItemFilter) -> Vec<InventoryItem> {
        self.store.fetch(filter)
    }

    /// Delete an item and its ledger. Recipes referencing it are left alone;
    /// cascading is a policy decision for the surrounding system.
    #[instrument(skip(self))]
    pub fn delete_item(&self, item_id: Uuid) -> Result<InventoryItem, InventoryError> {
        let item = self
            .store
            .remove(item_id)
            .ok_or(InventoryError::ItemNotFound(item_id))?;
        info!(item_name = %item.name, "inventory item deleted");
        self.emit(Event::ItemDeleted { item_id });
        Ok(item)
    }

    /// Items at or below their minimum stock (low and critical).
    pub fn low_stock_alerts(&self) -> Vec<InventoryItem> {
        let mut items = self.store.fetch(&ItemFilter::by_status(StockStatus::Low));
        items.extend(self.critical_stock_alerts());
        items.sort_by(|a, b| a.name.cmp(&b.name));
        items
    }

    /// Items in critical state.
    pub fn critical_stock_alerts(&self) -> Vec<InventoryItem> {
        self.store
            .fetch(&ItemFilter::by_status(StockStatus::Critical))
    }

    fn check_creation_bounds(&self, new_item: &NewInventoryItem) -> Result<(), InventoryError> {
        if new_item.current_stock < Decimal::ZERO {
            return Err(InventoryError::ValidationError(
                "opening stock cannot be negative".into(),
            ));
        }
        if new_item.min_stock < Decimal::ZERO {
            return Err(InventoryError::ValidationError(
                "minimum stock cannot be negative".into(),
            ));
        }
        if let Some(reorder_point) = new_item.reorder_point {
            if reorder_point < Decimal::ZERO {
                return Err(InventoryError::ValidationError(
                    "reorder point cannot be negative".into(),
                ));
            }
        }
        if let Some(max_stock) = new_item.max_stock {
            if max_stock < new_item.min_stock {
                return Err(InventoryError::ValidationError(
                    "maximum stock cannot be below minimum stock".into(),
                ));
            }
        }
        if new_item.price_per_unit < Decimal::ZERO {
            return Err(InventoryError::ValidationError(
                "price cannot be negative".into(),
            ));
        }
        if new_item.price_per_unit > self.config.max_price_per_unit {
            return Err(InventoryError::ValidationError(format!(
                "price {} exceeds the configured ceiling {}; check for extra zeros",
                new_item.price_per_unit, self.config.max_price_per_unit
            )));
        }
        if let Some(density) = new_item.density {
            if density <= Decimal::ZERO {
                return Err(InventoryError::ValidationError(
                    "density must be positive".into(),
                ));
            }
        }
        Ok(())
    }

    fn emit(&self, event: Event) {
        // The ledger write has already committed; a lost event must not fail
        // the operation.
        if let Err(err) = self.event_sender.send(event) {
            warn!(error = %err, "event delivery failed");
        }
    }
}

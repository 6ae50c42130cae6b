//! The recipe ingredient normalizer.
//!
//! Every ingredient line carries a base-unit-normalized shadow so cost and
//! stock-sufficiency reads never re-derive conversions from raw display
//! values. This service derives those shadows, merges duplicate lines, and
//! computes the read-only projections (sufficiency, recipe cost). It never
//! mutates stock: deduction on sale is the host calling
//! [`InventoryService::adjust_stock`] with [`AdjustmentType::Deduction`].
//!
//! [`InventoryService::adjust_stock`]: crate::services::inventory::InventoryService::adjust_stock
//! [`AdjustmentType::Deduction`]: crate::models::AdjustmentType::Deduction

use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::errors::InventoryError;
use crate::models::{InventoryItem, ProductIngredient, Recipe, StockSufficiency};
use crate::store::InventoryStore;
use crate::units::convert::{convert, format_quantity_with_scale};
use crate::units::density::DensityTable;

/// Service deriving normalized shadows and read-only projections for recipe
/// ingredient lines. Holds the store read-only.
#[derive(Clone)]
pub struct RecipeService {
    store: Arc<dyn InventoryStore>,
    densities: Arc<DensityTable>,
    config: EngineConfig,
}

impl RecipeService {
    pub fn new(
        store: Arc<dyn InventoryStore>,
        densities: Arc<DensityTable>,
        config: EngineConfig,
    ) -> Self {
        Self {
            store,
            densities,
            config,
        }
    }

    /// Add an ingredient line, or merge it into an existing line referencing
    /// the same inventory item.
    ///
    /// "Add more of the same ingredient" is an edit, not a second entry: the
    /// existing quantity is converted into the new line's unit and summed,
    /// and the new unit becomes the line's unit of record. Any conversion
    /// failure aborts the whole operation and leaves the recipe untouched.
    #[instrument(skip(self, recipe, line), fields(recipe_name = %recipe.name, ingredient = %line.name))]
    pub fn add_or_merge_ingredient(
        &self,
        recipe: &mut Recipe,
        line: ProductIngredient,
    ) -> Result<(), InventoryError> {
        let item = self.fetch_item(line.inventory_item_id)?;

        let existing = recipe
            .ingredients
            .iter_mut()
            .find(|i| i.inventory_item_id == line.inventory_item_id);

        match existing {
            Some(existing) => {
                let carried = if existing.unit == line.unit {
                    existing.quantity
                } else {
                    convert(
                        existing.quantity,
                        existing.unit,
                        line.unit,
                        Some(&item.name),
                        item.density,
                        &self.densities,
                    )?
                };
                let mut merged = line;
                merged.quantity += carried;
                self.derive_shadow(&mut merged, &item)?;
                info!(
                    item_id = %item.id,
                    merged_quantity = %merged.quantity,
                    unit = %merged.unit,
                    "merged duplicate ingredient line"
                );
                *existing = merged;
            }
            None => {
                let mut line = line;
                self.derive_shadow(&mut line, &item)?;
                recipe.ingredients.push(line);
            }
        }
        Ok(())
    }

    /// Re-derive a line's normalized shadow against its inventory item.
    ///
    /// On failure the line keeps its previous shadow; the error surfaces to
    /// the caller instead of the line being silently dropped or zeroed.
    /// Idempotent: unchanged `quantity`/`unit` always yield the same
    /// `base_quantity`.
    pub fn normalize(
        &self,
        line: &mut ProductIngredient,
        item: &InventoryItem,
    ) -> Result<(), InventoryError> {
        let mut staged = line.clone();
        self.derive_shadow(&mut staged, item)?;
        *line = staged;
        Ok(())
    }

    /// Compare a line's requirement against the item's available stock.
    /// Read-only: warns before a recipe is saved or sold, mutates nothing.
    pub fn stock_sufficiency(
        &self,
        line: &ProductIngredient,
        item: &InventoryItem,
    ) -> Result<StockSufficiency, InventoryError> {
        let required = self.base_requirement(line, item)?;
        Ok(StockSufficiency {
            sufficient: item.current_stock >= required,
            required,
            available: item.current_stock,
            unit: item.unit,
        })
    }

    /// Sufficiency of every line in a recipe, resolved through the store.
    #[instrument(skip(self, recipe), fields(recipe_name = %recipe.name))]
    pub fn recipe_sufficiency(
        &self,
        recipe: &Recipe,
    ) -> Result<Vec<(String, StockSufficiency)>, InventoryError> {
        let mut report = Vec::with_capacity(recipe.ingredients.len());
        for line in &recipe.ingredients {
            let item = self.fetch_item(line.inventory_item_id)?;
            let sufficiency = self.stock_sufficiency(line, &item)?;
            report.push((line.name.clone(), sufficiency));
        }
        Ok(report)
    }

    /// Ingredient cost of one recipe: the sum over lines of the base-unit
    /// requirement times the item's price normalized to its canonical unit.
    /// Items priced per different display units therefore never corrupt the
    /// total.
    #[instrument(skip(self, recipe), fields(recipe_name = %recipe.name))]
    pub fn total_cost(&self, recipe: &Recipe) -> Result<Decimal, InventoryError> {
        let mut total = Decimal::ZERO;
        for line in &recipe.ingredients {
            let item = self.fetch_item(line.inventory_item_id)?;
            let base_quantity = self.base_requirement(line, &item)?;
            total += base_quantity * item.price_per_base_unit();
        }
        Ok(total)
    }

    /// The line's requirement in the item's canonical unit: the cached shadow
    /// when it is current, otherwise derived on the fly (without mutating the
    /// line).
    fn base_requirement(
        &self,
        line: &ProductIngredient,
        item: &InventoryItem,
    ) -> Result<Decimal, InventoryError> {
        match (line.base_quantity, line.base_unit) {
            (Some(quantity), Some(unit)) if unit == item.unit => Ok(quantity),
            _ => {
                let converted = convert(
                    line.quantity,
                    line.unit,
                    item.unit,
                    Some(&item.name),
                    item.density,
                    &self.densities,
                )?;
                Ok(format_quantity_with_scale(
                    converted,
                    item.unit,
                    self.config.decimal_scale,
                ))
            }
        }
    }

    fn derive_shadow(
        &self,
        line: &mut ProductIngredient,
        item: &InventoryItem,
    ) -> Result<(), InventoryError> {
        let converted = convert(
            line.quantity,
            line.unit,
            item.unit,
            Some(&item.name),
            item.density,
            &self.densities,
        )?;
        let scale = self.config.decimal_scale;
        let base_quantity = format_quantity_with_scale(converted, item.unit, scale);
        let display_quantity = format_quantity_with_scale(line.quantity, line.unit, scale);

        line.base_quantity = Some(base_quantity);
        line.base_unit = Some(item.unit);
        line.display_quantity = Some(display_quantity);
        line.display_unit = Some(line.unit);
        line.conversion_note = if line.unit == item.unit {
            None
        } else {
            Some(format!(
                "{} {} = {} {}",
                display_quantity, line.unit, base_quantity, item.unit
            ))
        };
        Ok(())
    }

    fn fetch_item(&self, item_id: Uuid) -> Result<InventoryItem, InventoryError> {
        self.store
            .get(item_id)
            .ok_or(InventoryError::ItemNotFound(item_id))
    }
}

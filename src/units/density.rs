//! Ingredient densities, in grams per milliliter.
//!
//! The table is an explicit dependency of the conversion engine, passed in by
//! the caller. Absence of a density for an ingredient is a hard failure in
//! weight/volume conversions, never a 1:1 fallback.

use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;

use crate::errors::InventoryError;

static BUILTIN_DENSITIES: Lazy<HashMap<&'static str, Decimal>> = Lazy::new(|| {
    HashMap::from([
        ("water", dec!(1.0)),
        ("milk", dec!(1.03)),
        ("cream", dec!(1.01)),
        ("olive oil", dec!(0.92)),
        ("vegetable oil", dec!(0.92)),
        ("butter", dec!(0.911)),
        ("flour", dec!(0.53)),
        ("sugar", dec!(0.85)),
        ("powdered sugar", dec!(0.56)),
        ("brown sugar", dec!(0.81)),
        ("salt", dec!(1.2)),
        ("honey", dec!(1.42)),
        ("syrup", dec!(1.37)),
        ("rice", dec!(0.75)),
        ("cocoa powder", dec!(0.51)),
        ("coffee", dec!(0.4)),
        ("vinegar", dec!(1.01)),
        ("soy sauce", dec!(1.15)),
    ])
});

/// Name-keyed densities (g/mL) used to bridge weight and volume.
#[derive(Debug, Clone, Default)]
pub struct DensityTable {
    entries: HashMap<String, Decimal>,
}

impl DensityTable {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// A table seeded with common kitchen ingredients.
    pub fn builtin() -> Self {
        let entries = BUILTIN_DENSITIES
            .iter()
            .map(|(name, d)| ((*name).to_string(), *d))
            .collect();
        Self { entries }
    }

    fn key(name: &str) -> String {
        name.trim().to_lowercase()
    }

    /// Record a density for an ingredient. Densities must be positive.
    pub fn insert(
        &mut self,
        ingredient: &str,
        grams_per_ml: Decimal,
    ) -> Result<(), InventoryError> {
        if grams_per_ml <= Decimal::ZERO {
            return Err(InventoryError::InvalidQuantity(format!(
                "density for {ingredient} must be positive, got {grams_per_ml}"
            )));
        }
        self.entries.insert(Self::key(ingredient), grams_per_ml);
        Ok(())
    }

    /// Look up an ingredient's density. Case-insensitive, whitespace-trimmed.
    pub fn get(&self, ingredient: &str) -> Option<Decimal> {
        self.entries.get(&Self::key(ingredient)).copied()
    }

    /// Resolve a density for a conversion: an explicit value takes precedence
    /// over the table lookup.
    pub fn resolve(&self, explicit: Option<Decimal>, ingredient: Option<&str>) -> Option<Decimal> {
        explicit.or_else(|| ingredient.and_then(|name| self.get(name)))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

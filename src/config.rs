//! Engine configuration: rounding scale, sanity ceilings and alert
//! thresholds.
//!
//! Layered the way the host expects: built-in defaults, then optional
//! `config/{default,local}` files, then `PANTRY__`-prefixed environment
//! variables.

use config::{Config, Environment, File};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use validator::{Validate, ValidationError};

use crate::errors::InventoryError;

const DEFAULT_DECIMAL_SCALE: u32 = 2;
const CONFIG_DIR: &str = "config";

fn default_decimal_scale() -> u32 {
    DEFAULT_DECIMAL_SCALE
}

fn default_max_adjustment_quantity() -> Decimal {
    dec!(1000000)
}

fn default_max_price_per_unit() -> Decimal {
    dec!(100000)
}

fn default_critical_stock_ratio() -> Decimal {
    dec!(0.5)
}

fn validate_positive(value: &Decimal) -> Result<(), ValidationError> {
    if *value <= Decimal::ZERO {
        return Err(ValidationError::new("must_be_positive"));
    }
    Ok(())
}

fn validate_ratio(value: &Decimal) -> Result<(), ValidationError> {
    if *value <= Decimal::ZERO || *value > Decimal::ONE {
        return Err(ValidationError::new("must_be_in_unit_interval"));
    }
    Ok(())
}

/// Tunables for the inventory engine.
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Decimal places kept for continuous quantities at the persistence edge.
    #[serde(default = "default_decimal_scale")]
    #[validate(range(max = 9))]
    pub decimal_scale: u32,

    /// Sanity ceiling for a single adjustment quantity, in the item's
    /// canonical unit. Catches fat-fingered entries before they hit the
    /// ledger.
    #[serde(default = "default_max_adjustment_quantity")]
    #[validate(custom = "validate_positive")]
    pub max_adjustment_quantity: Decimal,

    /// Upper bound on `price_per_unit` at item creation. Rejects
    /// configuration mistakes such as a price entered with extra zeros.
    #[serde(default = "default_max_price_per_unit")]
    #[validate(custom = "validate_positive")]
    pub max_price_per_unit: Decimal,

    /// Fraction of `min_stock` at or below which stock is critical.
    #[serde(default = "default_critical_stock_ratio")]
    #[validate(custom = "validate_ratio")]
    pub critical_stock_ratio: Decimal,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            decimal_scale: default_decimal_scale(),
            max_adjustment_quantity: default_max_adjustment_quantity(),
            max_price_per_unit: default_max_price_per_unit(),
            critical_stock_ratio: default_critical_stock_ratio(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from the layered sources and validate it.
    pub fn load() -> Result<Self, InventoryError> {
        let settings = Config::builder()
            .add_source(File::with_name(&format!("{CONFIG_DIR}/default")).required(false))
            .add_source(File::with_name(&format!("{CONFIG_DIR}/local")).required(false))
            .add_source(Environment::with_prefix("PANTRY").separator("__"))
            .build()?;

        let config: EngineConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }
}

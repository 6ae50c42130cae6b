use serde::Serialize;
use uuid::Uuid;

use crate::units::Unit;

/// Error type for every fallible operation in the engine.
///
/// All variants are recoverable at the call boundary: the engine never panics
/// on caller input, and every failure carries enough context (offending units,
/// ingredient name, item id) for the end user to self-correct. Conversion
/// failures abort the containing operation rather than substituting a default
/// value; a silent 1:1 fallback corrupts stock data durably, a rejected
/// operation does not.
#[derive(Debug, thiserror::Error, Serialize)]
pub enum InventoryError {
    #[error("unknown unit: {symbol}")]
    UnknownUnit { symbol: String },

    #[error("incompatible units: cannot convert {from} to {to}")]
    IncompatibleUnits { from: Unit, to: Unit },

    #[error("no density known for {ingredient}; a weight/volume conversion needs one")]
    MissingDensity { ingredient: String },

    #[error("invalid quantity: {0}")]
    InvalidQuantity(String),

    #[error("inventory item {0} not found")]
    ItemNotFound(Uuid),

    #[error("validation error: {0}")]
    ValidationError(String),

    #[error("event error: {0}")]
    EventError(String),

    #[error("configuration error: {0}")]
    ConfigError(String),
}

impl From<validator::ValidationErrors> for InventoryError {
    fn from(err: validator::ValidationErrors) -> Self {
        InventoryError::ValidationError(err.to_string())
    }
}

impl From<config::ConfigError> for InventoryError {
    fn from(err: config::ConfigError) -> Self {
        InventoryError::ConfigError(err.to_string())
    }
}

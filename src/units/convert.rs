//! The conversion engine: pure functions over the unit registry and a density
//! table.
//!
//! Conversion is deliberately not transitive through an arbitrary unit graph.
//! The single supported cross-category path is weight/volume through an
//! ingredient density, via the `g`/`mL` base pair. This bounds the failure
//! surface to one well-understood ambiguity (density varies per ingredient)
//! instead of letting rounding error compound through chained hops.

use rust_decimal::{Decimal, RoundingStrategy};
use tracing::trace;

use crate::errors::InventoryError;
use crate::units::density::DensityTable;
use crate::units::{Unit, UnitCategory};

/// Decimal places kept for continuous quantities at the persistence edge.
const CONTINUOUS_SCALE: u32 = 2;

/// True iff a conversion between the two units can ever succeed: same
/// category, or the weight/volume pair (conditionally compatible, resolved
/// only through a density).
pub fn are_compatible(a: Unit, b: Unit) -> bool {
    let (ca, cb) = (a.category(), b.category());
    ca == cb || is_density_bridge(ca, cb)
}

fn is_density_bridge(a: UnitCategory, b: UnitCategory) -> bool {
    matches!(
        (a, b),
        (UnitCategory::Weight, UnitCategory::Volume)
            | (UnitCategory::Volume, UnitCategory::Weight)
    )
}

/// Convert `quantity` from one unit to another.
///
/// Same unit is the identity. Same category is a pure linear scaling through
/// the fixed factors. Weight/volume crosses through the `g`/`mL` base pair
/// using a density resolved from the explicit argument first, then the table
/// keyed by `ingredient`; if neither yields one the conversion fails with
/// [`InventoryError::MissingDensity`]. Any other category pair fails with
/// [`InventoryError::IncompatibleUnits`].
///
/// The result is unrounded; apply [`format_quantity`] exactly once at the
/// point the value is persisted.
pub fn convert(
    quantity: Decimal,
    from: Unit,
    to: Unit,
    ingredient: Option<&str>,
    density: Option<Decimal>,
    table: &DensityTable,
) -> Result<Decimal, InventoryError> {
    if from == to {
        return Ok(quantity);
    }

    let (cf, ct) = (from.category(), to.category());
    if cf == ct {
        let converted = quantity * from.factor() / to.factor();
        trace!(%quantity, %from, %to, %converted, "same-category conversion");
        return Ok(converted);
    }

    let weight_to_volume = match (cf, ct) {
        (UnitCategory::Weight, UnitCategory::Volume) => true,
        (UnitCategory::Volume, UnitCategory::Weight) => false,
        _ => return Err(InventoryError::IncompatibleUnits { from, to }),
    };

    if let Some(d) = density {
        if d <= Decimal::ZERO {
            return Err(InventoryError::InvalidQuantity(format!(
                "density must be positive, got {d}"
            )));
        }
    }
    let density = table.resolve(density, ingredient).ok_or_else(|| {
        InventoryError::MissingDensity {
            ingredient: ingredient.unwrap_or("unnamed ingredient").to_string(),
        }
    })?;

    let converted = if weight_to_volume {
        // grams -> mL -> target volume unit
        let grams = quantity * from.factor();
        let ml = grams / density;
        ml / to.factor()
    } else {
        // mL -> grams -> target weight unit
        let ml = quantity * from.factor();
        let grams = ml * density;
        grams / to.factor()
    };
    trace!(%quantity, %from, %to, %density, %converted, "density-bridged conversion");
    Ok(converted)
}

/// Normalize a quantity to its category's base unit. Same-category only, so
/// it cannot fail: the base factor is 1 by construction.
pub fn normalize_to_base(quantity: Decimal, unit: Unit) -> (Decimal, Unit) {
    let base = unit.category().base_unit();
    (quantity * unit.factor(), base)
}

/// Round a quantity to a unit-appropriate precision: count units to whole
/// numbers, continuous units to a fixed number of decimal places.
///
/// This is a display/storage rounding policy, applied once when a converted
/// value is persisted, never repeatedly, to avoid compounding drift.
pub fn format_quantity(quantity: Decimal, unit: Unit) -> Decimal {
    format_quantity_with_scale(quantity, unit, CONTINUOUS_SCALE)
}

/// [`format_quantity`] with a caller-chosen scale for continuous units
/// (the engine configuration's `decimal_scale`).
pub fn format_quantity_with_scale(quantity: Decimal, unit: Unit, scale: u32) -> Decimal {
    let scale = if unit.is_continuous() { scale } else { 0 };
    quantity
        .round_dp_with_strategy(scale, RoundingStrategy::MidpointAwayFromZero)
        .normalize()
}

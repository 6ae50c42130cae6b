//! Unit registry: the closed vocabulary of measurement units the engine
//! understands, their categories, and their fixed linear factors.
//!
//! Units never silently coerce across categories. The only cross-category
//! path is the weight/volume bridge in [`convert`], and that one requires an
//! ingredient density.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use strum::{EnumIter, IntoEnumIterator};

use crate::errors::InventoryError;

pub mod convert;
pub mod density;

/// Dimension of a measurement unit.
///
/// Units within one category are mutually convertible through their linear
/// factors; everything normalizes to the category's base unit internally.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum UnitCategory {
    Weight,
    Volume,
    Count,
    Length,
}

impl UnitCategory {
    /// The canonical unit all quantities of this category normalize to.
    pub fn base_unit(self) -> Unit {
        match self {
            UnitCategory::Weight => Unit::Gram,
            UnitCategory::Volume => Unit::Milliliter,
            UnitCategory::Count => Unit::Pieces,
            UnitCategory::Length => Unit::Centimeter,
        }
    }
}

/// A measurement unit.
///
/// The set and grouping below is the external contract shared with the UI
/// selectors; declaration order within a category is the order
/// [`Unit::compatible_units`] reports, common units first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter)]
pub enum Unit {
    // Weight
    #[serde(rename = "g")]
    Gram,
    #[serde(rename = "kg")]
    Kilogram,
    #[serde(rename = "oz")]
    Ounce,
    #[serde(rename = "lb")]
    Pound,
    // Volume
    #[serde(rename = "mL")]
    Milliliter,
    #[serde(rename = "L")]
    Liter,
    #[serde(rename = "tsp")]
    Teaspoon,
    #[serde(rename = "tbsp")]
    Tablespoon,
    #[serde(rename = "cup")]
    Cup,
    #[serde(rename = "fl_oz")]
    FluidOunce,
    // Count
    #[serde(rename = "pieces")]
    Pieces,
    #[serde(rename = "boxes")]
    Boxes,
    #[serde(rename = "bottles")]
    Bottles,
    #[serde(rename = "bags")]
    Bags,
    #[serde(rename = "packs")]
    Packs,
    // Length
    #[serde(rename = "cm")]
    Centimeter,
    #[serde(rename = "m")]
    Meter,
    #[serde(rename = "inch")]
    Inch,
}

impl Unit {
    /// The symbol used on the wire and in the UI.
    pub fn symbol(self) -> &'static str {
        match self {
            Unit::Gram => "g",
            Unit::Kilogram => "kg",
            Unit::Ounce => "oz",
            Unit::Pound => "lb",
            Unit::Milliliter => "mL",
            Unit::Liter => "L",
            Unit::Teaspoon => "tsp",
            Unit::Tablespoon => "tbsp",
            Unit::Cup => "cup",
            Unit::FluidOunce => "fl_oz",
            Unit::Pieces => "pieces",
            Unit::Boxes => "boxes",
            Unit::Bottles => "bottles",
            Unit::Bags => "bags",
            Unit::Packs => "packs",
            Unit::Centimeter => "cm",
            Unit::Meter => "m",
            Unit::Inch => "inch",
        }
    }

    /// The category this unit belongs to. Exhaustive by construction: adding
    /// a unit without a category is a compile error, not a runtime "unknown".
    pub fn category(self) -> UnitCategory {
        match self {
            Unit::Gram | Unit::Kilogram | Unit::Ounce | Unit::Pound => UnitCategory::Weight,
            Unit::Milliliter
            | Unit::Liter
            | Unit::Teaspoon
            | Unit::Tablespoon
            | Unit::Cup
            | Unit::FluidOunce => UnitCategory::Volume,
            Unit::Pieces | Unit::Boxes | Unit::Bottles | Unit::Bags | Unit::Packs => {
                UnitCategory::Count
            }
            Unit::Centimeter | Unit::Meter | Unit::Inch => UnitCategory::Length,
        }
    }

    /// Fixed linear factor relative to the category base unit:
    /// `1 unit = factor() × base`.
    ///
    /// Count units all carry factor 1: container sizes vary per item, so
    /// boxes, bottles, bags and packs are interchangeable tallies.
    pub fn factor(self) -> Decimal {
        match self {
            Unit::Gram => Decimal::ONE,
            Unit::Kilogram => dec!(1000),
            Unit::Ounce => dec!(28.349523125),
            Unit::Pound => dec!(453.59237),
            Unit::Milliliter => Decimal::ONE,
            Unit::Liter => dec!(1000),
            Unit::Teaspoon => dec!(4.92892159375),
            Unit::Tablespoon => dec!(14.78676478125),
            Unit::Cup => dec!(236.5882365),
            Unit::FluidOunce => dec!(29.5735295625),
            Unit::Pieces | Unit::Boxes | Unit::Bottles | Unit::Bags | Unit::Packs => Decimal::ONE,
            Unit::Centimeter => Decimal::ONE,
            Unit::Meter => dec!(100),
            Unit::Inch => dec!(2.54),
        }
    }

    /// Whether quantities of this unit are continuous (fractional amounts make
    /// sense) or discrete tallies. Drives the display rounding policy.
    pub fn is_continuous(self) -> bool {
        self.category() != UnitCategory::Count
    }

    /// Whether `symbol` names a supported unit.
    pub fn is_valid(symbol: &str) -> bool {
        Unit::parse(symbol).is_ok()
    }

    /// Parse a unit symbol. Accepts the canonical symbols plus common case
    /// variants (`ml`, `ML`, `l`, `G`, ...); anything else is `UnknownUnit`.
    pub fn parse(symbol: &str) -> Result<Unit, InventoryError> {
        let trimmed = symbol.trim();
        for unit in Unit::iter() {
            if unit.symbol() == trimmed {
                return Ok(unit);
            }
        }
        let lowered = trimmed.to_ascii_lowercase();
        for unit in Unit::iter() {
            if unit.symbol().to_ascii_lowercase() == lowered {
                return Ok(unit);
            }
        }
        Err(InventoryError::UnknownUnit {
            symbol: trimmed.to_string(),
        })
    }

    /// Units sharing `category`, in declaration order. Used to populate UI
    /// selectors; common units surface first, so the order is deliberate and
    /// not alphabetical.
    pub fn compatible_units(category: UnitCategory) -> Vec<Unit> {
        Unit::iter().filter(|u| u.category() == category).collect()
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Unit {
    type Err = InventoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Unit::parse(s)
    }
}

//! Pantry Core
//!
//! The unit-aware inventory accounting engine behind the Pantry point-of-sale
//! system. Stock can be recorded in one unit, recipe ingredients expressed in
//! another, and adjustments entered in a third; every quantity is reconciled
//! to a single canonical unit per item, conversions happen only when
//! dimensionally legal (or made legal through an ingredient density), and the
//! displayed, recipe and ledger quantities never silently diverge.
//!
//! This crate is consumed as a library: HTTP routing, persistence and auth
//! live in the surrounding system, which talks to the engine through the
//! [`store::InventoryStore`] seam and the service types re-exported below.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod config;
pub mod errors;
pub mod events;
pub mod logging;
pub mod models;
pub mod services;
pub mod store;
pub mod units;

use std::sync::mpsc::Receiver;
use std::sync::Arc;

use crate::config::EngineConfig;
use crate::events::{Event, EventSender};
use crate::services::{InventoryService, RecipeService};
use crate::store::{InMemoryStore, InventoryStore};
use crate::units::density::DensityTable;

/// The assembled engine: both services wired to one store, density table and
/// event channel.
#[derive(Clone)]
pub struct Engine {
    pub inventory: InventoryService,
    pub recipes: RecipeService,
}

impl Engine {
    /// Wire the services against a caller-provided store (the persistence
    /// boundary of the surrounding system).
    pub fn new(
        store: Arc<dyn InventoryStore>,
        densities: Arc<DensityTable>,
        event_sender: EventSender,
        config: EngineConfig,
    ) -> Self {
        let inventory = InventoryService::new(
            Arc::clone(&store),
            Arc::clone(&densities),
            event_sender,
            config.clone(),
        );
        let recipes = RecipeService::new(store, densities, config);
        Self { inventory, recipes }
    }

    /// An engine over the in-memory store with the built-in density table.
    /// Returns the receiving end of the event channel.
    pub fn in_memory(config: EngineConfig) -> (Self, Receiver<Event>) {
        let (event_sender, receiver) = EventSender::channel();
        let engine = Self::new(
            Arc::new(InMemoryStore::new()),
            Arc::new(DensityTable::builtin()),
            event_sender,
            config,
        );
        (engine, receiver)
    }
}

pub mod prelude {
    pub use crate::config::EngineConfig;
    pub use crate::errors::InventoryError;
    pub use crate::events::{Event, EventSender};
    pub use crate::models::*;
    pub use crate::services::{InventoryService, RecipeService};
    pub use crate::store::{InMemoryStore, InventoryStore};
    pub use crate::units::convert::{
        are_compatible, convert, format_quantity, format_quantity_with_scale, normalize_to_base,
    };
    pub use crate::units::density::DensityTable;
    pub use crate::units::{Unit, UnitCategory};
    pub use crate::Engine;
}

#[cfg(test)]
mod engine_tests {
    use super::*;
    use crate::models::{AdjustmentType, NewInventoryItem, StockAdjustmentRequest};
    use crate::units::Unit;
    use rust_decimal_macros::dec;

    #[test]
    fn in_memory_engine_wires_both_services_to_one_store() {
        let (engine, _events) = Engine::in_memory(EngineConfig::default());

        let mut spec = NewInventoryItem::new("sea salt", Unit::Gram);
        spec.current_stock = dec!(250);
        let item = engine.inventory.create_item(spec).unwrap();

        engine
            .inventory
            .adjust_stock(
                item.id,
                StockAdjustmentRequest::new(AdjustmentType::Restock, dec!(1)).in_unit(Unit::Kilogram),
            )
            .unwrap();

        // The recipe service reads the same store.
        let mut recipe = crate::models::Recipe::new("focaccia");
        let line =
            crate::models::ProductIngredient::new(item.id, "sea salt", dec!(10), Unit::Gram);
        engine.recipes.add_or_merge_ingredient(&mut recipe, line).unwrap();
        let report = engine.recipes.recipe_sufficiency(&recipe).unwrap();
        assert!(report[0].1.sufficient);
        assert_eq!(report[0].1.available, dec!(1250));
    }
}

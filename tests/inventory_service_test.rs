//! Ledger scenarios: creation, typed adjustments, threshold statuses, alert
//! queries, atomic failure semantics and per-item serialization.

use std::sync::mpsc::Receiver;
use std::sync::Arc;

use assert_matches::assert_matches;
use rstest::{fixture, rstest};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use pantry_core::config::EngineConfig;
use pantry_core::errors::InventoryError;
use pantry_core::events::{Event, EventSender};
use pantry_core::models::{
    AdjustmentType, ItemFilter, NewInventoryItem, StockAdjustmentRequest, StockStatus,
};
use pantry_core::services::InventoryService;
use pantry_core::store::{InMemoryStore, InventoryStore};
use pantry_core::units::density::DensityTable;
use pantry_core::units::Unit;

struct Harness {
    service: InventoryService,
    events: Receiver<Event>,
}

#[fixture]
fn harness() -> Harness {
    let (event_sender, events) = EventSender::channel();
    let service = InventoryService::new(
        Arc::new(InMemoryStore::new()),
        Arc::new(DensityTable::builtin()),
        event_sender,
        EngineConfig::default(),
    );
    Harness { service, events }
}

fn flour_spec() -> NewInventoryItem {
    let mut spec = NewInventoryItem::new("flour", Unit::Gram);
    spec.category = Some("baking".into());
    spec.current_stock = dec!(500);
    spec.min_stock = dec!(100);
    spec.reorder_point = Some(dec!(200));
    spec.price_per_unit = dec!(0.004);
    spec
}

#[rstest]
fn create_item_stores_stock_in_the_canonical_unit(harness: Harness) {
    let mut spec = flour_spec();
    spec.current_stock = dec!(2.5);
    spec.stock_unit = Some(Unit::Kilogram);
    spec.display_unit = Some(Unit::Kilogram);

    let item = harness.service.create_item(spec).unwrap();
    assert_eq!(item.unit, Unit::Gram);
    assert_eq!(item.display_unit, Unit::Kilogram);
    assert_eq!(item.current_stock, dec!(2500));
    assert_eq!(item.status, StockStatus::Ok);
    assert!(item.adjustments.is_empty());

    assert_matches!(harness.events.try_recv().unwrap(), Event::ItemCreated { .. });
}

#[rstest]
#[case::empty_name({ let mut s = flour_spec(); s.name = String::new(); s })]
#[case::negative_stock({ let mut s = flour_spec(); s.current_stock = dec!(-1); s })]
#[case::negative_min({ let mut s = flour_spec(); s.min_stock = dec!(-5); s })]
#[case::absurd_price({ let mut s = flour_spec(); s.price_per_unit = dec!(40000000); s })]
#[case::max_below_min({ let mut s = flour_spec(); s.max_stock = Some(dec!(50)); s })]
#[case::zero_density({ let mut s = flour_spec(); s.density = Some(Decimal::ZERO); s })]
#[case::cross_category_display({ let mut s = flour_spec(); s.display_unit = Some(Unit::Milliliter); s })]
fn create_item_rejects_bad_specs(harness: Harness, #[case] spec: NewInventoryItem) {
    assert_matches!(
        harness.service.create_item(spec),
        Err(InventoryError::ValidationError(_))
    );
}

#[rstest]
fn restock_in_another_unit_converts_before_applying(harness: Harness) {
    let item = harness.service.create_item(flour_spec()).unwrap();

    let outcome = harness
        .service
        .adjust_stock(
            item.id,
            StockAdjustmentRequest::new(AdjustmentType::Restock, dec!(1)).in_unit(Unit::Kilogram),
        )
        .unwrap();

    assert_eq!(outcome.new_stock, dec!(1500));
    assert_eq!(outcome.adjustment.quantity, dec!(1000));
    assert_eq!(outcome.adjustment.previous_stock, dec!(500));

    let stored = harness.service.get_item(item.id).unwrap();
    assert_eq!(stored.current_stock, dec!(1500));
    assert!(stored.last_restocked.is_some());
    assert_eq!(stored.adjustments.len(), 1);
}

#[rstest]
fn subtractive_adjustments_clamp_at_zero(harness: Harness) {
    let item = harness.service.create_item(flour_spec()).unwrap();

    let outcome = harness
        .service
        .adjust_stock(
            item.id,
            StockAdjustmentRequest::new(AdjustmentType::Waste, dec!(800)),
        )
        .unwrap();

    assert_eq!(outcome.new_stock, Decimal::ZERO);
    assert_eq!(outcome.status, StockStatus::Critical);
    assert!(harness.service.get_item(item.id).unwrap().last_restocked.is_none());
}

#[rstest]
fn correction_sets_stock_absolutely(harness: Harness) {
    let item = harness.service.create_item(flour_spec()).unwrap();

    for quantity in [dec!(42), dec!(9000), dec!(0)] {
        let outcome = harness
            .service
            .adjust_stock(
                item.id,
                StockAdjustmentRequest::new(AdjustmentType::Correction, quantity),
            )
            .unwrap();
        assert_eq!(outcome.new_stock, quantity);
    }
}

#[rstest]
fn negative_quantity_leaves_stock_and_ledger_unchanged(harness: Harness) {
    let item = harness.service.create_item(flour_spec()).unwrap();

    let err = harness
        .service
        .adjust_stock(
            item.id,
            StockAdjustmentRequest::new(AdjustmentType::Usage, dec!(-5)),
        )
        .unwrap_err();
    assert_matches!(err, InventoryError::InvalidQuantity(_));

    let stored = harness.service.get_item(item.id).unwrap();
    assert_eq!(stored.current_stock, dec!(500));
    assert!(stored.adjustments.is_empty());
}

#[rstest]
fn over_ceiling_quantity_is_rejected(harness: Harness) {
    let item = harness.service.create_item(flour_spec()).unwrap();
    assert_matches!(
        harness.service.adjust_stock(
            item.id,
            StockAdjustmentRequest::new(AdjustmentType::Restock, dec!(2000000)),
        ),
        Err(InventoryError::InvalidQuantity(_))
    );
}

#[rstest]
fn incompatible_adjustment_unit_fails_closed(harness: Harness) {
    let item = harness.service.create_item(flour_spec()).unwrap();

    let err = harness
        .service
        .adjust_stock(
            item.id,
            StockAdjustmentRequest::new(AdjustmentType::Usage, dec!(1)).in_unit(Unit::Centimeter),
        )
        .unwrap_err();
    assert_matches!(err, InventoryError::IncompatibleUnits { .. });

    let stored = harness.service.get_item(item.id).unwrap();
    assert_eq!(stored.current_stock, dec!(500));
    assert!(stored.adjustments.is_empty());
}

#[rstest]
fn volume_adjustment_without_density_fails_closed(harness: Harness) {
    // "saffron" is not in the builtin table and the item has no density.
    let mut spec = flour_spec();
    spec.name = "saffron".into();
    let item = harness.service.create_item(spec).unwrap();

    let err = harness
        .service
        .adjust_stock(
            item.id,
            StockAdjustmentRequest::new(AdjustmentType::Usage, dec!(2)).in_unit(Unit::Teaspoon),
        )
        .unwrap_err();
    assert_matches!(err, InventoryError::MissingDensity { .. });
    assert!(harness.service.get_item(item.id).unwrap().adjustments.is_empty());
}

#[rstest]
fn volume_adjustment_with_item_density_converts(harness: Harness) {
    let mut spec = flour_spec();
    spec.name = "house syrup".into();
    spec.density = Some(dec!(1.25));
    let item = harness.service.create_item(spec).unwrap();

    // 10 mL at 1.25 g/mL = 12.5 g consumed.
    let outcome = harness
        .service
        .adjust_stock(
            item.id,
            StockAdjustmentRequest::new(AdjustmentType::Usage, dec!(10)).in_unit(Unit::Milliliter),
        )
        .unwrap();
    assert_eq!(outcome.new_stock, dec!(487.5));
}

#[rstest]
fn status_walks_thresholds_and_alerts_follow(harness: Harness) {
    let item = harness.service.create_item(flour_spec()).unwrap();
    // min 100, reorder 200, critical at 50.

    let use_down_to = |target: Decimal| {
        let current = harness.service.get_item(item.id).unwrap().current_stock;
        harness
            .service
            .adjust_stock(
                item.id,
                StockAdjustmentRequest::new(AdjustmentType::Usage, current - target),
            )
            .unwrap()
    };

    assert_eq!(use_down_to(dec!(200)).status, StockStatus::Warning);
    assert_eq!(use_down_to(dec!(100)).status, StockStatus::Low);
    assert_eq!(use_down_to(dec!(50)).status, StockStatus::Critical);

    let low = harness.service.low_stock_alerts();
    assert_eq!(low.len(), 1);
    let critical = harness.service.critical_stock_alerts();
    assert_eq!(critical.len(), 1);
    assert_eq!(critical[0].id, item.id);

    // Restocking clears the alert.
    harness
        .service
        .adjust_stock(
            item.id,
            StockAdjustmentRequest::new(AdjustmentType::Restock, dec!(1000)),
        )
        .unwrap();
    assert!(harness.service.low_stock_alerts().is_empty());
}

#[rstest]
fn threshold_crossings_emit_low_and_critical_events(harness: Harness) {
    let item = harness.service.create_item(flour_spec()).unwrap();
    while harness.events.try_recv().is_ok() {}

    harness
        .service
        .adjust_stock(
            item.id,
            StockAdjustmentRequest::new(AdjustmentType::Usage, dec!(420)),
        )
        .unwrap();

    assert_matches!(harness.events.try_recv().unwrap(), Event::StockAdjusted { .. });
    assert_matches!(
        harness.events.try_recv().unwrap(),
        Event::StockLow { current_stock, .. } if current_stock == dec!(80)
    );

    harness
        .service
        .adjust_stock(
            item.id,
            StockAdjustmentRequest::new(AdjustmentType::Usage, dec!(40)),
        )
        .unwrap();
    assert_matches!(harness.events.try_recv().unwrap(), Event::StockAdjusted { .. });
    assert_matches!(harness.events.try_recv().unwrap(), Event::StockCritical { .. });
}

#[rstest]
fn ledger_is_append_only_and_ordered(harness: Harness) {
    let item = harness.service.create_item(flour_spec()).unwrap();

    let sequence = [
        (AdjustmentType::Restock, dec!(100)),
        (AdjustmentType::Usage, dec!(50)),
        (AdjustmentType::Correction, dec!(300)),
        (AdjustmentType::Waste, dec!(25)),
    ];
    for (adjustment_type, quantity) in sequence {
        harness
            .service
            .adjust_stock(item.id, StockAdjustmentRequest::new(adjustment_type, quantity))
            .unwrap();
    }

    let stored = harness.service.get_item(item.id).unwrap();
    assert_eq!(stored.adjustments.len(), 4);
    // Each entry chains off the previous one's result.
    for pair in stored.adjustments.windows(2) {
        assert_eq!(pair[0].new_stock, pair[1].previous_stock);
    }
    assert_eq!(stored.adjustments[2].new_stock, dec!(300));
    assert_eq!(stored.current_stock, dec!(275));
}

#[rstest]
fn adjusting_a_missing_item_is_item_not_found(harness: Harness) {
    let ghost = uuid::Uuid::new_v4();
    assert_matches!(
        harness.service.adjust_stock(
            ghost,
            StockAdjustmentRequest::new(AdjustmentType::Restock, dec!(1)),
        ),
        Err(InventoryError::ItemNotFound(id)) if id == ghost
    );
}

#[rstest]
fn list_items_filters_by_category_and_search(harness: Harness) {
    harness.service.create_item(flour_spec()).unwrap();
    let mut milk = NewInventoryItem::new("whole milk", Unit::Milliliter);
    milk.category = Some("dairy".into());
    harness.service.create_item(milk).unwrap();

    let dairy = harness.service.list_items(&ItemFilter {
        category: Some("dairy".into()),
        ..Default::default()
    });
    assert_eq!(dairy.len(), 1);
    assert_eq!(dairy[0].name, "whole milk");

    let hits = harness.service.list_items(&ItemFilter {
        search: Some("flo".into()),
        ..Default::default()
    });
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].name, "flour");
}

#[rstest]
fn delete_item_removes_it_and_its_ledger(harness: Harness) {
    let item = harness.service.create_item(flour_spec()).unwrap();
    let removed = harness.service.delete_item(item.id).unwrap();
    assert_eq!(removed.id, item.id);
    assert_matches!(
        harness.service.get_item(item.id),
        Err(InventoryError::ItemNotFound(_))
    );
}

#[test]
fn concurrent_adjustments_to_one_item_are_serialized() {
    let store: Arc<InMemoryStore> = Arc::new(InMemoryStore::new());
    let service = InventoryService::new(
        Arc::clone(&store) as Arc<dyn InventoryStore>,
        Arc::new(DensityTable::builtin()),
        EventSender::disabled(),
        EngineConfig::default(),
    );

    let item = service.create_item(flour_spec()).unwrap();
    let threads: Vec<_> = (0..8)
        .map(|_| {
            let service = service.clone();
            let item_id = item.id;
            std::thread::spawn(move || {
                for _ in 0..25 {
                    service
                        .adjust_stock(
                            item_id,
                            StockAdjustmentRequest::new(AdjustmentType::Restock, dec!(10)),
                        )
                        .unwrap();
                }
            })
        })
        .collect();
    for handle in threads {
        handle.join().unwrap();
    }

    let stored = service.get_item(item.id).unwrap();
    assert_eq!(stored.current_stock, dec!(500) + dec!(10) * dec!(200));
    assert_eq!(stored.adjustments.len(), 200);
}

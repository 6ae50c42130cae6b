//! Event fan-out for hosts that react to inventory changes (low-stock
//! notifications, audit mirrors, dashboards).
//!
//! Events are emitted after a ledger write commits; the ledger itself is the
//! source of truth, so a lost event never corrupts stock data.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::mpsc::{self, Receiver, Sender};
use uuid::Uuid;

use crate::errors::InventoryError;
use crate::models::AdjustmentType;

/// The events this engine emits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    ItemCreated {
        item_id: Uuid,
        name: String,
    },
    ItemDeleted {
        item_id: Uuid,
    },
    StockAdjusted {
        item_id: Uuid,
        adjustment_type: AdjustmentType,
        previous_stock: Decimal,
        new_stock: Decimal,
    },
    StockLow {
        item_id: Uuid,
        current_stock: Decimal,
        min_stock: Decimal,
    },
    StockCritical {
        item_id: Uuid,
        current_stock: Decimal,
        min_stock: Decimal,
    },
}

/// Handle the services use to publish events.
///
/// Synchronous by design: the engine never suspends, so a plain channel is
/// enough. Construct with [`EventSender::channel`] to receive events, or
/// [`EventSender::disabled`] when the host does not care.
#[derive(Debug, Clone)]
pub struct EventSender {
    sender: Option<Sender<Event>>,
}

impl EventSender {
    /// A sender/receiver pair backed by an unbounded channel.
    pub fn channel() -> (Self, Receiver<Event>) {
        let (tx, rx) = mpsc::channel();
        (Self { sender: Some(tx) }, rx)
    }

    /// A sender that drops every event.
    pub fn disabled() -> Self {
        Self { sender: None }
    }

    /// Publish an event. Fails only when the receiving side has hung up.
    pub fn send(&self, event: Event) -> Result<(), InventoryError> {
        match &self.sender {
            Some(tx) => tx
                .send(event)
                .map_err(|e| InventoryError::EventError(e.to_string())),
            None => Ok(()),
        }
    }
}

//! Domain events emitted by the lifecycle engine
//!
//! Events are broadcast after the owning transaction commits. The engine
//! never blocks on delivery; the notification collaborator subscribes and
//! handles push/sound on its own schedule.

use serde::{Deserialize, Serialize};

use crate::order::Order;
use crate::types::{OrderStatus, PaymentStatus};

/// A domain event with its envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainEvent {
    /// Event unique id
    pub event_id: String,
    /// Server timestamp (Unix milliseconds)
    pub timestamp: i64,
    pub payload: EventPayload,
}

impl DomainEvent {
    pub fn new(payload: EventPayload) -> Self {
        Self {
            event_id: uuid::Uuid::new_v4().to_string(),
            timestamp: crate::now_millis(),
            payload,
        }
    }

    /// Stable event kind tag, for subscribers that filter by name
    pub fn kind(&self) -> &'static str {
        match self.payload {
            EventPayload::OrderCreated { .. } => "ORDER_CREATED",
            EventPayload::OrderStatusChanged { .. } => "ORDER_STATUS_CHANGED",
            EventPayload::OrderRefunded { .. } => "ORDER_REFUNDED",
            EventPayload::PaymentTimedOut { .. } => "PAYMENT_TIMED_OUT",
        }
    }
}

/// Event payload variants
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventPayload {
    OrderCreated {
        order: Order,
    },
    OrderStatusChanged {
        order_id: String,
        from: OrderStatus,
        to: OrderStatus,
        payment_status: PaymentStatus,
        actor: String,
    },
    OrderRefunded {
        order_id: String,
        /// Amount credited back to the wallet (zero for cash orders)
        amount_credited: rust_decimal::Decimal,
        reason: String,
        actor: String,
    },
    PaymentTimedOut {
        order_id: String,
    },
}

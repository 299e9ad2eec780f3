//! Order records: one checkout transaction for a child's meal on a date

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{OrderStatus, PaymentMethod, PaymentStatus};

/// One line of an order. The unit price is captured at order time and
/// never changes afterwards, whatever the catalog does later.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderLine {
    /// Product reference (catalog id)
    pub product_id: String,
    /// Product name snapshot for receipts/audit
    pub product_name: String,
    /// Quantity, always positive
    pub quantity: u32,
    /// Unit price frozen at order creation
    pub unit_price: Decimal,
    /// unit_price × quantity
    pub line_total: Decimal,
}

/// A persisted order. Created by the lifecycle engine at checkout and
/// mutated only through its transition operations; never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    /// Opaque unique id
    pub id: String,
    /// Parent/guardian who placed the order (ledger account owner)
    pub requester: String,
    /// Child the meal is for
    pub child: String,
    /// Fulfillment date (distinct from creation time)
    pub scheduled_date: NaiveDate,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub status: OrderStatus,
    /// Σ line totals, frozen at creation
    pub total: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Set when the order reaches Completed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    /// Cash orders only: deadline for payment confirmation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_due_at: Option<DateTime<Utc>>,
    pub lines: Vec<OrderLine>,
}

impl Order {
    /// Invariant check: awaiting-payment orders must carry a deadline and
    /// matching payment state.
    pub fn is_consistent(&self) -> bool {
        match self.payment_status {
            PaymentStatus::AwaitingPayment => {
                self.status == OrderStatus::AwaitingPayment && self.payment_due_at.is_some()
            }
            _ => self.status != OrderStatus::AwaitingPayment,
        }
    }
}

/// Checkout input accepted by the lifecycle engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrder {
    pub requester: String,
    pub child: String,
    pub scheduled_date: NaiveDate,
    pub payment_method: PaymentMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub lines: Vec<NewOrderLine>,
    /// Optional client-supplied idempotency token. Resubmitting the same
    /// token returns the originally created order instead of a duplicate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrderLine {
    pub product_id: String,
    pub quantity: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_order() -> Order {
        Order {
            id: "o-1".into(),
            requester: "parent-1".into(),
            child: "child-1".into(),
            scheduled_date: NaiveDate::from_ymd_opt(2026, 8, 10).unwrap(),
            payment_method: PaymentMethod::Cash,
            payment_status: PaymentStatus::AwaitingPayment,
            status: OrderStatus::AwaitingPayment,
            total: Decimal::from(155),
            note: None,
            created_at: Utc::now(),
            completed_at: None,
            payment_due_at: Some(Utc::now()),
            lines: vec![],
        }
    }

    #[test]
    fn awaiting_payment_requires_deadline() {
        let mut order = base_order();
        assert!(order.is_consistent());
        order.payment_due_at = None;
        assert!(!order.is_consistent());
    }

    #[test]
    fn paid_order_must_leave_awaiting_status() {
        let mut order = base_order();
        order.payment_status = PaymentStatus::Paid;
        assert!(!order.is_consistent());
        order.status = OrderStatus::Pending;
        assert!(order.is_consistent());
    }
}

//! Fulfillment gateway
//!
//! Thin role-checked facade over the lifecycle engine for the staff and
//! admin surfaces. Identity and role arrive already authenticated from
//! the platform's auth layer; this module only enforces which role may
//! invoke which operation, and shapes bulk/refund results so callers see
//! partial failures and idempotent no-ops explicitly.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use shared::{Actor, Order, OrderStatus, Role};

use crate::engine::{EngineError, OrderEngine};

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Forbidden: role {role} may not {action}")]
    Forbidden { role: Role, action: &'static str },

    #[error(transparent)]
    Engine(#[from] EngineError),
}

pub type GatewayResult<T> = Result<T, GatewayError>;

/// Result of an admin refund request. An already-refunded order is a
/// distinct, non-error outcome, never a double credit.
#[derive(Debug, Serialize)]
#[serde(tag = "outcome", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RefundOutcome {
    Refunded { order: Order },
    AlreadyRefunded { order_id: String },
}

/// Per-order results of a bulk transition: one bad id fails alone, the
/// rest of the batch proceeds.
#[derive(Debug, Default, Serialize)]
pub struct BulkOutcome {
    pub succeeded: Vec<String>,
    pub failed: Vec<BulkFailure>,
}

#[derive(Debug, Serialize)]
pub struct BulkFailure {
    pub order_id: String,
    pub code: &'static str,
    pub message: String,
}

pub struct FulfillmentGateway {
    engine: Arc<OrderEngine>,
}

impl FulfillmentGateway {
    pub fn new(engine: Arc<OrderEngine>) -> Self {
        Self { engine }
    }

    fn require_staff(actor: &Actor, action: &'static str) -> GatewayResult<()> {
        if actor.role.is_staff() {
            Ok(())
        } else {
            Err(GatewayError::Forbidden {
                role: actor.role,
                action,
            })
        }
    }

    fn require_admin(actor: &Actor, action: &'static str) -> GatewayResult<()> {
        if actor.role.is_admin() {
            Ok(())
        } else {
            Err(GatewayError::Forbidden {
                role: actor.role,
                action,
            })
        }
    }

    /// Staff/admin: apply one fulfillment transition.
    pub fn transition(
        &self,
        actor: &Actor,
        order_id: &str,
        new_status: OrderStatus,
    ) -> GatewayResult<Order> {
        Self::require_staff(actor, "update order status")?;
        Ok(self.engine.update_status(order_id, new_status, actor)?)
    }

    /// Staff/admin: confirm out-of-band cash collection.
    pub fn confirm_payment(&self, actor: &Actor, order_id: &str) -> GatewayResult<Order> {
        Self::require_staff(actor, "confirm cash payment")?;
        Ok(self.engine.confirm_cash_payment(order_id, actor)?)
    }

    /// Staff/admin: apply one transition to many orders, collecting
    /// per-order success/failure instead of failing the whole batch.
    pub fn transition_batch(
        &self,
        actor: &Actor,
        order_ids: &[String],
        new_status: OrderStatus,
    ) -> GatewayResult<BulkOutcome> {
        Self::require_staff(actor, "update order status")?;

        let mut outcome = BulkOutcome::default();
        for order_id in order_ids {
            match self.engine.update_status(order_id, new_status, actor) {
                Ok(_) => outcome.succeeded.push(order_id.clone()),
                Err(e) => outcome.failed.push(BulkFailure {
                    order_id: order_id.clone(),
                    code: e.code(),
                    message: e.to_string(),
                }),
            }
        }
        tracing::info!(
            to = %new_status,
            succeeded = outcome.succeeded.len(),
            failed = outcome.failed.len(),
            actor = %actor.id,
            "Bulk transition applied"
        );
        Ok(outcome)
    }

    /// Admin: refund an order. Racing a concurrent refund/cancel yields
    /// `AlreadyRefunded` rather than an error or a second credit.
    pub fn refund(
        &self,
        actor: &Actor,
        order_id: &str,
        reason: &str,
    ) -> GatewayResult<RefundOutcome> {
        Self::require_admin(actor, "refund orders")?;
        match self.engine.refund_order(order_id, reason, actor) {
            Ok(order) => Ok(RefundOutcome::Refunded { order }),
            Err(EngineError::AlreadyResolved(_)) => Ok(RefundOutcome::AlreadyRefunded {
                order_id: order_id.to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::StaticCatalog;
    use crate::store::EngineStore;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use shared::{InventoryRecord, NewOrder, NewOrderLine, PaymentMethod};

    fn setup() -> (FulfillmentGateway, Arc<OrderEngine>) {
        let store = EngineStore::open_in_memory().unwrap();
        let catalog = Arc::new(StaticCatalog::new());
        catalog.insert_product("adobo", "Chicken Adobo", Decimal::from(50));
        let engine = Arc::new(OrderEngine::new(store, catalog));
        let admin = Actor::new("admin-1", Role::Admin);
        engine
            .set_inventory(InventoryRecord::new("adobo", "Chicken Adobo", 10), &admin)
            .unwrap();
        engine.top_up("parent-1", Decimal::from(500), &admin).unwrap();
        (FulfillmentGateway::new(engine.clone()), engine)
    }

    fn balance_order(engine: &OrderEngine) -> Order {
        engine
            .create_order(NewOrder {
                requester: "parent-1".to_string(),
                child: "child-1".to_string(),
                scheduled_date: NaiveDate::from_ymd_opt(2026, 8, 10).unwrap(),
                payment_method: PaymentMethod::Balance,
                note: None,
                lines: vec![NewOrderLine {
                    product_id: "adobo".to_string(),
                    quantity: 1,
                }],
                request_id: None,
            })
            .unwrap()
    }

    #[test]
    fn parents_may_not_drive_fulfillment() {
        let (gateway, engine) = setup();
        let order = balance_order(&engine);
        let parent = Actor::new("parent-1", Role::Parent);

        let err = gateway
            .transition(&parent, &order.id, OrderStatus::Preparing)
            .unwrap_err();
        assert!(matches!(err, GatewayError::Forbidden { .. }));
    }

    #[test]
    fn staff_transitions_pass_through() {
        let (gateway, engine) = setup();
        let order = balance_order(&engine);
        let staff = Actor::new("staff-1", Role::Staff);

        let updated = gateway
            .transition(&staff, &order.id, OrderStatus::Preparing)
            .unwrap();
        assert_eq!(updated.status, OrderStatus::Preparing);
    }

    #[test]
    fn refund_requires_admin() {
        let (gateway, engine) = setup();
        let order = balance_order(&engine);
        let staff = Actor::new("staff-1", Role::Staff);

        let err = gateway.refund(&staff, &order.id, "because").unwrap_err();
        assert!(matches!(err, GatewayError::Forbidden { .. }));
    }

    #[test]
    fn second_refund_reports_already_refunded() {
        let (gateway, engine) = setup();
        let order = balance_order(&engine);
        let admin = Actor::new("admin-1", Role::Admin);

        let first = gateway.refund(&admin, &order.id, "dup test").unwrap();
        assert!(matches!(first, RefundOutcome::Refunded { .. }));

        let second = gateway.refund(&admin, &order.id, "dup test").unwrap();
        assert!(matches!(second, RefundOutcome::AlreadyRefunded { .. }));
        assert_eq!(
            engine.get_account("parent-1").unwrap().unwrap().balance,
            Decimal::from(500)
        );
    }

    #[test]
    fn bulk_transition_collects_partial_failures() {
        let (gateway, engine) = setup();
        let good = balance_order(&engine);
        let other = balance_order(&engine);
        let staff = Actor::new("staff-1", Role::Staff);
        // drive one order out of Pending so the bulk request fails on it
        gateway
            .transition(&staff, &other.id, OrderStatus::Preparing)
            .unwrap();

        let ids = vec![
            good.id.clone(),
            other.id.clone(),
            "missing-order".to_string(),
        ];
        let outcome = gateway
            .transition_batch(&staff, &ids, OrderStatus::Preparing)
            .unwrap();

        assert_eq!(outcome.succeeded, vec![good.id]);
        assert_eq!(outcome.failed.len(), 2);
        let codes: Vec<&str> = outcome.failed.iter().map(|f| f.code).collect();
        assert!(codes.contains(&"INVALID_TRANSITION"));
        assert!(codes.contains(&"ORDER_NOT_FOUND"));
    }
}

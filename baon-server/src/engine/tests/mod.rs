//! Engine test suite
//!
//! - `test_core`: checkout validation, rollback, and idempotency
//! - `test_flows`: full lifecycle flows (cash, balance, refund)
//! - `test_boundary`: races and window-expiry edges

mod test_boundary;

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use shared::{Actor, NewOrder, NewOrderLine, PaymentMethod, Role};

use crate::catalog::StaticCatalog;
use crate::engine::OrderEngine;
use crate::store::EngineStore;

pub(crate) struct TestContext {
    pub engine: OrderEngine,
    pub catalog: Arc<StaticCatalog>,
}

pub(crate) fn dec(n: i64) -> Decimal {
    Decimal::from(n)
}

pub(crate) fn admin() -> Actor {
    Actor::new("admin-1", Role::Admin)
}

pub(crate) fn staff() -> Actor {
    Actor::new("staff-1", Role::Staff)
}

pub(crate) fn service_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 8, 10).unwrap()
}

/// Engine over an in-memory store with a seeded catalog and inventory:
/// adobo ₱50 × 10, turon ₱15 × 5; parent-1 holds a ₱500 wallet.
pub(crate) fn ctx() -> TestContext {
    let store = EngineStore::open_in_memory().unwrap();
    let catalog = Arc::new(StaticCatalog::new());
    catalog.insert_product("adobo", "Chicken Adobo", dec(50));
    catalog.insert_product("turon", "Turon", dec(15));

    let engine = OrderEngine::new(store, catalog.clone());
    engine
        .set_inventory(
            shared::InventoryRecord::new("adobo", "Chicken Adobo", 10),
            &admin(),
        )
        .unwrap();
    engine
        .set_inventory(shared::InventoryRecord::new("turon", "Turon", 5), &admin())
        .unwrap();
    engine.top_up("parent-1", dec(500), &admin()).unwrap();

    TestContext { engine, catalog }
}

pub(crate) fn order_input(
    requester: &str,
    method: PaymentMethod,
    lines: &[(&str, u32)],
) -> NewOrder {
    NewOrder {
        requester: requester.to_string(),
        child: "child-1".to_string(),
        scheduled_date: service_date(),
        payment_method: method,
        note: None,
        lines: lines
            .iter()
            .map(|(product_id, quantity)| NewOrderLine {
                product_id: product_id.to_string(),
                quantity: *quantity,
            })
            .collect(),
        request_id: None,
    }
}

impl TestContext {
    pub fn stock(&self, product_id: &str) -> u32 {
        self.engine
            .get_inventory(product_id)
            .unwrap()
            .unwrap()
            .stock
    }

    pub fn balance(&self, owner: &str) -> Decimal {
        self.engine
            .get_account(owner)
            .unwrap()
            .map(|a| a.balance)
            .unwrap_or_default()
    }
}

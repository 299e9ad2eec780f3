//! Race and window-expiry boundaries

use super::*;
use crate::engine::{EngineError, OrderEngine};
use crate::store::EngineStore;
use chrono::Duration;
use shared::{InventoryRecord, LedgerEntry, OrderStatus, PaymentStatus};
use std::sync::Arc;

/// Context whose cash payment window is already in the past
fn expired_ctx() -> TestContext {
    let base = ctx();
    TestContext {
        engine: base.engine.with_payment_window(Duration::seconds(-1)),
        catalog: base.catalog,
    }
}

#[test]
fn late_confirmation_fails_with_window_expired() {
    let ctx = expired_ctx();
    let order = ctx
        .engine
        .create_order(order_input("parent-1", PaymentMethod::Cash, &[("turon", 1)]))
        .unwrap();

    let err = ctx
        .engine
        .confirm_cash_payment(&order.id, &staff())
        .unwrap_err();
    assert!(matches!(err, EngineError::PaymentWindowExpired(_)));

    // expiry is the sweeper's job; the failed confirm changed nothing
    let stored = ctx.engine.get_order(&order.id).unwrap();
    assert_eq!(stored.payment_status, PaymentStatus::AwaitingPayment);
    assert_eq!(ctx.stock("turon"), 4);
}

#[test]
fn expire_then_confirm_resolves_exactly_once() {
    let ctx = expired_ctx();
    let order = ctx
        .engine
        .create_order(order_input("parent-1", PaymentMethod::Cash, &[("turon", 2)]))
        .unwrap();

    let expired = ctx.engine.expire_payment(&order.id).unwrap().unwrap();
    assert_eq!(expired.payment_status, PaymentStatus::Timeout);
    assert_eq!(expired.status, OrderStatus::Cancelled);
    assert_eq!(ctx.stock("turon"), 5);

    // the losing confirmation observes the resolved state
    let err = ctx
        .engine
        .confirm_cash_payment(&order.id, &staff())
        .unwrap_err();
    assert!(matches!(err, EngineError::AlreadyResolved(_)));
    // and stock was restored exactly once
    assert_eq!(ctx.stock("turon"), 5);
}

#[test]
fn confirm_then_expire_is_a_benign_no_op() {
    let ctx = ctx();
    let order = ctx
        .engine
        .create_order(order_input("parent-1", PaymentMethod::Cash, &[("turon", 2)]))
        .unwrap();
    ctx.engine.confirm_cash_payment(&order.id, &staff()).unwrap();

    // sweeper losing the race finds nothing to do
    assert!(ctx.engine.expire_payment(&order.id).unwrap().is_none());

    let stored = ctx.engine.get_order(&order.id).unwrap();
    assert_eq!(stored.status, OrderStatus::Pending);
    assert_eq!(stored.payment_status, PaymentStatus::Paid);
    assert_eq!(ctx.stock("turon"), 3); // reservation still held
}

#[test]
fn expire_before_deadline_does_nothing() {
    let ctx = ctx();
    let order = ctx
        .engine
        .create_order(order_input("parent-1", PaymentMethod::Cash, &[("turon", 1)]))
        .unwrap();

    assert!(ctx.engine.expire_payment(&order.id).unwrap().is_none());
    let stored = ctx.engine.get_order(&order.id).unwrap();
    assert_eq!(stored.payment_status, PaymentStatus::AwaitingPayment);
}

#[test]
fn concurrent_checkout_of_the_last_unit_admits_exactly_one() {
    let store = EngineStore::open_in_memory().unwrap();
    let catalog = Arc::new(crate::catalog::StaticCatalog::new());
    catalog.insert_product("last-slice", "Bibingka Slice", dec(25));
    let engine = OrderEngine::new(store, catalog);
    engine
        .set_inventory(
            InventoryRecord::new("last-slice", "Bibingka Slice", 1),
            &admin(),
        )
        .unwrap();

    let successes = std::thread::scope(|scope| {
        let mut handles = Vec::new();
        for i in 0..8 {
            let engine = engine.clone();
            handles.push(scope.spawn(move || {
                let requester = format!("parent-{i}");
                engine.create_order(order_input(&requester, PaymentMethod::Cash, &[(
                    "last-slice",
                    1,
                )]))
            }));
        }
        handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .collect::<Vec<_>>()
    });

    let won = successes.iter().filter(|r| r.is_ok()).count();
    let lost = successes
        .iter()
        .filter(|r| matches!(r, Err(EngineError::InsufficientStock { .. })))
        .count();
    assert_eq!(won, 1);
    assert_eq!(lost, 7);
    assert_eq!(
        engine.get_inventory("last-slice").unwrap().unwrap().stock,
        0
    );
}

#[test]
fn balance_and_stock_accounting_survive_mixed_operations() {
    let ctx = ctx();
    let engine = &ctx.engine;

    let keep = engine
        .create_order(order_input("parent-1", PaymentMethod::Balance, &[("adobo", 2)]))
        .unwrap();
    let cancel = engine
        .create_order(order_input("parent-1", PaymentMethod::Balance, &[("adobo", 1)]))
        .unwrap();
    let refund = engine
        .create_order(order_input("parent-1", PaymentMethod::Balance, &[("adobo", 3)]))
        .unwrap();

    engine
        .update_status(&cancel.id, OrderStatus::Cancelled, &staff())
        .unwrap();
    engine.refund_order(&refund.id, "mix-up", &admin()).unwrap();
    engine.top_up("parent-1", dec(200), &admin()).unwrap();

    // balance always equals the signed sum of its entries
    let account = engine.get_account("parent-1").unwrap().unwrap();
    let entries = engine.get_entries("parent-1").unwrap();
    let sum: rust_decimal::Decimal = entries.iter().map(LedgerEntry::signed_amount).sum();
    assert_eq!(account.balance, sum);
    assert_eq!(account.balance, dec(600)); // 500 - 100 + 200, cancels/refunds net out

    // stock drawdown equals the reservations still held
    let held: u32 = engine
        .list_orders(None)
        .unwrap()
        .iter()
        .filter(|o| o.status != OrderStatus::Cancelled)
        .flat_map(|o| o.lines.iter())
        .filter(|l| l.product_id == "adobo")
        .map(|l| l.quantity)
        .sum();
    assert_eq!(held, keep.lines[0].quantity);
    assert_eq!(ctx.stock("adobo"), 10 - held);
}

//! Order lifecycle engine
//!
//! Turns a cart into a confirmed order and owns every transition after
//! that: cash confirmation, fulfillment progress, timeout expiry,
//! cancellation, and refund.
//!
//! # Operation Flow
//!
//! ```text
//! operation(args)
//!     ├─ 1. Validate input / collaborator preconditions
//!     ├─ 2. Begin write transaction
//!     ├─ 3. Conditional mutations (stock, ledger, order, audit)
//!     │      any rejection → return error, transaction aborts on drop
//!     ├─ 4. Commit (all-or-nothing)
//!     └─ 5. Broadcast domain event
//! ```
//!
//! The persistence layer is single-writer, so the conditional checks in
//! step 3 cannot race: whichever of two competing callers begins its
//! write transaction second observes the first one's committed state.

mod error;
pub use error::*;

use chrono::{Duration, Utc};
use redb::WriteTransaction;
use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::sync::broadcast;

use shared::money::{MAX_QUANTITY, is_valid_entry_amount, is_valid_unit_price, round_money};
use shared::{
    Actor, DomainEvent, EventPayload, InventoryRecord, LedgerAccount, LedgerEntry, NewOrder, Order,
    OrderLine, OrderStatus, PaymentMethod, PaymentStatus,
};

use crate::catalog::Catalog;
use crate::store::{
    AuditAction, AuditRecord, DebitOutcome, EngineStore, StockUpdate, StorageError,
};

/// Event broadcast channel capacity
const EVENT_CHANNEL_CAPACITY: usize = 4096;

/// Cash payment confirmation window
pub const PAYMENT_WINDOW_MINUTES: i64 = 15;

/// How a reservation release stamps the payment status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReleaseMode {
    /// Explicit staff/admin cancel
    Cancel,
    /// Sweeper expiry of the cash payment window
    Timeout,
    /// Admin refund
    Refund,
}

/// The order lifecycle engine.
///
/// Cheap to clone; all clones share the same database, catalog, and
/// event channel.
#[derive(Clone)]
pub struct OrderEngine {
    store: EngineStore,
    catalog: Arc<dyn Catalog>,
    event_tx: broadcast::Sender<DomainEvent>,
    payment_window: Duration,
}

impl std::fmt::Debug for OrderEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderEngine")
            .field("payment_window", &self.payment_window)
            .finish()
    }
}

impl OrderEngine {
    pub fn new(store: EngineStore, catalog: Arc<dyn Catalog>) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            store,
            catalog,
            event_tx,
            payment_window: Duration::minutes(PAYMENT_WINDOW_MINUTES),
        }
    }

    /// Override the cash payment window (tests, ops tuning).
    pub fn with_payment_window(mut self, window: Duration) -> Self {
        self.payment_window = window;
        self
    }

    /// Subscribe to domain events (notification collaborator).
    pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> {
        self.event_tx.subscribe()
    }

    /// The underlying storage
    pub fn store(&self) -> &EngineStore {
        &self.store
    }

    fn emit(&self, payload: EventPayload) {
        let event = DomainEvent::new(payload);
        if self.event_tx.send(event).is_err() {
            tracing::debug!("No active event subscribers");
        }
    }

    // ========== Checkout ==========

    /// Create an order from a cart.
    ///
    /// One atomic unit: stock is reserved per line (decrement-if-
    /// sufficient), the total is computed from prices read now and frozen
    /// onto the lines, and balance payment debits the requester's wallet.
    /// Any rejection aborts the whole unit.
    pub fn create_order(&self, input: NewOrder) -> EngineResult<Order> {
        self.validate_new_order(&input)?;

        if !self.catalog.is_ordering_open(input.scheduled_date) {
            return Err(EngineError::OrderingWindowClosed(input.scheduled_date));
        }

        // Price resolution happens before the transaction; the stock
        // check is repeated inside it at decrement time.
        let mut priced_lines = Vec::with_capacity(input.lines.len());
        for line in &input.lines {
            let product = self
                .catalog
                .product(&line.product_id)
                .ok_or_else(|| EngineError::ProductUnavailable(line.product_id.clone()))?;
            if !is_valid_unit_price(product.price) {
                return Err(EngineError::InvalidInput(format!(
                    "catalog price out of range for {}: {}",
                    line.product_id, product.price
                )));
            }
            priced_lines.push((line.product_id.clone(), line.quantity, product.price));
        }

        let txn = self.store.begin_write()?;

        // Idempotent replay: a resubmitted request returns its original order.
        if let Some(request_id) = &input.request_id
            && let Some(existing_id) = self.store.lookup_request_txn(&txn, request_id)?
            && let Some(existing) = self.store.get_order_txn(&txn, &existing_id)?
        {
            tracing::info!(request_id, order_id = %existing_id, "Duplicate checkout request");
            return Ok(existing);
        }

        let mut lines = Vec::with_capacity(priced_lines.len());
        for (product_id, quantity, unit_price) in priced_lines {
            match self.store.reserve_stock(&txn, &product_id, quantity)? {
                StockUpdate::Reserved(record) => lines.push(OrderLine {
                    product_id,
                    product_name: record.product_name,
                    quantity,
                    unit_price,
                    line_total: unit_price * Decimal::from(quantity),
                }),
                StockUpdate::Insufficient { available } => {
                    return Err(EngineError::InsufficientStock {
                        product: product_id,
                        requested: quantity,
                        available,
                    });
                }
                StockUpdate::Unavailable | StockUpdate::NotFound => {
                    return Err(EngineError::ProductUnavailable(product_id));
                }
            }
        }

        let total = round_money(lines.iter().map(|l| l.line_total).sum());
        let now = Utc::now();
        let order_id = uuid::Uuid::new_v4().to_string();

        let (payment_status, status, payment_due_at) = match input.payment_method {
            PaymentMethod::Balance => {
                match self.store.debit_account(
                    &txn,
                    &input.requester,
                    total,
                    Some(&order_id),
                    Some("order checkout"),
                )? {
                    DebitOutcome::Applied(_) => {
                        (PaymentStatus::Paid, OrderStatus::Pending, None)
                    }
                    DebitOutcome::Insufficient { available } => {
                        return Err(EngineError::InsufficientBalance {
                            owner: input.requester,
                            required: total,
                            available,
                        });
                    }
                }
            }
            PaymentMethod::Cash => {
                let due = now + self.payment_window;
                self.store
                    .mark_awaiting_payment(&txn, &order_id, due.timestamp_millis())?;
                (
                    PaymentStatus::AwaitingPayment,
                    OrderStatus::AwaitingPayment,
                    Some(due),
                )
            }
        };

        let order = Order {
            id: order_id,
            requester: input.requester,
            child: input.child,
            scheduled_date: input.scheduled_date,
            payment_method: input.payment_method,
            payment_status,
            status,
            total,
            note: input.note,
            created_at: now,
            completed_at: None,
            payment_due_at,
            lines,
        };

        self.store.put_order(&txn, &order)?;
        if let Some(request_id) = &input.request_id {
            self.store.record_request(&txn, request_id, &order.id)?;
        }
        self.store.append_audit(
            &txn,
            AuditRecord::new(AuditAction::OrderCreated, &order.requester)
                .order(&order.id)
                .after(order.status, order.payment_status),
        )?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(
            order_id = %order.id,
            total = %order.total,
            method = ?order.payment_method,
            "Order created"
        );
        self.emit(EventPayload::OrderCreated {
            order: order.clone(),
        });
        Ok(order)
    }

    fn validate_new_order(&self, input: &NewOrder) -> EngineResult<()> {
        if input.requester.is_empty() || input.child.is_empty() {
            return Err(EngineError::InvalidInput(
                "requester and child are required".into(),
            ));
        }
        if input.lines.is_empty() {
            return Err(EngineError::InvalidInput("order has no lines".into()));
        }
        for line in &input.lines {
            if line.quantity == 0 || line.quantity > MAX_QUANTITY {
                return Err(EngineError::InvalidInput(format!(
                    "quantity for {} must be 1..={}, got {}",
                    line.product_id, MAX_QUANTITY, line.quantity
                )));
            }
        }
        Ok(())
    }

    // ========== Cash Confirmation ==========

    /// Confirm out-of-band cash collection for an awaiting-payment order.
    ///
    /// Mutually exclusive with sweeper expiry: whichever commits first
    /// wins, and the loser observes the changed state (`AlreadyResolved`)
    /// instead of corrupting it.
    pub fn confirm_cash_payment(&self, order_id: &str, confirmer: &Actor) -> EngineResult<Order> {
        let txn = self.store.begin_write()?;
        let mut order = self
            .store
            .get_order_txn(&txn, order_id)?
            .ok_or_else(|| EngineError::OrderNotFound(order_id.to_string()))?;

        if order.payment_status != PaymentStatus::AwaitingPayment {
            return Err(EngineError::AlreadyResolved(order_id.to_string()));
        }
        // A missing deadline would violate the awaiting-payment invariant;
        // treat it as elapsed rather than confirm an inconsistent order.
        if order.payment_due_at.is_none_or(|due| due < Utc::now()) {
            return Err(EngineError::PaymentWindowExpired(order_id.to_string()));
        }

        let from = order.status;
        order.payment_status = PaymentStatus::Paid;
        order.status = OrderStatus::Pending;
        self.store.clear_awaiting_payment(&txn, order_id)?;
        self.store.put_order(&txn, &order)?;
        self.store.append_audit(
            &txn,
            AuditRecord::new(AuditAction::PaymentConfirmed, &confirmer.id)
                .order(order_id)
                .before(from, PaymentStatus::AwaitingPayment)
                .after(order.status, order.payment_status),
        )?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(order_id, confirmer = %confirmer.id, "Cash payment confirmed");
        self.emit(EventPayload::OrderStatusChanged {
            order_id: order_id.to_string(),
            from,
            to: order.status,
            payment_status: order.payment_status,
            actor: confirmer.id.clone(),
        });
        Ok(order)
    }

    // ========== Fulfillment Transitions ==========

    /// Apply one fulfillment state machine transition.
    ///
    /// A transition into `Cancelled` releases the reservation (stock
    /// back, wallet credited if it was debited) in the same transaction
    /// as the status write.
    pub fn update_status(
        &self,
        order_id: &str,
        new_status: OrderStatus,
        actor: &Actor,
    ) -> EngineResult<Order> {
        let txn = self.store.begin_write()?;
        let mut order = self
            .store
            .get_order_txn(&txn, order_id)?
            .ok_or_else(|| EngineError::OrderNotFound(order_id.to_string()))?;

        let from = order.status;
        let payment_before = order.payment_status;
        if !from.can_transition_to(new_status) {
            return Err(EngineError::InvalidTransition {
                from,
                to: new_status,
            });
        }

        match new_status {
            OrderStatus::Cancelled => {
                self.release_reservation(&txn, &mut order, ReleaseMode::Cancel)?;
            }
            OrderStatus::Completed => {
                order.completed_at = Some(Utc::now());
            }
            _ => {}
        }
        order.status = new_status;

        self.store.put_order(&txn, &order)?;
        self.store.append_audit(
            &txn,
            AuditRecord::new(AuditAction::StatusChanged, &actor.id)
                .order(order_id)
                .before(from, payment_before)
                .after(order.status, order.payment_status),
        )?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(order_id, %from, to = %new_status, actor = %actor.id, "Order status changed");
        self.emit(EventPayload::OrderStatusChanged {
            order_id: order_id.to_string(),
            from,
            to: new_status,
            payment_status: order.payment_status,
            actor: actor.id.clone(),
        });
        Ok(order)
    }

    // ========== Timeout Expiry ==========

    /// Cancel an awaiting-payment order whose window elapsed.
    ///
    /// Conditional update: returns `Ok(None)` when there is nothing to do
    /// (already confirmed/cancelled, or not yet due) so a sweep racing a
    /// confirmation is a benign no-op.
    pub fn expire_payment(&self, order_id: &str) -> EngineResult<Option<Order>> {
        let txn = self.store.begin_write()?;
        let mut order = self
            .store
            .get_order_txn(&txn, order_id)?
            .ok_or_else(|| EngineError::OrderNotFound(order_id.to_string()))?;

        if order.payment_status != PaymentStatus::AwaitingPayment {
            return Ok(None);
        }
        if order.payment_due_at.is_some_and(|due| due > Utc::now()) {
            return Ok(None);
        }

        let from = order.status;
        self.release_reservation(&txn, &mut order, ReleaseMode::Timeout)?;
        order.status = OrderStatus::Cancelled;

        self.store.put_order(&txn, &order)?;
        self.store.append_audit(
            &txn,
            AuditRecord::new(AuditAction::PaymentExpired, "sweeper")
                .order(order_id)
                .before(from, PaymentStatus::AwaitingPayment)
                .after(order.status, order.payment_status)
                .reason("payment_timeout"),
        )?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(order_id, "Payment window expired, order cancelled");
        self.emit(EventPayload::PaymentTimedOut {
            order_id: order_id.to_string(),
        });
        Ok(Some(order))
    }

    /// Ids of awaiting-payment orders past their deadline.
    pub fn expired_awaiting(&self) -> EngineResult<Vec<String>> {
        Ok(self.store.expired_awaiting_payment(shared::now_millis())?)
    }

    // ========== Refund ==========

    /// Admin compensating transaction: restore stock, credit the wallet
    /// if it was debited, stamp the order refunded.
    ///
    /// Idempotent: refunding an order that is already cancelled or
    /// refunded returns `AlreadyResolved` and changes nothing, so a
    /// double-submitted refund can never credit twice.
    pub fn refund_order(&self, order_id: &str, reason: &str, actor: &Actor) -> EngineResult<Order> {
        let txn = self.store.begin_write()?;
        let mut order = self
            .store
            .get_order_txn(&txn, order_id)?
            .ok_or_else(|| EngineError::OrderNotFound(order_id.to_string()))?;

        if order.status == OrderStatus::Cancelled {
            return Err(EngineError::AlreadyResolved(order_id.to_string()));
        }

        let from = order.status;
        let payment_before = order.payment_status;
        let credited = self.release_reservation(&txn, &mut order, ReleaseMode::Refund)?;
        order.payment_status = PaymentStatus::Refunded;
        order.status = OrderStatus::Cancelled;

        self.store.put_order(&txn, &order)?;
        self.store.append_audit(
            &txn,
            AuditRecord::new(AuditAction::Refunded, &actor.id)
                .order(order_id)
                .before(from, payment_before)
                .after(order.status, order.payment_status)
                .reason(reason),
        )?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(order_id, %credited, reason, actor = %actor.id, "Order refunded");
        self.emit(EventPayload::OrderRefunded {
            order_id: order_id.to_string(),
            amount_credited: credited,
            reason: reason.to_string(),
            actor: actor.id.clone(),
        });
        Ok(order)
    }

    /// Undo an order's side effects inside the caller's transaction:
    /// every line's stock goes back, and money moves only if it actually
    /// moved before (balance debit ⇒ compensating credit; cash is
    /// settled out-of-band and never touches the ledger).
    fn release_reservation(
        &self,
        txn: &WriteTransaction,
        order: &mut Order,
        mode: ReleaseMode,
    ) -> EngineResult<Decimal> {
        for line in &order.lines {
            self.store
                .release_stock(txn, &line.product_id, line.quantity)?;
        }

        let mut credited = Decimal::ZERO;
        match order.payment_status {
            PaymentStatus::AwaitingPayment => {
                self.store.clear_awaiting_payment(txn, &order.id)?;
                order.payment_status = if mode == ReleaseMode::Timeout {
                    PaymentStatus::Timeout
                } else {
                    PaymentStatus::Unpaid
                };
            }
            PaymentStatus::Paid if order.payment_method == PaymentMethod::Balance => {
                let note = match mode {
                    ReleaseMode::Refund => "order refund",
                    _ => "order cancelled",
                };
                self.store.credit_account(
                    txn,
                    &order.requester,
                    order.total,
                    Some(&order.id),
                    Some(note),
                )?;
                credited = order.total;
                order.payment_status = PaymentStatus::Refunded;
            }
            _ => {}
        }
        Ok(credited)
    }

    // ========== Ledger Top-Up ==========

    /// Manual wallet credit (admin surface). Not part of checkout; kept
    /// here so every balance-affecting write shares the ledger's audit
    /// and atomicity rules.
    pub fn top_up(
        &self,
        owner: &str,
        amount: Decimal,
        actor: &Actor,
    ) -> EngineResult<LedgerAccount> {
        if !is_valid_entry_amount(amount) {
            return Err(EngineError::InvalidInput(format!(
                "top-up amount out of range: {amount}"
            )));
        }

        let txn = self.store.begin_write()?;
        let account =
            self.store
                .credit_account(&txn, owner, amount, None, Some("manual top-up"))?;
        self.store.append_audit(
            &txn,
            AuditRecord::new(AuditAction::TopUp, &actor.id).reason(format!("owner={owner}")),
        )?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(owner, %amount, actor = %actor.id, "Wallet topped up");
        Ok(account)
    }

    // ========== Inventory Seam ==========

    /// Seed or correct an inventory record (catalog collaborator /
    /// admin surface).
    pub fn set_inventory(
        &self,
        record: InventoryRecord,
        actor: &Actor,
    ) -> EngineResult<InventoryRecord> {
        let txn = self.store.begin_write()?;
        self.store.put_inventory(&txn, &record)?;
        self.store.append_audit(
            &txn,
            AuditRecord::new(AuditAction::InventorySet, &actor.id).reason(format!(
                "product={} stock={} available={}",
                record.product_id, record.stock, record.available
            )),
        )?;
        txn.commit().map_err(StorageError::from)?;
        Ok(record)
    }

    // ========== Reads ==========

    pub fn get_order(&self, order_id: &str) -> EngineResult<Order> {
        self.store
            .get_order(order_id)?
            .ok_or_else(|| EngineError::OrderNotFound(order_id.to_string()))
    }

    pub fn list_orders(&self, status: Option<OrderStatus>) -> EngineResult<Vec<Order>> {
        Ok(self.store.list_orders(status)?)
    }

    pub fn get_account(&self, owner: &str) -> EngineResult<Option<LedgerAccount>> {
        Ok(self.store.get_account(owner)?)
    }

    pub fn get_entries(&self, owner: &str) -> EngineResult<Vec<LedgerEntry>> {
        Ok(self.store.get_entries(owner)?)
    }

    pub fn get_inventory(&self, product_id: &str) -> EngineResult<Option<InventoryRecord>> {
        Ok(self.store.get_inventory(product_id)?)
    }
}

#[cfg(test)]
mod tests;

//! Order table operations
//!
//! Orders are stored whole (header + lines) under their id. Cash orders
//! inside their payment window also appear in the `awaiting_payment`
//! index, keyed by id with the deadline as value, so the sweeper can
//! find expired orders without scanning the order table.

use redb::{ReadableTable, WriteTransaction};
use shared::{Order, OrderStatus};

use super::{
    AWAITING_PAYMENT_TABLE, EngineStore, ORDERS_TABLE, PROCESSED_REQUESTS_TABLE, StorageResult,
};

impl EngineStore {
    /// Insert or replace an order.
    pub fn put_order(&self, txn: &WriteTransaction, order: &Order) -> StorageResult<()> {
        let mut table = txn.open_table(ORDERS_TABLE)?;
        let bytes = serde_json::to_vec(order)?;
        table.insert(order.id.as_str(), bytes.as_slice())?;
        Ok(())
    }

    /// Load an order inside a write transaction.
    pub fn get_order_txn(
        &self,
        txn: &WriteTransaction,
        order_id: &str,
    ) -> StorageResult<Option<Order>> {
        let table = txn.open_table(ORDERS_TABLE)?;
        match table.get(order_id)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    /// Load an order (read-only).
    pub fn get_order(&self, order_id: &str) -> StorageResult<Option<Order>> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(ORDERS_TABLE)?;
        match table.get(order_id)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    /// All orders, optionally filtered by status, newest first.
    pub fn list_orders(&self, status: Option<OrderStatus>) -> StorageResult<Vec<Order>> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(ORDERS_TABLE)?;
        let mut orders = Vec::new();
        for result in table.iter()? {
            let (_, value) = result?;
            let order: Order = serde_json::from_slice(value.value())?;
            if status.is_none_or(|s| order.status == s) {
                orders.push(order);
            }
        }
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    // ========== Awaiting-Payment Index ==========

    /// Index a cash order by its payment deadline.
    pub fn mark_awaiting_payment(
        &self,
        txn: &WriteTransaction,
        order_id: &str,
        due_at_millis: i64,
    ) -> StorageResult<()> {
        let mut table = txn.open_table(AWAITING_PAYMENT_TABLE)?;
        table.insert(order_id, due_at_millis)?;
        Ok(())
    }

    /// Drop an order from the awaiting-payment index (confirmed,
    /// cancelled, or expired).
    pub fn clear_awaiting_payment(
        &self,
        txn: &WriteTransaction,
        order_id: &str,
    ) -> StorageResult<()> {
        let mut table = txn.open_table(AWAITING_PAYMENT_TABLE)?;
        table.remove(order_id)?;
        Ok(())
    }

    /// Ids of awaiting-payment orders whose deadline passed.
    pub fn expired_awaiting_payment(&self, now_millis: i64) -> StorageResult<Vec<String>> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(AWAITING_PAYMENT_TABLE)?;
        let mut expired = Vec::new();
        for result in table.iter()? {
            let (key, value) = result?;
            if value.value() < now_millis {
                expired.push(key.value().to_string());
            }
        }
        Ok(expired)
    }

    // ========== Checkout Idempotency ==========

    /// Order id previously recorded for a client request id, if any.
    pub fn lookup_request_txn(
        &self,
        txn: &WriteTransaction,
        request_id: &str,
    ) -> StorageResult<Option<String>> {
        let table = txn.open_table(PROCESSED_REQUESTS_TABLE)?;
        Ok(table.get(request_id)?.map(|guard| guard.value().to_string()))
    }

    /// Remember which order a client request id produced.
    pub fn record_request(
        &self,
        txn: &WriteTransaction,
        request_id: &str,
        order_id: &str,
    ) -> StorageResult<()> {
        let mut table = txn.open_table(PROCESSED_REQUESTS_TABLE)?;
        table.insert(request_id, order_id)?;
        Ok(())
    }
}

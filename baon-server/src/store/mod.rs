//! redb-based persistence layer
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `orders` | `order_id` | `Order` | Order header + lines |
//! | `awaiting_payment` | `order_id` | `i64` | Payment deadline index (millis) |
//! | `inventory` | `product_id` | `InventoryRecord` | Stock counters |
//! | `accounts` | `owner` | `LedgerAccount` | Wallet balances |
//! | `ledger_entries` | `(owner, seq)` | `LedgerEntry` | Append-only ledger |
//! | `audit_log` | `seq` | `AuditRecord` | Before/after transition records |
//! | `processed_requests` | `request_id` | `order_id` | Checkout idempotency |
//! | `counters` | `&str` | `u64` | Audit sequence |
//!
//! # Atomicity
//!
//! Each lifecycle operation opens one [`WriteTransaction`] and touches
//! any subset of these tables; redb commits are all-or-nothing, and a
//! transaction dropped without commit aborts cleanly. redb is also
//! single-writer, so check-then-write inside a write transaction is a
//! race-free conditional update.

mod audit;
mod inventory;
mod ledger;
mod orders;

pub use audit::{AuditAction, AuditRecord};
pub use inventory::StockUpdate;
pub use ledger::DebitOutcome;

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition, WriteTransaction};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Orders: key = order_id, value = JSON-serialized Order
pub(crate) const ORDERS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("orders");

/// Awaiting-payment index: key = order_id, value = payment deadline (Unix millis)
pub(crate) const AWAITING_PAYMENT_TABLE: TableDefinition<&str, i64> =
    TableDefinition::new("awaiting_payment");

/// Inventory: key = product_id, value = JSON-serialized InventoryRecord
pub(crate) const INVENTORY_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("inventory");

/// Accounts: key = owner, value = JSON-serialized LedgerAccount
pub(crate) const ACCOUNTS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("accounts");

/// Ledger entries: key = (owner, per-account seq), value = JSON-serialized LedgerEntry
pub(crate) const LEDGER_ENTRIES_TABLE: TableDefinition<(&str, u64), &[u8]> =
    TableDefinition::new("ledger_entries");

/// Audit log: key = global seq, value = JSON-serialized AuditRecord
pub(crate) const AUDIT_TABLE: TableDefinition<u64, &[u8]> = TableDefinition::new("audit_log");

/// Checkout idempotency: key = client request_id, value = order_id
pub(crate) const PROCESSED_REQUESTS_TABLE: TableDefinition<&str, &str> =
    TableDefinition::new("processed_requests");

/// Counters: key = counter name, value = u64
pub(crate) const COUNTERS_TABLE: TableDefinition<&str, u64> = TableDefinition::new("counters");

pub(crate) const AUDIT_SEQ_KEY: &str = "audit_seq";

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Engine storage backed by a single redb database
#[derive(Clone)]
pub struct EngineStore {
    db: Arc<Database>,
}

impl EngineStore {
    /// Open or create the database at the given path.
    ///
    /// redb commits with immediate durability by default: once `commit()`
    /// returns, the transaction survives power loss, and the file is
    /// always left in a consistent state.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let db = Database::create(path)?;
        let store = Self { db: Arc::new(db) };
        store.init_tables()?;
        Ok(store)
    }

    /// Open an in-memory database (for testing)
    #[cfg(test)]
    pub fn open_in_memory() -> StorageResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        let store = Self { db: Arc::new(db) };
        store.init_tables()?;
        Ok(store)
    }

    /// Create all tables up front so later read transactions never hit a
    /// missing-table error.
    fn init_tables(&self) -> StorageResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let _ = write_txn.open_table(ORDERS_TABLE)?;
            let _ = write_txn.open_table(AWAITING_PAYMENT_TABLE)?;
            let _ = write_txn.open_table(INVENTORY_TABLE)?;
            let _ = write_txn.open_table(ACCOUNTS_TABLE)?;
            let _ = write_txn.open_table(LEDGER_ENTRIES_TABLE)?;
            let _ = write_txn.open_table(AUDIT_TABLE)?;
            let _ = write_txn.open_table(PROCESSED_REQUESTS_TABLE)?;
            let mut counters = write_txn.open_table(COUNTERS_TABLE)?;
            if counters.get(AUDIT_SEQ_KEY)?.is_none() {
                counters.insert(AUDIT_SEQ_KEY, 0u64)?;
            }
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Begin a write transaction. Dropping it without commit aborts all
    /// changes made through it.
    pub fn begin_write(&self) -> StorageResult<WriteTransaction> {
        Ok(self.db.begin_write()?)
    }

    pub(crate) fn begin_read(&self) -> StorageResult<redb::ReadTransaction> {
        Ok(self.db.begin_read()?)
    }
}

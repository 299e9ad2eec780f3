//! Shared domain types for the Baon canteen pre-ordering platform
//!
//! Common types used by the server and its clients: order and ledger
//! records, status enums, domain events, and money helpers.

pub mod event;
pub mod inventory;
pub mod ledger;
pub mod money;
pub mod order;
pub mod types;

// Re-exports
pub use event::{DomainEvent, EventPayload};
pub use inventory::InventoryRecord;
pub use ledger::{EntryKind, LedgerAccount, LedgerEntry};
pub use order::{NewOrder, NewOrderLine, Order, OrderLine};
pub use types::{Actor, OrderStatus, PaymentMethod, PaymentStatus, Role};

/// Current Unix timestamp in milliseconds
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

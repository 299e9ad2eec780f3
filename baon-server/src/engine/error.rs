use chrono::NaiveDate;
use rust_decimal::Decimal;
use shared::OrderStatus;
use thiserror::Error;

use crate::store::StorageError;

/// Engine errors
///
/// Everything here is per-operation and recoverable: precondition
/// failures go back to the caller for display, `Storage` means the
/// atomic unit could not commit (all partial effects were rolled back)
/// and the call may simply be retried.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Product unavailable: {0}")]
    ProductUnavailable(String),

    #[error("Insufficient stock for {product}: requested {requested}, available {available}")]
    InsufficientStock {
        product: String,
        requested: u32,
        available: u32,
    },

    #[error("Insufficient balance for {owner}: required {required}, available {available}")]
    InsufficientBalance {
        owner: String,
        required: Decimal,
        available: Decimal,
    },

    #[error("Ordering window closed for {0}")]
    OrderingWindowClosed(NaiveDate),

    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("Invalid transition: {from} -> {to}")]
    InvalidTransition {
        from: OrderStatus,
        to: OrderStatus,
    },

    #[error("Payment window expired for order {0}")]
    PaymentWindowExpired(String),

    #[error("Order already resolved: {0}")]
    AlreadyResolved(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl EngineError {
    /// Stable machine-readable code (wire format, bulk results, logs).
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::InvalidInput(_) => "INVALID_INPUT",
            EngineError::ProductUnavailable(_) => "PRODUCT_UNAVAILABLE",
            EngineError::InsufficientStock { .. } => "INSUFFICIENT_STOCK",
            EngineError::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            EngineError::OrderingWindowClosed(_) => "ORDERING_WINDOW_CLOSED",
            EngineError::OrderNotFound(_) => "ORDER_NOT_FOUND",
            EngineError::InvalidTransition { .. } => "INVALID_TRANSITION",
            EngineError::PaymentWindowExpired(_) => "PAYMENT_WINDOW_EXPIRED",
            EngineError::AlreadyResolved(_) => "ALREADY_RESOLVED",
            EngineError::Storage(_) => "PERSISTENCE_FAILURE",
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;

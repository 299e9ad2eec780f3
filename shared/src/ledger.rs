//! Wallet ledger: per-requester balance plus its append-only history
//!
//! The denormalized balance is updated atomically with each entry append,
//! so `balance == Σ credits − Σ debits` holds at every commit point.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Direction of a ledger entry. Amounts are always positive; the kind
/// carries the sign.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntryKind {
    /// Balance decreased (order checkout)
    Debit,
    /// Balance increased (top-up, refund)
    Credit,
}

/// One immutable ledger entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Account owner
    pub owner: String,
    /// Per-account sequence number (append order)
    pub seq: u64,
    pub kind: EntryKind,
    pub amount: Decimal,
    /// Order that caused this entry; None for manual top-ups
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl LedgerEntry {
    /// Signed effect of this entry on the balance
    pub fn signed_amount(&self) -> Decimal {
        match self.kind {
            EntryKind::Debit => -self.amount,
            EntryKind::Credit => self.amount,
        }
    }
}

/// Per-requester wallet account. Created on the first balance-affecting
/// interaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerAccount {
    pub owner: String,
    pub balance: Decimal,
    /// Number of entries appended so far (also the next entry seq)
    pub entry_count: u64,
    pub updated_at: DateTime<Utc>,
}

impl LedgerAccount {
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            balance: Decimal::ZERO,
            entry_count: 0,
            updated_at: Utc::now(),
        }
    }
}

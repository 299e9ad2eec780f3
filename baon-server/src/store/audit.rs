//! Audit log
//!
//! Every ledger- or stock-affecting transition appends one record with
//! the order's before/after state, written in the same transaction as
//! the transition itself. The audit collaborator consumes these; the
//! engine only guarantees they exist atomically with the change.

use chrono::{DateTime, Utc};
use redb::{ReadableTable, WriteTransaction};
use serde::{Deserialize, Serialize};
use shared::{OrderStatus, PaymentStatus};

use super::{AUDIT_SEQ_KEY, AUDIT_TABLE, COUNTERS_TABLE, EngineStore, StorageResult};

/// What kind of transition produced an audit record
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    OrderCreated,
    PaymentConfirmed,
    StatusChanged,
    PaymentExpired,
    Refunded,
    TopUp,
    InventorySet,
}

/// One before/after transition record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    /// Global sequence, assigned on append
    #[serde(default)]
    pub seq: u64,
    pub action: AuditAction,
    /// Affected order; None for top-ups and inventory seeds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    pub actor: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before: Option<(OrderStatus, PaymentStatus)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<(OrderStatus, PaymentStatus)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl AuditRecord {
    pub fn new(action: AuditAction, actor: impl Into<String>) -> Self {
        Self {
            seq: 0,
            action,
            order_id: None,
            actor: actor.into(),
            before: None,
            after: None,
            reason: None,
            created_at: Utc::now(),
        }
    }

    pub fn order(mut self, order_id: impl Into<String>) -> Self {
        self.order_id = Some(order_id.into());
        self
    }

    pub fn before(mut self, status: OrderStatus, payment: PaymentStatus) -> Self {
        self.before = Some((status, payment));
        self
    }

    pub fn after(mut self, status: OrderStatus, payment: PaymentStatus) -> Self {
        self.after = Some((status, payment));
        self
    }

    pub fn reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

impl EngineStore {
    /// Append an audit record, assigning the next global sequence.
    pub fn append_audit(
        &self,
        txn: &WriteTransaction,
        mut record: AuditRecord,
    ) -> StorageResult<u64> {
        let seq = {
            let mut counters = txn.open_table(COUNTERS_TABLE)?;
            let next = counters.get(AUDIT_SEQ_KEY)?.map(|g| g.value()).unwrap_or(0) + 1;
            counters.insert(AUDIT_SEQ_KEY, next)?;
            next
        };
        record.seq = seq;

        let mut table = txn.open_table(AUDIT_TABLE)?;
        let bytes = serde_json::to_vec(&record)?;
        table.insert(seq, bytes.as_slice())?;
        Ok(seq)
    }

    /// Most recent audit records, newest first.
    pub fn recent_audit(&self, limit: usize) -> StorageResult<Vec<AuditRecord>> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(AUDIT_TABLE)?;
        let mut records = Vec::new();
        for result in table.iter()?.rev().take(limit) {
            let (_, value) = result?;
            records.push(serde_json::from_slice(value.value())?);
        }
        Ok(records)
    }
}

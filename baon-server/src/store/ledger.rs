//! Ledger table operations
//!
//! Accounts carry a denormalized balance updated atomically with every
//! entry append, keyed `(owner, seq)` so an account's history reads back
//! in append order. Debits are conditional (debit-if-sufficient); a
//! debit that would take the balance negative is rejected, not clamped.

use chrono::Utc;
use redb::{ReadableTable, WriteTransaction};
use rust_decimal::Decimal;
use shared::{EntryKind, LedgerAccount, LedgerEntry};

use super::{ACCOUNTS_TABLE, EngineStore, LEDGER_ENTRIES_TABLE, StorageResult};

/// Outcome of a conditional debit
#[derive(Debug)]
pub enum DebitOutcome {
    /// Debit applied; updated account returned
    Applied(LedgerAccount),
    /// Balance cannot cover the amount (missing account counts as zero)
    Insufficient { available: Decimal },
}

impl EngineStore {
    fn put_account(&self, txn: &WriteTransaction, account: &LedgerAccount) -> StorageResult<()> {
        let mut table = txn.open_table(ACCOUNTS_TABLE)?;
        let bytes = serde_json::to_vec(account)?;
        table.insert(account.owner.as_str(), bytes.as_slice())?;
        Ok(())
    }

    /// Load an account inside a write transaction.
    pub fn get_account_txn(
        &self,
        txn: &WriteTransaction,
        owner: &str,
    ) -> StorageResult<Option<LedgerAccount>> {
        let table = txn.open_table(ACCOUNTS_TABLE)?;
        match table.get(owner)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    /// Load an account (read-only).
    pub fn get_account(&self, owner: &str) -> StorageResult<Option<LedgerAccount>> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(ACCOUNTS_TABLE)?;
        match table.get(owner)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    /// Append one entry and update the denormalized balance in the same
    /// transaction. Callers have already validated the amount and
    /// checked sufficiency for debits.
    fn append_entry(
        &self,
        txn: &WriteTransaction,
        account: &mut LedgerAccount,
        kind: EntryKind,
        amount: Decimal,
        order_id: Option<&str>,
        note: Option<&str>,
    ) -> StorageResult<LedgerEntry> {
        let entry = LedgerEntry {
            owner: account.owner.clone(),
            seq: account.entry_count,
            kind,
            amount,
            order_id: order_id.map(str::to_string),
            note: note.map(str::to_string),
            created_at: Utc::now(),
        };

        {
            let mut entries = txn.open_table(LEDGER_ENTRIES_TABLE)?;
            let bytes = serde_json::to_vec(&entry)?;
            entries.insert((entry.owner.as_str(), entry.seq), bytes.as_slice())?;
        }

        account.balance += entry.signed_amount();
        account.entry_count += 1;
        account.updated_at = entry.created_at;
        self.put_account(txn, account)?;
        Ok(entry)
    }

    /// Debit `amount` from `owner` if the balance covers it.
    ///
    /// An account that does not exist yet has balance zero, so any debit
    /// against it is insufficient.
    pub fn debit_account(
        &self,
        txn: &WriteTransaction,
        owner: &str,
        amount: Decimal,
        order_id: Option<&str>,
        note: Option<&str>,
    ) -> StorageResult<DebitOutcome> {
        let mut account = match self.get_account_txn(txn, owner)? {
            Some(account) => account,
            None => {
                return Ok(DebitOutcome::Insufficient {
                    available: Decimal::ZERO,
                });
            }
        };
        if account.balance < amount {
            return Ok(DebitOutcome::Insufficient {
                available: account.balance,
            });
        }

        self.append_entry(txn, &mut account, EntryKind::Debit, amount, order_id, note)?;
        Ok(DebitOutcome::Applied(account))
    }

    /// Credit `amount` to `owner`, creating the account on first use.
    pub fn credit_account(
        &self,
        txn: &WriteTransaction,
        owner: &str,
        amount: Decimal,
        order_id: Option<&str>,
        note: Option<&str>,
    ) -> StorageResult<LedgerAccount> {
        let mut account = self
            .get_account_txn(txn, owner)?
            .unwrap_or_else(|| LedgerAccount::new(owner));
        self.append_entry(txn, &mut account, EntryKind::Credit, amount, order_id, note)?;
        Ok(account)
    }

    /// All entries for an account, in append order.
    pub fn get_entries(&self, owner: &str) -> StorageResult<Vec<LedgerEntry>> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(LEDGER_ENTRIES_TABLE)?;
        let mut entries = Vec::new();
        for result in table.range((owner, 0u64)..=(owner, u64::MAX))? {
            let (_, value) = result?;
            entries.push(serde_json::from_slice(value.value())?);
        }
        Ok(entries)
    }
}

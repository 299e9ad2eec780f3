//! Inventory table operations
//!
//! Stock mutation is exposed as conditional operations only:
//! [`EngineStore::reserve_stock`] rejects a decrement it cannot satisfy
//! instead of clamping, and [`EngineStore::release_stock`] restores a
//! reservation. Both run inside the caller's write transaction.

use redb::{ReadableTable, WriteTransaction};
use shared::InventoryRecord;

use super::{EngineStore, INVENTORY_TABLE, StorageResult};

/// Outcome of a conditional stock decrement
#[derive(Debug)]
pub enum StockUpdate {
    /// Stock decremented; updated record returned
    Reserved(InventoryRecord),
    /// Requested quantity exceeds remaining stock
    Insufficient { available: u32 },
    /// Product is flagged unavailable
    Unavailable,
    /// No inventory record for this product
    NotFound,
}

impl EngineStore {
    /// Insert or replace an inventory record (catalog collaborator seam).
    pub fn put_inventory(
        &self,
        txn: &WriteTransaction,
        record: &InventoryRecord,
    ) -> StorageResult<()> {
        let mut table = txn.open_table(INVENTORY_TABLE)?;
        let bytes = serde_json::to_vec(record)?;
        table.insert(record.product_id.as_str(), bytes.as_slice())?;
        Ok(())
    }

    /// Load an inventory record inside a write transaction.
    pub fn get_inventory_txn(
        &self,
        txn: &WriteTransaction,
        product_id: &str,
    ) -> StorageResult<Option<InventoryRecord>> {
        let table = txn.open_table(INVENTORY_TABLE)?;
        match table.get(product_id)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    /// Load an inventory record (read-only).
    pub fn get_inventory(&self, product_id: &str) -> StorageResult<Option<InventoryRecord>> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(INVENTORY_TABLE)?;
        match table.get(product_id)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    /// Decrement stock by `quantity` if the product is available and has
    /// enough stock; otherwise reject without modifying anything.
    pub fn reserve_stock(
        &self,
        txn: &WriteTransaction,
        product_id: &str,
        quantity: u32,
    ) -> StorageResult<StockUpdate> {
        let mut record = match self.get_inventory_txn(txn, product_id)? {
            Some(r) => r,
            None => return Ok(StockUpdate::NotFound),
        };
        if !record.available {
            return Ok(StockUpdate::Unavailable);
        }
        if record.stock < quantity {
            return Ok(StockUpdate::Insufficient {
                available: record.stock,
            });
        }

        record.stock -= quantity;
        record.updated_at = chrono::Utc::now();
        self.put_inventory(txn, &record)?;
        Ok(StockUpdate::Reserved(record))
    }

    /// Restore a previous reservation. A missing record is logged and
    /// skipped: inventory rows are never deleted by the engine, so this
    /// only happens if the catalog collaborator removed the product.
    pub fn release_stock(
        &self,
        txn: &WriteTransaction,
        product_id: &str,
        quantity: u32,
    ) -> StorageResult<Option<InventoryRecord>> {
        let mut record = match self.get_inventory_txn(txn, product_id)? {
            Some(r) => r,
            None => {
                tracing::warn!(product_id, quantity, "Release for missing inventory record");
                return Ok(None);
            }
        };
        record.stock += quantity;
        record.updated_at = chrono::Utc::now();
        self.put_inventory(txn, &record)?;
        Ok(Some(record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with_product(stock: u32) -> EngineStore {
        let store = EngineStore::open_in_memory().unwrap();
        let txn = store.begin_write().unwrap();
        store
            .put_inventory(&txn, &InventoryRecord::new("adobo", "Chicken Adobo", stock))
            .unwrap();
        txn.commit().unwrap();
        store
    }

    #[test]
    fn reserve_decrements_stock() {
        let store = store_with_product(10);
        let txn = store.begin_write().unwrap();
        let outcome = store.reserve_stock(&txn, "adobo", 3).unwrap();
        assert!(matches!(outcome, StockUpdate::Reserved(ref r) if r.stock == 7));
        txn.commit().unwrap();

        assert_eq!(store.get_inventory("adobo").unwrap().unwrap().stock, 7);
    }

    #[test]
    fn reserve_rejects_insufficient_stock_without_clamping() {
        let store = store_with_product(2);
        let txn = store.begin_write().unwrap();
        let outcome = store.reserve_stock(&txn, "adobo", 3).unwrap();
        assert!(matches!(outcome, StockUpdate::Insufficient { available: 2 }));
        txn.commit().unwrap();

        // Rejected, not clamped
        assert_eq!(store.get_inventory("adobo").unwrap().unwrap().stock, 2);
    }

    #[test]
    fn reserve_rejects_unavailable_product() {
        let store = EngineStore::open_in_memory().unwrap();
        let txn = store.begin_write().unwrap();
        let mut record = InventoryRecord::new("halo-halo", "Halo-Halo", 5);
        record.available = false;
        store.put_inventory(&txn, &record).unwrap();
        let outcome = store.reserve_stock(&txn, "halo-halo", 1).unwrap();
        assert!(matches!(outcome, StockUpdate::Unavailable));
    }

    #[test]
    fn reserve_unknown_product_is_not_found() {
        let store = EngineStore::open_in_memory().unwrap();
        let txn = store.begin_write().unwrap();
        let outcome = store.reserve_stock(&txn, "ghost", 1).unwrap();
        assert!(matches!(outcome, StockUpdate::NotFound));
    }

    #[test]
    fn release_restores_reserved_stock() {
        let store = store_with_product(10);
        let txn = store.begin_write().unwrap();
        store.reserve_stock(&txn, "adobo", 4).unwrap();
        store.release_stock(&txn, "adobo", 4).unwrap();
        txn.commit().unwrap();

        assert_eq!(store.get_inventory("adobo").unwrap().unwrap().stock, 10);
    }

    #[test]
    fn abandoned_transaction_leaves_stock_untouched() {
        let store = store_with_product(10);
        {
            let txn = store.begin_write().unwrap();
            store.reserve_stock(&txn, "adobo", 5).unwrap();
            // dropped without commit
        }
        assert_eq!(store.get_inventory("adobo").unwrap().unwrap().stock, 10);
    }
}

//! Per-product stock counters

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One inventory record per product. Seeded by the catalog collaborator;
/// mutated only by order reservation and release.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryRecord {
    pub product_id: String,
    pub product_name: String,
    /// Remaining stock. Never negative: a decrement that cannot be
    /// satisfied is rejected, not clamped.
    pub stock: u32,
    /// Orderable flag, independent of stock level
    pub available: bool,
    pub updated_at: DateTime<Utc>,
}

impl InventoryRecord {
    pub fn new(product_id: impl Into<String>, product_name: impl Into<String>, stock: u32) -> Self {
        Self {
            product_id: product_id.into(),
            product_name: product_name.into(),
            stock,
            available: true,
            updated_at: Utc::now(),
        }
    }
}

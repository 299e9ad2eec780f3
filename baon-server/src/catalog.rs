//! Catalog/scheduling collaborator seam
//!
//! The catalog owns products, prices, and the weekly ordering schedule;
//! all of that lives outside this service. The engine only needs two
//! answers at checkout time: the current price of a product, and whether
//! a service date accepts orders. [`StaticCatalog`] is the in-process
//! implementation fed by a snapshot (startup file or admin sync).

use chrono::NaiveDate;
use dashmap::{DashMap, DashSet};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Price/name snapshot for one product
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogProduct {
    pub name: String,
    pub price: Decimal,
}

/// What the lifecycle engine reads from the catalog collaborator.
pub trait Catalog: Send + Sync {
    /// Current price and name for a product, if the catalog knows it.
    fn product(&self, product_id: &str) -> Option<CatalogProduct>;

    /// Whether the given service date accepts orders (weekly schedule,
    /// holiday calendar).
    fn is_ordering_open(&self, date: NaiveDate) -> bool;
}

/// In-memory catalog snapshot.
///
/// Dates default to open; the schedule collaborator closes holidays and
/// non-service days explicitly.
#[derive(Debug, Default)]
pub struct StaticCatalog {
    products: DashMap<String, CatalogProduct>,
    closed_dates: DashSet<NaiveDate>,
}

impl StaticCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a product snapshot from a JSON file of
    /// `{ "product_id": { "name": ..., "price": ... }, ... }`.
    pub fn from_json_file(path: impl AsRef<std::path::Path>) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let products: std::collections::HashMap<String, CatalogProduct> =
            serde_json::from_slice(&bytes).map_err(std::io::Error::other)?;
        let catalog = Self::new();
        for (id, product) in products {
            catalog.products.insert(id, product);
        }
        tracing::info!(products = catalog.products.len(), "Catalog snapshot loaded");
        Ok(catalog)
    }

    pub fn insert_product(
        &self,
        product_id: impl Into<String>,
        name: impl Into<String>,
        price: Decimal,
    ) {
        self.products.insert(
            product_id.into(),
            CatalogProduct {
                name: name.into(),
                price,
            },
        );
    }

    pub fn remove_product(&self, product_id: &str) {
        self.products.remove(product_id);
    }

    pub fn close_date(&self, date: NaiveDate) {
        self.closed_dates.insert(date);
    }

    pub fn reopen_date(&self, date: NaiveDate) {
        self.closed_dates.remove(&date);
    }
}

impl Catalog for StaticCatalog {
    fn product(&self, product_id: &str) -> Option<CatalogProduct> {
        self.products.get(product_id).map(|p| p.clone())
    }

    fn is_ordering_open(&self, date: NaiveDate) -> bool {
        !self.closed_dates.contains(&date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_products_are_none() {
        let catalog = StaticCatalog::new();
        assert!(catalog.product("ghost").is_none());

        catalog.insert_product("adobo", "Chicken Adobo", Decimal::from(50));
        let product = catalog.product("adobo").unwrap();
        assert_eq!(product.name, "Chicken Adobo");
        assert_eq!(product.price, Decimal::from(50));
    }

    #[test]
    fn dates_default_open_until_closed() {
        let catalog = StaticCatalog::new();
        let holiday = NaiveDate::from_ymd_opt(2026, 8, 21).unwrap();
        assert!(catalog.is_ordering_open(holiday));
        catalog.close_date(holiday);
        assert!(!catalog.is_ordering_open(holiday));
        catalog.reopen_date(holiday);
        assert!(catalog.is_ordering_open(holiday));
    }
}

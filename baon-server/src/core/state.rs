//! Shared application state

use std::sync::Arc;

use crate::catalog::{Catalog, StaticCatalog};
use crate::core::Config;
use crate::engine::OrderEngine;
use crate::gateway::FulfillmentGateway;
use crate::store::EngineStore;

/// State handed to every axum handler. Cloning shares the underlying
/// engine and gateway.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<OrderEngine>,
    pub gateway: Arc<FulfillmentGateway>,
}

impl AppState {
    /// Open storage, load the catalog snapshot, and wire up the engine.
    pub fn initialize(config: &Config) -> anyhow::Result<Self> {
        std::fs::create_dir_all(&config.data_dir)?;
        let store = EngineStore::open(config.db_path())?;

        let catalog: Arc<dyn Catalog> = match &config.catalog_path {
            Some(path) => Arc::new(StaticCatalog::from_json_file(path)?),
            None => {
                tracing::warn!("No CATALOG_PATH set; starting with an empty catalog");
                Arc::new(StaticCatalog::new())
            }
        };

        let engine = Arc::new(OrderEngine::new(store, catalog));
        Ok(Self::with_engine(engine))
    }

    /// Build state around an existing engine (tests, embedding).
    pub fn with_engine(engine: Arc<OrderEngine>) -> Self {
        let gateway = Arc::new(FulfillmentGateway::new(engine.clone()));
        Self { engine, gateway }
    }
}

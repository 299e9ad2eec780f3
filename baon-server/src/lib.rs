//! Baon Server - canteen pre-ordering order & ledger engine
//!
//! # Architecture
//!
//! The server owns the order lifecycle core of the Baon platform:
//!
//! - **Storage** (`store`): embedded redb database holding orders,
//!   inventory, the wallet ledger, and the audit log. Every lifecycle
//!   operation runs as a single write transaction across those tables.
//! - **Lifecycle Engine** (`engine`): checkout, cash confirmation,
//!   fulfillment transitions, timeout expiry, and refunds, with domain
//!   event broadcast after each commit.
//! - **Sweeper** (`sweeper`): background task cancelling cash orders
//!   whose payment window elapsed.
//! - **Gateway** (`gateway`): role-checked facade for staff/admin
//!   operations, including bulk transitions.
//! - **HTTP API** (`api`): axum routes; caller identity arrives
//!   pre-authenticated from the platform's auth layer.
//!
//! # Module Structure
//!
//! ```text
//! baon-server/src/
//! ├── core/          # config, state, server, background tasks
//! ├── store/         # redb persistence layer
//! ├── engine/        # order lifecycle engine
//! ├── sweeper.rs     # payment timeout sweeper
//! ├── gateway.rs     # fulfillment gateway
//! ├── catalog.rs     # catalog/scheduling collaborator seam
//! └── api/           # HTTP routes and handlers
//! ```

pub mod api;
pub mod catalog;
pub mod core;
pub mod engine;
pub mod gateway;
pub mod store;
pub mod sweeper;

// Re-export public types
pub use catalog::{Catalog, CatalogProduct, StaticCatalog};
pub use core::{AppState, BackgroundTasks, Config, TaskKind};
pub use engine::{EngineError, EngineResult, OrderEngine};
pub use gateway::{BulkOutcome, FulfillmentGateway, GatewayError, RefundOutcome};
pub use store::{EngineStore, StorageError};
pub use sweeper::PaymentSweeper;

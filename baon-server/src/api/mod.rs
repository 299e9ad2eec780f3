//! HTTP API
//!
//! One module per resource, each exposing a `router()`. All mutations go
//! through the lifecycle engine or the fulfillment gateway; handlers
//! only translate HTTP to engine calls and engine errors to responses.

pub mod accounts;
pub mod actor;
pub mod error;
pub mod health;
pub mod inventory;
pub mod orders;

pub use actor::CallerIdentity;
pub use error::{ApiError, ApiResult};

use axum::Router;

use crate::core::AppState;

/// Full API router
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(orders::router())
        .merge(accounts::router())
        .merge(inventory::router())
}

//! Inventory API
//!
//! The seam the catalog collaborator (or an admin) uses to seed and
//! correct stock. The engine itself only ever reserves and releases.

mod handler;

use axum::{Router, routing::get};

use crate::core::AppState;

pub fn router() -> Router<AppState> {
    Router::new().nest("/api/inventory", routes())
}

fn routes() -> Router<AppState> {
    Router::new().route(
        "/{product_id}",
        get(handler::get_record).put(handler::put_record),
    )
}

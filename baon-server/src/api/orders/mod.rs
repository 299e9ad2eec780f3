//! Orders API
//!
//! Checkout plus the staff/admin fulfillment surface. Mutations go
//! through the lifecycle engine and the gateway; reads come straight
//! from storage.

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::AppState;

pub fn router() -> Router<AppState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(handler::create).get(handler::list))
        .route("/bulk-status", post(handler::bulk_status))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/confirm-payment", post(handler::confirm_payment))
        .route("/{id}/status", post(handler::update_status))
        .route("/{id}/refund", post(handler::refund))
}

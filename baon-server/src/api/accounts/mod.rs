//! Wallet accounts API

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::AppState;

pub fn router() -> Router<AppState> {
    Router::new().nest("/api/accounts", routes())
}

fn routes() -> Router<AppState> {
    Router::new()
        .route("/{owner}", get(handler::get_account))
        .route("/{owner}/entries", get(handler::list_entries))
        .route("/{owner}/top-up", post(handler::top_up))
}

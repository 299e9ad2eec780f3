//! Inventory API handlers

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;

use shared::InventoryRecord;

use crate::api::{ApiError, ApiResult, CallerIdentity};
use crate::core::AppState;

/// GET /api/inventory/:product_id
pub async fn get_record(
    State(state): State<AppState>,
    CallerIdentity(_actor): CallerIdentity,
    Path(product_id): Path<String>,
) -> ApiResult<Json<InventoryRecord>> {
    let record = state
        .engine
        .get_inventory(&product_id)?
        .ok_or_else(|| ApiError::not_found(format!("No inventory record for {product_id}")))?;
    Ok(Json(record))
}

#[derive(Debug, Deserialize)]
pub struct PutInventoryRequest {
    pub product_name: String,
    pub stock: u32,
    #[serde(default = "default_available")]
    pub available: bool,
}

fn default_available() -> bool {
    true
}

/// PUT /api/inventory/:product_id - admin seeds or corrects a record
pub async fn put_record(
    State(state): State<AppState>,
    CallerIdentity(actor): CallerIdentity,
    Path(product_id): Path<String>,
    Json(req): Json<PutInventoryRequest>,
) -> ApiResult<Json<InventoryRecord>> {
    if !actor.role.is_admin() {
        return Err(ApiError::forbidden("inventory updates require the admin role"));
    }

    let mut record = InventoryRecord::new(product_id, req.product_name, req.stock);
    record.available = req.available;
    let record = state.engine.set_inventory(record, &actor)?;
    Ok(Json(record))
}

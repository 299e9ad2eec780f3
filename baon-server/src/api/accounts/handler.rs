//! Wallet accounts API handlers
//!
//! Parents can read their own account; staff/admin can read any. Manual
//! top-ups are admin-only; balances are loaded at the counter.

use axum::{
    Json,
    extract::{Path, State},
};
use rust_decimal::Decimal;
use serde::Deserialize;

use shared::{Actor, LedgerAccount, LedgerEntry};

use crate::api::{ApiError, ApiResult, CallerIdentity};
use crate::core::AppState;

fn check_account_access(actor: &Actor, owner: &str) -> ApiResult<()> {
    if actor.role.is_staff() || actor.id == owner {
        Ok(())
    } else {
        Err(ApiError::forbidden("cannot access another wallet"))
    }
}

/// GET /api/accounts/:owner
pub async fn get_account(
    State(state): State<AppState>,
    CallerIdentity(actor): CallerIdentity,
    Path(owner): Path<String>,
) -> ApiResult<Json<LedgerAccount>> {
    check_account_access(&actor, &owner)?;
    let account = state
        .engine
        .get_account(&owner)?
        .ok_or_else(|| ApiError::not_found(format!("No account for {owner}")))?;
    Ok(Json(account))
}

/// GET /api/accounts/:owner/entries - full ledger history, append order
pub async fn list_entries(
    State(state): State<AppState>,
    CallerIdentity(actor): CallerIdentity,
    Path(owner): Path<String>,
) -> ApiResult<Json<Vec<LedgerEntry>>> {
    check_account_access(&actor, &owner)?;
    Ok(Json(state.engine.get_entries(&owner)?))
}

#[derive(Debug, Deserialize)]
pub struct TopUpRequest {
    pub amount: Decimal,
}

/// POST /api/accounts/:owner/top-up - admin credits a wallet
pub async fn top_up(
    State(state): State<AppState>,
    CallerIdentity(actor): CallerIdentity,
    Path(owner): Path<String>,
    Json(req): Json<TopUpRequest>,
) -> ApiResult<Json<LedgerAccount>> {
    if !actor.role.is_admin() {
        return Err(ApiError::forbidden("top-ups require the admin role"));
    }
    let account = state.engine.top_up(&owner, req.amount, &actor)?;
    Ok(Json(account))
}

//! Orders API handlers

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use shared::{NewOrder, NewOrderLine, Order, OrderStatus, PaymentMethod};

use crate::api::{ApiError, ApiResult, CallerIdentity};
use crate::core::AppState;
use crate::gateway::{BulkOutcome, RefundOutcome};

/// Body for POST /api/orders
#[derive(Debug, Deserialize, Validate)]
pub struct CreateOrderRequest {
    #[validate(length(min = 1, message = "child is required"))]
    pub child: String,
    pub scheduled_date: NaiveDate,
    pub payment_method: PaymentMethod,
    pub note: Option<String>,
    #[validate(length(min = 1, message = "order needs at least one line"))]
    pub lines: Vec<OrderLineRequest>,
    /// Optional idempotency token; resubmission returns the original order
    pub request_id: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct OrderLineRequest {
    pub product_id: String,
    pub quantity: u32,
}

/// POST /api/orders - checkout
///
/// The requester is the authenticated caller; balance orders debit their
/// wallet, cash orders open the 15-minute payment window.
pub async fn create(
    State(state): State<AppState>,
    CallerIdentity(actor): CallerIdentity,
    Json(req): Json<CreateOrderRequest>,
) -> ApiResult<(StatusCode, Json<Order>)> {
    req.validate()
        .map_err(|e| ApiError::unprocessable(e.to_string()))?;

    let input = NewOrder {
        requester: actor.id,
        child: req.child,
        scheduled_date: req.scheduled_date,
        payment_method: req.payment_method,
        note: req.note,
        lines: req
            .lines
            .into_iter()
            .map(|l| NewOrderLine {
                product_id: l.product_id,
                quantity: l.quantity,
            })
            .collect(),
        request_id: req.request_id,
    };

    let order = state.engine.create_order(input)?;
    Ok((StatusCode::CREATED, Json(order)))
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Filter by order status (optional)
    pub status: Option<OrderStatus>,
}

/// GET /api/orders - list orders, newest first
pub async fn list(
    State(state): State<AppState>,
    CallerIdentity(actor): CallerIdentity,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<Order>>> {
    let mut orders = state.engine.list_orders(query.status)?;
    // parents see only their own orders
    if !actor.role.is_staff() {
        orders.retain(|o| o.requester == actor.id);
    }
    Ok(Json(orders))
}

/// GET /api/orders/:id
pub async fn get_by_id(
    State(state): State<AppState>,
    CallerIdentity(actor): CallerIdentity,
    Path(id): Path<String>,
) -> ApiResult<Json<Order>> {
    let order = state.engine.get_order(&id)?;
    if !actor.role.is_staff() && order.requester != actor.id {
        return Err(ApiError::not_found(format!("Order {id} not found")));
    }
    Ok(Json(order))
}

/// POST /api/orders/:id/confirm-payment - staff confirms cash collection
pub async fn confirm_payment(
    State(state): State<AppState>,
    CallerIdentity(actor): CallerIdentity,
    Path(id): Path<String>,
) -> ApiResult<Json<Order>> {
    let order = state.gateway.confirm_payment(&actor, &id)?;
    Ok(Json(order))
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
}

/// POST /api/orders/:id/status - staff/admin fulfillment transition
pub async fn update_status(
    State(state): State<AppState>,
    CallerIdentity(actor): CallerIdentity,
    Path(id): Path<String>,
    Json(req): Json<UpdateStatusRequest>,
) -> ApiResult<Json<Order>> {
    let order = state.gateway.transition(&actor, &id, req.status)?;
    Ok(Json(order))
}

#[derive(Debug, Deserialize, Validate)]
pub struct BulkStatusRequest {
    #[validate(length(min = 1, message = "order_ids must not be empty"))]
    pub order_ids: Vec<String>,
    pub status: OrderStatus,
}

/// POST /api/orders/bulk-status - one transition across many orders,
/// reporting per-order success/failure
pub async fn bulk_status(
    State(state): State<AppState>,
    CallerIdentity(actor): CallerIdentity,
    Json(req): Json<BulkStatusRequest>,
) -> ApiResult<Json<BulkOutcome>> {
    req.validate()
        .map_err(|e| ApiError::unprocessable(e.to_string()))?;
    let outcome = state
        .gateway
        .transition_batch(&actor, &req.order_ids, req.status)?;
    Ok(Json(outcome))
}

#[derive(Debug, Deserialize, Validate)]
pub struct RefundRequest {
    #[validate(length(min = 1, message = "reason is required"))]
    pub reason: String,
}

/// POST /api/orders/:id/refund - admin compensating transaction
pub async fn refund(
    State(state): State<AppState>,
    CallerIdentity(actor): CallerIdentity,
    Path(id): Path<String>,
    Json(req): Json<RefundRequest>,
) -> ApiResult<Json<RefundOutcome>> {
    req.validate()
        .map_err(|e| ApiError::unprocessable(e.to_string()))?;
    let outcome = state.gateway.refund(&actor, &id, &req.reason)?;
    Ok(Json(outcome))
}

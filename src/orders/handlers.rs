//! Order HTTP handlers

use super::{
    model::{Order, OrderFilter, OrderSubmission, StatusUpdate, SubmissionReceipt},
    service::OrderService,
};
use crate::core::auth::{AuthPolicy, AuthResolver};
use crate::core::error::GarageResult;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::Json,
};
use serde_json::{Value, json};
use std::sync::Arc;
use uuid::Uuid;

/// Order-specific AppState
#[derive(Clone)]
pub struct OrderAppState {
    pub service: Arc<OrderService>,
    pub auth: Arc<AuthResolver>,
}

pub async fn submit_order(
    State(state): State<OrderAppState>,
    headers: HeaderMap,
    Json(payload): Json<OrderSubmission>,
) -> GarageResult<(StatusCode, Json<SubmissionReceipt>)> {
    let auth = state.auth.resolve(&headers).await?;
    let receipt = state.service.submit(&auth, payload).await?;
    Ok((StatusCode::CREATED, Json(receipt)))
}

pub async fn list_my_orders(
    State(state): State<OrderAppState>,
    headers: HeaderMap,
) -> GarageResult<Json<Value>> {
    let auth = state
        .auth
        .authorize(&headers, &AuthPolicy::Authenticated)
        .await?;
    // Authenticated contexts always carry an identity
    let user_id = auth.user_id().unwrap_or_default();
    let orders = state.service.list_for_customer(user_id).await?;
    Ok(Json(json!({
        "orders": orders,
        "count": orders.len()
    })))
}

pub async fn list_orders(
    State(state): State<OrderAppState>,
    headers: HeaderMap,
    Query(filter): Query<OrderFilter>,
) -> GarageResult<Json<Value>> {
    state.auth.authorize(&headers, &AuthPolicy::AdminOnly).await?;
    let orders = state.service.list_all(filter.status()?).await?;
    Ok(Json(json!({
        "orders": orders,
        "count": orders.len()
    })))
}

pub async fn get_order(
    State(state): State<OrderAppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> GarageResult<Json<Order>> {
    state.auth.authorize(&headers, &AuthPolicy::AdminOnly).await?;
    let id = Uuid::parse_str(&id)?;
    state.service.get(id).await.map(Json)
}

pub async fn update_order_status(
    State(state): State<OrderAppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(payload): Json<StatusUpdate>,
) -> GarageResult<Json<Order>> {
    let admin = state.auth.authorize(&headers, &AuthPolicy::AdminOnly).await?;
    let id = Uuid::parse_str(&id)?;
    tracing::debug!(order_id = %id, by = ?admin.email(), status = %payload.status, "status change requested");
    state
        .service
        .set_status_label(id, &payload.status)
        .await
        .map(Json)
}

pub async fn list_order_transitions(
    State(state): State<OrderAppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> GarageResult<Json<Value>> {
    state.auth.authorize(&headers, &AuthPolicy::AdminOnly).await?;
    let id = Uuid::parse_str(&id)?;
    let order = state.service.get(id).await?;
    let next = state.service.transitions(id).await?;
    Ok(Json(json!({
        "id": order.id,
        "status": order.status,
        "policy": state.service.policy(),
        "transitions": next
    })))
}

//! Visit logging and statistics handlers

use super::model::{VisitInput, VisitorEvent, VisitorStats};
use crate::core::auth::{AuthPolicy, AuthResolver};
use crate::core::error::GarageResult;
use crate::core::service::VisitorRepository;
use axum::{
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode, header},
    response::Json,
};
use std::sync::Arc;

/// Visitor-specific AppState
#[derive(Clone)]
pub struct VisitorAppState {
    pub repository: Arc<dyn VisitorRepository>,
    pub auth: Arc<AuthResolver>,
}

/// Log a page view
///
/// Always answers `202 Accepted`; the caller never waits on or learns about
/// logging failures.
pub async fn record_visit(
    State(state): State<VisitorAppState>,
    headers: HeaderMap,
    payload: Result<Json<VisitInput>, JsonRejection>,
) -> StatusCode {
    let input = match payload {
        Ok(Json(input)) => input,
        Err(rejection) => {
            tracing::warn!(error = %rejection, "visit payload rejected");
            return StatusCode::ACCEPTED;
        }
    };

    let page = input.page.trim();
    if page.is_empty() {
        tracing::debug!("visit without page ignored");
        return StatusCode::ACCEPTED;
    }

    let user_agent = input.user_agent.unwrap_or_else(|| {
        headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string()
    });

    if let Err(e) = state
        .repository
        .append(VisitorEvent::new(page, user_agent))
        .await
    {
        tracing::warn!(error = %e, page = %page, "visit could not be logged");
    }

    StatusCode::ACCEPTED
}

pub async fn visitor_stats(
    State(state): State<VisitorAppState>,
    headers: HeaderMap,
) -> GarageResult<Json<VisitorStats>> {
    state.auth.authorize(&headers, &AuthPolicy::AdminOnly).await?;
    let stats = state.repository.summarize().await.map_err(|e| {
        tracing::warn!(error = %e, "visitor statistics unavailable");
        e
    })?;
    Ok(Json(stats))
}

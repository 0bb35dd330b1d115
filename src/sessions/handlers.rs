//! Sign-in, sign-up and identity claim handlers

use crate::core::auth::{AuthResolver, Session};
use crate::core::error::{GarageResult, IdentityError};
use crate::core::validation::{FieldChecker, filters, validators};
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;

/// Minimum password length accepted at sign-up and claim
pub const MIN_PASSWORD_LENGTH: usize = 6;

#[derive(Clone)]
pub struct SessionAppState {
    pub auth: Arc<AuthResolver>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClaimRequest {
    #[serde(default)]
    pub claim_token: String,
    #[serde(default)]
    pub password: String,
}

/// Session as returned to clients, with the caller's role
#[derive(Debug, Clone, Serialize)]
pub struct SessionResponse {
    #[serde(flatten)]
    pub session: Session,
    pub is_admin: bool,
}

impl SessionAppState {
    fn respond(&self, session: Session) -> SessionResponse {
        let is_admin = self.auth.context_for(&session.identity).is_admin();
        SessionResponse { session, is_admin }
    }
}

fn password_rule() -> impl Fn(&str, &str) -> Result<(), String> + Send + Sync + Clone {
    |field: &str, value: &str| {
        if value.chars().count() < MIN_PASSWORD_LENGTH {
            Err(format!(
                "'{}' must be at least {} characters",
                field, MIN_PASSWORD_LENGTH
            ))
        } else {
            Ok(())
        }
    }
}

fn normalized_email(raw: String) -> String {
    filters::lowercase()("email", filters::trim()("email", raw))
}

pub async fn sign_in(
    State(state): State<SessionAppState>,
    Json(payload): Json<Credentials>,
) -> GarageResult<Json<SessionResponse>> {
    let email = normalized_email(payload.email);
    let mut checker = FieldChecker::new();
    checker
        .check("email", email.as_str(), validators::required())
        .check("password", payload.password.as_str(), validators::required());
    checker.finish()?;

    let session = state.auth.provider().sign_in(&email, &payload.password).await?;
    tracing::info!(user_id = %session.identity.id, "signed in");
    Ok(Json(state.respond(session)))
}

pub async fn sign_up(
    State(state): State<SessionAppState>,
    Json(payload): Json<Credentials>,
) -> GarageResult<(StatusCode, Json<SessionResponse>)> {
    let email = normalized_email(payload.email);
    let mut checker = FieldChecker::new();
    checker.check("email", email.as_str(), validators::required());
    if !checker.has_error("email") {
        checker.check("email", email.as_str(), validators::email());
    }
    checker.check("password", payload.password.as_str(), password_rule());
    checker.finish()?;

    // Administrator accounts are seeded, never self-registered
    if state.auth.is_admin_email(&email) {
        tracing::warn!("sign-up for an administrator email refused");
        return Err(IdentityError::Reserved { email }.into());
    }

    let session = state.auth.provider().sign_up(&email, &payload.password).await?;
    tracing::info!(user_id = %session.identity.id, "identity registered");
    Ok((StatusCode::CREATED, Json(state.respond(session))))
}

/// Redeem the claim token mailed to a newly provisioned customer
pub async fn claim(
    State(state): State<SessionAppState>,
    Json(payload): Json<ClaimRequest>,
) -> GarageResult<Json<SessionResponse>> {
    let mut checker = FieldChecker::new();
    checker
        .check("claim_token", payload.claim_token.trim(), validators::required())
        .check("password", payload.password.as_str(), password_rule());
    checker.finish()?;

    let session = state
        .auth
        .provider()
        .claim(payload.claim_token.trim(), &payload.password)
        .await?;
    tracing::info!(user_id = %session.identity.id, "identity claimed");
    Ok(Json(state.respond(session)))
}

/// The caller's own identity and role
pub async fn me(
    State(state): State<SessionAppState>,
    headers: HeaderMap,
) -> GarageResult<Json<Value>> {
    let auth = state.auth.resolve(&headers).await?;
    Ok(Json(json!({
        "authenticated": auth.is_authenticated(),
        "user_id": auth.user_id(),
        "email": auth.email(),
        "is_admin": auth.is_admin()
    })))
}

//! Authentication routes

pub mod handlers;

use crate::core::auth::AuthResolver;
use crate::server::entity_registry::EntityDescriptor;
use axum::{
    Router,
    routing::{get, post},
};
use handlers::{SessionAppState, claim, me, sign_in, sign_up};
use std::sync::Arc;

pub use handlers::{ClaimRequest, Credentials, SessionResponse};

/// Descriptor exposing `/auth/*`
pub struct SessionDescriptor {
    pub auth: Arc<AuthResolver>,
}

impl SessionDescriptor {
    pub fn new(auth: Arc<AuthResolver>) -> Self {
        Self { auth }
    }
}

impl EntityDescriptor for SessionDescriptor {
    fn entity_type(&self) -> &str {
        "session"
    }

    fn plural(&self) -> &str {
        "sessions"
    }

    fn build_routes(&self) -> Router {
        let state = SessionAppState {
            auth: self.auth.clone(),
        };

        Router::new()
            .route("/auth/sign-in", post(sign_in))
            .route("/auth/sign-up", post(sign_up))
            .route("/auth/claim", post(claim))
            .route("/auth/me", get(me))
            .with_state(state)
    }
}

//! Entity descriptor for VisitorEvent

use super::handlers::{VisitorAppState, record_visit, visitor_stats};
use crate::core::auth::AuthResolver;
use crate::core::service::VisitorRepository;
use crate::server::entity_registry::EntityDescriptor;
use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

pub struct VisitorDescriptor {
    pub repository: Arc<dyn VisitorRepository>,
    pub auth: Arc<AuthResolver>,
}

impl VisitorDescriptor {
    pub fn new(repository: Arc<dyn VisitorRepository>, auth: Arc<AuthResolver>) -> Self {
        Self { repository, auth }
    }
}

impl EntityDescriptor for VisitorDescriptor {
    fn entity_type(&self) -> &str {
        "visitor"
    }

    fn plural(&self) -> &str {
        "visitors"
    }

    fn build_routes(&self) -> Router {
        let state = VisitorAppState {
            repository: self.repository.clone(),
            auth: self.auth.clone(),
        };

        Router::new()
            .route("/visits", post(record_visit))
            .route("/admin/stats", get(visitor_stats))
            .with_state(state)
    }
}

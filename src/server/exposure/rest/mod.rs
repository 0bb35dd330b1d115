//! REST exposure
//!
//! Consumes an [`AppHost`] and produces the Axum `Router` serving the
//! storefront and the admin console.

use super::super::host::AppHost;
use anyhow::Result;
use axum::{Json, Router, routing::get};
use serde_json::{Value, json};
use std::sync::Arc;

/// REST API exposure implementation
pub struct RestExposure;

impl RestExposure {
    /// Build the REST router from a host
    ///
    /// The router carries:
    /// - Health check routes
    /// - Routes of every registered resource descriptor
    /// - Custom routes
    pub fn build_router(host: Arc<AppHost>, custom_routes: Vec<Router>) -> Result<Router> {
        let health_routes = Self::health_routes();
        let entity_routes = host.entity_registry.build_routes();

        let mut app = health_routes.merge(entity_routes);

        for custom_router in custom_routes {
            app = app.merge(custom_router);
        }

        tracing::debug!(resources = host.entity_types().len(), "REST router built");
        Ok(app)
    }

    /// Build health check routes
    fn health_routes() -> Router {
        Router::new()
            .route("/health", get(Self::health_check))
            .route("/healthz", get(Self::health_check))
    }

    /// Health check endpoint handler
    async fn health_check() -> Json<Value> {
        Json(json!({
            "status": "ok",
            "service": "garage-configurator"
        }))
    }
}

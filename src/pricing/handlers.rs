//! Pricing HTTP handlers and routes

use super::{GarageConfiguration, PriceCatalog, calculate};
use super::configuration::{HEIGHT_BOUNDS, LENGTH_BOUNDS, WIDTH_BOUNDS};
use crate::server::entity_registry::EntityDescriptor;
use axum::{
    Router,
    extract::State,
    response::Json,
    routing::{get, post},
};
use serde_json::{Value, json};
use std::sync::Arc;

#[derive(Clone)]
pub struct PricingAppState {
    pub catalog: Arc<PriceCatalog>,
}

/// Price a configuration
///
/// Never fails on unknown option ids; they price at zero and are listed
/// under `issues` so the client can correct them before submitting.
pub async fn quote(
    State(state): State<PricingAppState>,
    Json(config): Json<GarageConfiguration>,
) -> Json<Value> {
    let breakdown = calculate(&config, &state.catalog);
    let issues = config.issues(&state.catalog);
    Json(json!({
        "breakdown": breakdown,
        "total": breakdown.total,
        "display_total": breakdown.display_total(),
        "issues": issues
    }))
}

pub async fn catalog(State(state): State<PricingAppState>) -> Json<Value> {
    Json(json!({
        "catalog": state.catalog.as_ref(),
        "dimensions": {
            "width": WIDTH_BOUNDS,
            "length": LENGTH_BOUNDS,
            "height": HEIGHT_BOUNDS
        },
        "defaults": GarageConfiguration::default()
    }))
}

/// Descriptor exposing the pricing routes
pub struct PricingDescriptor {
    pub catalog: Arc<PriceCatalog>,
}

impl PricingDescriptor {
    pub fn new(catalog: Arc<PriceCatalog>) -> Self {
        Self { catalog }
    }
}

impl EntityDescriptor for PricingDescriptor {
    fn entity_type(&self) -> &str {
        "pricing"
    }

    fn plural(&self) -> &str {
        "pricing"
    }

    fn build_routes(&self) -> Router {
        let state = PricingAppState {
            catalog: self.catalog.clone(),
        };

        Router::new()
            .route("/pricing/quote", post(quote))
            .route("/pricing/catalog", get(catalog))
            .with_state(state)
    }
}

//! Entity descriptor for Order

use super::handlers::{
    OrderAppState, get_order, list_my_orders, list_order_transitions, list_orders, submit_order,
    update_order_status,
};
use super::service::OrderService;
use crate::core::auth::AuthResolver;
use crate::server::entity_registry::EntityDescriptor;
use axum::{
    Router,
    routing::{get, post, put},
};
use std::sync::Arc;

/// Descriptor for the Order entity
pub struct OrderDescriptor {
    pub service: Arc<OrderService>,
    pub auth: Arc<AuthResolver>,
}

impl OrderDescriptor {
    pub fn new(service: Arc<OrderService>, auth: Arc<AuthResolver>) -> Self {
        Self { service, auth }
    }
}

impl EntityDescriptor for OrderDescriptor {
    fn entity_type(&self) -> &str {
        "order"
    }

    fn plural(&self) -> &str {
        "orders"
    }

    fn build_routes(&self) -> Router {
        let state = OrderAppState {
            service: self.service.clone(),
            auth: self.auth.clone(),
        };

        Router::new()
            .route("/orders", post(submit_order))
            .route("/orders/mine", get(list_my_orders))
            .route("/admin/orders", get(list_orders))
            .route("/admin/orders/{id}", get(get_order))
            .route("/admin/orders/{id}/status", put(update_order_status))
            .route("/admin/orders/{id}/transitions", get(list_order_transitions))
            .with_state(state)
    }
}

//! Server host holding the shared application state
//!
//! The host is the single source of truth for collaborators and services.
//! Every descriptor registered in its [`EntityRegistry`] draws its handler
//! state from here.

use crate::config::AppConfig;
use crate::core::auth::{AuthResolver, ClaimDelivery, IdentityProvider};
use crate::core::service::{GalleryRepository, OrderRepository, VisitorRepository};
use crate::gallery::GalleryDescriptor;
use crate::orders::{OrderDescriptor, OrderService};
use crate::pricing::{PriceCatalog, PricingDescriptor};
use crate::server::entity_registry::EntityRegistry;
use crate::sessions::SessionDescriptor;
use crate::visitors::VisitorDescriptor;
use std::sync::Arc;

/// Collaborators handed to the host by the builder
pub struct HostComponents {
    pub config: AppConfig,
    pub catalog: PriceCatalog,
    pub orders: Arc<dyn OrderRepository>,
    pub gallery: Arc<dyn GalleryRepository>,
    pub visitors: Arc<dyn VisitorRepository>,
    pub identities: Arc<dyn IdentityProvider>,
    pub claims: Arc<dyn ClaimDelivery>,
}

/// Host context containing all application state
///
/// # Example
///
/// ```rust,ignore
/// let host = Arc::new(ServerBuilder::new().with_in_memory_backend().build_host()?);
/// let app = RestExposure::build_router(host, vec![])?;
/// ```
pub struct AppHost {
    pub config: Arc<AppConfig>,

    /// Price tables used for quotes and order snapshots
    pub catalog: Arc<PriceCatalog>,

    pub order_service: Arc<OrderService>,

    pub gallery: Arc<dyn GalleryRepository>,

    pub visitors: Arc<dyn VisitorRepository>,

    pub identities: Arc<dyn IdentityProvider>,

    /// Resolves request credentials to an auth context
    pub auth: Arc<AuthResolver>,

    /// Entity registry for the resource routes
    pub entity_registry: EntityRegistry,
}

impl AppHost {
    /// Build the host and register every resource descriptor
    pub fn from_builder_components(components: HostComponents) -> Self {
        let HostComponents {
            config,
            catalog,
            orders,
            gallery,
            visitors,
            identities,
            claims,
        } = components;

        let config = Arc::new(config);
        let catalog = Arc::new(catalog);
        let auth = Arc::new(AuthResolver::new(identities.clone(), &config.admin.emails));
        let order_service = Arc::new(OrderService::new(
            orders,
            auth.clone(),
            claims,
            catalog.clone(),
            config.orders.transition_policy,
        ));

        let mut entity_registry = EntityRegistry::new();
        entity_registry.register(Box::new(PricingDescriptor::new(catalog.clone())));
        entity_registry.register(Box::new(OrderDescriptor::new(
            order_service.clone(),
            auth.clone(),
        )));
        entity_registry.register(Box::new(GalleryDescriptor::new(
            gallery.clone(),
            auth.clone(),
        )));
        entity_registry.register(Box::new(VisitorDescriptor::new(
            visitors.clone(),
            auth.clone(),
        )));
        entity_registry.register(Box::new(SessionDescriptor::new(auth.clone())));

        tracing::debug!(
            entities = ?entity_registry.entity_types(),
            policy = ?config.orders.transition_policy,
            "host assembled"
        );

        Self {
            config,
            catalog,
            order_service,
            gallery,
            visitors,
            identities,
            auth,
            entity_registry,
        }
    }

    /// Get entity types registered in the host
    pub fn entity_types(&self) -> Vec<&str> {
        self.entity_registry.entity_types()
    }
}

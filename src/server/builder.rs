//! ServerBuilder for fluent API to build the HTTP server

use super::exposure::RestExposure;
use super::host::{AppHost, HostComponents};
use crate::config::AppConfig;
use crate::core::auth::{ClaimDelivery, IdentityProvider};
use crate::core::service::{GalleryRepository, OrderRepository, VisitorRepository};
use crate::pricing::PriceCatalog;
use crate::storage::{
    InMemoryClaimOutbox, InMemoryGalleryRepository, InMemoryIdentityProvider,
    InMemoryOrderRepository, InMemoryVisitorRepository,
};
use anyhow::Result;
use axum::Router;
use axum::http::HeaderValue;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Builder for the garage ordering server
///
/// # Example
///
/// ```ignore
/// ServerBuilder::new()
///     .with_config(AppConfig::load()?)
///     .with_in_memory_backend()
///     .serve("0.0.0.0:3000")
///     .await?;
/// ```
pub struct ServerBuilder {
    config: Option<AppConfig>,
    catalog: Option<PriceCatalog>,
    orders: Option<Arc<dyn OrderRepository>>,
    gallery: Option<Arc<dyn GalleryRepository>>,
    visitors: Option<Arc<dyn VisitorRepository>>,
    identities: Option<Arc<dyn IdentityProvider>>,
    claims: Option<Arc<dyn ClaimDelivery>>,
    custom_routes: Vec<Router>,
}

impl ServerBuilder {
    /// Create a new ServerBuilder
    pub fn new() -> Self {
        Self {
            config: None,
            catalog: None,
            orders: None,
            gallery: None,
            visitors: None,
            identities: None,
            claims: None,
            custom_routes: Vec::new(),
        }
    }

    /// Set the application configuration (defaults to [`AppConfig::default_config`])
    pub fn with_config(mut self, config: AppConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Replace the standard price list
    pub fn with_catalog(mut self, catalog: PriceCatalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Set the order repository (required)
    pub fn with_order_repository(mut self, repository: impl OrderRepository + 'static) -> Self {
        self.orders = Some(Arc::new(repository));
        self
    }

    /// Set the gallery repository (required)
    pub fn with_gallery_repository(
        mut self,
        repository: impl GalleryRepository + 'static,
    ) -> Self {
        self.gallery = Some(Arc::new(repository));
        self
    }

    /// Set the visitor repository (required)
    pub fn with_visitor_repository(
        mut self,
        repository: impl VisitorRepository + 'static,
    ) -> Self {
        self.visitors = Some(Arc::new(repository));
        self
    }

    /// Set the identity provider (required)
    pub fn with_identity_provider(mut self, provider: impl IdentityProvider + 'static) -> Self {
        self.identities = Some(Arc::new(provider));
        self
    }

    /// Set how claim tokens reach new customers
    ///
    /// Defaults to an [`InMemoryClaimOutbox`], which only logs them.
    pub fn with_claim_delivery(mut self, delivery: impl ClaimDelivery + 'static) -> Self {
        self.claims = Some(Arc::new(delivery));
        self
    }

    /// Use process-local storage for every collaborator not set yet
    pub fn with_in_memory_backend(mut self) -> Self {
        if self.orders.is_none() {
            self.orders = Some(Arc::new(InMemoryOrderRepository::new()));
        }
        if self.gallery.is_none() {
            self.gallery = Some(Arc::new(InMemoryGalleryRepository::new()));
        }
        if self.visitors.is_none() {
            self.visitors = Some(Arc::new(InMemoryVisitorRepository::new()));
        }
        if self.identities.is_none() {
            self.identities = Some(Arc::new(InMemoryIdentityProvider::new()));
        }
        self
    }

    /// Add custom routes to the server
    ///
    /// Merged after the resource routes, so they can add endpoints such as
    /// webhooks without touching the descriptors.
    pub fn with_custom_routes(mut self, routes: Router) -> Self {
        self.custom_routes.push(routes);
        self
    }

    /// Build the host holding all application state
    pub fn build_host(mut self) -> Result<AppHost> {
        let config = self.config.take().unwrap_or_else(AppConfig::default_config);
        config.validate()?;

        let orders = self.orders.take().ok_or_else(|| {
            anyhow::anyhow!("OrderRepository is required. Call .with_order_repository()")
        })?;
        let gallery = self.gallery.take().ok_or_else(|| {
            anyhow::anyhow!("GalleryRepository is required. Call .with_gallery_repository()")
        })?;
        let visitors = self.visitors.take().ok_or_else(|| {
            anyhow::anyhow!("VisitorRepository is required. Call .with_visitor_repository()")
        })?;
        let identities = self.identities.take().ok_or_else(|| {
            anyhow::anyhow!("IdentityProvider is required. Call .with_identity_provider()")
        })?;

        Ok(AppHost::from_builder_components(HostComponents {
            config,
            catalog: self.catalog.take().unwrap_or_else(PriceCatalog::standard),
            orders,
            gallery,
            visitors,
            identities,
            claims: self
                .claims
                .take()
                .unwrap_or_else(|| Arc::new(InMemoryClaimOutbox::new())),
        }))
    }

    /// Build the final REST router with tracing and CORS layers
    pub fn build(mut self) -> Result<Router> {
        let custom_routes = std::mem::take(&mut self.custom_routes);
        let host = Arc::new(self.build_host()?);
        let cors = create_cors_layer(&host.config.server.cors_origins)?;

        let app = RestExposure::build_router(host, custom_routes)?.layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        );
        Ok(app)
    }

    /// Serve the application with graceful shutdown
    ///
    /// Handles SIGTERM and SIGINT (Ctrl+C).
    pub async fn serve(self, addr: &str) -> Result<()> {
        let app = self.build()?;
        let listener = TcpListener::bind(addr).await?;

        tracing::info!("Server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// CORS layer for the browser storefront
///
/// An empty origin list allows any origin.
pub fn create_cors_layer(origins: &[String]) -> Result<CorsLayer> {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        return Ok(layer.allow_origin(Any));
    }

    let origins = origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin)
                .map_err(|e| anyhow::anyhow!("invalid CORS origin '{}': {}", origin, e))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(layer.allow_origin(AllowOrigin::list(origins)))
}

/// Wait for shutdown signal (SIGTERM or Ctrl+C)
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}

//! # Garage Configurator
//!
//! Ordering backend for a manufacturer of custom metal garages.
//!
//! ## Features
//!
//! - **Pricing**: deterministic quotes from dimensions and option tables
//! - **Orders**: submission with identity provisioning, status lifecycle
//! - **Gallery**: public showcase managed by administrators
//! - **Visitor statistics**: fire-and-forget visit log with per-page and
//!   per-day aggregation
//! - **Pluggable storage**: in-memory backend, hosted backend behind the
//!   `hosted` feature
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use garage::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = AppConfig::load()?;
//!     let addr = config.bind_address();
//!     ServerBuilder::new()
//!         .with_config(config)
//!         .with_in_memory_backend()
//!         .serve(&addr)
//!         .await
//! }
//! ```
//!
//! A quote without any server:
//!
//! ```rust,ignore
//! let catalog = PriceCatalog::standard();
//! let breakdown = calculate(&GarageConfiguration::default(), &catalog);
//! assert_eq!(breakdown.total, 2600.0);
//! ```

pub mod config;
pub mod core;
pub mod gallery;
pub mod orders;
pub mod pricing;
pub mod server;
pub mod sessions;
pub mod storage;
pub mod visitors;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        auth::{
            AuthContext, AuthPolicy, AuthResolver, ClaimDelivery, Identity, IdentityProvider,
            Session,
        },
        entity::Entity,
        error::{GarageError, GarageResult},
        service::{GalleryRepository, OrderRepository, VisitorRepository},
    };

    // === Domain ===
    pub use crate::gallery::{GalleryImage, NewGalleryImage};
    pub use crate::orders::{
        Customer, Order, OrderService, OrderStatus, OrderSubmission, TransitionPolicy,
    };
    pub use crate::pricing::{GarageConfiguration, PriceBreakdown, PriceCatalog, calculate};
    pub use crate::visitors::{VisitorEvent, VisitorStats};

    // === Storage ===
    pub use crate::storage::{
        InMemoryClaimOutbox, InMemoryGalleryRepository, InMemoryIdentityProvider,
        InMemoryOrderRepository, InMemoryVisitorRepository,
    };
    #[cfg(feature = "hosted")]
    pub use crate::storage::{
        HostedClient, HostedGalleryRepository, HostedIdentityProvider, HostedOrderRepository,
        HostedVisitorRepository,
    };

    // === Config ===
    pub use crate::config::{AppConfig, BackendKind};

    // === Server ===
    pub use crate::server::{AppHost, EntityDescriptor, EntityRegistry, ServerBuilder};

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use chrono::{DateTime, Utc};
    pub use serde::{Deserialize, Serialize};
    pub use uuid::Uuid;
}

//! Core module containing fundamental traits and types of the backend

pub mod auth;
pub mod entity;
pub mod error;
pub mod service;
pub mod validation;

pub use auth::{
    AuthContext, AuthPolicy, AuthResolver, ClaimDelivery, Identity, IdentityProvider, Provisioned,
    Session,
};
pub use entity::{Entity, newest_first};
pub use error::{GarageError, GarageResult};
pub use service::{GalleryRepository, OrderRepository, VisitorRepository};

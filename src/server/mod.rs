//! HTTP server assembly
//!
//! `ServerBuilder` collects the storage collaborators, `AppHost` wires the
//! services and resource descriptors, and `RestExposure` turns the host
//! into a router.

pub mod builder;
pub mod entity_registry;
pub mod exposure;
pub mod host;

pub use builder::{ServerBuilder, create_cors_layer};
pub use entity_registry::{EntityDescriptor, EntityRegistry};
pub use exposure::RestExposure;
pub use host::{AppHost, HostComponents};

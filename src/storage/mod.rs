//! Storage backends for orders, gallery images, visits and identities

#[cfg(feature = "hosted")]
pub mod hosted;
pub mod in_memory;

#[cfg(feature = "hosted")]
pub use hosted::{
    HostedClient, HostedGalleryRepository, HostedIdentityProvider, HostedOrderRepository,
    HostedVisitorRepository,
};
pub use in_memory::{
    InMemoryClaimOutbox, InMemoryGalleryRepository, InMemoryIdentityProvider,
    InMemoryOrderRepository, InMemoryTable, InMemoryVisitorRepository,
};

//! Repository traits for the persisted records
//!
//! The services and handlers are agnostic to the underlying store; backends
//! live in [`crate::storage`].

use crate::core::error::GarageResult;
use crate::gallery::GalleryImage;
use crate::orders::{Order, OrderStatus};
use crate::visitors::{VisitorEvent, VisitorStats};
use async_trait::async_trait;
use uuid::Uuid;

/// Store of submitted orders
///
/// Orders are never deleted. Listings are newest first.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn create(&self, order: Order) -> GarageResult<Order>;

    async fn get(&self, id: &Uuid) -> GarageResult<Option<Order>>;

    async fn list(&self) -> GarageResult<Vec<Order>>;

    /// Orders whose `customer.user_id` is `user_id`
    async fn list_by_owner(&self, user_id: &Uuid) -> GarageResult<Vec<Order>>;

    /// Persist a new status, leaving every other field untouched
    ///
    /// Returns the stored order as confirmed by the store, or `None` when no
    /// order has this id.
    async fn update_status(&self, id: &Uuid, status: OrderStatus) -> GarageResult<Option<Order>>;
}

/// Store of gallery images
#[async_trait]
pub trait GalleryRepository: Send + Sync {
    async fn create(&self, image: GalleryImage) -> GarageResult<GalleryImage>;

    /// All images, newest first
    async fn list(&self) -> GarageResult<Vec<GalleryImage>>;

    /// Remove an image, returning whether it existed
    async fn delete(&self, id: &Uuid) -> GarageResult<bool>;
}

/// Append-only visit log
#[async_trait]
pub trait VisitorRepository: Send + Sync {
    async fn append(&self, event: VisitorEvent) -> GarageResult<()>;

    async fn list(&self) -> GarageResult<Vec<VisitorEvent>>;

    /// Aggregate the whole log
    ///
    /// The default reduces [`list`](Self::list) in memory; backends able to
    /// group server-side override it.
    async fn summarize(&self) -> GarageResult<VisitorStats> {
        let events = self.list().await?;
        Ok(VisitorStats::aggregate(&events))
    }
}

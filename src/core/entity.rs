//! Entity trait shared by every persisted record

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Base trait for all persisted records.
///
/// All entities have:
/// - id: Unique identifier assigned at creation
/// - created_at: Creation timestamp, immutable
///
/// The resource name is the table (collection) the record lives in.
pub trait Entity: Clone + Send + Sync + 'static {
    /// The table name in the data store (e.g., "orders", "garage_images")
    fn resource_name() -> &'static str;

    /// Get the unique identifier for this entity instance
    fn id(&self) -> Uuid;

    /// Get the creation timestamp
    fn created_at(&self) -> DateTime<Utc>;
}

/// Sort entities newest first, ties broken by id for a stable order
pub fn newest_first<T: Entity>(items: &mut [T]) {
    items.sort_by(|a, b| {
        b.created_at()
            .cmp(&a.created_at())
            .then_with(|| a.id().cmp(&b.id()))
    });
}

//! Entity descriptor for GalleryImage

use super::handlers::{GalleryAppState, create_image, delete_image, list_images};
use crate::core::auth::AuthResolver;
use crate::core::service::GalleryRepository;
use crate::server::entity_registry::EntityDescriptor;
use axum::{
    Router,
    routing::{delete, get, post},
};
use std::sync::Arc;

pub struct GalleryDescriptor {
    pub repository: Arc<dyn GalleryRepository>,
    pub auth: Arc<AuthResolver>,
}

impl GalleryDescriptor {
    pub fn new(repository: Arc<dyn GalleryRepository>, auth: Arc<AuthResolver>) -> Self {
        Self { repository, auth }
    }
}

impl EntityDescriptor for GalleryDescriptor {
    fn entity_type(&self) -> &str {
        "gallery_image"
    }

    fn plural(&self) -> &str {
        "garage_images"
    }

    fn build_routes(&self) -> Router {
        let state = GalleryAppState {
            repository: self.repository.clone(),
            auth: self.auth.clone(),
        };

        Router::new()
            .route("/gallery", get(list_images))
            .route("/admin/gallery", post(create_image))
            .route("/admin/gallery/{id}", delete(delete_image))
            .with_state(state)
    }
}

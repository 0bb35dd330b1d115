//! Gallery HTTP handlers

use super::model::{GalleryImage, NewGalleryImage};
use crate::core::auth::{AuthPolicy, AuthResolver};
use crate::core::error::{GalleryError, GarageResult};
use crate::core::service::GalleryRepository;
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::Json,
};
use serde_json::{Value, json};
use std::sync::Arc;
use uuid::Uuid;

/// Gallery-specific AppState
#[derive(Clone)]
pub struct GalleryAppState {
    pub repository: Arc<dyn GalleryRepository>,
    pub auth: Arc<AuthResolver>,
}

pub async fn list_images(State(state): State<GalleryAppState>) -> GarageResult<Json<Value>> {
    let images = state.repository.list().await?;
    Ok(Json(json!({
        "images": images,
        "count": images.len()
    })))
}

pub async fn create_image(
    State(state): State<GalleryAppState>,
    headers: HeaderMap,
    Json(payload): Json<NewGalleryImage>,
) -> GarageResult<(StatusCode, Json<GalleryImage>)> {
    state.auth.authorize(&headers, &AuthPolicy::AdminOnly).await?;
    let image = state.repository.create(payload.into_image()?).await?;
    tracing::info!(image_id = %image.id, title = %image.title, "gallery image added");
    Ok((StatusCode::CREATED, Json(image)))
}

pub async fn delete_image(
    State(state): State<GalleryAppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> GarageResult<StatusCode> {
    state.auth.authorize(&headers, &AuthPolicy::AdminOnly).await?;
    let id = Uuid::parse_str(&id)?;
    if state.repository.delete(&id).await? {
        tracing::info!(image_id = %id, "gallery image deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(GalleryError::NotFound { id }.into())
    }
}

//! Gallery image records

use crate::core::entity::Entity;
use crate::core::error::ValidationError;
use crate::core::validation::{FieldChecker, filters, validators};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A showcase image of a finished garage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GalleryImage {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Public URL or storage object key of the image
    pub image_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
}

impl Entity for GalleryImage {
    fn resource_name() -> &'static str {
        "garage_images"
    }

    fn id(&self) -> Uuid {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Body of `POST /admin/gallery`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewGalleryImage {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub price: Option<f64>,
}

impl NewGalleryImage {
    /// Normalise and validate into a storable image
    pub fn into_image(self) -> Result<GalleryImage, ValidationError> {
        let trim = filters::trim();
        let title = filters::collapse_whitespace()("title", trim("title", self.title));
        let description = trim("description", self.description);
        let image_url = trim("image_url", self.image_url);

        let mut checker = FieldChecker::new();
        checker
            .check("title", title.as_str(), validators::required())
            .check("title", title.as_str(), validators::max_length(200))
            .check("image_url", image_url.as_str(), validators::required());
        if !checker.has_error("image_url") {
            checker.check("image_url", image_url.as_str(), validators::image_reference());
        }
        if let Some(price) = self.price {
            checker.check("price", price, validators::non_negative());
        }
        checker.finish()?;

        Ok(GalleryImage {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            title,
            description,
            image_url,
            price: self.price,
        })
    }
}

//! Gallery of finished garages

pub mod descriptor;
pub mod handlers;
pub mod model;

pub use descriptor::GalleryDescriptor;
pub use model::{GalleryImage, NewGalleryImage};

//! Visit log and visitor statistics

pub mod descriptor;
pub mod handlers;
pub mod model;

pub use descriptor::VisitorDescriptor;
pub use model::{VisitInput, VisitorEvent, VisitorStats};

//! Orders: submission workflow and status lifecycle

pub mod descriptor;
pub mod handlers;
pub mod lifecycle;
pub mod model;
pub mod service;

pub use descriptor::OrderDescriptor;
pub use lifecycle::{TransitionPolicy, allowed_transitions};
pub use model::{
    ContactDetails, Customer, Order, OrderFilter, OrderStatus, OrderSubmission, StatusUpdate,
    SubmissionReceipt,
};
pub use service::OrderService;

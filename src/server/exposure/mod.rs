//! API exposure
//!
//! Each exposure consumes an `AppHost` and produces a Router for its protocol.

pub mod rest;

pub use rest::RestExposure;

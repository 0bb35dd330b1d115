//! Pricing model of the garage configurator
//!
//! A [`GarageConfiguration`] is priced against the fixed option tables of a
//! [`PriceCatalog`]. See [`calculate`] for the formula.

pub mod catalog;
pub mod configuration;
pub mod handlers;
pub mod price;

pub use catalog::{ColorChoice, OptionCategory, OptionChoice, PriceCatalog};
pub use configuration::{
    DimensionBounds, GarageConfiguration, HEIGHT_BOUNDS, LENGTH_BOUNDS, WIDTH_BOUNDS,
};
pub use handlers::PricingDescriptor;
pub use price::{PriceBreakdown, base_price, calculate, price};

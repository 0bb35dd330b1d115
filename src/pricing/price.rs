//! Price calculation
//!
//! `total = base + roof + gate + gate_position + wall_thickness + foundation + Σ extras`
//! with `base = width * length / 10000 * rate_per_square_meter`.
//!
//! The computation is pure: the same configuration always yields the same
//! price, unknown option ids contribute nothing, and nothing is rounded.

use crate::pricing::catalog::{OptionCategory, PriceCatalog};
use crate::pricing::configuration::GarageConfiguration;
use serde::{Deserialize, Serialize};

/// Itemised price of a configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBreakdown {
    pub base: f64,
    pub roof: f64,
    pub gate: f64,
    pub gate_position: f64,
    pub wall_thickness: f64,
    pub foundation: f64,
    pub extras: f64,
    pub total: f64,
}

impl PriceBreakdown {
    /// Sum of all surcharges on top of the area price
    pub fn surcharges(&self) -> f64 {
        self.total - self.base
    }

    /// Total rounded to cents, for presentation only
    pub fn display_total(&self) -> f64 {
        (self.total * 100.0).round() / 100.0
    }
}

/// Area-proportional part of the price
pub fn base_price(config: &GarageConfiguration, catalog: &PriceCatalog) -> f64 {
    config.floor_area() * catalog.rate_per_square_meter
}

/// Price a configuration against a catalog
pub fn calculate(config: &GarageConfiguration, catalog: &PriceCatalog) -> PriceBreakdown {
    let base = base_price(config, catalog);
    let roof = catalog.surcharge(OptionCategory::Roof, &config.roof_type);
    let gate = catalog.surcharge(OptionCategory::Gate, &config.gate_type);
    let gate_position = catalog.surcharge(OptionCategory::GatePosition, &config.gate_position);
    let wall_thickness = catalog.surcharge(OptionCategory::WallThickness, &config.wall_thickness);
    let foundation = catalog.surcharge(OptionCategory::Foundation, &config.foundation);
    let extras = config
        .extras
        .iter()
        .map(|id| catalog.surcharge(OptionCategory::Extra, id))
        .sum::<f64>();

    PriceBreakdown {
        base,
        roof,
        gate,
        gate_position,
        wall_thickness,
        foundation,
        extras,
        total: base + roof + gate + gate_position + wall_thickness + foundation + extras,
    }
}

/// Total price of a configuration with the standard catalog
pub fn price(config: &GarageConfiguration) -> f64 {
    calculate(config, &PriceCatalog::standard()).total
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_config() -> GarageConfiguration {
        GarageConfiguration::default()
    }

    #[test]
    fn test_reference_configuration_prices_area_plus_foundation() {
        // 300 x 500 cm = 15 m² at 120 per m², concrete foundation 800
        let breakdown = calculate(&reference_config(), &PriceCatalog::standard());
        assert_eq!(breakdown.base, 1800.0);
        assert_eq!(breakdown.foundation, 800.0);
        assert_eq!(breakdown.total, 2600.0);
    }

    #[test]
    fn test_worked_examples_without_foundation() {
        let bare = GarageConfiguration {
            foundation: "none".to_string(),
            ..reference_config()
        };
        assert_eq!(price(&bare), 1800.0);

        let gabled = GarageConfiguration {
            roof_type: "elevated".to_string(),
            ..bare
        }
        .with_extra("door");
        assert_eq!(price(&gabled), 2549.0);
    }

    #[test]
    fn test_base_price_matches_area_rate() {
        let catalog = PriceCatalog::standard();
        assert_eq!(base_price(&reference_config(), &catalog), 1800.0);

        let large = GarageConfiguration {
            width: 800,
            length: 1200,
            ..reference_config()
        };
        assert_eq!(base_price(&large, &catalog), 11_520.0);
    }

    #[test]
    fn test_surcharges_add_up() {
        let config = GarageConfiguration {
            roof_type: "elevated".to_string(),
            ..reference_config()
        }
        .with_extra("door");

        let breakdown = calculate(&config, &PriceCatalog::standard());
        assert_eq!(breakdown.roof, 450.0);
        assert_eq!(breakdown.extras, 299.0);
        assert_eq!(breakdown.total - breakdown.foundation, 1800.0 + 450.0 + 299.0);
        assert_eq!(breakdown.surcharges(), 450.0 + 299.0 + 800.0);
    }

    #[test]
    fn test_side_gate_position_costs_extra() {
        let config = GarageConfiguration {
            gate_position: "left".to_string(),
            foundation: "none".to_string(),
            ..reference_config()
        };
        assert_eq!(price(&config), 1800.0 + 150.0);
    }

    #[test]
    fn test_unknown_ids_contribute_zero() {
        let config = GarageConfiguration {
            roof_type: "dome".to_string(),
            gate_type: "portcullis".to_string(),
            foundation: "stilts".to_string(),
            ..reference_config()
        }
        .with_extra("moat");

        let breakdown = calculate(&config, &PriceCatalog::standard());
        assert_eq!(breakdown.roof, 0.0);
        assert_eq!(breakdown.gate, 0.0);
        assert_eq!(breakdown.foundation, 0.0);
        assert_eq!(breakdown.extras, 0.0);
        assert_eq!(breakdown.total, 1800.0);
    }

    #[test]
    fn test_all_extras() {
        let catalog = PriceCatalog::standard();
        let mut config = reference_config();
        for extra in &catalog.extras {
            config.extras.insert(extra.id.clone());
        }
        let breakdown = calculate(&config, &catalog);
        assert_eq!(breakdown.extras, 3202.0);
    }

    #[test]
    fn test_no_rounding_mid_computation() {
        let config = GarageConfiguration {
            width: 250,
            length: 410,
            foundation: "none".to_string(),
            ..reference_config()
        };
        // 10.25 m² * 120
        assert_eq!(price(&config), 1230.0);

        let breakdown = PriceBreakdown {
            base: 1000.005,
            roof: 0.0,
            gate: 0.0,
            gate_position: 0.0,
            wall_thickness: 0.0,
            foundation: 0.0,
            extras: 0.0,
            total: 1000.006,
        };
        assert_eq!(breakdown.display_total(), 1000.01);
        assert_eq!(breakdown.total, 1000.006);
    }
}

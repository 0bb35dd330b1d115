//! Garage configuration value and its validation

use crate::core::error::{FieldValidationError, ValidationError};
use crate::core::validation::{FieldChecker, validators};
use crate::pricing::catalog::{OptionCategory, PriceCatalog};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Inclusive bounds and step of one dimension, in centimeters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DimensionBounds {
    pub min: u32,
    pub max: u32,
    pub step: u32,
}

pub const WIDTH_BOUNDS: DimensionBounds = DimensionBounds {
    min: 250,
    max: 800,
    step: 10,
};

pub const LENGTH_BOUNDS: DimensionBounds = DimensionBounds {
    min: 400,
    max: 1200,
    step: 10,
};

pub const HEIGHT_BOUNDS: DimensionBounds = DimensionBounds {
    min: 200,
    max: 350,
    step: 10,
};

/// The full set of user-chosen garage options plus dimensions
///
/// Field names serialize in camelCase, matching the JSON stored in the
/// `orders.config` column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GarageConfiguration {
    pub width: u32,
    pub length: u32,
    pub height: u32,
    pub color: String,
    pub roof_type: String,
    pub gate_type: String,
    pub gate_position: String,
    pub wall_thickness: String,
    pub foundation: String,
    /// Selected extras; a set, so duplicates collapse
    #[serde(default)]
    pub extras: BTreeSet<String>,
}

impl Default for GarageConfiguration {
    fn default() -> Self {
        Self {
            width: 300,
            length: 500,
            height: 220,
            color: "RAL7016".to_string(),
            roof_type: "standard".to_string(),
            gate_type: "rollup".to_string(),
            gate_position: "front".to_string(),
            wall_thickness: "standard".to_string(),
            foundation: "concrete".to_string(),
            extras: BTreeSet::new(),
        }
    }
}

impl GarageConfiguration {
    /// Floor area in square meters
    pub fn floor_area(&self) -> f64 {
        f64::from(self.width) * f64::from(self.length) / 10_000.0
    }

    /// Selected option id of a single-choice category
    ///
    /// Returns `None` for [`OptionCategory::Extra`], which is a set.
    pub fn selected(&self, category: OptionCategory) -> Option<&str> {
        match category {
            OptionCategory::Roof => Some(&self.roof_type),
            OptionCategory::Gate => Some(&self.gate_type),
            OptionCategory::GatePosition => Some(&self.gate_position),
            OptionCategory::WallThickness => Some(&self.wall_thickness),
            OptionCategory::Foundation => Some(&self.foundation),
            OptionCategory::Extra => None,
        }
    }

    pub fn with_extra(mut self, id: impl Into<String>) -> Self {
        self.extras.insert(id.into());
        self
    }

    /// Every problem with this configuration against a catalog
    ///
    /// Dimensions must lie within bounds on the 10 cm grid and every option
    /// id must exist in its table. Pricing does not require this: unknown ids
    /// simply price at zero.
    pub fn issues(&self, catalog: &PriceCatalog) -> Vec<FieldValidationError> {
        let mut checker = FieldChecker::new();

        for (field, value, bounds) in [
            ("width", self.width, WIDTH_BOUNDS),
            ("length", self.length, LENGTH_BOUNDS),
            ("height", self.height, HEIGHT_BOUNDS),
        ] {
            checker.check(
                field,
                value,
                validators::range_with_step(bounds.min, bounds.max, bounds.step),
            );
        }

        if !catalog.has_color(&self.color) {
            checker.fail("color", format!("unknown color '{}'", self.color));
        }

        for category in OptionCategory::ALL {
            if let Some(id) = self.selected(category) {
                if catalog.find(category, id).is_none() {
                    checker.fail(category.field_name(), format!("unknown option '{}'", id));
                }
            }
        }

        for id in &self.extras {
            if catalog.find(OptionCategory::Extra, id).is_none() {
                checker.fail("extras", format!("unknown extra '{}'", id));
            }
        }

        checker.into_errors()
    }

    /// Validate against a catalog, reporting every issue at once
    pub fn validate(&self, catalog: &PriceCatalog) -> Result<(), ValidationError> {
        let issues = self.issues(catalog);
        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::FieldErrors(issues))
        }
    }
}

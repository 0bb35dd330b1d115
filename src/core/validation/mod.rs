//! Validation and filtering system
//!
//! Input records are normalised with [`filters`] and checked with
//! [`validators`]. [`FieldChecker`] runs a batch of rules and reports every
//! failing field at once instead of stopping at the first one.

pub mod filters;
pub mod validators;

use crate::core::error::{FieldValidationError, ValidationError};

/// Collects field errors across several checks
#[derive(Debug, Default)]
pub struct FieldChecker {
    errors: Vec<FieldValidationError>,
}

impl FieldChecker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `rule` against `value`, recording a failure under `field`
    pub fn check<V, F>(&mut self, field: &str, value: V, rule: F) -> &mut Self
    where
        F: Fn(&str, V) -> Result<(), String>,
    {
        if let Err(message) = rule(field, value) {
            self.errors.push(FieldValidationError::new(field, message));
        }
        self
    }

    /// Record a failure directly
    pub fn fail(&mut self, field: &str, message: impl Into<String>) -> &mut Self {
        self.errors.push(FieldValidationError::new(field, message));
        self
    }

    /// Whether a failure was already recorded for `field`
    pub fn has_error(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Merge another checker's failures, prefixing their field names
    pub fn extend_prefixed(&mut self, prefix: &str, other: FieldChecker) -> &mut Self {
        self.errors.extend(
            other
                .errors
                .into_iter()
                .map(|e| FieldValidationError::new(format!("{prefix}.{}", e.field), e.message)),
        );
        self
    }

    pub fn into_errors(self) -> Vec<FieldValidationError> {
        self.errors
    }

    pub fn finish(self) -> Result<(), ValidationError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::FieldErrors(self.errors))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checker_collects_all_failures() {
        let mut checker = FieldChecker::new();
        checker
            .check("name", "", validators::required())
            .check("email", "nope", validators::email())
            .check("width", 300u32, validators::range_with_step(250, 800, 10));

        assert!(checker.has_error("name"));
        assert!(checker.has_error("email"));
        assert!(!checker.has_error("width"));

        match checker.finish() {
            Err(ValidationError::FieldErrors(errors)) => assert_eq!(errors.len(), 2),
            other => panic!("Expected FieldErrors, got {:?}", other),
        }
    }

    #[test]
    fn test_checker_empty_is_ok() {
        let mut checker = FieldChecker::new();
        checker.check("name", "Anna", validators::required());
        assert!(checker.is_empty());
        assert!(checker.finish().is_ok());
    }

    #[test]
    fn test_extend_prefixed() {
        let mut inner = FieldChecker::new();
        inner.fail("width", "too small");

        let mut outer = FieldChecker::new();
        outer.extend_prefixed("config", inner);

        let errors = outer.into_errors();
        assert_eq!(errors[0].field, "config.width");
        assert_eq!(errors[0].message, "too small");
    }
}

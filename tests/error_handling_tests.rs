//! Tests for the typed error handling system
//!
//! These tests verify that:
//! - Errors return correct HTTP status codes
//! - Error responses carry `{code, message, details}`
//! - Conversions from library errors land in the right category

use axum::http::StatusCode;
use axum::response::IntoResponse;
use garage::core::error::{
    ConfigError, FieldValidationError, GalleryError, IdentityError, OrderError, RequestError,
    StorageError, ValidationError,
};
use garage::prelude::*;

// =============================================================================
// HTTP Status Code Tests
// =============================================================================

mod status_code_tests {
    use super::*;

    #[test]
    fn test_order_errors() {
        let missing = GarageError::Order(OrderError::NotFound { id: Uuid::new_v4() });
        assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);

        let transition = GarageError::Order(OrderError::InvalidTransition {
            from: "delivered".to_string(),
            to: "pending".to_string(),
        });
        assert_eq!(transition.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_identity_errors() {
        assert_eq!(
            GarageError::from(IdentityError::InvalidCredentials).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            GarageError::from(IdentityError::InvalidClaim).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            GarageError::from(IdentityError::AlreadyRegistered {
                email: "jan@example.com".to_string()
            })
            .status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            GarageError::from(IdentityError::Provider {
                message: "timeout".to_string()
            })
            .status_code(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_request_errors() {
        let unauthorized = GarageError::Request(RequestError::Unauthorized {
            message: "missing token".to_string(),
        });
        assert_eq!(unauthorized.status_code(), StatusCode::UNAUTHORIZED);

        let forbidden = GarageError::Request(RequestError::Forbidden {
            message: "admin only".to_string(),
        });
        assert_eq!(forbidden.status_code(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_server_side_errors() {
        let storage = GarageError::Storage(StorageError::Unavailable {
            backend: "hosted".to_string(),
        });
        assert_eq!(storage.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

        let config = GarageError::Config(ConfigError::InvalidValue {
            key: "server.port".to_string(),
            message: "not a number".to_string(),
        });
        assert_eq!(config.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}

// =============================================================================
// Error Response Tests
// =============================================================================

mod error_response_tests {
    use super::*;

    #[test]
    fn test_validation_errors_include_field_details() {
        let err = GarageError::Validation(ValidationError::FieldErrors(vec![
            FieldValidationError::new("customer.email", "'email' is not a valid email"),
            FieldValidationError::new("config.width", "'width' must be between 250 and 800"),
        ]));

        let response = err.to_response();
        assert_eq!(response.code, "VALIDATION_ERROR");

        let fields = response.details.expect("details")["fields"].clone();
        assert_eq!(fields.as_array().map(Vec::len), Some(2));
        assert_eq!(fields[0]["field"], "customer.email");
    }

    #[test]
    fn test_transition_details_name_both_statuses() {
        let err = GarageError::Order(OrderError::InvalidTransition {
            from: "pending".to_string(),
            to: "delivered".to_string(),
        });
        let response = err.to_response();
        assert_eq!(response.code, "INVALID_TRANSITION");
        let details = response.details.expect("details");
        assert_eq!(details["from"], "pending");
        assert_eq!(details["to"], "delivered");
    }

    #[test]
    fn test_gallery_not_found_includes_id() {
        let id = Uuid::new_v4();
        let response = GarageError::Gallery(GalleryError::NotFound { id }).to_response();
        assert_eq!(response.details.expect("details")["id"], id.to_string());
    }

    #[test]
    fn test_into_response_status() {
        let err = GarageError::Request(RequestError::Forbidden {
            message: "admin only".to_string(),
        });
        assert_eq!(err.into_response().status(), StatusCode::FORBIDDEN);
    }
}

// =============================================================================
// Error Conversion Tests
// =============================================================================

mod error_conversion_tests {
    use super::*;

    #[test]
    fn test_uuid_error_is_validation_error() {
        let err: GarageError = Uuid::parse_str("not-a-uuid").unwrap_err().into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(matches!(
            err,
            GarageError::Validation(ValidationError::InvalidUuid { .. })
        ));
    }

    #[test]
    fn test_serde_json_error_is_validation_error() {
        let err: GarageError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
    }

    #[test]
    fn test_status_parse_error_is_field_error() {
        let err = "teleported".parse::<OrderStatus>().unwrap_err();
        match err {
            GarageError::Validation(ValidationError::FieldError { field, .. }) => {
                assert_eq!(field, "status")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_anyhow_error_is_internal() {
        let err: GarageError = anyhow::anyhow!("boom").into();
        assert_eq!(err.error_code(), "INTERNAL_ERROR");
    }
}

//! Typed error handling for the garage backend
//!
//! Every failure is scoped to the single request that triggered it. Handlers
//! return [`GarageError`], which renders as a JSON [`ErrorResponse`] with an
//! HTTP status matching its category.
//!
//! # Error Categories
//!
//! - [`ValidationError`]: malformed or incomplete input, caught before any
//!   collaborator is contacted
//! - [`IdentityError`]: sign-in, sign-up, provisioning and claim failures
//! - [`StorageError`]: the data store rejected or failed an operation
//! - [`OrderError`]: unknown orders and refused status transitions
//! - [`GalleryError`]: unknown gallery images
//! - [`RequestError`]: missing or insufficient credentials
//! - [`ConfigError`]: configuration parsing and validation
//!
//! Lookup misses in the price tables are not errors: they price at zero.
//!
//! # Example
//!
//! ```rust,ignore
//! match service.set_status(id, OrderStatus::Shipped).await {
//!     Ok(order) => println!("now {}", order.status),
//!     Err(GarageError::Order(OrderError::InvalidTransition { from, to })) => {
//!         println!("cannot move from {from} to {to}");
//!     }
//!     Err(e) => eprintln!("other error: {e}"),
//! }
//! ```

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

/// The main error type of the crate
#[derive(Debug, Error)]
pub enum GarageError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Identity(#[from] IdentityError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Order(#[from] OrderError),

    #[error(transparent)]
    Gallery(#[from] GalleryError),

    #[error(transparent)]
    Request(#[from] RequestError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Should not happen in normal operation
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl GarageError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            GarageError::Validation(_) => StatusCode::BAD_REQUEST,
            GarageError::Identity(e) => e.status_code(),
            GarageError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            GarageError::Order(e) => e.status_code(),
            GarageError::Gallery(_) => StatusCode::NOT_FOUND,
            GarageError::Request(e) => e.status_code(),
            GarageError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            GarageError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            GarageError::Validation(_) => "VALIDATION_ERROR",
            GarageError::Identity(e) => e.error_code(),
            GarageError::Storage(_) => "STORAGE_ERROR",
            GarageError::Order(e) => e.error_code(),
            GarageError::Gallery(_) => "GALLERY_IMAGE_NOT_FOUND",
            GarageError::Request(e) => e.error_code(),
            GarageError::Config(_) => "CONFIG_ERROR",
            GarageError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Convert to an error response
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.error_code().to_string(),
            message: self.to_string(),
            details: self.details(),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            GarageError::Validation(ValidationError::FieldErrors(errors)) => {
                Some(serde_json::json!({ "fields": errors }))
            }
            GarageError::Validation(ValidationError::FieldError { field, message }) => {
                Some(serde_json::json!({ "fields": [{ "field": field, "message": message }] }))
            }
            GarageError::Order(OrderError::NotFound { id }) => {
                Some(serde_json::json!({ "id": id.to_string() }))
            }
            GarageError::Order(OrderError::InvalidTransition { from, to }) => {
                Some(serde_json::json!({ "from": from, "to": to }))
            }
            GarageError::Gallery(GalleryError::NotFound { id }) => {
                Some(serde_json::json!({ "id": id.to_string() }))
            }
            _ => None,
        }
    }
}

impl IntoResponse for GarageError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.error_code(), "{}", self);
        }
        let body = Json(self.to_response());
        (status, body).into_response()
    }
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Errors related to input validation
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Validation error for field '{field}': {message}")]
    FieldError { field: String, message: String },

    #[error("Validation errors: {}", join_field_errors(.0))]
    FieldErrors(Vec<FieldValidationError>),

    #[error("Invalid JSON: {message}")]
    InvalidJson { message: String },

    #[error("Invalid UUID format: {value}")]
    InvalidUuid { value: String },
}

/// A single field validation error
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldValidationError {
    pub field: String,
    pub message: String,
}

impl FieldValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

fn join_field_errors(errors: &[FieldValidationError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join(", ")
}

impl ValidationError {
    /// Field errors as a flat list, whatever the variant
    pub fn fields(&self) -> Vec<FieldValidationError> {
        match self {
            ValidationError::FieldError { field, message } => {
                vec![FieldValidationError::new(field.clone(), message.clone())]
            }
            ValidationError::FieldErrors(errors) => errors.clone(),
            _ => Vec::new(),
        }
    }
}

// =============================================================================
// Identity Errors
// =============================================================================

/// Errors raised by the identity collaborator
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("An identity with email '{email}' already exists")]
    AlreadyRegistered { email: String },

    #[error("Email '{email}' is reserved for administrators")]
    Reserved { email: String },

    #[error("Sign in to order under '{email}'")]
    SignInRequired { email: String },

    #[error("Claim token is invalid or was already used")]
    InvalidClaim,

    #[error("Session is invalid or expired")]
    InvalidSession,

    #[error("Identity provider error: {message}")]
    Provider { message: String },
}

impl IdentityError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            IdentityError::InvalidCredentials
            | IdentityError::InvalidClaim
            | IdentityError::InvalidSession
            | IdentityError::SignInRequired { .. } => StatusCode::UNAUTHORIZED,
            IdentityError::AlreadyRegistered { .. } => StatusCode::CONFLICT,
            IdentityError::Reserved { .. } => StatusCode::FORBIDDEN,
            IdentityError::Provider { .. } => StatusCode::BAD_GATEWAY,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            IdentityError::InvalidCredentials => "INVALID_CREDENTIALS",
            IdentityError::AlreadyRegistered { .. } => "IDENTITY_ALREADY_REGISTERED",
            IdentityError::Reserved { .. } => "IDENTITY_RESERVED",
            IdentityError::SignInRequired { .. } => "SIGN_IN_REQUIRED",
            IdentityError::InvalidClaim => "INVALID_CLAIM",
            IdentityError::InvalidSession => "INVALID_SESSION",
            IdentityError::Provider { .. } => "IDENTITY_PROVIDER_ERROR",
        }
    }
}

// =============================================================================
// Storage Errors
// =============================================================================

/// Errors related to storage backends
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to connect to {backend}: {message}")]
    ConnectionError { backend: String, message: String },

    #[error("{backend} query error: {message}")]
    QueryError { backend: String, message: String },

    #[error("Data integrity error: {message}")]
    IntegrityError { message: String },

    #[error("Storage backend '{backend}' is unavailable")]
    Unavailable { backend: String },
}

// =============================================================================
// Order Errors
// =============================================================================

/// Errors related to the order lifecycle
#[derive(Debug, Error)]
pub enum OrderError {
    #[error("order with id '{id}' not found")]
    NotFound { id: Uuid },

    #[error("order status cannot change from '{from}' to '{to}'")]
    InvalidTransition { from: String, to: String },
}

impl OrderError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            OrderError::NotFound { .. } => StatusCode::NOT_FOUND,
            OrderError::InvalidTransition { .. } => StatusCode::CONFLICT,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            OrderError::NotFound { .. } => "ORDER_NOT_FOUND",
            OrderError::InvalidTransition { .. } => "INVALID_TRANSITION",
        }
    }
}

// =============================================================================
// Gallery Errors
// =============================================================================

/// Errors related to gallery images
#[derive(Debug, Error)]
pub enum GalleryError {
    #[error("gallery image with id '{id}' not found")]
    NotFound { id: Uuid },
}

// =============================================================================
// Request Errors
// =============================================================================

/// Errors related to the incoming request itself
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    #[error("Bad request: {message}")]
    BadRequest { message: String },
}

impl RequestError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RequestError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            RequestError::Forbidden { .. } => StatusCode::FORBIDDEN,
            RequestError::BadRequest { .. } => StatusCode::BAD_REQUEST,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            RequestError::Unauthorized { .. } => "UNAUTHORIZED",
            RequestError::Forbidden { .. } => "FORBIDDEN",
            RequestError::BadRequest { .. } => "BAD_REQUEST",
        }
    }
}

// =============================================================================
// Configuration Errors
// =============================================================================

/// Errors related to configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse configuration{}: {message}", .file.as_ref().map(|f| format!(" file '{f}'")).unwrap_or_default())]
    ParseError {
        file: Option<String>,
        message: String,
    },

    #[error("Invalid value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

// =============================================================================
// Conversions
// =============================================================================

impl From<serde_json::Error> for GarageError {
    fn from(err: serde_json::Error) -> Self {
        GarageError::Validation(ValidationError::InvalidJson {
            message: err.to_string(),
        })
    }
}

impl From<uuid::Error> for GarageError {
    fn from(err: uuid::Error) -> Self {
        GarageError::Validation(ValidationError::InvalidUuid {
            value: err.to_string(),
        })
    }
}

impl From<anyhow::Error> for GarageError {
    fn from(err: anyhow::Error) -> Self {
        GarageError::Internal(err.to_string())
    }
}

/// A specialized Result type for garage operations
pub type GarageResult<T> = Result<T, GarageError>;

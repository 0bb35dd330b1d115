//! Authorization for the garage backend
//!
//! Provides request-scoped authorization with three caller kinds:
//! - Anonymous visitors (storefront)
//! - Customers (signed-in identities)
//! - Administrators (identities whose email is configured as admin)
//!
//! Identities and sessions are owned by an [`IdentityProvider`]; the
//! [`AuthResolver`] turns an `Authorization: Bearer <token>` header into an
//! [`AuthContext`] and checks it against an [`AuthPolicy`].

use crate::core::error::{GarageError, GarageResult, IdentityError, RequestError};
use async_trait::async_trait;
use axum::http::{HeaderMap, header};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

/// Authorization context extracted from a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthContext {
    /// Signed-in customer
    Customer { user_id: Uuid, email: String },

    /// Administrator
    Admin { admin_id: Uuid, email: String },

    /// No authentication (public access)
    Anonymous,
}

impl AuthContext {
    /// Check if context represents an admin
    pub fn is_admin(&self) -> bool {
        matches!(self, AuthContext::Admin { .. })
    }

    pub fn is_authenticated(&self) -> bool {
        !matches!(self, AuthContext::Anonymous)
    }

    /// Identity id of any signed-in caller
    pub fn user_id(&self) -> Option<Uuid> {
        match self {
            AuthContext::Customer { user_id, .. } => Some(*user_id),
            AuthContext::Admin { admin_id, .. } => Some(*admin_id),
            AuthContext::Anonymous => None,
        }
    }

    pub fn email(&self) -> Option<&str> {
        match self {
            AuthContext::Customer { email, .. } | AuthContext::Admin { email, .. } => Some(email),
            AuthContext::Anonymous => None,
        }
    }
}

/// Authorization policy for an operation
#[derive(Debug, Clone)]
pub enum AuthPolicy {
    /// Public access (no auth required)
    Public,

    /// Any signed-in caller
    Authenticated,

    /// Admin only
    AdminOnly,

    /// Combination of policies (AND)
    And(Vec<AuthPolicy>),

    /// Combination of policies (OR)
    Or(Vec<AuthPolicy>),

    /// Custom policy function
    Custom(fn(&AuthContext) -> bool),
}

impl AuthPolicy {
    /// Check if auth context satisfies this policy
    pub fn check(&self, context: &AuthContext) -> bool {
        match self {
            AuthPolicy::Public => true,

            AuthPolicy::Authenticated => context.is_authenticated(),

            AuthPolicy::AdminOnly => context.is_admin(),

            AuthPolicy::And(policies) => policies.iter().all(|p| p.check(context)),

            AuthPolicy::Or(policies) => policies.iter().any(|p| p.check(context)),

            AuthPolicy::Custom(f) => f(context),
        }
    }

    /// Check the policy, failing with 401 for anonymous callers and 403 otherwise
    pub fn enforce(&self, context: &AuthContext) -> Result<(), RequestError> {
        if self.check(context) {
            Ok(())
        } else if context.is_authenticated() {
            Err(RequestError::Forbidden {
                message: "insufficient permissions".to_string(),
            })
        } else {
            Err(RequestError::Unauthorized {
                message: "sign in required".to_string(),
            })
        }
    }
}

// =============================================================================
// Identities
// =============================================================================

/// An identity known to the identity provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: Uuid,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// A signed-in identity and the bearer token proving it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub identity: Identity,
}

/// A freshly provisioned identity
///
/// `claim_token` is `None` when the provider sends the claim to the owner
/// itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provisioned {
    pub identity: Identity,
    pub claim_token: Option<String>,
}

/// Identity and session collaborator
///
/// Emails are compared case-insensitively. Credentials never leave the
/// provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Exchange email and password for a session
    async fn sign_in(&self, email: &str, password: &str) -> GarageResult<Session>;

    /// Register a new identity and sign it in
    async fn sign_up(&self, email: &str, password: &str) -> GarageResult<Session>;

    async fn find_by_email(&self, email: &str) -> GarageResult<Option<Identity>>;

    /// Create an identity with an unguessable credential
    ///
    /// The returned claim token lets the owner choose a password once.
    async fn provision(&self, email: &str) -> GarageResult<Provisioned>;

    /// Redeem a claim token, setting the password and signing in
    async fn claim(&self, claim_token: &str, password: &str) -> GarageResult<Session>;

    /// Resolve a bearer token to its identity
    async fn resolve_session(&self, access_token: &str) -> GarageResult<Identity>;
}

/// Hands a claim token to the owner of the provisioned mailbox
///
/// The token never travels back to the HTTP caller that triggered the
/// provisioning.
#[async_trait]
pub trait ClaimDelivery: Send + Sync {
    async fn deliver(&self, identity: &Identity, claim_token: &str) -> GarageResult<()>;
}

// =============================================================================
// Request resolution
// =============================================================================

/// Turns request headers into an [`AuthContext`]
pub struct AuthResolver {
    provider: Arc<dyn IdentityProvider>,
    admin_emails: HashSet<String>,
}

impl AuthResolver {
    pub fn new(provider: Arc<dyn IdentityProvider>, admin_emails: &[String]) -> Self {
        Self {
            provider,
            admin_emails: admin_emails
                .iter()
                .map(|e| e.trim().to_lowercase())
                .filter(|e| !e.is_empty())
                .collect(),
        }
    }

    pub fn provider(&self) -> &Arc<dyn IdentityProvider> {
        &self.provider
    }

    /// Whether `email` belongs to a configured administrator
    pub fn is_admin_email(&self, email: &str) -> bool {
        self.admin_emails.contains(&email.trim().to_lowercase())
    }

    /// Context of a known identity
    pub fn context_for(&self, identity: &Identity) -> AuthContext {
        if self.is_admin_email(&identity.email) {
            AuthContext::Admin {
                admin_id: identity.id,
                email: identity.email.clone(),
            }
        } else {
            AuthContext::Customer {
                user_id: identity.id,
                email: identity.email.clone(),
            }
        }
    }

    /// Resolve the caller of a request
    ///
    /// A missing `Authorization` header yields [`AuthContext::Anonymous`]; a
    /// malformed header or an unknown token is an error.
    pub async fn resolve(&self, headers: &HeaderMap) -> GarageResult<AuthContext> {
        let token = match bearer_token(headers)? {
            Some(token) => token,
            None => return Ok(AuthContext::Anonymous),
        };

        let identity = self.provider.resolve_session(&token).await.map_err(|e| {
            tracing::debug!(error = %e, "bearer token rejected");
            e
        })?;
        Ok(self.context_for(&identity))
    }

    /// Resolve the caller and enforce `policy`
    pub async fn authorize(
        &self,
        headers: &HeaderMap,
        policy: &AuthPolicy,
    ) -> GarageResult<AuthContext> {
        let context = self.resolve(headers).await?;
        policy.enforce(&context)?;
        Ok(context)
    }
}

fn bearer_token(headers: &HeaderMap) -> Result<Option<String>, GarageError> {
    let Some(value) = headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };

    let value = value.to_str().map_err(|_| RequestError::BadRequest {
        message: "Authorization header is not valid ASCII".to_string(),
    })?;

    match value.split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") && !token.trim().is_empty() => {
            Ok(Some(token.trim().to_string()))
        }
        _ => Err(IdentityError::InvalidSession.into()),
    }
}

//! Hosted backend speaking the PostgREST and GoTrue HTTP dialects
//!
//! Tables live under `{url}/rest/v1/{table}` and identities under
//! `{url}/auth/v1`. Row shapes match the serde shapes of [`Order`],
//! [`GalleryImage`] and [`VisitorEvent`].
//!
//! # Feature flag
//!
//! This module is gated behind the `hosted` feature flag:
//! ```toml
//! [dependencies]
//! garage-configurator = { version = "0.1", features = ["hosted"] }
//! ```
//!
//! Table writes and the identity admin API use the service key when one is
//! configured, falling back to the anon key.

use crate::config::BackendConfig;
use crate::core::auth::{Identity, IdentityProvider, Provisioned, Session};
use crate::core::error::{ConfigError, GarageError, GarageResult, IdentityError, StorageError};
use crate::core::service::{GalleryRepository, OrderRepository, VisitorRepository};
use crate::gallery::GalleryImage;
use crate::orders::{Order, OrderStatus};
use crate::visitors::{VisitorEvent, VisitorStats};
use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use uuid::Uuid;

const BACKEND: &str = "hosted";

/// Page size when scanning the identity admin API
const USERS_PER_PAGE: usize = 200;

fn connection_error(err: reqwest::Error) -> GarageError {
    StorageError::ConnectionError {
        backend: BACKEND.to_string(),
        message: err.to_string(),
    }
    .into()
}

fn provider_error(message: impl Into<String>) -> GarageError {
    IdentityError::Provider {
        message: message.into(),
    }
    .into()
}

/// Shared HTTP client for one hosted project
#[derive(Clone, Debug)]
pub struct HostedClient {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
    service_key: Option<String>,
}

impl HostedClient {
    pub fn new(base_url: &str, anon_key: &str, service_key: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
            service_key,
        }
    }

    /// Client for the `backend` section of the configuration
    pub fn from_config(config: &BackendConfig) -> GarageResult<Self> {
        let url = config.url.as_deref().ok_or_else(|| {
            GarageError::Config(ConfigError::InvalidValue {
                key: "backend.url".to_string(),
                message: "required for the hosted backend".to_string(),
            })
        })?;
        let anon_key = config.anon_key.as_deref().ok_or_else(|| {
            GarageError::Config(ConfigError::InvalidValue {
                key: "backend.anon_key".to_string(),
                message: "required for the hosted backend".to_string(),
            })
        })?;
        Ok(Self::new(url, anon_key, config.service_key.clone()))
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    fn privileged_key(&self) -> &str {
        self.service_key.as_deref().unwrap_or(&self.anon_key)
    }

    /// Request carrying the project key as both `apikey` and bearer
    fn privileged(&self, method: Method, url: String) -> RequestBuilder {
        let key = self.privileged_key();
        self.http
            .request(method, url)
            .header("apikey", key)
            .bearer_auth(key)
    }

    /// Request on behalf of a signed-in identity
    fn as_user(&self, method: Method, url: String, access_token: &str) -> RequestBuilder {
        self.http
            .request(method, url)
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
    }

    fn public(&self, method: Method, url: String) -> RequestBuilder {
        self.http
            .request(method, url)
            .header("apikey", &self.anon_key)
    }

    async fn rows<T: DeserializeOwned>(&self, request: RequestBuilder) -> GarageResult<Vec<T>> {
        let response = request.send().await.map_err(connection_error)?;
        let response = ensure_success(response).await?;
        response.json::<Vec<T>>().await.map_err(connection_error)
    }

    async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &[(&str, String)],
    ) -> GarageResult<Vec<T>> {
        let request = self
            .privileged(Method::GET, self.table_url(table))
            .query(&[("select", "*")])
            .query(query);
        self.rows(request).await
    }

    async fn insert<T: serde::Serialize + DeserializeOwned>(
        &self,
        table: &str,
        row: &T,
    ) -> GarageResult<T> {
        let request = self
            .privileged(Method::POST, self.table_url(table))
            .header("Prefer", "return=representation")
            .json(row);
        self.rows::<T>(request)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| {
                StorageError::IntegrityError {
                    message: format!("insert into {} returned no row", table),
                }
                .into()
            })
    }

    async fn patch<T: DeserializeOwned>(
        &self,
        table: &str,
        id: &Uuid,
        changes: Value,
    ) -> GarageResult<Option<T>> {
        let request = self
            .privileged(Method::PATCH, self.table_url(table))
            .query(&[("id", format!("eq.{}", id))])
            .header("Prefer", "return=representation")
            .json(&changes);
        Ok(self.rows::<T>(request).await?.into_iter().next())
    }

    async fn delete(&self, table: &str, id: &Uuid) -> GarageResult<bool> {
        let request = self
            .privileged(Method::DELETE, self.table_url(table))
            .query(&[("id", format!("eq.{}", id))])
            .header("Prefer", "return=representation");
        Ok(!self.rows::<Value>(request).await?.is_empty())
    }

    async fn rpc<T: DeserializeOwned>(&self, function: &str) -> GarageResult<T> {
        let url = format!("{}/rest/v1/rpc/{}", self.base_url, function);
        let response = self
            .privileged(Method::POST, url)
            .json(&json!({}))
            .send()
            .await
            .map_err(connection_error)?;
        let response = ensure_success(response).await?;
        response.json::<T>().await.map_err(connection_error)
    }
}

async fn ensure_success(response: Response) -> GarageResult<Response> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    tracing::warn!(%status, body = %body, "hosted backend request failed");
    Err(StorageError::QueryError {
        backend: BACKEND.to_string(),
        message: format!("{}: {}", status, body),
    }
    .into())
}

// =============================================================================
// Repositories
// =============================================================================

/// Orders in the `orders` table
#[derive(Clone, Debug)]
pub struct HostedOrderRepository {
    client: HostedClient,
}

impl HostedOrderRepository {
    pub fn new(client: HostedClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl OrderRepository for HostedOrderRepository {
    async fn create(&self, order: Order) -> GarageResult<Order> {
        self.client.insert("orders", &order).await
    }

    async fn get(&self, id: &Uuid) -> GarageResult<Option<Order>> {
        let rows = self
            .client
            .select::<Order>("orders", &[("id", format!("eq.{}", id))])
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn list(&self) -> GarageResult<Vec<Order>> {
        self.client
            .select("orders", &[("order", "created_at.desc".to_string())])
            .await
    }

    async fn list_by_owner(&self, user_id: &Uuid) -> GarageResult<Vec<Order>> {
        self.client
            .select(
                "orders",
                &[
                    ("customer->>user_id", format!("eq.{}", user_id)),
                    ("order", "created_at.desc".to_string()),
                ],
            )
            .await
    }

    async fn update_status(&self, id: &Uuid, status: OrderStatus) -> GarageResult<Option<Order>> {
        self.client
            .patch("orders", id, json!({ "status": status }))
            .await
    }
}

/// Images in the `garage_images` table
#[derive(Clone, Debug)]
pub struct HostedGalleryRepository {
    client: HostedClient,
}

impl HostedGalleryRepository {
    pub fn new(client: HostedClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl GalleryRepository for HostedGalleryRepository {
    async fn create(&self, image: GalleryImage) -> GarageResult<GalleryImage> {
        self.client.insert("garage_images", &image).await
    }

    async fn list(&self) -> GarageResult<Vec<GalleryImage>> {
        self.client
            .select("garage_images", &[("order", "created_at.desc".to_string())])
            .await
    }

    async fn delete(&self, id: &Uuid) -> GarageResult<bool> {
        self.client.delete("garage_images", id).await
    }
}

/// Visit log in the `visitors` table
#[derive(Clone, Debug)]
pub struct HostedVisitorRepository {
    client: HostedClient,
}

impl HostedVisitorRepository {
    pub fn new(client: HostedClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl VisitorRepository for HostedVisitorRepository {
    async fn append(&self, event: VisitorEvent) -> GarageResult<()> {
        self.client.insert("visitors", &event).await.map(|_| ())
    }

    async fn list(&self) -> GarageResult<Vec<VisitorEvent>> {
        self.client
            .select("visitors", &[("order", "visited_at.desc".to_string())])
            .await
    }

    /// Grouped server-side by the `visitor_stats` function
    async fn summarize(&self) -> GarageResult<VisitorStats> {
        self.client.rpc("visitor_stats").await
    }
}

// =============================================================================
// Identities
// =============================================================================

#[derive(Debug, Deserialize)]
struct RemoteUser {
    id: Uuid,
    #[serde(default)]
    email: Option<String>,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl From<RemoteUser> for Identity {
    fn from(user: RemoteUser) -> Self {
        Identity {
            id: user.id,
            email: user.email.unwrap_or_default(),
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    user: Option<RemoteUser>,
}

impl TokenResponse {
    fn into_session(self) -> Option<Session> {
        Some(Session {
            access_token: self.access_token?,
            identity: self.user?.into(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct UserPage {
    #[serde(default)]
    users: Vec<RemoteUser>,
}

fn random_secret() -> String {
    format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple())
}

/// Identities managed by the hosted GoTrue service
#[derive(Clone, Debug)]
pub struct HostedIdentityProvider {
    client: HostedClient,
}

impl HostedIdentityProvider {
    pub fn new(client: HostedClient) -> Self {
        Self { client }
    }

    async fn send(&self, request: RequestBuilder) -> GarageResult<Response> {
        request
            .send()
            .await
            .map_err(|e| provider_error(e.to_string()))
    }

    async fn json<T: DeserializeOwned>(response: Response) -> GarageResult<T> {
        response
            .json::<T>()
            .await
            .map_err(|e| provider_error(e.to_string()))
    }

    async fn unexpected(response: Response) -> GarageError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        tracing::warn!(%status, body = %body, "identity provider request failed");
        provider_error(format!("{}: {}", status, body))
    }
}

#[async_trait]
impl IdentityProvider for HostedIdentityProvider {
    async fn sign_in(&self, email: &str, password: &str) -> GarageResult<Session> {
        let request = self
            .client
            .public(Method::POST, self.client.auth_url("token"))
            .query(&[("grant_type", "password")])
            .json(&json!({ "email": email, "password": password }));
        let response = self.send(request).await?;
        match response.status() {
            status if status.is_success() => Self::json::<TokenResponse>(response)
                .await?
                .into_session()
                .ok_or_else(|| provider_error("token response without session")),
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED => {
                Err(IdentityError::InvalidCredentials.into())
            }
            _ => Err(Self::unexpected(response).await),
        }
    }

    async fn sign_up(&self, email: &str, password: &str) -> GarageResult<Session> {
        let request = self
            .client
            .public(Method::POST, self.client.auth_url("signup"))
            .json(&json!({ "email": email, "password": password }));
        let response = self.send(request).await?;
        match response.status() {
            status if status.is_success() => Self::json::<TokenResponse>(response)
                .await?
                .into_session()
                .ok_or_else(|| provider_error("sign-up requires email confirmation")),
            StatusCode::UNPROCESSABLE_ENTITY | StatusCode::CONFLICT => {
                Err(IdentityError::AlreadyRegistered {
                    email: email.to_string(),
                }
                .into())
            }
            _ => Err(Self::unexpected(response).await),
        }
    }

    async fn find_by_email(&self, email: &str) -> GarageResult<Option<Identity>> {
        let wanted = email.trim().to_lowercase();
        let mut page = 1usize;
        loop {
            let request = self
                .client
                .privileged(Method::GET, self.client.auth_url("admin/users"))
                .query(&[("page", page), ("per_page", USERS_PER_PAGE)]);
            let response = self.send(request).await?;
            if !response.status().is_success() {
                return Err(Self::unexpected(response).await);
            }
            let batch = Self::json::<UserPage>(response).await?.users;
            let done = batch.len() < USERS_PER_PAGE;
            if let Some(user) = batch.into_iter().find(|u| {
                u.email
                    .as_deref()
                    .is_some_and(|e| e.eq_ignore_ascii_case(&wanted))
            }) {
                return Ok(Some(user.into()));
            }
            if done {
                return Ok(None);
            }
            page += 1;
        }
    }

    async fn provision(&self, email: &str) -> GarageResult<Provisioned> {
        let request = self
            .client
            .privileged(Method::POST, self.client.auth_url("admin/users"))
            .json(&json!({
                "email": email,
                "password": random_secret(),
                "email_confirm": true
            }));
        let response = self.send(request).await?;
        let identity: Identity = match response.status() {
            status if status.is_success() => Self::json::<RemoteUser>(response).await?.into(),
            StatusCode::UNPROCESSABLE_ENTITY | StatusCode::CONFLICT => {
                return Err(IdentityError::AlreadyRegistered {
                    email: email.to_string(),
                }
                .into());
            }
            _ => return Err(Self::unexpected(response).await),
        };

        // GoTrue mails the recovery link to the mailbox owner
        let request = self
            .client
            .public(Method::POST, self.client.auth_url("recover"))
            .json(&json!({ "email": email }));
        let response = self.send(request).await?;
        if !response.status().is_success() {
            return Err(Self::unexpected(response).await);
        }

        Ok(Provisioned {
            identity,
            claim_token: None,
        })
    }

    async fn claim(&self, claim_token: &str, password: &str) -> GarageResult<Session> {
        let request = self
            .client
            .public(Method::POST, self.client.auth_url("verify"))
            .json(&json!({ "type": "recovery", "token_hash": claim_token }));
        let response = self.send(request).await?;
        let session = match response.status() {
            status if status.is_success() => Self::json::<TokenResponse>(response)
                .await?
                .into_session()
                .ok_or(IdentityError::InvalidClaim)?,
            status if status.is_client_error() => return Err(IdentityError::InvalidClaim.into()),
            _ => return Err(Self::unexpected(response).await),
        };

        let request = self
            .client
            .as_user(Method::PUT, self.client.auth_url("user"), &session.access_token)
            .json(&json!({ "password": password }));
        let response = self.send(request).await?;
        if !response.status().is_success() {
            return Err(Self::unexpected(response).await);
        }
        Ok(session)
    }

    async fn resolve_session(&self, access_token: &str) -> GarageResult<Identity> {
        let request = self
            .client
            .as_user(Method::GET, self.client.auth_url("user"), access_token);
        let response = self.send(request).await?;
        match response.status() {
            status if status.is_success() => Ok(Self::json::<RemoteUser>(response).await?.into()),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(IdentityError::InvalidSession.into())
            }
            _ => Err(Self::unexpected(response).await),
        }
    }
}

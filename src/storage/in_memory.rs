//! In-memory backend for testing and development
//!
//! Every store guards its data with a `RwLock`; guards are never held across
//! an `.await`.

use crate::core::auth::{ClaimDelivery, Identity, IdentityProvider, Provisioned, Session};
use crate::core::entity::{Entity, newest_first};
use crate::core::error::{GarageError, GarageResult, IdentityError, StorageError};
use crate::core::service::{GalleryRepository, OrderRepository, VisitorRepository};
use crate::gallery::GalleryImage;
use crate::orders::{Order, OrderStatus};
use crate::visitors::VisitorEvent;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

const BACKEND: &str = "in_memory";

fn lock_error(kind: &str, err: impl std::fmt::Display) -> GarageError {
    StorageError::QueryError {
        backend: BACKEND.to_string(),
        message: format!("Failed to acquire {kind} lock: {err}"),
    }
    .into()
}

fn read<T>(lock: &RwLock<T>) -> GarageResult<RwLockReadGuard<'_, T>> {
    lock.read().map_err(|e| lock_error("read", e))
}

fn write<T>(lock: &RwLock<T>) -> GarageResult<RwLockWriteGuard<'_, T>> {
    lock.write().map_err(|e| lock_error("write", e))
}

/// A keyed table of entities
#[derive(Clone)]
pub struct InMemoryTable<T: Entity> {
    rows: Arc<RwLock<HashMap<Uuid, T>>>,
}

impl<T: Entity> InMemoryTable<T> {
    pub fn new() -> Self {
        Self {
            rows: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn insert(&self, entity: T) -> GarageResult<T> {
        let mut rows = write(&self.rows)?;
        if rows.contains_key(&entity.id()) {
            return Err(StorageError::IntegrityError {
                message: format!("duplicate id {} in {}", entity.id(), T::resource_name()),
            }
            .into());
        }
        rows.insert(entity.id(), entity.clone());
        Ok(entity)
    }

    pub fn get(&self, id: &Uuid) -> GarageResult<Option<T>> {
        Ok(read(&self.rows)?.get(id).cloned())
    }

    /// Rows matching `predicate`, newest first
    pub fn select(&self, predicate: impl Fn(&T) -> bool) -> GarageResult<Vec<T>> {
        let mut items: Vec<T> = read(&self.rows)?
            .values()
            .filter(|row| predicate(row))
            .cloned()
            .collect();
        newest_first(&mut items);
        Ok(items)
    }

    /// Apply `change` to a row in place, returning the changed row
    pub fn modify(&self, id: &Uuid, change: impl FnOnce(&mut T)) -> GarageResult<Option<T>> {
        let mut rows = write(&self.rows)?;
        Ok(rows.get_mut(id).map(|row| {
            change(row);
            row.clone()
        }))
    }

    pub fn remove(&self, id: &Uuid) -> GarageResult<Option<T>> {
        Ok(write(&self.rows)?.remove(id))
    }

    pub fn len(&self) -> GarageResult<usize> {
        Ok(read(&self.rows)?.len())
    }

    pub fn is_empty(&self) -> GarageResult<bool> {
        Ok(self.len()? == 0)
    }
}

impl<T: Entity> Default for InMemoryTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Repositories
// =============================================================================

/// In-memory order store
#[derive(Clone, Default)]
pub struct InMemoryOrderRepository {
    table: InMemoryTable<Order>,
}

impl InMemoryOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn create(&self, order: Order) -> GarageResult<Order> {
        self.table.insert(order)
    }

    async fn get(&self, id: &Uuid) -> GarageResult<Option<Order>> {
        self.table.get(id)
    }

    async fn list(&self) -> GarageResult<Vec<Order>> {
        self.table.select(|_| true)
    }

    async fn list_by_owner(&self, user_id: &Uuid) -> GarageResult<Vec<Order>> {
        self.table.select(|order| order.owner() == Some(*user_id))
    }

    async fn update_status(&self, id: &Uuid, status: OrderStatus) -> GarageResult<Option<Order>> {
        self.table.modify(id, |order| order.status = status)
    }
}

/// In-memory gallery store
#[derive(Clone, Default)]
pub struct InMemoryGalleryRepository {
    table: InMemoryTable<GalleryImage>,
}

impl InMemoryGalleryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl GalleryRepository for InMemoryGalleryRepository {
    async fn create(&self, image: GalleryImage) -> GarageResult<GalleryImage> {
        self.table.insert(image)
    }

    async fn list(&self) -> GarageResult<Vec<GalleryImage>> {
        self.table.select(|_| true)
    }

    async fn delete(&self, id: &Uuid) -> GarageResult<bool> {
        Ok(self.table.remove(id)?.is_some())
    }
}

/// In-memory visit log
#[derive(Clone, Default)]
pub struct InMemoryVisitorRepository {
    table: InMemoryTable<VisitorEvent>,
}

impl InMemoryVisitorRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VisitorRepository for InMemoryVisitorRepository {
    async fn append(&self, event: VisitorEvent) -> GarageResult<()> {
        self.table.insert(event).map(|_| ())
    }

    async fn list(&self) -> GarageResult<Vec<VisitorEvent>> {
        self.table.select(|_| true)
    }
}

// =============================================================================
// Identity provider
// =============================================================================

struct Account {
    identity: Identity,
    salt: String,
    credential: String,
}

impl Account {
    fn new(email: &str, password: &str) -> Self {
        let salt = Uuid::new_v4().simple().to_string();
        let credential = hash_credential(&salt, password);
        Self {
            identity: Identity {
                id: Uuid::new_v4(),
                email: email.to_string(),
                created_at: Utc::now(),
            },
            salt,
            credential,
        }
    }

    fn verify(&self, password: &str) -> bool {
        hash_credential(&self.salt, password) == self.credential
    }

    fn set_password(&mut self, password: &str) {
        self.salt = Uuid::new_v4().simple().to_string();
        self.credential = hash_credential(&self.salt, password);
    }
}

fn hash_credential(salt: &str, password: &str) -> String {
    blake3::hash(format!("{salt}:{password}").as_bytes())
        .to_hex()
        .to_string()
}

fn new_token() -> String {
    format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple())
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[derive(Default)]
struct IdentityState {
    /// Accounts keyed by normalised email
    accounts: HashMap<String, Account>,
    /// Access token to normalised email
    sessions: HashMap<String, String>,
    /// Pending claim token to normalised email
    claims: HashMap<String, String>,
}

impl IdentityState {
    fn open_session(&mut self, email: &str) -> GarageResult<Session> {
        let identity = self
            .accounts
            .get(email)
            .map(|a| a.identity.clone())
            .ok_or(IdentityError::InvalidCredentials)?;
        let access_token = new_token();
        self.sessions.insert(access_token.clone(), email.to_string());
        Ok(Session {
            access_token,
            identity,
        })
    }
}

/// In-memory identity provider
///
/// Credentials are stored as salted BLAKE3 digests.
#[derive(Clone, Default)]
pub struct InMemoryIdentityProvider {
    state: Arc<RwLock<IdentityState>>,
}

impl InMemoryIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an account up front, e.g. the configured administrators
    pub fn with_account(self, email: &str, password: &str) -> GarageResult<Self> {
        {
            let mut state = write(&self.state)?;
            let email = normalize_email(email);
            state
                .accounts
                .insert(email.clone(), Account::new(&email, password));
        }
        Ok(self)
    }
}

#[async_trait]
impl IdentityProvider for InMemoryIdentityProvider {
    async fn sign_in(&self, email: &str, password: &str) -> GarageResult<Session> {
        let email = normalize_email(email);
        let mut state = write(&self.state)?;
        let verified = state
            .accounts
            .get(&email)
            .is_some_and(|account| account.verify(password));
        if !verified {
            return Err(IdentityError::InvalidCredentials.into());
        }
        state.open_session(&email)
    }

    async fn sign_up(&self, email: &str, password: &str) -> GarageResult<Session> {
        let email = normalize_email(email);
        let mut state = write(&self.state)?;
        if state.accounts.contains_key(&email) {
            return Err(IdentityError::AlreadyRegistered { email }.into());
        }
        state
            .accounts
            .insert(email.clone(), Account::new(&email, password));
        state.open_session(&email)
    }

    async fn find_by_email(&self, email: &str) -> GarageResult<Option<Identity>> {
        let email = normalize_email(email);
        let state = read(&self.state)?;
        Ok(state.accounts.get(&email).map(|a| a.identity.clone()))
    }

    async fn provision(&self, email: &str) -> GarageResult<Provisioned> {
        let email = normalize_email(email);
        let mut state = write(&self.state)?;
        if state.accounts.contains_key(&email) {
            return Err(IdentityError::AlreadyRegistered { email }.into());
        }
        let account = Account::new(&email, &new_token());
        let identity = account.identity.clone();
        let claim_token = new_token();
        state.accounts.insert(email.clone(), account);
        state.claims.insert(claim_token.clone(), email);
        Ok(Provisioned {
            identity,
            claim_token: Some(claim_token),
        })
    }

    async fn claim(&self, claim_token: &str, password: &str) -> GarageResult<Session> {
        let mut state = write(&self.state)?;
        let email = state
            .claims
            .remove(claim_token)
            .ok_or(IdentityError::InvalidClaim)?;
        state
            .accounts
            .get_mut(&email)
            .ok_or(IdentityError::InvalidClaim)?
            .set_password(password);
        state.open_session(&email)
    }

    async fn resolve_session(&self, access_token: &str) -> GarageResult<Identity> {
        let state = read(&self.state)?;
        state
            .sessions
            .get(access_token)
            .and_then(|email| state.accounts.get(email))
            .map(|account| account.identity.clone())
            .ok_or_else(|| IdentityError::InvalidSession.into())
    }
}

/// Claim delivery that logs each token and keeps it for lookup
///
/// Stands in for the mail transport in development and tests.
#[derive(Clone, Default)]
pub struct InMemoryClaimOutbox {
    sent: Arc<RwLock<HashMap<String, Vec<String>>>>,
}

impl InMemoryClaimOutbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recent claim token sent to `email`
    pub fn latest(&self, email: &str) -> GarageResult<Option<String>> {
        let sent = read(&self.sent)?;
        Ok(sent
            .get(&normalize_email(email))
            .and_then(|tokens| tokens.last().cloned()))
    }
}

#[async_trait]
impl ClaimDelivery for InMemoryClaimOutbox {
    async fn deliver(&self, identity: &Identity, claim_token: &str) -> GarageResult<()> {
        write(&self.sent)?
            .entry(normalize_email(&identity.email))
            .or_default()
            .push(claim_token.to_string());
        tracing::info!(
            user_id = %identity.id,
            email = %identity.email,
            claim_token = %claim_token,
            "claim token issued"
        );
        Ok(())
    }
}

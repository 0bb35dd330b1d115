//! Order submission workflow and status changes

use crate::core::auth::{AuthContext, AuthResolver, ClaimDelivery, Identity};
use crate::core::error::{GarageResult, IdentityError, OrderError};
use crate::core::service::OrderRepository;
use crate::core::validation::{FieldChecker, filters, validators};
use crate::orders::lifecycle::TransitionPolicy;
use crate::orders::model::{
    ContactDetails, Customer, Order, OrderStatus, OrderSubmission, SubmissionReceipt,
};
use crate::pricing::{PriceCatalog, calculate};
use std::sync::Arc;
use uuid::Uuid;

/// Business operations on orders
pub struct OrderService {
    repository: Arc<dyn OrderRepository>,
    auth: Arc<AuthResolver>,
    claims: Arc<dyn ClaimDelivery>,
    catalog: Arc<PriceCatalog>,
    policy: TransitionPolicy,
}

impl OrderService {
    pub fn new(
        repository: Arc<dyn OrderRepository>,
        auth: Arc<AuthResolver>,
        claims: Arc<dyn ClaimDelivery>,
        catalog: Arc<PriceCatalog>,
        policy: TransitionPolicy,
    ) -> Self {
        Self {
            repository,
            auth,
            claims,
            catalog,
            policy,
        }
    }

    pub fn policy(&self) -> TransitionPolicy {
        self.policy
    }

    /// Submit a configured garage as a new `pending` order
    ///
    /// Input is validated before any collaborator is contacted. A signed-in
    /// caller owns the order. An anonymous caller gets a freshly provisioned
    /// identity for the contact email, and the claim token goes to that
    /// mailbox rather than back to the caller. Anonymous orders are refused
    /// for emails that are already registered or reserved for
    /// administrators. Nothing is persisted when any step before the write
    /// fails.
    pub async fn submit(
        &self,
        auth: &AuthContext,
        submission: OrderSubmission,
    ) -> GarageResult<SubmissionReceipt> {
        let OrderSubmission { config, customer } = submission;

        let mut checker = FieldChecker::new();
        let contact = normalize_contact(customer);
        checker.extend_prefixed("customer", check_contact(&contact));
        for issue in config.issues(&self.catalog) {
            checker.fail(&format!("config.{}", issue.field), issue.message);
        }
        checker.finish()?;

        let (user_id, pending_claim) = match auth.user_id() {
            Some(user_id) => (user_id, None),
            None => {
                if self.auth.is_admin_email(&contact.email) {
                    tracing::warn!("anonymous order for an administrator email refused");
                    return Err(IdentityError::Reserved {
                        email: contact.email,
                    }
                    .into());
                }
                let identities = self.auth.provider();
                if identities.find_by_email(&contact.email).await?.is_some() {
                    return Err(IdentityError::SignInRequired {
                        email: contact.email,
                    }
                    .into());
                }
                let provisioned = identities.provision(&contact.email).await?;
                tracing::info!(
                    user_id = %provisioned.identity.id,
                    "provisioned identity for new customer"
                );
                (provisioned.identity.id, Some(provisioned))
            }
        };

        let total_price = calculate(&config, &self.catalog).total;
        let order = Order::new(
            config,
            Customer {
                name: contact.name,
                email: contact.email,
                phone: contact.phone,
                user_id: Some(user_id),
            },
            total_price,
        );

        let order = self.repository.create(order).await.map_err(|e| {
            tracing::warn!(error = %e, "order could not be stored");
            e
        })?;

        tracing::info!(
            order_id = %order.id,
            user_id = %user_id,
            total_price = order.total_price,
            "order submitted"
        );

        let claim_sent = match pending_claim {
            Some(provisioned) => {
                self.send_claim(&provisioned.identity, provisioned.claim_token.as_deref())
                    .await
            }
            None => false,
        };

        Ok(SubmissionReceipt { order, claim_sent })
    }

    /// Deliver a claim token; the order stands even when delivery fails
    async fn send_claim(&self, identity: &Identity, claim_token: Option<&str>) -> bool {
        let Some(claim_token) = claim_token else {
            return true;
        };
        match self.claims.deliver(identity, claim_token).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(user_id = %identity.id, error = %e, "claim token could not be delivered");
                false
            }
        }
    }

    pub async fn get(&self, id: Uuid) -> GarageResult<Order> {
        self.repository
            .get(&id)
            .await?
            .ok_or_else(|| OrderError::NotFound { id }.into())
    }

    /// All orders newest first, optionally only those in `status`
    pub async fn list_all(&self, status: Option<OrderStatus>) -> GarageResult<Vec<Order>> {
        let orders = self.repository.list().await?;
        Ok(match status {
            Some(status) => orders.into_iter().filter(|o| o.status == status).collect(),
            None => orders,
        })
    }

    /// Orders owned by a customer, newest first
    pub async fn list_for_customer(&self, user_id: Uuid) -> GarageResult<Vec<Order>> {
        self.repository.list_by_owner(&user_id).await
    }

    /// Statuses the order may move to next
    pub async fn transitions(&self, id: Uuid) -> GarageResult<Vec<OrderStatus>> {
        let order = self.get(id).await?;
        Ok(self.policy.next_states(order.status))
    }

    /// Move an order to a new status
    ///
    /// Setting the current status again changes nothing. The returned order
    /// is the one confirmed by the repository.
    pub async fn set_status(&self, id: Uuid, status: OrderStatus) -> GarageResult<Order> {
        let order = self.get(id).await?;

        if order.status == status {
            tracing::debug!(order_id = %id, %status, "status unchanged");
            return Ok(order);
        }

        if !self.policy.permits(order.status, status) {
            tracing::warn!(order_id = %id, from = %order.status, to = %status, "transition refused");
            return Err(OrderError::InvalidTransition {
                from: order.status.to_string(),
                to: status.to_string(),
            }
            .into());
        }

        let updated = self
            .repository
            .update_status(&id, status)
            .await?
            .ok_or(OrderError::NotFound { id })?;

        tracing::info!(order_id = %id, from = %order.status, to = %updated.status, "order status changed");
        Ok(updated)
    }

    /// [`set_status`](Self::set_status) from a raw label
    pub async fn set_status_label(&self, id: Uuid, label: &str) -> GarageResult<Order> {
        let status: OrderStatus = label.parse()?;
        self.set_status(id, status).await
    }
}

fn normalize_contact(contact: ContactDetails) -> ContactDetails {
    let trim = filters::trim();
    let name = filters::collapse_whitespace()("name", trim("name", contact.name));
    let email = filters::lowercase()("email", trim("email", contact.email));
    let phone = contact
        .phone
        .map(|p| trim("phone", p))
        .filter(|p| !p.is_empty());
    ContactDetails { name, email, phone }
}

fn check_contact(contact: &ContactDetails) -> FieldChecker {
    let mut checker = FieldChecker::new();
    checker
        .check("name", contact.name.as_str(), validators::required())
        .check("name", contact.name.as_str(), validators::max_length(120))
        .check("email", contact.email.as_str(), validators::required());
    if !checker.has_error("email") {
        checker.check("email", contact.email.as_str(), validators::email());
    }
    if let Some(phone) = &contact.phone {
        checker.check("phone", phone.as_str(), validators::phone());
    }
    checker
}

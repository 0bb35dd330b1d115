//! Order records and submission payloads

use crate::core::entity::Entity;
use crate::core::error::{GarageError, ValidationError};
use crate::pricing::GarageConfiguration;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Status of an order in its fulfilment lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Approved,
    Shipped,
    Delivered,
    Rejected,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Approved,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Approved => "approved",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = GarageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim().to_ascii_lowercase();
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == label)
            .ok_or_else(|| {
                ValidationError::FieldError {
                    field: "status".to_string(),
                    message: format!("unknown order status '{}'", s),
                }
                .into()
            })
    }
}

/// Contact details snapshot stored with an order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Identity owning the order, used by the customer listing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Uuid>,
}

/// A submitted garage order
///
/// `config`, `customer` and `total_price` are snapshots taken at submission;
/// only `status` changes afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub config: GarageConfiguration,
    pub customer: Customer,
    pub total_price: f64,
    pub status: OrderStatus,
}

impl Order {
    /// A fresh order in `pending`
    pub fn new(config: GarageConfiguration, customer: Customer, total_price: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            config,
            customer,
            total_price,
            status: OrderStatus::Pending,
        }
    }

    pub fn owner(&self) -> Option<Uuid> {
        self.customer.user_id
    }
}

impl Entity for Order {
    fn resource_name() -> &'static str {
        "orders"
    }

    fn id(&self) -> Uuid {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Contact form as typed by the customer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactDetails {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
}

/// Body of `POST /orders`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderSubmission {
    pub config: GarageConfiguration,
    pub customer: ContactDetails,
}

/// Result of a successful submission
///
/// `claim_sent` is true when a new identity was provisioned for the
/// customer and a claim link went out to the contact email.
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionReceipt {
    pub order: Order,
    pub claim_sent: bool,
}

/// Body of `PUT /admin/orders/{id}/status`
#[derive(Debug, Clone, Deserialize)]
pub struct StatusUpdate {
    pub status: String,
}

/// Query of `GET /admin/orders`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderFilter {
    pub status: Option<String>,
}

impl OrderFilter {
    pub fn status(&self) -> Result<Option<OrderStatus>, GarageError> {
        self.status
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(str::parse)
            .transpose()
    }
}

//! Order status state machine
//!
//! ```text
//! pending ──> approved ──> shipped ──> delivered
//!    │            │
//!    └────────────┴──> rejected
//! ```
//!
//! `delivered` and `rejected` are terminal. The permissive policy lets an
//! administrator set any status from any status.

use crate::core::error::ConfigError;
use crate::orders::model::OrderStatus;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Which status changes the order service accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionPolicy {
    /// Only the edges of the lifecycle graph
    #[default]
    Strict,
    /// Any known status from any status
    Permissive,
}

impl TransitionPolicy {
    /// Whether moving from `from` to `to` is allowed
    ///
    /// Staying in the same status is always allowed; the service treats it as
    /// a no-op.
    pub fn permits(&self, from: OrderStatus, to: OrderStatus) -> bool {
        if from == to {
            return true;
        }
        match self {
            TransitionPolicy::Strict => allowed_transitions(from).contains(&to),
            TransitionPolicy::Permissive => true,
        }
    }

    /// Statuses reachable in one step from `from`
    pub fn next_states(&self, from: OrderStatus) -> Vec<OrderStatus> {
        match self {
            TransitionPolicy::Strict => allowed_transitions(from).to_vec(),
            TransitionPolicy::Permissive => OrderStatus::ALL
                .into_iter()
                .filter(|status| *status != from)
                .collect(),
        }
    }
}

impl FromStr for TransitionPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(TransitionPolicy::Strict),
            "permissive" => Ok(TransitionPolicy::Permissive),
            other => Err(ConfigError::InvalidValue {
                key: "orders.transition_policy".to_string(),
                message: format!("expected 'strict' or 'permissive', got '{}'", other),
            }),
        }
    }
}

/// Outgoing edges of the lifecycle graph
pub fn allowed_transitions(from: OrderStatus) -> &'static [OrderStatus] {
    match from {
        OrderStatus::Pending => &[OrderStatus::Approved, OrderStatus::Rejected],
        OrderStatus::Approved => &[OrderStatus::Shipped, OrderStatus::Rejected],
        OrderStatus::Shipped => &[OrderStatus::Delivered],
        OrderStatus::Delivered | OrderStatus::Rejected => &[],
    }
}

impl OrderStatus {
    pub fn is_terminal(&self) -> bool {
        allowed_transitions(*self).is_empty()
    }

    pub fn can_transition_to(&self, to: OrderStatus) -> bool {
        TransitionPolicy::Strict.permits(*self, to)
    }
}

//! Visit log records and their aggregation

use crate::core::entity::Entity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// One logged page view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitorEvent {
    pub id: Uuid,
    pub page: String,
    #[serde(default)]
    pub user_agent: String,
    pub visited_at: DateTime<Utc>,
}

impl VisitorEvent {
    pub fn new(page: impl Into<String>, user_agent: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            page: page.into(),
            user_agent: user_agent.into(),
            visited_at: Utc::now(),
        }
    }

    /// UTC calendar date of the visit, `YYYY-MM-DD`
    pub fn date_key(&self) -> String {
        self.visited_at.date_naive().format("%Y-%m-%d").to_string()
    }
}

impl Entity for VisitorEvent {
    fn resource_name() -> &'static str {
        "visitors"
    }

    fn id(&self) -> Uuid {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.visited_at
    }
}

/// Body of `POST /visits`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VisitInput {
    #[serde(default)]
    pub page: String,
    #[serde(default)]
    pub user_agent: Option<String>,
}

/// Visit counts grouped by page and by UTC date
///
/// Both groupings partition the same log, so each sums to `total`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitorStats {
    pub total: u64,
    pub by_page: BTreeMap<String, u64>,
    pub by_date: BTreeMap<String, u64>,
}

impl VisitorStats {
    pub fn aggregate<'a>(events: impl IntoIterator<Item = &'a VisitorEvent>) -> Self {
        events
            .into_iter()
            .fold(VisitorStats::default(), |mut stats, event| {
                stats.record(event);
                stats
            })
    }

    pub fn record(&mut self, event: &VisitorEvent) {
        self.total += 1;
        *self.by_page.entry(event.page.clone()).or_insert(0) += 1;
        *self.by_date.entry(event.date_key()).or_insert(0) += 1;
    }
}

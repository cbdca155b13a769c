// SPDX-FileCopyrightText: 2026 Woom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Results of checkout scheduling and processing attempts.

use chrono::{DateTime, Utc};
use serde::Serialize;
use woom_core::{ItemId, ProductId, RegistrationTask};

/// How a single processing attempt ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AttemptOutcome {
    /// The product has no webinar id; nothing was done.
    Skipped,
    /// A new join link was obtained and stored.
    Registered { join_url: String },
    /// A join link already existed and was replayed without registering.
    Replayed { join_url: String },
    /// A follow-up attempt was scheduled.
    Rescheduled {
        fire_at: DateTime<Utc>,
        task: RegistrationTask,
    },
    /// Rate limited and the quota resets after the webinar starts.
    GivenUp,
}

impl AttemptOutcome {
    /// Metric label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Skipped => "skipped",
            Self::Registered { .. } => "registered",
            Self::Replayed { .. } => "replayed",
            Self::Rescheduled { .. } => "rescheduled",
            Self::GivenUp => "given_up",
        }
    }

    pub fn join_url(&self) -> Option<&str> {
        match self {
            Self::Registered { join_url } | Self::Replayed { join_url } => Some(join_url),
            _ => None,
        }
    }
}

/// One line item picked up at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduledItem {
    pub item_id: ItemId,
    pub product_id: ProductId,
    pub fire_at: DateTime<Utc>,
    /// Set when the webinar day had already begun and the attempt ran at once.
    pub immediate: Option<AttemptOutcome>,
}

/// What checkout scheduling did for an order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CheckoutReport {
    pub scheduled: Vec<ScheduledItem>,
    /// Line items whose product carries no webinar id.
    pub ignored: Vec<ItemId>,
}

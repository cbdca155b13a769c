// SPDX-FileCopyrightText: 2026 Woom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Registration pipeline for Woom.
//!
//! [`Orchestrator::schedule_order`] is the checkout entry point: it queues one
//! task per webinar line item. [`Orchestrator::process_task`] runs a single
//! attempt for a task and decides what happens next.

pub mod audit;
pub mod collect;
pub mod metrics;
pub mod notify;
pub mod orchestrator;
pub mod outcome;
pub mod policy;

pub use audit::{CALLED_FROM_CHECKOUT, CALLED_FROM_TASK, JOIN_URL_EXISTS, JOIN_URL_MISSING, RATE_LIMIT_MESSAGE};
pub use collect::CollectingScheduler;
pub use metrics::register_metrics;
pub use notify::{LogNotifier, WebhookNotifier};
pub use orchestrator::{Collaborators, Orchestrator};
pub use outcome::{AttemptOutcome, CheckoutReport, ScheduledItem};
pub use policy::SchedulePolicy;

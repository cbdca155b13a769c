// SPDX-FileCopyrightText: 2026 Woom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deferred task scheduling capability.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::WoomError;
use crate::types::RegistrationTask;

/// Accepts tasks to fire no earlier than `fire_at`.
///
/// A reschedule is simply another call to [`TaskScheduler::schedule`] with an
/// updated `previous_status_code`.
#[async_trait]
pub trait TaskScheduler: Send + Sync {
    async fn schedule(&self, fire_at: DateTime<Utc>, task: RegistrationTask)
    -> Result<(), WoomError>;
}

/// Receives due tasks from a scheduler.
#[async_trait]
pub trait TaskHandler: Send + Sync {
    async fn handle(&self, task: RegistrationTask) -> Result<(), WoomError>;
}

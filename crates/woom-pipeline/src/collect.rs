// SPDX-FileCopyrightText: 2026 Woom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! A [`TaskScheduler`] that only remembers what it was asked to do.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use woom_core::{RegistrationTask, TaskScheduler, WoomError};

/// Collects scheduled tasks instead of running them.
///
/// `woom process` uses it to show the follow-up an attempt would have queued.
#[derive(Debug, Default)]
pub struct CollectingScheduler {
    scheduled: Mutex<Vec<(DateTime<Utc>, RegistrationTask)>>,
}

impl CollectingScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything scheduled so far, in call order.
    pub async fn scheduled(&self) -> Vec<(DateTime<Utc>, RegistrationTask)> {
        self.scheduled.lock().await.clone()
    }

    pub async fn take(&self) -> Vec<(DateTime<Utc>, RegistrationTask)> {
        std::mem::take(&mut *self.scheduled.lock().await)
    }
}

#[async_trait]
impl TaskScheduler for CollectingScheduler {
    async fn schedule(
        &self,
        fire_at: DateTime<Utc>,
        task: RegistrationTask,
    ) -> Result<(), WoomError> {
        self.scheduled.lock().await.push((fire_at, task));
        Ok(())
    }
}

// SPDX-FileCopyrightText: 2026 Woom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Captures "join link ready" events for assertion in tests.

use async_trait::async_trait;
use tokio::sync::Mutex;
use woom_core::{JoinLinkHandler, JoinLinkReady, WoomError};

#[derive(Debug, Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<JoinLinkReady>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn events(&self) -> Vec<JoinLinkReady> {
        self.events.lock().await.clone()
    }

    pub async fn count(&self) -> usize {
        self.events.lock().await.len()
    }
}

#[async_trait]
impl JoinLinkHandler for RecordingNotifier {
    async fn join_link_ready(&self, event: &JoinLinkReady) -> Result<(), WoomError> {
        self.events.lock().await.push(event.clone());
        Ok(())
    }
}

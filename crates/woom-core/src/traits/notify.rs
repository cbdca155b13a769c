// SPDX-FileCopyrightText: 2026 Woom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! "Join link ready" callback capability.

use async_trait::async_trait;

use crate::error::WoomError;
use crate::types::JoinLinkReady;

/// Downstream consumer of freshly stored (or replayed) join links.
#[async_trait]
pub trait JoinLinkHandler: Send + Sync {
    async fn join_link_ready(&self, event: &JoinLinkReady) -> Result<(), WoomError>;
}

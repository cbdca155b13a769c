// SPDX-FileCopyrightText: 2026 Woom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bearer token cache capability.

use std::time::Duration;

use async_trait::async_trait;

/// Ephemeral cache holding raw bearer tokens.
///
/// Writes are last-write-wins; concurrent refreshes for the same key are
/// allowed to race. Implementations never persist tokens durably.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Returns the cached token, or `None` when absent or past its TTL.
    async fn get(&self, key: &str) -> Option<String>;

    /// Stores `token` under `key` for at most `ttl`.
    async fn set(&self, key: &str, token: String, ttl: Duration);
}

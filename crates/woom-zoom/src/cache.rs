// SPDX-FileCopyrightText: 2026 Woom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-process token cache.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha256};
use woom_core::{Clock, TokenStore};

/// Cache key for a client credential pair. The secret never appears in it.
pub fn cache_key(client_key: &str, client_secret: &SecretString) -> String {
    let mut hasher = Sha256::new();
    hasher.update(client_key.as_bytes());
    hasher.update(b":");
    hasher.update(client_secret.expose_secret().as_bytes());
    format!("bearer_token_{}", hex::encode(hasher.finalize()))
}

struct Entry {
    token: String,
    expires_at: DateTime<Utc>,
}

/// [`TokenStore`] holding entries in memory until their TTL elapses.
///
/// Concurrent writers simply overwrite each other.
pub struct MemoryTokenStore {
    entries: DashMap<String, Entry>,
    clock: Arc<dyn Clock>,
}

impl MemoryTokenStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: DashMap::new(),
            clock,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn get(&self, key: &str) -> Option<String> {
        let now = self.clock.now();
        // Drop the read guard before removing.
        let live = self
            .entries
            .get(key)
            .map(|entry| (entry.expires_at > now).then(|| entry.token.clone()))?;
        if live.is_none() {
            self.entries.remove_if(key, |_, entry| entry.expires_at <= now);
        }
        live
    }

    async fn set(&self, key: &str, token: String, ttl: Duration) {
        let ttl = chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX);
        let expires_at = self
            .clock
            .now()
            .checked_add_signed(ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        self.entries.insert(key.to_string(), Entry { token, expires_at });
    }
}

// SPDX-FileCopyrightText: 2026 Woom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Token acquisition: cache lookup, expiry check, refresh, account check.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};
use woom_core::{Clock, RemoteFailure, TokenStore};

use crate::cache::cache_key;
use crate::oauth::OAuthClient;
use crate::token::{BearerToken, human_time_diff};

/// What the cache held when an attempt started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheState {
    Absent,
    Expired { exp: i64, now: i64 },
    Valid { exp: i64, now: i64 },
}

impl CacheState {
    fn of(token: &BearerToken, now: DateTime<Utc>) -> Self {
        let exp = token.claims().exp;
        let now = now.timestamp();
        if now > exp {
            Self::Expired { exp, now }
        } else {
            Self::Valid { exp, now }
        }
    }

    /// Text recorded in the audit log's `bearer_token` column.
    pub fn audit_text(&self) -> String {
        match self {
            Self::Absent => "Token Not Found in Cache".to_string(),
            Self::Expired { exp, now } => format!(
                "Token Expired [difference: {}] [token: {exp}] [time: {now}]",
                human_time_diff(exp - now)
            ),
            Self::Valid { exp, now } => format!(
                "Token Valid [difference: {}] [token: {exp}] [time: {now}]",
                human_time_diff(exp - now)
            ),
        }
    }
}

/// A token ready to present to the registration endpoint.
#[derive(Debug, Clone)]
pub struct TokenGrant {
    pub token: BearerToken,
    /// Cache state before any refresh.
    pub cache: CacheState,
    /// Status of the OAuth call, when one was made.
    pub refresh_status: Option<u16>,
    /// Validity of the token actually handed out.
    pub validity: CacheState,
}

/// Why no usable token could be produced.
#[derive(Debug, Clone)]
pub struct TokenFailure {
    pub cache: CacheState,
    /// Whether an OAuth call was made during this acquisition.
    pub refreshed: bool,
    pub failure: RemoteFailure,
}

impl TokenFailure {
    /// Status code to carry into the rescheduled task. A cached token that is
    /// rejected without any network call keeps the previous attempt's code.
    pub fn carried_status(&self, previous: i64) -> i64 {
        if self.refreshed {
            self.failure.status_code()
        } else {
            previous
        }
    }

    /// Text recorded in the audit log's `bearer_token` column.
    pub fn audit_text(&self) -> String {
        match &self.failure {
            RemoteFailure::Transport(message) => message.clone(),
            RemoteFailure::Auth { message, .. } => message.clone(),
            RemoteFailure::Protocol { body, .. }
            | RemoteFailure::RateLimited { body }
            | RemoteFailure::Http { body, .. } => body.clone(),
        }
    }
}

/// Produces bearer tokens, going to the OAuth endpoint only when the cache
/// cannot supply a live one.
pub struct TokenProvider {
    store: Arc<dyn TokenStore>,
    oauth: OAuthClient,
    clock: Arc<dyn Clock>,
    cache_key: String,
    ttl: Duration,
}

impl TokenProvider {
    pub fn new(
        store: Arc<dyn TokenStore>,
        oauth: OAuthClient,
        clock: Arc<dyn Clock>,
        ttl: Duration,
    ) -> Self {
        let credentials = oauth.credentials();
        let cache_key = cache_key(&credentials.client_key, &credentials.client_secret);
        Self {
            store,
            oauth,
            clock,
            cache_key,
            ttl,
        }
    }

    fn account_id(&self) -> &str {
        &self.oauth.credentials().account_id
    }

    pub async fn acquire(&self) -> Result<TokenGrant, TokenFailure> {
        let cache = match self.store.get(&self.cache_key).await {
            None => CacheState::Absent,
            Some(raw) => match BearerToken::parse(raw) {
                Ok(token) => {
                    let state = CacheState::of(&token, self.clock.now());
                    debug!(state = %state.audit_text(), "cached bearer token");
                    if let CacheState::Valid { .. } = state {
                        return self.check_account(token, state.clone(), state, None);
                    }
                    state
                }
                Err(e) => {
                    warn!(error = %e, "cached bearer token could not be decoded");
                    CacheState::Absent
                }
            },
        };

        let failed = |failure: RemoteFailure| TokenFailure {
            cache: cache.clone(),
            refreshed: true,
            failure,
        };

        let issued = match self.oauth.request_token().await {
            Ok(issued) => issued,
            Err(failure) => {
                warn!(status = failure.status_code(), error = %failure, "token refresh failed");
                metrics::counter!("woom_token_refresh_total", "result" => "failed").increment(1);
                return Err(failed(failure));
            }
        };
        metrics::counter!("woom_token_refresh_total", "result" => "issued").increment(1);

        let token = BearerToken::parse(issued.access_token).map_err(|e| {
            failed(RemoteFailure::Protocol {
                status: issued.status,
                body: format!("access_token is not a JWT: {e}"),
            })
        })?;
        self.store
            .set(&self.cache_key, token.as_str().to_string(), self.ttl)
            .await;

        let validity = CacheState::of(&token, self.clock.now());
        if let CacheState::Expired { .. } = validity {
            return Err(failed(RemoteFailure::Auth {
                status: i64::from(issued.status),
                message: validity.audit_text(),
            }));
        }
        self.check_account(token, cache, validity, Some(issued.status))
    }

    fn check_account(
        &self,
        token: BearerToken,
        cache: CacheState,
        validity: CacheState,
        refresh_status: Option<u16>,
    ) -> Result<TokenGrant, TokenFailure> {
        if !token.belongs_to(self.account_id()) {
            warn!(aid = %token.claims().aid, "bearer token issued for a different account");
            return Err(TokenFailure {
                cache,
                refreshed: refresh_status.is_some(),
                failure: RemoteFailure::Auth {
                    status: refresh_status.map_or(0, i64::from),
                    message: "Invalid Account ID".to_string(),
                },
            });
        }
        Ok(TokenGrant {
            token,
            cache,
            refresh_status,
            validity,
        })
    }
}

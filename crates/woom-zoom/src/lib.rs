// SPDX-FileCopyrightText: 2026 Woom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Zoom adapter for Woom.
//!
//! Bearer tokens come from the server-to-server OAuth endpoint and are kept
//! in a [`TokenStore`](woom_core::TokenStore) until their TTL or `exp` claim
//! runs out. The registrant client turns each response into either a join
//! link or a [`RemoteFailure`](woom_core::RemoteFailure).

pub mod cache;
pub mod oauth;
pub mod provider;
pub mod registration;
pub mod token;

use woom_config::ZoomConfig;
use woom_core::WoomError;

pub use cache::{MemoryTokenStore, cache_key};
pub use oauth::{IssuedToken, OAuthClient};
pub use provider::{CacheState, TokenFailure, TokenGrant, TokenProvider};
pub use registration::{Registered, RegistrationClient, audit_request_headers};
pub use token::{BearerToken, ClaimsError, TokenClaims, decode_claims};

/// HTTP client shared by the OAuth and registrant calls.
pub fn http_client(config: &ZoomConfig) -> Result<reqwest::Client, WoomError> {
    reqwest::Client::builder()
        .timeout(config.request_timeout())
        .user_agent(concat!("woom/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| WoomError::Http {
            message: format!("failed to build HTTP client: {e}"),
            source: Some(Box::new(e)),
        })
}

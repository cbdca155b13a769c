// SPDX-FileCopyrightText: 2026 Woom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Server-to-server OAuth token endpoint.

use std::fmt;

use secrecy::ExposeSecret;
use serde::Deserialize;
use tracing::debug;
use woom_config::{ZoomConfig, ZoomCredentials};
use woom_core::{RemoteFailure, WoomError};

/// A token as returned by the OAuth endpoint, before it is decoded.
#[derive(Clone)]
pub struct IssuedToken {
    pub access_token: String,
    pub status: u16,
}

impl fmt::Debug for IssuedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IssuedToken")
            .field("access_token", &"[redacted]")
            .field("status", &self.status)
            .finish()
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
}

/// Client for `POST {oauth_url}` with `grant_type=account_credentials`.
#[derive(Clone)]
pub struct OAuthClient {
    client: reqwest::Client,
    oauth_url: String,
    credentials: ZoomCredentials,
}

impl OAuthClient {
    pub fn new(client: reqwest::Client, config: &ZoomConfig) -> Result<Self, WoomError> {
        Ok(Self {
            client,
            oauth_url: config.oauth_url.clone(),
            credentials: config.credentials()?,
        })
    }

    pub fn credentials(&self) -> &ZoomCredentials {
        &self.credentials
    }

    /// Request a fresh token. Never retries; the caller reschedules.
    pub async fn request_token(&self) -> Result<IssuedToken, RemoteFailure> {
        let response = self
            .client
            .post(&self.oauth_url)
            .basic_auth(
                &self.credentials.client_key,
                Some(self.credentials.client_secret.expose_secret()),
            )
            .form(&[
                ("grant_type", "account_credentials"),
                ("account_id", self.credentials.account_id.as_str()),
            ])
            .send()
            .await
            .map_err(|e| RemoteFailure::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| RemoteFailure::Transport(e.to_string()))?;
        debug!(status, "oauth token response");

        match status {
            200 => serde_json::from_str::<TokenResponse>(&body)
                .ok()
                .and_then(|parsed| parsed.access_token)
                .filter(|token| !token.is_empty())
                .map(|access_token| IssuedToken {
                    access_token,
                    status,
                })
                .ok_or(RemoteFailure::Protocol { status, body }),
            400 | 401 | 403 => Err(RemoteFailure::Auth {
                status: i64::from(status),
                message: body,
            }),
            429 => Err(RemoteFailure::RateLimited { body }),
            _ => Err(RemoteFailure::Http { status, body }),
        }
    }
}

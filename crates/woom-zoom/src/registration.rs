// SPDX-FileCopyrightText: 2026 Woom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Webinar registrant endpoint.

use serde::Deserialize;
use tracing::debug;
use woom_config::ZoomConfig;
use woom_core::{Attendee, RemoteFailure};

use crate::token::BearerToken;

/// A successful registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registered {
    pub join_url: String,
    pub status: u16,
    /// Raw response body, kept for the audit log.
    pub body: String,
}

#[derive(Deserialize)]
struct RegistrantResponse {
    join_url: Option<String>,
}

/// Client for `POST {api_base_url}/webinars/{id}/registrants`.
#[derive(Debug, Clone)]
pub struct RegistrationClient {
    client: reqwest::Client,
    api_base_url: String,
}

impl RegistrationClient {
    pub fn new(client: reqwest::Client, config: &ZoomConfig) -> Self {
        Self {
            client,
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn endpoint(&self, webinar_id: &str) -> String {
        format!("{}/webinars/{webinar_id}/registrants", self.api_base_url)
    }

    /// Register `attendee` for `webinar_id`.
    ///
    /// Only a 201 carrying a `join_url` counts as success. A 201 without one is
    /// [`RemoteFailure::Protocol`]; 429 is [`RemoteFailure::RateLimited`].
    pub async fn register(
        &self,
        webinar_id: &str,
        token: &BearerToken,
        attendee: &Attendee,
    ) -> Result<Registered, RemoteFailure> {
        let response = self
            .client
            .post(self.endpoint(webinar_id))
            .bearer_auth(token.as_str())
            .json(attendee)
            .send()
            .await
            .map_err(|e| RemoteFailure::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| RemoteFailure::Transport(e.to_string()))?;
        debug!(status, webinar_id, "registrant response");

        match status {
            201 => match serde_json::from_str::<RegistrantResponse>(&body)
                .ok()
                .and_then(|parsed| parsed.join_url)
                .filter(|url| !url.is_empty())
            {
                Some(join_url) => Ok(Registered {
                    join_url,
                    status,
                    body,
                }),
                None => Err(RemoteFailure::Protocol { status, body }),
            },
            429 => Err(RemoteFailure::RateLimited { body }),
            _ => Err(RemoteFailure::Http { status, body }),
        }
    }
}

/// Request headers as recorded in the audit log, with the token masked.
pub fn audit_request_headers() -> String {
    serde_json::json!({
        "Authorization": "Bearer [redacted]",
        "Content-Type": "application/json",
    })
    .to_string()
}

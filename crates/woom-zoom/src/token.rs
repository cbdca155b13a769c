// SPDX-FileCopyrightText: 2026 Woom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bearer token claims.
//!
//! Only the payload segment of the JWT is read. The signature is not
//! verified: the token came straight from the OAuth endpoint over TLS and is
//! only inspected to decide whether it is still worth presenting.

use std::fmt;

use base64::Engine;
use base64::alphabet::URL_SAFE;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

/// base64url, with or without trailing `=` padding.
const PAYLOAD_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Claims the pipeline cares about.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenClaims {
    /// Expiry, unix seconds.
    pub exp: i64,
    /// Account the token was issued for.
    #[serde(default)]
    pub aid: String,
}

#[derive(Debug, Error)]
pub enum ClaimsError {
    #[error("token is not a three-segment JWT")]
    Malformed,

    #[error("token payload is not base64url: {0}")]
    Encoding(#[from] base64::DecodeError),

    #[error("token payload is not a claims object: {0}")]
    Json(#[from] serde_json::Error),
}

/// Decode the payload segment of `token`.
pub fn decode_claims(token: &str) -> Result<TokenClaims, ClaimsError> {
    let mut segments = token.split('.');
    let (Some(_header), Some(payload), Some(_signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return Err(ClaimsError::Malformed);
    };
    let bytes = PAYLOAD_ENGINE.decode(payload)?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// A raw token together with its decoded claims.
#[derive(Clone)]
pub struct BearerToken {
    raw: String,
    claims: TokenClaims,
}

impl BearerToken {
    pub fn parse(raw: impl Into<String>) -> Result<Self, ClaimsError> {
        let raw = raw.into();
        let claims = decode_claims(&raw)?;
        Ok(Self { raw, claims })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn claims(&self) -> &TokenClaims {
        &self.claims
    }

    /// Expired strictly after `exp`; a token is still usable during its last second.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() > self.claims.exp
    }

    pub fn belongs_to(&self, account_id: &str) -> bool {
        self.claims.aid == account_id
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BearerToken")
            .field("raw", &"[redacted]")
            .field("claims", &self.claims)
            .finish()
    }
}

/// Rough human rendering of a span of seconds, e.g. `5 mins`.
pub fn human_time_diff(seconds: i64) -> String {
    let seconds = seconds.unsigned_abs();
    let (value, unit) = match seconds {
        0..60 => (seconds.max(1), "sec"),
        60..3600 => (seconds / 60, "min"),
        3600..86_400 => (seconds / 3600, "hour"),
        _ => (seconds / 86_400, "day"),
    };
    if value == 1 {
        format!("1 {unit}")
    } else {
        format!("{value} {unit}s")
    }
}

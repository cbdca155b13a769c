// SPDX-FileCopyrightText: 2026 Woom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Woom registration service.
//!
//! [`WoomError`] is the host-visible error: configuration problems, storage
//! faults, and invariant violations such as an unknown order id.
//! [`RemoteFailure`] is the recoverable taxonomy for calls to the webinar
//! platform. Those never reach the host; they are turned into reschedules.

use strum::Display;
use thiserror::Error;

/// Kind of entity that could not be found in the commerce store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum EntityKind {
    Order,
    LineItem,
    Product,
    Customer,
}

/// The primary error type used across all Woom trait boundaries.
#[derive(Debug, Error)]
pub enum WoomError {
    /// Configuration errors (invalid TOML, missing credentials).
    #[error("configuration error: {0}")]
    Config(String),

    /// Audit storage errors (database open, query failure, migration).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A referenced order, item, product, or customer does not exist.
    #[error("{kind} {id} not found")]
    NotFound { kind: EntityKind, id: u64 },

    /// The order/product/user store failed or returned malformed data.
    #[error("commerce store error: {message}")]
    Commerce {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Outbound HTTP plumbing errors that are not part of the remote taxonomy
    /// (client construction, webhook delivery).
    #[error("http error: {message}")]
    Http {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The scheduler could not accept a task (shut down, channel closed).
    #[error("scheduler error: {0}")]
    Scheduler(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl WoomError {
    pub fn not_found(kind: EntityKind, id: impl Into<u64>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }
}

/// Recoverable failure of a call to the webinar platform.
///
/// Every variant leads to a reschedule (or, for a rate limit that outlasts the
/// event, to giving up). The carried status code is diagnostic only.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteFailure {
    /// Network, DNS, TLS, or timeout failure. No status code is available.
    #[error("transport failure: {0}")]
    Transport(String),

    /// Bad credentials, account mismatch, or an unusable token.
    #[error("auth failure ({status}): {message}")]
    Auth { status: i64, message: String },

    /// A success status whose body lacks the expected field.
    #[error("protocol violation ({status}): {body}")]
    Protocol { status: u16, body: String },

    /// HTTP 429.
    #[error("rate limited: {body}")]
    RateLimited { body: String },

    /// Any other non-success status.
    #[error("http {status}: {body}")]
    Http { status: u16, body: String },
}

impl RemoteFailure {
    /// Status code carried forward as `previous_status_code`; `-1` when the
    /// request never produced a response.
    pub fn status_code(&self) -> i64 {
        match self {
            Self::Transport(_) => -1,
            Self::Auth { status, .. } => *status,
            Self::Protocol { status, .. } | Self::Http { status, .. } => i64::from(*status),
            Self::RateLimited { .. } => 429,
        }
    }
}

// SPDX-FileCopyrightText: 2026 Woom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs.
//!
//! All structs use `#[serde(deny_unknown_fields)]` so a mistyped key fails at
//! startup instead of silently falling back to a default.

use std::fmt;
use std::time::Duration;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use woom_core::WoomError;

/// Top-level Woom configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WoomConfig {
    /// Process identity and logging.
    #[serde(default)]
    pub service: ServiceConfig,

    /// Webinar platform credentials and endpoints.
    #[serde(default)]
    pub zoom: ZoomConfig,

    /// Delays used when scheduling and rescheduling registration tasks.
    #[serde(default)]
    pub schedule: ScheduleConfig,

    /// Audit log storage.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Commerce store (WooCommerce REST API).
    #[serde(default)]
    pub commerce: CommerceConfig,

    /// HTTP surface for the checkout trigger.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// "Join link ready" delivery.
    #[serde(default)]
    pub notify: NotifyConfig,
}

/// Process identity and logging.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    #[serde(default = "default_service_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_service_name() -> String {
    "woom".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Webinar platform (Zoom server-to-server OAuth) configuration.
#[derive(Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ZoomConfig {
    /// Account the credentials belong to; tokens for any other account are rejected.
    #[serde(default)]
    pub account_id: String,

    #[serde(default)]
    pub client_key: String,

    #[serde(default)]
    pub client_secret: String,

    #[serde(default = "default_oauth_url")]
    pub oauth_url: String,

    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Upper bound on how long a token stays in the cache.
    #[serde(default = "default_token_ttl_secs")]
    pub token_ttl_secs: u64,
}

impl ZoomConfig {
    pub fn has_credentials(&self) -> bool {
        !self.account_id.trim().is_empty()
            && !self.client_key.trim().is_empty()
            && !self.client_secret.trim().is_empty()
    }

    /// The credential triple, with the secret moved behind [`SecretString`].
    pub fn credentials(&self) -> Result<ZoomCredentials, WoomError> {
        if !self.has_credentials() {
            return Err(WoomError::Config(
                "zoom.account_id, zoom.client_key and zoom.client_secret must all be set".into(),
            ));
        }
        Ok(ZoomCredentials {
            account_id: self.account_id.trim().to_string(),
            client_key: self.client_key.trim().to_string(),
            client_secret: SecretString::from(self.client_secret.trim().to_string()),
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.token_ttl_secs)
    }
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            account_id: String::new(),
            client_key: String::new(),
            client_secret: String::new(),
            oauth_url: default_oauth_url(),
            api_base_url: default_api_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            token_ttl_secs: default_token_ttl_secs(),
        }
    }
}

impl fmt::Debug for ZoomConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZoomConfig")
            .field("account_id", &self.account_id)
            .field("client_key", &self.client_key)
            .field("client_secret", &redacted(&self.client_secret))
            .field("oauth_url", &self.oauth_url)
            .field("api_base_url", &self.api_base_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("token_ttl_secs", &self.token_ttl_secs)
            .finish()
    }
}

fn default_oauth_url() -> String {
    "https://zoom.us/oauth/token".to_string()
}

fn default_api_base_url() -> String {
    "https://api.zoom.us/v2".to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_token_ttl_secs() -> u64 {
    3000
}

/// Server-to-server OAuth credentials.
#[derive(Debug, Clone)]
pub struct ZoomCredentials {
    pub account_id: String,
    pub client_key: String,
    pub client_secret: SecretString,
}

/// Scheduling delays.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ScheduleConfig {
    /// Delay between checkout and the first attempt.
    #[serde(default = "default_initial_delay_secs")]
    pub initial_delay_secs: u64,

    /// Backoff after a transient failure.
    #[serde(default = "default_retry_delay_secs")]
    pub retry_delay_secs: u64,

    /// UTC hour at which the platform's daily rate limit resets.
    #[serde(default = "default_rate_limit_reset_hour_utc")]
    pub rate_limit_reset_hour_utc: u32,

    /// Upper bound on attempts running at the same time.
    #[serde(default = "default_max_concurrent_tasks")]
    pub max_concurrent_tasks: usize,
}

impl ScheduleConfig {
    pub fn initial_delay(&self) -> Duration {
        Duration::from_secs(self.initial_delay_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            initial_delay_secs: default_initial_delay_secs(),
            retry_delay_secs: default_retry_delay_secs(),
            rate_limit_reset_hour_utc: default_rate_limit_reset_hour_utc(),
            max_concurrent_tasks: default_max_concurrent_tasks(),
        }
    }
}

fn default_initial_delay_secs() -> u64 {
    60
}

fn default_retry_delay_secs() -> u64 {
    600
}

fn default_rate_limit_reset_hour_utc() -> u32 {
    11
}

fn default_max_concurrent_tasks() -> usize {
    4
}

/// Audit log storage configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file holding the audit table.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Record an audit row for every scheduling and processing attempt.
    #[serde(default = "default_audit_enabled")]
    pub audit_enabled: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            audit_enabled: default_audit_enabled(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("woom").join("woom.db"))
        .unwrap_or_else(|| "woom.db".into())
        .display()
        .to_string()
}

fn default_audit_enabled() -> bool {
    true
}

/// WooCommerce REST API configuration.
#[derive(Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CommerceConfig {
    /// Shop root URL, e.g. `https://shop.example.com`.
    #[serde(default)]
    pub base_url: String,

    #[serde(default)]
    pub consumer_key: String,

    #[serde(default)]
    pub consumer_secret: String,

    /// Product meta key holding the webinar id.
    #[serde(default = "default_webinar_id_meta_key")]
    pub webinar_id_meta_key: String,

    /// Product meta key holding the webinar start time (unix seconds).
    #[serde(default = "default_start_time_meta_key")]
    pub start_time_meta_key: String,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl CommerceConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for CommerceConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            consumer_key: String::new(),
            consumer_secret: String::new(),
            webinar_id_meta_key: default_webinar_id_meta_key(),
            start_time_meta_key: default_start_time_meta_key(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl fmt::Debug for CommerceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommerceConfig")
            .field("base_url", &self.base_url)
            .field("consumer_key", &self.consumer_key)
            .field("consumer_secret", &redacted(&self.consumer_secret))
            .field("webinar_id_meta_key", &self.webinar_id_meta_key)
            .field("start_time_meta_key", &self.start_time_meta_key)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

fn default_webinar_id_meta_key() -> String {
    "woom_webinar_id".to_string()
}

fn default_start_time_meta_key() -> String {
    "woom_product_start_time".to_string()
}

/// HTTP gateway configuration.
#[derive(Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    #[serde(default = "default_gateway_enabled")]
    pub enabled: bool,

    #[serde(default = "default_gateway_host")]
    pub host: String,

    #[serde(default = "default_gateway_port")]
    pub port: u16,

    /// Bearer token required on the checkout trigger. `None` rejects every call.
    #[serde(default)]
    pub bearer_token: Option<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            enabled: default_gateway_enabled(),
            host: default_gateway_host(),
            port: default_gateway_port(),
            bearer_token: None,
        }
    }
}

impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("enabled", &self.enabled)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("bearer_token", &self.bearer_token.as_ref().map(|_| "[redacted]"))
            .finish()
    }
}

fn default_gateway_enabled() -> bool {
    true
}

fn default_gateway_host() -> String {
    "127.0.0.1".to_string()
}

fn default_gateway_port() -> u16 {
    8787
}

/// "Join link ready" delivery configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct NotifyConfig {
    /// When set, each join link is POSTed here as JSON. Otherwise it is only logged.
    #[serde(default)]
    pub webhook_url: Option<String>,
}

fn redacted(value: &str) -> &'static str {
    if value.is_empty() { "" } else { "[redacted]" }
}

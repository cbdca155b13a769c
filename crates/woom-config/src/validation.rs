// SPDX-FileCopyrightText: 2026 Woom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.

use crate::diagnostic::ConfigError;
use crate::model::WoomConfig;

/// Longest token lifetime the platform will honour, in seconds.
pub const MAX_TOKEN_TTL_SECS: u64 = 3000;

/// Validate a deserialized configuration.
///
/// Collects every problem instead of stopping at the first one.
pub fn validate_config(config: &WoomConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let zoom = &config.zoom;
    if zoom.token_ttl_secs == 0 || zoom.token_ttl_secs > MAX_TOKEN_TTL_SECS {
        errors.push(ConfigError::validation(format!(
            "zoom.token_ttl_secs must be between 1 and {MAX_TOKEN_TTL_SECS}, got {}",
            zoom.token_ttl_secs
        )));
    }
    if zoom.request_timeout_secs == 0 {
        errors.push(ConfigError::validation(
            "zoom.request_timeout_secs must be greater than zero",
        ));
    }
    check_url(&mut errors, "zoom.oauth_url", &zoom.oauth_url);
    check_url(&mut errors, "zoom.api_base_url", &zoom.api_base_url);

    let schedule = &config.schedule;
    if schedule.initial_delay_secs == 0 {
        errors.push(ConfigError::validation(
            "schedule.initial_delay_secs must be greater than zero",
        ));
    }
    if schedule.retry_delay_secs == 0 {
        errors.push(ConfigError::validation(
            "schedule.retry_delay_secs must be greater than zero",
        ));
    }
    if schedule.rate_limit_reset_hour_utc > 23 {
        errors.push(ConfigError::validation(format!(
            "schedule.rate_limit_reset_hour_utc must be an hour between 0 and 23, got {}",
            schedule.rate_limit_reset_hour_utc
        )));
    }
    if schedule.max_concurrent_tasks == 0 {
        errors.push(ConfigError::validation(
            "schedule.max_concurrent_tasks must be at least 1",
        ));
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::validation(
            "storage.database_path must not be empty",
        ));
    }

    let commerce = &config.commerce;
    if !commerce.base_url.is_empty() {
        check_url(&mut errors, "commerce.base_url", &commerce.base_url);
    }
    if commerce.request_timeout_secs == 0 {
        errors.push(ConfigError::validation(
            "commerce.request_timeout_secs must be greater than zero",
        ));
    }
    for (key, value) in [
        ("commerce.webinar_id_meta_key", &commerce.webinar_id_meta_key),
        ("commerce.start_time_meta_key", &commerce.start_time_meta_key),
    ] {
        if value.trim().is_empty() {
            errors.push(ConfigError::validation(format!("{key} must not be empty")));
        }
    }

    if config.gateway.host.trim().is_empty() {
        errors.push(ConfigError::validation("gateway.host must not be empty"));
    }
    if let Some(token) = &config.gateway.bearer_token
        && token.trim().is_empty()
    {
        errors.push(ConfigError::validation(
            "gateway.bearer_token must not be blank when set",
        ));
    }

    if let Some(url) = &config.notify.webhook_url {
        check_url(&mut errors, "notify.webhook_url", url);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Checks that only matter when the service is going to talk to the outside
/// world (`woom serve`, `woom process`).
pub fn validate_for_serving(config: &WoomConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if !config.zoom.has_credentials() {
        errors.push(ConfigError::validation(
            "zoom.account_id, zoom.client_key and zoom.client_secret are required",
        ));
    }
    if config.commerce.base_url.trim().is_empty() {
        errors.push(ConfigError::validation("commerce.base_url is required"));
    }
    if config.commerce.consumer_key.trim().is_empty()
        || config.commerce.consumer_secret.trim().is_empty()
    {
        errors.push(ConfigError::validation(
            "commerce.consumer_key and commerce.consumer_secret are required",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_url(errors: &mut Vec<ConfigError>, key: &str, value: &str) {
    let value = value.trim();
    let rest = value
        .strip_prefix("https://")
        .or_else(|| value.strip_prefix("http://"));
    if rest.is_none_or(|host| host.is_empty() || host.starts_with('/')) {
        errors.push(ConfigError::validation(format!(
            "{key} must be an http(s) URL, got `{value}`"
        )));
    }
}

// SPDX-FileCopyrightText: 2026 Woom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration for the Woom registration service.
//!
//! Strict TOML parsing (`deny_unknown_fields`), an XDG file hierarchy,
//! `WOOM_*` environment overrides, and miette diagnostics with typo hints.
//!
//! ```no_run
//! use woom_config::load_and_validate;
//!
//! let config = load_and_validate().expect("config errors");
//! println!("retry delay: {}s", config.schedule.retry_delay_secs);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

use std::path::Path;

pub use diagnostic::{ConfigError, render_errors};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::{
    CommerceConfig, GatewayConfig, NotifyConfig, ScheduleConfig, ServiceConfig, StorageConfig,
    WoomConfig, ZoomConfig, ZoomCredentials,
};
pub use validation::{validate_config, validate_for_serving};

/// Load from the standard hierarchy and validate.
pub fn load_and_validate() -> Result<WoomConfig, Vec<ConfigError>> {
    finish(loader::load_config(), collect_toml_sources)
}

/// Load from an explicit file (plus env overrides) and validate.
pub fn load_and_validate_path(path: &Path) -> Result<WoomConfig, Vec<ConfigError>> {
    finish(loader::load_config_from_path(path), || {
        std::fs::read_to_string(path)
            .map(|content| vec![(path.display().to_string(), content)])
            .unwrap_or_default()
    })
}

/// Load from a TOML string and validate.
pub fn load_and_validate_str(toml_content: &str) -> Result<WoomConfig, Vec<ConfigError>> {
    finish(loader::load_config_from_str(toml_content), || {
        vec![("<inline>".to_string(), toml_content.to_string())]
    })
}

fn finish(
    loaded: Result<WoomConfig, figment::Error>,
    sources: impl FnOnce() -> Vec<(String, String)>,
) -> Result<WoomConfig, Vec<ConfigError>> {
    match loaded {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => Err(diagnostic::figment_to_config_errors(err, &sources())),
    }
}

fn collect_toml_sources() -> Vec<(String, String)> {
    loader::config_paths()
        .into_iter()
        .filter_map(|path| {
            let content = std::fs::read_to_string(&path).ok()?;
            // Figment records file sources by absolute path.
            let path = std::path::absolute(&path).unwrap_or(path);
            Some((path.display().to_string(), content))
        })
        .collect()
}

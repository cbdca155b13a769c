// SPDX-FileCopyrightText: 2026 Woom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layered configuration loading with Figment.
//!
//! Merge order, later wins: compiled defaults, `/etc/woom/woom.toml`,
//! `~/.config/woom/woom.toml`, `./woom.toml`, then `WOOM_*` variables.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::WoomConfig;

const SYSTEM_CONFIG: &str = "/etc/woom/woom.toml";
const LOCAL_CONFIG: &str = "woom.toml";

/// Sections that `WOOM_<SECTION>_<KEY>` variables are routed into.
const SECTIONS: &[&str] = &[
    "service", "zoom", "schedule", "storage", "commerce", "gateway", "notify",
];

/// Candidate config files, lowest precedence first.
pub fn config_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(SYSTEM_CONFIG)];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("woom").join("woom.toml"));
    }
    paths.push(PathBuf::from(LOCAL_CONFIG));
    paths
}

/// The full Figment before extraction.
pub fn build_figment() -> Figment {
    config_paths()
        .into_iter()
        .fold(
            Figment::new().merge(Serialized::defaults(WoomConfig::default())),
            |figment, path| figment.merge(Toml::file(path)),
        )
        .merge(env_provider())
}

/// Load configuration from the standard hierarchy with env overrides.
pub fn load_config() -> Result<WoomConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from an explicit file, still honouring env overrides.
pub fn load_config_from_path(path: &Path) -> Result<WoomConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(WoomConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string over the defaults. No files, no env.
pub fn load_config_from_str(toml_content: &str) -> Result<WoomConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(WoomConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// `WOOM_ZOOM_CLIENT_SECRET` becomes `zoom.client_secret`.
///
/// Only the first underscore after a known section name becomes a dot, so
/// keys containing underscores survive intact.
fn env_provider() -> Env {
    Env::prefixed("WOOM_").map(|key| env_key_to_path(key.as_str()).into())
}

pub(crate) fn env_key_to_path(key: &str) -> String {
    SECTIONS
        .iter()
        .find_map(|section| {
            key.strip_prefix(section)
                .and_then(|rest| rest.strip_prefix('_'))
                .map(|rest| format!("{section}.{rest}"))
        })
        .unwrap_or_else(|| key.to_string())
}

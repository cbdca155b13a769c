// SPDX-FileCopyrightText: 2026 Woom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! WooCommerce REST API wire types (the subset Woom reads and writes).

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MetaData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub key: String,
    pub value: Value,
}

/// Look up `key` in a meta list and render it as a non-empty string.
pub fn meta_string(meta: &[MetaData], key: &str) -> Option<String> {
    meta.iter()
        .find(|m| m.key == key)
        .and_then(|m| match &m.value {
            Value::String(s) => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .filter(|s| !s.is_empty())
}

/// Parse an event start time stored as unix seconds, RFC 3339, or
/// `YYYY-MM-DD HH:MM[:SS]` in UTC.
pub fn parse_start_time(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(secs) = raw.parse::<i64>() {
        return DateTime::from_timestamp(secs, 0);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

#[derive(Debug, Clone, Deserialize)]
pub struct WcLineItem {
    pub id: u64,
    pub product_id: u64,
    #[serde(default)]
    pub meta_data: Vec<MetaData>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WcOrder {
    pub id: u64,
    #[serde(default)]
    pub customer_id: u64,
    #[serde(default)]
    pub line_items: Vec<WcLineItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WcProduct {
    pub id: u64,
    #[serde(default)]
    pub meta_data: Vec<MetaData>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WcCustomer {
    pub id: u64,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

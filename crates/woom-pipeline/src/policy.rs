// SPDX-FileCopyrightText: 2026 Woom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scheduling delays and time arithmetic.

use std::time::Duration;

use chrono::{DateTime, Days, NaiveTime, Utc};
use woom_config::ScheduleConfig;

/// How far ahead tasks are scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulePolicy {
    /// Checkout to first attempt.
    pub initial_delay: Duration,
    /// Backoff after a transient failure.
    pub retry_delay: Duration,
    /// UTC hour at which the platform's daily rate limit resets.
    pub rate_limit_reset_hour_utc: u32,
}

impl Default for SchedulePolicy {
    fn default() -> Self {
        Self::from(&ScheduleConfig::default())
    }
}

impl From<&ScheduleConfig> for SchedulePolicy {
    fn from(config: &ScheduleConfig) -> Self {
        Self {
            initial_delay: config.initial_delay(),
            retry_delay: config.retry_delay(),
            rate_limit_reset_hour_utc: config.rate_limit_reset_hour_utc,
        }
    }
}

/// `now + delay`, saturating instead of overflowing.
pub fn after(now: DateTime<Utc>, delay: Duration) -> DateTime<Utc> {
    chrono::Duration::from_std(delay)
        .ok()
        .and_then(|delay| now.checked_add_signed(delay))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Tomorrow (UTC) at `hour`:00.
pub fn rate_limit_reset(now: DateTime<Utc>, hour: u32) -> DateTime<Utc> {
    let reset_time = NaiveTime::from_hms_opt(hour.min(23), 0, 0).unwrap_or(NaiveTime::MIN);
    now.date_naive()
        .checked_add_days(Days::new(1))
        .map(|tomorrow| tomorrow.and_time(reset_time).and_utc())
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Midnight (UTC) at the start of the day `start` falls on.
pub fn start_of_day(start: DateTime<Utc>) -> DateTime<Utc> {
    start.date_naive().and_time(NaiveTime::MIN).and_utc()
}

// SPDX-FileCopyrightText: 2026 Woom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Metric descriptions and recording helpers (metrics-rs facade).

use metrics::describe_counter;

/// Register descriptions for every Woom metric. Call once after installing a recorder.
pub fn register_metrics() {
    describe_counter!(
        "woom_attempts_total",
        "Processing attempts, labelled by outcome"
    );
    describe_counter!(
        "woom_token_refresh_total",
        "OAuth token requests, labelled by result"
    );
    describe_counter!(
        "woom_tasks_scheduled_total",
        "Tasks put on the scheduler, labelled by reason"
    );
}

pub fn record_attempt(outcome: &'static str) {
    metrics::counter!("woom_attempts_total", "outcome" => outcome).increment(1);
}

pub fn record_scheduled(reason: &'static str) {
    metrics::counter!("woom_tasks_scheduled_total", "reason" => reason).increment(1);
}

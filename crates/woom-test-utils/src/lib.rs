// SPDX-FileCopyrightText: 2026 Woom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Woom integration tests.
//!
//! Provides fakes for every collaborator of the orchestrator and a harness
//! that wires them together against a wiremock Zoom server, so pipeline tests
//! run without network access or real credentials.
//!
//! # Components
//!
//! - [`FakeClock`] - settable clock
//! - [`InMemoryCommerce`] - commerce store with write counters
//! - [`RecordingNotifier`] - captures "join link ready" events
//! - [`make_jwt`] - unsigned JWT with `aid`/`exp` claims
//! - [`TestHarness`] - the full pipeline over the fakes

pub mod clock;
pub mod commerce;
pub mod harness;
pub mod jwt;
pub mod notifier;

pub use clock::FakeClock;
pub use commerce::InMemoryCommerce;
pub use harness::{TestHarness, TestHarnessBuilder};
pub use jwt::make_jwt;
pub use notifier::RecordingNotifier;

// SPDX-FileCopyrightText: 2026 Woom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Capability traits injected into the registration pipeline.
//!
//! Every collaborator the orchestrator touches (time, the token cache, the
//! commerce store, the scheduler, the audit log, the join-link callback) is
//! a trait object so tests can substitute deterministic fakes.

pub mod audit;
pub mod clock;
pub mod commerce;
pub mod notify;
pub mod scheduler;
pub mod token_store;

pub use audit::AuditLog;
pub use clock::{Clock, SystemClock};
pub use commerce::CommerceStore;
pub use notify::JoinLinkHandler;
pub use scheduler::{TaskHandler, TaskScheduler};
pub use token_store::TokenStore;

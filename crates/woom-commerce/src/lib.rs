// SPDX-FileCopyrightText: 2026 Woom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! WooCommerce adapter for Woom.
//!
//! Reads orders, products and customers over the REST API (v3) and stores
//! join links as line-item and customer meta.

pub mod client;
pub mod types;

pub use client::WooCommerceStore;

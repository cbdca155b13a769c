// SPDX-FileCopyrightText: 2026 Woom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Order/product/customer store capability.

use async_trait::async_trait;

use crate::error::WoomError;
use crate::types::{Customer, ItemId, Order, OrderId, Product, ProductId, UserId};

/// The external commerce store.
///
/// Reads return [`WoomError::NotFound`] for unknown ids; that is the only
/// failure allowed to surface from a processing attempt.
#[async_trait]
pub trait CommerceStore: Send + Sync {
    /// Loads an order with its line items and customer id.
    async fn order(&self, order_id: OrderId) -> Result<Order, WoomError>;

    /// Loads product metadata (webinar id, start time).
    async fn product(&self, product_id: ProductId) -> Result<Product, WoomError>;

    /// Loads the customer profile used as the registrant.
    async fn customer(&self, user_id: UserId) -> Result<Customer, WoomError>;

    /// Join link recorded on the line item for `product_id`, if any.
    async fn item_join_url(
        &self,
        order_id: OrderId,
        item_id: ItemId,
        product_id: ProductId,
    ) -> Result<Option<String>, WoomError>;

    /// Deletes then rewrites the line-item join link for `product_id`.
    async fn replace_item_join_url(
        &self,
        order_id: OrderId,
        item_id: ItemId,
        product_id: ProductId,
        join_url: &str,
    ) -> Result<(), WoomError>;

    /// Deletes then rewrites the customer-profile join link for `product_id`.
    async fn replace_customer_join_url(
        &self,
        user_id: UserId,
        product_id: ProductId,
        join_url: &str,
    ) -> Result<(), WoomError>;
}

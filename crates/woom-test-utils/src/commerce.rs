// SPDX-FileCopyrightText: 2026 Woom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory commerce store.
//!
//! `InMemoryCommerce` implements `CommerceStore` over plain maps and counts
//! every join-link write so tests can assert that failed attempts leave
//! storage untouched. Reads and writes can be switched to fail like an
//! unreachable store.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;
use woom_core::{
    CommerceStore, Customer, EntityKind, ItemId, Order, OrderId, Product, ProductId, UserId,
    WoomError,
};

#[derive(Debug, Default)]
struct State {
    orders: HashMap<OrderId, Order>,
    products: HashMap<ProductId, Product>,
    customers: HashMap<UserId, Customer>,
    item_join_urls: HashMap<(OrderId, ItemId, ProductId), String>,
    customer_join_urls: HashMap<(UserId, ProductId), String>,
    join_url_writes: usize,
    reads_down: bool,
    writes_down: bool,
}

impl State {
    fn check(down: bool, operation: &str) -> Result<(), WoomError> {
        if down {
            return Err(WoomError::Commerce {
                message: format!("{operation}: store unavailable (503)"),
                source: None,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryCommerce {
    state: Mutex<State>,
}

impl InMemoryCommerce {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_order(&self, order: Order) {
        self.state.lock().await.orders.insert(order.id, order);
    }

    pub async fn insert_product(&self, product: Product) {
        self.state.lock().await.products.insert(product.id, product);
    }

    pub async fn insert_customer(&self, customer: Customer) {
        self.state.lock().await.customers.insert(customer.id, customer);
    }

    /// Pre-store a join link on a line item without counting it as a write.
    pub async fn seed_item_join_url(
        &self,
        order_id: OrderId,
        item_id: ItemId,
        product_id: ProductId,
        join_url: &str,
    ) {
        self.state
            .lock()
            .await
            .item_join_urls
            .insert((order_id, item_id, product_id), join_url.to_string());
    }

    pub async fn stored_item_join_url(
        &self,
        order_id: OrderId,
        item_id: ItemId,
        product_id: ProductId,
    ) -> Option<String> {
        self.state
            .lock()
            .await
            .item_join_urls
            .get(&(order_id, item_id, product_id))
            .cloned()
    }

    pub async fn stored_customer_join_url(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Option<String> {
        self.state
            .lock()
            .await
            .customer_join_urls
            .get(&(user_id, product_id))
            .cloned()
    }

    /// Make every read fail with [`WoomError::Commerce`].
    pub async fn set_reads_down(&self, down: bool) {
        self.state.lock().await.reads_down = down;
    }

    /// Make every join-link write fail with [`WoomError::Commerce`].
    pub async fn set_writes_down(&self, down: bool) {
        self.state.lock().await.writes_down = down;
    }

    /// Number of join-link writes (item and customer) made through the trait.
    pub async fn join_url_writes(&self) -> usize {
        self.state.lock().await.join_url_writes
    }
}

#[async_trait]
impl CommerceStore for InMemoryCommerce {
    async fn order(&self, order_id: OrderId) -> Result<Order, WoomError> {
        let state = self.state.lock().await;
        State::check(state.reads_down, "get order")?;
        state
            .orders
            .get(&order_id)
            .cloned()
            .ok_or_else(|| WoomError::not_found(EntityKind::Order, order_id))
    }

    async fn product(&self, product_id: ProductId) -> Result<Product, WoomError> {
        let state = self.state.lock().await;
        State::check(state.reads_down, "get product")?;
        state
            .products
            .get(&product_id)
            .cloned()
            .ok_or_else(|| WoomError::not_found(EntityKind::Product, product_id))
    }

    async fn customer(&self, user_id: UserId) -> Result<Customer, WoomError> {
        let state = self.state.lock().await;
        State::check(state.reads_down, "get customer")?;
        state
            .customers
            .get(&user_id)
            .cloned()
            .ok_or_else(|| WoomError::not_found(EntityKind::Customer, user_id))
    }

    async fn item_join_url(
        &self,
        order_id: OrderId,
        item_id: ItemId,
        product_id: ProductId,
    ) -> Result<Option<String>, WoomError> {
        let state = self.state.lock().await;
        State::check(state.reads_down, "get line item")?;
        Ok(state
            .item_join_urls
            .get(&(order_id, item_id, product_id))
            .filter(|url| !url.is_empty())
            .cloned())
    }

    async fn replace_item_join_url(
        &self,
        order_id: OrderId,
        item_id: ItemId,
        product_id: ProductId,
        join_url: &str,
    ) -> Result<(), WoomError> {
        let mut state = self.state.lock().await;
        State::check(state.writes_down, "update line item")?;
        state
            .item_join_urls
            .insert((order_id, item_id, product_id), join_url.to_string());
        state.join_url_writes += 1;
        Ok(())
    }

    async fn replace_customer_join_url(
        &self,
        user_id: UserId,
        product_id: ProductId,
        join_url: &str,
    ) -> Result<(), WoomError> {
        let mut state = self.state.lock().await;
        State::check(state.writes_down, "update customer")?;
        state
            .customer_join_urls
            .insert((user_id, product_id), join_url.to_string());
        state.join_url_writes += 1;
        Ok(())
    }
}

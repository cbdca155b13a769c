// SPDX-FileCopyrightText: 2026 Woom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! WooCommerce REST client implementing [`CommerceStore`].

use async_trait::async_trait;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;
use woom_config::CommerceConfig;
use woom_core::{
    CommerceStore, Customer, EntityKind, ItemId, LineItem, Order, OrderId, Product, ProductId,
    UserId, WoomError, join_url_meta_key,
};

use crate::types::{WcCustomer, WcOrder, WcProduct, meta_string, parse_start_time};

const API_PATH: &str = "wp-json/wc/v3";

/// Commerce store backed by the WooCommerce REST API (v3).
pub struct WooCommerceStore {
    client: reqwest::Client,
    base_url: String,
    consumer_key: String,
    consumer_secret: SecretString,
    webinar_id_meta_key: String,
    start_time_meta_key: String,
}

impl WooCommerceStore {
    pub fn new(config: &CommerceConfig) -> Result<Self, WoomError> {
        if config.base_url.trim().is_empty() {
            return Err(WoomError::Config("commerce.base_url is not set".into()));
        }
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| WoomError::Http {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url: format!("{}/{API_PATH}", config.base_url.trim_end_matches('/')),
            consumer_key: config.consumer_key.clone(),
            consumer_secret: SecretString::from(config.consumer_secret.clone()),
            webinar_id_meta_key: config.webinar_id_meta_key.clone(),
            start_time_meta_key: config.start_time_meta_key.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        kind: EntityKind,
        id: u64,
    ) -> Result<T, WoomError> {
        let response = self
            .client
            .get(self.url(path))
            .basic_auth(&self.consumer_key, Some(self.consumer_secret.expose_secret()))
            .send()
            .await
            .map_err(|e| commerce_err(format!("GET {path} failed"), e))?;

        let status = response.status();
        debug!(%status, path, "commerce response");
        if status == StatusCode::NOT_FOUND {
            return Err(WoomError::not_found(kind, id));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(WoomError::Commerce {
                message: format!("GET {path} returned {status}: {body}"),
                source: None,
            });
        }
        response
            .json::<T>()
            .await
            .map_err(|e| commerce_err(format!("GET {path} returned an unexpected body"), e))
    }

    async fn put(&self, path: &str, body: serde_json::Value) -> Result<(), WoomError> {
        let response = self
            .client
            .put(self.url(path))
            .basic_auth(&self.consumer_key, Some(self.consumer_secret.expose_secret()))
            .json(&body)
            .send()
            .await
            .map_err(|e| commerce_err(format!("PUT {path} failed"), e))?;

        let status = response.status();
        debug!(%status, path, "commerce update");
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(WoomError::Commerce {
                message: format!("PUT {path} returned {status}: {body}"),
                source: None,
            });
        }
        Ok(())
    }

    async fn wc_order(&self, order_id: OrderId) -> Result<WcOrder, WoomError> {
        self.get(&format!("orders/{order_id}"), EntityKind::Order, order_id.0)
            .await
    }
}

fn commerce_err(message: String, e: reqwest::Error) -> WoomError {
    WoomError::Commerce {
        message: format!("{message}: {e}"),
        source: Some(Box::new(e)),
    }
}

#[async_trait]
impl CommerceStore for WooCommerceStore {
    async fn order(&self, order_id: OrderId) -> Result<Order, WoomError> {
        let order = self.wc_order(order_id).await?;
        Ok(Order {
            id: OrderId(order.id),
            customer_id: UserId(order.customer_id),
            items: order
                .line_items
                .iter()
                .map(|item| LineItem {
                    item_id: ItemId(item.id),
                    product_id: ProductId(item.product_id),
                })
                .collect(),
        })
    }

    async fn product(&self, product_id: ProductId) -> Result<Product, WoomError> {
        let product: WcProduct = self
            .get(&format!("products/{product_id}"), EntityKind::Product, product_id.0)
            .await?;
        Ok(Product {
            id: ProductId(product.id),
            webinar_id: meta_string(&product.meta_data, &self.webinar_id_meta_key),
            start_time: meta_string(&product.meta_data, &self.start_time_meta_key)
                .as_deref()
                .and_then(parse_start_time),
        })
    }

    async fn customer(&self, user_id: UserId) -> Result<Customer, WoomError> {
        let customer: WcCustomer = self
            .get(&format!("customers/{user_id}"), EntityKind::Customer, user_id.0)
            .await?;
        Ok(Customer {
            id: UserId(customer.id),
            email: customer.email,
            first_name: customer.first_name,
            last_name: customer.last_name,
        })
    }

    async fn item_join_url(
        &self,
        order_id: OrderId,
        item_id: ItemId,
        product_id: ProductId,
    ) -> Result<Option<String>, WoomError> {
        let order = self.wc_order(order_id).await?;
        let item = order
            .line_items
            .iter()
            .find(|item| item.id == item_id.0)
            .ok_or_else(|| WoomError::not_found(EntityKind::LineItem, item_id))?;
        Ok(meta_string(&item.meta_data, &join_url_meta_key(product_id)))
    }

    async fn replace_item_join_url(
        &self,
        order_id: OrderId,
        item_id: ItemId,
        product_id: ProductId,
        join_url: &str,
    ) -> Result<(), WoomError> {
        // WooCommerce updates an existing meta entry with the same key in place.
        self.put(
            &format!("orders/{order_id}"),
            json!({
                "line_items": [{
                    "id": item_id.0,
                    "meta_data": [{ "key": join_url_meta_key(product_id), "value": join_url }]
                }]
            }),
        )
        .await
    }

    async fn replace_customer_join_url(
        &self,
        user_id: UserId,
        product_id: ProductId,
        join_url: &str,
    ) -> Result<(), WoomError> {
        self.put(
            &format!("customers/{user_id}"),
            json!({
                "meta_data": [{ "key": join_url_meta_key(product_id), "value": join_url }]
            }),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn store(server: &MockServer) -> WooCommerceStore {
        WooCommerceStore::new(&CommerceConfig {
            base_url: format!("{}/", server.uri()),
            consumer_key: "ck".into(),
            consumer_secret: "cs".into(),
            ..CommerceConfig::default()
        })
        .unwrap()
    }

    fn order_body() -> serde_json::Value {
        json!({
            "id": 100,
            "customer_id": 7,
            "line_items": [
                {"id": 1, "product_id": 42, "meta_data": [
                    {"id": 9, "key": "product_42_join_url", "value": "https://x.test/j/1"}
                ]},
                {"id": 2, "product_id": 43, "meta_data": []}
            ]
        })
    }

    #[tokio::test]
    async fn reads_order_with_basic_auth() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/wp-json/wc/v3/orders/100"))
            // base64("ck:cs")
            .and(header("authorization", "Basic Y2s6Y3M="))
            .respond_with(ResponseTemplate::new(200).set_body_json(order_body()))
            .expect(1)
            .mount(&server)
            .await;

        let order = store(&server).order(OrderId(100)).await.unwrap();
        assert_eq!(order.customer_id, UserId(7));
        assert_eq!(order.items.len(), 2);
        assert_eq!(order.item(ItemId(2)).unwrap().product_id, ProductId(43));
    }

    #[tokio::test]
    async fn missing_order_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({"code": "woocommerce_rest_shop_order_invalid_id"})))
            .mount(&server)
            .await;

        let err = store(&server).order(OrderId(5)).await.unwrap_err();
        assert!(matches!(err, WoomError::NotFound { kind: EntityKind::Order, id: 5 }));
    }

    #[tokio::test]
    async fn product_meta_maps_to_webinar_fields() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/wp-json/wc/v3/products/42"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 42,
                "meta_data": [
                    {"id": 1, "key": "woom_webinar_id", "value": "81234567890"},
                    {"id": 2, "key": "woom_product_start_time", "value": "1788274800"}
                ]
            })))
            .mount(&server)
            .await;

        let product = store(&server).product(ProductId(42)).await.unwrap();
        assert_eq!(product.webinar_id(), Some("81234567890"));
        assert_eq!(product.start_time.unwrap().timestamp(), 1_788_274_800);
    }

    #[tokio::test]
    async fn item_join_url_reads_line_item_meta() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/wp-json/wc/v3/orders/100"))
            .respond_with(ResponseTemplate::new(200).set_body_json(order_body()))
            .mount(&server)
            .await;
        let store = store(&server);

        let url = store
            .item_join_url(OrderId(100), ItemId(1), ProductId(42))
            .await
            .unwrap();
        assert_eq!(url.as_deref(), Some("https://x.test/j/1"));

        let none = store
            .item_join_url(OrderId(100), ItemId(2), ProductId(43))
            .await
            .unwrap();
        assert_eq!(none, None);

        let err = store
            .item_join_url(OrderId(100), ItemId(3), ProductId(43))
            .await
            .unwrap_err();
        assert!(matches!(err, WoomError::NotFound { kind: EntityKind::LineItem, .. }));
    }

    #[tokio::test]
    async fn replace_writes_both_meta_locations() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/wp-json/wc/v3/orders/100"))
            .and(body_json(json!({
                "line_items": [{"id": 1, "meta_data": [{"key": "product_42_join_url", "value": "https://x.test/j/2"}]}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(order_body()))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/wp-json/wc/v3/customers/7"))
            .and(body_json(json!({
                "meta_data": [{"key": "product_42_join_url", "value": "https://x.test/j/2"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 7})))
            .expect(1)
            .mount(&server)
            .await;

        let store = store(&server);
        store
            .replace_item_join_url(OrderId(100), ItemId(1), ProductId(42), "https://x.test/j/2")
            .await
            .unwrap();
        store
            .replace_customer_join_url(UserId(7), ProductId(42), "https://x.test/j/2")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn server_error_is_commerce_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = store(&server).customer(UserId(7)).await.unwrap_err();
        assert!(matches!(err, WoomError::Commerce { .. }));
    }

    #[test]
    fn blank_base_url_is_rejected() {
        assert!(WooCommerceStore::new(&CommerceConfig::default()).is_err());
    }
}

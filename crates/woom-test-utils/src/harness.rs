// SPDX-FileCopyrightText: 2026 Woom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end pipeline testing.
//!
//! `TestHarness` assembles an [`Orchestrator`] with fake collaborators, a
//! wiremock server standing in for both Zoom endpoints, and a temp SQLite
//! audit log.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use secrecy::SecretString;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use woom_config::ZoomConfig;
use woom_core::{
    AuditLog, AuditRecord, Clock, Customer, ItemId, LineItem, Order, OrderId, Product, ProductId,
    TokenStore, UserId, WoomError,
};
use woom_pipeline::{CollectingScheduler, Collaborators, Orchestrator, SchedulePolicy};
use woom_storage::SqliteAuditLog;
use woom_zoom::{MemoryTokenStore, OAuthClient, RegistrationClient, TokenProvider, cache_key};

use crate::clock::FakeClock;
use crate::commerce::InMemoryCommerce;
use crate::jwt::make_jwt;
use crate::notifier::RecordingNotifier;

pub const ACCOUNT_ID: &str = "acc-1";
pub const CLIENT_KEY: &str = "client-key";
pub const CLIENT_SECRET: &str = "client-secret";
pub const WEBINAR_ID: &str = "81234567890";

pub const ORDER_ID: OrderId = OrderId(100);
pub const ITEM_ID: ItemId = ItemId(200);
pub const PRODUCT_ID: ProductId = ProductId(7);
pub const USER_ID: UserId = UserId(3);

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    now: DateTime<Utc>,
    audit_enabled: bool,
    policy: SchedulePolicy,
    request_timeout_secs: u64,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            now: Utc
                .with_ymd_and_hms(2026, 5, 1, 9, 0, 0)
                .single()
                .unwrap_or(DateTime::<Utc>::UNIX_EPOCH),
            audit_enabled: true,
            policy: SchedulePolicy::default(),
            request_timeout_secs: 5,
        }
    }

    /// Start the fake clock at `now`.
    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    /// Run without an audit log.
    pub fn without_audit(mut self) -> Self {
        self.audit_enabled = false;
        self
    }

    pub fn with_policy(mut self, policy: SchedulePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Timeout for calls to the mock Zoom server.
    pub fn with_request_timeout_secs(mut self, secs: u64) -> Self {
        self.request_timeout_secs = secs;
        self
    }

    /// Build the test harness, creating all required subsystems.
    pub async fn build(self) -> Result<TestHarness, WoomError> {
        let zoom = MockServer::start().await;
        let temp_dir =
            tempfile::TempDir::new().map_err(|e| WoomError::Storage { source: e.into() })?;

        let audit = if self.audit_enabled {
            Some(Arc::new(
                SqliteAuditLog::open(temp_dir.path().join("audit.db")).await?,
            ))
        } else {
            None
        };

        let config = ZoomConfig {
            account_id: ACCOUNT_ID.into(),
            client_key: CLIENT_KEY.into(),
            client_secret: CLIENT_SECRET.into(),
            oauth_url: format!("{}/oauth/token", zoom.uri()),
            api_base_url: format!("{}/v2", zoom.uri()),
            request_timeout_secs: self.request_timeout_secs,
            ..ZoomConfig::default()
        };

        let clock = Arc::new(FakeClock::new(self.now));
        let tokens = Arc::new(MemoryTokenStore::new(clock.clone()));
        let http = woom_zoom::http_client(&config)?;
        let provider = TokenProvider::new(
            tokens.clone(),
            OAuthClient::new(http.clone(), &config)?,
            clock.clone(),
            config.token_ttl(),
        );

        let commerce = Arc::new(InMemoryCommerce::new());
        let scheduler = Arc::new(CollectingScheduler::new());
        let notifier = Arc::new(RecordingNotifier::new());

        let orchestrator = Orchestrator::new(
            Collaborators {
                commerce: commerce.clone(),
                tokens: provider,
                registrar: RegistrationClient::new(http, &config),
                scheduler: scheduler.clone(),
                notifier: notifier.clone(),
                audit: audit.clone().map(|log| log as Arc<dyn AuditLog>),
                clock: clock.clone(),
            },
            self.policy,
        );

        Ok(TestHarness {
            zoom,
            clock,
            tokens,
            commerce,
            scheduler,
            notifier,
            audit,
            orchestrator,
            config,
            _temp_dir: temp_dir,
        })
    }
}

/// The pipeline wired over fakes.
pub struct TestHarness {
    /// Serves `/oauth/token` and `/v2/webinars/{id}/registrants`.
    pub zoom: MockServer,
    pub clock: Arc<FakeClock>,
    pub tokens: Arc<MemoryTokenStore>,
    pub commerce: Arc<InMemoryCommerce>,
    pub scheduler: Arc<CollectingScheduler>,
    pub notifier: Arc<RecordingNotifier>,
    /// `None` when built with [`TestHarnessBuilder::without_audit`].
    pub audit: Option<Arc<SqliteAuditLog>>,
    pub orchestrator: Orchestrator,
    pub config: ZoomConfig,
    /// Temp directory kept alive for cleanup on drop.
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Cache key the token provider reads and writes.
    pub fn token_cache_key(&self) -> String {
        cache_key(CLIENT_KEY, &SecretString::from(CLIENT_SECRET))
    }

    /// Put `token` in the cache as if an earlier attempt had fetched it.
    pub async fn seed_token(&self, token: &str) {
        let key = self.token_cache_key();
        self.tokens
            .set(&key, token.to_string(), self.config.token_ttl())
            .await;
    }

    /// A token for the configured account, valid for an hour from now.
    pub fn fresh_token(&self) -> String {
        make_jwt(ACCOUNT_ID, self.now().timestamp() + 3600)
    }

    /// Customer, webinar product, and a one-item order using the default ids.
    pub async fn seed_webinar_order(&self, start_time: Option<DateTime<Utc>>) {
        self.commerce
            .insert_customer(Customer {
                id: USER_ID,
                email: "ada@example.test".into(),
                first_name: "Ada".into(),
                last_name: "Lovelace".into(),
            })
            .await;
        self.commerce
            .insert_product(Product {
                id: PRODUCT_ID,
                webinar_id: Some(WEBINAR_ID.into()),
                start_time,
            })
            .await;
        self.commerce
            .insert_order(Order {
                id: ORDER_ID,
                customer_id: USER_ID,
                items: vec![LineItem {
                    item_id: ITEM_ID,
                    product_id: PRODUCT_ID,
                }],
            })
            .await;
    }

    /// Answer the OAuth endpoint with `response`.
    pub async fn mock_oauth(&self, response: ResponseTemplate) {
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .respond_with(response)
            .mount(&self.zoom)
            .await;
    }

    /// Answer the OAuth endpoint with a 200 carrying `token`.
    pub async fn mock_oauth_token(&self, token: &str) {
        self.mock_oauth(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": token,
                "token_type": "bearer",
                "expires_in": 3599,
            })),
        )
        .await;
    }

    /// Answer the registrant endpoint of the default webinar with `response`.
    pub async fn mock_registrant(&self, response: ResponseTemplate) {
        Mock::given(method("POST"))
            .and(path(format!("/v2/webinars/{WEBINAR_ID}/registrants")))
            .respond_with(response)
            .mount(&self.zoom)
            .await;
    }

    /// Answer the registrant endpoint with a 201 carrying `join_url`.
    pub async fn mock_registrant_created(&self, join_url: &str) {
        self.mock_registrant(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "registrant_id": "r-1",
            "id": WEBINAR_ID,
            "join_url": join_url,
        })))
        .await;
    }

    /// Requests the mock server received on `path`.
    pub async fn requests_to(&self, request_path: &str) -> usize {
        self.zoom
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|request| request.url.path() == request_path)
            .count()
    }

    pub async fn oauth_requests(&self) -> usize {
        self.requests_to("/oauth/token").await
    }

    pub async fn registrant_requests(&self) -> usize {
        self.requests_to(&format!("/v2/webinars/{WEBINAR_ID}/registrants"))
            .await
    }

    /// Audit rows for the default order, oldest first. Empty when auditing is off.
    pub async fn audit_records(&self) -> Result<Vec<AuditRecord>, WoomError> {
        match &self.audit {
            Some(audit) => audit.records_for_order(ORDER_ID).await,
            None => Ok(Vec::new()),
        }
    }
}

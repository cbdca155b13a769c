// SPDX-FileCopyrightText: 2026 Woom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests for checkout scheduling and processing attempts.
//!
//! Each test builds an isolated TestHarness with a mock Zoom server, a fake
//! clock, in-memory commerce data, and a temp SQLite audit log.

use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use wiremock::ResponseTemplate;
use woom_core::{
    EntityKind, ItemId, LineItem, Order, Product, ProductId, RegistrationTask, TaskHandler,
    TokenStore, WoomError,
};
use woom_pipeline::{
    AttemptOutcome, JOIN_URL_EXISTS, JOIN_URL_MISSING, RATE_LIMIT_MESSAGE, SchedulePolicy,
};
use woom_test_utils::harness::{ACCOUNT_ID, ITEM_ID, ORDER_ID, PRODUCT_ID, USER_ID};
use woom_test_utils::{TestHarness, make_jwt};

const JOIN_URL: &str = "https://x.test/j/1";

fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
}

/// Harness clock: 2026-05-01 09:00 UTC. Webinar well in the future.
fn next_week() -> Option<DateTime<Utc>> {
    Some(utc(2026, 5, 10, 15, 0))
}

fn task() -> RegistrationTask {
    RegistrationTask::new(ORDER_ID, ITEM_ID)
}

fn rescheduled(outcome: AttemptOutcome) -> (DateTime<Utc>, RegistrationTask) {
    match outcome {
        AttemptOutcome::Rescheduled { fire_at, task } => (fire_at, task),
        other => panic!("expected a reschedule, got {other:?}"),
    }
}

// ---- Happy path ----

#[tokio::test]
async fn registers_and_stores_join_link_under_both_keys() {
    let harness = TestHarness::builder().build().await.unwrap();
    harness.seed_webinar_order(next_week()).await;
    harness.seed_token(&harness.fresh_token()).await;
    harness.mock_registrant_created(JOIN_URL).await;

    let outcome = harness.orchestrator.process_task(task()).await.unwrap();
    assert_eq!(
        outcome,
        AttemptOutcome::Registered {
            join_url: JOIN_URL.into()
        }
    );

    assert_eq!(
        harness
            .commerce
            .stored_item_join_url(ORDER_ID, ITEM_ID, PRODUCT_ID)
            .await
            .as_deref(),
        Some(JOIN_URL)
    );
    assert_eq!(
        harness
            .commerce
            .stored_customer_join_url(USER_ID, PRODUCT_ID)
            .await
            .as_deref(),
        Some(JOIN_URL)
    );

    let events = harness.notifier.events().await;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].join_url, JOIN_URL);
    assert_eq!(events[0].user_id, USER_ID);
    assert!(harness.scheduler.scheduled().await.is_empty());
}

#[tokio::test]
async fn successful_attempt_is_fully_audited() {
    let harness = TestHarness::builder().build().await.unwrap();
    harness.seed_webinar_order(next_week()).await;
    let token = harness.fresh_token();
    harness.seed_token(&token).await;
    harness.mock_registrant_created(JOIN_URL).await;

    harness.orchestrator.process_task(task()).await.unwrap();

    let records = harness.audit_records().await.unwrap();
    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.calling_function.as_deref(), Some("process_task"));
    assert_eq!(record.webinar_id, "81234567890");
    assert_eq!(record.cron_date, harness.now());
    assert!(
        record
            .bearer_token
            .as_deref()
            .unwrap()
            .starts_with("Token Valid [difference: 1 hour]")
    );
    assert_eq!(record.bearer_token_status_code, None);
    assert_eq!(record.join_url.as_deref(), Some(JOIN_URL));
    assert_eq!(record.response_status_code.as_deref(), Some("201"));
    assert!(record.response_data.as_deref().unwrap().contains("r-1"));

    let request_data: serde_json::Value =
        serde_json::from_str(record.request_data.as_deref().unwrap()).unwrap();
    assert_eq!(request_data["email"], "ada@example.test");

    let headers = record.request_headers.as_deref().unwrap();
    assert!(headers.contains("[redacted]"));
    assert!(!headers.contains(&token));
}

#[tokio::test]
async fn works_with_audit_disabled() {
    let harness = TestHarness::builder().without_audit().build().await.unwrap();
    harness.seed_webinar_order(next_week()).await;
    harness.seed_token(&harness.fresh_token()).await;
    harness.mock_registrant_created(JOIN_URL).await;

    let outcome = harness.orchestrator.process_task(task()).await.unwrap();
    assert_eq!(outcome.join_url(), Some(JOIN_URL));
    assert!(harness.audit.is_none());
    assert!(harness.audit_records().await.unwrap().is_empty());
}

// ---- Idempotency ----

#[tokio::test]
async fn existing_join_link_is_replayed_without_registering() {
    let harness = TestHarness::builder().build().await.unwrap();
    harness.seed_webinar_order(next_week()).await;
    harness.seed_token(&harness.fresh_token()).await;
    harness
        .commerce
        .seed_item_join_url(ORDER_ID, ITEM_ID, PRODUCT_ID, JOIN_URL)
        .await;
    harness.mock_registrant_created("https://x.test/j/other").await;

    let outcome = harness.orchestrator.process_task(task()).await.unwrap();
    assert_eq!(
        outcome,
        AttemptOutcome::Replayed {
            join_url: JOIN_URL.into()
        }
    );

    assert_eq!(harness.registrant_requests().await, 0);
    assert_eq!(harness.commerce.join_url_writes().await, 0);
    assert_eq!(harness.notifier.count().await, 1);

    let records = harness.audit_records().await.unwrap();
    assert_eq!(records[0].request_headers.as_deref(), Some(JOIN_URL_EXISTS));
    assert_eq!(records[0].join_url.as_deref(), Some(JOIN_URL));
}

#[tokio::test]
async fn second_attempt_after_success_does_not_register_again() {
    let harness = TestHarness::builder().build().await.unwrap();
    harness.seed_webinar_order(next_week()).await;
    harness.seed_token(&harness.fresh_token()).await;
    harness.mock_registrant_created(JOIN_URL).await;

    let first = harness.orchestrator.process_task(task()).await.unwrap();
    let second = harness.orchestrator.process_task(task()).await.unwrap();

    assert!(matches!(first, AttemptOutcome::Registered { .. }));
    assert!(matches!(second, AttemptOutcome::Replayed { .. }));
    assert_eq!(harness.registrant_requests().await, 1);
    assert_eq!(harness.notifier.count().await, 2);
}

// ---- Token cache ----

#[tokio::test]
async fn token_is_fetched_once_and_reused() {
    let harness = TestHarness::builder().build().await.unwrap();
    harness.seed_webinar_order(next_week()).await;
    harness.mock_oauth_token(&harness.fresh_token()).await;
    harness.mock_registrant_created(JOIN_URL).await;

    harness.orchestrator.process_task(task()).await.unwrap();
    harness.clock.advance(Duration::from_secs(60));
    harness.orchestrator.process_task(task()).await.unwrap();

    assert_eq!(harness.oauth_requests().await, 1);

    let records = harness.audit_records().await.unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].bearer_token_status_code.as_deref(), Some("200"));
    assert_eq!(records[1].bearer_token_status_code, None);
}

#[tokio::test]
async fn expired_cached_token_is_refreshed() {
    let harness = TestHarness::builder().build().await.unwrap();
    harness.seed_webinar_order(next_week()).await;
    let stale = make_jwt(ACCOUNT_ID, harness.now().timestamp() - 60);
    harness.seed_token(&stale).await;
    let fresh = harness.fresh_token();
    harness.mock_oauth_token(&fresh).await;
    harness.mock_registrant_created(JOIN_URL).await;

    let outcome = harness.orchestrator.process_task(task()).await.unwrap();

    assert!(matches!(outcome, AttemptOutcome::Registered { .. }));
    assert_eq!(harness.oauth_requests().await, 1);
    assert_eq!(
        harness.tokens.get(&harness.token_cache_key()).await,
        Some(fresh)
    );
    let records = harness.audit_records().await.unwrap();
    assert_eq!(records[0].bearer_token_status_code.as_deref(), Some("200"));
}

#[tokio::test]
async fn cached_token_for_other_account_reschedules_without_network() {
    let harness = TestHarness::builder().build().await.unwrap();
    harness.seed_webinar_order(next_week()).await;
    harness
        .seed_token(&make_jwt("someone-else", harness.now().timestamp() + 3600))
        .await;

    let outcome = harness
        .orchestrator
        .process_task(task().carrying(404))
        .await
        .unwrap();

    let (fire_at, next) = rescheduled(outcome);
    assert_eq!(fire_at, harness.now() + chrono::Duration::minutes(10));
    assert_eq!(next.previous_status_code, 404);
    assert_eq!(harness.oauth_requests().await, 0);
    assert_eq!(harness.registrant_requests().await, 0);

    let records = harness.audit_records().await.unwrap();
    assert_eq!(records[0].bearer_token.as_deref(), Some("Invalid Account ID"));
}

#[tokio::test]
async fn oauth_rejection_reschedules_with_its_status() {
    let harness = TestHarness::builder().build().await.unwrap();
    harness.seed_webinar_order(next_week()).await;
    harness
        .mock_oauth(ResponseTemplate::new(401).set_body_string(r#"{"reason":"Invalid client_id or client_secret"}"#))
        .await;

    let outcome = harness.orchestrator.process_task(task()).await.unwrap();

    let (_, next) = rescheduled(outcome);
    assert_eq!(next.previous_status_code, 401);
    assert_eq!(harness.registrant_requests().await, 0);
    assert_eq!(harness.notifier.count().await, 0);

    let records = harness.audit_records().await.unwrap();
    assert_eq!(records[0].bearer_token_status_code.as_deref(), Some("401"));
    assert!(
        records[0]
            .bearer_token
            .as_deref()
            .unwrap()
            .contains("Invalid client_id")
    );
}

// ---- Registration failures ----

#[tokio::test]
async fn transport_failure_backs_off_ten_minutes() {
    let harness = TestHarness::builder()
        .with_request_timeout_secs(1)
        .build()
        .await
        .unwrap();
    harness.seed_webinar_order(next_week()).await;
    harness.seed_token(&harness.fresh_token()).await;
    harness
        .mock_registrant(ResponseTemplate::new(201).set_delay(Duration::from_secs(3)))
        .await;

    let outcome = harness.orchestrator.process_task(task()).await.unwrap();

    let (fire_at, next) = rescheduled(outcome);
    assert_eq!(fire_at, harness.now() + chrono::Duration::minutes(10));
    assert_eq!(next.previous_status_code, -1);
    assert_eq!(next.key(), task().key());

    assert_eq!(harness.scheduler.scheduled().await.len(), 1);
    assert_eq!(harness.commerce.join_url_writes().await, 0);
    assert_eq!(harness.notifier.count().await, 0);

    let records = harness.audit_records().await.unwrap();
    assert!(records[0].response_data.is_some());
    assert_eq!(records[0].join_url, None);
}

#[tokio::test]
async fn rejected_registration_carries_status() {
    let harness = TestHarness::builder().build().await.unwrap();
    harness.seed_webinar_order(next_week()).await;
    harness.seed_token(&harness.fresh_token()).await;
    harness
        .mock_registrant(
            ResponseTemplate::new(404).set_body_string(r#"{"code":3001,"message":"Webinar does not exist"}"#),
        )
        .await;

    let outcome = harness.orchestrator.process_task(task()).await.unwrap();

    let (_, next) = rescheduled(outcome);
    assert_eq!(next.previous_status_code, 404);
    assert_eq!(harness.commerce.join_url_writes().await, 0);

    let records = harness.audit_records().await.unwrap();
    assert_eq!(records[0].join_url.as_deref(), Some(JOIN_URL_MISSING));
    assert_eq!(records[0].response_status_code.as_deref(), Some("404"));
}

#[tokio::test]
async fn created_without_join_url_keeps_previous_status() {
    let harness = TestHarness::builder().build().await.unwrap();
    harness.seed_webinar_order(next_week()).await;
    harness.seed_token(&harness.fresh_token()).await;
    harness
        .mock_registrant(
            ResponseTemplate::new(201).set_body_json(serde_json::json!({ "registrant_id": "r-1" })),
        )
        .await;

    let outcome = harness
        .orchestrator
        .process_task(task().carrying(-1))
        .await
        .unwrap();

    let (_, next) = rescheduled(outcome);
    assert_eq!(next.previous_status_code, -1);
    assert_eq!(harness.commerce.join_url_writes().await, 0);

    let records = harness.audit_records().await.unwrap();
    assert_eq!(records[0].join_url.as_deref(), Some(JOIN_URL_MISSING));
    assert_eq!(records[0].response_status_code.as_deref(), Some("201"));
}

// ---- Rate limiting ----

#[tokio::test]
async fn rate_limit_before_start_waits_for_reset() {
    let harness = TestHarness::builder().build().await.unwrap();
    harness.seed_webinar_order(next_week()).await;
    harness.seed_token(&harness.fresh_token()).await;
    harness
        .mock_registrant(ResponseTemplate::new(429).set_body_string(r#"{"code":429}"#))
        .await;

    let outcome = harness.orchestrator.process_task(task()).await.unwrap();

    let (fire_at, next) = rescheduled(outcome);
    assert_eq!(fire_at, utc(2026, 5, 2, 11, 0));
    assert_eq!(next.previous_status_code, 429);

    let records = harness.audit_records().await.unwrap();
    assert_eq!(records[0].join_url.as_deref(), Some(RATE_LIMIT_MESSAGE));
    assert_eq!(records[0].response_status_code.as_deref(), Some("429"));
}

#[tokio::test]
async fn rate_limit_after_start_gives_up() {
    let harness = TestHarness::builder().build().await.unwrap();
    harness
        .seed_webinar_order(Some(utc(2026, 5, 2, 10, 0)))
        .await;
    harness.seed_token(&harness.fresh_token()).await;
    harness
        .mock_registrant(ResponseTemplate::new(429).set_body_string("{}"))
        .await;

    let outcome = harness.orchestrator.process_task(task()).await.unwrap();

    assert_eq!(outcome, AttemptOutcome::GivenUp);
    assert!(harness.scheduler.scheduled().await.is_empty());
    assert_eq!(harness.notifier.count().await, 0);
}

#[tokio::test]
async fn rate_limit_reset_hour_is_configurable() {
    let policy = SchedulePolicy {
        rate_limit_reset_hour_utc: 0,
        ..SchedulePolicy::default()
    };
    let harness = TestHarness::builder().with_policy(policy).build().await.unwrap();
    harness
        .seed_webinar_order(Some(utc(2026, 5, 2, 10, 0)))
        .await;
    harness.seed_token(&harness.fresh_token()).await;
    harness
        .mock_registrant(ResponseTemplate::new(429).set_body_string("{}"))
        .await;

    let outcome = harness.orchestrator.process_task(task()).await.unwrap();

    let (fire_at, _) = rescheduled(outcome);
    assert_eq!(fire_at, utc(2026, 5, 2, 0, 0));
}

// ---- Checkout scheduling ----

#[tokio::test]
async fn checkout_schedules_one_minute_out() {
    let harness = TestHarness::builder().build().await.unwrap();
    harness.seed_webinar_order(next_week()).await;

    let report = harness.orchestrator.schedule_order(ORDER_ID).await.unwrap();

    assert_eq!(report.scheduled.len(), 1);
    let item = &report.scheduled[0];
    assert_eq!(item.item_id, ITEM_ID);
    assert_eq!(item.fire_at, harness.now() + chrono::Duration::minutes(1));
    assert_eq!(item.immediate, None);

    assert_eq!(
        harness.scheduler.scheduled().await,
        vec![(item.fire_at, task())]
    );
    assert_eq!(harness.registrant_requests().await, 0);

    let records = harness.audit_records().await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].calling_function.as_deref(), Some("schedule_order"));
    assert_eq!(records[0].cron_date, item.fire_at);
}

#[tokio::test]
async fn checkout_ignores_items_without_webinar() {
    let harness = TestHarness::builder().build().await.unwrap();
    harness.seed_webinar_order(next_week()).await;
    harness
        .commerce
        .insert_product(Product {
            id: PRODUCT_ID,
            webinar_id: None,
            start_time: None,
        })
        .await;

    let report = harness.orchestrator.schedule_order(ORDER_ID).await.unwrap();

    assert!(report.scheduled.is_empty());
    assert_eq!(report.ignored, vec![ITEM_ID]);
    assert!(harness.scheduler.scheduled().await.is_empty());
    assert!(harness.audit_records().await.unwrap().is_empty());
}

#[tokio::test]
async fn checkout_picks_webinar_items_out_of_mixed_order() {
    let harness = TestHarness::builder().build().await.unwrap();
    harness.seed_webinar_order(next_week()).await;
    harness
        .commerce
        .insert_product(Product {
            id: ProductId(8),
            webinar_id: Some("  ".into()),
            start_time: None,
        })
        .await;
    harness
        .commerce
        .insert_order(Order {
            id: ORDER_ID,
            customer_id: USER_ID,
            items: vec![
                LineItem {
                    item_id: ITEM_ID,
                    product_id: PRODUCT_ID,
                },
                LineItem {
                    item_id: ItemId(201),
                    product_id: ProductId(8),
                },
            ],
        })
        .await;

    let report = harness.orchestrator.schedule_order(ORDER_ID).await.unwrap();

    assert_eq!(report.scheduled.len(), 1);
    assert_eq!(report.scheduled[0].item_id, ITEM_ID);
    assert_eq!(report.ignored, vec![ItemId(201)]);
}

#[tokio::test]
async fn late_purchase_is_scheduled_and_run_at_once() {
    let harness = TestHarness::builder().build().await.unwrap();
    harness
        .seed_webinar_order(Some(utc(2026, 5, 1, 18, 0)))
        .await;
    harness.seed_token(&harness.fresh_token()).await;
    harness.mock_registrant_created(JOIN_URL).await;

    let report = harness.orchestrator.schedule_order(ORDER_ID).await.unwrap();

    let item = &report.scheduled[0];
    assert_eq!(item.fire_at, harness.now() + chrono::Duration::minutes(1));
    assert_eq!(
        item.immediate,
        Some(AttemptOutcome::Registered {
            join_url: JOIN_URL.into()
        })
    );
    assert_eq!(harness.scheduler.scheduled().await.len(), 1);
    assert_eq!(harness.registrant_requests().await, 1);

    let records = harness.audit_records().await.unwrap();
    let functions: Vec<_> = records
        .iter()
        .filter_map(|r| r.calling_function.as_deref())
        .collect();
    assert_eq!(functions, vec!["schedule_order", "process_task"]);
}

// ---- Commerce store outages ----

#[tokio::test]
async fn store_read_outage_retries_with_status_kept() {
    let harness = TestHarness::builder().build().await.unwrap();
    harness.seed_webinar_order(next_week()).await;
    harness.seed_token(&harness.fresh_token()).await;
    harness.mock_registrant_created(JOIN_URL).await;
    harness.commerce.set_reads_down(true).await;

    let outcome = harness
        .orchestrator
        .process_task(task().carrying(404))
        .await
        .unwrap();

    let (fire_at, next) = rescheduled(outcome);
    assert_eq!(fire_at, harness.now() + chrono::Duration::minutes(10));
    assert_eq!(next.previous_status_code, 404);
    assert_eq!(next.key(), task().key());
    assert_eq!(harness.scheduler.scheduled().await.len(), 1);
    assert_eq!(harness.registrant_requests().await, 0);
    assert_eq!(harness.notifier.count().await, 0);
}

#[tokio::test]
async fn registration_is_audited_and_retried_when_join_link_cannot_be_stored() {
    let harness = TestHarness::builder().build().await.unwrap();
    harness.seed_webinar_order(next_week()).await;
    harness.seed_token(&harness.fresh_token()).await;
    harness.mock_registrant_created(JOIN_URL).await;
    harness.commerce.set_writes_down(true).await;

    let outcome = harness.orchestrator.process_task(task()).await.unwrap();

    let (fire_at, next) = rescheduled(outcome);
    assert_eq!(fire_at, harness.now() + chrono::Duration::minutes(10));
    assert_eq!(next, task());
    assert_eq!(harness.registrant_requests().await, 1);
    assert_eq!(harness.notifier.count().await, 0);
    assert_eq!(
        harness
            .commerce
            .stored_item_join_url(ORDER_ID, ITEM_ID, PRODUCT_ID)
            .await,
        None
    );

    let records = harness.audit_records().await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].join_url.as_deref(), Some(JOIN_URL));
    assert_eq!(records[0].response_status_code.as_deref(), Some("201"));
    assert!(records[0].response_data.as_deref().unwrap().contains("r-1"));

    // The store comes back before the retry fires.
    harness.commerce.set_writes_down(false).await;
    let outcome = harness.orchestrator.process_task(next).await.unwrap();
    assert_eq!(
        outcome,
        AttemptOutcome::Registered {
            join_url: JOIN_URL.into()
        }
    );
    assert_eq!(
        harness
            .commerce
            .stored_item_join_url(ORDER_ID, ITEM_ID, PRODUCT_ID)
            .await
            .as_deref(),
        Some(JOIN_URL)
    );
    assert_eq!(harness.notifier.count().await, 1);
}

// ---- Missing data ----

#[tokio::test]
async fn product_without_webinar_is_skipped_silently() {
    let harness = TestHarness::builder().build().await.unwrap();
    harness.seed_webinar_order(next_week()).await;
    harness
        .commerce
        .insert_product(Product {
            id: PRODUCT_ID,
            webinar_id: None,
            start_time: next_week(),
        })
        .await;

    let outcome = harness.orchestrator.process_task(task()).await.unwrap();

    assert_eq!(outcome, AttemptOutcome::Skipped);
    assert_eq!(harness.oauth_requests().await, 0);
    assert!(harness.audit_records().await.unwrap().is_empty());
}

#[tokio::test]
async fn unknown_order_is_an_error() {
    let harness = TestHarness::builder().build().await.unwrap();

    let err = harness.orchestrator.process_task(task()).await.unwrap_err();
    assert!(matches!(
        err,
        WoomError::NotFound {
            kind: EntityKind::Order,
            ..
        }
    ));
}

#[tokio::test]
async fn unknown_line_item_is_an_error() {
    let harness = TestHarness::builder().build().await.unwrap();
    harness.seed_webinar_order(next_week()).await;

    let err = harness
        .orchestrator
        .process_task(RegistrationTask::new(ORDER_ID, ItemId(999)))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        WoomError::NotFound {
            kind: EntityKind::LineItem,
            id: 999
        }
    ));
}

#[tokio::test]
async fn task_handler_treats_reschedule_as_success() {
    let harness = TestHarness::builder().build().await.unwrap();
    harness.seed_webinar_order(next_week()).await;
    harness
        .mock_oauth(ResponseTemplate::new(500).set_body_string("boom"))
        .await;

    harness.orchestrator.handle(task()).await.unwrap();
    assert_eq!(harness.scheduler.scheduled().await.len(), 1);
}

// SPDX-FileCopyrightText: 2026 Woom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-line-item registration state machine.
//!
//! An attempt goes token check, optional refresh, duplicate check, then
//! registration. Every way out of it is either a stored join link, a newly
//! scheduled attempt, or giving up on a rate limit that outlasts the event.
//! Webinar platform failures never surface as errors. Commerce store
//! failures are retried later, except unknown ids, which surface along with
//! scheduler failures.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};
use woom_core::{
    Attendee, AuditLog, AuditUpdate, Clock, CommerceStore, EntityKind, JoinLinkHandler,
    ItemId, JoinLinkReady, NewAuditRecord, Order, OrderId, Product, ProductId, RegistrationTask,
    RemoteFailure,
    TaskHandler, TaskScheduler, WoomError,
};
use woom_zoom::{RegistrationClient, TokenProvider, audit_request_headers};

use crate::audit::{
    AttemptAudit, CALLED_FROM_CHECKOUT, CALLED_FROM_TASK, JOIN_URL_EXISTS, JOIN_URL_MISSING,
    RATE_LIMIT_MESSAGE,
};
use crate::metrics::{record_attempt, record_scheduled};
use crate::outcome::{AttemptOutcome, CheckoutReport, ScheduledItem};
use crate::policy::{SchedulePolicy, after, rate_limit_reset, start_of_day};

/// Everything the orchestrator talks to.
pub struct Collaborators {
    pub commerce: Arc<dyn CommerceStore>,
    pub tokens: TokenProvider,
    pub registrar: RegistrationClient,
    pub scheduler: Arc<dyn TaskScheduler>,
    pub notifier: Arc<dyn JoinLinkHandler>,
    /// `None` turns auditing off.
    pub audit: Option<Arc<dyn AuditLog>>,
    pub clock: Arc<dyn Clock>,
}

pub struct Orchestrator {
    commerce: Arc<dyn CommerceStore>,
    tokens: TokenProvider,
    registrar: RegistrationClient,
    scheduler: Arc<dyn TaskScheduler>,
    notifier: Arc<dyn JoinLinkHandler>,
    audit: Option<Arc<dyn AuditLog>>,
    clock: Arc<dyn Clock>,
    policy: SchedulePolicy,
}

impl Orchestrator {
    pub fn new(collaborators: Collaborators, policy: SchedulePolicy) -> Self {
        let Collaborators {
            commerce,
            tokens,
            registrar,
            scheduler,
            notifier,
            audit,
            clock,
        } = collaborators;
        Self {
            commerce,
            tokens,
            registrar,
            scheduler,
            notifier,
            audit,
            clock,
            policy,
        }
    }

    pub fn policy(&self) -> &SchedulePolicy {
        &self.policy
    }

    /// Schedule a first attempt for every webinar line item of a paid order.
    ///
    /// When the webinar day has already started the attempt also runs right
    /// away, so same-day purchases are not left waiting on the timer.
    pub async fn schedule_order(&self, order_id: OrderId) -> Result<CheckoutReport, WoomError> {
        let order = self.commerce.order(order_id).await?;
        let mut report = CheckoutReport::default();

        for item in &order.items {
            let product = self.commerce.product(item.product_id).await?;
            let Some(webinar_id) = product.webinar_id() else {
                debug!(order_id = %order.id, item_id = %item.item_id, "no webinar on product, ignoring item");
                report.ignored.push(item.item_id);
                continue;
            };

            let now = self.clock.now();
            let task = RegistrationTask::new(order.id, item.item_id);
            let fire_at = after(now, self.policy.initial_delay);
            self.scheduler.schedule(fire_at, task).await?;
            record_scheduled("checkout");
            info!(
                order_id = %order.id,
                item_id = %item.item_id,
                product_id = %item.product_id,
                fire_at = %fire_at,
                "registration scheduled"
            );

            AttemptAudit::begin(
                self.audit.as_ref(),
                NewAuditRecord {
                    user_id: order.customer_id,
                    order_id: order.id,
                    item_id: item.item_id,
                    product_id: item.product_id,
                    webinar_id: webinar_id.to_string(),
                    cron_date: fire_at,
                    calling_function: CALLED_FROM_CHECKOUT.to_string(),
                },
            )
            .await;

            let immediate = match product.start_time {
                Some(start) if start_of_day(start) < now => {
                    info!(order_id = %order.id, item_id = %item.item_id, "webinar day has begun, running attempt now");
                    match self.process_task(task).await {
                        Ok(outcome) => Some(outcome),
                        Err(e) => {
                            error!(order_id = %order.id, item_id = %item.item_id, error = %e, "immediate attempt failed");
                            None
                        }
                    }
                }
                _ => None,
            };

            report.scheduled.push(ScheduledItem {
                item_id: item.item_id,
                product_id: item.product_id,
                fire_at,
                immediate,
            });
        }

        Ok(report)
    }

    /// Run one attempt for `task`.
    pub async fn process_task(&self, task: RegistrationTask) -> Result<AttemptOutcome, WoomError> {
        let outcome = self.attempt(task).await?;
        record_attempt(outcome.label());
        Ok(outcome)
    }

    async fn attempt(&self, task: RegistrationTask) -> Result<AttemptOutcome, WoomError> {
        let order = match self.commerce.order(task.order_id).await {
            Ok(order) => order,
            Err(e) => return self.store_unavailable(task, e).await,
        };
        let item = order
            .item(task.item_id)
            .ok_or_else(|| WoomError::not_found(EntityKind::LineItem, task.item_id))?;
        let product = match self.commerce.product(item.product_id).await {
            Ok(product) => product,
            Err(e) => return self.store_unavailable(task, e).await,
        };
        let Some(webinar_id) = product.webinar_id() else {
            debug!(order_id = %task.order_id, item_id = %task.item_id, "no webinar on product, skipping");
            return Ok(AttemptOutcome::Skipped);
        };

        let audit = AttemptAudit::begin(
            self.audit.as_ref(),
            NewAuditRecord {
                user_id: order.customer_id,
                order_id: order.id,
                item_id: item.item_id,
                product_id: product.id,
                webinar_id: webinar_id.to_string(),
                cron_date: self.clock.now(),
                calling_function: CALLED_FROM_TASK.to_string(),
            },
        )
        .await;

        let grant = match self.tokens.acquire().await {
            Ok(grant) => grant,
            Err(failure) => {
                warn!(
                    order_id = %task.order_id,
                    item_id = %task.item_id,
                    error = %failure.failure,
                    "no usable bearer token"
                );
                let mut update = AuditUpdate::default().bearer_token(failure.audit_text());
                if failure.refreshed {
                    update = update.bearer_token_status_code(failure.failure.status_code());
                }
                audit.record(update).await;
                let carried = failure.carried_status(task.previous_status_code);
                return self.retry(task.carrying(carried), "token").await;
            }
        };

        let mut update = AuditUpdate::default().bearer_token(grant.validity.audit_text());
        if let Some(status) = grant.refresh_status {
            update = update.bearer_token_status_code(status);
        }
        audit.record(update).await;

        let existing = match self
            .commerce
            .item_join_url(order.id, item.item_id, product.id)
            .await
        {
            Ok(existing) => existing,
            Err(e) => return self.store_unavailable(task, e).await,
        };
        if let Some(join_url) = existing {
            info!(order_id = %order.id, item_id = %item.item_id, "join link already stored, replaying");
            audit
                .record(
                    AuditUpdate::default()
                        .request_headers(JOIN_URL_EXISTS)
                        .join_url(join_url.clone()),
                )
                .await;
            self.notify(&order, task, &join_url).await;
            return Ok(AttemptOutcome::Replayed { join_url });
        }

        let customer = match self.commerce.customer(order.customer_id).await {
            Ok(customer) => customer,
            Err(e) => return self.store_unavailable(task, e).await,
        };
        let attendee = Attendee::from(&customer);
        audit
            .record(
                AuditUpdate::default()
                    .request_data(serde_json::to_string(&attendee).unwrap_or_default())
                    .request_headers(audit_request_headers()),
            )
            .await;

        match self
            .registrar
            .register(webinar_id, &grant.token, &attendee)
            .await
        {
            Ok(registered) => {
                audit
                    .record(
                        AuditUpdate::default()
                            .join_url(registered.join_url.clone())
                            .response_data(registered.body)
                            .response_status_code(registered.status),
                    )
                    .await;
                if let Err(e) = self
                    .store_join_url(&order, item.item_id, product.id, &registered.join_url)
                    .await
                {
                    warn!(
                        order_id = %order.id,
                        item_id = %item.item_id,
                        error = %e,
                        "registered but the join link could not be stored"
                    );
                    return self.retry(task, "commerce").await;
                }
                info!(order_id = %order.id, item_id = %item.item_id, webinar_id, "attendee registered");
                self.notify(&order, task, &registered.join_url).await;
                Ok(AttemptOutcome::Registered {
                    join_url: registered.join_url,
                })
            }
            Err(RemoteFailure::Transport(message)) => {
                warn!(order_id = %order.id, item_id = %item.item_id, error = %message, "registrant request failed");
                audit
                    .record(AuditUpdate::default().response_data(message))
                    .await;
                self.retry(task.carrying(-1), "transport").await
            }
            Err(RemoteFailure::RateLimited { body }) => {
                audit
                    .record(
                        AuditUpdate::default()
                            .join_url(RATE_LIMIT_MESSAGE)
                            .response_data(body)
                            .response_status_code(429),
                    )
                    .await;
                self.after_rate_limit(task, &product).await
            }
            Err(RemoteFailure::Protocol { status, body }) => {
                warn!(order_id = %order.id, item_id = %item.item_id, status, "created without join_url");
                audit
                    .record(
                        AuditUpdate::default()
                            .join_url(JOIN_URL_MISSING)
                            .response_data(body)
                            .response_status_code(status),
                    )
                    .await;
                self.retry(task, "protocol").await
            }
            Err(failure) => {
                let status = failure.status_code();
                warn!(order_id = %order.id, item_id = %item.item_id, status, error = %failure, "registration rejected");
                let body = match failure {
                    RemoteFailure::Http { body, .. } => body,
                    other => other.to_string(),
                };
                audit
                    .record(
                        AuditUpdate::default()
                            .join_url(JOIN_URL_MISSING)
                            .response_data(body)
                            .response_status_code(status),
                    )
                    .await;
                self.retry(task.carrying(status), "http").await
            }
        }
    }

    async fn store_join_url(
        &self,
        order: &Order,
        item_id: ItemId,
        product_id: ProductId,
        join_url: &str,
    ) -> Result<(), WoomError> {
        self.commerce
            .replace_customer_join_url(order.customer_id, product_id, join_url)
            .await?;
        self.commerce
            .replace_item_join_url(order.id, item_id, product_id, join_url)
            .await
    }

    /// Unknown ids surface; any other store failure retries the task as is.
    async fn store_unavailable(
        &self,
        task: RegistrationTask,
        error: WoomError,
    ) -> Result<AttemptOutcome, WoomError> {
        if matches!(error, WoomError::NotFound { .. }) {
            return Err(error);
        }
        warn!(
            order_id = %task.order_id,
            item_id = %task.item_id,
            error = %error,
            "commerce store unavailable"
        );
        self.retry(task, "commerce").await
    }

    async fn retry(
        &self,
        task: RegistrationTask,
        reason: &'static str,
    ) -> Result<AttemptOutcome, WoomError> {
        let fire_at = after(self.clock.now(), self.policy.retry_delay);
        self.reschedule(task, fire_at, reason).await
    }

    async fn reschedule(
        &self,
        task: RegistrationTask,
        fire_at: DateTime<Utc>,
        reason: &'static str,
    ) -> Result<AttemptOutcome, WoomError> {
        self.scheduler.schedule(fire_at, task).await?;
        record_scheduled(reason);
        info!(
            order_id = %task.order_id,
            item_id = %task.item_id,
            previous_status_code = task.previous_status_code,
            fire_at = %fire_at,
            reason,
            "attempt rescheduled"
        );
        Ok(AttemptOutcome::Rescheduled { fire_at, task })
    }

    async fn after_rate_limit(
        &self,
        task: RegistrationTask,
        product: &Product,
    ) -> Result<AttemptOutcome, WoomError> {
        let reset = rate_limit_reset(self.clock.now(), self.policy.rate_limit_reset_hour_utc);
        match product.start_time {
            Some(start) if reset < start => {
                self.reschedule(task.carrying(429), reset, "rate_limit").await
            }
            start => {
                warn!(
                    order_id = %task.order_id,
                    item_id = %task.item_id,
                    reset = %reset,
                    start = ?start,
                    "rate limited until after the webinar starts, giving up"
                );
                Ok(AttemptOutcome::GivenUp)
            }
        }
    }

    async fn notify(&self, order: &Order, task: RegistrationTask, join_url: &str) {
        let event = JoinLinkReady {
            order_id: order.id,
            item_id: task.item_id,
            user_id: order.customer_id,
            join_url: join_url.to_string(),
        };
        if let Err(e) = self.notifier.join_link_ready(&event).await {
            warn!(order_id = %order.id, item_id = %task.item_id, error = %e, "join link notification failed");
        }
    }
}

#[async_trait]
impl TaskHandler for Orchestrator {
    async fn handle(&self, task: RegistrationTask) -> Result<(), WoomError> {
        self.process_task(task).await.map(|_| ())
    }
}

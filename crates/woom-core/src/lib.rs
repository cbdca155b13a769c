// SPDX-FileCopyrightText: 2026 Woom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Woom webinar registration service.
//!
//! This crate provides the error types, domain types, and capability traits
//! shared by the scheduler, the registration pipeline, and every adapter.

pub mod error;
pub mod traits;
pub mod types;

pub use error::{EntityKind, RemoteFailure, WoomError};
pub use types::{
    Attendee, AuditRecord, AuditUpdate, Customer, ItemId, JoinLinkReady, LineItem,
    NewAuditRecord, Order, OrderId, Product, ProductId, RegistrationTask, UserId,
    join_url_meta_key,
};

pub use traits::{
    AuditLog, Clock, CommerceStore, JoinLinkHandler, SystemClock, TaskHandler, TaskScheduler,
    TokenStore,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_failure_carries_status_codes() {
        assert_eq!(RemoteFailure::Transport("refused".into()).status_code(), -1);
        assert_eq!(
            RemoteFailure::Http {
                status: 404,
                body: "{}".into()
            }
            .status_code(),
            404
        );
        assert_eq!(
            RemoteFailure::RateLimited { body: String::new() }.status_code(),
            429
        );
        assert_eq!(
            RemoteFailure::Auth {
                status: 200,
                message: "Invalid Account ID".into()
            }
            .status_code(),
            200
        );
    }

    #[test]
    fn not_found_display_names_entity() {
        let err = WoomError::not_found(EntityKind::LineItem, ItemId(612324));
        assert_eq!(err.to_string(), "line_item 612324 not found");
    }

    #[test]
    fn blank_webinar_id_is_treated_as_missing() {
        let mut product = Product {
            id: ProductId(7),
            webinar_id: Some("   ".into()),
            start_time: None,
        };
        assert_eq!(product.webinar_id(), None);

        product.webinar_id = None;
        assert_eq!(product.webinar_id(), None);

        product.webinar_id = Some(" 81234567890 ".into());
        assert_eq!(product.webinar_id(), Some("81234567890"));
    }

    #[test]
    fn rescheduled_task_keeps_identity() {
        let task = RegistrationTask::new(OrderId(1), ItemId(2));
        assert_eq!(task.previous_status_code, 0);

        let retried = task.carrying(-1);
        assert_eq!(retried.previous_status_code, -1);
        assert_eq!(retried.key(), task.key());
    }

    #[test]
    fn join_url_meta_key_format() {
        assert_eq!(join_url_meta_key(ProductId(42)), "product_42_join_url");
    }

    #[test]
    fn audit_update_builder_sets_only_named_fields() {
        let update = AuditUpdate::default()
            .bearer_token("Token Not Found in Cache")
            .bearer_token_status_code(200);
        assert!(!update.is_empty());
        assert_eq!(update.bearer_token_status_code.as_deref(), Some("200"));
        assert!(update.join_url.is_none());
        assert!(AuditUpdate::default().is_empty());
    }

    #[test]
    fn ids_serialize_transparently() {
        let event = JoinLinkReady {
            order_id: OrderId(10),
            item_id: ItemId(11),
            user_id: UserId(12),
            join_url: "https://x.test/j/1".into(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["order_id"], 10);
        assert_eq!(json["join_url"], "https://x.test/j/1");
    }
}

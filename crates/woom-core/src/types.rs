// SPDX-FileCopyrightText: 2026 Woom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared by the scheduler, the orchestrator, and the adapters.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<$name> for u64 {
            fn from(id: $name) -> u64 {
                id.0
            }
        }
    };
}

numeric_id!(
    /// Commerce order identifier.
    OrderId
);
numeric_id!(
    /// Order line item identifier.
    ItemId
);
numeric_id!(
    /// Product identifier.
    ProductId
);
numeric_id!(
    /// Customer (user) identifier.
    UserId
);

/// Metadata key under which a join link is stored, both on the customer
/// profile and on the order line item.
pub fn join_url_meta_key(product_id: ProductId) -> String {
    format!("product_{product_id}_join_url")
}

/// One unit of deferred work: "process this order line item".
///
/// Only the identifiers travel with the task; product and customer state is
/// re-read when the task fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RegistrationTask {
    pub order_id: OrderId,
    pub item_id: ItemId,
    /// Status code of the previous failed attempt (`0` for a first attempt,
    /// `-1` for a transport failure).
    pub previous_status_code: i64,
}

impl RegistrationTask {
    pub fn new(order_id: OrderId, item_id: ItemId) -> Self {
        Self {
            order_id,
            item_id,
            previous_status_code: 0,
        }
    }

    /// Same task carrying a different status code, used when rescheduling.
    pub fn carrying(self, status_code: i64) -> Self {
        Self {
            previous_status_code: status_code,
            ..self
        }
    }

    /// Identity of the task, ignoring the carried status code.
    pub fn key(&self) -> (OrderId, ItemId) {
        (self.order_id, self.item_id)
    }
}

/// A line item on an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub item_id: ItemId,
    pub product_id: ProductId,
}

/// An order as read from the commerce store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub customer_id: UserId,
    pub items: Vec<LineItem>,
}

impl Order {
    pub fn item(&self, item_id: ItemId) -> Option<&LineItem> {
        self.items.iter().find(|item| item.item_id == item_id)
    }
}

/// Product metadata relevant to webinar registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    /// Raw webinar identifier metadata; may be absent or blank.
    pub webinar_id: Option<String>,
    /// Scheduled start of the webinar.
    pub start_time: Option<DateTime<Utc>>,
}

impl Product {
    /// The webinar identifier, if the product carries a non-blank one.
    pub fn webinar_id(&self) -> Option<&str> {
        self.webinar_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }
}

/// Customer profile fields used for registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: UserId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

/// Registrant payload sent to the webinar platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attendee {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl From<&Customer> for Attendee {
    fn from(customer: &Customer) -> Self {
        Self {
            email: customer.email.clone(),
            first_name: customer.first_name.clone(),
            last_name: customer.last_name.clone(),
        }
    }
}

/// Payload of the "join link ready" callback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinLinkReady {
    pub order_id: OrderId,
    pub item_id: ItemId,
    pub user_id: UserId,
    pub join_url: String,
}

/// Fields written when an audit record is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAuditRecord {
    pub user_id: UserId,
    pub order_id: OrderId,
    pub item_id: ItemId,
    pub product_id: ProductId,
    pub webinar_id: String,
    pub cron_date: DateTime<Utc>,
    pub calling_function: String,
}

/// A partial amendment to an audit record. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditUpdate {
    pub request_data: Option<String>,
    pub response_data: Option<String>,
    pub request_headers: Option<String>,
    pub bearer_token: Option<String>,
    pub bearer_token_status_code: Option<String>,
    pub response_status_code: Option<String>,
    pub join_url: Option<String>,
}

impl AuditUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn request_data(mut self, value: impl Into<String>) -> Self {
        self.request_data = Some(value.into());
        self
    }

    pub fn response_data(mut self, value: impl Into<String>) -> Self {
        self.response_data = Some(value.into());
        self
    }

    pub fn request_headers(mut self, value: impl Into<String>) -> Self {
        self.request_headers = Some(value.into());
        self
    }

    pub fn bearer_token(mut self, value: impl Into<String>) -> Self {
        self.bearer_token = Some(value.into());
        self
    }

    pub fn bearer_token_status_code(mut self, status: impl ToString) -> Self {
        self.bearer_token_status_code = Some(status.to_string());
        self
    }

    pub fn response_status_code(mut self, status: impl ToString) -> Self {
        self.response_status_code = Some(status.to_string());
        self
    }

    pub fn join_url(mut self, value: impl Into<String>) -> Self {
        self.join_url = Some(value.into());
        self
    }
}

/// A stored audit record: one row per processing attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub id: i64,
    pub user_id: UserId,
    pub order_id: OrderId,
    pub item_id: ItemId,
    pub product_id: ProductId,
    pub webinar_id: String,
    pub cron_date: DateTime<Utc>,
    pub calling_function: Option<String>,
    pub request_data: Option<String>,
    pub response_data: Option<String>,
    pub request_headers: Option<String>,
    pub bearer_token: Option<String>,
    pub bearer_token_status_code: Option<String>,
    pub response_status_code: Option<String>,
    pub join_url: Option<String>,
}

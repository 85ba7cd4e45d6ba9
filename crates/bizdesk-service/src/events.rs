//! # Domain Events
//!
//! Explicit triggers for follow-up rules, handled by
//! [`OrderService::dispatch`](crate::orders::OrderService::dispatch).
//!
//! ```text
//! create_order ──► OrderCreated { order_id } ──► auto-accept that order
//!
//! update_service ──► ServiceConfigChanged { segment }
//!                        └──► auto-accept every pending order of the segment
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use bizdesk_core::BusinessSegment;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DomainEvent {
    #[serde(rename_all = "camelCase")]
    OrderCreated { order_id: String },
    ServiceConfigChanged { segment: BusinessSegment },
}

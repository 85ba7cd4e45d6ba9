//! # Notifications
//!
//! Best-effort side effects: the new-order chime, stock alert toasts,
//! status badges. A failing notifier never fails the operation that
//! triggered it; services route every call through [`notify_best_effort`].

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};
use ts_rs::TS;

use bizdesk_core::{BusinessSegment, OrderStatus, StockAlert};

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Notification channel unavailable: {0}")]
    Unavailable(String),

    #[error("Notifications are disabled")]
    Disabled,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notification {
    #[serde(rename_all = "camelCase")]
    NewOrder {
        order_id: String,
        number: u32,
        segment: BusinessSegment,
    },
    #[serde(rename_all = "camelCase")]
    StatusChanged {
        order_id: String,
        number: u32,
        status: OrderStatus,
    },
    StockAlert(StockAlert),
}

/// Where notifications go. Implementations must not block for long.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: &Notification) -> Result<(), NotifyError>;
}

/// Writes notifications to the log; `sound` is reported so a shell can
/// decide whether to chime.
#[derive(Debug, Clone, Copy)]
pub struct LogNotifier {
    pub sound: bool,
}

impl Notifier for LogNotifier {
    fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        match notification {
            Notification::NewOrder {
                order_id,
                number,
                segment,
            } => info!(
                order_id = %order_id,
                number,
                segment = %segment,
                sound = self.sound,
                "New order"
            ),
            Notification::StatusChanged {
                order_id,
                number,
                status,
            } => info!(order_id = %order_id, number, status = %status, "Order status changed"),
            Notification::StockAlert(alert) => info!(
                item_id = %alert.item_id,
                stock = alert.stock,
                severity = ?alert.severity,
                "Stock alert"
            ),
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify(&self, _notification: &Notification) -> Result<(), NotifyError> {
        Ok(())
    }
}

/// Sends and swallows any failure with a warning.
pub fn notify_best_effort(notifier: &dyn Notifier, notification: Notification) {
    if let Err(e) = notifier.notify(&notification) {
        warn!(error = %e, ?notification, "Notification dropped");
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::Mutex;

    /// Remembers everything it was asked to send.
    #[derive(Default)]
    pub struct RecordingNotifier {
        pub sent: Mutex<Vec<Notification>>,
    }

    impl RecordingNotifier {
        pub fn sent(&self) -> Vec<Notification> {
            self.sent.lock().unwrap().clone()
        }
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
            self.sent.lock().unwrap().push(notification.clone());
            Ok(())
        }
    }

    pub struct FailingNotifier;

    impl Notifier for FailingNotifier {
        fn notify(&self, _notification: &Notification) -> Result<(), NotifyError> {
            Err(NotifyError::Unavailable("speaker unplugged".to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;

    #[test]
    fn test_best_effort_swallows_failure() {
        notify_best_effort(
            &FailingNotifier,
            Notification::NewOrder {
                order_id: "o-1".to_string(),
                number: 1,
                segment: BusinessSegment::Restaurant,
            },
        );
    }

    #[test]
    fn test_notification_wire_format() {
        let json = serde_json::to_value(Notification::StatusChanged {
            order_id: "o-1".to_string(),
            number: 7,
            status: OrderStatus::Ready,
        })
        .unwrap();
        assert_eq!(json["type"], "status_changed");
        assert_eq!(json["status"], "ready");
        assert_eq!(json["orderId"], "o-1");
    }

    #[test]
    fn test_recording_notifier() {
        let notifier = RecordingNotifier::default();
        notify_best_effort(
            &notifier,
            Notification::NewOrder {
                order_id: "o-2".to_string(),
                number: 2,
                segment: BusinessSegment::Delivery,
            },
        );
        assert_eq!(notifier.sent().len(), 1);
    }
}

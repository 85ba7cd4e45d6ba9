//! # Business Configuration
//!
//! Per-tenant settings: which business segments are enabled, which of them
//! auto-accept incoming orders, and the thresholds used by stock alerts and
//! the customer status tags.

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::money::Money;
use crate::order::OrderStatus;
use crate::DEFAULT_TENANT_ID;

/// Business segment tag carried by catalog items and orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum BusinessSegment {
    Restaurant,
    Delivery,
    Hotel,
    Ticketing,
    Scheduling,
    Ecommerce,
}

impl BusinessSegment {
    pub const ALL: [BusinessSegment; 6] = [
        BusinessSegment::Restaurant,
        BusinessSegment::Delivery,
        BusinessSegment::Hotel,
        BusinessSegment::Ticketing,
        BusinessSegment::Scheduling,
        BusinessSegment::Ecommerce,
    ];

    /// The status an auto-accepted order jumps to.
    ///
    /// Kitchens start cooking right away; every other segment just
    /// confirms the booking or purchase.
    pub fn auto_accept_target(&self) -> OrderStatus {
        match self {
            BusinessSegment::Restaurant | BusinessSegment::Delivery => OrderStatus::Preparing,
            _ => OrderStatus::Accepted,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BusinessSegment::Restaurant => "restaurant",
            BusinessSegment::Delivery => "delivery",
            BusinessSegment::Hotel => "hotel",
            BusinessSegment::Ticketing => "ticketing",
            BusinessSegment::Scheduling => "scheduling",
            BusinessSegment::Ecommerce => "ecommerce",
        }
    }
}

impl fmt::Display for BusinessSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Settings for one segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ServiceConfig {
    pub segment: BusinessSegment,
    pub enabled: bool,
    /// Incoming pending orders skip manual approval.
    pub auto_accept: bool,
}

/// Stock alert thresholds.
///
/// ```text
///   stock == 0                          → Out
///   stock <= threshold × critical_pct%  → Critical
///   stock <= threshold                  → Low
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct StockAlertConfig {
    /// Used when an item has no threshold of its own.
    pub default_threshold: i64,
    /// Critical tier as a percentage of the threshold.
    pub critical_pct: u8,
}

impl Default for StockAlertConfig {
    fn default() -> Self {
        StockAlertConfig {
            default_threshold: 10,
            critical_pct: 50,
        }
    }
}

/// Tenant-level configuration, persisted under `business_config`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct BusinessConfig {
    pub tenant_id: String,
    pub business_name: String,
    pub services: Vec<ServiceConfig>,
    #[serde(default)]
    pub stock_alerts: StockAlertConfig,
    /// Lifetime spend from which a customer is tagged VIP.
    pub vip_threshold: Money,
}

impl Default for BusinessConfig {
    fn default() -> Self {
        BusinessConfig {
            tenant_id: DEFAULT_TENANT_ID.to_string(),
            business_name: "My Business".to_string(),
            services: BusinessSegment::ALL
                .iter()
                .map(|segment| ServiceConfig {
                    segment: *segment,
                    enabled: matches!(
                        segment,
                        BusinessSegment::Restaurant | BusinessSegment::Delivery
                    ),
                    auto_accept: false,
                })
                .collect(),
            stock_alerts: StockAlertConfig::default(),
            vip_threshold: Money::from_major(1000),
        }
    }
}

impl BusinessConfig {
    pub fn service(&self, segment: BusinessSegment) -> Option<&ServiceConfig> {
        self.services.iter().find(|s| s.segment == segment)
    }

    /// True when pending orders of this segment should be accepted
    /// without an operator.
    pub fn auto_accepts(&self, segment: BusinessSegment) -> bool {
        self.service(segment)
            .map(|s| s.enabled && s.auto_accept)
            .unwrap_or(false)
    }

    /// Replaces (or inserts) the settings of one segment.
    pub fn set_service(&mut self, config: ServiceConfig) {
        match self.services.iter_mut().find(|s| s.segment == config.segment) {
            Some(existing) => *existing = config,
            None => self.services.push(config),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_has_every_segment() {
        let config = BusinessConfig::default();
        assert_eq!(config.services.len(), BusinessSegment::ALL.len());
        assert!(!config.auto_accepts(BusinessSegment::Restaurant));
    }

    #[test]
    fn test_auto_accept_requires_enabled_segment() {
        let mut config = BusinessConfig::default();
        config.set_service(ServiceConfig {
            segment: BusinessSegment::Hotel,
            enabled: false,
            auto_accept: true,
        });
        assert!(!config.auto_accepts(BusinessSegment::Hotel));

        config.set_service(ServiceConfig {
            segment: BusinessSegment::Hotel,
            enabled: true,
            auto_accept: true,
        });
        assert!(config.auto_accepts(BusinessSegment::Hotel));
    }

    #[test]
    fn test_auto_accept_targets() {
        assert_eq!(
            BusinessSegment::Delivery.auto_accept_target(),
            OrderStatus::Preparing
        );
        assert_eq!(
            BusinessSegment::Ticketing.auto_accept_target(),
            OrderStatus::Accepted
        );
    }

    #[test]
    fn test_segment_wire_name() {
        let json = serde_json::to_string(&BusinessSegment::Ecommerce).unwrap();
        assert_eq!(json, "\"ecommerce\"");
        assert_eq!(BusinessSegment::Ecommerce.to_string(), "ecommerce");
    }
}

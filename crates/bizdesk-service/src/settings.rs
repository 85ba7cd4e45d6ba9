//! # Business Settings
//!
//! Tenant configuration behind the `ManageSettings` gate. Changing a
//! segment's service settings dispatches `ServiceConfigChanged`, so turning
//! auto-accept on moves that segment's waiting orders forward at once.

use std::sync::Arc;

use tracing::info;

use bizdesk_core::{
    Actor, BusinessConfig, ConfigRepository, CoreResult, Money, Order, Permission,
    ServiceConfig, StockAlertConfig, ValidationError,
};

use crate::events::DomainEvent;
use crate::orders::OrderService;

#[derive(Clone)]
pub struct SettingsService {
    config: Arc<dyn ConfigRepository>,
    orders: Arc<OrderService>,
}

impl SettingsService {
    pub fn new(config: Arc<dyn ConfigRepository>, orders: Arc<OrderService>) -> Self {
        SettingsService { config, orders }
    }

    pub fn business_config(&self) -> CoreResult<BusinessConfig> {
        self.config.business_config()
    }

    /// Saves one segment's settings and returns the orders auto-accepted
    /// as a consequence.
    pub fn update_service(&self, service: ServiceConfig, actor: &Actor) -> CoreResult<Vec<Order>> {
        actor.require(Permission::ManageSettings)?;

        let mut config = self.config.business_config()?;
        config.set_service(service.clone());
        self.config.save_business_config(&config)?;
        info!(
            segment = %service.segment,
            enabled = service.enabled,
            auto_accept = service.auto_accept,
            actor = %actor.name,
            "Service settings updated"
        );

        self.orders.dispatch(&DomainEvent::ServiceConfigChanged {
            segment: service.segment,
        })
    }

    /// Replaces the business name, stock alert tiers and VIP threshold.
    /// Service settings go through [`update_service`](Self::update_service).
    pub fn update_business(
        &self,
        business_name: &str,
        stock_alerts: StockAlertConfig,
        vip_threshold: Money,
        actor: &Actor,
    ) -> CoreResult<BusinessConfig> {
        actor.require(Permission::ManageSettings)?;

        let business_name = business_name.trim();
        if business_name.is_empty() {
            return Err(ValidationError::Required {
                field: "business name".to_string(),
            }
            .into());
        }
        if stock_alerts.default_threshold < 0 || stock_alerts.critical_pct > 100 {
            return Err(ValidationError::OutOfRange {
                field: "stock alerts".to_string(),
                min: 0,
                max: 100,
            }
            .into());
        }
        if vip_threshold.is_negative() {
            return Err(ValidationError::MustBePositive {
                field: "VIP threshold".to_string(),
            }
            .into());
        }

        let mut config = self.config.business_config()?;
        config.business_name = business_name.to_string();
        config.stock_alerts = stock_alerts;
        config.vip_threshold = vip_threshold;
        self.config.save_business_config(&config)?;
        info!(business = %config.business_name, actor = %actor.name, "Business settings updated");
        Ok(config)
    }
}

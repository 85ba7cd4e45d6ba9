//! # Reports and Receipts
//!
//! Read-only views: sales summaries for a period, the customer receipt of
//! one order and the register snapshot printout. Nothing here mutates.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use bizdesk_core::{
    render_receipt, render_register_report, Actor, ConfigRepository, CoreResult,
    LedgerRepository, OrderFilter, Permission, PrinterConfig, Receipt, SalesSummary,
};

use crate::orders::OrderService;

#[derive(Clone)]
pub struct ReportService {
    orders: Arc<OrderService>,
    ledger: Arc<dyn LedgerRepository>,
    config: Arc<dyn ConfigRepository>,
    printer: PrinterConfig,
}

impl ReportService {
    pub fn new(
        orders: Arc<OrderService>,
        ledger: Arc<dyn LedgerRepository>,
        config: Arc<dyn ConfigRepository>,
        printer: PrinterConfig,
    ) -> Self {
        ReportService {
            orders,
            ledger,
            config,
            printer,
        }
    }

    /// Orders created in `[from, to)`.
    pub fn sales_summary(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        actor: &Actor,
    ) -> CoreResult<SalesSummary> {
        actor.require(Permission::ViewReports)?;
        let orders = self.orders.list_orders(&OrderFilter::default())?;
        let summary = SalesSummary::from_orders(&orders, from, to);
        debug!(
            from = %from,
            to = %to,
            orders = summary.total_orders,
            net = %summary.net_sales,
            "Sales summary built"
        );
        Ok(summary)
    }

    /// Any role may reprint a receipt.
    pub fn order_receipt(&self, order_id: &str) -> CoreResult<Receipt> {
        let order = self.orders.get_order(order_id)?;
        let printer = self.printer_for_business()?;
        Ok(render_receipt(&order, &printer))
    }

    pub fn register_report(&self, actor: &Actor) -> CoreResult<Receipt> {
        actor.require(Permission::OperateRegister)?;
        let register = self.ledger.register()?;
        let printer = self.printer_for_business()?;
        Ok(render_register_report(&register, &printer))
    }

    /// The business name heads the receipt unless a header is configured.
    fn printer_for_business(&self) -> CoreResult<PrinterConfig> {
        let mut printer = self.printer.clone();
        if printer.header.is_none() {
            printer.header = Some(self.config.business_config()?.business_name);
        }
        Ok(printer)
    }
}

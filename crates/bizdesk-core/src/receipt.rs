//! # Receipt Layout
//!
//! Receipts are produced as structured lines (text, alignment, emphasis)
//! fitted to the printer's column count. Nothing here talks to a printer;
//! the front end decides how to print the lines.
//!
//! ```text
//! ┌────────────────────────────────┐
//! │          Bella Cucina          │  header (bold, centered)
//! │ Order #42      2026-10-19 12:30│  line_lr
//! │--------------------------------│
//! │ 2x Margherita            $50.00│
//! │--------------------------------│
//! │ TOTAL                    $50.00│
//! │ cash                     $50.00│
//! │      Thank you, come back!     │  footer
//! └────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::order::{Order, OrderStatus, PaymentDetail};
use crate::register::{CashRegister, TransactionKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum FontSize {
    Small,
    Normal,
    Large,
}

/// Printer settings held by the service configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", default)]
pub struct PrinterConfig {
    /// Paper roll width in millimetres (58 or 80).
    pub paper_width_mm: u16,
    pub font_size: FontSize,
    pub header: Option<String>,
    pub footer: Option<String>,
    pub copies: u8,
}

impl Default for PrinterConfig {
    fn default() -> Self {
        PrinterConfig {
            paper_width_mm: 80,
            font_size: FontSize::Normal,
            header: None,
            footer: Some("Thank you, come back!".to_string()),
            copies: 1,
        }
    }
}

impl PrinterConfig {
    /// Characters per line for this paper and font.
    pub fn columns(&self) -> usize {
        let base = if self.paper_width_mm <= 58 { 32 } else { 48 };
        match self.font_size {
            FontSize::Small => base * 4 / 3,
            FontSize::Normal => base,
            FontSize::Large => base / 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ReceiptAlign {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptLine {
    pub text: String,
    pub align: ReceiptAlign,
    pub bold: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    pub width: usize,
    pub copies: u8,
    pub lines: Vec<ReceiptLine>,
}

impl Receipt {
    /// Monospace rendering of one copy, padded per alignment.
    pub fn to_plain_text(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            let len = line.text.chars().count();
            let pad = self.width.saturating_sub(len);
            let (left, right) = match line.align {
                ReceiptAlign::Left => (0, pad),
                ReceiptAlign::Center => (pad / 2, pad - pad / 2),
                ReceiptAlign::Right => (pad, 0),
            };
            out.push_str(&" ".repeat(left));
            out.push_str(&line.text);
            out.push_str(&" ".repeat(right));
            out.push('\n');
        }
        out
    }
}

struct ReceiptBuilder {
    width: usize,
    lines: Vec<ReceiptLine>,
}

impl ReceiptBuilder {
    fn new(width: usize) -> Self {
        ReceiptBuilder {
            width,
            lines: Vec::new(),
        }
    }

    fn fit(&self, text: &str) -> String {
        text.chars().take(self.width).collect()
    }

    fn push(&mut self, text: &str, align: ReceiptAlign, bold: bool) {
        let text = self.fit(text);
        self.lines.push(ReceiptLine { text, align, bold });
    }

    fn center(&mut self, text: &str) {
        self.push(text, ReceiptAlign::Center, false);
    }

    fn title(&mut self, text: &str) {
        self.push(text, ReceiptAlign::Center, true);
    }

    fn left(&mut self, text: &str) {
        self.push(text, ReceiptAlign::Left, false);
    }

    /// Left and right text on one line; the left side is cut to make room.
    fn line_lr(&mut self, left: &str, right: &str, bold: bool) {
        let right_len = right.chars().count().min(self.width);
        let room = self.width.saturating_sub(right_len + 1);
        let left: String = left.chars().take(room).collect();
        let gap = self.width - left.chars().count() - right_len;
        let text = format!("{}{}{}", left, " ".repeat(gap), right);
        self.push(&text, ReceiptAlign::Left, bold);
    }

    fn sep(&mut self) {
        let rule = "-".repeat(self.width);
        self.push(&rule, ReceiptAlign::Left, false);
    }

    fn build(self, copies: u8) -> Receipt {
        Receipt {
            width: self.width,
            copies: copies.max(1),
            lines: self.lines,
        }
    }
}

/// Customer receipt for an order.
pub fn render_receipt(order: &Order, config: &PrinterConfig) -> Receipt {
    let mut b = ReceiptBuilder::new(config.columns());

    if let Some(header) = &config.header {
        for line in header.lines() {
            b.title(line);
        }
    }
    match order.status {
        OrderStatus::Cancelled | OrderStatus::Rejected => b.title("*** VOID ***"),
        OrderStatus::Returned => b.title("*** RETURNED ***"),
        _ => {}
    }

    b.line_lr(
        &format!("Order #{}", order.number),
        &order.created_at.format("%Y-%m-%d %H:%M").to_string(),
        false,
    );
    if !order.customer.name.is_empty() {
        b.left(&format!("Customer: {}", order.customer.name));
    }
    b.sep();

    for item in &order.items {
        b.line_lr(
            &format!("{}x {}", item.quantity, item.name),
            &item.line_total().to_string(),
            false,
        );
        if item.quantity > 1 {
            b.left(&format!("   @ {}", item.unit_price));
        }
        if item.returned_quantity > 0 {
            b.left(&format!("   returned {}", item.returned_quantity));
        }
    }
    b.sep();

    if !order.discount.is_zero() {
        b.line_lr("Subtotal", &order.total.to_string(), false);
        b.line_lr("Discount", &format!("-{}", order.discount), false);
    }
    b.line_lr("TOTAL", &order.amount_due().to_string(), true);

    match &order.payment {
        PaymentDetail::Single {
            method,
            installments,
        } => {
            b.line_lr(
                &installment_label(method.as_str(), *installments),
                &order.amount_due().to_string(),
                false,
            );
        }
        PaymentDetail::Split { legs } => {
            for leg in legs {
                b.line_lr(
                    &installment_label(leg.method.as_str(), leg.installments),
                    &leg.amount.to_string(),
                    false,
                );
            }
        }
    }

    if let Some(footer) = &config.footer {
        for line in footer.lines() {
            b.center(line);
        }
    }
    b.build(config.copies)
}

fn installment_label(method: &str, installments: u8) -> String {
    if installments > 1 {
        format!("{} ({}x)", method, installments)
    } else {
        method.to_string()
    }
}

/// Snapshot of the register: shift status, totals per kind and the ledger.
pub fn render_register_report(register: &CashRegister, config: &PrinterConfig) -> Receipt {
    let mut b = ReceiptBuilder::new(config.columns());

    if let Some(header) = &config.header {
        for line in header.lines() {
            b.title(line);
        }
    }
    b.title("REGISTER REPORT");
    b.left(if register.is_open {
        "Status: OPEN"
    } else {
        "Status: CLOSED"
    });
    if let (Some(by), Some(at)) = (&register.opened_by, register.opened_at) {
        b.line_lr(
            &format!("Opened by {}", by),
            &at.format("%Y-%m-%d %H:%M").to_string(),
            false,
        );
    }
    if let Some(at) = register.closed_at {
        b.line_lr("Closed", &at.format("%Y-%m-%d %H:%M").to_string(), false);
    }
    b.sep();

    let rows: [(&str, Money); 4] = [
        ("Opening float", register.start_amount),
        ("Sales", register.total(TransactionKind::Sale)),
        ("Supplies", register.total(TransactionKind::Supply)),
        ("Bleeds", register.total(TransactionKind::Bleed)),
    ];
    for (label, amount) in rows {
        b.line_lr(label, &amount.to_string(), false);
    }
    b.line_lr("BALANCE", &register.current_balance.to_string(), true);
    b.sep();

    // Oldest first reads naturally on paper.
    for tx in register.transactions.iter().rev() {
        b.line_lr(
            &format!("{} {}", tx.created_at.format("%H:%M"), tx.kind),
            &tx.amount.to_string(),
            false,
        );
        if !tx.description.is_empty() {
            b.left(&format!("  {}", tx.description));
        }
    }
    b.build(config.copies)
}

//! # Cash Register Ledger
//!
//! Per-shift cash drawer: opening float, sales, supplies (cash in),
//! bleeds (cash out) and a closing snapshot.
//!
//! ## Shift Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   CLOSED ──open(100)──► OPEN ──close()──► CLOSED                        │
//! │                          │                  │                           │
//! │         supply / bleed / sale               └─► ClosedShift (archived)  │
//! │                                                                         │
//! │  Ledger (newest first, append-only):                                    │
//! │    closing  $120.00   ← snapshot of the balance, not a delta            │
//! │    bleed     $30.00                                                     │
//! │    supply    $50.00                                                     │
//! │    opening  $100.00                                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `current_balance` is a maintained running total. [`CashRegister::ledger_balance`]
//! recomputes it from the entries so the two can be audited against each other.
//!
//! Reopening starts a fresh ledger; the previous shift leaves the register
//! through the [`ClosedShift`] returned by [`CashRegister::close`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;

/// Kind of ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Opening,
    Closing,
    Sale,
    Supply,
    Bleed,
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TransactionKind::Opening => "opening",
            TransactionKind::Closing => "closing",
            TransactionKind::Sale => "sale",
            TransactionKind::Supply => "supply",
            TransactionKind::Bleed => "bleed",
        };
        f.write_str(s)
    }
}

/// Manual drawer movements an operator can record.
///
/// The sign lives in the kind, never in the amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum CashMovement {
    Supply,
    Bleed,
}

impl From<CashMovement> for TransactionKind {
    fn from(m: CashMovement) -> Self {
        match m {
            CashMovement::Supply => TransactionKind::Supply,
            CashMovement::Bleed => TransactionKind::Bleed,
        }
    }
}

/// One immutable ledger entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CashTransaction {
    pub id: String,
    pub kind: TransactionKind,
    /// Always a positive magnitude (zero only for an empty opening/closing).
    pub amount: Money,
    pub description: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    pub actor: String,
}

impl CashTransaction {
    fn new(kind: TransactionKind, amount: Money, description: &str, actor: &str) -> Self {
        CashTransaction {
            id: Uuid::new_v4().to_string(),
            kind,
            amount,
            description: description.to_string(),
            created_at: Utc::now(),
            actor: actor.to_string(),
        }
    }
}

/// A finished shift, archived under `register_history`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ClosedShift {
    #[ts(as = "String")]
    pub opened_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub closed_at: DateTime<Utc>,
    pub opened_by: String,
    pub closed_by: String,
    pub start_amount: Money,
    pub closing_balance: Money,
    pub transactions: Vec<CashTransaction>,
}

impl ClosedShift {
    /// Sum of every entry of the given kind in this shift.
    pub fn total(&self, kind: TransactionKind) -> Money {
        self.transactions
            .iter()
            .filter(|t| t.kind == kind)
            .map(|t| t.amount)
            .sum()
    }
}

/// Register state, persisted under `cash_register`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CashRegister {
    pub is_open: bool,
    #[ts(as = "Option<String>")]
    pub opened_at: Option<DateTime<Utc>>,
    #[ts(as = "Option<String>")]
    pub closed_at: Option<DateTime<Utc>>,
    pub opened_by: Option<String>,
    pub start_amount: Money,
    pub current_balance: Money,
    /// Newest first.
    pub transactions: Vec<CashTransaction>,
}

impl Default for CashRegister {
    /// A register starts closed with an empty ledger.
    fn default() -> Self {
        CashRegister {
            is_open: false,
            opened_at: None,
            closed_at: None,
            opened_by: None,
            start_amount: Money::zero(),
            current_balance: Money::zero(),
            transactions: Vec::new(),
        }
    }
}

impl CashRegister {
    fn require_open(&self) -> CoreResult<()> {
        if !self.is_open {
            return Err(CoreError::RegisterClosed);
        }
        Ok(())
    }

    fn push(&mut self, tx: CashTransaction) -> CashTransaction {
        self.transactions.insert(0, tx.clone());
        tx
    }

    /// Opens a new shift with `start_amount` in the drawer.
    pub fn open(&mut self, start_amount: Money, actor: &str) -> CoreResult<CashTransaction> {
        if self.is_open {
            return Err(CoreError::RegisterAlreadyOpen);
        }
        if start_amount.is_negative() {
            return Err(CoreError::InvalidAmount {
                amount: start_amount,
                reason: "opening float cannot be negative".to_string(),
            });
        }

        let now = Utc::now();
        self.is_open = true;
        self.opened_at = Some(now);
        self.closed_at = None;
        self.opened_by = Some(actor.to_string());
        self.start_amount = start_amount;
        self.current_balance = start_amount;
        self.transactions.clear();

        Ok(self.push(CashTransaction::new(
            TransactionKind::Opening,
            start_amount,
            "Register opened",
            actor,
        )))
    }

    /// Closes the shift. The closing entry carries the balance at this moment.
    pub fn close(&mut self, actor: &str) -> CoreResult<ClosedShift> {
        self.require_open()?;

        let now = Utc::now();
        let balance = self.current_balance;
        self.push(CashTransaction::new(
            TransactionKind::Closing,
            balance,
            "Register closed",
            actor,
        ));
        self.is_open = false;
        self.closed_at = Some(now);

        Ok(ClosedShift {
            opened_at: self.opened_at.unwrap_or(now),
            closed_at: now,
            opened_by: self.opened_by.clone().unwrap_or_default(),
            closed_by: actor.to_string(),
            start_amount: self.start_amount,
            closing_balance: balance,
            transactions: self.transactions.clone(),
        })
    }

    /// Records a supply (adds) or bleed (subtracts).
    ///
    /// A bleed larger than the balance is rejected, not clamped.
    pub fn add_movement(
        &mut self,
        movement: CashMovement,
        amount: Money,
        description: &str,
        actor: &str,
    ) -> CoreResult<CashTransaction> {
        self.require_open()?;
        if !amount.is_positive() {
            return Err(CoreError::InvalidAmount {
                amount,
                reason: "must be greater than zero".to_string(),
            });
        }

        match movement {
            CashMovement::Supply => self.current_balance += amount,
            CashMovement::Bleed => {
                self.ensure_can_withdraw(amount)?;
                self.current_balance -= amount;
            }
        }

        Ok(self.push(CashTransaction::new(
            movement.into(),
            amount,
            description,
            actor,
        )))
    }

    /// Records a sale paid into the drawer.
    pub fn register_sale(
        &mut self,
        amount: Money,
        description: &str,
        actor: &str,
    ) -> CoreResult<CashTransaction> {
        self.require_open()?;
        if !amount.is_positive() {
            return Err(CoreError::InvalidAmount {
                amount,
                reason: "sale amount must be greater than zero".to_string(),
            });
        }
        self.current_balance += amount;
        Ok(self.push(CashTransaction::new(
            TransactionKind::Sale,
            amount,
            description,
            actor,
        )))
    }

    /// Fails with `InsufficientRegisterBalance` if `amount` exceeds the drawer.
    pub fn ensure_can_withdraw(&self, amount: Money) -> CoreResult<()> {
        if amount > self.current_balance {
            return Err(CoreError::InsufficientRegisterBalance {
                available: self.current_balance,
                requested: amount,
            });
        }
        Ok(())
    }

    /// Balance recomputed from the ledger:
    /// `start + Σ(supply + sale) − Σ(bleed)`.
    pub fn ledger_balance(&self) -> Money {
        self.transactions
            .iter()
            .fold(self.start_amount, |acc, tx| match tx.kind {
                TransactionKind::Supply | TransactionKind::Sale => acc + tx.amount,
                TransactionKind::Bleed => acc - tx.amount,
                TransactionKind::Opening | TransactionKind::Closing => acc,
            })
    }

    /// Sum of every entry of the given kind in the current shift.
    pub fn total(&self, kind: TransactionKind) -> Money {
        self.transactions
            .iter()
            .filter(|t| t.kind == kind)
            .map(|t| t.amount)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn open_register(start: i64) -> CashRegister {
        let mut register = CashRegister::default();
        register.open(Money::from_cents(start), "Ana").unwrap();
        register
    }

    #[test]
    fn test_register_starts_closed() {
        let register = CashRegister::default();
        assert!(!register.is_open);
        assert!(register.transactions.is_empty());
    }

    #[test]
    fn test_supply_bleed_then_close_snapshot() {
        let mut register = open_register(10_000);
        register
            .add_movement(CashMovement::Supply, Money::from_cents(5_000), "change", "Ana")
            .unwrap();
        register
            .add_movement(CashMovement::Bleed, Money::from_cents(3_000), "supplier", "Ana")
            .unwrap();
        assert_eq!(register.current_balance, Money::from_cents(12_000));

        let shift = register.close("Ana").unwrap();
        assert!(!register.is_open);
        let closing = &register.transactions[0];
        assert_eq!(closing.kind, TransactionKind::Closing);
        assert_eq!(closing.amount, Money::from_cents(12_000));
        assert_eq!(shift.closing_balance, Money::from_cents(12_000));
        assert_eq!(shift.transactions.len(), 4);
        assert_eq!(shift.total(TransactionKind::Bleed), Money::from_cents(3_000));
    }

    #[test]
    fn test_transactions_are_newest_first() {
        let mut register = open_register(0);
        register
            .register_sale(Money::from_cents(500), "Order #1", "Ana")
            .unwrap();
        let kinds: Vec<TransactionKind> = register.transactions.iter().map(|t| t.kind).collect();
        assert_eq!(kinds, vec![TransactionKind::Sale, TransactionKind::Opening]);
    }

    #[test]
    fn test_operations_require_open_register() {
        let mut register = CashRegister::default();
        assert!(matches!(
            register.register_sale(Money::from_cents(100), "x", "Ana"),
            Err(CoreError::RegisterClosed)
        ));
        assert!(matches!(
            register.add_movement(CashMovement::Supply, Money::from_cents(100), "x", "Ana"),
            Err(CoreError::RegisterClosed)
        ));
        assert!(matches!(register.close("Ana"), Err(CoreError::RegisterClosed)));
    }

    #[test]
    fn test_open_twice_fails() {
        let mut register = open_register(100);
        assert!(matches!(
            register.open(Money::from_cents(100), "Ana"),
            Err(CoreError::RegisterAlreadyOpen)
        ));
    }

    #[test]
    fn test_bleed_beyond_balance_rejected_without_mutation() {
        let mut register = open_register(1_000);
        let err = register
            .add_movement(CashMovement::Bleed, Money::from_cents(1_001), "x", "Ana")
            .unwrap_err();
        assert!(matches!(err, CoreError::InsufficientRegisterBalance { .. }));
        assert_eq!(register.current_balance, Money::from_cents(1_000));
        assert_eq!(register.transactions.len(), 1);
    }

    #[test]
    fn test_non_positive_amounts_rejected() {
        let mut register = open_register(1_000);
        assert!(register
            .add_movement(CashMovement::Supply, Money::zero(), "x", "Ana")
            .is_err());
        assert!(register
            .register_sale(Money::from_cents(-5), "x", "Ana")
            .is_err());
    }

    #[test]
    fn test_reopen_starts_fresh_ledger() {
        let mut register = open_register(1_000);
        register
            .register_sale(Money::from_cents(250), "Order #1", "Ana")
            .unwrap();
        register.close("Ana").unwrap();

        register.open(Money::from_cents(500), "Bruno").unwrap();
        assert_eq!(register.transactions.len(), 1);
        assert_eq!(register.current_balance, Money::from_cents(500));
        assert_eq!(register.opened_by.as_deref(), Some("Bruno"));
        assert!(register.closed_at.is_none());
    }

    #[derive(Debug, Clone)]
    enum LedgerOp {
        Supply(i64),
        Bleed(i64),
        Sale(i64),
        Close,
        Open(i64),
    }

    fn ledger_op() -> impl Strategy<Value = LedgerOp> {
        prop_oneof![
            (1_i64..10_000).prop_map(LedgerOp::Supply),
            (1_i64..10_000).prop_map(LedgerOp::Bleed),
            (1_i64..10_000).prop_map(LedgerOp::Sale),
            Just(LedgerOp::Close),
            (0_i64..10_000).prop_map(LedgerOp::Open),
        ]
    }

    proptest! {
        #[test]
        fn balance_always_matches_ledger(
            start in 0_i64..10_000,
            ops in proptest::collection::vec(ledger_op(), 0..50)
        ) {
            let mut register = open_register(start);
            for op in ops {
                // Rejected operations are fine; they must simply leave no trace.
                let _ = match op {
                    LedgerOp::Supply(c) => register
                        .add_movement(CashMovement::Supply, Money::from_cents(c), "s", "p")
                        .map(|_| ()),
                    LedgerOp::Bleed(c) => register
                        .add_movement(CashMovement::Bleed, Money::from_cents(c), "b", "p")
                        .map(|_| ()),
                    LedgerOp::Sale(c) => register
                        .register_sale(Money::from_cents(c), "o", "p")
                        .map(|_| ()),
                    LedgerOp::Close => register.close("p").map(|_| ()),
                    LedgerOp::Open(c) => register.open(Money::from_cents(c), "p").map(|_| ()),
                };
                prop_assert_eq!(register.current_balance, register.ledger_balance());
                prop_assert!(!register.current_balance.is_negative());
            }
        }
    }
}

//! # Register Service
//!
//! Role-gated access to the cash register.
//!
//! | Operation       | Permission        | Cashier |
//! |-----------------|-------------------|---------|
//! | open / close    | `OperateRegister` | yes     |
//! | supply / bleed  | `CashMovements`   | no      |
//! | shift history   | `ViewReports`     | no      |
//!
//! Sales are not recorded here; they arrive through order creation.

use std::sync::Arc;

use serde::Serialize;
use ts_rs::TS;

use bizdesk_core::{
    Actor, CashMovement, CashRegister, CashTransaction, ClosedShift, CoreResult,
    LedgerRepository, Money, Permission, TransactionKind,
};

/// Figures for the register card on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RegisterSummary {
    pub is_open: bool,
    pub start_amount: Money,
    pub balance: Money,
    pub sales: Money,
    pub supplies: Money,
    pub bleeds: Money,
    pub entries: usize,
}

impl From<&CashRegister> for RegisterSummary {
    fn from(register: &CashRegister) -> Self {
        RegisterSummary {
            is_open: register.is_open,
            start_amount: register.start_amount,
            balance: register.current_balance,
            sales: register.total(TransactionKind::Sale),
            supplies: register.total(TransactionKind::Supply),
            bleeds: register.total(TransactionKind::Bleed),
            entries: register.transactions.len(),
        }
    }
}

#[derive(Clone)]
pub struct RegisterService {
    ledger: Arc<dyn LedgerRepository>,
}

impl RegisterService {
    pub fn new(ledger: Arc<dyn LedgerRepository>) -> Self {
        RegisterService { ledger }
    }

    pub fn current(&self) -> CoreResult<CashRegister> {
        self.ledger.register()
    }

    pub fn summary(&self) -> CoreResult<RegisterSummary> {
        Ok(RegisterSummary::from(&self.ledger.register()?))
    }

    pub fn open(&self, start_amount: Money, actor: &Actor) -> CoreResult<CashTransaction> {
        actor.require(Permission::OperateRegister)?;
        self.ledger.open(start_amount, &actor.name)
    }

    pub fn close(&self, actor: &Actor) -> CoreResult<ClosedShift> {
        actor.require(Permission::OperateRegister)?;
        self.ledger.close(&actor.name)
    }

    pub fn add_movement(
        &self,
        movement: CashMovement,
        amount: Money,
        description: &str,
        actor: &Actor,
    ) -> CoreResult<CashTransaction> {
        actor.require(Permission::CashMovements)?;
        self.ledger
            .add_movement(movement, amount, description, &actor.name)
    }

    /// Closed shifts, newest first.
    pub fn history(&self, actor: &Actor) -> CoreResult<Vec<ClosedShift>> {
        actor.require(Permission::ViewReports)?;
        self.ledger.history()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bizdesk_core::{CoreError, Role};
    use bizdesk_store::LocalStore;

    fn service() -> RegisterService {
        RegisterService::new(Arc::new(LocalStore::in_memory().register()))
    }

    #[test]
    fn test_shift_balance_and_close() {
        let register = service();
        let manager = Actor::new("Marta", Role::Manager);

        register.open(Money::from_major(100), &manager).unwrap();
        register
            .add_movement(CashMovement::Supply, Money::from_major(50), "Change", &manager)
            .unwrap();
        register
            .add_movement(CashMovement::Bleed, Money::from_major(30), "Safe drop", &manager)
            .unwrap();

        let summary = register.summary().unwrap();
        assert_eq!(summary.balance, Money::from_major(120));
        assert_eq!(summary.supplies, Money::from_major(50));
        assert_eq!(summary.bleeds, Money::from_major(30));

        let shift = register.close(&manager).unwrap();
        assert_eq!(shift.closing_balance, Money::from_major(120));
        assert_eq!(shift.transactions[0].kind, TransactionKind::Closing);
        assert_eq!(shift.transactions[0].amount, Money::from_major(120));
        assert!(!register.current().unwrap().is_open);
        assert_eq!(register.history(&manager).unwrap().len(), 1);
    }

    #[test]
    fn test_cashier_gates() {
        let register = service();
        let cashier = Actor::new("Caio", Role::Cashier);

        register.open(Money::from_major(20), &cashier).unwrap();
        assert!(matches!(
            register.add_movement(CashMovement::Bleed, Money::from_major(5), "Tip", &cashier),
            Err(CoreError::Unauthorized { .. })
        ));
        assert!(matches!(
            register.history(&cashier),
            Err(CoreError::Unauthorized { .. })
        ));
        register.close(&cashier).unwrap();
    }

    #[test]
    fn test_open_twice() {
        let register = service();
        let admin = Actor::new("Ana", Role::Admin);
        register.open(Money::zero(), &admin).unwrap();
        assert!(matches!(
            register.open(Money::zero(), &admin),
            Err(CoreError::RegisterAlreadyOpen)
        ));
    }
}

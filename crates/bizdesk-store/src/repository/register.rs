//! # Register Repository
//!
//! The open shift lives under `cash_register`; closed shifts are appended
//! to `register_history` (newest first) when the register closes.

use std::sync::Arc;

use tracing::{error, info};

use bizdesk_core::{
    CashMovement, CashRegister, CashTransaction, ClosedShift, CoreResult, LedgerRepository, Money,
};

use crate::snapshot::SnapshotCell;

#[derive(Clone)]
pub struct RegisterRepository {
    register: Arc<SnapshotCell<CashRegister>>,
    history: Arc<SnapshotCell<Vec<ClosedShift>>>,
}

impl RegisterRepository {
    pub fn new(
        register: Arc<SnapshotCell<CashRegister>>,
        history: Arc<SnapshotCell<Vec<ClosedShift>>>,
    ) -> Self {
        RegisterRepository { register, history }
    }
}

impl LedgerRepository for RegisterRepository {
    fn register(&self) -> CoreResult<CashRegister> {
        self.register.snapshot()
    }

    fn open(&self, start_amount: Money, actor: &str) -> CoreResult<CashTransaction> {
        let tx = self.register.update(|r| r.open(start_amount, actor))?;
        info!(actor = %actor, start_amount = %start_amount, "Register opened");
        Ok(tx)
    }

    fn close(&self, actor: &str) -> CoreResult<ClosedShift> {
        // The archive is written before the close commits, so a failed
        // archive leaves the shift open and the close can be retried.
        let shift = self.register.update(|r| {
            let shift = r.close(actor)?;
            self.history
                .update(|h| {
                    h.insert(0, shift.clone());
                    Ok(())
                })
                .map_err(|e| {
                    error!(error = %e, "Failed to archive closed shift");
                    e
                })?;
            Ok(shift)
        })?;
        info!(
            actor = %actor,
            closing_balance = %shift.closing_balance,
            entries = shift.transactions.len(),
            "Register closed"
        );
        Ok(shift)
    }

    fn add_movement(
        &self,
        movement: CashMovement,
        amount: Money,
        description: &str,
        actor: &str,
    ) -> CoreResult<CashTransaction> {
        let tx = self
            .register
            .update(|r| r.add_movement(movement, amount, description, actor))?;
        info!(kind = %tx.kind, amount = %amount, actor = %actor, "Cash movement recorded");
        Ok(tx)
    }

    fn register_sale(
        &self,
        amount: Money,
        description: &str,
        actor: &str,
    ) -> CoreResult<CashTransaction> {
        self.register
            .update(|r| r.register_sale(amount, description, actor))
    }

    fn history(&self) -> CoreResult<Vec<ClosedShift>> {
        self.history.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::error::{StoreError, StoreResult};
    use crate::storage::{MemoryStorage, SnapshotStorage, StorageKey};
    use crate::LocalStore;
    use bizdesk_core::{CashMovement, CoreError, LedgerRepository, Money, TransactionKind};

    /// Memory storage whose `register_history` writes always fail.
    struct HistoryWritesFail(Arc<MemoryStorage>);

    impl SnapshotStorage for HistoryWritesFail {
        fn read(&self, key: StorageKey) -> StoreResult<Option<String>> {
            self.0.read(key)
        }

        fn write(&self, key: StorageKey, contents: &str) -> StoreResult<()> {
            if key == StorageKey::RegisterHistory {
                return Err(StoreError::Io {
                    key: key.to_string(),
                    source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
                });
            }
            self.0.write(key, contents)
        }
    }

    #[test]
    fn test_shift_is_archived_on_close() {
        let store = LocalStore::in_memory();
        let repo = store.register();

        repo.open(Money::from_major(100), "Ana").unwrap();
        repo.add_movement(CashMovement::Supply, Money::from_major(50), "change", "Ana")
            .unwrap();
        repo.add_movement(CashMovement::Bleed, Money::from_major(30), "safe", "Ana")
            .unwrap();
        let shift = repo.close("Ana").unwrap();

        assert_eq!(shift.closing_balance, Money::from_major(120));
        assert_eq!(shift.total(TransactionKind::Closing), Money::from_major(120));

        let history = repo.history().unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].closing_balance, Money::from_major(120));
        assert!(!repo.register().unwrap().is_open);
    }

    #[test]
    fn test_reopen_starts_fresh_ledger() {
        let store = LocalStore::in_memory();
        let repo = store.register();
        repo.open(Money::from_major(100), "Ana").unwrap();
        repo.register_sale(Money::from_major(20), "Order #1", "Ana")
            .unwrap();
        repo.close("Ana").unwrap();

        repo.open(Money::from_major(10), "Bruno").unwrap();
        let register = repo.register().unwrap();
        assert_eq!(register.transactions.len(), 1);
        assert_eq!(register.current_balance, Money::from_major(10));
        assert_eq!(repo.history().unwrap()[0].transactions.len(), 3);
    }

    #[test]
    fn test_failed_bleed_is_not_persisted() {
        let store = LocalStore::in_memory();
        let repo = store.register();
        repo.open(Money::from_major(10), "Ana").unwrap();

        let err = repo
            .add_movement(CashMovement::Bleed, Money::from_major(11), "too much", "Ana")
            .unwrap_err();
        assert!(matches!(err, CoreError::InsufficientRegisterBalance { .. }));
        assert_eq!(repo.register().unwrap().transactions.len(), 1);
    }

    #[test]
    fn test_failed_archive_keeps_register_open() {
        let inner = Arc::new(MemoryStorage::new());
        let store = LocalStore::with_storage(Arc::new(HistoryWritesFail(inner.clone())));
        let repo = store.register();
        repo.open(Money::from_major(100), "Ana").unwrap();

        let err = repo.close("Ana").unwrap_err();
        assert!(matches!(err, CoreError::Persistence { .. }));
        assert!(repo.register().unwrap().is_open);
        assert!(repo.history().unwrap().is_empty());

        let reloaded = LocalStore::with_storage(inner);
        let register = reloaded.register().register().unwrap();
        assert!(register.is_open);
        assert_eq!(register.current_balance, Money::from_major(100));
    }

    #[test]
    fn test_register_and_history_survive_reload() {
        let storage = Arc::new(MemoryStorage::new());
        let first = LocalStore::with_storage(storage.clone());
        let repo = first.register();
        repo.open(Money::from_major(100), "Ana").unwrap();
        repo.register_sale(Money::from_major(25), "Order #1", "Ana")
            .unwrap();
        repo.close("Ana").unwrap();
        repo.open(Money::from_major(40), "Bruno").unwrap();
        repo.add_movement(CashMovement::Supply, Money::from_major(10), "change", "Bruno")
            .unwrap();

        let second = LocalStore::with_storage(storage);
        assert_eq!(second.register().register().unwrap(), repo.register().unwrap());
        assert_eq!(second.register().history().unwrap(), repo.history().unwrap());
        assert_eq!(second.register().history().unwrap()[0].transactions.len(), 3);
    }
}

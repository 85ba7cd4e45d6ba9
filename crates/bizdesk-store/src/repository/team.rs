//! # Team Repository
//!
//! The roster under `team`. PINs are stored as entered.

use std::sync::Arc;

use tracing::info;

use bizdesk_core::{CoreResult, Role, Roster, TeamMember};

use crate::snapshot::SnapshotCell;

#[derive(Clone)]
pub struct TeamRepository {
    roster: Arc<SnapshotCell<Roster>>,
}

impl TeamRepository {
    pub fn new(roster: Arc<SnapshotCell<Roster>>) -> Self {
        TeamRepository { roster }
    }

    pub fn list(&self) -> CoreResult<Vec<TeamMember>> {
        self.roster.read(|r| r.members.clone())
    }

    /// First active member with this PIN.
    pub fn verify(&self, pin: &str) -> CoreResult<Option<TeamMember>> {
        self.roster.read(|r| r.verify(pin).cloned())
    }

    pub fn add(&self, name: &str, role: Role, pin: &str) -> CoreResult<TeamMember> {
        let member = self.roster.update(|r| r.add(name, role, pin))?;
        info!(member_id = %member.id, role = ?member.role, "Team member added");
        Ok(member)
    }

    pub fn deactivate(&self, id: &str) -> CoreResult<TeamMember> {
        let member = self.roster.update(|r| r.deactivate(id))?;
        info!(member_id = %id, "Team member deactivated");
        Ok(member)
    }
}

#[cfg(test)]
mod tests {
    use crate::storage::{MemoryStorage, StorageKey};
    use crate::LocalStore;
    use bizdesk_core::Role;
    use std::sync::Arc;

    #[test]
    fn test_default_roster_verifies() {
        let store = LocalStore::in_memory();
        let member = store.team().verify("4242").unwrap().unwrap();
        assert_eq!(member.role, Role::Cashier);
    }

    #[test]
    fn test_roster_survives_reload() {
        let storage = Arc::new(MemoryStorage::new());
        let first = LocalStore::with_storage(storage.clone());
        let bruno = first.team().add("Bruno", Role::Manager, "7777").unwrap();
        first.team().deactivate(&bruno.id).unwrap();
        let before = first.team().list().unwrap();

        let second = LocalStore::with_storage(storage.clone());
        assert_eq!(second.team().list().unwrap(), before);
        assert!(second.team().verify("7777").unwrap().is_none());
        assert!(storage.raw(StorageKey::Team).is_some());
    }

    #[test]
    fn test_deactivated_member_is_kept() {
        let store = LocalStore::in_memory();
        let team = store.team();
        let carla = team.add("Carla", Role::Cashier, "5555").unwrap();
        team.deactivate(&carla.id).unwrap();

        assert!(team.verify("5555").unwrap().is_none());
        assert!(team.list().unwrap().iter().any(|m| m.id == carla.id));
    }
}

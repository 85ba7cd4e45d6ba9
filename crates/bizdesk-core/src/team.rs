//! # Team & Access Gate
//!
//! A flat roster of team members, each with a role and a 4-digit PIN.
//!
//! The PIN check is a plain string compare against local data. It is a
//! capability check for the UI (who is operating the till), NOT a security
//! boundary: there is no hashing, rate limiting, or lockout.
//!
//! ## Role Capabilities
//! ```text
//! ┌──────────────────────┬───────┬─────────┬─────────┐
//! │ Permission           │ Admin │ Manager │ Cashier │
//! ├──────────────────────┼───────┼─────────┼─────────┤
//! │ CreateOrders         │   ✔   │    ✔    │    ✔    │
//! │ UpdateOrders         │   ✔   │    ✔    │    ✔    │
//! │ OperateRegister      │   ✔   │    ✔    │    ✔    │
//! │ CashMovements        │   ✔   │    ✔    │         │
//! │ ProcessReturns       │   ✔   │    ✔    │         │
//! │ ManageCatalog        │   ✔   │    ✔    │         │
//! │ ViewReports          │   ✔   │    ✔    │         │
//! │ ManageSettings       │   ✔   │    ✔    │         │
//! │ ManageTeam           │   ✔   │         │         │
//! └──────────────────────┴───────┴─────────┴─────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::validation::{validate_person_name, validate_pin};
use crate::SYSTEM_ACTOR;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Manager,
    Cashier,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    CreateOrders,
    UpdateOrders,
    OperateRegister,
    CashMovements,
    ProcessReturns,
    ManageCatalog,
    ViewReports,
    ManageSettings,
    ManageTeam,
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Permission::CreateOrders => "create orders",
            Permission::UpdateOrders => "update orders",
            Permission::OperateRegister => "operate the register",
            Permission::CashMovements => "record cash supplies and bleeds",
            Permission::ProcessReturns => "process returns",
            Permission::ManageCatalog => "manage the catalog",
            Permission::ViewReports => "view reports",
            Permission::ManageSettings => "change business settings",
            Permission::ManageTeam => "manage the team",
        };
        f.write_str(s)
    }
}

impl Role {
    pub fn allows(&self, permission: Permission) -> bool {
        match self {
            Role::Admin => true,
            Role::Manager => permission != Permission::ManageTeam,
            Role::Cashier => matches!(
                permission,
                Permission::CreateOrders | Permission::UpdateOrders | Permission::OperateRegister
            ),
        }
    }
}

/// A roster entry, persisted under `team`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TeamMember {
    pub id: String,
    pub name: String,
    pub role: Role,
    pub pin: String,
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// Who is performing an operation.
///
/// `role: None` is the automation actor ("System"), which is never gated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    pub name: String,
    pub role: Option<Role>,
}

impl Actor {
    pub fn system() -> Self {
        Actor {
            name: SYSTEM_ACTOR.to_string(),
            role: None,
        }
    }

    pub fn new(name: impl Into<String>, role: Role) -> Self {
        Actor {
            name: name.into(),
            role: Some(role),
        }
    }

    /// Fails with `Unauthorized` when the role lacks the permission.
    pub fn require(&self, permission: Permission) -> CoreResult<()> {
        match self.role {
            Some(role) if !role.allows(permission) => Err(CoreError::Unauthorized {
                actor: self.name.clone(),
                permission,
            }),
            _ => Ok(()),
        }
    }
}

impl From<&TeamMember> for Actor {
    fn from(member: &TeamMember) -> Self {
        Actor::new(member.name.clone(), member.role)
    }
}

/// The team roster.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Roster {
    pub members: Vec<TeamMember>,
}

impl Roster {
    pub fn new(members: Vec<TeamMember>) -> Self {
        Roster { members }
    }

    /// First active member whose PIN matches.
    pub fn verify(&self, pin: &str) -> Option<&TeamMember> {
        self.members.iter().find(|m| m.is_active && m.pin == pin)
    }

    pub fn get(&self, id: &str) -> Option<&TeamMember> {
        self.members.iter().find(|m| m.id == id)
    }

    /// Adds a member. The PIN must be unique among active members so that
    /// `verify` is unambiguous.
    pub fn add(&mut self, name: &str, role: Role, pin: &str) -> CoreResult<TeamMember> {
        validate_person_name(name)?;
        validate_pin(pin)?;
        if self.verify(pin).is_some() {
            return Err(ValidationError::Duplicate {
                field: "pin".to_string(),
                value: "****".to_string(),
            }
            .into());
        }

        let member = TeamMember {
            id: Uuid::new_v4().to_string(),
            name: name.trim().to_string(),
            role,
            pin: pin.to_string(),
            is_active: true,
            created_at: Utc::now(),
        };
        self.members.push(member.clone());
        Ok(member)
    }

    /// Deactivates a member; the entry stays for history.
    pub fn deactivate(&mut self, id: &str) -> CoreResult<TeamMember> {
        let member = self
            .members
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| CoreError::MemberNotFound(id.to_string()))?;
        member.is_active = false;
        Ok(member.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_returns_matching_active_member() {
        let mut roster = Roster::default();
        roster.add("Ana", Role::Admin, "1111").unwrap();
        let carla = roster.add("Carla", Role::Cashier, "4242").unwrap();

        assert_eq!(roster.verify("4242").map(|m| m.id.clone()), Some(carla.id));
        assert!(roster.verify("0000").is_none());
    }

    #[test]
    fn test_inactive_member_cannot_verify() {
        let mut roster = Roster::default();
        let member = roster.add("Bruno", Role::Manager, "2222").unwrap();
        roster.deactivate(&member.id).unwrap();
        assert!(roster.verify("2222").is_none());

        // PIN is free again once its owner is inactive
        assert!(roster.add("Bea", Role::Cashier, "2222").is_ok());
    }

    #[test]
    fn test_duplicate_active_pin_rejected() {
        let mut roster = Roster::default();
        roster.add("Ana", Role::Admin, "1111").unwrap();
        assert!(roster.add("Otto", Role::Cashier, "1111").is_err());
    }

    #[test]
    fn test_deactivate_unknown_member() {
        let mut roster = Roster::default();
        assert!(matches!(
            roster.deactivate("ghost"),
            Err(CoreError::MemberNotFound(_))
        ));
    }

    #[test]
    fn test_role_gates() {
        let cashier = Actor::new("Carla", Role::Cashier);
        assert!(cashier.require(Permission::OperateRegister).is_ok());
        assert!(matches!(
            cashier.require(Permission::CashMovements),
            Err(CoreError::Unauthorized { .. })
        ));

        let manager = Actor::new("Bruno", Role::Manager);
        assert!(manager.require(Permission::ProcessReturns).is_ok());
        assert!(manager.require(Permission::ManageTeam).is_err());

        assert!(Actor::system().require(Permission::ManageTeam).is_ok());
    }
}

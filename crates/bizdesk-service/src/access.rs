//! # Team Access
//!
//! PIN login and roster maintenance.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  login("4242")                                                          │
//! │     │                                                                   │
//! │     ├── sleep(login_delay)        simulated check latency, always ends  │
//! │     │                                                                   │
//! │     ├── roster.verify(pin)        first active member with that PIN     │
//! │     │                                                                   │
//! │     └── Some(Session) / None                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The PIN is a local string compare. It identifies who is at the counter
//! so that role gates and history entries have a name; it is not security.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};
use ts_rs::TS;

use bizdesk_core::{Actor, CoreResult, Permission, Role, TeamMember};
use bizdesk_store::TeamRepository;

/// The member currently at the counter. Carries no PIN.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub member_id: String,
    pub name: String,
    pub role: Role,
    #[ts(as = "String")]
    pub started_at: DateTime<Utc>,
}

impl Session {
    pub fn actor(&self) -> Actor {
        Actor::new(self.name.clone(), self.role)
    }
}

impl From<&TeamMember> for Session {
    fn from(member: &TeamMember) -> Self {
        Session {
            member_id: member.id.clone(),
            name: member.name.clone(),
            role: member.role,
            started_at: Utc::now(),
        }
    }
}

#[derive(Clone)]
pub struct AccessService {
    team: TeamRepository,
    login_delay: Duration,
}

impl AccessService {
    pub fn new(team: TeamRepository, login_delay: Duration) -> Self {
        AccessService { team, login_delay }
    }

    /// `None` when no active member has this PIN.
    pub async fn login(&self, pin: &str) -> CoreResult<Option<Session>> {
        tokio::time::sleep(self.login_delay).await;

        match self.team.verify(pin)? {
            Some(member) => {
                info!(member_id = %member.id, role = ?member.role, "Team member logged in");
                Ok(Some(Session::from(&member)))
            }
            None => {
                warn!("Login rejected");
                Ok(None)
            }
        }
    }

    pub fn list_members(&self, actor: &Actor) -> CoreResult<Vec<TeamMember>> {
        actor.require(Permission::ManageTeam)?;
        self.team.list()
    }

    pub fn add_member(
        &self,
        name: &str,
        role: Role,
        pin: &str,
        actor: &Actor,
    ) -> CoreResult<TeamMember> {
        actor.require(Permission::ManageTeam)?;
        self.team.add(name, role, pin)
    }

    pub fn deactivate_member(&self, member_id: &str, actor: &Actor) -> CoreResult<TeamMember> {
        actor.require(Permission::ManageTeam)?;
        self.team.deactivate(member_id)
    }
}

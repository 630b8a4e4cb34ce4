//! Boundary between the theme system and the chat platform.
//!
//! The core never talks to the network directly. It resolves roles, checks
//! the bot's capabilities and asks for [`Mutation`]s through the traits in
//! this module. [`SnapshotPlatform`] is a complete in-memory implementation
//! backed by a serialized guild snapshot.

pub mod snapshot;

pub use snapshot::{BotMember, GuildSnapshot, SnapshotPlatform};

use crate::action::Mutation;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// A guild role as seen by the theme system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: String,
    pub name: String,
    /// Hierarchy position; higher outranks lower.
    #[serde(default)]
    pub position: i64,
    /// Owned by an integration (bots, boosts); never exported.
    #[serde(default)]
    pub managed: bool,
}

impl Role {
    pub fn new(id: impl Into<String>, name: impl Into<String>, position: i64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            position,
            managed: false,
        }
    }

    pub fn managed(mut self) -> Self {
        self.managed = true;
        self
    }
}

/// Guild-level capabilities the applier checks before issuing a mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    Administrator,
    ManageServer,
    ManageRoles,
    ChangeNickname,
}

/// Failure of a single outbound mutation request.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PlatformError {
    #[error("Rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Duration },

    #[error("Transient platform failure: {0}")]
    Transient(String),

    #[error("Request rejected by platform: {0}")]
    Rejected(String),
}

impl PlatformError {
    /// Whether a queued delivery should retry this failure.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            PlatformError::RateLimited { .. } | PlatformError::Transient(_)
        )
    }
}

/// Resolves a role id against the live guild.
pub trait RoleResolver {
    fn resolve_role(&self, id: &str) -> Option<Role>;
}

/// Everything the theme system needs from a guild session.
///
/// Mutation methods only build the request; nothing is sent until the
/// returned [`Mutation`] is dispatched through an
/// [`ActionMode`](crate::action::ActionMode).
pub trait GuildPlatform: RoleResolver + Send + Sync {
    fn can_manage_server(&self) -> bool;
    fn can_manage_roles(&self) -> bool;
    fn can_change_nickname(&self) -> bool;
    /// Hierarchy check: the bot's highest role is above `role`.
    fn can_outrank(&self, role: &Role) -> bool;

    fn set_server_icon(&self, image: Vec<u8>) -> Mutation;
    fn set_bot_avatar(&self, image: Vec<u8>) -> Mutation;
    fn set_server_name(&self, name: &str) -> Mutation;
    fn set_own_nickname(&self, nickname: &str) -> Mutation;
    fn set_role_name(&self, role: &Role, name: &str) -> Mutation;

    fn server_name(&self) -> String;
    fn server_icon_url(&self) -> Option<String>;
    fn bot_avatar_url(&self) -> Option<String>;
    fn bot_nickname(&self) -> Option<String>;
    /// The implicit role every member holds.
    fn public_role_id(&self) -> String;
    /// All roles in hierarchy order, highest first.
    fn roles(&self) -> Vec<Role>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(
            PlatformError::RateLimited {
                retry_after: Duration::from_secs(1)
            }
            .is_transient()
        );
        assert!(PlatformError::Transient("502".into()).is_transient());
        assert!(!PlatformError::Rejected("bad name".into()).is_transient());
    }

    #[test]
    fn test_permission_serde_names() {
        let parsed: Vec<Permission> =
            serde_json::from_str(r#"["administrator","manage_server","change_nickname"]"#)
                .unwrap();
        assert_eq!(
            parsed,
            vec![
                Permission::Administrator,
                Permission::ManageServer,
                Permission::ChangeNickname
            ]
        );
    }
}

use super::{GuildPlatform, Permission, PlatformError, Role, RoleResolver};
use crate::action::{Mutation, MutationKind};
use crate::common::ThemeError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

/// Serializable picture of a guild and the bot's membership in it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuildSnapshot {
    /// Guild id; the public (everyone) role shares it.
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub icon_url: Option<String>,
    #[serde(default)]
    pub roles: Vec<Role>,
    #[serde(default)]
    pub bot: BotMember,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotMember {
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub role_ids: Vec<String>,
    #[serde(default)]
    pub permissions: Vec<Permission>,
}

impl GuildSnapshot {
    /// A guild holding only its public role.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            roles: vec![Role::new(id.clone(), "@everyone", 0)],
            id,
            name: name.into(),
            icon_url: None,
            bot: BotMember::default(),
        }
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.roles.push(role);
        self
    }

    pub fn with_bot(mut self, bot: BotMember) -> Self {
        self.bot = bot;
        self
    }

    fn role(&self, id: &str) -> Option<&Role> {
        self.roles.iter().find(|r| r.id == id)
    }

    fn bot_top_position(&self) -> i64 {
        self.bot
            .role_ids
            .iter()
            .filter_map(|id| self.role(id))
            .map(|r| r.position)
            .max()
            .unwrap_or(0)
    }

    fn bot_has(&self, permission: Permission) -> bool {
        self.bot.permissions.contains(&Permission::Administrator)
            || self.bot.permissions.contains(&permission)
    }
}

type Change = Arc<dyn Fn(&mut State) -> Result<(), PlatformError> + Send + Sync>;

struct State {
    guild: GuildSnapshot,
    issued: Vec<MutationKind>,
    applied: Vec<MutationKind>,
    icon_upload: Option<Vec<u8>>,
    avatar_upload: Option<Vec<u8>>,
    pending_failures: usize,
}

/// In-memory [`GuildPlatform`] over a [`GuildSnapshot`].
///
/// Issued mutations are recorded when they are built; they change the
/// snapshot only when a request is actually sent. Cloning shares state.
#[derive(Clone)]
pub struct SnapshotPlatform {
    state: Arc<Mutex<State>>,
}

impl SnapshotPlatform {
    pub fn new(guild: GuildSnapshot) -> Self {
        Self {
            state: Arc::new(Mutex::new(State {
                guild,
                issued: Vec::new(),
                applied: Vec::new(),
                icon_upload: None,
                avatar_upload: None,
                pending_failures: 0,
            })),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    pub fn load(path: &Path) -> Result<Self, ThemeError> {
        let content = std::fs::read_to_string(path).map_err(|e| ThemeError::io(path, e))?;
        Self::from_json(&content).map_err(|e| ThemeError::io(path, e.into()))
    }

    pub fn save(&self, path: &Path) -> Result<(), ThemeError> {
        let json = serde_json::to_string_pretty(&self.snapshot())
            .map_err(|e| ThemeError::io(path, e.into()))?;
        std::fs::write(path, json).map_err(|e| ThemeError::io(path, e))
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        lock_state(&self.state)
    }

    fn with_guild<R>(&self, f: impl FnOnce(&GuildSnapshot) -> R) -> R {
        f(&self.lock().guild)
    }

    pub fn snapshot(&self) -> GuildSnapshot {
        self.with_guild(Clone::clone)
    }

    /// Mutations in the order the applier built them.
    pub fn issued(&self) -> Vec<MutationKind> {
        self.lock().issued.clone()
    }

    /// Mutations whose requests ran successfully, in completion order.
    pub fn applied(&self) -> Vec<MutationKind> {
        self.lock().applied.clone()
    }

    pub fn icon_upload(&self) -> Option<Vec<u8>> {
        self.lock().icon_upload.clone()
    }

    pub fn avatar_upload(&self) -> Option<Vec<u8>> {
        self.lock().avatar_upload.clone()
    }

    /// Make the next `count` requests fail with a transient error.
    pub fn inject_transient_failures(&self, count: usize) {
        self.lock().pending_failures = count;
    }

    fn mutation(&self, kind: MutationKind, change: Change) -> Mutation {
        self.lock().issued.push(kind.clone());

        let state = self.state.clone();
        let recorded = kind.clone();
        Mutation::new(kind, move || {
            let state = state.clone();
            let change = change.clone();
            let recorded = recorded.clone();
            async move {
                let mut state = lock_state(&state);
                if state.pending_failures > 0 {
                    state.pending_failures -= 1;
                    return Err(PlatformError::Transient(format!(
                        "injected failure for {recorded}"
                    )));
                }
                change(&mut *state)?;
                state.applied.push(recorded);
                Ok(())
            }
        })
    }
}

fn lock_state(state: &Mutex<State>) -> MutexGuard<'_, State> {
    state.lock().unwrap_or_else(|e| e.into_inner())
}

impl RoleResolver for SnapshotPlatform {
    fn resolve_role(&self, id: &str) -> Option<Role> {
        self.with_guild(|g| g.role(id).cloned())
    }
}

impl GuildPlatform for SnapshotPlatform {
    fn can_manage_server(&self) -> bool {
        self.with_guild(|g| g.bot_has(Permission::ManageServer))
    }

    fn can_manage_roles(&self) -> bool {
        self.with_guild(|g| g.bot_has(Permission::ManageRoles))
    }

    fn can_change_nickname(&self) -> bool {
        self.with_guild(|g| g.bot_has(Permission::ChangeNickname))
    }

    fn can_outrank(&self, role: &Role) -> bool {
        self.with_guild(|g| role.id != g.id && g.bot_top_position() > role.position)
    }

    fn set_server_icon(&self, image: Vec<u8>) -> Mutation {
        self.mutation(
            MutationKind::SetServerIcon { bytes: image.len() },
            Arc::new(move |state| {
                state.icon_upload = Some(image.clone());
                Ok(())
            }),
        )
    }

    fn set_bot_avatar(&self, image: Vec<u8>) -> Mutation {
        self.mutation(
            MutationKind::SetBotAvatar { bytes: image.len() },
            Arc::new(move |state| {
                state.avatar_upload = Some(image.clone());
                Ok(())
            }),
        )
    }

    fn set_server_name(&self, name: &str) -> Mutation {
        let value = name.to_string();
        self.mutation(
            MutationKind::SetServerName {
                name: value.clone(),
            },
            Arc::new(move |state| {
                state.guild.name = value.clone();
                Ok(())
            }),
        )
    }

    fn set_own_nickname(&self, nickname: &str) -> Mutation {
        let value = nickname.to_string();
        self.mutation(
            MutationKind::SetOwnNickname {
                nickname: value.clone(),
            },
            Arc::new(move |state| {
                state.guild.bot.nickname = Some(value.clone());
                Ok(())
            }),
        )
    }

    fn set_role_name(&self, role: &Role, name: &str) -> Mutation {
        let role_id = role.id.clone();
        let value = name.to_string();
        self.mutation(
            MutationKind::SetRoleName {
                role_id: role_id.clone(),
                name: value.clone(),
            },
            Arc::new(move |state| {
                let role = state
                    .guild
                    .roles
                    .iter_mut()
                    .find(|r| r.id == role_id)
                    .ok_or_else(|| PlatformError::Rejected(format!("Unknown role {role_id}")))?;
                role.name = value.clone();
                Ok(())
            }),
        )
    }

    fn server_name(&self) -> String {
        self.with_guild(|g| g.name.clone())
    }

    fn server_icon_url(&self) -> Option<String> {
        self.with_guild(|g| g.icon_url.clone())
    }

    fn bot_avatar_url(&self) -> Option<String> {
        self.with_guild(|g| g.bot.avatar_url.clone())
    }

    fn bot_nickname(&self) -> Option<String> {
        self.with_guild(|g| g.bot.nickname.clone())
    }

    fn public_role_id(&self) -> String {
        self.with_guild(|g| g.id.clone())
    }

    fn roles(&self) -> Vec<Role> {
        let mut roles = self.with_guild(|g| g.roles.clone());
        roles.sort_by(|a, b| b.position.cmp(&a.position));
        roles
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use claims::{assert_err, assert_none, assert_ok, assert_some};

    fn guild() -> GuildSnapshot {
        GuildSnapshot::new("100", "Test Guild")
            .with_role(Role::new("1", "Admin", 10))
            .with_role(Role::new("2", "Bot", 5))
            .with_role(Role::new("3", "Member", 1))
            .with_role(Role::new("4", "Booster", 2).managed())
            .with_bot(BotMember {
                nickname: Some("Themer".into()),
                avatar_url: None,
                role_ids: vec!["2".into()],
                permissions: vec![Permission::ManageRoles],
            })
    }

    #[test]
    fn test_outrank_uses_highest_bot_role() {
        let platform = SnapshotPlatform::new(guild());
        let member = assert_some!(platform.resolve_role("3"));
        let admin = assert_some!(platform.resolve_role("1"));
        let bot_role = assert_some!(platform.resolve_role("2"));
        let everyone = assert_some!(platform.resolve_role("100"));

        assert!(platform.can_outrank(&member));
        assert!(!platform.can_outrank(&admin));
        assert!(!platform.can_outrank(&bot_role));
        assert!(!platform.can_outrank(&everyone));
        assert_none!(platform.resolve_role("999"));
    }

    #[test]
    fn test_administrator_grants_everything() {
        let mut snapshot = guild();
        snapshot.bot.permissions = vec![Permission::Administrator];
        let platform = SnapshotPlatform::new(snapshot);

        assert!(platform.can_manage_server());
        assert!(platform.can_manage_roles());
        assert!(platform.can_change_nickname());
    }

    #[test]
    fn test_specific_permissions_only() {
        let platform = SnapshotPlatform::new(guild());
        assert!(platform.can_manage_roles());
        assert!(!platform.can_manage_server());
        assert!(!platform.can_change_nickname());
    }

    #[tokio::test]
    async fn test_mutations_record_issue_then_apply() {
        let platform = SnapshotPlatform::new(guild());
        let rename = platform.set_server_name("Spooky Guild");
        let role = assert_some!(platform.resolve_role("3"));
        let role_rename = platform.set_role_name(&role, "Ghouls");

        assert_eq!(platform.issued().len(), 2);
        assert!(platform.applied().is_empty());
        assert_eq!(platform.server_name(), "Test Guild");

        assert_ok!(role_rename.send().await);
        assert_ok!(rename.send().await);

        assert_eq!(platform.server_name(), "Spooky Guild");
        assert_eq!(assert_some!(platform.resolve_role("3")).name, "Ghouls");
        assert_eq!(
            platform.applied(),
            vec![
                MutationKind::SetRoleName {
                    role_id: "3".into(),
                    name: "Ghouls".into()
                },
                MutationKind::SetServerName {
                    name: "Spooky Guild".into()
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_injected_failures_are_transient() {
        let platform = SnapshotPlatform::new(guild());
        platform.inject_transient_failures(1);
        let mutation = platform.set_own_nickname("Pumpkin");

        let error = assert_err!(mutation.send().await);
        assert!(error.is_transient());
        assert_ok!(mutation.send().await);
        assert_eq!(platform.bot_nickname().as_deref(), Some("Pumpkin"));
    }

    #[tokio::test]
    async fn test_uploads_are_tracked() {
        let platform = SnapshotPlatform::new(guild());
        assert_ok!(platform.set_server_icon(vec![1, 2, 3]).send().await);
        assert_ok!(platform.set_bot_avatar(vec![4]).send().await);
        assert_eq!(platform.icon_upload(), Some(vec![1, 2, 3]));
        assert_eq!(platform.avatar_upload(), Some(vec![4]));
    }

    #[test]
    fn test_roles_sorted_highest_first() {
        let platform = SnapshotPlatform::new(guild());
        let positions: Vec<i64> = platform.roles().iter().map(|r| r.position).collect();
        assert_eq!(positions, vec![10, 5, 2, 1, 0]);
    }

    #[test]
    fn test_json_round_trip_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("guild.json");
        let platform = SnapshotPlatform::new(guild());
        assert_ok!(platform.save(&path));

        let loaded = assert_ok!(SnapshotPlatform::load(&path));
        assert_eq!(loaded.snapshot(), guild());
    }

    #[test]
    fn test_minimal_json_uses_defaults() {
        let platform = assert_ok!(SnapshotPlatform::from_json(
            r#"{ "id": "5", "name": "Tiny" }"#
        ));
        assert!(platform.roles().is_empty());
        assert!(!platform.can_manage_server());
        assert_none!(platform.bot_nickname());
    }
}

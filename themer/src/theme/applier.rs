use super::types::ThemeToken;
use crate::action::{ActionMode, Mutation, MutationKind};
use crate::assets::{read_image, resolve_asset_path};
use crate::common::AssetError;
use crate::platform::GuildPlatform;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Why a step of a theme application was not issued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The bot lacks the named capability.
    MissingPermission(&'static str),
    /// The role sits at or above the bot's highest role.
    CannotOutrank,
    /// The role no longer exists in the guild.
    UnknownRole,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingPermission(p) => write!(f, "missing permission {p}"),
            SkipReason::CannotOutrank => f.write_str("role is above the bot"),
            SkipReason::UnknownRole => f.write_str("role no longer exists"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedStep {
    pub step: String,
    pub reason: SkipReason,
}

/// What one theme application did, step by step.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ApplyReport {
    /// Mutations handed to the action mode, in issue order.
    #[serde(skip)]
    pub issued: Vec<MutationKind>,
    pub skipped: Vec<SkippedStep>,
    /// Image steps abandoned because the file could not be read.
    pub asset_failures: Vec<String>,
}

impl ApplyReport {
    fn skip(&mut self, step: impl Into<String>, reason: SkipReason) {
        let step = step.into();
        log::warn!("Skipping {step}: {reason}");
        self.skipped.push(SkippedStep { step, reason });
    }

    fn asset_failure(&mut self, step: &str, error: AssetError) {
        log::error!("Unable to load {step} image: {error}");
        self.asset_failures.push(format!("{step}: {error}"));
    }

    pub fn issued_count(&self) -> usize {
        self.issued.len()
    }

    /// Every step of the theme was issued.
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty() && self.asset_failures.is_empty()
    }
}

/// Turns a [`ThemeToken`] into guild mutations.
///
/// Steps run in a fixed order: server icon, bot avatar, server title,
/// nickname, then each role rename. Image steps are best effort and never
/// stop the textual steps that follow.
#[derive(Debug, Clone)]
pub struct ThemeApplier {
    themes_root: PathBuf,
}

impl ThemeApplier {
    pub fn new(themes_root: impl Into<PathBuf>) -> Self {
        Self {
            themes_root: themes_root.into(),
        }
    }

    pub async fn apply<P: GuildPlatform + ?Sized>(
        &self,
        platform: &P,
        token: &ThemeToken,
        mode: &ActionMode,
    ) -> ApplyReport {
        log::info!("Switching to theme: {}", token.display_name());
        let mut report = ApplyReport::default();

        if let Some(icon) = token.icon() {
            if platform.can_manage_server() {
                match self.load_image(token, icon) {
                    Ok(bytes) => issue(platform.set_server_icon(bytes), mode, &mut report).await,
                    Err(e) => report.asset_failure("server icon", e),
                }
            } else {
                report.skip("server icon", SkipReason::MissingPermission("manage_server"));
            }
        }

        if let Some(avatar) = token.avatar() {
            match self.load_image(token, avatar) {
                Ok(bytes) => issue(platform.set_bot_avatar(bytes), mode, &mut report).await,
                Err(e) => report.asset_failure("bot avatar", e),
            }
        }

        if let Some(title) = token.server_title() {
            if platform.can_manage_server() {
                issue(platform.set_server_name(title), mode, &mut report).await;
            } else {
                report.skip("server title", SkipReason::MissingPermission("manage_server"));
            }
        }

        if let Some(nickname) = token.nickname() {
            if platform.can_change_nickname() {
                issue(platform.set_own_nickname(nickname), mode, &mut report).await;
            } else {
                report.skip("nickname", SkipReason::MissingPermission("change_nickname"));
            }
        }

        let can_manage_roles = platform.can_manage_roles();
        for remap in token.roles() {
            let step = format!("role {}", remap.role_id);
            let Some(role) = platform.resolve_role(&remap.role_id) else {
                report.skip(step, SkipReason::UnknownRole);
                continue;
            };
            if !can_manage_roles {
                report.skip(step, SkipReason::MissingPermission("manage_roles"));
            } else if !platform.can_outrank(&role) {
                report.skip(step, SkipReason::CannotOutrank);
            } else {
                issue(platform.set_role_name(&role, &remap.name), mode, &mut report).await;
            }
        }

        log::info!(
            "Theme '{}' applied: {} change(s) issued, {} skipped",
            token.name(),
            report.issued.len(),
            report.skipped.len() + report.asset_failures.len()
        );
        report
    }

    fn load_image(&self, token: &ThemeToken, value: &str) -> Result<Vec<u8>, AssetError> {
        read_image(&resolve_asset_path(&self.themes_root, token.source(), value))
    }
}

async fn issue(mutation: Mutation, mode: &ActionMode, report: &mut ApplyReport) {
    report.issued.push(mutation.kind().clone());
    mode.dispatch(mutation).await;
}

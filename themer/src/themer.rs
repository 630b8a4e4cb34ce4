//! High level entry point tying a [`ThemeRegistry`] to one guild.

use crate::action::ActionMode;
use crate::assets::{AssetFetcher, DEFAULT_USER_AGENT, HttpAssetFetcher};
use crate::common::{AssetError, ThemeError};
use crate::platform::GuildPlatform;
use crate::theme::{ApplyReport, ThemeApplier, ThemeExporter, ThemeRegistry, ThemeToken};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Default theme directory: `<config dir>/discord-themer/themes`, or
/// `./themes` when the platform has no config directory.
pub fn default_themes_dir() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join("discord-themer").join("themes"))
        .unwrap_or_else(|| PathBuf::from("themes"))
}

/// Builder for [`Themer`]; the theme directory is scanned in [`build`](Self::build).
pub struct ThemerBuilder {
    themes_dir: Option<PathBuf>,
    action_mode: ActionMode,
    fetcher: Option<Arc<dyn AssetFetcher>>,
    user_agent: String,
}

impl Default for ThemerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ThemerBuilder {
    pub fn new() -> Self {
        Self {
            themes_dir: None,
            action_mode: ActionMode::Immediate,
            fetcher: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    pub fn themes_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.themes_dir = Some(dir.into());
        self
    }

    pub fn action_mode(mut self, mode: ActionMode) -> Self {
        self.action_mode = mode;
        self
    }

    /// Override the fetcher used by captures. Defaults to HTTP.
    pub fn asset_fetcher(mut self, fetcher: Arc<dyn AssetFetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn build(self, platform: Arc<dyn GuildPlatform>) -> Result<Themer, ThemeError> {
        let themes_dir = self.themes_dir.unwrap_or_else(default_themes_dir);
        let fetcher: Arc<dyn AssetFetcher> = match self.fetcher {
            Some(fetcher) => fetcher,
            None => Arc::new(HttpAssetFetcher::new(&self.user_agent).map_err(AssetError::from)?),
        };

        let mut registry = ThemeRegistry::new(&themes_dir);
        registry.load_all(&themes_dir, platform.as_ref())?;
        log::info!("Discord-Themer initialized with {} theme(s)", registry.len());

        Ok(Themer {
            applier: ThemeApplier::new(&themes_dir),
            exporter: ThemeExporter::new(&themes_dir, fetcher),
            themes_dir,
            registry,
            platform,
            action_mode: self.action_mode,
        })
    }
}

/// Loaded themes plus everything needed to apply or capture them.
pub struct Themer {
    themes_dir: PathBuf,
    registry: ThemeRegistry,
    applier: ThemeApplier,
    exporter: ThemeExporter,
    platform: Arc<dyn GuildPlatform>,
    action_mode: ActionMode,
}

impl Themer {
    pub fn builder() -> ThemerBuilder {
        ThemerBuilder::new()
    }

    pub fn themes_dir(&self) -> &Path {
        &self.themes_dir
    }

    pub fn registry(&self) -> &ThemeRegistry {
        &self.registry
    }

    pub fn platform(&self) -> &Arc<dyn GuildPlatform> {
        &self.platform
    }

    pub fn action_mode(&self) -> &ActionMode {
        &self.action_mode
    }

    pub fn is_valid_theme(&self, name: &str) -> bool {
        self.registry.exists(name)
    }

    pub fn theme_names(&self) -> Vec<String> {
        self.registry.names()
    }

    pub fn theme_token(&self, name: &str) -> Result<&ThemeToken, ThemeError> {
        self.registry.lookup(name)
    }

    /// Apply a registered theme with the configured action mode.
    pub async fn set_server_theme(&self, name: &str) -> Result<ApplyReport, ThemeError> {
        self.set_server_theme_with(name, &self.action_mode).await
    }

    /// Apply a registered theme with an explicit action mode.
    pub async fn set_server_theme_with(
        &self,
        name: &str,
        mode: &ActionMode,
    ) -> Result<ApplyReport, ThemeError> {
        let token = self.registry.lookup(name)?;
        Ok(self
            .applier
            .apply(self.platform.as_ref(), token, mode)
            .await)
    }

    /// Export the guild as a new theme, optionally registering it.
    pub async fn capture_server(&mut self, name: &str, register: bool) -> Result<PathBuf, ThemeError> {
        if register {
            self.exporter
                .capture_and_register(self.platform.as_ref(), name, &mut self.registry)
                .await
        } else {
            self.exporter.capture(self.platform.as_ref(), name).await
        }
    }

    /// Rescan the theme directory into a fresh registry.
    ///
    /// The registered themes are only replaced once the scan succeeded; a
    /// theme directory that vanished is an error and keeps them.
    pub fn reload(&mut self) -> Result<usize, ThemeError> {
        if !self.themes_dir.is_dir() {
            return Err(ThemeError::io(
                &self.themes_dir,
                std::io::Error::from(std::io::ErrorKind::NotFound),
            ));
        }

        let mut registry = ThemeRegistry::new(&self.themes_dir);
        let loaded = registry.load_all(&self.themes_dir, self.platform.as_ref())?;
        self.registry = registry;
        Ok(loaded)
    }
}

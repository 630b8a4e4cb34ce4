use super::registry::ThemeRegistry;
use super::types::{METADATA_PREFIX, ParserVersion, THEME_EXTENSION, keys};
use crate::assets::{AssetFetcher, IMAGE_EXTENSION};
use crate::common::ThemeError;
use crate::platform::GuildPlatform;
use crate::validation::{ThemeNameValidator, Validator};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Replaces the token delimiter inside exported values.
const DELIMITER_SUBSTITUTE: char = '\u{2236}';

/// Writes the live guild state out as a new theme file.
///
/// The output is guaranteed to pass validation against the same guild:
/// values are sanitized so they stay a single token on a single line,
/// absent values are omitted, and images are only referenced once they
/// were actually saved.
pub struct ThemeExporter {
    themes_dir: PathBuf,
    fetcher: Arc<dyn AssetFetcher>,
}

impl ThemeExporter {
    pub fn new(themes_dir: impl Into<PathBuf>, fetcher: Arc<dyn AssetFetcher>) -> Self {
        Self {
            themes_dir: themes_dir.into(),
            fetcher,
        }
    }

    pub fn theme_path(&self, name: &str) -> PathBuf {
        self.themes_dir.join(format!("{name}.{THEME_EXTENSION}"))
    }

    fn image_path(&self, base: &str) -> PathBuf {
        self.themes_dir.join(format!("{base}.{IMAGE_EXTENSION}"))
    }

    /// Capture the guild into `<themes_dir>/<name>.dat`.
    ///
    /// Fails without touching the disk if the name is invalid, or if the
    /// theme file or an image the capture would save already exists.
    pub async fn capture<P: GuildPlatform + ?Sized>(
        &self,
        platform: &P,
        name: &str,
    ) -> Result<PathBuf, ThemeError> {
        ThemeNameValidator.validate(name)?;

        let path = self.theme_path(name);
        if path.exists() {
            return Err(ThemeError::ThemeAlreadyExists { path });
        }

        let icon = platform.server_icon_url().map(|_| self.image_path(name));
        let avatar = platform
            .bot_avatar_url()
            .map(|_| self.image_path(&avatar_base(name)));
        if let Some(taken) = [icon, avatar].into_iter().flatten().find(|p| p.exists()) {
            return Err(ThemeError::ThemeAlreadyExists { path: taken });
        }

        log::info!("Exporting current server state as '{name}'");
        let contents = self.render(platform, name).await;
        write_new(&path, &contents)?;

        log::info!(
            "Current state of the server has been exported to {}",
            path.display()
        );
        Ok(path)
    }

    /// Capture, then validate and register the new file.
    ///
    /// A rejection here means the exporter produced a file the validator
    /// does not understand; the file is left on disk for inspection.
    pub async fn capture_and_register<P: GuildPlatform + ?Sized>(
        &self,
        platform: &P,
        name: &str,
        registry: &mut ThemeRegistry,
    ) -> Result<PathBuf, ThemeError> {
        let path = self.capture(platform, name).await?;

        let report = registry.load_file(&path, platform)?;
        if !report.is_accepted() {
            log::error!(
                "Exported theme {} failed validation; please report this",
                path.display()
            );
            return Err(ThemeError::ExportRejected {
                diagnostics: report.errors().map(ToString::to_string).collect(),
                path,
            });
        }

        log::info!("Exported theme '{name}' registered");
        Ok(path)
    }

    async fn render<P: GuildPlatform + ?Sized>(&self, platform: &P, name: &str) -> String {
        let mut lines = vec![format!(
            "// Theme exported by Discord-Themer on {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
        )];

        push_metadata(&mut lines, keys::NAME, &format!("{name} (Auto-Exported)"));
        push_metadata(&mut lines, keys::TITLE, &platform.server_name());

        match platform.server_icon_url() {
            Some(url) => {
                if self.save_image(&url, name).await {
                    push_metadata(&mut lines, keys::ICON, name);
                }
            }
            None => log::debug!("Server has no icon, skipping"),
        }

        match platform.bot_nickname() {
            Some(nickname) => push_metadata(&mut lines, keys::NICKNAME, &nickname),
            None => log::debug!("Bot has no nickname, skipping"),
        }

        let avatar = avatar_base(name);
        match platform.bot_avatar_url() {
            Some(url) => {
                if self.save_image(&url, &avatar).await {
                    push_metadata(&mut lines, keys::AVATAR, &avatar);
                }
            }
            None => log::debug!("Bot has no avatar, skipping"),
        }

        push_metadata(&mut lines, keys::PARSER, ParserVersion::CURRENT.tag());
        lines.push(String::new());
        lines.push("// Server Roles".to_string());

        let public_role = platform.public_role_id();
        for role in platform.roles() {
            if role.id == public_role || role.managed {
                continue;
            }
            if !is_exportable_role_id(&role.id) {
                log::warn!("Role id '{}' cannot be written to a theme, skipping", role.id);
                continue;
            }
            match sanitize_value(&role.name) {
                Some(role_name) => lines.push(format!("{}:{}", role.id, role_name)),
                None => log::warn!("Role {} has an empty name, skipping", role.id),
            }
        }

        let mut contents = lines.join("\n");
        contents.push('\n');
        contents
    }

    /// Fetch `url` into `<themes_dir>/<base>.png`; failures are logged.
    async fn save_image(&self, url: &str, base: &str) -> bool {
        let destination = self.image_path(base);
        match self.fetcher.fetch_png(url, &destination).await {
            Ok(()) => true,
            Err(e) => {
                log::error!("Failed to export image {url}: {e}");
                false
            }
        }
    }
}

fn avatar_base(name: &str) -> String {
    format!("avatar{name}")
}

fn push_metadata(lines: &mut Vec<String>, key: &str, value: &str) {
    match sanitize_value(value) {
        Some(value) => lines.push(format!("{METADATA_PREFIX}:{key}:{value}")),
        None => log::debug!("Empty value for '{key}', omitted"),
    }
}

/// Make `value` a single non-empty token: no line breaks, no delimiter.
pub fn sanitize_value(value: &str) -> Option<String> {
    let sanitized: String = value
        .chars()
        .filter(|c| *c != '\r' && *c != '\n')
        .map(|c| if c == ':' { DELIMITER_SUBSTITUTE } else { c })
        .collect();
    (!sanitized.is_empty()).then_some(sanitized)
}

/// A role id that reads back as a role line.
fn is_exportable_role_id(id: &str) -> bool {
    !id.is_empty()
        && !id.contains([':', '\r', '\n'])
        && !id.starts_with(['/', '#'])
        && !id.eq_ignore_ascii_case(METADATA_PREFIX)
}

fn write_new(path: &Path, contents: &str) -> Result<(), ThemeError> {
    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::AlreadyExists => ThemeError::ThemeAlreadyExists {
                path: path.to_path_buf(),
            },
            _ => ThemeError::io(path, e),
        })?;
    file.write_all(contents.as_bytes())
        .map_err(|e| ThemeError::io(path, e))
}

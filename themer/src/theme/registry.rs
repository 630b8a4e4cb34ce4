use super::diagnostics::ValidationReport;
use super::parser::ThemeParser;
use super::types::{THEME_EXTENSION, ThemeToken};
use super::validator::ThemeValidator;
use crate::common::ThemeError;
use crate::platform::RoleResolver;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// All successfully parsed themes, keyed by file name without extension.
#[derive(Debug, Clone)]
pub struct ThemeRegistry {
    validator: ThemeValidator,
    parser: ThemeParser,
    themes: HashMap<String, ThemeToken>,
}

impl ThemeRegistry {
    pub fn new(themes_root: impl Into<PathBuf>) -> Self {
        Self {
            validator: ThemeValidator::new(themes_root),
            parser: ThemeParser,
            themes: HashMap::new(),
        }
    }

    pub fn themes_root(&self) -> &Path {
        self.validator.themes_root()
    }

    /// Validate and parse every theme file directly inside `directory`.
    ///
    /// Subdirectories and files without the theme extension are ignored.
    /// One bad file never aborts the batch. Returns the number of themes
    /// loaded by this pass.
    pub fn load_all<R: RoleResolver + ?Sized>(
        &mut self,
        directory: &Path,
        roles: &R,
    ) -> Result<usize, ThemeError> {
        log::info!("Loading and parsing themes from {}", directory.display());

        if !directory.is_dir() {
            log::error!(
                "Theme directory {} does not exist, no themes loaded",
                directory.display()
            );
            return Ok(0);
        }

        let entries = std::fs::read_dir(directory).map_err(|e| ThemeError::io(directory, e))?;
        let mut files: Vec<PathBuf> = entries
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry.path()),
                Err(e) => {
                    log::warn!("Skipping unreadable directory entry: {e}");
                    None
                }
            })
            .filter(|path| path.is_file() && is_theme_file(path))
            .collect();
        files.sort();

        if files.is_empty() {
            log::error!("No themes are in the theme directory!");
            return Ok(0);
        }

        let mut loaded = 0;
        for path in &files {
            match self.load_file(path, roles) {
                Ok(report) if report.is_accepted() => loaded += 1,
                Ok(report) => log::warn!(
                    "[{}] Theme rejected with {} error(s)",
                    report.file_name(),
                    report.errors().count()
                ),
                Err(e) => log::error!("Failed to load theme {}: {e}", path.display()),
            }
        }

        log::info!("Loaded and parsed a total of {} theme(s)!", self.len());
        for name in self.names() {
            if let Some(token) = self.themes.get(&name) {
                log::debug!(
                    "{} ({}) (Parser: {})",
                    token.name(),
                    token.display_name(),
                    token.parser_version()
                );
            }
        }
        Ok(loaded)
    }

    /// Validate one file and, when accepted, parse and register it.
    pub fn load_file<R: RoleResolver + ?Sized>(
        &mut self,
        path: &Path,
        roles: &R,
    ) -> Result<ValidationReport, ThemeError> {
        log::debug!("Validating theme file {}", path.display());
        let report = self.validator.validate(path, roles);
        if !report.is_accepted() {
            return Ok(report);
        }

        let token = self.parser.parse(path, roles)?;
        self.insert(token);
        Ok(report)
    }

    /// Register a token, replacing any theme with the same name.
    pub fn insert(&mut self, token: ThemeToken) -> Option<ThemeToken> {
        let previous = self.themes.insert(token.name().to_string(), token);
        if let Some(old) = &previous {
            log::debug!("Replaced previously loaded theme '{}'", old.name());
        }
        previous
    }

    pub fn lookup(&self, name: &str) -> Result<&ThemeToken, ThemeError> {
        self.themes.get(name).ok_or_else(|| ThemeError::ThemeNotFound {
            name: name.to_string(),
        })
    }

    pub fn exists(&self, name: &str) -> bool {
        self.themes.contains_key(name)
    }

    /// Registered theme names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.themes.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.themes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.themes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ThemeToken> {
        self.themes.values()
    }
}

/// Theme files carry the exact lowercase extension.
pub fn is_theme_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == THEME_EXTENSION)
}

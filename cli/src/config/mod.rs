use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub mod app;
pub mod limits;
pub mod validation;

pub use app::{ActionModeSetting, AppConfig};
pub use validation::{ConfigLoadResult, ConfigValidationError};

use limits::{CONFIG_FILE_NAME, DEFAULT_LOG_LEVEL, ENV_PREFIX};

/// Where to look for the configuration file when none is given explicitly:
/// the working directory first, then the user config directory.
pub fn default_config_path() -> Option<PathBuf> {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.is_file() {
        return Some(local);
    }
    dirs::config_dir()
        .map(|dir| dir.join("discord-themer").join(CONFIG_FILE_NAME))
        .filter(|path| path.is_file())
}

/// Load configuration from the optional file and `THEMER_*` environment
/// variables; nested keys use `__`, e.g. `THEMER_QUEUE__MAX_RETRIES`.
///
/// An explicitly given file must exist.
pub fn load_config(explicit: Option<&Path>) -> ConfigLoadResult {
    dotenv::dotenv().ok();

    let env_source = Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true);

    let mut builder = Config::builder();
    let file = match explicit {
        Some(path) => Some((path.to_path_buf(), true)),
        None => default_config_path().map(|path| (path, false)),
    };
    if let Some((path, required)) = file {
        builder = builder.add_source(
            File::new(&path.to_string_lossy(), FileFormat::Toml).required(required),
        );
    }

    let config = match builder.add_source(env_source).build() {
        Ok(config) => config,
        Err(e) => {
            return ConfigLoadResult::LoadError(format!(
                "Configuration loading failed: {e}. Please check your themer.toml file and environment variables."
            ));
        }
    };

    match config.try_deserialize::<AppConfig>() {
        Ok(app_config) => ConfigLoadResult::Success(Box::new(app_config)),
        Err(e) => ConfigLoadResult::DeserializeError(format!("Failed to deserialize config: {e}")),
    }
}

/// Logging configuration
#[derive(Debug, Deserialize, Default, Clone)]
pub struct LoggingConfig {
    level: Option<String>,
    file: Option<String>,
}

impl LoggingConfig {
    pub fn level(&self) -> &str {
        self.level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }

    pub fn file(&self) -> Option<&str> {
        self.file.as_deref()
    }
}

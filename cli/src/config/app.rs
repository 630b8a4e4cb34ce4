use super::{LoggingConfig, limits::*, validation::ConfigValidationError};
use serde::Deserialize;
use std::path::PathBuf;
use std::str::FromStr;
use themer::action::ExecutorConfig;
use themer::assets::DEFAULT_USER_AGENT;
use themer::themer::default_themes_dir;

/// How applied themes reach the guild.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActionModeSetting {
    #[default]
    Immediate,
    Queue,
}

impl ActionModeSetting {
    pub const EXPECTED: &'static str = "immediate, queue";
}

impl FromStr for ActionModeSetting {
    type Err = ConfigValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "immediate" => Ok(ActionModeSetting::Immediate),
            "queue" | "queued" => Ok(ActionModeSetting::Queue),
            _ => Err(ConfigValidationError::ActionMode {
                configured: s.to_string(),
                expected: Self::EXPECTED,
            }),
        }
    }
}

/// Main application configuration
#[derive(Debug, Deserialize, Default, Clone)]
pub struct AppConfig {
    themes_dir: Option<PathBuf>,
    action_mode: Option<String>,
    user_agent: Option<String>,
    #[serde(default)]
    queue: ExecutorConfig,
    #[serde(default)]
    logging: LoggingConfig,
}

impl AppConfig {
    /// Validate the configuration, collecting every violation
    pub fn validate(&self) -> Result<(), Vec<ConfigValidationError>> {
        let mut errors = Vec::new();

        if self.queue.max_concurrent_requests == 0 {
            errors.push(ConfigValidationError::Concurrency {
                configured: self.queue.max_concurrent_requests,
            });
        }

        if self.queue.requests_per_second == 0 {
            errors.push(ConfigValidationError::RequestRate {
                configured: self.queue.requests_per_second,
            });
        }

        if let Some(0) = self.queue.burst_size {
            errors.push(ConfigValidationError::BurstSize { configured: 0 });
        }

        if self.queue.max_retries > MAX_DELIVERY_RETRIES {
            errors.push(ConfigValidationError::MaxRetries {
                configured: self.queue.max_retries,
                limit: MAX_DELIVERY_RETRIES,
            });
        }

        if self.user_agent.as_deref().is_some_and(|ua| ua.trim().is_empty()) {
            errors.push(ConfigValidationError::EmptyUserAgent);
        }

        if let Err(e) = self.action_mode() {
            errors.push(e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    pub fn themes_dir(&self) -> PathBuf {
        self.themes_dir.clone().unwrap_or_else(default_themes_dir)
    }

    pub fn action_mode(&self) -> Result<ActionModeSetting, ConfigValidationError> {
        match self.action_mode.as_deref() {
            Some(mode) => mode.parse(),
            None => Ok(ActionModeSetting::default()),
        }
    }

    pub fn user_agent(&self) -> &str {
        self.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT)
    }

    pub fn queue(&self) -> &ExecutorConfig {
        &self.queue
    }

    pub fn logging(&self) -> &LoggingConfig {
        &self.logging
    }
}

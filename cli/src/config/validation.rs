use super::app::AppConfig;

/// Configuration validation errors
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigValidationError {
    #[error("Invalid queue.max_concurrent_requests: {configured} (min: 1)")]
    Concurrency { configured: usize },
    #[error("Invalid queue.requests_per_second: {configured} (min: 1)")]
    RequestRate { configured: u32 },
    #[error("Invalid queue.burst_size: {configured} (min: 1)")]
    BurstSize { configured: u32 },
    #[error("Invalid queue.max_retries: {configured} (limit: {limit})")]
    MaxRetries { configured: u32, limit: u32 },
    #[error("Invalid user_agent: value is empty")]
    EmptyUserAgent,
    #[error("Invalid action_mode: '{configured}' (expected one of: {expected})")]
    ActionMode {
        configured: String,
        expected: &'static str,
    },
}

impl ConfigValidationError {
    pub fn user_message(&self) -> String {
        match self {
            ConfigValidationError::Concurrency { configured } => {
                format!(
                    "Queue concurrency must be at least 1!\n\n\
                    Your configured value: {configured}\n\n\
                    Please update queue.max_concurrent_requests in themer.toml."
                )
            }
            ConfigValidationError::RequestRate { configured } => {
                format!(
                    "Queue request rate must be at least 1 per second!\n\n\
                    Your configured value: {configured}\n\n\
                    Please update queue.requests_per_second in themer.toml."
                )
            }
            ConfigValidationError::BurstSize { configured } => {
                format!(
                    "Queue burst size must be at least 1!\n\n\
                    Your configured value: {configured}\n\n\
                    Please update or remove queue.burst_size in themer.toml."
                )
            }
            ConfigValidationError::MaxRetries { configured, limit } => {
                format!(
                    "Too many delivery retries configured!\n\n\
                    Your configured value: {configured}\n\
                    Maximum: {limit}\n\n\
                    Please update queue.max_retries in themer.toml."
                )
            }
            ConfigValidationError::EmptyUserAgent => "The user agent cannot be empty!\n\n\
                Image downloads are refused without one.\n\n\
                Please set user_agent in themer.toml or remove it to use the default."
                .to_string(),
            ConfigValidationError::ActionMode {
                configured,
                expected,
            } => {
                format!(
                    "Unknown action mode '{configured}'!\n\n\
                    Valid values: {expected}\n\n\
                    Please update action_mode in themer.toml."
                )
            }
        }
    }
}

/// Configuration loading result
pub enum ConfigLoadResult {
    Success(Box<AppConfig>),
    LoadError(String),
    DeserializeError(String),
}

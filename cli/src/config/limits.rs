/// Upper bound for `queue.max_retries`
pub const MAX_DELIVERY_RETRIES: u32 = 10;

/// Default configuration file name
pub const CONFIG_FILE_NAME: &str = "themer.toml";

/// Environment variable prefix
pub const ENV_PREFIX: &str = "THEMER";

pub const DEFAULT_LOG_LEVEL: &str = "info";

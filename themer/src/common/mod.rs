pub mod errors;
pub mod rate_limiter;

pub use errors::{AssetError, HttpError, ThemeError};
pub use rate_limiter::{RateLimitError, RateLimiter, RateLimiterConfig};

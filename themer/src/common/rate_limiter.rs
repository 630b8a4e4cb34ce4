use governor::{
    Quota, RateLimiter as GovernorRateLimiter,
    clock::DefaultClock,
    middleware::NoOpMiddleware,
    state::{InMemoryState, NotKeyed},
};
use serde::Deserialize;
use std::num::NonZeroU32;
use std::sync::Arc;

/// Rate limiter for outbound mutation requests
#[derive(Clone)]
pub struct RateLimiter {
    inner: Arc<GovernorRateLimiter<NotKeyed, InMemoryState, DefaultClock, NoOpMiddleware>>,
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter").finish_non_exhaustive()
    }
}

impl RateLimiter {
    /// Create a rate limiter with custom quota
    pub fn with_quota(quota: Quota) -> Self {
        Self {
            inner: Arc::new(GovernorRateLimiter::direct(quota)),
        }
    }

    /// Wait until a request can proceed
    pub async fn wait_until_ready(&self) {
        self.inner.until_ready().await;
    }
}

/// Rate limiting errors
#[derive(Debug, thiserror::Error)]
pub enum RateLimitError {
    #[error("Invalid rate limit quota: {field} must be greater than zero")]
    InvalidQuota { field: &'static str },
}

/// Rate limiter configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimiterConfig {
    /// Maximum requests per second
    pub requests_per_second: u32,
    /// Maximum burst size (defaults to requests_per_second)
    pub burst_size: Option<u32>,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self {
            requests_per_second: 5,
            burst_size: None,
        }
    }
}

impl RateLimiterConfig {
    /// Create a rate limiter from this configuration
    pub fn build(&self) -> Result<RateLimiter, RateLimitError> {
        let per_second = NonZeroU32::new(self.requests_per_second).ok_or(
            RateLimitError::InvalidQuota {
                field: "requests_per_second",
            },
        )?;
        let burst = NonZeroU32::new(self.burst_size.unwrap_or(self.requests_per_second))
            .ok_or(RateLimitError::InvalidQuota {
                field: "burst_size",
            })?;

        Ok(RateLimiter::with_quota(
            Quota::per_second(per_second).allow_burst(burst),
        ))
    }
}

//! Retry policy for the archive client, kept separate from the request
//! logic so backoff behavior is testable without real network delays.

use reqwest::StatusCode;
use std::future::Future;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Sleeping goes through this trait so tests can observe requested delays
/// instead of waiting them out.
pub trait Sleep {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send;
}

/// The runtime sleeper used outside of tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleep;

impl Sleep for TokioSleep {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Bounded exponential backoff with jitter and server-hint support.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    /// Delay before the retry following failed attempt number `attempt`
    /// (zero-based). A server-supplied hint overrides the backoff schedule
    /// but is still capped.
    pub fn delay_for(&self, attempt: u32, server_hint: Option<Duration>) -> Duration {
        if let Some(hint) = server_hint {
            return hint.min(self.max_delay);
        }
        let exponential = self.base_delay.as_secs_f64() * 2f64.powi(attempt.min(16) as i32);
        let jittered = exponential * (1.0 + 0.25 * jitter_fraction());
        Duration::from_secs_f64(jittered).min(self.max_delay)
    }
}

/// Rate limiting and transient server errors are worth retrying; every other
/// non-2xx status is fatal for the run.
pub fn is_retryable_status(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::TOO_MANY_REQUESTS
            | StatusCode::INTERNAL_SERVER_ERROR
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT
    )
}

fn jitter_fraction() -> f64 {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or(0);
    (nanos % 1000) as f64 / 1000.0
}

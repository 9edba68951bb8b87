//! Bounded retry with jittered delays.

use std::time::Duration;

use rand::Rng;
use tokio::time::sleep;

use crate::config::NetworkConfig;

/// How many times to try an operation and how long to pause between tries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    min_delay: Duration,
    max_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, min_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            min_delay: min_delay.min(max_delay),
            max_delay,
        }
    }

    /// Policy for image downloads.
    pub fn downloads(network: &NetworkConfig) -> Self {
        Self::new(
            network.download_attempts,
            Duration::from_millis(network.retry_delay_min_ms),
            Duration::from_millis(network.retry_delay_max_ms),
        )
    }

    /// Policy for artwork page navigation, paced one second slower than downloads.
    pub fn navigation(network: &NetworkConfig) -> Self {
        Self::new(
            network.extract_attempts,
            Duration::from_millis(network.retry_delay_min_ms.saturating_mul(2)),
            Duration::from_millis(network.retry_delay_max_ms.saturating_add(1000)),
        )
    }

    /// Policy for "next page" lookups.
    pub fn pagination(network: &NetworkConfig) -> Self {
        Self::new(
            network.next_page_attempts,
            Duration::from_millis(network.retry_delay_min_ms),
            Duration::from_millis(network.retry_delay_max_ms),
        )
    }

    /// Policy without pauses, for tests.
    pub fn immediate(max_attempts: u32) -> Self {
        Self::new(max_attempts, Duration::ZERO, Duration::ZERO)
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// A random delay within the configured bounds.
    pub fn jitter(&self) -> Duration {
        let min = self.min_delay.as_millis() as u64;
        let max = self.max_delay.as_millis() as u64;
        if max == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::thread_rng().gen_range(min..=max))
    }

    /// Sleep for a jittered delay.
    pub async fn pause(&self) {
        let delay = self.jitter();
        if !delay.is_zero() {
            sleep(delay).await;
        }
    }
}

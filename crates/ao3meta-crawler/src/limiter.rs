use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::{sleep_until, Instant};

use crate::config::Throttle;
use crate::error::ConfigError;

/// Hands out request slots no closer than `interval` apart.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    interval: Duration,
    next_slot: Arc<Mutex<Option<Instant>>>,
}

impl RateLimiter {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_slot: Arc::new(Mutex::new(None)),
        }
    }

    pub fn unlimited() -> Self {
        Self::new(Duration::ZERO)
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Waits until the next slot is available and books the following one.
    pub async fn acquire(&self) {
        let mut next_slot = self.next_slot.lock().await;
        if let Some(at) = *next_slot {
            if at > Instant::now() {
                sleep_until(at).await;
            }
        }
        *next_slot = Some(Instant::now() + self.interval);
    }
}

impl TryFrom<Option<Throttle>> for RateLimiter {
    type Error = ConfigError;

    fn try_from(throttle: Option<Throttle>) -> Result<Self, Self::Error> {
        match throttle {
            Some(throttle) => Ok(Self::new(throttle.interval()?)),
            None => Ok(Self::unlimited()),
        }
    }
}

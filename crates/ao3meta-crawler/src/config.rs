use std::num::NonZeroUsize;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlerConfig {
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default = "default_throttle")]
    pub throttle: Option<Throttle>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            throttle: default_throttle(),
        }
    }
}

fn default_user_agent() -> String {
    String::from(
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
         (KHTML, like Gecko) Chrome/96.0.4664.45 Safari/537.36",
    )
}

fn default_throttle() -> Option<Throttle> {
    Some(Throttle::default())
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Throttle {
    /// The number of requests per second
    PerSecond(NonZeroUsize),
    /// The delay in seconds between requests
    Delay(f32),
}

impl Throttle {
    /// Minimum time between the start of two requests.
    pub fn interval(&self) -> Result<Duration, ConfigError> {
        let invalid = |reason: String| ConfigError::Throttle {
            throttle: *self,
            reason,
        };
        match self {
            Self::PerSecond(n) => {
                let n = u32::try_from(n.get()).map_err(|e| invalid(e.to_string()))?;
                Ok(Duration::from_secs(1) / n)
            }
            Self::Delay(secs) => {
                Duration::try_from_secs_f32(secs.max(0.)).map_err(|e| invalid(e.to_string()))
            }
        }
    }
}

impl Default for Throttle {
    fn default() -> Self {
        Self::Delay(10.)
    }
}

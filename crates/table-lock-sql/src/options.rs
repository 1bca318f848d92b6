//! Lock timing and selection options.

use std::time::Duration;

use serde::{Deserialize, Deserializer};

/// Default advisory lifetime and wait budget.
pub const DEFAULT_TTL: Duration = Duration::from_secs(30);
/// Default delay between polls while waiting for a release.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(2);
/// Default backend selection priority.
pub const DEFAULT_PRIORITY: i32 = 95;

/// Options shared by every lock a provider creates.
///
/// Deserializes from `{ "ttl": 30, "poll_interval_ms": 2, "priority": 95 }`;
/// every field is optional.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DatabaseLockOptions {
    /// Advisory lifetime recorded with each row, in whole seconds.
    ///
    /// Also bounds each wait for a release: `max(1s, ttl)`.
    #[serde(deserialize_with = "seconds")]
    pub ttl: Duration,
    /// Delay between holder probes while waiting.
    #[serde(rename = "poll_interval_ms", deserialize_with = "millis")]
    pub poll_interval: Duration,
    /// Priority reported to backend selection; higher wins.
    pub priority: i32,
}

impl DatabaseLockOptions {
    /// The wait budget for one wait-for-release cycle.
    pub fn wait_budget(&self) -> Duration {
        self.ttl.max(Duration::from_secs(1))
    }

    /// TTL as stored in the `ttl` column.
    pub fn ttl_seconds(&self) -> i64 {
        i64::try_from(self.ttl.as_secs()).unwrap_or(i64::MAX)
    }
}

impl Default for DatabaseLockOptions {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_TTL,
            poll_interval: DEFAULT_POLL_INTERVAL,
            priority: DEFAULT_PRIORITY,
        }
    }
}

fn seconds<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
    u64::deserialize(deserializer).map(Duration::from_secs)
}

fn millis<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
    u64::deserialize(deserializer).map(Duration::from_millis)
}

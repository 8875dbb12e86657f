//! Tracker configuration

use serde::{Deserialize, Serialize};

/// Configuration for the instance tracker
///
/// All intervals are in milliseconds so the struct round-trips through plain
/// config files without a duration syntax.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// An instance whose last update is older than this is removed by the
    /// sweep (default: 30 s)
    #[serde(default = "default_stale_after")]
    pub stale_after_ms: u64,

    /// How often the embedder is expected to call `tick` (default: 5 s);
    /// `tick` runs the sweep at most this often
    #[serde(default = "default_sweep_every")]
    pub sweep_every_ms: u64,

    /// Minimum gap between two detection notifications (default: 2 s);
    /// net changes inside the gap are coalesced into one trailing
    /// notification
    #[serde(default = "default_min_notify_gap")]
    pub min_notify_gap_ms: u64,
}

fn default_stale_after() -> u64 {
    30_000
}

fn default_sweep_every() -> u64 {
    5_000
}

fn default_min_notify_gap() -> u64 {
    2_000
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            stale_after_ms: default_stale_after(),
            sweep_every_ms: default_sweep_every(),
            min_notify_gap_ms: default_min_notify_gap(),
        }
    }
}

impl TrackerConfig {
    /// Create a configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the staleness threshold
    pub fn with_stale_after_ms(mut self, ms: u64) -> Self {
        self.stale_after_ms = ms;
        self
    }

    /// Builder method: set the sweep interval
    pub fn with_sweep_every_ms(mut self, ms: u64) -> Self {
        self.sweep_every_ms = ms;
        self
    }

    /// Builder method: set the notification rate limit
    pub fn with_min_notify_gap_ms(mut self, ms: u64) -> Self {
        self.min_notify_gap_ms = ms;
        self
    }

    pub fn stale_after(&self) -> chrono::Duration {
        chrono::Duration::milliseconds(self.stale_after_ms as i64)
    }

    pub fn sweep_every(&self) -> chrono::Duration {
        chrono::Duration::milliseconds(self.sweep_every_ms as i64)
    }

    pub fn min_notify_gap(&self) -> chrono::Duration {
        chrono::Duration::milliseconds(self.min_notify_gap_ms as i64)
    }
}

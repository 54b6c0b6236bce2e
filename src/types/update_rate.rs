//! Update rate control for sample streams.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Update rate for live sample subscriptions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum UpdateRate {
    /// Full speed from the acquisition loop.
    Native,

    /// Throttled to at most this many batches per second.
    /// If the requested rate meets or exceeds the source rate, Native is used.
    /// `Max(0)` is clamped to one batch per second.
    Max(u32),
}

impl UpdateRate {
    /// Normalize against the source frequency, collapsing a `Max` that is at
    /// least as fast as the source into `Native` and clamping `Max(0)`.
    pub fn normalize(self, source_hz: f64) -> Self {
        let UpdateRate::Max(hz) = self else {
            return UpdateRate::Native;
        };
        let hz = hz.max(1);
        if hz as f64 >= source_hz { UpdateRate::Native } else { UpdateRate::Max(hz) }
    }

    /// Throttle interval, if throttling is needed at this source frequency.
    pub fn throttle_interval(self, source_hz: f64) -> Option<Duration> {
        match self.normalize(source_hz) {
            UpdateRate::Native => None,
            UpdateRate::Max(hz) => Some(Duration::from_secs(1).div_f64(hz as f64)),
        }
    }
}

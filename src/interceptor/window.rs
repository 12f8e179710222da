// SPDX-License-Identifier: Apache-2.0

use std::time::{Duration, Instant};

use tracing::warn;

use crate::timer::TimerContext;

/// Open timer window; closed on drop.
pub(crate) struct TimingWindow<'a> {
    timers: &'a dyn TimerContext,
    operation: &'static str,
    opened_at: Instant,
    slow_threshold: Option<Duration>,
}

impl<'a> TimingWindow<'a> {
    pub(crate) fn open(
        timers: &'a dyn TimerContext,
        operation: &'static str,
        slow_threshold: Option<Duration>,
    ) -> Self {
        timers.start();
        Self {
            timers,
            operation,
            opened_at: Instant::now(),
            slow_threshold,
        }
    }
}

impl Drop for TimingWindow<'_> {
    fn drop(&mut self) {
        self.timers.stop();

        if let Some(threshold) = self.slow_threshold {
            let elapsed = self.opened_at.elapsed();
            if elapsed >= threshold {
                warn!(
                    operation = self.operation,
                    elapsed_ms = elapsed.as_millis() as u64,
                    threshold_ms = threshold.as_millis() as u64,
                    "Slow driver operation"
                );
            }
        }
    }
}

// SPDX-License-Identifier: Apache-2.0

//! Nested stopwatch owned by a single execution context.

use std::cell::Cell;
use std::sync::OnceLock;
use std::time::Instant;

use tracing::warn;

const NANOS_PER_MILLI: i64 = 1_000_000;

/// Monotonic nanoseconds since the first call in this process
fn monotonic_nanos() -> i64 {
    static ORIGIN: OnceLock<Instant> = OnceLock::new();
    let origin = *ORIGIN.get_or_init(Instant::now);
    i64::try_from(origin.elapsed().as_nanos()).unwrap_or(i64::MAX)
}

/// Accumulates the duration of outermost `start`/`stop` windows.
///
/// Opening a window subtracts the current timestamp from the accumulator and
/// closing it adds the timestamp back, so between windows the accumulator holds
/// the total elapsed nanoseconds. Not `Sync`: each context owns its own timer.
#[derive(Debug, Default)]
pub struct ScopedTimer {
    accumulated_nanos: Cell<i64>,
    nesting_depth: Cell<u32>,
    was_invoked: Cell<bool>,
}

impl ScopedTimer {
    pub const fn new() -> Self {
        Self {
            accumulated_nanos: Cell::new(0),
            nesting_depth: Cell::new(0),
            was_invoked: Cell::new(false),
        }
    }

    /// Clears accumulated time, nesting depth and the invoked flag.
    pub fn reset(&self) {
        self.accumulated_nanos.set(0);
        self.nesting_depth.set(0);
        self.was_invoked.set(false);
    }

    /// Opens a window, or deepens the current one.
    pub fn start(&self) {
        let depth = self.nesting_depth.get();
        if depth == 0 {
            self.was_invoked.set(true);
            self.accumulated_nanos
                .set(self.accumulated_nanos.get().wrapping_sub(monotonic_nanos()));
        }
        self.nesting_depth.set(depth + 1);
    }

    /// Closes the innermost window; time is recorded when the outermost one closes.
    ///
    /// A `stop` without a matching `start` is ignored.
    pub fn stop(&self) {
        let depth = self.nesting_depth.get();
        if depth == 0 {
            warn!("Timer stopped without a matching start; ignoring");
            return;
        }
        self.nesting_depth.set(depth - 1);
        if depth == 1 {
            self.accumulated_nanos
                .set(self.accumulated_nanos.get().wrapping_add(monotonic_nanos()));
        }
    }

    /// Accumulated time in whole milliseconds, truncated toward zero.
    ///
    /// Only meaningful while no window is open.
    pub fn elapsed_time(&self) -> i64 {
        self.accumulated_nanos.get() / NANOS_PER_MILLI
    }

    /// True once any window has been opened since the last reset.
    pub fn was_invoked(&self) -> bool {
        self.was_invoked.get()
    }

    pub fn nesting_depth(&self) -> u32 {
        self.nesting_depth.get()
    }

    pub fn is_running(&self) -> bool {
        self.nesting_depth.get() > 0
    }
}

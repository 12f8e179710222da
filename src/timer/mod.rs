// SPDX-License-Identifier: Apache-2.0

//! Per-context latency accumulation
//!
//! A `ScopedTimer` accumulates the wall-clock time spent inside timed windows
//! for one execution context. Windows nest: only the outermost window of a
//! nested group contributes, so re-entrant timed calls are not double-counted.
//! `TimerContext` handles resolve the timer belonging to the calling thread or
//! task.

pub mod context;
pub mod scoped;

pub use context::{TaskTimers, ThreadTimers, TimerContext};
pub use scoped::ScopedTimer;

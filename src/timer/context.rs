// SPDX-License-Identifier: Apache-2.0

//! Handles resolving the `ScopedTimer` of the calling execution context.

use std::future::Future;

use crate::timer::ScopedTimer;

thread_local! {
    static THREAD_TIMER: ScopedTimer = const { ScopedTimer::new() };
}

tokio::task_local! {
    static TASK_TIMER: ScopedTimer;
}

/// Resolves the timer owned by whichever context is calling.
///
/// Implementations never share a timer between concurrently running contexts.
pub trait TimerContext: Send + Sync {
    /// Runs `f` against the calling context's timer
    fn with_timer(&self, f: &mut dyn FnMut(&ScopedTimer));

    fn start(&self) {
        self.with_timer(&mut |timer| timer.start());
    }

    fn stop(&self) {
        self.with_timer(&mut |timer| timer.stop());
    }

    fn reset(&self) {
        self.with_timer(&mut |timer| timer.reset());
    }

    /// Elapsed milliseconds of the calling context
    fn elapsed_time(&self) -> i64 {
        let mut elapsed = 0;
        self.with_timer(&mut |timer| elapsed = timer.elapsed_time());
        elapsed
    }

    fn was_invoked(&self) -> bool {
        let mut invoked = false;
        self.with_timer(&mut |timer| invoked = timer.was_invoked());
        invoked
    }
}

/// One timer per OS thread
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadTimers;

impl TimerContext for ThreadTimers {
    fn with_timer(&self, f: &mut dyn FnMut(&ScopedTimer)) {
        THREAD_TIMER.with(|timer| f(timer));
    }
}

/// One timer per tokio task
///
/// A task gets its timer by running inside `TaskTimers::scope`. Code running
/// outside any scope falls back to the thread's timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TaskTimers;

impl TaskTimers {
    /// Runs `future` with a fresh timer of its own
    pub async fn scope<F: Future>(future: F) -> F::Output {
        TASK_TIMER.scope(ScopedTimer::new(), future).await
    }

    /// Runs `f` with a fresh timer of its own
    pub fn sync_scope<R>(f: impl FnOnce() -> R) -> R {
        TASK_TIMER.sync_scope(ScopedTimer::new(), f)
    }

    /// True when called inside a `scope`
    pub fn in_scope() -> bool {
        TASK_TIMER.try_with(|_| ()).is_ok()
    }
}

impl TimerContext for TaskTimers {
    fn with_timer(&self, f: &mut dyn FnMut(&ScopedTimer)) {
        if TASK_TIMER.try_with(|timer| f(timer)).is_err() {
            THREAD_TIMER.with(|timer| f(timer));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::scoped::tests::{roughly, ticks};
    use std::thread::sleep;

    #[test]
    fn test_thread_timer_roundtrip() {
        let timers = ThreadTimers;
        timers.reset();
        assert!(!timers.was_invoked());

        timers.start();
        sleep(ticks(2));
        timers.stop();

        assert!(timers.was_invoked());
        assert!(roughly(timers.elapsed_time(), 2));

        timers.reset();
        assert_eq!(timers.elapsed_time(), 0);
        assert!(!timers.was_invoked());
    }

    #[test]
    fn test_threads_are_isolated() {
        let timers = ThreadTimers;
        timers.reset();

        let results: Vec<i64> = std::thread::scope(|s| {
            let handles: Vec<_> = [4, 2, 3]
                .into_iter()
                .map(|n| {
                    s.spawn(move || {
                        let timers = ThreadTimers;
                        timers.start();
                        sleep(ticks(n));
                        timers.stop();
                        timers.elapsed_time()
                    })
                })
                .collect();

            assert!(!timers.was_invoked());
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert!(roughly(results[0], 4), "got {}ms", results[0]);
        assert!(roughly(results[1], 2), "got {}ms", results[1]);
        assert!(roughly(results[2], 3), "got {}ms", results[2]);
        assert!(!timers.was_invoked());
    }

    #[tokio::test]
    async fn test_tasks_are_isolated() {
        async fn timed(n: u64) -> (i64, bool) {
            let timers = TaskTimers;
            timers.start();
            tokio::time::sleep(ticks(n)).await;
            timers.stop();
            (timers.elapsed_time(), timers.was_invoked())
        }

        // All three run interleaved on the single test thread
        let (a, b, c) = tokio::join!(
            TaskTimers::scope(timed(4)),
            TaskTimers::scope(timed(2)),
            TaskTimers::scope(timed(3)),
        );

        assert!(roughly(a.0, 4), "got {}ms", a.0);
        assert!(roughly(b.0, 2), "got {}ms", b.0);
        assert!(roughly(c.0, 3), "got {}ms", c.0);
        assert!(a.1 && b.1 && c.1);
    }

    #[test]
    fn test_task_timers_fall_back_to_thread_timer() {
        ThreadTimers.reset();
        assert!(!TaskTimers::in_scope());

        TaskTimers.start();
        TaskTimers.stop();
        assert!(ThreadTimers.was_invoked());

        let scoped_invoked = TaskTimers::sync_scope(|| {
            assert!(TaskTimers::in_scope());
            assert!(!TaskTimers.was_invoked());
            TaskTimers.start();
            TaskTimers.stop();
            TaskTimers.was_invoked()
        });
        assert!(scoped_invoked);
        ThreadTimers.reset();
    }
}

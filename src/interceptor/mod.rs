// SPDX-License-Identifier: Apache-2.0

//! Driver Object Interceptor
//!
//! Wraps the objects a driver hands out so their hot operations are timed:
//! - **Decorators**: one wrapper per object category, forwarding every call to
//!   the real object exactly once
//! - **Recursive wrapping**: results that are themselves tracked objects come
//!   back wrapped; everything else passes through untouched
//! - **Timing**: operations named in `TIMED_OPERATIONS` run inside a window of
//!   the calling context's `ScopedTimer`

use std::sync::Arc;
use std::time::Duration;

use qore_driver_api::DriverResult;
use tracing::trace;

use crate::config::PerfConfig;
use crate::timer::TimerContext;

/// Defines a wrapper struct around a boxed driver object plus its marker impls.
macro_rules! instrumented_object {
    ($(#[$doc:meta])* $wrapper:ident wraps $object:ident) => {
        $(#[$doc])*
        pub struct $wrapper {
            inner: Box<dyn $object>,
            interceptor: $crate::interceptor::Interceptor,
        }

        impl $wrapper {
            pub fn new(inner: Box<dyn $object>, interceptor: $crate::interceptor::Interceptor) -> Self {
                Self { inner, interceptor }
            }
        }

        impl qore_driver_api::Instrumented for $wrapper {
            fn original_type(&self) -> &'static str {
                qore_driver_api::DriverObject::type_name(&*self.inner)
            }
        }

        impl qore_driver_api::DriverObject for $wrapper {
            fn instrumented(&self) -> Option<&dyn qore_driver_api::Instrumented> {
                Some(self)
            }
        }
    };
}

pub mod array;
pub mod category;
pub mod connection;
pub mod metadata;
pub mod result_set;
pub mod statement;
mod window;

pub use array::InstrumentedArray;
pub use category::{Category, Instrument};
pub use connection::InstrumentedConnection;
pub use metadata::InstrumentedMetaData;
pub use result_set::InstrumentedResultSet;
pub use statement::{
    InstrumentedCallableStatement, InstrumentedPreparedStatement, InstrumentedStatement,
};

use window::TimingWindow;

/// Logical names of the hot operations
pub mod operation {
    pub const EXECUTE: &str = "execute";
    pub const EXECUTE_QUERY: &str = "execute_query";
    pub const EXECUTE_UPDATE: &str = "execute_update";
    pub const EXECUTE_BATCH: &str = "execute_batch";
    pub const NEXT: &str = "next";
}

/// Operations whose duration is accumulated, matched by name regardless of category
pub const TIMED_OPERATIONS: [&str; 5] = [
    operation::EXECUTE,
    operation::EXECUTE_QUERY,
    operation::EXECUTE_UPDATE,
    operation::EXECUTE_BATCH,
    operation::NEXT,
];

/// Returns true if calls named `operation` are timed
pub fn is_timed(operation: &str) -> bool {
    TIMED_OPERATIONS.contains(&operation)
}

/// Shared by every wrapper produced from one entry point
#[derive(Clone)]
pub struct Interceptor {
    timers: Arc<dyn TimerContext>,
    slow_threshold: Option<Duration>,
}

impl Interceptor {
    pub fn new(timers: Arc<dyn TimerContext>) -> Self {
        Self {
            timers,
            slow_threshold: None,
        }
    }

    pub fn from_config(config: &PerfConfig) -> Self {
        Self::new(config.timers()).with_slow_threshold(config.slow_operation_threshold())
    }

    /// Timed operations lasting at least `threshold` are logged as warnings
    pub fn with_slow_threshold(mut self, threshold: Option<Duration>) -> Self {
        self.slow_threshold = threshold;
        self
    }

    /// Timer handle the hot operations report to
    pub fn timers(&self) -> &dyn TimerContext {
        self.timers.as_ref()
    }

    /// Wraps `value` if its type is a tracked category, otherwise returns it unchanged
    pub fn wrap<T: Instrument>(&self, value: T) -> T {
        value.instrument(self)
    }

    /// Runs one forwarded call.
    ///
    /// Timed operations open a window before `call` and close it after the
    /// result has been wrapped, whether the call succeeded, failed or panicked.
    /// Failures are returned as-is.
    pub fn invoke<T, F>(&self, operation: &'static str, call: F) -> DriverResult<T>
    where
        T: Instrument,
        F: FnOnce() -> DriverResult<T>,
    {
        trace!(operation, "Intercepted driver call");
        let _window = is_timed(operation)
            .then(|| TimingWindow::open(self.timers(), operation, self.slow_threshold));
        call().map(|value| self.wrap(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::ThreadTimers;
    use qore_driver_api::DriverError;

    fn interceptor() -> Interceptor {
        ThreadTimers.reset();
        Interceptor::new(Arc::new(ThreadTimers))
    }

    #[test]
    fn test_timed_operation_names() {
        for name in ["execute", "execute_query", "execute_update", "execute_batch", "next"] {
            assert!(is_timed(name), "{} should be timed", name);
        }
        for name in ["create_statement", "close", "query", "executeQuery", ""] {
            assert!(!is_timed(name), "{} should not be timed", name);
        }
    }

    #[test]
    fn test_untimed_call_leaves_timer_alone() {
        let interceptor = interceptor();
        let value = interceptor.invoke("native_sql", || Ok("SELECT 1".to_string()));
        assert_eq!(value.unwrap(), "SELECT 1");
        assert!(!ThreadTimers.was_invoked());
    }

    #[test]
    fn test_timed_call_opens_window() {
        let interceptor = interceptor();
        let count = interceptor.invoke(operation::EXECUTE_UPDATE, || Ok(3i64));
        assert_eq!(count.unwrap(), 3);
        assert!(ThreadTimers.was_invoked());
        ThreadTimers.with_timer(&mut |timer| assert_eq!(timer.nesting_depth(), 0));
    }

    #[test]
    fn test_failure_closes_window_and_propagates_unchanged() {
        let interceptor = interceptor();
        let err = interceptor
            .invoke(operation::EXECUTE, || -> DriverResult<bool> {
                Err(DriverError::execution_error("deadlock detected"))
            })
            .unwrap_err();

        assert_eq!(err, DriverError::execution_error("deadlock detected"));
        assert!(ThreadTimers.was_invoked());
        ThreadTimers.with_timer(&mut |timer| assert!(!timer.is_running()));
    }

    #[test]
    fn test_reentrant_calls_share_one_window() {
        let interceptor = interceptor();
        let inner = interceptor.clone();
        interceptor
            .invoke(operation::EXECUTE_QUERY, || {
                ThreadTimers.with_timer(&mut |timer| assert_eq!(timer.nesting_depth(), 1));
                inner.invoke(operation::NEXT, || {
                    ThreadTimers.with_timer(&mut |timer| assert_eq!(timer.nesting_depth(), 2));
                    Ok(true)
                })
            })
            .unwrap();
        ThreadTimers.with_timer(&mut |timer| assert_eq!(timer.nesting_depth(), 0));
    }

    #[test]
    fn test_panicking_call_closes_window() {
        let interceptor = interceptor();
        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _ = interceptor.invoke(operation::NEXT, || -> DriverResult<bool> {
                panic!("driver bug")
            });
        }));
        assert!(outcome.is_err());
        ThreadTimers.with_timer(&mut |timer| assert!(!timer.is_running()));
    }
}

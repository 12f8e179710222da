// QoreDB Perf - latency instrumentation for blocking database drivers
// Core library

pub mod config;
pub mod driver;
pub mod error;
pub mod interceptor;
pub mod observability;
pub mod timer;

use std::sync::Arc;

use qore_driver_api::DriverRegistry;

pub use config::PerfConfig;
pub use driver::InstrumentingDriver;
pub use error::InitError;
pub use interceptor::{Category, Instrument, Interceptor};
pub use timer::{ScopedTimer, TaskTimers, ThreadTimers, TimerContext};

/// Startup entry point: reads `QOREDB_PERF_*` configuration, installs
/// tracing, and registers the instrumenting driver with `registry`.
///
/// Any error is fatal for instrumented URLs; the host should stop starting up.
pub fn init(registry: &Arc<DriverRegistry>) -> Result<Arc<InstrumentingDriver>, InitError> {
    let config = PerfConfig::from_env()?;
    observability::init_tracing(&config);
    Ok(InstrumentingDriver::install(registry, &config)?)
}

// SPDX-License-Identifier: Apache-2.0

//! Instrumenting Driver
//!
//! Drop-in driver for `perf-<scheme>:` URLs. It resolves the real driver for
//! `<scheme>` from the registry, delegates to it, and hands back an
//! instrumented connection.

pub mod url;

use std::sync::{Arc, Weak};

use qore_driver_api::{
    Connection, Driver, DriverError, DriverRegistry, DriverResult, Properties, PropertyInfo,
};
use tracing::{debug, error, info, instrument};

use crate::config::PerfConfig;
use crate::interceptor::Interceptor;
use crate::observability::{redact_properties, RedactedUrl};

pub use self::url::{UrlRewriter, WrappedUrl};

/// Fixed identifier the driver registers under
pub const SERVICE_ID: &str = "qoredb_perf::driver::InstrumentingDriver";
pub const MAJOR_VERSION: u32 = 0;
pub const MINOR_VERSION: u32 = 1;

pub struct InstrumentingDriver {
    registry: Weak<DriverRegistry>,
    urls: UrlRewriter,
    interceptor: Interceptor,
}

impl InstrumentingDriver {
    /// Creates a driver resolving real drivers from `registry`, without registering it
    pub fn new(registry: &Arc<DriverRegistry>, config: &PerfConfig) -> DriverResult<Self> {
        config
            .validate()
            .map_err(|e| DriverError::invalid_argument(e.to_string()))?;

        Ok(Self {
            registry: Arc::downgrade(registry),
            urls: UrlRewriter::new(&config.url_prefix)?,
            interceptor: Interceptor::from_config(config),
        })
    }

    /// Creates the driver and registers it with `registry`.
    ///
    /// Meant to run once at startup. An error here means instrumented URLs
    /// cannot be served, and callers should abort initialization.
    pub fn install(registry: &Arc<DriverRegistry>, config: &PerfConfig) -> DriverResult<Arc<Self>> {
        let driver = Arc::new(Self::new(registry, config)?);

        if let Err(err) = registry.register(driver.clone()) {
            error!(error = %err, "Failed to register instrumenting driver");
            return Err(err);
        }

        info!(
            id = SERVICE_ID,
            prefix = driver.urls.prefix(),
            "Instrumenting driver registered"
        );
        Ok(driver)
    }

    /// Rewrites `url` and finds the registered driver that accepts the result
    fn resolve(&self, url: &str) -> DriverResult<(WrappedUrl, Arc<dyn Driver>)> {
        let wrapped = self.urls.rewrite(url)?;
        let registry = self
            .registry
            .upgrade()
            .ok_or_else(|| DriverError::internal("driver registry is no longer available"))?;
        let driver = registry.driver_for_url(&wrapped.url)?;
        Ok((wrapped, driver))
    }
}

impl Driver for InstrumentingDriver {
    fn driver_id(&self) -> &str {
        SERVICE_ID
    }

    fn accepts_url(&self, url: &str) -> bool {
        self.urls.accepts(url)
    }

    #[instrument(skip_all, fields(url = %RedactedUrl::new(url)))]
    fn connect(&self, url: &str, properties: &Properties) -> DriverResult<Box<dyn Connection>> {
        let (wrapped, driver) = self.resolve(url)?;
        debug!(
            scheme = %wrapped.scheme,
            real_url = %RedactedUrl::new(&wrapped.url),
            driver = driver.driver_id(),
            properties = ?redact_properties(properties),
            "Delegating connect"
        );

        let connection = driver.connect(&wrapped.url, properties)?;
        Ok(self.interceptor.wrap(connection))
    }

    fn property_info(&self, url: &str, properties: &Properties) -> DriverResult<Vec<PropertyInfo>> {
        let (wrapped, driver) = self.resolve(url)?;
        debug!(
            real_url = %RedactedUrl::new(&wrapped.url),
            driver = driver.driver_id(),
            "Delegating property lookup"
        );
        driver.property_info(&wrapped.url, properties)
    }

    fn major_version(&self) -> u32 {
        MAJOR_VERSION
    }

    fn minor_version(&self) -> u32 {
        MINOR_VERSION
    }

    fn is_compliant(&self) -> bool {
        false
    }
}

// SPDX-License-Identifier: Apache-2.0

//! Driver Registry
//!
//! Process-wide directory of available drivers. Drivers register themselves
//! once at startup; callers resolve a driver either by its id or by asking
//! each registered driver, in registration order, whether it accepts a URL.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::error::{DriverError, DriverResult};
use crate::traits::Driver;
use crate::types::DriverInfo;

/// Registry that holds all available drivers
pub struct DriverRegistry {
    drivers: RwLock<Vec<Arc<dyn Driver>>>,
}

impl DriverRegistry {
    /// Creates a new empty registry
    pub fn new() -> Self {
        Self {
            drivers: RwLock::new(Vec::new()),
        }
    }

    /// Registers a new driver
    ///
    /// The driver's `driver_id()` is the key; registering the same id twice fails.
    pub fn register(&self, driver: Arc<dyn Driver>) -> DriverResult<()> {
        let mut drivers = self.drivers.write();
        let id = driver.driver_id().to_string();
        if drivers.iter().any(|d| d.driver_id() == id) {
            return Err(DriverError::registration_failed(format!(
                "driver '{}' is already registered",
                id
            )));
        }
        debug!(driver = %id, "Driver registered");
        drivers.push(driver);
        Ok(())
    }

    /// Removes a driver by id; returns true if it was registered
    pub fn deregister(&self, driver_id: &str) -> bool {
        let mut drivers = self.drivers.write();
        let before = drivers.len();
        drivers.retain(|d| d.driver_id() != driver_id);
        drivers.len() != before
    }

    /// Gets a driver by its ID
    pub fn get(&self, driver_id: &str) -> Option<Arc<dyn Driver>> {
        self.drivers
            .read()
            .iter()
            .find(|d| d.driver_id() == driver_id)
            .cloned()
    }

    /// Finds the first registered driver that accepts `url`
    pub fn driver_for_url(&self, url: &str) -> DriverResult<Arc<dyn Driver>> {
        self.drivers
            .read()
            .iter()
            .find(|d| d.accepts_url(url))
            .cloned()
            .ok_or_else(|| DriverError::driver_not_found(url))
    }

    /// Lists all registered driver IDs, in registration order
    pub fn list(&self) -> Vec<String> {
        self.drivers
            .read()
            .iter()
            .map(|d| d.driver_id().to_string())
            .collect()
    }

    /// Lists all registered drivers with their metadata.
    pub fn list_infos(&self) -> Vec<DriverInfo> {
        let mut infos: Vec<DriverInfo> = self
            .drivers
            .read()
            .iter()
            .map(|driver| DriverInfo {
                id: driver.driver_id().to_string(),
                major_version: driver.major_version(),
                minor_version: driver.minor_version(),
                compliant: driver.is_compliant(),
            })
            .collect();
        infos.sort_by(|a, b| a.id.cmp(&b.id));
        infos
    }

    /// Returns the number of registered drivers
    pub fn len(&self) -> usize {
        self.drivers.read().len()
    }

    /// Returns true if no drivers are registered
    pub fn is_empty(&self) -> bool {
        self.drivers.read().is_empty()
    }
}

impl Default for DriverRegistry {
    fn default() -> Self {
        Self::new()
    }
}

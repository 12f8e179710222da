// SPDX-License-Identifier: Apache-2.0

use qore_driver_api::DriverError;
use thiserror::Error;

use crate::config::ConfigError;

/// Failure while bringing the instrumenting driver up
#[derive(Debug, Error)]
pub enum InitError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Driver(#[from] DriverError),
}

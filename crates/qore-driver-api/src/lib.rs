// SPDX-License-Identifier: Apache-2.0

//! Blocking database driver API
//!
//! The object families a driver hands out (connections, statements, result
//! sets, metadata, arrays, large objects), the `Driver` entry point, and the
//! registry drivers are discovered through.

pub mod error;
pub mod registry;
pub mod traits;
pub mod types;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use error::{DriverError, DriverResult};
pub use registry::DriverRegistry;
pub use traits::*;
pub use types::*;

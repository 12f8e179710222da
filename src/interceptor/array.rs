// SPDX-License-Identifier: Apache-2.0

use qore_driver_api::{Array, DriverResult, ResultSet, Value};

instrumented_object! {
    /// Array whose element result sets come back instrumented
    InstrumentedArray wraps Array
}

impl Array for InstrumentedArray {
    fn base_type_name(&self) -> DriverResult<String> {
        self.interceptor
            .invoke("base_type_name", || self.inner.base_type_name())
    }

    fn elements(&self) -> DriverResult<Vec<Value>> {
        self.interceptor.invoke("elements", || self.inner.elements())
    }

    fn result_set(&self) -> DriverResult<Box<dyn ResultSet>> {
        self.interceptor.invoke("result_set", || self.inner.result_set())
    }

    fn result_set_range(&self, index: u64, count: usize) -> DriverResult<Box<dyn ResultSet>> {
        self.interceptor.invoke("result_set_range", || {
            self.inner.result_set_range(index, count)
        })
    }

    fn free(&self) -> DriverResult<()> {
        self.interceptor.invoke("free", || self.inner.free())
    }
}

// SPDX-License-Identifier: Apache-2.0

use qore_driver_api::{DatabaseMetaData, DriverResult, ResultSet};

instrumented_object! {
    /// Metadata whose catalog listings come back instrumented
    InstrumentedMetaData wraps DatabaseMetaData
}

impl DatabaseMetaData for InstrumentedMetaData {
    fn database_product_name(&self) -> DriverResult<String> {
        self.interceptor
            .invoke("database_product_name", || self.inner.database_product_name())
    }

    fn driver_name(&self) -> DriverResult<String> {
        self.interceptor.invoke("driver_name", || self.inner.driver_name())
    }

    fn tables(
        &self,
        schema_pattern: Option<&str>,
        table_pattern: &str,
    ) -> DriverResult<Box<dyn ResultSet>> {
        self.interceptor
            .invoke("tables", || self.inner.tables(schema_pattern, table_pattern))
    }

    fn columns(
        &self,
        schema_pattern: Option<&str>,
        table_pattern: &str,
        column_pattern: &str,
    ) -> DriverResult<Box<dyn ResultSet>> {
        self.interceptor.invoke("columns", || {
            self.inner
                .columns(schema_pattern, table_pattern, column_pattern)
        })
    }

    fn primary_keys(&self, schema: Option<&str>, table: &str) -> DriverResult<Box<dyn ResultSet>> {
        self.interceptor
            .invoke("primary_keys", || self.inner.primary_keys(schema, table))
    }

    fn supports_batch_updates(&self) -> DriverResult<bool> {
        self.interceptor
            .invoke("supports_batch_updates", || self.inner.supports_batch_updates())
    }
}

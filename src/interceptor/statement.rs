// SPDX-License-Identifier: Apache-2.0

//! Statement decorators
//!
//! The three statement kinds share their forwarding code: each wrapper
//! implements every trait its real object's kind extends.

use qore_driver_api::{
    Array, CallableStatement, DriverResult, PreparedStatement, ResultSet, Statement, Value,
};

use super::operation;

instrumented_object! {
    /// Statement whose executions are timed
    InstrumentedStatement wraps Statement
}

instrumented_object! {
    /// Prepared statement whose executions are timed
    InstrumentedPreparedStatement wraps PreparedStatement
}

instrumented_object! {
    /// Callable statement whose executions are timed
    InstrumentedCallableStatement wraps CallableStatement
}

macro_rules! forward_statement {
    ($($wrapper:ident),*) => {$(
        impl Statement for $wrapper {
            fn execute(&self, sql: &str) -> DriverResult<bool> {
                self.interceptor.invoke(operation::EXECUTE, || self.inner.execute(sql))
            }

            fn execute_query(&self, sql: &str) -> DriverResult<Box<dyn ResultSet>> {
                self.interceptor
                    .invoke(operation::EXECUTE_QUERY, || self.inner.execute_query(sql))
            }

            fn execute_update(&self, sql: &str) -> DriverResult<i64> {
                self.interceptor
                    .invoke(operation::EXECUTE_UPDATE, || self.inner.execute_update(sql))
            }

            fn add_batch(&self, sql: &str) -> DriverResult<()> {
                self.interceptor.invoke("add_batch", || self.inner.add_batch(sql))
            }

            fn clear_batch(&self) -> DriverResult<()> {
                self.interceptor.invoke("clear_batch", || self.inner.clear_batch())
            }

            fn execute_batch(&self) -> DriverResult<Vec<i64>> {
                self.interceptor
                    .invoke(operation::EXECUTE_BATCH, || self.inner.execute_batch())
            }

            fn result_set(&self) -> DriverResult<Option<Box<dyn ResultSet>>> {
                self.interceptor.invoke("result_set", || self.inner.result_set())
            }

            fn update_count(&self) -> DriverResult<i64> {
                self.interceptor.invoke("update_count", || self.inner.update_count())
            }

            fn generated_keys(&self) -> DriverResult<Box<dyn ResultSet>> {
                self.interceptor
                    .invoke("generated_keys", || self.inner.generated_keys())
            }

            fn set_max_rows(&self, max_rows: u64) -> DriverResult<()> {
                self.interceptor
                    .invoke("set_max_rows", || self.inner.set_max_rows(max_rows))
            }

            fn max_rows(&self) -> DriverResult<u64> {
                self.interceptor.invoke("max_rows", || self.inner.max_rows())
            }

            fn close(&self) -> DriverResult<()> {
                self.interceptor.invoke("close", || self.inner.close())
            }
        }
    )*};
}

// Bound-parameter executions report under the same operation names as their
// ad-hoc counterparts.
macro_rules! forward_prepared_statement {
    ($($wrapper:ident),*) => {$(
        impl PreparedStatement for $wrapper {
            fn set_parameter(&self, index: usize, value: Value) -> DriverResult<()> {
                self.interceptor
                    .invoke("set_parameter", || self.inner.set_parameter(index, value))
            }

            fn clear_parameters(&self) -> DriverResult<()> {
                self.interceptor
                    .invoke("clear_parameters", || self.inner.clear_parameters())
            }

            fn execute_prepared(&self) -> DriverResult<bool> {
                self.interceptor
                    .invoke(operation::EXECUTE, || self.inner.execute_prepared())
            }

            fn query(&self) -> DriverResult<Box<dyn ResultSet>> {
                self.interceptor
                    .invoke(operation::EXECUTE_QUERY, || self.inner.query())
            }

            fn update(&self) -> DriverResult<i64> {
                self.interceptor
                    .invoke(operation::EXECUTE_UPDATE, || self.inner.update())
            }

            fn add_parameters_to_batch(&self) -> DriverResult<()> {
                self.interceptor.invoke("add_parameters_to_batch", || {
                    self.inner.add_parameters_to_batch()
                })
            }
        }
    )*};
}

forward_statement!(
    InstrumentedStatement,
    InstrumentedPreparedStatement,
    InstrumentedCallableStatement
);
forward_prepared_statement!(InstrumentedPreparedStatement, InstrumentedCallableStatement);

impl CallableStatement for InstrumentedCallableStatement {
    fn register_out_parameter(&self, index: usize, sql_type: &str) -> DriverResult<()> {
        self.interceptor.invoke("register_out_parameter", || {
            self.inner.register_out_parameter(index, sql_type)
        })
    }

    fn out_value(&self, index: usize) -> DriverResult<Value> {
        self.interceptor
            .invoke("out_value", || self.inner.out_value(index))
    }

    fn out_array(&self, index: usize) -> DriverResult<Option<Box<dyn Array>>> {
        self.interceptor
            .invoke("out_array", || self.inner.out_array(index))
    }

    fn was_null(&self) -> DriverResult<bool> {
        self.interceptor.invoke("was_null", || self.inner.was_null())
    }
}

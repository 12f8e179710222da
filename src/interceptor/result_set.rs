// SPDX-License-Identifier: Apache-2.0

use qore_driver_api::{Array, Blob, DriverResult, ResultSet, Value};

use super::operation;

instrumented_object! {
    /// Result set whose cursor advances are timed
    InstrumentedResultSet wraps ResultSet
}

impl ResultSet for InstrumentedResultSet {
    fn next(&self) -> DriverResult<bool> {
        self.interceptor.invoke(operation::NEXT, || self.inner.next())
    }

    fn value(&self, column: usize) -> DriverResult<Value> {
        self.interceptor.invoke("value", || self.inner.value(column))
    }

    fn value_by_label(&self, label: &str) -> DriverResult<Value> {
        self.interceptor
            .invoke("value_by_label", || self.inner.value_by_label(label))
    }

    fn array(&self, column: usize) -> DriverResult<Option<Box<dyn Array>>> {
        self.interceptor.invoke("array", || self.inner.array(column))
    }

    fn blob(&self, column: usize) -> DriverResult<Option<Box<dyn Blob>>> {
        self.interceptor.invoke("blob", || self.inner.blob(column))
    }

    fn row(&self) -> DriverResult<u64> {
        self.interceptor.invoke("row", || self.inner.row())
    }

    fn was_null(&self) -> DriverResult<bool> {
        self.interceptor.invoke("was_null", || self.inner.was_null())
    }

    fn close(&self) -> DriverResult<()> {
        self.interceptor.invoke("close", || self.inner.close())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use qore_driver_api::mock::{MockDriver, MockScript};
    use qore_driver_api::{Connection, ResultSet, Value};

    use crate::interceptor::Interceptor;
    use crate::timer::scoped::tests::{roughly, ticks};
    use crate::timer::{ThreadTimers, TimerContext};

    fn query(driver: &MockDriver) -> Box<dyn ResultSet> {
        let interceptor = Interceptor::new(Arc::new(ThreadTimers));
        let conn = interceptor.wrap(Box::new(driver.connection()) as Box<dyn Connection>);
        let rs = conn
            .create_statement()
            .unwrap()
            .execute_query("SELECT * FROM t")
            .unwrap();
        ThreadTimers.reset();
        rs
    }

    #[test]
    fn test_times_next() {
        let driver = MockDriver::with_script(
            "mock",
            MockScript {
                delay: ticks(2),
                rows: vec![vec![Value::Int(1)]],
                ..MockScript::default()
            },
        );
        let rs = query(&driver);
        assert!(rs.instrumented().is_some());
        assert!(!ThreadTimers.was_invoked());

        assert!(rs.next().unwrap());
        assert!(ThreadTimers.was_invoked());
        let elapsed = ThreadTimers.elapsed_time();
        assert!(roughly(elapsed, 2), "got {}ms", elapsed);
        assert_eq!(driver.log().count("next"), 1);
    }

    #[test]
    fn test_reads_are_not_timed() {
        let driver = MockDriver::with_script(
            "mock",
            MockScript::with_rows(vec![vec![
                Value::Int(5),
                Value::Bytes(vec![0xCA, 0xFE]),
                Value::from("tag"),
            ]]),
        );
        let rs = query(&driver);
        assert!(rs.next().unwrap());
        ThreadTimers.reset();

        assert_eq!(rs.value(1).unwrap(), Value::Int(5));
        assert_eq!(rs.value_by_label("c3").unwrap(), Value::from("tag"));
        assert_eq!(rs.row().unwrap(), 1);
        assert!(!rs.was_null().unwrap());
        assert!(!ThreadTimers.was_invoked());
    }

    #[test]
    fn test_arrays_are_wrapped_and_blobs_are_not() {
        let driver = MockDriver::with_script(
            "mock",
            MockScript::with_rows(vec![vec![Value::from("a"), Value::Bytes(vec![1, 2, 3])]]),
        );
        let rs = query(&driver);
        assert!(rs.next().unwrap());

        let array = rs.array(1).unwrap().expect("array column");
        assert!(array.instrumented().is_some());

        let blob = rs.blob(2).unwrap().expect("blob column");
        assert!(blob.instrumented().is_none());
        assert_eq!(blob.length().unwrap(), 3);
        assert_eq!(driver.log().count("blob"), 1);
    }
}

// SPDX-License-Identifier: Apache-2.0

use qore_driver_api::{
    Array, Blob, CallableStatement, Connection, DatabaseMetaData, DriverResult,
    PreparedStatement, Statement, Value,
};

instrumented_object! {
    /// Connection whose statements, metadata and arrays come back instrumented
    InstrumentedConnection wraps Connection
}

impl Connection for InstrumentedConnection {
    fn create_statement(&self) -> DriverResult<Box<dyn Statement>> {
        self.interceptor
            .invoke("create_statement", || self.inner.create_statement())
    }

    fn prepare_statement(&self, sql: &str) -> DriverResult<Box<dyn PreparedStatement>> {
        self.interceptor
            .invoke("prepare_statement", || self.inner.prepare_statement(sql))
    }

    fn prepare_call(&self, sql: &str) -> DriverResult<Box<dyn CallableStatement>> {
        self.interceptor
            .invoke("prepare_call", || self.inner.prepare_call(sql))
    }

    fn metadata(&self) -> DriverResult<Box<dyn DatabaseMetaData>> {
        self.interceptor.invoke("metadata", || self.inner.metadata())
    }

    fn create_blob(&self) -> DriverResult<Box<dyn Blob>> {
        self.interceptor.invoke("create_blob", || self.inner.create_blob())
    }

    fn create_array_of(&self, type_name: &str, elements: &[Value]) -> DriverResult<Box<dyn Array>> {
        self.interceptor.invoke("create_array_of", || {
            self.inner.create_array_of(type_name, elements)
        })
    }

    fn native_sql(&self, sql: &str) -> DriverResult<String> {
        self.interceptor.invoke("native_sql", || self.inner.native_sql(sql))
    }

    fn set_auto_commit(&self, auto_commit: bool) -> DriverResult<()> {
        self.interceptor
            .invoke("set_auto_commit", || self.inner.set_auto_commit(auto_commit))
    }

    fn auto_commit(&self) -> DriverResult<bool> {
        self.interceptor.invoke("auto_commit", || self.inner.auto_commit())
    }

    fn commit(&self) -> DriverResult<()> {
        self.interceptor.invoke("commit", || self.inner.commit())
    }

    fn rollback(&self) -> DriverResult<()> {
        self.interceptor.invoke("rollback", || self.inner.rollback())
    }

    fn is_closed(&self) -> DriverResult<bool> {
        self.interceptor.invoke("is_closed", || self.inner.is_closed())
    }

    fn close(&self) -> DriverResult<()> {
        self.interceptor.invoke("close", || self.inner.close())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use qore_driver_api::mock::MockDriver;
    use qore_driver_api::{Connection, Value};

    use crate::interceptor::Interceptor;
    use crate::timer::{ThreadTimers, TimerContext};

    fn instrumented(driver: &MockDriver) -> Box<dyn Connection> {
        ThreadTimers.reset();
        let interceptor = Interceptor::new(Arc::new(ThreadTimers));
        interceptor.wrap(Box::new(driver.connection()) as Box<dyn Connection>)
    }

    #[test]
    fn test_connection_is_instrumented() {
        let driver = MockDriver::new("mock");
        let conn = instrumented(&driver);
        assert!(conn.instrumented().is_some());
    }

    #[test]
    fn test_returns_instrumented_statements() {
        let driver = MockDriver::new("mock");
        let conn = instrumented(&driver);

        assert!(conn.create_statement().unwrap().instrumented().is_some());
        assert_eq!(driver.log().count("create_statement"), 1);
    }

    #[test]
    fn test_returns_instrumented_prepared_statements() {
        let driver = MockDriver::new("mock");
        let conn = instrumented(&driver);

        let stmt = conn
            .prepare_statement("SELECT * FROM funk WHERE id = ?")
            .unwrap();
        assert!(stmt.instrumented().is_some());
        assert_eq!(driver.log().count("prepare_statement"), 1);
    }

    #[test]
    fn test_returns_instrumented_callable_statements() {
        let driver = MockDriver::new("mock");
        let conn = instrumented(&driver);

        let call = conn.prepare_call("{call refresh_funk(?)}").unwrap();
        assert!(call.instrumented().is_some());
        assert_eq!(driver.log().count("prepare_call"), 1);
    }

    #[test]
    fn test_returns_instrumented_metadata_and_arrays() {
        let driver = MockDriver::new("mock");
        let conn = instrumented(&driver);

        assert!(conn.metadata().unwrap().instrumented().is_some());
        let array = conn
            .create_array_of("INTEGER", &[Value::Int(1), Value::Int(2)])
            .unwrap();
        assert!(array.instrumented().is_some());
        assert_eq!(driver.log().count("metadata"), 1);
        assert_eq!(driver.log().count("create_array_of"), 1);
    }

    #[test]
    fn test_proxies_other_calls_through() {
        let driver = MockDriver::new("mock");
        let conn = instrumented(&driver);

        assert!(conn.create_blob().unwrap().instrumented().is_none());
        assert_eq!(driver.log().count("create_blob"), 1);

        conn.set_auto_commit(false).unwrap();
        assert!(!conn.auto_commit().unwrap());
        assert_eq!(conn.native_sql("SELECT 1").unwrap(), "SELECT 1");
        conn.close().unwrap();
        assert!(conn.is_closed().unwrap());

        assert_eq!(
            driver.log().calls(),
            vec![
                "create_blob",
                "set_auto_commit",
                "auto_commit",
                "native_sql",
                "close",
                "is_closed"
            ]
        );
        assert!(!ThreadTimers.was_invoked());
    }
}

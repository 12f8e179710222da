// SPDX-License-Identifier: Apache-2.0

//! Driver object traits
//!
//! Every object a driver returns implements one of these traits. Calls are
//! blocking: a method returns once the underlying database round trip is done.
//! Methods that produce another driver object return it boxed so wrapping
//! layers can substitute their own implementation.

use crate::error::DriverResult;
use crate::types::{Properties, PropertyInfo, Value};

/// Marker for objects produced by an interception layer
pub trait Instrumented {
    /// Concrete type name of the wrapped driver object
    fn original_type(&self) -> &'static str;
}

/// Common base of every driver object
pub trait DriverObject: Send {
    /// Returns the interception marker when this object is a wrapper
    fn instrumented(&self) -> Option<&dyn Instrumented> {
        None
    }

    /// Concrete type name of this object
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// An open session with a database
pub trait Connection: DriverObject {
    fn create_statement(&self) -> DriverResult<Box<dyn Statement>>;

    fn prepare_statement(&self, sql: &str) -> DriverResult<Box<dyn PreparedStatement>>;

    fn prepare_call(&self, sql: &str) -> DriverResult<Box<dyn CallableStatement>>;

    fn metadata(&self) -> DriverResult<Box<dyn DatabaseMetaData>>;

    fn create_blob(&self) -> DriverResult<Box<dyn Blob>>;

    fn create_array_of(&self, type_name: &str, elements: &[Value]) -> DriverResult<Box<dyn Array>>;

    /// Converts SQL into the database's native grammar without executing it
    fn native_sql(&self, sql: &str) -> DriverResult<String>;

    fn set_auto_commit(&self, auto_commit: bool) -> DriverResult<()>;

    fn auto_commit(&self) -> DriverResult<bool>;

    fn commit(&self) -> DriverResult<()>;

    fn rollback(&self) -> DriverResult<()>;

    fn is_closed(&self) -> DriverResult<bool>;

    fn close(&self) -> DriverResult<()>;
}

/// A statement executing ad-hoc SQL text
pub trait Statement: DriverObject {
    /// Executes any SQL; returns true when the first result is a result set
    fn execute(&self, sql: &str) -> DriverResult<bool>;

    fn execute_query(&self, sql: &str) -> DriverResult<Box<dyn ResultSet>>;

    /// Returns the affected row count
    fn execute_update(&self, sql: &str) -> DriverResult<i64>;

    fn add_batch(&self, sql: &str) -> DriverResult<()>;

    fn clear_batch(&self) -> DriverResult<()>;

    /// Runs queued batch commands; returns one update count per command
    fn execute_batch(&self) -> DriverResult<Vec<i64>>;

    /// Current result of the last `execute`, if it produced one
    fn result_set(&self) -> DriverResult<Option<Box<dyn ResultSet>>>;

    fn update_count(&self) -> DriverResult<i64>;

    fn generated_keys(&self) -> DriverResult<Box<dyn ResultSet>>;

    fn set_max_rows(&self, max_rows: u64) -> DriverResult<()>;

    fn max_rows(&self) -> DriverResult<u64>;

    fn close(&self) -> DriverResult<()>;
}

/// A precompiled statement with positional parameters (1-based)
pub trait PreparedStatement: Statement {
    fn set_parameter(&self, index: usize, value: Value) -> DriverResult<()>;

    fn clear_parameters(&self) -> DriverResult<()>;

    /// Executes with the bound parameters; returns true when a result set was produced
    fn execute_prepared(&self) -> DriverResult<bool>;

    fn query(&self) -> DriverResult<Box<dyn ResultSet>>;

    fn update(&self) -> DriverResult<i64>;

    /// Queues the current parameter set for `execute_batch`
    fn add_parameters_to_batch(&self) -> DriverResult<()>;
}

/// A stored procedure call with OUT parameters
pub trait CallableStatement: PreparedStatement {
    fn register_out_parameter(&self, index: usize, sql_type: &str) -> DriverResult<()>;

    fn out_value(&self, index: usize) -> DriverResult<Value>;

    fn out_array(&self, index: usize) -> DriverResult<Option<Box<dyn Array>>>;

    fn was_null(&self) -> DriverResult<bool>;
}

/// A cursor over query results (columns are 1-based)
pub trait ResultSet: DriverObject {
    /// Advances the cursor; returns false past the last row
    fn next(&self) -> DriverResult<bool>;

    fn value(&self, column: usize) -> DriverResult<Value>;

    fn value_by_label(&self, label: &str) -> DriverResult<Value>;

    fn array(&self, column: usize) -> DriverResult<Option<Box<dyn Array>>>;

    fn blob(&self, column: usize) -> DriverResult<Option<Box<dyn Blob>>>;

    fn row(&self) -> DriverResult<u64>;

    fn was_null(&self) -> DriverResult<bool>;

    fn close(&self) -> DriverResult<()>;
}

/// Catalog information about the connected database
pub trait DatabaseMetaData: DriverObject {
    fn database_product_name(&self) -> DriverResult<String>;

    fn driver_name(&self) -> DriverResult<String>;

    fn tables(
        &self,
        schema_pattern: Option<&str>,
        table_pattern: &str,
    ) -> DriverResult<Box<dyn ResultSet>>;

    fn columns(
        &self,
        schema_pattern: Option<&str>,
        table_pattern: &str,
        column_pattern: &str,
    ) -> DriverResult<Box<dyn ResultSet>>;

    fn primary_keys(&self, schema: Option<&str>, table: &str) -> DriverResult<Box<dyn ResultSet>>;

    fn supports_batch_updates(&self) -> DriverResult<bool>;
}

/// A SQL ARRAY value
pub trait Array: DriverObject {
    fn base_type_name(&self) -> DriverResult<String>;

    fn elements(&self) -> DriverResult<Vec<Value>>;

    /// Elements as rows of (index, value)
    fn result_set(&self) -> DriverResult<Box<dyn ResultSet>>;

    /// Like `result_set`, starting at 1-based `index` and holding at most `count` rows
    fn result_set_range(&self, index: u64, count: usize) -> DriverResult<Box<dyn ResultSet>>;

    fn free(&self) -> DriverResult<()>;
}

/// An opaque large-object handle
pub trait Blob: DriverObject {
    fn length(&self) -> DriverResult<u64>;

    /// Reads up to `length` bytes starting at 1-based `position`
    fn bytes(&self, position: u64, length: usize) -> DriverResult<Vec<u8>>;

    fn free(&self) -> DriverResult<()>;
}

/// Entry point of a database driver
pub trait Driver: Send + Sync {
    /// Unique identifier this driver registers under
    fn driver_id(&self) -> &str;

    /// Returns true if this driver can open the given URL
    fn accepts_url(&self, url: &str) -> bool;

    fn connect(&self, url: &str, properties: &Properties) -> DriverResult<Box<dyn Connection>>;

    /// Lists the connection properties this driver understands for `url`
    fn property_info(&self, url: &str, properties: &Properties) -> DriverResult<Vec<PropertyInfo>>;

    fn major_version(&self) -> u32;

    fn minor_version(&self) -> u32;

    /// Returns true if the driver passes the API's full compliance suite
    fn is_compliant(&self) -> bool;
}

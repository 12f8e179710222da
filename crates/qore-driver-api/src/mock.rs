// SPDX-License-Identifier: Apache-2.0

//! In-memory test doubles
//!
//! Every object created from one `MockDriver` shares a call log and a
//! `MockScript`, so tests can assert exactly which real calls happened and
//! make the execution paths slow or failing on demand.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::error::{DriverError, DriverResult};
use crate::traits::*;
use crate::types::{Properties, PropertyInfo, Value};

/// Ordered record of real calls made on mock objects
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, call: &str) {
        self.0.lock().push(call.to_string());
    }

    pub fn calls(&self) -> Vec<String> {
        self.0.lock().clone()
    }

    /// Number of times `call` was recorded
    pub fn count(&self, call: &str) -> usize {
        self.0.lock().iter().filter(|c| c.as_str() == call).count()
    }

    pub fn clear(&self) {
        self.0.lock().clear();
    }
}

/// Behaviour of the execution paths (`execute*`, `query`, `update`, `next`)
#[derive(Debug, Clone, Default)]
pub struct MockScript {
    /// Time each execution call blocks for
    pub delay: Duration,
    /// Failure returned by each execution call instead of a result
    pub failure: Option<DriverError>,
    /// Rows served by result sets from queries
    pub rows: Vec<Vec<Value>>,
}

impl MockScript {
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::default()
        }
    }

    pub fn with_failure(failure: DriverError) -> Self {
        Self {
            failure: Some(failure),
            ..Self::default()
        }
    }

    pub fn with_rows(rows: Vec<Vec<Value>>) -> Self {
        Self {
            rows,
            ..Self::default()
        }
    }

    fn run(&self) -> DriverResult<()> {
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        match &self.failure {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Clone)]
struct Shared {
    log: CallLog,
    script: Arc<MockScript>,
}

impl Shared {
    fn record(&self, call: &str) {
        self.log.record(call);
    }
}

// =============================================================================
// Driver
// =============================================================================

/// Driver accepting `<id>:` URLs and serving mock connections
pub struct MockDriver {
    id: String,
    shared: Shared,
    urls: Mutex<Vec<String>>,
}

impl MockDriver {
    pub fn new(id: impl Into<String>) -> Self {
        Self::with_script(id, MockScript::default())
    }

    pub fn with_script(id: impl Into<String>, script: MockScript) -> Self {
        Self {
            id: id.into(),
            shared: Shared {
                log: CallLog::new(),
                script: Arc::new(script),
            },
            urls: Mutex::new(Vec::new()),
        }
    }

    pub fn log(&self) -> &CallLog {
        &self.shared.log
    }

    /// URLs received by `connect` and `property_info`
    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().clone()
    }

    /// A connection sharing this driver's log and script, without going through `connect`
    pub fn connection(&self) -> MockConnection {
        MockConnection::new(self.shared.clone())
    }
}

impl Driver for MockDriver {
    fn driver_id(&self) -> &str {
        &self.id
    }

    fn accepts_url(&self, url: &str) -> bool {
        url.strip_prefix(self.id.as_str())
            .is_some_and(|rest| rest.starts_with(':'))
    }

    fn connect(&self, url: &str, _properties: &Properties) -> DriverResult<Box<dyn Connection>> {
        self.urls.lock().push(url.to_string());
        self.shared.record("connect");
        if !self.accepts_url(url) {
            return Err(DriverError::connection_failed(format!(
                "{} cannot open {}",
                self.id, url
            )));
        }
        Ok(Box::new(self.connection()))
    }

    fn property_info(&self, url: &str, properties: &Properties) -> DriverResult<Vec<PropertyInfo>> {
        self.urls.lock().push(url.to_string());
        self.shared.record("property_info");
        let lookup = |key: &str| Some(properties.get(key).cloned().unwrap_or_default());
        Ok(vec![
            PropertyInfo::new("user", lookup("user")),
            PropertyInfo::new("password", lookup("password")),
            PropertyInfo::new("ifexists", None),
        ])
    }

    fn major_version(&self) -> u32 {
        1
    }

    fn minor_version(&self) -> u32 {
        0
    }

    fn is_compliant(&self) -> bool {
        true
    }
}

// =============================================================================
// Connection
// =============================================================================

pub struct MockConnection {
    shared: Shared,
    auto_commit: Mutex<bool>,
    closed: Mutex<bool>,
}

impl MockConnection {
    fn new(shared: Shared) -> Self {
        Self {
            shared,
            auto_commit: Mutex::new(true),
            closed: Mutex::new(false),
        }
    }
}

impl DriverObject for MockConnection {}

impl Connection for MockConnection {
    fn create_statement(&self) -> DriverResult<Box<dyn Statement>> {
        self.shared.record("create_statement");
        Ok(Box::new(MockStatement::new(self.shared.clone())))
    }

    fn prepare_statement(&self, _sql: &str) -> DriverResult<Box<dyn PreparedStatement>> {
        self.shared.record("prepare_statement");
        Ok(Box::new(MockStatement::new(self.shared.clone())))
    }

    fn prepare_call(&self, _sql: &str) -> DriverResult<Box<dyn CallableStatement>> {
        self.shared.record("prepare_call");
        Ok(Box::new(MockStatement::new(self.shared.clone())))
    }

    fn metadata(&self) -> DriverResult<Box<dyn DatabaseMetaData>> {
        self.shared.record("metadata");
        Ok(Box::new(MockMetaData {
            shared: self.shared.clone(),
        }))
    }

    fn create_blob(&self) -> DriverResult<Box<dyn Blob>> {
        self.shared.record("create_blob");
        Ok(Box::new(MockBlob::new(Vec::new())))
    }

    fn create_array_of(&self, type_name: &str, elements: &[Value]) -> DriverResult<Box<dyn Array>> {
        self.shared.record("create_array_of");
        Ok(Box::new(MockArray::new(
            self.shared.clone(),
            type_name,
            elements.to_vec(),
        )))
    }

    fn native_sql(&self, sql: &str) -> DriverResult<String> {
        self.shared.record("native_sql");
        Ok(sql.to_string())
    }

    fn set_auto_commit(&self, auto_commit: bool) -> DriverResult<()> {
        self.shared.record("set_auto_commit");
        *self.auto_commit.lock() = auto_commit;
        Ok(())
    }

    fn auto_commit(&self) -> DriverResult<bool> {
        self.shared.record("auto_commit");
        Ok(*self.auto_commit.lock())
    }

    fn commit(&self) -> DriverResult<()> {
        self.shared.record("commit");
        Ok(())
    }

    fn rollback(&self) -> DriverResult<()> {
        self.shared.record("rollback");
        Ok(())
    }

    fn is_closed(&self) -> DriverResult<bool> {
        self.shared.record("is_closed");
        Ok(*self.closed.lock())
    }

    fn close(&self) -> DriverResult<()> {
        self.shared.record("close");
        *self.closed.lock() = true;
        Ok(())
    }
}

// =============================================================================
// Statements
// =============================================================================

/// Plays the statement, prepared statement and callable statement roles
pub struct MockStatement {
    shared: Shared,
    batch: Mutex<Vec<String>>,
    parameters: Mutex<Vec<(usize, Value)>>,
    max_rows: Mutex<u64>,
    executed_query: Mutex<bool>,
}

impl MockStatement {
    fn new(shared: Shared) -> Self {
        Self {
            shared,
            batch: Mutex::new(Vec::new()),
            parameters: Mutex::new(Vec::new()),
            max_rows: Mutex::new(0),
            executed_query: Mutex::new(false),
        }
    }

    fn rows(&self) -> MockResultSet {
        MockResultSet::new(self.shared.clone(), self.shared.script.rows.clone())
    }

    fn run(&self, call: &str) -> DriverResult<()> {
        self.shared.record(call);
        self.shared.script.run()
    }
}

impl DriverObject for MockStatement {}

impl Statement for MockStatement {
    fn execute(&self, sql: &str) -> DriverResult<bool> {
        self.run("execute")?;
        let is_query = sql.trim_start().to_ascii_lowercase().starts_with("select");
        *self.executed_query.lock() = is_query;
        Ok(is_query)
    }

    fn execute_query(&self, _sql: &str) -> DriverResult<Box<dyn ResultSet>> {
        self.run("execute_query")?;
        Ok(Box::new(self.rows()))
    }

    fn execute_update(&self, _sql: &str) -> DriverResult<i64> {
        self.run("execute_update")?;
        Ok(2)
    }

    fn add_batch(&self, sql: &str) -> DriverResult<()> {
        self.shared.record("add_batch");
        self.batch.lock().push(sql.to_string());
        Ok(())
    }

    fn clear_batch(&self) -> DriverResult<()> {
        self.shared.record("clear_batch");
        self.batch.lock().clear();
        Ok(())
    }

    fn execute_batch(&self) -> DriverResult<Vec<i64>> {
        self.run("execute_batch")?;
        let queued = std::mem::take(&mut *self.batch.lock());
        Ok(queued.iter().map(|_| 1).collect())
    }

    fn result_set(&self) -> DriverResult<Option<Box<dyn ResultSet>>> {
        self.shared.record("result_set");
        if *self.executed_query.lock() {
            Ok(Some(Box::new(self.rows())))
        } else {
            Ok(None)
        }
    }

    fn update_count(&self) -> DriverResult<i64> {
        self.shared.record("update_count");
        Ok(if *self.executed_query.lock() { -1 } else { 0 })
    }

    fn generated_keys(&self) -> DriverResult<Box<dyn ResultSet>> {
        self.shared.record("generated_keys");
        Ok(Box::new(MockResultSet::new(
            self.shared.clone(),
            vec![vec![Value::Int(1)]],
        )))
    }

    fn set_max_rows(&self, max_rows: u64) -> DriverResult<()> {
        self.shared.record("set_max_rows");
        *self.max_rows.lock() = max_rows;
        Ok(())
    }

    fn max_rows(&self) -> DriverResult<u64> {
        self.shared.record("max_rows");
        Ok(*self.max_rows.lock())
    }

    fn close(&self) -> DriverResult<()> {
        self.shared.record("close");
        Ok(())
    }
}

impl PreparedStatement for MockStatement {
    fn set_parameter(&self, index: usize, value: Value) -> DriverResult<()> {
        self.shared.record("set_parameter");
        if index == 0 {
            return Err(DriverError::invalid_argument("parameter indexes start at 1"));
        }
        self.parameters.lock().push((index, value));
        Ok(())
    }

    fn clear_parameters(&self) -> DriverResult<()> {
        self.shared.record("clear_parameters");
        self.parameters.lock().clear();
        Ok(())
    }

    fn execute_prepared(&self) -> DriverResult<bool> {
        self.run("execute_prepared")?;
        Ok(true)
    }

    fn query(&self) -> DriverResult<Box<dyn ResultSet>> {
        self.run("query")?;
        Ok(Box::new(self.rows()))
    }

    fn update(&self) -> DriverResult<i64> {
        self.run("update")?;
        Ok(1)
    }

    fn add_parameters_to_batch(&self) -> DriverResult<()> {
        self.shared.record("add_parameters_to_batch");
        let bound = self.parameters.lock().len();
        self.batch.lock().push(format!("{} parameters", bound));
        Ok(())
    }
}

impl CallableStatement for MockStatement {
    fn register_out_parameter(&self, _index: usize, _sql_type: &str) -> DriverResult<()> {
        self.shared.record("register_out_parameter");
        Ok(())
    }

    fn out_value(&self, index: usize) -> DriverResult<Value> {
        self.shared.record("out_value");
        Ok(Value::Int(index as i64))
    }

    fn out_array(&self, _index: usize) -> DriverResult<Option<Box<dyn Array>>> {
        self.shared.record("out_array");
        Ok(Some(Box::new(MockArray::new(
            self.shared.clone(),
            "INTEGER",
            vec![Value::Int(1), Value::Int(2)],
        ))))
    }

    fn was_null(&self) -> DriverResult<bool> {
        self.shared.record("was_null");
        Ok(false)
    }
}

// =============================================================================
// Result sets
// =============================================================================

pub struct MockResultSet {
    shared: Shared,
    rows: Vec<Vec<Value>>,
    cursor: Mutex<usize>,
}

impl MockResultSet {
    fn new(shared: Shared, rows: Vec<Vec<Value>>) -> Self {
        Self {
            shared,
            rows,
            cursor: Mutex::new(0),
        }
    }

    fn current(&self, column: usize) -> DriverResult<Value> {
        let cursor = *self.cursor.lock();
        if cursor == 0 || cursor > self.rows.len() {
            return Err(DriverError::execution_error("cursor is not on a row"));
        }
        self.rows[cursor - 1]
            .get(column.wrapping_sub(1))
            .cloned()
            .ok_or_else(|| DriverError::invalid_argument(format!("no column {}", column)))
    }
}

impl DriverObject for MockResultSet {}

impl ResultSet for MockResultSet {
    fn next(&self) -> DriverResult<bool> {
        self.shared.record("next");
        self.shared.script.run()?;
        let mut cursor = self.cursor.lock();
        if *cursor < self.rows.len() {
            *cursor += 1;
            Ok(true)
        } else {
            *cursor = self.rows.len() + 1;
            Ok(false)
        }
    }

    fn value(&self, column: usize) -> DriverResult<Value> {
        self.shared.record("value");
        self.current(column)
    }

    fn value_by_label(&self, label: &str) -> DriverResult<Value> {
        self.shared.record("value_by_label");
        let column = label
            .strip_prefix('c')
            .and_then(|n| n.parse::<usize>().ok())
            .ok_or_else(|| DriverError::invalid_argument(format!("no column {}", label)))?;
        self.current(column)
    }

    fn array(&self, column: usize) -> DriverResult<Option<Box<dyn Array>>> {
        self.shared.record("array");
        let value = self.current(column)?;
        if value.is_null() {
            return Ok(None);
        }
        Ok(Some(Box::new(MockArray::new(
            self.shared.clone(),
            "VARCHAR",
            vec![value],
        ))))
    }

    fn blob(&self, column: usize) -> DriverResult<Option<Box<dyn Blob>>> {
        self.shared.record("blob");
        match self.current(column)? {
            Value::Null => Ok(None),
            Value::Bytes(bytes) => Ok(Some(Box::new(MockBlob::new(bytes)))),
            other => Err(DriverError::execution_error(format!(
                "{:?} is not a binary value",
                other
            ))),
        }
    }

    fn row(&self) -> DriverResult<u64> {
        self.shared.record("row");
        let cursor = *self.cursor.lock();
        Ok(if cursor > self.rows.len() { 0 } else { cursor as u64 })
    }

    fn was_null(&self) -> DriverResult<bool> {
        self.shared.record("was_null");
        Ok(false)
    }

    fn close(&self) -> DriverResult<()> {
        self.shared.record("close");
        Ok(())
    }
}

// =============================================================================
// Metadata, arrays, blobs
// =============================================================================

pub struct MockMetaData {
    shared: Shared,
}

impl MockMetaData {
    fn listing(&self, call: &str, names: &[&str]) -> DriverResult<Box<dyn ResultSet>> {
        self.shared.record(call);
        let rows = names.iter().map(|n| vec![Value::from(*n)]).collect();
        Ok(Box::new(MockResultSet::new(self.shared.clone(), rows)))
    }
}

impl DriverObject for MockMetaData {}

impl DatabaseMetaData for MockMetaData {
    fn database_product_name(&self) -> DriverResult<String> {
        self.shared.record("database_product_name");
        Ok("MockDB".to_string())
    }

    fn driver_name(&self) -> DriverResult<String> {
        self.shared.record("driver_name");
        Ok("mock".to_string())
    }

    fn tables(
        &self,
        _schema_pattern: Option<&str>,
        _table_pattern: &str,
    ) -> DriverResult<Box<dyn ResultSet>> {
        self.listing("tables", &["users", "orders"])
    }

    fn columns(
        &self,
        _schema_pattern: Option<&str>,
        _table_pattern: &str,
        _column_pattern: &str,
    ) -> DriverResult<Box<dyn ResultSet>> {
        self.listing("columns", &["id", "name"])
    }

    fn primary_keys(&self, _schema: Option<&str>, _table: &str) -> DriverResult<Box<dyn ResultSet>> {
        self.listing("primary_keys", &["id"])
    }

    fn supports_batch_updates(&self) -> DriverResult<bool> {
        self.shared.record("supports_batch_updates");
        Ok(true)
    }
}

pub struct MockArray {
    shared: Shared,
    type_name: String,
    elements: Vec<Value>,
}

impl MockArray {
    fn new(shared: Shared, type_name: &str, elements: Vec<Value>) -> Self {
        Self {
            shared,
            type_name: type_name.to_string(),
            elements,
        }
    }

    fn indexed_rows(&self, skip: usize, take: usize) -> Vec<Vec<Value>> {
        self.elements
            .iter()
            .enumerate()
            .skip(skip)
            .take(take)
            .map(|(i, v)| vec![Value::Int(i as i64 + 1), v.clone()])
            .collect()
    }
}

impl DriverObject for MockArray {}

impl Array for MockArray {
    fn base_type_name(&self) -> DriverResult<String> {
        self.shared.record("base_type_name");
        Ok(self.type_name.clone())
    }

    fn elements(&self) -> DriverResult<Vec<Value>> {
        self.shared.record("elements");
        Ok(self.elements.clone())
    }

    fn result_set(&self) -> DriverResult<Box<dyn ResultSet>> {
        self.shared.record("result_set");
        let rows = self.indexed_rows(0, self.elements.len());
        Ok(Box::new(MockResultSet::new(self.shared.clone(), rows)))
    }

    fn result_set_range(&self, index: u64, count: usize) -> DriverResult<Box<dyn ResultSet>> {
        self.shared.record("result_set_range");
        if index == 0 {
            return Err(DriverError::invalid_argument("array indexes start at 1"));
        }
        let rows = self.indexed_rows(index as usize - 1, count);
        Ok(Box::new(MockResultSet::new(self.shared.clone(), rows)))
    }

    fn free(&self) -> DriverResult<()> {
        self.shared.record("free");
        Ok(())
    }
}

pub struct MockBlob {
    data: Vec<u8>,
}

impl MockBlob {
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }
}

impl DriverObject for MockBlob {}

impl Blob for MockBlob {
    fn length(&self) -> DriverResult<u64> {
        Ok(self.data.len() as u64)
    }

    fn bytes(&self, position: u64, length: usize) -> DriverResult<Vec<u8>> {
        let start = (position.max(1) - 1) as usize;
        Ok(self.data.iter().skip(start).take(length).copied().collect())
    }

    fn free(&self) -> DriverResult<()> {
        Ok(())
    }
}

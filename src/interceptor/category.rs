// SPDX-License-Identifier: Apache-2.0

//! Object categories and the wrap-or-pass-through dispatch
//!
//! Every value an intercepted call can return implements `Instrument`. Boxed
//! driver objects of a tracked category wrap themselves in that category's
//! decorator; all other values pass through unchanged.

use std::fmt;

use qore_driver_api::{
    Array, Blob, CallableStatement, Connection, DatabaseMetaData, PreparedStatement, ResultSet,
    Statement, Value,
};
use tracing::trace;

use super::{
    Interceptor, InstrumentedArray, InstrumentedCallableStatement, InstrumentedConnection,
    InstrumentedMetaData, InstrumentedPreparedStatement, InstrumentedResultSet,
    InstrumentedStatement,
};

/// Families of driver objects that get wrapped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Connection,
    Statement,
    PreparedStatement,
    CallableStatement,
    ResultSet,
    DatabaseMetaData,
    Array,
}

impl Category {
    pub fn name(self) -> &'static str {
        match self {
            Self::Connection => "connection",
            Self::Statement => "statement",
            Self::PreparedStatement => "prepared_statement",
            Self::CallableStatement => "callable_statement",
            Self::ResultSet => "result_set",
            Self::DatabaseMetaData => "database_metadata",
            Self::Array => "array",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A value that can cross an interception boundary
pub trait Instrument: Sized {
    /// Wraps `self` in its category's decorator; the default passes it through
    fn instrument(self, _interceptor: &Interceptor) -> Self {
        self
    }
}

impl<T: Instrument> Instrument for Option<T> {
    fn instrument(self, interceptor: &Interceptor) -> Self {
        self.map(|value| value.instrument(interceptor))
    }
}

macro_rules! passthrough {
    ($($ty:ty),* $(,)?) => {
        $(impl Instrument for $ty {})*
    };
}

passthrough!(
    (),
    bool,
    i64,
    u64,
    String,
    Value,
    Vec<i64>,
    Vec<Value>,
    Box<dyn Blob>,
);

macro_rules! tracked {
    ($($object:ident => $wrapper:ident),* $(,)?) => {
        $(
            impl Instrument for Box<dyn $object> {
                fn instrument(self, interceptor: &Interceptor) -> Self {
                    trace!(
                        category = %Category::$object,
                        original = self.type_name(),
                        "Wrapping driver object"
                    );
                    Box::new($wrapper::new(self, interceptor.clone()))
                }
            }
        )*
    };
}

tracked!(
    Connection => InstrumentedConnection,
    Statement => InstrumentedStatement,
    PreparedStatement => InstrumentedPreparedStatement,
    CallableStatement => InstrumentedCallableStatement,
    ResultSet => InstrumentedResultSet,
    DatabaseMetaData => InstrumentedMetaData,
    Array => InstrumentedArray,
);

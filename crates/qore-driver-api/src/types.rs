// SPDX-License-Identifier: Apache-2.0

//! Plain data types exchanged with drivers

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Connection properties passed to `Driver::connect` (user, password, driver options)
pub type Properties = BTreeMap<String, String>;

/// A single column value or bound parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// Describes one connection property a driver understands
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyInfo {
    pub name: String,
    pub value: Option<String>,
    pub required: bool,
    pub description: Option<String>,
    pub choices: Vec<String>,
}

impl PropertyInfo {
    pub fn new(name: impl Into<String>, value: Option<String>) -> Self {
        Self {
            name: name.into(),
            value,
            required: false,
            description: None,
            choices: Vec::new(),
        }
    }
}

/// Registry-facing summary of a driver
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverInfo {
    pub id: String,
    pub major_version: u32,
    pub minor_version: u32,
    pub compliant: bool,
}

// Copyright 2025 Stoolap Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Value type for arbordb - a nullable, typed field

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use super::error::{Error, Result};
use super::types::DataType;

/// Literal used for an absent field in table files
pub const NULL_LITERAL: &str = "null";

/// A runtime field value
///
/// Text uses Arc<str> so cloning a value out of a shared row is cheap.
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// Absent field
    #[default]
    Null,

    /// 64-bit signed integer
    Integer(i64),

    /// UTF-8 text string (Arc for cheap cloning)
    Text(Arc<str>),
}

impl Value {
    // =========================================================================
    // Constructors
    // =========================================================================

    /// Create an integer value
    pub fn integer(value: i64) -> Self {
        Value::Integer(value)
    }

    /// Create a text value
    pub fn text(value: impl AsRef<str>) -> Self {
        Value::Text(Arc::from(value.as_ref()))
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Returns true if this value is NULL
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the data type of a non-NULL value
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            Value::Null => None,
            Value::Integer(_) => Some(DataType::Integer),
            Value::Text(s) => Some(DataType::Varchar(s.chars().count())),
        }
    }

    /// Name of the value's kind, used in type mismatch messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "NULL",
            Value::Integer(_) => "INT",
            Value::Text(_) => "VARCHAR",
        }
    }

    /// Extract as i64
    pub fn as_int64(&self) -> Option<i64> {
        match self {
            Value::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// Extract as &str
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    // =========================================================================
    // Comparison
    // =========================================================================

    /// Compare two values for ordering
    ///
    /// Returns:
    /// - Ok(ordering) for two non-NULL values of the same kind
    /// - Ok(Ordering::Equal) for two NULLs
    /// - Err if one side is NULL or the kinds differ
    pub fn compare(&self, other: &Value) -> Result<Ordering> {
        match (self, other) {
            (Value::Null, Value::Null) => Ok(Ordering::Equal),
            (Value::Null, _) | (_, Value::Null) => Err(Error::NullComparison),
            (Value::Integer(a), Value::Integer(b)) => Ok(a.cmp(b)),
            (Value::Text(a), Value::Text(b)) => Ok(a.cmp(b)),
            _ => Err(Error::IncomparableTypes),
        }
    }

    // =========================================================================
    // Disk encoding
    // =========================================================================

    /// Render the value the way table files store it
    pub fn to_disk_string(&self) -> String {
        match self {
            Value::Null => NULL_LITERAL.to_string(),
            Value::Integer(v) => v.to_string(),
            Value::Text(s) => s.to_string(),
        }
    }

    /// Parse a field read from a table file for a column of `data_type`
    pub fn from_disk_str(field: &str, data_type: DataType) -> Result<Value> {
        if field == NULL_LITERAL {
            return Ok(Value::Null);
        }
        match data_type {
            DataType::Integer => Ok(Value::Integer(field.parse::<i64>()?)),
            DataType::Varchar(_) => Ok(Value::text(field)),
        }
    }
}

// =========================================================================
// Trait implementations
// =========================================================================

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Integer(v) => write!(f, "{}", v),
            Value::Text(s) => write!(f, "{}", s),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            // NULL equals NULL for row identity and hashing
            (Value::Null, Value::Null) => true,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Text(a), Value::Text(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Value::Null => 0u8.hash(state),
            Value::Integer(v) => {
                1u8.hash(state);
                v.hash(state);
            }
            Value::Text(s) => {
                2u8.hash(state);
                s.hash(state);
            }
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Total ordering used by index keys and sorted scans:
/// NULL first, then integers, then text.
impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        fn discriminant(v: &Value) -> u8 {
            match v {
                Value::Null => 0,
                Value::Integer(_) => 1,
                Value::Text(_) => 2,
            }
        }
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => a.cmp(b),
            (Value::Text(a), Value::Text(b)) => a.cmp(b),
            _ => discriminant(self).cmp(&discriminant(other)),
        }
    }
}

// =========================================================================
// From implementations for convenient construction
// =========================================================================

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v as i64)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::text(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(Arc::from(v))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}

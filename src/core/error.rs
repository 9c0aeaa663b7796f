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

//! Error types for arbordb
//!
//! Insertion validation is reported through [`CheckResult`](super::CheckResult)
//! codes; everything else that can fail (query resolution, row validation,
//! persistence) is reported through this enum.

use thiserror::Error;

/// Result type alias for arbordb operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for arbordb
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    // =========================================================================
    // Table errors
    // =========================================================================
    /// Table not found in the catalog
    #[error("table '{0}' not found")]
    TableNotFound(String),

    /// Table already exists when trying to create
    #[error("table '{0}' already exists")]
    TableAlreadyExists(String),

    /// Row arity does not match the table schema
    #[error("table columns don't match, expected {expected}, got {got}")]
    TableColumnsNotMatch { expected: usize, got: usize },

    // =========================================================================
    // Column errors
    // =========================================================================
    /// Column not found in table schema
    #[error("column '{0}' not found")]
    ColumnNotFound(String),

    /// Unqualified column name matches more than one column
    #[error("column '{0}' is ambiguous")]
    AmbiguousColumn(String),

    /// Duplicate column name in schema
    #[error("duplicate column '{0}'")]
    DuplicateColumn(String),

    /// Column index out of bounds
    #[error("column index {index} out of bounds")]
    ColumnIndexOutOfBounds { index: usize },

    // =========================================================================
    // Value errors
    // =========================================================================
    /// The two sides of a comparison, or a value and its column, disagree on type
    #[error("type mismatch: {left} vs {right}")]
    TypeMismatch { left: String, right: String },

    /// Value exceeds the VARCHAR bound of its column
    #[error("value for column {column} is too long, max {max}, got {got}")]
    ValueTooLong {
        column: String,
        max: usize,
        got: usize,
    },

    /// Cannot compare NULL with non-NULL value
    #[error("cannot compare NULL with non-NULL value")]
    NullComparison,

    /// Cannot compare incompatible types
    #[error("cannot compare incompatible types")]
    IncomparableTypes,

    // =========================================================================
    // Query errors
    // =========================================================================
    /// Condition list is not a well-formed postfix sequence
    #[error("malformed condition list: {0}")]
    MalformedCondition(String),

    /// Invalid argument
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    // =========================================================================
    // Persistence errors
    // =========================================================================
    /// Table file could not be parsed
    #[error("parse error: {0}")]
    Parse(String),

    /// IO error (wrapped)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Internal error for unexpected conditions
    #[error("{message}")]
    Internal { message: String },
}

impl Error {
    /// Create a new TableColumnsNotMatch error
    pub fn table_columns_not_match(expected: usize, got: usize) -> Self {
        Error::TableColumnsNotMatch { expected, got }
    }

    /// Create a new TypeMismatch error
    pub fn type_mismatch(left: impl Into<String>, right: impl Into<String>) -> Self {
        Error::TypeMismatch {
            left: left.into(),
            right: right.into(),
        }
    }

    /// Create a new ValueTooLong error
    pub fn value_too_long(column: impl Into<String>, max: usize, got: usize) -> Self {
        Error::ValueTooLong {
            column: column.into(),
            max,
            got,
        }
    }

    /// Create a new MalformedCondition error
    pub fn malformed_condition(message: impl Into<String>) -> Self {
        Error::MalformedCondition(message.into())
    }

    /// Create a new InvalidArgument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Error::InvalidArgument(message.into())
    }

    /// Create a new Parse error
    pub fn parse(message: impl Into<String>) -> Self {
        Error::Parse(message.into())
    }

    /// Create a new IO error
    pub fn io(message: impl Into<String>) -> Self {
        Error::Io {
            message: message.into(),
        }
    }

    /// Create a new Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Error::Internal {
            message: message.into(),
        }
    }

    /// Returns true if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::TableNotFound(_) | Error::ColumnNotFound(_))
    }

    /// Returns true if this error is a query-resolution failure
    pub fn is_query_error(&self) -> bool {
        matches!(
            self,
            Error::TableNotFound(_)
                | Error::ColumnNotFound(_)
                | Error::AmbiguousColumn(_)
                | Error::TypeMismatch { .. }
                | Error::MalformedCondition(_)
        )
    }

    /// Returns true if this error came from reading or writing a table file
    pub fn is_persistence_error(&self) -> bool {
        matches!(self, Error::Io { .. } | Error::Parse(_))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::io(err.to_string())
    }
}

impl From<std::num::ParseIntError> for Error {
    fn from(err: std::num::ParseIntError) -> Self {
        Error::parse(err.to_string())
    }
}

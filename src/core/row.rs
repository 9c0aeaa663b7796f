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

//! Row type for arbordb - the `DataRecord` of a table
//!
//! A row is built once and then shared: tables, indexes and transient result
//! tables all hold the same [`RowRef`] instead of copying field values.

use std::fmt;
use std::ops::{Deref, Index};
use std::sync::Arc;

use super::error::{Error, Result};
use super::schema::Schema;
use super::value::{Value, NULL_LITERAL};

/// Shared handle to a stored row
pub type RowRef = Arc<Row>;

/// A database row containing column values in schema order
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Row {
    values: Vec<Value>,
}

impl Row {
    /// Create a new empty row
    #[inline]
    pub fn new() -> Self {
        Self { values: Vec::new() }
    }

    /// Create a row from a vector of values
    #[inline]
    pub fn from_values(values: Vec<Value>) -> Self {
        Self { values }
    }

    /// Create a row of NULLs matching a schema
    pub fn null_row(schema: &Schema) -> Self {
        Self {
            values: vec![Value::Null; schema.column_count()],
        }
    }

    /// Get the number of fields
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the row has no fields
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Get a field by position
    #[inline]
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Replace a whole field by position
    pub fn set(&mut self, index: usize, value: Value) -> Result<()> {
        match self.values.get_mut(index) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(Error::ColumnIndexOutOfBounds { index }),
        }
    }

    /// Iterate over the fields
    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.values.iter()
    }

    /// Consume the row, returning its fields
    #[inline]
    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    /// Get the fields as a slice
    #[inline]
    pub fn as_slice(&self) -> &[Value] {
        &self.values
    }

    /// Extract specific columns by their indices
    pub fn select_columns(&self, indices: &[usize]) -> Result<Row> {
        let mut values = Vec::with_capacity(indices.len());
        for &idx in indices {
            match self.values.get(idx) {
                Some(v) => values.push(v.clone()),
                None => return Err(Error::ColumnIndexOutOfBounds { index: idx }),
            }
        }
        Ok(Row::from_values(values))
    }

    /// Concatenate two rows (join output)
    pub fn concat(&self, other: &Row) -> Row {
        let mut values = Vec::with_capacity(self.len() + other.len());
        values.extend(self.values.iter().cloned());
        values.extend(other.values.iter().cloned());
        Row::from_values(values)
    }

    /// Validate the row against a schema: arity, field types and VARCHAR bounds
    pub fn validate(&self, schema: &Schema) -> Result<()> {
        if self.values.len() != schema.columns.len() {
            return Err(Error::table_columns_not_match(
                schema.columns.len(),
                self.values.len(),
            ));
        }

        for (value, col) in self.values.iter().zip(schema.columns.iter()) {
            if !col.data_type.accepts(value) {
                return Err(Error::type_mismatch(
                    format!("column {} ({})", col.name, col.data_type),
                    value.type_name(),
                ));
            }
            if let (Some(max), Value::Text(s)) = (col.data_type.varchar_limit(), value) {
                let got = s.chars().count();
                if got > max {
                    return Err(Error::value_too_long(&col.name, max, got));
                }
            }
            // Table files are line oriented with NUL separated fields
            if let Value::Text(s) = value {
                if s.contains(['\0', '\n', '\r']) || s.as_ref() == NULL_LITERAL {
                    return Err(Error::invalid_argument(format!(
                        "value in column {} cannot be stored",
                        col.name
                    )));
                }
            }
        }

        Ok(())
    }
}

impl Deref for Row {
    type Target = [Value];

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.values
    }
}

impl Index<usize> for Row {
    type Output = Value;

    #[inline]
    fn index(&self, index: usize) -> &Self::Output {
        &self.values[index]
    }
}

impl FromIterator<Value> for Row {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Row::from_values(iter.into_iter().collect())
    }
}

impl IntoIterator for Row {
    type Item = Value;
    type IntoIter = std::vec::IntoIter<Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

impl<'a> IntoIterator for &'a Row {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

impl From<Vec<Value>> for Row {
    fn from(values: Vec<Value>) -> Self {
        Row::from_values(values)
    }
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, value) in self.values.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", value)?;
        }
        write!(f, ")")
    }
}

/// Macro for creating rows conveniently
///
/// `row![1, "a", None::<i64>]` builds a three-field row.
#[macro_export]
macro_rules! row {
    () => {
        $crate::core::Row::new()
    };
    ($($value:expr),+ $(,)?) => {
        $crate::core::Row::from_values(vec![$($crate::core::Value::from($value)),+])
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{DataType, SchemaBuilder};

    fn create_test_schema() -> Schema {
        SchemaBuilder::new("test")
            .add_primary_key("id", DataType::Integer)
            .add("name", DataType::Varchar(5))
            .build()
    }

    #[test]
    fn test_row_macro() {
        let row = row![1, "a", None::<i64>];
        assert_eq!(row.len(), 3);
        assert_eq!(row[0], Value::integer(1));
        assert_eq!(row[1], Value::text("a"));
        assert!(row[2].is_null());
    }

    #[test]
    fn test_row_set() {
        let mut row = row![1, "a"];
        row.set(1, Value::text("b")).unwrap();
        assert_eq!(row[1], Value::text("b"));
        assert!(row.set(5, Value::Null).is_err());
    }

    #[test]
    fn test_row_validate() {
        let schema = create_test_schema();
        assert!(row![1, "abc"].validate(&schema).is_ok());
        assert!(row![None::<i64>, None::<&str>].validate(&schema).is_ok());
        assert!(matches!(
            row![1].validate(&schema),
            Err(Error::TableColumnsNotMatch { .. })
        ));
        assert!(matches!(
            row!["x", "abc"].validate(&schema),
            Err(Error::TypeMismatch { .. })
        ));
        assert!(matches!(
            row![1, "abcdef"].validate(&schema),
            Err(Error::ValueTooLong { .. })
        ));
    }

    #[test]
    fn test_row_validate_unstorable_text() {
        let schema = create_test_schema();
        for bad in ["null", "a\nb", "a\rb", "a\0b"] {
            assert!(
                matches!(
                    row![1, bad].validate(&schema),
                    Err(Error::InvalidArgument(_))
                ),
                "{:?}",
                bad
            );
        }
        assert!(row![1, "NULL"].validate(&schema).is_ok());
    }

    #[test]
    fn test_row_concat_and_select() {
        let left = row![1, 2];
        let right = row![3];
        let joined = left.concat(&right);
        assert_eq!(joined, row![1, 2, 3]);
        assert_eq!(joined.select_columns(&[2, 0]).unwrap(), row![3, 1]);
        assert!(joined.select_columns(&[9]).is_err());
    }

    #[test]
    fn test_row_display() {
        assert_eq!(row![1, "x", None::<i64>].to_string(), "(1, x, NULL)");
    }
}

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

//! Schema types for arbordb - table and column definitions
//!
//! Column names are plain (`age`) on base tables and become
//! `table.attribute`-qualified once a row has passed through a join.

use std::fmt;

use rustc_hash::FxHashSet;

use super::error::{Error, Result};
use super::types::DataType;

/// Display name carried by join outputs; their columns are already qualified
pub const RESULT_TABLE_NAME: &str = "$result";

/// A column definition in a table schema
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SchemaColumn {
    /// Column name, possibly `table.attribute` qualified
    pub name: String,

    /// Data type of the column
    pub data_type: DataType,
}

impl SchemaColumn {
    /// Create a new column definition
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }

    /// The attribute part of the name, without any table qualifier
    pub fn attribute(&self) -> &str {
        match self.name.rsplit_once('.') {
            Some((_, attr)) => attr,
            None => &self.name,
        }
    }

    /// Returns true if the name already carries a table qualifier
    pub fn is_qualified(&self) -> bool {
        self.name.contains('.')
    }
}

impl fmt::Display for SchemaColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.data_type)
    }
}

/// Table schema definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    /// Name of the table the columns belong to
    pub table_name: String,

    /// Column definitions
    pub columns: Vec<SchemaColumn>,

    /// Position of the primary key column, if any
    pub primary_key: Option<usize>,
}

impl Schema {
    /// Create a new schema with the given table name and columns
    pub fn new(table_name: impl Into<String>, columns: Vec<SchemaColumn>) -> Self {
        Self {
            table_name: table_name.into(),
            columns,
            primary_key: None,
        }
    }

    /// Set the primary key column
    pub fn with_primary_key(mut self, primary_key: Option<usize>) -> Self {
        self.primary_key = primary_key;
        self
    }

    /// Get the number of columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Get the column names in schema order
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Get a column by position
    pub fn column(&self, index: usize) -> Option<&SchemaColumn> {
        self.columns.get(index)
    }

    /// Check the definition itself: unique names and an in-range primary key
    pub fn validate(&self) -> Result<()> {
        if self.columns.is_empty() {
            return Err(Error::invalid_argument(format!(
                "table {} has no columns",
                self.table_name
            )));
        }
        let mut seen = FxHashSet::default();
        for col in &self.columns {
            if !seen.insert(col.name.as_str()) {
                return Err(Error::DuplicateColumn(col.name.clone()));
            }
        }
        if let Some(pk) = self.primary_key {
            if pk >= self.columns.len() {
                return Err(Error::ColumnIndexOutOfBounds { index: pk });
            }
        }
        Ok(())
    }

    /// The `table.attribute` name of a column
    pub fn qualified_name(&self, index: usize) -> String {
        let col = &self.columns[index];
        if col.is_qualified() {
            col.name.clone()
        } else {
            format!("{}.{}", self.table_name, col.name)
        }
    }

    /// All qualified column names, in schema order
    pub fn qualified_names(&self) -> Vec<String> {
        (0..self.columns.len())
            .map(|i| self.qualified_name(i))
            .collect()
    }

    /// Columns renamed with this schema's table name, as a join emits them
    pub fn qualified_columns(&self) -> Vec<SchemaColumn> {
        self.columns
            .iter()
            .enumerate()
            .map(|(i, c)| SchemaColumn::new(self.qualified_name(i), c.data_type))
            .collect()
    }

    /// Find a column by its qualified name
    pub fn position_of_qualified(&self, qualified: &str) -> Option<usize> {
        (0..self.columns.len()).find(|&i| self.qualified_name(i) == qualified)
    }

    /// Resolve an attribute reference to a column position.
    ///
    /// With a table qualifier the qualified name must match exactly; without
    /// one the attribute part must match exactly one column.
    pub fn resolve(&self, table: Option<&str>, attribute: &str) -> Result<usize> {
        let (table, attribute) = match (table, attribute.rsplit_once('.')) {
            (None, Some((t, a))) => (Some(t), a),
            _ => (table, attribute),
        };

        let mut found = None;
        for (i, col) in self.columns.iter().enumerate() {
            let matched = match table {
                Some(t) => self.qualified_name(i) == format!("{}.{}", t, attribute),
                None => col.attribute() == attribute,
            };
            if matched {
                if found.is_some() {
                    return Err(Error::AmbiguousColumn(attribute.to_string()));
                }
                found = Some(i);
            }
        }

        found.ok_or_else(|| match table {
            Some(t) => Error::ColumnNotFound(format!("{}.{}", t, attribute)),
            None => Error::ColumnNotFound(attribute.to_string()),
        })
    }

    /// Copy of this schema under another table name
    pub fn renamed(&self, table_name: impl Into<String>) -> Schema {
        Schema {
            table_name: table_name.into(),
            columns: self.columns.clone(),
            primary_key: self.primary_key,
        }
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (", self.table_name)?;
        for (i, col) in self.columns.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", col)?;
            if self.primary_key == Some(i) {
                write!(f, " PRIMARY KEY")?;
            }
        }
        write!(f, ")")
    }
}

/// Builder for creating schemas
pub struct SchemaBuilder {
    table_name: String,
    columns: Vec<SchemaColumn>,
    primary_key: Option<usize>,
}

impl SchemaBuilder {
    /// Create a new schema builder
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            columns: Vec::new(),
            primary_key: None,
        }
    }

    /// Add a column
    pub fn add(mut self, name: impl Into<String>, data_type: DataType) -> Self {
        self.columns.push(SchemaColumn::new(name, data_type));
        self
    }

    /// Add the primary key column
    pub fn add_primary_key(mut self, name: impl Into<String>, data_type: DataType) -> Self {
        self.primary_key = Some(self.columns.len());
        self.columns.push(SchemaColumn::new(name, data_type));
        self
    }

    /// Build the schema
    pub fn build(self) -> Schema {
        Schema::new(self.table_name, self.columns).with_primary_key(self.primary_key)
    }
}

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

//! Parsed statements and their results
//!
//! The SQL text itself is parsed elsewhere. A [`ParsedQuery`] is what that
//! layer hands over: table names, column definitions, index declarations,
//! conditions already linearized in postfix order and projection targets.

use std::fmt;

use crate::core::{CheckResult, DataType, IndexDeclaration, Row, Value};
use crate::executor::Condition;

/// A table in a FROM list, optionally under an alias
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRef {
    pub name: String,
    pub alias: Option<String>,
}

impl TableRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: None,
        }
    }

    pub fn aliased(name: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: Some(alias.into()),
        }
    }

    /// Name the table is referred to by inside the query
    pub fn visible_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

/// A SELECT target
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Projection {
    /// `*`
    All,
    /// `table.attribute` or a bare attribute
    Column { table: Option<String>, name: String },
}

impl Projection {
    pub fn column(table: impl Into<String>, name: impl Into<String>) -> Self {
        Projection::Column {
            table: Some(table.into()),
            name: name.into(),
        }
    }
}

impl fmt::Display for Projection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Projection::All => write!(f, "*"),
            Projection::Column {
                table: Some(t),
                name,
            } => write!(f, "{}.{}", t, name),
            Projection::Column { table: None, name } => write!(f, "{}", name),
        }
    }
}

/// Statement kinds the engine executes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    CreateTable,
    DropTable,
    Insert,
    Select,
}

/// A statement as delivered by the parser
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedQuery {
    pub command: Command,
    /// Target table (CREATE / DROP / INSERT) or the FROM list (SELECT)
    pub tables: Vec<TableRef>,
    /// Column names of a CREATE TABLE
    pub attribute_names: Vec<String>,
    /// Column types of a CREATE TABLE, parallel to `attribute_names`
    pub attribute_types: Vec<DataType>,
    pub primary_key: Option<usize>,
    pub indexes: Vec<IndexDeclaration>,
    /// INSERT values, already type checked by the parser
    pub values: Vec<Value>,
    /// WHERE clause in postfix order
    pub conditions: Vec<Condition>,
    pub projections: Vec<Projection>,
}

impl ParsedQuery {
    fn empty(command: Command, tables: Vec<TableRef>) -> Self {
        Self {
            command,
            tables,
            attribute_names: Vec::new(),
            attribute_types: Vec::new(),
            primary_key: None,
            indexes: Vec::new(),
            values: Vec::new(),
            conditions: Vec::new(),
            projections: Vec::new(),
        }
    }

    pub fn create_table(
        name: impl Into<String>,
        columns: Vec<(String, DataType)>,
        primary_key: Option<usize>,
        indexes: Vec<IndexDeclaration>,
    ) -> Self {
        let (attribute_names, attribute_types) = columns.into_iter().unzip();
        Self {
            attribute_names,
            attribute_types,
            primary_key,
            indexes,
            ..Self::empty(Command::CreateTable, vec![TableRef::new(name)])
        }
    }

    pub fn drop_table(name: impl Into<String>) -> Self {
        Self::empty(Command::DropTable, vec![TableRef::new(name)])
    }

    pub fn insert(name: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            values,
            ..Self::empty(Command::Insert, vec![TableRef::new(name)])
        }
    }

    pub fn select(
        tables: Vec<TableRef>,
        conditions: Vec<Condition>,
        projections: Vec<Projection>,
    ) -> Self {
        Self {
            conditions,
            projections,
            ..Self::empty(Command::Select, tables)
        }
    }
}

/// Rows of a finished SELECT with their column headers
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResultSet {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

impl ResultSet {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column header
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }
}

/// Outcome of [`Database::execute`](super::Database::execute)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecResult {
    /// CREATE TABLE / DROP TABLE succeeded
    Done,
    /// INSERT outcome; rejected rows are not errors
    Inserted(CheckResult),
    Rows(ResultSet),
}

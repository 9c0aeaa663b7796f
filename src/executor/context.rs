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

//! Query Context
//!
//! The FROM list of one statement: every base table the query reads, each
//! under the name the query refers to it by. Attribute references in
//! conditions are resolved here.

use std::fmt;

use crate::core::{Error, Result};
use crate::storage::traits::Table;

/// Tables visible to one query
#[derive(Default)]
pub struct QueryContext {
    tables: Vec<Box<dyn Table>>,
}

impl QueryContext {
    /// Create an empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context from already aliased tables
    pub fn with_tables(tables: Vec<Box<dyn Table>>) -> Result<Self> {
        let mut ctx = Self::new();
        for table in tables {
            ctx.add(table)?;
        }
        Ok(ctx)
    }

    /// Add a table; names must be unique within a query
    pub fn add(&mut self, table: Box<dyn Table>) -> Result<()> {
        if self.tables.iter().any(|t| t.name() == table.name()) {
            return Err(Error::invalid_argument(format!(
                "table name {} appears more than once, use an alias",
                table.name()
            )));
        }
        self.tables.push(table);
        Ok(())
    }

    /// Number of tables in the FROM list
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Returns true if there is no table to read from
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Tables in FROM order
    pub fn tables(&self) -> impl Iterator<Item = &dyn Table> {
        self.tables.iter().map(|t| t.as_ref())
    }

    /// Look up a table by the name the query uses for it
    pub fn table(&self, name: &str) -> Result<&dyn Table> {
        self.tables
            .iter()
            .find(|t| t.name() == name)
            .map(|t| t.as_ref())
            .ok_or_else(|| Error::TableNotFound(name.to_string()))
    }

    /// Resolve an attribute reference to its table and column position
    ///
    /// An unqualified name must belong to exactly one table.
    pub fn resolve(&self, table: Option<&str>, attribute: &str) -> Result<(&dyn Table, usize)> {
        let (table, attribute) = match (table, attribute.split_once('.')) {
            (None, Some((t, a))) => (Some(t), a),
            _ => (table, attribute),
        };

        if let Some(name) = table {
            let t = self.table(name)?;
            let column = t.schema().resolve(Some(name), attribute)?;
            return Ok((t, column));
        }

        let mut found: Option<(&dyn Table, usize)> = None;
        for t in self.tables() {
            match t.schema().resolve(None, attribute) {
                Ok(column) => {
                    if found.is_some() {
                        return Err(Error::AmbiguousColumn(attribute.to_string()));
                    }
                    found = Some((t, column));
                }
                Err(Error::ColumnNotFound(_)) => {}
                Err(e) => return Err(e),
            }
        }
        found.ok_or_else(|| Error::ColumnNotFound(attribute.to_string()))
    }
}

impl fmt::Debug for QueryContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.tables.iter().map(|t| t.name()))
            .finish()
    }
}

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

//! Table trait for the storage backends
//!
//! Every query method has a full-scan default. A backend overrides only the
//! operations its index can answer faster; everything else falls through to
//! a row-by-row filter using [`Operator::evaluate`].

use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::core::{
    CheckResult, Error, IndexDeclaration, Operator, Result, Row, RowRef, Schema, Value,
};
use crate::storage::backend::ArrayListTable;
use crate::storage::persistence;

/// Names of the base tables a table's rows were derived from
pub type SourceSet = BTreeSet<String>;

/// Build a provenance set holding a single base table
pub fn source_of(name: &str) -> SourceSet {
    let mut sources = SourceSet::new();
    sources.insert(name.to_string());
    sources
}

/// The storage backend behind a table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableKind {
    /// Whole-row hashing, no column index
    Set,
    /// Hash index on one column
    Hash,
    /// B+Tree index on one column
    BPlusTree,
    /// One sub-backend per indexed column
    MultiIndex,
    /// Unchecked append-only list (query results)
    ArrayList,
}

impl TableKind {
    /// Returns the name used in the catalog manifest
    pub fn as_str(&self) -> &'static str {
        match self {
            TableKind::Set => "SET",
            TableKind::Hash => "HASH",
            TableKind::BPlusTree => "BPLUSTREE",
            TableKind::MultiIndex => "MULTI",
            TableKind::ArrayList => "ARRAYLIST",
        }
    }

    /// Returns true for the single-key indexed backends
    pub fn is_single_key(&self) -> bool {
        matches!(self, TableKind::Hash | TableKind::BPlusTree)
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TableKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "SET" => Ok(TableKind::Set),
            "HASH" => Ok(TableKind::Hash),
            "BPLUSTREE" => Ok(TableKind::BPlusTree),
            "MULTI" => Ok(TableKind::MultiIndex),
            "ARRAYLIST" => Ok(TableKind::ArrayList),
            other => Err(Error::parse(format!("unknown table kind {}", other))),
        }
    }
}

/// Keep the rows of `rows` for which `column <op> key` holds
pub(crate) fn filter_rows<'a>(
    rows: impl IntoIterator<Item = &'a RowRef>,
    column: usize,
    op: Operator,
    key: &Value,
) -> Vec<RowRef> {
    rows.into_iter()
        .filter(|row| row.get(column).is_some_and(|v| op.evaluate(v, key)))
        .cloned()
        .collect()
}

/// Table represents a stored relation or a transient query result
///
/// Rows are shared by reference: query methods return an
/// [`ArrayListTable`] whose rows point at the same [`RowRef`]s the backend
/// stores. Results keep the queried table's name, schema and provenance.
pub trait Table: Send + Sync {
    /// Returns the display name of the table
    fn name(&self) -> &str;

    /// Returns the schema of the table
    fn schema(&self) -> &Schema;

    /// Returns the base tables this table was derived from
    fn sources(&self) -> &SourceSet;

    /// Returns the storage backend kind
    fn kind(&self) -> TableKind;

    /// Returns true if this table shares another table's storage
    fn is_alias(&self) -> bool {
        false
    }

    /// Column the single-key backends index on
    fn key_column(&self) -> Option<usize> {
        None
    }

    /// Per-column index declarations of a multi-index table
    fn index_declarations(&self) -> Vec<IndexDeclaration> {
        Vec::new()
    }

    // =========================================================================
    // Insertion
    // =========================================================================

    /// Decide whether `row` may be inserted
    ///
    /// Checks run in priority order: identical row, NULL primary key,
    /// duplicate primary key.
    fn check_input_data(&self, row: &Row) -> CheckResult;

    /// Insert a row that already passed [`Table::check_input_data`]
    ///
    /// Returns false if the table cannot accept writes (aliases).
    fn insert(&mut self, row: Row) -> bool;

    /// Bulk insertion of trusted rows, returns how many were stored
    fn insert_all(&mut self, rows: Vec<Row>) -> usize {
        let mut inserted = 0;
        for row in rows {
            if self.insert(row) {
                inserted += 1;
            }
        }
        inserted
    }

    // =========================================================================
    // Retrieval
    // =========================================================================

    /// All stored rows
    fn records(&self) -> Vec<RowRef>;

    /// Number of stored rows
    fn len(&self) -> usize {
        self.records().len()
    }

    /// Returns true if the table holds no rows
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All stored rows ordered by `column` (NULL first, stable for ties)
    fn sorted_records(&self, column: usize) -> Vec<RowRef> {
        let mut rows = self.records();
        rows.sort_by(|a, b| a.get(column).cmp(&b.get(column)));
        rows
    }

    /// Rows matching an arbitrary predicate
    fn scan(&self, predicate: &dyn Fn(&Row) -> bool) -> ArrayListTable {
        let rows = self
            .records()
            .into_iter()
            .filter(|row| predicate(&**row))
            .collect();
        self.result(rows)
    }

    /// Wrap rows as a result carrying this table's name, schema and provenance
    fn result(&self, rows: Vec<RowRef>) -> ArrayListTable {
        ArrayListTable::with_rows(
            self.name(),
            self.schema().clone(),
            self.sources().clone(),
            rows,
        )
    }

    // =========================================================================
    // Predicate queries
    // =========================================================================

    /// Rows with `column <op> key`, dispatched to the matching query method
    fn query(&self, column: usize, op: Operator, key: &Value) -> ArrayListTable {
        match op {
            Operator::Eq => self.query_equal(column, key),
            Operator::Ne => self.query_not_equal(column, key),
            Operator::Lt => self.query_less(column, key),
            Operator::Lte => self.query_less_equal(column, key),
            Operator::Gt => self.query_greater(column, key),
            Operator::Gte => self.query_greater_equal(column, key),
        }
    }

    /// Rows with `column = key`
    fn query_equal(&self, column: usize, key: &Value) -> ArrayListTable {
        self.result(filter_rows(&self.records(), column, Operator::Eq, key))
    }

    /// Rows with `column != key`
    fn query_not_equal(&self, column: usize, key: &Value) -> ArrayListTable {
        self.result(filter_rows(&self.records(), column, Operator::Ne, key))
    }

    /// Rows with `column < key`
    fn query_less(&self, column: usize, key: &Value) -> ArrayListTable {
        self.result(filter_rows(&self.records(), column, Operator::Lt, key))
    }

    /// Rows with `column <= key`
    fn query_less_equal(&self, column: usize, key: &Value) -> ArrayListTable {
        self.result(filter_rows(&self.records(), column, Operator::Lte, key))
    }

    /// Rows with `column > key`
    fn query_greater(&self, column: usize, key: &Value) -> ArrayListTable {
        self.result(filter_rows(&self.records(), column, Operator::Gt, key))
    }

    /// Rows with `column >= key`
    fn query_greater_equal(&self, column: usize, key: &Value) -> ArrayListTable {
        self.result(filter_rows(&self.records(), column, Operator::Gte, key))
    }

    /// Rows with `from < column < to`, each end optionally inclusive
    fn query_range(
        &self,
        column: usize,
        from: &Value,
        from_inclusive: bool,
        to: &Value,
        to_inclusive: bool,
    ) -> ArrayListTable {
        let lower = if from_inclusive {
            Operator::Gte
        } else {
            Operator::Gt
        };
        let upper = if to_inclusive {
            Operator::Lte
        } else {
            Operator::Lt
        };
        let rows = self.records();
        let lower_matches = filter_rows(&rows, column, lower, from);
        self.result(filter_rows(&lower_matches, column, upper, to))
    }

    // =========================================================================
    // Aliasing and persistence
    // =========================================================================

    /// A table named `name` sharing this table's storage
    fn generate_alias(&self, name: &str) -> Box<dyn Table>;

    /// Serialize the table to `path` in the table file layout
    fn write_to_disk(&self, path: &Path) -> Result<()> {
        persistence::write_table(self, path)
    }
}

impl<'a> fmt::Debug for dyn Table + 'a {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Table")
            .field("name", &self.name())
            .field("kind", &self.kind())
            .field("rows", &self.len())
            .finish()
    }
}

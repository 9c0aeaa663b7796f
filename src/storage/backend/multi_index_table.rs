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

//! Multi-index table
//!
//! Composes one single-key backend per declared index. Every part stores
//! the same shared rows; a query on column `c` goes to the part keyed on
//! `c`, or to the first part (which then scans) when `c` has no index.

use std::path::Path;
use std::sync::Arc;

use rustc_hash::FxHashSet;
use tracing::warn;

use crate::core::{
    CheckResult, Error, IndexDeclaration, IndexType, Result, Row, RowRef, Schema, Value,
};
use crate::storage::backend::{ArrayListTable, BPlusTreeTable, HashTable};
use crate::storage::config::IndexConfig;
use crate::storage::persistence;
use crate::storage::traits::{source_of, SourceSet, Table, TableKind};

enum IndexPart {
    Hash(HashTable),
    Tree(BPlusTreeTable),
}

impl IndexPart {
    fn table(&self) -> &dyn Table {
        match self {
            IndexPart::Hash(t) => t,
            IndexPart::Tree(t) => t,
        }
    }

    fn insert_shared(&mut self, row: RowRef) -> bool {
        match self {
            IndexPart::Hash(t) => t.insert_shared(row),
            IndexPart::Tree(t) => t.insert_shared(row),
        }
    }

    fn alias(&self, name: &str) -> Self {
        match self {
            IndexPart::Hash(t) => IndexPart::Hash(t.alias(name)),
            IndexPart::Tree(t) => IndexPart::Tree(t.alias(name)),
        }
    }
}

/// Table with one index per declared column
pub struct MultiIndexTable {
    name: String,
    schema: Schema,
    sources: SourceSet,
    declarations: Vec<IndexDeclaration>,
    parts: Vec<IndexPart>,
    alias: bool,
}

impl MultiIndexTable {
    /// Create an empty base table. `NONE` declarations are ignored and only
    /// the first declaration per column counts; at least one index must
    /// remain.
    pub fn new(
        name: impl Into<String>,
        schema: Schema,
        declarations: &[IndexDeclaration],
        config: IndexConfig,
    ) -> Result<Self> {
        let name = name.into();
        let mut seen = FxHashSet::default();
        let mut effective = Vec::new();
        for decl in declarations {
            if decl.column >= schema.column_count() {
                return Err(Error::ColumnIndexOutOfBounds { index: decl.column });
            }
            if decl.index_type != IndexType::None && seen.insert(decl.column) {
                effective.push(*decl);
            }
        }
        if effective.is_empty() {
            return Err(Error::invalid_argument(format!(
                "multi-index table {} declares no index",
                name
            )));
        }

        let parts = effective
            .iter()
            .map(|decl| match decl.index_type {
                IndexType::Hash => {
                    IndexPart::Hash(HashTable::new(name.clone(), schema.clone(), Some(decl.column)))
                }
                _ => IndexPart::Tree(BPlusTreeTable::new(
                    name.clone(),
                    schema.clone(),
                    Some(decl.column),
                    config,
                )),
            })
            .collect();

        Ok(Self {
            sources: source_of(&name),
            name,
            schema,
            declarations: effective,
            parts,
            alias: false,
        })
    }

    /// Rebuild a table from a file written by [`Table::write_to_disk`]
    pub fn restore_from_disk(path: &Path, config: IndexConfig) -> Result<Self> {
        let image = persistence::read_table(path, TableKind::MultiIndex)?;
        let mut table = MultiIndexTable::new(image.name, image.schema, &image.declarations, config)?;
        table.insert_all(image.rows);
        Ok(table)
    }

    /// The part answering queries on `column`
    fn route(&self, column: usize) -> &dyn Table {
        let part = self
            .parts
            .iter()
            .find(|p| p.table().key_column() == Some(column))
            .unwrap_or(&self.parts[0]);
        part.table()
    }
}

impl Table for MultiIndexTable {
    fn name(&self) -> &str {
        &self.name
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn sources(&self) -> &SourceSet {
        &self.sources
    }

    fn kind(&self) -> TableKind {
        TableKind::MultiIndex
    }

    fn is_alias(&self) -> bool {
        self.alias
    }

    fn index_declarations(&self) -> Vec<IndexDeclaration> {
        self.declarations.clone()
    }

    /// An identical row found by any part wins over the primary key checks,
    /// which every part answers the same way
    fn check_input_data(&self, row: &Row) -> CheckResult {
        let mut first_failure = CheckResult::Success;
        for part in &self.parts {
            match part.table().check_input_data(row) {
                CheckResult::DuplicatedDataTuple => return CheckResult::DuplicatedDataTuple,
                CheckResult::Success => {}
                other => {
                    if first_failure.is_success() {
                        first_failure = other;
                    }
                }
            }
        }
        first_failure
    }

    fn insert(&mut self, row: Row) -> bool {
        if self.alias {
            warn!(table = %self.name, "insert through alias ignored");
            return false;
        }
        let row = Arc::new(row);
        let mut inserted = true;
        for part in &mut self.parts {
            inserted &= part.insert_shared(Arc::clone(&row));
        }
        inserted
    }

    fn records(&self) -> Vec<RowRef> {
        self.parts[0].table().records()
    }

    fn len(&self) -> usize {
        self.parts[0].table().len()
    }

    fn sorted_records(&self, column: usize) -> Vec<RowRef> {
        self.route(column).sorted_records(column)
    }

    fn query_equal(&self, column: usize, key: &Value) -> ArrayListTable {
        self.route(column).query_equal(column, key)
    }

    fn query_not_equal(&self, column: usize, key: &Value) -> ArrayListTable {
        self.route(column).query_not_equal(column, key)
    }

    fn query_less(&self, column: usize, key: &Value) -> ArrayListTable {
        self.route(column).query_less(column, key)
    }

    fn query_less_equal(&self, column: usize, key: &Value) -> ArrayListTable {
        self.route(column).query_less_equal(column, key)
    }

    fn query_greater(&self, column: usize, key: &Value) -> ArrayListTable {
        self.route(column).query_greater(column, key)
    }

    fn query_greater_equal(&self, column: usize, key: &Value) -> ArrayListTable {
        self.route(column).query_greater_equal(column, key)
    }

    fn query_range(
        &self,
        column: usize,
        from: &Value,
        from_inclusive: bool,
        to: &Value,
        to_inclusive: bool,
    ) -> ArrayListTable {
        self.route(column)
            .query_range(column, from, from_inclusive, to, to_inclusive)
    }

    fn generate_alias(&self, name: &str) -> Box<dyn Table> {
        Box::new(MultiIndexTable {
            name: name.to_string(),
            schema: self.schema.renamed(name),
            sources: source_of(name),
            declarations: self.declarations.clone(),
            parts: self.parts.iter().map(|p| p.alias(name)).collect(),
            alias: true,
        })
    }
}

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

//! Append-only result table
//!
//! Holds intermediate and final query results. There is no duplicate or
//! key checking and no column index, so every query is a scan.

use std::path::Path;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::warn;

use crate::core::{CheckResult, Result, Row, RowRef, Schema};
use crate::storage::persistence;
use crate::storage::traits::{source_of, SourceSet, Table, TableKind};

/// Unchecked list of rows
#[derive(Debug)]
pub struct ArrayListTable {
    name: String,
    schema: Schema,
    sources: SourceSet,
    rows: Arc<RwLock<Vec<RowRef>>>,
    alias: bool,
}

impl ArrayListTable {
    /// Create an empty table derived from the base table `name`
    pub fn new(name: impl Into<String>, schema: Schema) -> Self {
        let name = name.into();
        let sources = source_of(&name);
        Self::with_rows(name, schema, sources, Vec::new())
    }

    /// Create a table over already stored rows
    pub fn with_rows(
        name: impl Into<String>,
        schema: Schema,
        sources: SourceSet,
        rows: Vec<RowRef>,
    ) -> Self {
        Self {
            name: name.into(),
            schema,
            sources,
            rows: Arc::new(RwLock::new(rows)),
            alias: false,
        }
    }

    /// Rebuild a table from a file written by [`Table::write_to_disk`]
    pub fn restore_from_disk(path: &Path) -> Result<Self> {
        let image = persistence::read_table(path, TableKind::ArrayList)?;
        let sources = source_of(&image.name);
        let rows = image.rows.into_iter().map(Arc::new).collect();
        Ok(Self::with_rows(image.name, image.schema, sources, rows))
    }

    /// Take the rows out, cloning the list only if an alias still shares it
    pub fn into_rows(self) -> Vec<RowRef> {
        match Arc::try_unwrap(self.rows) {
            Ok(lock) => lock.into_inner(),
            Err(shared) => {
                let rows = shared.read().clone();
                rows
            }
        }
    }
}

/// Snapshot copy: the row list is copied, the rows stay shared
impl Clone for ArrayListTable {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            schema: self.schema.clone(),
            sources: self.sources.clone(),
            rows: Arc::new(RwLock::new(self.rows.read().clone())),
            alias: false,
        }
    }
}

impl Table for ArrayListTable {
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
        TableKind::ArrayList
    }

    fn is_alias(&self) -> bool {
        self.alias
    }

    fn check_input_data(&self, _row: &Row) -> CheckResult {
        CheckResult::Success
    }

    fn insert(&mut self, row: Row) -> bool {
        if self.alias {
            warn!(table = %self.name, "insert through alias ignored");
            return false;
        }
        self.rows.write().push(Arc::new(row));
        true
    }

    fn records(&self) -> Vec<RowRef> {
        self.rows.read().clone()
    }

    fn len(&self) -> usize {
        self.rows.read().len()
    }

    fn generate_alias(&self, name: &str) -> Box<dyn Table> {
        Box::new(ArrayListTable {
            name: name.to_string(),
            schema: self.schema.renamed(name),
            sources: source_of(name),
            rows: Arc::clone(&self.rows),
            alias: true,
        })
    }
}

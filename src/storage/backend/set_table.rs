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

//! Set table - uniqueness by whole-row hashing
//!
//! The fallback backend for tables without an indexed column. Rows are kept
//! in insertion order; a row hash set rejects identical tuples and a value
//! set tracks primary keys. Every query is a full scan.

use std::path::Path;
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashSet;
use tracing::warn;

use crate::core::{CheckResult, Result, Row, RowRef, Schema, Value};
use crate::storage::backend::check_primary_key;
use crate::storage::persistence;
use crate::storage::traits::{source_of, SourceSet, Table, TableKind};

#[derive(Debug, Default)]
struct SetStore {
    rows: Vec<RowRef>,
    row_set: FxHashSet<RowRef>,
    pk_values: FxHashSet<Value>,
}

/// Table without a column index
#[derive(Debug)]
pub struct SetTable {
    name: String,
    schema: Schema,
    sources: SourceSet,
    store: Arc<RwLock<SetStore>>,
    alias: bool,
}

impl SetTable {
    /// Create an empty base table
    pub fn new(name: impl Into<String>, schema: Schema) -> Self {
        let name = name.into();
        Self {
            sources: source_of(&name),
            name,
            schema,
            store: Arc::new(RwLock::new(SetStore::default())),
            alias: false,
        }
    }

    /// Rebuild a table from a file written by [`Table::write_to_disk`]
    pub fn restore_from_disk(path: &Path) -> Result<Self> {
        let image = persistence::read_table(path, TableKind::Set)?;
        let mut table = SetTable::new(image.name, image.schema);
        table.insert_all(image.rows);
        Ok(table)
    }
}

impl Table for SetTable {
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
        TableKind::Set
    }

    fn is_alias(&self) -> bool {
        self.alias
    }

    fn check_input_data(&self, row: &Row) -> CheckResult {
        let store = self.store.read();
        if store.row_set.contains(row) {
            return CheckResult::DuplicatedDataTuple;
        }
        check_primary_key(&self.schema, row, |v| store.pk_values.contains(v))
    }

    fn insert(&mut self, row: Row) -> bool {
        if self.alias {
            warn!(table = %self.name, "insert through alias ignored");
            return false;
        }
        let row = Arc::new(row);
        let mut store = self.store.write();
        if let Some(pk) = self.schema.primary_key.and_then(|pk| row.get(pk)) {
            store.pk_values.insert(pk.clone());
        }
        store.row_set.insert(Arc::clone(&row));
        store.rows.push(row);
        true
    }

    fn records(&self) -> Vec<RowRef> {
        self.store.read().rows.clone()
    }

    fn len(&self) -> usize {
        self.store.read().rows.len()
    }

    fn generate_alias(&self, name: &str) -> Box<dyn Table> {
        Box::new(SetTable {
            name: name.to_string(),
            schema: self.schema.renamed(name),
            sources: source_of(name),
            store: Arc::clone(&self.store),
            alias: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{DataType, Operator, SchemaBuilder};
    use crate::row;

    fn accounts() -> SetTable {
        let schema = SchemaBuilder::new("accounts")
            .add_primary_key("id", DataType::Integer)
            .add("owner", DataType::Varchar(10))
            .build();
        SetTable::new("accounts", schema)
    }

    fn insert_checked(table: &mut SetTable, row: Row) -> CheckResult {
        let check = table.check_input_data(&row);
        if check.is_success() {
            assert!(table.insert(row));
        }
        check
    }

    #[test]
    fn test_insert_and_checks() {
        let mut t = accounts();
        assert_eq!(insert_checked(&mut t, row![1, "ann"]), CheckResult::Success);
        assert_eq!(
            insert_checked(&mut t, row![1, "ann"]),
            CheckResult::DuplicatedDataTuple
        );
        assert_eq!(
            insert_checked(&mut t, row![1, "bob"]),
            CheckResult::DuplicatedPrimaryKey
        );
        assert_eq!(
            insert_checked(&mut t, row![None::<i64>, "cat"]),
            CheckResult::NullPrimaryKey
        );
        assert_eq!(insert_checked(&mut t, row![2, "bob"]), CheckResult::Success);
        assert_eq!(t.len(), 2);
    }

    #[test]
    fn test_no_primary_key_allows_nulls() {
        let schema = SchemaBuilder::new("notes")
            .add("body", DataType::Varchar(10))
            .build();
        let mut t = SetTable::new("notes", schema);
        assert_eq!(insert_checked(&mut t, row![None::<&str>]), CheckResult::Success);
        assert_eq!(
            insert_checked(&mut t, row![None::<&str>]),
            CheckResult::DuplicatedDataTuple
        );
    }

    #[test]
    fn test_records_keep_insertion_order() {
        let mut t = accounts();
        for id in [5, 3, 9] {
            insert_checked(&mut t, row![id, "x"]);
        }
        let ids: Vec<Value> = t.records().iter().map(|r| r[0].clone()).collect();
        assert_eq!(ids, vec![Value::integer(5), Value::integer(3), Value::integer(9)]);
    }

    #[test]
    fn test_scan_queries() {
        let mut t = accounts();
        for id in 1..=5 {
            insert_checked(&mut t, row![id, "x"]);
        }
        assert_eq!(t.query(0, Operator::Gt, &Value::integer(3)).len(), 2);
        assert_eq!(t.query(0, Operator::Ne, &Value::integer(3)).len(), 4);
        assert_eq!(t.query(1, Operator::Eq, &Value::text("x")).len(), 5);
    }

    #[test]
    fn test_alias_sees_base_inserts() {
        let mut t = accounts();
        let alias = t.generate_alias("a");
        insert_checked(&mut t, row![1, "ann"]);
        assert_eq!(alias.len(), 1);
        assert_eq!(alias.check_input_data(&row![1, "ann"]), CheckResult::DuplicatedDataTuple);
        assert_eq!(alias.sources(), &source_of("a"));
        assert_eq!(alias.kind(), TableKind::Set);
    }
}

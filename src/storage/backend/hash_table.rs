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

//! Hash table - unordered index on one column
//!
//! ## Performance characteristics:
//! - check / insert: O(1) amortized plus a scan of the key's bucket
//! - equality query on the key column: O(1) bucket lookup
//! - every other query: full scan
//!
//! NULL is not a valid index key; rows whose key column is NULL go to a
//! separate overflow list and are exempt from the identical-row check.

use std::path::Path;
use std::sync::Arc;

use ahash::AHashMap;
use parking_lot::RwLock;
use rustc_hash::FxHashSet;
use smallvec::SmallVec;
use tracing::warn;

use crate::core::{CheckResult, Operator, Result, Row, RowRef, Schema, Value};
use crate::storage::backend::{check_keyed, default_key_column, ArrayListTable};
use crate::storage::persistence;
use crate::storage::traits::table::filter_rows;
use crate::storage::traits::{source_of, SourceSet, Table, TableKind};

#[derive(Debug, Default)]
struct HashStore {
    rows: Vec<RowRef>,
    /// Key -> rows; SmallVec avoids a heap allocation for short buckets
    index: AHashMap<Value, SmallVec<[RowRef; 4]>>,
    null_rows: Vec<RowRef>,
    pk_values: FxHashSet<Value>,
}

/// Table with a hash index on its key column
pub struct HashTable {
    name: String,
    schema: Schema,
    sources: SourceSet,
    key_column: usize,
    store: Arc<RwLock<HashStore>>,
    alias: bool,
}

impl HashTable {
    /// Create an empty base table indexed on `key_column` (default: the
    /// primary key, else column 0)
    pub fn new(name: impl Into<String>, schema: Schema, key_column: Option<usize>) -> Self {
        let name = name.into();
        let key_column = default_key_column(&schema, key_column);
        Self {
            sources: source_of(&name),
            name,
            schema,
            key_column,
            store: Arc::new(RwLock::new(HashStore::default())),
            alias: false,
        }
    }

    /// Rebuild a table from a file written by [`Table::write_to_disk`]
    pub fn restore_from_disk(path: &Path) -> Result<Self> {
        let image = persistence::read_table(path, TableKind::Hash)?;
        let mut table = HashTable::new(image.name, image.schema, image.key_column);
        table.insert_all(image.rows);
        Ok(table)
    }

    /// Number of distinct non-NULL keys
    pub fn key_count(&self) -> usize {
        self.store.read().index.len()
    }

    /// Insert a row already shared with sibling indexes
    pub(crate) fn insert_shared(&mut self, row: RowRef) -> bool {
        if self.alias {
            warn!(table = %self.name, "insert through alias ignored");
            return false;
        }
        let mut store = self.store.write();
        if let Some(pk) = self.schema.primary_key.and_then(|pk| row.get(pk)) {
            store.pk_values.insert(pk.clone());
        }
        match row.get(self.key_column) {
            Some(key) if !key.is_null() => store
                .index
                .entry(key.clone())
                .or_default()
                .push(Arc::clone(&row)),
            _ => store.null_rows.push(Arc::clone(&row)),
        }
        store.rows.push(row);
        true
    }

    /// A read-only table named `name` over the same store
    pub(crate) fn alias(&self, name: &str) -> Self {
        HashTable {
            name: name.to_string(),
            schema: self.schema.renamed(name),
            sources: source_of(name),
            key_column: self.key_column,
            store: Arc::clone(&self.store),
            alias: true,
        }
    }
}

impl Table for HashTable {
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
        TableKind::Hash
    }

    fn is_alias(&self) -> bool {
        self.alias
    }

    fn key_column(&self) -> Option<usize> {
        Some(self.key_column)
    }

    fn check_input_data(&self, row: &Row) -> CheckResult {
        let store = self.store.read();
        let bucket = row
            .get(self.key_column)
            .and_then(|key| store.index.get(key))
            .map(|bucket| bucket.as_slice());
        check_keyed(&self.schema, self.key_column, row, bucket, |v| {
            store.pk_values.contains(v)
        })
    }

    fn insert(&mut self, row: Row) -> bool {
        self.insert_shared(Arc::new(row))
    }

    fn records(&self) -> Vec<RowRef> {
        self.store.read().rows.clone()
    }

    fn len(&self) -> usize {
        self.store.read().rows.len()
    }

    fn query_equal(&self, column: usize, key: &Value) -> ArrayListTable {
        if column != self.key_column {
            return self.result(filter_rows(&self.records(), column, Operator::Eq, key));
        }
        let store = self.store.read();
        let rows = if key.is_null() {
            store.null_rows.clone()
        } else {
            store
                .index
                .get(key)
                .map(|bucket| bucket.to_vec())
                .unwrap_or_default()
        };
        drop(store);
        self.result(rows)
    }

    fn generate_alias(&self, name: &str) -> Box<dyn Table> {
        Box::new(self.alias(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{DataType, SchemaBuilder};
    use crate::row;

    fn orders() -> HashTable {
        let schema = SchemaBuilder::new("orders")
            .add_primary_key("id", DataType::Integer)
            .add("customer", DataType::Varchar(8))
            .add("total", DataType::Integer)
            .build();
        HashTable::new("orders", schema, Some(1))
    }

    fn load(table: &mut HashTable) {
        for row in [
            row![1, "ann", 10],
            row![2, "bob", 20],
            row![3, "ann", 30],
            row![4, None::<&str>, 40],
        ] {
            assert!(table.check_input_data(&row).is_success());
            table.insert(row);
        }
    }

    #[test]
    fn test_key_column_defaults_to_primary_key() {
        let schema = SchemaBuilder::new("t")
            .add("a", DataType::Integer)
            .add_primary_key("b", DataType::Integer)
            .build();
        assert_eq!(HashTable::new("t", schema, None).key_column(), Some(1));
    }

    #[test]
    fn test_bucket_lookup() {
        let mut t = orders();
        load(&mut t);
        assert_eq!(t.key_count(), 2);
        let ann = t.query_equal(1, &Value::text("ann"));
        let totals: Vec<Value> = ann.records().iter().map(|r| r[2].clone()).collect();
        assert_eq!(totals, vec![Value::integer(10), Value::integer(30)]);
        assert!(t.query_equal(1, &Value::text("zed")).is_empty());
    }

    #[test]
    fn test_null_key_overflow() {
        let mut t = orders();
        load(&mut t);
        let nulls = t.query_equal(1, &Value::Null);
        assert_eq!(nulls.len(), 1);
        assert_eq!(nulls.records()[0][0], Value::integer(4));

        // NULL key rows skip the identical-row check, the PK still applies
        assert_eq!(
            t.check_input_data(&row![4, None::<&str>, 40]),
            CheckResult::DuplicatedPrimaryKey
        );
        assert_eq!(
            t.check_input_data(&row![5, None::<&str>, 40]),
            CheckResult::Success
        );
    }

    #[test]
    fn test_duplicate_checks() {
        let mut t = orders();
        load(&mut t);
        assert_eq!(
            t.check_input_data(&row![1, "ann", 10]),
            CheckResult::DuplicatedDataTuple
        );
        assert_eq!(
            t.check_input_data(&row![1, "ann", 11]),
            CheckResult::DuplicatedPrimaryKey
        );
        assert_eq!(
            t.check_input_data(&row![None::<i64>, "cy", 1]),
            CheckResult::NullPrimaryKey
        );
    }

    #[test]
    fn test_non_key_queries_scan() {
        let mut t = orders();
        load(&mut t);
        assert_eq!(t.query(2, Operator::Gte, &Value::integer(20)).len(), 3);
        assert_eq!(t.query_equal(0, &Value::integer(2)).len(), 1);
        assert_eq!(t.query(1, Operator::Ne, &Value::text("ann")).len(), 2);
        assert_eq!(t.query(1, Operator::Lt, &Value::text("b")).len(), 2);
    }

    #[test]
    fn test_alias_uses_shared_index() {
        let mut t = orders();
        let alias = t.generate_alias("o");
        load(&mut t);
        assert_eq!(alias.query_equal(1, &Value::text("bob")).len(), 1);
        assert_eq!(alias.query_equal(1, &Value::text("bob")).name(), "o");
    }
}

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

//! B+Tree table - ordered index on one column
//!
//! Equality and every range operator on the key column are answered from
//! the [`BPlusTree`]; queries on other columns scan. Rows with a NULL key
//! live in an overflow list, sorted before every indexed key.

use std::ops::Bound;
use std::path::Path;
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashSet;
use tracing::{debug, warn};

use crate::core::{CheckResult, Operator, Result, Row, RowRef, Schema, Value};
use crate::storage::backend::{check_keyed, default_key_column, ArrayListTable};
use crate::storage::config::IndexConfig;
use crate::storage::index::BPlusTree;
use crate::storage::persistence;
use crate::storage::traits::table::filter_rows;
use crate::storage::traits::{source_of, SourceSet, Table, TableKind};

#[derive(Debug)]
struct TreeStore {
    rows: Vec<RowRef>,
    index: BPlusTree<Value, Vec<RowRef>>,
    null_rows: Vec<RowRef>,
    pk_values: FxHashSet<Value>,
}

impl TreeStore {
    fn new(config: IndexConfig) -> Self {
        Self {
            rows: Vec::new(),
            index: BPlusTree::new(config.order, config.capacity),
            null_rows: Vec::new(),
            pk_values: FxHashSet::default(),
        }
    }
}

fn flatten<'a>(entries: impl Iterator<Item = (&'a Value, &'a Vec<RowRef>)>) -> Vec<RowRef> {
    entries
        .flat_map(|(_, bucket)| bucket.iter().cloned())
        .collect()
}

/// Table with a B+Tree index on its key column
pub struct BPlusTreeTable {
    name: String,
    schema: Schema,
    sources: SourceSet,
    key_column: usize,
    store: Arc<RwLock<TreeStore>>,
    alias: bool,
}

impl BPlusTreeTable {
    /// Create an empty base table indexed on `key_column` (default: the
    /// primary key, else column 0)
    pub fn new(
        name: impl Into<String>,
        schema: Schema,
        key_column: Option<usize>,
        config: IndexConfig,
    ) -> Self {
        let name = name.into();
        let key_column = default_key_column(&schema, key_column);
        Self {
            sources: source_of(&name),
            name,
            schema,
            key_column,
            store: Arc::new(RwLock::new(TreeStore::new(config.normalized()))),
            alias: false,
        }
    }

    /// Rebuild a table from a file written by [`Table::write_to_disk`]; the
    /// index is bulk-loaded
    pub fn restore_from_disk(path: &Path, config: IndexConfig) -> Result<Self> {
        let image = persistence::read_table(path, TableKind::BPlusTree)?;
        let mut table = BPlusTreeTable::new(image.name, image.schema, image.key_column, config);
        table.insert_all(image.rows);
        Ok(table)
    }

    /// Number of distinct non-NULL keys
    pub fn key_count(&self) -> usize {
        self.store.read().index.len()
    }

    /// Levels in the index tree
    pub fn index_height(&self) -> usize {
        self.store.read().index.height()
    }

    /// Whether `column <op> key` can be answered by the tree
    fn indexed(&self, column: usize, key: &Value) -> bool {
        column == self.key_column
            && !key.is_null()
            && self
                .schema
                .column(column)
                .is_some_and(|c| c.data_type.accepts(key))
    }

    fn index_scan(&self, lower: Bound<&Value>, upper: Bound<&Value>) -> ArrayListTable {
        let rows = flatten(self.store.read().index.range_bounds(lower, upper));
        self.result(rows)
    }

    fn scan_with(&self, column: usize, op: Operator, key: &Value) -> ArrayListTable {
        self.result(filter_rows(&self.records(), column, op, key))
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
            Some(key) if !key.is_null() => match store.index.get_mut(key) {
                Some(bucket) => bucket.push(Arc::clone(&row)),
                None => {
                    store.index.put(key.clone(), vec![Arc::clone(&row)]);
                }
            },
            _ => store.null_rows.push(Arc::clone(&row)),
        }
        store.rows.push(row);
        true
    }

    /// A read-only table named `name` over the same store
    pub(crate) fn alias(&self, name: &str) -> Self {
        BPlusTreeTable {
            name: name.to_string(),
            schema: self.schema.renamed(name),
            sources: source_of(name),
            key_column: self.key_column,
            store: Arc::clone(&self.store),
            alias: true,
        }
    }
}

impl Table for BPlusTreeTable {
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
        TableKind::BPlusTree
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

    /// Bulk insertion; an empty table is bulk-loaded through
    /// [`BPlusTree::construct`]
    fn insert_all(&mut self, rows: Vec<Row>) -> usize {
        if self.alias {
            warn!(table = %self.name, "insert through alias ignored");
            return 0;
        }
        if !self.store.read().rows.is_empty() {
            let mut inserted = 0;
            for row in rows {
                if self.insert(row) {
                    inserted += 1;
                }
            }
            return inserted;
        }

        let rows: Vec<RowRef> = rows.into_iter().map(Arc::new).collect();
        let mut keyed: Vec<RowRef> = Vec::with_capacity(rows.len());
        let mut store = self.store.write();
        for row in &rows {
            if let Some(pk) = self.schema.primary_key.and_then(|pk| row.get(pk)) {
                store.pk_values.insert(pk.clone());
            }
            match row.get(self.key_column) {
                Some(key) if !key.is_null() => keyed.push(Arc::clone(row)),
                _ => store.null_rows.push(Arc::clone(row)),
            }
        }

        // Stable sort keeps insertion order inside each bucket
        let key_column = self.key_column;
        keyed.sort_by(|a, b| a.get(key_column).cmp(&b.get(key_column)));
        let mut keys: Vec<Value> = Vec::new();
        let mut buckets: Vec<Vec<RowRef>> = Vec::new();
        for row in keyed {
            let key = row.get(key_column).cloned().unwrap_or_default();
            if keys.last() == Some(&key) {
                if let Some(bucket) = buckets.last_mut() {
                    bucket.push(row);
                }
            } else {
                keys.push(key);
                buckets.push(vec![row]);
            }
        }
        debug!(table = %self.name, keys = keys.len(), "bulk loading index");
        store.index.construct(keys, buckets);

        let inserted = rows.len();
        store.rows = rows;
        inserted
    }

    fn records(&self) -> Vec<RowRef> {
        self.store.read().rows.clone()
    }

    fn len(&self) -> usize {
        self.store.read().rows.len()
    }

    /// Ordered by the index when sorting on the key column
    fn sorted_records(&self, column: usize) -> Vec<RowRef> {
        if column != self.key_column {
            let mut rows = self.records();
            rows.sort_by(|a, b| a.get(column).cmp(&b.get(column)));
            return rows;
        }
        let store = self.store.read();
        let mut rows = store.null_rows.clone();
        rows.extend(store.index.iter().flat_map(|(_, bucket)| bucket.iter().cloned()));
        rows
    }

    fn query_equal(&self, column: usize, key: &Value) -> ArrayListTable {
        if !self.indexed(column, key) {
            return self.scan_with(column, Operator::Eq, key);
        }
        let rows = self
            .store
            .read()
            .index
            .get(key)
            .cloned()
            .unwrap_or_default();
        self.result(rows)
    }

    fn query_not_equal(&self, column: usize, key: &Value) -> ArrayListTable {
        if !self.indexed(column, key) {
            return self.scan_with(column, Operator::Ne, key);
        }
        let store = self.store.read();
        let mut rows = store.null_rows.clone();
        rows.extend(flatten(
            store.index.range_bounds(Bound::Unbounded, Bound::Excluded(key)),
        ));
        rows.extend(flatten(
            store.index.range_bounds(Bound::Excluded(key), Bound::Unbounded),
        ));
        drop(store);
        self.result(rows)
    }

    fn query_less(&self, column: usize, key: &Value) -> ArrayListTable {
        if !self.indexed(column, key) {
            return self.scan_with(column, Operator::Lt, key);
        }
        self.index_scan(Bound::Unbounded, Bound::Excluded(key))
    }

    fn query_less_equal(&self, column: usize, key: &Value) -> ArrayListTable {
        if !self.indexed(column, key) {
            return self.scan_with(column, Operator::Lte, key);
        }
        self.index_scan(Bound::Unbounded, Bound::Included(key))
    }

    fn query_greater(&self, column: usize, key: &Value) -> ArrayListTable {
        if !self.indexed(column, key) {
            return self.scan_with(column, Operator::Gt, key);
        }
        self.index_scan(Bound::Excluded(key), Bound::Unbounded)
    }

    fn query_greater_equal(&self, column: usize, key: &Value) -> ArrayListTable {
        if !self.indexed(column, key) {
            return self.scan_with(column, Operator::Gte, key);
        }
        self.index_scan(Bound::Included(key), Bound::Unbounded)
    }

    fn query_range(
        &self,
        column: usize,
        from: &Value,
        from_inclusive: bool,
        to: &Value,
        to_inclusive: bool,
    ) -> ArrayListTable {
        if !self.indexed(column, from) || !self.indexed(column, to) {
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
            let candidates = filter_rows(&self.records(), column, lower, from);
            return self.result(filter_rows(&candidates, column, upper, to));
        }
        let lower = if from_inclusive {
            Bound::Included(from)
        } else {
            Bound::Excluded(from)
        };
        let upper = if to_inclusive {
            Bound::Included(to)
        } else {
            Bound::Excluded(to)
        };
        self.index_scan(lower, upper)
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

    fn scores() -> BPlusTreeTable {
        let schema = SchemaBuilder::new("scores")
            .add_primary_key("id", DataType::Integer)
            .add("points", DataType::Integer)
            .build();
        BPlusTreeTable::new("scores", schema, Some(1), IndexConfig::new(3, 3))
    }

    fn load(table: &mut BPlusTreeTable) {
        for (id, points) in [(1, 50), (2, 10), (3, 30), (4, 30), (5, 70), (6, 20)] {
            let row = row![id, points];
            assert!(table.check_input_data(&row).is_success());
            table.insert(row);
        }
        let row = row![7, None::<i64>];
        assert!(table.check_input_data(&row).is_success());
        table.insert(row);
    }

    fn ids(table: &ArrayListTable) -> Vec<i64> {
        let mut ids: Vec<i64> = table
            .records()
            .iter()
            .filter_map(|r| r[0].as_int64())
            .collect();
        ids.sort();
        ids
    }

    #[test]
    fn test_index_queries() {
        let mut t = scores();
        load(&mut t);
        assert_eq!(t.key_count(), 5);
        assert!(t.index_height() >= 2);

        let thirty = Value::integer(30);
        assert_eq!(ids(&t.query_equal(1, &thirty)), vec![3, 4]);
        assert_eq!(ids(&t.query_less(1, &thirty)), vec![2, 6]);
        assert_eq!(ids(&t.query_less_equal(1, &thirty)), vec![2, 3, 4, 6]);
        assert_eq!(ids(&t.query_greater(1, &thirty)), vec![1, 5]);
        assert_eq!(ids(&t.query_greater_equal(1, &thirty)), vec![1, 3, 4, 5]);
        assert_eq!(ids(&t.query_not_equal(1, &thirty)), vec![1, 2, 5, 6, 7]);
    }

    #[test]
    fn test_index_range() {
        let mut t = scores();
        load(&mut t);
        let (lo, hi) = (Value::integer(20), Value::integer(50));
        assert_eq!(ids(&t.query_range(1, &lo, true, &hi, false)), vec![3, 4, 6]);
        assert_eq!(ids(&t.query_range(1, &lo, false, &hi, true)), vec![1, 3, 4]);
        assert_eq!(ids(&t.query_range(1, &lo, true, &hi, true)), vec![1, 3, 4, 6]);
        assert!(t.query_range(1, &hi, true, &lo, true).is_empty());
    }

    #[test]
    fn test_index_matches_scan() {
        let mut t = scores();
        load(&mut t);
        for op in [
            Operator::Eq,
            Operator::Ne,
            Operator::Lt,
            Operator::Lte,
            Operator::Gt,
            Operator::Gte,
        ] {
            for k in [0, 10, 25, 30, 70, 99] {
                let key = Value::integer(k);
                let indexed = ids(&t.query(1, op, &key));
                let scanned = ids(&t.scan_with(1, op, &key));
                assert_eq!(indexed, scanned, "{} {}", op, k);
            }
        }
    }

    #[test]
    fn test_null_key_queries_scan() {
        let mut t = scores();
        load(&mut t);
        assert_eq!(ids(&t.query_equal(1, &Value::Null)), vec![7]);
        assert!(t.query_less(1, &Value::Null).is_empty());
    }

    #[test]
    fn test_sorted_records_by_key() {
        let mut t = scores();
        load(&mut t);
        let points: Vec<Value> = t.sorted_records(1).iter().map(|r| r[1].clone()).collect();
        assert_eq!(points[0], Value::Null);
        assert!(points.windows(2).all(|w| w[0] <= w[1]));
        let by_id: Vec<i64> = t
            .sorted_records(0)
            .iter()
            .filter_map(|r| r[0].as_int64())
            .collect();
        assert_eq!(by_id, vec![1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn test_insert_all_bulk_loads() {
        let mut bulk = scores();
        let rows: Vec<Row> = (0..40).map(|i| row![i, (i * 7) % 13]).collect();
        assert_eq!(bulk.insert_all(rows.clone()), 40);

        let mut seq = scores();
        for row in rows {
            seq.insert(row);
        }
        assert_eq!(bulk.records(), seq.records());
        assert_eq!(bulk.key_count(), seq.key_count());
        for k in 0..13 {
            let key = Value::integer(k);
            assert_eq!(
                bulk.query_equal(1, &key).records(),
                seq.query_equal(1, &key).records()
            );
        }
        assert_eq!(
            bulk.check_input_data(&row![100, 3]),
            CheckResult::Success
        );
        assert_eq!(
            bulk.check_input_data(&row![1, 7]),
            CheckResult::DuplicatedDataTuple
        );
    }

    #[test]
    fn test_duplicate_by_index() {
        let mut t = scores();
        load(&mut t);
        assert_eq!(
            t.check_input_data(&row![3, 30]),
            CheckResult::DuplicatedDataTuple
        );
        assert_eq!(
            t.check_input_data(&row![3, 31]),
            CheckResult::DuplicatedPrimaryKey
        );
        assert_eq!(
            t.check_input_data(&row![None::<i64>, None::<i64>]),
            CheckResult::NullPrimaryKey
        );
    }
}

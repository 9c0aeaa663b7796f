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

//! Table storage backends
//!
//! - [`SetTable`] - whole-row hashing, no column index
//! - [`HashTable`] - hash index on one column
//! - [`BPlusTreeTable`] - B+Tree index on one column
//! - [`MultiIndexTable`] - one single-key backend per indexed column
//! - [`ArrayListTable`] - unchecked list holding query results
//!
//! Base tables keep their state behind `Arc<RwLock<..>>` so that aliases
//! created by [`Table::generate_alias`](crate::storage::Table::generate_alias)
//! read the same rows without copying them. Only the base table writes.

pub mod array_list_table;
pub mod bplus_tree_table;
pub mod hash_table;
pub mod multi_index_table;
pub mod set_table;

pub use array_list_table::ArrayListTable;
pub use bplus_tree_table::BPlusTreeTable;
pub use hash_table::HashTable;
pub use multi_index_table::MultiIndexTable;
pub use set_table::SetTable;

use std::path::Path;

use crate::core::{CheckResult, Result, Row, RowRef, Schema, Value};
use crate::storage::config::IndexConfig;
use crate::storage::traits::{Table, TableKind};

/// Restore a table file into the backend recorded for it
pub fn restore_table(path: &Path, kind: TableKind, config: IndexConfig) -> Result<Box<dyn Table>> {
    Ok(match kind {
        TableKind::Set => Box::new(SetTable::restore_from_disk(path)?),
        TableKind::Hash => Box::new(HashTable::restore_from_disk(path)?),
        TableKind::BPlusTree => Box::new(BPlusTreeTable::restore_from_disk(path, config)?),
        TableKind::MultiIndex => Box::new(MultiIndexTable::restore_from_disk(path, config)?),
        TableKind::ArrayList => Box::new(ArrayListTable::restore_from_disk(path)?),
    })
}

/// Primary key checks shared by every checking backend: NULL first, then
/// uniqueness against `exists`
pub(crate) fn check_primary_key(
    schema: &Schema,
    row: &Row,
    exists: impl Fn(&Value) -> bool,
) -> CheckResult {
    match schema.primary_key.and_then(|pk| row.get(pk)) {
        Some(value) if value.is_null() => CheckResult::NullPrimaryKey,
        Some(value) if exists(value) => CheckResult::DuplicatedPrimaryKey,
        _ => CheckResult::Success,
    }
}

/// Check for single-key backends. `bucket` holds the rows stored under the
/// row's key; a NULL key skips the identical-row check.
pub(crate) fn check_keyed(
    schema: &Schema,
    key_column: usize,
    row: &Row,
    bucket: Option<&[RowRef]>,
    pk_exists: impl Fn(&Value) -> bool,
) -> CheckResult {
    let key_is_null = row.get(key_column).map_or(true, Value::is_null);
    if !key_is_null {
        if let Some(bucket) = bucket {
            if bucket.iter().any(|stored| **stored == *row) {
                return CheckResult::DuplicatedDataTuple;
            }
        }
    }
    check_primary_key(schema, row, pk_exists)
}

/// Key column used when none is given: the primary key, else column 0
pub(crate) fn default_key_column(schema: &Schema, key_column: Option<usize>) -> usize {
    key_column.or(schema.primary_key).unwrap_or(0)
}

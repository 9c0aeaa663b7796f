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

//! Shared utility functions for the executor module.
//!
//! - Output schema and provenance of a join
//! - Column mappings between schemas that hold the same qualified columns
//! - Row projection along such a mapping

use std::sync::Arc;

use crate::core::{Error, Result, RowRef, Schema, RESULT_TABLE_NAME};
use crate::storage::traits::SourceSet;

/// Schema of a join output: both sides' columns, qualified with their
/// table names
pub fn joined_schema(left: &Schema, right: &Schema) -> Schema {
    let mut columns = left.qualified_columns();
    columns.extend(right.qualified_columns());
    Schema::new(RESULT_TABLE_NAME, columns)
}

/// Provenance of a table derived from both inputs
pub fn joined_sources(left: &SourceSet, right: &SourceSet) -> SourceSet {
    left.union(right).cloned().collect()
}

/// For each column of `onto`, its position in `from`, matched by
/// qualified name
pub fn column_mapping(onto: &Schema, from: &Schema) -> Result<Vec<usize>> {
    onto.qualified_names()
        .iter()
        .map(|name| {
            from.position_of_qualified(name)
                .ok_or_else(|| Error::ColumnNotFound(name.clone()))
        })
        .collect()
}

/// Returns true if the mapping keeps every column in place
#[inline]
pub fn is_identity(mapping: &[usize]) -> bool {
    mapping.iter().enumerate().all(|(i, &c)| i == c)
}

/// Reorder a row along `mapping`, sharing it when nothing moves
pub fn project(row: &RowRef, mapping: &[usize]) -> Result<RowRef> {
    if is_identity(mapping) && row.len() == mapping.len() {
        return Ok(Arc::clone(row));
    }
    Ok(Arc::new(row.select_columns(mapping)?))
}

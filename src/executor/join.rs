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

//! Join execution
//!
//! A join on `left.a <op> right.b` walks the left table sorted by `a`. Each
//! distinct left key is looked up once on the right side through the right
//! table's own query path (index seek or scan), and the match list is reused
//! for every following left row with the same key. Without a condition the
//! join is a Cartesian product.
//!
//! Output tables are named [`RESULT_TABLE_NAME`] with `table.attribute`
//! columns, and carry the union of both inputs' provenance.

use std::sync::Arc;

use tracing::debug;

use crate::core::{Operator, RowRef, Value, RESULT_TABLE_NAME};
use crate::storage::backend::ArrayListTable;
use crate::storage::traits::Table;

use super::utils::{joined_schema, joined_sources};

/// Column comparison a join matches on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JoinOn {
    /// Column of the left table
    pub left_column: usize,
    /// `left <op> right` must hold
    pub op: Operator,
    /// Column of the right table
    pub right_column: usize,
}

impl JoinOn {
    pub fn new(left_column: usize, op: Operator, right_column: usize) -> Self {
        Self {
            left_column,
            op,
            right_column,
        }
    }
}

/// Join two tables
pub fn join(left: &dyn Table, right: &dyn Table, on: Option<JoinOn>) -> ArrayListTable {
    let schema = joined_schema(left.schema(), right.schema());
    let sources = joined_sources(left.sources(), right.sources());
    let rows = match on {
        Some(on) => sort_merge(left, right, on),
        None => cartesian(left, right),
    };
    ArrayListTable::with_rows(RESULT_TABLE_NAME, schema, sources, rows)
}

fn cartesian(left: &dyn Table, right: &dyn Table) -> Vec<RowRef> {
    let right_rows = right.records();
    let left_rows = left.records();
    let mut rows = Vec::with_capacity(left_rows.len() * right_rows.len());
    for l in &left_rows {
        for r in &right_rows {
            rows.push(Arc::new(l.concat(r)));
        }
    }
    rows
}

fn sort_merge(left: &dyn Table, right: &dyn Table, on: JoinOn) -> Vec<RowRef> {
    // right.b <probe> key  <=>  key <op> right.b
    let probe = on.op.flip();
    let mut rows = Vec::new();
    let mut memo: Option<(Value, Vec<RowRef>)> = None;
    let mut memo_hits = 0usize;

    for l in left.sorted_records(on.left_column) {
        let key = l.get(on.left_column).cloned().unwrap_or_default();
        match &memo {
            Some((previous, _)) if *previous == key => memo_hits += 1,
            _ => {
                let matches = right.query(on.right_column, probe, &key).into_rows();
                memo = Some((key, matches));
            }
        }
        if let Some((_, matches)) = &memo {
            for r in matches {
                rows.push(Arc::new(l.concat(r)));
            }
        }
    }

    debug!(
        left = %left.name(),
        right = %right.name(),
        rows = rows.len(),
        memo_hits,
        "sort-merge join"
    );
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{DataType, Row, SchemaBuilder};
    use crate::row;
    use crate::storage::backend::HashTable;
    use crate::storage::traits::source_of;

    fn left() -> ArrayListTable {
        let schema = SchemaBuilder::new("l")
            .add("k", DataType::Integer)
            .add("v", DataType::Varchar(4))
            .build();
        let mut t = ArrayListTable::new("l", schema);
        for row in [row![2, "b"], row![1, "a"], row![2, "c"], row![None::<i64>, "n"]] {
            t.insert(row);
        }
        t
    }

    fn right() -> HashTable {
        let schema = SchemaBuilder::new("r")
            .add("k", DataType::Integer)
            .add("w", DataType::Integer)
            .build();
        let mut t = HashTable::new("r", schema, Some(0));
        for row in [row![1, 10], row![2, 20], row![3, 30], row![None::<i64>, 0]] {
            t.insert(row);
        }
        t
    }

    fn rows(table: &ArrayListTable) -> Vec<Row> {
        table.records().iter().map(|r| (**r).clone()).collect()
    }

    #[test]
    fn test_equi_join() {
        let result = join(&left(), &right(), Some(JoinOn::new(0, Operator::Eq, 0)));
        assert_eq!(result.name(), RESULT_TABLE_NAME);
        assert_eq!(result.schema().column_names(), vec!["l.k", "l.v", "r.k", "r.w"]);
        assert_eq!(
            result.sources().iter().cloned().collect::<Vec<_>>(),
            vec!["l".to_string(), "r".to_string()]
        );
        // Left rows come out ordered by the join key, NULL first and matching NULL
        assert_eq!(
            rows(&result),
            vec![
                row![None::<i64>, "n", None::<i64>, 0],
                row![1, "a", 1, 10],
                row![2, "b", 2, 20],
                row![2, "c", 2, 20],
            ]
        );
    }

    #[test]
    fn test_theta_join() {
        let result = join(&left(), &right(), Some(JoinOn::new(0, Operator::Lt, 0)));
        // 1 < {2, 3}, 2 < {3} twice
        assert_eq!(
            rows(&result),
            vec![
                row![1, "a", 2, 20],
                row![1, "a", 3, 30],
                row![2, "b", 3, 30],
                row![2, "c", 3, 30],
            ]
        );
    }

    #[test]
    fn test_cartesian() {
        let l = left();
        let r = right();
        let result = join(&l, &r, None);
        assert_eq!(result.len(), 16);
        assert_eq!(result.sources(), &joined_sources(&source_of("l"), &source_of("r")));
    }

    #[test]
    fn test_join_with_empty_side() {
        let schema = SchemaBuilder::new("e").add("k", DataType::Integer).build();
        let empty = ArrayListTable::new("e", schema);
        assert!(join(&left(), &empty, Some(JoinOn::new(0, Operator::Eq, 0))).is_empty());
        assert!(join(&empty, &right(), None).is_empty());
    }
}

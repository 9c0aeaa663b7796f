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

//! Set operations over intermediate results
//!
//! Two results can only be combined once they are derived from the same
//! FROM tables. The side missing a table is first joined with it as a
//! product, then rows are matched by value with columns aligned by
//! qualified name.

use rustc_hash::FxHashSet;
use tracing::debug;

use crate::core::{Error, Result, RowRef};
use crate::storage::backend::ArrayListTable;
use crate::storage::traits::Table;

use super::join::join;
use super::utils::{column_mapping, joined_sources, project};
use super::Executor;

impl<'a> Executor<'a> {
    /// Rows in either result (`OR`)
    pub fn union(&self, left: ArrayListTable, right: ArrayListTable) -> Result<ArrayListTable> {
        let (left, right) = self.align(left, right)?;
        let mapping = column_mapping(left.schema(), right.schema())?;
        let sources = joined_sources(left.sources(), right.sources());
        let name = left.name().to_string();
        let schema = left.schema().clone();

        let mut rows = Vec::new();
        let mut seen: FxHashSet<RowRef> = FxHashSet::default();
        for row in left.into_rows() {
            if seen.insert(RowRef::clone(&row)) {
                rows.push(row);
            }
        }
        for row in right.into_rows() {
            let row = project(&row, &mapping)?;
            if seen.insert(RowRef::clone(&row)) {
                rows.push(row);
            }
        }
        debug!(table = %name, rows = rows.len(), "union");
        Ok(ArrayListTable::with_rows(name, schema, sources, rows))
    }

    /// Rows in both results (`AND`)
    pub fn intersect(&self, left: ArrayListTable, right: ArrayListTable) -> Result<ArrayListTable> {
        let (left, right) = self.align(left, right)?;
        let mapping = column_mapping(left.schema(), right.schema())?;
        let sources = joined_sources(left.sources(), right.sources());

        let build: FxHashSet<RowRef> = right
            .records()
            .iter()
            .map(|row| project(row, &mapping))
            .collect::<Result<_>>()?;

        let mut seen: FxHashSet<RowRef> = FxHashSet::default();
        let rows: Vec<RowRef> = left
            .records()
            .into_iter()
            .filter(|row| build.contains(row) && seen.insert(RowRef::clone(row)))
            .collect();
        debug!(table = %left.name(), rows = rows.len(), "intersect");
        Ok(ArrayListTable::with_rows(
            left.name(),
            left.schema().clone(),
            sources,
            rows,
        ))
    }

    /// Union of every result in order
    pub fn union_all(&self, results: Vec<ArrayListTable>) -> Result<ArrayListTable> {
        let mut results = results.into_iter();
        let first = results
            .next()
            .ok_or_else(|| Error::invalid_argument("union of no results"))?;
        results.try_fold(first, |acc, next| self.union(acc, next))
    }

    /// Intersection of every result in order
    pub fn intersect_all(&self, results: Vec<ArrayListTable>) -> Result<ArrayListTable> {
        let mut results = results.into_iter();
        let first = results
            .next()
            .ok_or_else(|| Error::invalid_argument("intersection of no results"))?;
        results.try_fold(first, |acc, next| self.intersect(acc, next))
    }

    /// Bring both results to the same provenance
    fn align(
        &self,
        left: ArrayListTable,
        right: ArrayListTable,
    ) -> Result<(ArrayListTable, ArrayListTable)> {
        if left.sources() == right.sources() {
            return Ok((left, right));
        }
        let left_missing: Vec<String> = right.sources().difference(left.sources()).cloned().collect();
        let right_missing: Vec<String> = left.sources().difference(right.sources()).cloned().collect();
        Ok((
            self.extend(left, &left_missing)?,
            self.extend(right, &right_missing)?,
        ))
    }

    fn extend(&self, mut result: ArrayListTable, missing: &[String]) -> Result<ArrayListTable> {
        for name in missing {
            let table = self.ctx.table(name)?;
            debug!(table = %result.name(), with = %name, "product for provenance");
            result = join(&result, table, None);
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{DataType, Operator, Row, SchemaBuilder, Value};
    use crate::executor::{Condition, Operand, QueryContext};
    use crate::row;
    use crate::storage::backend::{HashTable, SetTable};

    fn context() -> QueryContext {
        let a = SchemaBuilder::new("a")
            .add_primary_key("x", DataType::Integer)
            .add("y", DataType::Integer)
            .build();
        let mut a = HashTable::new("a", a, None);
        for r in [row![1, 10], row![2, 20], row![3, 30]] {
            a.insert(r);
        }
        let b = SchemaBuilder::new("b").add("z", DataType::Integer).build();
        let mut b = SetTable::new("b", b);
        for r in [row![1], row![2]] {
            b.insert(r);
        }
        QueryContext::with_tables(vec![Box::new(a), Box::new(b)]).unwrap()
    }

    fn on(table: &str, column: &str, op: Operator, value: i64) -> Condition {
        Condition::compare(Operand::attr(table, column), op, Operand::constant(value))
    }

    #[test]
    fn test_union_and_intersect_same_table() {
        let ctx = context();
        let exec = Executor::new(&ctx);
        let low = exec.query(&on("a", "x", Operator::Lte, 2)).unwrap();
        let high = exec.query(&on("a", "x", Operator::Gte, 2)).unwrap();

        let both = exec.intersect(low.clone(), high.clone()).unwrap();
        assert_eq!(both.len(), 1);
        assert_eq!(both.records()[0][0], Value::integer(2));
        assert_eq!(both.name(), "a");

        let either = exec.union(low, high).unwrap();
        assert_eq!(either.len(), 3);
    }

    #[test]
    fn test_union_dedupes_both_sides() {
        // Keyed on k with no primary key, so identical rows can coexist
        let schema = SchemaBuilder::new("a")
            .add("k", DataType::Integer)
            .add("v", DataType::Integer)
            .build();
        let mut a = HashTable::new("a", schema, Some(0));
        a.insert(Row::from_values(vec![Value::Null, Value::integer(1)]));
        a.insert(Row::from_values(vec![Value::Null, Value::integer(1)]));
        let ctx = QueryContext::with_tables(vec![Box::new(a)]).unwrap();
        let exec = Executor::new(&ctx);

        let c = on("a", "v", Operator::Eq, 1);
        let or = exec
            .evaluate(&[c.clone(), c.clone(), Condition::Or])
            .unwrap();
        let and = exec.evaluate(&[c.clone(), c, Condition::And]).unwrap();
        assert_eq!(or.len(), 1);
        assert_eq!(and.len(), 1);
    }

    #[test]
    fn test_mixed_provenance() {
        let ctx = context();
        let exec = Executor::new(&ctx);
        // {a} OR {a, b}: the left side gains a product with b first
        let left = exec.query(&on("a", "x", Operator::Eq, 1)).unwrap();
        let right = exec
            .query(&Condition::compare(
                Operand::attr("a", "x"),
                Operator::Eq,
                Operand::attr("b", "z"),
            ))
            .unwrap();
        assert_eq!(right.len(), 2);

        let either = exec.union(left.clone(), right.clone()).unwrap();
        // (1,1) (1,2) from the left, (2,2) from the right
        assert_eq!(either.len(), 3);
        assert_eq!(either.sources().len(), 2);

        let both = exec.intersect(left, right).unwrap();
        assert_eq!(both.len(), 1);
        assert_eq!(both.records()[0].len(), 3);
    }

    #[test]
    fn test_fold_helpers() {
        let ctx = context();
        let exec = Executor::new(&ctx);
        assert!(exec.union_all(Vec::new()).is_err());
        let parts = vec![
            exec.query(&on("a", "x", Operator::Eq, 1)).unwrap(),
            exec.query(&on("a", "x", Operator::Eq, 3)).unwrap(),
            exec.query(&on("a", "y", Operator::Gt, 0)).unwrap(),
        ];
        assert_eq!(exec.union_all(parts.clone()).unwrap().len(), 3);
        assert!(exec.intersect_all(parts).unwrap().is_empty());
    }
}

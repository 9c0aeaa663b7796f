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

//! Predicate evaluation
//!
//! Every comparison becomes one backend query:
//! - attribute vs constant dispatches to the owning table's `query_*`
//!   method (a constant on the left flips the operator)
//! - attribute vs attribute filters one table row by row, or joins two
//! - constant vs constant selects every row or none
//!
//! `AND` / `OR` intersect / union the two most recent results. Whatever FROM
//! tables the final result does not cover yet are joined in as a product.

use tracing::debug;

use crate::core::{Error, Operator, Result, Value};
use crate::storage::backend::ArrayListTable;
use crate::storage::traits::Table;

use super::condition::{Condition, Operand};
use super::join::{join, JoinOn};
use super::Executor;

impl<'a> Executor<'a> {
    /// Evaluate a postfix condition list into the rows of every FROM table
    /// that satisfy it
    pub fn evaluate(&self, conditions: &[Condition]) -> Result<ArrayListTable> {
        let mut stack: Vec<ArrayListTable> = Vec::new();
        for condition in conditions {
            match condition {
                Condition::And | Condition::Or => {
                    let (Some(right), Some(left)) = (stack.pop(), stack.pop()) else {
                        return Err(Error::malformed_condition(format!(
                            "{} needs two operands",
                            condition
                        )));
                    };
                    let combined = if *condition == Condition::And {
                        self.intersect(left, right)?
                    } else {
                        self.union(left, right)?
                    };
                    stack.push(combined);
                }
                Condition::Compare { .. } => stack.push(self.query(condition)?),
            }
        }

        if stack.len() > 1 {
            return Err(Error::malformed_condition(format!(
                "{} results left without a connective",
                stack.len()
            )));
        }
        let result = match stack.pop() {
            Some(result) => result,
            None => {
                let first = self.first_table()?;
                first.result(first.records())
            }
        };
        Ok(self.complete(result))
    }

    /// Evaluate a single comparison
    pub fn query(&self, condition: &Condition) -> Result<ArrayListTable> {
        let Condition::Compare { left, op, right } = condition else {
            return Err(Error::malformed_condition(format!(
                "{} is not a comparison",
                condition
            )));
        };

        match (left, right) {
            (Operand::Constant(a), Operand::Constant(b)) => {
                check_constants(a, b)?;
                let first = self.first_table()?;
                let rows = if op.evaluate(a, b) {
                    first.records()
                } else {
                    Vec::new()
                };
                Ok(first.result(rows))
            }
            (Operand::Attribute { table, name }, Operand::Constant(value)) => {
                self.select(table.as_deref(), name, *op, value)
            }
            (Operand::Constant(value), Operand::Attribute { table, name }) => {
                self.select(table.as_deref(), name, op.flip(), value)
            }
            (
                Operand::Attribute {
                    table: left_table,
                    name: left_name,
                },
                Operand::Attribute {
                    table: right_table,
                    name: right_name,
                },
            ) => {
                let (lt, lc) = self.ctx.resolve(left_table.as_deref(), left_name)?;
                let (rt, rc) = self.ctx.resolve(right_table.as_deref(), right_name)?;
                check_columns(lt, lc, rt, rc)?;

                if lt.name() == rt.name() {
                    let op = *op;
                    debug!(table = %lt.name(), %op, "column comparison scan");
                    Ok(lt.scan(&|row| match (row.get(lc), row.get(rc)) {
                        (Some(a), Some(b)) => op.evaluate(a, b),
                        _ => false,
                    }))
                } else {
                    Ok(join(lt, rt, Some(JoinOn::new(lc, *op, rc))))
                }
            }
        }
    }

    /// `table.name <op> value` on one FROM table
    fn select(
        &self,
        table: Option<&str>,
        name: &str,
        op: Operator,
        value: &Value,
    ) -> Result<ArrayListTable> {
        let (t, column) = self.ctx.resolve(table, name)?;
        let col = t
            .schema()
            .column(column)
            .ok_or(Error::ColumnIndexOutOfBounds { index: column })?;
        if !col.data_type.accepts(value) {
            return Err(Error::type_mismatch(
                format!("{}.{} ({})", t.name(), col.name, col.data_type),
                value.type_name(),
            ));
        }

        let indexed = t.key_column() == Some(column)
            || t.index_declarations().iter().any(|d| d.column == column);
        debug!(
            table = %t.name(),
            column = %col.name,
            %op,
            access = if indexed { "index" } else { "scan" },
            "predicate"
        );
        Ok(t.query(column, op, value))
    }

    fn first_table(&self) -> Result<&dyn Table> {
        self.ctx
            .tables()
            .next()
            .ok_or_else(|| Error::invalid_argument("query reads no table"))
    }

    /// Join in, as a product, every FROM table `result` is not derived from
    pub(crate) fn complete(&self, mut result: ArrayListTable) -> ArrayListTable {
        for table in self.ctx.tables() {
            if !result.sources().contains(table.name()) {
                result = join(&result, table, None);
            }
        }
        result
    }
}

fn check_constants(a: &Value, b: &Value) -> Result<()> {
    match (a.data_type(), b.data_type()) {
        (Some(x), Some(y)) if x.is_integer() != y.is_integer() => {
            Err(Error::type_mismatch(a.type_name(), b.type_name()))
        }
        _ => Ok(()),
    }
}

fn check_columns(lt: &dyn Table, lc: usize, rt: &dyn Table, rc: usize) -> Result<()> {
    let (Some(l), Some(r)) = (lt.schema().column(lc), rt.schema().column(rc)) else {
        return Err(Error::internal("resolved column out of range"));
    };
    if l.data_type.is_integer() != r.data_type.is_integer() {
        return Err(Error::type_mismatch(
            format!("{}.{} ({})", lt.name(), l.name, l.data_type),
            format!("{}.{} ({})", rt.name(), r.name, r.data_type),
        ));
    }
    Ok(())
}

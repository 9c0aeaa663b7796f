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

//! Conditions consumed by the executor
//!
//! The parser hands over a condition list in postfix order: comparisons are
//! operands, `AND` / `OR` combine the two most recent results.

use std::fmt;

use crate::core::{Operator, Value};

/// One side of a comparison
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    /// A literal value
    Constant(Value),
    /// A column reference, optionally qualified by a FROM table name
    Attribute {
        table: Option<String>,
        name: String,
    },
}

impl Operand {
    /// A literal operand
    pub fn constant(value: impl Into<Value>) -> Self {
        Operand::Constant(value.into())
    }

    /// A `table.attribute` reference
    pub fn attr(table: impl Into<String>, name: impl Into<String>) -> Self {
        Operand::Attribute {
            table: Some(table.into()),
            name: name.into(),
        }
    }

    /// An unqualified attribute reference
    pub fn column(name: impl Into<String>) -> Self {
        Operand::Attribute {
            table: None,
            name: name.into(),
        }
    }

    /// Returns true for column references
    pub fn is_attribute(&self) -> bool {
        matches!(self, Operand::Attribute { .. })
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Constant(Value::Text(s)) => write!(f, "'{}'", s),
            Operand::Constant(v) => write!(f, "{}", v),
            Operand::Attribute {
                table: Some(t),
                name,
            } => write!(f, "{}.{}", t, name),
            Operand::Attribute { table: None, name } => write!(f, "{}", name),
        }
    }
}

/// An element of a postfix condition list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// `left <op> right`
    Compare {
        left: Operand,
        op: Operator,
        right: Operand,
    },
    /// Intersect the two topmost results
    And,
    /// Union the two topmost results
    Or,
}

/// Shape of a comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionForm {
    ConstConst,
    ConstAttr,
    AttrConst,
    AttrAttr,
}

impl Condition {
    /// Build a comparison
    pub fn compare(left: Operand, op: Operator, right: Operand) -> Self {
        Condition::Compare { left, op, right }
    }

    /// Returns true for `AND` / `OR`
    pub fn is_connective(&self) -> bool {
        matches!(self, Condition::And | Condition::Or)
    }

    /// Shape of a comparison, `None` for connectives
    pub fn form(&self) -> Option<ConditionForm> {
        match self {
            Condition::Compare { left, right, .. } => Some(
                match (left.is_attribute(), right.is_attribute()) {
                    (false, false) => ConditionForm::ConstConst,
                    (false, true) => ConditionForm::ConstAttr,
                    (true, false) => ConditionForm::AttrConst,
                    (true, true) => ConditionForm::AttrAttr,
                },
            ),
            Condition::And | Condition::Or => None,
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Compare { left, op, right } => write!(f, "{} {} {}", left, op, right),
            Condition::And => write!(f, "AND"),
            Condition::Or => write!(f, "OR"),
        }
    }
}

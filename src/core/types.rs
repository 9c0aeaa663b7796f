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

//! Core type definitions for arbordb
//!
//! This module defines the fundamental types: DataType, Operator, IndexType,
//! IndexDeclaration and CheckResult

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use super::error::Error;
use super::value::Value;

/// Column data types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    /// 64-bit signed integer
    Integer,

    /// UTF-8 string bounded to the given number of characters
    Varchar(usize),
}

impl DataType {
    /// Returns true for INT columns
    pub fn is_integer(&self) -> bool {
        matches!(self, DataType::Integer)
    }

    /// Returns the VARCHAR bound, if any
    pub fn varchar_limit(&self) -> Option<usize> {
        match self {
            DataType::Varchar(n) => Some(*n),
            DataType::Integer => None,
        }
    }

    /// Encode for the on-disk attribute line: the VARCHAR bound, or -1 for INT
    pub fn to_disk_code(&self) -> i64 {
        match self {
            DataType::Integer => -1,
            DataType::Varchar(n) => *n as i64,
        }
    }

    /// Decode an on-disk attribute code
    pub fn from_disk_code(code: i64) -> Self {
        if code < 0 {
            DataType::Integer
        } else {
            DataType::Varchar(code as usize)
        }
    }

    /// Returns true if a value may be stored in a column of this type
    /// (NULL fits every column)
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (_, Value::Null) => true,
            (DataType::Integer, Value::Integer(_)) => true,
            (DataType::Varchar(_), Value::Text(_)) => true,
            _ => false,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Integer => write!(f, "INT"),
            DataType::Varchar(n) => write!(f, "VARCHAR({})", n),
        }
    }
}

impl FromStr for DataType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_uppercase();
        match upper.as_str() {
            "INT" | "INTEGER" => Ok(DataType::Integer),
            _ => {
                let limit = upper
                    .strip_prefix("VARCHAR(")
                    .and_then(|rest| rest.strip_suffix(')'))
                    .ok_or_else(|| Error::invalid_argument(format!("unknown type {}", s)))?;
                let limit = limit
                    .trim()
                    .parse::<usize>()
                    .map_err(|_| Error::invalid_argument(format!("bad VARCHAR bound in {}", s)))?;
                Ok(DataType::Varchar(limit))
            }
        }
    }
}

/// Comparison operators for conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Operator {
    /// Equality (=)
    Eq = 0,

    /// Inequality (!=)
    Ne = 1,

    /// Greater than (>)
    Gt = 2,

    /// Greater than or equal (>=)
    Gte = 3,

    /// Less than (<)
    Lt = 4,

    /// Less than or equal (<=)
    Lte = 5,
}

impl Operator {
    /// Returns the operator obtained by swapping the operands
    /// (`a < b` is `b > a`)
    pub fn flip(&self) -> Self {
        match self {
            Operator::Eq => Operator::Eq,
            Operator::Ne => Operator::Ne,
            Operator::Gt => Operator::Lt,
            Operator::Gte => Operator::Lte,
            Operator::Lt => Operator::Gt,
            Operator::Lte => Operator::Gte,
        }
    }

    /// Evaluate `left <op> right`.
    ///
    /// NULL handling: `NULL = NULL` holds (so do `<=` and `>=`), a NULL never
    /// orders against a non-NULL value, and `!=` is always the negation of `=`.
    pub fn evaluate(&self, left: &Value, right: &Value) -> bool {
        // None: the two sides do not order against each other
        let ordering = match (left.is_null(), right.is_null()) {
            (true, true) => Some(Ordering::Equal),
            (false, false) => left.compare(right).ok(),
            _ => None,
        };
        match self {
            Operator::Eq => ordering == Some(Ordering::Equal),
            Operator::Ne => ordering != Some(Ordering::Equal),
            Operator::Gt => ordering == Some(Ordering::Greater),
            Operator::Gte => matches!(ordering, Some(Ordering::Greater | Ordering::Equal)),
            Operator::Lt => ordering == Some(Ordering::Less),
            Operator::Lte => matches!(ordering, Some(Ordering::Less | Ordering::Equal)),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operator::Eq => write!(f, "="),
            Operator::Ne => write!(f, "!="),
            Operator::Gt => write!(f, ">"),
            Operator::Gte => write!(f, ">="),
            Operator::Lt => write!(f, "<"),
            Operator::Lte => write!(f, "<="),
        }
    }
}

impl FromStr for Operator {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "=" | "==" => Ok(Operator::Eq),
            "!=" | "<>" => Ok(Operator::Ne),
            ">" => Ok(Operator::Gt),
            ">=" => Ok(Operator::Gte),
            "<" => Ok(Operator::Lt),
            "<=" => Ok(Operator::Lte),
            _ => Err(Error::invalid_argument(format!("unknown operator {}", s))),
        }
    }
}

/// Index kinds a column may declare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum IndexType {
    /// No index on the column
    #[default]
    None,

    /// Unordered hash index (equality only)
    Hash,

    /// Ordered B+Tree index (equality and ranges)
    BPlusTree,
}

impl IndexType {
    /// Returns the name used in table files
    pub fn as_str(&self) -> &'static str {
        match self {
            IndexType::None => "NONE",
            IndexType::Hash => "HASH",
            IndexType::BPlusTree => "BPLUSTREE",
        }
    }
}

impl fmt::Display for IndexType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IndexType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "NONE" => Ok(IndexType::None),
            "HASH" => Ok(IndexType::Hash),
            "BPLUSTREE" | "BTREE" => Ok(IndexType::BPlusTree),
            other => Err(Error::parse(format!("unknown index type {}", other))),
        }
    }
}

/// A `{column, index type}` declaration attached to a table definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IndexDeclaration {
    /// Column position in the schema
    pub column: usize,
    /// Requested index kind
    pub index_type: IndexType,
}

impl IndexDeclaration {
    pub fn new(column: usize, index_type: IndexType) -> Self {
        Self { column, index_type }
    }
}

/// Outcome of validating a row against a table before insertion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CheckResult {
    /// The row may be inserted
    Success,
    /// An identical row is already stored
    DuplicatedDataTuple,
    /// Another row already carries this primary key value
    DuplicatedPrimaryKey,
    /// The primary key column is NULL
    NullPrimaryKey,
}

impl CheckResult {
    /// Returns true for [`CheckResult::Success`]
    pub fn is_success(&self) -> bool {
        matches!(self, CheckResult::Success)
    }
}

impl fmt::Display for CheckResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckResult::Success => write!(f, "SUCCESS"),
            CheckResult::DuplicatedDataTuple => write!(f, "DUPLICATED_DATA_TUPLE"),
            CheckResult::DuplicatedPrimaryKey => write!(f, "DUPLICATED_PRIMARY_KEY"),
            CheckResult::NullPrimaryKey => write!(f, "NULL_PRIMARY_KEY"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_type_parse() {
        assert_eq!("int".parse::<DataType>().unwrap(), DataType::Integer);
        assert_eq!(
            "VARCHAR(20)".parse::<DataType>().unwrap(),
            DataType::Varchar(20)
        );
        assert!("VARCHAR(x)".parse::<DataType>().is_err());
        assert!("FLOAT".parse::<DataType>().is_err());
    }

    #[test]
    fn test_data_type_disk_code() {
        assert_eq!(DataType::Integer.to_disk_code(), -1);
        assert_eq!(DataType::Varchar(12).to_disk_code(), 12);
        assert_eq!(DataType::from_disk_code(-1), DataType::Integer);
        assert_eq!(DataType::from_disk_code(0), DataType::Varchar(0));
    }

    #[test]
    fn test_operator_flip() {
        assert_eq!(Operator::Lt.flip(), Operator::Gt);
        assert_eq!(Operator::Gte.flip(), Operator::Lte);
        assert_eq!(Operator::Eq.flip(), Operator::Eq);
        assert_eq!(Operator::Ne.flip(), Operator::Ne);
    }

    #[test]
    fn test_not_equal_is_negated_equal() {
        let values = [
            Value::Null,
            Value::integer(1),
            Value::integer(2),
            Value::text("a"),
        ];
        for a in &values {
            for b in &values {
                assert_eq!(
                    Operator::Ne.evaluate(a, b),
                    !Operator::Eq.evaluate(a, b),
                    "{} vs {}",
                    a,
                    b
                );
            }
        }
        // Incomparable kinds never order, but are unequal
        assert!(!Operator::Lt.evaluate(&Value::integer(1), &Value::text("a")));
        assert!(Operator::Ne.evaluate(&Value::integer(1), &Value::text("a")));
    }

    #[test]
    fn test_operator_evaluate() {
        let one = Value::integer(1);
        let two = Value::integer(2);
        assert!(Operator::Lt.evaluate(&one, &two));
        assert!(Operator::Lte.evaluate(&one, &one));
        assert!(!Operator::Gt.evaluate(&one, &two));
        assert!(Operator::Ne.evaluate(&one, &two));
        assert!(Operator::Eq.evaluate(&Value::text("a"), &Value::text("a")));
    }

    #[test]
    fn test_operator_null_rules() {
        let null = Value::Null;
        let one = Value::integer(1);
        assert!(Operator::Eq.evaluate(&null, &null));
        assert!(Operator::Lte.evaluate(&null, &null));
        assert!(!Operator::Lt.evaluate(&null, &null));
        assert!(!Operator::Eq.evaluate(&null, &one));
        assert!(!Operator::Lt.evaluate(&null, &one));
        assert!(!Operator::Gte.evaluate(&one, &null));
        assert!(Operator::Ne.evaluate(&null, &one));
        assert!(!Operator::Ne.evaluate(&null, &null));
    }

    #[test]
    fn test_index_type_names() {
        for ty in [IndexType::None, IndexType::Hash, IndexType::BPlusTree] {
            assert_eq!(ty.as_str().parse::<IndexType>().unwrap(), ty);
        }
    }
}

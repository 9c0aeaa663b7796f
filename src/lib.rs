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

//! # arbordb - Embedded relational storage and query engine
//!
//! arbordb keeps relational tables in memory behind interchangeable storage
//! backends and evaluates SQL-style WHERE clauses over them.
//!
//! ## Key Features
//!
//! - **Arena B+Tree** - Ordered index with bulk loading and lazy range scans
//! - **Five Backends** - Set, hash, B+Tree, multi-index and plain result tables
//! - **Index-aware Predicates** - Each backend answers the comparisons it can
//!   accelerate and scans for the rest
//! - **Sort-merge Joins** - Memoized per distinct join key
//! - **Set Operations** - AND / OR as intersect / union with provenance alignment
//! - **Persistence** - Plain-text table files and a catalog manifest
//!
//! ## Quick Start
//!
//! ```rust
//! use arbordb::{row, Condition, Database, DataType, Operand, Operator, Projection, SchemaBuilder, TableRef};
//!
//! let mut db = Database::open_in_memory();
//! let schema = SchemaBuilder::new("users")
//!     .add_primary_key("id", DataType::Integer)
//!     .add("name", DataType::Varchar(16))
//!     .build();
//! db.create_table(schema, &[], None).unwrap();
//! db.insert("users", row![1, "Alice"]).unwrap();
//! db.insert("users", row![2, "Bob"]).unwrap();
//!
//! let bob = Condition::compare(Operand::column("name"), Operator::Eq, Operand::constant("Bob"));
//! let rs = db
//!     .select(&[TableRef::new("users")], &[bob], &[Projection::column("users", "id")])
//!     .unwrap();
//! assert_eq!(rs.rows, vec![row![2]]);
//! ```
//!
//! ## Modules
//!
//! - [`api`] - Catalog ([`api::Database`]) and parsed statements
//! - [`core`] - Core types ([`DataType`], [`Value`], [`Row`], [`Schema`], [`Error`])
//! - [`storage`] - B+Tree index, table backends and persistence
//! - [`executor`] - Condition evaluation, joins and set operations

pub mod api;
pub mod core;
pub mod executor;
pub mod storage;

// Re-export main types for convenience
pub use core::{
    CheckResult, DataType, Error, IndexDeclaration, IndexType, Operator, Result, Row, RowRef,
    Schema, SchemaBuilder, SchemaColumn, Value,
};

// Re-export index types
pub use storage::BPlusTree;

// Re-export config types
pub use storage::{Config, IndexConfig};

// Re-export storage types
pub use storage::{
    ArrayListTable, BPlusTreeTable, HashTable, MultiIndexTable, SetTable, SourceSet, Table,
    TableKind,
};

// Re-export executor types
pub use executor::{join, Condition, Executor, JoinOn, Operand, QueryContext};

// Re-export API types
pub use api::{Database, ExecResult, ParsedQuery, Projection, ResultSet, TableRef};

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

//! Top-level Database API
//!
//! This module provides the catalog that owns the base tables and the
//! statement types the SQL front end hands to it.
//!
//! # Quick Start
//!
//! ```
//! use arbordb::{Database, DataType, ParsedQuery, ExecResult, TableRef, Value};
//!
//! let mut db = Database::open_in_memory();
//! db.execute(&ParsedQuery::create_table(
//!     "users",
//!     vec![("id".to_string(), DataType::Integer), ("name".to_string(), DataType::Varchar(16))],
//!     Some(0),
//!     Vec::new(),
//! ))
//! .unwrap();
//! db.execute(&ParsedQuery::insert("users", vec![Value::integer(1), Value::text("Alice")]))
//!     .unwrap();
//!
//! let select = ParsedQuery::select(vec![TableRef::new("users")], Vec::new(), Vec::new());
//! if let ExecResult::Rows(rs) = db.execute(&select).unwrap() {
//!     assert_eq!(rs.columns, vec!["id", "name"]);
//! }
//! ```
//!
//! # Persistence
//!
//! A database opened with a data directory loads every table listed in its
//! catalog manifest; [`Database::save`] writes them back.

pub mod database;
pub mod statement;

pub use database::Database;
pub use statement::{Command, ExecResult, ParsedQuery, Projection, ResultSet, TableRef};

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

//! Core types and definitions for arbordb
//!
//! This module contains the fundamental types used throughout the engine:
//!
//! - [`DataType`] - Column types (INT, VARCHAR(n))
//! - [`Operator`] - Comparison operators (=, !=, >, <, etc.)
//! - [`Value`] - Nullable typed field values
//! - [`Row`] - A database row (the `DataRecord`)
//! - [`Schema`] - Table schema definition
//! - [`CheckResult`] - Insertion validation outcome
//! - [`Error`] - Error types for all fallible operations

pub mod error;
pub mod row;
pub mod schema;
pub mod types;
pub mod value;

// Re-export main types for convenience
pub use error::{Error, Result};
pub use row::{Row, RowRef};
pub use schema::{Schema, SchemaBuilder, SchemaColumn, RESULT_TABLE_NAME};
pub use types::{CheckResult, DataType, IndexDeclaration, IndexType, Operator};
pub use value::{Value, NULL_LITERAL};

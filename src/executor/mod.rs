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

//! Query execution
//!
//! This module evaluates WHERE clauses against the tables of a FROM list.
//!
//! # Architecture
//!
//! Conditions arrive in postfix order. Each comparison is answered by the
//! backend that owns the column, and intermediate results are combined as
//! they are popped:
//!
//! ```text
//! Condition (attr op const)  -> Table::query        (index or scan)
//! Condition (attr op attr)   -> join / row filter
//! AND / OR                   -> intersect / union   (after provenance alignment)
//!   ↓
//! product with unreferenced FROM tables
//!   ↓
//! ArrayListTable
//! ```
//!
//! # Components
//!
//! - [`Executor`] - Evaluates conditions over a [`QueryContext`]
//! - [`Condition`] - Comparison or connective in postfix order
//! - [`join`] - Sort-merge and Cartesian joins

pub mod condition;
pub mod context;
pub mod join;
pub mod utils;

mod query;
mod set_ops;

pub use condition::{Condition, ConditionForm, Operand};
pub use context::QueryContext;
pub use join::{join, JoinOn};

/// Evaluates conditions over the tables of one query
pub struct Executor<'a> {
    ctx: &'a QueryContext,
}

impl<'a> Executor<'a> {
    /// Create an executor over a FROM list
    pub fn new(ctx: &'a QueryContext) -> Self {
        Self { ctx }
    }

    /// Tables this executor reads
    pub fn context(&self) -> &QueryContext {
        self.ctx
    }
}

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

//! Storage module for arbordb
//!
//! This module contains the storage layer components including:
//! - The B+Tree ordered index
//! - The Table trait and its five backends
//! - Table files and the catalog manifest
//! - Configuration types

pub mod backend;
pub mod config;
pub mod index;
pub mod persistence;
pub mod traits;

// Re-export index types
pub use index::BPlusTree;

// Re-export config types
pub use config::{Config, IndexConfig};

// Re-export backend types
pub use backend::{
    restore_table, ArrayListTable, BPlusTreeTable, HashTable, MultiIndexTable, SetTable,
};

// Re-export trait types
pub use traits::{source_of, SourceSet, Table, TableKind};

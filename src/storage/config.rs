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

//! Storage engine configuration
//!

use std::path::PathBuf;

use crate::core::IndexType;
use crate::storage::index::{DEFAULT_CAPACITY, DEFAULT_ORDER, MIN_ORDER};

/// Shape parameters for every B+Tree the catalog creates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexConfig {
    /// Maximum separator keys per internal node before it splits
    /// Default: 32
    pub order: usize,

    /// Maximum entries per leaf bucket before it splits
    /// Default: 32
    pub capacity: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            order: DEFAULT_ORDER,
            capacity: DEFAULT_CAPACITY,
        }
    }
}

impl IndexConfig {
    /// Creates an IndexConfig with explicit shape parameters
    pub fn new(order: usize, capacity: usize) -> Self {
        Self { order, capacity }
    }

    /// Copy with both parameters raised to the accepted minimum
    pub fn normalized(self) -> Self {
        Self {
            order: self.order.max(MIN_ORDER),
            capacity: self.capacity.max(MIN_ORDER),
        }
    }
}

/// Configuration for the catalog
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Directory holding the catalog manifest and table files.
    /// If None, the catalog is memory-only
    pub data_dir: Option<PathBuf>,

    /// B+Tree shape for ordered indexes
    pub index: IndexConfig,

    /// Index placed on the primary key of tables that declare no index.
    /// Default: None (such tables use whole-row hashing)
    pub default_index: IndexType,
}

impl Config {
    /// Creates a new in-memory configuration (no persistence)
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Creates a new configuration persisting to the given directory
    pub fn with_data_dir<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            data_dir: Some(path.into()),
            ..Default::default()
        }
    }

    /// Returns true if the catalog can be saved and loaded
    pub fn is_persistent(&self) -> bool {
        self.data_dir.is_some()
    }

    /// Builder method to set the B+Tree shape
    pub fn with_index(mut self, index: IndexConfig) -> Self {
        self.index = index.normalized();
        self
    }

    /// Builder method to set the index used for undeclared primary keys
    pub fn with_default_index(mut self, index_type: IndexType) -> Self {
        self.default_index = index_type;
        self
    }
}

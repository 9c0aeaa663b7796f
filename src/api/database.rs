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

//! Database catalog and operations
//!
//! A [`Database`] owns every base table of one catalog. It picks a storage
//! backend when a table is created, validates rows before they reach the
//! backend, evaluates SELECTs through the [`Executor`] and saves/loads the
//! whole catalog to a data directory.
//!
//! # Examples
//!
//! ```
//! use arbordb::{row, Condition, Database, Operand, Operator, Projection, SchemaBuilder, TableRef};
//! use arbordb::DataType;
//!
//! let mut db = Database::open_in_memory();
//! let schema = SchemaBuilder::new("users")
//!     .add_primary_key("id", DataType::Integer)
//!     .add("age", DataType::Integer)
//!     .build();
//! db.create_table(schema, &[], None).unwrap();
//! db.insert("users", row![1, 30]).unwrap();
//! db.insert("users", row![2, 25]).unwrap();
//!
//! let older = Condition::compare(Operand::column("age"), Operator::Gt, Operand::constant(26));
//! let rs = db
//!     .select(&[TableRef::new("users")], &[older], &[Projection::All])
//!     .unwrap();
//! assert_eq!(rs.len(), 1);
//! ```

use std::path::Path;

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, info, warn};

use crate::core::{
    CheckResult, Error, IndexDeclaration, IndexType, Result, Row, Schema, SchemaColumn,
};
use crate::executor::{Condition, Executor, QueryContext};
use crate::storage::backend::{
    restore_table, ArrayListTable, BPlusTreeTable, HashTable, MultiIndexTable, SetTable,
};
use crate::storage::config::Config;
use crate::storage::persistence;
use crate::storage::traits::{Table, TableKind};

use super::statement::{Command, ExecResult, ParsedQuery, Projection, ResultSet, TableRef};

/// A catalog of named tables
pub struct Database {
    config: Config,
    tables: FxHashMap<String, Box<dyn Table>>,
    /// Creation order, used for listing and saving
    order: Vec<String>,
    /// Tables dropped since the last save whose files must go
    dropped: FxHashSet<String>,
}

impl Database {
    /// Open a catalog that lives only in memory
    pub fn open_in_memory() -> Self {
        Self::with_config(Config::in_memory())
    }

    fn with_config(config: Config) -> Self {
        Self {
            config,
            tables: FxHashMap::default(),
            order: Vec::new(),
            dropped: FxHashSet::default(),
        }
    }

    /// Open a catalog, loading every table saved under `config.data_dir`
    pub fn open(config: Config) -> Result<Self> {
        let mut db = Self::with_config(config);
        if let Some(dir) = db.config.data_dir.clone() {
            db.load(&dir)?;
        }
        Ok(db)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Table names in creation order
    pub fn table_names(&self) -> &[String] {
        &self.order
    }

    pub fn table(&self, name: &str) -> Result<&dyn Table> {
        self.tables
            .get(name)
            .map(|t| t.as_ref())
            .ok_or_else(|| Error::TableNotFound(name.to_string()))
    }

    /// Create a table, choosing its backend from the index declarations
    ///
    /// No index gives a [`SetTable`] (or `Config::default_index` on the
    /// primary key), one index a [`HashTable`] or [`BPlusTreeTable`] keyed on
    /// it, and more than one a [`MultiIndexTable`]. `kind` forces a backend.
    pub fn create_table(
        &mut self,
        schema: Schema,
        indexes: &[IndexDeclaration],
        kind: Option<TableKind>,
    ) -> Result<TableKind> {
        schema.validate()?;
        let name = schema.table_name.clone();
        if self.tables.contains_key(&name) {
            return Err(Error::TableAlreadyExists(name));
        }
        if let Some(decl) = indexes.iter().find(|d| d.column >= schema.column_count()) {
            return Err(Error::ColumnIndexOutOfBounds { index: decl.column });
        }

        let table = self.build_table(schema, indexes, kind)?;
        let kind = table.kind();
        debug!(table = %name, %kind, "create table");
        self.dropped.remove(&name);
        self.order.push(name.clone());
        self.tables.insert(name, table);
        Ok(kind)
    }

    fn build_table(
        &self,
        schema: Schema,
        indexes: &[IndexDeclaration],
        kind: Option<TableKind>,
    ) -> Result<Box<dyn Table>> {
        let mut declared: Vec<IndexDeclaration> = Vec::new();
        for decl in indexes {
            if decl.index_type != IndexType::None
                && !declared.iter().any(|d| d.column == decl.column)
            {
                declared.push(*decl);
            }
        }
        if declared.is_empty() && self.config.default_index != IndexType::None {
            if let Some(pk) = schema.primary_key {
                declared.push(IndexDeclaration::new(pk, self.config.default_index));
            }
        }

        let kind = kind.unwrap_or(match declared.as_slice() {
            [] => TableKind::Set,
            [d] if d.index_type == IndexType::Hash => TableKind::Hash,
            [_] => TableKind::BPlusTree,
            _ => TableKind::MultiIndex,
        });
        let key = declared.first().map(|d| d.column);
        let name = schema.table_name.clone();
        let config = self.config.index;

        Ok(match kind {
            TableKind::Set => Box::new(SetTable::new(name, schema)),
            TableKind::Hash => Box::new(HashTable::new(name, schema, key)),
            TableKind::BPlusTree => Box::new(BPlusTreeTable::new(name, schema, key, config)),
            TableKind::MultiIndex => {
                Box::new(MultiIndexTable::new(name, schema, &declared, config)?)
            }
            TableKind::ArrayList => Box::new(ArrayListTable::new(name, schema)),
        })
    }

    /// Remove a table; its file goes on the next save
    pub fn drop_table(&mut self, name: &str) -> Result<()> {
        if self.tables.remove(name).is_none() {
            return Err(Error::TableNotFound(name.to_string()));
        }
        self.order.retain(|n| n != name);
        self.dropped.insert(name.to_string());
        debug!(table = %name, "drop table");
        Ok(())
    }

    /// Validate and insert one row
    ///
    /// Type and arity problems are errors; duplicate or NULL keys are
    /// reported through the returned [`CheckResult`] and leave the table
    /// unchanged.
    pub fn insert(&mut self, name: &str, row: Row) -> Result<CheckResult> {
        let table = self
            .tables
            .get_mut(name)
            .ok_or_else(|| Error::TableNotFound(name.to_string()))?;
        row.validate(table.schema())?;

        let check = table.check_input_data(&row);
        if !check.is_success() {
            debug!(table = %name, %check, "row rejected");
            return Ok(check);
        }
        if !table.insert(row) {
            return Err(Error::internal(format!("{} refused a checked row", name)));
        }
        Ok(CheckResult::Success)
    }

    /// Evaluate a SELECT
    ///
    /// `conditions` are in postfix order. Every FROM entry is bound to an
    /// alias of the stored table so one table can appear more than once.
    pub fn select(
        &self,
        from: &[TableRef],
        conditions: &[Condition],
        projections: &[Projection],
    ) -> Result<ResultSet> {
        let mut ctx = QueryContext::new();
        for table_ref in from {
            let table = self.table(&table_ref.name)?;
            ctx.add(table.generate_alias(table_ref.visible_name()))?;
        }

        let result = Executor::new(&ctx).evaluate(conditions)?;
        project_result(&result, projections)
    }

    /// Run one parsed statement
    pub fn execute(&mut self, query: &ParsedQuery) -> Result<ExecResult> {
        let target = || {
            query
                .tables
                .first()
                .map(|t| t.name.clone())
                .ok_or_else(|| Error::invalid_argument(format!("{:?} names no table", query.command)))
        };

        match query.command {
            Command::CreateTable => {
                if query.attribute_names.len() != query.attribute_types.len() {
                    return Err(Error::invalid_argument(
                        "attribute names and types differ in length",
                    ));
                }
                let columns = query
                    .attribute_names
                    .iter()
                    .zip(&query.attribute_types)
                    .map(|(name, data_type)| SchemaColumn::new(name.clone(), *data_type))
                    .collect();
                let schema = Schema::new(target()?, columns).with_primary_key(query.primary_key);
                self.create_table(schema, &query.indexes, None)?;
                Ok(ExecResult::Done)
            }
            Command::DropTable => {
                self.drop_table(&target()?)?;
                Ok(ExecResult::Done)
            }
            Command::Insert => {
                let row = Row::from_values(query.values.clone());
                Ok(ExecResult::Inserted(self.insert(&target()?, row)?))
            }
            Command::Select => Ok(ExecResult::Rows(self.select(
                &query.tables,
                &query.conditions,
                &query.projections,
            )?)),
        }
    }

    /// Write every table plus the catalog manifest to the data directory
    pub fn save(&mut self) -> Result<()> {
        let Some(dir) = self.config.data_dir.clone() else {
            return Err(Error::invalid_argument("database has no data directory"));
        };
        std::fs::create_dir_all(&dir)
            .map_err(|e| Error::io(format!("failed to create {}: {}", dir.display(), e)))?;

        let mut manifest = Vec::with_capacity(self.order.len());
        for name in &self.order {
            let table = self.table(name)?;
            table.write_to_disk(&persistence::table_path(&dir, name))?;
            manifest.push((name.clone(), table.kind()));
        }
        persistence::write_catalog(&dir, &manifest)?;

        for name in self.dropped.drain() {
            persistence::remove_table_file(&dir, &name)?;
        }
        info!(dir = %dir.display(), tables = manifest.len(), "catalog saved");
        Ok(())
    }

    fn load(&mut self, dir: &Path) -> Result<()> {
        for (name, kind) in persistence::read_catalog(dir)? {
            let path = persistence::table_path(dir, &name);
            let table = restore_table(&path, kind, self.config.index).map_err(|e| {
                warn!(table = %name, error = %e, "restore failed");
                e
            })?;
            if table.name() != name {
                return Err(Error::parse(format!(
                    "{} holds table {}, catalog expects {}",
                    path.display(),
                    table.name(),
                    name
                )));
            }
            debug!(table = %name, %kind, rows = table.len(), "table restored");
            self.order.push(name.clone());
            self.tables.insert(name, table);
        }
        info!(dir = %dir.display(), tables = self.order.len(), "catalog loaded");
        Ok(())
    }
}

/// Narrow the final result to the SELECT targets
fn project_result(result: &ArrayListTable, projections: &[Projection]) -> Result<ResultSet> {
    let schema = result.schema();
    let qualify = result.sources().len() > 1;
    let header = |i: usize| {
        if qualify {
            schema.qualified_name(i)
        } else {
            schema.columns[i].attribute().to_string()
        }
    };

    let mut positions = Vec::new();
    if projections.is_empty() {
        positions.extend(0..schema.column_count());
    }
    for projection in projections {
        match projection {
            Projection::All => positions.extend(0..schema.column_count()),
            Projection::Column { table, name } => {
                positions.push(schema.resolve(table.as_deref(), name)?);
            }
        }
    }

    let columns = positions.iter().map(|&i| header(i)).collect();
    let rows = result
        .records()
        .iter()
        .map(|row| row.select_columns(&positions))
        .collect::<Result<Vec<_>>>()?;
    Ok(ResultSet { columns, rows })
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("config", &self.config)
            .field("tables", &self.order)
            .finish()
    }
}

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

//! Table files and the catalog manifest
//!
//! A table file is line oriented:
//!
//! ```text
//! <table name>
//! <attribute count>
//! <name>\0<VARCHAR bound, or -1 for INT>      one line per attribute
//! <primary key column, or -1>
//! <key column>                                HASH / BPLUSTREE tables
//! <declaration count>                         MULTI tables
//! <column>\0<HASH|BPLUSTREE>                  one line per declaration
//! <field>\0<field>\0...                       one line per row, `null` for NULL
//! ```
//!
//! Files are written to a `.tmp` sibling and renamed into place, so a
//! failed write leaves the previous file intact. Reads parse and validate
//! the whole file before anything is handed to a table.

use std::fs::{self, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::core::{
    DataType, Error, IndexDeclaration, IndexType, Result, Row, Schema, SchemaColumn, Value,
    NULL_LITERAL,
};
use crate::storage::traits::{Table, TableKind};

/// Field separator inside a line
pub const FIELD_SEPARATOR: char = '\0';

/// File name of the catalog manifest inside a data directory
pub const CATALOG_FILE: &str = "catalog";

/// Extension of table files
pub const TABLE_FILE_EXTENSION: &str = "tbl";

/// Everything a table file holds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableImage {
    pub name: String,
    pub schema: Schema,
    /// Key column of a single-key table
    pub key_column: Option<usize>,
    /// Index declarations of a multi-index table
    pub declarations: Vec<IndexDeclaration>,
    pub rows: Vec<Row>,
}

/// Path of the file holding table `name` inside `dir`
pub fn table_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{}.{}", name, TABLE_FILE_EXTENSION))
}

fn temp_sibling(path: &Path) -> PathBuf {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    PathBuf::from(tmp)
}

/// Write `contents` to `path` through a temporary sibling
fn replace_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|e| Error::io(format!("failed to create {}: {}", parent.display(), e)))?;
        }
    }

    let tmp = temp_sibling(path);
    let result = (|| -> Result<()> {
        let file = OpenOptions::new()
            .create(true)
            .truncate(true)
            .write(true)
            .open(&tmp)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(contents.as_bytes())?;
        writer.flush()?;
        writer.get_ref().sync_all()?;
        Ok(())
    })();

    if let Err(e) = result {
        let _ = fs::remove_file(&tmp);
        return Err(Error::io(format!("failed to write {}: {}", path.display(), e)));
    }
    fs::rename(&tmp, path)
        .map_err(|e| Error::io(format!("failed to replace {}: {}", path.display(), e)))
}

/// Render one field, rejecting text the line format cannot carry
fn encode_field(value: &Value, column: &SchemaColumn) -> Result<String> {
    if let Value::Text(s) = value {
        if s.contains(FIELD_SEPARATOR) || s.contains('\n') || s.contains('\r') {
            return Err(Error::invalid_argument(format!(
                "value in column {} contains a separator character",
                column.name
            )));
        }
        if s.as_ref() == NULL_LITERAL {
            return Err(Error::invalid_argument(format!(
                "text '{}' in column {} would read back as NULL",
                NULL_LITERAL, column.name
            )));
        }
    }
    Ok(value.to_disk_string())
}

// ============================================================================
// Writing
// ============================================================================

/// Serialize `table` to its file layout
pub fn encode_table<T: Table + ?Sized>(table: &T) -> Result<String> {
    let schema = table.schema();
    let mut out = String::new();

    out.push_str(table.name());
    out.push('\n');
    out.push_str(&format!("{}\n", schema.column_count()));
    for col in &schema.columns {
        out.push_str(&format!(
            "{}{}{}\n",
            col.name,
            FIELD_SEPARATOR,
            col.data_type.to_disk_code()
        ));
    }
    let pk = schema.primary_key.map_or(-1, |pk| pk as i64);
    out.push_str(&format!("{}\n", pk));

    match table.kind() {
        TableKind::Hash | TableKind::BPlusTree => {
            let key = table.key_column().unwrap_or(0);
            out.push_str(&format!("{}\n", key));
        }
        TableKind::MultiIndex => {
            let declarations = table.index_declarations();
            out.push_str(&format!("{}\n", declarations.len()));
            for decl in declarations {
                out.push_str(&format!(
                    "{}{}{}\n",
                    decl.column, FIELD_SEPARATOR, decl.index_type
                ));
            }
        }
        TableKind::Set | TableKind::ArrayList => {}
    }

    let mut fields = Vec::with_capacity(schema.column_count());
    for row in table.records() {
        fields.clear();
        for (value, col) in row.iter().zip(schema.columns.iter()) {
            fields.push(encode_field(value, col)?);
        }
        out.push_str(&fields.join("\0"));
        out.push('\n');
    }
    Ok(out)
}

/// Write `table` to `path`
pub fn write_table<T: Table + ?Sized>(table: &T, path: &Path) -> Result<()> {
    let contents = encode_table(table)?;
    replace_file(path, &contents)?;
    debug!(table = %table.name(), path = %path.display(), rows = table.len(), "table written");
    Ok(())
}

// ============================================================================
// Reading
// ============================================================================

/// Line cursor producing positioned parse errors
struct Lines<'a> {
    lines: std::str::Lines<'a>,
    number: usize,
}

impl<'a> Lines<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            lines: text.lines(),
            number: 0,
        }
    }

    fn next_line(&mut self, what: &str) -> Result<&'a str> {
        self.number += 1;
        self.lines
            .next()
            .ok_or_else(|| Error::parse(format!("line {}: missing {}", self.number, what)))
    }

    fn next_int(&mut self, what: &str) -> Result<i64> {
        let line = self.next_line(what)?;
        line.trim()
            .parse::<i64>()
            .map_err(|_| Error::parse(format!("line {}: bad {} '{}'", self.number, what, line)))
    }

    fn next_column(&mut self, what: &str, columns: usize) -> Result<usize> {
        let value = self.next_int(what)?;
        usize::try_from(value)
            .ok()
            .filter(|c| *c < columns)
            .ok_or_else(|| Error::parse(format!("line {}: {} {} out of range", self.number, what, value)))
    }

    fn error(&self, message: impl std::fmt::Display) -> Error {
        Error::parse(format!("line {}: {}", self.number, message))
    }
}

/// Parse a table file's contents for a table of `kind`
pub fn decode_table(text: &str, kind: TableKind) -> Result<TableImage> {
    let mut lines = Lines::new(text);

    let name = lines.next_line("table name")?.to_string();
    let count = lines.next_int("attribute count")?;
    if count <= 0 {
        return Err(lines.error(format!("attribute count {} must be positive", count)));
    }

    let mut columns = Vec::new();
    for _ in 0..count {
        let line = lines.next_line("attribute")?;
        let (col, code) = line
            .split_once(FIELD_SEPARATOR)
            .ok_or_else(|| lines.error("attribute line without type"))?;
        let code = code
            .parse::<i64>()
            .map_err(|_| lines.error(format!("bad type code '{}'", code)))?;
        columns.push(SchemaColumn::new(col, DataType::from_disk_code(code)));
    }
    let column_count = columns.len();

    let pk = lines.next_int("primary key")?;
    let primary_key = if pk < 0 {
        None
    } else {
        Some(
            usize::try_from(pk)
                .ok()
                .filter(|c| *c < column_count)
                .ok_or_else(|| lines.error(format!("primary key {} out of range", pk)))?,
        )
    };
    let schema = Schema::new(name.clone(), columns).with_primary_key(primary_key);
    schema.validate()?;

    let mut key_column = None;
    let mut declarations = Vec::new();
    match kind {
        TableKind::Hash | TableKind::BPlusTree => {
            key_column = Some(lines.next_column("key column", column_count)?);
        }
        TableKind::MultiIndex => {
            let n = lines.next_int("declaration count")?;
            for _ in 0..n.max(0) {
                let line = lines.next_line("index declaration")?;
                let (col, index_type) = line
                    .split_once(FIELD_SEPARATOR)
                    .ok_or_else(|| lines.error("declaration without index type"))?;
                let column = col
                    .parse::<usize>()
                    .ok()
                    .filter(|c| *c < column_count)
                    .ok_or_else(|| lines.error(format!("bad declaration column '{}'", col)))?;
                let index_type = index_type.parse::<IndexType>()?;
                declarations.push(IndexDeclaration::new(column, index_type));
            }
        }
        TableKind::Set | TableKind::ArrayList => {}
    }

    let mut rows = Vec::new();
    loop {
        lines.number += 1;
        let Some(line) = lines.lines.next() else {
            break;
        };
        let fields: Vec<&str> = line.split(FIELD_SEPARATOR).collect();
        if fields.len() != column_count {
            return Err(lines.error(format!(
                "row has {} fields, expected {}",
                fields.len(),
                column_count
            )));
        }
        let mut values = Vec::with_capacity(column_count);
        for (field, col) in fields.iter().zip(schema.columns.iter()) {
            let value = Value::from_disk_str(field, col.data_type)
                .map_err(|e| lines.error(format!("column {}: {}", col.name, e)))?;
            values.push(value);
        }
        let row = Row::from_values(values);
        row.validate(&schema)
            .map_err(|e| lines.error(e))?;
        rows.push(row);
    }

    Ok(TableImage {
        name,
        schema,
        key_column,
        declarations,
        rows,
    })
}

/// Read and validate the table file at `path`
pub fn read_table(path: &Path, kind: TableKind) -> Result<TableImage> {
    let text = fs::read_to_string(path)
        .map_err(|e| Error::io(format!("failed to read {}: {}", path.display(), e)))?;
    decode_table(&text, kind).map_err(|e| match e {
        Error::Parse(message) => Error::parse(format!("{}: {}", path.display(), message)),
        other => other,
    })
}

// ============================================================================
// Catalog manifest
// ============================================================================

/// Write the manifest listing every table and its backend
pub fn write_catalog(dir: &Path, tables: &[(String, TableKind)]) -> Result<()> {
    let mut out = String::new();
    for (name, kind) in tables {
        out.push_str(&format!("{}{}{}\n", name, FIELD_SEPARATOR, kind));
    }
    replace_file(&dir.join(CATALOG_FILE), &out)
}

/// Read the manifest; a directory without one holds no tables
pub fn read_catalog(dir: &Path) -> Result<Vec<(String, TableKind)>> {
    let path = dir.join(CATALOG_FILE);
    if !path.exists() {
        return Ok(Vec::new());
    }
    let text = fs::read_to_string(&path)
        .map_err(|e| Error::io(format!("failed to read {}: {}", path.display(), e)))?;

    let mut tables = Vec::new();
    for (i, line) in text.lines().enumerate() {
        if line.is_empty() {
            continue;
        }
        let (name, kind) = line.split_once(FIELD_SEPARATOR).ok_or_else(|| {
            Error::parse(format!("{}: line {}: missing table kind", path.display(), i + 1))
        })?;
        tables.push((name.to_string(), kind.parse::<TableKind>()?));
    }
    Ok(tables)
}

/// Remove a table file if present
pub fn remove_table_file(dir: &Path, name: &str) -> Result<()> {
    let path = table_path(dir, name);
    match fs::remove_file(&path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(Error::io(format!("failed to remove {}: {}", path.display(), e))),
    }
}

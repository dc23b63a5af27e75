//! # Schema Inference Module
//!
//! Maps detected column kinds to SQL types and renders the `CREATE TABLE`
//! statement for a [`Dataset`]. Rendering is pure: the same dataset and table
//! name always produce the same text.
use crate::dataset::Dataset;
use crate::dataset::ValueKind;
use crate::error::SheetLoaderError;
use regex::Regex;
use std::fmt::Display;
use std::sync::LazyLock;
use thiserror::Error;

/// Unquoted SQL identifier
static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_$]*$").expect("Hardcode regex pattern"));

#[derive(Error, Debug)]
pub enum IdentifierError {
    #[error("Invalid table name '{0}'")]
    TableNameError(String),

    #[error("Invalid column name '{0}'")]
    ColumnNameError(String),

    #[error("Table '{0}' has no columns")]
    NoColumnsError(String),
}

/// Column types emitted in generated DDL.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SqlType {
    Int,
    Float,
    Boolean,
    Timestamp,
    Text,
}

impl SqlType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            SqlType::Int => "INT",
            SqlType::Float => "FLOAT",
            SqlType::Boolean => "BOOLEAN",
            SqlType::Timestamp => "TIMESTAMP",
            SqlType::Text => "TEXT",
        }
    }
}

impl Display for SqlType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Chooses the SQL type of a column from its kind.
pub fn infer_column_type(kind: ValueKind) -> SqlType {
    match kind {
        ValueKind::Integer => SqlType::Int,
        ValueKind::Float => SqlType::Float,
        ValueKind::Boolean => SqlType::Boolean,
        ValueKind::Timestamp => SqlType::Timestamp,
        ValueKind::Text | ValueKind::Mixed => SqlType::Text,
    }
}

/// A column name with its chosen SQL type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnTypeDecision {
    pub name: String,
    pub sql_type: SqlType,
}

/// A `CREATE TABLE` statement: table name and columns in dataset order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreateTableStatement {
    table_name: String,
    columns: Vec<ColumnTypeDecision>,
}

impl CreateTableStatement {
    pub fn new(table_name: &str, columns: Vec<ColumnTypeDecision>) -> Self {
        Self {
            table_name: table_name.to_owned(),
            columns,
        }
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn columns(&self) -> &[ColumnTypeDecision] {
        &self.columns
    }

    /// Checks that the statement can be executed verbatim: the table and every column
    /// are unquoted identifiers, and there is at least one column.
    pub fn validate(&self) -> Result<(), SheetLoaderError> {
        if !IDENTIFIER.is_match(&self.table_name) {
            Err(IdentifierError::TableNameError(self.table_name.to_owned()))?;
        }
        if self.columns.is_empty() {
            Err(IdentifierError::NoColumnsError(self.table_name.to_owned()))?;
        }
        if let Some(column) = self.columns.iter().find(|column| !IDENTIFIER.is_match(&column.name)) {
            Err(IdentifierError::ColumnNameError(column.name.to_owned()))?;
        }
        Ok(())
    }
}

impl Display for CreateTableStatement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let columns = self
            .columns
            .iter()
            .map(|column| format!("    {} {}", column.name, column.sql_type))
            .collect::<Vec<_>>()
            .join(",\n");
        write!(f, "CREATE TABLE {} (\n{}\n);", self.table_name, columns)
    }
}

/// Builds the `CREATE TABLE` statement for a dataset. Names are taken verbatim.
pub fn generate_create_table(dataset: &Dataset, table_name: &str) -> CreateTableStatement {
    let columns = dataset
        .columns()
        .iter()
        .map(|column| ColumnTypeDecision {
            name: column.name().to_owned(),
            sql_type: infer_column_type(column.kind()),
        })
        .collect();
    CreateTableStatement::new(table_name, columns)
}

//! # Loader Module
//!
//! Runs one import: reads the source spreadsheet, derives the table schema,
//! creates the table and appends every row through a single connection.
//!
//! The steps are not transactional. A failure while writing rows leaves the
//! created table in place, and a rerun then fails with
//! [`LoadError::SchemaCreation`].
use crate::database::target::ConnectionTarget;
use crate::database::Database;
use crate::dataset::Dataset;
use crate::error::SheetLoaderError;
use crate::schema::generate_create_table;
use crate::schema::CreateTableStatement;
use std::path::PathBuf;
use thiserror::Error;
use tracing::info;

/// Inputs of one import.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadConfig {
    /// Spreadsheet file to read
    pub source: PathBuf,
    /// Table to create; must not exist yet
    pub table_name: String,
    /// Database connection target, see [`crate::database::target::ConnectionTarget`]
    pub target: String,
}

impl LoadConfig {
    pub fn new(source: impl Into<PathBuf>, table_name: &str, target: &str) -> Self {
        Self {
            source: source.into(),
            table_name: table_name.to_owned(),
            target: target.to_owned(),
        }
    }
}

/// Outcome of a successful import.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadReport {
    pub statement: CreateTableStatement,
    pub table_name: String,
    pub rows_written: usize,
}

/// Failure of an import, classified by the step that failed.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to read source file '{}'", path.display())]
    SourceRead {
        path: PathBuf,
        #[source]
        source: SheetLoaderError,
    },

    #[error("Failed to connect to database '{target}'")]
    Connection {
        target: String,
        #[source]
        source: SheetLoaderError,
    },

    #[error("Failed to create table '{table}'")]
    SchemaCreation {
        table: String,
        #[source]
        source: SheetLoaderError,
    },

    #[error("Failed to write rows into table '{table}'")]
    DataWrite {
        table: String,
        #[source]
        source: SheetLoaderError,
    },
}

/// Imports the source spreadsheet into a new table.
///
/// `on_statement` receives the generated `CREATE TABLE` statement before it is executed.
pub fn load<F>(config: &LoadConfig, on_statement: F) -> Result<LoadReport, LoadError>
where
    F: FnOnce(&CreateTableStatement),
{
    let dataset = Dataset::from_file(&config.source).map_err(|source| LoadError::SourceRead {
        path: config.source.to_owned(),
        source,
    })?;
    info!(
        source = %config.source.display(),
        columns = dataset.column_count(),
        rows = dataset.row_count(),
        "source file read"
    );

    let statement = generate_create_table(&dataset, &config.table_name);
    on_statement(&statement);

    let mut database = Database::connect(&config.target).map_err(|source| LoadError::Connection {
        target: redact_password(&config.target),
        source,
    })?;

    let schema_error = |source| LoadError::SchemaCreation {
        table: config.table_name.to_owned(),
        source,
    };
    database.create_table(&statement).map_err(schema_error)?;
    info!(table = %config.table_name, "table created");

    let rows_written = database
        .append(&config.table_name, &dataset)
        .map_err(|source| LoadError::DataWrite {
            table: config.table_name.to_owned(),
            source,
        })?;
    info!(table = %config.table_name, rows = rows_written, "rows written");

    Ok(LoadReport {
        statement,
        table_name: config.table_name.to_owned(),
        rows_written,
    })
}

/// Server targets are shown without their password; anything else verbatim.
fn redact_password(target: &str) -> String {
    match ConnectionTarget::try_from(target) {
        Ok(parsed @ ConnectionTarget::Postgres(_)) => parsed.to_string(),
        _ => target.to_owned(),
    }
}

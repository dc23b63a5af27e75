//! # Database Module
//!
//! Owns the connection used for one load: parses the connection target, executes
//! the generated DDL and appends dataset rows. PostgreSQL servers and DuckDB files
//! are supported; the connection is closed when the [`Database`] is dropped.
mod duckdb_backend;
mod postgres_backend;
pub mod target;

use crate::dataset::Dataset;
use crate::error::SheetLoaderError;
use crate::schema::CreateTableStatement;
use crate::schema::SqlType;
use duckdb_backend::DuckDbBackend;
use postgres_backend::PostgresBackend;
use target::ConnectionTarget;
use thiserror::Error;
use tracing::debug;
use tracing::info;

/// Errors raised while writing values into a created table.
#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Value '{1}' in column '{0}' does not fit the {2} column type")]
    ValueTypeError(String, String, SqlType),
}

/// A database engine that can run DDL and bulk-append rows.
pub(crate) trait Backend {
    /// Returns the engine name for logs
    fn name(&self) -> &'static str;

    /// Executes one or more SQL statements.
    fn execute(&mut self, sql: &str) -> Result<(), SheetLoaderError>;

    /// Appends every dataset row to an existing table, in row order. Returns the number of rows written.
    fn append(&mut self, table_name: &str, dataset: &Dataset) -> Result<usize, SheetLoaderError>;
}

pub struct Database {
    backend: Box<dyn Backend>,
}

impl Database {
    /// Connects to an existing database. Never creates a database.
    pub fn connect(target: &str) -> Result<Self, SheetLoaderError> {
        let target = ConnectionTarget::try_from(target)?;
        let backend: Box<dyn Backend> = match &target {
            ConnectionTarget::Postgres(url) => Box::new(PostgresBackend::connect(url)?),
            ConnectionTarget::DuckDb(path) => Box::new(DuckDbBackend::open(path)?),
        };
        info!(database = %target, engine = backend.name(), "database connection opened");
        Ok(Self { backend })
    }

    /// Validates and executes a `CREATE TABLE` statement.
    pub fn create_table(&mut self, statement: &CreateTableStatement) -> Result<(), SheetLoaderError> {
        statement.validate()?;
        self.backend.execute(&statement.to_string())?;
        debug!(table = statement.table_name(), "table created");
        Ok(())
    }

    /// Appends every dataset row to an existing table. Returns the number of rows written.
    pub fn append(&mut self, table_name: &str, dataset: &Dataset) -> Result<usize, SheetLoaderError> {
        let rows = self.backend.append(table_name, dataset)?;
        debug!(table = table_name, rows, "rows appended");
        Ok(rows)
    }
}

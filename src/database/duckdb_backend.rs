use crate::database::target::TargetError;
use crate::database::Backend;
use crate::database::DatabaseError;
use crate::dataset::Dataset;
use crate::dataset::Value;
use crate::error::SheetLoaderError;
use crate::schema::infer_column_type;
use crate::schema::SqlType;
use duckdb::AccessMode;
use duckdb::Config;
use duckdb::Connection;
use duckdb::ToSql;
use std::path::Path;

/// An embedded DuckDB database file.
pub(super) struct DuckDbBackend {
    connection: Connection,
}

impl DuckDbBackend {
    /// Opens an existing database file read-write.
    pub(super) fn open(path: &Path) -> Result<Self, SheetLoaderError> {
        if !path.is_file() {
            Err(TargetError::MissingDatabaseError(path.display().to_string()))?;
        }
        let config = Config::default().access_mode(AccessMode::ReadWrite)?;
        let connection = Connection::open_with_flags(path, config)?;
        Ok(Self { connection })
    }
}

impl Backend for DuckDbBackend {
    fn name(&self) -> &'static str {
        "duckdb"
    }

    fn execute(&mut self, sql: &str) -> Result<(), SheetLoaderError> {
        self.connection.execute_batch(sql)?;
        Ok(())
    }

    /// Appends through the DuckDB appender and flushes once.
    fn append(&mut self, table_name: &str, dataset: &Dataset) -> Result<usize, SheetLoaderError> {
        check_single_precision(dataset)?;
        let mut appender = self.connection.appender(table_name)?;
        let mut rows = 0usize;
        for row in dataset.rows() {
            let params: Vec<&dyn ToSql> = row.into_iter().map(|value| value as &dyn ToSql).collect();
            appender.append_row(params.as_slice())?;
            rows += 1;
        }
        appender.flush()?;
        Ok(rows)
    }
}

/// `FLOAT` is single precision in DuckDB. Fails on the first value the column
/// cannot hold, before anything is appended.
fn check_single_precision(dataset: &Dataset) -> Result<(), SheetLoaderError> {
    let float_columns = dataset
        .columns()
        .iter()
        .filter(|column| infer_column_type(column.kind()) == SqlType::Float);
    for column in float_columns {
        let lossy = column.values().iter().find_map(|value| match value {
            Value::Float(number) if !fits_single_precision(*number) => Some(*number),
            _ => None,
        });
        if let Some(number) = lossy {
            Err(DatabaseError::ValueTypeError(
                column.name().to_owned(),
                number.to_string(),
                SqlType::Float,
            ))?;
        }
    }
    Ok(())
}

/// True when the shortest text of the nearest `f32` reads back as the same number,
/// i.e. the value survives storage in a `REAL` column.
fn fits_single_precision(number: f64) -> bool {
    (number as f32)
        .to_string()
        .parse::<f64>()
        .map(|parsed| parsed == number)
        .unwrap_or(false)
}

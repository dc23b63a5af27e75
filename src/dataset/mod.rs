//! # Dataset Module
//!
//! In-memory tabular data between the spreadsheet reader and the database:
//! named columns of equal length, each holding values of one detected [`ValueKind`].
pub mod value;

use crate::error::SheetLoaderError;
use crate::spreadsheet::cell::Cell;
use crate::spreadsheet::cell::CellType;
use crate::spreadsheet::read_first_sheet;
use crate::spreadsheet::sheet::Sheet;
use crate::spreadsheet::SpreadsheetError;
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;
use tracing::debug;
use tracing::warn;

pub use value::Value;
pub use value::ValueKind;

#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("Column '{0}' has {2} values, expected {1}")]
    ColumnLengthError(String, usize, usize),
}

/// A named column with its detected kind and one value per data row.
#[derive(Clone, Debug, PartialEq)]
pub struct Column {
    name: String,
    kind: ValueKind,
    values: Vec<Value>,
}

impl Column {
    /// Creates a column of a known kind, converting every value to that kind.
    pub fn new(name: &str, kind: ValueKind, values: Vec<Value>) -> Self {
        Self {
            name: name.to_owned(),
            kind,
            values: values.into_iter().map(|value| value.coerce(kind)).collect(),
        }
    }

    /// Creates a column whose kind is detected from its non-null values.
    pub fn from_values(name: &str, values: Vec<Value>) -> Self {
        let kind = ValueKind::detect(values.iter().filter_map(Value::kind));
        Self::new(name, kind, values)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Ordered columns of equal length. Immutable once built.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Dataset {
    columns: Vec<Column>,
    row_count: usize,
}

impl Dataset {
    /// Builds a dataset, failing when the columns differ in length.
    pub fn new(columns: Vec<Column>) -> Result<Self, SheetLoaderError> {
        let row_count = columns.first().map(Column::len).unwrap_or(0);
        if let Some(column) = columns.iter().find(|column| column.len() != row_count) {
            Err(DatasetError::ColumnLengthError(column.name.to_owned(), row_count, column.len()))?;
        }
        Ok(Self { columns, row_count })
    }

    /// Reads the first worksheet of a spreadsheet file into a dataset.
    pub fn from_file(path: &Path) -> Result<Self, SheetLoaderError> {
        let sheet = read_first_sheet(&path.to_string_lossy())?;
        Self::from_sheet(&sheet)
    }

    /// Builds a dataset from a worksheet whose first used row is the header.
    pub(crate) fn from_sheet(sheet: &Sheet) -> Result<Self, SheetLoaderError> {
        let mut rows = sheet.rows();
        let header = rows.next().unwrap_or_default();
        let names = column_names(&header);

        let mut cells = vec![Vec::<(Value, Option<ValueKind>)>::new(); names.len()];
        for record in rows {
            for (col, cell) in record.into_iter().enumerate() {
                cells[col].push(match cell {
                    Some(cell) => cell_value(sheet, cell)?,
                    None => (Value::Null, None),
                });
            }
        }

        let columns = names
            .iter()
            .zip(cells)
            .map(|(name, cells)| {
                let kind = ValueKind::detect(cells.iter().filter_map(|(_, kind)| *kind));
                if cells.iter().all(|(value, _)| value.is_null()) {
                    warn!(column = %name, "column has no values");
                }
                debug!(column = %name, kind = %kind, "column kind detected");
                Column::new(name, kind, cells.into_iter().map(|(value, _)| value).collect())
            })
            .collect();
        Self::new(columns)
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Iterates the rows in order, each as one value per column.
    pub fn rows(&self) -> impl Iterator<Item = Vec<&Value>> + '_ {
        (0..self.row_count).map(move |row| self.columns.iter().map(|column| &column.values[row]).collect())
    }
}

/// Names the columns after the header cells: trimmed text, `Unnamed: <index>` for blanks,
/// `.1`, `.2`, ... suffixes for repeated names.
fn column_names(header: &[Option<&Cell>]) -> Vec<String> {
    let mut used = HashSet::<String>::with_capacity(header.len());
    header
        .iter()
        .enumerate()
        .map(|(index, cell)| {
            let text = cell.map(|cell| cell.to_string().trim().to_owned()).unwrap_or_default();
            let base = if text.is_empty() { format!("Unnamed: {index}") } else { text };
            let mut name = base.to_owned();
            let mut suffix = 0usize;
            while used.contains(&name) {
                suffix += 1;
                name = format!("{base}.{suffix}");
            }
            used.insert(name.to_owned());
            name
        })
        .collect()
}

/// Converts a cell to a value and the kind it contributes to kind detection.
/// Times of day carry no date and count as `Mixed`.
fn cell_value(sheet: &Sheet, cell: &Cell) -> Result<(Value, Option<ValueKind>), SheetLoaderError> {
    let error = |message: String| {
        SpreadsheetError::CellValueError(sheet.file_name.to_owned(), sheet.name.to_owned(), cell.reference(), message)
    };
    let value = match cell.kind {
        CellType::Empty => Value::Null,
        CellType::Boolean => Value::Boolean(cell.to_boolean()),
        CellType::Number if cell.is_integer() => Value::Integer(cell.to_bigint().map_err(error)?),
        CellType::Number => Value::Float(cell.to_double().map_err(error)?),
        kind if kind.is_serial_time() || kind == CellType::IsoDuration => {
            let text = cell.to_time_string().map_err(error)?;
            return Ok((Value::Text(text), Some(ValueKind::Mixed)));
        }
        kind if kind.is_serial_date() || kind == CellType::IsoDateTime => {
            Value::Timestamp(cell.to_datetime().map_err(error)?)
        }
        CellType::Error => Err(error(cell.value.to_owned()))?,
        _ if cell.value.is_empty() => Value::Null,
        _ => Value::Text(cell.value.to_owned()),
    };
    let kind = value.kind();
    Ok((value, kind))
}

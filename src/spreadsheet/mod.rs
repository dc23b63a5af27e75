//! # Spreadsheet Reading Module
//!
//! Reads the first worksheet of Office Open XML (`.xlsx`, `.xlsm`, `.xlam`) and
//! OpenDocument (`.ods`) workbooks into a sparse [`Sheet`] of typed cells.
pub(crate) mod cell;
pub(crate) mod ods;
pub(crate) mod reference;
pub(crate) mod sheet;
pub(crate) mod xlsx;

use crate::error::SheetLoaderError;
use crate::spreadsheet::ods::OdsSpreadsheet;
use crate::spreadsheet::sheet::Sheet;
use crate::spreadsheet::xlsx::XlsxSpreadsheet;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Errors raised while locating and decoding workbook contents.
#[derive(Error, Debug)]
pub enum SpreadsheetError {
    #[error("Unsupported spreadsheet format '{0}' (expected .xlsx, .xlsm, .xlam or .ods)")]
    UnsupportedFormatError(String),

    #[error("Spreadsheet '{0}' is password protected or not an Office Open XML package")]
    SpreadsheetPasswordProtectedError(String),

    #[error("Spreadsheet '{0}' contains no worksheet")]
    SpreadsheetEmptyError(String),

    #[error("Sheet '{1}' in '{0}' contains no data")]
    SheetEmptyError(String, String),

    #[error("Missing package part '{0}'")]
    FileError(String),

    #[error("Invalid cell value in '{0}' sheet '{1}' at {2}: {3}")]
    CellValueError(String, String, String, String),
}

/// A workbook opened for reading.
pub(crate) trait Spreadsheet {
    /// Returns the file name of the workbook
    fn name(&self) -> String;

    /// Reads the worksheet at `index` (0-based, workbook order).
    fn read_sheet(&mut self, index: usize) -> Result<Sheet, SheetLoaderError>;
}

/// Opens a workbook, choosing the reader by file extension.
pub(crate) fn open_spreadsheet(file_name: &str) -> Result<Box<dyn Spreadsheet>, SheetLoaderError> {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|extension| extension.to_str())
        .map(|extension| extension.to_ascii_lowercase());
    match extension.as_deref() {
        Some("xlsx") | Some("xlsm") | Some("xlam") => Ok(Box::new(XlsxSpreadsheet::open(file_name)?)),
        Some("ods") => Ok(Box::new(OdsSpreadsheet::open(file_name)?)),
        _ => Err(SpreadsheetError::UnsupportedFormatError(file_name.to_owned()))?,
    }
}

/// Reads the first worksheet of a workbook. Fails when the worksheet holds no cells.
pub(crate) fn read_first_sheet(file_name: &str) -> Result<Sheet, SheetLoaderError> {
    let mut spreadsheet = open_spreadsheet(file_name)?;
    let sheet = spreadsheet.read_sheet(0)?;
    if sheet.is_empty() {
        Err(SpreadsheetError::SheetEmptyError(spreadsheet.name(), sheet.name.to_owned()))?;
    }
    debug!(
        file = %sheet.file_name,
        sheet = %sheet.name,
        cells = sheet.cells.len(),
        "worksheet read"
    );
    Ok(sheet)
}

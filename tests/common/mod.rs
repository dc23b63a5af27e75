//! Workbook fixtures written with the zip writer, and DuckDB helpers.
#![allow(dead_code)]

use duckdb::Connection;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// A fixture cell.
#[derive(Copy, Clone, Debug)]
pub enum Cell<'a> {
    /// Shared string
    Text(&'a str),
    /// Inline string
    Inline(&'a str),
    Number(&'a str),
    Boolean(bool),
    /// Serial number styled with built-in date format 14
    Date(&'a str),
    /// Serial number styled with a custom `yyyy-mm-dd hh:mm:ss` format
    DateTime(&'a str),
    /// Serial number styled with built-in time format 21
    Time(&'a str),
    Error(&'a str),
    Blank,
}

fn column_letters(mut col: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push((b'A' + (col % 26) as u8) as char);
        if col < 26 {
            break;
        }
        col = col / 26 - 1;
    }
    letters.iter().rev().collect()
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;").replace('"', "&quot;")
}

fn write_package(path: &Path, entries: &[(&str, String)]) {
    let mut zip = ZipWriter::new(File::create(path).unwrap());
    let options = SimpleFileOptions::default();
    for (name, content) in entries {
        zip.start_file(*name, options).unwrap();
        zip.write_all(content.as_bytes()).unwrap();
    }
    zip.finish().unwrap();
}

/// Writes a single-sheet `.xlsx` workbook; `rows[0]` lands in row 1.
pub fn write_xlsx(path: &Path, sheet_name: &str, rows: &[Vec<Cell>]) {
    write_xlsx_with_options(path, sheet_name, rows, false);
}

pub fn write_xlsx_with_options(path: &Path, sheet_name: &str, rows: &[Vec<Cell>], date1904: bool) {
    let mut shared_strings = Vec::<String>::new();
    let mut sheet_data = String::new();
    for (row_index, row) in rows.iter().enumerate() {
        sheet_data.push_str(&format!(r#"<row r="{}">"#, row_index + 1));
        for (col_index, cell) in row.iter().enumerate() {
            let reference = format!("{}{}", column_letters(col_index), row_index + 1);
            let xml = match cell {
                Cell::Text(text) => {
                    shared_strings.push(escape(text));
                    format!(r#"<c r="{reference}" t="s"><v>{}</v></c>"#, shared_strings.len() - 1)
                }
                Cell::Inline(text) => {
                    format!(r#"<c r="{reference}" t="inlineStr"><is><t>{}</t></is></c>"#, escape(text))
                }
                Cell::Number(value) => format!(r#"<c r="{reference}"><v>{value}</v></c>"#),
                Cell::Boolean(value) => {
                    format!(r#"<c r="{reference}" t="b"><v>{}</v></c>"#, if *value { 1 } else { 0 })
                }
                Cell::Date(value) => format!(r#"<c r="{reference}" s="1"><v>{value}</v></c>"#),
                Cell::DateTime(value) => format!(r#"<c r="{reference}" s="2"><v>{value}</v></c>"#),
                Cell::Time(value) => format!(r#"<c r="{reference}" s="3"><v>{value}</v></c>"#),
                Cell::Error(value) => format!(r#"<c r="{reference}" t="e"><v>{value}</v></c>"#),
                Cell::Blank => continue,
            };
            sheet_data.push_str(&xml);
        }
        sheet_data.push_str("</row>");
    }

    let workbook = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
<workbookPr date1904="{}"/>
<sheets><sheet name="{}" sheetId="1" r:id="rId1"/></sheets>
</workbook>"#,
        if date1904 { 1 } else { 0 },
        escape(sheet_name)
    );
    let relationships = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>
<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
<Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/sharedStrings" Target="sharedStrings.xml"/>
</Relationships>"#
        .to_owned();
    let styles = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
<numFmts count="1"><numFmt numFmtId="164" formatCode="yyyy\-mm\-dd\ hh:mm:ss"/></numFmts>
<cellXfs count="4"><xf numFmtId="0"/><xf numFmtId="14" applyNumberFormat="1"/><xf numFmtId="164" applyNumberFormat="1"/><xf numFmtId="21" applyNumberFormat="1"/></cellXfs>
</styleSheet>"#
        .to_owned();
    let shared = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="{0}" uniqueCount="{0}">{1}</sst>"#,
        shared_strings.len(),
        shared_strings.iter().map(|text| format!("<si><t>{text}</t></si>")).collect::<String>()
    );
    let worksheet = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>{sheet_data}</sheetData></worksheet>"#
    );

    write_package(
        path,
        &[
            ("xl/workbook.xml", workbook),
            ("xl/_rels/workbook.xml.rels", relationships),
            ("xl/styles.xml", styles),
            ("xl/sharedStrings.xml", shared),
            ("xl/worksheets/sheet1.xml", worksheet),
        ],
    );
}

/// A fixture cell of an OpenDocument table.
#[derive(Copy, Clone, Debug)]
pub enum OdsCell<'a> {
    Text(&'a str),
    Float(&'a str),
    Boolean(bool),
    Date(&'a str),
    Time(&'a str),
    Blank,
}

/// Writes a single-table `.ods` workbook.
pub fn write_ods(path: &Path, table_name: &str, rows: &[Vec<OdsCell>]) {
    let mut table = String::new();
    for row in rows {
        table.push_str("<table:table-row>");
        for cell in row {
            table.push_str(&match cell {
                OdsCell::Text(text) => format!(
                    r#"<table:table-cell office:value-type="string"><text:p>{}</text:p></table:table-cell>"#,
                    escape(text)
                ),
                OdsCell::Float(value) => format!(
                    r#"<table:table-cell office:value-type="float" office:value="{value}"><text:p>{value}</text:p></table:table-cell>"#
                ),
                OdsCell::Boolean(value) => format!(
                    r#"<table:table-cell office:value-type="boolean" office:boolean-value="{value}"><text:p>{value}</text:p></table:table-cell>"#
                ),
                OdsCell::Date(value) => format!(
                    r#"<table:table-cell office:value-type="date" office:date-value="{value}"><text:p>{value}</text:p></table:table-cell>"#
                ),
                OdsCell::Time(value) => format!(
                    r#"<table:table-cell office:value-type="time" office:time-value="{value}"><text:p>{value}</text:p></table:table-cell>"#
                ),
                OdsCell::Blank => "<table:table-cell/>".to_owned(),
            });
        }
        table.push_str("</table:table-row>");
    }
    let content = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<office:document-content xmlns:office="urn:oasis:names:tc:opendocument:xmlns:office:1.0" xmlns:table="urn:oasis:names:tc:opendocument:xmlns:table:1.0" xmlns:text="urn:oasis:names:tc:opendocument:xmlns:text:1.0" office:version="1.2">
<office:body><office:spreadsheet><table:table table:name="{}">{table}</table:table></office:spreadsheet></office:body>
</office:document-content>"#,
        escape(table_name)
    );
    let manifest = r#"<?xml version="1.0" encoding="UTF-8"?>
<manifest:manifest xmlns:manifest="urn:oasis:names:tc:opendocument:xmlns:manifest:1.0" manifest:version="1.2">
<manifest:file-entry manifest:full-path="/" manifest:media-type="application/vnd.oasis.opendocument.spreadsheet"/>
<manifest:file-entry manifest:full-path="content.xml" manifest:media-type="text/xml"/>
</manifest:manifest>"#
        .to_owned();
    write_package(
        path,
        &[
            ("mimetype", "application/vnd.oasis.opendocument.spreadsheet".to_owned()),
            ("META-INF/manifest.xml", manifest),
            ("content.xml", content),
        ],
    );
}

/// Creates an empty DuckDB database file and returns its path.
pub fn create_database(dir: &Path) -> PathBuf {
    let path = dir.join("warehouse.db");
    drop(Connection::open(&path).unwrap());
    path
}

pub fn query_strings(database: &Path, sql: &str) -> Vec<String> {
    let connection = Connection::open(database).unwrap();
    let mut statement = connection.prepare(sql).unwrap();
    let rows = statement.query_map([], |row| row.get::<_, String>(0)).unwrap();
    rows.map(Result::unwrap).collect()
}

pub fn query_count(database: &Path, sql: &str) -> i64 {
    let connection = Connection::open(database).unwrap();
    connection.query_row(sql, [], |row| row.get(0)).unwrap()
}

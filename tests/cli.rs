//! Runs the `sheet-loader` binary.

mod common;

use common::create_database;
use common::query_count;
use common::write_xlsx;
use common::Cell;
use std::process::Command;
use std::process::Output;

fn sheet_loader(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_sheet-loader"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

#[test]
fn test_cli_load() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("people.xlsx");
    write_xlsx(
        &source,
        "People",
        &[
            vec![Cell::Text("id"), Cell::Text("name")],
            vec![Cell::Number("1"), Cell::Text("Ada")],
            vec![Cell::Number("2"), Cell::Text("Grace")],
        ],
    );
    let database = create_database(dir.path());

    let output = sheet_loader(&[&source.to_string_lossy(), "people", &database.to_string_lossy()]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(
        stdout,
        "CREATE TABLE people (\n    id INT,\n    name TEXT\n);\nData imported successfully into people\n"
    );
    assert_eq!(query_count(&database, "SELECT COUNT(*) FROM people"), 2);
}

#[test]
fn test_cli_missing_source() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("absent.xlsx");
    let database = create_database(dir.path());

    let output = sheet_loader(&[&source.to_string_lossy(), "people", &database.to_string_lossy()]);
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());

    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("Failed to read source file"), "{stderr}");
    assert!(stderr.contains("Caused by"), "{stderr}");
}

#[test]
fn test_cli_missing_arguments() {
    let output = sheet_loader(&["people.xlsx"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Usage"));
}

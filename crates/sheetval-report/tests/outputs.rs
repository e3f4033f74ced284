//! Report artifacts written for a loaded file.

use std::fs;

use calamine::{Data, Reader, open_workbook_auto};
use chrono::NaiveDate;
use sheetval_ingest::{LoadOptions, SheetGrid, load_table};
use sheetval_model::{CellValue, RuleCategory, ValidationError};
use sheetval_report::{
    DEFAULT_SEPARATOR, JsonReport, ReportSource, ValidationSummary, annotate, annotate_loaded,
    export_csv, render_rows,
};
use tempfile::TempDir;

fn errors() -> Vec<ValidationError> {
    vec![
        ValidationError::single(
            2,
            "C",
            "Validation error Integer",
            CellValue::text("12.5"),
            RuleCategory::Simple,
        ),
        ValidationError::spanning(
            3,
            vec!["A".into(), "C".into()],
            "Multicolumn validation error date_before",
            vec![CellValue::text("3"), CellValue::text("x")],
            RuleCategory::Multicolumn,
        ),
    ]
}

#[test]
fn csv_export_of_a_loaded_file() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("orders.csv");
    fs::write(&source, "Id,Name,Amount\n1,Ada,12.5\n3,,x\n").unwrap();
    let loaded = load_table(&source, &LoadOptions::default()).unwrap();

    let rows = render_rows(&errors(), &loaded.table, "B");
    let output = dir.path().join("errors.csv");
    export_csv(&rows, &output, DEFAULT_SEPARATOR).unwrap();

    let written = fs::read_to_string(&output).unwrap();
    let lines: Vec<&str> = written.lines().collect();
    assert_eq!(
        lines,
        vec![
            "Row;Column(s);Coordinate;Message;Value(s)",
            "2;Ada - Amount;C2;Validation error Integer;12.5",
            "3;Id, Amount;A3+C3;Multicolumn validation error date_before;3, x",
        ]
    );
}

#[test]
fn json_report_carries_summary_and_fingerprint() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("orders.csv");
    fs::write(&source, "Id\n1\n").unwrap();
    let errors = errors();
    let summary = ValidationSummary::from_errors(&errors);

    let report = JsonReport::new(ReportSource::describe(&source, Some("Sheet1")), &summary, &errors);
    let output = dir.path().join("report.json");
    report.write(&output).unwrap();

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(json["schema"], "sheetval.report/v1");
    assert_eq!(json["source"]["sheet"], "Sheet1");
    assert_eq!(json["source"]["sha256"].as_str().map(str::len), Some(64));
    assert_eq!(json["summary"]["total_errors"], 2);
    assert_eq!(json["summary"]["multicolumn_errors"], 1);
    assert_eq!(json["errors"][1]["columns"], serde_json::json!(["A", "C"]));
    assert_eq!(json["errors"][0]["category"], "simple");
    assert!(!dir.path().join("report.json.tmp").exists());
}

#[test]
fn annotated_copy_keeps_values() {
    let dir = TempDir::new().unwrap();
    let start = NaiveDate::from_ymd_opt(2024, 3, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    let grid = SheetGrid::new(vec![
        vec![
            CellValue::text("Id"),
            CellValue::text("Name"),
            CellValue::text("Amount"),
        ],
        vec![
            CellValue::Number(1.0),
            CellValue::text("Ada"),
            CellValue::text("12.5"),
        ],
        vec![CellValue::Number(3.0), CellValue::Empty, CellValue::DateTime(start)],
        vec![CellValue::Bool(true)],
    ]);

    let mut errors = errors();
    errors.push(ValidationError::single(
        9,
        "A",
        "Validation error NotBlank",
        CellValue::Empty,
        RuleCategory::Simple,
    ));
    errors.push(sheetval_model::source_failure("ignored"));

    let output = dir.path().join("annotated.xlsx");
    let outcome = annotate(&[("Orders", &grid)], "Orders", &errors, &output).unwrap();
    assert_eq!(outcome.highlighted_cells, 4);
    assert_eq!(outcome.skipped_coordinates, 1);

    let mut workbook = open_workbook_auto(&output).unwrap();
    assert_eq!(workbook.sheet_names(), vec!["Orders".to_string()]);
    let range = workbook.worksheet_range("Orders").unwrap();
    assert_eq!(range.get_value((0, 2)), Some(&Data::String("Amount".into())));
    assert_eq!(range.get_value((1, 0)), Some(&Data::Float(1.0)));
    assert_eq!(range.get_value((1, 1)), Some(&Data::String("Ada".into())));
    assert_eq!(range.get_value((3, 0)), Some(&Data::Bool(true)));
    match range.get_value((2, 2)) {
        Some(Data::DateTime(value)) => {
            assert_eq!(value.as_datetime(), Some(start));
        }
        other => panic!("expected a date cell, got {other:?}"),
    }
}

#[test]
fn annotated_workbook_keeps_every_sheet() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("book.xlsx");
    let mut book = rust_xlsxwriter::Workbook::new();
    let notes = book.add_worksheet();
    notes.set_name("Notes").unwrap();
    notes.write_string(0, 0, "prepared by finance").unwrap();
    notes.write_number(1, 0, 7.0).unwrap();
    let data = book.add_worksheet();
    data.set_name("Data").unwrap();
    data.write_string(0, 0, "Name").unwrap();
    data.write_string(1, 0, "Ada").unwrap();
    book.save(&source).unwrap();

    let options = LoadOptions {
        sheet: Some("Data".to_string()),
        ..LoadOptions::default()
    };
    let loaded = load_table(&source, &options).unwrap();
    let errors = vec![ValidationError::single(
        2,
        "A",
        "Validation error Email",
        CellValue::text("Ada"),
        RuleCategory::Simple,
    )];

    let output = dir.path().join("annotated.xlsx");
    let outcome = annotate_loaded(&loaded, &errors, &output).unwrap();
    assert_eq!(outcome.highlighted_cells, 1);

    let mut workbook = open_workbook_auto(&output).unwrap();
    assert_eq!(
        workbook.sheet_names(),
        vec!["Notes".to_string(), "Data".to_string()]
    );
    let notes = workbook.worksheet_range("Notes").unwrap();
    assert_eq!(
        notes.get_value((0, 0)),
        Some(&Data::String("prepared by finance".into()))
    );
    assert_eq!(notes.get_value((1, 0)), Some(&Data::Float(7.0)));
    let data = workbook.worksheet_range("Data").unwrap();
    assert_eq!(data.get_value((1, 0)), Some(&Data::String("Ada".into())));
}

#[test]
fn annotated_text_source_is_a_single_sheet() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("orders.csv");
    fs::write(&source, "Id,Name\n1,Ada\n").unwrap();
    let loaded = load_table(&source, &LoadOptions::default()).unwrap();

    let output = dir.path().join("annotated.xlsx");
    annotate_loaded(&loaded, &[], &output).unwrap();

    let mut workbook = open_workbook_auto(&output).unwrap();
    assert_eq!(workbook.sheet_names(), vec!["Sheet1".to_string()]);
    let range = workbook.worksheet_range("Sheet1").unwrap();
    assert_eq!(range.get_value((1, 1)), Some(&Data::String("Ada".into())));
}

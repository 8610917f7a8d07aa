use std::fs;
use std::path::Path;

use covmap_io::annotate::{annotate, AnnotatedSheet, AnnotationColumns, NOT_MAPPED};
use covmap_io::layout::insert_spacers;
use covmap_io::{read_sheets, select_sheet, xlsx};
use covmap_recon::catalogue::Catalogue;
use covmap_recon::engine::run;
use covmap_recon::report::{assemble, DEFAULT_MAX_ACTIONS};

const CONTROLS_CSV: &str = "\
Family;NIST Control ID;Title
Access Control;;
AC;AC-6(10) privileged functions;Prohibit Non-privileged Users
CP;CP-9;System Backup
ZZ;ZZ-1;Unknown
";

fn write_controls(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("controls.csv");
    fs::write(&path, CONTROLS_CSV).unwrap();
    path
}

#[test]
fn csv_to_styled_workbook() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_controls(dir.path());

    let sheets = read_sheets(&input).unwrap();
    let idx = select_sheet(&sheets, None).unwrap();
    let doc = &sheets[idx];

    let column = doc.control_column();
    assert_eq!(column, 1);

    let rows = doc.control_rows(column);
    assert_eq!(rows.len(), 3);

    let catalogue = Catalogue::builtin().unwrap();
    let result = run(&catalogue, &rows);
    assert_eq!(result.summary.matched, 2);
    assert_eq!(result.summary.unmatched, 1);

    let mut sheet = annotate(doc, &result.rows, &AnnotationColumns::default());
    let positions: Vec<usize> = result.rows.iter().map(|o| o.position()).collect();
    assert_eq!(insert_spacers(&mut sheet, &positions), 3);

    let at = chrono::NaiveDate::from_ymd_opt(2026, 2, 2)
        .unwrap()
        .and_hms_opt(8, 0, 0)
        .unwrap();
    let report = assemble(&catalogue, at, DEFAULT_MAX_ACTIONS);
    let lines = report.lines();

    let output = dir.path().join("controls.xlsx");
    xlsx::write(
        &output,
        Some(xlsx::SummarySheet {
            name: "EPAC Coverage Summary",
            lines: &lines,
        }),
        &[sheet],
    )
    .unwrap();

    let written = read_sheets(&output).unwrap();
    assert_eq!(written[0].name, "EPAC Coverage Summary");
    assert_eq!(written[0].cell(0, 0), "EPAC & MDC Coverage Analysis");

    let annotated = &written[1];
    assert_eq!(annotated.cell(0, 3), "Managed by EPAC");
    // header, blank-id row, AC-6(10), spacer, CP-9, spacer, ZZ-1, spacer
    assert_eq!(annotated.cell(2, 1), "AC-6(10) privileged functions");
    assert_eq!(annotated.cell(2, 3), "YES");
    assert_eq!(annotated.cell(3, 1), "");
    assert_eq!(annotated.cell(4, 3), "NO");
    assert_eq!(annotated.cell(6, 3), NOT_MAPPED);
}

#[test]
fn csv_round_trip_keeps_source_columns() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_controls(dir.path());
    let doc = read_sheets(&input).unwrap().remove(0);

    let catalogue = Catalogue::builtin().unwrap();
    let result = run(&catalogue, &doc.control_rows(doc.control_column()));
    let sheet = annotate(&doc, &result.rows, &AnnotationColumns::default());

    let output = dir.path().join("out.csv");
    covmap_io::csv::write(&sheet, &output, b';').unwrap();

    let reread = read_sheets(&output).unwrap().remove(0);
    assert_eq!(reread.cell(0, 2), "Title");
    assert_eq!(reread.cell(0, 7), "Priority/Action");
    assert_eq!(reread.cell(3, 7), "CRITICAL - CUSTOM BACKUP POLICY REQUIRED");
    assert_eq!(reread.cell(4, 3), NOT_MAPPED);
}

#[test]
fn untouched_sheets_copy_through() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_controls(dir.path());
    let doc = read_sheets(&input).unwrap().remove(0);

    let plain = AnnotatedSheet::plain(&doc);
    let output = dir.path().join("copy.xlsx");
    xlsx::write(&output, None, &[plain]).unwrap();

    let reread = read_sheets(&output).unwrap().remove(0);
    assert_eq!(reread.rows[2], doc.rows[2]);
}

// Excel import (xlsx, xls, xlsb, ods) and export (xlsx only)
//
// Import: cell values as text, one document per sheet.
// Export: summary sheet first, then every sheet in source order. Source
//         formatting is not carried over; coverage columns are styled.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader, Sheets};
use covmap_recon::report::{LineKind, SummaryLine};
use rust_xlsxwriter::{Color, Format, FormatAlign, Workbook, Worksheet};

use crate::annotate::{AnnotatedSheet, CellStyle, SheetRow, ANNOTATION_WIDTHS};
use crate::document::Document;
use crate::error::IoError;
use crate::layout::{spacer_rows, SPACER_HEIGHT};

const HEADER_BLUE: u32 = 0x0066CC;
const WHITE: u32 = 0xFFFFFF;

const YES_FILL: u32 = 0xC6EFCE;
const YES_FONT: u32 = 0x006100;
const PARTIAL_FILL: u32 = 0xFFEB9C;
const PARTIAL_FONT: u32 = 0x9C6500;
const NO_FILL: u32 = 0xFFC7CE;
const NO_FONT: u32 = 0x9C0006;

/// Summary sheet column widths (A, B).
pub const SUMMARY_WIDTHS: [f64; 2] = [60.0, 40.0];

// ---------------------------------------------------------------------------
// Import
// ---------------------------------------------------------------------------

/// Read every sheet of a workbook as text.
pub fn read_sheets(path: &Path) -> Result<Vec<Document>, IoError> {
    let mut workbook: Sheets<_> = open_workbook_auto(path)
        .map_err(|e| IoError::Parse(format!("failed to open {}: {e}", path.display())))?;

    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
    if sheet_names.is_empty() {
        return Err(IoError::NoSheets);
    }

    let mut documents = Vec::with_capacity(sheet_names.len());
    for sheet_name in &sheet_names {
        let range = workbook
            .worksheet_range(sheet_name)
            .map_err(|e| IoError::Parse(format!("failed to read sheet '{sheet_name}': {e}")))?;

        // Range start offset (data may not begin at A1)
        let (start_row, start_col) = range.start().unwrap_or((0, 0));
        let (start_row, start_col) = (start_row as usize, start_col as usize);

        let mut rows: Vec<Vec<String>> = vec![Vec::new(); start_row];
        for row in range.rows() {
            let mut cells = vec![String::new(); start_col];
            cells.extend(row.iter().map(cell_text));
            while cells.last().is_some_and(|c| c.is_empty()) {
                cells.pop();
            }
            rows.push(cells);
        }
        if rows.is_empty() {
            rows.push(Vec::new());
        }

        log::debug!("sheet '{sheet_name}': {} rows", rows.len());
        documents.push(Document::new(sheet_name.as_str(), rows)?);
    }

    Ok(documents)
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(n) => {
            // Integers without decimals
            if n.fract() == 0.0 && n.abs() < 1e15 {
                format!("{}", *n as i64)
            } else {
                format!("{n}")
            }
        }
        Data::Int(n) => n.to_string(),
        Data::Bool(b) => (if *b { "TRUE" } else { "FALSE" }).to_string(),
        Data::Error(e) => format!("#{e:?}"),
        Data::DateTime(dt) => dt.as_f64().to_string(),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
    }
}

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

/// The two-column summary sheet placed before the data sheets.
#[derive(Debug, Clone, Copy)]
pub struct SummarySheet<'a> {
    pub name: &'a str,
    pub lines: &'a [SummaryLine],
}

struct Styles {
    header: Format,
    yes: Format,
    partial: Format,
    no: Format,
    centered: Format,
    wrapped: Format,
    emphasis: Format,
    priority_critical: Format,
    priority_opportunity: Format,
    title: Format,
    section: Format,
    critical_line: Format,
    high_line: Format,
}

impl Styles {
    fn new() -> Self {
        let wrapped = Format::new()
            .set_align(FormatAlign::Left)
            .set_align(FormatAlign::VerticalCenter)
            .set_text_wrap();
        let coverage = |fill: u32, font: u32| {
            Format::new()
                .set_bold()
                .set_font_color(Color::RGB(font))
                .set_background_color(Color::RGB(fill))
                .set_align(FormatAlign::Center)
                .set_align(FormatAlign::VerticalCenter)
        };

        Self {
            header: Format::new()
                .set_bold()
                .set_font_color(Color::RGB(WHITE))
                .set_background_color(Color::RGB(HEADER_BLUE))
                .set_align(FormatAlign::Center)
                .set_align(FormatAlign::VerticalCenter)
                .set_text_wrap(),
            yes: coverage(YES_FILL, YES_FONT),
            partial: coverage(PARTIAL_FILL, PARTIAL_FONT),
            no: coverage(NO_FILL, NO_FONT),
            centered: Format::new()
                .set_align(FormatAlign::Center)
                .set_align(FormatAlign::VerticalCenter),
            emphasis: wrapped.clone().set_bold().set_font_color(Color::RGB(NO_FONT)),
            priority_critical: wrapped
                .clone()
                .set_bold()
                .set_font_color(Color::RGB(NO_FONT))
                .set_background_color(Color::RGB(NO_FILL)),
            priority_opportunity: wrapped
                .clone()
                .set_bold()
                .set_font_color(Color::RGB(PARTIAL_FONT))
                .set_background_color(Color::RGB(PARTIAL_FILL)),
            wrapped,
            title: Format::new()
                .set_bold()
                .set_font_size(16)
                .set_font_color(Color::RGB(HEADER_BLUE)),
            section: Format::new().set_bold().set_font_size(12),
            critical_line: Format::new().set_bold().set_font_color(Color::RGB(NO_FONT)),
            high_line: Format::new().set_bold().set_font_color(Color::RGB(PARTIAL_FONT)),
        }
    }

    fn cell(&self, style: CellStyle) -> Option<&Format> {
        match style {
            CellStyle::Plain => None,
            CellStyle::Header => Some(&self.header),
            CellStyle::CoverageYes => Some(&self.yes),
            CellStyle::CoveragePartial => Some(&self.partial),
            CellStyle::CoverageNo => Some(&self.no),
            CellStyle::Centered => Some(&self.centered),
            CellStyle::Wrapped => Some(&self.wrapped),
            CellStyle::Emphasis => Some(&self.emphasis),
            CellStyle::PriorityCritical => Some(&self.priority_critical),
            CellStyle::PriorityOpportunity => Some(&self.priority_opportunity),
        }
    }

    fn line(&self, kind: LineKind) -> Option<&Format> {
        match kind {
            LineKind::Title => Some(&self.title),
            LineKind::Section => Some(&self.section),
            LineKind::Critical => Some(&self.critical_line),
            LineKind::High => Some(&self.high_line),
            LineKind::Item | LineKind::Blank => None,
        }
    }
}

/// Write the summary sheet (when given) followed by `sheets` to a new workbook.
pub fn write(
    path: &Path,
    summary: Option<SummarySheet<'_>>,
    sheets: &[AnnotatedSheet],
) -> Result<(), IoError> {
    let styles = Styles::new();
    let mut workbook = Workbook::new();

    if let Some(summary) = summary {
        let worksheet = workbook.add_worksheet().set_name(summary.name)?;
        write_summary(worksheet, summary.lines, &styles)?;
    }

    for sheet in sheets {
        let worksheet = workbook.add_worksheet().set_name(&sheet.name)?;
        write_sheet(worksheet, sheet, &styles)?;
        if sheet.annotation_start.is_some() {
            worksheet.set_active(true);
        }
    }

    workbook
        .save(path)
        .map_err(|e| IoError::Write(format!("failed to save {}: {e}", path.display())))?;
    log::info!("workbook written: {}", path.display());
    Ok(())
}

fn write_summary(
    worksheet: &mut Worksheet,
    lines: &[SummaryLine],
    styles: &Styles,
) -> Result<(), IoError> {
    for (row, line) in lines.iter().enumerate() {
        let row = row as u32;
        let format = styles.line(line.kind);
        for (col, text) in [&line.label, &line.value].into_iter().enumerate() {
            if text.is_empty() {
                continue;
            }
            match format {
                Some(f) => worksheet.write_string_with_format(row, col as u16, text, f)?,
                None => worksheet.write_string(row, col as u16, text)?,
            };
        }
    }

    for (col, width) in SUMMARY_WIDTHS.iter().enumerate() {
        worksheet.set_column_width(col as u16, *width)?;
    }
    Ok(())
}

fn write_sheet(
    worksheet: &mut Worksheet,
    sheet: &AnnotatedSheet,
    styles: &Styles,
) -> Result<(), IoError> {
    for (row, sheet_row) in sheet.rows.iter().enumerate() {
        let SheetRow::Cells(cells) = sheet_row else {
            continue;
        };
        let row = row as u32;

        for (col, cell) in cells.iter().enumerate() {
            if cell.value.is_empty() {
                continue;
            }
            let col = col as u16;
            match styles.cell(cell.style) {
                Some(f) => worksheet.write_string_with_format(row, col, &cell.value, f)?,
                None => worksheet.write_string(row, col, &cell.value)?,
            };
        }
    }

    for row in spacer_rows(sheet) {
        worksheet.set_row_height(row as u32, SPACER_HEIGHT)?;
    }

    if let Some(start) = sheet.annotation_start {
        for (offset, width) in ANNOTATION_WIDTHS.iter().enumerate() {
            worksheet.set_column_width((start + offset) as u16, *width)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotate::Cell;

    fn annotated() -> AnnotatedSheet {
        AnnotatedSheet {
            name: "Controls".into(),
            annotation_start: Some(1),
            rows: vec![
                SheetRow::Cells(vec![
                    Cell::plain("Control"),
                    Cell::new("Managed by EPAC", CellStyle::Header),
                ]),
                SheetRow::Cells(vec![Cell::plain("AC-6"), Cell::new("YES", CellStyle::CoverageYes)]),
                SheetRow::Spacer,
                SheetRow::Cells(vec![Cell::plain("Access"), Cell::new("NOT MAPPED", CellStyle::Centered)]),
            ],
        }
    }

    fn summary_lines() -> Vec<SummaryLine> {
        vec![
            SummaryLine {
                kind: LineKind::Title,
                label: "Coverage".into(),
                value: String::new(),
            },
            SummaryLine {
                kind: LineKind::Item,
                label: "Total Controls Analyzed:".into(),
                value: "2".into(),
            },
        ]
    }

    #[test]
    fn test_export_summary_first_and_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.xlsx");
        let lines = summary_lines();

        write(
            &path,
            Some(SummarySheet {
                name: "Coverage Summary",
                lines: &lines,
            }),
            &[annotated()],
        )
        .unwrap();

        let sheets = read_sheets(&path).unwrap();
        let names: Vec<&str> = sheets.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Coverage Summary", "Controls"]);

        assert_eq!(sheets[0].cell(0, 0), "Coverage");
        assert_eq!(sheets[0].cell(1, 1), "2");

        let controls = &sheets[1];
        assert_eq!(controls.cell(0, 1), "Managed by EPAC");
        assert_eq!(controls.cell(1, 1), "YES");
        // Spacer row is blank
        assert_eq!(controls.cell(2, 0), "");
        assert_eq!(controls.cell(3, 1), "NOT MAPPED");
    }

    #[test]
    fn test_export_without_summary() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plain.xlsx");
        write(&path, None, &[annotated()]).unwrap();

        let sheets = read_sheets(&path).unwrap();
        assert_eq!(sheets.len(), 1);
        assert_eq!(sheets[0].cell(3, 0), "Access");
    }

    #[test]
    fn test_invalid_sheet_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.xlsx");
        let mut sheet = annotated();
        sheet.name = "bad/name".into();
        assert!(matches!(write(&path, None, &[sheet]), Err(IoError::Write(_))));
    }

    #[test]
    fn test_missing_workbook() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_sheets(&dir.path().join("missing.xlsx")).unwrap_err();
        assert!(matches!(err, IoError::Parse(_)));
    }

    #[test]
    fn test_cell_text() {
        assert_eq!(cell_text(&Data::Float(12.0)), "12");
        assert_eq!(cell_text(&Data::Float(1.5)), "1.5");
        assert_eq!(cell_text(&Data::Int(7)), "7");
        assert_eq!(cell_text(&Data::Bool(true)), "TRUE");
        assert_eq!(cell_text(&Data::String("AC-6".into())), "AC-6");
        assert_eq!(cell_text(&Data::Empty), "");
    }
}

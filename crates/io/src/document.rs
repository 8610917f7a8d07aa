// Tabular document model shared by the CSV and Excel readers.

use std::path::Path;

use covmap_recon::model::DocumentRow;

use crate::error::IoError;

/// Header keywords that mark the control identifier column (lowercase).
pub const CONTROL_COLUMN_KEYWORDS: [&str; 4] = ["control", "id", "nist", "ccaccr"];

/// Only the leading header cells are scanned for a control column.
pub const CONTROL_COLUMN_SCAN: usize = 20;

/// One sheet of cells as text. Row 0 is the header row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub name: String,
    pub rows: Vec<Vec<String>>,
}

impl Document {
    pub fn new(name: impl Into<String>, rows: Vec<Vec<String>>) -> Result<Self, IoError> {
        if rows.is_empty() {
            return Err(IoError::EmptyDocument);
        }
        Ok(Self {
            name: name.into(),
            rows,
        })
    }

    pub fn header(&self) -> &[String] {
        &self.rows[0]
    }

    /// Widest row, so appended columns never overwrite data.
    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Cell text at a 0-based row and column; missing cells read as empty.
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Index of the control identifier column.
    ///
    /// The first header cell (within the scan window) containing one of
    /// [`CONTROL_COLUMN_KEYWORDS`] wins; otherwise column 0.
    pub fn control_column(&self) -> usize {
        let found = self
            .header()
            .iter()
            .take(CONTROL_COLUMN_SCAN)
            .position(|h| {
                let h = h.to_lowercase();
                CONTROL_COLUMN_KEYWORDS.iter().any(|k| h.contains(k))
            });

        match found {
            Some(col) => {
                log::info!("control column {}: {:?}", col + 1, self.header()[col]);
                col
            }
            None => {
                log::warn!("no control column header found, using column 1");
                0
            }
        }
    }

    /// Data rows whose identifier cell is non-blank, with 1-based sheet positions
    /// (the header is position 1).
    pub fn control_rows(&self, column: usize) -> Vec<DocumentRow> {
        (1..self.rows.len())
            .filter_map(|i| {
                let raw = self.cell(i, column).trim();
                (!raw.is_empty()).then(|| DocumentRow::new(i + 1, raw))
            })
            .collect()
    }
}

/// Input/output format, decided by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Csv,
    Tsv,
    Spreadsheet,
}

impl Format {
    pub fn from_path(path: &Path) -> Result<Self, IoError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "csv" | "txt" => Ok(Self::Csv),
            "tsv" | "tab" => Ok(Self::Tsv),
            "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => Ok(Self::Spreadsheet),
            _ => Err(IoError::UnsupportedFormat(ext)),
        }
    }
}

/// Read every sheet of a document. CSV/TSV files yield a single sheet named
/// after the file stem.
pub fn read_sheets(path: &Path) -> Result<Vec<Document>, IoError> {
    match Format::from_path(path)? {
        Format::Csv => Ok(vec![crate::csv::read(path, None)?]),
        Format::Tsv => Ok(vec![crate::csv::read(path, Some(b'\t'))?]),
        Format::Spreadsheet => crate::xlsx::read_sheets(path),
    }
}

/// Index of the sheet to annotate: the named one, or the first.
pub fn select_sheet(sheets: &[Document], name: Option<&str>) -> Result<usize, IoError> {
    if sheets.is_empty() {
        return Err(IoError::NoSheets);
    }
    let Some(name) = name else {
        return Ok(0);
    };
    sheets
        .iter()
        .position(|s| s.name == name)
        .ok_or_else(|| IoError::SheetNotFound {
            name: name.to_string(),
            available: sheets.iter().map(|s| s.name.clone()).collect(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(rows: &[&[&str]]) -> Document {
        Document::new(
            "Controls",
            rows.iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn control_column_by_keyword() {
        let d = doc(&[&["Family", "NIST Control", "Title"]]);
        assert_eq!(d.control_column(), 1);

        let d = doc(&[&["Family", "CCACCR Ref", "Title"]]);
        assert_eq!(d.control_column(), 1);
    }

    #[test]
    fn first_keyword_column_wins() {
        let d = doc(&[&["Title", "Control ID", "Control Name"]]);
        assert_eq!(d.control_column(), 1);
    }

    #[test]
    fn control_column_defaults_to_first() {
        let d = doc(&[&["Family", "Title", "Notes"]]);
        assert_eq!(d.control_column(), 0);
    }

    #[test]
    fn keyword_beyond_scan_window_is_ignored() {
        let mut header: Vec<&str> = vec!["x"; CONTROL_COLUMN_SCAN];
        header.push("Control");
        let d = doc(&[header.as_slice()]);
        assert_eq!(d.control_column(), 0);
    }

    #[test]
    fn control_rows_skip_blank_cells() {
        let d = doc(&[
            &["Control", "Title"],
            &["AC-6", "Least Privilege"],
            &["", "Continuation"],
            &["  ", ""],
            &["Access Control", ""],
            &[],
            &["CP-9 "],
        ]);
        let rows = d.control_rows(0);
        let got: Vec<(usize, &str)> = rows
            .iter()
            .map(|r| (r.position, r.raw_identifier.as_str()))
            .collect();
        assert_eq!(got, vec![(2, "AC-6"), (5, "Access Control"), (7, "CP-9")]);
    }

    #[test]
    fn width_is_widest_row() {
        let d = doc(&[&["Control"], &["AC-6", "a", "b"], &["CP-9", "c"]]);
        assert_eq!(d.width(), 3);
        assert_eq!(d.cell(2, 2), "");
    }

    #[test]
    fn empty_document_is_rejected() {
        assert_eq!(Document::new("x", vec![]), Err(IoError::EmptyDocument));
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(Format::from_path(Path::new("a.CSV")).unwrap(), Format::Csv);
        assert_eq!(Format::from_path(Path::new("a.tsv")).unwrap(), Format::Tsv);
        assert_eq!(Format::from_path(Path::new("a.xlsx")).unwrap(), Format::Spreadsheet);
        assert!(matches!(
            Format::from_path(Path::new("a.pdf")),
            Err(IoError::UnsupportedFormat(ext)) if ext == "pdf"
        ));
    }

    #[test]
    fn select_sheet_by_name() {
        let sheets = vec![doc(&[&["a"]]), {
            let mut d = doc(&[&["b"]]);
            d.name = "Other".into();
            d
        }];
        assert_eq!(select_sheet(&sheets, None).unwrap(), 0);
        assert_eq!(select_sheet(&sheets, Some("Other")).unwrap(), 1);
        assert!(matches!(
            select_sheet(&sheets, Some("Missing")),
            Err(IoError::SheetNotFound { .. })
        ));
        assert_eq!(select_sheet(&[], None), Err(IoError::NoSheets));
    }
}

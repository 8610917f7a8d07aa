use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IoError {
    /// File could not be read, written, or copied.
    Io(String),
    /// Malformed CSV or unreadable workbook.
    Parse(String),
    /// The document has no header row.
    EmptyDocument,
    /// The workbook contains no sheets.
    NoSheets,
    /// A sheet requested by name is not in the workbook.
    SheetNotFound { name: String, available: Vec<String> },
    /// Extension is neither CSV/TSV nor a spreadsheet format.
    UnsupportedFormat(String),
    /// The output workbook could not be built or saved.
    Write(String),
}

impl fmt::Display for IoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(msg) => write!(f, "IO error: {msg}"),
            Self::Parse(msg) => write!(f, "cannot parse document: {msg}"),
            Self::EmptyDocument => write!(f, "document is empty (no header row)"),
            Self::NoSheets => write!(f, "workbook contains no sheets"),
            Self::SheetNotFound { name, available } => write!(
                f,
                "sheet '{name}' not found (available: {})",
                available.join(", ")
            ),
            Self::UnsupportedFormat(ext) => write!(f, "unsupported file format '{ext}'"),
            Self::Write(msg) => write!(f, "cannot write output: {msg}"),
        }
    }
}

impl std::error::Error for IoError {}

impl From<std::io::Error> for IoError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

impl From<csv::Error> for IoError {
    fn from(e: csv::Error) -> Self {
        Self::Parse(e.to_string())
    }
}

impl From<rust_xlsxwriter::XlsxError> for IoError {
    fn from(e: rust_xlsxwriter::XlsxError) -> Self {
        Self::Write(e.to_string())
    }
}

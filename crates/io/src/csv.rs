// CSV/TSV import/export

use std::io::Read;
use std::path::Path;

use covmap_recon::ControlId;

use crate::annotate::{AnnotatedSheet, SheetRow};
use crate::document::Document;
use crate::error::IoError;

/// Read a delimited file into a document. `None` sniffs the delimiter.
pub fn read(path: &Path, delimiter: Option<u8>) -> Result<Document, IoError> {
    let content = read_file_as_utf8(path)?;
    let delimiter = delimiter.unwrap_or_else(|| sniff_delimiter(&content));
    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("Sheet1");
    parse(name, &content, delimiter)
}

/// Delimiters tried by [`sniff_delimiter`]; earlier ones win ties.
const DELIMITERS: [u8; 4] = [b',', b';', b'\t', b'|'];

/// Lines of the file looked at when sniffing.
const SNIFF_LINES: usize = 10;

/// How well a delimiter splits the sample. Fields compare in order, so cells
/// holding a bare control identifier outweigh column consistency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Fit {
    control_cells: usize,
    consistency: usize,
}

impl Fit {
    /// `None` when the header does not split into at least two fields.
    fn measure(sample: &str, delimiter: u8) -> Option<Self> {
        let records: Vec<csv::StringRecord> = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(false)
            .flexible(true)
            .from_reader(sample.as_bytes())
            .records()
            .map_while(Result::ok)
            .collect();

        let width = records.first()?.len();
        if width <= 1 {
            return None;
        }

        let control_cells = records
            .iter()
            .skip(1)
            .flat_map(|r| r.iter())
            .filter(|cell| ControlId::parse(cell.trim()).is_ok())
            .count();
        let agreeing = records.iter().filter(|r| r.len() == width).count();

        Some(Self {
            control_cells,
            consistency: agreeing * width,
        })
    }
}

/// Guess the field delimiter of a control list from its first lines.
///
/// A delimiter must split the header into two or more fields. Among those, the
/// one leaving the most cells that are exactly a control identifier wins, then
/// the one whose rows most often match the header width (weighted by that
/// width). Falls back to comma.
pub fn sniff_delimiter(content: &str) -> u8 {
    let sample = content.lines().take(SNIFF_LINES).collect::<Vec<_>>().join("\n");

    let mut best: Option<(u8, Fit)> = None;
    for delimiter in DELIMITERS {
        let Some(fit) = Fit::measure(&sample, delimiter) else {
            continue;
        };
        if best.map_or(true, |(_, current)| fit > current) {
            best = Some((delimiter, fit));
        }
    }

    best.map(|(delimiter, _)| delimiter).unwrap_or(b',')
}

/// Read file and convert to UTF-8 if needed (control lists exported from Excel are often Windows-1252)
pub fn read_file_as_utf8(path: &Path) -> Result<String, IoError> {
    let mut file = std::fs::File::open(path)
        .map_err(|e| IoError::Io(format!("cannot open {}: {e}", path.display())))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;

    match String::from_utf8(bytes) {
        Ok(s) => Ok(s.strip_prefix('\u{feff}').map(str::to_string).unwrap_or(s)),
        Err(e) => {
            log::debug!("{} is not UTF-8, decoding as Windows-1252", path.display());
            let bytes = e.into_bytes();
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            Ok(decoded.into_owned())
        }
    }
}

fn parse(name: &str, content: &str, delimiter: u8) -> Result<Document, IoError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    Document::new(name, rows)
}

/// Write an annotated sheet as delimited text. Spacer rows and styling have
/// no CSV representation and are dropped.
pub fn write(sheet: &AnnotatedSheet, path: &Path, delimiter: u8) -> Result<(), IoError> {
    let write_err = |e: csv::Error| IoError::Write(format!("{}: {e}", path.display()));

    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_path(path)
        .map_err(write_err)?;

    for row in &sheet.rows {
        if let SheetRow::Cells(cells) = row {
            writer
                .write_record(cells.iter().map(|c| c.value.as_str()))
                .map_err(write_err)?;
        }
    }

    writer.flush()?;
    Ok(())
}

// Annotated sheet: the source cells plus the coverage columns, with style hints
// the Excel writer turns into formats.

use std::collections::HashMap;

use covmap_recon::classify::{opportunity_emphasis, priority_flags_custom_policy};
use covmap_recon::model::{Coverage, RowOutcome, SeverityTier};

use crate::document::Document;

pub const NOT_MAPPED: &str = "NOT MAPPED";

/// Widths of the five coverage columns, in Excel character units.
pub const ANNOTATION_WIDTHS: [f64; 5] = [18.0, 35.0, 50.0, 50.0, 35.0];

/// Header texts of the coverage columns, in output order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationColumns {
    pub coverage: String,
    pub platform_coverage: String,
    pub implementation: String,
    pub opportunity: String,
    pub priority: String,
}

impl Default for AnnotationColumns {
    fn default() -> Self {
        Self {
            coverage: "Managed by EPAC".into(),
            platform_coverage: "MDC Coverage".into(),
            implementation: "Implementation Details".into(),
            opportunity: "Custom Policy Opportunity".into(),
            priority: "Priority/Action".into(),
        }
    }
}

impl AnnotationColumns {
    pub fn names(&self) -> [&str; 5] {
        [
            self.coverage.as_str(),
            self.platform_coverage.as_str(),
            self.implementation.as_str(),
            self.opportunity.as_str(),
            self.priority.as_str(),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellStyle {
    /// Source cell, written without a format.
    Plain,
    /// Coverage column header: bold white on blue, centered.
    Header,
    CoverageYes,
    CoveragePartial,
    CoverageNo,
    /// Centered, used for the unmatched marker.
    Centered,
    /// Left-aligned wrapped text.
    Wrapped,
    /// Wrapped text in bold red.
    Emphasis,
    /// Wrapped text, red fill.
    PriorityCritical,
    /// Wrapped text, amber fill.
    PriorityOpportunity,
}

impl CellStyle {
    pub fn for_coverage(coverage: Coverage) -> Self {
        match coverage {
            Coverage::Yes => Self::CoverageYes,
            Coverage::Partial => Self::CoveragePartial,
            Coverage::No => Self::CoverageNo,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub value: String,
    pub style: CellStyle,
}

impl Cell {
    pub fn new(value: impl Into<String>, style: CellStyle) -> Self {
        Self {
            value: value.into(),
            style,
        }
    }

    pub fn plain(value: impl Into<String>) -> Self {
        Self::new(value, CellStyle::Plain)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetRow {
    Cells(Vec<Cell>),
    /// Thin blank row separating processed rows.
    Spacer,
}

/// A sheet ready for writing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotatedSheet {
    pub name: String,
    /// Column index of the first coverage column, when the sheet was annotated.
    pub annotation_start: Option<usize>,
    pub rows: Vec<SheetRow>,
}

impl AnnotatedSheet {
    /// A sheet copied through unchanged.
    pub fn plain(document: &Document) -> Self {
        Self {
            name: document.name.clone(),
            annotation_start: None,
            rows: document
                .rows
                .iter()
                .map(|r| SheetRow::Cells(r.iter().map(Cell::plain).collect()))
                .collect(),
        }
    }
}

/// Build the annotated sheet for a document and its reconciliation outcomes.
///
/// Coverage columns are appended after the widest source row, or written over
/// the existing block when the header already carries the coverage column (a
/// document annotated before). Matched rows get all five fields; unmatched rows
/// get [`NOT_MAPPED`] in the first one. Rows without an outcome (header, blank
/// identifier) only gain empty cells.
pub fn annotate(
    document: &Document,
    outcomes: &[RowOutcome<'_>],
    columns: &AnnotationColumns,
) -> AnnotatedSheet {
    let start = annotation_block_start(document, columns);
    let by_position: HashMap<usize, &RowOutcome<'_>> =
        outcomes.iter().map(|o| (o.position(), o)).collect();

    let rows = document
        .rows
        .iter()
        .enumerate()
        .map(|(i, source)| {
            let mut cells: Vec<Cell> = source.iter().map(Cell::plain).collect();
            if cells.len() < start {
                cells.resize(start, Cell::plain(""));
            }

            if i == 0 {
                let names = columns
                    .names()
                    .into_iter()
                    .map(|n| Cell::new(n, CellStyle::Header))
                    .collect();
                place(&mut cells, start, names);
            } else if let Some(outcome) = by_position.get(&(i + 1)) {
                place(&mut cells, start, annotation_cells(outcome));
            }
            SheetRow::Cells(cells)
        })
        .collect();

    AnnotatedSheet {
        name: document.name.clone(),
        annotation_start: Some(start),
        rows,
    }
}

fn annotation_block_start(document: &Document, columns: &AnnotationColumns) -> usize {
    match existing_annotation_start(document, columns) {
        Some(existing) => {
            log::debug!(
                "sheet '{}': reusing coverage columns at index {existing}",
                document.name
            );
            existing
        }
        None => document.width(),
    }
}

/// Column of the coverage header left by an earlier run, if any.
pub fn existing_annotation_start(document: &Document, columns: &AnnotationColumns) -> Option<usize> {
    document.header().iter().position(|h| h.trim() == columns.coverage)
}

/// Write `block` from `start`, blanking stale cells of a shorter block.
fn place(cells: &mut Vec<Cell>, start: usize, block: Vec<Cell>) {
    let written = block.len();
    for (k, cell) in block.into_iter().enumerate() {
        match cells.get_mut(start + k) {
            Some(slot) => *slot = cell,
            None => cells.push(cell),
        }
    }
    let end = (start + ANNOTATION_WIDTHS.len()).min(cells.len());
    for slot in cells.iter_mut().take(end).skip(start + written) {
        *slot = Cell::plain("");
    }
}

fn annotation_cells(outcome: &RowOutcome<'_>) -> Vec<Cell> {
    let RowOutcome::Matched(row) = outcome else {
        return vec![Cell::new(NOT_MAPPED, CellStyle::Centered)];
    };
    let record = row.record;

    let opportunity_style = if opportunity_emphasis(record) {
        CellStyle::Emphasis
    } else {
        CellStyle::Wrapped
    };

    let priority_style = if row.tier == SeverityTier::Critical {
        CellStyle::PriorityCritical
    } else if priority_flags_custom_policy(record) {
        CellStyle::PriorityOpportunity
    } else {
        CellStyle::Wrapped
    };

    vec![
        Cell::new(record.coverage.as_str(), CellStyle::for_coverage(record.coverage)),
        Cell::new(&record.platform_coverage, CellStyle::Wrapped),
        Cell::new(&record.implementation, CellStyle::Wrapped),
        Cell::new(&record.opportunity, opportunity_style),
        Cell::new(&record.priority, priority_style),
    ]
}

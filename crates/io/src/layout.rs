// Spacer rows between processed document rows.

use crate::annotate::{existing_annotation_start, AnnotatedSheet, AnnotationColumns, SheetRow};
use crate::document::Document;

/// Row height of a spacer, in points.
pub const SPACER_HEIGHT: f64 = 6.0;

/// Insert a spacer after each given 1-based sheet position.
///
/// Inserting shifts every later row down, so positions are applied from the
/// highest to the lowest; each insertion then leaves the remaining (lower)
/// positions valid. Positions beyond the sheet are ignored. Returns the number
/// of spacers inserted.
pub fn insert_spacers(sheet: &mut AnnotatedSheet, positions: &[usize]) -> usize {
    let mut ordered: Vec<usize> = positions.to_vec();
    ordered.sort_unstable();
    ordered.dedup();

    let mut inserted = 0;
    for &position in ordered.iter().rev() {
        if position == 0 || position > sheet.rows.len() {
            log::debug!("spacer position {position} outside sheet, skipped");
            continue;
        }
        sheet.rows.insert(position, SheetRow::Spacer);
        inserted += 1;
    }
    inserted
}

/// 0-based indices of spacer rows, for setting their height.
pub fn spacer_rows(sheet: &AnnotatedSheet) -> Vec<usize> {
    sheet
        .rows
        .iter()
        .enumerate()
        .filter(|(_, r)| matches!(r, SheetRow::Spacer))
        .map(|(i, _)| i)
        .collect()
}

/// Drop the spacers an earlier run left in an annotated document.
///
/// Spacers read back as fully blank rows, so every run of blank rows directly
/// below a row with a control identifier is removed. Documents without the
/// coverage header are left alone. Returns the number of rows removed.
pub fn strip_spacer_rows(
    document: &mut Document,
    column: usize,
    columns: &AnnotationColumns,
) -> usize {
    if existing_annotation_start(document, columns).is_none() {
        return 0;
    }

    let before = document.rows.len();
    let mut below_control = false;
    let mut kept = Vec::with_capacity(before);
    for (i, row) in std::mem::take(&mut document.rows).into_iter().enumerate() {
        let blank = row.iter().all(|c| c.trim().is_empty());
        if i > 0 && blank && below_control {
            continue;
        }
        below_control = i > 0 && row.get(column).is_some_and(|c| !c.trim().is_empty());
        kept.push(row);
    }
    document.rows = kept;

    let removed = before - document.rows.len();
    if removed > 0 {
        log::debug!("sheet '{}': dropped {removed} old spacer rows", document.name);
    }
    removed
}

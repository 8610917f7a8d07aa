use crate::aggregate::aggregate;
use crate::catalogue::Catalogue;
use crate::classify::classify;
use crate::control_id::normalize;
use crate::model::{
    AnnotatedRow, DocumentRow, ReconMeta, ReconResult, RowOutcome, UnmatchedMarker,
};
use crate::summary::compute_summary;

/// Reconcile document rows against the catalogue.
///
/// One outcome per input row, in input order. Rows are never dropped or
/// deduplicated: a control repeated on several rows is annotated on each.
///
/// Callers that mutate the source document by row index based on these
/// outcomes (inserting spacer rows, for instance) must apply the mutations
/// from the highest position to the lowest so earlier positions stay valid.
pub fn reconcile<'kb>(rows: &[DocumentRow], catalogue: &'kb Catalogue) -> Vec<RowOutcome<'kb>> {
    rows.iter().map(|row| reconcile_row(row, catalogue)).collect()
}

/// Reconcile a single row.
pub fn reconcile_row<'kb>(row: &DocumentRow, catalogue: &'kb Catalogue) -> RowOutcome<'kb> {
    let unmatched = || {
        RowOutcome::Unmatched(UnmatchedMarker {
            position: row.position,
            raw: row.raw_identifier.clone(),
        })
    };

    let Some(control) = normalize(&row.raw_identifier) else {
        log::debug!("row {}: no control identifier in {:?}", row.position, row.raw_identifier);
        return unmatched();
    };

    match catalogue.lookup(&control) {
        Some(record) => RowOutcome::Matched(AnnotatedRow {
            position: row.position,
            tier: classify(record),
            control,
            record,
        }),
        None => {
            log::debug!("row {}: {control} not in catalogue", row.position);
            unmatched()
        }
    }
}

/// Reconcile rows and bundle the outcomes with run metadata, the row summary,
/// and catalogue-wide statistics.
pub fn run<'kb>(catalogue: &'kb Catalogue, rows: &[DocumentRow]) -> ReconResult<'kb> {
    let outcomes = reconcile(rows, catalogue);
    let summary = compute_summary(&outcomes);
    log::info!(
        "reconciled {} rows: {} matched, {} not mapped",
        summary.processed,
        summary.matched,
        summary.unmatched
    );

    ReconResult {
        meta: ReconMeta {
            catalogue_size: catalogue.len(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
        },
        summary,
        statistics: aggregate(catalogue),
        rows: outcomes,
    }
}

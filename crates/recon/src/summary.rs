use crate::model::{ReconcileSummary, RowOutcome};

/// Compute summary counts from reconciled rows.
pub fn compute_summary(outcomes: &[RowOutcome<'_>]) -> ReconcileSummary {
    let matched = outcomes.iter().filter(|o| o.is_matched()).count();

    ReconcileSummary {
        processed: outcomes.len(),
        matched,
        unmatched: outcomes.len() - matched,
    }
}

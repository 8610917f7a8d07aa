use crate::catalogue::Catalogue;
use crate::model::{ComplianceRecord, Coverage, CoverageStatistics};

/// Phrases that flag an actionable custom-policy recommendation.
/// Compared against the uppercased priority and opportunity text together.
pub const OPPORTUNITY_PHRASES: &[&str] = &["CUSTOM POLICY OPPORTUNITY", "CREATE POLICY"];

/// Single pass over the catalogue: counts per coverage value, opportunity count,
/// and the weighted coverage percentage (partial coverage counts half).
pub fn aggregate(catalogue: &Catalogue) -> CoverageStatistics {
    let mut yes = 0;
    let mut partial = 0;
    let mut no = 0;
    let mut opportunities = 0;

    for (_, record) in catalogue.iter() {
        match record.coverage {
            Coverage::Yes => yes += 1,
            Coverage::Partial => partial += 1,
            Coverage::No => no += 1,
        }
        if has_opportunity(record) {
            opportunities += 1;
        }
    }

    let total = catalogue.len();
    let percentage = if total == 0 {
        0.0
    } else {
        round1((yes as f64 + 0.5 * partial as f64) / total as f64 * 100.0)
    };

    CoverageStatistics {
        total,
        yes,
        partial,
        no,
        opportunities,
        percentage,
    }
}

/// Whether a record exposes an actionable custom-policy recommendation.
///
/// Both fields are tested: some records flag the opportunity only in `priority`.
pub fn has_opportunity(record: &ComplianceRecord) -> bool {
    let text = format!("{}\n{}", record.priority, record.opportunity).to_uppercase();
    OPPORTUNITY_PHRASES.iter().any(|phrase| text.contains(phrase))
}

/// Round to one decimal place, ties away from zero.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

impl CoverageStatistics {
    /// Share of `count` in the catalogue as a one-decimal percentage.
    pub fn share(&self, count: usize) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            round1(count as f64 / self.total as f64 * 100.0)
        }
    }
}

use serde::Serialize;

use crate::control_id::ControlId;

// ---------------------------------------------------------------------------
// Catalogue records
// ---------------------------------------------------------------------------

/// Whether a control is satisfied by the managing platform/policy layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Coverage {
    Yes,
    Partial,
    No,
}

impl Coverage {
    /// Parse a catalogue coverage value. Case-insensitive, surrounding whitespace ignored.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "YES" => Some(Self::Yes),
            "PARTIAL" => Some(Self::Partial),
            "NO" => Some(Self::No),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Yes => "YES",
            Self::Partial => "PARTIAL",
            Self::No => "NO",
        }
    }
}

impl std::fmt::Display for Coverage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One catalogue entry, keyed by canonical control id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComplianceRecord {
    pub coverage: Coverage,
    /// Policy set(s) providing coverage, or "N/A".
    pub policy: String,
    /// Detection/monitoring coverage and its completeness, with a one-line rationale.
    pub platform_coverage: String,
    pub implementation: String,
    /// Possible custom remediation action, or "N/A".
    pub opportunity: String,
    /// Free-text priority classification, parsed by the classifier.
    pub priority: String,
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Presentation/priority tier derived from a record.
///
/// Variant order is severity order: `Critical < High < Normal` sorts the most
/// urgent first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SeverityTier {
    Critical,
    High,
    Normal,
}

impl std::fmt::Display for SeverityTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Critical => write!(f, "critical"),
            Self::High => write!(f, "high"),
            Self::Normal => write!(f, "normal"),
        }
    }
}

// ---------------------------------------------------------------------------
// Reconciliation input/output
// ---------------------------------------------------------------------------

/// One row of the external document: its 1-based position and raw identifier cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRow {
    pub position: usize,
    pub raw_identifier: String,
}

impl DocumentRow {
    pub fn new(position: usize, raw_identifier: impl Into<String>) -> Self {
        Self {
            position,
            raw_identifier: raw_identifier.into(),
        }
    }
}

/// A document row that matched a catalogue entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnotatedRow<'kb> {
    pub position: usize,
    pub control: ControlId,
    pub record: &'kb ComplianceRecord,
    pub tier: SeverityTier,
}

/// A document row with no parseable identifier or no catalogue entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnmatchedMarker {
    pub position: usize,
    pub raw: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RowOutcome<'kb> {
    Matched(AnnotatedRow<'kb>),
    Unmatched(UnmatchedMarker),
}

impl<'kb> RowOutcome<'kb> {
    pub fn position(&self) -> usize {
        match self {
            Self::Matched(row) => row.position,
            Self::Unmatched(marker) => marker.position,
        }
    }

    pub fn as_matched(&self) -> Option<&AnnotatedRow<'kb>> {
        match self {
            Self::Matched(row) => Some(row),
            Self::Unmatched(_) => None,
        }
    }

    pub fn is_matched(&self) -> bool {
        matches!(self, Self::Matched(_))
    }
}

// ---------------------------------------------------------------------------
// Statistics + Output
// ---------------------------------------------------------------------------

/// Catalogue-wide coverage statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoverageStatistics {
    pub total: usize,
    pub yes: usize,
    pub partial: usize,
    pub no: usize,
    pub opportunities: usize,
    /// `(yes + 0.5 * partial) / total * 100`, one decimal.
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconcileSummary {
    pub processed: usize,
    pub matched: usize,
    pub unmatched: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconResult<'kb> {
    pub meta: ReconMeta,
    pub summary: ReconcileSummary,
    pub statistics: CoverageStatistics,
    pub rows: Vec<RowOutcome<'kb>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconMeta {
    pub catalogue_size: usize,
    pub engine_version: String,
    pub run_at: String,
}

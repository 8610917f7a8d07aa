//! `covmap-recon`: control catalogue reconciliation engine.
//!
//! Pure engine crate: owns the compliance catalogue, normalizes free-text
//! control identifiers, reconciles document rows against the catalogue, and
//! aggregates coverage statistics. No spreadsheet or CLI dependencies.

pub mod aggregate;
pub mod catalogue;
pub mod classify;
pub mod control_id;
pub mod effects;
pub mod engine;
pub mod error;
pub mod model;
pub mod report;
pub mod summary;

pub use aggregate::aggregate;
pub use catalogue::{Catalogue, ReportContent};
pub use classify::classify;
pub use control_id::{normalize, ControlId};
pub use engine::{reconcile, run};
pub use error::CoverageError;
pub use model::{
    AnnotatedRow, ComplianceRecord, Coverage, CoverageStatistics, DocumentRow, ReconResult,
    ReconcileSummary, RowOutcome, SeverityTier, UnmatchedMarker,
};
pub use report::{assemble, CoverageReport, LineKind, SummaryLine};

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::control_id::ControlId;
use crate::error::CoverageError;
use crate::model::{ComplianceRecord, Coverage};

/// Catalogue shipped with the binary.
pub const BUILTIN_CATALOGUE: &str = include_str!("../data/catalogue.toml");

const DEFAULT_TITLE: &str = "Control Coverage Analysis";

// ---------------------------------------------------------------------------
// On-disk shape
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CatalogueFile {
    #[serde(default)]
    report: ReportSection,
    controls: BTreeMap<String, RawRecord>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ReportSection {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    quick_wins: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawRecord {
    coverage: String,
    policy: String,
    platform_coverage: String,
    implementation: String,
    opportunity: String,
    priority: String,
}

// ---------------------------------------------------------------------------
// Catalogue
// ---------------------------------------------------------------------------

/// Static narrative content carried alongside the records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportContent {
    pub title: String,
    pub quick_wins: Vec<String>,
}

impl Default for ReportContent {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            quick_wins: Vec::new(),
        }
    }
}

/// Immutable mapping from canonical control id to compliance record.
///
/// Built once and validated at construction; never mutated afterwards, so a
/// shared reference can back any number of reconciliation runs.
#[derive(Debug, Clone)]
pub struct Catalogue {
    records: BTreeMap<ControlId, ComplianceRecord>,
    report: ReportContent,
}

impl Catalogue {
    /// The embedded catalogue.
    pub fn builtin() -> Result<Self, CoverageError> {
        Self::from_toml(BUILTIN_CATALOGUE)
    }

    pub fn load(path: &Path) -> Result<Self, CoverageError> {
        let input = std::fs::read_to_string(path)
            .map_err(|e| CoverageError::Io(format!("cannot read {}: {e}", path.display())))?;
        Self::from_toml(&input)
    }

    pub fn from_toml(input: &str) -> Result<Self, CoverageError> {
        let file: CatalogueFile =
            toml::from_str(input).map_err(|e| CoverageError::CatalogueParse(e.to_string()))?;

        let mut records = BTreeMap::new();
        for (key, raw) in file.controls {
            let control = ControlId::parse(&key)?;
            let record = validate_record(&key, raw)?;
            records.insert(control, record);
        }

        let report = ReportContent {
            title: file
                .report
                .title
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            quick_wins: file.report.quick_wins,
        };

        log::debug!("catalogue loaded: {} controls", records.len());
        Ok(Self { records, report })
    }

    /// Build from already-typed records (synthetic catalogues, tests).
    pub fn from_records(records: impl IntoIterator<Item = (ControlId, ComplianceRecord)>) -> Self {
        Self {
            records: records.into_iter().collect(),
            report: ReportContent::default(),
        }
    }

    pub fn with_report(mut self, report: ReportContent) -> Self {
        self.report = report;
        self
    }

    pub fn lookup(&self, id: &ControlId) -> Option<&ComplianceRecord> {
        self.records.get(id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in natural control order.
    pub fn iter(&self) -> impl Iterator<Item = (&ControlId, &ComplianceRecord)> {
        self.records.iter()
    }

    pub fn report(&self) -> &ReportContent {
        &self.report
    }
}

fn validate_record(key: &str, raw: RawRecord) -> Result<ComplianceRecord, CoverageError> {
    let invalid = |reason: String| CoverageError::InvalidRecord {
        control: key.to_string(),
        reason,
    };

    let coverage = Coverage::parse(&raw.coverage).ok_or_else(|| {
        invalid(format!(
            "coverage must be YES, PARTIAL or NO, got '{}'",
            raw.coverage
        ))
    })?;

    if raw.priority.trim().is_empty() {
        return Err(invalid("priority must not be empty".into()));
    }

    Ok(ComplianceRecord {
        coverage,
        policy: raw.policy,
        platform_coverage: raw.platform_coverage,
        implementation: raw.implementation,
        opportunity: raw.opportunity,
        priority: raw.priority,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const SMALL: &str = r#"
[report]
title = "Test Coverage"
quick_wins = ["Tag everything"]

[controls."AC-6"]
coverage = "YES"
policy = "NIST 800-53 & MCSB"
platform_coverage = "YES - monitored"
implementation = "RBAC"
opportunity = "Create deny policy for dangerous role assignments"
priority = "IMPLEMENTED - CUSTOM DENY POLICY RECOMMENDED"

[controls."CP-9"]
coverage = "no"
policy = "N/A"
platform_coverage = "YES - MDC recommends Azure Backup"
implementation = "Customer responsibility"
opportunity = "CREATE POLICY TO ENFORCE AZURE BACKUP ON ALL VMs AND DATABASES - HIGH PRIORITY!"
priority = "CRITICAL - CUSTOM BACKUP POLICY REQUIRED"
"#;

    #[test]
    fn parse_small_catalogue() {
        let cat = Catalogue::from_toml(SMALL).unwrap();
        assert_eq!(cat.len(), 2);
        assert_eq!(cat.report().title, "Test Coverage");
        assert_eq!(cat.report().quick_wins, vec!["Tag everything"]);

        let cp9 = cat.lookup(&ControlId::parse("CP-9").unwrap()).unwrap();
        assert_eq!(cp9.coverage, Coverage::No);
        assert!(cat.lookup(&ControlId::parse("CP-10").unwrap()).is_none());
    }

    #[test]
    fn builtin_catalogue_is_valid() {
        let cat = Catalogue::builtin().unwrap();
        assert!(cat.len() >= 70, "builtin catalogue has {} controls", cat.len());
        assert!(!cat.report().quick_wins.is_empty());
        let ac6 = cat.lookup(&ControlId::parse("AC-6(10)").unwrap()).unwrap();
        assert_eq!(ac6.coverage, Coverage::Yes);
    }

    #[test]
    fn iteration_is_in_natural_order() {
        let cat = Catalogue::builtin().unwrap();
        let ids: Vec<&ControlId> = cat.iter().map(|(id, _)| id).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
    }

    #[test]
    fn reject_bad_coverage() {
        let input = SMALL.replace("coverage = \"no\"", "coverage = \"MAYBE\"");
        let err = Catalogue::from_toml(&input).unwrap_err();
        assert!(matches!(err, CoverageError::InvalidRecord { ref control, .. } if control == "CP-9"));
        assert!(err.to_string().contains("MAYBE"));
    }

    #[test]
    fn reject_non_canonical_key() {
        let input = SMALL.replace("[controls.\"CP-9\"]", "[controls.\"cp9\"]");
        let err = Catalogue::from_toml(&input).unwrap_err();
        assert_eq!(err, CoverageError::InvalidControlId("cp9".into()));
    }

    #[test]
    fn reject_missing_field() {
        let input = SMALL.replace("implementation = \"RBAC\"\n", "");
        let err = Catalogue::from_toml(&input).unwrap_err();
        assert!(matches!(err, CoverageError::CatalogueParse(_)));
    }

    #[test]
    fn reject_empty_priority() {
        let input = SMALL.replace(
            "priority = \"IMPLEMENTED - CUSTOM DENY POLICY RECOMMENDED\"",
            "priority = \"  \"",
        );
        let err = Catalogue::from_toml(&input).unwrap_err();
        assert!(err.to_string().contains("priority"));
    }

    #[test]
    fn missing_report_section_uses_default_title() {
        let input = SMALL.replace("[report]\ntitle = \"Test Coverage\"\nquick_wins = [\"Tag everything\"]\n", "");
        let cat = Catalogue::from_toml(&input).unwrap();
        assert_eq!(cat.report().title, DEFAULT_TITLE);
        assert!(cat.report().quick_wins.is_empty());
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalogue.toml");
        std::fs::write(&path, SMALL).unwrap();
        let cat = Catalogue::load(&path).unwrap();
        assert_eq!(cat.len(), 2);

        let err = Catalogue::load(&dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(err, CoverageError::Io(_)));
    }
}

use std::collections::BTreeSet;

use covmap_recon::catalogue::Catalogue;
use covmap_recon::classify::{classify, matching_rule};
use covmap_recon::control_id::{normalize, ControlId};
use covmap_recon::effects::{fill_effects, recommend, EffectStrategy};
use covmap_recon::engine::{reconcile, run};
use covmap_recon::model::{
    ComplianceRecord, Coverage, DocumentRow, RowOutcome, SeverityTier, UnmatchedMarker,
};
use covmap_recon::report::{assemble, LineKind, DEFAULT_MAX_ACTIONS};

fn builtin() -> Catalogue {
    Catalogue::builtin().unwrap()
}

fn id(s: &str) -> ControlId {
    ControlId::parse(s).unwrap()
}

fn record(coverage: Coverage, priority: &str, opportunity: &str) -> ComplianceRecord {
    ComplianceRecord {
        coverage,
        policy: "N/A".into(),
        platform_coverage: "N/A".into(),
        implementation: "N/A".into(),
        opportunity: opportunity.into(),
        priority: priority.into(),
    }
}

// -------------------------------------------------------------------------
// Classification
// -------------------------------------------------------------------------

#[test]
fn recommended_deny_policy_is_normal() {
    let r = record(
        Coverage::Yes,
        "IMPLEMENTED - CUSTOM DENY POLICY RECOMMENDED",
        "Create deny policy...",
    );
    assert_eq!(classify(&r), SeverityTier::Normal);
}

#[test]
fn critical_rule_fires_first() {
    let r = record(
        Coverage::No,
        "CRITICAL - CUSTOM BACKUP POLICY REQUIRED",
        "CREATE POLICY TO ENFORCE AZURE BACKUP ON ALL VMs AND DATABASES - HIGH PRIORITY!",
    );
    assert_eq!(classify(&r), SeverityTier::Critical);
    assert_eq!(matching_rule(&r).unwrap().name, "critical_priority");
}

#[test]
fn builtin_tiers() {
    let cat = builtin();
    let tier = |s: &str| classify(cat.lookup(&id(s)).unwrap());
    assert_eq!(tier("CP-9"), SeverityTier::Critical);
    assert_eq!(tier("SI-10"), SeverityTier::High);
    assert_eq!(tier("AC-5"), SeverityTier::Normal);
    // Tagging opportunities whose priority mentions CRITICALITY
    assert_eq!(tier("CP-2(8)"), SeverityTier::Critical);
    assert_eq!(tier("RA-9"), SeverityTier::Critical);
}

// -------------------------------------------------------------------------
// Normalization + reconciliation
// -------------------------------------------------------------------------

#[test]
fn enhancement_in_free_text() {
    assert_eq!(
        normalize("AC-6(10) — privilege escalation"),
        Some(id("AC-6(10)"))
    );
}

#[test]
fn section_header_is_unmatched() {
    let cat = builtin();
    assert_eq!(normalize("Section Header: Access Control"), None);
    let out = reconcile(&[DocumentRow::new(2, "Section Header: Access Control")], &cat);
    assert_eq!(
        out,
        vec![RowOutcome::Unmatched(UnmatchedMarker {
            position: 2,
            raw: "Section Header: Access Control".into(),
        })]
    );
}

#[test]
fn builtin_document_run() {
    let cat = builtin();
    let rows = vec![
        DocumentRow::new(2, "Access Control"),
        DocumentRow::new(3, "AC-5 Separation of Duties"),
        DocumentRow::new(4, "AC-6(10)"),
        DocumentRow::new(5, "ZZ-99"),
        DocumentRow::new(6, "cp-9"),
        DocumentRow::new(7, "CP-9 Information System Backup"),
    ];
    let result = run(&cat, &rows);

    assert_eq!(result.rows.len(), rows.len());
    assert_eq!(result.summary.processed, 6);
    assert_eq!(result.summary.matched, 3);
    assert_eq!(result.summary.unmatched, 3);
    assert_eq!(result.meta.catalogue_size, 71);

    let matched: Vec<(usize, &str)> = result
        .rows
        .iter()
        .filter_map(|o| o.as_matched())
        .map(|a| (a.position, a.control.as_str()))
        .collect();
    assert_eq!(matched, vec![(3, "AC-5"), (4, "AC-6(10)"), (7, "CP-9")]);
}

// -------------------------------------------------------------------------
// Aggregation + report
// -------------------------------------------------------------------------

#[test]
fn weighted_percentage_example() {
    let cat = Catalogue::from_records(vec![
        (id("AC-1"), record(Coverage::Yes, "IMPLEMENTED", "N/A")),
        (id("AC-2"), record(Coverage::Yes, "IMPLEMENTED", "N/A")),
        (id("AC-3"), record(Coverage::Partial, "IMPLEMENTED", "N/A")),
    ]);
    let stats = covmap_recon::aggregate(&cat);
    assert_eq!((stats.total, stats.yes, stats.partial, stats.no), (3, 2, 1, 0));
    assert_eq!(stats.percentage, 83.3);
}

#[test]
fn builtin_report_lines() {
    let cat = builtin();
    let at = chrono::NaiveDate::from_ymd_opt(2026, 1, 15)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap();
    let report = assemble(&cat, at, DEFAULT_MAX_ACTIONS);
    assert_eq!(report.title, "EPAC & MDC Coverage Analysis");
    assert_eq!(report.statistics.percentage, 43.0);
    assert!(report.priority_actions.len() <= DEFAULT_MAX_ACTIONS);
    assert_eq!(report.priority_actions[0].tier, SeverityTier::Critical);

    let lines = report.lines();
    let score = lines
        .iter()
        .find(|l| l.label == "Overall Coverage Score:")
        .unwrap();
    assert_eq!(score.value, "43.0%");
    let yes = lines.iter().find(|l| l.label == "Fully Covered (YES):").unwrap();
    assert_eq!(yes.value, "30 (42.3%)");
    assert!(lines.iter().any(|l| l.kind == LineKind::Critical));
}

// -------------------------------------------------------------------------
// Effects
// -------------------------------------------------------------------------

#[test]
fn effect_recommendations() {
    let allowed: BTreeSet<String> = ["Audit", "Deny"].iter().map(|s| s.to_string()).collect();
    assert_eq!(recommend(&allowed, "Disabled"), "Audit");

    let deny_only: BTreeSet<String> = std::iter::once("Deny".to_string()).collect();
    assert_eq!(recommend(&deny_only, "AuditIfNotExists"), "AuditIfNotExists");
}

#[test]
fn effects_file_with_crlf_and_extra_columns() {
    let csv = "category,name,defaultEffect,allowedEffects,prodEffect,nonprodEffect,notes\r\n\
               Storage,geo,Disabled,\"Audit, Deny, Disabled\",,,keep me\r\n";
    let out = fill_effects(csv, &EffectStrategy::Same, &"disabled".parse::<EffectStrategy>().unwrap()).unwrap();
    assert_eq!(out.updated, 1);
    let row = out.csv.lines().nth(1).unwrap();
    assert_eq!(row, "Storage,geo,Disabled,\"Audit, Deny, Disabled\",Audit,Disabled,keep me");
}

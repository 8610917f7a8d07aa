use crate::model::{ComplianceRecord, SeverityTier};

/// A named classification rule. Rules are evaluated in table order; the first
/// whose predicate holds decides the tier.
pub struct TierRule {
    pub name: &'static str,
    pub tier: SeverityTier,
    pub predicate: fn(&ComplianceRecord) -> bool,
}

impl std::fmt::Debug for TierRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TierRule")
            .field("name", &self.name)
            .field("tier", &self.tier)
            .finish()
    }
}

/// Classification rules, first match wins. The last rule always matches.
pub const TIER_RULES: &[TierRule] = &[
    TierRule {
        name: "critical_priority",
        tier: SeverityTier::Critical,
        predicate: priority_is_critical,
    },
    TierRule {
        name: "high_priority_opportunity",
        tier: SeverityTier::High,
        predicate: opportunity_is_high_priority,
    },
    TierRule {
        name: "custom_policy_opportunity",
        tier: SeverityTier::High,
        predicate: priority_flags_custom_policy,
    },
    TierRule {
        name: "default",
        tier: SeverityTier::Normal,
        predicate: always,
    },
];

fn always(_: &ComplianceRecord) -> bool {
    true
}

/// Classify a record into exactly one severity tier.
pub fn classify(record: &ComplianceRecord) -> SeverityTier {
    matching_rule(record)
        .map(|rule| rule.tier)
        .unwrap_or(SeverityTier::Normal)
}

/// The rule that decides `record`'s tier.
pub fn matching_rule(record: &ComplianceRecord) -> Option<&'static TierRule> {
    TIER_RULES.iter().find(|rule| (rule.predicate)(record))
}

/// `CRITICAL` anywhere in the priority text, case-sensitive, so
/// `CRITICALITY` counts too.
pub fn priority_is_critical(record: &ComplianceRecord) -> bool {
    record.priority.contains("CRITICAL")
}

pub fn opportunity_is_high_priority(record: &ComplianceRecord) -> bool {
    record.opportunity.to_uppercase().contains("HIGH PRIORITY")
}

pub fn priority_flags_custom_policy(record: &ComplianceRecord) -> bool {
    record.priority.contains("CUSTOM POLICY OPPORTUNITY")
}

/// Whether the opportunity cell should be emphasized when rendered.
pub fn opportunity_emphasis(record: &ComplianceRecord) -> bool {
    opportunity_is_high_priority(record) || priority_is_critical(record)
}

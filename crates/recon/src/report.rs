//! Summary content model: statistics plus the priority-action narrative.
//!
//! Priority actions are computed from classifier tiers over the live catalogue
//! (Critical first, then High, each in natural control order), so the narrative
//! cannot drift from the records. Quick wins are curated text carried by the
//! catalogue itself.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::aggregate::aggregate;
use crate::catalogue::Catalogue;
use crate::classify::classify;
use crate::control_id::ControlId;
use crate::model::{CoverageStatistics, SeverityTier};

pub const DEFAULT_MAX_ACTIONS: usize = 10;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriorityAction {
    pub rank: usize,
    pub control: ControlId,
    pub tier: SeverityTier,
    /// The record's priority text.
    pub headline: String,
    /// The record's opportunity note.
    pub detail: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CoverageReport {
    pub title: String,
    pub generated_at: String,
    pub statistics: CoverageStatistics,
    pub priority_actions: Vec<PriorityAction>,
    pub quick_wins: Vec<String>,
}

/// Kind of a rendered summary line, used by renderers for emphasis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LineKind {
    Title,
    Section,
    Item,
    Critical,
    High,
    Blank,
}

/// One two-column row of the summary view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryLine {
    pub kind: LineKind,
    pub label: String,
    pub value: String,
}

impl SummaryLine {
    fn new(kind: LineKind, label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            kind,
            label: label.into(),
            value: value.into(),
        }
    }

    fn blank() -> Self {
        Self::new(LineKind::Blank, "", "")
    }
}

/// Critical and High records, most urgent first, capped at `max_actions`.
pub fn priority_actions(catalogue: &Catalogue, max_actions: usize) -> Vec<PriorityAction> {
    let mut flagged: Vec<_> = catalogue
        .iter()
        .map(|(id, record)| (classify(record), id, record))
        .filter(|(tier, _, _)| *tier != SeverityTier::Normal)
        .collect();

    // Catalogue iteration is already in natural order; a stable sort on tier keeps it.
    flagged.sort_by_key(|(tier, _, _)| *tier);

    flagged
        .into_iter()
        .take(max_actions)
        .enumerate()
        .map(|(i, (tier, id, record))| PriorityAction {
            rank: i + 1,
            control: id.clone(),
            tier,
            headline: record.priority.clone(),
            detail: record.opportunity.clone(),
        })
        .collect()
}

/// Assemble the summary content model for a catalogue.
pub fn assemble(
    catalogue: &Catalogue,
    generated_at: NaiveDateTime,
    max_actions: usize,
) -> CoverageReport {
    CoverageReport {
        title: catalogue.report().title.clone(),
        generated_at: generated_at.format(TIMESTAMP_FORMAT).to_string(),
        statistics: aggregate(catalogue),
        priority_actions: priority_actions(catalogue, max_actions),
        quick_wins: catalogue.report().quick_wins.clone(),
    }
}

impl CoverageReport {
    /// Ordered two-column rows of the summary view.
    pub fn lines(&self) -> Vec<SummaryLine> {
        let s = &self.statistics;
        let count_with_share = |n: usize| format!("{n} ({:.1}%)", s.share(n));

        let mut lines = vec![
            SummaryLine::new(LineKind::Title, &self.title, ""),
            SummaryLine::new(LineKind::Item, "Generated:", &self.generated_at),
            SummaryLine::blank(),
            SummaryLine::new(LineKind::Section, "Overall Statistics", ""),
            SummaryLine::new(LineKind::Item, "Total Controls Analyzed:", s.total.to_string()),
            SummaryLine::new(LineKind::Item, "Fully Covered (YES):", count_with_share(s.yes)),
            SummaryLine::new(
                LineKind::Item,
                "Partially Covered (PARTIAL):",
                count_with_share(s.partial),
            ),
            SummaryLine::new(LineKind::Item, "Not Covered (NO):", count_with_share(s.no)),
            SummaryLine::new(
                LineKind::Item,
                "Overall Coverage Score:",
                format!("{:.1}%", s.percentage),
            ),
            SummaryLine::blank(),
            SummaryLine::new(LineKind::Section, "Custom Policy Opportunities", ""),
            SummaryLine::new(
                LineKind::Item,
                "Controls with Custom Policy Opportunities:",
                s.opportunities.to_string(),
            ),
            SummaryLine::blank(),
            SummaryLine::new(LineKind::Section, "Priority Actions", ""),
        ];

        for action in &self.priority_actions {
            let kind = match action.tier {
                SeverityTier::Critical => LineKind::Critical,
                SeverityTier::High => LineKind::High,
                SeverityTier::Normal => LineKind::Item,
            };
            lines.push(SummaryLine::new(
                kind,
                format!("{}. {}: {}", action.rank, action.control, action.headline),
                format!("{} - {}", action.tier.to_string().to_uppercase(), action.detail),
            ));
        }

        if !self.quick_wins.is_empty() {
            lines.push(SummaryLine::blank());
            lines.push(SummaryLine::new(LineKind::Section, "Quick Wins (Custom Policies)", ""));
            for win in &self.quick_wins {
                lines.push(SummaryLine::new(LineKind::Item, format!("• {win}"), ""));
            }
        }

        lines
    }
}

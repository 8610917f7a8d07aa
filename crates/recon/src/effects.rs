//! Policy effect recommendation for parameter CSVs.
//!
//! Fills blank `prodEffect` / `nonprodEffect` cells from each policy's default
//! and allowed effects.

use std::collections::BTreeSet;
use std::str::FromStr;

use serde::Serialize;

use crate::error::CoverageError;

pub const DISABLED: &str = "Disabled";

/// Preferred effects when the default is disabled, best first.
pub const EFFECT_PREFERENCE: [&str; 5] =
    ["AuditIfNotExists", "Audit", "Deny", "DeployIfNotExists", "Modify"];

pub const FALLBACK_EFFECT: &str = "Audit";

pub const PROD_COLUMN: &str = "prodEffect";
pub const NONPROD_COLUMN: &str = "nonprodEffect";
pub const ALLOWED_COLUMN: &str = "allowedEffects";
pub const DEFAULT_COLUMN: &str = "defaultEffect";

/// Recommend an effect for a policy.
///
/// The default is returned verbatim unless it is `Disabled` or blank, in which
/// case the first preferred effect present in `allowed` wins, falling back to
/// `Audit`.
pub fn recommend(allowed: &BTreeSet<String>, default: &str) -> String {
    let trimmed = default.trim();
    if !trimmed.is_empty() && trimmed != DISABLED {
        return default.to_string();
    }
    EFFECT_PREFERENCE
        .iter()
        .find(|effect| allowed.contains(**effect))
        .unwrap_or(&FALLBACK_EFFECT)
        .to_string()
}

/// Split an `allowedEffects` cell ("Audit, Deny") into a set of effect names.
pub fn parse_allowed_effects(cell: &str) -> BTreeSet<String> {
    cell.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// How to fill a blank effect cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EffectStrategy {
    /// Use the recommendation.
    Same,
    /// Write this effect regardless of the recommendation.
    Fixed(String),
}

impl Default for EffectStrategy {
    fn default() -> Self {
        Self::Same
    }
}

impl FromStr for EffectStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err("effect strategy must not be empty".into());
        }
        if s.eq_ignore_ascii_case("same") {
            return Ok(Self::Same);
        }
        // Canonicalize known effect names so `disabled` writes `Disabled`.
        let known = std::iter::once(DISABLED)
            .chain(EFFECT_PREFERENCE)
            .find(|effect| effect.eq_ignore_ascii_case(s));
        Ok(Self::Fixed(known.unwrap_or(s).to_string()))
    }
}

impl EffectStrategy {
    fn resolve(&self, recommendation: &str) -> String {
        match self {
            Self::Same => recommendation.to_string(),
            Self::Fixed(effect) => effect.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EffectsOutcome {
    /// Rewritten CSV document.
    #[serde(skip)]
    pub csv: String,
    /// Rows where at least one effect was blank and got filled.
    pub updated: usize,
    /// Rows that already had both effects.
    pub skipped: usize,
}

/// Fill blank effect cells in a parameters CSV. Header order and all other
/// columns are preserved.
pub fn fill_effects(
    csv_data: &str,
    prod: &EffectStrategy,
    nonprod: &EffectStrategy,
) -> Result<EffectsOutcome, CoverageError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(csv_data.as_bytes());

    let headers = reader.headers()?.clone();

    let idx = |name: &str| headers.iter().position(|h| h.trim() == name);
    let required = |name: &str| {
        idx(name).ok_or_else(|| CoverageError::MissingColumn {
            column: name.into(),
        })
    };

    let prod_idx = required(PROD_COLUMN)?;
    let nonprod_idx = required(NONPROD_COLUMN)?;
    let allowed_idx = idx(ALLOWED_COLUMN);
    let default_idx = idx(DEFAULT_COLUMN);

    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer.write_record(&headers)?;

    let mut updated = 0;
    let mut skipped = 0;

    for record in reader.records() {
        let record = record?;
        let mut fields: Vec<String> = record.iter().map(str::to_string).collect();
        if fields.len() < headers.len() {
            fields.resize(headers.len(), String::new());
        }

        let prod_blank = fields[prod_idx].trim().is_empty();
        let nonprod_blank = fields[nonprod_idx].trim().is_empty();

        if prod_blank || nonprod_blank {
            let cell = |i: Option<usize>| i.map(|i| fields[i].trim()).unwrap_or("");
            let allowed = parse_allowed_effects(cell(allowed_idx));
            let recommendation = recommend(&allowed, cell(default_idx));

            if prod_blank {
                fields[prod_idx] = prod.resolve(&recommendation);
            }
            if nonprod_blank {
                fields[nonprod_idx] = nonprod.resolve(&recommendation);
            }
            updated += 1;
        } else {
            skipped += 1;
        }

        writer.write_record(&fields)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| CoverageError::Csv(e.to_string()))?;
    let csv = String::from_utf8(bytes).map_err(|e| CoverageError::Csv(e.to_string()))?;

    log::debug!("effects: {updated} rows updated, {skipped} skipped");
    Ok(EffectsOutcome {
        csv,
        updated,
        skipped,
    })
}

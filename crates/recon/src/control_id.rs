//! Canonical control identifiers and the normalizer that pulls them out of free text.
//!
//! Canonical form: two uppercase ASCII letters, a hyphen, one or more digits, and an
//! optional parenthesized enhancement number (`AC-6`, `AC-6(10)`, `SI-4(2)`).

use std::cmp::Ordering;
use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::error::CoverageError;

const CONTROL_ID_PATTERN: &str = r"[A-Z]{2}-[0-9]+(?:\([0-9]+\))?";

fn search_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(CONTROL_ID_PATTERN).expect("control id pattern compiles"))
}

fn exact_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!("^{CONTROL_ID_PATTERN}$")).expect("control id pattern compiles")
    })
}

/// A canonical control identifier, used as the catalogue key.
///
/// Ordering is natural (family, number, enhancement), so `AC-6 < AC-6(1) < AC-18`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ControlId(String);

impl ControlId {
    /// Parse a string that must be exactly one canonical identifier.
    pub fn parse(s: &str) -> Result<Self, CoverageError> {
        if exact_regex().is_match(s) {
            Ok(Self(s.to_string()))
        } else {
            Err(CoverageError::InvalidControlId(s.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Two-letter control family (`AC`, `CP`, ...).
    pub fn family(&self) -> &str {
        &self.0[..2]
    }

    /// Base number and optional enhancement, parsed for ordering.
    pub fn sort_key(&self) -> (&str, u64, Option<u64>) {
        let rest = &self.0[3..];
        let (base, enhancement) = match rest.split_once('(') {
            Some((base, enh)) => (base, Some(enh.trim_end_matches(')'))),
            None => (rest, None),
        };
        let number = base.parse().unwrap_or(u64::MAX);
        let enhancement = enhancement.map(|e| e.parse().unwrap_or(u64::MAX));
        (self.family(), number, enhancement)
    }
}

impl fmt::Display for ControlId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialOrd for ControlId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ControlId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key()
            .cmp(&other.sort_key())
            .then_with(|| self.0.cmp(&other.0))
    }
}

/// Extract the first canonical identifier found anywhere in `raw`.
///
/// Blank input short-circuits to `None` without running the pattern search.
/// Matching is case-sensitive: `ac-6` is not an identifier.
pub fn normalize(raw: &str) -> Option<ControlId> {
    if raw.trim().is_empty() {
        return None;
    }
    search_regex()
        .find(raw)
        .map(|m| ControlId(m.as_str().to_string()))
}

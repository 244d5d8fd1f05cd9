use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    report::AnalysisResult,
    types::{Issue, Severity},
};

/// Severities the gate checks, highest priority first.
pub const GATE_ORDER: [Severity; 4] = [
    Severity::Blocker,
    Severity::Critical,
    Severity::Major,
    Severity::Minor,
];

/// Maximum number of new issues allowed per severity. `None` means no limit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thresholds {
    pub max_blockers: Option<u32>,
    pub max_vulnerabilities: Option<u32>,
    pub max_majors: Option<u32>,
    pub max_minors: Option<u32>,
}

impl Thresholds {
    pub fn limit_for(&self, severity: Severity) -> Option<u32> {
        match severity {
            Severity::Blocker => self.max_blockers,
            Severity::Critical => self.max_vulnerabilities,
            Severity::Major => self.max_majors,
            Severity::Minor => self.max_minors,
            Severity::Info | Severity::Other => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateViolation {
    pub severity: Severity,
    pub threshold: u32,
    pub actual: u64,
}

impl std::fmt::Display for GateViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Number of {} severity is greater than {}. Actual number is {}",
            self.severity,
            commas(u64::from(self.threshold)),
            commas(self.actual)
        )
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityCounts {
    pub blocker: u64,
    pub critical: u64,
    pub major: u64,
    pub minor: u64,
    pub info: u64,
    pub other: u64,
}

impl SeverityCounts {
    pub fn get(&self, severity: Severity) -> u64 {
        match severity {
            Severity::Blocker => self.blocker,
            Severity::Critical => self.critical,
            Severity::Major => self.major,
            Severity::Minor => self.minor,
            Severity::Info => self.info,
            Severity::Other => self.other,
        }
    }

    fn bump(&mut self, severity: Severity) {
        let slot = match severity {
            Severity::Blocker => &mut self.blocker,
            Severity::Critical => &mut self.critical,
            Severity::Major => &mut self.major,
            Severity::Minor => &mut self.minor,
            Severity::Info => &mut self.info,
            Severity::Other => &mut self.other,
        };
        *slot += 1;
    }
}

pub fn count_by_severity(issues: &[Issue]) -> SeverityCounts {
    let mut counts = SeverityCounts::default();
    for issue in issues {
        counts.bump(issue.severity);
    }
    counts
}

/// First threshold exceeded, scanning [`GATE_ORDER`].
pub fn first_violation(new_issues: &[Issue], thresholds: &Thresholds) -> Option<GateViolation> {
    GATE_ORDER.iter().find_map(|&severity| {
        let threshold = thresholds.limit_for(severity)?;
        let actual = new_issues
            .iter()
            .filter(|issue| issue.severity == severity)
            .count() as u64;

        debug!(%severity, actual, threshold, "quality gate check");

        (actual > u64::from(threshold)).then_some(GateViolation {
            severity,
            threshold,
            actual,
        })
    })
}

pub fn evaluate(new_issues: &[Issue], thresholds: &Thresholds) -> AnalysisResult {
    match first_violation(new_issues, thresholds) {
        Some(violation) => {
            debug!(%violation, "quality gate failed");
            AnalysisResult::error(violation.to_string())
        }
        None => AnalysisResult::success(),
    }
}

/// Groups digits in threes: `1234567` -> `1,234,567`.
pub fn commas(n: u64) -> String {
    let s = n.to_string();
    let bytes = s.as_bytes();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    for (i, &b) in bytes.iter().enumerate() {
        if i > 0 && (bytes.len() - i).is_multiple_of(3) {
            result.push(',');
        }
        result.push(b as char);
    }
    result
}

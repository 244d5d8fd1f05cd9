use serde::Serialize;

use crate::{
    gate::{commas, SeverityCounts, Thresholds, GATE_ORDER},
    types::Severity,
};

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnalysisStatus {
    Success,
    Info,
    Warn,
    Error,
}

impl std::fmt::Display for AnalysisStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            AnalysisStatus::Success => "SUCCESS",
            AnalysisStatus::Info => "INFO",
            AnalysisStatus::Warn => "WARN",
            AnalysisStatus::Error => "ERROR",
        })
    }
}

/// Outcome of one gate run.
///
/// `Success` never carries a message; the other states always carry a
/// non-empty one, falling back to a generic text when given a blank message.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AnalysisResult {
    status: AnalysisStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

impl AnalysisResult {
    pub fn success() -> Self {
        Self {
            status: AnalysisStatus::Success,
            message: None,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::with_message(AnalysisStatus::Info, message.into())
    }

    pub fn warn(message: impl Into<String>) -> Self {
        Self::with_message(AnalysisStatus::Warn, message.into())
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::with_message(AnalysisStatus::Error, message.into())
    }

    fn with_message(status: AnalysisStatus, message: String) -> Self {
        let message = if message.trim().is_empty() {
            format!("Quality gate returned {status} without details")
        } else {
            message
        };
        Self {
            status,
            message: Some(message),
        }
    }

    pub fn status(&self) -> AnalysisStatus {
        self.status
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn is_failure(&self) -> bool {
        self.status == AnalysisStatus::Error
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Inputs {
    pub report_location: String,
    pub resolved_path: String,
    pub preview_version: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct IssueSummary {
    pub total_issues: u64,
    pub new_issues: u64,
    pub new_by_severity: SeverityCounts,
}

#[derive(Debug, Clone, Serialize)]
pub struct GateReport {
    pub report_version: String,
    pub inputs: Inputs,
    pub thresholds: Thresholds,
    pub summary: IssueSummary,
    pub result: AnalysisResult,
}

impl GateReport {
    pub fn new(
        inputs: Inputs,
        thresholds: Thresholds,
        summary: IssueSummary,
        result: AnalysisResult,
    ) -> Self {
        Self {
            report_version: "0.1.0".to_string(),
            inputs,
            thresholds,
            summary,
            result,
        }
    }

    pub fn to_markdown(&self) -> String {
        let mut s = String::new();
        s.push_str("# previewgate report\n\n");
        s.push_str(&format!("- report_version: `{}`\n", self.report_version));
        s.push_str(&format!(
            "- report_location: `{}`\n",
            self.inputs.report_location
        ));
        s.push_str(&format!("- resolved_path: `{}`\n", self.inputs.resolved_path));
        if let Some(v) = &self.inputs.preview_version {
            s.push_str(&format!("- preview_version: `{}`\n", v));
        }
        s.push('\n');

        s.push_str("## New issues\n\n");
        s.push_str(&format!(
            "- total_issues: `{}`\n",
            commas(self.summary.total_issues)
        ));
        s.push_str(&format!(
            "- new_issues: `{}`\n",
            commas(self.summary.new_issues)
        ));
        s.push('\n');

        s.push_str("| severity | new | max |\n");
        s.push_str("|---|---|---|\n");
        for severity in GATE_ORDER {
            let max = self
                .thresholds
                .limit_for(severity)
                .map(|m| commas(u64::from(m)))
                .unwrap_or_else(|| "-".to_string());
            s.push_str(&format!(
                "| {} | {} | {} |\n",
                severity,
                commas(self.summary.new_by_severity.get(severity)),
                max
            ));
        }
        let info = self.summary.new_by_severity.get(Severity::Info);
        if info > 0 {
            s.push_str(&format!("| {} | {} | - |\n", Severity::Info, commas(info)));
        }
        s.push('\n');

        s.push_str("## Quality gate\n\n");
        s.push_str(&format!("- status: `{}`\n", self.result.status()));
        if let Some(m) = self.result.message() {
            s.push_str(&format!("- message: {}\n", m));
        }

        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(result: AnalysisResult) -> GateReport {
        GateReport::new(
            Inputs {
                report_location: "preview.json".to_string(),
                resolved_path: "target/sonar/preview.json".to_string(),
                preview_version: Some("5.6".to_string()),
            },
            Thresholds {
                max_blockers: Some(0),
                ..Thresholds::default()
            },
            IssueSummary {
                total_issues: 1500,
                new_issues: 1,
                new_by_severity: SeverityCounts {
                    blocker: 1,
                    ..SeverityCounts::default()
                },
            },
            result,
        )
    }

    #[test]
    fn markdown_includes_sections_and_gate_message() {
        let md = report(AnalysisResult::error(
            "Number of BLOCKER severity is greater than 0. Actual number is 1",
        ))
        .to_markdown();

        assert!(md.contains("## New issues"));
        assert!(md.contains("## Quality gate"));
        assert!(md.contains("- total_issues: `1,500`"));
        assert!(md.contains("| BLOCKER | 1 | 0 |"));
        assert!(md.contains("| MAJOR | 0 | - |"));
        assert!(md.contains("- status: `ERROR`"));
        assert!(md.contains("Actual number is 1"));
    }

    #[test]
    fn success_serializes_without_message() {
        let json = serde_json::to_value(AnalysisResult::success()).unwrap();
        assert_eq!(json, serde_json::json!({ "status": "SUCCESS" }));
    }

    #[test]
    fn blank_error_message_gets_a_default() {
        let result = AnalysisResult::error("");
        assert_eq!(result.status(), AnalysisStatus::Error);
        assert_eq!(
            result.message(),
            Some("Quality gate returned ERROR without details")
        );
        assert!(AnalysisResult::warn("  ").message().is_some_and(|m| !m.trim().is_empty()));
    }

    #[test]
    fn non_success_states_keep_their_message() {
        let warn = AnalysisResult::warn("careful");
        assert_eq!(warn.status(), AnalysisStatus::Warn);
        assert_eq!(warn.message(), Some("careful"));
        assert!(!warn.is_failure());

        let info = AnalysisResult::info("fyi");
        assert_eq!(info.message(), Some("fyi"));
        assert_eq!(info.status(), AnalysisStatus::Info);
        assert!(AnalysisResult::error("x").is_failure());
    }
}

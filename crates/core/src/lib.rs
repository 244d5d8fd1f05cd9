pub mod config;
pub mod error;
pub mod filter;
pub mod gate;
pub mod parser;
pub mod report;
pub mod types;

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::{
    error::LoadError,
    gate::{count_by_severity, Thresholds},
    parser::DEFAULT_MAX_REPORT_BYTES,
    report::{GateReport, Inputs, IssueSummary},
};

/// Everything one gate run needs. Built once, read only afterwards.
#[derive(Debug, Clone)]
pub struct QueryAnalysis {
    report_path: String,
    thresholds: Thresholds,
    resource_dirs: Vec<PathBuf>,
    max_report_bytes: u64,
}

impl QueryAnalysis {
    pub fn new(report_path: impl Into<String>, thresholds: Thresholds) -> Self {
        Self {
            report_path: report_path.into(),
            thresholds,
            resource_dirs: Vec::new(),
            max_report_bytes: DEFAULT_MAX_REPORT_BYTES,
        }
    }

    pub fn with_resource_dirs(mut self, dirs: Vec<PathBuf>) -> Self {
        self.resource_dirs = dirs;
        self
    }

    pub fn with_max_report_bytes(mut self, limit: u64) -> Self {
        self.max_report_bytes = limit;
        self
    }

    pub fn report_path(&self) -> &str {
        &self.report_path
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    pub fn resource_dirs(&self) -> &[PathBuf] {
        &self.resource_dirs
    }

    pub fn max_report_bytes(&self) -> u64 {
        self.max_report_bytes
    }
}

/// Loads the preview, keeps the new issues and runs the quality gate.
///
/// Only a report that cannot be loaded is an `Err`; a failed gate comes back
/// as an `ERROR` result inside the report.
pub fn process_analysis(query: &QueryAnalysis) -> Result<GateReport, LoadError> {
    let loaded = parser::load_preview(
        query.report_path(),
        query.resource_dirs(),
        query.max_report_bytes(),
    )?;

    let new_issues = filter::new_issues(Some(&loaded.preview));
    debug!(
        total = loaded.preview.issues.len(),
        new = new_issues.len(),
        "filtered new issues"
    );

    let result = gate::evaluate(&new_issues, query.thresholds());
    info!(status = %result.status(), "quality gate evaluated");

    Ok(GateReport::new(
        inputs(query.report_path(), &loaded.path, loaded.preview.version.clone()),
        *query.thresholds(),
        IssueSummary {
            total_issues: loaded.preview.issues.len() as u64,
            new_issues: new_issues.len() as u64,
            new_by_severity: count_by_severity(&new_issues),
        },
        result,
    ))
}

fn inputs(location: &str, resolved: &Path, preview_version: Option<String>) -> Inputs {
    Inputs {
        report_location: location.to_string(),
        resolved_path: resolved.display().to_string(),
        preview_version,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::AnalysisStatus;

    #[test]
    fn missing_report_is_a_load_error_not_a_result() {
        let query = QueryAnalysis::new(
            "definitely/not/here/preview.json",
            Thresholds {
                max_blockers: Some(0),
                ..Thresholds::default()
            },
        );
        let err = process_analysis(&query).unwrap_err();
        assert!(matches!(err, LoadError::NotFound { .. }));
    }

    #[test]
    fn empty_report_passes() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("preview.json"), r#"{"issues":[]}"#).unwrap();

        let query = QueryAnalysis::new(
            "preview.json",
            Thresholds {
                max_blockers: Some(0),
                max_vulnerabilities: Some(0),
                max_majors: Some(0),
                max_minors: Some(0),
            },
        )
        .with_resource_dirs(vec![dir.path().to_path_buf()]);

        let report = process_analysis(&query).unwrap();
        assert_eq!(report.result.status(), AnalysisStatus::Success);
        assert_eq!(report.result.message(), None);
        assert_eq!(report.summary.new_issues, 0);
    }
}

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::parser::timestamp;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Blocker,
    Critical,
    Major,
    Minor,
    Info,
    /// Any severity label the gate has no threshold for.
    #[serde(other)]
    Other,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Blocker => "BLOCKER",
            Severity::Critical => "CRITICAL",
            Severity::Major => "MAJOR",
            Severity::Minor => "MINOR",
            Severity::Info => "INFO",
            Severity::Other => "OTHER",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One finding from the preview report.
///
/// Equality and hashing cover every field, so two records are the same issue
/// only when key, location, message, severity, rule, status, the new flag and
/// the creation date all match.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub component: String,
    pub line: Option<u32>,
    pub start_line: Option<u32>,
    pub start_offset: Option<u32>,
    pub end_line: Option<u32>,
    pub end_offset: Option<u32>,
    #[serde(default)]
    pub message: String,
    pub severity: Severity,
    #[serde(default)]
    pub rule: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub is_new: bool,
    #[serde(default, with = "timestamp::option")]
    pub creation_date: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Component {
    pub key: String,
    pub path: Option<String>,
    pub module_key: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Rule {
    pub key: String,
    pub rule: Option<String>,
    pub repository: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub login: String,
    pub name: Option<String>,
}

/// A parsed preview report. Only `issues` takes part in the gate.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Preview {
    pub version: Option<String>,
    pub issues: Vec<Issue>,
    pub components: Vec<Component>,
    pub rules: Vec<Rule>,
    pub users: Vec<User>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_severity_maps_to_other() {
        let sev: Severity = serde_json::from_str(r#""TRIVIAL""#).unwrap();
        assert_eq!(sev, Severity::Other);
    }

    #[test]
    fn issue_defaults_missing_flag_to_not_new() {
        let issue: Issue = serde_json::from_str(r#"{"severity":"MAJOR"}"#).unwrap();
        assert!(!issue.is_new);
        assert_eq!(issue.creation_date, None);
        assert_eq!(issue.line, None);
    }
}

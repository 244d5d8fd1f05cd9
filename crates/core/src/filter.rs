use std::collections::HashSet;

use crate::types::{Issue, Preview};

/// Issues flagged as new, duplicates collapsed, first occurrence kept.
pub fn new_issues(preview: Option<&Preview>) -> Vec<Issue> {
    let Some(preview) = preview else {
        return Vec::new();
    };

    let mut seen: HashSet<&Issue> = HashSet::new();
    preview
        .issues
        .iter()
        .filter(|issue| issue.is_new)
        .filter(|issue| seen.insert(*issue))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Severity;

    fn issue(key: &str, severity: Severity, is_new: bool) -> Issue {
        Issue {
            key: key.to_string(),
            component: "demo:src/lib.rs".to_string(),
            line: Some(1),
            start_line: None,
            start_offset: None,
            end_line: None,
            end_offset: None,
            message: "m".to_string(),
            severity,
            rule: "r".to_string(),
            status: "OPEN".to_string(),
            is_new,
            creation_date: None,
        }
    }

    #[test]
    fn absent_preview_has_no_new_issues() {
        assert!(new_issues(None).is_empty());
        assert!(new_issues(Some(&Preview::default())).is_empty());
    }

    #[test]
    fn keeps_only_new_and_collapses_duplicates() {
        let preview = Preview {
            issues: vec![
                issue("a", Severity::Major, true),
                issue("b", Severity::Major, false),
                issue("a", Severity::Major, true),
                issue("c", Severity::Minor, true),
            ],
            ..Preview::default()
        };

        let keys: Vec<String> = new_issues(Some(&preview))
            .into_iter()
            .map(|i| i.key)
            .collect();
        assert_eq!(keys, vec!["a", "c"]);
    }

    #[test]
    fn issues_differing_in_one_field_are_distinct() {
        let mut other = issue("a", Severity::Major, true);
        other.line = Some(2);
        let preview = Preview {
            issues: vec![issue("a", Severity::Major, true), other],
            ..Preview::default()
        };

        assert_eq!(new_issues(Some(&preview)).len(), 2);
    }
}

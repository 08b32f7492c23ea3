//! Markdown report model and rendering.
//!
//! A [`Report`] is built once per analyzed target and rendered to a markdown
//! document. Rendering is a pure function of the report data: the generation
//! timestamp is supplied by the caller, so the same report always renders to
//! byte-identical text.

use crate::extract::Extraction;
use crate::types::{Diagnostic, Severity, SummaryCounts, SUMMARY_FILE};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Group label for diagnostics without a known file.
const UNKNOWN_FILE: &str = "Unknown File";

/// Errors that can occur while persisting a report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// IO error creating the reports directory or writing the document.
    #[error("failed to write report {path}: {source}")]
    Io {
        /// Path that failed.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },
}

/// Diagnostics grouped under one file heading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileGroup {
    /// File path, [`SUMMARY_FILE`] for the synthetic overview group.
    pub file: String,
    /// Issues in order of appearance.
    pub issues: Vec<Diagnostic>,
}

/// Rendered output for one target's analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    /// Name of the analyzed target.
    pub target: String,
    /// When the report was generated.
    pub generated_at: DateTime<Utc>,
    /// Issue counts by severity.
    pub counts: SummaryCounts,
    /// Number of files the analyzer reported as processed.
    pub files_analyzed: usize,
    /// Per-file issue groups, the synthetic summary group first.
    pub groups: Vec<FileGroup>,
    /// Raw captured log lines, dumped verbatim into the report.
    pub logs: Vec<String>,
}

impl Report {
    /// Builds a report from an extraction and the captured log lines.
    #[must_use]
    pub fn from_extraction(
        target: impl Into<String>,
        extraction: &Extraction,
        logs: Vec<String>,
        generated_at: DateTime<Utc>,
    ) -> Self {
        let mut groups: Vec<FileGroup> = Vec::new();
        for diagnostic in &extraction.diagnostics {
            let file = if diagnostic.is_summary() {
                SUMMARY_FILE.to_string()
            } else if diagnostic.file.is_empty() {
                UNKNOWN_FILE.to_string()
            } else {
                diagnostic.file.clone()
            };
            match groups.iter_mut().find(|g| g.file == file) {
                Some(group) => group.issues.push(diagnostic.clone()),
                None => groups.push(FileGroup {
                    file,
                    issues: vec![diagnostic.clone()],
                }),
            }
        }
        // Summary group renders first regardless of where it was emitted.
        if let Some(index) = groups.iter().position(|g| g.file == SUMMARY_FILE) {
            let summary = groups.remove(index);
            groups.insert(0, summary);
        }

        Self {
            target: target.into(),
            generated_at,
            counts: extraction.effective_counts(),
            files_analyzed: extraction.files_processed.len(),
            groups,
            logs,
        }
    }

    /// Total issue count across severities.
    #[must_use]
    pub fn total_issues(&self) -> usize {
        self.counts.total()
    }

    /// Report file name for a target.
    #[must_use]
    pub fn file_name(target: &str) -> String {
        format!("plugin-{target}_report.md")
    }

    /// Renders the report as a markdown document.
    #[must_use]
    pub fn render(&self) -> String {
        let mut lines: Vec<String> = Vec::new();

        lines.push(format!("# Lint Analysis Report: {}", self.target));
        lines.push(format!(
            "\nGenerated at: {}\n",
            self.generated_at.to_rfc3339()
        ));

        lines.push("## Summary".to_string());
        lines.push(format!("- Total Issues: {}", self.counts.total()));
        lines.push(format!("- Files Analyzed: {}", self.files_analyzed));
        lines.push("\nIssues by Severity:".to_string());
        for severity in [Severity::Error, Severity::Warning, Severity::Info] {
            let count = self.counts.get(severity);
            if count > 0 {
                lines.push(format!("- {}: {count}", severity.title()));
            }
        }

        lines.push("\n## Detailed Issues".to_string());

        if let Some(summary) = self.groups.iter().find(|g| g.file == SUMMARY_FILE) {
            lines.push("\n### Overview".to_string());
            for issue in &summary.issues {
                lines.push(format!(
                    "\n{} **{}**",
                    issue.severity.marker(),
                    issue.message
                ));
                for info in &issue.additional_info {
                    lines.push(format!("\n> {info}"));
                }
                if !issue.code_snippet.is_empty() {
                    lines.push("\n```".to_string());
                    lines.extend(issue.code_snippet.iter().cloned());
                    lines.push("```".to_string());
                }
            }
        }

        if !self.logs.is_empty() {
            lines.push("\n### Full Diagnostic Output".to_string());
            lines.push("\n```".to_string());
            lines.extend(self.logs.iter().cloned());
            lines.push("```".to_string());
        }

        for group in self.groups.iter().filter(|g| g.file != SUMMARY_FILE) {
            lines.push(format!("\n### {}", group.file));
            for issue in &group.issues {
                let mut rule_text = format!("`{}`", issue.rule);
                if issue.fixable {
                    rule_text.push_str(" (FIXABLE)");
                }

                lines.push(format!(
                    "\n{} **{}** - line {}, column {}",
                    issue.severity.marker(),
                    issue.severity.to_string().to_uppercase(),
                    issue.line,
                    issue.column
                ));
                lines.push(format!("- Rule: {rule_text}"));
                if !issue.message.is_empty() {
                    lines.push(format!("- Message: {}", issue.message));
                }
                if !issue.code_snippet.is_empty() {
                    lines.push("\n```typescript".to_string());
                    lines.extend(issue.code_snippet.iter().cloned());
                    lines.push("```".to_string());
                }
                if !issue.additional_info.is_empty() {
                    lines.push("\nℹ️ Additional Information:".to_string());
                    for info in &issue.additional_info {
                        lines.push(format!("- {info}"));
                    }
                }
            }
        }

        lines.join("\n")
    }

    /// Writes the rendered report under `dir`, overwriting any prior file for
    /// the same target.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the file
    /// cannot be written.
    pub fn save(&self, dir: &Path) -> Result<PathBuf, ReportError> {
        std::fs::create_dir_all(dir).map_err(|e| ReportError::Io {
            path: dir.to_path_buf(),
            source: e,
        })?;
        let path = dir.join(Self::file_name(&self.target));
        std::fs::write(&path, self.render()).map_err(|e| ReportError::Io {
            path: path.clone(),
            source: e,
        })?;
        info!("saved report to {}", path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::{extract, ExtractOptions};
    use chrono::TimeZone;

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 14, 9, 26, 53).unwrap()
    }

    fn sample_report() -> Report {
        let input = "src/index.ts:12:4 noUnusedVariables  warn\n  ! This variable is never used.\nsrc/index.ts:20:1 noVar error\n  ! Use const.\nsrc/other.ts:3:9 useConst  warn\n  ! Prefer const.\n";
        let extraction = extract(input, &ExtractOptions::default());
        Report::from_extraction(
            "demo",
            &extraction,
            vec!["OUT: checked".to_string()],
            fixed_time(),
        )
    }

    #[test]
    fn rendering_is_deterministic() {
        let report = sample_report();
        assert_eq!(report.render(), report.render());
    }

    #[test]
    fn render_section_order_is_fixed() {
        let text = sample_report().render();
        let title = text.find("# Lint Analysis Report:").unwrap();
        let summary = text.find("## Summary").unwrap();
        let detailed = text.find("## Detailed Issues").unwrap();
        let logs = text.find("### Full Diagnostic Output").unwrap();
        assert!(title < summary);
        assert!(summary < detailed);
        assert!(detailed < logs);
    }

    #[test]
    fn render_groups_issues_by_file_in_appearance_order() {
        let text = sample_report().render();
        let first = text.find("### src/index.ts").unwrap();
        let second = text.find("### src/other.ts").unwrap();
        assert!(first < second);
    }

    #[test]
    fn render_omits_zero_severity_counts() {
        let text = sample_report().render();
        assert!(text.contains("- Error: 1"));
        assert!(text.contains("- Warning: 2"));
        assert!(!text.contains("- Info:"));
    }

    #[test]
    fn summary_counts_round_trip_through_rendered_text() {
        let report = sample_report();
        let text = report.render();

        let reparsed = |label: &str| -> usize {
            text.lines()
                .find_map(|line| line.strip_prefix(label))
                .and_then(|rest| rest.trim().parse().ok())
                .unwrap_or(0)
        };

        assert_eq!(reparsed("- Total Issues:"), report.counts.total());
        assert_eq!(reparsed("- Error:"), report.counts.errors);
        assert_eq!(reparsed("- Warning:"), report.counts.warnings);
    }

    #[test]
    fn summary_group_renders_as_overview_first() {
        let input = "- src/index.ts\nFound 3 warnings.\n";
        let extraction = extract(input, &ExtractOptions::default());
        let report = Report::from_extraction("p", &extraction, Vec::new(), fixed_time());

        let text = report.render();
        let overview = text.find("### Overview").unwrap();
        assert!(text.contains("**Found 3 warnings and 0 errors across 1 files**"));
        assert!(overview > text.find("## Detailed Issues").unwrap());
        assert_eq!(report.files_analyzed, 1);
    }

    #[test]
    fn fixable_issues_are_flagged() {
        let input = r#"{"diagnostics":[{"file":"a.ts","severity":"warning","message":"x","rule":"useConst","fixable":true}]}"#;
        let extraction = extract(input, &ExtractOptions::default());
        let report = Report::from_extraction("p", &extraction, Vec::new(), fixed_time());
        assert!(report.render().contains("`useConst` (FIXABLE)"));
    }

    #[test]
    fn unknown_file_diagnostics_get_their_own_group() {
        let input = "{ not json\nsomething error\n";
        let extraction = extract(input, &ExtractOptions::default());
        let report = Report::from_extraction("p", &extraction, Vec::new(), fixed_time());
        assert!(report.render().contains("### Unknown File"));
    }

    #[test]
    fn report_file_name_uses_target() {
        assert_eq!(Report::file_name("demo"), "plugin-demo_report.md");
    }

    #[test]
    fn save_writes_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let report = sample_report();

        let path = report.save(dir.path()).unwrap();
        assert!(path.ends_with("plugin-demo_report.md"));
        let first = std::fs::read_to_string(&path).unwrap();

        let again = report.save(dir.path()).unwrap();
        assert_eq!(path, again);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), first);
    }
}

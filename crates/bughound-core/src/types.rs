//! Core types for extracted diagnostics and summary counts.

use serde::{Deserialize, Serialize};

/// File name of the synthetic group that carries run-level summary issues.
pub const SUMMARY_FILE: &str = "Summary";

/// Severity level for a diagnostic.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational message, does not fail a run.
    Info,
    /// Warning that should be addressed.
    Warning,
    /// Error that must be fixed.
    #[default]
    Error,
}

impl Severity {
    /// Parses a severity label as emitted by external tools.
    ///
    /// Returns `None` for anything outside the three known labels so the
    /// caller can substitute its configured default.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        match label.to_ascii_lowercase().as_str() {
            "info" => Some(Self::Info),
            "warning" => Some(Self::Warning),
            "error" => Some(Self::Error),
            _ => None,
        }
    }

    /// Capitalized label for summary listings.
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::Info => "Info",
            Self::Warning => "Warning",
            Self::Error => "Error",
        }
    }

    /// Marker glyph used when rendering an issue.
    #[must_use]
    pub fn marker(self) -> &'static str {
        match self {
            Self::Info => "ℹ️",
            Self::Warning => "⚠️",
            Self::Error => "🔴",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// One structured linting issue extracted from analyzer output.
///
/// Location fields use 0 for "unknown" since the source text is not a stable
/// machine-readable contract and may omit them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// File path the issue was reported against, empty when unknown.
    #[serde(default)]
    pub file: String,
    /// Line number, 0 when unknown.
    #[serde(default)]
    pub line: u32,
    /// Column number, 0 when unknown.
    #[serde(default)]
    pub column: u32,
    /// Severity of the issue.
    pub severity: Severity,
    /// Rule identifier, empty when unknown.
    #[serde(default)]
    pub rule: String,
    /// Human-readable message, possibly multi-line.
    #[serde(default)]
    pub message: String,
    /// Captured code snippet lines, including fix suggestions.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub code_snippet: Vec<String>,
    /// Supplementary notes, e.g. a diagnostics-limit advisory.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub additional_info: Vec<String>,
    /// Whether the reporting tool marked the issue auto-fixable.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub fixable: bool,
}

impl Diagnostic {
    /// Creates a diagnostic with unknown location and empty rule.
    #[must_use]
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            file: String::new(),
            line: 0,
            column: 0,
            severity,
            rule: String::new(),
            message: message.into(),
            code_snippet: Vec::new(),
            additional_info: Vec::new(),
            fixable: false,
        }
    }

    /// Sets the source location.
    #[must_use]
    pub fn with_location(mut self, file: impl Into<String>, line: u32, column: u32) -> Self {
        self.file = file.into();
        self.line = line;
        self.column = column;
        self
    }

    /// Sets the rule identifier.
    #[must_use]
    pub fn with_rule(mut self, rule: impl Into<String>) -> Self {
        self.rule = rule.into();
        self
    }

    /// True for the synthetic run-level summary diagnostic.
    #[must_use]
    pub fn is_summary(&self) -> bool {
        self.file == SUMMARY_FILE
    }
}

/// Issue counts grouped by severity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryCounts {
    /// Number of error-level issues.
    pub errors: usize,
    /// Number of warning-level issues.
    pub warnings: usize,
    /// Number of info-level issues.
    pub infos: usize,
}

impl SummaryCounts {
    /// Total issues across all severities.
    #[must_use]
    pub fn total(&self) -> usize {
        self.errors + self.warnings + self.infos
    }

    /// True when no issues were counted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Count for a single severity.
    #[must_use]
    pub fn get(&self, severity: Severity) -> usize {
        match severity {
            Severity::Info => self.infos,
            Severity::Warning => self.warnings,
            Severity::Error => self.errors,
        }
    }

    /// Records one issue of the given severity.
    pub fn record(&mut self, severity: Severity) {
        match severity {
            Severity::Info => self.infos += 1,
            Severity::Warning => self.warnings += 1,
            Severity::Error => self.errors += 1,
        }
    }

    /// Tallies counts from a sequence of diagnostics.
    pub fn tally<'a>(diagnostics: impl IntoIterator<Item = &'a Diagnostic>) -> Self {
        let mut counts = Self::default();
        for diagnostic in diagnostics {
            counts.record(diagnostic.severity);
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_from_label_is_case_insensitive() {
        assert_eq!(Severity::from_label("Error"), Some(Severity::Error));
        assert_eq!(Severity::from_label("WARNING"), Some(Severity::Warning));
        assert_eq!(Severity::from_label("info"), Some(Severity::Info));
    }

    #[test]
    fn severity_from_label_rejects_unknown() {
        assert_eq!(Severity::from_label("fatal"), None);
        assert_eq!(Severity::from_label(""), None);
    }

    #[test]
    fn severity_serializes_lowercase() {
        let json = serde_json::to_string(&Severity::Warning).unwrap();
        assert_eq!(json, "\"warning\"");
    }

    #[test]
    fn severity_ordering_puts_error_highest() {
        assert!(Severity::Error > Severity::Warning);
        assert!(Severity::Warning > Severity::Info);
    }

    #[test]
    fn counts_tally_and_total() {
        let diagnostics = vec![
            Diagnostic::new(Severity::Error, "a"),
            Diagnostic::new(Severity::Warning, "b"),
            Diagnostic::new(Severity::Warning, "c"),
        ];
        let counts = SummaryCounts::tally(&diagnostics);
        assert_eq!(counts.errors, 1);
        assert_eq!(counts.warnings, 2);
        assert_eq!(counts.infos, 0);
        assert_eq!(counts.total(), 3);
        assert!(!counts.is_empty());
    }

    #[test]
    fn diagnostic_builder_sets_location_and_rule() {
        let d = Diagnostic::new(Severity::Error, "boom")
            .with_location("src/a.ts", 3, 7)
            .with_rule("noUnusedVariables");
        assert_eq!(d.file, "src/a.ts");
        assert_eq!(d.line, 3);
        assert_eq!(d.column, 7);
        assert_eq!(d.rule, "noUnusedVariables");
        assert!(!d.is_summary());
    }
}

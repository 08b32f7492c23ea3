//! Diagnostic extraction from analyzer console output.
//!
//! Analyzer output is not a stable machine-readable contract, so extraction is
//! heuristic and never fails: malformed lines degrade to defaults instead of
//! aborting the run. Two input shapes are supported behind a single entry
//! point, selected by sniffing:
//!
//! - [`DiagnosticSource::VerboseText`] — the linter's verbose console format,
//!   one location line per issue followed by message/snippet continuations.
//! - [`DiagnosticSource::Json`] — a `{"diagnostics": [...]}` document, with a
//!   coarse per-line fallback when the input only looks like JSON.

use crate::types::{Diagnostic, Severity, SummaryCounts, SUMMARY_FILE};
use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

/// Location line shape: `<file>:<line>:<column> <rule text>`.
#[allow(clippy::expect_used)]
fn location_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^([^\s:]+):(\d+):(\d+)\s+(.+)$").expect("pattern is valid"))
}

/// Options controlling extraction.
#[derive(Debug, Clone, Copy)]
pub struct ExtractOptions {
    /// Severity assigned when the input does not specify one and nothing can
    /// be inferred from the surrounding text.
    pub default_severity: Severity,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            default_severity: Severity::Error,
        }
    }
}

/// The shape of a raw analyzer output, decided by sniffing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticSource {
    /// Line-oriented verbose console output.
    VerboseText,
    /// A JSON document (or something that starts like one).
    Json,
}

impl DiagnosticSource {
    /// Decides the input shape from its first non-whitespace character.
    #[must_use]
    pub fn sniff(input: &str) -> Self {
        let trimmed = input.trim_start();
        if trimmed.starts_with('{') || trimmed.starts_with('[') {
            Self::Json
        } else {
            Self::VerboseText
        }
    }
}

/// Structured result of one extraction pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    /// Diagnostics in order of appearance in the source text.
    pub diagnostics: Vec<Diagnostic>,
    /// Totals taken from summary lines (verbose) or tallied (JSON).
    pub counts: SummaryCounts,
    /// Files the analyzer reported as processed.
    pub files_processed: Vec<String>,
    /// Advisory emitted when the analyzer truncated its diagnostics.
    pub limit_notice: Option<String>,
}

impl Extraction {
    /// Counts for reporting: the parsed totals, or a tally over the extracted
    /// diagnostics when the source text carried no summary lines.
    #[must_use]
    pub fn effective_counts(&self) -> SummaryCounts {
        if self.counts.is_empty() {
            SummaryCounts::tally(self.diagnostics.iter().filter(|d| !d.is_summary()))
        } else {
            self.counts
        }
    }
}

/// Extracts diagnostics from raw analyzer output.
///
/// Sniffs the input shape and dispatches to the matching parser. Never fails;
/// unrecognizable input yields an empty extraction.
#[must_use]
pub fn extract(input: &str, options: &ExtractOptions) -> Extraction {
    match DiagnosticSource::sniff(input) {
        DiagnosticSource::Json => parse_json(input, options),
        DiagnosticSource::VerboseText => parse_verbose(input, options),
    }
}

/// Marker prefix for message continuation lines.
const MESSAGE_MARKERS: [&str; 2] = ["  ! ", "  i "];

fn parse_verbose(input: &str, options: &ExtractOptions) -> Extraction {
    let mut out = Extraction::default();
    let mut current: Option<Diagnostic> = None;
    let mut message_lines: Vec<String> = Vec::new();
    let mut in_block = false;

    for raw in input.lines() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        if line.contains("The number of diagnostics exceeds") {
            out.limit_notice = Some(line.to_string());
            continue;
        }

        if line.starts_with("- src/") {
            out.files_processed
                .push(line.trim_start_matches("- ").to_string());
            continue;
        }

        if line.contains("Found") && (line.contains("warnings") || line.contains("errors")) {
            record_totals(line, &mut out.counts);
            continue;
        }

        if let Some(caps) = location_pattern().captures(line) {
            flush(&mut current, &mut message_lines, &mut out.diagnostics);

            let rule_text = &caps[4];
            let rule = rule_text.split("  ").next().unwrap_or(rule_text);
            current = Some(
                Diagnostic::new(
                    infer_severity(rule_text, options.default_severity),
                    String::new(),
                )
                .with_location(
                    &caps[1],
                    caps[2].parse().unwrap_or(0),
                    caps[3].parse().unwrap_or(0),
                )
                .with_rule(rule),
            );
            in_block = true;
            continue;
        }

        if in_block {
            if let Some(text) = strip_message_marker(raw) {
                message_lines.push(text.to_string());
            } else if raw.starts_with("  >") || raw.starts_with("     ") {
                if let Some(diagnostic) = current.as_mut() {
                    diagnostic.code_snippet.push(raw.to_string());
                }
            } else if raw.starts_with("  -") || raw.starts_with("  +") {
                // Fix suggestions are kept with the snippet.
                if let Some(diagnostic) = current.as_mut() {
                    diagnostic.code_snippet.push(raw.to_string());
                }
            } else {
                in_block = false;
            }
        }
    }

    flush(&mut current, &mut message_lines, &mut out.diagnostics);

    if out.diagnostics.is_empty() && !out.counts.is_empty() {
        let summary = summary_diagnostic(&out);
        out.diagnostics.push(summary);
    }

    debug!(
        "verbose extraction: {} diagnostics, {} files",
        out.diagnostics.len(),
        out.files_processed.len()
    );
    out
}

fn strip_message_marker(raw: &str) -> Option<&str> {
    MESSAGE_MARKERS
        .iter()
        .find_map(|marker| raw.strip_prefix(marker))
}

fn flush(
    current: &mut Option<Diagnostic>,
    message_lines: &mut Vec<String>,
    diagnostics: &mut Vec<Diagnostic>,
) {
    if let Some(mut diagnostic) = current.take() {
        diagnostic.message = message_lines.join("\n");
        diagnostics.push(diagnostic);
        message_lines.clear();
    }
}

/// Updates running totals from a `Found N warnings|errors` summary line.
/// Unparseable counts are ignored rather than failing the extraction.
fn record_totals(line: &str, counts: &mut SummaryCounts) {
    let Some(count) = line.split_whitespace().nth(1).and_then(|n| n.parse().ok()) else {
        return;
    };
    if line.contains("warnings") {
        counts.warnings = count;
    } else if line.contains("errors") {
        counts.errors = count;
    }
}

/// Infers severity from the free text after a location, falling back to the
/// configured default when the text names neither errors nor warnings.
fn infer_severity(rule_text: &str, default: Severity) -> Severity {
    let lower = rule_text.to_lowercase();
    if lower.contains("error") {
        Severity::Error
    } else if lower.contains("warn") {
        Severity::Warning
    } else {
        default
    }
}

/// Builds the single synthetic diagnostic emitted when summary totals were
/// seen but no individual issue could be extracted.
fn summary_diagnostic(extraction: &Extraction) -> Diagnostic {
    let mut snippet = vec!["Affected files:".to_string()];
    snippet.extend(
        extraction
            .files_processed
            .iter()
            .map(|file| format!("  - {file}")),
    );

    let mut diagnostic = Diagnostic::new(
        Severity::Warning,
        format!(
            "Found {} warnings and {} errors across {} files",
            extraction.counts.warnings,
            extraction.counts.errors,
            extraction.files_processed.len()
        ),
    )
    .with_location(SUMMARY_FILE, 0, 0)
    .with_rule("multiple-issues");
    diagnostic.code_snippet = snippet;
    if let Some(notice) = &extraction.limit_notice {
        diagnostic.additional_info.push(notice.clone());
    }
    diagnostic
}

fn parse_json(input: &str, options: &ExtractOptions) -> Extraction {
    match serde_json::from_str::<serde_json::Value>(input) {
        Ok(value) => {
            let mut out = Extraction::default();
            let Some(items) = value.get("diagnostics").and_then(|d| d.as_array()) else {
                debug!("JSON input without a diagnostics array, nothing to extract");
                return out;
            };
            for item in items {
                let severity = item
                    .get("severity")
                    .and_then(|s| s.as_str())
                    .and_then(Severity::from_label)
                    .unwrap_or(options.default_severity);
                let mut diagnostic = Diagnostic::new(severity, field_str(item, "message"))
                    .with_location(
                        field_str(item, "file"),
                        field_u32(item, "line"),
                        field_u32(item, "column"),
                    )
                    .with_rule(field_str(item, "rule"));
                diagnostic.fixable = item
                    .get("fixable")
                    .and_then(serde_json::Value::as_bool)
                    .unwrap_or(false);
                out.counts.record(severity);
                out.diagnostics.push(diagnostic);
            }
            out
        }
        Err(error) => {
            debug!("input is not valid JSON ({error}), using line heuristic");
            fallback_lines(input)
        }
    }
}

fn field_str(item: &serde_json::Value, key: &str) -> String {
    item.get(key)
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string()
}

fn field_u32(item: &serde_json::Value, key: &str) -> u32 {
    item.get(key)
        .and_then(serde_json::Value::as_u64)
        .and_then(|n| u32::try_from(n).ok())
        .unwrap_or(0)
}

/// Coarse heuristic for text that only looked like JSON: every line naming an
/// error or warning becomes a location-less diagnostic, everything else is
/// ignored.
fn fallback_lines(input: &str) -> Extraction {
    let mut out = Extraction::default();
    for raw in input.lines() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        let lower = line.to_lowercase();
        let severity = if lower.contains("error") {
            Severity::Error
        } else if lower.contains("warning") {
            Severity::Warning
        } else {
            continue;
        };
        out.counts.record(severity);
        out.diagnostics.push(Diagnostic::new(severity, line));
    }
    out
}

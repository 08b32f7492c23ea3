//! Changelog assembly and release-body rewriting.
//!
//! Release bodies are rewritten in a single deterministic pass: markup that
//! never survives into the changelog is stripped up front, then every line is
//! visited exactly once. Rewritten lines are never re-examined, so a demoted
//! heading cannot be picked up again by a later rule.

use crate::client::Release;
use chrono::NaiveDateTime;
use regex::Regex;
use std::sync::OnceLock;

#[allow(clippy::expect_used)]
fn version_heading_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"## (v[\d.]+-?[a-zA-Z\d.]*)").expect("pattern is valid"))
}

#[allow(clippy::expect_used)]
fn html_tag_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"<[^>]*>").expect("pattern is valid"))
}

#[allow(clippy::expect_used)]
fn template_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\{\{[^}]*\}\}").expect("pattern is valid"))
}

#[allow(clippy::expect_used)]
fn title_block_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"# Changelog\s*\n\s*\n").expect("pattern is valid"))
}

/// Extracts the most recent version from an existing changelog document.
#[must_use]
pub fn extract_latest_version(changelog: &str) -> Option<String> {
    version_heading_pattern()
        .captures(changelog)
        .map(|caps| caps[1].to_string())
}

/// Formats one release as a changelog section: a dated heading, the
/// rewritten body, and a separator.
#[must_use]
pub fn format_release(release: &Release) -> String {
    let name = release.display_name();
    let heading = match release.published_at.as_deref().and_then(format_date) {
        Some(date) => format!("## {name} ({date})\n\n"),
        None => format!("## {name}\n\n"),
    };

    let body = rewrite_body(release.body.as_deref().unwrap_or_default());
    format!("{heading}{body}\n\n---\n\n")
}

/// Formats an ISO-8601 Z timestamp as `Month DD, YYYY`, or `None` when the
/// timestamp does not parse.
fn format_date(raw: &str) -> Option<String> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%SZ")
        .ok()
        .map(|date| date.format("%B %d, %Y").to_string())
}

/// Renders a complete changelog from scratch.
#[must_use]
pub fn build_changelog(releases: &[Release]) -> String {
    let mut content = String::from("# Changelog\n\n");
    for release in releases {
        content.push_str(&format_release(release));
    }
    content
}

/// Inserts new release sections into an existing changelog, directly after
/// the title. A document without the expected title gets one prepended.
#[must_use]
pub fn update_changelog(existing: &str, new_sections: &str) -> String {
    if existing.is_empty() {
        return format!("# Changelog\n\n{new_sections}");
    }
    if !existing.starts_with("# Changelog") {
        return format!("# Changelog\n\n{new_sections}{existing}");
    }
    match title_block_pattern().find(existing) {
        Some(title) => {
            let (head, tail) = existing.split_at(title.end());
            format!("{head}{new_sections}{tail}")
        }
        None => format!("# Changelog\n\n{new_sections}{existing}"),
    }
}

/// Rewrites one release body for the assembled changelog.
///
/// Level 1-3 headings demote to `####` so release sections stay subordinate
/// to the per-release `##` heading; the `New Contributors` list collapses
/// into a `<details>` block; bullets are normalized; blank runs shrink to a
/// single empty line.
#[must_use]
pub fn rewrite_body(body: &str) -> String {
    let text = html_tag_pattern().replace_all(body, "");
    let text = template_var_pattern().replace_all(&text, "");
    let text = text.replace("\r\n", "\n");

    let mut out: Vec<String> = Vec::new();
    let mut in_contributors = false;

    for line in text.lines() {
        let line = line.trim_end();

        if let Some(title) = heading_text(line) {
            if in_contributors {
                out.push("</details>".to_string());
                in_contributors = false;
            }
            if title.is_empty() {
                // Stray empty headings are dropped entirely.
            } else if title.starts_with("New Contributors") {
                out.push("## New Contributors".to_string());
                out.push(String::new());
                out.push("<details>".to_string());
                out.push("<summary>View New Contributors</summary>".to_string());
                out.push(String::new());
                in_contributors = true;
            } else {
                out.push(format!("#### {title}"));
                out.push(String::new());
            }
            continue;
        }

        if let Some(rest) = full_changelog_line(line) {
            if in_contributors {
                out.push("</details>".to_string());
                out.push(String::new());
                in_contributors = false;
            }
            out.push(format!("#### Full Changelog: {rest}"));
            out.push(String::new());
            continue;
        }

        if let Some(item) = bullet_text(line) {
            out.push(format!("* {item}"));
            continue;
        }

        out.push(line.to_string());
    }

    if in_contributors {
        out.push("</details>".to_string());
    }

    collapse_blank_runs(&out).join("\n").trim().to_string()
}

/// Returns the text of a level 1-3 heading, `Some("")` for a bare hash run,
/// and `None` for anything else (including already-demoted `####` lines).
fn heading_text(line: &str) -> Option<&str> {
    let hashes = line.chars().take_while(|c| *c == '#').count();
    if !(1..=3).contains(&hashes) {
        return None;
    }
    let rest = &line[hashes..];
    if rest.is_empty() {
        Some("")
    } else if rest.starts_with(' ') {
        Some(rest.trim())
    } else {
        None
    }
}

/// Matches the `**Full Changelog**: …` trailer and returns the remainder.
fn full_changelog_line(line: &str) -> Option<&str> {
    let rest = line.trim_start().strip_prefix("**Full Changelog**")?;
    Some(rest.trim_start_matches(':').trim())
}

/// Returns the item text of a `*` bullet with arbitrary leading indentation.
fn bullet_text(line: &str) -> Option<&str> {
    let rest = line.trim_start().strip_prefix('*')?;
    // Bold text like `**Full Changelog**` is not a bullet.
    if rest.starts_with('*') {
        return None;
    }
    let item = rest.trim_start();
    if item.is_empty() {
        None
    } else {
        Some(item)
    }
}

/// Limits runs of blank lines to a single blank line.
fn collapse_blank_runs(lines: &[String]) -> Vec<String> {
    let mut out = Vec::with_capacity(lines.len());
    let mut previous_blank = false;
    for line in lines {
        let blank = line.trim().is_empty();
        if blank && previous_blank {
            continue;
        }
        previous_blank = blank;
        out.push(line.clone());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_latest_version_finds_first_heading() {
        let changelog = "# Changelog\n\n## v1.3.0 (March 01, 2025)\n\n## v1.2.9\n";
        assert_eq!(extract_latest_version(changelog).as_deref(), Some("v1.3.0"));
    }

    #[test]
    fn extract_latest_version_none_without_headings() {
        assert_eq!(extract_latest_version("# Changelog\n\nnothing yet"), None);
    }

    #[test]
    fn headings_demote_to_level_four() {
        let body = "# Big News\n## What's Changed\n### Details\ntext\n";
        let rewritten = rewrite_body(body);
        assert!(rewritten.contains("#### Big News"));
        assert!(rewritten.contains("#### What's Changed"));
        assert!(rewritten.contains("#### Details"));
        assert!(!rewritten.contains("\n## "));
    }

    #[test]
    fn demoted_headings_are_not_rewritten_again() {
        let body = "#### Already Demoted\n## Fresh\n";
        let rewritten = rewrite_body(body);
        assert!(rewritten.contains("#### Already Demoted"));
        assert!(rewritten.contains("#### Fresh"));
        assert!(!rewritten.contains("####### "));
    }

    #[test]
    fn html_and_template_vars_are_stripped() {
        let body = "## Fixes\n<img src=\"x.png\"/> {{maxTweetLength}} does not work\n";
        let rewritten = rewrite_body(body);
        assert!(!rewritten.contains('<'));
        assert!(!rewritten.contains("{{"));
        assert!(rewritten.contains("does not work"));
    }

    #[test]
    fn contributors_section_collapses_into_details() {
        let body = "## What's Changed\n* fix by @a\n\n## New Contributors\n* @b made their first contribution\n\n**Full Changelog**: https://example.com/compare/v1...v2\n";
        let rewritten = rewrite_body(body);

        assert!(rewritten.contains("## New Contributors"));
        assert!(rewritten.contains("<details>"));
        assert!(rewritten.contains("<summary>View New Contributors</summary>"));
        assert!(rewritten.contains("</details>"));
        assert!(rewritten
            .contains("#### Full Changelog: https://example.com/compare/v1...v2"));

        let details = rewritten.find("<details>").unwrap();
        let contribution = rewritten.find("@b made their first contribution").unwrap();
        let closing = rewritten.find("</details>").unwrap();
        assert!(details < contribution);
        assert!(contribution < closing);
    }

    #[test]
    fn bullets_are_normalized() {
        let body = "## Changes\n  *   indented item\n* already fine\n";
        let rewritten = rewrite_body(body);
        assert!(rewritten.contains("* indented item"));
        assert!(rewritten.contains("* already fine"));
    }

    #[test]
    fn blank_runs_collapse() {
        let body = "line one\n\n\n\n\nline two\n";
        assert_eq!(rewrite_body(body), "line one\n\nline two");
    }

    #[test]
    fn rewrite_is_deterministic() {
        let body = "## A\n\ntext\n\n## New Contributors\n* @x\n";
        assert_eq!(rewrite_body(body), rewrite_body(body));
    }

    #[test]
    fn format_release_includes_readable_date() {
        let release = Release {
            tag_name: "v2.0".to_string(),
            name: Some("v2.0".to_string()),
            published_at: Some("2025-03-14T09:26:53Z".to_string()),
            body: Some("## Features\nadded X".to_string()),
        };
        let section = format_release(&release);
        assert!(section.starts_with("## v2.0 (March 14, 2025)\n\n"));
        assert!(section.contains("#### Features"));
        assert!(section.trim_end().ends_with("---"));
    }

    #[test]
    fn format_release_without_date_uses_bare_name() {
        let release = Release {
            tag_name: "v2.0".to_string(),
            published_at: Some("not a timestamp".to_string()),
            ..Release::default()
        };
        assert!(format_release(&release).starts_with("## v2.0\n\n"));
    }

    #[test]
    fn update_changelog_inserts_after_title() {
        let existing = "# Changelog\n\n## v1.0 (January 01, 2025)\n\nold\n";
        let updated = update_changelog(existing, "## v2.0\n\nnew\n\n---\n\n");
        let title = updated.find("# Changelog").unwrap();
        let new_section = updated.find("## v2.0").unwrap();
        let old_section = updated.find("## v1.0").unwrap();
        assert!(title < new_section);
        assert!(new_section < old_section);
    }

    #[test]
    fn update_changelog_prepends_title_when_missing() {
        let updated = update_changelog("## v1.0\n\nold\n", "## v2.0\n\nnew\n");
        assert!(updated.starts_with("# Changelog\n\n## v2.0"));
        assert!(updated.contains("## v1.0"));
    }

    #[test]
    fn build_changelog_renders_all_releases() {
        let releases = vec![
            Release {
                tag_name: "v2.0".to_string(),
                body: Some("## Features\nadded X".to_string()),
                ..Release::default()
            },
            Release {
                tag_name: "v1.0".to_string(),
                ..Release::default()
            },
        ];
        let changelog = build_changelog(&releases);
        assert!(changelog.starts_with("# Changelog\n\n"));
        assert!(changelog.contains("## v2.0"));
        assert!(changelog.contains("## v1.0"));
    }
}

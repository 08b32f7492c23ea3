//! Partner-page enrichment pipeline.
//!
//! The completion is scraped with fixed section headings. The model is asked
//! to produce them literally; a completion that drifts from the requested
//! headings yields empty sections, which downstream rendering tolerates.

use crate::frontmatter::Document;
use regex::Regex;
use std::sync::OnceLock;

/// Section headings the research prompt requires, in document order. The
/// `About` heading additionally carries the partner name.
pub const RESEARCH_SECTIONS: [&str; 7] = [
    "About",
    "Technology",
    "Key Features",
    "Integration with Eliza",
    "Recent Developments",
    "Market Position",
    "Links",
];

#[allow(clippy::expect_used)]
fn citation_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\[\d+\](\[\d+\])*").expect("pattern is valid"))
}

#[allow(clippy::expect_used)]
fn double_space_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"  +").expect("pattern is valid"))
}

#[allow(clippy::expect_used)]
fn logo_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"(?s)<div className="partner-logo">.*?</div>"#).expect("pattern is valid")
    })
}

/// Builds the research prompt for one partner from its existing page.
#[must_use]
pub fn build_prompt(partner_name: &str, document: &Document) -> String {
    let description = document.field("description").unwrap_or_default();
    let website = document.field("website").unwrap_or_default();
    let twitter = document.field("twitter").unwrap_or_default();
    let tags = document.tags().join(", ");
    let content = &document.body;

    format!(
        r"I need comprehensive, factual information about {partner_name}, who is a partner of ElizaOS.
Here's what I currently have about them:

Description: {description}
Website: {website}
Twitter: {twitter}
Tags: {tags}

Original content:
{content}

When researching the integration, please also investigate if there might be an official ElizaOS plugin for {partner_name}.
Consider looking for resources associated with ElizaOS plugins, such as repositories within the elizaos-plugins organization on GitHub.

If you find relevant plugin information (like its purpose from a README or description), please summarize it in the 'Integration with Eliza' section.

Please research this company/project and provide detailed, factual information for these sections:

1. ## About {partner_name}
   - A detailed introduction to what they do
   - Their main products/services
   - Their significance in the Web3/blockchain space

2. ## Technology
   - Their technology stack and innovations
   - Technical approach and how their technology works
   - What problems their technology solves

3. ## Key Features
   - 5-7 specific, enhanced bullet points about their key features and advantages
   - Technical capabilities and differentiators

4. ## Integration with Eliza
   - Specific details on how their technology integrates with elizaOS
   - Technical synergies and use cases for the partnership
   - Potential benefits for users of both platforms

5. ## Recent Developments
   - Latest news, updates, or milestones (within the last year)
   - Roadmap items or future plans that have been publicly announced

6. ## Market Position
   - Their position compared to competitors
   - Key partnerships besides ElizaOS
   - User base or adoption metrics if available

7. ## Links
   - Website, documentation, GitHub, social media, etc.

Important: Please DO NOT include citation markers like [1] or [2][3] in your response.
Instead, integrate the information naturally without citation numbers.
Focus on factual information from reputable sources. Include specific technical details where available."
    )
}

/// Extracts one `## `-delimited section from a completion.
///
/// The heading must appear literally (prefix match after `## `); the section
/// runs until the next `## ` line. A missing heading yields an empty string.
#[must_use]
pub fn extract_section(text: &str, heading: &str) -> String {
    let mut collected: Vec<&str> = Vec::new();
    let mut in_section = false;

    for line in text.lines() {
        if let Some(rest) = line.strip_prefix("## ") {
            if in_section {
                break;
            }
            if rest.trim().starts_with(heading) {
                in_section = true;
            }
            continue;
        }
        if in_section {
            collected.push(line);
        }
    }

    collected.join("\n").trim().to_string()
}

/// Removes `[1]`-style citation markers and the double spaces they leave.
#[must_use]
pub fn clean_citations(text: &str) -> String {
    let cleaned = citation_pattern().replace_all(text, "");
    double_space_pattern().replace_all(&cleaned, " ").into_owned()
}

/// Normalizes a feature list into bullet points.
///
/// Lines that already carry a `-` or `*` bullet pass through; labeled lines
/// and sentence-like lines gain a `-` bullet; anything else is kept as-is.
#[must_use]
pub fn ensure_bullets(text: &str) -> String {
    let mut out: Vec<String> = Vec::new();
    for raw in text.trim().lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('-') || line.starts_with('*') {
            out.push(line.to_string());
            continue;
        }
        let sentence_like = line
            .chars()
            .next()
            .is_some_and(|c| c.is_uppercase())
            && line.len() > 5;
        if line.contains(':') || sentence_like {
            out.push(format!("- {line}"));
        } else {
            out.push(line.to_string());
        }
    }
    out.join("\n")
}

/// Builds the condensed `brief.md` content: title plus the four most
/// important sections, citation markers removed.
#[must_use]
pub fn brief_document(document: &Document, research: &str) -> String {
    let title = document.title().unwrap_or_default();
    let title_heading = if title.is_empty() {
        String::new()
    } else {
        format!("# {title}")
    };

    let about = clean_citations(&extract_section(research, "About"));
    let integration = clean_citations(&extract_section(research, "Integration with Eliza"));
    let recent = clean_citations(&extract_section(research, "Recent Developments"));
    let market = clean_citations(&extract_section(research, "Market Position"));

    let brief = format!(
        "{title_heading}\n\n## About {title}\n\n{about}\n\n## Integration with Eliza\n\n{integration}\n\n## Recent Developments\n\n{recent}\n\n## Market Position\n\n{market}"
    );
    format!("{}\n", brief.trim())
}

/// Builds the enhanced page content, preserving the original front matter,
/// title, logo block, and short description while replacing every research
/// section.
#[must_use]
pub fn enhanced_document(document: &Document, research: &str) -> String {
    let title = body_title(document)
        .or_else(|| document.title())
        .unwrap_or_default()
        .to_string();
    let title_heading = if title.is_empty() {
        String::new()
    } else {
        format!("# {title}")
    };

    let logo = logo_pattern()
        .find(&document.body)
        .map(|m| m.as_str().to_string())
        .unwrap_or_default();
    let short_desc = short_description(document, &logo);

    let about = extract_section(research, "About");
    let tech = extract_section(research, "Technology");
    let mut features = extract_section(research, "Key Features");
    if !features.is_empty() && !features.lines().any(|l| l.trim_start().starts_with(['-', '*'])) {
        features = ensure_bullets(&features);
    }
    let integration = extract_section(research, "Integration with Eliza");
    let recent = extract_section(research, "Recent Developments");
    let market = extract_section(research, "Market Position");
    let links = extract_section(research, "Links");

    let enhanced = format!(
        "{raw}\n\n{title_heading}\n\n{logo}\n\n{short_desc}\n\n## About {title}\n\n{about}\n\n## Technology\n\n{tech}\n\n## Key Features\n\n{features}\n\n## Integration with Eliza\n\n{integration}\n\n## Recent Developments\n\n{recent}\n\n## Market Position\n\n{market}\n\n## Links\n\n{links}",
        raw = document.raw_front_matter,
    );
    format!("{}\n", enhanced.trim())
}

/// First `# ` heading of the body, if any.
fn body_title(document: &Document) -> Option<&str> {
    document
        .body
        .lines()
        .find_map(|line| line.strip_prefix("# "))
        .map(str::trim)
}

/// Short description: the text between the logo block and the first `##`
/// heading, falling back to the front-matter description.
fn short_description(document: &Document, logo: &str) -> String {
    if !logo.is_empty() {
        if let Some(after) = document
            .body
            .find(logo)
            .map(|start| &document.body[start + logo.len()..])
        {
            let described: Vec<&str> = after
                .lines()
                .take_while(|line| !line.starts_with("##"))
                .collect();
            let described = described.join("\n").trim().to_string();
            if !described.is_empty() {
                return described;
            }
        }
    }
    document.field("description").unwrap_or_default().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontmatter::split_front_matter;

    const RESEARCH: &str = "## About Acme\nAcme builds widgets for agent runtimes.\n\n## Technology\nRust and steel.\n\n## Key Features\nFast delivery: under one hour\nReliable hardware\n\n## Integration with Eliza\nShips an official plugin.\n\n## Recent Developments\nLaunched v2 in 2025.\n\n## Market Position\nMarket leader in widgets. [1][2]\n\n## Links\n- https://acme.test\n";

    fn partner_document() -> Document {
        split_front_matter(
            "---\ntitle: Acme\ndescription: Widgets for agents\nwebsite: https://acme.test\ntwitter: acmehq\ntags:\n  - infrastructure\n---\n\n# Acme\n\n<div className=\"partner-logo\">\n  <img src=\"/logo.png\" />\n</div>\n\nWidgets for agent runtimes.\n\n## About Acme\n\nOld about text.\n",
        )
    }

    #[test]
    fn prompt_embeds_context_and_required_headings() {
        let prompt = build_prompt("Acme", &partner_document());
        assert!(prompt.contains("Description: Widgets for agents"));
        assert!(prompt.contains("Website: https://acme.test"));
        assert!(prompt.contains("Tags: infrastructure"));
        assert!(prompt.contains("## About Acme"));
        for heading in &RESEARCH_SECTIONS[1..] {
            assert!(
                prompt.contains(&format!("## {heading}")),
                "prompt is missing heading {heading}"
            );
        }
    }

    #[test]
    fn extract_section_matches_literal_heading() {
        assert_eq!(
            extract_section(RESEARCH, "Technology"),
            "Rust and steel."
        );
        assert_eq!(
            extract_section(RESEARCH, "About"),
            "Acme builds widgets for agent runtimes."
        );
    }

    #[test]
    fn extract_section_missing_heading_is_empty() {
        assert_eq!(extract_section(RESEARCH, "Roadmap"), "");
        // Deviating heading level does not match.
        assert_eq!(extract_section("### Technology\nnope", "Technology"), "");
    }

    #[test]
    fn extract_section_stops_at_next_heading() {
        let section = extract_section(RESEARCH, "Integration with Eliza");
        assert_eq!(section, "Ships an official plugin.");
        assert!(!section.contains("Recent Developments"));
    }

    #[test]
    fn clean_citations_removes_markers() {
        assert_eq!(
            clean_citations("Market leader in widgets. [1][2]"),
            "Market leader in widgets. "
        );
        assert_eq!(clean_citations("plain text"), "plain text");
    }

    #[test]
    fn ensure_bullets_adds_missing_bullets() {
        let bulleted = ensure_bullets("Fast delivery: under one hour\nReliable hardware\n- kept");
        assert!(bulleted.contains("- Fast delivery: under one hour"));
        assert!(bulleted.contains("- Reliable hardware"));
        assert!(bulleted.contains("- kept"));
    }

    #[test]
    fn brief_document_carries_four_sections() {
        let brief = brief_document(&partner_document(), RESEARCH);
        assert!(brief.starts_with("# Acme"));
        assert!(brief.contains("## About Acme"));
        assert!(brief.contains("## Integration with Eliza"));
        assert!(brief.contains("## Recent Developments"));
        assert!(brief.contains("## Market Position"));
        assert!(!brief.contains("## Technology"));
        assert!(!brief.contains("[1]"));
        assert!(brief.ends_with('\n'));
    }

    #[test]
    fn enhanced_document_preserves_front_matter_and_logo() {
        let enhanced = enhanced_document(&partner_document(), RESEARCH);
        assert!(enhanced.starts_with("---\ntitle: Acme"));
        assert!(enhanced.contains("<div className=\"partner-logo\">"));
        assert!(enhanced.contains("Widgets for agent runtimes."));
        assert!(enhanced.contains("## Technology\n\nRust and steel."));
        assert!(enhanced.contains("## Links"));
        assert!(enhanced.contains("- Fast delivery: under one hour"));
    }

    #[test]
    fn enhanced_document_deviating_completion_yields_empty_sections() {
        let enhanced = enhanced_document(&partner_document(), "no headings at all");
        assert!(enhanced.contains("## Technology\n\n\n\n## Key Features"));
    }
}

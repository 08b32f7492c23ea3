//! Changelog command implementation.

use anyhow::{Context, Result};
use bughound_changelog::{
    build_changelog, extract_latest_version, format_release, releases_since, update_changelog,
    ReleaseClient,
};
use bughound_core::Config;
use std::path::Path;
use tracing::info;

/// Fetches releases and rebuilds or appends to the changelog document.
pub fn run(
    repo: Option<&str>,
    output: Option<&Path>,
    rebuild: bool,
    token: Option<String>,
    config: &Config,
) -> Result<()> {
    let repo = repo.unwrap_or(config.changelog.repo.as_str());
    let output = output.unwrap_or(config.changelog.output.as_path());

    let existing = if rebuild {
        String::new()
    } else {
        std::fs::read_to_string(output).unwrap_or_default()
    };

    let client = ReleaseClient::new(token).context("Failed to build release client")?;
    let releases = client
        .fetch_releases(repo)
        .with_context(|| format!("Failed to fetch releases for {repo}"))?;

    let content = if existing.is_empty() {
        info!("Rebuilding full changelog for {repo}");
        build_changelog(&releases)
    } else {
        let latest = extract_latest_version(&existing);
        match &latest {
            Some(version) => info!("Fetching releases newer than {version}"),
            None => info!("Existing changelog has no version headings"),
        }

        let new_releases = releases_since(releases, latest.as_deref());
        if new_releases.is_empty() {
            info!("No new releases found, changelog is up to date");
            return Ok(());
        }
        info!("Adding {} new releases", new_releases.len());

        let mut sections = String::new();
        for release in &new_releases {
            sections.push_str(&format_release(release));
        }
        update_changelog(&existing, &sections)
    };

    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }
    std::fs::write(output, content)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    info!("Changelog saved to {}", output.display());
    Ok(())
}

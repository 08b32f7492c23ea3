//! Research command implementation.

use anyhow::{bail, Context, Result};
use bughound_core::Config;
use bughound_research::{
    brief_document, build_prompt, enhanced_document, read_partner_info, CompletionClient,
};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{error, info};

/// Enriches partner pages with researched content.
///
/// Partners are processed strictly sequentially with a fixed pause between
/// completion requests to respect the provider's rate limit.
pub fn run(partners_dir: Option<&Path>, partner: Option<&str>, config: &Config) -> Result<()> {
    let partners_dir = partners_dir.unwrap_or(config.research.partners_dir.as_path());

    let client = CompletionClient::from_env(&config.research.base_url, &config.research.model)
        .context("Failed to build completion client")?;

    let dirs = match partner {
        Some(name) => vec![partners_dir.join(name)],
        None => discover_partners(partners_dir)?,
    };
    if dirs.is_empty() {
        bail!("No partner pages found in {}", partners_dir.display());
    }

    let delay = Duration::from_secs(config.research.request_delay_secs);
    let total = dirs.len();
    let mut processed = 0usize;
    let mut failed = 0usize;

    for (index, dir) in dirs.iter().enumerate() {
        let name = partner_display_name(dir);
        info!("Researching {name}");

        match enrich_partner(&client, dir, &name) {
            Ok(()) => processed += 1,
            Err(e) => {
                error!("Failed to enrich {name}: {e}");
                failed += 1;
            }
        }

        if index + 1 < total {
            std::thread::sleep(delay);
        }
    }

    info!("Enhancement complete: {processed} processed, {failed} failed");
    Ok(())
}

fn enrich_partner(client: &CompletionClient, dir: &Path, name: &str) -> Result<()> {
    let document = read_partner_info(dir)?;
    let prompt = build_prompt(name, &document);
    let research = client.complete(&prompt, true)?;

    let enhanced = enhanced_document(&document, &research);
    let brief = brief_document(&document, &research);

    let enhanced_path = dir.join("index2.md");
    std::fs::write(&enhanced_path, enhanced)
        .with_context(|| format!("Failed to write {}", enhanced_path.display()))?;
    let brief_path = dir.join("brief.md");
    std::fs::write(&brief_path, brief)
        .with_context(|| format!("Failed to write {}", brief_path.display()))?;

    info!("Wrote enriched pages for {name}");
    Ok(())
}

/// Partner directories are those that already carry an `index.md`.
fn discover_partners(root: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(root)
        .with_context(|| format!("Partners directory not found: {}", root.display()))?;

    let mut dirs: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.is_dir() && path.join("index.md").exists())
        .collect();
    dirs.sort();
    Ok(dirs)
}

/// `acme-corp` → `Acme Corp`.
fn partner_display_name(dir: &Path) -> String {
    let raw = dir
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    raw.split('-')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

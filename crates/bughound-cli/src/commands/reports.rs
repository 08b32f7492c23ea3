//! Reports command implementation.

use anyhow::{bail, Context, Result};
use bughound_core::{Config, Report};

/// Prints one target's report, or lists the available reports.
pub fn run(target: Option<&str>, config: &Config) -> Result<()> {
    let reports_dir = &config.analysis.reports_dir;

    if let Some(target) = target {
        let path = reports_dir.join(Report::file_name(target));
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("No report found for '{target}'"))?;
        println!("{content}");
        return Ok(());
    }

    let Ok(entries) = std::fs::read_dir(reports_dir) else {
        bail!("No reports found");
    };

    let mut names: Vec<String> = entries
        .flatten()
        .filter_map(|entry| {
            let file_name = entry.file_name();
            let name = file_name.to_str()?;
            let target = name.strip_suffix("_report.md")?;
            Some(target.strip_prefix("plugin-").unwrap_or(target).to_string())
        })
        .collect();

    if names.is_empty() {
        bail!("No reports found");
    }

    names.sort();
    println!("Available reports:");
    for name in names {
        println!("  {name}");
    }
    Ok(())
}

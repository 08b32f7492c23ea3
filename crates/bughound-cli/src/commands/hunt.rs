//! Hunt command implementation: the session controller.
//!
//! Failure semantics follow the batch discipline: a failure local to one
//! target is logged and recorded against the session, then the batch moves
//! on; only shared-infrastructure failures (no session store) abort the run.

use anyhow::{bail, Context, Result};
use bughound_core::{extract, Config, Report, SessionStore};
use bughound_node::NodeToolchain;
use chrono::Utc;
use std::path::{Path, PathBuf};
use tracing::{error, info};

use crate::OutputFormat;

/// Runs the hunt command: start a session and analyze every target.
pub fn run(
    path: &Path,
    plugins: &[String],
    session: &str,
    format: OutputFormat,
    config: &Config,
) -> Result<()> {
    let store = SessionStore::new(path.join(&config.analysis.checkpoints_dir))
        .context("Failed to open session store")?;
    store
        .start_session(session)
        .context("Failed to start session")?;

    analyze_targets(path, plugins, &[], &store, format, config)
}

/// Analyzes the discovered (or requested) targets sequentially, checkpointing
/// after each one. `skip` holds target names a resumed session already has.
pub fn analyze_targets(
    path: &Path,
    plugins: &[String],
    skip: &[String],
    store: &SessionStore,
    format: OutputFormat,
    config: &Config,
) -> Result<()> {
    let plugins_dir = path.join(&config.analysis.plugins_dir);
    let targets = if plugins.is_empty() {
        discover_targets(&plugins_dir, &config.analysis.exclude)?
    } else {
        plugins.iter().map(|p| plugins_dir.join(p)).collect()
    };
    if targets.is_empty() {
        bail!(
            "No plugins with TypeScript files found in {}",
            plugins_dir.display()
        );
    }

    info!("Analyzing {} plugins", targets.len());

    let toolchain = NodeToolchain::new(path);
    let reports_dir = path.join(&config.analysis.reports_dir);
    let options = config.extractor.options();

    let mut analyzed = 0usize;
    let mut failed = 0usize;

    for target in &targets {
        let name = target_name(target);
        if skip.contains(&name) {
            info!("Skipping already analyzed {name}");
            continue;
        }

        match toolchain.analyze(target) {
            Ok(outcome) => {
                let extraction = extract(&outcome.lint.stdout, &options);
                let report =
                    Report::from_extraction(&name, &extraction, outcome.lint.lines(), Utc::now());
                if let Err(e) = report.save(&reports_dir) {
                    error!("Failed to save report for {name}: {e}");
                    store.add_error(&name, &e.to_string());
                    failed += 1;
                    continue;
                }
                super::output::print(&name, &extraction, format)?;
                store.save_plugin_progress(&name, outcome.to_json());
                analyzed += 1;
            }
            Err(e) => {
                error!("Failed to analyze {name}: {e}");
                store.add_error(&name, &e.to_string());
                failed += 1;
            }
        }
    }

    info!("Analysis complete: {analyzed} analyzed, {failed} failed");
    Ok(())
}

fn target_name(target: &Path) -> String {
    target
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| target.display().to_string())
}

/// Discovers analyzable plugin directories: `plugin-*` directories that
/// contain at least one TypeScript source file.
fn discover_targets(plugins_dir: &Path, exclude: &[String]) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(plugins_dir)
        .with_context(|| format!("Plugins directory not found: {}", plugins_dir.display()))?;

    let mut targets = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !path.is_dir() || !name.starts_with("plugin-") {
            continue;
        }
        if exclude.iter().any(|pattern| name.contains(pattern)) {
            info!("Excluding {name}");
            continue;
        }
        if has_typescript_sources(&path) {
            info!("Found TypeScript files in {name}");
            targets.push(path);
        }
    }

    targets.sort();
    Ok(targets)
}

/// True when the directory holds any `.ts`/`.tsx` file, honoring gitignore.
fn has_typescript_sources(dir: &Path) -> bool {
    let mut builder = ignore::WalkBuilder::new(dir);
    builder.hidden(false).git_ignore(true);

    for entry in builder.build().flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            if matches!(ext, "ts" | "tsx") {
                return true;
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn make_plugin(root: &Path, name: &str, with_ts: bool) {
        let src = root.join(name).join("src");
        fs::create_dir_all(&src).unwrap();
        if with_ts {
            fs::write(src.join("index.ts"), "export {};\n").unwrap();
        } else {
            fs::write(src.join("index.js"), "module.exports = {};\n").unwrap();
        }
    }

    #[test]
    fn discovery_finds_only_typescript_plugins() {
        let tmp = TempDir::new().unwrap();
        make_plugin(tmp.path(), "plugin-alpha", true);
        make_plugin(tmp.path(), "plugin-beta", false);
        make_plugin(tmp.path(), "library-gamma", true);

        let targets = discover_targets(tmp.path(), &[]).unwrap();
        let names: Vec<String> = targets.iter().map(|t| target_name(t)).collect();
        assert_eq!(names, vec!["plugin-alpha"]);
    }

    #[test]
    fn discovery_honors_exclude_patterns() {
        let tmp = TempDir::new().unwrap();
        make_plugin(tmp.path(), "plugin-alpha", true);
        make_plugin(tmp.path(), "plugin-legacy", true);

        let targets = discover_targets(tmp.path(), &["legacy".to_string()]).unwrap();
        let names: Vec<String> = targets.iter().map(|t| target_name(t)).collect();
        assert_eq!(names, vec!["plugin-alpha"]);
    }

    #[test]
    fn discovery_is_sorted() {
        let tmp = TempDir::new().unwrap();
        make_plugin(tmp.path(), "plugin-zeta", true);
        make_plugin(tmp.path(), "plugin-alpha", true);

        let targets = discover_targets(tmp.path(), &[]).unwrap();
        let names: Vec<String> = targets.iter().map(|t| target_name(t)).collect();
        assert_eq!(names, vec!["plugin-alpha", "plugin-zeta"]);
    }

    #[test]
    fn discovery_fails_on_missing_directory() {
        let tmp = TempDir::new().unwrap();
        assert!(discover_targets(&tmp.path().join("nope"), &[]).is_err());
    }

    #[test]
    fn typescript_detection_sees_tsx() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("plugin-ui");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("App.tsx"), "export {};\n").unwrap();
        assert!(has_typescript_sources(&dir));
    }
}

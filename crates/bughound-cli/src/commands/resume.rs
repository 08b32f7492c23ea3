//! Resume command implementation.

use anyhow::{bail, Context, Result};
use bughound_core::{Config, SessionStore};
use std::path::Path;
use tracing::info;

use crate::OutputFormat;

/// Resumes a previous session, or lists available sessions when no name is
/// given.
pub fn run(
    session: Option<&str>,
    path: &Path,
    format: OutputFormat,
    config: &Config,
) -> Result<()> {
    let store = SessionStore::new(path.join(&config.analysis.checkpoints_dir))
        .context("Failed to open session store")?;

    let Some(name) = session else {
        return list_sessions(&store);
    };

    let Some(checkpoint) = store.load_latest_session(Some(name)) else {
        bail!("Session '{name}' not found");
    };

    info!(
        "Resuming session {} ({} plugins analyzed, {} errors so far)",
        checkpoint.session_name,
        checkpoint.plugins_analyzed.len(),
        checkpoint.errors.len()
    );

    let skip: Vec<String> = checkpoint
        .plugins_analyzed
        .iter()
        .map(|p| p.plugin_name.clone())
        .collect();

    super::hunt::analyze_targets(path, &[], &skip, &store, format, config)
}

fn list_sessions(store: &SessionStore) -> Result<()> {
    let sessions = store.list_sessions();
    if sessions.is_empty() {
        bail!("No previous sessions found");
    }

    println!("Available sessions:");
    for session in sessions {
        println!(
            "  {}  last updated {}  {} plugins analyzed",
            session.session_name,
            session.last_updated.to_rfc3339(),
            session.plugins_analyzed.len()
        );
    }
    Ok(())
}

//! Locates and loads the configuration file.
//!
//! Search order: the `--config` flag wins outright, then a project-level
//! `bughound.toml` (or its `.bughound.toml` dotfile twin) in the working
//! directory, then the global `~/.bughound/config.toml`. When nothing is
//! found the built-in defaults apply.

use anyhow::{Context, Result};
use bughound_core::Config;
use std::path::{Path, PathBuf};

/// Project-level config file names, in preference order.
const PROJECT_CONFIG_NAMES: &[&str] = &["bughound.toml", ".bughound.toml"];

/// File name inside the global config directory.
const GLOBAL_CONFIG_NAME: &str = "config.toml";

/// Where a configuration file was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Passed via `--config`; trusted as-is, a missing file errors at load.
    Explicit(PathBuf),
    /// Found next to the invocation in the working directory.
    Project(PathBuf),
    /// Fallback from the global config directory.
    Global(PathBuf),
    /// Nothing found anywhere.
    Default,
}

impl ConfigSource {
    /// The resolved file path, `None` for [`ConfigSource::Default`].
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Explicit(p) | Self::Project(p) | Self::Global(p) => Some(p),
            Self::Default => None,
        }
    }
}

/// Resolves and loads the configuration for this invocation.
///
/// # Errors
///
/// Returns an error if a resolved config file cannot be read or parsed.
pub fn load(explicit: Option<&Path>) -> Result<Config> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let source = resolve(&cwd, explicit, global_config_dir());

    let Some(path) = source.path() else {
        return Ok(Config::default());
    };
    if matches!(source, ConfigSource::Global(_)) {
        tracing::info!("Using global config: {}", path.display());
    } else {
        tracing::debug!("Using config: {}", path.display());
    }
    Config::from_file(path).with_context(|| format!("Failed to load config: {}", path.display()))
}

/// Walks the search order and returns the first hit.
///
/// `global_dir` is a parameter rather than read here so tests do not race on
/// the process environment.
fn resolve(
    project_dir: &Path,
    explicit: Option<&Path>,
    global_dir: Option<PathBuf>,
) -> ConfigSource {
    if let Some(path) = explicit {
        return ConfigSource::Explicit(path.to_path_buf());
    }

    if let Some(found) = PROJECT_CONFIG_NAMES
        .iter()
        .map(|name| project_dir.join(name))
        .find(|candidate| candidate.exists())
    {
        return ConfigSource::Project(found);
    }

    if let Some(candidate) = global_dir.map(|dir| dir.join(GLOBAL_CONFIG_NAME)) {
        if candidate.exists() {
            return ConfigSource::Global(candidate);
        }
    }

    ConfigSource::Default
}

/// The global config directory: `$BUGHOUND_CONFIG_DIR` when set, otherwise
/// `~/.bughound`.
#[must_use]
pub fn global_config_dir() -> Option<PathBuf> {
    std::env::var("BUGHOUND_CONFIG_DIR")
        .map(PathBuf::from)
        .ok()
        .or_else(|| home::home_dir().map(|home| home.join(".bughound")))
}

//! Configuration types for bughound.

use crate::extract::ExtractOptions;
use crate::types::Severity;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level configuration, loaded from a TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Analysis run configuration.
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// Diagnostic extractor configuration.
    #[serde(default)]
    pub extractor: ExtractorConfig,

    /// Changelog assembly configuration.
    #[serde(default)]
    pub changelog: ChangelogConfig,

    /// Partner research configuration.
    #[serde(default)]
    pub research: ResearchConfig,
}

impl Config {
    /// Creates a new default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }
}

/// Configuration for the analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Directory that holds the analyzable plugin directories.
    #[serde(default = "default_plugins_dir")]
    pub plugins_dir: PathBuf,

    /// Substring patterns excluding targets from discovery.
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Directory reports are written to.
    #[serde(default = "default_reports_dir")]
    pub reports_dir: PathBuf,

    /// Directory session snapshots are written to.
    #[serde(default = "default_checkpoints_dir")]
    pub checkpoints_dir: PathBuf,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            plugins_dir: default_plugins_dir(),
            exclude: Vec::new(),
            reports_dir: default_reports_dir(),
            checkpoints_dir: default_checkpoints_dir(),
        }
    }
}

/// Configuration for the diagnostic extractor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractorConfig {
    /// Severity assigned when the analyzer output does not specify one.
    #[serde(default)]
    pub default_severity: Severity,
}

impl ExtractorConfig {
    /// Extraction options carrying the configured defaults.
    #[must_use]
    pub fn options(&self) -> ExtractOptions {
        ExtractOptions {
            default_severity: self.default_severity,
        }
    }
}

/// Configuration for changelog assembly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangelogConfig {
    /// Repository in `owner/repo` form.
    #[serde(default = "default_repo")]
    pub repo: String,

    /// Path of the assembled changelog document.
    #[serde(default = "default_changelog_output")]
    pub output: PathBuf,
}

impl Default for ChangelogConfig {
    fn default() -> Self {
        Self {
            repo: default_repo(),
            output: default_changelog_output(),
        }
    }
}

/// Configuration for partner research enrichment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchConfig {
    /// Chat-completions endpoint URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model identifier sent with each request.
    #[serde(default = "default_model")]
    pub model: String,

    /// Directory containing partner page directories.
    #[serde(default = "default_partners_dir")]
    pub partners_dir: PathBuf,

    /// Pause between completion requests, in seconds.
    #[serde(default = "default_request_delay")]
    pub request_delay_secs: u64,
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            partners_dir: default_partners_dir(),
            request_delay_secs: default_request_delay(),
        }
    }
}

fn default_plugins_dir() -> PathBuf {
    PathBuf::from("packages")
}

fn default_reports_dir() -> PathBuf {
    PathBuf::from("reports")
}

fn default_checkpoints_dir() -> PathBuf {
    PathBuf::from("checkpoints")
}

fn default_repo() -> String {
    "elizaOS/eliza".to_string()
}

fn default_changelog_output() -> PathBuf {
    PathBuf::from("docs/changelog.md")
}

fn default_base_url() -> String {
    "https://openrouter.ai/api/v1/chat/completions".to_string()
}

fn default_model() -> String {
    "perplexity/sonar-reasoning-pro:online".to_string()
}

fn default_partners_dir() -> PathBuf {
    PathBuf::from("partners")
}

fn default_request_delay() -> u64 {
    5
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error reading config file.
    #[error("failed to read config file {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Parse error in config file.
    #[error("failed to parse config: {message}")]
    Parse {
        /// Parse error message.
        message: String,
    },
}

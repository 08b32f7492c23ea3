//! Subprocess invocation of the Node-based analysis tools.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;
use tracing::{debug, info};

/// Errors from toolchain invocation.
///
/// A non-zero exit from the linter is not an error here: a linter that found
/// issues exits non-zero and its output is still the payload we want. Only a
/// failure to spawn the subprocess at all surfaces as an error.
#[derive(Debug, Error)]
pub enum ToolchainError {
    /// The subprocess could not be spawned.
    #[error("failed to run {tool} in {dir}: {source}")]
    Spawn {
        /// Tool that failed to start.
        tool: &'static str,
        /// Directory the tool was started in.
        dir: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },
}

/// Captured output of one external tool run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolOutput {
    /// Whether the tool exited with status zero.
    pub success: bool,
    /// Exit code, -1 when terminated by signal.
    pub exit_code: i32,
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
}

impl ToolOutput {
    /// All captured lines, stdout first, for log dumps.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.stdout
            .lines()
            .chain(self.stderr.lines())
            .map(str::to_string)
            .collect()
    }
}

/// Result of the circular-dependency check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DependencyReport {
    /// Whether the checker exited with status zero.
    pub success: bool,
    /// Parsed dependency graph, `Null` when the tool emitted none.
    pub graph: Value,
    /// Captured standard error.
    pub errors: String,
}

/// Combined outcome of one target's analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisOutcome {
    /// Linter run.
    pub lint: ToolOutput,
    /// Dependency-graph run.
    pub dependencies: DependencyReport,
}

impl AnalysisOutcome {
    /// True when every tool exited cleanly.
    #[must_use]
    pub fn success(&self) -> bool {
        self.lint.success && self.dependencies.success
    }

    /// Opaque payload stored in the session checkpoint.
    #[must_use]
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Runs the Node-based analysis tools against target directories.
pub struct NodeToolchain {
    work_dir: PathBuf,
}

impl NodeToolchain {
    /// Creates a toolchain rooted at the workspace directory.
    #[must_use]
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        let work_dir = work_dir.into();
        debug!("toolchain work dir: {}", work_dir.display());
        Self { work_dir }
    }

    /// Runs the linter in check-only verbose mode inside the target
    /// directory and captures its console output.
    ///
    /// # Errors
    ///
    /// Returns an error if the subprocess cannot be spawned.
    pub fn run_lint(&self, target: &Path) -> Result<ToolOutput, ToolchainError> {
        info!("running lint check in {}", target.display());

        let output = Command::new("pnpm")
            .args(["biome", "check", "src", "--verbose"])
            .current_dir(target)
            .output()
            .map_err(|e| ToolchainError::Spawn {
                tool: "biome",
                dir: target.to_path_buf(),
                source: e,
            })?;

        let result = ToolOutput {
            success: output.status.success(),
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        info!("lint exit code: {}", result.exit_code);
        if !result.stderr.is_empty() {
            debug!("lint stderr: {}", result.stderr.trim());
        }
        Ok(result)
    }

    /// Runs the circular-dependency checker against the target and parses
    /// its JSON output best-effort.
    ///
    /// # Errors
    ///
    /// Returns an error if the subprocess cannot be spawned.
    pub fn run_dependency_check(&self, target: &Path) -> Result<DependencyReport, ToolchainError> {
        info!("running dependency check for {}", target.display());

        let output = Command::new("pnpm")
            .args(["dlx", "madge", "--json", "--warning", "--circular"])
            .arg(target)
            .current_dir(&self.work_dir)
            .output()
            .map_err(|e| ToolchainError::Spawn {
                tool: "madge",
                dir: self.work_dir.clone(),
                source: e,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let graph = if stdout.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&stdout).unwrap_or(Value::Null)
        };

        Ok(DependencyReport {
            success: output.status.success(),
            graph,
            errors: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    /// Runs the full analysis for one target.
    ///
    /// # Errors
    ///
    /// Returns an error if either subprocess cannot be spawned.
    pub fn analyze(&self, target: &Path) -> Result<AnalysisOutcome, ToolchainError> {
        let lint = self.run_lint(target)?;
        let dependencies = self.run_dependency_check(target)?;
        Ok(AnalysisOutcome { lint, dependencies })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_outcome() -> AnalysisOutcome {
        AnalysisOutcome {
            lint: ToolOutput {
                success: false,
                exit_code: 1,
                stdout: "src/a.ts:1:1 rule\nFound 1 errors.".to_string(),
                stderr: "warning: config drift".to_string(),
            },
            dependencies: DependencyReport {
                success: true,
                graph: json!({"src/a.ts": []}),
                errors: String::new(),
            },
        }
    }

    #[test]
    fn lines_interleave_stdout_then_stderr() {
        let outcome = sample_outcome();
        let lines = outcome.lint.lines();
        assert_eq!(
            lines,
            vec![
                "src/a.ts:1:1 rule",
                "Found 1 errors.",
                "warning: config drift",
            ]
        );
    }

    #[test]
    fn outcome_success_requires_both_tools() {
        let mut outcome = sample_outcome();
        assert!(!outcome.success());
        outcome.lint.success = true;
        assert!(outcome.success());
    }

    #[test]
    fn outcome_serializes_for_checkpointing() {
        let payload = sample_outcome().to_json();
        assert_eq!(payload["lint"]["exit_code"], 1);
        assert_eq!(payload["dependencies"]["success"], true);
    }
}

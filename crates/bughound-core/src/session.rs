//! Session checkpoint store.
//!
//! One analysis run is persisted as a JSON snapshot file that is rewritten in
//! full after every mutation. The store assumes a single writer process:
//! concurrent runs against the same session name can race and corrupt the
//! snapshot, which is a documented limitation of the tool, not something the
//! store guards against.
//!
//! "Latest" selection uses a monotonic sequence number stored inside each
//! snapshot, so resume does not depend on file-system timestamp resolution.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, error, info};

/// Errors from session store operations that callers must handle.
///
/// Progress mutations deliberately do not return errors: a failed checkpoint
/// write is logged and the run continues.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The checkpoint directory could not be created.
    #[error("failed to create checkpoint directory {path}: {source}")]
    CreateDir {
        /// Directory that failed.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// A snapshot file could not be written.
    #[error("failed to write snapshot {path}: {source}")]
    Write {
        /// Path that failed.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Snapshot serialization failed.
    #[error("failed to serialize snapshot: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// One analyzed target's outcome within a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginResult {
    /// Target name.
    pub plugin_name: String,
    /// When the target was analyzed.
    pub analyzed_at: DateTime<Utc>,
    /// Opaque result payload produced by the analyzer.
    pub results: Value,
}

/// A failure captured during a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorRecord {
    /// Target the failure occurred on.
    pub plugin_name: String,
    /// Failure message.
    pub error: String,
    /// When the failure was recorded.
    pub timestamp: DateTime<Utc>,
}

/// Fully-serialized state of one analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Session name chosen at start.
    pub session_name: String,
    /// Monotonic snapshot sequence number, assigned at session start.
    pub sequence: u64,
    /// When the session was started.
    pub started_at: DateTime<Utc>,
    /// When the snapshot was last rewritten.
    pub last_updated: DateTime<Utc>,
    /// Analyzed targets in completion order.
    pub plugins_analyzed: Vec<PluginResult>,
    /// Failures in occurrence order.
    pub errors: Vec<ErrorRecord>,
}

impl Session {
    /// True when the session already holds a result for the target.
    #[must_use]
    pub fn has_analyzed(&self, plugin_name: &str) -> bool {
        self.plugins_analyzed
            .iter()
            .any(|p| p.plugin_name == plugin_name)
    }
}

/// Durable, best-effort record of analysis progress.
pub struct SessionStore {
    dir: PathBuf,
}

impl SessionStore {
    /// Opens a store rooted at `dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created; this is a
    /// shared-infrastructure failure and should abort the run.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, SessionError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|e| SessionError::CreateDir {
            path: dir.clone(),
            source: e,
        })?;
        debug!("checkpoint directory: {}", dir.display());
        Ok(Self { dir })
    }

    /// The checkpoint directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Starts a new session and writes its initial snapshot.
    ///
    /// No collision check is performed: the same name can map to many
    /// snapshots over time, distinguished by sequence number.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be serialized or written.
    pub fn start_session(&self, name: &str) -> Result<PathBuf, SessionError> {
        let now = Utc::now();
        let session = Session {
            session_name: name.to_string(),
            sequence: self.next_sequence(),
            started_at: now,
            last_updated: now,
            plugins_analyzed: Vec::new(),
            errors: Vec::new(),
        };
        let path = self
            .dir
            .join(format!("{}_{}.json", name, now.format("%Y%m%d_%H%M%S")));

        info!("starting session {name}, snapshot {}", path.display());
        self.write_snapshot(&path, &session)?;
        Ok(path)
    }

    /// Appends an analyzed target's results to the latest snapshot.
    ///
    /// Logged no-op when no session exists or the rewrite fails; the caller
    /// is never interrupted by checkpointing.
    pub fn save_plugin_progress(&self, plugin_name: &str, results: Value) {
        let Some((path, mut session)) = self.latest_snapshot(None) else {
            error!("no active session found, dropping progress for {plugin_name}");
            return;
        };
        session.plugins_analyzed.push(PluginResult {
            plugin_name: plugin_name.to_string(),
            analyzed_at: Utc::now(),
            results,
        });
        session.last_updated = Utc::now();
        match self.write_snapshot(&path, &session) {
            Ok(()) => info!("saved progress for {plugin_name}"),
            Err(e) => error!("failed to checkpoint progress for {plugin_name}: {e}"),
        }
    }

    /// Appends a failure record to the latest snapshot.
    ///
    /// Same no-op discipline as [`Self::save_plugin_progress`].
    pub fn add_error(&self, plugin_name: &str, message: &str) {
        let Some((path, mut session)) = self.latest_snapshot(None) else {
            error!("no active session found, dropping error for {plugin_name}");
            return;
        };
        session.errors.push(ErrorRecord {
            plugin_name: plugin_name.to_string(),
            error: message.to_string(),
            timestamp: Utc::now(),
        });
        session.last_updated = Utc::now();
        match self.write_snapshot(&path, &session) {
            Ok(()) => error!("recorded failure for {plugin_name}: {message}"),
            Err(e) => error!("failed to checkpoint error for {plugin_name}: {e}"),
        }
    }

    /// Loads the latest snapshot whose file name contains `name`, or the
    /// latest overall when `name` is `None`.
    #[must_use]
    pub fn load_latest_session(&self, name: Option<&str>) -> Option<Session> {
        self.latest_snapshot(name).map(|(_, session)| session)
    }

    /// All readable snapshots, oldest first.
    #[must_use]
    pub fn list_sessions(&self) -> Vec<Session> {
        let mut sessions: Vec<Session> = self
            .read_snapshots(None)
            .into_iter()
            .map(|(_, session)| session)
            .collect();
        sessions.sort_by_key(|s| s.sequence);
        sessions
    }

    fn next_sequence(&self) -> u64 {
        self.read_snapshots(None)
            .into_iter()
            .map(|(_, s)| s.sequence)
            .max()
            .unwrap_or(0)
            + 1
    }

    fn latest_snapshot(&self, name: Option<&str>) -> Option<(PathBuf, Session)> {
        self.read_snapshots(name)
            .into_iter()
            .max_by_key(|(_, s)| s.sequence)
    }

    /// Reads every parseable snapshot, optionally filtered by file-name
    /// substring. Unreadable or malformed snapshots are logged and skipped.
    fn read_snapshots(&self, name: Option<&str>) -> Vec<(PathBuf, Session)> {
        let mut snapshots = Vec::new();
        let pattern = format!("{}/*.json", self.dir.display());
        let Ok(entries) = glob::glob(&pattern) else {
            return snapshots;
        };

        for path in entries.flatten() {
            if let Some(filter) = name {
                let stem = path
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default();
                if !stem.contains(filter) {
                    continue;
                }
            }
            let content = match std::fs::read_to_string(&path) {
                Ok(content) => content,
                Err(e) => {
                    debug!("skipping unreadable snapshot {}: {e}", path.display());
                    continue;
                }
            };
            match serde_json::from_str::<Session>(&content) {
                Ok(session) => snapshots.push((path, session)),
                Err(e) => debug!("skipping malformed snapshot {}: {e}", path.display()),
            }
        }

        snapshots
    }

    fn write_snapshot(&self, path: &Path, session: &Session) -> Result<(), SessionError> {
        let json = serde_json::to_string_pretty(session)?;
        std::fs::write(path, json).map_err(|e| SessionError::Write {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

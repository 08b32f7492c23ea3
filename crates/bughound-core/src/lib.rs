//! # bughound-core
//!
//! Core framework for the bughound analysis toolkit.
//!
//! This crate provides the pieces shared by every bughound workflow:
//!
//! - [`Diagnostic`] and [`Severity`] for representing lint findings
//! - [`extract`] for turning raw analyzer console output into diagnostics
//! - [`Report`] for rendering a target's findings as a markdown document
//! - [`SessionStore`] for checkpointing run progress and enabling resume
//! - [`Config`] for TOML configuration shared across subcommands
//!
//! ## Example
//!
//! ```ignore
//! use bughound_core::{extract, ExtractOptions, Report};
//! use chrono::Utc;
//!
//! let extraction = extract(&console_output, &ExtractOptions::default());
//! let report = Report::from_extraction("plugin-demo", &extraction, logs, Utc::now());
//! report.save(reports_dir)?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod extract;
mod report;
mod session;
mod types;

pub use config::{
    AnalysisConfig, ChangelogConfig, Config, ConfigError, ExtractorConfig, ResearchConfig,
};
pub use extract::{extract, DiagnosticSource, ExtractOptions, Extraction};
pub use report::{FileGroup, Report, ReportError};
pub use session::{ErrorRecord, PluginResult, Session, SessionError, SessionStore};
pub use types::{Diagnostic, Severity, SummaryCounts, SUMMARY_FILE};

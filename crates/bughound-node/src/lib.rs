//! # bughound-node
//!
//! Boundary to the external JavaScript/TypeScript analysis toolchain.
//!
//! The linter and the circular-dependency checker are opaque collaborators:
//! this crate spawns them as subprocesses against a target directory and
//! captures their combined console text and exit code, nothing more. Making
//! sense of that text is `bughound-core`'s job.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod toolchain;

pub use toolchain::{
    AnalysisOutcome, DependencyReport, NodeToolchain, ToolOutput, ToolchainError,
};

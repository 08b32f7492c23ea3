//! Subcommand implementations.

pub mod changelog;
pub mod hunt;
pub mod output;
pub mod reports;
pub mod research;
pub mod resume;

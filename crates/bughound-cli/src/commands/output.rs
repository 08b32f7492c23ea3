//! Shared output formatting for per-target analysis results.

use anyhow::Result;
use bughound_core::{Extraction, Severity};
use serde_json::json;

use crate::OutputFormat;

/// Print one target's extraction in the specified format.
pub fn print(target: &str, extraction: &Extraction, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => print_text(target, extraction),
        OutputFormat::Json => return print_json(target, extraction),
        OutputFormat::Compact => print_compact(extraction),
    }
    Ok(())
}

fn print_text(target: &str, extraction: &Extraction) {
    for diagnostic in &extraction.diagnostics {
        let severity_indicator = match diagnostic.severity {
            Severity::Error => "\x1b[31merror\x1b[0m",
            Severity::Warning => "\x1b[33mwarning\x1b[0m",
            Severity::Info => "\x1b[34minfo\x1b[0m",
        };

        println!(
            "{} at {}:{}:{}",
            diagnostic.rule, diagnostic.file, diagnostic.line, diagnostic.column,
        );
        println!(
            "  {}: {}",
            severity_indicator,
            diagnostic.message.lines().next().unwrap_or("")
        );
        println!();
    }

    let counts = extraction.effective_counts();
    let summary_color = if counts.errors > 0 {
        "\x1b[31m"
    } else if counts.warnings > 0 {
        "\x1b[33m"
    } else {
        "\x1b[32m"
    };

    println!(
        "{}{}: {} error(s), {} warning(s), {} info(s) in {} file(s)\x1b[0m",
        summary_color,
        target,
        counts.errors,
        counts.warnings,
        counts.infos,
        extraction.files_processed.len()
    );
}

fn print_json(target: &str, extraction: &Extraction) -> Result<()> {
    let payload = json!({
        "target": target,
        "counts": extraction.effective_counts(),
        "files_processed": extraction.files_processed,
        "diagnostics": extraction.diagnostics,
    });
    println!("{}", serde_json::to_string_pretty(&payload)?);
    Ok(())
}

fn print_compact(extraction: &Extraction) {
    for diagnostic in &extraction.diagnostics {
        println!(
            "{}:{}:{}: {} [{}] {}",
            diagnostic.file,
            diagnostic.line,
            diagnostic.column,
            diagnostic.severity,
            diagnostic.rule,
            diagnostic.message.lines().next().unwrap_or(""),
        );
    }
}

//! Pure formatting functions for UI output.
//!
//! The `format_*` functions build the text and are what the tests check;
//! the `display_*` functions print it.

use console::style;

use crate::domain::{FlowKind, FlowResult, StepRecord};
use crate::error::GitflowError;
use crate::warning::FlowWarning;

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red().bold(), message);
}

/// Display a non-fatal flow warning.
pub fn display_warning(warning: &FlowWarning) {
    eprintln!("{} {}", style("⚠ WARNING:").yellow(), warning);
}

/// One line of the step trace
pub fn format_step(record: &StepRecord) -> String {
    if record.detail.is_empty() {
        record.step.to_string()
    } else {
        format!("{}: {}", record.step, record.detail)
    }
}

/// Summary line for a finished flow
pub fn format_flow_summary(result: &FlowResult) -> String {
    format!(
        "Started {} branch {} at {} ({} is now at {})",
        result.kind, result.branch, result.branch_version, result.source, result.source_version
    )
}

/// Command that publishes a branch the flow left local
pub fn format_publish_hint(result: &FlowResult) -> String {
    format!("git push {} {}", result.origin, result.branch)
}

/// Header plus step-tagged message for a failed flow
pub fn format_flow_error(kind: FlowKind, err: &GitflowError) -> String {
    let mut text = format!("Failed to run {} start", kind);
    if let Some(step) = err.failed_step() {
        text.push_str(&format!(" (step: {})", step));
    }
    text.push_str(&format!("\n  {}", err));
    text
}

/// Print the step trace, warnings and summary of a successful flow.
pub fn display_flow_result(result: &FlowResult) {
    println!("\n{}", style("Steps:").bold());
    for record in &result.steps {
        println!("  {} {}", style("✓").green(), format_step(record));
    }

    for warning in &result.warnings {
        display_warning(warning);
    }

    if !result.pushed {
        println!(
            "\n{} Nothing was pushed. To publish the branch later, run:\n  {}",
            style("→").yellow(),
            style(format_publish_hint(result)).cyan()
        );
    }

    println!("\n{} {}\n", style("✓").green(), format_flow_summary(result));
}

/// Print a failed flow to stderr.
pub fn display_flow_error(kind: FlowKind, err: &GitflowError) {
    display_error(&format_flow_error(kind, err));
}

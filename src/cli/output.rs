//! CLI output formatting

use crate::core::{RunOutcome, RunPhase, StepKind};
use crate::execution::RunEvent;
use crate::history::RunRecord;
use console::Emoji;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

// Re-export style
pub use console::style;

// Emojis for output
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "✓ ");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "✗ ");
pub static SPINNER: Emoji<'_, '_> = Emoji("⏳ ", "~ ");
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "i ");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "! ");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", "> ");

/// Create a progress bar over the pipeline steps
pub fn create_progress_bar(total: usize) -> ProgressBar {
    let progress = ProgressBar::new(total as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );
    progress.enable_steady_tick(Duration::from_millis(100));
    progress
}

/// Format a run phase for display
pub fn format_phase(phase: RunPhase) -> String {
    match phase {
        RunPhase::Pending => style("PENDING").dim().to_string(),
        RunPhase::CheckedOut => style("CHECKED-OUT").yellow().to_string(),
        RunPhase::ToolchainReady => style("TOOLCHAIN-READY").yellow().to_string(),
        RunPhase::HelperReady => style("HELPER-READY").yellow().to_string(),
        RunPhase::Built => style("BUILT").yellow().to_string(),
        RunPhase::PostProcessed => style("POST-PROCESSED").yellow().to_string(),
        RunPhase::Published => style("PUBLISHED").green().to_string(),
        RunPhase::Skipped => style("SKIPPED").dim().to_string(),
        RunPhase::Failed => style("FAILED").red().to_string(),
        RunPhase::Cancelled => style("CANCELLED").yellow().to_string(),
    }
}

/// Format a run outcome for display
pub fn format_outcome(outcome: RunOutcome) -> String {
    match outcome {
        RunOutcome::Published => style("succeeded-published").green().to_string(),
        RunOutcome::Skipped => style("succeeded-skipped").cyan().to_string(),
        RunOutcome::Failed => style("failed").red().to_string(),
    }
}

/// Format a step kind for display
pub fn format_step(kind: StepKind) -> String {
    style(kind.label()).cyan().to_string()
}

/// Format a run event for display
pub fn format_run_event(event: &RunEvent) -> String {
    match event {
        RunEvent::RunStarted {
            run_id,
            pipeline,
            trigger,
        } => format!(
            "{} Starting {} ({}, trigger: {})",
            ROCKET,
            style(pipeline).bold(),
            style(&run_id.to_string()[..8]).dim(),
            style(trigger).cyan()
        ),
        RunEvent::StepStarted { kind } => {
            format!("{} {}", SPINNER, format_step(*kind))
        }
        RunEvent::StepCompleted { kind, phase } => {
            format!(
                "{} {} → {}",
                CHECK,
                style(kind.label()).green(),
                format_phase(*phase)
            )
        }
        RunEvent::StepFailed { kind, error } => {
            format!(
                "{} {}: {}",
                CROSS,
                style(kind.label()).red(),
                style(error).dim()
            )
        }
        RunEvent::PublishSkipped { reason } => {
            format!(
                "{} publish skipped ({})",
                INFO,
                style(reason).dim()
            )
        }
        RunEvent::RunCancelled { before } => {
            format!(
                "{} run cancelled before {}",
                WARN,
                style(before.label()).yellow()
            )
        }
        RunEvent::RunFinished { run_id, outcome } => {
            format!(
                "{} Run ({}) {}",
                INFO,
                style(&run_id.to_string()[..8]).dim(),
                format_outcome(*outcome)
            )
        }
    }
}

/// Format a history record for display
pub fn format_run_record(record: &RunRecord) -> String {
    let icon = match record.outcome {
        RunOutcome::Published => CHECK,
        RunOutcome::Skipped => INFO,
        RunOutcome::Failed => CROSS,
    };

    format!(
        "{} {} - {} - {} - {} - {}",
        icon,
        style(&record.run_id.to_string()[..8]).dim(),
        style(&record.pipeline).bold(),
        style(&record.trigger).cyan(),
        format_outcome(record.outcome),
        style(record.started_at.to_rfc3339()).dim()
    )
}

/// Format diagnostic output with truncation
pub fn format_diagnostics(output: &str, max_lines: usize) -> String {
    let lines: Vec<&str> = output.lines().collect();

    if lines.len() <= max_lines {
        output.to_string()
    } else {
        let truncated = lines[..max_lines].join("\n");
        format!(
            "{}\n{} ({} more lines)",
            truncated,
            style("[truncated]").dim(),
            lines.len() - max_lines
        )
    }
}

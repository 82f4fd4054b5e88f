// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use clap::ValueEnum;
use cijob_runner::RunOutcome;

#[derive(Clone, Copy, Debug, Default, PartialEq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Render the execution plan of a `--plan` request.
pub fn format_plan(outcome: &RunOutcome, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Text => {
            let width = outcome.jobs.len().to_string().len();
            let lines: Vec<String> = outcome
                .jobs
                .iter()
                .enumerate()
                .map(|(i, job)| format!("{:>width$}. {}", i + 1, job))
                .collect();
            Ok(lines.join("\n"))
        }
        OutputFormat::Json => Ok(serde_json::to_string_pretty(outcome)?),
    }
}

/// Render the summary printed after a completed run.
pub fn format_summary(outcome: &RunOutcome, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Text => {
            let jobs = outcome.jobs.len();
            let mut summary = format!(
                "{} job{} succeeded",
                jobs,
                if jobs == 1 { "" } else { "s" }
            );
            if !outcome.artifacts.is_empty() {
                summary.push_str(&format!(
                    ", collected: {}",
                    outcome.artifacts.join(", ")
                ));
            }
            Ok(summary)
        }
        OutputFormat::Json => Ok(serde_json::to_string_pretty(outcome)?),
    }
}

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! cijob - run GitLab CI jobs locally

mod color;
mod env;
mod output;

use output::OutputFormat;

use anyhow::Result;
use cijob_runner::{EnvironmentOverrides, GitlabRunner, RunError, RunEvent, RunRequest, TracedRunner};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "cijob",
    version,
    about = "Run a GitLab CI job and the jobs it needs, locally",
    after_help = "gitlab-runner only runs committed changes; the CI config is \
                  replaced in place while jobs run and restored afterwards."
)]
struct Cli {
    /// Job to run
    #[arg(long)]
    job: String,

    /// Path to the gitlab-runner executable [default: $CIJOB_RUNNER or gitlab-runner]
    #[arg(long, value_name = "PATH")]
    exe: Option<PathBuf>,

    /// Path to the CI config [default: $CIJOB_CONFIG or .gitlab-ci.yml]
    #[arg(long, value_name = "PATH")]
    conf: Option<PathBuf>,

    /// Files to make available to jobs, exposed as NAME=/tmp/gitlab-cache/<file>
    #[arg(long = "file", value_name = "NAME=PATH", num_args = 0..)]
    files: Vec<String>,

    /// Environment variables passed to every job
    #[arg(long = "env", value_name = "NAME=VALUE", num_args = 0.., value_parser = parse_key_val)]
    env: Vec<(String, String)>,

    /// Print the execution plan and exit without running anything
    #[arg(long)]
    plan: bool,

    /// Output format
    #[arg(short = 'o', long = "output", value_enum, default_value_t)]
    output: OutputFormat,

    /// Log debug output to stderr
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn into_request(self, work_dir: PathBuf) -> RunRequest {
        RunRequest {
            job: self.job,
            config_path: self.conf.unwrap_or_else(env::config_path),
            work_dir,
            files: self.files,
            env: self.env.into_iter().collect::<EnvironmentOverrides>(),
            plan_only: self.plan,
        }
    }
}

/// Parse a `NAME=value` pair; the value may itself contain `=`.
fn parse_key_val(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, _)) if key.is_empty() => Err(format!("missing variable name in '{}'", s)),
        Some((key, value)) => Ok((key.to_string(), value.to_string())),
        None => Err(format!("expected NAME=VALUE, got '{}'", s)),
    }
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        let code = exit_code(&e);
        let msg = format_error(&e);
        if !msg.is_empty() {
            eprintln!("Error: {}", msg);
        }
        std::process::exit(code);
    }
}

/// Process exit code for an error that ended the run.
fn exit_code(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<RunError>().map_or(1, RunError::exit_code)
}

/// Format an anyhow error, deduplicating the chain.
///
/// If the top-level Display already contains the source error text, we skip
/// the "Caused by" chain to avoid noisy duplicate output (common when
/// thiserror variants use `#[error("... {source}")]`).
fn format_error(err: &anyhow::Error) -> String {
    let top = err.to_string();

    let chain_redundant = err
        .chain()
        .skip(1)
        .all(|cause| top.contains(&cause.to_string()));

    if chain_redundant {
        return top;
    }

    let mut buf = top;
    for (i, cause) in err.chain().skip(1).enumerate() {
        buf.push_str(&format!("\n\nCaused by:\n    {}: {}", i, cause));
    }
    buf
}

fn setup_logging(verbose: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let default = if verbose { "debug" } else { "warn" };
    let filter = match env::log_filter() {
        Some(directives) => EnvFilter::new(directives),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let format = cli.output;
    let exe = cli.exe.clone().unwrap_or_else(env::runner_exe);
    let work_dir = std::env::current_dir()?;
    let request = cli.into_request(work_dir);
    tracing::debug!(exe = %exe.display(), config = %request.config_path.display(), "using runner");
    // JSON on stdout stays parseable only if the runner writes elsewhere
    let runner = TracedRunner::new(
        GitlabRunner::new(exe).stdout_to_stderr(format == OutputFormat::Json),
    );

    let outcome = cijob_runner::run(&request, &runner, |event| report(event, format)).await?;

    let rendered = if request.plan_only {
        output::format_plan(&outcome, format)?
    } else {
        match format {
            OutputFormat::Text => color::green(&output::format_summary(&outcome, format)?),
            OutputFormat::Json => output::format_summary(&outcome, format)?,
        }
    };
    println!("{}", rendered);
    Ok(())
}

/// Print progress; banners go to stderr when stdout carries JSON.
fn report(event: &RunEvent, format: OutputFormat) {
    if let RunEvent::JobStarted { job, .. } = event {
        let banner = color::job_banner(job);
        match format {
            OutputFormat::Text => println!("{}", banner),
            OutputFormat::Json => eprintln!("{}", banner),
        }
    }
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;

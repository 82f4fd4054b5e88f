// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! End-to-end local run of one job and its `needs`

use crate::adapter::JobRunner;
use crate::cache::{ArtifactCache, EnvironmentOverrides};
use crate::executor::execute;
use crate::guard::ConfigGuard;
use crate::{RunError, RunnerError};
use cijob_config::{load_and_resolve_includes, plan, resolve_extends, ConfigDocument};
use serde::Serialize;
use std::fmt;
use std::future::Future;
use std::path::PathBuf;
use tokio::signal::unix::{signal, SignalKind};

/// What to run and where
#[derive(Debug, Clone, Default)]
pub struct RunRequest {
    /// Target job
    pub job: String,
    /// CI config to read, replace and restore
    pub config_path: PathBuf,
    /// Project root: local includes resolve here, the runner starts here,
    /// and artifacts are collected here
    pub work_dir: PathBuf,
    /// `NAME=path` files to stage into the cache
    pub files: Vec<String>,
    /// Literal environment overrides, applied before staged files
    pub env: EnvironmentOverrides,
    /// Stop after planning without touching the disk
    pub plan_only: bool,
}

/// Driver progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Loading,
    Including,
    Extending,
    Planning,
    /// Running the plan entry at this index
    Running(usize),
    Collecting,
    Done,
    Failed,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunState::Loading => write!(f, "loading"),
            RunState::Including => write!(f, "including"),
            RunState::Extending => write!(f, "extending"),
            RunState::Planning => write!(f, "planning"),
            RunState::Running(i) => write!(f, "running[{}]", i),
            RunState::Collecting => write!(f, "collecting"),
            RunState::Done => write!(f, "done"),
            RunState::Failed => write!(f, "failed"),
        }
    }
}

/// Progress reported to the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunEvent {
    Planned { jobs: Vec<String> },
    JobStarted { job: String, index: usize, total: usize },
    JobFinished { job: String, exit_code: i32 },
    ArtifactsCollected { names: Vec<String> },
}

/// Result of a successful run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunOutcome {
    /// Jobs in execution order
    pub jobs: Vec<String>,
    /// Artifacts moved into the working directory
    pub artifacts: Vec<String>,
}

struct Tracker {
    state: RunState,
}

impl Tracker {
    fn advance(&mut self, next: RunState) {
        tracing::debug!(from = %self.state, to = %next, "run state");
        self.state = next;
    }

    /// Mark the run failed if `result` is an error
    fn check<T>(&mut self, result: Result<T, RunError>) -> Result<T, RunError> {
        if result.is_err() {
            self.advance(RunState::Failed);
        }
        result
    }
}

/// Resolves with the signal's name on the first SIGINT or SIGTERM.
///
/// Listeners are registered before this returns, so a signal delivered any
/// time afterwards is caught instead of terminating the process.
fn shutdown_signal() -> Result<impl Future<Output = &'static str>, RunnerError> {
    let mut sigint = signal(SignalKind::interrupt()).map_err(RunnerError::Signal)?;
    let mut sigterm = signal(SignalKind::terminate()).map_err(RunnerError::Signal)?;
    Ok(async move {
        tokio::select! {
            _ = sigint.recv() => "SIGINT",
            _ = sigterm.recv() => "SIGTERM",
        }
    })
}

/// Resolve the config, run the plan for `request.job`, and collect its
/// artifacts.
///
/// Nothing on disk changes before the plan is known, so configuration
/// errors leave no trace. Once the config is replaced, it is restored on
/// every exit path and the artifact cache is removed. A job exiting
/// non-zero stops the plan with [`RunError::JobFailed`] and skips
/// collection. SIGINT or SIGTERM stops the run with
/// [`RunError::Interrupted`], killing a running job.
pub async fn run<R, F>(request: &RunRequest, runner: &R, observe: F) -> Result<RunOutcome, RunError>
where
    R: JobRunner + ?Sized,
    F: FnMut(&RunEvent),
{
    let shutdown = shutdown_signal()?;
    run_until(request, runner, observe, shutdown).await
}

/// [`run`], stopped early when `shutdown` resolves with a signal name.
pub async fn run_until<R, F, S>(
    request: &RunRequest,
    runner: &R,
    mut observe: F,
    shutdown: S,
) -> Result<RunOutcome, RunError>
where
    R: JobRunner + ?Sized,
    F: FnMut(&RunEvent),
    S: Future<Output = &'static str>,
{
    let mut tracker = Tracker {
        state: RunState::Loading,
    };
    tracing::debug!(job = request.job.as_str(), path = %request.config_path.display(), "run requested");

    tracker.advance(RunState::Including);
    let doc = tracker.check(
        load_and_resolve_includes(&request.config_path, &request.work_dir).map_err(RunError::from),
    )?;
    tracker.advance(RunState::Extending);
    let doc = tracker.check(resolve_extends(doc).map_err(RunError::from))?;
    tracker.advance(RunState::Planning);
    let jobs = tracker.check(plan(&request.job, &doc).map_err(RunError::from))?;
    observe(&RunEvent::Planned { jobs: jobs.clone() });

    if request.plan_only {
        tracker.advance(RunState::Done);
        return Ok(RunOutcome {
            jobs,
            artifacts: Vec::new(),
        });
    }

    let yaml = tracker.check(doc.to_yaml().map_err(RunError::from))?;
    let guard = tracker.check(ConfigGuard::acquire(&request.config_path, &yaml))?;

    // Dropping the guarded section removes the cache and kills a running job
    let guarded = run_guarded(request, runner, &doc, &jobs, &mut tracker, &mut observe);
    let result = tokio::select! {
        biased;
        name = shutdown => {
            tracing::warn!(signal = name, "termination requested, cleaning up");
            Err(RunError::Interrupted { signal: name })
        }
        result = guarded => result,
    };
    let artifacts = tracker.check(result)?;

    tracker.check(guard.release())?;
    tracker.advance(RunState::Done);
    Ok(RunOutcome { jobs, artifacts })
}

/// Everything that runs with the resolved config in place
async fn run_guarded<R, F>(
    request: &RunRequest,
    runner: &R,
    doc: &ConfigDocument,
    jobs: &[String],
    tracker: &mut Tracker,
    observe: &mut F,
) -> Result<Vec<String>, RunError>
where
    R: JobRunner + ?Sized,
    F: FnMut(&RunEvent),
{
    let cache = ArtifactCache::create()?;
    let mut env = request.env.clone();
    env.extend(cache.stage_files(&request.files).await?);

    let total = jobs.len();
    for (index, job) in jobs.iter().enumerate() {
        tracker.advance(RunState::Running(index));
        observe(&RunEvent::JobStarted {
            job: job.clone(),
            index,
            total,
        });
        let exit_code = execute(runner, job, doc, cache.path(), &request.work_dir, &env).await?;
        observe(&RunEvent::JobFinished {
            job: job.clone(),
            exit_code,
        });
        if exit_code != 0 {
            return Err(RunError::JobFailed {
                job: job.clone(),
                exit_code,
            });
        }
    }

    tracker.advance(RunState::Collecting);
    let artifacts = cache.collect_artifacts(&request.work_dir)?;
    observe(&RunEvent::ArtifactsCollected {
        names: artifacts.clone(),
    });
    cache.close()?;
    Ok(artifacts)
}

#[cfg(test)]
#[path = "driver_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Single-job execution

use crate::adapter::{JobInvocation, JobRunner};
use crate::cache::EnvironmentOverrides;
use crate::hooks;
use crate::RunError;
use cijob_config::{ConfigDocument, ConfigError};
use std::path::Path;

/// Build the runner invocation for `job` from a resolved document.
pub fn prepare_invocation(
    job: &str,
    doc: &ConfigDocument,
    cache_dir: &Path,
    work_dir: &Path,
    env: &EnvironmentOverrides,
) -> Result<JobInvocation, RunError> {
    let spec = doc.job(job).ok_or_else(|| ConfigError::UnknownJob {
        name: job.to_string(),
        needed_by: None,
    })?;
    let artifact_paths = spec.artifact_paths()?;

    Ok(JobInvocation {
        job: job.to_string(),
        work_dir: work_dir.to_path_buf(),
        cache_dir: cache_dir.to_path_buf(),
        pre_build_script: hooks::restore_script(),
        post_build_script: hooks::capture_script(&artifact_paths),
        env: env
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect(),
    })
}

/// Run `job` once through `runner` and return its exit code verbatim.
pub async fn execute<R: JobRunner + ?Sized>(
    runner: &R,
    job: &str,
    doc: &ConfigDocument,
    cache_dir: &Path,
    work_dir: &Path,
    env: &EnvironmentOverrides,
) -> Result<i32, RunError> {
    let invocation = prepare_invocation(job, doc, cache_dir, work_dir, env)?;
    Ok(runner.run_job(&invocation).await?)
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `gitlab-runner exec docker` adapter

use super::{JobInvocation, JobRunner};
use crate::hooks::CACHE_MOUNT;
use crate::RunnerError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use tokio::process::Command;

/// Runs jobs through a local `gitlab-runner` executable
///
/// The runner inherits stdio. Dropping an in-flight [`JobRunner::run_job`]
/// future kills the runner process.
#[derive(Debug, Clone)]
pub struct GitlabRunner {
    exe: PathBuf,
    stdout_to_stderr: bool,
}

impl GitlabRunner {
    pub fn new(exe: impl Into<PathBuf>) -> Self {
        Self {
            exe: exe.into(),
            stdout_to_stderr: false,
        }
    }

    /// Send the runner's stdout to our stderr, keeping stdout for
    /// machine-readable output.
    pub fn stdout_to_stderr(mut self, enabled: bool) -> Self {
        self.stdout_to_stderr = enabled;
        self
    }

    pub fn exe(&self) -> &Path {
        &self.exe
    }

    pub fn redirects_stdout(&self) -> bool {
        self.stdout_to_stderr
    }

    /// Arguments passed to the runner executable for `invocation`
    pub fn command_args(invocation: &JobInvocation) -> Vec<String> {
        let cache_dir = invocation.cache_dir.display().to_string();
        let mut args = vec![
            "--log-level=debug".to_string(),
            "exec".to_string(),
            "docker".to_string(),
            "--docker-cache-dir".to_string(),
            cache_dir.clone(),
            "--docker-volumes".to_string(),
            format!("{}:{}", cache_dir, CACHE_MOUNT),
            "--pre-build-script".to_string(),
            invocation.pre_build_script.clone(),
            "--post-build-script".to_string(),
            invocation.post_build_script.clone(),
        ];
        for (key, value) in &invocation.env {
            args.push("--env".to_string());
            args.push(format!("{}={}", key, value));
        }
        args.push(invocation.job.clone());
        args
    }
}

#[async_trait]
impl JobRunner for GitlabRunner {
    async fn run_job(&self, invocation: &JobInvocation) -> Result<i32, RunnerError> {
        let job = invocation.job.as_str();
        let mut cmd = Command::new(&self.exe);
        cmd.args(Self::command_args(invocation))
            .current_dir(&invocation.work_dir)
            .kill_on_drop(true);
        if self.stdout_to_stderr {
            cmd.stdout(Stdio::from(std::io::stderr()));
        }

        let mut child = cmd.spawn().map_err(|source| RunnerError::SpawnFailed {
            exe: self.exe.display().to_string(),
            source,
        })?;
        tracing::debug!(job, pid = child.id(), "runner started");

        let status = child.wait().await.map_err(|source| RunnerError::Wait {
            job: job.to_string(),
            source,
        })?;
        Ok(exit_code(status))
    }
}

/// Exit code of a finished process; `128 + signal` when killed by a signal.
pub(crate) fn exit_code(status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    status
        .code()
        .or_else(|| status.signal().map(|sig| 128 + sig))
        .unwrap_or(1)
}

#[cfg(test)]
#[path = "gitlab_tests.rs"]
mod tests;

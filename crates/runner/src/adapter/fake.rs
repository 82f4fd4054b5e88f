// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake job runner for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{JobInvocation, JobRunner};
use crate::RunnerError;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

struct FakeRunnerState {
    exit_codes: HashMap<String, i32>,
    /// Files each job writes into the cache, as (relative path, contents)
    outputs: HashMap<String, Vec<(String, Vec<u8>)>>,
    interrupted: HashSet<String>,
    calls: Vec<JobInvocation>,
}

/// Fake runner that records invocations and simulates job results
#[derive(Clone)]
pub struct FakeRunner {
    inner: Arc<Mutex<FakeRunnerState>>,
}

impl Default for FakeRunner {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeRunnerState {
                exit_codes: HashMap::new(),
                outputs: HashMap::new(),
                interrupted: HashSet::new(),
                calls: Vec::new(),
            })),
        }
    }
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `job` exit with `code` (jobs succeed by default)
    pub fn set_exit_code(&self, job: &str, code: i32) {
        self.inner.lock().exit_codes.insert(job.to_string(), code);
    }

    /// Make `job` leave a file at `rel_path` in the artifact cache
    pub fn add_output(&self, job: &str, rel_path: &str, contents: impl Into<Vec<u8>>) {
        self.inner
            .lock()
            .outputs
            .entry(job.to_string())
            .or_default()
            .push((rel_path.to_string(), contents.into()));
    }

    /// Make `job` behave as if the run was interrupted by a signal
    pub fn interrupt(&self, job: &str) {
        self.inner.lock().interrupted.insert(job.to_string());
    }

    /// Get all recorded invocations
    pub fn calls(&self) -> Vec<JobInvocation> {
        self.inner.lock().calls.clone()
    }

    /// Names of the jobs run, in order
    pub fn jobs_run(&self) -> Vec<String> {
        self.inner.lock().calls.iter().map(|c| c.job.clone()).collect()
    }
}

#[async_trait]
impl JobRunner for FakeRunner {
    async fn run_job(&self, invocation: &JobInvocation) -> Result<i32, RunnerError> {
        let mut inner = self.inner.lock();
        let job = invocation.job.clone();
        inner.calls.push(invocation.clone());

        if inner.interrupted.contains(&job) {
            return Err(RunnerError::Interrupted { job });
        }

        let code = inner.exit_codes.get(&job).copied().unwrap_or(0);
        if code == 0 {
            for (rel_path, contents) in inner.outputs.get(&job).into_iter().flatten() {
                let dest = invocation.cache_dir.join(rel_path);
                let written = dest
                    .parent()
                    .map_or(Ok(()), std::fs::create_dir_all)
                    .and_then(|()| std::fs::write(&dest, contents));
                written.map_err(|source| RunnerError::Wait {
                    job: job.clone(),
                    source,
                })?;
            }
        }
        Ok(code)
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;

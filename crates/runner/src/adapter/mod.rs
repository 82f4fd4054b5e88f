// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job runner adapters

mod gitlab;

pub use gitlab::GitlabRunner;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeRunner;

use crate::RunnerError;
use async_trait::async_trait;
use std::path::PathBuf;

/// Everything a runner needs to execute one job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobInvocation {
    pub job: String,
    /// Project directory the runner is started in
    pub work_dir: PathBuf,
    /// Host side of the artifact cache mount
    pub cache_dir: PathBuf,
    pub pre_build_script: String,
    pub post_build_script: String,
    pub env: Vec<(String, String)>,
}

/// Adapter for executing a single CI job
#[async_trait]
pub trait JobRunner: Send + Sync {
    /// Run the job to completion and return its exit code
    async fn run_job(&self, invocation: &JobInvocation) -> Result<i32, RunnerError>;
}

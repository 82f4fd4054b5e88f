// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced runner wrapper for consistent observability

use crate::adapter::{JobInvocation, JobRunner};
use crate::RunnerError;
use async_trait::async_trait;
use tracing::Instrument;

/// Wrapper that adds tracing to any JobRunner
#[derive(Clone)]
pub struct TracedRunner<R> {
    inner: R,
}

impl<R> TracedRunner<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<R: JobRunner> JobRunner for TracedRunner<R> {
    async fn run_job(&self, invocation: &JobInvocation) -> Result<i32, RunnerError> {
        async {
            tracing::info!(env_count = invocation.env.len(), "starting");
            let start = std::time::Instant::now();
            let result = self.inner.run_job(invocation).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;
            match &result {
                Ok(0) => tracing::info!(elapsed_ms, "job succeeded"),
                Ok(code) => tracing::warn!(exit_code = code, elapsed_ms, "job failed"),
                Err(e) => tracing::error!(elapsed_ms, error = %e, "runner failed"),
            }
            result
        }
        .instrument(tracing::info_span!(
            "runner.run_job",
            job = invocation.job.as_str(),
            cache_dir = %invocation.cache_dir.display()
        ))
        .await
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;

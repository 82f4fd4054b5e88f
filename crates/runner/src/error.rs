// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use cijob_config::ConfigError;
use thiserror::Error;

/// Exit code reported when a run is interrupted by SIGINT/SIGTERM
pub const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Errors from a runner adapter
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("failed to start {exe}: {source}")]
    SpawnFailed {
        exe: String,
        source: std::io::Error,
    },
    #[error("failed waiting for job '{job}': {source}")]
    Wait {
        job: String,
        source: std::io::Error,
    },
    #[error("failed to install signal handler: {0}")]
    Signal(#[source] std::io::Error),
    #[error("interrupted while running job '{job}'")]
    Interrupted { job: String },
}

/// Errors from a local run
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("cannot stage file '{arg}': {message}")]
    FileStaging { arg: String, message: String },

    #[error("job '{job}' failed with exit code {exit_code}")]
    JobFailed { job: String, exit_code: i32 },

    #[error(transparent)]
    Runner(#[from] RunnerError),

    #[error("interrupted by {signal}")]
    Interrupted { signal: &'static str },

    #[error("{context}: {source}")]
    Io {
        context: String,
        source: std::io::Error,
    },
}

impl RunError {
    /// Process exit code for this error.
    ///
    /// A failed job passes its own exit code through; an interrupted run
    /// reports 130; everything else is 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            RunError::JobFailed { exit_code, .. } => *exit_code,
            RunError::Interrupted { .. } | RunError::Runner(RunnerError::Interrupted { .. }) => {
                INTERRUPTED_EXIT_CODE
            }
            _ => 1,
        }
    }

    pub(crate) fn io(context: impl Into<String>) -> impl FnOnce(std::io::Error) -> RunError {
        let context = context.into();
        move |source| RunError::Io { context, source }
    }
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Local execution of resolved GitLab CI jobs
//!
//! The driver in [`run`] loads and resolves the configuration, writes it over
//! the on-disk config for the runner (restored by [`ConfigGuard`] on every
//! exit path), and runs the planned jobs one at a time through a
//! [`JobRunner`]. Jobs share artifacts through an [`ArtifactCache`] mounted
//! into each job at [`CACHE_MOUNT`].

pub mod adapter;
mod cache;
mod driver;
mod error;
mod executor;
mod guard;
pub mod hooks;
mod traced;

pub use adapter::{GitlabRunner, JobInvocation, JobRunner};
pub use cache::{collect_artifacts, stage_files, ArtifactCache, EnvironmentOverrides};
pub use driver::{run, run_until, RunEvent, RunOutcome, RunRequest, RunState};
pub use error::{RunError, RunnerError};
pub use executor::{execute, prepare_invocation};
pub use guard::ConfigGuard;
pub use hooks::CACHE_MOUNT;
pub use traced::TracedRunner;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use adapter::FakeRunner;

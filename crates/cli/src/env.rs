// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the CLI crate.

use std::path::PathBuf;

fn non_empty(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|s| !s.is_empty())
}

// --- Defaults for flags ---

/// Runner executable: CIJOB_RUNNER > `gitlab-runner` on PATH
pub fn runner_exe() -> PathBuf {
    non_empty("CIJOB_RUNNER")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("gitlab-runner"))
}

/// CI config: CIJOB_CONFIG > `.gitlab-ci.yml` in the working directory
pub fn config_path() -> PathBuf {
    non_empty("CIJOB_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(".gitlab-ci.yml"))
}

// --- Logging ---

/// Log filter directives from CIJOB_LOG (RUST_LOG is read by EnvFilter)
pub fn log_filter() -> Option<String> {
    non_empty("CIJOB_LOG")
}

// --- Color ---

pub fn no_color() -> bool {
    std::env::var("NO_COLOR").is_ok_and(|v| v == "1")
}

pub fn force_color() -> bool {
    std::env::var("COLOR").is_ok_and(|v| v == "1")
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;

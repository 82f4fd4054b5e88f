// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading or resolving a CI configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("invalid format for {location}: {message}")]
    InvalidFormat { location: String, message: String },

    #[error("job '{job}' extends unknown job '{base}'")]
    UnknownBaseJob { job: String, base: String },

    #[error("{}", unknown_job_message(name, needed_by.as_deref()))]
    UnknownJob {
        name: String,
        needed_by: Option<String>,
    },

    #[error("cyclic {directive}: {}", chain.join(" -> "))]
    CyclicDependency {
        directive: &'static str,
        chain: Vec<String>,
    },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to serialize config: {0}")]
    Serialize(#[source] serde_yaml::Error),
}

fn unknown_job_message(name: &str, needed_by: Option<&str>) -> String {
    match needed_by {
        Some(parent) => format!("job '{}' needs unknown job '{}'", parent, name),
        None => format!("unknown job: {}", name),
    }
}

impl ConfigError {
    pub(crate) fn invalid(location: impl Into<String>, message: impl Into<String>) -> Self {
        ConfigError::InvalidFormat {
            location: location.into(),
            message: message.into(),
        }
    }
}

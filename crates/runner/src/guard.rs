// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scoped in-place replacement of the CI config file
//!
//! `gitlab-runner exec` only reads the config at its fixed path, so the
//! resolved document is written over it for the duration of a run. The
//! original bytes come back when the guard is released or dropped.

use crate::RunError;
use cijob_config::ConfigError;
use std::path::{Path, PathBuf};

/// Holds the original bytes of a config file while it is replaced.
#[derive(Debug)]
pub struct ConfigGuard {
    path: PathBuf,
    original: Vec<u8>,
    restored: bool,
}

impl ConfigGuard {
    /// Snapshot the file at `path`, then write `contents` over it.
    pub fn acquire(path: &Path, contents: &str) -> Result<Self, RunError> {
        let original = std::fs::read(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                RunError::Config(ConfigError::NotFound {
                    path: path.to_path_buf(),
                })
            } else {
                RunError::io(format!("failed to read {}", path.display()))(source)
            }
        })?;

        // From here on Drop puts the original back, including when the
        // write below fails halfway.
        let guard = Self {
            path: path.to_path_buf(),
            original,
            restored: false,
        };
        std::fs::write(&guard.path, contents)
            .map_err(RunError::io(format!("failed to write {}", path.display())))?;
        tracing::debug!(path = %path.display(), "config replaced");
        Ok(guard)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Restore the original bytes, reporting I/O errors.
    pub fn release(mut self) -> Result<(), RunError> {
        self.restored = true;
        self.restore()
    }

    fn restore(&self) -> Result<(), RunError> {
        std::fs::write(&self.path, &self.original).map_err(RunError::io(format!(
            "failed to restore {}",
            self.path.display()
        )))?;
        tracing::debug!(path = %self.path.display(), "config restored");
        Ok(())
    }
}

impl Drop for ConfigGuard {
    fn drop(&mut self) {
        if self.restored {
            return;
        }
        if let Err(e) = self.restore() {
            tracing::error!(path = %self.path.display(), error = %e, "config not restored");
        }
    }
}

#[cfg(test)]
#[path = "guard_tests.rs"]
mod tests;

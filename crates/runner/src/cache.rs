// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Ephemeral artifact cache shared by the jobs of one run

use crate::hooks::CACHE_MOUNT;
use crate::RunError;
use indexmap::IndexMap;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Environment passed to every job, in insertion order
pub type EnvironmentOverrides = IndexMap<String, String>;

const CACHE_SUFFIX: &str = "_gitlab_cache";

/// Temporary directory mounted into every job at [`CACHE_MOUNT`].
///
/// Removed with its contents when dropped.
#[derive(Debug)]
pub struct ArtifactCache {
    dir: TempDir,
}

impl ArtifactCache {
    pub fn create() -> Result<Self, RunError> {
        let dir = tempfile::Builder::new()
            .suffix(CACHE_SUFFIX)
            .tempdir()
            .map_err(RunError::io("failed to create artifact cache"))?;
        tracing::debug!(path = %dir.path().display(), "artifact cache created");
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// [`stage_files`] on the blocking pool, so a caller racing it against
    /// a shutdown signal can abandon a long copy.
    pub async fn stage_files(&self, args: &[String]) -> Result<EnvironmentOverrides, RunError> {
        let args = args.to_vec();
        let cache_dir = self.path().to_path_buf();
        tokio::task::spawn_blocking(move || stage_files(&args, &cache_dir))
            .await
            .map_err(|e| RunError::Io {
                context: "file staging task failed".to_string(),
                source: std::io::Error::other(e),
            })?
    }

    pub fn collect_artifacts(&self, work_dir: &Path) -> Result<Vec<String>, RunError> {
        collect_artifacts(self.path(), work_dir)
    }

    /// Remove the cache now, reporting failures instead of ignoring them.
    pub fn close(self) -> Result<(), RunError> {
        let path = self.dir.path().display().to_string();
        self.dir
            .close()
            .map_err(RunError::io(format!("failed to remove artifact cache {}", path)))
    }
}

/// Copy each `NAME=path` file into `cache_dir` and map `NAME` to its
/// in-container location.
pub fn stage_files(args: &[String], cache_dir: &Path) -> Result<EnvironmentOverrides, RunError> {
    let mut env = EnvironmentOverrides::new();
    for arg in args {
        let staging_err = |message: String| RunError::FileStaging {
            arg: arg.clone(),
            message,
        };

        let Some((name, path)) = arg.split_once('=') else {
            return Err(staging_err("expected NAME=path".to_string()));
        };
        let name = name.trim().trim_start_matches('$');
        let src = PathBuf::from(path.trim());
        if name.is_empty() {
            return Err(staging_err("variable name is empty".to_string()));
        }

        match std::fs::metadata(&src) {
            Ok(meta) if meta.is_file() => {}
            Ok(_) => return Err(staging_err(format!("{} is not a regular file", src.display()))),
            Err(e) => return Err(staging_err(format!("{}: {}", src.display(), e))),
        }
        let Some(file_name) = src.file_name() else {
            return Err(staging_err(format!("{} has no file name", src.display())));
        };

        std::fs::copy(&src, cache_dir.join(file_name))
            .map_err(|e| staging_err(format!("copy failed: {}", e)))?;

        let staged = format!("{}/{}", CACHE_MOUNT, file_name.to_string_lossy());
        tracing::debug!(name, src = %src.display(), staged, "staged file");
        env.insert(name.to_string(), staged);
    }
    Ok(env)
}

/// Move every entry of `cache_dir` into `work_dir`, replacing same-named
/// files or directories. Returns the moved names, sorted.
pub fn collect_artifacts(cache_dir: &Path, work_dir: &Path) -> Result<Vec<String>, RunError> {
    let read_err = RunError::io(format!("failed to read {}", cache_dir.display()));
    let mut entries = std::fs::read_dir(cache_dir)
        .and_then(|dir| dir.collect::<Result<Vec<_>, _>>())
        .map_err(read_err)?;
    entries.sort_by_key(|e| e.file_name());

    let mut names = Vec::with_capacity(entries.len());
    for entry in entries {
        let src = entry.path();
        let dest = work_dir.join(entry.file_name());
        remove_existing(&dest)?;
        move_path(&src, &dest)?;
        tracing::debug!(src = %src.display(), dest = %dest.display(), "collected artifact");
        names.push(entry.file_name().to_string_lossy().into_owned());
    }
    Ok(names)
}

fn remove_existing(path: &Path) -> Result<(), RunError> {
    let Ok(meta) = std::fs::symlink_metadata(path) else {
        return Ok(());
    };
    let removed = if meta.is_dir() {
        std::fs::remove_dir_all(path)
    } else {
        std::fs::remove_file(path)
    };
    removed.map_err(RunError::io(format!("failed to remove {}", path.display())))
}

fn move_path(src: &Path, dest: &Path) -> Result<(), RunError> {
    if std::fs::rename(src, dest).is_ok() {
        return Ok(());
    }
    // rename fails across filesystems (tmpfs cache, disk work dir)
    let moved = copy_recursive(src, dest).and_then(|()| {
        if src.is_dir() {
            std::fs::remove_dir_all(src)
        } else {
            std::fs::remove_file(src)
        }
    });
    moved.map_err(RunError::io(format!(
        "failed to move {} to {}",
        src.display(),
        dest.display()
    )))
}

fn copy_recursive(src: &Path, dest: &Path) -> std::io::Result<()> {
    if !src.is_dir() {
        return std::fs::copy(src, dest).map(|_| ());
    }
    std::fs::create_dir_all(dest)?;
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        copy_recursive(&entry.path(), &dest.join(entry.file_name()))?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "cache_tests.rs"]
mod tests;

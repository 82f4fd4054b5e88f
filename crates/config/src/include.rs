// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Config-level `include` support
//!
//! ```yaml
//! include:
//!   - local: ci/build.yml
//!   - ci/lint.yml
//! ```
//!
//! Included documents are merged into the including one key by key: an
//! included key replaces the value already there (last include wins). No
//! deep merge happens at this level.

use crate::document::INCLUDE_KEY;
use crate::parser::read_document;
use crate::{ConfigDocument, ConfigError};
use serde_yaml::Value;
use std::path::{Path, PathBuf};

/// Include kinds that need the network or a GitLab instance.
const REMOTE_KINDS: &[&str] = &["remote", "template", "project", "component"];

/// Where an `include` entry points
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IncludeSource {
    /// A file in the repository
    Local(String),
    /// Anything that needs a GitLab instance to resolve
    Remote { kind: String, target: String },
}

/// Load the document at `path` and merge every document it includes.
///
/// Local include paths are resolved against `project_root` (the repository
/// checkout the job runs in), with or without a leading `/`, wherever the
/// root config itself lives. Included documents may include further
/// documents.
pub fn load_and_resolve_includes(
    path: &Path,
    project_root: &Path,
) -> Result<ConfigDocument, ConfigError> {
    let mut stack = Vec::new();
    load_with_includes(path, project_root, &mut stack)
}

fn load_with_includes(
    path: &Path,
    project_root: &Path,
    stack: &mut Vec<PathBuf>,
) -> Result<ConfigDocument, ConfigError> {
    let mut doc = read_document(path)?;

    // The file exists at this point, so canonicalize only fails on races
    let key = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    if stack.contains(&key) {
        let mut chain: Vec<String> = stack.iter().map(|p| p.display().to_string()).collect();
        chain.push(key.display().to_string());
        return Err(ConfigError::CyclicDependency {
            directive: INCLUDE_KEY,
            chain,
        });
    }

    let sources = match doc.remove(INCLUDE_KEY) {
        Some(value) => include_sources(&value, path)?,
        None => return Ok(doc),
    };

    stack.push(key);
    for source in sources {
        match source {
            IncludeSource::Local(local) => {
                let included_path = project_root.join(local.trim_start_matches('/'));
                tracing::debug!(
                    from = %path.display(),
                    include = %included_path.display(),
                    "including config"
                );
                let included = load_with_includes(&included_path, project_root, stack)?;
                for key in included.keys().filter(|k| doc.contains(k)) {
                    tracing::debug!(key, include = %included_path.display(), "include overrides key");
                }
                doc.update(included);
            }
            IncludeSource::Remote { kind, target } => {
                tracing::warn!(kind, target, "skipping include that needs a GitLab instance");
            }
        }
    }
    stack.pop();

    Ok(doc)
}

/// Normalize the value of an `include` key into a list of sources.
fn include_sources(value: &Value, path: &Path) -> Result<Vec<IncludeSource>, ConfigError> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Sequence(entries) => entries
            .iter()
            .enumerate()
            .map(|(i, entry)| include_source(entry, &location(path, Some(i))))
            .collect(),
        entry => Ok(vec![include_source(entry, &location(path, None))?]),
    }
}

fn include_source(entry: &Value, location: &str) -> Result<IncludeSource, ConfigError> {
    match entry {
        Value::String(target) if is_url(target) => Ok(IncludeSource::Remote {
            kind: "remote".to_string(),
            target: target.clone(),
        }),
        Value::String(local) => Ok(IncludeSource::Local(local.clone())),
        Value::Mapping(fields) => {
            if let Some(local) = fields.get("local") {
                return local
                    .as_str()
                    .map(|s| IncludeSource::Local(s.to_string()))
                    .ok_or_else(|| ConfigError::invalid(location, "'local' must be a path"));
            }
            for kind in REMOTE_KINDS {
                if let Some(target) = fields.get(*kind) {
                    return Ok(IncludeSource::Remote {
                        kind: kind.to_string(),
                        target: target.as_str().unwrap_or_default().to_string(),
                    });
                }
            }
            Err(ConfigError::invalid(
                location,
                format!(
                    "expected one of: local, {}",
                    REMOTE_KINDS.join(", ")
                ),
            ))
        }
        _ => Err(ConfigError::invalid(
            location,
            "expected a path or an include mapping",
        )),
    }
}

fn is_url(target: &str) -> bool {
    target.starts_with("https://") || target.starts_with("http://")
}

fn location(path: &Path, index: Option<usize>) -> String {
    match index {
        Some(i) => format!("{}: include[{}]", path.display(), i),
        None => format!("{}: include", path.display()),
    }
}

#[cfg(test)]
#[path = "include_tests.rs"]
mod tests;

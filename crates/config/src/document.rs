// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Configuration document model

use crate::ConfigError;
use indexmap::IndexMap;
use serde::Serialize;
use serde_yaml::{Mapping, Value};

pub(crate) const INCLUDE_KEY: &str = "include";
pub(crate) const EXTENDS_KEY: &str = "extends";
pub(crate) const VARIABLES_KEY: &str = "variables";
const NEEDS_KEY: &str = "needs";
const ARTIFACTS_KEY: &str = "artifacts";
const PATHS_KEY: &str = "paths";

/// A CI configuration document.
///
/// Top-level keys keep their source order so the document written back for
/// the runner reads like the one on disk. Job entries are mapping values;
/// everything else (`stages`, `default`, global `variables`) is carried as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ConfigDocument {
    entries: IndexMap<String, Value>,
}

impl ConfigDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: IndexMap<String, Value>) -> Self {
        Self { entries }
    }

    /// Get a top-level entry by key
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Get a job by name. Returns `None` for missing keys and for top-level
    /// entries that are not mappings.
    pub fn job(&self, name: &str) -> Option<JobSpec<'_>> {
        let (name, value) = self.entries.get_key_value(name)?;
        let body = value.as_mapping()?;
        Some(JobSpec { name, body })
    }

    /// All mapping entries in document order
    pub fn jobs(&self) -> impl Iterator<Item = JobSpec<'_>> {
        self.entries.iter().filter_map(|(name, value)| {
            value.as_mapping().map(|body| JobSpec { name, body })
        })
    }

    /// Insert an entry. An existing key keeps its position.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.entries.insert(key.into(), value)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.entries.shift_remove(key)
    }

    /// Overwrite this document's keys with `other`'s.
    ///
    /// Keys already present keep their position and take the new value;
    /// new keys are appended. No deep merge happens.
    pub fn update(&mut self, other: ConfigDocument) {
        for (key, value) in other.entries {
            self.entries.insert(key, value);
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serialize back to YAML
    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        serde_yaml::to_string(&self.entries).map_err(ConfigError::Serialize)
    }
}

/// One entry of a job's `needs` list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Need<'a> {
    pub job: &'a str,
    pub optional: bool,
}

/// Read-only view of a job entry
#[derive(Debug, Clone, Copy)]
pub struct JobSpec<'a> {
    name: &'a str,
    body: &'a Mapping,
}

impl<'a> JobSpec<'a> {
    pub fn name(&self) -> &'a str {
        self.name
    }

    pub fn body(&self) -> &'a Mapping {
        self.body
    }

    /// Base jobs named by `extends`, in merge order.
    ///
    /// Accepts a single name or a list of names.
    pub fn extends(&self) -> Result<Vec<&'a str>, ConfigError> {
        match self.body.get(EXTENDS_KEY) {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::String(base)) => Ok(vec![base.as_str()]),
            Some(Value::Sequence(bases)) => bases
                .iter()
                .map(|base| {
                    base.as_str().ok_or_else(|| {
                        ConfigError::invalid(self.location(EXTENDS_KEY), "expected job name")
                    })
                })
                .collect(),
            Some(_) => Err(ConfigError::invalid(
                self.location(EXTENDS_KEY),
                "expected a job name or a list of job names",
            )),
        }
    }

    pub fn variables(&self) -> Result<Option<&'a Mapping>, ConfigError> {
        match self.body.get(VARIABLES_KEY) {
            None => Ok(None),
            Some(Value::Mapping(vars)) => Ok(Some(vars)),
            Some(_) => Err(ConfigError::invalid(
                self.location(VARIABLES_KEY),
                "expected a mapping",
            )),
        }
    }

    /// Direct dependencies, in declaration order.
    ///
    /// Entries are job names or `{ job = <name>, optional = <bool> }` mappings.
    pub fn needs(&self) -> Result<Vec<Need<'a>>, ConfigError> {
        let entries = match self.body.get(NEEDS_KEY) {
            None | Some(Value::Null) => return Ok(Vec::new()),
            Some(Value::Sequence(entries)) => entries,
            Some(_) => {
                return Err(ConfigError::invalid(
                    self.location(NEEDS_KEY),
                    "expected a list",
                ))
            }
        };

        let mut needs = Vec::with_capacity(entries.len());
        for (i, entry) in entries.iter().enumerate() {
            let need = match entry {
                Value::String(job) => Need {
                    job: job.as_str(),
                    optional: false,
                },
                Value::Mapping(fields) => {
                    let job = fields.get("job").and_then(Value::as_str).ok_or_else(|| {
                        ConfigError::invalid(
                            format!("{}.{}[{}]", self.name, NEEDS_KEY, i),
                            "missing 'job' field",
                        )
                    })?;
                    let optional = fields
                        .get("optional")
                        .and_then(Value::as_bool)
                        .unwrap_or(false);
                    Need { job, optional }
                }
                _ => {
                    return Err(ConfigError::invalid(
                        format!("{}.{}[{}]", self.name, NEEDS_KEY, i),
                        "expected a job name",
                    ))
                }
            };
            needs.push(need);
        }
        Ok(needs)
    }

    /// Path patterns listed under `artifacts.paths`
    pub fn artifact_paths(&self) -> Result<Vec<&'a str>, ConfigError> {
        let Some(paths) = self
            .body
            .get(ARTIFACTS_KEY)
            .and_then(Value::as_mapping)
            .and_then(|artifacts| artifacts.get(PATHS_KEY))
        else {
            return Ok(Vec::new());
        };
        let location = || format!("{}.{}.{}", self.name, ARTIFACTS_KEY, PATHS_KEY);
        match paths {
            Value::Null => Ok(Vec::new()),
            Value::Sequence(paths) => paths
                .iter()
                .map(|p| {
                    p.as_str()
                        .ok_or_else(|| ConfigError::invalid(location(), "expected a path"))
                })
                .collect(),
            _ => Err(ConfigError::invalid(location(), "expected a list of paths")),
        }
    }

    fn location(&self, key: &str) -> String {
        format!("{}.{}", self.name, key)
    }
}

#[cfg(test)]
#[path = "document_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job-level `extends` flattening

use crate::document::{EXTENDS_KEY, VARIABLES_KEY};
use crate::{ConfigDocument, ConfigError};
use indexmap::IndexMap;
use serde_yaml::{Mapping, Value};
use std::collections::HashMap;

/// Flatten every job that declares `extends` onto its base jobs.
///
/// Merge rule for each base, in declaration order: start from the resolved
/// base, overlay the child's keys (child wins), except `variables`, which is
/// merged key by key (base first, child wins per key). `extends` is dropped
/// from the result.
///
/// Bases are resolved before their children whatever the document order, so
/// chains of any depth flatten completely. Cycles are rejected.
pub fn resolve_extends(doc: ConfigDocument) -> Result<ConfigDocument, ConfigError> {
    let mut resolver = ExtendsResolver {
        source: &doc,
        resolved: HashMap::new(),
        visiting: Vec::new(),
    };

    let mut entries = IndexMap::with_capacity(doc.len());
    for (name, value) in doc.iter() {
        let value = match value {
            Value::Mapping(_) => Value::Mapping(resolver.resolve(name)?),
            other => other.clone(),
        };
        entries.insert(name.to_string(), value);
    }
    Ok(ConfigDocument::from_entries(entries))
}

struct ExtendsResolver<'a> {
    source: &'a ConfigDocument,
    resolved: HashMap<&'a str, Mapping>,
    visiting: Vec<&'a str>,
}

impl<'a> ExtendsResolver<'a> {
    fn resolve(&mut self, name: &'a str) -> Result<Mapping, ConfigError> {
        if let Some(done) = self.resolved.get(name) {
            return Ok(done.clone());
        }
        if let Some(pos) = self.visiting.iter().position(|n| *n == name) {
            let mut chain: Vec<String> = self.visiting[pos..].iter().map(|n| n.to_string()).collect();
            chain.push(name.to_string());
            return Err(ConfigError::CyclicDependency {
                directive: EXTENDS_KEY,
                chain,
            });
        }

        let Some(job) = self.source.job(name) else {
            return Err(ConfigError::invalid(name, "expected a job mapping"));
        };
        let bases = job.extends()?;
        if bases.is_empty() {
            let body = job.body().clone();
            self.resolved.insert(job.name(), body.clone());
            return Ok(body);
        }

        self.visiting.push(job.name());
        let mut merged = Mapping::new();
        let mut variables = Mapping::new();
        for base in bases {
            match self.source.get(base) {
                None => {
                    return Err(ConfigError::UnknownBaseJob {
                        job: name.to_string(),
                        base: base.to_string(),
                    })
                }
                Some(Value::Mapping(_)) => {}
                Some(_) => {
                    return Err(ConfigError::invalid(
                        format!("{}.{}", name, EXTENDS_KEY),
                        format!("base '{}' is not a job mapping", base),
                    ))
                }
            }
            let base_body = self.resolve(base)?;
            if let Some(Value::Mapping(base_vars)) = base_body.get(VARIABLES_KEY) {
                overlay(&mut variables, base_vars);
            }
            overlay(&mut merged, &base_body);
        }
        self.visiting.pop();

        for (key, value) in job.body() {
            if key.as_str() == Some(EXTENDS_KEY) {
                continue;
            }
            merged.insert(key.clone(), value.clone());
        }
        if let Some(child_vars) = job.variables()? {
            overlay(&mut variables, child_vars);
        }
        if !variables.is_empty() {
            merged.insert(Value::String(VARIABLES_KEY.to_string()), Value::Mapping(variables));
        }

        self.resolved.insert(job.name(), merged.clone());
        Ok(merged)
    }
}

/// Copy every entry of `from` into `into`; existing keys keep their position.
fn overlay(into: &mut Mapping, from: &Mapping) {
    for (key, value) in from {
        into.insert(key.clone(), value.clone());
    }
}

#[cfg(test)]
#[path = "extends_tests.rs"]
mod tests;

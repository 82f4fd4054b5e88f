// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dependency ordering from `needs`

use crate::{ConfigDocument, ConfigError};
use std::collections::HashMap;

const NEEDS_DIRECTIVE: &str = "needs";

/// Resolve the transitive `needs` of `job` into an execution order.
///
/// Depth-first, pre-order: each dependency's own dependencies come first,
/// then the dependency itself. Names already in the result are skipped, so
/// the first-seen order wins. `job` itself is not part of the result; see
/// [`plan`].
///
/// Optional needs (`{ job = x, optional = true }`) naming a job that does
/// not exist are dropped.
pub fn resolve_dependencies(job: &str, doc: &ConfigDocument) -> Result<Vec<String>, ConfigError> {
    if doc.job(job).is_none() {
        return Err(ConfigError::UnknownJob {
            name: job.to_string(),
            needed_by: None,
        });
    }
    let mut walker = NeedsWalker {
        doc,
        visiting: Vec::new(),
        memo: HashMap::new(),
    };
    walker.walk(job)
}

/// The full execution plan for `job`: its dependencies, then `job`.
pub fn plan(job: &str, doc: &ConfigDocument) -> Result<Vec<String>, ConfigError> {
    let mut jobs = resolve_dependencies(job, doc)?;
    jobs.push(job.to_string());
    Ok(jobs)
}

struct NeedsWalker<'a> {
    doc: &'a ConfigDocument,
    visiting: Vec<String>,
    memo: HashMap<String, Vec<String>>,
}

impl NeedsWalker<'_> {
    fn walk(&mut self, name: &str) -> Result<Vec<String>, ConfigError> {
        if let Some(done) = self.memo.get(name) {
            return Ok(done.clone());
        }
        if let Some(pos) = self.visiting.iter().position(|n| n == name) {
            let mut chain = self.visiting[pos..].to_vec();
            chain.push(name.to_string());
            return Err(ConfigError::CyclicDependency {
                directive: NEEDS_DIRECTIVE,
                chain,
            });
        }

        let doc = self.doc;
        let Some(spec) = doc.job(name) else {
            return Err(ConfigError::UnknownJob {
                name: name.to_string(),
                needed_by: None,
            });
        };

        self.visiting.push(name.to_string());
        let mut result: Vec<String> = Vec::new();
        for need in spec.needs()? {
            if doc.job(need.job).is_none() {
                if need.optional {
                    tracing::debug!(job = name, need = need.job, "skipping missing optional need");
                    continue;
                }
                return Err(ConfigError::UnknownJob {
                    name: need.job.to_string(),
                    needed_by: Some(name.to_string()),
                });
            }
            for dep in self.walk(need.job)? {
                if !result.contains(&dep) {
                    result.push(dep);
                }
            }
            if !result.iter().any(|d| d == need.job) {
                result.push(need.job.to_string());
            }
        }
        self.visiting.pop();

        self.memo.insert(name.to_string(), result.clone());
        Ok(result)
    }
}

#[cfg(test)]
#[path = "needs_tests.rs"]
mod tests;

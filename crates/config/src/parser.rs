// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! YAML parsing for CI configuration documents

use crate::{ConfigDocument, ConfigError};
use indexmap::IndexMap;
use serde_yaml::Value;
use std::path::Path;

/// Read and parse the document at `path`.
pub fn read_document(path: &Path) -> Result<ConfigDocument, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            ConfigError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;
    parse_document(&content, path)
}

/// Parse a document from YAML content. `origin` is only used in errors.
///
/// YAML merge keys (`<<: *anchor`) are expanded. An empty document parses
/// to an empty [`ConfigDocument`].
pub fn parse_document(content: &str, origin: &Path) -> Result<ConfigDocument, ConfigError> {
    let parse_err = |source| ConfigError::Parse {
        path: origin.to_path_buf(),
        source,
    };

    let mut value: Value = serde_yaml::from_str(content).map_err(parse_err)?;
    value.apply_merge().map_err(parse_err)?;

    let mapping = match value {
        Value::Null => return Ok(ConfigDocument::new()),
        Value::Mapping(mapping) => mapping,
        _ => {
            return Err(ConfigError::invalid(
                origin.display().to_string(),
                "top level must be a mapping of job names",
            ))
        }
    };

    let mut entries = IndexMap::with_capacity(mapping.len());
    for (key, value) in mapping {
        let Value::String(key) = key else {
            return Err(ConfigError::invalid(
                origin.display().to_string(),
                format!("top-level key must be a string, found {:?}", key),
            ));
        };
        entries.insert(key, value);
    }
    Ok(ConfigDocument::from_entries(entries))
}

#[cfg(test)]
#[path = "parser_tests.rs"]
mod tests;

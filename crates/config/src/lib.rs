// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! GitLab CI configuration loading and resolution
//!
//! `gitlab-runner exec` understands neither `include` nor `extends`, so the
//! configuration is flattened here before a job is handed to the runner:
//!
//! ```text
//! load_and_resolve_includes(path, root)   root + included documents, last include wins
//!   └── resolve_extends(doc)              every job flattened onto its bases
//!         └── plan(job, doc)              transitive `needs`, dependencies first
//! ```
//!
//! Each stage consumes a [`ConfigDocument`] and returns a new one; nothing
//! keeps a live reference to a base job after resolution.

mod document;
mod error;
mod extends;
mod include;
mod needs;
mod parser;

pub use document::{ConfigDocument, JobSpec, Need};
pub use error::ConfigError;
pub use extends::resolve_extends;
pub use include::{load_and_resolve_includes, IncludeSource};
pub use needs::{plan, resolve_dependencies};
pub use parser::{parse_document, read_document};

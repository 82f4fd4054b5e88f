// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pre/post build scripts that move artifacts through the cache mount
//!
//! Every job gets the artifact cache bind-mounted at [`CACHE_MOUNT`]. Before
//! the job body runs, whatever earlier jobs left in the cache is copied into
//! the job directory; afterwards the job's `artifacts.paths` are copied into
//! the cache for the next job (and for the final collection on the host).

/// In-container path of the artifact cache
pub const CACHE_MOUNT: &str = "/tmp/gitlab-cache";

/// Script run before the job body.
///
/// Only an absent or empty cache is tolerated (the first job of a plan has
/// nothing to restore). Any copy error fails the script.
pub fn restore_script() -> String {
    format!(
        r#"if [ -d {mount} ] && [ -n "$(ls -A {mount})" ]; then cp -r {mount}/. ./; fi"#,
        mount = CACHE_MOUNT
    )
}

/// Script run after the job body: copy each artifact path into the cache.
pub fn capture_script(artifact_paths: &[&str]) -> String {
    let mut lines = Vec::with_capacity(artifact_paths.len() + 1);
    lines.push(r#"cd "$CI_PROJECT_DIR""#.to_string());
    for path in artifact_paths {
        lines.push(format!("cp -r {} {}/", shell_word(path), CACHE_MOUNT));
    }
    lines.join("\n")
}

/// Quote `s` for use as a single shell word.
///
/// Glob characters are left unquoted so artifact patterns like
/// `build/*.bin` still expand. A word with any other special character is
/// single-quoted as a whole (and loses its glob meaning).
pub fn shell_word(s: &str) -> String {
    if !s.is_empty() && s.chars().all(is_plain_char) {
        return s.to_string();
    }
    format!("'{}'", s.replace('\'', r"'\''"))
}

fn is_plain_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || "_-./*?[]@%+=:,^".contains(c)
}

#[cfg(test)]
#[path = "hooks_tests.rs"]
mod tests;

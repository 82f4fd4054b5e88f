// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::io::IsTerminal;

pub mod codes {
    /// Job banners
    pub const YELLOW: &str = "\x1b[1;33m";
    /// Success summaries
    pub const GREEN: &str = "\x1b[32m";
    pub const RESET: &str = "\x1b[0m";
}

/// Width of the rule printed above each job banner
const RULE_WIDTH: usize = 80;

/// Determine if color output should be enabled.
///
/// Priority: `NO_COLOR=1` disables → `COLOR=1` forces → TTY check.
pub fn should_colorize() -> bool {
    if crate::env::no_color() {
        return false;
    }
    if crate::env::force_color() {
        return true;
    }
    std::io::stdout().is_terminal()
}

/// Apply green to text, respecting color settings.
pub fn green(text: &str) -> String {
    paint(codes::GREEN, text, should_colorize())
}

/// Banner printed before each job of a plan.
pub fn job_banner(job: &str) -> String {
    render_banner(job, should_colorize())
}

pub(crate) fn render_banner(job: &str, colorize: bool) -> String {
    format!(
        "{}\n{}",
        paint(codes::YELLOW, &"-".repeat(RULE_WIDTH), colorize),
        paint(codes::YELLOW, &format!("# Running {}", job), colorize)
    )
}

fn paint(code: &str, text: &str, colorize: bool) -> String {
    if colorize {
        format!("{code}{text}{}", codes::RESET)
    } else {
        text.to_string()
    }
}

#[cfg(test)]
#[path = "color_tests.rs"]
mod tests;

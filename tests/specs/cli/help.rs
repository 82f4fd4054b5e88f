//! CLI help and version specs

use crate::prelude::*;

#[test]
fn help_lists_flags() {
    cli()
        .args(&["--help"])
        .passes()
        .stdout_has("--job <JOB>")
        .stdout_has("--exe <PATH>")
        .stdout_has("--conf <PATH>")
        .stdout_has("NAME=PATH")
        .stdout_has("NAME=VALUE")
        .stdout_has("--plan");
}

#[test]
fn version_prints_name() {
    cli().args(&["--version"]).passes().stdout_has("cijob ");
}

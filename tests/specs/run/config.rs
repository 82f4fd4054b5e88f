//! Config replacement specs
//!
//! The runner sees a flattened config while jobs run; the original bytes
//! come back afterwards.

use crate::prelude::*;

#[test]
fn runner_sees_flattened_config() {
    let project = Project::with_config(PIPELINE);
    project.cijob().args(&["--job", "test"]).passes();

    let seen = project.config_seen_by("test");
    assert!(!seen.contains("extends"), "{seen}");
    assert!(seen.contains("python:3.12"), "{seen}");
    assert!(seen.contains("PIP_CACHE_DIR: .pip"), "{seen}");
    assert!(seen.contains("MODE: release"), "{seen}");
}

#[test]
fn runner_sees_included_jobs() {
    let project = Project::with_config("include: ci/lint.yml\nbuild:\n  script: make\n");
    project.file("ci/lint.yml", "lint:\n  script: flake8\n");
    project.cijob().args(&["--job", "lint"]).passes();

    let seen = project.config_seen_by("lint");
    assert!(!seen.contains("include"), "{seen}");
    assert!(seen.contains("flake8"), "{seen}");
}

#[test]
fn config_is_byte_identical_after_success() {
    let project = Project::with_config(PIPELINE);
    project.cijob().args(&["--job", "test"]).passes();
    assert_eq!(project.read(".gitlab-ci.yml"), PIPELINE);
}

#[test]
fn custom_config_path_is_replaced_and_restored() {
    let project = Project::empty();
    let config = "lint:\n  extends: .base\n.base:\n  script: flake8\n";
    project.file("ci/root.yml", config);
    project.file(".gitlab-ci.yml", "# untouched\n");

    project
        .cijob()
        .args(&["--job", "lint", "--conf", "ci/root.yml"])
        .passes();

    assert_eq!(project.read("ci/root.yml"), config);
    assert_eq!(project.read(".gitlab-ci.yml"), "# untouched\n");
}

#[test]
fn custom_config_includes_resolve_from_project_root() {
    let project = Project::empty();
    let config = "include:\n  - local: ci/lint.yml\n";
    project.file("ci/root.yml", config);
    project.file("ci/lint.yml", "lint:\n  script: flake8\n");

    project
        .cijob()
        .args(&["--job", "lint", "--conf", "ci/root.yml"])
        .passes();

    assert_eq!(project.runner_calls(), vec!["lint"]);
    assert_eq!(project.read("ci/root.yml"), config);
}

//! Job execution specs

use crate::prelude::*;

#[test]
fn runs_needs_then_target() {
    let project = Project::with_config(PIPELINE);
    project
        .cijob()
        .args(&["--job", "test"])
        .passes()
        .stdout_has("# Running build")
        .stdout_has("# Running test")
        .stdout_has("2 jobs succeeded");
    assert_eq!(project.runner_calls(), vec!["build", "test"]);
}

#[test]
fn job_without_needs_runs_alone() {
    let project = Project::with_config(PIPELINE);
    project.cijob().args(&["--job", "lint"]).passes();
    assert_eq!(project.runner_calls(), vec!["lint"]);
}

#[test]
fn banner_precedes_each_job() {
    let project = Project::with_config(PIPELINE);
    let run = project.cijob().args(&["--job", "test"]).passes();
    let stdout = run.stdout();
    let rule = "-".repeat(80);
    let build = stdout.find("# Running build").unwrap();
    let test = stdout.find("# Running test").unwrap();
    assert!(build < test);
    assert!(stdout[..build].contains(&rule), "{stdout}");
}

#[test]
fn failing_job_exit_code_passes_through() {
    let project = Project::with_config(PIPELINE);
    project.job_exits("build", 7);
    project
        .cijob()
        .args(&["--job", "test"])
        .fails()
        .code(7)
        .stderr_has("job 'build' failed with exit code 7");
    assert_eq!(project.runner_calls(), vec!["build"]);
    assert_eq!(project.read(".gitlab-ci.yml"), PIPELINE);
}

#[test]
fn env_pairs_reach_every_job_in_order() {
    let project = Project::with_config(PIPELINE);
    project
        .cijob()
        .args(&["--job", "test", "--env", "PACKAGE=example", "URL=a=b"])
        .passes();
    assert_eq!(
        project.runner_env(),
        vec!["PACKAGE=example", "URL=a=b", "PACKAGE=example", "URL=a=b"]
    );
}

#[test]
fn staged_file_is_in_cache_and_env() {
    let project = Project::with_config(PIPELINE);
    project.file("secrets/key.gpg", "secret");
    project
        .cijob()
        .args(&["--job", "lint", "--file", "$GPG_KEY=secrets/key.gpg"])
        .passes();
    assert_eq!(project.runner_env(), vec!["GPG_KEY=/tmp/gitlab-cache/key.gpg"]);
    assert_eq!(project.cache_seen_by("lint"), vec!["key.gpg"]);
}

#[test]
fn missing_staged_file_runs_nothing() {
    let project = Project::with_config(PIPELINE);
    project
        .cijob()
        .args(&["--job", "lint", "--file", "KEY=missing.gpg"])
        .fails()
        .code(1)
        .stderr_has("cannot stage file 'KEY=missing.gpg'");
    assert!(project.runner_calls().is_empty());
    assert_eq!(project.read(".gitlab-ci.yml"), PIPELINE);
}

#[test]
fn json_output_keeps_runner_output_off_stdout() {
    let project = Project::with_config(PIPELINE);
    let run = project
        .cijob()
        .args(&["--job", "test", "-o", "json"])
        .passes()
        .stderr_has("fake runner: job build");

    let value: serde_json::Value = serde_json::from_str(&run.stdout()).unwrap();
    assert_eq!(value["jobs"], serde_json::json!(["build", "test"]));
}

#[test]
fn text_output_passes_runner_output_through() {
    let project = Project::with_config(PIPELINE);
    project
        .cijob()
        .args(&["--job", "lint"])
        .passes()
        .stdout_has("fake runner: job lint");
}

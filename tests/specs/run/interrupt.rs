//! Interruption specs
//!
//! SIGINT at any point after the config is replaced exits 130 with the
//! original config back in place and no cache left behind.

use crate::prelude::*;
use std::path::{Path, PathBuf};

fn cache_dirs(tmp: &Path) -> Vec<PathBuf> {
    std::fs::read_dir(tmp)
        .map(|entries| {
            entries
                .filter_map(|e| e.ok().map(|e| e.path()))
                .filter(|p| p.to_string_lossy().ends_with("_gitlab_cache"))
                .collect()
        })
        .unwrap_or_default()
}

#[test]
fn sigint_while_staging_restores_config() {
    let project = Project::with_config(PIPELINE);
    // Should staging win the race, the signal lands mid-job instead
    project.job_sleeps("build", 30);
    let tmp = project.path().join("tmp");
    std::fs::create_dir_all(&tmp).unwrap();
    let big = project.path().join("big.bin");
    std::fs::File::create(&big)
        .unwrap()
        .set_len(3 << 30)
        .unwrap();

    let mut child = project
        .cijob()
        .env("TMPDIR", &tmp)
        .args(&["--job", "build", "--file", &format!("BIG={}", big.display())])
        .spawn();

    let staging = wait_for(10_000, || {
        cache_dirs(&tmp).iter().any(|dir| dir.join("big.bin").exists())
    });
    assert!(staging, "staging never started");
    assert_ne!(project.read(".gitlab-ci.yml"), PIPELINE, "config replaced during the run");

    interrupt(&child);
    let status = wait_exit(&mut child, 10_000);

    assert_eq!(status.code(), Some(130));
    assert_eq!(project.read(".gitlab-ci.yml"), PIPELINE);
    assert!(cache_dirs(&tmp).is_empty(), "{:?}", cache_dirs(&tmp));
}

#[test]
fn sigint_while_job_runs_restores_config() {
    let project = Project::with_config(PIPELINE);
    project.job_sleeps("build", 30);

    let mut child = project.cijob().args(&["--job", "test"]).spawn();

    assert!(wait_for(10_000, || project.runner_calls() == vec!["build"]));
    interrupt(&child);
    let status = wait_exit(&mut child, 10_000);

    assert_eq!(status.code(), Some(130));
    assert_eq!(project.read(".gitlab-ci.yml"), PIPELINE);
    assert_eq!(project.runner_calls(), vec!["build"]);
}

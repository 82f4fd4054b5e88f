//! Test helpers for behavioral specifications.
//!
//! Provides a high-level DSL for testing cijob CLI behavior.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, dead_code)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Output, Stdio};
use std::time::{Duration, Instant};

/// Returns the path to a binary, checking llvm-cov target directory first.
/// Falls back to resolving relative to the test binary itself when
/// CARGO_MANIFEST_DIR is stale.
fn binary_path(name: &str) -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));

    let llvm_cov_path = manifest_dir.join("target/llvm-cov-target/debug").join(name);
    if llvm_cov_path.exists() {
        return llvm_cov_path;
    }

    let standard = manifest_dir.join("target/debug").join(name);
    if standard.exists() {
        return standard;
    }

    // The test binary lives at target/debug/deps/specs-<hash>
    if let Ok(exe) = std::env::current_exe() {
        if let Some(debug_dir) = exe.parent().and_then(|d| d.parent()) {
            let fallback = debug_dir.join(name);
            if fallback.exists() {
                return fallback;
            }
        }
    }

    standard
}

/// Returns a Command configured to run the cijob binary
pub fn cijob_cmd() -> Command {
    Command::new(binary_path("cijob"))
}

/// Create a CLI builder for cijob commands
pub fn cli() -> CliBuilder {
    CliBuilder::new()
}

/// High-level CLI builder for fluent test assertions
pub struct CliBuilder {
    args: Vec<String>,
    dir: Option<PathBuf>,
    envs: Vec<(String, String)>,
}

impl CliBuilder {
    fn new() -> Self {
        Self {
            args: Vec::new(),
            dir: None,
            envs: vec![("NO_COLOR".into(), "1".into())],
        }
    }

    /// Add CLI arguments
    pub fn args(mut self, args: &[&str]) -> Self {
        self.args.extend(args.iter().map(|s| s.to_string()));
        self
    }

    /// Set working directory
    pub fn pwd(mut self, path: impl Into<PathBuf>) -> Self {
        self.dir = Some(path.into());
        self
    }

    /// Set environment variable
    pub fn env(mut self, key: &str, value: impl AsRef<Path>) -> Self {
        self.envs.push((
            key.to_string(),
            value.as_ref().to_string_lossy().to_string(),
        ));
        self
    }

    /// Build the command without running it
    pub fn command(self) -> Command {
        let mut cmd = cijob_cmd();
        cmd.args(&self.args);

        if let Some(dir) = self.dir {
            cmd.current_dir(dir);
        }

        // Parent settings would change defaults under test
        for var in ["CIJOB_RUNNER", "CIJOB_CONFIG", "CIJOB_LOG", "RUST_LOG", "COLOR"] {
            cmd.env_remove(var);
        }

        for (key, value) in self.envs {
            cmd.env(key, value);
        }

        cmd
    }

    /// Start in the background with output discarded
    pub fn spawn(self) -> Child {
        self.command()
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .expect("command should start")
    }

    /// Run and return the result regardless of exit code
    pub fn runs(self) -> RunAssert {
        let mut cmd = self.command();
        let output = cmd.output().expect("command should run");
        RunAssert { output }
    }

    /// Run and expect success (exit code 0)
    pub fn passes(self) -> RunAssert {
        let run = self.runs();
        assert!(
            run.output.status.success(),
            "expected command to pass, got exit code {:?}\nstdout: {}\nstderr: {}",
            run.output.status.code(),
            run.stdout(),
            run.stderr()
        );
        run
    }

    /// Run and expect failure (non-zero exit code)
    pub fn fails(self) -> RunAssert {
        let run = self.runs();
        assert!(
            !run.output.status.success(),
            "expected command to fail, but it passed\nstdout: {}\nstderr: {}",
            run.stdout(),
            run.stderr()
        );
        run
    }
}

/// Result of a CLI run for chaining assertions
pub struct RunAssert {
    output: Output,
}

impl RunAssert {
    /// Get stdout as string
    pub fn stdout(&self) -> String {
        String::from_utf8_lossy(&self.output.stdout).into_owned()
    }

    /// Get stderr as string
    pub fn stderr(&self) -> String {
        String::from_utf8_lossy(&self.output.stderr).into_owned()
    }

    /// Assert the process exit code
    pub fn code(self, expected: i32) -> Self {
        assert_eq!(
            self.output.status.code(),
            Some(expected),
            "stdout: {}\nstderr: {}",
            self.stdout(),
            self.stderr()
        );
        self
    }

    /// Assert stdout equals expected exactly (with diff on failure).
    /// **Prefer this for format specs** - catches format regressions.
    pub fn stdout_eq(self, expected: &str) -> Self {
        let stdout = self.stdout();
        similar_asserts::assert_eq!(stdout, expected);
        self
    }

    /// Assert stdout contains substring.
    pub fn stdout_has(self, expected: &str) -> Self {
        let stdout = self.stdout();
        assert!(
            stdout.contains(expected),
            "stdout does not contain '{}'\nstdout: {}",
            expected,
            stdout
        );
        self
    }

    /// Assert stdout does not contain substring.
    pub fn stdout_lacks(self, unexpected: &str) -> Self {
        let stdout = self.stdout();
        assert!(
            !stdout.contains(unexpected),
            "stdout should not contain '{}'\nstdout: {}",
            unexpected,
            stdout
        );
        self
    }

    /// Assert stderr contains substring.
    pub fn stderr_has(self, expected: &str) -> Self {
        let stderr = self.stderr();
        assert!(
            stderr.contains(expected),
            "stderr does not contain '{}'\nstderr: {}",
            expected,
            stderr
        );
        self
    }
}

/// Poll `condition` every 10ms until it holds or `timeout_ms` passes
pub fn wait_for<F: FnMut() -> bool>(timeout_ms: u64, mut condition: F) -> bool {
    let deadline = Instant::now() + Duration::from_millis(timeout_ms);
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    false
}

/// Send SIGINT to a running child, as Ctrl-C would
pub fn interrupt(child: &Child) {
    let status = Command::new("kill")
        .args(["-INT", &child.id().to_string()])
        .status()
        .expect("kill should run");
    assert!(status.success(), "kill -INT failed");
}

/// Wait for `child` to exit, killing it if it outlives `timeout_ms`
pub fn wait_exit(child: &mut Child, timeout_ms: u64) -> ExitStatus {
    let mut status = None;
    wait_for(timeout_ms, || {
        status = child.try_wait().unwrap();
        status.is_some()
    });
    match status {
        Some(status) => status,
        None => {
            let _ = child.kill();
            panic!("process did not exit within {timeout_ms}ms");
        }
    }
}

// =============================================================================
// Fake gitlab-runner
// =============================================================================

/// Stand-in for `gitlab-runner exec docker`.
///
/// Records each job name to `calls.log`, each `--env` pair to `env.log`, the
/// config it sees to `<job>.config` and the cache listing to `<job>.cache`.
/// `<job>.outputs` lists file names to create in the cache (artifacts);
/// `<job>.sleep` holds seconds to sleep before finishing;
/// `<job>.exit` holds the exit code to return. Prints one line to stdout.
const FAKE_RUNNER: &str = r#"#!/bin/sh
state="$(dirname "$0")"
cache=""
job=""
while [ $# -gt 0 ]; do
  case "$1" in
    --docker-volumes) cache="${2%%:*}"; shift 2 ;;
    --docker-cache-dir|--pre-build-script|--post-build-script) shift 2 ;;
    --env) echo "$2" >> "$state/env.log"; shift 2 ;;
    --log-level=*|exec|docker) shift ;;
    *) job="$1"; shift ;;
  esac
done
echo "$job" >> "$state/calls.log"
echo "fake runner: job $job"
cp .gitlab-ci.yml "$state/$job.config" 2>/dev/null
ls "$cache" > "$state/$job.cache"
if [ -f "$state/$job.outputs" ]; then
  while read -r name; do
    echo "from $job" > "$cache/$name"
  done < "$state/$job.outputs"
fi
if [ -f "$state/$job.sleep" ]; then
  sleep "$(cat "$state/$job.sleep")"
fi
if [ -f "$state/$job.exit" ]; then
  exit "$(cat "$state/$job.exit")"
fi
exit 0
"#;

// =============================================================================
// Project
// =============================================================================

/// Temporary project directory with a fake runner.
pub struct Project {
    dir: tempfile::TempDir,
    runner_dir: tempfile::TempDir,
}

impl Project {
    /// Create a project with `.gitlab-ci.yml` set to `config`
    pub fn with_config(config: &str) -> Self {
        let project = Self::empty();
        project.file(".gitlab-ci.yml", config);
        project
    }

    /// Create an empty project
    pub fn empty() -> Self {
        let runner_dir = tempfile::tempdir().unwrap();
        let runner = runner_dir.path().join("gitlab-runner");
        std::fs::write(&runner, FAKE_RUNNER).unwrap();
        std::fs::set_permissions(&runner, std::fs::Permissions::from_mode(0o755)).unwrap();
        Self {
            dir: tempfile::tempdir().unwrap(),
            runner_dir,
        }
    }

    /// Get the project path
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Path of the fake runner executable
    pub fn runner(&self) -> PathBuf {
        self.runner_dir.path().join("gitlab-runner")
    }

    /// Write a file at the given path (parent directories created automatically)
    pub fn file(&self, path: impl AsRef<Path>, content: &str) {
        let full_path = self.dir.path().join(path.as_ref());
        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(full_path, content).unwrap();
    }

    /// Read a project file
    pub fn read(&self, path: impl AsRef<Path>) -> String {
        std::fs::read_to_string(self.dir.path().join(path.as_ref())).unwrap()
    }

    /// Make `job` exit with `code`
    pub fn job_exits(&self, job: &str, code: i32) {
        std::fs::write(self.runner_dir.path().join(format!("{job}.exit")), code.to_string())
            .unwrap();
    }

    /// Make `job` take `seconds` to finish
    pub fn job_sleeps(&self, job: &str, seconds: u32) {
        std::fs::write(self.runner_dir.path().join(format!("{job}.sleep")), seconds.to_string())
            .unwrap();
    }

    /// Make `job` leave artifacts named `names` in the cache
    pub fn job_outputs(&self, job: &str, names: &[&str]) {
        let mut listing = names.join("\n");
        listing.push('\n');
        std::fs::write(self.runner_dir.path().join(format!("{job}.outputs")), listing).unwrap();
    }

    /// Jobs the runner was invoked with, in order
    pub fn runner_calls(&self) -> Vec<String> {
        self.runner_log("calls.log")
    }

    /// `--env` pairs the runner received, in order
    pub fn runner_env(&self) -> Vec<String> {
        self.runner_log("env.log")
    }

    /// Config contents the runner saw while running `job`
    pub fn config_seen_by(&self, job: &str) -> String {
        std::fs::read_to_string(self.runner_dir.path().join(format!("{job}.config")))
            .unwrap_or_default()
    }

    /// Cache entries present when `job` started
    pub fn cache_seen_by(&self, job: &str) -> Vec<String> {
        self.runner_log(&format!("{job}.cache"))
    }

    fn runner_log(&self, name: &str) -> Vec<String> {
        std::fs::read_to_string(self.runner_dir.path().join(name))
            .map(|s| s.lines().map(str::to_string).collect())
            .unwrap_or_default()
    }

    /// Run cijob in this project's context with the fake runner
    pub fn cijob(&self) -> CliBuilder {
        cli()
            .pwd(self.path())
            .env("CIJOB_RUNNER", self.runner())
    }
}

/// Base template, two jobs sharing an artifact and a job with no needs
pub const PIPELINE: &str = "\
# Pipeline used across specs
stages: [build, test]

.python:
  image: python:3.12
  variables:
    PIP_CACHE_DIR: .pip
    MODE: debug

build:
  extends: .python
  stage: build
  script: make
  artifacts:
    paths: [app.bin]

test:
  extends: .python
  stage: test
  needs: [build]
  variables:
    MODE: release
  script: make test

lint:
  script: flake8
";

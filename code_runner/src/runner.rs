//! Sandboxed test runner.
//!
//! Materializes an extracted student module next to the hidden test template
//! in a private per-run directory, executes the suite in a single child
//! process, and enforces a hard wall-clock timeout. Isolation is best-effort
//! and process-level only; the hard guarantees are the timeout and the
//! scoped-resource contract (the per-run directory and the child process are
//! released on every exit path).

use crate::error::RunnerError;
use crate::extractor::ExtractedFunctionSet;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::{
    process::Command,
    time::{Duration, timeout},
};
use tracing::{debug, warn};

/// The outcome of one hidden-test execution.
///
/// Either the run completed (success or failure, with captured output) or it
/// timed out; `timed_out` implies `success == false` and empty output.
#[derive(Debug, Clone, Serialize)]
pub struct TestRunOutcome {
    /// True when the child exited with status zero (all hidden tests passed).
    pub success: bool,
    /// Captured standard output, verbatim.
    pub stdout: String,
    /// Captured standard error, verbatim.
    pub stderr: String,
    /// True when the wall-clock timeout expired and the child was killed.
    pub timed_out: bool,
}

impl TestRunOutcome {
    fn timed_out() -> Self {
        Self {
            success: false,
            stdout: String::new(),
            stderr: String::new(),
            timed_out: true,
        }
    }
}

/// Executes hidden test suites against extracted student modules.
pub struct TestRunner {
    scratch_root: PathBuf,
    timeout: Duration,
    program: String,
    args: Vec<String>,
}

/// Filename the extracted module is materialized under; the hidden test
/// template requires it by this name.
const MODULE_FILE: &str = "student_solution.js";
const TEST_FILE: &str = "test.js";

impl TestRunner {
    /// Creates a runner rooted at `scratch_root`.
    ///
    /// A stale scratch root left behind by an interrupted run is cleared
    /// before use, never merged into.
    pub fn new(scratch_root: PathBuf, timeout_secs: u64) -> Result<Self, RunnerError> {
        if scratch_root.exists() {
            warn!(root = %scratch_root.display(), "clearing stale runner scratch directory");
            fs::remove_dir_all(&scratch_root)?;
        }
        fs::create_dir_all(&scratch_root)?;

        Ok(Self {
            scratch_root,
            timeout: Duration::from_secs(timeout_secs),
            program: "npx".to_string(),
            args: vec!["mocha".to_string()],
        })
    }

    /// Overrides the tool invocation used to execute the test file.
    ///
    /// The test file path and any suite filter are appended to `args`.
    pub fn with_command(mut self, program: impl Into<String>, args: Vec<String>) -> Self {
        self.program = program.into();
        self.args = args;
        self
    }

    /// Verifies the external tooling once per batch.
    ///
    /// A missing runtime or test framework is an infrastructure error, not a
    /// grading result; it is surfaced before any submission is attempted.
    pub async fn preflight(&self) -> Result<(), RunnerError> {
        for (tool, args) in [("node", vec!["--version"]), ("npx", vec!["mocha", "--version"])] {
            let status = Command::new(tool)
                .args(&args)
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status()
                .await
                .map_err(|_| RunnerError::ToolingUnavailable(tool.to_string()))?;
            if !status.success() {
                return Err(RunnerError::ToolingUnavailable(format!(
                    "{} {}",
                    tool,
                    args.join(" ")
                )));
            }
        }
        Ok(())
    }

    /// Runs the hidden test template against an extracted module.
    ///
    /// `suite_filter` narrows the run to one describe block (passed to the
    /// test tool as `--grep`), so one criterion's outcome is independent of
    /// failures in another criterion's suite.
    pub async fn run(
        &self,
        module: &ExtractedFunctionSet,
        template: &Path,
        suite_filter: Option<&str>,
    ) -> Result<TestRunOutcome, RunnerError> {
        // Dropped on every exit path below, removing the run directory.
        let run_dir = tempfile::Builder::new()
            .prefix("run-")
            .tempdir_in(&self.scratch_root)?;

        fs::write(run_dir.path().join(MODULE_FILE), module.module_source())?;
        fs::copy(template, run_dir.path().join(TEST_FILE))?;

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args).arg(TEST_FILE);
        if let Some(suite) = suite_filter {
            cmd.arg("--grep").arg(suite);
        }
        let child = cmd
            .current_dir(run_dir.path())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(RunnerError::Spawn)?;

        match timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => {
                let outcome = TestRunOutcome {
                    success: output.status.success(),
                    stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                    stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                    timed_out: false,
                };
                debug!(success = outcome.success, "hidden test run completed");
                Ok(outcome)
            }
            Ok(Err(e)) => Err(RunnerError::Io(e)),
            Err(_) => {
                // Dropping the wait future kills the child (kill_on_drop).
                warn!(timeout_secs = self.timeout.as_secs(), "hidden test run timed out");
                Ok(TestRunOutcome::timed_out())
            }
        }
    }
}

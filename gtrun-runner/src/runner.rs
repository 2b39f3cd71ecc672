// Copyright (c) The gtrun Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Sequential test execution and aggregation.

use crate::{
    gtest_cli::GtestCli,
    list::{TestInstance, TestList},
    reporter::Reporter,
};
use camino::Utf8Path;
use std::io;
use tracing::debug;

/// Exit code recorded for a child that terminated without one (killed by a
/// signal) or that could not be spawned at all.
const ABORTED_EXIT_CODE: i32 = 101;

/// Captured outcome of one test execution.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ExecuteStatus {
    /// The child's exit code.
    pub exit_code: i32,
    /// Captured standard output.
    pub stdout: Vec<u8>,
    /// Captured standard error.
    pub stderr: Vec<u8>,
}

impl ExecuteStatus {
    /// True if the test passed.
    pub fn is_success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Aggregate results of a run, built by folding per-test statuses.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct RunSummary {
    /// Number of tests that exited 0.
    pub passed: usize,
    /// Number of tests that exited non-zero.
    pub failed: usize,
    exit_code: i32,
}

impl RunSummary {
    /// Returns the summary with one more status folded in.
    ///
    /// A failing status overwrites the recorded exit code, so after the fold
    /// the summary carries the code of the last failure seen.
    #[must_use]
    pub fn with_status(self, status: &ExecuteStatus) -> Self {
        if status.is_success() {
            Self {
                passed: self.passed + 1,
                ..self
            }
        } else {
            Self {
                failed: self.failed + 1,
                exit_code: status.exit_code,
                ..self
            }
        }
    }

    /// Folds a sequence of statuses into a summary.
    pub fn from_statuses<'a>(statuses: impl IntoIterator<Item = &'a ExecuteStatus>) -> Self {
        statuses
            .into_iter()
            .fold(Self::default(), |summary, status| {
                summary.with_status(status)
            })
    }

    /// True if no test failed.
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// The run's process exit code: 0 on success, otherwise the exit code of
    /// the last failing test.
    pub fn exit_code(&self) -> i32 {
        self.exit_code
    }
}

/// Runs every test in a list, one child process at a time.
#[derive(Clone, Debug)]
pub struct TestRunner<'a> {
    binary: &'a Utf8Path,
    color: bool,
}

impl<'a> TestRunner<'a> {
    /// Creates a runner for the given binary. `color` is forwarded to the
    /// binary's `--gtest_color` flag.
    pub fn new(binary: &'a Utf8Path, color: bool) -> Self {
        Self { binary, color }
    }

    /// Executes the tests in listing order, reporting each result as it
    /// arrives, and returns the folded summary.
    ///
    /// Each child is fully waited on before the next is spawned, and a
    /// failing test does not stop the run. Errors out of this function come
    /// from the reporter's writer, never from the tests.
    pub fn execute<W: io::Write>(
        &self,
        test_list: &TestList,
        reporter: &mut Reporter<W>,
    ) -> io::Result<RunSummary> {
        reporter.report_run_started(self.binary)?;
        let mut summary = RunSummary::default();
        for test in test_list.iter() {
            let status = self.execute_test(test);
            reporter.report_test(&status)?;
            summary = summary.with_status(&status);
        }
        reporter.report_summary(&summary)?;
        Ok(summary)
    }

    fn execute_test(&self, test: &TestInstance) -> ExecuteStatus {
        let test_id = test.id();
        debug!("running {test_id}");
        let expression = GtestCli::run_test(self.binary, &test_id, self.color)
            .to_expression()
            .stdout_capture()
            .stderr_capture()
            .unchecked();
        match expression.run() {
            Ok(output) => ExecuteStatus {
                exit_code: output.status.code().unwrap_or(ABORTED_EXIT_CODE),
                stdout: output.stdout,
                stderr: output.stderr,
            },
            Err(error) => ExecuteStatus {
                exit_code: ABORTED_EXIT_CODE,
                stdout: Vec::new(),
                stderr: error.to_string().into_bytes(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn status(exit_code: i32) -> ExecuteStatus {
        ExecuteStatus {
            exit_code,
            stdout: Vec::new(),
            stderr: Vec::new(),
        }
    }

    #[test]
    fn test_summary_last_failure_wins() {
        let statuses: Vec<_> = [0, 0, 5, 0, 7].into_iter().map(status).collect();
        let summary = RunSummary::from_statuses(&statuses);
        assert_eq!(summary.passed, 3);
        assert_eq!(summary.failed, 2);
        assert_eq!(summary.exit_code(), 7);
        assert!(!summary.is_success());
        assert_eq!(summary.passed + summary.failed, statuses.len());
    }

    #[test]
    fn test_summary_all_passed() {
        let statuses: Vec<_> = [0, 0, 0].into_iter().map(status).collect();
        let summary = RunSummary::from_statuses(&statuses);
        assert_eq!(summary.passed, 3);
        assert_eq!(summary.failed, 0);
        assert_eq!(summary.exit_code(), 0);
        assert!(summary.is_success());
    }

    #[test]
    fn test_summary_empty_run() {
        let summary = RunSummary::from_statuses([]);
        assert_eq!(summary.passed, 0);
        assert_eq!(summary.failed, 0);
        assert_eq!(summary.exit_code(), 0);
        assert!(summary.is_success());
    }

    #[cfg(unix)]
    mod execution {
        use super::*;
        use crate::test_helpers::fake_gtest;
        use pretty_assertions::assert_eq;
        use camino_tempfile::Utf8TempDir;
        use indoc::indoc;

        #[test]
        fn test_execute_reports_and_aggregates() {
            let dir = Utf8TempDir::new().expect("temp dir created");
            // Fails only the case selected by a `*flaky*` filter, mirroring a
            // binary where one test fails and the rest pass.
            let binary = fake_gtest(
                &dir,
                "snmp_tests",
                indoc! {r#"
                    #!/bin/sh
                    case "$2" in
                        *flaky*)
                            echo "expected 4, got 5"
                            echo "assertion failed" >&2
                            exit 5
                            ;;
                    esac
                    exit 0
                "#},
            );
            let test_list = TestList::parse(indoc! {"
                Running main() from gtest_main.cc
                vardata_tests.
                  packString
                  flakyCase
            "});

            let mut buf = Vec::new();
            let mut reporter = Reporter::new(&mut buf);
            let summary = TestRunner::new(&binary, true)
                .execute(&test_list, &mut reporter)
                .expect("report writing succeeded");

            assert_eq!(summary.passed, 1);
            assert_eq!(summary.failed, 1);
            assert_eq!(summary.exit_code(), 5);

            let report = String::from_utf8(buf).expect("report is valid UTF-8");
            let expected = format!(
                "+RUNNING: {binary}\n\
                 +STDERR:\n\
                 assertion failed\n\n\
                 +STDOUT:\n\
                 expected 4, got 5\n\n\
                 +TEST SUMMARY PASSED = 1\n\
                 +TEST SUMMARY FAILED = 1\n"
            );
            assert_eq!(report, expected);
        }

        #[test]
        fn test_execute_spawn_failure_counts_as_failure() {
            let dir = Utf8TempDir::new().expect("temp dir created");
            let missing = dir.path().join("no_such_tests");
            let test_list = TestList::parse(indoc! {"
                Running main() from gtest_main.cc
                vardata_tests.
                  packString
            "});

            let mut buf = Vec::new();
            let mut reporter = Reporter::new(&mut buf);
            let summary = TestRunner::new(&missing, false)
                .execute(&test_list, &mut reporter)
                .expect("report writing succeeded");

            assert_eq!(summary.passed, 0);
            assert_eq!(summary.failed, 1);
            assert_eq!(summary.exit_code(), ABORTED_EXIT_CODE);
        }
    }
}

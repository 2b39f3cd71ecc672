// Copyright (c) The gtrun Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::output::StderrStyles;
use gtrun_runner::{errors::WriteTestListError, runner::RunSummary};
use owo_colors::OwoColorize;
use std::error::Error;
use thiserror::Error;
use tracing::error;

pub(crate) type Result<T, E = ExpectedError> = std::result::Result<T, E>;

/// Exit code for failures in the runner itself, as opposed to failures
/// reported by the tests it ran.
const SETUP_ERROR_CODE: i32 = 96;

// The #[error()] strings are placeholders -- expected errors are rendered
// with display_to_stderr, which colorizes them.

/// An error expected during normal operation, mapped to a process exit code.
#[derive(Debug, Error)]
#[doc(hidden)]
pub enum ExpectedError {
    #[error("could not determine current directory")]
    CurrentDirFailed {
        #[source]
        error: std::io::Error,
    },
    #[error("error writing test list")]
    WriteTestListError {
        #[from]
        err: WriteTestListError,
    },
    #[error("error writing run report")]
    ReportWriteFailed {
        #[source]
        error: std::io::Error,
    },
    #[error("test run failed")]
    TestRunFailed { failed: usize, exit_code: i32 },
}

impl ExpectedError {
    pub(crate) fn current_dir_failed(error: std::io::Error) -> Self {
        Self::CurrentDirFailed { error }
    }

    pub(crate) fn report_write_failed(error: std::io::Error) -> Self {
        Self::ReportWriteFailed { error }
    }

    pub(crate) fn test_run_failed(summary: &RunSummary) -> Self {
        Self::TestRunFailed {
            failed: summary.failed,
            exit_code: summary.exit_code(),
        }
    }

    /// The exit code for the process.
    pub fn process_exit_code(&self) -> i32 {
        match self {
            Self::CurrentDirFailed { .. }
            | Self::WriteTestListError { .. }
            | Self::ReportWriteFailed { .. } => SETUP_ERROR_CODE,
            // The run's exit code is the exit code of the last failing test.
            Self::TestRunFailed { exit_code, .. } => *exit_code,
        }
    }

    /// Displays this error to stderr.
    pub fn display_to_stderr(&self, styles: &StderrStyles) {
        let mut next_error = match self {
            Self::CurrentDirFailed { error } => {
                error!("could not determine current directory");
                Some(error as &dyn Error)
            }
            Self::WriteTestListError { err } => {
                error!("{err}");
                err.source()
            }
            Self::ReportWriteFailed { error } => {
                error!("failed to write run report");
                Some(error as &dyn Error)
            }
            Self::TestRunFailed { failed, .. } => {
                error!(
                    "{} {} failed",
                    failed.style(styles.bold),
                    if *failed == 1 { "test" } else { "tests" }
                );
                None
            }
        };
        while let Some(err) = next_error {
            error!(target: "gtrun::no_heading", "  caused by: {err}");
            next_error = err.source();
        }
    }
}

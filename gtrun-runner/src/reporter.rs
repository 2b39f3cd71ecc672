// Copyright (c) The gtrun Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Run reporting.
//!
//! Events are written as `+`-prefixed marker lines so they stand out from
//! whatever the tests themselves print.

use crate::runner::{ExecuteStatus, RunSummary};
use camino::Utf8Path;
use owo_colors::{OwoColorize, Style};
use std::io::{self, Write};

/// Reports run progress to a writer.
pub struct Reporter<W> {
    writer: W,
    styles: Styles,
}

impl<W: Write> Reporter<W> {
    /// Creates a reporter writing to `writer`.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            styles: Styles::default(),
        }
    }

    /// Colorizes the summary counts.
    pub fn colorize(&mut self) {
        self.styles.colorize();
    }

    /// Announces the binary under test.
    pub fn report_run_started(&mut self, binary: &Utf8Path) -> io::Result<()> {
        writeln!(self.writer, "+RUNNING: {binary}")
    }

    /// Reports one executed test. Passing tests print nothing; failing tests
    /// dump the captured streams, stderr first.
    pub fn report_test(&mut self, status: &ExecuteStatus) -> io::Result<()> {
        if status.is_success() {
            return Ok(());
        }
        writeln!(self.writer, "+STDERR:")?;
        self.writer.write_all(&status.stderr)?;
        writeln!(self.writer)?;
        writeln!(self.writer, "+STDOUT:")?;
        self.writer.write_all(&status.stdout)?;
        writeln!(self.writer)
    }

    /// Prints the two summary lines.
    pub fn report_summary(&mut self, summary: &RunSummary) -> io::Result<()> {
        writeln!(
            self.writer,
            "+TEST SUMMARY PASSED = {}",
            summary.passed.style(self.styles.passed)
        )?;
        writeln!(
            self.writer,
            "+TEST SUMMARY FAILED = {}",
            summary.failed.style(self.styles.failed)
        )
    }

    /// Flushes the underlying writer.
    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

#[derive(Clone, Debug, Default)]
struct Styles {
    passed: Style,
    failed: Style,
}

impl Styles {
    fn colorize(&mut self) {
        self.passed = Style::new().green().bold();
        self.failed = Style::new().red().bold();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn report_of(f: impl FnOnce(&mut Reporter<&mut Vec<u8>>) -> io::Result<()>) -> String {
        let mut buf = Vec::new();
        let mut reporter = Reporter::new(&mut buf);
        f(&mut reporter).expect("report written");
        String::from_utf8(buf).expect("report is valid UTF-8")
    }

    #[test]
    fn test_run_started_line() {
        let out = report_of(|reporter| reporter.report_run_started(Utf8Path::new("./snmp_tests")));
        assert_eq!(out, "+RUNNING: ./snmp_tests\n");
    }

    #[test]
    fn test_passing_test_prints_nothing() {
        let out = report_of(|reporter| {
            reporter.report_test(&ExecuteStatus {
                exit_code: 0,
                stdout: b"noise".to_vec(),
                stderr: b"more noise".to_vec(),
            })
        });
        assert_eq!(out, "");
    }

    #[test]
    fn test_failing_test_dumps_streams_stderr_first() {
        let out = report_of(|reporter| {
            reporter.report_test(&ExecuteStatus {
                exit_code: 3,
                stdout: b"ran 1 test".to_vec(),
                stderr: b"assertion failed".to_vec(),
            })
        });
        assert_eq!(out, "+STDERR:\nassertion failed\n+STDOUT:\nran 1 test\n");
    }

    #[test]
    fn test_summary_lines() {
        let statuses = [
            ExecuteStatus {
                exit_code: 0,
                stdout: Vec::new(),
                stderr: Vec::new(),
            },
            ExecuteStatus {
                exit_code: 2,
                stdout: Vec::new(),
                stderr: Vec::new(),
            },
        ];
        let summary = RunSummary::from_statuses(&statuses);
        let out = report_of(|reporter| reporter.report_summary(&summary));
        assert_eq!(out, "+TEST SUMMARY PASSED = 1\n+TEST SUMMARY FAILED = 1\n");
    }
}

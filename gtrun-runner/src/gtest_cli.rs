// Copyright (c) The gtrun Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! GoogleTest binary CLI support.

use camino::Utf8Path;
use std::borrow::Cow;
use tracing::{debug, trace};

/// A single invocation of a GoogleTest binary.
///
/// GoogleTest binaries carry their own CLI surface: `--gtest_list_tests`
/// prints the available tests without running any, and `--gtest_filter`
/// restricts execution to tests matching a pattern.
#[derive(Clone, Debug)]
pub struct GtestCli<'a> {
    binary: &'a Utf8Path,
    args: Vec<Cow<'a, str>>,
}

impl<'a> GtestCli<'a> {
    /// Creates a listing-mode call: `<binary> --gtest_list_tests`.
    pub fn list_tests(binary: &'a Utf8Path) -> Self {
        let mut cli = Self::new(binary);
        cli.add_arg("--gtest_list_tests");
        cli
    }

    /// Creates a single-test call:
    /// `<binary> --gtest_color=<yes|no> --gtest_filter=<test_id>`.
    pub fn run_test(binary: &'a Utf8Path, test_id: &str, color: bool) -> Self {
        let mut cli = Self::new(binary);
        cli.add_arg(format!(
            "--gtest_color={}",
            if color { "yes" } else { "no" }
        ))
        .add_arg(format!("--gtest_filter={test_id}"));
        cli
    }

    fn new(binary: &'a Utf8Path) -> Self {
        Self {
            binary,
            args: vec![],
        }
    }

    fn add_arg(&mut self, arg: impl Into<Cow<'a, str>>) -> &mut Self {
        self.args.push(arg.into());
        self
    }

    /// Convert the command to a [`duct::Expression`].
    pub fn to_expression(&self) -> duct::Expression {
        duct::cmd(self.binary.as_str(), self.args.iter().map(|arg| &**arg))
    }

    /// Executes the command with both output streams captured and returns the
    /// captured standard output, or `None` if the process could not be
    /// spawned or exited non-zero.
    pub fn read(&self) -> Option<Vec<u8>> {
        let expression = self.to_expression();
        trace!("executing command: {:?}", expression);
        let output = match expression
            .stdout_capture()
            .stderr_capture()
            .unchecked()
            .run()
        {
            Ok(output) => output,
            Err(error) => {
                debug!("failed to spawn the child process: {}", error);
                return None;
            }
        };
        if !output.status.success() {
            debug!("execution failed with {}", output.status);
            debug!("stdout:");
            debug!("{}", String::from_utf8_lossy(&output.stdout));
            debug!("stderr:");
            debug!("{}", String::from_utf8_lossy(&output.stderr));
            return None;
        }
        Some(output.stdout)
    }
}

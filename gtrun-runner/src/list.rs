// Copyright (c) The gtrun Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test discovery: querying a binary's listing mode and parsing the output.

use crate::{errors::WriteTestListError, gtest_cli::GtestCli};
use camino::Utf8Path;
use owo_colors::{OwoColorize, Style};
use serde::{Deserialize, Serialize};
use std::io::{self, Write};
use tracing::warn;

/// A single test case, fully qualified for use with the filter flag.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TestInstance {
    /// The fixture header this case was listed under, kept verbatim
    /// (GoogleTest prints fixture headers with a trailing `.`).
    pub fixture: String,
    /// The case name with the listing indentation stripped.
    pub case: String,
}

impl TestInstance {
    fn new(fixture: &str, case: &str) -> Self {
        Self {
            fixture: fixture.to_owned(),
            case: case.to_owned(),
        }
    }

    /// The identifier passed to `--gtest_filter`: the fixture text followed
    /// directly by the case text.
    pub fn id(&self) -> String {
        format!("{}{}", self.fixture, self.case)
    }
}

/// Classification of one line of listing output.
///
/// Listing mode prints a banner line first, then unindented fixture headers,
/// each followed by its case lines. Case lines are indented by exactly two
/// spaces; that width is a format invariant of GoogleTest's listing mode, and
/// `OddIndent` catches output that breaks it rather than corrupting the
/// identifier silently.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum ListLine<'a> {
    Blank,
    /// An unindented fixture header, verbatim.
    Fixture(&'a str),
    /// A case line with the two-space indent stripped.
    Case(&'a str),
    /// An indented line that did not start with exactly two spaces, with all
    /// leading whitespace stripped.
    OddIndent(&'a str),
}

impl<'a> ListLine<'a> {
    fn classify(line: &'a str) -> Self {
        if line.is_empty() {
            return ListLine::Blank;
        }
        if !line.starts_with(|c: char| c.is_whitespace()) {
            return ListLine::Fixture(line);
        }
        match line.strip_prefix("  ") {
            Some(rest) if !rest.starts_with(|c: char| c.is_whitespace()) => ListLine::Case(rest),
            _ => ListLine::OddIndent(line.trim_start()),
        }
    }
}

/// List of test instances, obtained by querying a test binary's listing mode.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct TestList {
    tests: Vec<TestInstance>,
}

impl TestList {
    /// Runs the binary in listing mode and parses its output.
    ///
    /// A listing process that cannot be spawned or that exits non-zero yields
    /// an empty list: the caller sees zero tests, not a hard error.
    pub fn discover(binary: &Utf8Path) -> Self {
        match GtestCli::list_tests(binary).read() {
            Some(stdout) => Self::parse(&String::from_utf8_lossy(&stdout)),
            None => {
                warn!("listing tests in `{binary}` failed, treating as zero tests");
                Self::default()
            }
        }
    }

    /// Parses listing-mode output.
    ///
    /// The first line is always skipped: GoogleTest prints a banner there
    /// (`Running main() from ...`). A case line seen before any fixture
    /// header produces an identifier with no fixture prefix.
    pub fn parse(list_output: &str) -> Self {
        let mut tests = Vec::new();
        let mut fixture = "";
        for line in list_output.lines().skip(1) {
            match ListLine::classify(line) {
                ListLine::Blank => {}
                ListLine::Fixture(name) => fixture = name,
                ListLine::Case(case) => tests.push(TestInstance::new(fixture, case)),
                ListLine::OddIndent(case) => {
                    warn!("case line {line:?} is not indented by two spaces");
                    tests.push(TestInstance::new(fixture, case));
                }
            }
        }
        Self { tests }
    }

    /// Returns the number of tests in the list.
    pub fn test_count(&self) -> usize {
        self.tests.len()
    }

    /// Returns true if no tests were discovered.
    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }

    /// Iterates over the tests in listing order.
    pub fn iter(&self) -> impl Iterator<Item = &TestInstance> + '_ {
        self.tests.iter()
    }

    /// Constructs a serializable summary for this test list.
    pub fn to_summary(&self) -> TestListSummary {
        TestListSummary {
            test_count: self.tests.len(),
            tests: self.tests.iter().map(|test| test.id()).collect(),
        }
    }

    /// Outputs this list to the given writer.
    pub fn write(
        &self,
        output_format: OutputFormat,
        writer: impl Write,
        colorize: bool,
    ) -> Result<(), WriteTestListError> {
        match output_format {
            OutputFormat::Human { verbose } => self
                .write_human(writer, verbose, colorize)
                .map_err(WriteTestListError::Io),
            OutputFormat::Serializable(format) => format
                .to_writer(&self.to_summary(), writer)
                .map_err(WriteTestListError::Json),
        }
    }

    fn write_human(&self, mut writer: impl Write, verbose: bool, colorize: bool) -> io::Result<()> {
        let mut styles = Styles::default();
        if colorize {
            styles.colorize();
        }

        if verbose {
            // One full identifier per line, ready to paste into a filter.
            for test in &self.tests {
                writeln!(writer, "{}", test.id().style(styles.test_name))?;
            }
            return Ok(());
        }

        let mut current_fixture: Option<&str> = None;
        for test in &self.tests {
            if current_fixture != Some(test.fixture.as_str()) {
                writeln!(writer, "{}", test.fixture.style(styles.fixture))?;
                current_fixture = Some(test.fixture.as_str());
            }
            writeln!(writer, "  {}", test.case.style(styles.test_name))?;
        }
        Ok(())
    }
}

/// Output formats for a test list.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum OutputFormat {
    /// A human-readable format: cases grouped under their fixture headers,
    /// or one full identifier per line when verbose.
    Human {
        /// Whether to produce verbose output.
        verbose: bool,
    },

    /// Machine-readable output format.
    Serializable(SerializableFormat),
}

/// A serialized, machine-readable output format.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum SerializableFormat {
    /// JSON with no whitespace.
    Json,
    /// JSON, prettified.
    JsonPretty,
}

impl SerializableFormat {
    /// Write this data in the given format to the writer.
    pub fn to_writer(
        self,
        value: &impl Serialize,
        writer: impl Write,
    ) -> serde_json::Result<()> {
        match self {
            SerializableFormat::Json => serde_json::to_writer(writer, value),
            SerializableFormat::JsonPretty => serde_json::to_writer_pretty(writer, value),
        }
    }
}

/// Serializable summary of a test list.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct TestListSummary {
    /// Total number of tests.
    pub test_count: usize,
    /// Fully qualified identifiers, in listing order.
    pub tests: Vec<String>,
}

#[derive(Clone, Debug, Default)]
struct Styles {
    fixture: Style,
    test_name: Style,
}

impl Styles {
    fn colorize(&mut self) {
        self.fixture = Style::new().magenta().bold();
        self.test_name = Style::new().blue().bold();
    }
}

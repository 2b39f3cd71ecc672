// Copyright (c) The gtrun Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    errors::{ExpectedError, Result},
    output::{OutputContext, OutputOpts},
};
use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand, ValueEnum};
use gtrun_runner::{
    errors::WriteTestListError,
    fixture,
    list::{OutputFormat, SerializableFormat, TestList},
    reporter::Reporter,
    runner::TestRunner,
};
use std::io::{BufWriter, Write};
use supports_color::Stream;

/// Test binary used when none is named on the command line.
const DEFAULT_TEST_BINARY: &str = "./snmp_tests";

/// A sequential per-process test runner for GoogleTest binaries.
#[derive(Debug, Parser)]
#[command(version, name = "gtrun")]
pub struct GtrunApp {
    #[command(flatten)]
    output: OutputOpts,

    #[command(subcommand)]
    command: Command,
}

impl GtrunApp {
    /// Initializes the output context: color handling and logging.
    pub fn init_output(&self) -> OutputContext {
        self.output.init()
    }

    /// Executes the app.
    pub fn exec(self, output: OutputContext) -> Result<()> {
        match self.command {
            Command::List {
                test_binary,
                message_format,
            } => {
                let test_list = TestList::discover(&test_binary);

                let stdout = std::io::stdout();
                let lock = stdout.lock();
                // Buffer the output to minimize syscalls.
                let mut writer = BufWriter::new(lock);
                test_list.write(
                    message_format.to_output_format(output.verbose),
                    &mut writer,
                    output.color.should_colorize(Stream::Stdout),
                )?;
                writer.flush().map_err(WriteTestListError::Io)?;
            }
            Command::Run { test_binary } => {
                let cwd = std::env::current_dir()
                    .map_err(ExpectedError::current_dir_failed)
                    .and_then(|cwd| {
                        Utf8PathBuf::try_from(cwd).map_err(|error| {
                            ExpectedError::current_dir_failed(error.into_io_error())
                        })
                    })?;
                fixture::stage(&cwd);

                let test_list = TestList::discover(&test_binary);

                let stdout = std::io::stdout();
                let mut reporter = Reporter::new(BufWriter::new(stdout.lock()));
                if output.color.should_colorize(Stream::Stdout) {
                    reporter.colorize();
                }

                let runner = TestRunner::new(&test_binary, output.color.gtest_color());
                let summary = runner
                    .execute(&test_list, &mut reporter)
                    .map_err(ExpectedError::report_write_failed)?;
                reporter
                    .flush()
                    .map_err(ExpectedError::report_write_failed)?;

                if !summary.is_success() {
                    return Err(ExpectedError::test_run_failed(&summary));
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List tests in the binary
    ///
    /// Queries the binary's listing mode; no tests are executed. Use
    /// --message-format json for machine-readable output.
    List {
        /// Path to the GoogleTest binary
        #[arg(value_name = "TEST-BINARY", default_value = DEFAULT_TEST_BINARY)]
        test_binary: Utf8PathBuf,

        /// Output format
        #[arg(short = 'T', long, value_enum, default_value_t, value_name = "FMT")]
        message_format: MessageFormatOpts,
    },
    /// Run tests
    ///
    /// Stages the fixture configuration file, then runs every listed test in
    /// its own child process, one at a time. The exit code is 0 when every
    /// test passes, otherwise the exit code of the last failing test.
    Run {
        /// Path to the GoogleTest binary
        #[arg(value_name = "TEST-BINARY", default_value = DEFAULT_TEST_BINARY)]
        test_binary: Utf8PathBuf,
    },
}

#[derive(Copy, Clone, Debug, Default, ValueEnum)]
enum MessageFormatOpts {
    #[default]
    Human,
    Json,
    JsonPretty,
}

impl MessageFormatOpts {
    fn to_output_format(self, verbose: bool) -> OutputFormat {
        match self {
            Self::Human => OutputFormat::Human { verbose },
            Self::Json => OutputFormat::Serializable(SerializableFormat::Json),
            Self::JsonPretty => OutputFormat::Serializable(SerializableFormat::JsonPretty),
        }
    }
}

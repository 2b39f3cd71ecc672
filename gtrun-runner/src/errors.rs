// Copyright (c) The gtrun Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Errors produced by gtrun.

use camino::Utf8PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

/// An error that occurred while staging the fixture configuration file.
///
/// Staging failures do not abort a run: callers log them and keep going, and
/// tests that depend on the fixture fail and report it themselves.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FixtureStageError {
    /// The copy command could not be spawned.
    #[error("failed to spawn `sudo cp {src} {dst}`")]
    Spawn {
        /// The fixture source path.
        src: Utf8PathBuf,
        /// The destination path.
        dst: Utf8PathBuf,
        /// The underlying error.
        #[source]
        error: std::io::Error,
    },

    /// The copy command ran but exited with a failure status.
    #[error("`sudo cp {src} {dst}` exited with {status}")]
    CopyFailed {
        /// The fixture source path.
        src: Utf8PathBuf,
        /// The destination path.
        dst: Utf8PathBuf,
        /// The child's exit status.
        status: ExitStatus,
    },
}

/// An error that occurred while writing a test list.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum WriteTestListError {
    /// An error occurred while writing the list to the writer.
    #[error("error writing to output")]
    Io(#[source] std::io::Error),

    /// An error occurred while serializing the list.
    #[error("error serializing test list to JSON")]
    Json(#[source] serde_json::Error),
}

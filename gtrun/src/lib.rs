// Copyright (c) The gtrun Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! A sequential per-process test runner for GoogleTest binaries.
//!
//! gtrun asks a compiled test binary for its test list, runs each test in its
//! own child process, and reports aggregate results. Running one process per
//! case keeps failures isolated in suites whose cases can poison shared
//! process state.

#![warn(missing_docs)]

mod dispatch;
mod errors;
mod output;

#[doc(hidden)]
pub use dispatch::*;
#[doc(hidden)]
pub use errors::*;
#[doc(hidden)]
pub use output::OutputContext;

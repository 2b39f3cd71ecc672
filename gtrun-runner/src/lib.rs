// Copyright (c) The gtrun Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

#![warn(missing_docs)]

//! Core functionality for [gtrun](https://crates.io/crates/gtrun): discover
//! the tests inside a GoogleTest binary, run each one in its own child
//! process, and aggregate the results.
//!
//! Execution is strictly sequential. Each child is spawned, fully waited on
//! with its output captured, and only then is the next one started.

pub mod errors;
pub mod fixture;
mod gtest_cli;
pub mod list;
pub mod reporter;
pub mod runner;
#[cfg(test)]
mod test_helpers;

pub use gtest_cli::GtestCli;

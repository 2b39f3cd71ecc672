// Copyright (c) The gtrun Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Staging of the fixture configuration file.
//!
//! The tests under this harness read their configuration from
//! `<prefix>/etc/snmp.conf`, where `<prefix>` is the autoconf install prefix
//! recorded in the build tree's `config.status`. Before a run, the file is
//! copied into place if it is missing.

use crate::errors::FixtureStageError;
use camino::{Utf8Path, Utf8PathBuf};
use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, trace, warn};

/// Name of the staged configuration file.
pub const CONF_NAME: &str = "snmp.conf";

/// Install prefix used when `config.status` has no answer.
const DEFAULT_PREFIX: &str = "/usr/local1/";

/// Location of the build-generated status file, relative to the runner's
/// working directory inside the build tree.
const CONFIG_STATUS_PATH: &str = "../../../../../config.status";

/// Fixture source, relative to the source tree root (`$srcdir`) or to the
/// working directory when `srcdir` is unset.
const CONF_SRC_PATH: &str = "test_files/snmp.conf";

static PREFIX_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"S\["prefix"\]="(.*)""#).expect("prefix pattern is valid"));

/// Where a resolved install prefix came from.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PrefixSource {
    /// Read from the build-generated status file at this path.
    StatusFile(Utf8PathBuf),
    /// The status file was missing, unreadable, or carried no prefix
    /// assignment.
    Default,
}

/// An install prefix together with where it came from, so callers can log
/// fallbacks instead of having them swallowed.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ResolvedPrefix {
    /// The install prefix.
    pub prefix: Utf8PathBuf,
    /// Where the value came from.
    pub source: PrefixSource,
}

/// Resolves the install prefix from the build tree's `config.status`.
pub fn resolve_prefix(cwd: &Utf8Path) -> ResolvedPrefix {
    resolve_prefix_from(&cwd.join(CONFIG_STATUS_PATH))
}

/// Scans a status file for `S["prefix"]="..."` assignments; the last one
/// wins. Any failure to read the file resolves to the default prefix.
fn resolve_prefix_from(status_file: &Utf8Path) -> ResolvedPrefix {
    let default = ResolvedPrefix {
        prefix: DEFAULT_PREFIX.into(),
        source: PrefixSource::Default,
    };
    let contents = match std::fs::read_to_string(status_file) {
        Ok(contents) => contents,
        Err(error) => {
            debug!("could not read `{status_file}`: {error}");
            return default;
        }
    };
    let mut prefix = None;
    for line in contents.lines() {
        if let Some(captures) = PREFIX_LINE.captures(line) {
            prefix = Some(captures[1].to_owned());
        }
    }
    match prefix {
        Some(prefix) => ResolvedPrefix {
            prefix: prefix.into(),
            source: PrefixSource::StatusFile(status_file.to_owned()),
        },
        None => default,
    }
}

/// What staging decided to do.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StagingAction {
    /// The destination already exists, nothing to do.
    Skip,
    /// Copy the source to the destination with elevated privileges.
    Copy,
}

/// A staging decision with fully resolved paths. The decision is computed
/// first and executed second, so it can be inspected without touching the
/// filesystem.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StagingPlan {
    /// The fixture source.
    pub src: Utf8PathBuf,
    /// The destination under the install prefix.
    pub dst: Utf8PathBuf,
    /// Whether a copy is needed.
    pub action: StagingAction,
}

impl StagingPlan {
    /// Computes the plan: source from `srcdir` or the relative default,
    /// destination `<prefix>/etc/snmp.conf`, and a copy only when the
    /// destination is absent.
    pub fn new(prefix: &Utf8Path, srcdir: Option<&Utf8Path>) -> Self {
        let src = match srcdir {
            Some(root) => root.join(CONF_SRC_PATH),
            None => Utf8PathBuf::from(CONF_SRC_PATH),
        };
        let dst = prefix.join("etc").join(CONF_NAME);
        let action = if dst.is_file() {
            StagingAction::Skip
        } else {
            StagingAction::Copy
        };
        Self { src, dst, action }
    }

    /// Executes the plan. The destination normally lives under a root-owned
    /// `etc`, so the copy runs through `sudo cp`.
    pub fn execute(&self) -> Result<(), FixtureStageError> {
        match self.action {
            StagingAction::Skip => Ok(()),
            StagingAction::Copy => {
                let expression =
                    duct::cmd("sudo", ["cp", self.src.as_str(), self.dst.as_str()]).unchecked();
                trace!("executing command: {:?}", expression);
                let output = expression.run().map_err(|error| FixtureStageError::Spawn {
                    src: self.src.clone(),
                    dst: self.dst.clone(),
                    error,
                })?;
                if output.status.success() {
                    Ok(())
                } else {
                    Err(FixtureStageError::CopyFailed {
                        src: self.src.clone(),
                        dst: self.dst.clone(),
                        status: output.status,
                    })
                }
            }
        }
    }
}

/// Stages the fixture configuration file before a run.
///
/// A staging failure is logged and otherwise ignored: the run proceeds, and
/// tests that depend on the fixture fail and report it.
pub fn stage(cwd: &Utf8Path) -> StagingPlan {
    let resolved = resolve_prefix(cwd);
    match &resolved.source {
        PrefixSource::StatusFile(path) => {
            debug!("install prefix `{}` from `{path}`", resolved.prefix);
        }
        PrefixSource::Default => {
            debug!(
                "no usable `config.status`, using default install prefix `{}`",
                resolved.prefix
            );
        }
    }
    let srcdir = std::env::var("srcdir").ok().map(Utf8PathBuf::from);
    let plan = StagingPlan::new(&resolved.prefix, srcdir.as_deref());
    if let Err(error) = plan.execute() {
        warn!("failed to stage `{}`: {error}", plan.dst);
    }
    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino_tempfile::Utf8TempDir;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_prefix_from_status_file() {
        let dir = Utf8TempDir::new().expect("temp dir created");
        let status_file = dir.path().join("config.status");
        std::fs::write(
            &status_file,
            indoc! {r#"
                #! /bin/sh
                S["exec_prefix"]="${prefix}"
                S["prefix"]="/opt/foo"
            "#},
        )
        .expect("status file written");
        let resolved = resolve_prefix_from(&status_file);
        assert_eq!(resolved.prefix, "/opt/foo");
        assert_eq!(resolved.source, PrefixSource::StatusFile(status_file));
    }

    #[test]
    fn test_prefix_last_assignment_wins() {
        let dir = Utf8TempDir::new().expect("temp dir created");
        let status_file = dir.path().join("config.status");
        std::fs::write(
            &status_file,
            indoc! {r#"
                S["prefix"]="/opt/first"
                S["prefix"]="/opt/second"
            "#},
        )
        .expect("status file written");
        assert_eq!(resolve_prefix_from(&status_file).prefix, "/opt/second");
    }

    #[test]
    fn test_prefix_default_when_no_assignment() {
        let dir = Utf8TempDir::new().expect("temp dir created");
        let status_file = dir.path().join("config.status");
        std::fs::write(&status_file, "#! /bin/sh\n").expect("status file written");
        let resolved = resolve_prefix_from(&status_file);
        assert_eq!(resolved.prefix, DEFAULT_PREFIX);
        assert_eq!(resolved.source, PrefixSource::Default);
    }

    #[test]
    fn test_prefix_default_when_file_missing() {
        let dir = Utf8TempDir::new().expect("temp dir created");
        let resolved = resolve_prefix_from(&dir.path().join("config.status"));
        assert_eq!(resolved.prefix, DEFAULT_PREFIX);
        assert_eq!(resolved.source, PrefixSource::Default);
    }

    #[test]
    fn test_staging_plan_skips_existing_destination() {
        let dir = Utf8TempDir::new().expect("temp dir created");
        let etc = dir.path().join("etc");
        std::fs::create_dir_all(&etc).expect("etc created");
        std::fs::write(etc.join(CONF_NAME), "# already staged\n").expect("conf written");

        let plan = StagingPlan::new(dir.path(), None);
        assert_eq!(plan.action, StagingAction::Skip);
        assert_eq!(plan.dst, etc.join(CONF_NAME));
        // A skip must not issue any command.
        plan.execute().expect("skip is a no-op");
    }

    #[test]
    fn test_staging_plan_copies_missing_destination() {
        let dir = Utf8TempDir::new().expect("temp dir created");
        let plan = StagingPlan::new(dir.path(), Some(Utf8Path::new("/src/tree")));
        assert_eq!(plan.src, "/src/tree/test_files/snmp.conf");
        assert_eq!(plan.dst, dir.path().join("etc").join(CONF_NAME));
        assert_eq!(plan.action, StagingAction::Copy);
    }

    #[test]
    fn test_staging_plan_default_source() {
        let dir = Utf8TempDir::new().expect("temp dir created");
        let plan = StagingPlan::new(dir.path(), None);
        assert_eq!(plan.src, "test_files/snmp.conf");
    }
}

// Copyright (c) The gtrun Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Helpers shared by the in-crate tests.

#[cfg(unix)]
use camino::Utf8PathBuf;
#[cfg(unix)]
use camino_tempfile::Utf8TempDir;

/// Writes an executable shell script standing in for a GoogleTest binary and
/// returns its path.
#[cfg(unix)]
pub(crate) fn fake_gtest(dir: &Utf8TempDir, name: &str, script: &str) -> Utf8PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.path().join(name);
    std::fs::write(&path, script).expect("script written");
    let mut perms = std::fs::metadata(&path)
        .expect("script metadata read")
        .permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&path, perms).expect("script marked executable");
    path
}

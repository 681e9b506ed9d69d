// Copyright 2024 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

use std::ffi::{OsStr, OsString};
use std::io;
use std::path::{Path, PathBuf};

use path_absolutize::Absolutize;

use crate::{LocateError, PlatformIntrospection};

const ARGV0: &str = "argv[0]";

/// Best-effort lookup for platforms without a self-reference API.
///
/// argv[0] is resolved against the current directory when it contains a path
/// separator, and searched in `PATH` otherwise. This breaks if the process
/// rewrote its argv[0] or changed directory before the lookup.
#[derive(Clone, Debug)]
pub struct ArgvIntrospection {
    argv0: Option<OsString>,
    search_path: Option<OsString>,
    current_dir: Option<PathBuf>,
}

impl ArgvIntrospection {
    pub fn new(
        argv0: impl Into<OsString>,
        search_path: Option<OsString>,
        current_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            argv0: Some(argv0.into()),
            search_path,
            current_dir: Some(current_dir.into()),
        }
    }

    /// Snapshots argv[0], `PATH` and the current directory of this process.
    pub fn from_process() -> Self {
        Self {
            argv0: std::env::args_os().next(),
            search_path: std::env::var_os("PATH"),
            current_dir: std::env::current_dir().ok(),
        }
    }

    fn search(&self, name: &OsStr, cwd: &Path) -> Result<PathBuf, LocateError> {
        let search_path = self.search_path.as_deref().unwrap_or_default();
        for dir in std::env::split_paths(search_path) {
            // An empty PATH entry means the current directory.
            let candidate = dir.join(name);
            let candidate = candidate
                .absolutize_from(cwd)
                .map_err(|e| LocateError::read_failed("PATH", e))?;
            if is_executable_file(&candidate) {
                return Ok(candidate.into_owned());
            }
        }
        Err(LocateError::unavailable(
            Path::new(name).display().to_string(),
            io::Error::new(io::ErrorKind::NotFound, "not found in PATH"),
        ))
    }
}

impl PlatformIntrospection for ArgvIntrospection {
    fn executable_path(&self) -> Result<PathBuf, LocateError> {
        let argv0 = self
            .argv0
            .as_deref()
            .filter(|argv0| !argv0.is_empty())
            .ok_or_else(|| LocateError::malformed(ARGV0, "is empty"))?;
        let cwd = self.current_dir.as_deref().ok_or_else(|| {
            LocateError::unavailable(
                "the current directory",
                io::Error::new(io::ErrorKind::NotFound, "current directory is unknown"),
            )
        })?;

        let candidate = if has_separator(argv0) {
            cwd.join(argv0)
        } else {
            self.search(argv0, cwd)?
        };

        // Follow symlinks so that the directory is the real install location.
        std::fs::canonicalize(&candidate).map_err(|e| {
            let reference = candidate.display().to_string();
            if e.kind() == io::ErrorKind::NotFound {
                LocateError::unavailable(reference, e)
            } else {
                LocateError::read_failed(reference, e)
            }
        })
    }
}

fn has_separator(name: &OsStr) -> bool {
    Path::new(name).components().nth(1).is_some() || Path::new(name).is_absolute()
}

#[cfg(unix)]
fn is_executable_file(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable_file(path: &Path) -> bool {
    path.is_file()
}

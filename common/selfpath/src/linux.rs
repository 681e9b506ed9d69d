// Copyright 2024 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

use std::ffi::OsStr;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::{LocateError, PlatformIntrospection};

const PROC_SELF: &str = "/proc/self";

/// The kernel appends this to the link target once the binary is unlinked.
const DELETED_SUFFIX: &[u8] = b" (deleted)";

/// Enough for a mapping line with a PATH_MAX pathname.
const MAPS_LINE_CAPACITY: usize = 4096 + 128;

/// Finds the executable through procfs.
///
/// `<root>/exe` is consulted first. When the link can't be read (e.g. procfs
/// mounted with `hidepid`, or ptrace restrictions), the first line of
/// `<root>/maps` is used instead: the kernel lists the main executable image
/// as the lowest mapping.
#[derive(Clone, Debug)]
pub struct ProcIntrospection {
    root: PathBuf,
}

impl Default for ProcIntrospection {
    fn default() -> Self {
        Self::with_root(PROC_SELF)
    }
}

impl ProcIntrospection {
    /// Uses `root` in place of `/proc/self`.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn read_exe_link(&self) -> Result<PathBuf, LocateError> {
        let link = self.root.join("exe");
        let target = std::fs::read_link(&link)
            .map_err(|e| LocateError::unavailable(link.display().to_string(), e))?;
        Ok(strip_deleted(target.as_os_str()))
    }

    fn read_maps(&self) -> Result<PathBuf, LocateError> {
        let maps = self.root.join("maps");
        let reference = maps.display().to_string();
        let file = File::open(&maps).map_err(|e| LocateError::unavailable(&reference, e))?;

        let mut line = Vec::new();
        line.try_reserve(MAPS_LINE_CAPACITY)?;
        let len = BufReader::new(file)
            .read_until(b'\n', &mut line)
            .map_err(|e| LocateError::read_failed(&reference, e))?;
        if len == 0 {
            return Err(LocateError::read_failed(
                &reference,
                io::Error::new(io::ErrorKind::UnexpectedEof, "no mappings listed"),
            ));
        }
        parse_maps_line(&maps, &line)
    }
}

impl PlatformIntrospection for ProcIntrospection {
    fn executable_path(&self) -> Result<PathBuf, LocateError> {
        match self.read_exe_link() {
            Ok(path) => Ok(path),
            Err(e) => {
                debug!("Falling back to the mapping table: {e:#}");
                self.read_maps()
            }
        }
    }
}

/// Extracts the pathname column of a `/proc/<pid>/maps` line, e.g.
/// `55d0c0a00000-55d0c0a02000 r--p 00000000 fd:01 1234   /usr/bin/app`.
fn parse_maps_line(maps: &Path, line: &[u8]) -> Result<PathBuf, LocateError> {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    let start = line.iter().position(|&b| b == b'/').ok_or_else(|| {
        LocateError::malformed(
            maps.display().to_string(),
            "the first mapping has no pathname",
        )
    })?;
    Ok(strip_deleted(OsStr::from_bytes(&line[start..])))
}

fn strip_deleted(path: &OsStr) -> PathBuf {
    let bytes = path.as_bytes();
    PathBuf::from(OsStr::from_bytes(
        bytes.strip_suffix(DELETED_SUFFIX).unwrap_or(bytes),
    ))
}

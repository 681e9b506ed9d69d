// Copyright 2024 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

use std::path::{Path, PathBuf};

use crate::bundle::bundle_resources_dir;
use crate::{LocateError, PlatformIntrospection};

/// Finds the executable with `_NSGetExecutablePath`, and resources in the
/// enclosing `.app` bundle.
#[derive(Clone, Debug, Default)]
pub struct BundleIntrospection;

impl PlatformIntrospection for BundleIntrospection {
    fn executable_path(&self) -> Result<PathBuf, LocateError> {
        // current_exe() wraps _NSGetExecutablePath, which may hand back a
        // path containing symlinks or `..`.
        let exe = std::env::current_exe()
            .map_err(|e| LocateError::unavailable("_NSGetExecutablePath", e))?;
        std::fs::canonicalize(&exe)
            .map_err(|e| LocateError::read_failed(exe.display().to_string(), e))
    }

    fn data_dir(&self, executable: &Path) -> Option<PathBuf> {
        bundle_resources_dir(executable)
    }

    fn base_is_data_dir(&self) -> bool {
        true
    }
}

// Copyright 2024 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

use std::path::PathBuf;

use path_absolutize::Absolutize;

use crate::{LocateError, PlatformIntrospection};

/// Finds the executable with `GetModuleFileNameW`.
#[derive(Clone, Debug, Default)]
pub struct ModuleIntrospection;

impl PlatformIntrospection for ModuleIntrospection {
    fn executable_path(&self) -> Result<PathBuf, LocateError> {
        let exe = std::env::current_exe()
            .map_err(|e| LocateError::unavailable("GetModuleFileNameW", e))?;
        let exe = exe
            .absolutize()
            .map_err(|e| LocateError::read_failed(exe.display().to_string(), e))?;
        Ok(exe.into_owned())
    }
}

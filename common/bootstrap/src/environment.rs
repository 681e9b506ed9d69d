// Copyright 2024 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

use std::ffi::OsStr;
use std::io;
use std::path::{Path, PathBuf};

/// The process-global state the bootstrapper hands to the runtime:
/// environment variables and the current directory.
pub trait ProcessEnvironment {
    /// Returns the value of `key`, decoded lossily.
    fn var(&self, key: &str) -> Option<String>;
    fn set_var(&mut self, key: &str, value: &OsStr);
    fn current_dir(&self) -> io::Result<PathBuf>;
    fn set_current_dir(&mut self, dir: &Path) -> io::Result<()>;
}

/// The real environment of this process.
#[derive(Debug, Default)]
pub struct OsEnvironment;

impl ProcessEnvironment for OsEnvironment {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var_os(key).map(|value| value.to_string_lossy().into_owned())
    }

    fn set_var(&mut self, key: &str, value: &OsStr) {
        std::env::set_var(key, value);
    }

    fn current_dir(&self) -> io::Result<PathBuf> {
        std::env::current_dir()
    }

    fn set_current_dir(&mut self, dir: &Path) -> io::Result<()> {
        std::env::set_current_dir(dir)
    }
}

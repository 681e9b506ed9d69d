// Copyright 2024 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

use std::ffi::OsString;
use std::path::Path;

use anyhow::Result;

#[cfg(feature = "embedded")]
mod c_argv;
mod command;
#[cfg(feature = "embedded")]
mod embedded;

#[cfg(feature = "embedded")]
pub use c_argv::CArgv;
pub use command::{CommandRuntime, DEFAULT_RUNTIME_HOST, RUNTIME_HOST_ENV};
#[cfg(feature = "embedded")]
pub use embedded::EmbeddedRuntime;

/// The managed runtime that the bootstrapper hands control to.
pub trait ManagedRuntime {
    /// Tells the runtime where to find assemblies and its configuration.
    fn set_dirs(&mut self, assembly_dir: &Path, config_dir: &Path) -> Result<()>;

    /// Hands over the NUL-terminated machine config. The runtime may keep
    /// referring to it until the process exits.
    fn register_machine_config(&mut self, config: &'static [u8]) -> Result<()>;

    /// Runs the runtime's main entry point and returns its exit status.
    fn run_main(&mut self, argv: &[OsString]) -> Result<i32>;
}

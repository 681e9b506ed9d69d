// Copyright 2024 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

use std::ffi::{CStr, CString, OsString};
use std::path::Path;

use anyhow::{Context, Result};
use libc::{c_char, c_int};
use tracing::info;

use super::c_argv::{path_to_c_string, CArgv};
use super::ManagedRuntime;

#[link(name = "monosgen-2.0")]
extern "C" {
    fn mono_set_dirs(assembly_dir: *const c_char, config_dir: *const c_char);
    fn mono_register_machine_config(config_xml: *const c_char);
    fn mono_main(argc: c_int, argv: *mut *mut c_char) -> c_int;
}

/// The runtime linked into this process.
#[derive(Debug, Default)]
pub struct EmbeddedRuntime {
    // The runtime may keep pointers to these.
    dirs: Option<(CString, CString)>,
}

impl EmbeddedRuntime {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ManagedRuntime for EmbeddedRuntime {
    fn set_dirs(&mut self, assembly_dir: &Path, config_dir: &Path) -> Result<()> {
        let dirs = (
            path_to_c_string(assembly_dir)?,
            path_to_c_string(config_dir)?,
        );
        unsafe { mono_set_dirs(dirs.0.as_ptr(), dirs.1.as_ptr()) };
        self.dirs = Some(dirs);
        Ok(())
    }

    fn register_machine_config(&mut self, config: &'static [u8]) -> Result<()> {
        let config =
            CStr::from_bytes_until_nul(config).context("Machine config is not NUL-terminated")?;
        unsafe { mono_register_machine_config(config.as_ptr()) };
        Ok(())
    }

    fn run_main(&mut self, argv: &[OsString]) -> Result<i32> {
        let mut c_argv = CArgv::new(argv)?;
        let argc = c_argv.argc()?;
        info!("Entering the runtime with {argc} arguments");
        // c_argv outlives the call, which is all mono_main requires.
        Ok(unsafe { mono_main(argc, c_argv.as_mut_ptr()) })
    }
}

// Copyright 2024 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

use std::ffi::{CString, OsStr, OsString};
use std::path::Path;

use anyhow::{Context, Result};
use libc::{c_char, c_int};

/// Converts `s` to a C string. Windows strings are expected to be valid
/// UTF-8 already (see [`crate::process_args`]).
pub(crate) fn to_c_string(s: &OsStr) -> Result<CString> {
    #[cfg(unix)]
    let bytes = {
        use std::os::unix::ffi::OsStrExt;
        s.as_bytes().to_vec()
    };
    #[cfg(not(unix))]
    let bytes = s.to_string_lossy().into_owned().into_bytes();

    CString::new(bytes).with_context(|| format!("{s:?} contains a NUL byte"))
}

pub(crate) fn path_to_c_string(path: &Path) -> Result<CString> {
    to_c_string(path.as_os_str())
}

/// A NULL-terminated `char *argv[]` together with the strings it points to.
pub struct CArgv {
    // Owns the memory that `pointers` refer to.
    _strings: Vec<CString>,
    pointers: Vec<*mut c_char>,
}

impl CArgv {
    pub fn new(args: &[OsString]) -> Result<Self> {
        let strings = args
            .iter()
            .map(|arg| to_c_string(arg))
            .collect::<Result<Vec<_>>>()?;
        let mut pointers = Vec::with_capacity(strings.len() + 1);
        pointers.extend(strings.iter().map(|s| s.as_ptr() as *mut c_char));
        pointers.push(std::ptr::null_mut());
        Ok(Self {
            _strings: strings,
            pointers,
        })
    }

    pub fn argc(&self) -> Result<c_int> {
        c_int::try_from(self.pointers.len() - 1).context("Too many arguments")
    }

    /// The returned pointer is valid as long as `self` is alive.
    pub fn as_mut_ptr(&mut self) -> *mut *mut c_char {
        self.pointers.as_mut_ptr()
    }
}

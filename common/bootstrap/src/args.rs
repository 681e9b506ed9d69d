// Copyright 2024 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

use std::ffi::OsString;

/// Returns this process's arguments.
///
/// On Windows the UTF-16 command line is split and re-encoded as UTF-8, so
/// the runtime always receives the same byte encoding. The length of the
/// decoded list may differ from the argc the C runtime reported; the list
/// is authoritative.
pub fn process_args() -> Vec<OsString> {
    let args = std::env::args_os();
    #[cfg(windows)]
    let args = args.map(|arg| OsString::from(arg.to_string_lossy().into_owned()));
    args.collect()
}

/// Builds the runtime's argument vector:
/// `[image_name, injected..., argv[1..]...]`.
///
/// `argv[0]`, the string this process was invoked as, is dropped.
pub fn assemble(argv: &[OsString], injected: &[String], image_name: &str) -> Vec<OsString> {
    let passthrough = argv.get(1..).unwrap_or_default();
    // One spare slot so that a C argv can be terminated without regrowing.
    let mut assembled = Vec::with_capacity(1 + injected.len() + passthrough.len() + 1);
    assembled.push(OsString::from(image_name));
    assembled.extend(injected.iter().map(OsString::from));
    assembled.extend(passthrough.iter().cloned());
    assembled
}

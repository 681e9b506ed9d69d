// Copyright 2023 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Provides the startup/cleanup logic shared by the launcher binaries.

use itertools::Itertools;
use std::{
    ffi::OsStr,
    process::{ExitCode, Termination},
};

mod config;
mod logging;

pub use crate::config::*;
pub use crate::logging::*;

/// Wraps a CLI main function to provide the common startup/cleanup logic.
///
/// Logging is best-effort: a broken logging setup is reported on stderr and
/// `main` still runs, since the wrapped program must start regardless.
pub fn cli_main<F, T, E>(main: F, config: Config) -> ExitCode
where
    F: FnOnce() -> Result<T, E>,
    T: Termination,
    E: Into<anyhow::Error>,
{
    let _log_guard = match config.logging.setup() {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("WARNING: logging disabled: {e:#}");
            None
        }
    };
    if config.log_command_line {
        log_current_command_line();
    }
    handle_top_level_result(main())
}

/// Logs the command line of the current process.
///
/// You don't need this function if you use [`cli_main`] because it calls this
/// function for you.
pub fn log_current_command_line() {
    let escaped_command = std::env::args_os()
        .map(|s| shell_escape::escape(s.to_string_lossy().into_owned().into()))
        .join(" ");
    tracing::debug!("COMMAND: {}", escaped_command);
}

/// Handles the top-level [`Result`] and returns [`ExitCode`] to be returned.
///
/// On error, the error chain is printed to stdout as a single line, which is
/// the diagnostic users see. The full error is logged at info level so that
/// it reaches log files without repeating the diagnostic on the console.
///
/// You don't need this function if you use [`cli_main`].
pub fn handle_top_level_result<T: Termination, E: Into<anyhow::Error>>(
    result: Result<T, E>,
) -> ExitCode {
    match result {
        Err(error) => {
            let error = error.into();
            tracing::info!("FATAL: {}: {:?}", get_current_process_name(), error);
            println!("{}", format_diagnostic(&error));
            ExitCode::FAILURE
        }
        Ok(value) => value.report(),
    }
}

/// Formats `error` and its causes as `outer: inner: ...`.
pub fn format_diagnostic(error: &anyhow::Error) -> String {
    format!("{error:#}")
}

/// Returns the current process name, or `__unknown__` if it failed to get one.
fn get_current_process_name() -> String {
    let current_exe = std::env::current_exe().unwrap_or_default();
    current_exe
        .file_name()
        .unwrap_or(OsStr::new("__unknown__"))
        .to_string_lossy()
        .into_owned()
}

// Copyright 2024 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

use std::process::ExitCode;

use bootstrap::{bootstrap, process_args, BootstrapError, OsEnvironment, Outcome};
use cliutil::{cli_main, ConfigBuilder};
use selfpath::SelfLocator;

#[cfg(feature = "embedded")]
fn runtime() -> bootstrap::runtime::EmbeddedRuntime {
    bootstrap::runtime::EmbeddedRuntime::new()
}

#[cfg(not(feature = "embedded"))]
fn runtime() -> bootstrap::runtime::CommandRuntime {
    bootstrap::runtime::CommandRuntime::from_env()
}

fn do_main() -> Result<ExitCode, BootstrapError> {
    let args = process_args();
    let mut env = OsEnvironment;
    let locator = SelfLocator::native();
    let mut runtime = runtime();

    match bootstrap(&args, &mut env, &locator, &mut runtime)? {
        Outcome::NothingToBootstrap(file) => {
            println!("{file} not found!");
            Ok(ExitCode::SUCCESS)
        }
        Outcome::Exited(status) => {
            tracing::debug!("Exiting with runtime status {status}");
            // Only the low byte reaches the parent, as with exit(3).
            Ok(ExitCode::from(status as u8))
        }
    }
}

fn main() -> ExitCode {
    cli_main(do_main, ConfigBuilder::new().build())
}

// Copyright 2024 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

use std::ffi::OsString;
use std::path::Path;
use std::process::{Command, ExitStatus};

use anyhow::{Context, Result};
use tracing::{debug, info, instrument};

use super::ManagedRuntime;

/// Overrides the runtime host executable.
pub const RUNTIME_HOST_ENV: &str = "KICKSTART_RUNTIME";

pub const DEFAULT_RUNTIME_HOST: &str = "mono";

/// Runs the managed runtime as a child process.
///
/// On Unix the child's argv is exactly the assembled vector, as if its
/// `main` had been called directly. Elsewhere argv[0] can't be chosen, so
/// the whole vector follows the host's own name.
///
/// The child inherits the environment variables and the working directory
/// prepared by the bootstrapper.
///
/// This backend can't register the machine config: a separate process has
/// no way to receive an in-memory config, so the buffer is dropped and the
/// host falls back to its own machine config. Build with the `embedded`
/// feature when the bundled `monomachineconfig` must take effect.
#[derive(Debug)]
pub struct CommandRuntime {
    host: OsString,
}

impl CommandRuntime {
    pub fn new(host: impl Into<OsString>) -> Self {
        Self { host: host.into() }
    }

    /// Uses the host named by [`RUNTIME_HOST_ENV`], or
    /// [`DEFAULT_RUNTIME_HOST`] from `PATH`.
    pub fn from_env() -> Self {
        Self::new(
            std::env::var_os(RUNTIME_HOST_ENV).unwrap_or_else(|| DEFAULT_RUNTIME_HOST.into()),
        )
    }
}

impl ManagedRuntime for CommandRuntime {
    fn set_dirs(&mut self, assembly_dir: &Path, config_dir: &Path) -> Result<()> {
        debug!(
            "Runtime host will inherit assembly dir {} and config dir {}",
            assembly_dir.display(),
            config_dir.display()
        );
        Ok(())
    }

    fn register_machine_config(&mut self, config: &'static [u8]) -> Result<()> {
        info!(
            "Runtime host can't take the machine config; ignoring {} bytes",
            config.len()
        );
        Ok(())
    }

    fn run_main(&mut self, argv: &[OsString]) -> Result<i32> {
        let mut command = Command::new(&self.host);

        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;

            let (arg0, args) = argv.split_first().context("Empty argument vector")?;
            command.arg0(arg0).args(args);
        }
        #[cfg(not(unix))]
        command.args(argv);

        let status = run(&mut command)
            .with_context(|| format!("Failed to run the runtime host {:?}", self.host))?;
        debug!("Runtime host exited with {status}");
        status_to_code(&status)
    }
}

// Runs the child while forwarding SIGTERM to it. SIGINT is ignored here: the
// terminal delivers it to the whole foreground process group, child included.
#[cfg(unix)]
#[instrument(skip_all, fields(command = %cmd.get_program().to_string_lossy()))]
fn run(cmd: &mut Command) -> Result<ExitStatus> {
    use nix::sys::signal::{kill, Signal};
    use nix::unistd::Pid;
    use signal_hook::consts::signal::{SIGCHLD, SIGINT, SIGTERM};
    use signal_hook::iterator::Signals;

    // Register before spawning so that no signal is dropped.
    let mut signals = Signals::new([SIGCHLD, SIGINT, SIGTERM])?;

    let mut child = cmd.spawn()?;
    let pid = Pid::from_raw(child.id().try_into()?);

    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(status);
        }
        for signal in signals.wait() {
            match signal {
                SIGTERM => kill(pid, Signal::SIGTERM)?,
                SIGCHLD | SIGINT => {}
                _ => unreachable!(),
            }
        }
    }
}

#[cfg(not(unix))]
#[instrument(skip_all, fields(command = %cmd.get_program().to_string_lossy()))]
fn run(cmd: &mut Command) -> Result<ExitStatus> {
    Ok(cmd.status()?)
}

/// Converts the child's status to an exit code following the POSIX shell
/// convention (128 + signal number for signal deaths).
fn status_to_code(status: &ExitStatus) -> Result<i32> {
    if let Some(code) = status.code() {
        return Ok(code);
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;

        if let Some(signal) = status.signal() {
            return Ok(128 + signal);
        }
    }
    anyhow::bail!("Runtime host did not exit normally: {status:?}")
}

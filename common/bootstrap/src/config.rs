// Copyright 2024 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

use std::ffi::OsStr;
use std::fmt;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};

use tracing::{debug, info};

use crate::environment::ProcessEnvironment;
use crate::error::BootstrapError;

/// The runtime config, which the runtime loads itself through
/// [`CONFIG_ENV`].
pub const PRIMARY_CONFIG_FILE: &str = "monoconfig";

/// The machine config, which is read here and registered with the runtime.
pub const MACHINE_CONFIG_FILE: &str = "monomachineconfig";

/// Names the primary config file for the runtime.
pub const CONFIG_ENV: &str = "MONO_CONFIG";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigFile {
    Primary,
    Machine,
}

impl ConfigFile {
    pub fn file_name(self) -> &'static str {
        match self {
            ConfigFile::Primary => PRIMARY_CONFIG_FILE,
            ConfigFile::Machine => MACHINE_CONFIG_FILE,
        }
    }
}

impl fmt::Display for ConfigFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}

#[derive(Debug)]
pub enum ConfigState {
    /// A config file is absent, so there is nothing to bootstrap.
    Missing(ConfigFile),
    /// Both files are present. `machine_config` holds the machine config's
    /// bytes followed by a NUL terminator.
    Ready { machine_config: Box<[u8]> },
}

/// Checks for both config files in the current directory of `env`.
///
/// Sets [`CONFIG_ENV`] when the primary config exists, unless the caller
/// already chose one.
pub fn load_configs(env: &mut impl ProcessEnvironment) -> Result<ConfigState, BootstrapError> {
    let dir = match env.current_dir() {
        Ok(dir) => dir,
        Err(e) => {
            debug!("Unable to get the current directory: {e}");
            return Ok(ConfigState::Missing(ConfigFile::Primary));
        }
    };

    let primary = dir.join(PRIMARY_CONFIG_FILE);
    if let Err(e) = File::open(&primary) {
        debug!("Unable to open {}: {e}", primary.display());
        return Ok(ConfigState::Missing(ConfigFile::Primary));
    }
    if env.var(CONFIG_ENV).is_none() {
        env.set_var(CONFIG_ENV, OsStr::new(PRIMARY_CONFIG_FILE));
    }

    let machine = dir.join(MACHINE_CONFIG_FILE);
    let file = match File::open(&machine) {
        Ok(file) => file,
        Err(e) => {
            debug!("Unable to open {}: {e}", machine.display());
            return Ok(ConfigState::Missing(ConfigFile::Machine));
        }
    };
    let machine_config = read_machine_config(file)?;
    info!(
        "Loaded {} ({} bytes)",
        machine.display(),
        machine_config.len() - 1
    );

    Ok(ConfigState::Ready {
        machine_config: machine_config.into_boxed_slice(),
    })
}

fn read_machine_config(mut file: File) -> Result<Vec<u8>, BootstrapError> {
    let len = file
        .seek(SeekFrom::End(0))
        .map_err(BootstrapError::ReadMachineConfig)?;
    file.rewind().map_err(BootstrapError::ReadMachineConfig)?;
    let len = usize::try_from(len).map_err(|_| {
        BootstrapError::ReadMachineConfig(io::Error::new(
            io::ErrorKind::InvalidData,
            "file is larger than the address space",
        ))
    })?;

    let mut buf = Vec::new();
    buf.try_reserve_exact(len.saturating_add(1))?;
    buf.resize(len, 0);
    file.read_exact(&mut buf)
        .map_err(BootstrapError::ReadMachineConfig)?;
    buf.push(0);
    Ok(buf)
}

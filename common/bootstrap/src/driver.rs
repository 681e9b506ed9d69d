// Copyright 2024 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

use std::ffi::OsString;

use selfpath::{PlatformIntrospection, SelfLocator};
use tracing::{info, instrument, warn};

use crate::args::assemble;
use crate::config::{load_configs, ConfigFile, ConfigState};
use crate::environment::ProcessEnvironment;
use crate::error::BootstrapError;
use crate::image_name::derive_image_name;
use crate::options::{parse_injected_options, BUNDLED_OPTIONS_ENV};
use crate::runtime::ManagedRuntime;

/// The runtime's assembly search path. Always overwritten with the base
/// directory.
pub const SEARCH_PATH_ENV: &str = "MONO_PATH";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// A config file is missing; the process should exit successfully
    /// without starting the runtime.
    NothingToBootstrap(ConfigFile),
    /// The runtime ran and returned this status.
    Exited(i32),
}

/// Locates the install, prepares the environment and runs the runtime.
///
/// `args` are this process's arguments, argv[0] included. The first error
/// stops the sequence.
#[instrument(skip_all)]
pub fn bootstrap<E, P, R>(
    args: &[OsString],
    env: &mut E,
    locator: &SelfLocator<P>,
    runtime: &mut R,
) -> Result<Outcome, BootstrapError>
where
    E: ProcessEnvironment,
    P: PlatformIntrospection,
    R: ManagedRuntime,
{
    enter_base_directory(env, locator, runtime)?;

    let injected = parse_injected_options(env.var(BUNDLED_OPTIONS_ENV).as_deref());
    let executable = locator.locate_executable()?;
    let image_name = derive_image_name(&executable)?;
    let argv = assemble(args, &injected, &image_name);
    info!("Image {image_name} with {} injected options", injected.len());

    match load_configs(env)? {
        ConfigState::Missing(file) => return Ok(Outcome::NothingToBootstrap(file)),
        ConfigState::Ready { machine_config } => {
            // The runtime keeps referring to the machine config for the rest
            // of the process, so ownership goes with it.
            runtime
                .register_machine_config(Box::leak(machine_config))
                .map_err(BootstrapError::Runtime)?;
        }
    }

    let status = runtime.run_main(&argv).map_err(BootstrapError::Runtime)?;
    info!("Runtime exited with status {status}");
    Ok(Outcome::Exited(status))
}

/// Points the runtime and the process at the base directory.
fn enter_base_directory<E, P, R>(
    env: &mut E,
    locator: &SelfLocator<P>,
    runtime: &mut R,
) -> Result<(), BootstrapError>
where
    E: ProcessEnvironment,
    P: PlatformIntrospection,
    R: ManagedRuntime,
{
    let base_dir = locator.locate_base_directory()?;
    info!("Base directory: {}", base_dir.display());

    env.set_var(SEARCH_PATH_ENV, base_dir.as_os_str());
    runtime
        .set_dirs(&base_dir, &base_dir)
        .map_err(BootstrapError::Runtime)?;
    if let Err(e) = env.set_current_dir(&base_dir) {
        warn!("Unable to change directory to {}: {e}", base_dir.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::path::{Path, PathBuf};

    use anyhow::Result;
    use pretty_assertions::assert_eq;
    use selfpath::{DisabledIntrospection, LocateError};

    use crate::config::{CONFIG_ENV, MACHINE_CONFIG_FILE, PRIMARY_CONFIG_FILE};
    use crate::environment::testing::FakeEnvironment;

    struct FixedExecutable(PathBuf);

    impl PlatformIntrospection for FixedExecutable {
        fn executable_path(&self) -> Result<PathBuf, LocateError> {
            Ok(self.0.clone())
        }
    }

    #[derive(Default)]
    struct FakeRuntime {
        dirs: Option<(PathBuf, PathBuf)>,
        machine_config: Option<&'static [u8]>,
        argv: Option<Vec<OsString>>,
        status: i32,
    }

    impl ManagedRuntime for FakeRuntime {
        fn set_dirs(&mut self, assembly_dir: &Path, config_dir: &Path) -> Result<()> {
            self.dirs = Some((assembly_dir.to_path_buf(), config_dir.to_path_buf()));
            Ok(())
        }

        fn register_machine_config(&mut self, config: &'static [u8]) -> Result<()> {
            self.machine_config = Some(config);
            Ok(())
        }

        fn run_main(&mut self, argv: &[OsString]) -> Result<i32> {
            self.argv = Some(argv.to_vec());
            Ok(self.status)
        }
    }

    struct Install {
        _dir: tempfile::TempDir,
        base: PathBuf,
        executable: PathBuf,
    }

    fn install(file_name: &str, configs: &[&str]) -> Result<Install> {
        let dir = tempfile::tempdir()?;
        let base = std::fs::canonicalize(dir.path())?;
        for config in configs {
            std::fs::write(base.join(config), "<configuration/>")?;
        }
        Ok(Install {
            executable: base.join(file_name),
            base,
            _dir: dir,
        })
    }

    fn os_strings(items: &[&str]) -> Vec<OsString> {
        items.iter().map(OsString::from).collect()
    }

    #[test]
    fn runs_runtime_with_assembled_arguments() -> Result<()> {
        let install = install(
            "Game.bin.x86_64",
            &[PRIMARY_CONFIG_FILE, MACHINE_CONFIG_FILE],
        )?;
        let cwd = tempfile::tempdir()?;
        let mut env = FakeEnvironment::new(cwd.path()).with_var(BUNDLED_OPTIONS_ENV, "--debug");
        let locator = SelfLocator::new(FixedExecutable(install.executable.clone()));
        let mut runtime = FakeRuntime {
            status: 3,
            ..Default::default()
        };

        let outcome = bootstrap(
            &os_strings(&["./launcher", "x", "y"]),
            &mut env,
            &locator,
            &mut runtime,
        )?;

        assert_eq!(outcome, Outcome::Exited(3));
        assert_eq!(
            runtime.argv,
            Some(os_strings(&["Game.exe", "--debug", "x", "y"]))
        );
        assert_eq!(
            runtime.dirs,
            Some((install.base.clone(), install.base.clone()))
        );
        assert_eq!(runtime.machine_config, Some(&b"<configuration/>\0"[..]));
        assert_eq!(env.cwd, install.base);
        assert_eq!(
            env.var(SEARCH_PATH_ENV),
            Some(install.base.display().to_string())
        );
        assert_eq!(env.var(CONFIG_ENV).as_deref(), Some(PRIMARY_CONFIG_FILE));
        Ok(())
    }

    #[test]
    fn missing_primary_config_skips_runtime() -> Result<()> {
        let install = install("game", &[MACHINE_CONFIG_FILE])?;
        let cwd = tempfile::tempdir()?;
        let mut env = FakeEnvironment::new(cwd.path());
        let locator = SelfLocator::new(FixedExecutable(install.executable.clone()));
        let mut runtime = FakeRuntime::default();

        let outcome = bootstrap(&os_strings(&["game"]), &mut env, &locator, &mut runtime)?;

        assert_eq!(outcome, Outcome::NothingToBootstrap(ConfigFile::Primary));
        assert_eq!(runtime.argv, None);
        assert_eq!(runtime.machine_config, None);
        // The base directory is entered before configs are looked up.
        assert_eq!(env.cwd, install.base);
        assert_eq!(env.var(CONFIG_ENV), None);
        Ok(())
    }

    #[test]
    fn missing_machine_config_skips_runtime() -> Result<()> {
        let install = install("game", &[PRIMARY_CONFIG_FILE])?;
        let cwd = tempfile::tempdir()?;
        let mut env = FakeEnvironment::new(cwd.path());
        let locator = SelfLocator::new(FixedExecutable(install.executable.clone()));
        let mut runtime = FakeRuntime::default();

        let outcome = bootstrap(&os_strings(&["game"]), &mut env, &locator, &mut runtime)?;

        assert_eq!(outcome, Outcome::NothingToBootstrap(ConfigFile::Machine));
        assert_eq!(runtime.argv, None);
        assert_eq!(env.var(CONFIG_ENV).as_deref(), Some(PRIMARY_CONFIG_FILE));
        Ok(())
    }

    #[test]
    fn unsupported_file_name_is_fatal() -> Result<()> {
        let install = install("game.txt", &[PRIMARY_CONFIG_FILE, MACHINE_CONFIG_FILE])?;
        let cwd = tempfile::tempdir()?;
        let mut env = FakeEnvironment::new(cwd.path());
        let locator = SelfLocator::new(FixedExecutable(install.executable.clone()));
        let mut runtime = FakeRuntime::default();

        let result = bootstrap(&os_strings(&["game"]), &mut env, &locator, &mut runtime);

        assert!(
            matches!(result, Err(BootstrapError::ImageName(_))),
            "result={result:?}"
        );
        assert_eq!(runtime.argv, None);
        // Configs are never consulted.
        assert_eq!(env.var(CONFIG_ENV), None);
        Ok(())
    }

    #[test]
    fn locate_failure_is_fatal_before_side_effects() -> Result<()> {
        let cwd = tempfile::tempdir()?;
        let mut env = FakeEnvironment::new(cwd.path());
        let locator = SelfLocator::new(DisabledIntrospection);
        let mut runtime = FakeRuntime::default();

        let result = bootstrap(&os_strings(&["game"]), &mut env, &locator, &mut runtime);

        assert!(
            matches!(result, Err(BootstrapError::Locate(LocateError::Disabled))),
            "result={result:?}"
        );
        assert_eq!(env.var(SEARCH_PATH_ENV), None);
        assert_eq!(env.cwd, cwd.path());
        assert_eq!(runtime.dirs, None);
        Ok(())
    }

    #[test]
    fn overwrites_search_path() -> Result<()> {
        let install = install("game", &[])?;
        let cwd = tempfile::tempdir()?;
        let mut env = FakeEnvironment::new(cwd.path()).with_var(SEARCH_PATH_ENV, "/stale");
        let locator = SelfLocator::new(FixedExecutable(install.executable.clone()));
        let mut runtime = FakeRuntime::default();

        bootstrap(&os_strings(&["game"]), &mut env, &locator, &mut runtime)?;

        assert_eq!(
            env.var(SEARCH_PATH_ENV),
            Some(install.base.display().to_string())
        );
        Ok(())
    }
}

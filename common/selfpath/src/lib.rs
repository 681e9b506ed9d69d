// Copyright 2024 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Locates the running executable, and the directories a relocatable
//! install keeps next to it, without trusting argv[0].
//!
//! USAGE:
//!
//! ```ignore -- The result depends on where the doctest binary lives.
//! use selfpath::SelfLocator;
//!
//! let locator = SelfLocator::native();
//! let base_dir = locator.locate_base_directory()?;
//! ```
//!
//! The OS-specific part lives behind [`PlatformIntrospection`]; [`native`]
//! picks the implementation for the target platform at build time.

use std::path::{Path, PathBuf};

mod argv;
mod bundle;
mod error;
#[cfg(target_os = "linux")]
mod linux;
#[cfg(target_os = "macos")]
mod macos;
#[cfg(windows)]
mod windows;

pub use crate::argv::ArgvIntrospection;
pub use crate::error::LocateError;
#[cfg(target_os = "linux")]
pub use crate::linux::ProcIntrospection;
#[cfg(target_os = "macos")]
pub use crate::macos::BundleIntrospection;
#[cfg(windows)]
pub use crate::windows::ModuleIntrospection;

/// OS facilities for finding the running executable.
pub trait PlatformIntrospection {
    /// Returns the path of the running executable image.
    fn executable_path(&self) -> Result<PathBuf, LocateError>;

    /// Returns the resource directory associated with `executable`, if the
    /// platform keeps one apart from the binary.
    fn data_dir(&self, _executable: &Path) -> Option<PathBuf> {
        None
    }

    /// Whether the runtime should search the data directory rather than the
    /// executable's directory.
    fn base_is_data_dir(&self) -> bool {
        false
    }
}

/// Introspection that refuses to run. Selected by the
/// `disable-introspection` feature.
#[derive(Clone, Debug, Default)]
pub struct DisabledIntrospection;

impl PlatformIntrospection for DisabledIntrospection {
    fn executable_path(&self) -> Result<PathBuf, LocateError> {
        Err(LocateError::Disabled)
    }
}

#[cfg(feature = "disable-introspection")]
pub type NativeIntrospection = DisabledIntrospection;
#[cfg(all(not(feature = "disable-introspection"), target_os = "linux"))]
pub type NativeIntrospection = ProcIntrospection;
#[cfg(all(not(feature = "disable-introspection"), target_os = "macos"))]
pub type NativeIntrospection = BundleIntrospection;
#[cfg(all(not(feature = "disable-introspection"), windows))]
pub type NativeIntrospection = ModuleIntrospection;
#[cfg(all(
    not(feature = "disable-introspection"),
    not(any(target_os = "linux", target_os = "macos", windows))
))]
pub type NativeIntrospection = ArgvIntrospection;

/// Returns the introspection implementation for the build target.
#[cfg(any(
    feature = "disable-introspection",
    target_os = "linux",
    target_os = "macos",
    windows
))]
pub fn native() -> NativeIntrospection {
    NativeIntrospection::default()
}

/// Returns the introspection implementation for the build target.
#[cfg(all(
    not(feature = "disable-introspection"),
    not(any(target_os = "linux", target_os = "macos", windows))
))]
pub fn native() -> NativeIntrospection {
    ArgvIntrospection::from_process()
}

/// Derives the executable path and install directories from a
/// [`PlatformIntrospection`].
///
/// Nothing is cached: every call re-queries the platform, so repeated calls
/// agree as long as the executable isn't moved in between.
#[derive(Clone, Debug)]
pub struct SelfLocator<P> {
    platform: P,
}

impl SelfLocator<NativeIntrospection> {
    pub fn native() -> Self {
        Self::new(native())
    }
}

impl<P: PlatformIntrospection> SelfLocator<P> {
    pub fn new(platform: P) -> Self {
        Self { platform }
    }

    /// Returns the absolute path of the running executable.
    pub fn locate_executable(&self) -> Result<PathBuf, LocateError> {
        let path = self.platform.executable_path()?;
        if path.as_os_str().is_empty() {
            return Err(LocateError::malformed("the executable path", "is empty"));
        }
        if !path.is_absolute() {
            return Err(LocateError::malformed(
                path.display().to_string(),
                "is not an absolute path",
            ));
        }
        Ok(path)
    }

    /// Returns the canonical directory containing the running executable.
    pub fn locate_executable_dir(&self) -> Result<PathBuf, LocateError> {
        let executable = self.locate_executable()?;
        executable_dir(&executable)
    }

    /// Returns the canonical data directory, which is the executable's
    /// directory unless the platform keeps resources elsewhere.
    pub fn locate_data_dir(&self) -> Result<PathBuf, LocateError> {
        let executable = self.locate_executable()?;
        match self.platform.data_dir(&executable) {
            Some(dir) => canonical_dir(&dir),
            None => executable_dir(&executable),
        }
    }

    /// Returns the directory the runtime should treat as its search root.
    pub fn locate_base_directory(&self) -> Result<PathBuf, LocateError> {
        if self.platform.base_is_data_dir() {
            self.locate_data_dir()
        } else {
            self.locate_executable_dir()
        }
    }
}

fn executable_dir(executable: &Path) -> Result<PathBuf, LocateError> {
    let parent = executable
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .ok_or_else(|| {
            LocateError::malformed(executable.display().to_string(), "has no parent directory")
        })?;
    canonical_dir(parent)
}

#[cfg(not(windows))]
fn canonical_dir(dir: &Path) -> Result<PathBuf, LocateError> {
    let canonical = std::fs::canonicalize(dir).map_err(|e| {
        LocateError::malformed(
            dir.display().to_string(),
            format!("cannot be resolved: {e}"),
        )
    })?;
    ensure_dir(canonical)
}

// fs::canonicalize() returns verbatim `\\?\` paths on Windows, which the
// runtime can't handle.
#[cfg(windows)]
fn canonical_dir(dir: &Path) -> Result<PathBuf, LocateError> {
    use path_absolutize::Absolutize;

    let canonical = dir.absolutize().map_err(|e| {
        LocateError::malformed(
            dir.display().to_string(),
            format!("cannot be resolved: {e}"),
        )
    })?;
    ensure_dir(canonical.into_owned())
}

fn ensure_dir(dir: PathBuf) -> Result<PathBuf, LocateError> {
    if !dir.is_dir() {
        return Err(LocateError::malformed(dir.display().to_string(), "is not a directory"));
    }
    Ok(dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    use anyhow::Result;

    struct FixedExecutable {
        path: PathBuf,
        data_dir: Option<PathBuf>,
    }

    impl FixedExecutable {
        fn new(path: impl Into<PathBuf>) -> Self {
            Self {
                path: path.into(),
                data_dir: None,
            }
        }
    }

    impl PlatformIntrospection for FixedExecutable {
        fn executable_path(&self) -> Result<PathBuf, LocateError> {
            Ok(self.path.clone())
        }

        fn data_dir(&self, _executable: &Path) -> Option<PathBuf> {
            self.data_dir.clone()
        }

        fn base_is_data_dir(&self) -> bool {
            self.data_dir.is_some()
        }
    }

    #[test]
    fn rejects_relative_path() {
        let err = SelfLocator::new(FixedExecutable::new("bin/game"))
            .locate_executable()
            .unwrap_err();
        assert!(
            matches!(err, LocateError::IntrospectionMalformed { .. }),
            "err={err:?}"
        );
    }

    #[test]
    fn rejects_empty_path() {
        let err = SelfLocator::new(FixedExecutable::new(""))
            .locate_executable()
            .unwrap_err();
        assert!(
            matches!(err, LocateError::IntrospectionMalformed { .. }),
            "err={err:?}"
        );
    }

    #[test]
    fn base_directory_is_canonical_parent() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let real = dir.path().join("real");
        std::fs::create_dir(&real)?;
        let executable = real.join("..").join("real").join("Game.bin.x86_64");

        let locator = SelfLocator::new(FixedExecutable::new(executable));
        assert_eq!(
            locator.locate_base_directory()?,
            std::fs::canonicalize(&real)?
        );
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn base_directory_follows_symlinked_dirs() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let real = dir.path().join("real");
        std::fs::create_dir(&real)?;
        std::os::unix::fs::symlink(&real, dir.path().join("link"))?;

        let locator = SelfLocator::new(FixedExecutable::new(dir.path().join("link/game")));
        assert_eq!(
            locator.locate_executable_dir()?,
            std::fs::canonicalize(&real)?
        );
        Ok(())
    }

    #[test]
    fn missing_directory_is_malformed() -> Result<()> {
        let dir = tempfile::tempdir()?;

        let locator = SelfLocator::new(FixedExecutable::new(dir.path().join("gone/game")));
        let err = locator.locate_base_directory().unwrap_err();
        assert!(
            matches!(err, LocateError::IntrospectionMalformed { .. }),
            "err={err:?}"
        );
        Ok(())
    }

    #[test]
    fn data_directory_replaces_base_when_preferred() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let resources = dir.path().join("Resources");
        std::fs::create_dir(&resources)?;

        let locator = SelfLocator::new(FixedExecutable {
            path: dir.path().join("game"),
            data_dir: Some(resources.clone()),
        });
        assert_eq!(
            locator.locate_executable_dir()?,
            std::fs::canonicalize(dir.path())?
        );
        assert_eq!(
            locator.locate_base_directory()?,
            std::fs::canonicalize(&resources)?
        );
        Ok(())
    }

    #[test]
    fn disabled_introspection_fails() {
        let err = SelfLocator::new(DisabledIntrospection)
            .locate_base_directory()
            .unwrap_err();
        assert!(matches!(err, LocateError::Disabled), "err={err:?}");
    }

    #[cfg(all(not(feature = "disable-introspection"), target_os = "linux"))]
    #[test]
    fn native_lookup_is_stable() -> Result<()> {
        let locator = SelfLocator::native();
        let first = locator.locate_base_directory()?;
        let second = locator.locate_base_directory()?;
        assert_eq!(first, second);
        assert_eq!(
            locator.locate_executable()?,
            std::fs::canonicalize(std::env::current_exe()?)?
        );
        Ok(())
    }
}

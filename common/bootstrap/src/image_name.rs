// Copyright 2024 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

use std::path::{Path, PathBuf};

/// Launchers shipped as `Foo.bin.<platform>` run the assembly `Foo.exe`.
const BIN_MARKER: &str = ".bin.";
const EXE_SUFFIX: &str = ".exe";

#[derive(Debug, thiserror::Error)]
#[error("Failed to get exe name!")]
pub struct ImageNameError {
    pub executable: PathBuf,
}

/// Computes the assembly name the runtime should see as argv[0], from the
/// file name of `executable` only:
///
/// - `Foo.bin.x86_64` becomes `Foo.exe` (everything from the first `.bin.`
///   is replaced);
/// - `foo`, having no extension, becomes `foo.exe`;
/// - any other name with a `.` is rejected.
pub fn derive_image_name(executable: &Path) -> Result<String, ImageNameError> {
    let error = || ImageNameError {
        executable: executable.to_path_buf(),
    };
    let file_name = executable
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(error)?;

    if let Some(pos) = file_name.find(BIN_MARKER) {
        return Ok(format!("{}{EXE_SUFFIX}", &file_name[..pos]));
    }
    if !file_name.contains('.') {
        return Ok(format!("{file_name}{EXE_SUFFIX}"));
    }
    Err(error())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn derive(path: &str) -> Option<String> {
        derive_image_name(Path::new(path)).ok()
    }

    #[test]
    fn replaces_bin_suffix() {
        assert_eq!(derive("/a/b/Foo.bin.x86_64").as_deref(), Some("Foo.exe"));
        assert_eq!(derive("/a/b/foo.bin.linux").as_deref(), Some("foo.exe"));
        assert_eq!(derive("/a/b/Foo.bin.").as_deref(), Some("Foo.exe"));
    }

    #[test]
    fn replaces_from_first_bin_marker() {
        assert_eq!(derive("/a/Foo.bin.bin.osx").as_deref(), Some("Foo.exe"));
        assert_eq!(
            derive("/a/Foo.Game.bin.x86").as_deref(),
            Some("Foo.Game.exe")
        );
    }

    #[test]
    fn appends_exe_to_bare_names() {
        assert_eq!(derive("/a/b/foo").as_deref(), Some("foo.exe"));
        assert_eq!(derive("/a/b/foo.bin").as_deref(), None);
    }

    #[test]
    fn rejects_other_extensions() {
        assert_eq!(derive("/a/b/foo.txt"), None);
        assert_eq!(derive("/a/b/Program.exe"), None);
        let err = derive_image_name(Path::new("/a/b/foo.txt")).unwrap_err();
        assert_eq!(err.to_string(), "Failed to get exe name!");
    }

    #[test]
    fn rejects_paths_without_file_name() {
        assert_eq!(derive("/"), None);
        assert_eq!(derive("/a/.."), None);
    }

    #[test]
    fn depends_only_on_file_name() {
        for dir in ["/", "/a/b/", "/opt/games/Some Game/", "/x.bin.y/"] {
            assert_eq!(
                derive(&format!("{dir}Foo.bin.x86_64")).as_deref(),
                Some("Foo.exe"),
                "dir={dir}"
            );
            assert_eq!(derive(&format!("{dir}foo")).as_deref(), Some("foo.exe"));
            assert_eq!(derive(&format!("{dir}foo.txt")), None);
        }
    }
}

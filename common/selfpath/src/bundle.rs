// Copyright 2024 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

use std::path::{Path, PathBuf};

/// Returns `Foo.app/Contents/Resources` for an executable at
/// `Foo.app/Contents/MacOS/<name>`, if that directory exists.
#[cfg_attr(not(target_os = "macos"), allow(dead_code))]
pub(crate) fn bundle_resources_dir(executable: &Path) -> Option<PathBuf> {
    let macos = executable.parent()?;
    let contents = macos.parent()?;
    if macos.file_name()? != "MacOS" || contents.file_name()? != "Contents" {
        return None;
    }
    let resources = contents.join("Resources");
    resources.is_dir().then_some(resources)
}

// Copyright 2024 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

/// Name of the environment variable carrying extra runtime options.
pub const BUNDLED_OPTIONS_ENV: &str = "MONO_BUNDLED_OPTIONS";

/// Splits the value of [`BUNDLED_OPTIONS_ENV`] into options.
///
/// Options are separated by single spaces with no quoting, so an option
/// can't contain a space. Empty tokens (from doubled or trailing spaces)
/// are passed through as empty arguments.
pub fn parse_injected_options(value: Option<&str>) -> Vec<String> {
    match value {
        None => Vec::new(),
        Some(value) => value.split(' ').map(str::to_owned).collect(),
    }
}

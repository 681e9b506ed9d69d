// Copyright 2024 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

use std::collections::TryReserveError;
use std::io;

use selfpath::LocateError;

use crate::config::MACHINE_CONFIG_FILE;
use crate::image_name::ImageNameError;

/// A fatal bootstrap failure. Each variant's message is the diagnostic shown
/// to the user.
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Locate(#[from] LocateError),

    #[error(transparent)]
    ImageName(#[from] ImageNameError),

    #[error("Could not allocate enough memory")]
    OutOfMemory(#[from] TryReserveError),

    #[error("Couldn't read {}", MACHINE_CONFIG_FILE)]
    ReadMachineConfig(#[source] io::Error),

    #[error(transparent)]
    Runtime(anyhow::Error),
}

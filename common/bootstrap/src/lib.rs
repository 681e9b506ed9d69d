// Copyright 2024 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Prepares a relocatable install of a managed application and hands
//! control to its runtime.
//!
//! [`bootstrap`] runs the whole sequence: locate the install, export it to
//! the runtime and enter it, build the runtime's argument vector, check the
//! config files, and call the runtime's entry point. Process-global state
//! and the runtime are reached through [`ProcessEnvironment`] and
//! [`ManagedRuntime`] so that the sequence can run against fakes.

mod args;
mod config;
mod driver;
mod environment;
mod error;
mod image_name;
mod options;
pub mod runtime;

pub use crate::args::{assemble, process_args};
pub use crate::config::{
    load_configs, ConfigFile, ConfigState, CONFIG_ENV, MACHINE_CONFIG_FILE, PRIMARY_CONFIG_FILE,
};
pub use crate::driver::{bootstrap, Outcome, SEARCH_PATH_ENV};
pub use crate::environment::{OsEnvironment, ProcessEnvironment};
pub use crate::error::BootstrapError;
pub use crate::image_name::{derive_image_name, ImageNameError};
pub use crate::options::{parse_injected_options, BUNDLED_OPTIONS_ENV};
pub use crate::runtime::ManagedRuntime;

// Copyright 2024 The ChromiumOS Authors
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

use std::collections::TryReserveError;
use std::io;

/// Reasons the running executable could not be located.
///
/// `reference` names the introspection source that was consulted (e.g.
/// `/proc/self/exe`) so that the diagnostic tells the user what to look at.
#[derive(Debug, thiserror::Error)]
pub enum LocateError {
    #[error("Could not allocate enough memory")]
    OutOfMemory(#[from] TryReserveError),

    #[error("Couldn't open {reference}")]
    IntrospectionUnavailable {
        reference: String,
        #[source]
        source: io::Error,
    },

    #[error("Couldn't read {reference}")]
    IntrospectionReadFailed {
        reference: String,
        #[source]
        source: io::Error,
    },

    #[error("{reference} is malformed: {reason}")]
    IntrospectionMalformed { reference: String, reason: String },

    #[error("Executable self-location is disabled in this build")]
    Disabled,
}

impl LocateError {
    pub(crate) fn unavailable(reference: impl Into<String>, source: io::Error) -> Self {
        Self::IntrospectionUnavailable {
            reference: reference.into(),
            source,
        }
    }

    pub(crate) fn read_failed(reference: impl Into<String>, source: io::Error) -> Self {
        Self::IntrospectionReadFailed {
            reference: reference.into(),
            source,
        }
    }

    pub(crate) fn malformed(reference: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::IntrospectionMalformed {
            reference: reference.into(),
            reason: reason.into(),
        }
    }
}

// Copyright 2026 the Tachisto Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types.

use alloc::string::String;

/// Errors returned while setting up a [`Window`](crate::window::Window).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The platform refused to attach the rendering surface to the host.
    #[error("failed to attach the surface to the host: {0}")]
    Attach(#[source] PlatformError),

    /// The platform could not install resize/orientation listeners.
    #[error("failed to subscribe to host events: {0}")]
    Subscribe(#[source] PlatformError),
}

/// A failure reported by a host platform adapter.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct PlatformError {
    message: String,
}

impl PlatformError {
    /// Creates a platform error with the given description.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The description passed at construction.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// A failure returned by a flip callback.
///
/// The frame loop logs these and continues with the remaining callbacks.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct CallbackError {
    message: String,
}

impl CallbackError {
    /// Creates a callback error with the given description.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The description passed at construction.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Returned when parsing an unrecognized [`Units`](crate::config::Units) name.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown units `{0}` (expected one of pix, norm, height, deg, cm)")]
pub struct ParseUnitsError(pub String);

// Copyright 2026 the Tachisto Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Window configuration.

use alloc::string::String;
use core::fmt;
use core::str::FromStr;

use crate::color::Color;
use crate::error::ParseUnitsError;

/// Coordinate units stimuli are expressed in.
///
/// The core only records the choice; conversion to device pixels is the job
/// of the drawables.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Units {
    /// Device pixels.
    #[default]
    Pix,
    /// Normalized coordinates, `-1..1` on both axes.
    Norm,
    /// Fractions of the surface height.
    Height,
    /// Degrees of visual angle.
    Deg,
    /// Centimeters on the display.
    Cm,
}

impl Units {
    /// The canonical lowercase name, as accepted by [`FromStr`].
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pix => "pix",
            Self::Norm => "norm",
            Self::Height => "height",
            Self::Deg => "deg",
            Self::Cm => "cm",
        }
    }
}

impl FromStr for Units {
    type Err = ParseUnitsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pix" => Ok(Self::Pix),
            "norm" => Ok(Self::Norm),
            "height" => Ok(Self::Height),
            "deg" => Ok(Self::Deg),
            "cm" => Ok(Self::Cm),
            other => Err(ParseUnitsError(other.into())),
        }
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options recognized when creating a [`Window`](crate::window::Window).
#[derive(Clone, Debug, PartialEq)]
pub struct WindowConfig {
    /// Name used in diagnostic log lines.
    pub name: String,
    /// Whether to request fullscreen at creation.
    pub fullscreen: bool,
    /// Surface (and page) background color.
    pub background_color: Color,
    /// Units stimuli are expressed in.
    pub units: Units,
    /// Whether [`render`](crate::window::Window::render) blocks until the
    /// backend reports the pipeline fully drained.
    pub wait_blanking: bool,
    /// Whether the window logs its own lifecycle diagnostics.
    pub auto_log: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            name: String::from("window"),
            fullscreen: false,
            background_color: Color::BLACK,
            units: Units::Pix,
            wait_blanking: false,
            auto_log: true,
        }
    }
}

impl WindowConfig {
    /// Sets [`name`](Self::name).
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets [`fullscreen`](Self::fullscreen).
    #[must_use]
    pub fn with_fullscreen(mut self, fullscreen: bool) -> Self {
        self.fullscreen = fullscreen;
        self
    }

    /// Sets [`background_color`](Self::background_color).
    #[must_use]
    pub fn with_background_color(mut self, color: Color) -> Self {
        self.background_color = color;
        self
    }

    /// Sets [`units`](Self::units).
    #[must_use]
    pub fn with_units(mut self, units: Units) -> Self {
        self.units = units;
        self
    }

    /// Sets [`wait_blanking`](Self::wait_blanking).
    #[must_use]
    pub fn with_wait_blanking(mut self, wait_blanking: bool) -> Self {
        self.wait_blanking = wait_blanking;
        self
    }

    /// Sets [`auto_log`](Self::auto_log).
    #[must_use]
    pub fn with_auto_log(mut self, auto_log: bool) -> Self {
        self.auto_log = auto_log;
        self
    }
}

// Copyright 2026 the Tachisto Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Minimal RGB color value.
//!
//! Backends consume a color in two encodings: a packed `0xRRGGBB` integer for
//! the renderer clear color, and a `#rrggbb` string for page-level
//! backgrounds.

use alloc::string::String;
use core::fmt;

/// An opaque RGB color with components in `0.0..=1.0`.
#[derive(Clone, Copy, PartialEq)]
pub struct Color {
    /// Red component.
    pub r: f32,
    /// Green component.
    pub g: f32,
    /// Blue component.
    pub b: f32,
}

impl Color {
    /// Black, the default window background.
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);
    /// White.
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);
    /// Mid grey, the classic stimulus-presentation background.
    pub const GREY: Self = Self::rgb(0.5, 0.5, 0.5);

    /// Creates a color from float components, clamped to `0.0..=1.0`.
    #[must_use]
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self {
            r: r.clamp(0.0, 1.0),
            g: g.clamp(0.0, 1.0),
            b: b.clamp(0.0, 1.0),
        }
    }

    /// Creates a color from a packed `0xRRGGBB` integer.
    #[must_use]
    pub fn from_rgb_u32(packed: u32) -> Self {
        let [_, r, g, b] = packed.to_be_bytes();
        Self::rgb(
            f32::from(r) / 255.0,
            f32::from(g) / 255.0,
            f32::from(b) / 255.0,
        )
    }

    /// Returns the color packed as `0xRRGGBB`.
    #[must_use]
    pub fn to_rgb_u32(self) -> u32 {
        let [r, g, b] = self.to_rgb8();
        u32::from_be_bytes([0, r, g, b])
    }

    /// Returns the 8-bit components.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "components are clamped to 0..=1 so the scaled value fits in u8"
    )]
    pub fn to_rgb8(self) -> [u8; 3] {
        let q = |c: f32| (c * 255.0 + 0.5) as u8;
        [q(self.r), q(self.g), q(self.b)]
    }

    /// Returns the CSS hex form, e.g. `#808080`.
    #[must_use]
    pub fn to_hex(self) -> String {
        let [r, g, b] = self.to_rgb8();
        alloc::format!("#{r:02x}{g:02x}{b:02x}")
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

impl fmt::Debug for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Color({})", self.to_hex())
    }
}

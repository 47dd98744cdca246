// Copyright 2026 the Tachisto Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Web backend for tachisto.
//!
//! This crate provides integration with browser APIs:
//!
//! - [`WebPlatform`]: canvas attachment, page background, resize and
//!   orientation listeners, and the vendor-prefixed fullscreen APIs
//! - [`WebGlRenderer`]: a WebGL2 renderer drawing solid [`GlQuad`]s
//! - [`RectStimulus`]: a rectangle stimulus producing [`GlQuad`] nodes
//! - [`now`] / [`PerformanceClock`]: `performance.now()` reference time
//!
//! A typical setup creates one canvas with [`create_canvas`], hands a clone
//! to both the platform and the renderer, and forwards host events from the
//! platform callback to `Window::handle_host_event`.

#![no_std]

extern crate alloc;

mod platform;
mod renderer;
mod stimulus;

pub use platform::WebPlatform;
pub use renderer::{GlQuad, WebGlRenderer};
pub use stimulus::RectStimulus;
pub use tachisto_core::backend::{Platform, Renderer};

use alloc::format;

use tachisto_core::error::PlatformError;
use tachisto_core::time::{Clock, HostTime, Timebase};
use wasm_bindgen::JsCast as _;
use wasm_bindgen::prelude::*;
use web_sys::HtmlCanvasElement;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = performance, js_name = "now")]
    fn performance_now() -> f64;
}

/// Returns the current host time from `performance.now()`.
///
/// The returned [`HostTime`] is in microsecond ticks. Use [`timebase`] to
/// convert to nanoseconds.
#[must_use]
pub fn now() -> HostTime {
    millis_to_host_time(performance_now())
}

/// Returns the web [`Timebase`]: 1 tick = 1 µs.
#[must_use]
pub fn timebase() -> Timebase {
    Timebase::MICROS
}

/// [`Clock`] reading `performance.now()`.
#[derive(Clone, Copy, Debug, Default)]
pub struct PerformanceClock;

impl Clock for PerformanceClock {
    fn now(&self) -> HostTime {
        now()
    }

    fn timebase(&self) -> Timebase {
        timebase()
    }
}

/// Creates a detached `<canvas>` element in the current document.
pub fn create_canvas() -> Result<HtmlCanvasElement, PlatformError> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| PlatformError::new("no document"))?;
    let element = document
        .create_element("canvas")
        .map_err(|err| PlatformError::new(format!("cannot create canvas: {err:?}")))?;
    element
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|_| PlatformError::new("created element is not a canvas"))
}

#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "performance.now() returns small positive f64; µs fits in u64"
)]
fn millis_to_host_time(ms: f64) -> HostTime {
    HostTime((ms * 1000.0) as u64)
}

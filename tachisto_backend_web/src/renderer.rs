// Copyright 2026 the Tachisto Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! WebGL2 rendering of solid quads.
//!
//! Each [`GlQuad`] is a rectangle in stimulus coordinates. It is mapped to
//! canvas pixels through the scene's root transform and filled with a
//! scissored clear, so the renderer needs no shaders or buffers.

use alloc::format;

use kurbo::{Affine, Rect, Size};
use tachisto_core::backend::Renderer;
use tachisto_core::color::Color;
use tachisto_core::error::PlatformError;
use tachisto_core::scene::SceneGraph;
use wasm_bindgen::JsCast as _;
use web_sys::{HtmlCanvasElement, WebGl2RenderingContext as Gl};

/// A solid rectangle in stimulus coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlQuad {
    /// Extent, with the origin at the surface center and y pointing up.
    pub rect: Rect,
    /// Fill color.
    pub color: Color,
}

/// [`Renderer`] drawing [`GlQuad`] nodes with WebGL2.
pub struct WebGlRenderer {
    canvas: HtmlCanvasElement,
    gl: Gl,
    size: Size,
    background: Color,
    readback: [u8; 4],
}

impl core::fmt::Debug for WebGlRenderer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("WebGlRenderer")
            .field("canvas", &"HtmlCanvasElement")
            .field("size", &self.size)
            .field("background", &self.background)
            .finish_non_exhaustive()
    }
}

impl WebGlRenderer {
    /// Creates a renderer with a WebGL2 context on `canvas`.
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, PlatformError> {
        let context = canvas
            .get_context("webgl2")
            .map_err(|err| PlatformError::new(format!("cannot create context: {err:?}")))?
            .ok_or_else(|| PlatformError::new("WebGL2 is not available"))?;
        let gl = context
            .dyn_into::<Gl>()
            .map_err(|_| PlatformError::new("context is not WebGL2"))?;
        Ok(Self {
            canvas,
            gl,
            size: Size::ZERO,
            background: Color::BLACK,
            readback: [0; 4],
        })
    }

    /// Returns the canvas this renderer draws into.
    #[must_use]
    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    fn clear(&self, color: Color) {
        self.gl.clear_color(color.r, color.g, color.b, 1.0);
        self.gl.clear(Gl::COLOR_BUFFER_BIT);
    }
}

/// Maps `rect` through `transform` and returns the covered pixels as a
/// GL scissor box `[x, y, width, height]` with a bottom-left origin.
#[expect(
    clippy::cast_possible_truncation,
    reason = "pixel coordinates of an on-screen canvas fit in i32"
)]
fn scissor_box(rect: Rect, transform: Affine, surface_height: f64) -> [i32; 4] {
    let pixels = transform.transform_rect_bbox(rect).round();
    [
        pixels.x0 as i32,
        (surface_height - pixels.y1) as i32,
        pixels.width() as i32,
        pixels.height() as i32,
    ]
}

#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "viewport sizes are small positive values"
)]
fn pixel_extent(value: f64) -> u32 {
    value.max(0.0).round() as u32
}

impl Renderer for WebGlRenderer {
    type Node = GlQuad;

    fn resize(&mut self, size: Size) {
        let (width, height) = (pixel_extent(size.width), pixel_extent(size.height));
        self.canvas.set_width(width);
        self.canvas.set_height(height);
        let style = self.canvas.style();
        let _ = style.set_property("width", &format!("{width}px"));
        let _ = style.set_property("height", &format!("{height}px"));
        self.gl.viewport(
            0,
            0,
            i32::try_from(width).unwrap_or(i32::MAX),
            i32::try_from(height).unwrap_or(i32::MAX),
        );
        self.size = size;
    }

    fn set_background(&mut self, color: Color) {
        self.background = color;
    }

    fn render(&mut self, scene: &SceneGraph<GlQuad>) {
        self.gl.disable(Gl::SCISSOR_TEST);
        self.clear(self.background);

        self.gl.enable(Gl::SCISSOR_TEST);
        let transform = scene.root_transform();
        for &id in scene.draw_order() {
            let Some(quad) = scene.get(id) else {
                continue;
            };
            let [x, y, width, height] = scissor_box(quad.rect, transform, self.size.height);
            if width <= 0 || height <= 0 {
                continue;
            }
            self.gl.scissor(x, y, width, height);
            self.clear(quad.color);
        }
        self.gl.disable(Gl::SCISSOR_TEST);
        self.gl.flush();
    }

    fn barrier(&mut self) {
        // Reading back a pixel stalls until the submitted frame has completed.
        let _ = self.gl.read_pixels_with_opt_u8_array(
            0,
            0,
            1,
            1,
            Gl::RGBA,
            Gl::UNSIGNED_BYTE,
            Some(&mut self.readback),
        );
    }

    fn wait_idle(&mut self) {
        self.gl.finish();
    }
}

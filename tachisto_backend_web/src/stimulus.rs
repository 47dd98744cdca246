// Copyright 2026 the Tachisto Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rectangle stimulus.

use kurbo::{Point, Rect, Size};
use tachisto_core::color::Color;
use tachisto_core::draw_list::Drawable;

use crate::renderer::GlQuad;

/// A filled, axis-aligned rectangle.
///
/// Every setter flags the stimulus, so the window rebuilds its quad on the
/// next frame.
#[derive(Clone, Debug)]
pub struct RectStimulus {
    pos: Point,
    size: Size,
    color: Color,
    needs_update: bool,
}

impl RectStimulus {
    /// Creates a rectangle centered on `pos`.
    #[must_use]
    pub fn new(pos: Point, size: Size, color: Color) -> Self {
        Self {
            pos,
            size,
            color,
            needs_update: true,
        }
    }

    /// Center position in stimulus units.
    #[must_use]
    pub fn pos(&self) -> Point {
        self.pos
    }

    /// Moves the center to `pos`.
    pub fn set_pos(&mut self, pos: Point) {
        self.pos = pos;
        self.needs_update = true;
    }

    /// Width and height in stimulus units.
    #[must_use]
    pub fn size(&self) -> Size {
        self.size
    }

    /// Changes the width and height.
    pub fn set_size(&mut self, size: Size) {
        self.size = size;
        self.needs_update = true;
    }

    /// Fill color.
    #[must_use]
    pub fn color(&self) -> Color {
        self.color
    }

    /// Changes the fill color.
    pub fn set_color(&mut self, color: Color) {
        self.color = color;
        self.needs_update = true;
    }

    fn quad(&self) -> GlQuad {
        GlQuad {
            rect: Rect::from_center_size(self.pos, self.size),
            color: self.color,
        }
    }
}

impl Drawable<GlQuad> for RectStimulus {
    fn needs_update(&self) -> bool {
        self.needs_update
    }

    fn set_needs_update(&mut self) {
        self.needs_update = true;
    }

    fn realize(&mut self) -> Option<GlQuad> {
        self.needs_update = false;
        Some(self.quad())
    }

    fn update_if_needed(&mut self, node: &mut GlQuad) {
        if self.needs_update {
            *node = self.quad();
            self.needs_update = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stim() -> RectStimulus {
        RectStimulus::new(Point::ORIGIN, Size::new(20.0, 10.0), Color::WHITE)
    }

    #[test]
    fn realized_quad_is_centered_on_pos() {
        let mut stim = stim();
        let quad = stim.realize().unwrap();
        assert_eq!(quad.rect, Rect::new(-10.0, -5.0, 10.0, 5.0));
        assert!(!stim.needs_update(), "a fresh quad is up to date");
    }

    #[test]
    fn setters_flag_and_update_rewrites_quad() {
        let mut stim = stim();
        let mut quad = stim.realize().unwrap();

        stim.set_pos(Point::new(100.0, 0.0));
        stim.set_color(Color::GREY);
        assert!(stim.needs_update(), "setters flag the stimulus");

        stim.update_if_needed(&mut quad);
        assert_eq!(quad.rect, Rect::new(90.0, -5.0, 110.0, 5.0));
        assert_eq!(quad.color, Color::GREY);
        assert!(!stim.needs_update(), "update clears the flag");
    }

    #[test]
    fn clean_stimulus_leaves_node_alone() {
        let mut stim = stim();
        let mut quad = stim.realize().unwrap();
        quad.color = Color::BLACK;
        stim.update_if_needed(&mut quad);
        assert_eq!(quad.color, Color::BLACK);
    }
}

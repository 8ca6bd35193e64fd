//! Screen layout boxes
//!
//! Nested rectangles used to place menu entries and overlay text relative
//! to the logical screen.

use glam::Vec2;

use crate::Rect;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct View {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl View {
    pub fn push(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Child box offset from `parent`. A non-positive size inherits the
    /// parent's; the result never exceeds the parent's size.
    pub fn push_from(parent: View, x: f32, y: f32, width: f32, height: f32) -> Self {
        let width = if width > 0.0 { width } else { parent.width };
        let height = if height > 0.0 { height } else { parent.height };

        Self {
            x: parent.x + x,
            y: parent.y + y,
            width: width.min(parent.width),
            height: height.min(parent.height),
        }
    }

    /// Zero-sized anchor for a text run
    pub fn push_text(parent: View, x: f32, y: f32) -> Self {
        Self {
            x: parent.x + x,
            y: parent.y + y,
            width: 0.0,
            height: 0.0,
        }
    }

    /// Box of the given size centered in `parent`
    pub fn push_centered(parent: View, width: f32, height: f32) -> Self {
        Self {
            x: parent.x + parent.width * 0.5 - width * 0.5,
            y: parent.y + parent.height * 0.5 - height * 0.5,
            width,
            height,
        }
    }

    pub fn add_padding(&mut self, padding: f32, align_factor: f32) {
        self.x += padding;
        self.y += padding;
        self.width = self.width - padding - align_factor;
        self.height = self.height - padding - align_factor;
    }

    #[inline]
    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn to_rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

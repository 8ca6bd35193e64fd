//! Per-frame draw submission buffer
//!
//! Components push draw requests while they tick; the platform layer hands
//! the buffer to a [`Renderer`] once per frame. Requests are emitted in
//! ascending depth order, and requests sharing a depth keep the order they
//! were added in.

use glam::Vec2;

use super::resources::ResHandle;
use crate::Rect;

/// RGBA color, components in 0..=1
pub type Color = [f32; 4];

/// Colors for game elements
pub mod colors {
    use super::Color;

    pub const WHITE: Color = [1.0, 1.0, 1.0, 1.0];
    pub const MENU_IDLE: Color = [0.6, 0.6, 0.65, 1.0];
    pub const MENU_SELECTED: Color = [1.0, 0.85, 0.3, 1.0];
    pub const WIN: Color = [0.3, 0.9, 0.4, 1.0];
    pub const LOSE: Color = [0.95, 0.3, 0.25, 1.0];
}

/// A textured quad
#[derive(Debug, Clone, PartialEq)]
pub struct TextureDraw {
    /// Top-left corner in screen space
    pub position: Vec2,
    pub size: Vec2,
    pub texture: ResHandle,
    /// Region of the texture to sample; `None` samples the whole texture
    pub source: Option<Rect>,
    pub tint: Color,
    pub depth: i32,
}

/// A run of text
#[derive(Debug, Clone, PartialEq)]
pub struct TextDraw {
    pub position: Vec2,
    pub font: ResHandle,
    pub font_size: f32,
    pub spacing: f32,
    pub text: String,
    pub color: Color,
    pub depth: i32,
}

impl TextDraw {
    pub fn new(text: impl Into<String>, position: Vec2, font: ResHandle, font_size: f32) -> Self {
        Self {
            position,
            font,
            font_size,
            spacing: 1.0,
            text: text.into(),
            color: colors::WHITE,
            depth: 0,
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_depth(mut self, depth: i32) -> Self {
        self.depth = depth;
        self
    }
}

/// Anything the buffer accepts
#[derive(Debug, Clone, PartialEq)]
pub enum DrawRequest {
    Texture(TextureDraw),
    Text(TextDraw),
}

impl From<TextureDraw> for DrawRequest {
    fn from(item: TextureDraw) -> Self {
        DrawRequest::Texture(item)
    }
}

impl From<TextDraw> for DrawRequest {
    fn from(item: TextDraw) -> Self {
        DrawRequest::Text(item)
    }
}

/// The external backend that turns requests into pixels
pub trait Renderer {
    fn draw_texture(&mut self, item: &TextureDraw);
    fn draw_text(&mut self, item: &TextDraw);
}

/// Renderer that only remembers what it was asked to draw
#[derive(Debug, Default)]
pub struct DrawLog {
    pub calls: Vec<DrawRequest>,
}

impl Renderer for DrawLog {
    fn draw_texture(&mut self, item: &TextureDraw) {
        self.calls.push(DrawRequest::Texture(item.clone()));
    }

    fn draw_text(&mut self, item: &TextDraw) {
        self.calls.push(DrawRequest::Text(item.clone()));
    }
}

/// Snapshot of a frame's draw requests, replayed while a result screen is up
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordedDraws {
    pub textures: Vec<TextureDraw>,
    pub texts: Vec<TextDraw>,
}

impl RecordedDraws {
    pub fn clear(&mut self) {
        self.textures.clear();
        self.texts.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty() && self.texts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.textures.len() + self.texts.len()
    }
}

#[derive(Debug, Default)]
pub struct DrawBuffer {
    textures: Vec<TextureDraw>,
    texts: Vec<TextDraw>,
}

impl DrawBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, request: impl Into<DrawRequest>) {
        match request.into() {
            DrawRequest::Texture(item) => self.textures.push(item),
            DrawRequest::Text(item) => self.texts.push(item),
        }
    }

    /// Sort by depth and emit everything: quads first, then text on top
    pub fn dispatch(&mut self, renderer: &mut impl Renderer) {
        // sort_by_key is stable, equal depths keep insertion order
        self.textures.sort_by_key(|item| item.depth);
        self.texts.sort_by_key(|item| item.depth);

        for item in &self.textures {
            renderer.draw_texture(item);
        }
        for item in &self.texts {
            renderer.draw_text(item);
        }
    }

    pub fn flush(&mut self) {
        self.textures.clear();
        self.texts.clear();
    }

    /// Append the current contents to `record`
    pub fn record(&self, record: &mut RecordedDraws) {
        record.textures.extend_from_slice(&self.textures);
        record.texts.extend_from_slice(&self.texts);
    }

    /// Append a recorded frame to the current contents
    pub fn copy_from(&mut self, record: &RecordedDraws) {
        self.textures.extend_from_slice(&record.textures);
        self.texts.extend_from_slice(&record.texts);
    }

    pub fn textures(&self) -> &[TextureDraw] {
        &self.textures
    }

    pub fn texts(&self) -> &[TextDraw] {
        &self.texts
    }

    pub fn len(&self) -> usize {
        self.textures.len() + self.texts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty() && self.texts.is_empty()
    }
}

//! Render boundary
//!
//! The core never touches pixels. It queues draw requests referencing
//! opaque resource handles and hands them to an external renderer.

pub mod draw;
pub mod resources;

pub use draw::{
    Color, DrawBuffer, DrawLog, DrawRequest, RecordedDraws, Renderer, TextDraw, TextureDraw,
    colors,
};
pub use resources::{MAX_RESOURCES, ResHandle, ResKind, ResourceRegistry};

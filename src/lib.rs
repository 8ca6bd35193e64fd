//! Breakout Core - simulation core of a 2D arcade breakout game
//!
//! Core modules:
//! - `memory`: Bump arena backing entity component storage
//! - `sim`: Entities, components, collisions and the gameplay state machine
//! - `renderer`: Draw submission buffer and resource handles (no GPU work)
//! - `platform`: Logical input actions sampled once per frame
//! - `settings`: Data-driven game configuration
//! - `ui`: Rectangle layout for menu and overlay text

pub mod memory;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod ui;

pub use settings::{DisplaySettings, GameConfig, SideBounce, TileLayout};

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Game configuration constants
pub mod consts {
    /// Target frames per second of the fixed simulation step
    pub const TARGET_FPS: u32 = 90;
    /// Fixed simulation timestep
    pub const TIME_STEP: f32 = 1.0 / TARGET_FPS as f32;

    /// Logical screen the simulation works in
    pub const SCREEN_WIDTH: f32 = 1920.0;
    pub const SCREEN_HEIGHT: f32 = 1080.0;

    /// Paddle defaults
    pub const PADDLE_WIDTH: f32 = 200.0;
    pub const PADDLE_HEIGHT: f32 = 30.0;
    pub const PADDLE_SPEED: f32 = 900.0;
    pub const PADDLE_SPRINT_MULTIPLIER: f32 = 1.75;
    /// Gap between the paddle bottom and the lower screen edge
    pub const PADDLE_BOTTOM_MARGIN: f32 = 40.0;

    /// Ball defaults
    pub const BALL_RADIUS: f32 = 14.0;
    pub const BALL_INITIAL_VELOCITY: [f32; 2] = [300.0, -550.0];
    /// Horizontal deflection strength when bouncing off the paddle
    pub const PADDLE_BOUNCE_STRENGTH: f32 = 2.0;

    /// Seconds the win/lose screen stays up before the scene resets
    pub const RESET_DELAY_SECS: f64 = 3.0;

    /// Entity pool sizing
    pub const MAX_ENTITIES: usize = 1024;
    pub const ENTITY_ARENA_BYTES: usize = 1024;

    /// Paint order (lower draws first)
    pub const DEPTH_BLOCK: i32 = 0;
    pub const DEPTH_PADDLE: i32 = 10;
    pub const DEPTH_BALL: i32 = 20;
    pub const DEPTH_HUD: i32 = 100;
    pub const DEPTH_OVERLAY: i32 = 200;
}

/// Axis-aligned rectangle in screen space (top-left origin, y down)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle from a top-left position and a size
    #[inline]
    pub fn from_pos_size(pos: Vec2, size: Vec2) -> Self {
        Self::new(pos.x, pos.y, size.x, size.y)
    }

    #[inline]
    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width * 0.5, self.y + self.height * 0.5)
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }
}

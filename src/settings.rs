//! Game configuration
//!
//! Everything tunable about a session. Loaded from JSON when a file is
//! available, otherwise the compiled-in defaults apply.

use std::path::Path;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::Rect;
use crate::consts::*;

/// How a ball reacts to striking the left or right face of a block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SideBounce {
    /// Invert the horizontal velocity, same as top/bottom hits
    #[default]
    Reflect,
    /// Zero the horizontal velocity (legacy behavior)
    Stick,
}

impl SideBounce {
    pub fn as_str(&self) -> &'static str {
        match self {
            SideBounce::Reflect => "Reflect",
            SideBounce::Stick => "Stick",
        }
    }

    /// Apply the rule to one velocity component
    #[inline]
    pub fn apply(&self, v: f32) -> f32 {
        match self {
            SideBounce::Reflect => -v,
            SideBounce::Stick => 0.0,
        }
    }
}

/// Window vs logical screen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    pub name: String,
    pub window_width: u32,
    pub window_height: u32,
    /// Logical resolution the simulation runs at
    pub screen_width: f32,
    pub screen_height: f32,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            name: "Breakout".to_owned(),
            window_width: 1920,
            window_height: 1080,
            screen_width: SCREEN_WIDTH,
            screen_height: SCREEN_HEIGHT,
        }
    }
}

impl DisplaySettings {
    /// Uniform scale that fits the logical screen inside the window
    pub fn resolution_scale(&self, window_width: f32, window_height: f32) -> f32 {
        let w = window_width / self.screen_width;
        let h = window_height / self.screen_height;
        w.min(h)
    }

    /// Centered destination rectangle for the scaled logical screen
    pub fn letterbox(&self, window_width: f32, window_height: f32) -> Rect {
        let scale = self.resolution_scale(window_width, window_height);
        let width = self.screen_width * scale;
        let height = self.screen_height * scale;
        Rect::new(
            (window_width - width) * 0.5,
            (window_height - height) * 0.5,
            width,
            height,
        )
    }

    pub fn screen_size(&self) -> Vec2 {
        Vec2::new(self.screen_width, self.screen_height)
    }
}

/// Row-major occupancy grid, 0 = empty
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileLayout {
    /// Top-left corner of tile (0, 0)
    pub origin: Vec2,
    pub tile_size: Vec2,
    pub width: u32,
    pub height: u32,
    pub tiles: Vec<u8>,
}

impl Default for TileLayout {
    fn default() -> Self {
        let (width, height) = (10, 5);
        Self {
            origin: Vec2::new(160.0, 80.0),
            tile_size: Vec2::new(160.0, 60.0),
            width,
            height,
            tiles: vec![1; Self::tile_count(width, height)],
        }
    }
}

impl TileLayout {
    /// Cells in a `width` x `height` grid
    pub fn tile_count(width: u32, height: u32) -> usize {
        let Some(count) = (width as usize).checked_mul(height as usize) else {
            panic!("tile grid {}x{} is too large", width, height);
        };
        count
    }

    /// Deterministic pseudo-random layout; each tile is occupied with
    /// probability `density`
    pub fn scattered(width: u32, height: u32, density: f64, seed: u64) -> Self {
        assert!(
            (0.0..=1.0).contains(&density),
            "tile density {} outside 0..=1",
            density
        );
        let mut rng = Pcg32::seed_from_u64(seed);
        let tiles = (0..Self::tile_count(width, height))
            .map(|_| u8::from(rng.random_bool(density)))
            .collect();

        Self {
            width,
            height,
            tiles,
            ..Self::default()
        }
    }

    pub fn occupied_count(&self) -> usize {
        self.tiles.iter().filter(|&&tile| tile != 0).count()
    }
}

/// Complete session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub display: DisplaySettings,

    // === Paddle ===
    pub paddle_size: Vec2,
    /// Horizontal speed in pixels/second
    pub paddle_speed: f32,
    pub paddle_sprint_multiplier: f32,
    /// Gap between paddle bottom and the lower world edge
    pub paddle_bottom_margin: f32,

    // === Ball ===
    pub ball_radius: f32,
    pub ball_initial_velocity: Vec2,

    // === Blocks ===
    pub layout: TileLayout,
    pub side_bounce: SideBounce,

    // === Flow ===
    /// Seconds the win/lose screen stays before the scene resets
    pub reset_delay_secs: f64,
    /// Frame times above this are clamped
    pub max_frame_dt: f32,

    // === Memory ===
    pub entity_capacity: usize,
    pub entity_arena_bytes: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            display: DisplaySettings::default(),

            paddle_size: Vec2::new(PADDLE_WIDTH, PADDLE_HEIGHT),
            paddle_speed: PADDLE_SPEED,
            paddle_sprint_multiplier: PADDLE_SPRINT_MULTIPLIER,
            paddle_bottom_margin: PADDLE_BOTTOM_MARGIN,

            ball_radius: BALL_RADIUS,
            ball_initial_velocity: Vec2::from_array(BALL_INITIAL_VELOCITY),

            layout: TileLayout::default(),
            side_bounce: SideBounce::Reflect,

            reset_delay_secs: RESET_DELAY_SECS,
            max_frame_dt: 0.1,

            entity_capacity: MAX_ENTITIES,
            entity_arena_bytes: ENTITY_ARENA_BYTES,
        }
    }
}

impl GameConfig {
    /// Parse a config; out-of-range frame clamps fall back to the default
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut config: Self = serde_json::from_str(json)?;
        if !(config.max_frame_dt.is_finite() && config.max_frame_dt > 0.0) {
            let fallback = Self::default().max_frame_dt;
            log::warn!(
                "max_frame_dt {} must be positive, using {}",
                config.max_frame_dt,
                fallback
            );
            config.max_frame_dt = fallback;
        }
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load from a JSON file, falling back to defaults if it is missing or
    /// malformed
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(config) => {
                    log::info!("Loaded config from {}", path.display());
                    config
                }
                Err(err) => {
                    log::warn!("Invalid config {}: {}, using defaults", path.display(), err);
                    Self::default()
                }
            },
            Err(err) => {
                log::warn!("Cannot read config {}: {}, using defaults", path.display(), err);
                Self::default()
            }
        }
    }

    /// Playfield bounds
    pub fn world_size(&self) -> Vec2 {
        self.display.screen_size()
    }

    /// Top-left corner of the paddle at the start of a scene
    pub fn paddle_start(&self) -> Vec2 {
        let world = self.world_size();
        Vec2::new(
            (world.x - self.paddle_size.x) * 0.5,
            world.y - self.paddle_bottom_margin - self.paddle_size.y,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_scale_fits_smaller_axis() {
        let display = DisplaySettings::default();
        assert_eq!(display.resolution_scale(1920.0, 1080.0), 1.0);
        assert_eq!(display.resolution_scale(960.0, 1080.0), 0.5);

        let letterbox = display.letterbox(960.0, 1080.0);
        assert_eq!(letterbox, Rect::new(0.0, 270.0, 960.0, 540.0));
    }

    #[test]
    fn test_side_bounce_rules() {
        assert_eq!(SideBounce::Reflect.apply(120.0), -120.0);
        assert_eq!(SideBounce::Stick.apply(120.0), 0.0);
        assert_eq!(SideBounce::Stick.as_str(), "Stick");
    }

    #[test]
    fn test_scattered_layout_is_deterministic() {
        let a = TileLayout::scattered(12, 6, 0.5, 42);
        let b = TileLayout::scattered(12, 6, 0.5, 42);
        assert_eq!(a, b);
        assert_eq!(a.tiles.len(), 72);
        assert!(a.tiles.iter().all(|&tile| tile <= 1));

        assert_eq!(TileLayout::scattered(4, 4, 1.0, 7).occupied_count(), 16);
        assert_eq!(TileLayout::scattered(4, 4, 0.0, 7).occupied_count(), 0);
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn test_tile_count_does_not_wrap() {
        assert_eq!(TileLayout::tile_count(10, 5), 50);
        assert_eq!(TileLayout::tile_count(u32::MAX, 2), u32::MAX as usize * 2);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = GameConfig::from_json(r#"{ "paddle_speed": 500.0, "side_bounce": "Stick" }"#)
            .expect("valid config");
        assert_eq!(config.paddle_speed, 500.0);
        assert_eq!(config.side_bounce, SideBounce::Stick);
        assert_eq!(config.ball_radius, BALL_RADIUS);
        assert_eq!(config.layout.occupied_count(), 50);
    }

    #[test]
    fn test_non_positive_frame_clamp_falls_back() {
        let config = GameConfig::from_json(r#"{ "max_frame_dt": -1.0 }"#).expect("valid config");
        assert_eq!(config.max_frame_dt, GameConfig::default().max_frame_dt);

        let config = GameConfig::from_json(r#"{ "max_frame_dt": 0.0 }"#).expect("valid config");
        assert_eq!(config.max_frame_dt, GameConfig::default().max_frame_dt);
    }

    #[test]
    fn test_json_round_trip() {
        let config = GameConfig::default();
        let json = config.to_json().expect("serializable");
        let back = GameConfig::from_json(&json).expect("parsable");
        assert_eq!(back.layout, config.layout);
        assert_eq!(back.paddle_size, config.paddle_size);
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = GameConfig::load("/nonexistent/breakout.json");
        assert_eq!(config.entity_capacity, MAX_ENTITIES);
    }

    #[test]
    fn test_paddle_starts_centered_above_bottom() {
        let config = GameConfig::default();
        let start = config.paddle_start();
        assert_eq!(start.x + config.paddle_size.x * 0.5, SCREEN_WIDTH * 0.5);
        assert_eq!(start.y, SCREEN_HEIGHT - PADDLE_BOTTOM_MARGIN - PADDLE_HEIGHT);
    }
}

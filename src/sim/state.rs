//! Game state and the scene it drives
//!
//! All mutable game state lives in [`Game`], passed explicitly to the
//! update and draw entry points.

use glam::Vec2;

use super::collision::{CollisionManager, CollisionRules};
use super::components::{BallComponent, PlayerComponent};
use super::entity::{EntityId, EntityStore};
use super::map::Map;
use crate::consts::PADDLE_BOUNCE_STRENGTH;
use crate::renderer::{DrawBuffer, RecordedDraws, ResHandle, ResourceRegistry, Renderer};
use crate::settings::GameConfig;
use crate::ui::View;

/// Current phase of the game flow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameplayState {
    /// Title menu (initial)
    RunMenu,
    /// Active play
    RunGame,
    /// Ball lost; freezes the frame on the next tick
    PreGameOver,
    /// Lose screen over the frozen frame
    GameOver,
    /// Field cleared; freezes the frame on the next tick
    PreGameWin,
    /// Win screen over the frozen frame
    GameWin,
    /// Terminal
    Quit,
}

impl GameplayState {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameplayState::RunMenu => "RunMenu",
            GameplayState::RunGame => "RunGame",
            GameplayState::PreGameOver => "PreGameOver",
            GameplayState::GameOver => "GameOver",
            GameplayState::PreGameWin => "PreGameWin",
            GameplayState::GameWin => "GameWin",
            GameplayState::Quit => "Quit",
        }
    }

    /// Showing a result over a frozen frame
    pub fn is_result_screen(&self) -> bool {
        matches!(self, GameplayState::GameOver | GameplayState::GameWin)
    }
}

/// Title menu entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MenuItem {
    #[default]
    Play,
    Quit,
}

impl MenuItem {
    pub const ALL: [MenuItem; 2] = [MenuItem::Play, MenuItem::Quit];

    pub fn label(&self) -> &'static str {
        match self {
            MenuItem::Play => "Play",
            MenuItem::Quit => "Quit",
        }
    }

    /// Entry below, wrapping around
    pub fn next(self) -> Self {
        match self {
            MenuItem::Play => MenuItem::Quit,
            MenuItem::Quit => MenuItem::Play,
        }
    }

    /// Entry above, wrapping around
    pub fn prev(self) -> Self {
        // Two entries: up and down coincide
        self.next()
    }
}

/// Handles to the media the game draws with
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GameResources {
    pub paddle: ResHandle,
    pub ball: ResHandle,
    pub block: ResHandle,
    pub font: ResHandle,
}

impl GameResources {
    pub const PADDLE: &'static str = "paddle";
    pub const BALL: &'static str = "ball";
    pub const BLOCK: &'static str = "block";
    pub const FONT: &'static str = "font";

    /// Look up the well-known names; missing ones stay invalid
    pub fn from_registry(registry: &ResourceRegistry) -> Self {
        let resources = Self {
            paddle: registry.handle(Self::PADDLE),
            ball: registry.handle(Self::BALL),
            block: registry.handle(Self::BLOCK),
            font: registry.handle(Self::FONT),
        };
        for (name, handle) in [
            (Self::PADDLE, resources.paddle),
            (Self::BALL, resources.ball),
            (Self::BLOCK, resources.block),
            (Self::FONT, resources.font),
        ] {
            if !handle.is_valid() {
                log::warn!("Resource '{}' not registered", name);
            }
        }
        resources
    }
}

/// Everything that exists during one play session
#[derive(Debug)]
pub struct Scene {
    pub store: EntityStore,
    pub collisions: CollisionManager,
    pub map: Map,
    /// Confirmed ball-vs-block hits
    pub score: u32,
    pub player: EntityId,
    pub ball: EntityId,
}

impl Scene {
    pub fn new(config: &GameConfig, resources: &GameResources) -> Self {
        let mut scene = Self {
            store: EntityStore::new(config.entity_capacity, config.entity_arena_bytes),
            collisions: CollisionManager::new(CollisionRules {
                side_bounce: config.side_bounce,
                paddle_bounce_strength: PADDLE_BOUNCE_STRENGTH,
            }),
            map: Map::from_layout(&config.layout),
            score: 0,
            player: EntityId::NULL,
            ball: EntityId::NULL,
        };
        scene.populate(config, resources);
        scene
    }

    /// Tear everything down and build a fresh session in place
    pub fn reset(&mut self, config: &GameConfig, resources: &GameResources) {
        self.store.reset();
        self.collisions.clear();
        self.map = Map::from_layout(&config.layout);
        self.score = 0;
        self.populate(config, resources);
    }

    /// Paddle, then ball, then blocks; creation order is tick order
    fn populate(&mut self, config: &GameConfig, resources: &GameResources) {
        let player = PlayerComponent::new(
            config.paddle_start(),
            config.paddle_size,
            config.paddle_speed,
            config.paddle_sprint_multiplier,
            resources.paddle,
        );
        let entity = self.store.create();
        self.player = entity.id();
        entity.add_component(player);
        self.collisions.set_paddle(self.player);

        let mut ball = BallComponent::new(
            Vec2::ZERO,
            config.ball_radius,
            config.ball_initial_velocity,
            resources.ball,
        );
        ball.rest_on(&player);
        let entity = self.store.create();
        self.ball = entity.id();
        entity.add_component(ball);
        self.collisions.add_dynamic(self.ball);

        self.map
            .spawn_blocks(&mut self.store, &mut self.collisions, resources.block);
        log::info!(
            "Scene ready: {} entities, {} blocks",
            self.store.len(),
            self.map.block_count()
        );
    }

    pub fn player(&self) -> Option<&PlayerComponent> {
        self.store.get(self.player)?.component::<PlayerComponent>()
    }

    pub fn ball(&self) -> Option<&BallComponent> {
        self.store.get(self.ball)?.component::<BallComponent>()
    }

    pub fn blocks_remaining(&self) -> usize {
        self.collisions.static_count()
    }

    /// Every spawned block has been hit
    pub fn is_cleared(&self) -> bool {
        self.score as usize >= self.map.block_count()
    }

    /// Ball center has dropped past the lower world edge
    pub fn ball_lost(&self, world_bottom: f32) -> bool {
        self.ball()
            .is_some_and(|ball| ball.position.y > world_bottom)
    }
}

/// The whole game: configuration, flow state, scene and frame output
pub struct Game {
    pub(super) config: GameConfig,
    pub(super) resources: GameResources,
    pub(super) phase: GameplayState,
    pub(super) menu_selection: MenuItem,
    pub(super) scene: Scene,
    pub(super) draw: DrawBuffer,
    /// Frame captured when a result screen was entered
    pub(super) frozen: RecordedDraws,
    /// Timestamp (seconds) the current result screen started
    pub(super) result_started_at: f64,
    pub(super) ui_root: View,
    pub(super) frame: u64,
}

impl Game {
    pub fn new(config: GameConfig, resources: GameResources) -> Self {
        let scene = Scene::new(&config, &resources);
        let ui_root = View::push(
            0.0,
            0.0,
            config.display.screen_width,
            config.display.screen_height,
        );
        log::info!(
            "Game initialized ({}, side bounce {})",
            config.display.name,
            config.side_bounce.as_str()
        );

        Self {
            config,
            resources,
            phase: GameplayState::RunMenu,
            menu_selection: MenuItem::Play,
            scene,
            draw: DrawBuffer::new(),
            frozen: RecordedDraws::default(),
            result_started_at: 0.0,
            ui_root,
            frame: 0,
        }
    }

    pub fn phase(&self) -> GameplayState {
        self.phase
    }

    pub fn menu_selection(&self) -> MenuItem {
        self.menu_selection
    }

    pub fn score(&self) -> u32 {
        self.scene.score
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn should_quit(&self) -> bool {
        self.phase == GameplayState::Quit
    }

    /// Frame captured for the current (or last) result screen
    pub fn frozen_frame(&self) -> &RecordedDraws {
        &self.frozen
    }

    /// This frame's pending draw requests
    pub fn draw_buffer(&self) -> &DrawBuffer {
        &self.draw
    }

    /// Frames processed so far
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Hand this frame's requests to the renderer
    pub fn draw(&mut self, renderer: &mut impl Renderer) {
        self.draw.dispatch(renderer);
    }

    pub(super) fn set_phase(&mut self, phase: GameplayState) {
        if self.phase != phase {
            log::info!("{} -> {}", self.phase.as_str(), phase.as_str());
            self.phase = phase;
        }
    }

    pub(super) fn reset_scene(&mut self) {
        self.scene.reset(&self.config, &self.resources);
        self.frozen.clear();
    }
}

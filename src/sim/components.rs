//! Gameplay components
//!
//! The set of components is closed: a paddle, a ball and a block. Each is a
//! plain-old-data payload living in its entity's arena, so it can be placed
//! and discarded without running destructors. Behavior is dispatched with a
//! `match` on [`ComponentKind`] rather than through trait objects.

use bytemuck::{Pod, Zeroable};
use glam::Vec2;

use super::collision::{Circle, CollisionPeer, CollisionRules, Face, Manifold};
use super::entity::EntityId;
use crate::Rect;
use crate::consts::*;
use crate::platform::{Action, TickInput};
use crate::renderer::{DrawBuffer, ResHandle, TextureDraw, colors};

/// Small integer type id for each component variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ComponentKind {
    Player,
    Ball,
    Block,
}

impl ComponentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentKind::Player => "Player",
            ComponentKind::Ball => "Ball",
            ComponentKind::Block => "Block",
        }
    }
}

/// Payload stored in an entity arena
pub trait Component: Pod {
    const KIND: ComponentKind;

    fn owner(&self) -> EntityId;
    fn set_owner(&mut self, owner: EntityId);

    /// Runs once, right after the component is attached
    fn on_init(&mut self) {}

    /// Runs when the owning entity is destroyed
    fn on_destroy(&mut self) {}
}

/// Per-frame state shared by every component tick
pub struct TickContext<'a> {
    pub dt: f32,
    pub input: &'a TickInput,
    /// Playfield size; the world spans `0..world.x`, `0..world.y`
    pub world: Vec2,
    pub draw: &'a mut DrawBuffer,
    /// Paddle as of this frame, published by the player's tick
    pub paddle: Option<PlayerComponent>,
}

fn quad(position: Vec2, size: Vec2, texture: ResHandle, depth: i32) -> TextureDraw {
    TextureDraw {
        position,
        size,
        texture,
        source: None,
        tint: colors::WHITE,
        depth,
    }
}

// ============================================================================
// PLAYER
// ============================================================================

/// The paddle
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct PlayerComponent {
    pub owner: EntityId,
    /// Top-left corner
    pub position: Vec2,
    pub size: Vec2,
    /// Pixels per second
    pub speed: f32,
    pub sprint_multiplier: f32,
    pub texture: ResHandle,
}

impl PlayerComponent {
    pub fn new(
        position: Vec2,
        size: Vec2,
        speed: f32,
        sprint_multiplier: f32,
        texture: ResHandle,
    ) -> Self {
        Self {
            owner: EntityId::NULL,
            position,
            size,
            speed,
            sprint_multiplier,
            texture,
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect::from_pos_size(self.position, self.size)
    }

    pub fn center(&self) -> Vec2 {
        self.position + self.size * 0.5
    }

    pub fn tick(&mut self, ctx: &mut TickContext) {
        let mut speed = self.speed;
        if ctx.input.is_down(Action::Sprint) {
            speed *= self.sprint_multiplier;
        }

        self.position.x += ctx.input.horizontal_axis() * speed * ctx.dt;
        self.position.x = self.position.x.clamp(0.0, (ctx.world.x - self.size.x).max(0.0));

        ctx.paddle = Some(*self);
        ctx.draw
            .add(quad(self.position, self.size, self.texture, DEPTH_PADDLE));
    }
}

impl Component for PlayerComponent {
    const KIND: ComponentKind = ComponentKind::Player;

    fn owner(&self) -> EntityId {
        self.owner
    }

    fn set_owner(&mut self, owner: EntityId) {
        self.owner = owner;
    }
}

// ============================================================================
// BALL
// ============================================================================

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct BallComponent {
    pub owner: EntityId,
    /// Center
    pub position: Vec2,
    pub velocity: Vec2,
    /// Velocity applied on launch
    pub launch_velocity: Vec2,
    pub radius: f32,
    pub texture: ResHandle,
    /// Nonzero once launched off the paddle
    launched: u32,
}

impl BallComponent {
    pub fn new(position: Vec2, radius: f32, launch_velocity: Vec2, texture: ResHandle) -> Self {
        Self {
            owner: EntityId::NULL,
            position,
            velocity: Vec2::ZERO,
            launch_velocity,
            radius,
            texture,
            launched: 0,
        }
    }

    #[inline]
    pub fn is_launched(&self) -> bool {
        self.launched != 0
    }

    pub fn launch(&mut self) {
        self.launched = 1;
        self.velocity = self.launch_velocity;
    }

    pub fn circle(&self) -> Circle {
        Circle {
            center: self.position,
            radius: self.radius,
        }
    }

    /// Sit on top of the paddle, horizontally centered
    pub fn rest_on(&mut self, paddle: &PlayerComponent) {
        self.position = Vec2::new(paddle.center().x, paddle.position.y - self.radius);
    }

    pub fn tick(&mut self, ctx: &mut TickContext) {
        if !self.is_launched() {
            if let Some(paddle) = ctx.paddle.as_ref() {
                self.rest_on(paddle);
            }
            if ctx.input.just_pressed(Action::Launch) {
                self.launch();
            }
        }
        // Includes the launch frame
        if self.is_launched() {
            self.position += self.velocity * ctx.dt;
            self.bounce_off_walls(ctx.world);
        }

        let diameter = Vec2::splat(self.radius * 2.0);
        ctx.draw.add(quad(
            self.position - Vec2::splat(self.radius),
            diameter,
            self.texture,
            DEPTH_BALL,
        ));
    }

    /// Left, right and top edges reflect; the bottom is open
    fn bounce_off_walls(&mut self, world: Vec2) {
        let r = self.radius;
        if self.position.x - r <= 0.0 {
            self.position.x = r;
            self.velocity.x = self.velocity.x.abs();
        } else if self.position.x + r >= world.x {
            self.position.x = world.x - r;
            self.velocity.x = -self.velocity.x.abs();
        }
        if self.position.y - r <= 0.0 {
            self.position.y = r;
            self.velocity.y = self.velocity.y.abs();
        }
    }

    /// Deflect upward; the further from the paddle center the ball lands,
    /// the sharper the horizontal angle. Speed is preserved.
    pub fn bounce_off_paddle(&mut self, paddle: &PlayerComponent, strength: f32) {
        let speed = self.velocity.length();
        let half_width = paddle.size.x * 0.5;
        let offset = self.position.x - paddle.center().x;
        let percentage = if half_width > 0.0 { offset / half_width } else { 0.0 };

        let outgoing = Vec2::new(
            self.launch_velocity.x.abs() * percentage * strength,
            -self.velocity.y.abs(),
        );
        self.velocity = outgoing.normalize_or(Vec2::NEG_Y) * speed;
        self.position.y = paddle.position.y - self.radius;
    }

    /// Push out of a block along the struck face and turn around
    pub fn bounce_off_block(&mut self, manifold: &Manifold, rules: &CollisionRules) {
        let face = Face::of(manifold.separation, self.velocity);
        self.position += face.direction() * manifold.penetration;

        if face.is_vertical() {
            self.velocity.y = -self.velocity.y;
        } else {
            self.velocity.x = rules.side_bounce.apply(self.velocity.x);
        }
    }

    pub fn on_collision(&mut self, manifold: &Manifold, peer: &CollisionPeer, rules: &CollisionRules) {
        match peer {
            CollisionPeer::Paddle(paddle) => {
                self.bounce_off_paddle(paddle, rules.paddle_bounce_strength)
            }
            CollisionPeer::Block(_) => self.bounce_off_block(manifold, rules),
            CollisionPeer::Ball(_) => {}
        }
    }
}

impl Component for BallComponent {
    const KIND: ComponentKind = ComponentKind::Ball;

    fn owner(&self) -> EntityId {
        self.owner
    }

    fn set_owner(&mut self, owner: EntityId) {
        self.owner = owner;
    }
}

// ============================================================================
// BLOCK
// ============================================================================

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct BlockComponent {
    pub owner: EntityId,
    /// Top-left corner
    pub position: Vec2,
    pub size: Vec2,
    pub texture: ResHandle,
    /// Ball contacts received
    pub hits: u32,
}

impl BlockComponent {
    pub fn new(bounds: Rect, texture: ResHandle) -> Self {
        Self {
            owner: EntityId::NULL,
            position: bounds.position(),
            size: bounds.size(),
            texture,
            hits: 0,
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect::from_pos_size(self.position, self.size)
    }

    pub fn tick(&mut self, ctx: &mut TickContext) {
        ctx.draw
            .add(quad(self.position, self.size, self.texture, DEPTH_BLOCK));
    }

    pub fn on_collision(&mut self, _manifold: &Manifold, peer: &CollisionPeer) {
        if let CollisionPeer::Ball(_) = peer {
            self.hits += 1;
        }
    }
}

impl Component for BlockComponent {
    const KIND: ComponentKind = ComponentKind::Block;

    fn owner(&self) -> EntityId {
        self.owner
    }

    fn set_owner(&mut self, owner: EntityId) {
        self.owner = owner;
    }

    fn on_destroy(&mut self) {
        log::debug!("Block {} destroyed after {} hit(s)", self.owner, self.hits);
    }
}

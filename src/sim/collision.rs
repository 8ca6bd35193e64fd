//! Collision detection and response
//!
//! Bodies are few, so there is no broad phase: every ball is tested against
//! the paddle and against every block each frame. Block hits are gathered
//! in a read-only scan and applied afterwards, so the block list is never
//! mutated while it is being iterated.

use glam::Vec2;

use super::components::{BallComponent, BlockComponent, PlayerComponent};
use super::entity::{EntityId, EntityStore};
use crate::Rect;
use crate::settings::SideBounce;

/// Result of a shape test
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Manifold {
    /// From the closest point on the box to the circle center
    pub separation: Vec2,
    /// Circle radius minus the separation length
    pub penetration: f32,
    pub collides: bool,
}

/// Box stored as center and half extents
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub center: Vec2,
    pub half_extents: Vec2,
}

impl Aabb {
    pub fn from_rect(rect: Rect) -> Self {
        let half_extents = rect.size() * 0.5;
        Self {
            center: rect.position() + half_extents,
            half_extents,
        }
    }

    pub fn to_rect(&self) -> Rect {
        Rect::from_pos_size(self.center - self.half_extents, self.half_extents * 2.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub center: Vec2,
    pub radius: f32,
}

/// Closest-point test between a box and a circle.
///
/// Touching (penetration exactly zero) counts as a collision.
pub fn aabb_vs_circle(aabb: Aabb, circle: Circle) -> Manifold {
    let diff = circle.center - aabb.center;
    let clamped = diff.clamp(-aabb.half_extents, aabb.half_extents);
    let closest = aabb.center + clamped;
    let separation = circle.center - closest;
    let distance = separation.length();

    Manifold {
        separation,
        penetration: circle.radius - distance,
        collides: distance <= circle.radius,
    }
}

/// Side of a box that was struck, named by the direction it faces
/// (screen space, y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Face {
    Up,
    Right,
    Down,
    Left,
}

impl Face {
    const ALL: [Face; 4] = [Face::Up, Face::Right, Face::Down, Face::Left];

    pub fn direction(self) -> Vec2 {
        match self {
            Face::Up => Vec2::NEG_Y,
            Face::Right => Vec2::X,
            Face::Down => Vec2::Y,
            Face::Left => Vec2::NEG_X,
        }
    }

    #[inline]
    pub fn is_vertical(self) -> bool {
        matches!(self, Face::Up | Face::Down)
    }

    /// Face whose direction best matches `separation`. A circle centered
    /// inside the box has no separation; then the face it entered through
    /// is the one opposing its velocity.
    pub fn of(separation: Vec2, velocity: Vec2) -> Face {
        let dir = if separation != Vec2::ZERO {
            separation.normalize_or_zero()
        } else {
            (-velocity).normalize_or_zero()
        };

        let mut best = Face::Up;
        let mut best_dot = f32::MIN;
        for face in Face::ALL {
            let dot = dir.dot(face.direction());
            if dot > best_dot {
                best_dot = dot;
                best = face;
            }
        }
        best
    }
}

/// Tunables for collision response
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionRules {
    pub side_bounce: SideBounce,
    pub paddle_bounce_strength: f32,
}

/// What a component collided with, as of the moment of the test
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CollisionPeer {
    Paddle(PlayerComponent),
    Ball(BallComponent),
    Block(BlockComponent),
}

#[derive(Debug, Clone, Copy)]
struct DynamicBody {
    owner: EntityId,
}

#[derive(Debug, Clone, Copy)]
struct StaticBody {
    owner: EntityId,
    bounds: Aabb,
}

/// A ball overlapping a block, found during the scan
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockHit {
    pub ball: EntityId,
    pub block: EntityId,
    pub manifold: Manifold,
}

/// What one collision pass did
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollisionReport {
    pub paddle_hits: u32,
    /// Blocks destroyed this pass, in the order they were applied
    pub destroyed: Vec<EntityId>,
}

#[derive(Debug)]
pub struct CollisionManager {
    rules: CollisionRules,
    paddle: Option<EntityId>,
    dynamics: Vec<DynamicBody>,
    statics: Vec<StaticBody>,
}

impl CollisionManager {
    pub fn new(rules: CollisionRules) -> Self {
        Self {
            rules,
            paddle: None,
            dynamics: Vec::new(),
            statics: Vec::new(),
        }
    }

    pub fn rules(&self) -> &CollisionRules {
        &self.rules
    }

    pub fn set_paddle(&mut self, paddle: EntityId) {
        self.paddle = Some(paddle);
    }

    pub fn paddle(&self) -> Option<EntityId> {
        self.paddle
    }

    /// Track a ball
    pub fn add_dynamic(&mut self, owner: EntityId) {
        self.dynamics.push(DynamicBody { owner });
    }

    /// Track a block occupying `bounds`
    pub fn add_static(&mut self, owner: EntityId, bounds: Rect) {
        self.statics.push(StaticBody {
            owner,
            bounds: Aabb::from_rect(bounds),
        });
    }

    pub fn remove_dynamic(&mut self, owner: EntityId) -> bool {
        match self.dynamics.iter().position(|body| body.owner == owner) {
            Some(index) => {
                self.dynamics.swap_remove(index);
                true
            }
            None => false,
        }
    }

    pub fn remove_static(&mut self, owner: EntityId) -> bool {
        match self.statics.iter().position(|body| body.owner == owner) {
            Some(index) => {
                self.statics.swap_remove(index);
                true
            }
            None => false,
        }
    }

    pub fn dynamic_count(&self) -> usize {
        self.dynamics.len()
    }

    pub fn static_count(&self) -> usize {
        self.statics.len()
    }

    pub fn clear(&mut self) {
        self.paddle = None;
        self.dynamics.clear();
        self.statics.clear();
    }

    /// Run both passes for one frame. `score` grows by one per block hit.
    pub fn run(&mut self, store: &mut EntityStore, score: &mut u32) -> CollisionReport {
        let mut report = CollisionReport::default();
        self.paddle_pass(store, &mut report);

        let hits = self.scan_blocks(store);
        self.apply_block_hits(store, &hits, score, &mut report);
        report
    }

    /// Ball vs paddle
    fn paddle_pass(&self, store: &mut EntityStore, report: &mut CollisionReport) {
        let Some(paddle) = self
            .paddle
            .and_then(|id| store.get(id))
            .and_then(|entity| entity.component::<PlayerComponent>())
            .copied()
        else {
            return;
        };
        let bounds = Aabb::from_rect(paddle.bounds());
        let peer = CollisionPeer::Paddle(paddle);

        for body in &self.dynamics {
            let Some(entity) = store.get_mut(body.owner) else {
                continue;
            };
            let Some(ball) = entity.component::<BallComponent>() else {
                continue;
            };
            if !ball.is_launched() {
                continue;
            }

            let manifold = aabb_vs_circle(bounds, ball.circle());
            if manifold.collides {
                log::trace!("Ball {} hit paddle ({:.2} deep)", body.owner, manifold.penetration);
                entity.on_collision(&manifold, &peer, &self.rules);
                report.paddle_hits += 1;
            }
        }
    }

    /// Read-only scan of every ball against every block
    fn scan_blocks(&self, store: &EntityStore) -> Vec<BlockHit> {
        let mut hits = Vec::new();
        for body in &self.dynamics {
            let Some(ball) = store
                .get(body.owner)
                .and_then(|entity| entity.component::<BallComponent>())
            else {
                continue;
            };
            if !ball.is_launched() {
                continue;
            }

            let circle = ball.circle();
            for block in &self.statics {
                let manifold = aabb_vs_circle(block.bounds, circle);
                if manifold.collides {
                    hits.push(BlockHit {
                        ball: body.owner,
                        block: block.owner,
                        manifold,
                    });
                }
            }
        }
        hits
    }

    /// Each ball bounces off the first block it was found touching; every
    /// touched block is destroyed once.
    fn apply_block_hits(
        &mut self,
        store: &mut EntityStore,
        hits: &[BlockHit],
        score: &mut u32,
        report: &mut CollisionReport,
    ) {
        let mut bounced: Vec<EntityId> = Vec::new();

        for hit in hits {
            if report.destroyed.contains(&hit.block) {
                continue;
            }
            let ball = store
                .get(hit.ball)
                .and_then(|entity| entity.component::<BallComponent>())
                .copied();
            let block = store
                .get(hit.block)
                .and_then(|entity| entity.component::<BlockComponent>())
                .copied();
            let (Some(ball), Some(block)) = (ball, block) else {
                continue;
            };

            log::trace!(
                "Ball {} hit block {} ({:.2} deep)",
                hit.ball,
                hit.block,
                hit.manifold.penetration
            );

            if !bounced.contains(&hit.ball) {
                if let Some(entity) = store.get_mut(hit.ball) {
                    entity.on_collision(&hit.manifold, &CollisionPeer::Block(block), &self.rules);
                }
                bounced.push(hit.ball);
            }
            if let Some(entity) = store.get_mut(hit.block) {
                entity.on_collision(&hit.manifold, &CollisionPeer::Ball(ball), &self.rules);
            }

            self.remove_static(hit.block);
            store.destroy(hit.block);
            *score += 1;
            report.destroyed.push(hit.block);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::PADDLE_BOUNCE_STRENGTH;
    use crate::renderer::ResHandle;

    fn rules() -> CollisionRules {
        CollisionRules {
            side_bounce: SideBounce::Reflect,
            paddle_bounce_strength: PADDLE_BOUNCE_STRENGTH,
        }
    }

    fn unit_box() -> Aabb {
        Aabb {
            center: Vec2::ZERO,
            half_extents: Vec2::splat(10.0),
        }
    }

    #[test]
    fn test_overlapping_circle_collides() {
        let manifold = aabb_vs_circle(
            unit_box(),
            Circle {
                center: Vec2::new(12.0, 0.0),
                radius: 5.0,
            },
        );
        assert!(manifold.collides);
        assert!((manifold.penetration - 3.0).abs() < 1e-6);
        assert!(manifold.separation.x > 0.0);
        assert_eq!(manifold.separation.y, 0.0);
    }

    #[test]
    fn test_distant_circle_misses() {
        let manifold = aabb_vs_circle(
            unit_box(),
            Circle {
                center: Vec2::new(100.0, 0.0),
                radius: 5.0,
            },
        );
        assert!(!manifold.collides);
        assert!(manifold.penetration < 0.0);
    }

    #[test]
    fn test_touching_counts() {
        let manifold = aabb_vs_circle(
            unit_box(),
            Circle {
                center: Vec2::new(0.0, 15.0),
                radius: 5.0,
            },
        );
        assert!(manifold.collides);
        assert_eq!(manifold.penetration, 0.0);
    }

    #[test]
    fn test_aabb_rect_conversion() {
        let rect = Rect::new(10.0, 20.0, 40.0, 10.0);
        let aabb = Aabb::from_rect(rect);
        assert_eq!(aabb.center, Vec2::new(30.0, 25.0));
        assert_eq!(aabb.half_extents, Vec2::new(20.0, 5.0));
        assert_eq!(aabb.to_rect(), rect);
    }

    #[test]
    fn test_face_from_separation() {
        assert_eq!(Face::of(Vec2::new(0.0, -3.0), Vec2::ZERO), Face::Up);
        assert_eq!(Face::of(Vec2::new(0.0, 3.0), Vec2::ZERO), Face::Down);
        assert_eq!(Face::of(Vec2::new(5.0, 1.0), Vec2::ZERO), Face::Right);
        assert_eq!(Face::of(Vec2::new(-5.0, -1.0), Vec2::ZERO), Face::Left);
        // Center inside the box: face opposing the motion
        assert_eq!(Face::of(Vec2::ZERO, Vec2::new(0.0, 200.0)), Face::Up);
    }

    fn store_with_ball(position: Vec2, velocity: Vec2) -> (EntityStore, EntityId) {
        let mut store = EntityStore::new(16, 256);
        let entity = store.create();
        let id = entity.id();
        let ball = entity.add_component(BallComponent::new(position, 10.0, Vec2::new(300.0, -550.0), ResHandle::INVALID));
        ball.launch();
        ball.velocity = velocity;
        (store, id)
    }

    fn add_block(store: &mut EntityStore, collisions: &mut CollisionManager, bounds: Rect) -> EntityId {
        let entity = store.create();
        let id = entity.id();
        entity.add_component(BlockComponent::new(bounds, ResHandle::INVALID));
        collisions.add_static(id, bounds);
        id
    }

    #[test]
    fn test_block_hit_bounces_scores_and_destroys() {
        let (mut store, ball) = store_with_ball(Vec2::new(50.0, 68.0), Vec2::new(0.0, -300.0));
        let mut collisions = CollisionManager::new(rules());
        collisions.add_dynamic(ball);
        let block = add_block(&mut store, &mut collisions, Rect::new(0.0, 0.0, 100.0, 60.0));
        let far = add_block(&mut store, &mut collisions, Rect::new(500.0, 0.0, 100.0, 60.0));

        let mut score = 0;
        let report = collisions.run(&mut store, &mut score);

        assert_eq!(score, 1);
        assert_eq!(report.destroyed, vec![block]);
        assert!(store.get(block).is_none());
        assert!(store.get(far).is_some());
        assert_eq!(collisions.static_count(), 1);

        let ball = store.get(ball).and_then(|e| e.component::<BallComponent>()).copied();
        let ball = ball.expect("ball alive");
        assert_eq!(ball.velocity, Vec2::new(0.0, 300.0));
        assert_eq!(ball.position.y, 70.0);
    }

    #[test]
    fn test_seam_hit_destroys_both_blocks_but_bounces_once() {
        let (mut store, ball) = store_with_ball(Vec2::new(100.0, 68.0), Vec2::new(0.0, -300.0));
        let mut collisions = CollisionManager::new(rules());
        collisions.add_dynamic(ball);
        add_block(&mut store, &mut collisions, Rect::new(0.0, 0.0, 100.0, 60.0));
        add_block(&mut store, &mut collisions, Rect::new(100.0, 0.0, 100.0, 60.0));

        let mut score = 0;
        let report = collisions.run(&mut store, &mut score);

        assert_eq!(score, 2);
        assert_eq!(report.destroyed.len(), 2);
        assert_eq!(collisions.static_count(), 0);
        let ball = store.get(ball).and_then(|e| e.component::<BallComponent>()).copied();
        assert_eq!(ball.map(|b| b.velocity.y), Some(300.0));
    }

    #[test]
    fn test_paddle_pass_deflects_ball_without_scoring() {
        let (mut store, ball) = store_with_ball(Vec2::new(960.0, 995.0), Vec2::new(100.0, 300.0));
        let paddle = store.create();
        let paddle_id = paddle.id();
        paddle.add_component(PlayerComponent::new(
            Vec2::new(860.0, 1000.0),
            Vec2::new(200.0, 30.0),
            900.0,
            2.0,
            ResHandle::INVALID,
        ));

        let mut collisions = CollisionManager::new(rules());
        collisions.set_paddle(paddle_id);
        collisions.add_dynamic(ball);

        let mut score = 0;
        let report = collisions.run(&mut store, &mut score);
        assert_eq!(report.paddle_hits, 1);
        assert_eq!(score, 0);

        let ball = store.get(ball).and_then(|e| e.component::<BallComponent>()).copied();
        let ball = ball.expect("ball alive");
        assert!(ball.velocity.y < 0.0);
        assert!(ball.velocity.x.abs() < 1e-3);
    }

    #[test]
    fn test_resting_ball_is_ignored() {
        let mut store = EntityStore::new(4, 256);
        let entity = store.create();
        let id = entity.id();
        entity.add_component(BallComponent::new(Vec2::new(50.0, 50.0), 10.0, Vec2::ZERO, ResHandle::INVALID));

        let mut collisions = CollisionManager::new(rules());
        collisions.add_dynamic(id);
        add_block(&mut store, &mut collisions, Rect::new(0.0, 0.0, 100.0, 100.0));

        let mut score = 0;
        let report = collisions.run(&mut store, &mut score);
        assert_eq!(score, 0);
        assert!(report.destroyed.is_empty());
    }

    #[test]
    fn test_empty_manager_is_a_no_op() {
        let mut store = EntityStore::new(4, 64);
        let mut collisions = CollisionManager::new(rules());
        let mut score = 0;
        assert_eq!(collisions.run(&mut store, &mut score), CollisionReport::default());
    }

    #[test]
    fn test_swap_remove_bodies() {
        let mut collisions = CollisionManager::new(rules());
        let mut store = EntityStore::new(4, 64);
        let a = store.create().id();
        let b = store.create().id();
        collisions.add_dynamic(a);
        collisions.add_dynamic(b);
        assert!(collisions.remove_dynamic(a));
        assert!(!collisions.remove_dynamic(a));
        assert_eq!(collisions.dynamic_count(), 1);
    }
}

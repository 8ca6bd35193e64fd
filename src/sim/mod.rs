//! Simulation module
//!
//! Entities, components, collisions and the gameplay state machine. Nothing
//! here touches a window or a GPU:
//! - Frame time comes in from the caller and is clamped
//! - Entities tick in live-list order (creation order up to swap-removals)
//! - Draw output is queued, never executed

pub mod collision;
pub mod components;
pub mod entity;
pub mod map;
pub mod state;
pub mod tick;

pub use collision::{
    Aabb, Circle, CollisionManager, CollisionPeer, CollisionReport, CollisionRules, Face,
    Manifold, aabb_vs_circle,
};
pub use components::{
    BallComponent, BlockComponent, Component, ComponentKind, PlayerComponent, TickContext,
};
pub use entity::{Entity, EntityId, EntityStore};
pub use map::Map;
pub use state::{Game, GameResources, GameplayState, MenuItem, Scene};
pub use tick::tick;

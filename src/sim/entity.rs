//! Entities and the fixed-capacity entity store
//!
//! An entity is an id plus a private arena holding its components. The
//! store keeps entities in a contiguous slot array; destroyed entities stay
//! in their slot (arena buffer included) and are threaded onto an
//! index-based free list for the next `create`.

use std::fmt;

use bytemuck::{Pod, Zeroable};

use super::collision::{CollisionPeer, CollisionRules, Manifold};
use super::components::{
    BallComponent, BlockComponent, Component, ComponentKind, PlayerComponent, TickContext,
};
use crate::memory::{Arena, ArenaRef};

/// Generation-stamped entity handle.
///
/// `slot` locates the entity in the store; `generation` comes from the
/// store-wide counter, so no two ids handed out by a store are equal.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Pod, Zeroable)]
pub struct EntityId {
    slot: u32,
    generation: u32,
}

impl EntityId {
    /// Never issued by a store
    pub const NULL: EntityId = EntityId {
        slot: 0,
        generation: 0,
    };

    #[inline]
    pub fn slot(&self) -> u32 {
        self.slot
    }

    #[inline]
    pub fn generation(&self) -> u32 {
        self.generation
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        self.generation == 0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}@{}", self.generation, self.slot)
    }
}

#[derive(Debug, Clone, Copy)]
struct ComponentSlot {
    kind: ComponentKind,
    offset: usize,
}

/// Mutable view of one component, resolved from its kind tag
enum ComponentMut<'a> {
    Player(&'a mut PlayerComponent),
    Ball(&'a mut BallComponent),
    Block(&'a mut BlockComponent),
}

fn resolve(arena: &mut Arena, slot: ComponentSlot) -> ComponentMut<'_> {
    match slot.kind {
        ComponentKind::Player => ComponentMut::Player(arena.get_mut(ArenaRef::from_offset(slot.offset))),
        ComponentKind::Ball => ComponentMut::Ball(arena.get_mut(ArenaRef::from_offset(slot.offset))),
        ComponentKind::Block => ComponentMut::Block(arena.get_mut(ArenaRef::from_offset(slot.offset))),
    }
}

#[derive(Debug)]
pub struct Entity {
    id: EntityId,
    arena: Arena,
    components: Vec<ComponentSlot>,
}

impl Entity {
    fn new(id: EntityId, arena_bytes: usize) -> Self {
        Self {
            id,
            arena: Arena::new(arena_bytes),
            components: Vec::new(),
        }
    }

    /// Wipe components and take on a fresh id
    fn recycle(&mut self, id: EntityId) {
        self.id = id;
        self.arena.clear();
        self.components.clear();
    }

    #[inline]
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Bytes of the private arena in use
    pub fn arena_used(&self) -> usize {
        self.arena.used()
    }

    /// Place a component in this entity's arena, bind it to the entity and
    /// run its init hook
    pub fn add_component<T: Component>(&mut self, component: T) -> &mut T {
        let at = self.arena.push(component);
        self.components.push(ComponentSlot {
            kind: T::KIND,
            offset: at.offset(),
        });

        let component = self.arena.get_mut(at);
        component.set_owner(self.id);
        component.on_init();
        log::trace!("Entity {} gained {}", component.owner(), T::KIND.as_str());
        component
    }

    fn find<T: Component>(&self) -> Option<ArenaRef<T>> {
        self.components
            .iter()
            .find(|slot| slot.kind == T::KIND)
            .map(|slot| ArenaRef::from_offset(slot.offset))
    }

    /// First component of type `T`, if attached
    pub fn component<T: Component>(&self) -> Option<&T> {
        self.find::<T>().map(|at| self.arena.get(at))
    }

    pub fn component_mut<T: Component>(&mut self) -> Option<&mut T> {
        let at = self.find::<T>()?;
        Some(self.arena.get_mut(at))
    }

    pub fn has_component<T: Component>(&self) -> bool {
        self.find::<T>().is_some()
    }

    /// Attached kinds in add order
    pub fn component_kinds(&self) -> impl Iterator<Item = ComponentKind> + '_ {
        self.components.iter().map(|slot| slot.kind)
    }

    /// Tick every component in add order
    pub fn tick(&mut self, ctx: &mut TickContext) {
        for &slot in &self.components {
            match resolve(&mut self.arena, slot) {
                ComponentMut::Player(player) => player.tick(ctx),
                ComponentMut::Ball(ball) => ball.tick(ctx),
                ComponentMut::Block(block) => block.tick(ctx),
            }
        }
    }

    /// Forward a collision to every component that reacts to one
    pub fn on_collision(&mut self, manifold: &Manifold, peer: &CollisionPeer, rules: &CollisionRules) {
        for &slot in &self.components {
            match resolve(&mut self.arena, slot) {
                ComponentMut::Player(_) => {}
                ComponentMut::Ball(ball) => ball.on_collision(manifold, peer, rules),
                ComponentMut::Block(block) => block.on_collision(manifold, peer),
            }
        }
    }

    fn destroy_components(&mut self) {
        for &slot in &self.components {
            match resolve(&mut self.arena, slot) {
                ComponentMut::Player(player) => player.on_destroy(),
                ComponentMut::Ball(ball) => ball.on_destroy(),
                ComponentMut::Block(block) => block.on_destroy(),
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SlotState {
    Live,
    Free { next: Option<u32> },
}

#[derive(Debug)]
struct Slot {
    entity: Entity,
    state: SlotState,
}

/// Fixed-capacity pool of entities with free-list recycling
#[derive(Debug)]
pub struct EntityStore {
    slots: Vec<Slot>,
    capacity: usize,
    arena_bytes: usize,
    first_free: Option<u32>,
    /// Live ids in tick order
    live: Vec<EntityId>,
    next_generation: u32,
}

impl EntityStore {
    /// `capacity` entities at most, each with an `arena_bytes` component arena
    pub fn new(capacity: usize, arena_bytes: usize) -> Self {
        assert!(
            capacity <= u32::MAX as usize,
            "entity capacity {} does not fit a slot index",
            capacity
        );
        Self {
            slots: Vec::with_capacity(capacity),
            capacity,
            arena_bytes,
            first_free: None,
            live: Vec::with_capacity(capacity),
            next_generation: 1,
        }
    }

    /// Hand out an empty entity, recycling a destroyed one when possible
    pub fn create(&mut self) -> &mut Entity {
        assert!(
            self.next_generation < u32::MAX,
            "entity generation counter exhausted"
        );
        let generation = self.next_generation;
        self.next_generation += 1;

        let index = match self.first_free {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                let SlotState::Free { next } = slot.state else {
                    panic!("free list points at live slot {}", index);
                };
                self.first_free = next;

                let id = EntityId {
                    slot: index,
                    generation,
                };
                slot.entity.recycle(id);
                slot.state = SlotState::Live;
                index
            }
            None => {
                assert!(
                    self.slots.len() < self.capacity,
                    "entity store full ({} entities)",
                    self.capacity
                );
                let index = self.slots.len() as u32;
                let id = EntityId {
                    slot: index,
                    generation,
                };
                self.slots.push(Slot {
                    entity: Entity::new(id, self.arena_bytes),
                    state: SlotState::Live,
                });
                index
            }
        };

        let entity = &mut self.slots[index as usize].entity;
        log::debug!("Created entity {}", entity.id);
        self.live.push(entity.id);
        entity
    }

    /// Run destroy hooks and return the entity to the free list.
    ///
    /// Its arena bytes stay with the slot until it is recycled. Unknown or
    /// already destroyed ids are ignored.
    pub fn destroy(&mut self, id: EntityId) -> bool {
        let Some(slot) = self.slots.get_mut(id.slot as usize) else {
            return false;
        };
        if slot.state != SlotState::Live || slot.entity.id != id {
            return false;
        }

        slot.entity.destroy_components();
        slot.state = SlotState::Free {
            next: self.first_free,
        };
        self.first_free = Some(id.slot);

        if let Some(index) = self.live.iter().position(|&live| live == id) {
            self.live.swap_remove(index);
        }
        log::debug!("Destroyed entity {}", id);
        true
    }

    /// Destroy every live entity. Slots and their buffers are kept for reuse.
    pub fn reset(&mut self) {
        for id in std::mem::take(&mut self.live) {
            self.destroy(id);
        }
        log::debug!("Entity store reset ({} slots retained)", self.slots.len());
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.slots
            .get(id.slot as usize)
            .filter(|slot| slot.state == SlotState::Live && slot.entity.id == id)
            .map(|slot| &slot.entity)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.slots
            .get_mut(id.slot as usize)
            .filter(|slot| slot.state == SlotState::Live && slot.entity.id == id)
            .map(|slot| &mut slot.entity)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.get(id).is_some()
    }

    pub fn live_ids(&self) -> &[EntityId] {
        &self.live
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> + '_ {
        self.live.iter().filter_map(|&id| self.get(id))
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Slots ever allocated (live + free)
    pub fn allocated(&self) -> usize {
        self.slots.len()
    }

    /// Tick every live entity in list order
    pub fn tick(&mut self, ctx: &mut TickContext) {
        for i in 0..self.live.len() {
            let id = self.live[i];
            if let Some(entity) = self.get_mut(id) {
                entity.tick(ctx);
            }
        }
    }
}

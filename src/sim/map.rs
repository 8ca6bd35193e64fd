//! Tile map that spawns the block field
//!
//! The grid is immutable once loaded; it only decides where blocks start.

use glam::Vec2;

use super::collision::CollisionManager;
use super::components::BlockComponent;
use super::entity::EntityStore;
use crate::Rect;
use crate::renderer::ResHandle;
use crate::settings::TileLayout;

#[derive(Debug, Clone)]
pub struct Map {
    origin: Vec2,
    tile_size: Vec2,
    width: u32,
    height: u32,
    tiles: Vec<u8>,
    /// Blocks spawned by the last `spawn_blocks`
    block_count: usize,
}

impl Map {
    pub fn new(origin: Vec2, tile_size: Vec2, width: u32, height: u32) -> Self {
        Self {
            origin,
            tile_size,
            width,
            height,
            tiles: vec![0; TileLayout::tile_count(width, height)],
            block_count: 0,
        }
    }

    pub fn from_layout(layout: &TileLayout) -> Self {
        let mut map = Self::new(layout.origin, layout.tile_size, layout.width, layout.height);
        map.load(&layout.tiles);
        map
    }

    /// Copy in row-major tile data; the length must match the grid
    pub fn load(&mut self, data: &[u8]) {
        assert_eq!(
            data.len(),
            self.tiles.len(),
            "map data has {} tiles, grid is {}x{}",
            data.len(),
            self.width,
            self.height
        );
        self.tiles.copy_from_slice(data);
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    #[inline]
    pub fn tile_size(&self) -> Vec2 {
        self.tile_size
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(
            self.origin.x,
            self.origin.y,
            self.tile_size.x * self.width as f32,
            self.tile_size.y * self.height as f32,
        )
    }

    /// Tile coordinates must be inside the grid
    pub fn is_tile_occupied(&self, x: u32, y: u32) -> bool {
        assert!(
            x < self.width && y < self.height,
            "tile ({}, {}) outside {}x{} map",
            x,
            y,
            self.width,
            self.height
        );
        self.tiles[y as usize * self.width as usize + x as usize] != 0
    }

    /// Whether a world position lies on an occupied tile; false off the map
    pub fn is_position_occupied(&self, position: Vec2) -> bool {
        if !self.bounds().contains(position) {
            return false;
        }
        let local = (position - self.origin) / self.tile_size;
        let x = (local.x as u32).min(self.width - 1);
        let y = (local.y as u32).min(self.height - 1);
        self.is_tile_occupied(x, y)
    }

    pub fn tile_rect(&self, x: u32, y: u32) -> Rect {
        Rect::from_pos_size(
            self.origin + Vec2::new(x as f32, y as f32) * self.tile_size,
            self.tile_size,
        )
    }

    /// Create a block entity for every occupied tile and register it as a
    /// static body. Returns the number of blocks spawned.
    pub fn spawn_blocks(
        &mut self,
        store: &mut EntityStore,
        collisions: &mut CollisionManager,
        texture: ResHandle,
    ) -> usize {
        let mut count = 0;
        for y in 0..self.height {
            for x in 0..self.width {
                if !self.is_tile_occupied(x, y) {
                    continue;
                }
                let bounds = self.tile_rect(x, y);
                let entity = store.create();
                let id = entity.id();
                entity.add_component(BlockComponent::new(bounds, texture));
                collisions.add_static(id, bounds);
                count += 1;
            }
        }

        self.block_count = count;
        log::info!(
            "Spawned {} blocks from {}x{} map",
            count,
            self.width,
            self.height
        );
        count
    }

    /// Blocks spawned at load; the field is clear once this many are hit
    pub fn block_count(&self) -> usize {
        self.block_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::PADDLE_BOUNCE_STRENGTH;
    use crate::settings::SideBounce;
    use crate::sim::collision::CollisionRules;

    fn checker() -> Map {
        let mut map = Map::new(Vec2::new(100.0, 50.0), Vec2::new(20.0, 10.0), 3, 2);
        map.load(&[1, 0, 1, 0, 2, 0]);
        map
    }

    #[test]
    fn test_tile_occupancy() {
        let map = checker();
        assert!(map.is_tile_occupied(0, 0));
        assert!(!map.is_tile_occupied(1, 0));
        assert!(map.is_tile_occupied(1, 1));
    }

    #[test]
    #[should_panic(expected = "outside")]
    fn test_out_of_range_tile_is_fatal() {
        checker().is_tile_occupied(3, 0);
    }

    #[test]
    #[should_panic(expected = "map data")]
    fn test_wrong_data_length_is_fatal() {
        Map::new(Vec2::ZERO, Vec2::ONE, 2, 2).load(&[1, 1, 1]);
    }

    #[test]
    fn test_position_queries_are_relative_to_origin() {
        let map = checker();
        assert!(map.is_position_occupied(Vec2::new(105.0, 55.0)));
        assert!(!map.is_position_occupied(Vec2::new(125.0, 55.0)));
        assert!(map.is_position_occupied(Vec2::new(125.0, 65.0)));
        assert!(!map.is_position_occupied(Vec2::new(5.0, 5.0)));
        assert!(!map.is_position_occupied(Vec2::new(1000.0, 55.0)));
    }

    #[test]
    fn test_bounds_cover_the_grid() {
        assert_eq!(checker().bounds(), Rect::new(100.0, 50.0, 60.0, 20.0));
        assert_eq!(checker().tile_rect(2, 1), Rect::new(140.0, 60.0, 20.0, 10.0));
    }

    #[test]
    fn test_spawn_blocks_creates_entities_and_bodies() {
        let mut map = checker();
        let mut store = EntityStore::new(16, 64);
        let mut collisions = CollisionManager::new(CollisionRules {
            side_bounce: SideBounce::Reflect,
            paddle_bounce_strength: PADDLE_BOUNCE_STRENGTH,
        });

        let spawned = map.spawn_blocks(&mut store, &mut collisions, ResHandle::INVALID);
        assert_eq!(spawned, 3);
        assert_eq!(map.block_count(), 3);
        assert_eq!(store.len(), 3);
        assert_eq!(collisions.static_count(), 3);

        let positions: Vec<Vec2> = store
            .iter()
            .filter_map(|e| e.component::<BlockComponent>())
            .map(|b| b.position)
            .collect();
        assert_eq!(
            positions,
            vec![Vec2::new(100.0, 50.0), Vec2::new(140.0, 50.0), Vec2::new(120.0, 60.0)]
        );
    }
}

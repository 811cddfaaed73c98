//! # World Module
//!
//! This module provides the `VoxelMap` struct, the aggregate that maps horizontal
//! positions to sectors. It is the thin layer the sector interface is used from: it
//! creates sectors on demand, routes block requests to the right column and unloads
//! whole columns.
//!
//! ## Architecture
//!
//! The map uses sparse storage: only columns that have been touched exist in memory,
//! which keeps the world effectively unbounded. Sector lookup is O(1) through a hash
//! map; block lookup inside a sector goes through the sector's single-slot cache.
//!
//! ## Limits
//!
//! Horizontal bounds are checked here when a sector is created. Sectors themselves
//! only check the vertical coordinate of the blocks they create.

use std::collections::HashMap;

use cgmath::{Point2, Point3};

use crate::config::GameDef;
use crate::core::StResource;
use crate::error::{invariant_violation, MapError, Result};
use crate::voxels::block::{BlockKey, MapBlock};
use crate::voxels::sector::MapSector;

/// Descriptive data about a map, reachable from its sectors through a back-reference.
#[derive(Debug, Clone)]
pub struct MapMeta {
    /// Human-readable map name, used in diagnostics.
    pub name: String,
}

impl MapMeta {
    /// Creates map metadata with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// A voxel world composed of sectors.
///
/// # Examples
///
/// ```
/// use cgmath::Point3;
/// use voxel_map::config::GameDef;
/// use voxel_map::core::StResource;
/// use voxel_map::voxels::world::VoxelMap;
///
/// let mut map = VoxelMap::new("doc", StResource::new(GameDef::default()));
/// map.create_blank_block(Point3::new(1, 2, 3)).unwrap();
///
/// assert_eq!(map.sector_count(), 1);
/// assert!(map.get_block_no_create_no_ex(Point3::new(1, 2, 3)).is_some());
/// assert!(map.get_block_no_create_no_ex(Point3::new(1, 3, 3)).is_none());
/// ```
pub struct VoxelMap {
    meta: StResource<MapMeta>,
    gamedef: StResource<GameDef>,
    /// Sectors keyed by their horizontal position (`x`, `z`).
    sectors: HashMap<Point2<i16>, MapSector>,
}

/// Splits a block position into its sector position and vertical coordinate.
fn sector_pos(p: Point3<i16>) -> Point2<i16> {
    Point2::new(p.x, p.z)
}

impl VoxelMap {
    /// Creates a new, empty map.
    ///
    /// # Arguments
    /// * `name` - Name used in diagnostics
    /// * `gamedef` - World context shared with every sector and block
    pub fn new(name: impl Into<String>, gamedef: StResource<GameDef>) -> Self {
        Self {
            meta: StResource::new(MapMeta::new(name)),
            gamedef,
            sectors: HashMap::new(),
        }
    }

    pub fn name(&self) -> String {
        self.meta.get().name.clone()
    }

    pub fn gamedef(&self) -> &StResource<GameDef> {
        &self.gamedef
    }

    /// The number of loaded sectors.
    pub fn sector_count(&self) -> usize {
        self.sectors.len()
    }

    pub fn get_sector(&self, pos: Point2<i16>) -> Option<&MapSector> {
        self.sectors.get(&pos)
    }

    pub fn get_sector_mut(&mut self, pos: Point2<i16>) -> Option<&mut MapSector> {
        self.sectors.get_mut(&pos)
    }

    /// Returns the sector at `pos`, creating an empty one if none is loaded.
    ///
    /// # Errors
    /// `MapError::OutOfRange` if the column lies past the horizontal generation limit.
    pub fn create_sector(&mut self, pos: Point2<i16>) -> Result<&mut MapSector> {
        let config = self.gamedef.get().config;
        let probe = Point3::new(pos.x, 0, pos.y);
        if config.blockpos_over_max_limit(probe) {
            return Err(MapError::OutOfRange {
                pos: probe,
                limit: config.mapgen_limit,
            });
        }

        let gamedef = &self.gamedef;
        let meta = &self.meta;
        Ok(self.sectors.entry(pos).or_insert_with(|| {
            log::debug!("Creating sector {:?}", pos);
            MapSector::new(gamedef.clone(), pos, meta.downgrade())
        }))
    }

    /// Returns the block at `p` without creating anything.
    pub fn get_block_no_create_no_ex(&self, p: Point3<i16>) -> Option<&MapBlock> {
        self.sectors
            .get(&sector_pos(p))?
            .get_block_no_create_no_ex(p.y)
    }

    pub fn get_block_mut(&mut self, p: Point3<i16>) -> Option<&mut MapBlock> {
        self.sectors
            .get_mut(&sector_pos(p))?
            .get_block_buffered_mut(p.y)
    }

    /// Creates a blank block at `p`, creating its sector if needed.
    ///
    /// # Errors
    /// `MapError::OutOfRange` or `MapError::AlreadyExists`, as raised by the sector.
    pub fn create_blank_block(&mut self, p: Point3<i16>) -> Result<&mut MapBlock> {
        self.create_sector(sector_pos(p))?.create_blank_block(p.y)
    }

    /// Hands an externally constructed block to the sector of its column.
    pub fn insert_block(&mut self, block: Box<MapBlock>) -> Result<()> {
        self.create_sector(sector_pos(block.pos()))?
            .insert_block(block)
    }

    /// Deletes the block identified by `key`.
    ///
    /// # Errors
    /// `MapError::InvariantViolation` if the block is not resident in this map (this
    /// panics in debug builds).
    pub fn delete_block(&mut self, key: BlockKey) -> Result<()> {
        match self.sectors.get_mut(&sector_pos(key.pos)) {
            Some(sector) => sector.delete_block(key),
            None => Err(invariant_violation(format!(
                "deleting {:?} from {}, but its sector is not loaded",
                key,
                self.name()
            ))),
        }
    }

    /// Collects every block of every loaded sector.
    pub fn get_blocks(&self) -> Vec<&MapBlock> {
        let total = self.sectors.values().map(MapSector::len).sum();
        let mut blocks = Vec::with_capacity(total);
        for sector in self.sectors.values() {
            sector.get_blocks(&mut blocks);
        }
        blocks
    }

    /// Unloads the sector at `pos`, destroying its blocks.
    ///
    /// # Returns
    /// The number of destroyed blocks that were still in use, or `None` if no sector
    /// was loaded there.
    pub fn unload_sector(&mut self, pos: Point2<i16>) -> Option<usize> {
        let mut sector = self.sectors.remove(&pos)?;
        let mut used = 0;
        sector.delete_all_blocks(Some(&mut used));
        if used > 0 {
            log::warn!(
                "Unloaded sector {:?} of {} with {} blocks still in use",
                pos,
                self.name(),
                used
            );
        }
        Some(used)
    }

    /// Unloads every listed sector.
    ///
    /// # Returns
    /// The total number of destroyed blocks that were still in use.
    pub fn delete_sectors(&mut self, positions: &[Point2<i16>]) -> usize {
        positions
            .iter()
            .filter_map(|&pos| self.unload_sector(pos))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WorldConfig;

    fn map() -> VoxelMap {
        VoxelMap::new(
            "test",
            StResource::new(GameDef::new(WorldConfig { mapgen_limit: 320 })),
        )
    }

    #[test]
    fn test_blocks_are_routed_to_their_column() {
        let mut map = map();
        map.create_blank_block(Point3::new(0, 0, 0)).unwrap();
        map.create_blank_block(Point3::new(0, 1, 0)).unwrap();
        map.create_blank_block(Point3::new(1, 0, 0)).unwrap();

        assert_eq!(map.sector_count(), 2);
        assert_eq!(map.get_sector(Point2::new(0, 0)).unwrap().len(), 2);
        assert_eq!(map.get_sector(Point2::new(1, 0)).unwrap().len(), 1);
        assert_eq!(map.get_blocks().len(), 3);

        let sector = map.get_sector(Point2::new(1, 0)).unwrap();
        assert_eq!(sector.parent().unwrap().get().name, "test");
    }

    #[test]
    fn test_create_sector_is_idempotent() {
        let mut map = map();
        map.create_sector(Point2::new(4, -4))
            .unwrap()
            .create_blank_block(2)
            .unwrap();
        let sector = map.create_sector(Point2::new(4, -4)).unwrap();
        assert_eq!(sector.len(), 1);
        assert_eq!(map.sector_count(), 1);
    }

    #[test]
    fn test_horizontal_limit() {
        let mut map = map();
        // mapgen_limit 320 allows block coordinates in -20..=20
        assert!(map.create_sector(Point2::new(20, -20)).is_ok());
        assert!(matches!(
            map.create_sector(Point2::new(21, 0)),
            Err(MapError::OutOfRange { .. })
        ));
        assert!(matches!(
            map.create_blank_block(Point3::new(0, 0, -21)),
            Err(MapError::OutOfRange { .. })
        ));
        assert_eq!(map.sector_count(), 1);
    }

    #[test]
    fn test_insert_and_delete() {
        let mut map = map();
        let block = Box::new(MapBlock::new(Point3::new(2, 3, 4), map.gamedef().clone()));
        let key = block.key();
        map.insert_block(block).unwrap();
        assert!(map.get_block_no_create_no_ex(Point3::new(2, 3, 4)).is_some());

        map.get_block_mut(Point3::new(2, 3, 4)).unwrap().set_generated(true);
        assert!(map
            .get_block_no_create_no_ex(Point3::new(2, 3, 4))
            .unwrap()
            .is_generated());

        map.delete_block(key).unwrap();
        assert!(map.get_block_no_create_no_ex(Point3::new(2, 3, 4)).is_none());
        assert_eq!(map.sector_count(), 1);
    }

    #[test]
    fn test_unload_reports_used_blocks() {
        let mut map = map();
        for y in 0..3 {
            map.create_blank_block(Point3::new(0, y, 0)).unwrap().ref_grab();
            map.create_blank_block(Point3::new(1, y, 1)).unwrap();
        }
        map.create_blank_block(Point3::new(2, 0, 2)).unwrap().ref_grab();

        assert_eq!(map.unload_sector(Point2::new(9, 9)), None);
        assert_eq!(
            map.delete_sectors(&[Point2::new(0, 0), Point2::new(1, 1), Point2::new(2, 2)]),
            4
        );
        assert_eq!(map.sector_count(), 0);
        assert!(map.get_blocks().is_empty());
    }

    #[test]
    #[cfg_attr(debug_assertions, should_panic(expected = "invariant violation"))]
    fn test_delete_from_unloaded_sector() {
        let mut map = map();
        let key = map.create_blank_block(Point3::new(0, 0, 0)).unwrap().key();
        map.unload_sector(Point2::new(0, 0));
        assert!(matches!(
            map.delete_block(key),
            Err(MapError::InvariantViolation(_))
        ));
    }
}

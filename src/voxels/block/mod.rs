//! # Block Module
//!
//! The map block: one 16x16x16 unit of voxel content addressed by an integer block
//! position. Blocks are created through the sector that owns their column and are
//! never shared between sectors.
//!
//! Node content and its serialization live outside this crate; a block here only
//! carries what the storage layer needs: its position, the world context, an
//! external usage counter, an orphan marker and the generated/modified flags.

use std::cell::Cell;
use std::fmt;

use cgmath::Point3;

use crate::config::GameDef;
use crate::core::StResource;

pub mod block_key;

pub use block_key::BlockKey;

/// A single map block.
///
/// # Reference counting
/// The usage counter is maintained by external holders such as a mesh cache through
/// [`ref_grab`](MapBlock::ref_grab) and [`ref_drop`](MapBlock::ref_drop). The sector
/// only reads it, to report how many in-use blocks a bulk delete destroyed.
///
/// # Orphans
/// When a sector releases a block it marks it orphaned. An orphaned block is not part
/// of any sector and must not be looked up again.
pub struct MapBlock {
    pos: Point3<i16>,
    serial: u64,
    gamedef: StResource<GameDef>,
    ref_count: Cell<u32>,
    orphan: bool,
    generated: bool,
    modified: bool,
}

impl MapBlock {
    /// Creates a blank block at the given block position.
    ///
    /// Outside of tests, blocks are created through
    /// [`MapSector::create_blank_block_no_insert`](crate::voxels::sector::MapSector::create_blank_block_no_insert)
    /// so that they land in the right column.
    pub fn new(pos: Point3<i16>, gamedef: StResource<GameDef>) -> Self {
        Self {
            pos,
            serial: block_key::next_serial(),
            gamedef,
            ref_count: Cell::new(0),
            orphan: false,
            generated: false,
            modified: false,
        }
    }

    /// The block position, in block coordinates.
    pub fn pos(&self) -> Point3<i16> {
        self.pos
    }

    /// The identity token of this block.
    pub fn key(&self) -> BlockKey {
        BlockKey {
            pos: self.pos,
            serial: self.serial,
        }
    }

    /// The world context this block was created with.
    pub fn gamedef(&self) -> &StResource<GameDef> {
        &self.gamedef
    }

    /// Registers one external user of this block.
    pub fn ref_grab(&self) {
        self.ref_count.set(self.ref_count.get() + 1);
    }

    /// Releases one external user of this block.
    ///
    /// # Panics
    /// Panics in debug builds if the counter is already zero.
    pub fn ref_drop(&self) {
        let count = self.ref_count.get();
        debug_assert!(count > 0, "ref_drop on unreferenced block {:?}", self.pos);
        self.ref_count.set(count.saturating_sub(1));
    }

    /// The number of external users currently holding this block.
    pub fn ref_get(&self) -> u32 {
        self.ref_count.get()
    }

    /// Marks the block as released by its sector.
    pub(crate) fn make_orphan(&mut self) {
        self.orphan = true;
    }

    /// Returns `true` once the owning sector has released this block.
    pub fn is_orphan(&self) -> bool {
        self.orphan
    }

    pub fn is_generated(&self) -> bool {
        self.generated
    }

    pub fn set_generated(&mut self, generated: bool) {
        self.generated = generated;
    }

    /// Flags the block content as changed since it was last saved.
    pub fn raise_modified(&mut self) {
        self.modified = true;
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Clears the modified flag, typically after the block has been persisted.
    pub fn reset_modified(&mut self) {
        self.modified = false;
    }
}

impl fmt::Debug for MapBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapBlock")
            .field("pos", &self.pos)
            .field("serial", &self.serial)
            .field("ref_count", &self.ref_count.get())
            .field("orphan", &self.orphan)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gamedef() -> StResource<GameDef> {
        StResource::new(GameDef::default())
    }

    #[test]
    fn test_new_block_is_blank() {
        let block = MapBlock::new(Point3::new(1, 2, 3), gamedef());
        assert_eq!(block.pos(), Point3::new(1, 2, 3));
        assert_eq!(block.ref_get(), 0);
        assert!(!block.is_orphan());
        assert!(!block.is_generated());
        assert!(!block.is_modified());
    }

    #[test]
    fn test_ref_counting() {
        let block = MapBlock::new(Point3::new(0, 0, 0), gamedef());
        block.ref_grab();
        block.ref_grab();
        assert_eq!(block.ref_get(), 2);
        block.ref_drop();
        assert_eq!(block.ref_get(), 1);
    }

    #[test]
    fn test_keys_distinguish_blocks_at_same_position() {
        let a = MapBlock::new(Point3::new(0, 4, 0), gamedef());
        let b = MapBlock::new(Point3::new(0, 4, 0), gamedef());
        assert_eq!(a.key().pos, b.key().pos);
        assert_ne!(a.key(), b.key());
    }

    #[test]
    fn test_flags() {
        let mut block = MapBlock::new(Point3::new(0, 0, 0), gamedef());
        block.set_generated(true);
        block.raise_modified();
        assert!(block.is_generated());
        assert!(block.is_modified());
        block.reset_modified();
        assert!(!block.is_modified());
        block.make_orphan();
        assert!(block.is_orphan());
    }
}

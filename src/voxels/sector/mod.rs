//! # Sector Module
//!
//! A `MapSector` owns one vertical column of map blocks: every block whose horizontal
//! block coordinates equal the sector position.
//!
//! ## Storage
//!
//! Blocks live boxed in a slot vector, with a hash index from the vertical coordinate
//! to the slot. Lookups go through a single-slot cache that remembers the last queried
//! vertical coordinate and its slot (or the fact that it was empty). World simulation
//! and rendering query the same few levels of a column over and over, so most lookups
//! never touch the hash index.
//!
//! ## Borrowing contract
//!
//! References returned by lookups and creation borrow the sector. The borrow checker
//! therefore guarantees that no reference survives an operation that could invalidate
//! it (detaching, bulk deletion, dropping the sector). Code that needs to name a block
//! across such an operation holds its [`BlockKey`] instead.
//!
//! ## Cache coherence
//!
//! Every mutating operation either updates the cache for the coordinate it touched or
//! clears it before mutating. Detaching moves another block into the freed slot, so it
//! always clears the cache.

use std::cell::Cell;
use std::collections::HashMap;

use cgmath::{Point2, Point3};

use crate::config::GameDef;
use crate::core::{StResource, StWeak};
use crate::error::{invariant_violation, MapError, Result};
use crate::voxels::block::{BlockKey, MapBlock};
use crate::voxels::world::MapMeta;

pub mod sector_iteration;

pub use sector_iteration::SectorBlockIterator;

/// The memoized result of the most recent lookup.
#[derive(Copy, Clone, Debug)]
struct CachedLookup {
    y: i16,
    slot: Option<usize>,
}

/// One vertical column of map blocks.
///
/// The sector position is a `Point2` whose `x` is the block X coordinate and whose `y`
/// is the block **Z** coordinate.
///
/// # Examples
///
/// ```
/// use cgmath::Point2;
/// use voxel_map::config::GameDef;
/// use voxel_map::core::StResource;
/// use voxel_map::voxels::sector::MapSector;
/// use voxel_map::voxels::world::MapMeta;
///
/// let meta = StResource::new(MapMeta::new("doc"));
/// let gamedef = StResource::new(GameDef::default());
/// let mut sector = MapSector::new(gamedef, Point2::new(3, -2), meta.downgrade());
///
/// let key = sector.create_blank_block(5).unwrap().key();
/// assert_eq!(sector.get_block_buffered(5).unwrap().key(), key);
///
/// let block = sector.detach_block(key).unwrap();
/// assert!(block.is_orphan());
/// assert!(sector.get_block_buffered(5).is_none());
/// ```
pub struct MapSector {
    pos: Point2<i16>,
    slots: Vec<Box<MapBlock>>,
    index: HashMap<i16, usize>,
    cache: Cell<Option<CachedLookup>>,
    gamedef: StResource<GameDef>,
    parent: StWeak<MapMeta>,
}

impl MapSector {
    /// Creates an empty sector for the column at `pos`.
    ///
    /// # Arguments
    /// * `gamedef` - World context that new blocks are constructed with
    /// * `pos` - Horizontal position of the column (`x`, `z`)
    /// * `parent` - Back-reference to the owning map, used for diagnostics only
    pub fn new(gamedef: StResource<GameDef>, pos: Point2<i16>, parent: StWeak<MapMeta>) -> Self {
        Self {
            pos,
            slots: Vec::new(),
            index: HashMap::new(),
            cache: Cell::new(None),
            gamedef,
            parent,
        }
    }

    /// The horizontal position of this column.
    pub fn pos(&self) -> Point2<i16> {
        self.pos
    }

    /// The number of blocks currently owned by this sector.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// The owning map, if it is still alive.
    pub fn parent(&self) -> Option<StResource<MapMeta>> {
        self.parent.upgrade()
    }

    /// Returns `true` if the block identified by `key` is resident in this sector.
    pub fn contains(&self, key: BlockKey) -> bool {
        key.pos.x == self.pos.x
            && key.pos.z == self.pos.y
            && self
                .index
                .get(&key.pos.y)
                .and_then(|&slot| self.slots.get(slot))
                .is_some_and(|block| block.key() == key)
    }

    /// The block position at vertical coordinate `y` in this column.
    fn block_pos(&self, y: i16) -> Point3<i16> {
        Point3::new(self.pos.x, y, self.pos.y)
    }

    fn parent_name(&self) -> String {
        self.parent()
            .map(|meta| meta.get().name.clone())
            .unwrap_or_else(|| String::from("<unowned>"))
    }

    fn invalidate_cache(&self) {
        self.cache.set(None);
    }

    /// Releases every block in the column.
    ///
    /// # Arguments
    /// * `used_count` - If given, incremented once for every destroyed block that still
    ///   had external users. This is a diagnostic, not an error.
    pub fn delete_all_blocks(&mut self, used_count: Option<&mut usize>) {
        self.invalidate_cache();
        self.index.clear();
        let blocks = std::mem::take(&mut self.slots);

        let total = blocks.len();
        let mut used = 0;
        for block in blocks {
            if block.ref_get() > 0 {
                used += 1;
            }
        }

        if total > 0 {
            log::debug!(
                "Deleted {} blocks ({} in use) from sector {:?} of {}",
                total,
                used,
                self.pos,
                self.parent_name()
            );
        }
        if let Some(count) = used_count {
            *count += used;
        }
    }

    /// Looks up the slot for `y`, going through the single-slot cache.
    fn lookup_slot(&self, y: i16) -> Option<usize> {
        if let Some(cached) = self.cache.get() {
            if cached.y == y {
                return cached.slot;
            }
        }

        let slot = self.index.get(&y).copied();
        // Misses are cached too
        self.cache.set(Some(CachedLookup { y, slot }));
        slot
    }

    /// Returns the block at vertical coordinate `y`, if there is one.
    ///
    /// Repeated queries for the same `y` are answered from a single-slot cache.
    pub fn get_block_buffered(&self, y: i16) -> Option<&MapBlock> {
        self.lookup_slot(y)
            .and_then(|slot| self.slots.get(slot))
            .map(|block| &**block)
    }

    /// Mutable variant of [`get_block_buffered`](Self::get_block_buffered).
    pub fn get_block_buffered_mut(&mut self, y: i16) -> Option<&mut MapBlock> {
        let slot = self.lookup_slot(y)?;
        self.slots.get_mut(slot).map(|block| &mut **block)
    }

    /// Read-only lookup; identical to [`get_block_buffered`](Self::get_block_buffered).
    pub fn get_block_no_create_no_ex(&self, y: i16) -> Option<&MapBlock> {
        self.get_block_buffered(y)
    }

    /// Constructs a blank block for vertical coordinate `y` without inserting it.
    ///
    /// The caller can populate the block before committing it with
    /// [`insert_block`](Self::insert_block), so a half-loaded block is never visible
    /// through lookups.
    ///
    /// # Errors
    /// - `MapError::AlreadyExists` if `y` is already occupied in this sector
    /// - `MapError::OutOfRange` if `y` lies past the world generation limit
    pub fn create_blank_block_no_insert(&self, y: i16) -> Result<Box<MapBlock>> {
        let pos = self.block_pos(y);
        if self.get_block_buffered(y).is_some() {
            return Err(MapError::AlreadyExists { pos });
        }

        let config = self.gamedef.get().config;
        if config.blockpos_over_max_limit(Point3::new(0, y, 0)) {
            return Err(MapError::OutOfRange {
                pos,
                limit: config.mapgen_limit,
            });
        }

        Ok(Box::new(MapBlock::new(pos, self.gamedef.clone())))
    }

    /// Creates a blank block at vertical coordinate `y` and inserts it.
    ///
    /// # Errors
    /// Same as [`create_blank_block_no_insert`](Self::create_blank_block_no_insert).
    pub fn create_blank_block(&mut self, y: i16) -> Result<&mut MapBlock> {
        let block = self.create_blank_block_no_insert(y)?;
        log::trace!("Created blank block {:?}", block.pos());
        Ok(self.insert_unchecked(y, block))
    }

    /// Takes ownership of an externally constructed block.
    ///
    /// # Errors
    /// - `MapError::AlreadyExists` if a block already occupies the block's vertical
    ///   coordinate; the sector is left unchanged
    /// - `MapError::InvariantViolation` if the block belongs to another column (this
    ///   panics in debug builds)
    pub fn insert_block(&mut self, block: Box<MapBlock>) -> Result<()> {
        let pos = block.pos();
        if self.get_block_buffered(pos.y).is_some() {
            return Err(MapError::AlreadyExists { pos });
        }

        if pos.x != self.pos.x || pos.z != self.pos.y {
            return Err(invariant_violation(format!(
                "block {:?} inserted into sector {:?} of {}",
                pos,
                self.pos,
                self.parent_name()
            )));
        }

        self.insert_unchecked(pos.y, block);
        Ok(())
    }

    /// Stores a block at a vertical coordinate known to be free.
    fn insert_unchecked(&mut self, y: i16, block: Box<MapBlock>) -> &mut MapBlock {
        let slot = self.slots.len();
        self.slots.push(block);
        self.index.insert(y, slot);
        self.cache.set(Some(CachedLookup {
            y,
            slot: Some(slot),
        }));
        &mut self.slots[slot]
    }

    /// Removes the block identified by `key` and hands ownership to the caller.
    ///
    /// The returned block is marked orphaned.
    ///
    /// # Errors
    /// `MapError::InvariantViolation` if this sector does not own that exact block
    /// (this panics in debug builds). The cache is cleared either way.
    pub fn detach_block(&mut self, key: BlockKey) -> Result<Box<MapBlock>> {
        self.invalidate_cache();

        let y = key.pos.y;
        let slot = match self.index.get(&y) {
            Some(&slot) if self.slots[slot].key() == key => slot,
            Some(&slot) => {
                return Err(invariant_violation(format!(
                    "detaching {:?} from sector {:?} of {}, but {:?} is stored there",
                    key,
                    self.pos,
                    self.parent_name(),
                    self.slots[slot].key()
                )))
            }
            None => {
                return Err(invariant_violation(format!(
                    "detaching {:?} from sector {:?} of {}, but no block is stored there",
                    key,
                    self.pos,
                    self.parent_name()
                )))
            }
        };

        self.index.remove(&y);
        let mut block = self.slots.swap_remove(slot);
        if let Some(moved) = self.slots.get(slot) {
            self.index.insert(moved.pos().y, slot);
        }

        block.make_orphan();
        Ok(block)
    }

    /// Detaches the block identified by `key` and drops it.
    pub fn delete_block(&mut self, key: BlockKey) -> Result<()> {
        self.detach_block(key).map(|_| ())
    }
}

impl Drop for MapSector {
    fn drop(&mut self) {
        self.delete_all_blocks(None);
    }
}

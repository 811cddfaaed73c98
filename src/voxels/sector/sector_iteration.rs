//! # Sector Iteration Module
//!
//! Bulk enumeration of the blocks in a sector. Blocks come out in storage order,
//! which is not sorted by vertical coordinate. Enumeration never touches the lookup
//! cache.

use std::slice;

use crate::voxels::block::MapBlock;

use super::MapSector;

/// An iterator over every block owned by a sector.
pub struct SectorBlockIterator<'a> {
    inner: slice::Iter<'a, Box<MapBlock>>,
}

impl<'a> Iterator for SectorBlockIterator<'a> {
    type Item = &'a MapBlock;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|block| &**block)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for SectorBlockIterator<'_> {}

impl MapSector {
    /// Iterates over every block in this sector.
    pub fn blocks(&self) -> SectorBlockIterator<'_> {
        SectorBlockIterator {
            inner: self.slots.iter(),
        }
    }

    /// Appends a reference to every block in this sector to `dest`.
    ///
    /// # Arguments
    /// * `dest` - Destination list; existing entries are kept
    pub fn get_blocks<'a>(&'a self, dest: &mut Vec<&'a MapBlock>) {
        dest.reserve(self.slots.len());
        dest.extend(self.blocks());
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use cgmath::Point2;

    use crate::config::GameDef;
    use crate::core::StResource;
    use crate::voxels::world::MapMeta;

    use super::*;

    #[test]
    fn test_get_blocks_appends_every_block_once() {
        let meta = StResource::new(MapMeta::new("test"));
        let mut sector = MapSector::new(
            StResource::new(GameDef::default()),
            Point2::new(5, 5),
            meta.downgrade(),
        );
        for y in [9, -3, 0, 4] {
            sector.create_blank_block(y).unwrap();
        }

        let other = MapSector::new(
            StResource::new(GameDef::default()),
            Point2::new(6, 5),
            meta.downgrade(),
        );

        let mut dest = Vec::new();
        other.get_blocks(&mut dest);
        assert!(dest.is_empty());

        sector.get_blocks(&mut dest);
        assert_eq!(dest.len(), 4);
        let keys: HashSet<_> = dest.iter().map(|block| block.key()).collect();
        assert_eq!(keys.len(), 4);
        for block in &dest {
            assert!(sector.contains(block.key()));
        }
        assert_eq!(sector.blocks().len(), 4);
    }
}

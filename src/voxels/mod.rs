//! # Voxel Map Storage
//!
//! This module partitions an effectively unbounded voxel world into map blocks grouped
//! into vertical columns.
//!
//! ## Architecture
//!
//! * **Block**: `MapBlock`, one unit of voxel content addressed by a block position
//! * **Sector**: `MapSector`, the exclusive owner of every block in one column, with a
//!   single-slot lookup cache
//! * **World**: `VoxelMap`, which maps horizontal positions to sectors
//!
//! ## Data Flow
//!
//! 1. The map receives a request for a block position
//! 2. The map picks the sector for the block's column (creating it if asked to)
//! 3. The sector answers from its cache, its index, or creates/removes the block
//!
//! ## Thread Safety
//!
//! None of these types are internally synchronized. A map and its sectors belong to a
//! single thread; any sharing across threads must be serialized by the caller.

pub mod block;
pub mod sector;
pub mod world;

//! # Block Key Module
//!
//! Identity tokens for map blocks.
//!
//! A sector hands out borrowed references to its blocks, and those borrows end before
//! the sector can be mutated again. Operations that need to name a specific block
//! across that boundary (detaching it, checking whether it is still resident) use a
//! `BlockKey` instead: the block's position plus a serial number that is unique for
//! the lifetime of the process.

use std::sync::atomic::{AtomicU64, Ordering};

use cgmath::Point3;

static NEXT_SERIAL: AtomicU64 = AtomicU64::new(1);

/// Allocates a serial number that no other block in this process has.
pub(super) fn next_serial() -> u64 {
    NEXT_SERIAL.fetch_add(1, Ordering::Relaxed)
}

/// Copyable identity of a single map block.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct BlockKey {
    /// The block position, in block coordinates.
    pub pos: Point3<i16>,
    /// Process-unique serial number of the block.
    pub serial: u64,
}

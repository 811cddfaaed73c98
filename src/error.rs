//! # Error Module
//!
//! The error taxonomy of the map storage layer.
//!
//! `OutOfRange` and `AlreadyExists` are recoverable and leave the sector untouched.
//! `InvariantViolation` reports corrupted caller state; see [`invariant_violation`]
//! for how it is raised.

use cgmath::Point3;
use thiserror::Error;

/// Errors produced by sectors, the map and configuration loading.
#[derive(Debug, Error)]
pub enum MapError {
    /// A block position lies outside the configured generation limit.
    #[error("block position {pos:?} is over the max mapgen limit ({limit})")]
    OutOfRange {
        /// The rejected block position.
        pos: Point3<i16>,
        /// The generation limit in nodes.
        limit: i16,
    },

    /// A block already occupies this position.
    #[error("block {pos:?} already exists")]
    AlreadyExists {
        /// The occupied block position.
        pos: Point3<i16>,
    },

    /// A caller broke an ownership invariant of the sector.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    /// The world configuration is invalid.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Reading a configuration file failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A configuration file is not valid JSON.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, MapError>;

/// Raises an invariant violation.
///
/// The violation is always logged. Debug builds abort on the spot with a panic;
/// release builds return `MapError::InvariantViolation` so the caller can unwind
/// the operation.
pub(crate) fn invariant_violation(message: String) -> MapError {
    log::error!("{}", message);
    if cfg!(debug_assertions) {
        panic!("invariant violation: {}", message);
    }
    MapError::InvariantViolation(message)
}

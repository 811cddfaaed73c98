//! # Core Module
//!
//! Shared-handle primitives used by the map storage layer.
//!
//! ## Key Components
//! - `StResource`: Single-threaded reference-counted handle with interior mutability
//! - `StWeak`: Non-owning back-reference to an `StResource`
//!
//! The map hands out `StResource<GameDef>` clones as the world context of every
//! sector and block, and gives sectors an `StWeak` back to the map metadata so that
//! children never keep their parent alive.

pub mod st_resource;

pub use st_resource::{StResource, StWeak};

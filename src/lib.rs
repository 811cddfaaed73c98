#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Voxel Map
//!
//! The map storage layer of a voxel world: the addressing scheme, ownership rules and
//! cached lookup path for the map blocks everything else in the engine reads.
//!
//! ## Key Modules
//!
//! * `core` - Shared-handle primitives (`StResource`, `StWeak`)
//! * `config` - World configuration and the `GameDef` world context
//! * `voxels` - Blocks, sectors and the map that aggregates them
//! * `error` - The `MapError` taxonomy
//!
//! ## Usage
//!
//! ```rust
//! use cgmath::Point3;
//! use voxel_map::config::{GameDef, WorldConfig};
//! use voxel_map::core::StResource;
//! use voxel_map::voxels::world::VoxelMap;
//!
//! let gamedef = StResource::new(GameDef::new(WorldConfig::default()));
//! let mut map = VoxelMap::new("overworld", gamedef);
//!
//! let key = map.create_blank_block(Point3::new(0, -1, 0)).unwrap().key();
//! map.delete_block(key).unwrap();
//! ```

use cgmath::{Point2, Point3};
use log::info;

pub mod config;
pub mod core;
pub mod error;
pub mod voxels;

use crate::config::{GameDef, WorldConfig};
use crate::core::StResource;
use crate::voxels::world::VoxelMap;

/// Vertical extent, in blocks, of the columns populated by [`run`].
const DEMO_COLUMN_HEIGHT: i16 = 8;

/// Initializes logging, loads the world configuration and exercises a small map.
///
/// # Arguments
/// * `config_path` - Optional JSON configuration file; defaults are used without one
///
/// # Errors
/// Returns any error raised while loading the configuration or populating the map.
pub fn run(config_path: Option<&str>) -> error::Result<()> {
    let mut log_builder = env_logger::Builder::new();
    log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .init();
    info!("Logger initialized");

    let config = match config_path {
        Some(path) => WorldConfig::from_path(path)?,
        None => WorldConfig::default(),
    };
    info!("Using mapgen limit {}", config.mapgen_limit);

    let mut map = VoxelMap::new("demo", StResource::new(GameDef::new(config)));
    let mut rng = fastrand::Rng::new();
    for x in -2..=2 {
        for z in -2..=2 {
            for y in 0..DEMO_COLUMN_HEIGHT {
                let block = map.create_blank_block(Point3::new(x, y, z))?;
                block.set_generated(true);
                if rng.u8(0..4) == 0 {
                    block.ref_grab();
                }
            }
        }
    }
    info!(
        "Populated {} blocks in {} sectors",
        map.get_blocks().len(),
        map.sector_count()
    );

    let loaded: Vec<Point2<i16>> = (-2..=2)
        .flat_map(|x| (-2..=2).map(move |z| Point2::new(x, z)))
        .collect();
    let used = map.delete_sectors(&loaded);
    info!("Unloaded all sectors, {} blocks were still in use", used);
    Ok(())
}

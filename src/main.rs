//! # Voxel Map Entry Point
//!
//! Runs the library's `run()` demo. An optional first argument names a JSON world
//! configuration file.
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=debug cargo run -- world.json
//! ```

fn main() {
    let config_path = std::env::args().nth(1);
    if let Err(err) = voxel_map::run(config_path.as_deref()) {
        log::error!("{}", err);
        std::process::exit(1);
    }
}

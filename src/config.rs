//! # Configuration Module
//!
//! World configuration consumed by the map storage layer, and the `GameDef` world
//! context that sectors and blocks are constructed with.
//!
//! Configuration is stored as JSON:
//!
//! ```json
//! { "mapgen_limit": 31007 }
//! ```

use std::path::Path;

use cgmath::Point3;
use serde::{Deserialize, Serialize};

use crate::error::{MapError, Result};

/// Edge length of a map block, in nodes.
pub const MAP_BLOCKSIZE: i16 = 16;

/// The largest generation limit a world may be configured with, in nodes.
pub const MAX_MAP_GENERATION_LIMIT: i16 = 31007;

/// Settings describing the extent of a world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Distance from the origin, in nodes, past which no blocks may be created.
    pub mapgen_limit: i16,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            mapgen_limit: MAX_MAP_GENERATION_LIMIT,
        }
    }
}

impl WorldConfig {
    /// Parses a configuration from a JSON document.
    ///
    /// Missing fields take their default values and a `mapgen_limit` above
    /// [`MAX_MAP_GENERATION_LIMIT`] is clamped to it.
    ///
    /// # Errors
    /// Returns `MapError::Json` on malformed input and `MapError::Config` if the
    /// limit is not positive.
    ///
    /// # Examples
    ///
    /// ```
    /// use voxel_map::config::WorldConfig;
    ///
    /// let config = WorldConfig::from_json_str(r#"{ "mapgen_limit": 160 }"#).unwrap();
    /// assert_eq!(config.max_limit_bp(), 10);
    /// ```
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: WorldConfig = serde_json::from_str(json)?;
        config.validated()
    }

    /// Reads and parses a configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        log::debug!("Loaded world config from {}", path.display());
        Self::from_json_str(&json)
    }

    fn validated(mut self) -> Result<Self> {
        if self.mapgen_limit <= 0 {
            return Err(MapError::Config(format!(
                "mapgen_limit must be positive, got {}",
                self.mapgen_limit
            )));
        }
        if self.mapgen_limit > MAX_MAP_GENERATION_LIMIT {
            log::warn!(
                "mapgen_limit {} exceeds the maximum, clamping to {}",
                self.mapgen_limit,
                MAX_MAP_GENERATION_LIMIT
            );
            self.mapgen_limit = MAX_MAP_GENERATION_LIMIT;
        }
        Ok(self)
    }

    /// The generation limit expressed in block coordinates.
    pub fn max_limit_bp(&self) -> i16 {
        self.mapgen_limit.min(MAX_MAP_GENERATION_LIMIT) / MAP_BLOCKSIZE
    }

    /// Returns `true` if any component of the block position lies past the limit.
    pub fn blockpos_over_max_limit(&self, p: Point3<i16>) -> bool {
        let limit = self.max_limit_bp();
        let over = |v: i16| v < -limit || v > limit;
        over(p.x) || over(p.y) || over(p.z)
    }
}

/// The world context shared by the map, its sectors and their blocks.
///
/// Handed around as an `StResource<GameDef>`; nothing in the storage layer owns it.
#[derive(Debug, Clone, Default)]
pub struct GameDef {
    /// The world's extent settings.
    pub config: WorldConfig,
}

impl GameDef {
    /// Creates a world context from a configuration.
    pub fn new(config: WorldConfig) -> Self {
        Self { config }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_limit() {
        let config = WorldConfig::default();
        assert_eq!(config.max_limit_bp(), 1937);
        assert!(!config.blockpos_over_max_limit(Point3::new(0, 1937, 0)));
        assert!(config.blockpos_over_max_limit(Point3::new(0, 1938, 0)));
        assert!(config.blockpos_over_max_limit(Point3::new(0, -1938, 0)));
        assert!(config.blockpos_over_max_limit(Point3::new(-1938, 0, 0)));
    }

    #[test]
    fn test_parse_and_clamp() {
        let config = WorldConfig::from_json_str(r#"{ "mapgen_limit": 32000 }"#).unwrap();
        assert_eq!(config.mapgen_limit, MAX_MAP_GENERATION_LIMIT);

        let config = WorldConfig::from_json_str("{}").unwrap();
        assert_eq!(config, WorldConfig::default());
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(matches!(
            WorldConfig::from_json_str(r#"{ "mapgen_limit": 0 }"#),
            Err(MapError::Config(_))
        ));
        assert!(matches!(
            WorldConfig::from_json_str("not json"),
            Err(MapError::Json(_))
        ));
        assert!(matches!(
            WorldConfig::from_path("/nonexistent/world.json"),
            Err(MapError::Io(_))
        ));
    }
}

//! Simulation-wide physics settings

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{Config, ConfigError};
use crate::foundation::math::{Rect, Vec2};
use crate::foundation::time::{FixedTimestep, DEFAULT_TICKS_PER_SECOND};
use crate::physics::ResolverConfig;
use crate::spatial::QuadTreeConfig;

/// Settings for one body pool and the loop that drives it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Width of the tracked world region
    pub world_width: f32,

    /// Height of the tracked world region
    pub world_height: f32,

    /// Whether detected overlaps get an automatic response
    pub respond: bool,

    /// Broad-phase tree settings
    pub quadtree: QuadTreeConfig,

    /// Narrow-phase response settings
    pub resolver: ResolverConfig,

    /// Simulation ticks per second
    pub ticks_per_second: u32,

    /// Cap on pending simulation time after a stall, in milliseconds
    pub max_accumulated_ms: u64,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            world_width: 1024.0,
            world_height: 1024.0,
            respond: true,
            quadtree: QuadTreeConfig::default(),
            resolver: ResolverConfig::default(),
            ticks_per_second: DEFAULT_TICKS_PER_SECOND,
            max_accumulated_ms: 200,
        }
    }
}

impl PhysicsConfig {
    /// World region covered by the pool's quadtree
    pub fn world_region(&self) -> Rect {
        Rect::new(Vec2::zeros(), Vec2::new(self.world_width, self.world_height))
    }

    /// Fixed timestep matching these settings
    pub fn timestep(&self) -> FixedTimestep {
        FixedTimestep::new(
            self.ticks_per_second,
            Duration::from_millis(self.max_accumulated_ms),
        )
    }

    /// Check that the values describe a usable simulation
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.world_width > 0.0 && self.world_height > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "world size must be positive, got {}x{}",
                self.world_width, self.world_height
            )));
        }
        if self.ticks_per_second == 0 {
            return Err(ConfigError::Invalid("ticks_per_second must be at least 1".to_string()));
        }
        if self.quadtree.max_entries_per_node == 0 {
            return Err(ConfigError::Invalid(
                "quadtree.max_entries_per_node must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Config for PhysicsConfig {}

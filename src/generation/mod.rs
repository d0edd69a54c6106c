//! # Generation Module
//!
//! Procedural level generation: the room-and-corridor feature generator and the
//! spawn index derived from its output.
//!
//! A level is produced in two ordered steps. The generator builds the complete
//! grid, then the [`UnblockedIndex`] is rebuilt from that finished grid. Nothing
//! derived from a grid is ever updated incrementally.

pub mod dungeon;
pub mod spawn;

pub use dungeon::*;
pub use spawn::*;

use crate::config::{
    DEFAULT_CORRIDOR_BIAS, DEFAULT_FAIL_BUDGET, DEFAULT_MAP_HEIGHT, DEFAULT_MAP_WIDTH,
    DEFAULT_MAX_FEATURES, MAX_MAP_SIDE, MIN_MAP_SIDE,
};
use crate::{DelveError, DelveResult};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

/// Configuration for procedural generation.
///
/// Controls the map size, how long the generator keeps trying, the room/corridor
/// mix and the probability constants of the joining passes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Random seed for reproducible generation
    pub seed: u64,
    /// Map width in tiles
    pub width: u32,
    /// Map height in tiles
    pub height: u32,
    /// Consecutive failed placements before the generator stops
    pub fail_budget: u32,
    /// Percent chance (0..=100) that a new feature is a corridor
    pub corridor_bias: u32,
    /// Maximum number of placed rooms and corridors
    pub max_features: u32,
    /// Whether tiles start unexplored
    pub fog_of_war: bool,
    /// Percent chance to join a fresh corridor's far end to a grazed floor
    pub main_join_chance: u32,
    /// Percent chance used when revisiting every corridor after the main loop
    pub final_join_chance: u32,
    /// Percent chance to punch a portal when a placement collides with floor
    pub collision_portal_chance: u32,
    /// Anchor draws allowed for the first room before giving up
    pub first_room_attempts: u32,
    /// Draws allowed when looking for a wall tile to exit through
    pub exit_attempts: u32,
}

impl GenerationConfig {
    /// Creates a default generation configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::GenerationConfig;
    ///
    /// let config = GenerationConfig::new(7);
    /// assert_eq!(config.seed, 7);
    /// assert!(config.validate().is_ok());
    /// ```
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            width: DEFAULT_MAP_WIDTH,
            height: DEFAULT_MAP_HEIGHT,
            fail_budget: DEFAULT_FAIL_BUDGET,
            corridor_bias: DEFAULT_CORRIDOR_BIAS,
            max_features: DEFAULT_MAX_FEATURES,
            fog_of_war: true,
            main_join_chance: 50,
            final_join_chance: 10,
            collision_portal_chance: 7,
            first_room_attempts: 1000,
            exit_attempts: 100,
        }
    }

    /// Creates a configuration for testing with smaller, simpler levels.
    pub fn for_testing(seed: u64) -> Self {
        Self {
            width: 40,
            height: 40,
            fail_budget: 150,
            corridor_bias: 30,
            max_features: 10,
            ..Self::new(seed)
        }
    }

    /// Checks that the configuration can produce a level.
    pub fn validate(&self) -> DelveResult<()> {
        if self.width < MIN_MAP_SIDE || self.height < MIN_MAP_SIDE {
            return Err(DelveError::InvalidConfig(format!(
                "map must be at least {}x{} to hold a room inside its border, got {}x{}",
                MIN_MAP_SIDE, MIN_MAP_SIDE, self.width, self.height
            )));
        }
        if self.width > MAX_MAP_SIDE || self.height > MAX_MAP_SIDE {
            return Err(DelveError::InvalidConfig(format!(
                "map sides are limited to {}, got {}x{}",
                MAX_MAP_SIDE, self.width, self.height
            )));
        }

        for (name, value) in [
            ("corridor_bias", self.corridor_bias),
            ("main_join_chance", self.main_join_chance),
            ("final_join_chance", self.final_join_chance),
            ("collision_portal_chance", self.collision_portal_chance),
        ] {
            if value > 100 {
                return Err(DelveError::InvalidConfig(format!(
                    "{} is a percentage, got {}",
                    name, value
                )));
            }
        }

        if self.first_room_attempts == 0 || self.exit_attempts == 0 {
            return Err(DelveError::InvalidConfig(
                "attempt caps must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self::new(42)
    }
}

/// Trait for procedural generators.
///
/// Generators are deterministic up to the random source they are handed.
pub trait Generator<T> {
    /// Generates content using the provided configuration and random number generator.
    fn generate(&self, config: &GenerationConfig, rng: &mut StdRng) -> DelveResult<T>;

    /// Validates that the generated content meets requirements.
    fn validate(&self, content: &T, config: &GenerationConfig) -> DelveResult<()>;

    /// Gets the generator type name for logging and debugging.
    fn generator_type(&self) -> &'static str;
}

/// Utility functions for generation algorithms.
pub mod utils {
    use super::*;
    use crate::{Grid, Position};
    use rand::SeedableRng;
    use std::collections::{HashSet, VecDeque};

    /// Creates a seeded random number generator from the config.
    pub fn create_rng(config: &GenerationConfig) -> StdRng {
        StdRng::seed_from_u64(config.seed)
    }

    /// Flood-fills walkable tiles from `start` over cardinal steps.
    ///
    /// Returns an empty set when `start` is off-grid or blocked.
    pub fn reachable_from(grid: &Grid, start: Position) -> HashSet<Position> {
        let mut visited = HashSet::new();
        if !grid.get(start).is_some_and(|tile| tile.is_walkable()) {
            return visited;
        }

        let mut queue = VecDeque::new();
        visited.insert(start);
        queue.push_back(start);

        while let Some(pos) = queue.pop_front() {
            for next in pos.cardinal_adjacent_positions() {
                if visited.contains(&next) {
                    continue;
                }
                if grid.get(next).is_some_and(|tile| tile.is_walkable()) {
                    visited.insert(next);
                    queue.push_back(next);
                }
            }
        }

        visited
    }

    /// Validates that a grid has somewhere to stand.
    pub fn validate_grid(grid: &Grid) -> DelveResult<()> {
        if grid.walkable_count() == 0 {
            return Err(DelveError::GenerationFailed(
                "Level has no floor tiles".to_string(),
            ));
        }
        Ok(())
    }
}

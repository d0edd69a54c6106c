//! # Vision Module
//!
//! Field of view and the per-tile visibility state the renderer draws from.
//!
//! A tile is in one of three states. It is `Visible` while inside the current
//! FOV, `Remembered` once it has been explored but has dropped out of view, and
//! `Unknown` before it has ever been seen. Exploration is sticky, so a tile never
//! goes back to `Unknown`.

pub mod fov;

pub use fov::*;

use crate::config::{DEFAULT_TORCH_RADIUS, DEFAULT_VIEWPORT_HEIGHT, DEFAULT_VIEWPORT_WIDTH};
use crate::{DelveError, DelveResult, Grid, Position};
use serde::{Deserialize, Serialize};

/// Viewport and sight settings for a level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Viewport width in tiles
    pub viewport_width: u32,
    /// Viewport height in tiles
    pub viewport_height: u32,
    /// Euclidean sight radius around the player
    pub torch_radius: u32,
    /// Whether the walls bounding the lit area are shown
    pub light_walls: bool,
}

impl ViewConfig {
    pub fn validate(&self) -> DelveResult<()> {
        if self.viewport_width == 0 || self.viewport_height == 0 {
            return Err(DelveError::InvalidConfig(format!(
                "viewport must be non-empty, got {}x{}",
                self.viewport_width, self.viewport_height
            )));
        }
        Ok(())
    }
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            viewport_width: DEFAULT_VIEWPORT_WIDTH,
            viewport_height: DEFAULT_VIEWPORT_HEIGHT,
            torch_radius: DEFAULT_TORCH_RADIUS,
            light_walls: true,
        }
    }
}

/// How a tile should be presented this turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileVisibility {
    /// Never seen; not drawn at all
    Unknown,
    /// Explored earlier but outside the current FOV; drawn dimmed
    Remembered,
    /// Inside the current FOV; drawn at full brightness
    Visible,
}

impl TileVisibility {
    /// Classifies `pos` from the current FOV and the grid's exploration memory.
    ///
    /// Off-map positions are `Unknown`.
    pub fn of(grid: &Grid, fov: &FovMap, pos: Position) -> Self {
        if fov.is_visible(pos) {
            TileVisibility::Visible
        } else if grid.get(pos).is_some_and(|tile| tile.explored()) {
            TileVisibility::Remembered
        } else {
            TileVisibility::Unknown
        }
    }

    pub fn is_drawn(self) -> bool {
        self != TileVisibility::Unknown
    }
}

//! # Level
//!
//! One dungeon level: the grid together with everything derived from it.
//!
//! A `Level` owns its grid, the placed features, the spawn index, the FOV map
//! and the camera. They are built in a fixed order (grid, then index, then FOV)
//! and rebuilt together when the player changes level; nothing is patched
//! incrementally.

use crate::{
    find_path, Camera, DelveResult, Direction, Feature, FeatureGenerator, FovMap,
    GenerationConfig, Generator, Grid, Occupant, Portal, Position, TileVisibility,
    UnblockedIndex, ViewConfig,
};
use log::{debug, info};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Everything needed to build and view a level.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelConfig {
    pub generation: GenerationConfig,
    pub view: ViewConfig,
}

impl LevelConfig {
    /// Loads a configuration from a JSON file. Missing fields take defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> DelveResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_json_str(&text)?;
        info!("Loaded level configuration from {}", path.as_ref().display());
        Ok(config)
    }

    pub fn from_json_str(json: &str) -> DelveResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> DelveResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> DelveResult<()> {
        self.generation.validate()?;
        self.view.validate()
    }
}

/// What sits under a viewport cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellDescription {
    pub position: Position,
    pub visibility: TileVisibility,
    /// `None` while the tile is still unknown
    pub blocked: Option<bool>,
}

/// A generated level and its derived views.
#[derive(Debug, Clone)]
pub struct Level {
    grid: Grid,
    features: Vec<Feature>,
    portals: Vec<Portal>,
    unblocked: UnblockedIndex,
    fov: FovMap,
    camera: Camera,
    view: ViewConfig,
    /// Where the current visible set was computed from
    fov_origin: Option<Position>,
}

impl Level {
    /// Generates a new level.
    pub fn generate(config: &LevelConfig, rng: &mut StdRng) -> DelveResult<Self> {
        config.validate()?;
        let dungeon = FeatureGenerator::new().generate(&config.generation, rng)?;
        let mut level = Self::from_grid(dungeon.grid, config.view.clone())?;
        level.features = dungeon.features;
        level.portals = dungeon.portals;
        Ok(level)
    }

    /// Wraps a finished grid, deriving the spawn index, FOV map and camera.
    pub fn from_grid(grid: Grid, view: ViewConfig) -> DelveResult<Self> {
        view.validate()?;
        let unblocked = UnblockedIndex::rebuild(&grid)?;
        let fov = FovMap::from_grid(&grid);
        let camera = Camera::new(
            grid.width(),
            grid.height(),
            view.viewport_width,
            view.viewport_height,
        )?;

        Ok(Self {
            grid,
            features: Vec::new(),
            portals: Vec::new(),
            unblocked,
            fov,
            camera,
            view,
            fov_origin: None,
        })
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Placed rooms and corridors. The first entry is the seed room.
    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    pub fn portals(&self) -> &[Portal] {
        &self.portals
    }

    pub fn unblocked(&self) -> &UnblockedIndex {
        &self.unblocked
    }

    pub fn fov(&self) -> &FovMap {
        &self.fov
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn view(&self) -> &ViewConfig {
        &self.view
    }

    /// Re-centres the camera on the player and refreshes the FOV if needed.
    ///
    /// The FOV is recomputed when the camera moved, the player is somewhere other
    /// than the last FOV origin, or something invalidated it. Every tile it
    /// lights is marked explored. Returns whether a recompute happened.
    pub fn update_view(&mut self, player: Position) -> DelveResult<bool> {
        self.camera.move_to(player);
        if self.fov_origin != Some(player) {
            self.camera.mark_fov_dirty();
        }
        if !self.camera.needs_fov_recompute() {
            return Ok(false);
        }

        self.fov
            .compute(player, self.view.torch_radius, self.view.light_walls)?;
        for pos in self.fov.visible_positions() {
            self.grid.mark_explored(pos)?;
        }
        self.fov_origin = Some(player);
        self.camera.clear_fov_dirty();
        debug!("View refreshed around {}", player);
        Ok(true)
    }

    /// Forces the next [`Level::update_view`] to recompute the FOV.
    pub fn invalidate_fov(&mut self) {
        self.camera.mark_fov_dirty();
    }

    pub fn is_visible(&self, pos: Position) -> bool {
        self.fov.is_visible(pos)
    }

    pub fn visibility(&self, pos: Position) -> TileVisibility {
        TileVisibility::of(&self.grid, &self.fov, pos)
    }

    /// Picks a random walkable tile.
    pub fn spawn_point(&self, rng: &mut StdRng) -> Position {
        self.unblocked.sample(rng)
    }

    /// Moves one tile from `from` if the target is walkable and free.
    ///
    /// Returns the resulting position, which is `from` when the move was refused.
    /// A successful move invalidates the FOV.
    pub fn step(&mut self, from: Position, direction: Direction, occupants: &[Occupant]) -> Position {
        let target = from.step(direction);
        let occupied = occupants
            .iter()
            .any(|occupant| occupant.blocks && occupant.position == target);

        if !self.fov.is_walkable(target) || occupied {
            return from;
        }

        self.invalidate_fov();
        target
    }

    /// Finds a path for a mover at `from` towards `to`.
    ///
    /// Blocking occupants are routed around, except those standing on `from` or
    /// `to`. The query runs on a scratch copy of the FOV map.
    pub fn path_to(
        &self,
        from: Position,
        to: Position,
        occupants: &[Occupant],
    ) -> Option<Vec<Position>> {
        let scratch = self.fov.with_occupants(occupants, &[from, to]);
        find_path(&scratch, from, to)
    }

    /// Describes the map tile under a viewport cell, if it is on the map.
    pub fn describe_screen_cell(&self, screen: Position) -> Option<CellDescription> {
        let position = self.camera.to_map(screen);
        let tile = self.grid.get(position)?;
        let visibility = self.visibility(position);
        Some(CellDescription {
            position,
            visibility,
            blocked: visibility.is_drawn().then_some(tile.blocked()),
        })
    }
}

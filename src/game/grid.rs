//! # Tile Grid
//!
//! The 2D tile grid every other subsystem reads. Tiles start out blocked and are
//! opened up by the generator; exploration is recorded by the vision pass.

use crate::{DelveError, DelveResult, Position};
use serde::{Deserialize, Serialize};

/// A single grid cell.
///
/// `explored` only ever goes from `false` to `true` for the lifetime of a grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    blocked: bool,
    blocks_sight: bool,
    explored: bool,
}

impl Tile {
    /// Creates a tile whose sight blocking follows `blocked`.
    ///
    /// With fog of war disabled every tile starts out explored.
    pub fn new(blocked: bool, fog_of_war: bool) -> Self {
        Self {
            blocked,
            blocks_sight: blocked,
            explored: !fog_of_war,
        }
    }

    /// Creates a tile with independent movement and sight blocking.
    pub fn with_sight(blocked: bool, blocks_sight: bool, fog_of_war: bool) -> Self {
        Self {
            blocked,
            blocks_sight,
            explored: !fog_of_war,
        }
    }

    /// Impassable to movement.
    pub fn blocked(&self) -> bool {
        self.blocked
    }

    /// Opaque to line of sight.
    pub fn blocks_sight(&self) -> bool {
        self.blocks_sight
    }

    /// Seen by the player at least once.
    pub fn explored(&self) -> bool {
        self.explored
    }

    /// Whether the tile can be walked on.
    pub fn is_walkable(&self) -> bool {
        !self.blocked
    }

    fn set_open(&mut self) {
        self.blocked = false;
        self.blocks_sight = false;
    }

    fn set_solid(&mut self) {
        self.blocked = true;
        self.blocks_sight = true;
    }
}

/// Row-major tile storage with bounds-checked access.
///
/// Every accessor that takes a [`Position`] either returns `Option`/`bool` for
/// questions that have an answer off-grid, or `DelveError::OutOfRange`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    width: u32,
    height: u32,
    fog_of_war: bool,
    tiles: Vec<Tile>,
}

impl Grid {
    /// Allocates a `width × height` grid with every tile blocked.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::{Grid, Position};
    ///
    /// let grid = Grid::new(10, 8, true).unwrap();
    /// assert_eq!(grid.width(), 10);
    /// assert!(grid.tile(Position::new(3, 3)).unwrap().blocked());
    /// assert!(Grid::new(0, 8, true).is_err());
    /// ```
    pub fn new(width: u32, height: u32, fog_of_war: bool) -> DelveResult<Self> {
        if width == 0 || height == 0 {
            return Err(DelveError::InvalidConfig(format!(
                "grid dimensions must be positive, got {}x{}",
                width, height
            )));
        }
        if width > i32::MAX as u32 || height > i32::MAX as u32 {
            return Err(DelveError::InvalidConfig(format!(
                "grid dimensions {}x{} exceed the coordinate range",
                width, height
            )));
        }

        Ok(Self {
            width,
            height,
            fog_of_war,
            tiles: vec![Tile::new(true, fog_of_war); (width as usize) * (height as usize)],
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Whether tiles were created unexplored.
    pub fn fog_of_war(&self) -> bool {
        self.fog_of_war
    }

    /// Checks if a position lies on the grid.
    pub fn contains(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width as i32 && pos.y < self.height as i32
    }

    /// Checks if a position has all four cardinal neighbours on the grid.
    pub fn has_margin(&self, pos: Position) -> bool {
        pos.x >= 1
            && pos.y >= 1
            && pos.x < self.width as i32 - 1
            && pos.y < self.height as i32 - 1
    }

    fn index(&self, pos: Position) -> DelveResult<usize> {
        if self.contains(pos) {
            Ok(pos.y as usize * self.width as usize + pos.x as usize)
        } else {
            Err(self.out_of_range(pos))
        }
    }

    pub(crate) fn out_of_range(&self, pos: Position) -> DelveError {
        DelveError::OutOfRange {
            x: pos.x,
            y: pos.y,
            width: self.width,
            height: self.height,
        }
    }

    /// Returns the tile at `pos`.
    pub fn tile(&self, pos: Position) -> DelveResult<&Tile> {
        let index = self.index(pos)?;
        Ok(&self.tiles[index])
    }

    /// Returns the tile at `pos`, or `None` when off-grid.
    pub fn get(&self, pos: Position) -> Option<&Tile> {
        self.index(pos).ok().map(|index| &self.tiles[index])
    }

    /// Replaces the tile at `pos`.
    pub fn set_tile(&mut self, pos: Position, tile: Tile) -> DelveResult<()> {
        let index = self.index(pos)?;
        self.tiles[index] = tile;
        Ok(())
    }

    /// Makes `pos` walkable and transparent.
    pub fn carve_floor(&mut self, pos: Position) -> DelveResult<()> {
        let index = self.index(pos)?;
        self.tiles[index].set_open();
        Ok(())
    }

    /// Makes `pos` blocked and opaque.
    pub fn raise_wall(&mut self, pos: Position) -> DelveResult<()> {
        let index = self.index(pos)?;
        self.tiles[index].set_solid();
        Ok(())
    }

    /// Records that the player has seen `pos`. Never clears the flag.
    pub fn mark_explored(&mut self, pos: Position) -> DelveResult<()> {
        let index = self.index(pos)?;
        self.tiles[index].explored = true;
        Ok(())
    }

    /// Whether the tile at `pos` is impassable.
    pub fn is_blocked(&self, pos: Position) -> DelveResult<bool> {
        Ok(self.tile(pos)?.blocked())
    }

    /// Whether the tile at `pos` is opaque.
    pub fn blocks_sight(&self, pos: Position) -> DelveResult<bool> {
        Ok(self.tile(pos)?.blocks_sight())
    }

    /// Iterates every position in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        let width = self.width as i32;
        (0..self.height as i32).flat_map(move |y| (0..width).map(move |x| Position::new(x, y)))
    }

    /// Iterates positions with their tiles in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (Position, &Tile)> + '_ {
        self.positions().zip(self.tiles.iter())
    }

    /// Number of walkable tiles.
    pub fn walkable_count(&self) -> usize {
        self.tiles.iter().filter(|tile| tile.is_walkable()).count()
    }
}

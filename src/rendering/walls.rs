//! # Wall Glyphs
//!
//! Picks a line-drawing character for a wall tile from its four cardinal
//! neighbours, so wall runs read as connected lines on screen.

use crate::{DelveResult, Direction, Grid, Position};
use serde::{Deserialize, Serialize};

/// Decorative shapes a wall tile can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WallGlyph {
    /// All four neighbours are wall
    Junction,
    /// Three neighbours are wall: the tile is buried and drawn blank
    Hidden,
    /// North and south are wall
    Vertical,
    /// East and west are wall
    Horizontal,
    /// Two perpendicular neighbours are wall
    Corner,
    /// Isolated, or a dead end
    Pillar,
}

impl WallGlyph {
    pub fn to_char(self) -> char {
        match self {
            WallGlyph::Junction => '+',
            WallGlyph::Hidden => ' ',
            WallGlyph::Vertical => '|',
            WallGlyph::Horizontal => '-',
            WallGlyph::Corner => 'o',
            WallGlyph::Pillar => '#',
        }
    }
}

/// Which cardinal neighbours block sight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct WallNeighbors {
    pub north: bool,
    pub south: bool,
    pub east: bool,
    pub west: bool,
}

impl WallNeighbors {
    /// Reads the pattern around `pos`, which must have a one-tile margin.
    pub fn around(grid: &Grid, pos: Position) -> DelveResult<Self> {
        if !grid.has_margin(pos) {
            return Err(grid.out_of_range(pos));
        }
        Ok(Self {
            north: grid.blocks_sight(pos.step(Direction::North))?,
            south: grid.blocks_sight(pos.step(Direction::South))?,
            east: grid.blocks_sight(pos.step(Direction::East))?,
            west: grid.blocks_sight(pos.step(Direction::West))?,
        })
    }

    /// Builds the pattern from a 4-bit mask: N = 1, S = 2, E = 4, W = 8.
    pub fn from_bits(bits: u8) -> Self {
        Self {
            north: bits & 1 != 0,
            south: bits & 2 != 0,
            east: bits & 4 != 0,
            west: bits & 8 != 0,
        }
    }

    pub fn count(&self) -> usize {
        [self.north, self.south, self.east, self.west]
            .iter()
            .filter(|&&wall| wall)
            .count()
    }
}

/// Chooses the glyph for a neighbour pattern. First matching rule wins.
pub fn glyph_for(n: WallNeighbors) -> WallGlyph {
    if n.count() == 4 {
        return WallGlyph::Junction;
    }
    if n.count() == 3 {
        return WallGlyph::Hidden;
    }

    match (n.north, n.south, n.east, n.west) {
        (true, true, false, false) => WallGlyph::Vertical,
        (false, false, true, true) => WallGlyph::Horizontal,
        (true, false, false, true)
        | (true, false, true, false)
        | (false, true, true, false)
        | (false, true, false, true) => WallGlyph::Corner,
        _ => WallGlyph::Pillar,
    }
}

/// Glyph for the wall tile at `pos`.
///
/// Fails with `OutOfRange` when `pos` lacks a one-tile margin inside the grid,
/// since a neighbour would fall off the map.
///
/// # Examples
///
/// ```
/// use delve::{wall_glyph, Grid, Position, WallGlyph};
///
/// let grid = Grid::new(5, 5, true).unwrap();
/// assert_eq!(wall_glyph(&grid, Position::new(2, 2)).unwrap(), WallGlyph::Junction);
/// assert!(wall_glyph(&grid, Position::new(0, 2)).is_err());
/// ```
pub fn wall_glyph(grid: &Grid, pos: Position) -> DelveResult<WallGlyph> {
    WallNeighbors::around(grid, pos).map(glyph_for)
}

//! # Spawn Index
//!
//! Every walkable coordinate of a finished grid, kept for uniform spawn sampling.

use crate::{DelveError, DelveResult, Grid, Position};
use log::debug;
use rand::{rngs::StdRng, Rng};

/// Walkable coordinates of one grid in row-major order.
///
/// The index is a snapshot. It is rebuilt from scratch whenever a new grid is
/// generated and never patched in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnblockedIndex {
    positions: Vec<Position>,
}

impl UnblockedIndex {
    /// Scans `grid` once and collects every walkable tile.
    ///
    /// A fully solid grid yields [`DelveError::EmptyIndex`].
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::{Grid, Position, UnblockedIndex};
    ///
    /// let mut grid = Grid::new(5, 5, true).unwrap();
    /// assert!(UnblockedIndex::rebuild(&grid).is_err());
    ///
    /// grid.carve_floor(Position::new(2, 2)).unwrap();
    /// let index = UnblockedIndex::rebuild(&grid).unwrap();
    /// assert_eq!(index.len(), 1);
    /// ```
    pub fn rebuild(grid: &Grid) -> DelveResult<Self> {
        let positions: Vec<Position> = grid
            .iter()
            .filter(|(_, tile)| tile.is_walkable())
            .map(|(pos, _)| pos)
            .collect();

        if positions.is_empty() {
            return Err(DelveError::EmptyIndex);
        }

        debug!("Indexed {} walkable tiles", positions.len());
        Ok(Self { positions })
    }

    /// Picks a uniformly random walkable position.
    pub fn sample(&self, rng: &mut StdRng) -> Position {
        self.positions[rng.gen_range(0..self.positions.len())]
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Always false for a successfully rebuilt index.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn contains(&self, pos: Position) -> bool {
        self.positions.binary_search_by_key(&(pos.y, pos.x), |p| (p.y, p.x)).is_ok()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Position> {
        self.positions.iter()
    }

    pub fn as_slice(&self) -> &[Position] {
        &self.positions
    }
}

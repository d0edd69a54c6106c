//! # Field of View
//!
//! Recursive shadowcasting over a transparency map.
//!
//! The map is scanned one octant at a time. Each octant walks outward row by
//! row; an opaque tile splits the lit arc and the part behind it is scanned
//! recursively with a narrower slope window. Distance is Euclidean: a tile is a
//! candidate only when `dx² + dy² <= radius²`.

use crate::{DelveError, DelveResult, Grid, Occupant, Position};
use log::debug;

/// Per-tile properties the FOV and path queries read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FovCell {
    pub transparent: bool,
    pub walkable: bool,
}

/// Octant transforms from (column, row) scan space to map offsets.
const OCTANTS: [[i32; 4]; 8] = [
    [1, 0, 0, 1],
    [0, 1, 1, 0],
    [0, 1, -1, 0],
    [1, 0, 0, -1],
    [-1, 0, 0, -1],
    [0, -1, -1, 0],
    [0, -1, 1, 0],
    [-1, 0, 0, 1],
];

/// Transparency and walkability of one level, plus the latest visible set.
///
/// Built from a [`Grid`] when a level is created and rebuilt with it; the set of
/// visible tiles is replaced wholesale by every [`FovMap::compute`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FovMap {
    width: u32,
    height: u32,
    cells: Vec<FovCell>,
    visible: Vec<bool>,
}

impl FovMap {
    /// Creates a map where every tile is opaque and impassable.
    pub fn new(width: u32, height: u32) -> DelveResult<Self> {
        if width == 0 || height == 0 {
            return Err(DelveError::InvalidConfig(format!(
                "FOV map dimensions must be positive, got {}x{}",
                width, height
            )));
        }
        let size = (width as usize) * (height as usize);
        Ok(Self {
            width,
            height,
            cells: vec![
                FovCell {
                    transparent: false,
                    walkable: false,
                };
                size
            ],
            visible: vec![false; size],
        })
    }

    /// Derives transparency from `!blocks_sight` and walkability from `!blocked`.
    pub fn from_grid(grid: &Grid) -> Self {
        Self {
            width: grid.width(),
            height: grid.height(),
            cells: grid
                .iter()
                .map(|(_, tile)| FovCell {
                    transparent: !tile.blocks_sight(),
                    walkable: !tile.blocked(),
                })
                .collect(),
            visible: vec![false; (grid.width() as usize) * (grid.height() as usize)],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width as i32 && pos.y < self.height as i32
    }

    fn index(&self, pos: Position) -> Option<usize> {
        if self.contains(pos) {
            Some(pos.y as usize * self.width as usize + pos.x as usize)
        } else {
            None
        }
    }

    fn out_of_range(&self, pos: Position) -> DelveError {
        DelveError::OutOfRange {
            x: pos.x,
            y: pos.y,
            width: self.width,
            height: self.height,
        }
    }

    /// Overrides the properties of one tile.
    pub fn set_properties(
        &mut self,
        pos: Position,
        transparent: bool,
        walkable: bool,
    ) -> DelveResult<()> {
        let index = self.index(pos).ok_or_else(|| self.out_of_range(pos))?;
        self.cells[index] = FovCell {
            transparent,
            walkable,
        };
        Ok(())
    }

    /// Off-map tiles are opaque.
    pub fn is_transparent(&self, pos: Position) -> bool {
        self.index(pos).is_some_and(|i| self.cells[i].transparent)
    }

    /// Off-map tiles are not walkable.
    pub fn is_walkable(&self, pos: Position) -> bool {
        self.index(pos).is_some_and(|i| self.cells[i].walkable)
    }

    /// Whether `pos` was lit by the last compute. Off-map tiles never are.
    pub fn is_visible(&self, pos: Position) -> bool {
        self.index(pos).is_some_and(|i| self.visible[i])
    }

    /// Every tile lit by the last compute, in row-major order.
    pub fn visible_positions(&self) -> Vec<Position> {
        let width = self.width as usize;
        self.visible
            .iter()
            .enumerate()
            .filter(|(_, &lit)| lit)
            .map(|(i, _)| Position::new((i % width) as i32, (i / width) as i32))
            .collect()
    }

    /// Recomputes the visible set from `origin`.
    ///
    /// The origin is always visible. With `light_walls` the opaque tiles that
    /// bound the lit area are visible too; without it only transparent tiles are.
    /// A radius of zero lights the origin alone.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::{FovMap, Position};
    ///
    /// let mut fov = FovMap::new(9, 9).unwrap();
    /// for y in 1..8 {
    ///     for x in 1..8 {
    ///         fov.set_properties(Position::new(x, y), true, true).unwrap();
    ///     }
    /// }
    /// fov.compute(Position::new(4, 4), 10, true).unwrap();
    /// assert!(fov.is_visible(Position::new(1, 7)));
    /// assert!(fov.is_visible(Position::new(0, 0)));
    /// ```
    pub fn compute(&mut self, origin: Position, radius: u32, light_walls: bool) -> DelveResult<()> {
        let origin_index = self.index(origin).ok_or_else(|| self.out_of_range(origin))?;

        self.visible.iter_mut().for_each(|lit| *lit = false);
        self.visible[origin_index] = true;

        let radius = radius.min(i32::MAX as u32) as i32;
        if radius > 0 {
            for transform in &OCTANTS {
                self.cast_light(origin, radius, 1, 1.0, 0.0, transform, light_walls);
            }
        }

        debug!(
            "FOV from {} radius {}: {} tiles visible",
            origin,
            radius,
            self.visible.iter().filter(|&&lit| lit).count()
        );
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn cast_light(
        &mut self,
        origin: Position,
        radius: i32,
        row: i32,
        mut start_slope: f64,
        end_slope: f64,
        transform: &[i32; 4],
        light_walls: bool,
    ) {
        if start_slope < end_slope {
            return;
        }
        let radius_squared = radius as i64 * radius as i64;
        let mut next_start_slope = start_slope;

        for distance in row..=radius {
            let mut blocked = false;
            let dy = -distance;

            for dx in dy..=0 {
                let left_slope = (dx as f64 - 0.5) / (dy as f64 + 0.5);
                let right_slope = (dx as f64 + 0.5) / (dy as f64 - 0.5);

                if start_slope < right_slope {
                    continue;
                }
                if end_slope > left_slope {
                    break;
                }

                let pos = Position::new(
                    origin.x + dx * transform[0] + dy * transform[1],
                    origin.y + dx * transform[2] + dy * transform[3],
                );
                let opaque = !self.is_transparent(pos);

                let in_radius = (dx as i64 * dx as i64 + dy as i64 * dy as i64) <= radius_squared;
                if in_radius && (light_walls || !opaque) {
                    if let Some(index) = self.index(pos) {
                        self.visible[index] = true;
                    }
                }

                if blocked {
                    if opaque {
                        next_start_slope = right_slope;
                    } else {
                        blocked = false;
                        start_slope = next_start_slope;
                    }
                } else if opaque && distance < radius {
                    blocked = true;
                    self.cast_light(
                        origin,
                        radius,
                        distance + 1,
                        start_slope,
                        left_slope,
                        transform,
                        light_walls,
                    );
                    next_start_slope = right_slope;
                }
            }

            if blocked {
                break;
            }
        }
    }

    /// Returns a scratch copy with blocking occupants marked impassable.
    ///
    /// Occupants standing on any of the `exempt` positions are skipped, so a path
    /// query can start on the mover and end on its target. `self` is untouched.
    pub fn with_occupants(&self, occupants: &[Occupant], exempt: &[Position]) -> FovMap {
        let mut scratch = self.clone();
        for occupant in occupants {
            if !occupant.blocks || exempt.contains(&occupant.position) {
                continue;
            }
            if let Some(index) = scratch.index(occupant.position) {
                scratch.cells[index].walkable = false;
            }
        }
        scratch
    }
}

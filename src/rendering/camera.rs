//! # Camera
//!
//! Maps between map coordinates and viewport coordinates.
//!
//! The camera stores the map coordinate shown in the viewport's top-left cell.
//! The mapping is a plain integer translation with no scaling.

use crate::{DelveError, DelveResult, Position};
use log::trace;

/// A scrolling viewport over a fixed-size map.
///
/// The camera also carries the dirty flag that gates FOV recomputation. It
/// starts dirty so the first frame always computes a field of view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Camera {
    position: Position,
    map_width: u32,
    map_height: u32,
    viewport_width: u32,
    viewport_height: u32,
    fov_dirty: bool,
}

impl Camera {
    /// Creates a camera at the map origin.
    ///
    /// A viewport with a zero side is rejected.
    pub fn new(
        map_width: u32,
        map_height: u32,
        viewport_width: u32,
        viewport_height: u32,
    ) -> DelveResult<Self> {
        if viewport_width == 0 || viewport_height == 0 {
            return Err(DelveError::InvalidConfig(format!(
                "viewport must be non-empty, got {}x{}",
                viewport_width, viewport_height
            )));
        }
        if map_width > i32::MAX as u32
            || map_height > i32::MAX as u32
            || viewport_width > i32::MAX as u32
            || viewport_height > i32::MAX as u32
        {
            return Err(DelveError::InvalidConfig(
                "camera dimensions exceed the coordinate range".to_string(),
            ));
        }

        Ok(Self {
            position: Position::origin(),
            map_width,
            map_height,
            viewport_width,
            viewport_height,
            fov_dirty: true,
        })
    }

    /// Map coordinate of the viewport's top-left cell.
    pub fn position(&self) -> Position {
        self.position
    }

    pub fn viewport_width(&self) -> u32 {
        self.viewport_width
    }

    pub fn viewport_height(&self) -> u32 {
        self.viewport_height
    }

    /// Re-centres the viewport on `target`.
    ///
    /// Each axis is placed at `target - viewport / 2` and then clamped to
    /// `0..=map - viewport - 1`. When the viewport is at least as large as the map
    /// the lower bound wins and the axis stays at 0. The FOV flag is raised only
    /// when the top-left actually moves; the return value reports that.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::{Camera, Position};
    ///
    /// let mut camera = Camera::new(80, 40, 20, 10).unwrap();
    /// camera.move_to(Position::new(40, 20));
    /// assert_eq!(camera.position(), Position::new(30, 15));
    /// assert!(!camera.move_to(Position::new(40, 20)));
    /// ```
    pub fn move_to(&mut self, target: Position) -> bool {
        let x = Self::clamp_axis(target.x, self.viewport_width, self.map_width);
        let y = Self::clamp_axis(target.y, self.viewport_height, self.map_height);
        let next = Position::new(x, y);

        if next == self.position {
            return false;
        }

        trace!("Camera moved from {} to {}", self.position, next);
        self.position = next;
        self.fov_dirty = true;
        true
    }

    fn clamp_axis(target: i32, viewport: u32, map: u32) -> i32 {
        let upper = map as i64 - viewport as i64 - 1;
        let centred = target as i64 - (viewport / 2) as i64;
        centred.min(upper).max(0) as i32
    }

    /// Translates a map coordinate to the viewport.
    ///
    /// Returns `None` when the coordinate is not inside the viewport; such tiles
    /// are simply not drawn.
    pub fn to_screen(&self, map_pos: Position) -> Option<Position> {
        let screen = map_pos - self.position;
        let inside = screen.x >= 0
            && screen.y >= 0
            && screen.x < self.viewport_width as i32
            && screen.y < self.viewport_height as i32;
        inside.then_some(screen)
    }

    /// Translates a viewport coordinate back to the map.
    ///
    /// No bounds check is applied; callers validate the result against the grid.
    pub fn to_map(&self, screen_pos: Position) -> Position {
        self.position + screen_pos
    }

    pub fn needs_fov_recompute(&self) -> bool {
        self.fov_dirty
    }

    /// Requests a recompute on the next view update.
    pub fn mark_fov_dirty(&mut self) {
        self.fov_dirty = true;
    }

    /// Clears the request. Call only right after the FOV has been recomputed.
    pub fn clear_fov_dirty(&mut self) {
        self.fov_dirty = false;
    }
}

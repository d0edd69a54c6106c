//! # Display
//!
//! Text rendering of the viewport.
//!
//! The renderer walks every viewport cell, translates it to the map through the
//! camera and classifies the tile as visible, remembered or unknown. Walls are
//! drawn with their junction glyph and floors with `.`; overlays such as the
//! player or stairs are drawn on top.

use crate::{wall_glyph, DelveResult, Level, Position, TileVisibility, WallGlyph};

/// Floor glyph
pub const FLOOR_GLYPH: char = '.';

/// ANSI sequence used for remembered cells
const DIM: &str = "\x1b[2m";
const RESET: &str = "\x1b[0m";

/// One viewport cell as the player should see it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewCell {
    /// Never seen, or off the map
    Unknown,
    /// Seen before, drawn dimmed
    Remembered(char),
    /// In view, drawn at full brightness
    Visible(char),
}

impl ViewCell {
    pub fn glyph(self) -> char {
        match self {
            ViewCell::Unknown => ' ',
            ViewCell::Remembered(glyph) | ViewCell::Visible(glyph) => glyph,
        }
    }
}

/// A glyph drawn over the map, such as a creature or a stair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Overlay {
    pub position: Position,
    pub glyph: char,
    /// Still drawn when the tile is only remembered
    pub always_visible: bool,
}

impl Overlay {
    pub fn new(position: Position, glyph: char) -> Self {
        Self {
            position,
            glyph,
            always_visible: false,
        }
    }

    /// Marks the overlay as a fixture that stays drawn once discovered.
    pub fn fixture(position: Position, glyph: char) -> Self {
        Self {
            position,
            glyph,
            always_visible: true,
        }
    }
}

/// A rendered viewport, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewFrame {
    width: u32,
    height: u32,
    cells: Vec<ViewCell>,
}

impl ViewFrame {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Cell at a viewport coordinate.
    pub fn cell(&self, screen: Position) -> Option<ViewCell> {
        if screen.x < 0
            || screen.y < 0
            || screen.x >= self.width as i32
            || screen.y >= self.height as i32
        {
            return None;
        }
        Some(self.cells[screen.y as usize * self.width as usize + screen.x as usize])
    }

    pub fn rows(&self) -> impl Iterator<Item = &[ViewCell]> {
        self.cells.chunks(self.width as usize)
    }

    /// Plain text, one line per row, without styling.
    pub fn to_plain_string(&self) -> String {
        let mut out = String::with_capacity(self.cells.len() + self.height as usize);
        for row in self.rows() {
            out.extend(row.iter().map(|cell| cell.glyph()));
            out.push('\n');
        }
        out
    }

    /// Text with remembered cells wrapped in ANSI dim sequences.
    pub fn to_ansi_string(&self) -> String {
        let mut out = String::new();
        for row in self.rows() {
            let mut dimmed = false;
            for cell in row {
                let want_dim = matches!(cell, ViewCell::Remembered(_));
                if want_dim != dimmed {
                    out.push_str(if want_dim { DIM } else { RESET });
                    dimmed = want_dim;
                }
                out.push(cell.glyph());
            }
            if dimmed {
                out.push_str(RESET);
            }
            out.push('\n');
        }
        out
    }
}

/// Text renderer for a level's viewport.
#[derive(Debug, Clone, Default)]
pub struct TextDisplay;

impl TextDisplay {
    pub fn new() -> Self {
        Self
    }

    /// Renders the current viewport of `level`.
    ///
    /// Call after [`Level::update_view`] so the visible set is current.
    pub fn render(&self, level: &Level, overlays: &[Overlay]) -> DelveResult<ViewFrame> {
        let camera = level.camera();
        let (width, height) = (camera.viewport_width(), camera.viewport_height());
        let mut cells = Vec::with_capacity((width as usize) * (height as usize));

        for screen_y in 0..height as i32 {
            for screen_x in 0..width as i32 {
                let map_pos = camera.to_map(Position::new(screen_x, screen_y));
                cells.push(self.render_cell(level, map_pos)?);
            }
        }

        let mut frame = ViewFrame {
            width,
            height,
            cells,
        };

        for overlay in overlays {
            let Some(screen) = camera.to_screen(overlay.position) else {
                continue;
            };
            let index = screen.y as usize * width as usize + screen.x as usize;
            frame.cells[index] = match level.visibility(overlay.position) {
                TileVisibility::Visible => ViewCell::Visible(overlay.glyph),
                TileVisibility::Remembered if overlay.always_visible => {
                    ViewCell::Remembered(overlay.glyph)
                }
                _ => continue,
            };
        }

        Ok(frame)
    }

    fn render_cell(&self, level: &Level, map_pos: Position) -> DelveResult<ViewCell> {
        let Some(tile) = level.grid().get(map_pos) else {
            return Ok(ViewCell::Unknown);
        };

        let visibility = level.visibility(map_pos);
        if !visibility.is_drawn() {
            return Ok(ViewCell::Unknown);
        }

        let glyph = if tile.blocks_sight() {
            if level.grid().has_margin(map_pos) {
                wall_glyph(level.grid(), map_pos)?.to_char()
            } else {
                WallGlyph::Pillar.to_char()
            }
        } else {
            FLOOR_GLYPH
        };

        Ok(match visibility {
            TileVisibility::Visible => ViewCell::Visible(glyph),
            _ => ViewCell::Remembered(glyph),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Direction, Grid, ViewConfig};

    fn corridor_level() -> Level {
        let mut grid = Grid::new(20, 5, true).unwrap();
        for x in 1..19 {
            grid.carve_floor(Position::new(x, 2)).unwrap();
        }
        let view = ViewConfig {
            viewport_width: 20,
            viewport_height: 5,
            torch_radius: 2,
            light_walls: true,
        };
        Level::from_grid(grid, view).unwrap()
    }

    #[test]
    fn test_render_three_states() {
        let mut level = corridor_level();
        level.update_view(Position::new(2, 2)).unwrap();
        let frame = TextDisplay::new().render(&level, &[]).unwrap();

        assert_eq!(frame.cell(Position::new(2, 2)), Some(ViewCell::Visible('.')));
        // Rock above the wall makes it a three-sided junction.
        assert_eq!(
            frame.cell(Position::new(2, 1)),
            Some(ViewCell::Visible(WallGlyph::Hidden.to_char()))
        );
        assert_eq!(frame.cell(Position::new(2, 0)), Some(ViewCell::Unknown));
        assert_eq!(frame.cell(Position::new(10, 2)), Some(ViewCell::Unknown));

        let mut player = Position::new(2, 2);
        for _ in 0..8 {
            player = level.step(player, Direction::East, &[]);
            level.update_view(player).unwrap();
        }
        let frame = TextDisplay::new().render(&level, &[]).unwrap();
        assert_eq!(frame.cell(Position::new(2, 2)), Some(ViewCell::Remembered('.')));
        assert_eq!(frame.cell(Position::new(10, 2)), Some(ViewCell::Visible('.')));
    }

    #[test]
    fn test_overlays_follow_visibility() {
        let mut level = corridor_level();
        level.update_view(Position::new(2, 2)).unwrap();
        let overlays = [
            Overlay::new(Position::new(2, 2), '@'),
            Overlay::new(Position::new(15, 2), 'g'),
        ];
        let frame = TextDisplay::new().render(&level, &overlays).unwrap();
        assert_eq!(frame.cell(Position::new(2, 2)), Some(ViewCell::Visible('@')));
        assert_eq!(frame.cell(Position::new(15, 2)), Some(ViewCell::Unknown));
    }

    #[test]
    fn test_fixture_overlay_stays_remembered() {
        let mut level = corridor_level();
        level.update_view(Position::new(2, 2)).unwrap();

        let stair = Overlay::fixture(Position::new(3, 2), '>');
        let goblin = Overlay::new(Position::new(1, 2), 'g');

        let mut player = Position::new(2, 2);
        for _ in 0..10 {
            player = level.step(player, Direction::East, &[]);
            level.update_view(player).unwrap();
        }

        let frame = TextDisplay::new().render(&level, &[stair, goblin]).unwrap();
        assert_eq!(frame.cell(Position::new(3, 2)), Some(ViewCell::Remembered('>')));
        assert_eq!(frame.cell(Position::new(1, 2)), Some(ViewCell::Remembered('.')));
    }

    #[test]
    fn test_plain_and_ansi_output() {
        let mut level = corridor_level();
        level.update_view(Position::new(2, 2)).unwrap();
        let frame = TextDisplay::new().render(&level, &[]).unwrap();

        let plain = frame.to_plain_string();
        assert_eq!(plain.lines().count(), 5);
        assert!(plain.lines().all(|line| line.chars().count() == 20));
        assert!(!frame.to_ansi_string().contains(DIM));

        for x in 1..6 {
            level.step(Position::new(x, 2), Direction::East, &[]);
        }
        level.update_view(Position::new(6, 2)).unwrap();
        let frame = TextDisplay::new().render(&level, &[]).unwrap();
        assert!(frame.to_ansi_string().contains(DIM));
    }
}

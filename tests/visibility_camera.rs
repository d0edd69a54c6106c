//! Visibility, camera and wall-glyph behaviour across whole levels.

use delve::generation::utils::create_rng;
use delve::{
    glyph_for, wall_glyph, Camera, Direction, GenerationConfig, Grid, Level, LevelConfig,
    Position, TileVisibility, ViewConfig, WallGlyph, WallNeighbors,
};
use proptest::prelude::*;
use rand::Rng;

fn generated_level(seed: u64) -> Level {
    let config = LevelConfig {
        generation: GenerationConfig::for_testing(seed),
        view: ViewConfig::default(),
    };
    Level::generate(&config, &mut create_rng(&config.generation)).unwrap()
}

#[test]
fn test_wall_above_centre_room_is_hidden() {
    let mut grid = Grid::new(10, 10, true).unwrap();
    for y in 4..=6 {
        for x in 4..=6 {
            grid.carve_floor(Position::new(x, y)).unwrap();
        }
    }
    let glyph = wall_glyph(&grid, Position::new(5, 3)).unwrap();
    assert_eq!(glyph, WallGlyph::Hidden);
    assert_ne!(glyph, WallGlyph::Junction);
}

#[test]
fn test_every_rendered_wall_has_a_glyph() {
    let level = generated_level(5);
    for (pos, tile) in level.grid().iter() {
        if tile.blocks_sight() && level.grid().has_margin(pos) {
            assert!(wall_glyph(level.grid(), pos).is_ok());
        }
    }
}

#[test]
fn test_explored_is_monotonic_over_a_walk() {
    let mut level = generated_level(77);
    let mut rng = create_rng(&GenerationConfig::new(77));
    let mut player = level.spawn_point(&mut rng);
    level.update_view(player).unwrap();

    let mut explored: Vec<Position> = Vec::new();
    for _ in 0..200 {
        let direction = Direction::all()[rng.gen_range(0..8)];
        player = level.step(player, direction, &[]);
        level.update_view(player).unwrap();

        for pos in &explored {
            assert!(level.grid().tile(*pos).unwrap().explored());
            assert_ne!(level.visibility(*pos), TileVisibility::Unknown);
        }
        explored = level
            .grid()
            .iter()
            .filter(|(_, tile)| tile.explored())
            .map(|(pos, _)| pos)
            .collect();
    }
    assert!(!explored.is_empty());
}

#[test]
fn test_visible_tiles_are_explored() {
    let mut level = generated_level(3);
    let start = level.features()[0].center();
    level.update_view(start).unwrap();
    for pos in level.fov().visible_positions() {
        assert!(level.grid().tile(pos).unwrap().explored());
        assert_eq!(level.visibility(pos), TileVisibility::Visible);
    }
}

#[test]
fn test_movement_without_scrolling_still_refreshes_fov() {
    let mut level = generated_level(12);
    let room = level.features()[0];
    let start = room.origin;
    level.update_view(start).unwrap();
    let camera_before = level.camera().position();

    // The viewport is wider than the 40-tile map, so the camera never scrolls.
    let next = level.step(start, Direction::East, &[]);
    assert_ne!(next, start);
    assert!(level.update_view(next).unwrap());
    assert_eq!(level.camera().position(), camera_before);
    assert!(level.is_visible(next));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn camera_move_is_idempotent(
        map_w in 1_u32..200,
        map_h in 1_u32..200,
        view_w in 1_u32..100,
        view_h in 1_u32..100,
        x in -50_i32..250,
        y in -50_i32..250,
    ) {
        let mut camera = Camera::new(map_w, map_h, view_w, view_h).unwrap();
        camera.move_to(Position::new(x, y));
        let settled = camera.position();
        camera.clear_fov_dirty();

        prop_assert!(!camera.move_to(Position::new(x, y)));
        prop_assert_eq!(camera.position(), settled);
        prop_assert!(!camera.needs_fov_recompute());
        prop_assert!(settled.x >= 0 && settled.y >= 0);
    }

    #[test]
    fn screen_round_trip(
        target_x in 0_i32..120,
        target_y in 0_i32..80,
        map_x in -20_i32..140,
        map_y in -20_i32..100,
    ) {
        let mut camera = Camera::new(120, 80, 60, 27).unwrap();
        camera.move_to(Position::new(target_x, target_y));
        let map_pos = Position::new(map_x, map_y);
        if let Some(screen) = camera.to_screen(map_pos) {
            prop_assert!(screen.x >= 0 && screen.x < 60);
            prop_assert!(screen.y >= 0 && screen.y < 27);
            prop_assert_eq!(camera.to_map(screen), map_pos);
        }
    }

    #[test]
    fn wall_glyph_depends_only_on_neighbours(
        bits in 0_u8..16,
        x in 1_i32..19,
        y in 1_i32..14,
    ) {
        let mut grid = Grid::new(20, 15, true).unwrap();
        let pattern = WallNeighbors::from_bits(bits);
        let pos = Position::new(x, y);
        for (open, direction) in [
            (!pattern.north, Direction::North),
            (!pattern.south, Direction::South),
            (!pattern.east, Direction::East),
            (!pattern.west, Direction::West),
        ] {
            if open {
                grid.carve_floor(pos.step(direction)).unwrap();
            }
        }
        prop_assert_eq!(wall_glyph(&grid, pos).unwrap(), glyph_for(pattern));
    }
}

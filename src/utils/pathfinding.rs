//! # Pathfinding
//!
//! A* over a [`FovMap`]'s walkability with 8-way movement.
//!
//! Costs are integers scaled by 100 so diagonals can be weighted by roughly
//! √2 without floating point.

use crate::{Direction, FovMap, Position};
use ::pathfinding::prelude::astar;

/// Cost of a north/south/east/west step
pub const CARDINAL_STEP_COST: u32 = 100;

/// Cost of a diagonal step
pub const DIAGONAL_STEP_COST: u32 = 141;

/// Octile distance between two positions in step-cost units.
///
/// Never overestimates the true path cost, so it is a valid A* heuristic.
pub fn octile_distance(a: Position, b: Position) -> u32 {
    let dx = (a.x - b.x).unsigned_abs();
    let dy = (a.y - b.y).unsigned_abs();
    let diagonal = dx.min(dy);
    let straight = dx.max(dy) - diagonal;
    diagonal * DIAGONAL_STEP_COST + straight * CARDINAL_STEP_COST
}

fn successors(map: &FovMap, pos: Position) -> Vec<(Position, u32)> {
    Direction::all()
        .into_iter()
        .filter_map(|direction| {
            let next = pos.step(direction);
            if !map.is_walkable(next) {
                return None;
            }
            let cost = if direction.is_diagonal() {
                DIAGONAL_STEP_COST
            } else {
                CARDINAL_STEP_COST
            };
            Some((next, cost))
        })
        .collect()
}

/// Finds a cheapest walkable path from `start` to `goal`.
///
/// The returned steps exclude `start` and end on `goal`; an empty path means the
/// two are the same tile. `None` when the goal cannot be reached.
///
/// # Examples
///
/// ```
/// use delve::{find_path, FovMap, Position};
///
/// let mut map = FovMap::new(6, 3).unwrap();
/// for x in 1..5 {
///     map.set_properties(Position::new(x, 1), true, true).unwrap();
/// }
/// let path = find_path(&map, Position::new(1, 1), Position::new(4, 1)).unwrap();
/// assert_eq!(path.len(), 3);
/// assert_eq!(path.last(), Some(&Position::new(4, 1)));
/// ```
pub fn find_path(map: &FovMap, start: Position, goal: Position) -> Option<Vec<Position>> {
    let (mut path, _cost) = astar(
        &start,
        |&pos| successors(map, pos),
        |&pos| octile_distance(pos, goal),
        |&pos| pos == goal,
    )?;
    path.remove(0);
    Some(path)
}

/// Total step cost of walking `path` from `start`.
pub fn path_cost(start: Position, path: &[Position]) -> u32 {
    let mut previous = start;
    let mut total = 0;
    for &pos in path {
        total += octile_distance(previous, pos);
        previous = pos;
    }
    total
}

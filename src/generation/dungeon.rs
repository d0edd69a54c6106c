//! # Dungeon Generation
//!
//! Room-and-corridor generation by accretion.
//!
//! The generator seeds the map with one room, then repeatedly picks an existing
//! feature, opens an exit in one of its walls and tries to attach a new room or
//! corridor on the far side. Every successful attachment is linked to its parent
//! through a portal, so all placed features form one connected network. Corridor
//! ends are additionally joined to any floor they happen to graze, once right
//! after placement and once more after the main loop finishes.
//!
//! Work happens on a private rock / wall / floor canvas; the finished canvas is
//! converted into a [`Grid`] in one step.

use super::{utils, GenerationConfig, Generator};
use crate::config::{MAX_CORRIDOR_LENGTH, MAX_ROOM_SIDE, MIN_CORRIDOR_LENGTH, MIN_ROOM_SIDE};
use crate::{DelveError, DelveResult, Direction, Grid, Position};
use log::{debug, info, trace};
use rand::{rngs::StdRng, Rng};
use serde::{Deserialize, Serialize};

/// A cardinal heading: the way a corridor runs, or the wall an exit leaves through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Heading {
    North,
    East,
    South,
    West,
}

impl Heading {
    /// All headings in clockwise order.
    pub const ALL: [Heading; 4] = [Heading::North, Heading::East, Heading::South, Heading::West];

    /// Draws a uniformly random heading.
    pub fn random(rng: &mut StdRng) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }

    pub fn to_direction(self) -> Direction {
        match self {
            Heading::North => Direction::North,
            Heading::East => Direction::East,
            Heading::South => Direction::South,
            Heading::West => Direction::West,
        }
    }

    pub fn delta(self) -> Position {
        self.to_direction().to_delta()
    }

    pub fn opposite(self) -> Heading {
        match self {
            Heading::North => Heading::South,
            Heading::East => Heading::West,
            Heading::South => Heading::North,
            Heading::West => Heading::East,
        }
    }

    /// Directions probed from a corridor's far end: everything except back along it.
    fn join_candidates(self) -> [Heading; 3] {
        match self {
            Heading::North => [Heading::West, Heading::North, Heading::East],
            Heading::East => [Heading::North, Heading::East, Heading::South],
            Heading::South => [Heading::East, Heading::South, Heading::West],
            Heading::West => [Heading::West, Heading::North, Heading::South],
        }
    }
}

/// The shape requested for a new feature, before it has a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Blueprint {
    /// A rectangular room, `width` along x and `length` along y.
    Room { width: i32, length: i32 },
    /// A one-tile-wide corridor running `length` tiles along `heading`.
    Corridor { length: i32, heading: Heading },
}

impl Blueprint {
    /// Draws a room with both sides in `3..=10`.
    pub fn random_room(rng: &mut StdRng) -> Self {
        let width = rng.gen_range(MIN_ROOM_SIDE..=MAX_ROOM_SIDE);
        let length = rng.gen_range(MIN_ROOM_SIDE..=MAX_ROOM_SIDE);
        Blueprint::Room { width, length }
    }

    /// Draws a corridor with length in `3..=20` and a random heading.
    pub fn random_corridor(rng: &mut StdRng) -> Self {
        let length = rng.gen_range(MIN_CORRIDOR_LENGTH..=MAX_CORRIDOR_LENGTH);
        let heading = Heading::random(rng);
        Blueprint::Corridor { length, heading }
    }
}

/// What kind of feature a placed record is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeatureKind {
    Room,
    Corridor { heading: Heading },
}

/// A placed room or corridor.
///
/// `origin` is the top-left interior tile. The interior spans `width × length`
/// tiles and is entirely floor; the one-tile ring around it is wall, apart from
/// portals punched through it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feature {
    pub origin: Position,
    pub width: i32,
    pub length: i32,
    pub kind: FeatureKind,
}

impl Feature {
    pub fn is_room(&self) -> bool {
        self.kind == FeatureKind::Room
    }

    pub fn is_corridor(&self) -> bool {
        matches!(self.kind, FeatureKind::Corridor { .. })
    }

    /// Bottom-right interior tile.
    pub fn bottom_right(&self) -> Position {
        Position::new(self.origin.x + self.width - 1, self.origin.y + self.length - 1)
    }

    /// Interior centre, rounded towards the origin.
    pub fn center(&self) -> Position {
        Position::new(self.origin.x + self.width / 2, self.origin.y + self.length / 2)
    }

    /// Checks if a position is inside the interior.
    pub fn contains(&self, pos: Position) -> bool {
        pos.x >= self.origin.x
            && pos.y >= self.origin.y
            && pos.x < self.origin.x + self.width
            && pos.y < self.origin.y + self.length
    }

    /// Checks if a position lies on the wall ring around the interior.
    pub fn is_perimeter(&self, pos: Position) -> bool {
        let inside_ring = pos.x >= self.origin.x - 1
            && pos.y >= self.origin.y - 1
            && pos.x <= self.origin.x + self.width
            && pos.y <= self.origin.y + self.length;
        inside_ring && !self.contains(pos)
    }

    /// Gets all interior positions in row-major order.
    pub fn interior_positions(&self) -> Vec<Position> {
        let mut positions = Vec::with_capacity((self.width * self.length) as usize);
        for y in self.origin.y..self.origin.y + self.length {
            for x in self.origin.x..self.origin.x + self.width {
                positions.push(Position::new(x, y));
            }
        }
        positions
    }

    /// Gets every position of the wall ring.
    pub fn perimeter_positions(&self) -> Vec<Position> {
        let mut positions = Vec::new();
        let (left, top) = (self.origin.x - 1, self.origin.y - 1);
        let (right, bottom) = (self.origin.x + self.width, self.origin.y + self.length);

        for x in left..=right {
            positions.push(Position::new(x, top));
            positions.push(Position::new(x, bottom));
        }
        for y in self.origin.y..bottom {
            positions.push(Position::new(left, y));
            positions.push(Position::new(right, y));
        }
        positions
    }
}

/// Cosmetic door state of a portal.
///
/// Every kind currently carves the same walkable tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PortalKind {
    Secret,
    Closed,
    Open,
    Hole,
}

impl PortalKind {
    /// Draws a portal kind from the 0..100 probability bands.
    pub fn roll(rng: &mut StdRng) -> Self {
        Self::from_roll(rng.gen_range(0..100))
    }

    pub(crate) fn from_roll(roll: u32) -> Self {
        if roll > 90 {
            PortalKind::Secret
        } else if roll > 75 {
            PortalKind::Closed
        } else if roll > 40 {
            PortalKind::Open
        } else {
            PortalKind::Hole
        }
    }
}

/// A walkable tile punched through a wall to link two features.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Portal {
    pub position: Position,
    pub kind: PortalKind,
}

/// Outcome of trying to put a blueprint on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// The feature was carved.
    Placed(Feature),
    /// The footprint and its wall ring do not fit inside the map border.
    NoSpace,
    /// The footprint overlaps something that is not untouched rock.
    Blocked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cell {
    Rock,
    Wall,
    Floor,
}

/// A wall tile chosen on a feature's boundary and the tile just outside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Exit {
    wall: Position,
    beyond: Position,
    side: Heading,
}

/// The end of a corridor farthest from the feature that spawned it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CorridorEnd {
    far_end: Position,
    heading: Heading,
}

/// Generation scratch space. Features (including walls) stay off the outer ring.
struct Canvas {
    width: i32,
    height: i32,
    cells: Vec<Cell>,
}

impl Canvas {
    fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::Rock; (width as usize) * (height as usize)],
        }
    }

    fn index(&self, pos: Position) -> Option<usize> {
        if pos.x >= 0 && pos.y >= 0 && pos.x < self.width && pos.y < self.height {
            Some(pos.y as usize * self.width as usize + pos.x as usize)
        } else {
            None
        }
    }

    fn get(&self, pos: Position) -> Option<Cell> {
        self.index(pos).map(|index| self.cells[index])
    }

    fn set(&mut self, pos: Position, cell: Cell) {
        if let Some(index) = self.index(pos) {
            self.cells[index] = cell;
        }
    }

    fn is_floor(&self, pos: Position) -> bool {
        self.get(pos) == Some(Cell::Floor)
    }

    /// Resolves a blueprint into its interior rectangle.
    ///
    /// Rooms grow away from the wall they exit through and slide a random amount
    /// along it; corridors start at the anchor and run along their heading.
    fn footprint(
        blueprint: Blueprint,
        anchor: Position,
        exit: Option<Heading>,
        rng: &mut StdRng,
    ) -> Feature {
        match blueprint {
            Blueprint::Room { width, length } => {
                let mut origin = anchor;
                match exit {
                    Some(Heading::North) => {
                        origin.y -= length - 1;
                        origin.x -= rng.gen_range(0..width);
                    }
                    Some(Heading::South) => {
                        origin.x -= rng.gen_range(0..width);
                    }
                    Some(Heading::East) => {
                        origin.y -= rng.gen_range(0..length);
                    }
                    Some(Heading::West) => {
                        origin.x -= width - 1;
                        origin.y -= rng.gen_range(0..length);
                    }
                    None => {}
                }
                Feature {
                    origin,
                    width,
                    length,
                    kind: FeatureKind::Room,
                }
            }
            Blueprint::Corridor { length, heading } => {
                let (origin, width, extent) = match heading {
                    Heading::North => (Position::new(anchor.x, anchor.y - length + 1), 1, length),
                    Heading::South => (anchor, 1, length),
                    Heading::East => (anchor, length, 1),
                    Heading::West => (Position::new(anchor.x - length + 1, anchor.y), length, 1),
                };
                Feature {
                    origin,
                    width,
                    length: extent,
                    kind: FeatureKind::Corridor { heading },
                }
            }
        }
    }

    /// Tries to carve `blueprint` at `anchor`.
    fn place(
        &mut self,
        blueprint: Blueprint,
        anchor: Position,
        exit: Option<Heading>,
        rng: &mut StdRng,
    ) -> Placement {
        let feature = Self::footprint(blueprint, anchor, exit, rng);

        // Wall ring must stay inside [1, size - 2] on both axes.
        if feature.origin.x < 2
            || feature.origin.y < 2
            || feature.origin.x + feature.width > self.width - 2
            || feature.origin.y + feature.length > self.height - 2
        {
            return Placement::NoSpace;
        }

        let interior = feature.interior_positions();
        if interior.iter().any(|&pos| self.get(pos) != Some(Cell::Rock)) {
            return Placement::Blocked;
        }

        for pos in feature.perimeter_positions() {
            if self.get(pos) == Some(Cell::Rock) {
                self.set(pos, Cell::Wall);
            }
        }
        for pos in interior {
            self.set(pos, Cell::Floor);
        }

        Placement::Placed(feature)
    }

    /// Opens a wall tile and records what kind of door it stands for.
    fn punch_portal(&mut self, pos: Position, rng: &mut StdRng) -> Portal {
        let kind = PortalKind::roll(rng);
        self.set(pos, Cell::Floor);
        Portal {
            position: pos,
            kind,
        }
    }

    /// Picks a random wall tile on one of the feature's four sides.
    fn pick_exit(&self, feature: &Feature, attempts: u32, rng: &mut StdRng) -> Option<Exit> {
        for _ in 0..attempts {
            let side = Heading::random(rng);
            let wall = match side {
                Heading::North => Position::new(
                    feature.origin.x + rng.gen_range(0..feature.width),
                    feature.origin.y - 1,
                ),
                Heading::East => Position::new(
                    feature.origin.x + feature.width,
                    feature.origin.y + rng.gen_range(0..feature.length),
                ),
                Heading::South => Position::new(
                    feature.origin.x + rng.gen_range(0..feature.width),
                    feature.origin.y + feature.length,
                ),
                Heading::West => Position::new(
                    feature.origin.x - 1,
                    feature.origin.y + rng.gen_range(0..feature.length),
                ),
            };

            if self.get(wall) == Some(Cell::Wall) {
                return Some(Exit {
                    wall,
                    beyond: wall + side.delta(),
                    side,
                });
            }
        }
        None
    }

    /// Links a corridor's far end to floor two tiles away in any forward or
    /// sideways direction, each with `chance` percent.
    fn join_corridor(&mut self, end: CorridorEnd, chance: u32, rng: &mut StdRng) -> Vec<Portal> {
        let mut portals = Vec::new();
        for heading in end.heading.join_candidates() {
            let between = end.far_end + heading.delta();
            let target = between + heading.delta();
            if !self.is_floor(target) || self.is_floor(between) {
                continue;
            }
            if rng.gen_range(0..100) < chance {
                trace!("Joining corridor end {} through {}", end.far_end, between);
                portals.push(self.punch_portal(between, rng));
            }
        }
        portals
    }

    fn into_grid(self, fog_of_war: bool) -> DelveResult<Grid> {
        let mut grid = Grid::new(self.width as u32, self.height as u32, fog_of_war)?;
        for y in 0..self.height {
            for x in 0..self.width {
                let pos = Position::new(x, y);
                if self.is_floor(pos) {
                    grid.carve_floor(pos)?;
                }
            }
        }
        Ok(grid)
    }
}

/// A finished level layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedDungeon {
    /// The carved grid
    pub grid: Grid,
    /// Every placed room and corridor; index 0 is the seed room
    pub features: Vec<Feature>,
    /// Every portal punched, in the order they were made
    pub portals: Vec<Portal>,
}

impl GeneratedDungeon {
    /// The seed room every other feature grew from.
    pub fn first_room(&self) -> Option<&Feature> {
        self.features.first()
    }

    pub fn corridor_count(&self) -> usize {
        self.features.iter().filter(|f| f.is_corridor()).count()
    }
}

/// Room-and-corridor generator that grows features off existing walls.
///
/// # Examples
///
/// ```
/// use delve::{FeatureGenerator, GenerationConfig, Generator};
///
/// let config = GenerationConfig::for_testing(3);
/// let mut rng = delve::generation::utils::create_rng(&config);
/// let dungeon = FeatureGenerator::new().generate(&config, &mut rng).unwrap();
/// assert!(dungeon.features[0].is_room());
/// ```
#[derive(Debug, Clone, Default)]
pub struct FeatureGenerator;

impl FeatureGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Draws one room and retries random anchors until it fits.
    fn place_first_room(
        &self,
        canvas: &mut Canvas,
        config: &GenerationConfig,
        rng: &mut StdRng,
    ) -> DelveResult<Feature> {
        let width = rng.gen_range(MIN_ROOM_SIDE..=MAX_ROOM_SIDE);
        let length = rng.gen_range(MIN_ROOM_SIDE..=MAX_ROOM_SIDE);
        let blueprint = Blueprint::Room { width, length };

        let max_x = canvas.width - width - 2;
        let max_y = canvas.height - length - 2;
        if max_x < 2 || max_y < 2 {
            return Err(DelveError::InvalidConfig(format!(
                "{}x{} map cannot hold a {}x{} room",
                canvas.width, canvas.height, width, length
            )));
        }

        for attempt in 1..=config.first_room_attempts {
            let anchor = Position::new(rng.gen_range(2..=max_x), rng.gen_range(2..=max_y));
            if let Placement::Placed(feature) = canvas.place(blueprint, anchor, None, rng) {
                debug!(
                    "Seed room {}x{} placed at {} after {} attempt(s)",
                    width, length, feature.origin, attempt
                );
                return Ok(feature);
            }
        }

        Err(DelveError::InvalidConfig(format!(
            "first room could not be placed within {} attempts",
            config.first_room_attempts
        )))
    }
}

impl Generator<GeneratedDungeon> for FeatureGenerator {
    fn generate(&self, config: &GenerationConfig, rng: &mut StdRng) -> DelveResult<GeneratedDungeon> {
        config.validate()?;

        let mut canvas = Canvas::new(config.width as i32, config.height as i32);
        let mut features = vec![self.place_first_room(&mut canvas, config, rng)?];
        let mut portals = Vec::new();
        let mut corridors = Vec::new();

        let mut failed = 0;
        while failed < config.fail_budget && (features.len() as u32) < config.max_features {
            let parent = features[rng.gen_range(0..features.len())];
            let Some(exit) = canvas.pick_exit(&parent, config.exit_attempts, rng) else {
                failed += 1;
                continue;
            };

            let blueprint = if rng.gen_range(0..100) < config.corridor_bias {
                Blueprint::random_corridor(rng)
            } else {
                Blueprint::random_room(rng)
            };

            match canvas.place(blueprint, exit.beyond, Some(exit.side), rng) {
                Placement::NoSpace => failed += 1,
                Placement::Blocked => {
                    if canvas.is_floor(exit.beyond)
                        && rng.gen_range(0..100) < config.collision_portal_chance
                    {
                        trace!("Collision at {} linked through {}", exit.beyond, exit.wall);
                        portals.push(canvas.punch_portal(exit.wall, rng));
                    } else {
                        failed += 1;
                    }
                }
                Placement::Placed(feature) => {
                    trace!(
                        "Placed {:?} {}x{} at {} off {:?} wall",
                        feature.kind,
                        feature.width,
                        feature.length,
                        feature.origin,
                        exit.side
                    );
                    features.push(feature);
                    portals.push(canvas.punch_portal(exit.wall, rng));
                    failed = 0;

                    if let Blueprint::Corridor { length, heading } = blueprint {
                        let end = CorridorEnd {
                            far_end: exit.beyond + heading.delta() * (length - 1),
                            heading,
                        };
                        portals.extend(canvas.join_corridor(end, config.main_join_chance, rng));
                        corridors.push(end);
                    }
                }
            }

            if features.len() as u32 == config.max_features {
                debug!("Feature quota of {} reached", config.max_features);
                failed = config.fail_budget;
            }
        }

        for end in &corridors {
            portals.extend(canvas.join_corridor(*end, config.final_join_chance, rng));
        }

        let dungeon = GeneratedDungeon {
            grid: canvas.into_grid(config.fog_of_war)?,
            features,
            portals,
        };
        self.validate(&dungeon, config)?;

        info!(
            "Generated {}x{} level: {} features ({} corridors), {} portals, {} walkable tiles",
            config.width,
            config.height,
            dungeon.features.len(),
            dungeon.corridor_count(),
            dungeon.portals.len(),
            dungeon.grid.walkable_count()
        );

        Ok(dungeon)
    }

    fn validate(&self, dungeon: &GeneratedDungeon, _config: &GenerationConfig) -> DelveResult<()> {
        match dungeon.first_room() {
            Some(feature) if feature.is_room() => {}
            _ => {
                return Err(DelveError::GenerationFailed(
                    "first feature is not a room".to_string(),
                ))
            }
        }

        for feature in &dungeon.features {
            let (top_left, bottom_right) = (
                feature.origin - Position::new(1, 1),
                feature.bottom_right() + Position::new(1, 1),
            );
            if !dungeon.grid.contains(top_left) || !dungeon.grid.contains(bottom_right) {
                return Err(DelveError::GenerationFailed(format!(
                    "feature at {} spills off the map",
                    feature.origin
                )));
            }
        }

        for portal in &dungeon.portals {
            if !dungeon
                .features
                .iter()
                .any(|feature| feature.is_perimeter(portal.position))
            {
                return Err(DelveError::GenerationFailed(format!(
                    "portal at {} is not on any feature's wall ring",
                    portal.position
                )));
            }
        }

        utils::validate_grid(&dungeon.grid)
    }

    fn generator_type(&self) -> &'static str {
        "FeatureGenerator"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn rng(seed: u64) -> StdRng {
        StdRng::seed_from_u64(seed)
    }

    #[test]
    fn test_heading_geometry() {
        assert_eq!(Heading::North.delta(), Position::new(0, -1));
        assert_eq!(Heading::West.opposite(), Heading::East);
        for heading in Heading::ALL {
            assert!(!heading.join_candidates().contains(&heading.opposite()));
        }
    }

    #[test]
    fn test_feature_geometry() {
        let room = Feature {
            origin: Position::new(5, 5),
            width: 4,
            length: 3,
            kind: FeatureKind::Room,
        };
        assert_eq!(room.bottom_right(), Position::new(8, 7));
        assert_eq!(room.center(), Position::new(7, 6));
        assert_eq!(room.interior_positions().len(), 12);
        // (4 + 2) * (3 + 2) - 12
        assert_eq!(room.perimeter_positions().len(), 18);
        assert!(room.is_perimeter(Position::new(4, 4)));
        assert!(room.is_perimeter(Position::new(9, 6)));
        assert!(!room.is_perimeter(Position::new(6, 6)));
        assert!(!room.is_perimeter(Position::new(10, 6)));
    }

    #[test]
    fn test_portal_kind_bands() {
        assert_eq!(PortalKind::from_roll(99), PortalKind::Secret);
        assert_eq!(PortalKind::from_roll(91), PortalKind::Secret);
        assert_eq!(PortalKind::from_roll(90), PortalKind::Closed);
        assert_eq!(PortalKind::from_roll(76), PortalKind::Closed);
        assert_eq!(PortalKind::from_roll(75), PortalKind::Open);
        assert_eq!(PortalKind::from_roll(41), PortalKind::Open);
        assert_eq!(PortalKind::from_roll(40), PortalKind::Hole);
        assert_eq!(PortalKind::from_roll(0), PortalKind::Hole);
    }

    #[test]
    fn test_room_placement_carves_walls_and_floor() {
        let mut canvas = Canvas::new(20, 20);
        let blueprint = Blueprint::Room { width: 4, length: 3 };
        let placement = canvas.place(blueprint, Position::new(5, 5), None, &mut rng(1));

        let Placement::Placed(feature) = placement else {
            panic!("expected placement, got {:?}", placement);
        };
        assert_eq!(feature.origin, Position::new(5, 5));
        for pos in feature.interior_positions() {
            assert_eq!(canvas.get(pos), Some(Cell::Floor));
        }
        for pos in feature.perimeter_positions() {
            assert_eq!(canvas.get(pos), Some(Cell::Wall));
        }
        assert_eq!(canvas.get(Position::new(3, 3)), Some(Cell::Rock));
    }

    #[test]
    fn test_placement_respects_rock_border() {
        let mut canvas = Canvas::new(20, 20);
        let blueprint = Blueprint::Room { width: 4, length: 4 };
        assert_eq!(
            canvas.place(blueprint, Position::new(1, 5), None, &mut rng(1)),
            Placement::NoSpace
        );
        assert_eq!(
            canvas.place(blueprint, Position::new(15, 5), None, &mut rng(1)),
            Placement::NoSpace
        );
        assert!(matches!(
            canvas.place(blueprint, Position::new(14, 14), None, &mut rng(1)),
            Placement::Placed(_)
        ));
    }

    #[test]
    fn test_overlap_is_blocked() {
        let mut canvas = Canvas::new(30, 30);
        let blueprint = Blueprint::Room { width: 5, length: 5 };
        assert!(matches!(
            canvas.place(blueprint, Position::new(5, 5), None, &mut rng(1)),
            Placement::Placed(_)
        ));
        // Interior would cover the first room's east wall.
        assert_eq!(
            canvas.place(blueprint, Position::new(10, 5), None, &mut rng(1)),
            Placement::Blocked
        );
        // Sharing only a wall ring is allowed.
        assert!(matches!(
            canvas.place(blueprint, Position::new(11, 5), None, &mut rng(1)),
            Placement::Placed(_)
        ));
    }

    #[test]
    fn test_walls_never_cover_floor() {
        let mut canvas = Canvas::new(30, 30);
        let floor = Position::new(10, 4);
        canvas.set(floor, Cell::Floor);
        let blueprint = Blueprint::Room { width: 3, length: 3 };
        // Wall ring of this room passes through (10, 4).
        assert!(matches!(
            canvas.place(blueprint, Position::new(7, 5), None, &mut rng(1)),
            Placement::Placed(_)
        ));
        assert_eq!(canvas.get(floor), Some(Cell::Floor));
    }

    #[test]
    fn test_corridor_footprints_follow_heading() {
        let anchor = Position::new(10, 10);
        let north = Canvas::footprint(
            Blueprint::Corridor { length: 5, heading: Heading::North },
            anchor,
            Some(Heading::North),
            &mut rng(1),
        );
        assert_eq!(north.origin, Position::new(10, 6));
        assert_eq!((north.width, north.length), (1, 5));
        assert_eq!(north.bottom_right(), anchor);

        let west = Canvas::footprint(
            Blueprint::Corridor { length: 4, heading: Heading::West },
            anchor,
            Some(Heading::South),
            &mut rng(1),
        );
        assert_eq!(west.origin, Position::new(7, 10));
        assert_eq!((west.width, west.length), (4, 1));
        assert!(west.contains(anchor));
    }

    #[test]
    fn test_rooms_grow_away_from_exit_wall() {
        let anchor = Position::new(20, 20);
        let blueprint = Blueprint::Room { width: 4, length: 6 };
        for (seed, side) in Heading::ALL.iter().enumerate() {
            let room = Canvas::footprint(blueprint, anchor, Some(*side), &mut rng(seed as u64));
            assert!(room.contains(anchor), "{:?} exit must cover the anchor", side);
            let back = anchor - side.delta();
            assert!(!room.contains(back), "{:?} exit must not reach back", side);
        }
    }

    #[test]
    fn test_pick_exit_finds_wall_beside_interior() {
        let mut canvas = Canvas::new(30, 30);
        let Placement::Placed(room) = canvas.place(
            Blueprint::Room { width: 5, length: 4 },
            Position::new(10, 10),
            None,
            &mut rng(2),
        ) else {
            panic!("room should fit");
        };

        let mut rng = rng(3);
        for _ in 0..50 {
            let exit = canvas.pick_exit(&room, 100, &mut rng).unwrap();
            assert_eq!(canvas.get(exit.wall), Some(Cell::Wall));
            assert!(room.is_perimeter(exit.wall));
            assert!(room.contains(exit.wall - exit.side.delta()));
            assert_eq!(exit.beyond, exit.wall + exit.side.delta());
        }
    }

    #[test]
    fn test_pick_exit_gives_up_without_walls() {
        let canvas = Canvas::new(30, 30);
        let ghost = Feature {
            origin: Position::new(10, 10),
            width: 3,
            length: 3,
            kind: FeatureKind::Room,
        };
        assert!(canvas.pick_exit(&ghost, 20, &mut rng(4)).is_none());
    }

    #[test]
    fn test_join_corridor_links_grazed_floor() {
        let mut canvas = Canvas::new(30, 30);
        let end = CorridorEnd {
            far_end: Position::new(10, 10),
            heading: Heading::North,
        };
        canvas.set(end.far_end, Cell::Floor);
        canvas.set(Position::new(10, 9), Cell::Wall);
        canvas.set(Position::new(10, 8), Cell::Floor);
        // Floor behind the corridor is never considered.
        canvas.set(Position::new(10, 11), Cell::Wall);
        canvas.set(Position::new(10, 12), Cell::Floor);

        assert!(canvas.join_corridor(end, 0, &mut rng(5)).is_empty());

        let portals = canvas.join_corridor(end, 100, &mut rng(5));
        assert_eq!(portals.len(), 1);
        assert_eq!(portals[0].position, Position::new(10, 9));
        assert!(canvas.is_floor(Position::new(10, 9)));
        assert_eq!(canvas.get(Position::new(10, 11)), Some(Cell::Wall));
    }

    #[test]
    fn test_generation_basics() {
        let config = GenerationConfig::for_testing(12345);
        let generator = FeatureGenerator::new();
        let dungeon = generator.generate(&config, &mut rng(config.seed)).unwrap();

        assert_eq!(dungeon.grid.width(), 40);
        assert_eq!(dungeon.grid.height(), 40);
        assert!(dungeon.features[0].is_room());
        assert!(dungeon.features.len() <= config.max_features as usize);
        assert!(dungeon.grid.walkable_count() > 0);
        assert!(generator.validate(&dungeon, &config).is_ok());
        assert_eq!(generator.generator_type(), "FeatureGenerator");

        for feature in &dungeon.features {
            for pos in feature.interior_positions() {
                assert!(!dungeon.grid.is_blocked(pos).unwrap());
            }
        }
        for portal in &dungeon.portals {
            assert!(!dungeon.grid.is_blocked(portal.position).unwrap());
        }
    }

    #[test]
    fn test_validate_rejects_stray_portal() {
        let config = GenerationConfig::for_testing(5);
        let generator = FeatureGenerator::new();
        let mut dungeon = generator.generate(&config, &mut rng(5)).unwrap();

        for portal in &dungeon.portals {
            assert!(dungeon.features.iter().any(|f| f.is_perimeter(portal.position)));
        }

        dungeon.portals.push(Portal {
            position: Position::new(0, 0),
            kind: PortalKind::Open,
        });
        assert!(matches!(
            generator.validate(&dungeon, &config),
            Err(DelveError::GenerationFailed(_))
        ));
    }

    #[test]
    fn test_border_ring_stays_solid() {
        for seed in 0..10 {
            let config = GenerationConfig::new(seed);
            let dungeon = FeatureGenerator::new()
                .generate(&config, &mut rng(seed))
                .unwrap();
            for (pos, tile) in dungeon.grid.iter() {
                if !dungeon.grid.has_margin(pos) {
                    assert!(tile.blocked(), "seed {} opened border tile {}", seed, pos);
                }
            }
        }
    }

    #[test]
    fn test_generation_is_deterministic() {
        let config = GenerationConfig::new(777);
        let generator = FeatureGenerator::new();
        let first = generator.generate(&config, &mut rng(777)).unwrap();
        let second = generator.generate(&config, &mut rng(777)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_single_feature_quota() {
        let mut config = GenerationConfig::for_testing(9);
        config.max_features = 1;
        let dungeon = FeatureGenerator::new().generate(&config, &mut rng(9)).unwrap();
        assert_eq!(dungeon.features.len(), 1);
        assert!(dungeon.portals.is_empty());
    }

    #[test]
    fn test_all_corridor_bias() {
        let mut config = GenerationConfig::new(31);
        config.corridor_bias = 100;
        let dungeon = FeatureGenerator::new().generate(&config, &mut rng(31)).unwrap();
        assert!(dungeon.features[0].is_room());
        assert!(dungeon.features[1..].iter().all(|f| f.is_corridor()));
    }

    #[test]
    fn test_small_map_rejected() {
        let mut config = GenerationConfig::new(1);
        config.width = 12;
        let result = FeatureGenerator::new().generate(&config, &mut rng(1));
        assert!(matches!(result, Err(DelveError::InvalidConfig(_))));

        config.width = u32::MAX;
        let result = FeatureGenerator::new().generate(&config, &mut rng(1));
        assert!(matches!(result, Err(DelveError::InvalidConfig(_))));
    }
}

//! # Delve
//!
//! Procedural room-and-corridor dungeon generation with field-of-view and camera
//! framing for turn-based roguelikes.
//!
//! ## Architecture Overview
//!
//! The crate produces the map data a game loop consumes every turn:
//!
//! - **Generation**: grows a connected network of rooms and corridors onto an
//!   all-wall grid, then indexes every walkable tile for spawn placement
//! - **Game**: the tile grid and the [`Level`] aggregate that owns the grid,
//!   camera, FOV map and spawn index for one dungeon level
//! - **Vision**: shadow-casting field of view with persistent exploration memory
//! - **Rendering**: camera/viewport translation, wall-junction glyph selection and
//!   a text renderer that keeps the visible / remembered / unknown distinction
//!
//! Everything is single-threaded and synchronous; a level is rebuilt wholesale on
//! every level transition.

pub mod game;
pub mod generation;
pub mod rendering;
pub mod utils;
pub mod vision;

pub use game::*;
pub use generation::*;
pub use rendering::*;
pub use utils::*;
pub use vision::*;

/// Core error type for the dungeon core.
#[derive(thiserror::Error, Debug)]
pub enum DelveError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Configuration values cannot produce a level
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A coordinate fell outside the grid
    #[error("Position ({x}, {y}) is outside the {width}x{height} grid")]
    OutOfRange {
        x: i32,
        y: i32,
        width: u32,
        height: u32,
    },

    /// Generation left no walkable tile to spawn on
    #[error("Generated level has no walkable tiles")]
    EmptyIndex,

    /// Generation produced an unusable level
    #[error("Generation failed: {0}")]
    GenerationFailed(String),
}

/// Result type used throughout the crate.
pub type DelveResult<T> = Result<T, DelveError>;

/// Version information for the crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default dimensions and generator tuning.
pub mod config {
    /// Default dungeon width in tiles
    pub const DEFAULT_MAP_WIDTH: u32 = 80;

    /// Default dungeon height in tiles
    pub const DEFAULT_MAP_HEIGHT: u32 = 40;

    /// Default viewport width in tiles
    pub const DEFAULT_VIEWPORT_WIDTH: u32 = 60;

    /// Default viewport height in tiles
    pub const DEFAULT_VIEWPORT_HEIGHT: u32 = 27;

    /// Consecutive failed placements before generation stops
    pub const DEFAULT_FAIL_BUDGET: u32 = 250;

    /// Percent chance that a new feature is a corridor
    pub const DEFAULT_CORRIDOR_BIAS: u32 = 30;

    /// Upper bound on placed rooms and corridors
    pub const DEFAULT_MAX_FEATURES: u32 = 32;

    /// Sight radius used for the player's field of view
    pub const DEFAULT_TORCH_RADIUS: u32 = 10;

    /// Smallest map side able to hold the largest room inside its rock border
    pub const MIN_MAP_SIDE: u32 = MAX_ROOM_SIDE as u32 + 4;

    /// Largest accepted map side, keeping tile indices and coordinates in range
    pub const MAX_MAP_SIDE: u32 = 4096;

    /// Smallest room side, inclusive
    pub const MIN_ROOM_SIDE: i32 = 3;

    /// Largest room side, inclusive
    pub const MAX_ROOM_SIDE: i32 = 10;

    /// Shortest corridor, inclusive
    pub const MIN_CORRIDOR_LENGTH: i32 = 3;

    /// Longest corridor, inclusive
    pub const MAX_CORRIDOR_LENGTH: i32 = 20;
}

//! # Utilities Module
//!
//! Path queries over a level's walkability map.

pub mod pathfinding;

pub use self::pathfinding::*;

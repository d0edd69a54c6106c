//! # Rendering Module
//!
//! Camera framing, wall decoration and text output for a level's viewport.

pub mod camera;
pub mod display;
pub mod walls;

pub use camera::*;
pub use display::*;
pub use walls::*;

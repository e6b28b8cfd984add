//! Cube-face movement core for a first-person, tile-based dungeon crawler.
//!
//! The dungeon is built from cubic cells. An entity is not merely standing on a floor:
//! it can be anchored to any of the six faces of its cell (floor, ceiling, or a wall)
//! and walk, climb, or fly across face boundaries, including wrapping around the inner
//! and outer corners of a cube. This crate is the engine that makes such movement
//! consistent: it resolves "entity + requested direction" into an ordered sequence of
//! checkpoints, arbitrates cell occupancy (including cascading pushes), and
//! interpolates the resolved checkpoints into continuous position and orientation.
//!
//! The main pieces are:
//!
//! * [`math`] — directions, axes, and cube-grid coordinates.
//! * [`entity`] — per-entity movement state: cell, anchor face, look direction,
//!   transportation modes, and movement abilities.
//! * [`dungeon`] — cells, per-face anchors, features (doors, ladders, ramps, …),
//!   occupancy bookkeeping, and the [`Dungeon`](dungeon::Dungeon) container.
//! * [`movement`] — transition resolution, checkpoint construction, interpolation,
//!   and the [`Ticker`](movement::Ticker) that drives active transitions.
//!
//! Everything is in-process and synchronous; callers drive time explicitly through
//! [`movement::Ticker::tick()`].

pub mod entity;

pub mod dungeon;

/// Mathematical types for the cube grid: directions, axes, cells, coordinates.
pub mod math {
    pub use cubewalk_base::math::*;
}

pub mod movement;

mod time;
pub use time::Tick;

//! Mathematical types for the cube grid: directions, axes, cells, coordinates.

mod axis;
pub use axis::*;
mod coord;
pub use coord::*;
mod cube;
pub use cube::*;
mod direction;
pub use direction::*;

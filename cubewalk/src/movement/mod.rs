//! Movement: resolving requests against the dungeon, interpreting them into
//! checkpointed transitions, interpolating those for rendering, and driving them to
//! completion over ticks.

mod transition;
pub use transition::*;
mod resolve;
pub use resolve::*;
mod interpret;
pub use interpret::*;
mod interpolate;
pub use interpolate::*;
mod ticker;
pub use ticker::*;

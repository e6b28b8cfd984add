//! This library is an internal component of [`cubewalk`],
//! which defines the cube-grid mathematical types and functions.
//! Do not depend on this library; use only [`cubewalk`] instead.
//!
//! [`cubewalk`]: https://crates.io/crates/cubewalk

pub mod math;

// reexport for convenience of our tests
#[doc(hidden)]
pub use euclid;

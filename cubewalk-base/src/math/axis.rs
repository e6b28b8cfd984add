use core::fmt;

use crate::math::Direction;

/// Enumeration of the axes of three-dimensional space.
///
/// Can be used to infallibly index 3-component arrays and vectors.
///
/// See also:
///
/// * [`Direction`] specifies an axis and a direction on the axis.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, exhaust::Exhaust)]
#[repr(u8)]
#[allow(missing_docs)]
pub enum Axis {
    X = 0,
    Y = 1,
    Z = 2,
}

impl Axis {
    /// All three axes in the standard order, [X, Y, Z].
    pub const ALL: [Self; 3] = [Self::X, Self::Y, Self::Z];

    /// Returns the [`Direction`] which corresponds to the positive direction on this axis.
    #[inline]
    pub const fn positive_direction(self) -> Direction {
        match self {
            Axis::X => Direction::East,
            Axis::Y => Direction::Up,
            Axis::Z => Direction::North,
        }
    }

    /// Returns the [`Direction`] which corresponds to the negative direction on this axis.
    #[inline]
    pub const fn negative_direction(self) -> Direction {
        match self {
            Axis::X => Direction::West,
            Axis::Y => Direction::Down,
            Axis::Z => Direction::South,
        }
    }

    /// Convert the axis to a number for indexing 3-element arrays.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Axis {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        };
        write!(f, "{s}")
    }
}

impl<T> core::ops::Index<Axis> for [T; 3] {
    type Output = T;
    #[inline]
    fn index(&self, index: Axis) -> &T {
        &self[index.index()]
    }
}

impl<T> core::ops::IndexMut<Axis> for [T; 3] {
    #[inline]
    fn index_mut(&mut self, index: Axis) -> &mut T {
        &mut self[index.index()]
    }
}

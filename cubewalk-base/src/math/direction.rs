//! Axis-aligned unit directions: the six faces of a cube cell.
//! This module is private but reexported by its parent.

use core::fmt;
use core::ops;

use euclid::Vector3D;

use crate::math::{Axis, GridVector};

/// Identifies a face of a cube cell or an orthogonal unit vector.
///
/// An entity walking a dungeon may be anchored to any of the six faces of its cell;
/// this type names the face, the direction of travel across a face boundary, and the
/// compass/vertical look direction, all of which share the same six values.
///
/// Axis mapping: East = +X, Up = +Y, North = +Z.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, exhaust::Exhaust)]
#[repr(u8)]
pub enum Direction {
    /// Negative X; the direction whose unit vector is `(-1, 0, 0)`.
    West = 1,
    /// Negative Y; the direction whose unit vector is `(0, -1, 0)`; downward.
    Down = 2,
    /// Negative Z; the direction whose unit vector is `(0, 0, -1)`.
    South = 3,
    /// Positive X; the direction whose unit vector is `(1, 0, 0)`.
    East = 4,
    /// Positive Y; the direction whose unit vector is `(0, 1, 0)`; upward.
    Up = 5,
    /// Positive Z; the direction whose unit vector is `(0, 0, 1)`.
    North = 6,
}

impl Direction {
    /// All the values of [`Direction`], in discriminant order.
    pub const ALL: [Direction; 6] = [
        Direction::West,
        Direction::Down,
        Direction::South,
        Direction::East,
        Direction::Up,
        Direction::North,
    ];

    /// The four planar cardinal directions (the directions perpendicular to gravity),
    /// in clockwise compass order.
    pub const CARDINALS: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Inverse function of `direction as u8`, converting the number to [`Direction`].
    #[inline]
    pub const fn from_discriminant(d: u8) -> Option<Self> {
        match d {
            1 => Some(Self::West),
            2 => Some(Self::Down),
            3 => Some(Self::South),
            4 => Some(Self::East),
            5 => Some(Self::Up),
            6 => Some(Self::North),
            _ => None,
        }
    }

    /// Returns the [`Direction`] whose unit vector equals the given vector, if any.
    #[inline]
    pub const fn from_vector(v: GridVector) -> Option<Self> {
        match (v.x, v.y, v.z) {
            (-1, 0, 0) => Some(Self::West),
            (0, -1, 0) => Some(Self::Down),
            (0, 0, -1) => Some(Self::South),
            (1, 0, 0) => Some(Self::East),
            (0, 1, 0) => Some(Self::Up),
            (0, 0, 1) => Some(Self::North),
            _ => None,
        }
    }

    /// Returns which axis this direction's unit vector is parallel to.
    #[inline]
    #[must_use]
    pub const fn axis(self) -> Axis {
        match self {
            Self::West | Self::East => Axis::X,
            Self::Down | Self::Up => Axis::Y,
            Self::South | Self::North => Axis::Z,
        }
    }

    /// Returns whether this direction is a “positive” direction: one whose unit vector's
    /// nonzero coordinate is positive.
    #[inline]
    pub const fn is_positive(self) -> bool {
        matches!(self, Self::East | Self::Up | Self::North)
    }

    /// Returns whether this direction is a “negative” direction: one whose unit vector's
    /// nonzero coordinate is negative.
    #[inline]
    pub const fn is_negative(self) -> bool {
        matches!(self, Self::West | Self::Down | Self::South)
    }

    /// Returns whether this direction is one of the four planar cardinals
    /// (perpendicular to gravity).
    #[inline]
    pub const fn is_planar(self) -> bool {
        !matches!(self.axis(), Axis::Y)
    }

    /// Returns the opposite direction (maps [`North`](Self::North) to
    /// [`South`](Self::South) and so on).
    #[inline]
    #[must_use]
    pub const fn opposite(self) -> Direction {
        match self {
            Direction::West => Direction::East,
            Direction::Down => Direction::Up,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::Up => Direction::Down,
            Direction::North => Direction::South,
        }
    }

    /// Returns the direction whose unit vector is the cross product of these directions'
    /// unit vectors, or [`None`] if they are parallel and the cross product is zero.
    #[inline]
    #[must_use]
    pub fn cross(self, other: Self) -> Option<Self> {
        Self::from_vector(self.grid_vector().cross(other.grid_vector()))
    }

    /// Returns the axis-aligned unit vector parallel to this direction.
    #[inline]
    #[must_use]
    pub fn normal_vector<S, U>(self) -> Vector3D<S, U>
    where
        S: num_traits::Zero + num_traits::One + ops::Neg<Output = S>,
    {
        let zero = || S::zero();
        let pos = || S::one();
        let neg = || -S::one();
        match self {
            Self::West => Vector3D::new(neg(), zero(), zero()),
            Self::Down => Vector3D::new(zero(), neg(), zero()),
            Self::South => Vector3D::new(zero(), zero(), neg()),
            Self::East => Vector3D::new(pos(), zero(), zero()),
            Self::Up => Vector3D::new(zero(), pos(), zero()),
            Self::North => Vector3D::new(zero(), zero(), pos()),
        }
    }

    /// [`Self::normal_vector()`] monomorphized to [`GridVector`], usable in const context.
    #[inline]
    pub const fn grid_vector(self) -> GridVector {
        let (x, y, z) = match self {
            Self::West => (-1, 0, 0),
            Self::Down => (0, -1, 0),
            Self::South => (0, 0, -1),
            Self::East => (1, 0, 0),
            Self::Up => (0, 1, 0),
            Self::North => (0, 0, 1),
        };
        GridVector::new(x, y, z)
    }

    /// Dot product of this direction as a unit vector and the given vector,
    /// implemented by selecting the relevant component.
    #[inline]
    #[must_use]
    pub fn dot<S, U>(self, vector: Vector3D<S, U>) -> S
    where
        S: num_traits::Zero + ops::Neg<Output = S>,
    {
        let select = match self.axis() {
            Axis::X => vector.x,
            Axis::Y => vector.y,
            Axis::Z => vector.z,
        };
        if self.is_negative() {
            -select
        } else {
            select
        }
    }

    /// Rotates this direction a quarter turn clockwise about the given `up` direction,
    /// as seen looking along `up` towards the rotation plane.
    ///
    /// Directions parallel to `up` are unchanged.
    ///
    /// ```
    /// use cubewalk_base::math::Direction;
    ///
    /// assert_eq!(Direction::North.rotated_cw(Direction::Up), Direction::East);
    /// assert_eq!(Direction::East.rotated_cw(Direction::Up), Direction::South);
    /// assert_eq!(Direction::Up.rotated_cw(Direction::Up), Direction::Up);
    /// ```
    #[inline]
    #[must_use]
    pub fn rotated_cw(self, up: Self) -> Self {
        up.cross(self).unwrap_or(self)
    }

    /// Rotates this direction a quarter turn counterclockwise about the given `up`
    /// direction. Inverse of [`Self::rotated_cw()`].
    #[inline]
    #[must_use]
    pub fn rotated_ccw(self, up: Self) -> Self {
        self.cross(up).unwrap_or(self)
    }

    /// Rotates this direction a half turn about the given `up` direction.
    ///
    /// Directions parallel to `up` are unchanged; all others map to their opposite.
    #[inline]
    #[must_use]
    pub fn rotated_180(self, up: Self) -> Self {
        if self.axis() == up.axis() {
            self
        } else {
            self.opposite()
        }
    }
}

impl fmt::Display for Direction {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Direction::West => "west",
            Direction::Down => "down",
            Direction::South => "south",
            Direction::East => "east",
            Direction::Up => "up",
            Direction::North => "north",
        };
        write!(f, "{s}")
    }
}

impl TryFrom<GridVector> for Direction {
    type Error = NotADirection;

    /// Recovers a [`Direction`] from its corresponding unit vector.
    #[inline]
    fn try_from(value: GridVector) -> Result<Self, Self::Error> {
        Self::from_vector(value).ok_or(NotADirection(value))
    }
}

/// Error resulting from providing a vector that is not an axis-aligned unit vector
/// where a [`Direction`] was required.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct NotADirection(GridVector);

impl fmt::Display for NotADirection {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self(v) = self;
        write!(
            f,
            "vector ({}, {}, {}) is not an axis-aligned unit vector",
            v.x, v.y, v.z
        )
    }
}

impl std::error::Error for NotADirection {}

//! Cell feature modifiers: doors, ladders, ramps, and other furniture that
//! alters how a cell may be entered, exited, or anchored to.

use crate::math::{Cube, Direction};

/// A modifier attached to a [`Cell`](super::Cell) that changes its movement rules.
///
/// Features carry their own orientation metadata; the movement core reads them only
/// through the cell's gate methods ([`Cell::allows_entry_from()`](super::Cell::allows_entry_from)
/// and friends) and at transition commit time (teleporters, spinners).
#[derive(Clone, Copy, Debug, PartialEq)]
#[non_exhaustive]
pub enum Feature {
    /// A door in the given face. Closed doors block entry and exit through that face.
    Door {
        /// The face the door occupies.
        face: Direction,
        /// Whether the door currently stands open.
        open: bool,
    },
    /// A ladder mounted on the given wall face, making that face climbable.
    Ladder {
        /// The wall face the ladder is mounted on.
        face: Direction,
    },
    /// A ramp sloping upward in the `ascent` direction. Ramps may only be entered and
    /// exited along their slope axis.
    Ramp {
        /// Planar direction of upward travel.
        ascent: Direction,
    },
    /// Stairs against the given face, ascending in the `ascent` direction. Traversal
    /// across the stairs animates as discrete steps.
    Stairs {
        /// The face the staircase leans against.
        face: Direction,
        /// Planar direction of upward travel.
        ascent: Direction,
    },
    /// A trapdoor in the floor. While open, the cell has no effective floor.
    Trapdoor {
        /// Whether the trapdoor currently stands open.
        open: bool,
    },
    /// Floor spikes. While extended, they block lateral entry into the cell.
    Spikes {
        /// Whether the spikes are currently extended.
        extended: bool,
    },
    /// Relocates any entity that commits a transition into this cell.
    Teleporter {
        /// Destination cell.
        target: Cube,
    },
    /// Forcibly rotates any entity that commits a transition into this cell, and owns
    /// the entity's facing while it stands here.
    Spinner {
        /// Number of quarter turns applied, positive clockwise.
        quarter_turns: i8,
    },
    /// Fires a notification when an entity commits a transition into this cell.
    PressurePlate,
}

/// Kinds of directional override a feature script may install on a cell.
///
/// Overrides are reference-counted booleans: multiple scripts may install the same
/// override independently, and it stays active until every installer removes it.
/// Resolution treats them as opaque read-only inputs.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, exhaust::Exhaust)]
pub enum OverrideKind {
    /// Blocks entry into the cell through the given face.
    BlockEntry,
    /// Blocks exit out of the cell through the given face.
    BlockExit,
    /// Negates wall presence on the given face (illusory walls: solid to the eye,
    /// open to movement).
    NegateWall,
}

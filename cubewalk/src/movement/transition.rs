//! The resolved form of one movement request: an outcome classification and an
//! ordered sequence of checkpoints.

use arrayvec::ArrayVec;

use crate::dungeon::{AnchorLoc, TraversalKind};
use crate::math::{Cube, Direction, FreePoint, FreeVector};

/// Terminal classification of a resolved transition.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, exhaust::Exhaust)]
pub enum MovementOutcome {
    /// Stayed in the same cell but changed anchor face (walked around an inner or
    /// onto a cube face in place).
    NodeInternal,
    /// Moved to a different cell.
    NodeExit,
    /// No valid target; the entity does not move.
    Blocked,
    /// No valid target, with a visible bounce: the entity leans into the obstacle
    /// and returns.
    Refused,
    /// The entity left its surface and is airborne without support.
    Ungrounded,
    /// Airborne movement struck a wall; the entity rebounds.
    Bouncing,
    /// Airborne movement found support; the entity re-anchors.
    Landing,
    /// A support check confirmed the entity is anchored and stays put.
    Grounded,
}

impl MovementOutcome {
    /// Whether the transition changes the entity's cell or anchor.
    #[inline]
    pub fn is_movement(self) -> bool {
        matches!(
            self,
            MovementOutcome::NodeInternal
                | MovementOutcome::NodeExit
                | MovementOutcome::Ungrounded
                | MovementOutcome::Landing
        )
    }

    /// Whether the transition is a rejection (the entity ends where it began).
    #[inline]
    pub fn is_rejection(self) -> bool {
        matches!(
            self,
            MovementOutcome::Blocked | MovementOutcome::Refused | MovementOutcome::Bouncing
        )
    }
}

/// Where a [`Checkpoint`] is: attached to an anchor, balanced on a cell edge, or at a
/// raw point in space (off-map or airborne segments).
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Place {
    /// Attached to a specific anchor.
    Anchored(AnchorLoc),
    /// On the edge of a cell, between leaving one anchor and arriving at the next.
    Edge {
        /// The cell whose edge this is.
        cube: Cube,
        /// The face boundary being crossed.
        toward: Direction,
        /// The face the entity is resting against while crossing.
        face: Direction,
    },
    /// A raw position in space.
    Free(FreePoint),
}

impl Place {
    /// The continuous position this place corresponds to: the center of an anchored
    /// face, the midpoint of a cell edge, or the raw point.
    pub fn position(&self) -> FreePoint {
        match *self {
            Place::Anchored(loc) => loc.cube.face_center(loc.face),
            Place::Edge { cube, toward, face } => {
                cube.center()
                    + toward.normal_vector::<f64, Cube>() * 0.5
                    + face.normal_vector::<f64, Cube>() * 0.5
            }
            Place::Free(p) => p,
        }
    }

    /// The cell this place belongs to, if it is on the map.
    pub fn cube(&self) -> Option<Cube> {
        match *self {
            Place::Anchored(loc) => Some(loc.cube),
            Place::Edge { cube, .. } => Some(cube),
            Place::Free(p) => Cube::containing(p),
        }
    }

    /// The anchor face at this place, if anchored.
    pub fn anchor(&self) -> Option<Direction> {
        match *self {
            Place::Anchored(loc) => Some(loc.face),
            _ => None,
        }
    }
}

/// A resolved intermediate waypoint of a transition: a place, the look direction
/// there, and the traversal kind used when animating to it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Checkpoint {
    /// Where the entity is at this waypoint.
    pub place: Place,
    /// Look direction at this waypoint.
    pub look: Direction,
    /// Easing kind used for the segment arriving at this waypoint.
    pub traversal: TraversalKind,
}

impl Checkpoint {
    /// Shorthand for the continuous position of [`Self::place`].
    #[inline]
    pub fn position(&self) -> FreePoint {
        self.place.position()
    }
}

/// Maximum number of checkpoints a transition may carry.
pub const MAX_CHECKPOINTS: usize = 4;

/// The full resolution of one movement request: 2–4 ordered checkpoints plus an
/// overall outcome, and the translation directions that produced it (used by
/// interpolation to judge step-up and gap geometry).
#[derive(Clone, Debug, PartialEq)]
pub struct Transition {
    checkpoints: ArrayVec<Checkpoint, MAX_CHECKPOINTS>,
    outcome: MovementOutcome,
    primary: Option<Direction>,
    secondary: Option<Direction>,
}

impl Transition {
    pub(crate) fn new(
        checkpoints: ArrayVec<Checkpoint, MAX_CHECKPOINTS>,
        outcome: MovementOutcome,
        primary: Option<Direction>,
        secondary: Option<Direction>,
    ) -> Self {
        debug_assert!(checkpoints.len() >= 2, "a transition has at least 2 checkpoints");
        Self {
            checkpoints,
            outcome,
            primary,
            secondary,
        }
    }

    /// The overall outcome classification.
    #[inline]
    pub fn outcome(&self) -> MovementOutcome {
        self.outcome
    }

    pub(crate) fn set_outcome(&mut self, outcome: MovementOutcome) {
        self.outcome = outcome;
    }

    /// The ordered checkpoints, first = current pose, last = final pose.
    #[inline]
    pub fn checkpoints(&self) -> &[Checkpoint] {
        &self.checkpoints
    }

    pub(crate) fn checkpoints_mut(
        &mut self,
    ) -> &mut ArrayVec<Checkpoint, MAX_CHECKPOINTS> {
        &mut self.checkpoints
    }

    /// The requested translation direction, if this was a translation.
    #[inline]
    pub fn primary(&self) -> Option<Direction> {
        self.primary
    }

    /// The secondary translation direction implied by a corner wrap or diagonal exit.
    #[inline]
    pub fn secondary(&self) -> Option<Direction> {
        self.secondary
    }

    /// The first checkpoint (the entity's pose when the transition begins).
    #[inline]
    pub fn start(&self) -> &Checkpoint {
        &self.checkpoints[0]
    }

    /// The last checkpoint (the entity's pose when the transition commits).
    #[inline]
    pub fn end(&self) -> &Checkpoint {
        &self.checkpoints[self.checkpoints.len() - 1]
    }

    /// Total straight-line length of the checkpoint polyline, in cells.
    pub fn length(&self) -> f64 {
        self.checkpoints
            .windows(2)
            .map(|w| (w[1].position() - w[0].position()).length())
            .sum()
    }
}

/// Displacement between two checkpoint positions.
pub(crate) fn displacement(a: &Checkpoint, b: &Checkpoint) -> FreeVector {
    b.position() - a.position()
}

//! Transition resolution: the decision procedure turning "entity + requested
//! direction" into an outcome, a target cell, and a target anchor.

use crate::dungeon::{anchor_neighbour, may_inhabit, AnchorLoc, Dungeon, Neighbour};
use crate::entity::EntityId;
use crate::math::{Cube, Direction};

use super::MovementOutcome;

/// Whether resolution enforces the occupancy gate.
///
/// The push cascade resolves forced moves with [`OccupancyCheck::Skip`]: a displaced
/// occupant bypasses its own occupancy gate (the cascade handles the next cell's
/// occupants itself) but never its geometry gate.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum OccupancyCheck {
    /// Occupied target cells yield [`MovementOutcome::Blocked`].
    Enforce,
    /// The occupancy gate is skipped; only geometry is checked.
    Skip,
}

/// Result of [`allows_transition()`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Resolution {
    /// The outcome classification.
    pub outcome: MovementOutcome,
    /// The cell the entity would end in. Equals the origin for rejections and
    /// in-place face changes.
    pub target: Cube,
    /// The anchor face the entity would end on; [`None`] if it leaves its surface.
    pub anchor: Option<Direction>,
    /// The secondary translation direction, for corner-wrap transitions spanning two
    /// cell steps.
    pub via: Option<Direction>,
}

impl Resolution {
    fn stay(outcome: MovementOutcome, origin: Cube, anchor: Option<Direction>) -> Self {
        Self {
            outcome,
            target: origin,
            anchor,
            via: None,
        }
    }
}

/// Resolves one movement request: may `id`, currently at `origin` on `origin_anchor`,
/// move one step in `direction`?
///
/// Always returns exactly one classification and never panics on game-state input;
/// requesting no direction at all is a caller bug and is refused loudly.
pub fn allows_transition(
    dungeon: &Dungeon,
    id: EntityId,
    origin: Cube,
    origin_anchor: Option<Direction>,
    direction: Option<Direction>,
    occupancy: OccupancyCheck,
) -> Resolution {
    let Some(entity) = dungeon.entity(id) else {
        log::error!("allows_transition for unregistered entity {id:?}");
        debug_assert!(false, "allows_transition for unregistered entity");
        return Resolution::stay(MovementOutcome::Refused, origin, origin_anchor);
    };

    // Rule 1: a request with no direction is a modeling bug, not a game state.
    let Some(direction) = direction else {
        log::error!("movement requested with no direction for {id:?}");
        debug_assert!(false, "movement requested with no direction");
        return Resolution::stay(MovementOutcome::Refused, origin, origin_anchor);
    };

    let origin_cell = dungeon.cell(origin);

    // Rule 2: furniture blocking that face outright.
    if origin_cell.is_some_and(|c| c.face_obstructed(direction)) {
        return Resolution::stay(MovementOutcome::Blocked, origin, origin_anchor);
    }

    // Rules 3–4: resolve the raw target via the anchor's lateral neighbor, or by
    // straight translation when unanchored or moving along the anchor normal.
    let (target, target_anchor, via) = match origin_anchor {
        Some(face) if direction == face => {
            // Pressing into the supporting surface.
            if origin_cell.is_some_and(|c| c.surface(face)) {
                return Resolution::stay(MovementOutcome::Blocked, origin, origin_anchor);
            }
            // No surface there after all (open trapdoor, illusory floor): fall through.
            (origin + direction, None, None)
        }
        Some(face) if direction == face.opposite() => {
            // Leaving the surface: a jump or hover away from the face.
            (origin + direction, None, None)
        }
        Some(face) => {
            let loc = AnchorLoc { cube: origin, face };
            match anchor_neighbour(dungeon, loc, direction, entity) {
                Neighbour::Refused => {
                    return Resolution::stay(MovementOutcome::Refused, origin, origin_anchor);
                }
                Neighbour::Inner(next) => (next.cube, Some(next.face), None),
                Neighbour::Adjacent(next) => (next.cube, Some(next.face), None),
                Neighbour::Outer { loc: next, via } => (next.cube, Some(next.face), Some(via)),
                Neighbour::Open => (origin + direction, None, None),
            }
        }
        None => (origin + direction, None, None),
    };

    // Rule 5: occupancy.
    if occupancy == OccupancyCheck::Enforce && target != origin && !may_inhabit(dungeon, target, id)
    {
        return Resolution::stay(MovementOutcome::Blocked, origin, origin_anchor);
    }

    // Rule 6: in-place anchor face change.
    if target == origin {
        let ok = origin_cell.is_some_and(|c| c.can_anchor_on(entity, target_anchor));
        return if ok {
            Resolution {
                outcome: MovementOutcome::NodeInternal,
                target,
                anchor: target_anchor,
                via: None,
            }
        } else {
            Resolution::stay(MovementOutcome::Blocked, origin, origin_anchor)
        };
    }

    let exit_ok = |cube: Cube, dir: Direction| {
        dungeon.cell(cube).is_none_or(|c| c.allow_exit(entity, dir))
    };
    let entry_ok = |cube: Cube, dir: Direction| {
        dungeon
            .cell(cube)
            .is_none_or(|c| c.allows_entry_from(entity, dir.opposite()))
    };

    // Rule 7: a plain single-step translation.
    let Some(secondary) = via else {
        debug_assert_eq!(target, origin + direction);
        let ok = exit_ok(origin, direction) && entry_ok(target, direction);
        return if ok {
            Resolution {
                outcome: MovementOutcome::NodeExit,
                target,
                anchor: target_anchor,
                via: None,
            }
        } else {
            Resolution::stay(MovementOutcome::Blocked, origin, origin_anchor)
        };
    };

    // Rule 8: a corner transition spanning two translations. Both orderings of
    // {primary, secondary} are acceptable if fully valid at every boundary.
    {
        // A non-cardinal implied displacement would be a modeling bug.
        let implied = (target - origin) - direction.grid_vector();
        if Direction::try_from(implied) != Ok(secondary) {
            log::error!(
                "corner transition implies non-cardinal secondary delta {implied:?} for {id:?}"
            );
            debug_assert!(false, "non-cardinal secondary delta");
            return Resolution::stay(MovementOutcome::Refused, origin, origin_anchor);
        }
    }

    let ordering_ok = |first: Direction, second: Direction| {
        let mid = origin + first;
        exit_ok(origin, first)
            && entry_ok(mid, first)
            && exit_ok(mid, second)
            && entry_ok(target, second)
    };
    if ordering_ok(direction, secondary) || ordering_ok(secondary, direction) {
        Resolution {
            outcome: MovementOutcome::NodeExit,
            target,
            anchor: target_anchor,
            via,
        }
    } else {
        Resolution::stay(MovementOutcome::Blocked, origin, origin_anchor)
    }
}

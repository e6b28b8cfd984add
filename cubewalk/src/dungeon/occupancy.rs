//! Cell coexistence rules and the cascading push resolver.

use core::fmt;

use hashbrown::HashSet;

use crate::entity::{Entity, EntityId, EntityKind};
use crate::math::{Cube, Direction};
use crate::movement::{allows_transition, MovementOutcome, OccupancyCheck};

use super::Dungeon;

/// Decides whether two entities may share one cell.
///
/// The policy is injected into [`Dungeon`] at construction and evaluated against both
/// the occupant set and the reservation set of a cell independently.
pub trait CoexistencePolicy: fmt::Debug {
    /// Returns whether `a` and `b` tolerate each other in the same cell.
    ///
    /// Implementations should be symmetric; the resolver does not promise an argument
    /// order.
    fn may_coexist(&self, a: &Entity, b: &Entity) -> bool;
}

/// Default coexistence rules: props share with everything; a player and a monster
/// never share; two entities of the same kind never share; everything else tolerates
/// each other.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultCoexistence;

impl CoexistencePolicy for DefaultCoexistence {
    fn may_coexist(&self, a: &Entity, b: &Entity) -> bool {
        use EntityKind::*;
        match (a.kind, b.kind) {
            (Prop, _) | (_, Prop) => true,
            (ka, kb) if ka == kb => false,
            (Player, Monster) | (Monster, Player) => false,
            _ => true,
        }
    }
}

/// Whether `id` may inhabit the cell at `target`, judged against that cell's current
/// occupants and reservation holders. Off-map coordinates are always habitable.
pub fn may_inhabit(dungeon: &Dungeon, target: Cube, id: EntityId) -> bool {
    let Some(entity) = dungeon.entity(id) else {
        return false;
    };
    let Some(cell) = dungeon.cell(target) else {
        return true;
    };
    cell.occupants()
        .iter()
        .chain(cell.reservations())
        .filter(|&&other| other != id)
        .all(|other| {
            dungeon
                .entity(*other)
                .is_none_or(|o| dungeon.policy().may_coexist(entity, o))
        })
}

/// The order in which displacement directions are tried for a pushed occupant:
/// the original push direction first, then down, then the remaining planar
/// cardinals, with up tried last. The direction that would bounce the occupant
/// straight back into the pusher is excluded by the caller.
///
/// This ordering is a tuning heuristic, not load-bearing; keep it in one place.
fn push_preference(travel: Direction) -> impl Iterator<Item = Direction> {
    let mut seen = [false; 6];
    [travel, Direction::Down]
        .into_iter()
        .chain(Direction::CARDINALS)
        .chain([Direction::Up])
        .filter(move |&d| {
            let i = d as usize - 1;
            !std::mem::replace(&mut seen[i], true)
        })
}

/// Admits `id` into the cell at `target`, displacing conflicting occupants if
/// necessary and possible. `travel` is the direction `id` is moving; conflicting
/// occupants are never pushed back against it.
///
/// Returns whether the cell is (now) habitable. A conflicting reservation holder is
/// mid-transition; displacing it would strand its in-flight commit, so the attempt
/// fails before anyone is moved. On failure partway through a cascade the dungeon is
/// left with any successfully displaced occupants in their new cells; the caller
/// reports Blocked/Refused and does not move `id`.
///
/// The cascade terminates: each entity is displaced at most once per admission
/// attempt, so the work is linear in the number of occupants involved.
pub(crate) fn admit_with_push(
    dungeon: &mut Dungeon,
    id: EntityId,
    target: Cube,
    travel: Direction,
    visited: &mut HashSet<EntityId>,
) -> bool {
    if may_inhabit(dungeon, target, id) {
        return true;
    }
    let Some(entity) = dungeon.entity(id) else {
        return false;
    };
    let Some(cell) = dungeon.cell(target) else {
        return true;
    };

    let conflicts = |other: EntityId| {
        dungeon
            .entity(other)
            .is_some_and(|o| !dungeon.policy().may_coexist(entity, o))
    };
    if cell
        .reservations()
        .iter()
        .any(|&other| other != id && conflicts(other))
    {
        return false;
    }

    let blockers: Vec<EntityId> = cell
        .occupants()
        .iter()
        .copied()
        .filter(|&other| other != id)
        .filter(|&other| conflicts(other))
        .collect();

    let forbidden = travel.opposite();
    for blocker in blockers {
        if !visited.insert(blocker) {
            // Already displaced once this cascade; give up rather than loop.
            return false;
        }
        let mut displaced = false;
        for direction in push_preference(travel).filter(|&d| d != forbidden) {
            let Some(occupant) = dungeon.entity(blocker) else {
                break;
            };
            let resolution = allows_transition(
                dungeon,
                blocker,
                occupant.cube,
                occupant.anchor,
                Some(direction),
                // The forced move bypasses the occupancy gate (cascading handles the
                // next cell's occupants below) but not the geometry gate.
                OccupancyCheck::Skip,
            );
            if resolution.outcome != MovementOutcome::NodeExit {
                continue;
            }
            if !admit_with_push(dungeon, blocker, resolution.target, direction, visited) {
                continue;
            }
            log::debug!(
                "pushing {blocker:?} {direction} out of {target:?} to admit {id:?}"
            );
            dungeon.relocate(blocker, resolution.target, resolution.anchor);
            displaced = true;
            break;
        }
        if !displaced {
            return false;
        }
    }
    may_inhabit(dungeon, target, id)
}

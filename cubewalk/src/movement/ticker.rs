//! The tick driver: owns in-flight transitions, advances them with elapsed time, and
//! commits their end states into the dungeon.

use std::time::Duration;

use arrayvec::ArrayVec;
use hashbrown::{HashMap, HashSet};

use crate::dungeon::{admit_with_push, AnchorLoc, Dungeon};
use crate::entity::{EntityId, TransportMode};
use crate::math::{Cube, Direction, FreeCoordinate};
use crate::Tick;

use super::{
    allows_transition, current_checkpoint, fall, interpret, traversal_at, Checkpoint,
    Interpolation, MoveRequest, MovementOutcome, OccupancyCheck, Place, Pose, Transition,
    MAX_CHECKPOINTS,
};

/// Events reported by [`Ticker::tick()`] as transitions progress and complete.
#[derive(Clone, Copy, Debug, PartialEq)]
#[non_exhaustive]
pub enum TickerEvent {
    /// An in-flight transition passed a checkpoint boundary.
    CheckpointChanged {
        /// The moving entity.
        entity: EntityId,
        /// Index of the checkpoint just reached.
        checkpoint: usize,
    },
    /// A transition finished and its end state was committed.
    Completed {
        /// The entity that finished moving.
        entity: EntityId,
        /// The transition's outcome classification.
        outcome: MovementOutcome,
    },
    /// An entity arrived on a cell carrying a pressure plate.
    PlatePressed {
        /// The arriving entity.
        entity: EntityId,
        /// The plated cell.
        cube: Cube,
    },
}

#[derive(Debug)]
struct ActiveTransition {
    transition: Transition,
    interpolation: Interpolation,
    progress: FreeCoordinate,
    duration: FreeCoordinate,
    reached: usize,
}

/// Drives transitions to completion over game ticks.
///
/// At most one transition per entity is in flight at a time; beginning a new one
/// finishes the previous one instantly. While a transition into another cell is in
/// flight, the target cell carries a reservation for the moving entity so that
/// concurrent movers cannot be granted the same cell.
#[derive(Debug, Default)]
pub struct Ticker {
    active: HashMap<EntityId, ActiveTransition>,
    pending: Vec<TickerEvent>,
}

impl Ticker {
    /// Constructs a ticker with no transitions in flight.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `id` has a transition in flight.
    #[inline]
    pub fn is_moving(&self, id: EntityId) -> bool {
        self.active.contains_key(&id)
    }

    /// The current interpolated pose of `id`'s in-flight transition, if any.
    pub fn pose(&self, id: EntityId) -> Option<Pose> {
        let entry = self.active.get(&id)?;
        Some(entry.interpolation.evaluate(entry.progress).0)
    }

    /// Interprets `request` for `id` and puts the resulting transition in flight,
    /// spread over `duration` of game time.
    ///
    /// Any previous transition of `id` is finished (committed at its end state)
    /// first; its events are reported by the next [`Self::tick()`].
    pub fn begin(
        &mut self,
        dungeon: &mut Dungeon,
        id: EntityId,
        request: MoveRequest,
        duration: Duration,
    ) -> MovementOutcome {
        let mut finished = self.finish(dungeon, id);
        self.pending.append(&mut finished);

        let transition = interpret(dungeon, id, request);
        self.begin_transition(dungeon, id, transition, duration)
    }

    /// Forces `id` one cell in `direction` regardless of occupancy, displacing any
    /// conflicting occupants of the target cell via the push cascade. Used for
    /// conveyors, shoves, and other involuntary movement.
    ///
    /// Geometry is still honored: a wall stops a forced move just like a voluntary
    /// one. Returns [`MovementOutcome::Blocked`] if the move or the cascade fails.
    pub fn force(
        &mut self,
        dungeon: &mut Dungeon,
        id: EntityId,
        direction: Direction,
        duration: Duration,
    ) -> MovementOutcome {
        let mut finished = self.finish(dungeon, id);
        self.pending.append(&mut finished);

        let Some(entity) = dungeon.entity(id) else {
            log::error!("force for unregistered entity {id:?}");
            debug_assert!(false, "force for unregistered entity");
            return MovementOutcome::Refused;
        };
        let (origin, origin_anchor) = (entity.cube, entity.anchor);
        let resolution = allows_transition(
            dungeon,
            id,
            origin,
            origin_anchor,
            Some(direction),
            OccupancyCheck::Skip,
        );
        if !matches!(
            resolution.outcome,
            MovementOutcome::NodeExit | MovementOutcome::NodeInternal
        ) {
            return MovementOutcome::Blocked;
        }
        if resolution.target != origin {
            let mut visited = HashSet::new();
            visited.insert(id);
            if !admit_with_push(dungeon, id, resolution.target, direction, &mut visited) {
                return MovementOutcome::Blocked;
            }
        }

        // The cascade may have rearranged occupants; re-read the mover's pose.
        let Some(entity) = dungeon.entity(id) else {
            return MovementOutcome::Refused;
        };
        let start = current_checkpoint(dungeon, entity);
        let end = Checkpoint {
            place: match resolution.anchor {
                Some(face) => Place::Anchored(AnchorLoc {
                    cube: resolution.target,
                    face,
                }),
                None => Place::Free(resolution.target.center()),
            },
            look: entity.look,
            traversal: traversal_at(dungeon, resolution.target, resolution.anchor),
        };
        let mut cps = ArrayVec::<Checkpoint, MAX_CHECKPOINTS>::new();
        cps.push(start);
        cps.push(end);
        let transition = Transition::new(cps, resolution.outcome, Some(direction), None);
        self.begin_transition(dungeon, id, transition, duration)
    }

    /// Begins falling transitions for every unsupported, non-flying, currently idle
    /// entity. Call once per gravity interval.
    pub fn apply_gravity(&mut self, dungeon: &mut Dungeon, duration: Duration) {
        let mut ids: Vec<EntityId> = dungeon
            .entities()
            .filter(|(id, e)| {
                e.anchor.is_none()
                    && !e.modes.contains(TransportMode::FLYING)
                    && !self.active.contains_key(id)
            })
            .map(|(id, _)| id)
            .collect();
        ids.sort();
        for id in ids {
            let transition = fall(dungeon, id);
            if transition.outcome().is_movement() {
                self.begin_transition(dungeon, id, transition, duration);
            } else if transition.outcome().is_rejection() {
                // The cell below is occupied: a falling body displaces whoever is
                // in the way rather than hovering on their head.
                self.force(dungeon, id, Direction::Down, duration);
            }
        }
    }

    fn begin_transition(
        &mut self,
        dungeon: &mut Dungeon,
        id: EntityId,
        transition: Transition,
        duration: Duration,
    ) -> MovementOutcome {
        let Some(entity) = dungeon.entity(id) else {
            return MovementOutcome::Refused;
        };
        let outcome = transition.outcome();
        let interpolation = Interpolation::new(entity, &transition);

        if outcome.is_movement() {
            if let Some(target) = transition.end().place.cube() {
                if target != entity.cube {
                    if let Some(cell) = dungeon.cell_mut(target) {
                        cell.reserve(id);
                    }
                }
            }
        }

        self.active.insert(
            id,
            ActiveTransition {
                transition,
                interpolation,
                progress: 0.0,
                // A zero duration completes on the next tick.
                duration: duration.as_secs_f64().max(1e-9),
                reached: 0,
            },
        );
        outcome
    }

    /// Advances all in-flight transitions by the tick's elapsed time, committing any
    /// that complete. Returns the events that occurred, in entity-id order.
    ///
    /// A paused tick reports pending events but advances nothing.
    pub fn tick(&mut self, dungeon: &mut Dungeon, tick: Tick) -> Vec<TickerEvent> {
        let mut events = std::mem::take(&mut self.pending);
        if tick.paused() {
            return events;
        }

        let mut ids: Vec<EntityId> = self.active.keys().copied().collect();
        ids.sort();
        for id in ids {
            let Some(entry) = self.active.get_mut(&id) else {
                continue;
            };
            entry.progress += tick.delta_t() / entry.duration;
            let reached = entry.interpolation.evaluate(entry.progress).1;
            for checkpoint in entry.reached + 1..=reached {
                events.push(TickerEvent::CheckpointChanged {
                    entity: id,
                    checkpoint,
                });
            }
            entry.reached = reached;
            if entry.progress >= 1.0 {
                if let Some(entry) = self.active.remove(&id) {
                    commit(dungeon, id, &entry, &mut events);
                }
            }
        }
        events
    }

    /// Instantly completes `id`'s in-flight transition, committing its end state.
    /// Returns the events produced; empty if nothing was in flight.
    pub fn finish(&mut self, dungeon: &mut Dungeon, id: EntityId) -> Vec<TickerEvent> {
        let Some(mut entry) = self.active.remove(&id) else {
            return Vec::new();
        };
        let mut events = Vec::new();
        entry.progress = 1.0;
        let reached = entry.transition.checkpoints().len() - 1;
        for checkpoint in entry.reached + 1..=reached {
            events.push(TickerEvent::CheckpointChanged {
                entity: id,
                checkpoint,
            });
        }
        commit(dungeon, id, &entry, &mut events);
        events
    }

    /// Instantly completes every in-flight transition, in entity-id order.
    pub fn finish_all(&mut self, dungeon: &mut Dungeon) -> Vec<TickerEvent> {
        let mut ids: Vec<EntityId> = self.active.keys().copied().collect();
        ids.sort();
        let mut events = std::mem::take(&mut self.pending);
        for id in ids {
            events.extend(self.finish(dungeon, id));
        }
        events
    }

    /// Cancels `id`'s in-flight transition without committing it: the entity stays at
    /// its origin and the target reservation is released.
    pub fn abandon(&mut self, dungeon: &mut Dungeon, id: EntityId) {
        let Some(entry) = self.active.remove(&id) else {
            return;
        };
        if let Some(target) = entry.transition.end().place.cube() {
            if let Some(cell) = dungeon.cell_mut(target) {
                cell.remove_reservation(id);
            }
        }
    }
}

/// Commits a completed transition: releases the reservation, moves the entity's
/// bookkeeping, applies arrival feature effects, and reports events.
fn commit(
    dungeon: &mut Dungeon,
    id: EntityId,
    entry: &ActiveTransition,
    events: &mut Vec<TickerEvent>,
) {
    let end = *entry.transition.end();
    let outcome = entry.transition.outcome();

    let target = end.place.cube();
    if let Some(target) = target {
        if let Some(cell) = dungeon.cell_mut(target) {
            cell.remove_reservation(id);
        }
    }

    if outcome.is_movement() {
        if let Some(target) = target {
            dungeon.relocate(id, target, end.place.anchor());
        }
    }
    if let Some(entity) = dungeon.entity_mut(id) {
        entity.look = end.look;
    }

    let arrived = matches!(
        outcome,
        MovementOutcome::NodeExit | MovementOutcome::Landing
    );
    if arrived {
        if let Some(cube) = target {
            apply_arrival_features(dungeon, id, cube, events);
        }
    }

    events.push(TickerEvent::Completed {
        entity: id,
        outcome,
    });
}

fn apply_arrival_features(
    dungeon: &mut Dungeon,
    id: EntityId,
    cube: Cube,
    events: &mut Vec<TickerEvent>,
) {
    let Some(cell) = dungeon.cell(cube) else {
        return;
    };
    let spinner = cell.spinner_turns();
    let teleporter = cell.teleporter_target();
    let plated = cell.has_pressure_plate();

    if let Some(quarter_turns) = spinner {
        if let Some(entity) = dungeon.entity_mut(id) {
            let up = entity.up();
            for _ in 0..quarter_turns.rem_euclid(4) {
                entity.look = entity.look.rotated_cw(up);
            }
        }
    }

    if plated {
        events.push(TickerEvent::PlatePressed { entity: id, cube });
    }

    if let Some(destination) = teleporter {
        let eligible = dungeon
            .entity(id)
            .is_some_and(|e| e.modes.contains(TransportMode::TELEPORTING));
        if eligible {
            let anchor = dungeon
                .entity(id)
                .zip(dungeon.cell(destination))
                .and_then(|(entity, cell)| {
                    cell.can_anchor_on(entity, Some(Direction::Down))
                        .then_some(Direction::Down)
                });
            log::debug!("teleporting {id:?} from {cube:?} to {destination:?}");
            dungeon.relocate(id, destination, anchor);
        }
    }
}

//! Interpreting movement requests into checkpointed [`Transition`]s.

use arrayvec::ArrayVec;

use crate::dungeon::{AnchorLoc, Dungeon, TraversalKind};
use crate::entity::{Entity, EntityId};
use crate::math::{Cube, Direction, FreeVector};

use super::{
    allows_transition, Checkpoint, MovementOutcome, OccupancyCheck, Place, Transition,
    MAX_CHECKPOINTS,
};

/// A relative quarter- or half-turn about the entity's up axis.
#[derive(Clone, Copy, Debug, Eq, PartialEq, exhaust::Exhaust)]
pub enum Turn {
    /// Counterclockwise quarter turn, viewed from above.
    Left,
    /// Clockwise quarter turn, viewed from above.
    Right,
    /// Half turn.
    Around,
}

/// One movement request, as issued by player input or monster AI.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MoveRequest {
    /// Rotate in place.
    Turn(Turn),
    /// Translate one cell in an absolute direction.
    Step(Direction),
}

impl MoveRequest {
    /// A step in the entity's look direction.
    #[inline]
    pub fn forward(entity: &Entity) -> Self {
        MoveRequest::Step(entity.look)
    }

    /// A step directly away from the look direction, without turning.
    #[inline]
    pub fn backward(entity: &Entity) -> Self {
        MoveRequest::Step(entity.look.opposite())
    }

    /// A sidestep to the entity's left.
    #[inline]
    pub fn strafe_left(entity: &Entity) -> Self {
        MoveRequest::Step(entity.look.rotated_ccw(entity.up()))
    }

    /// A sidestep to the entity's right.
    #[inline]
    pub fn strafe_right(entity: &Entity) -> Self {
        MoveRequest::Step(entity.look.rotated_cw(entity.up()))
    }

    /// A step along the entity's up direction (a jump or a climb upward).
    #[inline]
    pub fn rise(entity: &Entity) -> Self {
        MoveRequest::Step(entity.up())
    }

    /// A step along the entity's down direction.
    #[inline]
    pub fn descend(entity: &Entity) -> Self {
        MoveRequest::Step(entity.down())
    }
}

/// The traversal kind of the anchor at `cube`/`face`, or sensible defaults for
/// missing cells and unanchored motion. A staircase in the cell turns floor
/// traversal into discrete steps regardless of the anchor's own kind.
pub(crate) fn traversal_at(
    dungeon: &Dungeon,
    cube: Cube,
    face: Option<Direction>,
) -> TraversalKind {
    let Some(face) = face else {
        return TraversalKind::Jump;
    };
    let Some(cell) = dungeon.cell(cube) else {
        return TraversalKind::Walk;
    };
    if face == Direction::Down && cell.stairs_ascent().is_some() {
        return TraversalKind::Stairs;
    }
    cell.anchor(face).map_or(TraversalKind::Walk, |a| a.traversal())
}

/// The checkpoint describing `entity`'s current pose.
pub(crate) fn current_checkpoint(dungeon: &Dungeon, entity: &Entity) -> Checkpoint {
    let place = match entity.anchor {
        Some(face) => Place::Anchored(AnchorLoc {
            cube: entity.cube,
            face,
        }),
        None => Place::Free(entity.cube.center()),
    };
    Checkpoint {
        place,
        look: entity.look,
        traversal: traversal_at(dungeon, entity.cube, entity.anchor),
    }
}

fn stay(start: Checkpoint, outcome: MovementOutcome, primary: Option<Direction>) -> Transition {
    let mut cps = ArrayVec::<Checkpoint, MAX_CHECKPOINTS>::new();
    cps.push(start);
    cps.push(start);
    Transition::new(cps, outcome, primary, None)
}

/// A three-checkpoint lean-and-return: the entity visibly noses into the obstacle
/// before settling back where it began.
fn bounce(start: Checkpoint, direction: Direction, outcome: MovementOutcome) -> Transition {
    let lean = Checkpoint {
        place: Place::Free(start.position() + direction.normal_vector::<f64, Cube>() * 0.3),
        look: start.look,
        traversal: if outcome == MovementOutcome::Bouncing {
            TraversalKind::Jump
        } else {
            start.traversal
        },
    };
    let mut cps = ArrayVec::<Checkpoint, MAX_CHECKPOINTS>::new();
    cps.push(start);
    cps.push(lean);
    cps.push(start);
    Transition::new(cps, outcome, Some(direction), None)
}

/// Interprets one movement request for `id` against the current dungeon state,
/// producing the checkpointed transition to animate and later commit.
///
/// Interpretation never mutates the dungeon; committing the end state is the
/// [`Ticker`](super::Ticker)'s job.
pub fn interpret(dungeon: &Dungeon, id: EntityId, request: MoveRequest) -> Transition {
    let Some(entity) = dungeon.entity(id) else {
        log::error!("interpret for unregistered entity {id:?}");
        debug_assert!(false, "interpret for unregistered entity");
        let nowhere = Checkpoint {
            place: Place::Free(Cube::ORIGIN.center()),
            look: Direction::North,
            traversal: TraversalKind::Plain,
        };
        return stay(nowhere, MovementOutcome::Refused, None);
    };
    let start = current_checkpoint(dungeon, entity);

    match request {
        MoveRequest::Turn(turn) => interpret_turn(dungeon, entity, start, turn),
        MoveRequest::Step(direction) => interpret_step(dungeon, id, entity, start, direction),
    }
}

fn interpret_turn(
    dungeon: &Dungeon,
    entity: &Entity,
    start: Checkpoint,
    turn: Turn,
) -> Transition {
    let up = entity.up();
    let look = match turn {
        Turn::Left => entity.look.rotated_ccw(up),
        Turn::Right => entity.look.rotated_cw(up),
        Turn::Around => entity.look.rotated_180(up),
    };
    let rotatable = dungeon
        .cell(entity.cube)
        .is_none_or(|c| c.allows_rotation(entity, look));
    if !rotatable {
        return stay(start, MovementOutcome::Refused, None);
    }
    let mut cps = ArrayVec::<Checkpoint, MAX_CHECKPOINTS>::new();
    cps.push(start);
    cps.push(Checkpoint { look, ..start });
    Transition::new(cps, MovementOutcome::Grounded, None, None)
}

fn interpret_step(
    dungeon: &Dungeon,
    id: EntityId,
    entity: &Entity,
    start: Checkpoint,
    direction: Direction,
) -> Transition {
    let resolution = allows_transition(
        dungeon,
        id,
        entity.cube,
        entity.anchor,
        Some(direction),
        OccupancyCheck::Enforce,
    );

    match resolution.outcome {
        MovementOutcome::Refused => bounce(start, direction, MovementOutcome::Refused),
        MovementOutcome::Blocked => {
            if entity.anchor.is_none() && !entity.is_flying() {
                // Airborne collision: rebound rather than stop dead.
                bounce(start, direction, MovementOutcome::Bouncing)
            } else {
                stay(start, MovementOutcome::Blocked, Some(direction))
            }
        }
        MovementOutcome::NodeInternal => {
            internal_wrap(dungeon, entity, start, direction, resolution.anchor)
        }
        MovementOutcome::NodeExit => exit_step(dungeon, entity, start, direction, &resolution),
        outcome => {
            // The resolver only emits the above four.
            log::error!("unexpected resolution outcome {outcome:?}");
            debug_assert!(false, "unexpected resolution outcome");
            stay(start, MovementOutcome::Refused, Some(direction))
        }
    }
}

/// Same cell, new anchor face: wrap around the inner corner between the two faces.
fn internal_wrap(
    dungeon: &Dungeon,
    entity: &Entity,
    start: Checkpoint,
    direction: Direction,
    target_anchor: Option<Direction>,
) -> Transition {
    let Some(old_face) = entity.anchor else {
        log::error!("internal wrap without an origin anchor");
        debug_assert!(false, "internal wrap without an origin anchor");
        return stay(start, MovementOutcome::Refused, Some(direction));
    };
    let Some(new_face) = target_anchor else {
        log::error!("internal wrap without a target anchor");
        debug_assert!(false, "internal wrap without a target anchor");
        return stay(start, MovementOutcome::Refused, Some(direction));
    };

    // Walking towards the wall, then up it: look pivots away from the old floor.
    let look = if entity.rotation_follows_anchor {
        old_face.opposite()
    } else {
        entity.look
    };
    let end_traversal = traversal_at(dungeon, entity.cube, Some(new_face));
    let mid = Checkpoint {
        place: Place::Edge {
            cube: entity.cube,
            toward: direction,
            face: old_face,
        },
        look: entity.look,
        traversal: start.traversal,
    };
    let end = Checkpoint {
        place: Place::Anchored(AnchorLoc {
            cube: entity.cube,
            face: new_face,
        }),
        look,
        traversal: end_traversal,
    };
    let mut cps = ArrayVec::<Checkpoint, MAX_CHECKPOINTS>::new();
    cps.push(start);
    cps.push(mid);
    cps.push(end);
    Transition::new(cps, MovementOutcome::NodeInternal, Some(direction), None)
}

fn exit_step(
    dungeon: &Dungeon,
    entity: &Entity,
    start: Checkpoint,
    direction: Direction,
    resolution: &super::Resolution,
) -> Transition {
    let target = resolution.target;

    match resolution.anchor {
        // Anchored landing: flat continuation or corner wrap.
        Some(face) => {
            let mut end_traversal = traversal_at(dungeon, target, Some(face));
            // A net climb on a plain walking surface reads as scaling a ledge.
            let climb = (target - entity.cube).y;
            if climb > 0 && end_traversal == TraversalKind::Walk {
                end_traversal = TraversalKind::Scale;
            }

            let rise = (target.center().y - entity.cube.center().y).max(0.0);
            if rise > entity.abilities.max_scale_height
                && !matches!(end_traversal, TraversalKind::Climb | TraversalKind::Stairs)
                && start.traversal != TraversalKind::Climb
            {
                return bounce(start, direction, MovementOutcome::Refused);
            }

            let end = Checkpoint {
                place: Place::Anchored(AnchorLoc { cube: target, face }),
                look: match resolution.via {
                    // An outer wrap carries the look around the corner: the old
                    // anchor face becomes the direction of continued travel.
                    Some(via) if entity.rotation_follows_anchor => via,
                    _ => entity.look,
                },
                traversal: end_traversal,
            };
            let mut cps = ArrayVec::<Checkpoint, MAX_CHECKPOINTS>::new();
            cps.push(start);
            if let Some(via) = resolution.via {
                cps.push(Checkpoint {
                    place: Place::Edge {
                        cube: entity.cube + direction,
                        toward: via,
                        face: direction.opposite(),
                    },
                    look: entity.look,
                    traversal: start.traversal,
                });
            }
            cps.push(end);
            Transition::new(cps, MovementOutcome::NodeExit, Some(direction), resolution.via)
        }

        // Unanchored exit: flying continues freely; everything else becomes
        // airborne, or lands if stepping down onto a floor.
        None => {
            if entity.is_flying() {
                let end = Checkpoint {
                    place: Place::Free(target.center()),
                    look: entity.look,
                    traversal: TraversalKind::Plain,
                };
                let mut cps = ArrayVec::<Checkpoint, MAX_CHECKPOINTS>::new();
                cps.push(start);
                cps.push(end);
                return Transition::new(cps, MovementOutcome::NodeExit, Some(direction), None);
            }

            let lands = direction == Direction::Down
                && dungeon
                    .cell(target)
                    .is_some_and(|c| c.can_anchor_on(entity, Some(Direction::Down)));
            if lands {
                let end = Checkpoint {
                    place: Place::Anchored(AnchorLoc {
                        cube: target,
                        face: Direction::Down,
                    }),
                    look: entity.look,
                    traversal: TraversalKind::Jump,
                };
                let mut cps = ArrayVec::<Checkpoint, MAX_CHECKPOINTS>::new();
                cps.push(start);
                cps.push(end);
                return Transition::new(cps, MovementOutcome::Landing, Some(direction), None);
            }

            // Jumping a gap wider than the entity can clear rebounds mid-air.
            if entity.anchor.is_none() && direction.is_planar() {
                let run = (target.center() - entity.cube.center())
                    .component_mul(FreeVector::new(1.0, 0.0, 1.0));
                if run.length() > entity.abilities.max_forward_jump {
                    return bounce(start, direction, MovementOutcome::Bouncing);
                }
            }

            let mut cps = ArrayVec::<Checkpoint, MAX_CHECKPOINTS>::new();
            cps.push(start);
            if entity.anchor == Some(Direction::Down) && direction.is_planar() {
                // Walking off an edge: carry to the lip before dropping.
                cps.push(Checkpoint {
                    place: Place::Edge {
                        cube: entity.cube,
                        toward: direction,
                        face: Direction::Down,
                    },
                    look: entity.look,
                    traversal: start.traversal,
                });
            }
            cps.push(Checkpoint {
                place: Place::Free(target.center()),
                look: entity.look,
                traversal: TraversalKind::Jump,
            });
            Transition::new(cps, MovementOutcome::Ungrounded, Some(direction), None)
        }
    }
}

/// The gravity step: checks whether `id` is supported and, if not, produces the
/// transition carrying it one cell downward (or onto the floor beneath it).
///
/// Anchored and flying entities are simply [`MovementOutcome::Grounded`].
pub fn fall(dungeon: &Dungeon, id: EntityId) -> Transition {
    let Some(entity) = dungeon.entity(id) else {
        log::error!("fall for unregistered entity {id:?}");
        debug_assert!(false, "fall for unregistered entity");
        let nowhere = Checkpoint {
            place: Place::Free(Cube::ORIGIN.center()),
            look: Direction::North,
            traversal: TraversalKind::Plain,
        };
        return stay(nowhere, MovementOutcome::Refused, None);
    };
    let start = current_checkpoint(dungeon, entity);

    if entity.anchor.is_some() || entity.is_flying() {
        return stay(start, MovementOutcome::Grounded, None);
    }

    // Unanchored over a floor in the same cell: settle onto it.
    let settles = dungeon
        .cell(entity.cube)
        .is_some_and(|c| c.can_anchor_on(entity, Some(Direction::Down)));
    if settles {
        let end = Checkpoint {
            place: Place::Anchored(AnchorLoc {
                cube: entity.cube,
                face: Direction::Down,
            }),
            look: entity.look,
            traversal: TraversalKind::Jump,
        };
        let mut cps = ArrayVec::<Checkpoint, MAX_CHECKPOINTS>::new();
        cps.push(start);
        cps.push(end);
        return Transition::new(cps, MovementOutcome::Landing, Some(Direction::Down), None);
    }

    interpret(dungeon, id, MoveRequest::Step(Direction::Down))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dungeon::{Cell, Feature};
    use crate::entity::EntityKind;
    use pretty_assertions::assert_eq;

    fn floor_cell(cube: Cube) -> Cell {
        let mut cell = Cell::new(cube);
        cell.set_wall(Direction::Down, true);
        cell.add_anchor(Direction::Down, TraversalKind::Walk).unwrap();
        cell
    }

    fn two_cell_dungeon() -> (Dungeon, EntityId) {
        let mut dungeon = Dungeon::new();
        dungeon.insert_cell(floor_cell(Cube::ORIGIN));
        dungeon.insert_cell(floor_cell(Cube::new(0, 0, 1)));
        let id = dungeon
            .spawn(Entity::new(EntityKind::Player, Cube::ORIGIN))
            .unwrap();
        (dungeon, id)
    }

    #[test]
    fn forward_step_has_two_checkpoints() {
        let (dungeon, id) = two_cell_dungeon();
        let transition = interpret(&dungeon, id, MoveRequest::Step(Direction::North));
        assert_eq!(transition.outcome(), MovementOutcome::NodeExit);
        assert_eq!(transition.checkpoints().len(), 2);
        assert_eq!(
            transition.end().place,
            Place::Anchored(AnchorLoc {
                cube: Cube::new(0, 0, 1),
                face: Direction::Down,
            })
        );
        assert_eq!(transition.end().look, Direction::North);
    }

    #[test]
    fn turn_left_then_right_restores_look() {
        let (dungeon, id) = two_cell_dungeon();
        let left = interpret(&dungeon, id, MoveRequest::Turn(Turn::Left));
        assert_eq!(left.outcome(), MovementOutcome::Grounded);
        assert_eq!(left.end().look, Direction::West);

        let right = interpret(&dungeon, id, MoveRequest::Turn(Turn::Right));
        assert_eq!(right.end().look, Direction::East);

        let around = interpret(&dungeon, id, MoveRequest::Turn(Turn::Around));
        assert_eq!(around.end().look, Direction::South);
    }

    #[test]
    fn spinner_refuses_manual_turns() {
        let (mut dungeon, id) = two_cell_dungeon();
        dungeon
            .cell_mut(Cube::ORIGIN)
            .unwrap()
            .add_feature(Feature::Spinner { quarter_turns: 1 });
        let transition = interpret(&dungeon, id, MoveRequest::Turn(Turn::Left));
        assert_eq!(transition.outcome(), MovementOutcome::Refused);
        assert_eq!(transition.end().look, Direction::North);
    }

    #[test]
    fn blocked_step_stays_put() {
        let (mut dungeon, id) = two_cell_dungeon();
        dungeon
            .cell_mut(Cube::ORIGIN)
            .unwrap()
            .set_wall(Direction::North, true);
        let transition = interpret(&dungeon, id, MoveRequest::Step(Direction::North));
        assert_eq!(transition.outcome(), MovementOutcome::Blocked);
        assert_eq!(transition.checkpoints().len(), 2);
        assert_eq!(transition.start(), transition.end());
    }

    #[test]
    fn walking_off_an_edge_goes_airborne_via_the_lip() {
        let mut dungeon = Dungeon::new();
        dungeon.insert_cell(floor_cell(Cube::ORIGIN));
        let id = dungeon
            .spawn(Entity::new(EntityKind::Player, Cube::ORIGIN))
            .unwrap();
        let transition = interpret(&dungeon, id, MoveRequest::Step(Direction::East));
        assert_eq!(transition.outcome(), MovementOutcome::Ungrounded);
        assert_eq!(transition.checkpoints().len(), 3);
        assert_eq!(
            transition.checkpoints()[1].place,
            Place::Edge {
                cube: Cube::ORIGIN,
                toward: Direction::East,
                face: Direction::Down,
            }
        );
        assert_eq!(transition.end().traversal, TraversalKind::Jump);
    }

    #[test]
    fn falling_lands_on_the_floor_below() {
        let mut dungeon = Dungeon::new();
        dungeon.insert_cell(Cell::new(Cube::new(0, 1, 0)));
        dungeon.insert_cell(floor_cell(Cube::ORIGIN));
        let mut entity = Entity::new(EntityKind::Player, Cube::new(0, 1, 0));
        entity.anchor = None;
        let id = dungeon.spawn(entity).unwrap();

        let transition = fall(&dungeon, id);
        assert_eq!(transition.outcome(), MovementOutcome::Landing);
        assert_eq!(
            transition.end().place,
            Place::Anchored(AnchorLoc {
                cube: Cube::ORIGIN,
                face: Direction::Down,
            })
        );
    }

    #[test]
    fn anchored_entity_is_grounded() {
        let (dungeon, id) = two_cell_dungeon();
        let transition = fall(&dungeon, id);
        assert_eq!(transition.outcome(), MovementOutcome::Grounded);
    }

    #[test]
    fn ladder_top_wrap_produces_three_checkpoints() {
        use crate::entity::TransportMode;
        let mut dungeon = Dungeon::new();
        let mut below = Cell::new(Cube::ORIGIN);
        below.set_wall(Direction::North, true);
        below.add_feature(Feature::Ladder {
            face: Direction::North,
        });
        below.add_anchor(Direction::North, TraversalKind::Climb).unwrap();
        dungeon.insert_cell(below);
        dungeon.insert_cell(floor_cell(Cube::new(0, 1, 1)));

        let mut entity = Entity::new(EntityKind::Player, Cube::ORIGIN);
        entity.modes |= TransportMode::CLIMBING;
        entity.anchor = Some(Direction::North);
        entity.look = Direction::Up;
        entity.rotation_follows_anchor = true;
        let id = dungeon.spawn(entity).unwrap();

        let transition = interpret(&dungeon, id, MoveRequest::Step(Direction::Up));
        assert_eq!(transition.outcome(), MovementOutcome::NodeExit);
        assert_eq!(transition.checkpoints().len(), 3);
        assert_eq!(transition.secondary(), Some(Direction::North));
        // Coming over the lip, the look swings to the travel continuation.
        assert_eq!(transition.end().look, Direction::North);
        assert_eq!(
            transition.end().place,
            Place::Anchored(AnchorLoc {
                cube: Cube::new(0, 1, 1),
                face: Direction::Down,
            })
        );
    }

    #[test]
    fn stairs_feature_steps_the_floor_traversal() {
        let (mut dungeon, id) = two_cell_dungeon();
        dungeon
            .cell_mut(Cube::new(0, 0, 1))
            .unwrap()
            .add_feature(Feature::Stairs {
                face: Direction::North,
                ascent: Direction::North,
            });
        let transition = interpret(&dungeon, id, MoveRequest::Step(Direction::North));
        assert_eq!(transition.outcome(), MovementOutcome::NodeExit);
        assert_eq!(transition.end().traversal, TraversalKind::Stairs);
    }

    #[test]
    fn scale_limit_refuses_a_tall_ledge() {
        use crate::entity::TransportMode;
        // Same shape as the ladder-top wrap, but the wall anchor is a plain
        // walking surface, so the full-cell rise counts against scale reach.
        let mut dungeon = Dungeon::new();
        let mut below = Cell::new(Cube::ORIGIN);
        below.set_wall(Direction::North, true);
        below.add_feature(Feature::Ladder {
            face: Direction::North,
        });
        below.add_anchor(Direction::North, TraversalKind::Walk).unwrap();
        dungeon.insert_cell(below);
        dungeon.insert_cell(floor_cell(Cube::new(0, 1, 1)));

        let mut entity = Entity::new(EntityKind::Player, Cube::ORIGIN);
        entity.modes |= TransportMode::CLIMBING;
        entity.anchor = Some(Direction::North);
        entity.abilities.max_scale_height = 0.5;
        let id = dungeon.spawn(entity).unwrap();

        let transition = interpret(&dungeon, id, MoveRequest::Step(Direction::Up));
        assert_eq!(transition.outcome(), MovementOutcome::Refused);
        assert_eq!(transition.checkpoints().len(), 3);
        assert_eq!(transition.start().place, transition.end().place);
    }

    #[test]
    fn jump_limit_bounces_off_a_wide_gap() {
        let mut dungeon = Dungeon::new();
        dungeon.insert_cell(floor_cell(Cube::ORIGIN));
        let mut entity = Entity::new(EntityKind::Player, Cube::new(0, 1, 0));
        entity.anchor = None;
        entity.abilities.max_forward_jump = 0.5;
        let id = dungeon.spawn(entity).unwrap();

        let transition = interpret(&dungeon, id, MoveRequest::Step(Direction::North));
        assert_eq!(transition.outcome(), MovementOutcome::Bouncing);
        assert_eq!(transition.checkpoints().len(), 3);
        assert_eq!(transition.start().place, transition.end().place);
    }

    #[test]
    fn relative_requests_follow_look() {
        let (mut dungeon, id) = two_cell_dungeon();
        dungeon.entity_mut(id).unwrap().look = Direction::East;
        let entity = dungeon.entity(id).unwrap();
        assert_eq!(
            MoveRequest::forward(entity),
            MoveRequest::Step(Direction::East)
        );
        assert_eq!(
            MoveRequest::strafe_left(entity),
            MoveRequest::Step(Direction::North)
        );
        assert_eq!(
            MoveRequest::strafe_right(entity),
            MoveRequest::Step(Direction::South)
        );
        assert_eq!(
            MoveRequest::backward(entity),
            MoveRequest::Step(Direction::West)
        );
    }
}

//! Continuous evaluation of a [`Transition`]'s checkpoint polyline for rendering.

use arrayvec::ArrayVec;

use crate::dungeon::TraversalKind;
use crate::entity::Entity;
use crate::math::{Direction, FreeCoordinate, FreePoint, FreeVector};

use super::{displacement, Checkpoint, Place, Transition, MAX_CHECKPOINTS};

/// A continuous pose: where the entity's camera (or model) is and which way it faces.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pose {
    /// World position.
    pub position: FreePoint,
    /// Unit facing vector.
    pub forward: FreeVector,
    /// Unit up vector.
    pub up: FreeVector,
}

#[derive(Clone, Debug)]
struct Segment {
    from: Checkpoint,
    to: Checkpoint,
    from_up: FreeVector,
    to_up: FreeVector,
    length: FreeCoordinate,
}

/// Precomputed interpolation state for one transition.
///
/// Evaluation is pure: the same progress value always yields the same pose, progress
/// maps monotonically onto the polyline, and the endpoints are reproduced exactly at
/// progress 0 and 1.
#[derive(Clone, Debug)]
pub struct Interpolation {
    segments: ArrayVec<Segment, { MAX_CHECKPOINTS - 1 }>,
    total_length: FreeCoordinate,
    jump_height: FreeCoordinate,
}

/// The up vector an entity holds at a checkpoint: the anchor face's opposite when its
/// rotation tracks the anchor, global up otherwise.
fn checkpoint_up(entity: &Entity, checkpoint: &Checkpoint) -> FreeVector {
    if entity.rotation_follows_anchor {
        let face = match checkpoint.place {
            Place::Anchored(loc) => Some(loc.face),
            Place::Edge { face, .. } => Some(face),
            Place::Free(_) => None,
        };
        if let Some(face) = face {
            return face.opposite().normal_vector();
        }
    }
    Direction::Up.normal_vector()
}

fn smoothstep(t: FreeCoordinate) -> FreeCoordinate {
    t * t * (3.0 - 2.0 * t)
}

/// Quantizes `t` into `n` discrete sub-steps, each eased individually: the motion of
/// climbing rung by rung or stepping stair by stair.
fn quantized(t: FreeCoordinate, n: u32) -> FreeCoordinate {
    let n = FreeCoordinate::from(n);
    let scaled = t * n;
    let step = scaled.floor().min(n - 1.0);
    (step + smoothstep(scaled - step)) / n
}

/// Linear interpolation between two unit vectors, renormalized. Falls back to the
/// destination when the inputs cancel (a half turn).
fn lerp_dir(a: FreeVector, b: FreeVector, t: FreeCoordinate) -> FreeVector {
    let v = a * (1.0 - t) + b * t;
    let len = v.length();
    if len < 1e-6 {
        b
    } else {
        v / len
    }
}

impl Interpolation {
    /// Precomputes interpolation state for `transition` as performed by `entity`.
    pub fn new(entity: &Entity, transition: &Transition) -> Self {
        let mut segments = ArrayVec::new();
        for pair in transition.checkpoints().windows(2) {
            let (from, to) = (pair[0], pair[1]);
            segments.push(Segment {
                from,
                to,
                from_up: checkpoint_up(entity, &from),
                to_up: checkpoint_up(entity, &to),
                length: displacement(&from, &to).length(),
            });
        }
        let total_length = segments.iter().map(|s| s.length).sum();
        Self {
            segments,
            total_length,
            jump_height: entity.abilities.jump_height,
        }
    }

    /// Evaluates the pose at `progress` in `[0, 1]`, clamping out-of-range input.
    ///
    /// Also returns the index of the last checkpoint reached: 0 until the first
    /// segment completes, `checkpoints.len() - 1` at progress 1.
    pub fn evaluate(&self, progress: FreeCoordinate) -> (Pose, usize) {
        let t = progress.clamp(0.0, 1.0);
        let (index, local) = self.locate(t);
        let segment = &self.segments[index];
        let reached = if t >= 1.0 { index + 1 } else { index };

        let pose = self.evaluate_segment(segment, local);
        (pose, reached)
    }

    /// Maps overall progress to (segment index, local parameter), weighting each
    /// segment by its share of the polyline length. Zero-length transitions (turns,
    /// refusals in place) divide progress evenly.
    fn locate(&self, t: FreeCoordinate) -> (usize, FreeCoordinate) {
        let n = self.segments.len();
        debug_assert!(n > 0);
        if self.total_length <= 0.0 {
            let scaled = t * n as FreeCoordinate;
            let index = (scaled.floor() as usize).min(n - 1);
            return (index, scaled - index as FreeCoordinate);
        }
        let mut acc = 0.0;
        for (index, segment) in self.segments.iter().enumerate() {
            let weight = segment.length / self.total_length;
            if t <= acc + weight || index == n - 1 {
                let local = if weight <= 0.0 {
                    1.0
                } else {
                    ((t - acc) / weight).clamp(0.0, 1.0)
                };
                return (index, local);
            }
            acc += weight;
        }
        (n - 1, 1.0)
    }

    fn evaluate_segment(&self, segment: &Segment, local: FreeCoordinate) -> Pose {
        let from = segment.from.position();
        let chord = segment.to.position() - from;
        let up = lerp_dir(segment.from_up, segment.to_up, smoothstep(local));

        let (eased, arc) = match segment.to.traversal {
            TraversalKind::Conveyor => (local, 0.0),
            TraversalKind::Climb => (quantized(local, 3), 0.0),
            TraversalKind::Stairs => (quantized(local, 2), 0.0),
            TraversalKind::Jump => {
                // Rising and level hops arc; a plain drop falls straight.
                let falling = chord.dot(up) < -1e-9;
                let arc = if falling {
                    0.0
                } else {
                    4.0 * self.jump_height * local * (1.0 - local)
                };
                (local, arc)
            }
            TraversalKind::Plain | TraversalKind::Walk | TraversalKind::Scale => {
                (smoothstep(local), 0.0)
            }
        };

        let position = from + chord * eased + up * arc;
        let forward = lerp_dir(
            segment.from.look.normal_vector(),
            segment.to.look.normal_vector(),
            smoothstep(local),
        );
        Pose {
            position,
            forward,
            up,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dungeon::{AnchorLoc, Dungeon, TraversalKind};
    use crate::entity::EntityKind;
    use crate::math::Cube;
    use crate::movement::{MoveRequest, MovementOutcome, Transition};
    use arrayvec::ArrayVec;
    use euclid::{point3, vec3};
    use pretty_assertions::assert_eq;

    fn checkpointed(
        checkpoints: Vec<Checkpoint>,
        outcome: MovementOutcome,
    ) -> Transition {
        let cps: ArrayVec<Checkpoint, MAX_CHECKPOINTS> = checkpoints.into_iter().collect();
        Transition::new(cps, outcome, None, None)
    }

    fn walker() -> Entity {
        Entity::new(EntityKind::Player, Cube::ORIGIN)
    }

    fn anchored(cube: Cube, traversal: TraversalKind) -> Checkpoint {
        Checkpoint {
            place: Place::Anchored(AnchorLoc {
                cube,
                face: Direction::Down,
            }),
            look: Direction::North,
            traversal,
        }
    }

    #[test]
    fn endpoints_are_exact() {
        let start = anchored(Cube::ORIGIN, TraversalKind::Walk);
        let end = anchored(Cube::new(0, 0, 1), TraversalKind::Walk);
        let transition = checkpointed(vec![start, end], MovementOutcome::NodeExit);
        let interp = Interpolation::new(&walker(), &transition);

        assert_eq!(interp.evaluate(0.0).0.position, start.position());
        assert_eq!(interp.evaluate(1.0).0.position, end.position());
        assert_eq!(interp.evaluate(0.0).1, 0);
        assert_eq!(interp.evaluate(1.0).1, 1);
    }

    #[test]
    fn progress_is_monotonic_along_a_straight_walk() {
        let start = anchored(Cube::ORIGIN, TraversalKind::Walk);
        let end = anchored(Cube::new(0, 0, 1), TraversalKind::Walk);
        let transition = checkpointed(vec![start, end], MovementOutcome::NodeExit);
        let interp = Interpolation::new(&walker(), &transition);

        let mut last = -1.0;
        for i in 0..=20 {
            let z = interp.evaluate(f64::from(i) / 20.0).0.position.z;
            assert!(z >= last, "not monotonic at step {i}");
            last = z;
        }
    }

    #[test]
    fn jump_arcs_above_the_chord() {
        let start = anchored(Cube::ORIGIN, TraversalKind::Walk);
        let end = Checkpoint {
            place: Place::Free(point3(0.5, 0.0, 1.5)),
            look: Direction::North,
            traversal: TraversalKind::Jump,
        };
        let transition = checkpointed(vec![start, end], MovementOutcome::Ungrounded);
        let interp = Interpolation::new(&walker(), &transition);

        // Apex: halfway, lifted by 4 * h * 0.25 = h.
        let apex = interp.evaluate(0.5).0.position;
        assert_eq!(apex.y, walker().abilities.jump_height);
        // Endpoints unaffected by the arc.
        assert_eq!(interp.evaluate(1.0).0.position, point3(0.5, 0.0, 1.5));
    }

    #[test]
    fn falling_is_linear_without_an_arc() {
        let start = Checkpoint {
            place: Place::Free(point3(0.5, 1.5, 0.5)),
            look: Direction::North,
            traversal: TraversalKind::Jump,
        };
        let end = Checkpoint {
            place: Place::Free(point3(0.5, 0.5, 0.5)),
            look: Direction::North,
            traversal: TraversalKind::Jump,
        };
        let transition = checkpointed(vec![start, end], MovementOutcome::Ungrounded);
        let interp = Interpolation::new(&walker(), &transition);

        assert_eq!(interp.evaluate(0.25).0.position, point3(0.5, 1.25, 0.5));
        assert_eq!(interp.evaluate(0.75).0.position, point3(0.5, 0.75, 0.5));
    }

    #[test]
    fn climb_quantizes_into_rungs() {
        let start = Checkpoint {
            place: Place::Anchored(AnchorLoc {
                cube: Cube::ORIGIN,
                face: Direction::North,
            }),
            look: Direction::Up,
            traversal: TraversalKind::Climb,
        };
        let end = Checkpoint {
            place: Place::Anchored(AnchorLoc {
                cube: Cube::new(0, 1, 0),
                face: Direction::North,
            }),
            look: Direction::Up,
            traversal: TraversalKind::Climb,
        };
        let transition = checkpointed(vec![start, end], MovementOutcome::NodeExit);
        let interp = Interpolation::new(&walker(), &transition);

        // Rung boundaries land at exact thirds of the climb.
        let third = interp.evaluate(1.0 / 3.0).0.position.y;
        assert!((third - (0.5 + 1.0 / 3.0)).abs() < 1e-9, "got {third}");
        // Motion never reverses.
        let mut last = -1.0;
        for i in 0..=30 {
            let y = interp.evaluate(f64::from(i) / 30.0).0.position.y;
            assert!(y >= last - 1e-12);
            last = y;
        }
    }

    #[test]
    fn turn_rotates_forward_in_place() {
        let mut dungeon = Dungeon::new();
        let mut cell = crate::dungeon::Cell::new(Cube::ORIGIN);
        cell.set_wall(Direction::Down, true);
        cell.add_anchor(Direction::Down, TraversalKind::Walk).unwrap();
        dungeon.insert_cell(cell);
        let id = dungeon.spawn(walker()).unwrap();

        let transition = crate::movement::interpret(
            &dungeon,
            id,
            MoveRequest::Turn(crate::movement::Turn::Right),
        );
        let interp = Interpolation::new(dungeon.entity(id).unwrap(), &transition);

        let begin = interp.evaluate(0.0).0;
        let end = interp.evaluate(1.0).0;
        assert_eq!(begin.forward, vec3(0.0, 0.0, 1.0));
        assert_eq!(end.forward, vec3(1.0, 0.0, 0.0));
        // The position never moves during a turn.
        assert_eq!(begin.position, end.position);
        let mid = interp.evaluate(0.5).0;
        assert_eq!(mid.position, begin.position);
    }

    #[test]
    fn checkpoint_index_advances_per_segment() {
        let start = anchored(Cube::ORIGIN, TraversalKind::Walk);
        let mid = Checkpoint {
            place: Place::Edge {
                cube: Cube::ORIGIN,
                toward: Direction::North,
                face: Direction::Down,
            },
            look: Direction::North,
            traversal: TraversalKind::Walk,
        };
        let end = anchored(Cube::new(0, 0, 1), TraversalKind::Walk);
        let transition = checkpointed(vec![start, mid, end], MovementOutcome::NodeExit);
        let interp = Interpolation::new(&walker(), &transition);

        assert_eq!(interp.evaluate(0.1).1, 0);
        assert_eq!(interp.evaluate(0.9).1, 1);
        assert_eq!(interp.evaluate(1.0).1, 2);
    }
}

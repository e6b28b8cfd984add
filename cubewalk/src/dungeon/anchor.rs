//! Anchors: the attachment of entities to one face of one cell, and the resolution
//! of "who is my neighbor in direction D" across faces and cells.

use hashbrown::HashSet;

use crate::entity::{Entity, EntityId};
use crate::math::{Cube, Direction};

use super::Dungeon;

/// How an entity moves across an anchored surface. Determines the easing used when a
/// transition across the surface is animated.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, exhaust::Exhaust)]
pub enum TraversalKind {
    /// A plain surface with no special motion.
    Plain,
    /// Ordinary walking.
    Walk,
    /// A conveyor belt; motion across it is strictly linear.
    Conveyor,
    /// Ladder climbing; motion quantizes into discrete rungs.
    Climb,
    /// Stair climbing; motion quantizes into discrete steps.
    Stairs,
    /// Airborne motion: jumps, falls, and bounces.
    Jump,
    /// Scaling a ledge one cell up.
    Scale,
}

/// One face of one cell that entities may be anchored to.
///
/// An anchor always belongs to exactly one [`Cell`](super::Cell) and one face; it is
/// stored inside its owning cell and addressed externally by [`AnchorLoc`].
#[derive(Clone, Debug, PartialEq)]
pub struct Anchor {
    face: Direction,
    traversal: TraversalKind,
    entities: HashSet<EntityId>,
}

impl Anchor {
    pub(crate) fn new(face: Direction, traversal: TraversalKind) -> Self {
        Self {
            face,
            traversal,
            entities: HashSet::new(),
        }
    }

    /// The face of the owning cell this anchor occupies.
    #[inline]
    pub fn face(&self) -> Direction {
        self.face
    }

    /// How entities move across this surface.
    #[inline]
    pub fn traversal(&self) -> TraversalKind {
        self.traversal
    }

    /// The entities currently attached to this anchor.
    #[inline]
    pub fn entities(&self) -> &HashSet<EntityId> {
        &self.entities
    }

    pub(crate) fn attach(&mut self, id: EntityId) {
        self.entities.insert(id);
    }

    pub(crate) fn detach(&mut self, id: EntityId) -> bool {
        self.entities.remove(&id)
    }
}

/// Addresses an [`Anchor`] without borrowing it: the owning cell's coordinate plus
/// the face.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct AnchorLoc {
    /// Coordinate of the owning cell.
    pub cube: Cube,
    /// Face of the owning cell.
    pub face: Direction,
}

/// Result of [`anchor_neighbour()`]: where an entity keeping its surface attachment
/// would end up when moving laterally in some direction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Neighbour {
    /// Same cell, different face: the entity wraps around an inner cube corner
    /// (e.g. from the floor up onto a ladder wall).
    Inner(AnchorLoc),
    /// Adjacent cell, same face: the entity continues along a flat strip of surface.
    Adjacent(AnchorLoc),
    /// Around an outer (convex) cube corner: one step in the travel direction, a
    /// half-step "down" along the old face, ending on the face opposite the travel
    /// direction. `via` is the secondary translation implied by the wrap.
    Outer {
        /// Where the entity ends up.
        loc: AnchorLoc,
        /// The secondary translation direction (the old anchor face).
        via: Direction,
    },
    /// No surface continues in that direction; the entity would leave the surface.
    Open,
    /// The surface forbids that lateral movement outright (ladders do not permit
    /// strafing sideways off the rungs).
    Refused,
}

/// Given an entity anchored at `origin`, determine what anchor (possibly on a
/// different cell, possibly the same cell with a different face) it would end up on
/// if it moved in `direction` while keeping its face attachment.
///
/// `direction` must be perpendicular to the anchored face to name an edge of the
/// surface; directions along the face normal are not lateral moves and yield
/// [`Neighbour::Open`], leaving the transition resolver to distinguish pressing into
/// the surface from leaving it.
pub fn anchor_neighbour(
    dungeon: &Dungeon,
    origin: AnchorLoc,
    direction: Direction,
    entity: &Entity,
) -> Neighbour {
    let AnchorLoc { cube, face } = origin;

    // Not an edge direction: moving along the anchor normal leaves or presses into
    // the surface, which is the resolver's business, not a lateral neighbor.
    if direction.axis() == face.axis() {
        return Neighbour::Open;
    }

    let origin_cell = dungeon.cell(cube);

    // Ladders restrict lateral movement: no strafing off the rungs. Movement along
    // the ladder (perpendicular to both the wall normal and the strafe axis) is fine.
    if let Some(anchor) = origin_cell.and_then(|c| c.anchor(face)) {
        if anchor.traversal() == TraversalKind::Climb && direction.is_planar() && face.is_planar()
        {
            return Neighbour::Refused;
        }
    }

    // Inner corner: the same cell has an anchor on the face reached by rotating the
    // anchor face a quarter turn towards the travel direction — which is the travel
    // direction itself.
    if let Some(cell) = origin_cell {
        if cell.anchor(direction).is_some() && cell.can_anchor_on(entity, Some(direction)) {
            return Neighbour::Inner(AnchorLoc {
                cube,
                face: direction,
            });
        }
    }

    // Flat continuation: the adjacent cell carries an anchor on the same face.
    let adjacent = cube + direction;
    if let Some(cell) = dungeon.cell(adjacent) {
        if cell.anchor(face).is_some() && cell.can_anchor_on(entity, Some(face)) {
            return Neighbour::Adjacent(AnchorLoc {
                cube: adjacent,
                face,
            });
        }
    }

    // Outer convex corner: descend one half-step along the old face and re-check
    // anchoring on the face opposite the travel direction.
    let around = cube + direction + face;
    let wrapped_face = direction.opposite();
    if let Some(cell) = dungeon.cell(around) {
        if cell.anchor(wrapped_face).is_some() && cell.can_anchor_on(entity, Some(wrapped_face)) {
            return Neighbour::Outer {
                loc: AnchorLoc {
                    cube: around,
                    face: wrapped_face,
                },
                via: face,
            };
        }
    }

    Neighbour::Open
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dungeon::Cell;
    use crate::entity::{EntityKind, TransportMode};
    use pretty_assertions::assert_eq;

    fn walker() -> Entity {
        Entity::new(EntityKind::Player, Cube::ORIGIN)
    }

    fn climber() -> Entity {
        let mut entity = walker();
        entity.modes |= TransportMode::CLIMBING;
        entity.rotation_follows_anchor = true;
        entity
    }

    fn floor_cell(cube: Cube) -> Cell {
        let mut cell = Cell::new(cube);
        cell.set_wall(Direction::Down, true);
        cell.add_anchor(Direction::Down, TraversalKind::Walk).unwrap();
        cell
    }

    #[test]
    fn flat_continuation_across_cells() {
        let mut dungeon = Dungeon::new();
        dungeon.insert_cell(floor_cell(Cube::ORIGIN));
        dungeon.insert_cell(floor_cell(Cube::new(0, 0, 1)));

        let origin = AnchorLoc {
            cube: Cube::ORIGIN,
            face: Direction::Down,
        };
        assert_eq!(
            anchor_neighbour(&dungeon, origin, Direction::North, &walker()),
            Neighbour::Adjacent(AnchorLoc {
                cube: Cube::new(0, 0, 1),
                face: Direction::Down,
            })
        );
    }

    #[test]
    fn inner_corner_onto_ladder_wall() {
        let mut dungeon = Dungeon::new();
        let mut cell = floor_cell(Cube::ORIGIN);
        cell.set_wall(Direction::North, true);
        cell.add_feature(crate::dungeon::Feature::Ladder {
            face: Direction::North,
        });
        cell.add_anchor(Direction::North, TraversalKind::Climb).unwrap();
        dungeon.insert_cell(cell);

        let origin = AnchorLoc {
            cube: Cube::ORIGIN,
            face: Direction::Down,
        };
        // A climbing-capable entity wraps onto the wall; a plain walker cannot.
        assert_eq!(
            anchor_neighbour(&dungeon, origin, Direction::North, &climber()),
            Neighbour::Inner(AnchorLoc {
                cube: Cube::ORIGIN,
                face: Direction::North,
            })
        );
        assert_eq!(
            anchor_neighbour(&dungeon, origin, Direction::North, &walker()),
            Neighbour::Open
        );
    }

    #[test]
    fn open_space_past_the_edge() {
        let mut dungeon = Dungeon::new();
        dungeon.insert_cell(floor_cell(Cube::ORIGIN));

        let origin = AnchorLoc {
            cube: Cube::ORIGIN,
            face: Direction::Down,
        };
        assert_eq!(
            anchor_neighbour(&dungeon, origin, Direction::East, &walker()),
            Neighbour::Open
        );
    }

    #[test]
    fn outer_corner_around_a_ladder_edge() {
        // Climbing up a north-mounted ladder and over the top edge onto the floor
        // above: one step up, a half-step north, anchored down.
        let mut dungeon = Dungeon::new();
        let mut below = Cell::new(Cube::ORIGIN);
        below.set_wall(Direction::North, true);
        below.add_feature(crate::dungeon::Feature::Ladder {
            face: Direction::North,
        });
        below.add_anchor(Direction::North, TraversalKind::Climb).unwrap();
        dungeon.insert_cell(below);
        dungeon.insert_cell(floor_cell(Cube::new(0, 1, 1)));

        let origin = AnchorLoc {
            cube: Cube::ORIGIN,
            face: Direction::North,
        };
        assert_eq!(
            anchor_neighbour(&dungeon, origin, Direction::Up, &climber()),
            Neighbour::Outer {
                loc: AnchorLoc {
                    cube: Cube::new(0, 1, 1),
                    face: Direction::Down,
                },
                via: Direction::North,
            }
        );
    }

    #[test]
    fn ladder_refuses_strafe() {
        let mut dungeon = Dungeon::new();
        let mut cell = Cell::new(Cube::ORIGIN);
        cell.set_wall(Direction::North, true);
        cell.add_feature(crate::dungeon::Feature::Ladder {
            face: Direction::North,
        });
        cell.add_anchor(Direction::North, TraversalKind::Climb).unwrap();
        dungeon.insert_cell(cell);

        let origin = AnchorLoc {
            cube: Cube::ORIGIN,
            face: Direction::North,
        };
        assert_eq!(
            anchor_neighbour(&dungeon, origin, Direction::East, &climber()),
            Neighbour::Refused
        );
    }
}

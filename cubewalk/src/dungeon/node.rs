//! One cubic cell of the dungeon: its walls, anchors, features, occupants, and the
//! directional gate methods consulted by transition resolution.

use core::fmt;

use hashbrown::{HashMap, HashSet};

use crate::entity::{Entity, EntityId};
use crate::math::{Cube, Direction};

use super::{Anchor, Feature, OverrideKind, TraversalKind};

/// Error from [`Cell::add_anchor()`]: the face already carries an anchor.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct AnchorError {
    /// The face that was already occupied.
    pub face: Direction,
}

impl fmt::Display for AnchorError {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cell face {} already carries an anchor", self.face)
    }
}

impl std::error::Error for AnchorError {}

/// One cube-shaped grid unit of the dungeon.
///
/// A cell owns up to six [`Anchor`]s (one per face), per-face wall flags, a list of
/// [`Feature`] modifiers, the sets of occupying and reserving entities, and the
/// ref-counted directional overrides installed by feature scripts. Cells are created
/// during dungeon construction and persist for the dungeon's lifetime; the occupant
/// and reservation sets mutate continuously during play.
#[derive(Clone, Debug, PartialEq)]
pub struct Cell {
    cube: Cube,
    anchors: [Option<Anchor>; 6],
    walls: [bool; 6],
    features: Vec<Feature>,
    occupants: HashSet<EntityId>,
    reservations: HashSet<EntityId>,
    overrides: HashMap<(Direction, OverrideKind), u32>,
}

/// `Direction` discriminants start at 1; anchors and walls are arrays of 6.
#[inline]
fn face_index(face: Direction) -> usize {
    face as usize - 1
}

impl Cell {
    /// Constructs an empty cell: no walls, no anchors, no features.
    pub fn new(cube: Cube) -> Self {
        Self {
            cube,
            anchors: [const { None }; 6],
            walls: [false; 6],
            features: Vec::new(),
            occupants: HashSet::new(),
            reservations: HashSet::new(),
            overrides: HashMap::new(),
        }
    }

    /// The grid coordinate of this cell.
    #[inline]
    pub fn cube(&self) -> Cube {
        self.cube
    }

    // --- Construction-time shape ---

    /// Sets whether a wall (or, for [`Direction::Down`], a floor; for
    /// [`Direction::Up`], a ceiling) is present on the given face.
    #[inline]
    pub fn set_wall(&mut self, face: Direction, present: bool) {
        self.walls[face_index(face)] = present;
    }

    /// Returns the raw wall flag for the given face, ignoring overrides.
    #[inline]
    pub fn wall(&self, face: Direction) -> bool {
        self.walls[face_index(face)]
    }

    /// Appends a feature modifier to this cell.
    #[inline]
    pub fn add_feature(&mut self, feature: Feature) {
        self.features.push(feature);
    }

    /// The feature modifiers attached to this cell.
    #[inline]
    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    /// Places an anchor on the given face.
    pub fn add_anchor(
        &mut self,
        face: Direction,
        traversal: TraversalKind,
    ) -> Result<(), AnchorError> {
        let slot = &mut self.anchors[face_index(face)];
        if slot.is_some() {
            return Err(AnchorError { face });
        }
        *slot = Some(Anchor::new(face, traversal));
        Ok(())
    }

    /// Removes and returns the anchor on the given face, if any. Any entities still
    /// attached come along with it; callers tearing down a face mid-play must
    /// re-anchor them.
    pub fn remove_anchor(&mut self, face: Direction) -> Option<Anchor> {
        self.anchors[face_index(face)].take()
    }

    /// The anchor on the given face, if any.
    #[inline]
    pub fn anchor(&self, face: Direction) -> Option<&Anchor> {
        self.anchors[face_index(face)].as_ref()
    }

    pub(crate) fn anchor_mut(&mut self, face: Direction) -> Option<&mut Anchor> {
        self.anchors[face_index(face)].as_mut()
    }

    // --- Feature lookups ---

    /// Whether a ladder is mounted on the given face.
    pub fn ladder_on(&self, face: Direction) -> bool {
        self.features
            .iter()
            .any(|f| matches!(f, Feature::Ladder { face: lf } if *lf == face))
    }

    fn door_closed_on(&self, face: Direction) -> bool {
        self.features
            .iter()
            .any(|f| matches!(f, Feature::Door { face: df, open: false } if *df == face))
    }

    fn trapdoor_open(&self) -> bool {
        self.features
            .iter()
            .any(|f| matches!(f, Feature::Trapdoor { open: true }))
    }

    fn trapdoor_closed(&self) -> bool {
        self.features
            .iter()
            .any(|f| matches!(f, Feature::Trapdoor { open: false }))
    }

    fn spikes_extended(&self) -> bool {
        self.features
            .iter()
            .any(|f| matches!(f, Feature::Spikes { extended: true }))
    }

    /// Planar ascent direction of this cell's ramp, if it has one.
    pub fn ramp_ascent(&self) -> Option<Direction> {
        self.features.iter().find_map(|f| match f {
            Feature::Ramp { ascent } => Some(*ascent),
            _ => None,
        })
    }

    /// Planar ascent direction of this cell's staircase, if it has one.
    pub fn stairs_ascent(&self) -> Option<Direction> {
        self.features.iter().find_map(|f| match f {
            Feature::Stairs { ascent, .. } => Some(*ascent),
            _ => None,
        })
    }

    /// Teleporter destination, if this cell has a teleporter.
    pub fn teleporter_target(&self) -> Option<Cube> {
        self.features.iter().find_map(|f| match f {
            Feature::Teleporter { target } => Some(*target),
            _ => None,
        })
    }

    /// Quarter turns applied by this cell's spinner, if it has one.
    pub fn spinner_turns(&self) -> Option<i8> {
        self.features.iter().find_map(|f| match f {
            Feature::Spinner { quarter_turns } => Some(*quarter_turns),
            _ => None,
        })
    }

    /// Whether this cell carries a pressure plate.
    pub fn has_pressure_plate(&self) -> bool {
        self.features.iter().any(|f| matches!(f, Feature::PressurePlate))
    }

    // --- Overrides ---

    /// Installs a directional override. Overrides are reference-counted; each call
    /// must be balanced by one [`Self::remove_override()`].
    pub fn add_override(&mut self, face: Direction, kind: OverrideKind) {
        *self.overrides.entry((face, kind)).or_insert(0) += 1;
    }

    /// Removes one installation of a directional override.
    pub fn remove_override(&mut self, face: Direction, kind: OverrideKind) {
        match self.overrides.get_mut(&(face, kind)) {
            Some(count) if *count > 1 => *count -= 1,
            Some(_) => {
                self.overrides.remove(&(face, kind));
            }
            None => {
                log::warn!(
                    "unbalanced override removal on {cube:?} ({face}, {kind:?})",
                    cube = self.cube
                );
            }
        }
    }

    /// Whether at least one installation of the given override is active.
    #[inline]
    pub fn override_active(&self, face: Direction, kind: OverrideKind) -> bool {
        self.overrides.contains_key(&(face, kind))
    }

    // --- Derived surface presence ---

    /// Whether the given face presents a solid surface: a wall flag not negated by an
    /// illusory-wall override and, for the floor, not opened up by a trapdoor.
    ///
    /// An open trapdoor removes the floor entirely: nothing stands on it and
    /// downward passage through it is unobstructed.
    pub fn surface(&self, face: Direction) -> bool {
        if self.override_active(face, OverrideKind::NegateWall) {
            return false;
        }
        if face == Direction::Down && self.trapdoor_open() {
            return false;
        }
        self.wall(face)
    }

    /// Whether the cell has an effective floor.
    pub fn has_floor(&self) -> bool {
        self.surface(Direction::Down)
    }

    /// Whether travel through the given face is obstructed by furniture regardless of
    /// wall state: a closed door, or a closed trapdoor for downward travel.
    pub fn face_obstructed(&self, face: Direction) -> bool {
        if self.door_closed_on(face) {
            return true;
        }
        face == Direction::Down && self.trapdoor_closed() && !self.surface(Direction::Down)
    }

    // --- Gates consulted by resolution ---

    /// Whether `entity` may leave this cell through the given face.
    pub fn allow_exit(&self, entity: &Entity, direction: Direction) -> bool {
        if self.surface(direction) {
            return false;
        }
        if self.face_obstructed(direction) {
            return false;
        }
        if self.override_active(direction, OverrideKind::BlockExit) {
            return false;
        }
        if let Some(ascent) = self.ramp_ascent() {
            // Ramps channel travel along their slope axis.
            if !entity.is_flying() && direction.is_planar() && direction.axis() != ascent.axis() {
                return false;
            }
        }
        true
    }

    /// Whether `entity` may enter this cell through the given face of *this* cell.
    ///
    /// `through` is the face crossed on the way in; an entity moving north enters its
    /// target through the target's south face.
    pub fn allows_entry_from(&self, entity: &Entity, through: Direction) -> bool {
        if self.surface(through) {
            return false;
        }
        if self.face_obstructed(through) {
            return false;
        }
        if self.override_active(through, OverrideKind::BlockEntry) {
            return false;
        }
        if self.spikes_extended() && through.is_planar() {
            return false;
        }
        if let Some(ascent) = self.ramp_ascent() {
            if !entity.is_flying() && through.is_planar() && through.axis() != ascent.axis() {
                return false;
            }
        }
        true
    }

    /// Whether `entity`'s transportation modes permit it to be anchored to the given
    /// face of this cell ([`None`] meaning unanchored, mid-air).
    pub fn can_anchor_on(&self, entity: &Entity, face: Option<Direction>) -> bool {
        match face {
            // Mid-air is only for flyers.
            None => entity.is_flying(),
            Some(Direction::Down) => self.has_floor() || entity.is_flying(),
            // Ceilings and walls take climbers only; flight does not help on a
            // vertical face.
            Some(Direction::Up) => entity.can_climb() && self.surface(Direction::Up),
            Some(wall) => entity.can_climb() && self.ladder_on(wall),
        }
    }

    /// Whether `entity` may change its look direction while in this cell.
    ///
    /// Spinner cells own their occupants' facing.
    pub fn allows_rotation(&self, _entity: &Entity, _new_look: Direction) -> bool {
        self.spinner_turns().is_none()
    }

    // --- Occupancy bookkeeping ---

    /// The entities currently occupying this cell.
    #[inline]
    pub fn occupants(&self) -> &HashSet<EntityId> {
        &self.occupants
    }

    /// The entities holding a reservation on this cell while a transition into it is
    /// animating.
    #[inline]
    pub fn reservations(&self) -> &HashSet<EntityId> {
        &self.reservations
    }

    /// Records `id` as an occupant of this cell.
    #[inline]
    pub fn add_occupant(&mut self, id: EntityId) {
        self.occupants.insert(id);
    }

    /// Removes `id` from this cell's occupants. Returns whether it was present.
    #[inline]
    pub fn remove_occupant(&mut self, id: EntityId) -> bool {
        self.occupants.remove(&id)
    }

    /// Places a soft hold on this cell for `id` while a transition into it animates.
    #[inline]
    pub fn reserve(&mut self, id: EntityId) {
        self.reservations.insert(id);
    }

    /// Releases `id`'s reservation. Returns whether it was present.
    #[inline]
    pub fn remove_reservation(&mut self, id: EntityId) -> bool {
        self.reservations.remove(&id)
    }
}

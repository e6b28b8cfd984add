//! Per-entity movement state.

use core::fmt;

use crate::math::{Cube, Direction, FreeCoordinate};

/// Identifies an entity registered in a [`Dungeon`](crate::dungeon::Dungeon).
///
/// Entity ids are never reused within one dungeon.
#[derive(Clone, Copy, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct EntityId(pub(crate) u32);

impl fmt::Debug for EntityId {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self.0)
    }
}

bitflags::bitflags! {
    /// The set of transportation modes an entity is capable of.
    ///
    /// Modes gate which cell faces the entity may anchor to: walking entities need a
    /// floor, climbing entities may anchor to ladder walls and ceilings, flying
    /// entities may hover unanchored.
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    pub struct TransportMode: u8 {
        /// Moving across floors and other walkable surfaces.
        const WALKING = 1 << 0;
        /// Moving along ladders, and across walls and ceilings that support it.
        const CLIMBING = 1 << 1;
        /// Moving without any anchor at all.
        const FLYING = 1 << 2;
        /// Moving through water cells.
        const SWIMMING = 1 << 3;
        /// Being relocated by teleporter features.
        const TELEPORTING = 1 << 4;
    }
}

/// Broad classification of an entity, consulted by
/// [`CoexistencePolicy`](crate::dungeon::CoexistencePolicy) when deciding whether two
/// entities may share a cell.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, exhaust::Exhaust)]
#[allow(missing_docs)]
pub enum EntityKind {
    Player,
    Npc,
    Monster,
    /// Inanimate but occupying: pushable blocks, barrels, and the like.
    Prop,
}

/// Movement ability thresholds, consulted when a transition spans a step up or a gap.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Abilities {
    /// Tallest ledge (in cells) the entity can scale without jumping.
    pub max_scale_height: FreeCoordinate,
    /// Shortest gap that requires a jump rather than a plain step.
    pub min_forward_jump: FreeCoordinate,
    /// Longest gap the entity can clear by jumping.
    pub max_forward_jump: FreeCoordinate,
    /// Apex height of the entity's jump arc, in cells.
    pub jump_height: FreeCoordinate,
}

impl Default for Abilities {
    #[inline]
    fn default() -> Self {
        Self {
            max_scale_height: 1.0,
            min_forward_jump: 1.0,
            max_forward_jump: 1.0,
            jump_height: 0.5,
        }
    }
}

/// The movement state of one entity in the dungeon.
///
/// The coordinate and anchor fields are mutated exclusively through the resolution and
/// commit pipeline ([`crate::movement`]), never by ad hoc code, so that they stay
/// consistent with cell occupant bookkeeping.
#[derive(Clone, Debug, PartialEq)]
#[non_exhaustive]
pub struct Entity {
    /// The cell this entity occupies.
    pub cube: Cube,
    /// The cell face this entity is attached to, or [`None`] if it is airborne or
    /// flying freely.
    pub anchor: Option<Direction>,
    /// The direction the entity is looking (and moves in when stepping forward).
    pub look: Direction,
    /// Whether the entity's notion of “down” tracks its anchor face. When true, an
    /// entity anchored to a wall treats the wall as its floor; when false, down is
    /// always [`Direction::Down`] regardless of anchor.
    pub rotation_follows_anchor: bool,
    /// Transportation modes this entity is capable of.
    pub modes: TransportMode,
    /// Classification used by coexistence rules.
    pub kind: EntityKind,
    /// Movement ability thresholds.
    pub abilities: Abilities,
}

impl Entity {
    /// Constructs an entity standing on the floor of `cube`, facing north, capable of
    /// walking only.
    #[inline]
    pub fn new(kind: EntityKind, cube: Cube) -> Self {
        Self {
            cube,
            anchor: Some(Direction::Down),
            look: Direction::North,
            rotation_follows_anchor: false,
            modes: TransportMode::WALKING,
            kind,
            abilities: Abilities::default(),
        }
    }

    /// Returns whether the entity may move without an anchor.
    #[inline]
    pub fn is_flying(&self) -> bool {
        self.modes.contains(TransportMode::FLYING)
    }

    /// Returns whether the entity may anchor to ladders, walls and ceilings.
    #[inline]
    pub fn can_climb(&self) -> bool {
        self.modes.contains(TransportMode::CLIMBING)
    }

    /// The direction the entity considers “down”.
    ///
    /// This is the anchor face when [`Self::rotation_follows_anchor`] is set and the
    /// entity is anchored, and global [`Direction::Down`] otherwise.
    #[inline]
    pub fn down(&self) -> Direction {
        match self.anchor {
            Some(face) if self.rotation_follows_anchor => face,
            _ => Direction::Down,
        }
    }

    /// The direction the entity considers “up”; opposite of [`Self::down()`].
    #[inline]
    pub fn up(&self) -> Direction {
        self.down().opposite()
    }
}

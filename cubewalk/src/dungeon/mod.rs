//! The dungeon: a map of cells, the registry of entities, and the occupancy rules
//! binding them together.

use core::fmt;

use hashbrown::HashMap;

use crate::entity::{Entity, EntityId};
use crate::math::{Cube, Direction};

mod anchor;
pub use anchor::*;
mod feature;
pub use feature::*;
mod node;
pub use node::*;
mod occupancy;
pub use occupancy::*;

/// Error from [`Dungeon::spawn()`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum SpawnError {
    /// The destination cell's occupants do not permit coexistence.
    Occupied,
    /// The entity's transportation modes do not permit its requested anchor there.
    NoSurface,
}

impl fmt::Display for SpawnError {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpawnError::Occupied => write!(f, "destination cell is occupied"),
            SpawnError::NoSurface => write!(f, "no surface to anchor to at destination"),
        }
    }
}

impl std::error::Error for SpawnError {}

/// A dungeon: the cells making up the level, the entities moving through them, and
/// the injected coexistence policy arbitrating shared cells.
///
/// Cells are stored sparsely; coordinates with no cell are legitimate off-map open
/// space, and movement math degrades to plain coordinate translation there.
pub struct Dungeon {
    cells: HashMap<Cube, Cell>,
    entities: HashMap<EntityId, Entity>,
    next_entity: u32,
    policy: Box<dyn CoexistencePolicy>,
}

impl fmt::Debug for Dungeon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dungeon")
            .field("cells", &self.cells.len())
            .field("entities", &self.entities.len())
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl Default for Dungeon {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl Dungeon {
    /// Constructs an empty dungeon with the [`DefaultCoexistence`] policy.
    pub fn new() -> Self {
        Self::with_policy(Box::new(DefaultCoexistence))
    }

    /// Constructs an empty dungeon with the given coexistence policy.
    pub fn with_policy(policy: Box<dyn CoexistencePolicy>) -> Self {
        Self {
            cells: HashMap::new(),
            entities: HashMap::new(),
            next_entity: 0,
            policy,
        }
    }

    /// Adds a cell, replacing any previous cell at the same coordinate.
    pub fn insert_cell(&mut self, cell: Cell) {
        self.cells.insert(cell.cube(), cell);
    }

    /// The cell at the given coordinate, or [`None`] for off-map open space.
    #[inline]
    pub fn cell(&self, cube: Cube) -> Option<&Cell> {
        self.cells.get(&cube)
    }

    /// Mutable access to the cell at the given coordinate.
    #[inline]
    pub fn cell_mut(&mut self, cube: Cube) -> Option<&mut Cell> {
        self.cells.get_mut(&cube)
    }

    /// The coexistence policy in effect.
    #[inline]
    pub fn policy(&self) -> &dyn CoexistencePolicy {
        &*self.policy
    }

    /// Registers `entity` in the dungeon, adding it to its cell's occupant set and
    /// anchor. Returns the id it will be known by.
    pub fn spawn(&mut self, entity: Entity) -> Result<EntityId, SpawnError> {
        // Unanchored spawns are allowed regardless of modes; gravity resolves them on
        // the next tick. Anchored spawns need a cell with a usable surface.
        if let Some(face) = entity.anchor {
            match self.cell(entity.cube) {
                Some(cell) if cell.can_anchor_on(&entity, Some(face)) => {}
                _ => return Err(SpawnError::NoSurface),
            }
        }

        let coexists = self.cell(entity.cube).is_none_or(|cell| {
            cell.occupants()
                .iter()
                .chain(cell.reservations())
                .all(|other| {
                    self.entities
                        .get(other)
                        .is_none_or(|o| self.policy.may_coexist(&entity, o))
                })
        });
        if !coexists {
            return Err(SpawnError::Occupied);
        }

        let id = EntityId(self.next_entity);
        self.next_entity += 1;
        let cube = entity.cube;
        let anchor = entity.anchor;
        self.entities.insert(id, entity);
        if let Some(cell) = self.cell_mut(cube) {
            cell.add_occupant(id);
            if let Some(face) = anchor {
                if let Some(anchor) = cell.anchor_mut(face) {
                    anchor.attach(id);
                }
            }
        }
        Ok(id)
    }

    /// Removes `id` from the simulation, releasing it from every cell's occupant,
    /// reservation, and anchor sets.
    pub fn despawn(&mut self, id: EntityId) -> Option<Entity> {
        for cell in self.cells.values_mut() {
            cell.remove_occupant(id);
            cell.remove_reservation(id);
            for face in Direction::ALL {
                if let Some(anchor) = cell.anchor_mut(face) {
                    anchor.detach(id);
                }
            }
        }
        self.entities.remove(&id)
    }

    /// The entity registered under `id`.
    #[inline]
    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    /// Mutable access to the entity registered under `id`.
    ///
    /// The coordinate and anchor fields must only be mutated through the movement
    /// pipeline; this access is for modes, abilities, and look adjustments.
    #[inline]
    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    /// Iterates over all registered entities.
    #[inline]
    pub fn entities(&self) -> impl Iterator<Item = (EntityId, &Entity)> {
        self.entities.iter().map(|(&id, e)| (id, e))
    }

    /// Moves an entity's bookkeeping to a new cell and anchor: occupant sets, anchor
    /// attachment, and the entity's own coordinate fields, all in lock-step.
    ///
    /// This is the single place entity coordinates change; the commit layer and the
    /// push cascade both funnel through it.
    pub(crate) fn relocate(&mut self, id: EntityId, cube: Cube, anchor: Option<Direction>) {
        let Some(entity) = self.entities.get_mut(&id) else {
            log::error!("relocate of unregistered entity {id:?}");
            debug_assert!(false, "relocate of unregistered entity");
            return;
        };
        let old_cube = entity.cube;
        let old_anchor = entity.anchor;
        entity.cube = cube;
        entity.anchor = anchor;

        if let Some(cell) = self.cells.get_mut(&old_cube) {
            cell.remove_occupant(id);
            if let Some(face) = old_anchor {
                if let Some(a) = cell.anchor_mut(face) {
                    a.detach(id);
                }
            }
        }
        if let Some(cell) = self.cells.get_mut(&cube) {
            cell.add_occupant(id);
            if let Some(face) = anchor {
                if let Some(a) = cell.anchor_mut(face) {
                    a.attach(id);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityKind;

    fn floor_cell(cube: Cube) -> Cell {
        let mut cell = Cell::new(cube);
        cell.set_wall(Direction::Down, true);
        cell.add_anchor(Direction::Down, TraversalKind::Walk).unwrap();
        cell
    }

    #[test]
    fn spawn_and_despawn_bookkeeping() {
        let mut dungeon = Dungeon::new();
        dungeon.insert_cell(floor_cell(Cube::ORIGIN));

        let id = dungeon
            .spawn(Entity::new(EntityKind::Player, Cube::ORIGIN))
            .unwrap();
        let cell = dungeon.cell(Cube::ORIGIN).unwrap();
        assert!(cell.occupants().contains(&id));
        assert!(cell.anchor(Direction::Down).unwrap().entities().contains(&id));

        dungeon.despawn(id);
        let cell = dungeon.cell(Cube::ORIGIN).unwrap();
        assert!(cell.occupants().is_empty());
        assert!(cell.anchor(Direction::Down).unwrap().entities().is_empty());
        assert!(dungeon.entity(id).is_none());
    }

    #[test]
    fn spawn_needs_a_surface() {
        let mut dungeon = Dungeon::new();
        let mut cell = Cell::new(Cube::ORIGIN);
        cell.set_wall(Direction::Down, false);
        dungeon.insert_cell(cell);

        assert_eq!(
            dungeon.spawn(Entity::new(EntityKind::Player, Cube::ORIGIN)),
            Err(SpawnError::NoSurface)
        );
    }

    #[test]
    fn spawn_respects_coexistence() {
        let mut dungeon = Dungeon::new();
        dungeon.insert_cell(floor_cell(Cube::ORIGIN));

        dungeon
            .spawn(Entity::new(EntityKind::Player, Cube::ORIGIN))
            .unwrap();
        assert_eq!(
            dungeon.spawn(Entity::new(EntityKind::Monster, Cube::ORIGIN)),
            Err(SpawnError::Occupied)
        );
        // Props share freely.
        dungeon
            .spawn(Entity::new(EntityKind::Prop, Cube::ORIGIN))
            .unwrap();
    }
}

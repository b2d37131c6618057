use std::collections::HashMap;

use thiserror::Error;

use crate::direction::Direction;
use crate::entity::{EntityId, Kind};

/// A grid occupant as the spatial index sees it: an identity plus the
/// variant tag the per-cell exclusivity rule is keyed on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Occupant {
    pub id: EntityId,
    pub kind: Kind,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum GridError {
    /// The entity is not tracked by the index. A programming error when it
    /// reaches an API boundary; consumed internally to drive rollback.
    #[error("entity {0} is not tracked by the grid")]
    NotFound(EntityId),
    /// The destination cell already holds an occupant of the same variant.
    /// Always recoverable: callers retry another cell or roll back.
    #[error("cell ({x}, {y}) is already occupied by a {kind:?}")]
    CellOccupied { x: i64, y: i64, kind: Kind },
}

/// Result of a move attempt. A blocked move is an ordinary outcome, not an
/// error: the entity snaps back to where it started.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveOutcome {
    Moved { from: (i64, i64), to: (i64, i64) },
    Blocked { at: (i64, i64) },
}

#[derive(Clone, Copy, Debug)]
struct Placement {
    cell: (i64, i64),
    kind: Kind,
}

/// The authoritative spatial index: cell -> occupants (in insertion order)
/// and entity -> cell. The two maps are kept mutually consistent across
/// every operation, including rolled-back moves.
///
/// Coordinates wrap toroidally; a cell holds at most one occupant of each
/// [`Kind`] at a time.
pub struct Grid {
    width: i64,
    height: i64,
    cells: HashMap<(i64, i64), Vec<Occupant>>,
    placements: HashMap<EntityId, Placement>,
}

impl Grid {
    pub fn new(width: u32, height: u32) -> Self {
        debug_assert!(width > 0 && height > 0, "grid dimensions must be positive");
        Self {
            width: i64::from(width.max(1)),
            height: i64::from(height.max(1)),
            cells: HashMap::new(),
            placements: HashMap::new(),
        }
    }

    pub fn width(&self) -> i64 {
        self.width
    }

    pub fn height(&self) -> i64 {
        self.height
    }

    pub fn occupant_count(&self) -> usize {
        self.placements.len()
    }

    /// Normalize coordinates onto the torus. The result is always within
    /// `[0, width) x [0, height)`, including for negative inputs.
    pub fn wrap(&self, x: i64, y: i64) -> (i64, i64) {
        (x.rem_euclid(self.width), y.rem_euclid(self.height))
    }

    /// Occupants of the wrapped cell, in insertion order. Unpopulated cells
    /// yield an empty slice, never an error.
    pub fn occupants_at(&self, x: i64, y: i64) -> &[Occupant] {
        self.cells
            .get(&self.wrap(x, y))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Current cell of a tracked entity.
    pub fn coordinates_of(&self, id: EntityId) -> Result<(i64, i64), GridError> {
        self.placements
            .get(&id)
            .map(|p| p.cell)
            .ok_or(GridError::NotFound(id))
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.placements.contains_key(&id)
    }

    /// Insert an entity into the wrapped cell. Fails with
    /// [`GridError::CellOccupied`] when the cell already holds an occupant of
    /// the same kind, in which case the index is left untouched.
    pub fn place(&mut self, id: EntityId, kind: Kind, x: i64, y: i64) -> Result<(), GridError> {
        let cell = self.wrap(x, y);
        if let Some(occupants) = self.cells.get(&cell) {
            if occupants.iter().any(|o| o.kind == kind) {
                return Err(GridError::CellOccupied {
                    x: cell.0,
                    y: cell.1,
                    kind,
                });
            }
        }
        debug_assert!(
            !self.placements.contains_key(&id),
            "entity placed while already tracked"
        );
        self.insert(id, kind, cell);
        Ok(())
    }

    /// Remove an entity from the index. A no-op when the entity is untracked.
    pub fn remove(&mut self, id: EntityId) {
        let Some(placement) = self.placements.remove(&id) else {
            return;
        };
        if let Some(occupants) = self.cells.get_mut(&placement.cell) {
            occupants.retain(|o| o.id != id);
            if occupants.is_empty() {
                self.cells.remove(&placement.cell);
            }
        }
    }

    /// Step a tracked entity `count` cells in `direction`, snapping back to
    /// its original cell when the destination holds a same-kind occupant.
    pub fn move_in_direction(
        &mut self,
        id: EntityId,
        direction: Direction,
        count: i64,
    ) -> Result<MoveOutcome, GridError> {
        let Placement { cell: from, kind } =
            *self.placements.get(&id).ok_or(GridError::NotFound(id))?;
        let (dest_x, dest_y) = direction.step(from.0, from.1, count);

        self.remove(id);
        match self.place(id, kind, dest_x, dest_y) {
            Ok(()) => Ok(MoveOutcome::Moved {
                from,
                to: self.wrap(dest_x, dest_y),
            }),
            Err(GridError::CellOccupied { .. }) => {
                // The origin cell is free for this kind: we just vacated it.
                self.insert(id, kind, from);
                Ok(MoveOutcome::Blocked { at: from })
            }
            Err(other) => Err(other),
        }
    }

    /// Sample cells outward from the entity's cell: for each
    /// `step in 1..=distance`, collect the occupants of the cell displaced by
    /// `step` cells from the *original* base coordinate (not from the
    /// previous step's result), concatenated in step order.
    ///
    /// Empty when the entity is untracked.
    pub fn occupants_in_direction(
        &self,
        id: EntityId,
        direction: Direction,
        distance: i64,
    ) -> Vec<Occupant> {
        let Some(placement) = self.placements.get(&id) else {
            return Vec::new();
        };
        let (x, y) = placement.cell;
        let mut found = Vec::new();
        for step in 1..=distance {
            let (sx, sy) = direction.step(x, y, step);
            found.extend_from_slice(self.occupants_at(sx, sy));
        }
        found
    }

    /// Both maps agree: every placement appears exactly once in its cell's
    /// occupant list and every listed occupant has a matching placement.
    pub fn is_consistent(&self) -> bool {
        let placements_ok = self.placements.iter().all(|(id, placement)| {
            self.cells
                .get(&placement.cell)
                .is_some_and(|occupants| occupants.iter().filter(|o| o.id == *id).count() == 1)
        });
        let cells_ok = self.cells.iter().all(|(cell, occupants)| {
            occupants.iter().all(|o| {
                self.placements
                    .get(&o.id)
                    .is_some_and(|p| p.cell == *cell && p.kind == o.kind)
            })
        });
        placements_ok && cells_ok
    }

    fn insert(&mut self, id: EntityId, kind: Kind, cell: (i64, i64)) {
        self.cells.entry(cell).or_default().push(Occupant { id, kind });
        self.placements.insert(id, Placement { cell, kind });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::IdAllocator;

    fn ids() -> IdAllocator {
        IdAllocator::default()
    }

    #[test]
    fn wrap_is_toroidal_in_both_axes() {
        let grid = Grid::new(10, 8);
        assert_eq!(grid.wrap(3, 5), grid.wrap(13, 5));
        assert_eq!(grid.wrap(3, 5), grid.wrap(3, 13));
        assert_eq!(grid.wrap(3, 5), grid.wrap(23, 21));
    }

    #[test]
    fn wrap_normalizes_negative_coordinates() {
        let grid = Grid::new(10, 8);
        assert_eq!(grid.wrap(-1, -1), (9, 7));
        assert_eq!(grid.wrap(-11, -9), (9, 7));
        let (x, y) = grid.wrap(-100, -100);
        assert!(x >= 0 && y >= 0);
    }

    #[test]
    fn occupants_at_is_empty_for_unpopulated_cells() {
        let grid = Grid::new(4, 4);
        assert!(grid.occupants_at(2, 2).is_empty());
        assert!(grid.occupants_at(-7, 100).is_empty());
    }

    #[test]
    fn place_wraps_coordinates() {
        let mut grid = Grid::new(10, 10);
        let mut ids = ids();
        let id = ids.next_id();
        grid.place(id, Kind::Person, 12, -3).unwrap();
        assert_eq!(grid.coordinates_of(id), Ok((2, 7)));
        assert_eq!(grid.occupants_at(2, 7).len(), 1);
    }

    #[test]
    fn same_kind_placement_conflicts_and_leaves_index_unchanged() {
        let mut grid = Grid::new(10, 10);
        let mut ids = ids();
        let first = ids.next_id();
        let second = ids.next_id();
        grid.place(first, Kind::Person, 1, 1).unwrap();

        let err = grid.place(second, Kind::Person, 1, 1).unwrap_err();
        assert_eq!(
            err,
            GridError::CellOccupied {
                x: 1,
                y: 1,
                kind: Kind::Person,
            }
        );
        assert_eq!(grid.occupants_at(1, 1).len(), 1);
        assert_eq!(grid.coordinates_of(second), Err(GridError::NotFound(second)));
        assert!(grid.is_consistent());
    }

    #[test]
    fn different_kinds_share_a_cell() {
        let mut grid = Grid::new(10, 10);
        let mut ids = ids();
        let person = ids.next_id();
        let food = ids.next_id();
        grid.place(person, Kind::Person, 4, 4).unwrap();
        grid.place(food, Kind::Food, 4, 4).unwrap();
        assert_eq!(grid.occupants_at(4, 4).len(), 2);
        assert!(grid.is_consistent());
    }

    #[test]
    fn remove_is_a_noop_for_untracked_entities() {
        let mut grid = Grid::new(10, 10);
        let mut ids = ids();
        let id = ids.next_id();
        grid.remove(id);
        assert_eq!(grid.occupant_count(), 0);
        assert!(grid.is_consistent());
    }

    #[test]
    fn coordinates_of_untracked_entity_is_not_found() {
        let grid = Grid::new(10, 10);
        let mut ids = ids();
        let id = ids.next_id();
        assert_eq!(grid.coordinates_of(id), Err(GridError::NotFound(id)));
    }

    #[test]
    fn move_steps_and_wraps_across_the_edge() {
        let mut grid = Grid::new(10, 10);
        let mut ids = ids();
        let id = ids.next_id();
        grid.place(id, Kind::Person, 0, 0).unwrap();

        let outcome = grid.move_in_direction(id, Direction::North, 1).unwrap();
        assert_eq!(
            outcome,
            MoveOutcome::Moved {
                from: (0, 0),
                to: (0, 9),
            }
        );
        assert_eq!(grid.coordinates_of(id), Ok((0, 9)));
        assert!(grid.occupants_at(0, 0).is_empty());
    }

    #[test]
    fn move_of_untracked_entity_is_not_found() {
        let mut grid = Grid::new(10, 10);
        let mut ids = ids();
        let id = ids.next_id();
        assert_eq!(
            grid.move_in_direction(id, Direction::East, 1),
            Err(GridError::NotFound(id))
        );
    }

    #[test]
    fn blocked_move_rolls_back_and_disturbs_nobody() {
        let mut grid = Grid::new(10, 10);
        let mut ids = ids();
        let mover = ids.next_id();
        let blocker = ids.next_id();
        grid.place(mover, Kind::Person, 2, 2).unwrap();
        grid.place(blocker, Kind::Person, 3, 2).unwrap();

        let outcome = grid.move_in_direction(mover, Direction::East, 1).unwrap();
        assert_eq!(outcome, MoveOutcome::Blocked { at: (2, 2) });
        assert_eq!(grid.coordinates_of(mover), Ok((2, 2)));
        assert_eq!(grid.coordinates_of(blocker), Ok((3, 2)));
        assert!(grid.is_consistent());
    }

    #[test]
    fn move_onto_a_different_kind_succeeds() {
        let mut grid = Grid::new(10, 10);
        let mut ids = ids();
        let person = ids.next_id();
        let food = ids.next_id();
        grid.place(person, Kind::Person, 2, 2).unwrap();
        grid.place(food, Kind::Food, 3, 2).unwrap();

        let outcome = grid.move_in_direction(person, Direction::East, 1).unwrap();
        assert_eq!(
            outcome,
            MoveOutcome::Moved {
                from: (2, 2),
                to: (3, 2),
            }
        );
        assert_eq!(grid.occupants_at(3, 2).len(), 2);
        assert!(grid.is_consistent());
    }

    #[test]
    fn occupants_in_direction_samples_each_step_from_the_base() {
        let mut grid = Grid::new(10, 10);
        let mut ids = ids();
        let observer = ids.next_id();
        let near = ids.next_id();
        let far = ids.next_id();
        let beyond = ids.next_id();
        grid.place(observer, Kind::Person, 5, 5).unwrap();
        grid.place(near, Kind::Food, 6, 5).unwrap();
        grid.place(far, Kind::Food, 7, 5).unwrap();
        grid.place(beyond, Kind::Food, 8, 5).unwrap();

        let seen = grid.occupants_in_direction(observer, Direction::East, 2);
        let seen_ids: Vec<_> = seen.iter().map(|o| o.id).collect();
        assert_eq!(seen_ids, vec![near, far]);
    }

    #[test]
    fn occupants_in_direction_wraps_around_the_torus() {
        let mut grid = Grid::new(5, 5);
        let mut ids = ids();
        let observer = ids.next_id();
        let neighbor = ids.next_id();
        grid.place(observer, Kind::Person, 0, 2).unwrap();
        grid.place(neighbor, Kind::Food, 4, 2).unwrap();

        let seen = grid.occupants_in_direction(observer, Direction::West, 1);
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].id, neighbor);
    }

    #[test]
    fn occupants_in_direction_is_empty_for_untracked_entities() {
        let grid = Grid::new(5, 5);
        let mut ids = ids();
        let id = ids.next_id();
        assert!(grid.occupants_in_direction(id, Direction::North, 3).is_empty());
    }
}

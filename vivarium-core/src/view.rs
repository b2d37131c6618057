use crate::direction::Direction;
use crate::entity::Kind;
use crate::grid::Occupant;

/// What one entity sees before deciding: the visible occupants of its own
/// cell plus the cells sampled outward in each cardinal direction.
///
/// Views are rebuilt from the spatial index every tick and already filtered
/// through the visibility predicate; they are never stored across ticks.
#[derive(Clone, Debug, Default)]
pub struct View {
    pub center: Vec<Occupant>,
    pub north: Vec<Occupant>,
    pub south: Vec<Occupant>,
    pub east: Vec<Occupant>,
    pub west: Vec<Occupant>,
}

impl View {
    pub fn bucket(&self, direction: Direction) -> &[Occupant] {
        match direction {
            Direction::North => &self.north,
            Direction::South => &self.south,
            Direction::East => &self.east,
            Direction::West => &self.west,
        }
    }

    pub fn bucket_mut(&mut self, direction: Direction) -> &mut Vec<Occupant> {
        match direction {
            Direction::North => &mut self.north,
            Direction::South => &mut self.south,
            Direction::East => &mut self.east,
            Direction::West => &mut self.west,
        }
    }

    /// First visible food, scanning the observer's own cell before the
    /// cardinal buckets in N/S/E/W order. A `None` direction means the food
    /// shares the observer's cell.
    pub fn find_food(&self) -> Option<(Occupant, Option<Direction>)> {
        if let Some(food) = self.center.iter().find(|o| o.kind == Kind::Food) {
            return Some((*food, None));
        }
        for direction in Direction::CARDINAL {
            if let Some(food) = self.bucket(direction).iter().find(|o| o.kind == Kind::Food) {
                return Some((*food, Some(direction)));
            }
        }
        None
    }

    pub fn is_empty(&self) -> bool {
        self.center.is_empty()
            && self.north.is_empty()
            && self.south.is_empty()
            && self.east.is_empty()
            && self.west.is_empty()
    }
}

use rand::Rng;
use serde::{Deserialize, Serialize};

/// A compass direction on the grid.
///
/// The y axis grows southward: North decreases y, South increases y,
/// East increases x, West decreases x.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    /// The four cardinal directions in scan order.
    pub const CARDINAL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];

    /// Coordinate delta for a step of `count` cells in this direction.
    pub fn offset(self, count: i64) -> (i64, i64) {
        match self {
            Direction::North => (0, -count),
            Direction::South => (0, count),
            Direction::East => (count, 0),
            Direction::West => (-count, 0),
        }
    }

    /// Displace `(x, y)` by `count` cells in this direction.
    pub fn step(self, x: i64, y: i64, count: i64) -> (i64, i64) {
        let (dx, dy) = self.offset(count);
        (x + dx, y + dy)
    }

    /// Draw a uniformly random cardinal direction from the given RNG.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Direction {
        Self::CARDINAL[rng.gen_range(0..Self::CARDINAL.len())]
    }
}

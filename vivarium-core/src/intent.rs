use crate::direction::Direction;
use crate::entity::EntityId;

/// An ephemeral request produced by an entity's decision function during the
/// observation phase of a tick and consumed during resolution the same tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Intent {
    /// Step `count` cells in `direction`, paying the mover's metabolic cost.
    Move {
        actor: EntityId,
        direction: Direction,
        count: i64,
    },
    /// Take one unit from a co-located food into the actor's stomach.
    Eat { actor: EntityId, target: EntityId },
}

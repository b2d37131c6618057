use std::fmt;

use log::debug;
use rand::Rng;
use serde::Serialize;

use crate::direction::Direction;
use crate::intent::Intent;
use crate::view::View;

/// Entity variant tag. The spatial index keys its per-cell exclusivity rule
/// on this, without needing to see entity state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Kind {
    Person,
    Food,
}

/// Process-unique entity identity: a monotonic integer assigned at creation,
/// stable for the entity's lifetime, and used as its hash/equality key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct EntityId(u64);

impl EntityId {
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Hands out monotonically increasing entity ids.
///
/// Owned by the world rather than living in process-global state, so every
/// world (and every test) starts from a fresh counter.
#[derive(Debug, Default)]
pub struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    pub fn next_id(&mut self) -> EntityId {
        let id = EntityId(self.next);
        self.next += 1;
        id
    }
}

/// A mobile agent that seeks food, digests it into energy, and pays an
/// energy cost per cell moved.
#[derive(Clone, Debug)]
pub struct Person {
    pub energy: f64,
    pub energy_max: f64,
    pub stomach: f64,
    pub stomach_max: f64,
    /// Energy cost per cell moved.
    pub metabolism: f64,
}

impl Default for Person {
    fn default() -> Self {
        Self {
            energy: 100.0,
            energy_max: 100.0,
            stomach: 100.0,
            stomach_max: 100.0,
            metabolism: 0.2,
        }
    }
}

impl Person {
    /// Transfer stomach contents into energy, clamping both to their ranges.
    fn digest(&mut self) {
        if self.energy < self.energy_max && self.stomach > 0.0 {
            let ullage = self.energy_max - self.energy;
            let exchanged = self.stomach.min(ullage);
            self.stomach = (self.stomach - exchanged).clamp(0.0, self.stomach_max);
            self.energy = (self.energy + exchanged).clamp(0.0, self.energy_max);
        }
    }

    /// Decision function for one tick: digest, then either eat co-located
    /// food, walk toward visible food, or wander.
    ///
    /// A person with no energy left after digestion is starved: it stays on
    /// the grid but produces no intents this tick.
    pub fn decide<R: Rng + ?Sized>(&mut self, id: EntityId, view: &View, rng: &mut R) -> Vec<Intent> {
        self.digest();

        if self.energy <= 0.0 {
            self.energy = 0.0;
            return Vec::new();
        }

        match view.find_food() {
            Some((food, None)) => {
                debug!("person {id} desires to eat food {}", food.id);
                vec![Intent::Eat {
                    actor: id,
                    target: food.id,
                }]
            }
            Some((food, Some(direction))) => {
                debug!("person {id} sees food {} to the {direction:?}", food.id);
                vec![Intent::Move {
                    actor: id,
                    direction,
                    count: 1,
                }]
            }
            None => {
                let direction = Direction::random(rng);
                debug!("person {id} wanders {direction:?}");
                vec![Intent::Move {
                    actor: id,
                    direction,
                    count: 1,
                }]
            }
        }
    }

    /// Charge the energy cost of a resolved move of `count` cells.
    pub fn charge_move(&mut self, count: i64) {
        self.energy = (self.energy - self.metabolism * count as f64).max(0.0);
    }

    /// Add to the stomach, clamped at its capacity.
    pub fn fill_stomach(&mut self, amount: f64) {
        self.stomach = (self.stomach + amount).clamp(0.0, self.stomach_max);
    }

    /// A person with neither energy nor stomach contents is dead for display
    /// purposes; it is never removed from the simulation.
    pub fn alive(&self) -> bool {
        self.energy > 0.0 || self.stomach > 0.0
    }
}

/// A stationary resource that regenerates a fraction of its capacity per
/// tick while depleted.
#[derive(Clone, Debug)]
pub struct Food {
    pub amount: f64,
    pub max_amount: f64,
    /// Fraction of `max_amount` regained per tick while depleted.
    pub regen_rate: f64,
}

impl Default for Food {
    fn default() -> Self {
        Self {
            amount: 100.0,
            max_amount: 100.0,
            regen_rate: 0.01,
        }
    }
}

impl Food {
    /// Fraction of capacity below which food stops being visible.
    pub const VISIBILITY_THRESHOLD: f64 = 0.2;

    /// Per-tick regeneration; food never emits intents.
    pub fn regenerate(&mut self) {
        if self.amount < self.max_amount {
            self.amount = (self.amount + self.max_amount * self.regen_rate).min(self.max_amount);
        }
    }

    /// Nearly-depleted food disappears from views until it regrows.
    pub fn visible(&self) -> bool {
        self.amount > self.max_amount * Self::VISIBILITY_THRESHOLD
    }

    /// Withdraw one unit if at least one is available; returns whether the
    /// withdrawal happened.
    pub fn consume_portion(&mut self) -> bool {
        if self.amount >= 1.0 {
            self.amount = (self.amount - 1.0).max(0.0);
            true
        } else {
            false
        }
    }
}

/// Variant payload of an entity. An entity never changes variant after
/// creation.
#[derive(Clone, Debug)]
pub enum EntityKind {
    Person(Person),
    Food(Food),
}

impl EntityKind {
    pub fn tag(&self) -> Kind {
        match self {
            EntityKind::Person(_) => Kind::Person,
            EntityKind::Food(_) => Kind::Food,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Entity {
    pub id: EntityId,
    pub kind: EntityKind,
}

impl Entity {
    pub fn person(id: EntityId) -> Self {
        Self {
            id,
            kind: EntityKind::Person(Person::default()),
        }
    }

    pub fn food(id: EntityId) -> Self {
        Self {
            id,
            kind: EntityKind::Food(Food::default()),
        }
    }

    pub fn tag(&self) -> Kind {
        self.kind.tag()
    }

    /// Visibility predicate applied when views are built: persons are always
    /// visible, food only while sufficiently stocked.
    pub fn visible(&self) -> bool {
        match &self.kind {
            EntityKind::Person(_) => true,
            EntityKind::Food(food) => food.visible(),
        }
    }

    pub fn as_person(&self) -> Option<&Person> {
        match &self.kind {
            EntityKind::Person(person) => Some(person),
            EntityKind::Food(_) => None,
        }
    }

    pub fn as_person_mut(&mut self) -> Option<&mut Person> {
        match &mut self.kind {
            EntityKind::Person(person) => Some(person),
            EntityKind::Food(_) => None,
        }
    }

    pub fn as_food(&self) -> Option<&Food> {
        match &self.kind {
            EntityKind::Food(food) => Some(food),
            EntityKind::Person(_) => None,
        }
    }

    pub fn as_food_mut(&mut self) -> Option<&mut Food> {
        match &mut self.kind {
            EntityKind::Food(food) => Some(food),
            EntityKind::Person(_) => None,
        }
    }
}

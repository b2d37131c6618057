use std::collections::BTreeMap;

use log::{debug, warn};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::direction::Direction;
use crate::entity::{Entity, EntityId, EntityKind, Food, IdAllocator, Person};
use crate::grid::{Grid, GridError, MoveOutcome, Occupant};
use crate::intent::Intent;
use crate::view::View;

/// How many random cells the population routine tries before giving up on
/// placing one entity.
pub const PLACEMENT_RETRY_LIMIT: u32 = 50;

/// Construction parameters for a [`World`].
#[derive(Clone, Debug)]
pub struct WorldSettings {
    pub width: u32,
    pub height: u32,
    pub people: u32,
    pub food: u32,
    /// How many cells outward each cardinal view bucket samples.
    pub sight_distance: u32,
    /// RNG seed; `None` seeds from OS entropy.
    pub seed: Option<u64>,
}

impl Default for WorldSettings {
    fn default() -> Self {
        Self {
            width: 100,
            height: 100,
            people: 5,
            food: 10,
            sight_distance: 1,
            seed: None,
        }
    }
}

/// The simulation: exclusively owns the spatial index, the entity set, the
/// id allocator, and the RNG driving shuffles and random walks.
///
/// One [`tick`](World::tick) is a fully sequential pass: observe and decide
/// for every entity, shuffle the collected intents, then resolve them one by
/// one against the grid.
pub struct World {
    grid: Grid,
    entities: BTreeMap<EntityId, Entity>,
    ids: IdAllocator,
    rng: StdRng,
    sight_distance: i64,
    ticks: u64,
}

impl World {
    /// Build a world and populate it with the configured number of persons
    /// and foods, each at a random free cell.
    pub fn new(settings: &WorldSettings) -> Self {
        let rng = match settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut world = Self {
            grid: Grid::new(settings.width, settings.height),
            entities: BTreeMap::new(),
            ids: IdAllocator::default(),
            rng,
            sight_distance: i64::from(settings.sight_distance.max(1)),
            ticks: 0,
        };
        for _ in 0..settings.people {
            world.spawn_at_random(EntityKind::Person(Person::default()));
        }
        for _ in 0..settings.food {
            world.spawn_at_random(EntityKind::Food(Food::default()));
        }
        world
    }

    pub fn width(&self) -> i64 {
        self.grid.width()
    }

    pub fn height(&self) -> i64 {
        self.grid.height()
    }

    pub fn tick_count(&self) -> u64 {
        self.ticks
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    /// Mutable access to an entity's attributes. Entity state is public the
    /// same way coordinates are; the variant itself can never change.
    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    pub fn coordinates_of(&self, id: EntityId) -> Option<(i64, i64)> {
        self.grid.coordinates_of(id).ok()
    }

    /// Place a new entity at a uniformly random free cell, retrying on
    /// same-variant conflicts up to [`PLACEMENT_RETRY_LIMIT`] times.
    pub fn spawn_at_random(&mut self, kind: EntityKind) -> Option<EntityId> {
        let tag = kind.tag();
        let id = self.ids.next_id();
        for _ in 0..PLACEMENT_RETRY_LIMIT {
            let x = self.rng.gen_range(0..self.grid.width());
            let y = self.rng.gen_range(0..self.grid.height());
            match self.grid.place(id, tag, x, y) {
                Ok(()) => {
                    self.entities.insert(id, Entity { id, kind });
                    return Some(id);
                }
                Err(_) => continue,
            }
        }
        warn!("no free cell found for a {tag:?} after {PLACEMENT_RETRY_LIMIT} attempts");
        None
    }

    /// Place a new entity at a specific cell (wrapped).
    pub fn spawn_at(&mut self, kind: EntityKind, x: i64, y: i64) -> Result<EntityId, GridError> {
        let tag = kind.tag();
        let id = self.ids.next_id();
        self.grid.place(id, tag, x, y)?;
        self.entities.insert(id, Entity { id, kind });
        Ok(id)
    }

    pub fn spawn_person_at(&mut self, x: i64, y: i64) -> Result<EntityId, GridError> {
        self.spawn_at(EntityKind::Person(Person::default()), x, y)
    }

    pub fn spawn_food_at(&mut self, x: i64, y: i64) -> Result<EntityId, GridError> {
        self.spawn_at(EntityKind::Food(Food::default()), x, y)
    }

    /// Advance the simulation by exactly one step.
    pub fn tick(&mut self) {
        let ids: Vec<EntityId> = self.entities.keys().copied().collect();

        // Observe & decide. Persons digest and produce intents; foods
        // regenerate. Nothing touches the grid yet.
        let mut intents: Vec<Intent> = Vec::new();
        for id in ids {
            let view = self.observe(id);
            let Some(entity) = self.entities.get_mut(&id) else {
                continue;
            };
            match &mut entity.kind {
                EntityKind::Person(person) => {
                    intents.extend(person.decide(id, &view, &mut self.rng));
                }
                EntityKind::Food(food) => food.regenerate(),
            }
        }

        // The shuffle is the fairness mechanism: without it, creation order
        // would decide who wins contested cells and contested food.
        intents.shuffle(&mut self.rng);

        for intent in intents {
            self.resolve(intent);
        }

        self.ticks += 1;
        debug_assert!(self.grid.is_consistent());
    }

    /// Build the filtered view for one entity: its own cell as Center plus
    /// cells sampled outward up to the sight distance in each cardinal
    /// direction, with invisible occupants already dropped.
    pub fn observe(&self, id: EntityId) -> View {
        let mut view = View::default();
        let Ok((x, y)) = self.grid.coordinates_of(id) else {
            return view;
        };
        view.center = self.visible_only(self.grid.occupants_at(x, y).to_vec());
        for direction in Direction::CARDINAL {
            *view.bucket_mut(direction) =
                self.visible_only(self.grid.occupants_in_direction(id, direction, self.sight_distance));
        }
        view
    }

    /// Drop occupants whose entity fails the visibility predicate; invisible
    /// occupants must never influence a decision.
    fn visible_only(&self, occupants: Vec<Occupant>) -> Vec<Occupant> {
        occupants
            .into_iter()
            .filter(|o| self.entities.get(&o.id).is_some_and(Entity::visible))
            .collect()
    }

    /// Apply a single intent against the current state. Invalid intents
    /// (missing targets, wrong variants, depleted food, blocked moves) are
    /// absorbed as no-ops; a tick never aborts because of one.
    pub fn resolve(&mut self, intent: Intent) {
        match intent {
            Intent::Move {
                actor,
                direction,
                count,
            } => self.resolve_move(actor, direction, count),
            Intent::Eat { actor, target } => self.resolve_eat(actor, target),
        }
    }

    fn resolve_move(&mut self, actor: EntityId, direction: Direction, count: i64) {
        match self.grid.move_in_direction(actor, direction, count) {
            Ok(MoveOutcome::Moved { to, .. }) => {
                debug!("entity {actor} moved {direction:?} to {to:?}");
            }
            Ok(MoveOutcome::Blocked { at }) => {
                debug!("entity {actor} blocked moving {direction:?} from {at:?}");
            }
            Err(err) => {
                debug!("move intent for {actor} skipped: {err}");
                return;
            }
        }
        // The attempt costs energy whether or not the cell was won.
        if let Some(person) = self.entities.get_mut(&actor).and_then(Entity::as_person_mut) {
            person.charge_move(count);
        }
    }

    fn resolve_eat(&mut self, actor: EntityId, target: EntityId) {
        if self
            .entities
            .get(&actor)
            .and_then(Entity::as_person)
            .is_none()
        {
            debug!("eat intent from {actor} skipped: not a person");
            return;
        }
        let (Some(actor_cell), Some(target_cell)) = (
            self.grid.coordinates_of(actor).ok(),
            self.grid.coordinates_of(target).ok(),
        ) else {
            debug!("eat intent from {actor} skipped: untracked participant");
            return;
        };
        if actor_cell != target_cell {
            debug!("eat intent from {actor} skipped: food {target} is elsewhere");
            return;
        }
        let Some(food) = self.entities.get_mut(&target).and_then(Entity::as_food_mut) else {
            debug!("eat intent from {actor} skipped: {target} is not food");
            return;
        };
        if !food.consume_portion() {
            debug!("eat intent from {actor} skipped: food {target} is depleted");
            return;
        }
        if let Some(person) = self.entities.get_mut(&actor).and_then(Entity::as_person_mut) {
            person.fill_stomach(1.0);
        }
    }

    /// Read-only projections of every tracked entity, for renderers and
    /// exporters.
    pub fn snapshots(&self) -> impl Iterator<Item = EntitySnapshot> + '_ {
        self.entities.values().filter_map(|entity| {
            let (x, y) = self.grid.coordinates_of(entity.id).ok()?;
            Some(EntitySnapshot {
                id: entity.id,
                x,
                y,
                state: match &entity.kind {
                    EntityKind::Person(person) => SnapshotState::Person {
                        energy: person.energy,
                        energy_max: person.energy_max,
                        stomach: person.stomach,
                        stomach_max: person.stomach_max,
                        alive: person.alive(),
                    },
                    EntityKind::Food(food) => SnapshotState::Food {
                        amount: food.amount,
                        max_amount: food.max_amount,
                        visible: food.visible(),
                    },
                },
            })
        })
    }
}

/// Read-only projection of one entity: identity, wrapped coordinates, and
/// the public per-variant attributes.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct EntitySnapshot {
    pub id: EntityId,
    pub x: i64,
    pub y: i64,
    pub state: SnapshotState,
}

#[derive(Clone, Copy, Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotState {
    Person {
        energy: f64,
        energy_max: f64,
        stomach: f64,
        stomach_max: f64,
        alive: bool,
    },
    Food {
        amount: f64,
        max_amount: f64,
        visible: bool,
    },
}

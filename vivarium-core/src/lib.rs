//! Core of the vivarium simulation: a toroidal 2D grid of mobile `Person`
//! agents and stationary `Food` resources, advanced one discrete tick at a
//! time through an observe / decide / shuffle / resolve pipeline.

pub mod direction;
pub mod entity;
pub mod grid;
pub mod intent;
pub mod view;
pub mod world;

pub use direction::Direction;
pub use entity::{Entity, EntityId, EntityKind, Food, IdAllocator, Kind, Person};
pub use grid::{Grid, GridError, MoveOutcome, Occupant};
pub use intent::Intent;
pub use view::View;
pub use world::{EntitySnapshot, SnapshotState, World, WorldSettings};

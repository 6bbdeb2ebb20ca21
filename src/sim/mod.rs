//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Seeded RNG only
//! - Variable `dt`, explicit-Euler integration everywhere, with the time step
//!   clamped wherever a transition has a terminal state
//! - No rendering or platform dependencies

pub mod collision;
pub mod mapgen;
pub mod player;
pub mod spawner;
pub mod stats;
pub mod tick;
pub mod world;

pub use collision::{Rect, footprint, intersect_at};
pub use mapgen::{Biome, MapGen};
pub use player::{Axis, Direction, Motion, Player};
pub use spawner::Spawners;
pub use tick::{Game, GameEvent, Snapshot, TickInput};
pub use world::{Lane, LaneKind, Mesh, Tile, TileInstance, TileKind, World};

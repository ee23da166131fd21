//! Deterministic simulation module
//!
//! All arena logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only, owned by the world
//! - Stable iteration order (agents, scripted players, zombies)
//! - No rendering or platform dependencies

pub mod action;
pub mod ai;
pub mod bullet;
pub mod combat;
pub mod fighter;
pub mod geometry;
pub mod map;
pub mod navigation;
pub mod perception;
pub mod resource;
pub mod sensor;
pub mod spawn;
pub mod state;
pub mod tick;
pub mod wall;
pub mod weapon;

pub use action::{Action, AgentActions, Direction};
pub use bullet::Bullet;
pub use fighter::{CombatStats, Fighter, FighterId, FighterKind};
pub use map::{MapDescriptor, MapId, Objective, SpawnRegion};
pub use navigation::{MovementEstimate, movement_estimates};
pub use perception::sensor_feedback;
pub use resource::{Checkpoint, Decoration, Resource, ResourceKind};
pub use sensor::{SensorFan, SensorSpec, default_sensor_specs};
pub use spawn::{AgentBuilder, PlayerBuilder, ZombieBuilder};
pub use state::{World, WorldEvent};
pub use tick::{TickInput, tick};
pub use wall::Wall;
pub use weapon::{Weapon, WeaponChoice, WeaponKind};

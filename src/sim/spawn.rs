//! Builders that place new fighters into the world
//!
//! A spawn point is valid when a box of twice the fighter's radius around it
//! is free of walls and its circle does not overlap any living fighter.

use glam::DVec2;
use rand::Rng;

use super::fighter::{Fighter, FighterId};
use super::map::SpawnRegion;
use super::sensor::SensorSpec;
use super::state::World;
use super::wall::{Wall, collides_with_walls};
use super::weapon::{Weapon, WeaponChoice};
use crate::consts::{MAX_SPAWN_ATTEMPTS, ZOMBIE_MAX_LIFE};
use crate::error::SpawnError;

fn clear_of_walls(walls: &[Wall], p: DVec2, radius: f64) -> bool {
    let h = 2.0 * radius;
    let diagonals = [
        (DVec2::new(p.x - h, p.y - h), DVec2::new(p.x + h, p.y + h)),
        (DVec2::new(p.x - h, p.y + h), DVec2::new(p.x + h, p.y - h)),
    ];
    !diagonals
        .iter()
        .any(|&(a, b)| collides_with_walls(walls, a, b))
}

fn clear_of_fighters(fighters: &[Fighter], p: DVec2, radius: f64) -> bool {
    !fighters
        .iter()
        .any(|f| f.is_alive() && f.pos.distance(p) < f.radius + radius)
}

/// Sample a free point from one randomly chosen region
pub fn find_spawn_point<R: Rng + ?Sized>(
    rng: &mut R,
    regions: &[&SpawnRegion],
    walls: &[Wall],
    fighters: &[Fighter],
    radius: f64,
    what: &'static str,
) -> Result<DVec2, SpawnError> {
    if regions.is_empty() {
        return Err(SpawnError::NoSpawnRegions { what });
    }
    let region = regions[rng.random_range(0..regions.len())];
    for _ in 0..MAX_SPAWN_ATTEMPTS {
        let p = region.sample(rng);
        if clear_of_walls(walls, p, radius) && clear_of_fighters(fighters, p, radius) {
            return Ok(p);
        }
    }
    Err(SpawnError::Exhausted {
        what,
        attempts: MAX_SPAWN_ATTEMPTS,
    })
}

/// Free point in one of the map's player spawn regions
fn player_spawn_point(world: &mut World, radius: f64, what: &'static str) -> Result<DVec2, SpawnError> {
    let regions: Vec<&SpawnRegion> = world.map.player_spawns.iter().collect();
    find_spawn_point(&mut world.rng, &regions, &world.map.walls, &world.fighters, radius, what)
}

/// Builds externally controlled agents
#[derive(Debug, Clone)]
pub struct AgentBuilder {
    pub radius: f64,
    pub sensor_specs: Vec<SensorSpec>,
    pub friendly_fire_guard: bool,
}

impl AgentBuilder {
    pub fn spawn(&self, world: &mut World, label: &str, weapon: WeaponChoice) -> Result<FighterId, SpawnError> {
        let pos = player_spawn_point(world, self.radius, "agent")?;
        let kind = weapon.resolve(&mut world.rng);
        let id = world.next_entity_id();
        let agent = Fighter::agent(
            id,
            label,
            pos,
            self.radius,
            Weapon::new(kind, self.friendly_fire_guard),
            &self.sensor_specs,
            &world.map.walls,
        );
        world.add_fighter(agent);
        world.log_event(id, format!("{label} spawned with a {kind}"));
        Ok(id)
    }
}

/// Builds scripted survivors ("terminators")
#[derive(Debug, Clone)]
pub struct PlayerBuilder {
    pub radius: f64,
    pub weapon: WeaponChoice,
    pub friendly_fire_guard: bool,
}

impl PlayerBuilder {
    pub fn spawn(&self, world: &mut World) -> Result<FighterId, SpawnError> {
        let pos = player_spawn_point(world, self.radius, "player")?;
        let kind = self.weapon.resolve(&mut world.rng);
        let id = world.next_entity_id();
        let player = Fighter::scripted(
            id,
            "terminator",
            pos,
            self.radius,
            Weapon::new(kind, self.friendly_fire_guard),
        );
        world.add_fighter(player);
        Ok(id)
    }
}

/// Builds zombies with a random heading and life
#[derive(Debug, Clone)]
pub struct ZombieBuilder {
    pub radius: f64,
}

impl ZombieBuilder {
    /// `initial` also allows regions reserved for the start of an episode
    pub fn spawn(&self, world: &mut World, initial: bool) -> Result<FighterId, SpawnError> {
        let regions: Vec<&SpawnRegion> = world
            .map
            .zombie_spawns
            .iter()
            .filter(|r| initial || !r.initial_spawn_only)
            .collect();
        let pos = find_spawn_point(
            &mut world.rng,
            &regions,
            &world.map.walls,
            &world.fighters,
            self.radius,
            "zombie",
        )?;
        let heading = world.rng.random_range(-180.0..180.0);
        let life = world.rng.random_range(ZOMBIE_MAX_LIFE / 2..=ZOMBIE_MAX_LIFE);
        let id = world.next_entity_id();
        world.add_fighter(Fighter::zombie(id, pos, self.radius, heading, life));
        Ok(id)
    }
}

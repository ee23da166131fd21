//! World state
//!
//! The world is an arena: fighters live in one vector and are addressed by
//! index within a tick and by `FighterId` across ticks. The vector is kept
//! ordered agents, then scripted players, then zombies. Dead agents stay in
//! place so agent indices never shift; dead zombies and scripted players are
//! removed during `purge`.

use std::collections::BTreeMap;

use glam::DVec2;
use log::debug;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::action::{Action, Direction};
use super::bullet::Bullet;
use super::combat;
use super::fighter::{Fighter, FighterId, FighterKind, validated_destination};
use super::map::MapDescriptor;
use super::resource::{Checkpoint, Decoration, DecorationKind, Resource};
use crate::consts::DEAD_BODY_DISPLAY_TIME;
use crate::{angle_and_distance_to_point, rectified_angle};

/// Half-angle (degrees) within which agents pick up resources and checkpoints
pub const CONSUMPTION_ANGLE: f64 = 60.0;

/// One line of the world's event log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldEvent {
    pub time: f64,
    pub fighter: FighterId,
    pub message: String,
}

/// Complete simulation state for one map
#[derive(Debug, Clone)]
pub struct World {
    /// Seed the RNG was created from
    pub seed: u64,
    /// The only source of randomness in the simulation
    pub rng: Pcg32,
    pub map: MapDescriptor,
    /// Map extent as floats
    pub size: (f64, f64),
    /// Seconds per tick
    pub dt: f64,
    /// Simulated seconds since reset
    pub time: f64,
    pub time_ticks: u64,
    /// Agents, then scripted players, then zombies
    pub fighters: Vec<Fighter>,
    pub bullets: Vec<Bullet>,
    /// Keyed by grid position, at most one per spot
    pub resources: BTreeMap<(i64, i64), Resource>,
    pub checkpoints: Vec<Checkpoint>,
    /// Not gameplay-affecting
    pub decorations: Vec<Decoration>,
    pub events: Vec<WorldEvent>,
    pub deaths: u32,
    pub zombie_deaths: u32,
    pub player_deaths: u32,
    next_id: u32,
}

impl World {
    pub fn new(map: MapDescriptor, dt: f64, seed: u64) -> Self {
        Self::with_rng(map, dt, seed, Pcg32::seed_from_u64(seed))
    }

    /// Use an already positioned RNG
    pub fn with_rng(map: MapDescriptor, dt: f64, seed: u64, rng: Pcg32) -> Self {
        let mut world = Self {
            seed,
            rng,
            size: map.size_f64(),
            map,
            dt,
            time: 0.0,
            time_ticks: 0,
            fighters: Vec::new(),
            bullets: Vec::new(),
            resources: BTreeMap::new(),
            checkpoints: Vec::new(),
            decorations: Vec::new(),
            events: Vec::new(),
            deaths: 0,
            zombie_deaths: 0,
            player_deaths: 0,
            next_id: 1,
        };
        world.reset();
        world
    }

    /// Swap in a different map and clear everything on it
    pub fn load_map(&mut self, map: MapDescriptor) {
        self.size = map.size_f64();
        self.map = map;
        self.reset();
    }

    /// Clear all dynamic state. The RNG keeps its position.
    pub fn reset(&mut self) {
        self.time = 0.0;
        self.time_ticks = 0;
        self.fighters.clear();
        self.bullets.clear();
        self.resources.clear();
        self.checkpoints = self
            .map
            .checkpoints
            .iter()
            .map(|c| Checkpoint::new(c.pos, c.radius))
            .collect();
        self.decorations.clear();
        self.events.clear();
        self.deaths = 0;
        self.zombie_deaths = 0;
        self.player_deaths = 0;
        self.next_id = 1;
    }

    /// Allocate a new fighter ID
    pub fn next_entity_id(&mut self) -> FighterId {
        let id = FighterId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Insert keeping kind order; returns the new fighter's index
    pub fn add_fighter(&mut self, fighter: Fighter) -> usize {
        let rank = fighter.kind.rank();
        let at = self.fighters.partition_point(|f| f.kind.rank() <= rank);
        self.fighters.insert(at, fighter);
        at
    }

    /// Agents in creation order, dead ones included
    pub fn agents(&self) -> &[Fighter] {
        let n = self.fighters.partition_point(|f| f.is_agent());
        &self.fighters[..n]
    }

    pub fn agent_count(&self) -> usize {
        self.agents().len()
    }

    pub fn living(&self, kind: FighterKind) -> impl Iterator<Item = &Fighter> {
        self.fighters
            .iter()
            .filter(move |f| f.kind == kind && f.is_alive())
    }

    /// Living agents and scripted players
    pub fn living_players(&self) -> impl Iterator<Item = &Fighter> {
        self.fighters.iter().filter(|f| !f.is_zombie() && f.is_alive())
    }

    pub fn is_at_objective(&self, pos: DVec2) -> bool {
        self.map.objectives.iter().any(|o| o.contains(pos))
    }

    /// Roll every resource spawn point once
    pub fn spawn_resources(&mut self) {
        for spawn in &self.map.resource_spawns {
            if let Some(resource) = spawn.roll(&mut self.rng) {
                self.resources.entry(resource.key()).or_insert(resource);
            }
        }
    }

    pub fn log_event(&mut self, fighter: FighterId, message: impl Into<String>) {
        self.events.push(WorldEvent {
            time: self.time,
            fighter,
            message: message.into(),
        });
    }

    /// Run one action for the fighter at `idx`. Dead fighters do nothing.
    pub fn execute_action(&mut self, idx: usize, action: Action) {
        let Some(fighter) = self.fighters.get(idx) else {
            return;
        };
        if !fighter.is_alive() {
            return;
        }
        match action {
            Action::Move(direction) => self.move_fighter(idx, direction),
            Action::Rotate(delta) => {
                if delta != 0.0 {
                    self.fighters[idx].rotate(delta, &self.map.walls);
                }
            }
            Action::UseWeapon => combat::use_weapon(self, idx),
            Action::HealSelf => {
                self.fighters[idx].heal_self();
            }
            Action::HealAlly => combat::heal_ally(self, idx),
        }
    }

    fn move_fighter(&mut self, idx: usize, direction: Direction) {
        let fighter = &self.fighters[idx];
        let delta = match direction {
            Direction::Forward => fighter.step_forward(),
            Direction::Backward => -fighter.step_forward(),
            // Only agents strafe
            Direction::Right if fighter.is_agent() => fighter.step_right(),
            Direction::Left if fighter.is_agent() => -fighter.step_right(),
            Direction::Right | Direction::Left => return,
        };
        let dest = fighter.pos + delta;
        let pos = validated_destination(fighter, dest, &self.map.walls, &self.fighters, self.size);
        self.fighters[idx].set_position(pos, &self.map.walls);
    }

    /// Whether `target` at `target_pos` is close enough and in front of
    /// `fighter` to be picked up
    fn within_reach(fighter: &Fighter, target_pos: DVec2, target_radius: f64) -> bool {
        let (angle, distance) = angle_and_distance_to_point(fighter.pos, fighter.heading, target_pos);
        if distance >= fighter.radius + target_radius {
            return false;
        }
        angle.abs() <= CONSUMPTION_ANGLE + rectified_angle(target_radius, distance)
    }

    /// The fighter at `idx` uses every resource within reach
    pub fn consume_resources(&mut self, idx: usize) {
        let fighter = &mut self.fighters[idx];
        for resource in self.resources.values_mut() {
            if !resource.is_used_up() && Self::within_reach(fighter, resource.pos, resource.radius) {
                resource.use_by(fighter);
            }
        }
    }

    /// The fighter at `idx` checks in at every checkpoint within reach
    pub fn check_in(&mut self, idx: usize) {
        let fighter = &mut self.fighters[idx];
        for checkpoint in &mut self.checkpoints {
            if Self::within_reach(fighter, checkpoint.pos, checkpoint.radius) {
                checkpoint.check_in(fighter);
            }
        }
    }

    /// End-of-tick cleanup
    pub fn purge(&mut self) {
        self.bullets.retain(|b| b.active);
        self.resources.retain(|_, r| !r.is_used_up());

        let agents = &self.fighters[..self.fighters.partition_point(|f| f.is_agent())];
        for checkpoint in &mut self.checkpoints {
            if !checkpoint.disabled && checkpoint.all_checked_in(agents.iter().filter(|a| a.is_alive())) {
                checkpoint.disabled = true;
            }
        }

        let mut fallen = Vec::new();
        self.fighters.retain(|f| {
            if f.is_alive() || f.is_agent() {
                true
            } else {
                fallen.push((f.id, f.kind, f.pos, f.radius));
                false
            }
        });
        for (id, kind, pos, radius) in fallen {
            self.deaths += 1;
            match kind {
                FighterKind::Zombie => self.zombie_deaths += 1,
                _ => self.player_deaths += 1,
            }
            debug!("{:?} {} died at ({:.0}, {:.0})", kind, id, pos.x, pos.y);
            self.log_event(id, "died");
            self.decorations.push(Decoration {
                kind: DecorationKind::DeadBody { pos, radius },
                life: DEAD_BODY_DISPLAY_TIME,
            });
        }

        let dt = self.dt;
        for decoration in &mut self.decorations {
            decoration.life -= dt;
        }
        self.decorations.retain(|d| d.life > 0.0);
    }
}

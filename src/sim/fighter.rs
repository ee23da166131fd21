//! Fighters: agents, zombies and scripted players
//!
//! All three share movement, rotation and weapon use. What differs is who
//! decides: agents are driven from outside each tick, the other two run the
//! built-in state machine in `ai`.

use std::fmt;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::sensor::{SensorFan, SensorSpec};
use super::wall::{Wall, collides_with_walls};
use super::weapon::{Weapon, WeaponKind};
use crate::consts::{MAX_HEALING_CAPACITY, PLAYER_MAX_LIFE, ZOMBIE_MAX_LIFE};
use crate::{heading_vector, normalize_angle};

/// Stable handle for a fighter within one world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FighterId(pub u32);

impl fmt::Display for FighterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Which side a fighter is on and who controls it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FighterKind {
    /// Externally controlled survivor
    Agent,
    /// Built-in survivor bot
    ScriptedPlayer,
    Zombie,
}

impl FighterKind {
    /// Iteration order inside the world: agents, then scripted players, then zombies
    pub fn rank(self) -> u8 {
        match self {
            FighterKind::Agent => 0,
            FighterKind::ScriptedPlayer => 1,
            FighterKind::Zombie => 2,
        }
    }
}

/// Per-fighter counters consumed by reward shaping
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatStats {
    pub kills: u32,
    pub attack_count: u32,
    pub attack_hits: u32,
    pub fratricide: u32,
    pub friendly_fire: u32,
    pub friendly_fire_avoided: u32,
    pub healing_of_others: u32,
    pub checkpoints_reached: u32,
}

impl CombatStats {
    /// Hit percentage, 0 before the first attack
    pub fn accuracy(&self) -> f64 {
        if self.attack_count == 0 {
            0.0
        } else {
            100.0 * f64::from(self.attack_hits) / f64::from(self.attack_count)
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fighter {
    pub id: FighterId,
    pub kind: FighterKind,
    pub label: String,
    pub pos: DVec2,
    pub radius: f64,
    /// Degrees in (-180, 180], 0 = up
    pub heading: f64,
    /// In [0, max_life]; 0 means dead
    pub life: i32,
    pub max_life: i32,
    pub weapon: Weapon,
    pub step_size: f64,
    /// Only agents carry a sensor fan
    pub sensors: Option<SensorFan>,
    pub healing_capacity: i32,
    pub stats: CombatStats,
}

impl Fighter {
    /// Externally controlled agent facing up, with a sensor fan
    pub fn agent(
        id: FighterId,
        label: impl Into<String>,
        pos: DVec2,
        radius: f64,
        weapon: Weapon,
        sensor_specs: &[SensorSpec],
        walls: &[Wall],
    ) -> Self {
        Self {
            id,
            kind: FighterKind::Agent,
            label: label.into(),
            pos,
            radius,
            heading: 0.0,
            life: PLAYER_MAX_LIFE,
            max_life: PLAYER_MAX_LIFE,
            weapon,
            step_size: radius / 2.0,
            sensors: Some(SensorFan::new(sensor_specs, pos, 0.0, walls)),
            healing_capacity: MAX_HEALING_CAPACITY,
            stats: CombatStats::default(),
        }
    }

    pub fn zombie(id: FighterId, pos: DVec2, radius: f64, heading: f64, life: i32) -> Self {
        Self {
            id,
            kind: FighterKind::Zombie,
            label: "zombie".to_string(),
            pos,
            radius,
            heading: normalize_angle(heading),
            life: life.clamp(0, ZOMBIE_MAX_LIFE),
            max_life: ZOMBIE_MAX_LIFE,
            weapon: Weapon::new(WeaponKind::ZombieClaws, false),
            step_size: radius / 5.0,
            sensors: None,
            healing_capacity: 0,
            stats: CombatStats::default(),
        }
    }

    /// Built-in survivor bot facing up
    pub fn scripted(id: FighterId, label: impl Into<String>, pos: DVec2, radius: f64, weapon: Weapon) -> Self {
        Self {
            id,
            kind: FighterKind::ScriptedPlayer,
            label: label.into(),
            pos,
            radius,
            heading: 0.0,
            life: PLAYER_MAX_LIFE,
            max_life: PLAYER_MAX_LIFE,
            weapon,
            step_size: radius / 5.0,
            sensors: None,
            healing_capacity: 0,
            stats: CombatStats::default(),
        }
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.life > 0
    }

    #[inline]
    pub fn is_zombie(&self) -> bool {
        self.kind == FighterKind::Zombie
    }

    #[inline]
    pub fn is_agent(&self) -> bool {
        self.kind == FighterKind::Agent
    }

    /// Unit vector along the heading
    pub fn facing(&self) -> DVec2 {
        heading_vector(self.heading)
    }

    /// Displacement for one step in the heading direction
    pub fn step_forward(&self) -> DVec2 {
        self.step_size * self.facing()
    }

    /// Displacement for one sideways step to the right
    pub fn step_right(&self) -> DVec2 {
        let f = self.step_forward();
        DVec2::new(-f.y, f.x)
    }

    /// Move to an already validated position and re-anchor the sensors
    pub fn set_position(&mut self, pos: DVec2, walls: &[Wall]) {
        self.pos = pos;
        if let Some(fan) = &mut self.sensors {
            fan.set_center(pos, walls);
        }
    }

    /// Turn by `delta` degrees. No collision check.
    pub fn rotate(&mut self, delta: f64, walls: &[Wall]) {
        self.heading = normalize_angle(self.heading + delta);
        if let Some(fan) = &mut self.sensors {
            fan.set_orientation(self.heading, walls);
        }
    }

    /// Subtract damage, clamping life at zero
    pub fn take_damage(&mut self, damage: i32) {
        self.life = (self.life - damage).max(0);
    }

    /// Spend one unit of healing capacity on own life
    pub fn heal_self(&mut self) -> bool {
        if self.life < self.max_life && self.healing_capacity > 0 {
            self.life += 1;
            self.healing_capacity -= 1;
            true
        } else {
            false
        }
    }
}

/// Where a fighter ends up after trying to step to `dest`.
///
/// The two leading corners of the fighter's bounding box (picked by travel
/// octant) are swept from the old position; if either sweep crosses a wall,
/// or the destination overlaps another living fighter, the fighter stays put.
/// The result is clamped to the map.
pub fn validated_destination(
    mover: &Fighter,
    dest: DVec2,
    walls: &[Wall],
    others: &[Fighter],
    size: (f64, f64),
) -> DVec2 {
    let origin = mover.pos;
    let r = mover.radius;
    let d = dest - origin;
    let angle = d.x.atan2(-d.y).to_degrees();

    let corners = if (-45.0..=45.0).contains(&angle) {
        [DVec2::new(dest.x - r, dest.y - r), DVec2::new(dest.x + r, dest.y - r)]
    } else if angle > 45.0 && angle <= 135.0 {
        [DVec2::new(dest.x + r, dest.y - r), DVec2::new(dest.x + r, dest.y + r)]
    } else if !(-135.0..=135.0).contains(&angle) {
        [DVec2::new(dest.x - r, dest.y + r), DVec2::new(dest.x + r, dest.y + r)]
    } else {
        [DVec2::new(dest.x - r, dest.y - r), DVec2::new(dest.x - r, dest.y + r)]
    };

    let blocked = corners
        .iter()
        .any(|&corner| collides_with_walls(walls, origin, corner))
        || others.iter().any(|other| {
            other.id != mover.id
                && other.is_alive()
                && other.pos.distance(dest) < other.radius + mover.radius
        });

    let pos = if blocked { origin } else { dest };
    let (w, h) = size;
    DVec2::new(pos.x.max(0.0).min(w - 1.0), pos.y.max(0.0).min(h - 1.0))
}

//! Per-agent sensor feedback
//!
//! For every ray the agent gets eight values:
//!
//! | column | meaning |
//! |---|---|
//! | 0 | ammo resource |
//! | 1 | medical resource |
//! | 2 | zombie |
//! | 3 | other agent or scripted player |
//! | 4 | objective boundary |
//! | 5 | checkpoint |
//! | 6 | wall |
//! | 7 | self state (first four rays only) |
//!
//! Distances are divided by the ray length and capped at `NO_DETECTION`.
//! Anything farther than the wall on the same ray is hidden.

use glam::DVec2;

use super::fighter::Fighter;
use super::resource::ResourceKind;
use super::sensor::SensorFan;
use super::state::World;
use crate::consts::{FEATURES_PER_SENSOR, MAX_HEALING_CAPACITY, NO_DETECTION};
use crate::{angle_and_distance_to_point, rectified_angle};

const AMMO: usize = 0;
const MEDICAL: usize = 1;
const ZOMBIE: usize = 2;
const PLAYER: usize = 3;
const OBJECTIVE: usize = 4;
const CHECKPOINT: usize = 5;
const WALL: usize = 6;
const SELF_STATE: usize = 7;

/// Per-ray minimum distance to round things of one category
struct RayDistances {
    distances: Vec<f64>,
}

impl RayDistances {
    fn new(fan: &SensorFan) -> Self {
        Self {
            distances: fan.sensors().iter().map(|s| 2.0 * s.length).collect(),
        }
    }

    /// Record a circle at `pos` on every ray its angular footprint covers
    fn observe(&mut self, fan: &SensorFan, viewer: &Fighter, pos: DVec2, radius: f64) {
        let (angle, distance) = angle_and_distance_to_point(viewer.pos, viewer.heading, pos);
        if distance >= fan.max_length() + radius {
            return;
        }
        let spread = rectified_angle(radius, distance);
        let (lo, hi) = (angle - spread, angle + spread);

        let mut ranges = vec![fan.rays_between(lo, hi)];
        // Footprints straddling the back of the fan wrap around
        if lo < -180.0 {
            ranges.push(fan.rays_between(lo + 360.0, 180.0));
        }
        if hi > 180.0 {
            ranges.push(fan.rays_between(-180.0, hi - 360.0));
        }

        for i in ranges.into_iter().flatten() {
            if distance >= fan.sensors()[i].length + radius {
                continue;
            }
            self.distances[i] = self.distances[i].min(distance);
        }
    }
}

/// Flat feedback vector (`8 x rays`) for the fighter at `idx`. Fighters
/// without sensors get an empty vector.
pub fn sensor_feedback(world: &World, idx: usize) -> Vec<f32> {
    let me = &world.fighters[idx];
    let Some(fan) = me.sensors.as_ref() else {
        return Vec::new();
    };

    let mut ammo = RayDistances::new(fan);
    let mut medical = RayDistances::new(fan);
    for resource in world.resources.values().filter(|r| !r.is_used_up()) {
        let channel = match resource.kind {
            ResourceKind::Ammo => &mut ammo,
            ResourceKind::Medical => &mut medical,
        };
        channel.observe(fan, me, resource.pos, resource.radius);
    }

    let mut zombies = RayDistances::new(fan);
    let mut players = RayDistances::new(fan);
    for (i, other) in world.fighters.iter().enumerate() {
        if i == idx || !other.is_alive() {
            continue;
        }
        let channel = if other.is_zombie() { &mut zombies } else { &mut players };
        channel.observe(fan, me, other.pos, other.radius);
    }

    let mut checkpoints = RayDistances::new(fan);
    for checkpoint in world.checkpoints.iter().filter(|c| !c.disabled) {
        checkpoints.observe(fan, me, checkpoint.pos, checkpoint.radius);
    }

    let inside_objective = world.is_at_objective(me.pos);

    let n = fan.len();
    let mut out = vec![NO_DETECTION; n * FEATURES_PER_SENSOR];
    for (i, sensor) in fan.sensors().iter().enumerate() {
        let len = sensor.length;
        let row = &mut out[i * FEATURES_PER_SENSOR..(i + 1) * FEATURES_PER_SENSOR];
        let norm = |d: f64| (d / len).min(f64::from(NO_DETECTION)) as f32;

        row[AMMO] = norm(ammo.distances[i]);
        row[MEDICAL] = norm(medical.distances[i]);
        row[ZOMBIE] = norm(zombies.distances[i]);
        row[PLAYER] = norm(players.distances[i]);
        row[OBJECTIVE] = if inside_objective {
            0.0
        } else {
            norm(sensor.detect_objective(&world.map.objectives))
        };
        row[CHECKPOINT] = norm(checkpoints.distances[i]);
        row[WALL] = norm(sensor.detect_wall());

        let wall = row[WALL];
        for value in &mut row[..WALL] {
            if *value > wall {
                *value = NO_DETECTION;
            }
        }
        row[SELF_STATE] = 0.0;
    }

    let self_state = [
        me.life as f32 / me.max_life as f32,
        me.healing_capacity as f32 / MAX_HEALING_CAPACITY as f32,
        me.weapon.weapon_id() as f32 / 64.0,
        me.weapon.ammo_fraction() as f32,
    ];
    for (i, value) in self_state.into_iter().enumerate().take(n) {
        out[i * FEATURES_PER_SENSOR + SELF_STATE] = value;
    }
    out
}

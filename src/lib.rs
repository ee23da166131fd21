//! Zombie Arena - a top-down survival arena simulation
//!
//! Core modules:
//! - `sim`: Deterministic simulation (geometry, perception, navigation, combat, world stepping)
//! - `game`: Episode driver (reset/step, zombie top-up, end-of-episode handling)
//! - `rules`: Win/loss conditions evaluated against world state
//! - `reward`: Per-agent reward shaping from cumulative counters
//! - `settings`: Data-driven game configuration

pub mod error;
pub mod game;
pub mod reward;
pub mod rules;
pub mod settings;
pub mod sim;

pub use error::{ConfigError, Error, SpawnError};
pub use game::{Game, StepOutcome};
pub use settings::GameConfig;

use glam::DVec2;

/// Game configuration constants
pub mod consts {
    /// Default simulation rate (ticks per simulated second)
    pub const DEFAULT_FPS: u32 = 50;

    /// Radius shared by agents, zombies and scripted players
    pub const FIGHTER_RADIUS: f64 = 10.0;

    /// Maximum life of agents and scripted players
    pub const PLAYER_MAX_LIFE: i32 = 100;
    /// Maximum life of zombies (initial life is drawn from [MAX/2, MAX])
    pub const ZOMBIE_MAX_LIFE: i32 = 100;
    /// Healing capacity an agent starts with
    pub const MAX_HEALING_CAPACITY: i32 = 100;

    /// Length of the dense forward sensor rays
    pub const FRONT_SENSOR_LENGTH: f64 = 250.0;
    /// Length of the sparse side/rear sensor rays
    pub const SIDE_SENSOR_LENGTH: f64 = 50.0;
    /// Features emitted per sensor ray
    pub const FEATURES_PER_SENSOR: usize = 8;
    /// Normalized distance meaning "nothing detected on this ray"
    pub const NO_DETECTION: f32 = 2.0;

    /// How long a bullet stays in the air (seconds)
    pub const BULLET_TIME_IN_AIR: f64 = 0.5;
    /// Damage dealt when a bullet passes within half a radius of a fighter's centre
    pub const CENTER_HIT_DAMAGE: i32 = 100;
    /// Clearance multiplier for the friendly-fire path check
    pub const FRIENDLY_FIRE_BUFFER: f64 = 1.2;

    /// Dead bodies linger this long (seconds)
    pub const DEAD_BODY_DISPLAY_TIME: f64 = 2.0;

    /// Spawn attempts before a placement is considered impossible
    pub const MAX_SPAWN_ATTEMPTS: u32 = 1000;

    /// Episodes are truncated after this much simulated time (seconds)
    pub const MAX_EPISODE_SECONDS: f64 = 300.0;
}

/// Normalize an angle in degrees to (-180, 180]
#[inline]
pub fn normalize_angle(angle: f64) -> f64 {
    // `%` is exact, and so are the single corrections below
    let a = angle % 360.0;
    if a > 180.0 {
        a - 360.0
    } else if a <= -180.0 {
        a + 360.0
    } else {
        a
    }
}

/// Unit vector for a heading in degrees (0 = up / -y, clockwise positive)
#[inline]
pub fn heading_vector(heading: f64) -> DVec2 {
    let rad = heading.to_radians();
    DVec2::new(rad.sin(), -rad.cos())
}

/// Angle (degrees, relative to `heading`) and distance from `position` to `point`
#[inline]
pub fn angle_and_distance_to_point(position: DVec2, heading: f64, point: DVec2) -> (f64, f64) {
    let d = point - position;
    let angle = d.x.atan2(-d.y).to_degrees();
    (normalize_angle(angle - heading), d.length())
}

/// Half-width (degrees) subtended by a circle of `radius` seen from `distance`
#[inline]
pub fn rectified_angle(radius: f64, distance: f64) -> f64 {
    radius.atan2(distance).to_degrees()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_angle_range() {
        assert_eq!(normalize_angle(180.0), 180.0);
        assert_eq!(normalize_angle(-180.0), 180.0);
        assert_eq!(normalize_angle(190.0), -170.0);
        assert_eq!(normalize_angle(-190.0), 170.0);
        assert_eq!(normalize_angle(720.0), 0.0);
        assert_eq!(normalize_angle(45.0), 45.0);
    }

    #[test]
    fn test_heading_vector() {
        let up = heading_vector(0.0);
        assert!((up - DVec2::new(0.0, -1.0)).length() < 1e-12);
        let right = heading_vector(90.0);
        assert!((right - DVec2::new(1.0, 0.0)).length() < 1e-12);
    }

    #[test]
    fn test_angle_to_point() {
        let origin = DVec2::new(100.0, 100.0);
        let (angle, dist) = angle_and_distance_to_point(origin, 0.0, DVec2::new(110.0, 100.0));
        assert!((angle - 90.0).abs() < 1e-9);
        assert!((dist - 10.0).abs() < 1e-9);

        // Same point seen while facing right is dead ahead
        let (angle, _) = angle_and_distance_to_point(origin, 90.0, DVec2::new(110.0, 100.0));
        assert!(angle.abs() < 1e-9);
    }
}

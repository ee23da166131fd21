//! Ray sensors
//!
//! Each agent carries a fixed fan of rays. A ray caches its nearest wall
//! intersection, and the cache is recomputed eagerly whenever the owner moves
//! or turns, so readers never see a stale distance.

use std::ops::Range;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::map::Objective;
use super::wall::Wall;
use crate::consts::SIDE_SENSOR_LENGTH;
use crate::heading_vector;

/// Angle (degrees, relative to heading) and length of one ray
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorSpec {
    pub angle: f64,
    pub length: f64,
}

/// The standard 7 + 25 + 7 fan: sparse short rays behind and to the sides,
/// dense long rays across the front 120 degrees.
pub fn default_sensor_specs(front_length: f64) -> Vec<SensorSpec> {
    let rear_left = (0..7).map(|i| SensorSpec {
        angle: -165.0 + 15.0 * f64::from(i),
        length: SIDE_SENSOR_LENGTH,
    });
    let front = (0..25).map(|i| SensorSpec {
        angle: -60.0 + 5.0 * f64::from(i),
        length: front_length,
    });
    let rear_right = (0..7).map(|i| SensorSpec {
        angle: 75.0 + 15.0 * f64::from(i),
        length: SIDE_SENSOR_LENGTH,
    });
    rear_left.chain(front).chain(rear_right).collect()
}

/// A single ray anchored at its owner's position
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sensor {
    pub angle: f64,
    pub length: f64,
    center: DVec2,
    heading: f64,
    /// Nearest wall crossing and its distance from `center`
    wall_hit: Option<(DVec2, f64)>,
}

impl Sensor {
    pub fn new(spec: SensorSpec, center: DVec2, heading: f64, walls: &[Wall]) -> Self {
        let mut sensor = Self {
            angle: spec.angle,
            length: spec.length,
            center,
            heading,
            wall_hit: None,
        };
        sensor.refresh(walls);
        sensor
    }

    /// Unobstructed far end of the ray
    pub fn end_point(&self) -> DVec2 {
        self.center + self.length * heading_vector(self.angle + self.heading)
    }

    pub fn set_center(&mut self, center: DVec2, walls: &[Wall]) {
        self.center = center;
        self.refresh(walls);
    }

    pub fn set_orientation(&mut self, heading: f64, walls: &[Wall]) {
        self.heading = heading;
        self.refresh(walls);
    }

    fn refresh(&mut self, walls: &[Wall]) {
        let end = self.end_point();
        self.wall_hit = None;
        for wall in walls {
            if let Some(point) = wall.collide(self.center, end) {
                let distance = self.center.distance(point);
                if self.wall_hit.is_none_or(|(_, best)| distance < best) {
                    self.wall_hit = Some((point, distance));
                }
            }
        }
    }

    /// Cached wall hit point, if any wall crosses the ray
    pub fn wall_point(&self) -> Option<DVec2> {
        self.wall_hit.map(|(p, _)| p)
    }

    /// Distance to the nearest wall, or twice the ray length when clear
    pub fn detect_wall(&self) -> f64 {
        self.wall_hit.map_or(2.0 * self.length, |(_, d)| d)
    }

    /// Distance to the nearest objective boundary along the ray, or twice the
    /// ray length when none is crossed
    pub fn detect_objective(&self, objectives: &[Objective]) -> f64 {
        let end = self.end_point();
        objectives
            .iter()
            .flat_map(|o| o.collide(self.center, end))
            .map(|p| self.center.distance(p))
            .fold(2.0 * self.length, f64::min)
    }
}

/// All rays of one fighter, ordered by angle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorFan {
    sensors: Vec<Sensor>,
    max_length: f64,
}

impl SensorFan {
    pub fn new(specs: &[SensorSpec], center: DVec2, heading: f64, walls: &[Wall]) -> Self {
        let mut sensors: Vec<Sensor> = specs
            .iter()
            .map(|&spec| Sensor::new(spec, center, heading, walls))
            .collect();
        sensors.sort_by(|a, b| a.angle.total_cmp(&b.angle));
        let max_length = sensors.iter().map(|s| s.length).fold(0.0, f64::max);
        Self { sensors, max_length }
    }

    pub fn sensors(&self) -> &[Sensor] {
        &self.sensors
    }

    pub fn len(&self) -> usize {
        self.sensors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sensors.is_empty()
    }

    pub fn max_length(&self) -> f64 {
        self.max_length
    }

    pub fn set_center(&mut self, center: DVec2, walls: &[Wall]) {
        for sensor in &mut self.sensors {
            sensor.set_center(center, walls);
        }
    }

    pub fn set_orientation(&mut self, heading: f64, walls: &[Wall]) {
        for sensor in &mut self.sensors {
            sensor.set_orientation(heading, walls);
        }
    }

    /// Indices of rays whose angle lies in `[lo, hi]` (binary search)
    pub fn rays_between(&self, lo: f64, hi: f64) -> Range<usize> {
        let start = self.sensors.partition_point(|s| s.angle < lo);
        let end = self.sensors.partition_point(|s| s.angle <= hi);
        start..end.max(start)
    }
}

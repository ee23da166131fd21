//! Static wall segments

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::geometry::{parameter_of_point_on_segment, segment_intersection};

/// An immutable wall segment. Walls are loaded once per map and never move.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Wall {
    pub start: DVec2,
    pub end: DVec2,
    /// Drawn thickness; does not affect collision
    pub thickness: f32,
}

impl Wall {
    pub fn new(start: DVec2, end: DVec2, thickness: f32) -> Self {
        Self { start, end, thickness }
    }

    /// Build from integer pixel coordinates
    pub fn from_coords(x0: i32, y0: i32, x1: i32, y1: i32, thickness: f32) -> Self {
        Self::new(
            DVec2::new(f64::from(x0), f64::from(y0)),
            DVec2::new(f64::from(x1), f64::from(y1)),
            thickness,
        )
    }

    /// Point where the segment `p1-p2` crosses this wall
    #[inline]
    pub fn collide(&self, p1: DVec2, p2: DVec2) -> Option<DVec2> {
        segment_intersection(p1, p2, self.start, self.end)
    }
}

/// Whether the segment `a-b` crosses any wall
pub fn collides_with_walls(walls: &[Wall], a: DVec2, b: DVec2) -> bool {
    walls.iter().any(|w| w.collide(a, b).is_some())
}

/// First wall hit travelling from `start` to `end`.
///
/// Returns the hit point and its parameter along the path. Ties keep the
/// earlier wall in map order.
pub fn first_wall_hit(walls: &[Wall], start: DVec2, end: DVec2) -> Option<(DVec2, f64)> {
    // Above 1 so a path ending exactly on a wall still registers
    let mut min_l = 1.01;
    let mut closest = None;
    for wall in walls {
        if let Some(point) = wall.collide(start, end) {
            let l = parameter_of_point_on_segment(start, end, point);
            if l < min_l {
                min_l = l;
                closest = Some((point, l));
            }
        }
    }
    closest
}

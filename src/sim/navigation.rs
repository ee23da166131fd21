//! Navigation estimator
//!
//! Lets fighters without a sensor fan (zombies, scripted players) steer around
//! walls. Every wall within a lookout radius is reduced to the angular span it
//! covers in front of the fighter; the spans are then scanned for clear
//! stretches ahead and for the nearest gaps wide enough to walk through on
//! either side.

use glam::DVec2;

use super::geometry::{
    LineIntersection, NearestPoint, line_intersection, nearest_point_and_distance,
    rotate_vector, segment_circle_extreme_points,
};
use super::wall::Wall;
use crate::{angle_and_distance_to_point, heading_vector, normalize_angle};

/// A point seen from the fighter: relative angle, distance and location
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SightPoint {
    pub angle: f64,
    pub distance: f64,
    pub point: DVec2,
}

/// The part of one wall visible within the lookout radius
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibleWallSegment {
    /// Endpoint with the smaller relative angle
    pub left: SightPoint,
    /// Endpoint with the larger relative angle
    pub right: SightPoint,
    /// True nearest point of the whole wall to the fighter
    pub nearest_point: DVec2,
    /// Whether `nearest_point` is an interior projection rather than a wall end
    pub nearest_is_interior: bool,
}

impl VisibleWallSegment {
    /// Inclusive span test
    pub fn contains_angle(&self, angle: f64) -> bool {
        self.left.angle <= angle && angle <= self.right.angle
    }

    /// How far the fighter can walk straight ahead before touching this wall.
    ///
    /// For an interior nearest point the clearance is measured along the
    /// heading; otherwise it is the straight distance to any endpoint in the
    /// forward half-plane, capped by `default_max`.
    pub fn simple_maximum_move_distance(
        &self,
        center: DVec2,
        radius: f64,
        heading: f64,
        default_max: f64,
    ) -> f64 {
        if self.nearest_is_interior {
            let rel = self.nearest_point - center;
            let distance2 = rel.length_squared();
            let a = heading_vector(heading).dot(rel);
            if a > 0.0 {
                ((distance2 - distance2.sqrt() * radius) / a).max(0.0)
            } else {
                default_max
            }
        } else {
            [self.left, self.right]
                .iter()
                .filter(|p| p.angle > -90.0 && p.angle < 90.0)
                .map(|p| (center.distance(p.point) - radius).max(0.0))
                .fold(default_max, f64::min)
        }
    }
}

/// Everything the AI needs to choose a wandering move
#[derive(Debug, Clone, PartialEq)]
pub struct MovementEstimate {
    pub distance_forward: f64,
    pub has_gap_ahead: bool,
    /// Width of the opening straight ahead (0 when blocked)
    pub gap_ahead_width: f64,
    /// Boundary of the forward opening on the left (`None` when blocked)
    pub gap_ahead_left_angle: Option<f64>,
    /// Boundary of the forward opening on the right (`None` when blocked)
    pub gap_ahead_right_angle: Option<f64>,
    /// Angle of the nearest walkable gap on the left, in [-90, 0]
    pub angle_to_left_gap: f64,
    /// Angle of the nearest walkable gap on the right, in [0, 90]
    pub angle_to_right_gap: f64,
    pub surroundings: Vec<VisibleWallSegment>,
}

/// Re-intersect `wall` along the ray at `bound` degrees from the heading
fn clip_to_bound(
    position: DVec2,
    heading_vec: DVec2,
    bound: f64,
    wall: &Wall,
) -> Option<SightPoint> {
    let ray_end = position + rotate_vector(heading_vec, bound.to_radians());
    let hit = line_intersection(position, ray_end, wall.start, wall.end)?;
    let point = match hit {
        LineIntersection::Point(p) => p,
        LineIntersection::Coincident(pts) => pts[0],
    };
    Some(SightPoint {
        angle: normalize_angle(bound),
        distance: position.distance(point),
        point,
    })
}

fn visible_segment_in_window(
    lower: SightPoint,
    upper: SightPoint,
    window: (f64, f64),
    nearest: NearestPoint,
    position: DVec2,
    heading_vec: DVec2,
    wall: &Wall,
) -> VisibleWallSegment {
    let (lower_bound, upper_bound) = window;

    let lower = if lower.angle < lower_bound {
        clip_to_bound(position, heading_vec, lower_bound, wall).unwrap_or(lower)
    } else {
        SightPoint {
            angle: normalize_angle(lower.angle),
            ..lower
        }
    };
    let upper = if upper_bound < upper.angle {
        clip_to_bound(position, heading_vec, upper_bound, wall).unwrap_or(upper)
    } else {
        SightPoint {
            angle: normalize_angle(upper.angle),
            ..upper
        }
    };

    VisibleWallSegment {
        left: lower,
        right: if lower.angle == upper.angle { lower } else { upper },
        nearest_point: nearest.point,
        nearest_is_interior: nearest.interior,
    }
}

/// Reduce a wall's boundary crossings (sorted by angle) to its visible span
/// in the forward half-plane, or `None` when it lies entirely behind.
pub fn identify_visible_point_extremes(
    points: &[SightPoint],
    nearest: NearestPoint,
    position: DVec2,
    heading_vec: DVec2,
    wall: &Wall,
) -> Option<VisibleWallSegment> {
    match *points {
        [mut left, mut right] => {
            if right.angle - left.angle > 180.0 {
                // Span wraps behind the fighter; unwrap it past +180
                let wrapped = SightPoint {
                    angle: left.angle + 360.0,
                    ..left
                };
                left = right;
                right = wrapped;
            }

            let window = if left.angle.max(-90.0) <= right.angle.min(90.0) {
                (-90.0, 90.0)
            } else if left.angle.max(270.0) <= right.angle.min(360.0) {
                (270.0, 360.0)
            } else {
                return None;
            };
            Some(visible_segment_in_window(
                left,
                right,
                window,
                nearest,
                position,
                heading_vec,
                wall,
            ))
        }
        [only] if (-90.0..=90.0).contains(&only.angle) => Some(VisibleWallSegment {
            left: only,
            right: only,
            nearest_point: nearest.point,
            nearest_is_interior: nearest.interior,
        }),
        _ => None,
    }
}

/// Angle of the nearest gap at least `target_width` wide, scanning right
/// from straight ahead. Returns 90 when no such gap exists in front.
fn angle_to_gap_on_right(target_width: f64, surroundings: &[VisibleWallSegment]) -> f64 {
    let mut angle = 0.0;
    let mut point: Option<DVec2> = None;
    for vws in surroundings.iter().filter(|v| v.right.angle >= 0.0) {
        if point.is_none() || vws.right.angle < angle {
            angle = vws.right.angle;
            point = Some(vws.right.point);
        }
    }

    while angle < 90.0 {
        // Extend across every span covering the current boundary
        loop {
            let mut extended: Option<SightPoint> = None;
            for vws in surroundings
                .iter()
                .filter(|v| v.contains_angle(angle) && v.right.angle > angle)
            {
                if extended.is_none_or(|e| vws.right.angle > e.angle) {
                    extended = Some(vws.right);
                }
            }
            match extended {
                Some(e) => {
                    angle = e.angle;
                    point = Some(e.point);
                }
                None => break,
            }
        }

        if angle >= 90.0 {
            return 90.0;
        }

        let mut next: Option<&VisibleWallSegment> = None;
        for vws in surroundings.iter().filter(|v| v.left.angle > angle) {
            if next.is_none_or(|n| vws.left.angle < n.left.angle) {
                next = Some(vws);
            }
        }

        let Some(next) = next else {
            return angle;
        };
        let gap = point.map_or(f64::INFINITY, |p| p.distance(next.left.point));
        if gap > target_width {
            return angle;
        }
        angle = next.right.angle;
        point = Some(next.right.point);
    }

    angle.min(90.0)
}

/// Mirror of [`angle_to_gap_on_right`], scanning left. Returns -90 when no
/// gap exists in front.
fn angle_to_gap_on_left(target_width: f64, surroundings: &[VisibleWallSegment]) -> f64 {
    let mut angle = 0.0;
    let mut point: Option<DVec2> = None;
    for vws in surroundings.iter().filter(|v| v.left.angle <= 0.0) {
        if point.is_none() || vws.left.angle > angle {
            angle = vws.left.angle;
            point = Some(vws.left.point);
        }
    }

    while angle > -90.0 {
        loop {
            let mut extended: Option<SightPoint> = None;
            for vws in surroundings
                .iter()
                .filter(|v| v.contains_angle(angle) && v.left.angle < angle)
            {
                if extended.is_none_or(|e| vws.left.angle < e.angle) {
                    extended = Some(vws.left);
                }
            }
            match extended {
                Some(e) => {
                    angle = e.angle;
                    point = Some(e.point);
                }
                None => break,
            }
        }

        if angle <= -90.0 {
            return -90.0;
        }

        let mut next: Option<&VisibleWallSegment> = None;
        for vws in surroundings.iter().filter(|v| v.right.angle < angle) {
            if next.is_none_or(|n| vws.right.angle > n.right.angle) {
                next = Some(vws);
            }
        }

        let Some(next) = next else {
            return angle;
        };
        let gap = point.map_or(f64::INFINITY, |p| p.distance(next.right.point));
        if gap > target_width {
            return angle;
        }
        angle = next.left.angle;
        point = Some(next.left.point);
    }

    angle.max(-90.0)
}

/// Survey the walls around `position` out to `lookout` and summarise where
/// the fighter can go.
pub fn movement_estimates(
    position: DVec2,
    radius: f64,
    heading: f64,
    walls: &[Wall],
    lookout: f64,
) -> MovementEstimate {
    let heading_vec = heading_vector(heading);

    let mut surroundings = Vec::new();
    for wall in walls {
        let nearest = nearest_point_and_distance(wall.start, wall.end, position);
        if nearest.distance >= lookout {
            continue;
        }
        let (a, b) = segment_circle_extreme_points(wall.start, wall.end, position, lookout);
        let mut points: Vec<SightPoint> = [a, b]
            .into_iter()
            .flatten()
            .map(|p| {
                let (angle, distance) = angle_and_distance_to_point(position, heading, p);
                SightPoint {
                    angle,
                    distance,
                    point: p,
                }
            })
            .collect();
        points.sort_by(|p, q| {
            p.angle
                .total_cmp(&q.angle)
                .then(p.distance.total_cmp(&q.distance))
        });
        if let Some(vws) =
            identify_visible_point_extremes(&points, nearest, position, heading_vec, wall)
        {
            surroundings.push(vws);
        }
    }

    let distance_forward = surroundings
        .iter()
        .map(|v| v.simple_maximum_move_distance(position, radius, heading, lookout))
        .fold(lookout, f64::min);

    let has_gap_ahead = !surroundings.iter().any(|v| v.contains_angle(0.0));

    let mut gap_ahead_width = 0.0;
    let mut gap_ahead_left_angle = None;
    let mut gap_ahead_right_angle = None;
    if has_gap_ahead {
        let right_vec = DVec2::new(-heading_vec.y, heading_vec.x);
        let mut left_edge = (-90.0, position - lookout * right_vec);
        let mut right_edge = (90.0, position + lookout * right_vec);
        let mut left_found = false;
        let mut right_found = false;
        for vws in &surroundings {
            let r = vws.right;
            if r.angle < 0.0 && (!left_found || r.angle > left_edge.0) {
                left_edge = (r.angle, r.point);
                left_found = true;
            }
            let l = vws.left;
            if l.angle > 0.0 && (!right_found || l.angle < right_edge.0) {
                right_edge = (l.angle, l.point);
                right_found = true;
            }
        }
        gap_ahead_left_angle = Some(left_edge.0);
        gap_ahead_right_angle = Some(right_edge.0);
        gap_ahead_width = left_edge.1.distance(right_edge.1);
    }

    let target_gap_width = 3.0 * radius;
    let angle_to_left_gap = angle_to_gap_on_left(target_gap_width, &surroundings);
    let angle_to_right_gap = angle_to_gap_on_right(target_gap_width, &surroundings);

    MovementEstimate {
        distance_forward,
        has_gap_ahead,
        gap_ahead_width,
        gap_ahead_left_angle,
        gap_ahead_right_angle,
        angle_to_left_gap,
        angle_to_right_gap,
        surroundings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_floor_is_clear() {
        let est = movement_estimates(DVec2::new(300.0, 300.0), 10.0, 30.0, &[], 60.0);
        assert!(est.has_gap_ahead);
        assert_eq!(est.distance_forward, 60.0);
        assert!((est.gap_ahead_width - 120.0).abs() < 1e-9);
        assert_eq!(est.gap_ahead_left_angle, Some(-90.0));
        assert_eq!(est.gap_ahead_right_angle, Some(90.0));
        assert_eq!(est.angle_to_left_gap, 0.0);
        assert_eq!(est.angle_to_right_gap, 0.0);
    }

    #[test]
    fn test_corridor_gap_matches_width() {
        // Facing up a 40 wide corridor whose walls run well past the lookout
        let walls = [
            Wall::from_coords(80, 0, 80, 400, 1.0),
            Wall::from_coords(120, 0, 120, 400, 1.0),
        ];
        let est = movement_estimates(DVec2::new(100.0, 200.0), 10.0, 0.0, &walls, 60.0);
        assert_eq!(est.surroundings.len(), 2);
        assert!(est.has_gap_ahead);
        assert!((est.gap_ahead_width - 40.0).abs() < 1e-6);
        assert_eq!(est.distance_forward, 60.0);
        assert!(est.gap_ahead_left_angle.unwrap() < 0.0);
        assert!(est.gap_ahead_right_angle.unwrap() > 0.0);
        // Nothing wide enough opens sideways
        assert_eq!(est.angle_to_left_gap, -90.0);
        assert_eq!(est.angle_to_right_gap, 90.0);
    }

    #[test]
    fn test_wall_ahead_blocks_and_limits_distance() {
        let walls = [Wall::from_coords(0, 60, 200, 60, 1.0)];
        let est = movement_estimates(DVec2::new(100.0, 100.0), 10.0, 0.0, &walls, 60.0);
        assert!(!est.has_gap_ahead);
        assert_eq!(est.gap_ahead_width, 0.0);
        assert!(est.gap_ahead_left_angle.is_none());
        // Wall 40 ahead, body radius 10
        assert!((est.distance_forward - 30.0).abs() < 1e-9);
        let span = est.surroundings[0];
        assert!((span.left.angle + span.right.angle).abs() < 1e-9);
        assert!(span.contains_angle(0.0));
    }

    #[test]
    fn test_wall_behind_is_ignored() {
        let walls = [Wall::from_coords(0, 140, 200, 140, 1.0)];
        let est = movement_estimates(DVec2::new(100.0, 100.0), 10.0, 0.0, &walls, 60.0);
        assert!(est.surroundings.is_empty());
        assert!(est.has_gap_ahead);
    }

    #[test]
    fn test_endpoint_clearance() {
        // A wall end pokes in from the right, ahead of the fighter
        let walls = [Wall::from_coords(110, 70, 300, 70, 1.0)];
        let est = movement_estimates(DVec2::new(100.0, 100.0), 10.0, 0.0, &walls, 60.0);
        assert_eq!(est.surroundings.len(), 1);
        let span = est.surroundings[0];
        assert!(!span.nearest_is_interior);
        let expected = DVec2::new(110.0, 70.0).distance(DVec2::new(100.0, 100.0)) - 10.0;
        assert!((est.distance_forward - expected).abs() < 1e-9);
        assert!(est.has_gap_ahead);
    }

    #[test]
    fn test_right_gap_scan_steps_over_narrow_openings() {
        let p = |angle: f64, x: f64, y: f64| SightPoint {
            angle,
            distance: 0.0,
            point: DVec2::new(x, y),
        };
        let span = |l: SightPoint, r: SightPoint| VisibleWallSegment {
            left: l,
            right: r,
            nearest_point: l.point,
            nearest_is_interior: false,
        };
        // Two spans separated by a 5 unit opening, then a wide opening
        let surroundings = [
            span(p(-10.0, 0.0, 0.0), p(20.0, 10.0, 0.0)),
            span(p(25.0, 15.0, 0.0), p(40.0, 20.0, 0.0)),
            span(p(70.0, 80.0, 0.0), p(80.0, 90.0, 0.0)),
        ];
        assert_eq!(angle_to_gap_on_right(30.0, &surroundings), 40.0);
        assert_eq!(angle_to_gap_on_right(100.0, &surroundings), 80.0);
        assert_eq!(angle_to_gap_on_left(30.0, &surroundings), -10.0);
    }
}

//! Geometry kernel
//!
//! Segment/segment and segment/circle queries used by walls, sensors,
//! bullets and the navigation estimator. Everything here is pure; degenerate
//! inputs (parallel or zero-length segments, missed circles) yield `None` or
//! partial results instead of panicking.

use glam::DVec2;

/// Lines whose x extent is below this are treated as vertical
const VERTICAL_EPS: f64 = 1e-9;
/// Relative tolerance when comparing gradients / intercepts
const PARALLEL_EPS: f64 = 1e-12;
/// Slack on segment parameters so endpoints touching a line still count
const PARAM_EPS: f64 = 1e-9;
/// Relative tolerance on the circle discriminant for tangency
const TANGENT_EPS: f64 = 1e-12;

/// Result of intersecting two infinite lines
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LineIntersection {
    /// Lines cross at a single point
    Point(DVec2),
    /// Lines coincide; carries both segments' endpoints so callers can pick
    /// whichever lies on both segments
    Coincident([DVec2; 4]),
}

impl LineIntersection {
    /// Candidate points in the order callers should test them
    pub fn candidates(&self) -> &[DVec2] {
        match self {
            LineIntersection::Point(p) => std::slice::from_ref(p),
            LineIntersection::Coincident(pts) => pts,
        }
    }
}

/// Gradient of the line through `p1` and `p2`, `None` when vertical
fn gradient(p1: DVec2, p2: DVec2) -> Option<f64> {
    let dx = p2.x - p1.x;
    if dx.abs() < VERTICAL_EPS {
        None
    } else {
        Some((p2.y - p1.y) / dx)
    }
}

#[inline]
fn y_intercept(p: DVec2, m: f64) -> f64 {
    p.y - m * p.x
}

#[inline]
fn nearly_equal(a: f64, b: f64) -> bool {
    (a - b).abs() <= PARALLEL_EPS * (1.0 + a.abs().max(b.abs()))
}

/// Intersect the infinite lines through `p1,p2` and `p3,p4`.
///
/// Uses gradient / y-intercept algebra with explicit branches for vertical
/// lines. Parallel distinct lines return `None`; coincident lines return all
/// four endpoints.
pub fn line_intersection(p1: DVec2, p2: DVec2, p3: DVec2, p4: DVec2) -> Option<LineIntersection> {
    let m1 = gradient(p1, p2);
    let m2 = gradient(p3, p4);

    match (m1, m2) {
        (Some(m1), Some(m2)) if !nearly_equal(m1, m2) => {
            let b1 = y_intercept(p1, m1);
            let b2 = y_intercept(p3, m2);
            let x = (b2 - b1) / (m1 - m2);
            Some(LineIntersection::Point(DVec2::new(x, m1 * x + b1)))
        }
        (None, Some(m2)) => {
            let x = p1.x;
            Some(LineIntersection::Point(DVec2::new(x, m2 * x + y_intercept(p3, m2))))
        }
        (Some(m1), None) => {
            let x = p3.x;
            Some(LineIntersection::Point(DVec2::new(x, m1 * x + y_intercept(p1, m1))))
        }
        (Some(m1), Some(m2)) => {
            if nearly_equal(y_intercept(p1, m1), y_intercept(p3, m2)) {
                Some(LineIntersection::Coincident([p1, p2, p3, p4]))
            } else {
                None
            }
        }
        (None, None) => {
            // Two vertical lines only overlap when they share an x
            if (p1.x - p3.x).abs() < VERTICAL_EPS {
                Some(LineIntersection::Coincident([p1, p2, p3, p4]))
            } else {
                None
            }
        }
    }
}

/// Affine coordinate `l` such that `pt = start + l * (end - start)`.
///
/// Measured along the segment's larger axis extent; a zero-length segment
/// yields 0.
pub fn parameter_of_point_on_segment(start: DVec2, end: DVec2, pt: DVec2) -> f64 {
    let d = end - start;
    if d.x == 0.0 && d.y == 0.0 {
        0.0
    } else if d.x.abs() >= d.y.abs() {
        (pt.x - start.x) / d.x
    } else {
        (pt.y - start.y) / d.y
    }
}

#[inline]
fn within_unit(l: f64) -> bool {
    (-PARAM_EPS..=1.0 + PARAM_EPS).contains(&l)
}

/// Intersection point of segments `p1-p2` and `p3-p4`, if they meet.
pub fn segment_intersection(p1: DVec2, p2: DVec2, p3: DVec2, p4: DVec2) -> Option<DVec2> {
    let hit = line_intersection(p1, p2, p3, p4)?;
    hit.candidates().iter().copied().find(|&pt| {
        within_unit(parameter_of_point_on_segment(p1, p2, pt))
            && within_unit(parameter_of_point_on_segment(p3, p4, pt))
    })
}

/// Closest point on a segment to a query point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearestPoint {
    pub point: DVec2,
    pub distance: f64,
    /// True when the projection fell strictly on the segment rather than
    /// being clamped to an endpoint
    pub interior: bool,
}

/// Project `point` onto the segment `start-end`, clamped to its endpoints.
pub fn nearest_point_and_distance(start: DVec2, end: DVec2, point: DVec2) -> NearestPoint {
    let d = end - start;
    let len2 = d.length_squared();
    if len2 == 0.0 {
        return NearestPoint {
            point: start,
            distance: point.distance(start),
            interior: false,
        };
    }

    let a = (point - start).dot(d) / len2;
    let (nearest, interior) = if a < 0.0 {
        (start, false)
    } else if a > 1.0 {
        (end, false)
    } else {
        (start + a * d, true)
    };

    NearestPoint {
        point: nearest,
        distance: point.distance(nearest),
        interior,
    }
}

/// Extreme points of the part of a segment lying inside a closed disc.
///
/// Solves `|start + l (end - start) - center|^2 = r^2` and clamps the two
/// roots to `[0, 1]`. The segment is expected to meet the disc; callers check
/// the nearest distance first. A tangent line yields a single point, a line
/// missing the circle yields `(None, None)`, and a zero-length segment yields
/// `(start, None)`.
pub fn segment_circle_extreme_points(
    start: DVec2,
    end: DVec2,
    center: DVec2,
    radius: f64,
) -> (Option<DVec2>, Option<DVec2>) {
    if start == end {
        return (Some(start), None);
    }

    let d = end - start;
    let f = start - center;
    let a = d.length_squared();
    let b = 2.0 * d.dot(f);
    let c = f.length_squared() - radius * radius;
    let disc = b * b - 4.0 * a * c;
    let scale = (b * b).max((4.0 * a * c).abs()).max(f64::MIN_POSITIVE);

    if disc.abs() <= TANGENT_EPS * scale {
        let l = -b / (2.0 * a);
        (Some(start + l * d), None)
    } else if disc > 0.0 {
        let root = disc.sqrt();
        let lmin = ((-b - root) / (2.0 * a)).max(0.0);
        let lmax = ((-b + root) / (2.0 * a)).min(1.0);
        (Some(start + lmin * d), Some(start + lmax * d))
    } else {
        (None, None)
    }
}

/// Rotate a direction vector clockwise on screen by `angle` radians.
///
/// With headings measured clockwise from "up", rotating `heading_vector(h)`
/// by `a` gives `heading_vector(h + a)`.
#[inline]
pub fn rotate_vector(v: DVec2, angle: f64) -> DVec2 {
    DVec2::from_angle(angle).rotate(v)
}

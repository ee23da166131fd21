//! Property-based invariants of the geometry kernel, angle helpers and
//! bullet damage.
//!
//! 1. Crossing segments meet at a point lying on both of them.
//! 2. Segments on opposite sides of a line never meet.
//! 3. A segment leaving a circle reports a point on the circle.
//! 4. Angle normalization lands in (-180, 180] and is idempotent.
//! 5. A bullet never deals more than its damage budget.

use glam::DVec2;
use proptest::prelude::*;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use zombie_arena::normalize_angle;
use zombie_arena::sim::Bullet;
use zombie_arena::sim::fighter::{Fighter, FighterId};
use zombie_arena::sim::geometry::{
    parameter_of_point_on_segment, segment_circle_extreme_points, segment_intersection,
};

fn point_strategy(lo: f64, hi: f64) -> impl Strategy<Value = DVec2> {
    (lo..hi, lo..hi).prop_map(|(x, y)| DVec2::new(x, y))
}

fn unit(degrees: f64) -> DVec2 {
    let r = degrees.to_radians();
    DVec2::new(r.cos(), r.sin())
}

/// Line direction in [0, 180) degrees, away from vertical
fn is_steep(degrees: f64) -> bool {
    (degrees.rem_euclid(180.0) - 90.0).abs() < 1.0
}

proptest! {
    #[test]
    fn crossing_segments_meet_on_both(
        center in point_strategy(-1000.0, 1000.0),
        theta in 0.0f64..180.0,
        delta in 10.0f64..170.0,
        (a1, a2, b1, b2) in (1.0f64..500.0, 1.0f64..500.0, 1.0f64..500.0, 1.0f64..500.0),
    ) {
        let phi = theta + delta;
        prop_assume!(!is_steep(theta) && !is_steep(phi));
        let (u, v) = (unit(theta), unit(phi));
        let (p1, p2) = (center - a1 * u, center + a2 * u);
        let (p3, p4) = (center - b1 * v, center + b2 * v);

        let hit = segment_intersection(p1, p2, p3, p4);
        prop_assert!(hit.is_some());
        let hit = hit.unwrap();
        for (s, e) in [(p1, p2), (p3, p4)] {
            let l = parameter_of_point_on_segment(s, e, hit);
            prop_assert!((-1e-6..=1.0 + 1e-6).contains(&l), "parameter {l}");
        }
        prop_assert!(hit.distance(center) < 1e-6 * (1.0 + center.length()));
    }

    #[test]
    fn separated_segments_never_meet(
        p1 in point_strategy(-1000.0, -1.0),
        p2 in point_strategy(-1000.0, -1.0),
        p3 in point_strategy(1.0, 1000.0),
        p4 in point_strategy(1.0, 1000.0),
    ) {
        // All of p1-p2 lies below y = 0 and all of p3-p4 above it
        let flip = |p: DVec2| DVec2::new(-p.x, p.y);
        prop_assert_eq!(segment_intersection(p1, p2, p3, p4), None);
        prop_assert_eq!(segment_intersection(flip(p1), p2, p3, flip(p4)), None);
    }

    #[test]
    fn leaving_segment_touches_circle(
        center in point_strategy(-500.0, 500.0),
        radius in 5.0f64..200.0,
        (s, t) in (0.0f64..0.95, 1.05f64..5.0),
        (alpha, beta) in (0.0f64..360.0, 0.0f64..360.0),
    ) {
        let start = center + radius * s * unit(alpha);
        let end = center + radius * t * unit(beta);
        let (first, second) = segment_circle_extreme_points(start, end, center, radius);
        let on_circle = [first, second]
            .into_iter()
            .flatten()
            .any(|p| (p.distance(center) - radius).abs() < 1e-6 * radius);
        prop_assert!(on_circle);
    }

    #[test]
    fn normalized_angles_are_stable(angle in -1.0e6f64..1.0e6) {
        let once = normalize_angle(angle);
        prop_assert!(once > -180.0 && once <= 180.0, "{angle} -> {once}");
        prop_assert_eq!(normalize_angle(once), once);
    }

    #[test]
    fn bullet_damage_stays_within_budget(
        seed in any::<u64>(),
        budget in 1i32..400,
        (lo, spread) in (1i32..150, 0i32..150),
        targets in proptest::collection::vec((0.0f64..600.0, -15.0f64..15.0, 1i32..=100), 0..12),
    ) {
        let mut rng = Pcg32::seed_from_u64(seed);
        let mut fighters: Vec<Fighter> = targets
            .iter()
            .enumerate()
            .map(|(i, &(y, x, life))| {
                Fighter::zombie(FighterId(i as u32 + 1), DVec2::new(300.0 + x, y), 10.0, 0.0, life)
            })
            .collect();
        let mut bullet = Bullet::new(
            DVec2::new(300.0, 600.0),
            DVec2::new(0.0, -1.0),
            (lo, lo + spread),
            budget,
            1200.0,
            FighterId(0),
        );

        let mut dealt = 0;
        for _ in 0..40 {
            dealt += bullet.advance(0.02, &[], &mut fighters, &mut rng, (600.0, 700.0));
        }
        prop_assert!(dealt <= budget);
        prop_assert!(bullet.remaining_damage >= 0);
        prop_assert_eq!(budget - bullet.remaining_damage, dealt);
    }
}

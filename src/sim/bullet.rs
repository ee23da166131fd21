//! Projectiles
//!
//! A bullet travels in a straight line for at most `BULLET_TIME_IN_AIR`
//! seconds. Everything it passes through takes damage out of one shared
//! budget, closest along the path first.

use glam::DVec2;
use log::debug;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::fighter::{Fighter, FighterId};
use super::geometry::{nearest_point_and_distance, parameter_of_point_on_segment};
use super::resource::{Decoration, DecorationKind};
use super::wall::{Wall, first_wall_hit};
use crate::consts::{BULLET_TIME_IN_AIR, CENTER_HIT_DAMAGE};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bullet {
    pub location: DVec2,
    /// Unit vector
    pub direction: DVec2,
    pub damage_range: (i32, i32),
    /// Damage left to hand out; only ever decreases
    pub remaining_damage: i32,
    pub speed: f64,
    pub time_remaining: f64,
    pub active: bool,
    /// Credited with hits and kills
    pub firer: FighterId,
    first_hit_occurred: bool,
}

/// One fighter the current step passes through
struct PathHit {
    index: usize,
    distance: f64,
    along: f64,
}

impl Bullet {
    pub fn new(
        location: DVec2,
        direction: DVec2,
        damage_range: (i32, i32),
        max_total_damage: i32,
        speed: f64,
        firer: FighterId,
    ) -> Self {
        Self {
            location,
            direction,
            damage_range,
            remaining_damage: max_total_damage,
            speed,
            time_remaining: BULLET_TIME_IN_AIR,
            active: true,
            firer,
            first_hit_occurred: false,
        }
    }

    /// Where this step would end without walls
    fn step_end(&self, dt: f64) -> DVec2 {
        self.location + dt * self.speed * self.direction
    }

    /// Marker for the stretch covered by the next step
    pub fn trail(&self, dt: f64) -> Decoration {
        Decoration {
            kind: DecorationKind::BulletTrail {
                start: self.location,
                end: self.step_end(dt),
            },
            life: 1.5 * dt,
        }
    }

    /// Advance one step, damaging everything on the path.
    ///
    /// Returns the total damage dealt during this step.
    pub fn advance<R: Rng + ?Sized>(
        &mut self,
        dt: f64,
        walls: &[Wall],
        fighters: &mut [Fighter],
        rng: &mut R,
        size: (f64, f64),
    ) -> i32 {
        if !self.active {
            return 0;
        }

        let start = self.location;
        let mut end = self.step_end(dt);
        let hits_wall = match first_wall_hit(walls, start, end) {
            Some((point, _)) => {
                end = point;
                true
            }
            None => false,
        };

        let mut hits: Vec<PathHit> = fighters
            .iter()
            .enumerate()
            .filter(|(_, f)| f.is_alive() && f.id != self.firer)
            .filter_map(|(index, f)| {
                let nearest = nearest_point_and_distance(start, end, f.pos);
                (nearest.distance < f.radius).then(|| PathHit {
                    index,
                    distance: nearest.distance,
                    along: parameter_of_point_on_segment(start, end, nearest.point),
                })
            })
            .collect();
        // Stable, so equal parameters keep arena order
        hits.sort_by(|a, b| a.along.total_cmp(&b.along));

        let firer_index = fighters.iter().position(|f| f.id == self.firer);
        let mut dealt = 0;
        for hit in hits {
            let target = &mut fighters[hit.index];
            let rolled = if hit.distance < target.radius / 2.0 {
                CENTER_HIT_DAMAGE
            } else {
                let (lo, hi) = self.damage_range;
                rng.random_range(lo..=hi)
            };
            let damage = rolled.min(self.remaining_damage);
            target.take_damage(damage);
            self.remaining_damage -= damage;
            dealt += damage;

            let is_zombie = target.is_zombie();
            let killed = !target.is_alive();
            let target_id = target.id;

            if let Some(fi) = firer_index {
                let stats = &mut fighters[fi].stats;
                if is_zombie && !self.first_hit_occurred {
                    self.first_hit_occurred = true;
                    stats.attack_hits += 1;
                }
                if killed {
                    if is_zombie {
                        stats.kills += 1;
                    } else {
                        stats.fratricide += 1;
                        debug!("fratricide: {} shot {}", self.firer, target_id);
                    }
                } else if !is_zombie {
                    stats.friendly_fire += 1;
                    debug!("friendly fire: {} hit {}", self.firer, target_id);
                }
            }

            if self.remaining_damage <= 0 {
                break;
            }
        }

        self.location = end;
        self.time_remaining -= dt;
        let (w, h) = size;
        let out_of_bounds = end.x < 0.0 || end.x >= w || end.y < 0.0 || end.y >= h;
        if hits_wall || self.time_remaining <= 0.0 || self.remaining_damage <= 0 || out_of_bounds {
            self.active = false;
        }
        dealt
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::weapon::{Weapon, WeaponKind};
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    const SIZE: (f64, f64) = (1000.0, 1000.0);

    fn shooter() -> Fighter {
        Fighter::scripted(
            FighterId(1),
            "shooter",
            DVec2::new(500.0, 900.0),
            10.0,
            Weapon::new(WeaponKind::Rifle, false),
        )
    }

    fn rifle_bullet(from: DVec2) -> Bullet {
        Bullet::new(from, DVec2::new(0.0, -1.0), (80, 200), 300, 35_000.0, FighterId(1))
    }

    #[test]
    fn test_center_hit_is_flat_damage() {
        let zombie = Fighter::zombie(FighterId(2), DVec2::new(500.0, 700.0), 10.0, 0.0, 100);
        let mut fighters = vec![shooter(), zombie];
        let mut bullet = rifle_bullet(DVec2::new(500.0, 889.9));
        let mut rng = Pcg32::seed_from_u64(5);

        let dealt = bullet.advance(0.02, &[], &mut fighters, &mut rng, SIZE);
        assert_eq!(dealt, 100);
        assert_eq!(bullet.remaining_damage, 200);
        assert_eq!(fighters[1].life, 0);
        assert_eq!(fighters[0].stats.kills, 1);
        assert_eq!(fighters[0].stats.attack_hits, 1);
    }

    #[test]
    fn test_wall_stops_bullet() {
        let zombie = Fighter::zombie(FighterId(2), DVec2::new(500.0, 500.0), 10.0, 0.0, 100);
        let mut fighters = vec![shooter(), zombie];
        let walls = [Wall::from_coords(400, 600, 600, 600, 1.0)];
        let mut bullet = rifle_bullet(DVec2::new(500.0, 889.9));
        let mut rng = Pcg32::seed_from_u64(5);

        bullet.advance(0.02, &walls, &mut fighters, &mut rng, SIZE);
        assert!(!bullet.active);
        assert_eq!(bullet.location, DVec2::new(500.0, 600.0));
        assert_eq!(fighters[1].life, 100);
    }

    #[test]
    fn test_budget_limits_penetration() {
        let mut fighters = vec![shooter()];
        for (i, y) in [800.0, 700.0, 600.0, 500.0].into_iter().enumerate() {
            fighters.push(Fighter::zombie(FighterId(10 + i as u32), DVec2::new(500.0, y), 10.0, 0.0, 100));
        }
        let mut bullet = rifle_bullet(DVec2::new(500.0, 889.9));
        let mut rng = Pcg32::seed_from_u64(5);

        let dealt = bullet.advance(0.02, &[], &mut fighters, &mut rng, SIZE);
        assert_eq!(dealt, 300);
        assert!(!bullet.active);
        // Three center hits use the whole budget; the farthest zombie is untouched
        assert_eq!(fighters[4].life, 100);
        assert_eq!(fighters[0].stats.kills, 3);
        // Only the first zombie hit counts towards accuracy
        assert_eq!(fighters[0].stats.attack_hits, 1);
    }

    #[test]
    fn test_friendly_fire_is_counted() {
        let ally = Fighter::scripted(
            FighterId(3),
            "ally",
            DVec2::new(505.0, 800.0),
            10.0,
            Weapon::new(WeaponKind::Knife, false),
        );
        let mut fighters = vec![shooter(), ally];
        let mut bullet = Bullet::new(DVec2::new(500.0, 889.9), DVec2::new(0.0, -1.0), (30, 70), 100, 12_500.0, FighterId(1));
        let mut rng = Pcg32::seed_from_u64(9);

        bullet.advance(0.02, &[], &mut fighters, &mut rng, SIZE);
        assert!(fighters[1].life >= 30 && fighters[1].life <= 70);
        assert_eq!(fighters[0].stats.friendly_fire, 1);
        assert_eq!(fighters[0].stats.attack_hits, 0);
    }

    #[test]
    fn test_expires_after_flight_time() {
        let mut fighters = vec![shooter()];
        let mut bullet = Bullet::new(DVec2::new(10.0, 10.0), DVec2::new(1.0, 0.0), (30, 70), 100, 1.0, FighterId(1));
        let mut rng = Pcg32::seed_from_u64(1);
        let mut steps = 0;
        while bullet.active {
            bullet.advance(0.125, &[], &mut fighters, &mut rng, SIZE);
            steps += 1;
        }
        assert_eq!(steps, 4);
    }
}

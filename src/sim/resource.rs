//! Pickups, checkpoints and decorations

use std::collections::BTreeSet;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::fighter::{Fighter, FighterId};
use crate::consts::MAX_HEALING_CAPACITY;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResourceKind {
    Medical,
    Ammo,
}

/// A consumable lying on the map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub kind: ResourceKind,
    pub pos: DVec2,
    pub radius: f64,
    /// Remaining supply; medical counts healing points, ammo counts magazines
    pub life: f64,
}

impl Resource {
    pub fn is_used_up(&self) -> bool {
        self.life <= 0.0
    }

    /// Grid key used to keep at most one resource per spot
    pub fn key(&self) -> (i64, i64) {
        (self.pos.x.round() as i64, self.pos.y.round() as i64)
    }

    /// Transfer as much as the fighter can take. Returns the amount moved
    /// (healing points or rounds).
    pub fn use_by(&mut self, fighter: &mut Fighter) -> f64 {
        if self.life <= 0.0 {
            return 0.0;
        }
        match self.kind {
            ResourceKind::Medical => {
                let room = MAX_HEALING_CAPACITY - fighter.healing_capacity;
                if room <= 0 {
                    return 0.0;
                }
                let amount = self.life.min(f64::from(room)).ceil();
                self.life -= amount;
                fighter.healing_capacity += amount as i32;
                amount
            }
            ResourceKind::Ammo => {
                let (Some(rate), Some(ammo), Some(max_ammo)) = (
                    fighter.weapon.ammo_consumption_rate(),
                    fighter.weapon.ammo(),
                    fighter.weapon.max_ammo(),
                ) else {
                    return 0.0;
                };
                if ammo >= max_ammo {
                    return 0.0;
                }
                // Round up so a resource is always fully drained eventually
                let available = (self.life / rate).ceil() as u32;
                let loaded = fighter.weapon.load_rounds(available);
                self.life -= f64::from(loaded) * rate;
                f64::from(loaded)
            }
        }
    }
}

/// A waypoint agents check in to once each
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub pos: DVec2,
    pub radius: f64,
    pub checked_in: BTreeSet<FighterId>,
    pub disabled: bool,
}

impl Checkpoint {
    pub fn new(pos: DVec2, radius: f64) -> Self {
        Self {
            pos,
            radius,
            checked_in: BTreeSet::new(),
            disabled: false,
        }
    }

    /// Record a first visit; returns false for repeat visits
    pub fn check_in(&mut self, fighter: &mut Fighter) -> bool {
        if self.disabled || !self.checked_in.insert(fighter.id) {
            return false;
        }
        fighter.stats.checkpoints_reached += 1;
        true
    }

    pub fn all_checked_in<'a>(&self, mut agents: impl Iterator<Item = &'a Fighter>) -> bool {
        agents.all(|a| self.checked_in.contains(&a.id))
    }
}

/// Short-lived visual leftovers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DecorationKind {
    DeadBody { pos: DVec2, radius: f64 },
    BulletTrail { start: DVec2, end: DVec2 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Decoration {
    pub kind: DecorationKind,
    /// Seconds left on screen
    pub life: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::weapon::{Weapon, WeaponKind};

    fn fighter(kind: WeaponKind) -> Fighter {
        Fighter::scripted(FighterId(1), "t", DVec2::ZERO, 10.0, Weapon::new(kind, false))
    }

    #[test]
    fn test_medical_fills_capacity() {
        let mut f = fighter(WeaponKind::Knife);
        f.healing_capacity = 70;
        let mut med = Resource {
            kind: ResourceKind::Medical,
            pos: DVec2::ZERO,
            radius: 10.0,
            life: 100.0,
        };
        assert_eq!(med.use_by(&mut f), 30.0);
        assert_eq!(f.healing_capacity, 100);
        assert_eq!(med.life, 70.0);
        assert_eq!(med.use_by(&mut f), 0.0);
    }

    #[test]
    fn test_ammo_refill_and_drain() {
        let mut f = fighter(WeaponKind::Gun);
        for _ in 0..30 {
            f.weapon.take_round();
        }
        let mut ammo_box = Resource {
            kind: ResourceKind::Ammo,
            pos: DVec2::ZERO,
            radius: 10.0,
            life: 2.0,
        };
        assert_eq!(ammo_box.use_by(&mut f), 30.0);
        assert_eq!(f.weapon.ammo(), Some(150));
        assert!((ammo_box.life - 1.8).abs() < 1e-9);

        // Melee weapons ignore ammo
        let mut axe = fighter(WeaponKind::Axe);
        assert_eq!(ammo_box.use_by(&mut axe), 0.0);
    }

    #[test]
    fn test_checkpoint_once_per_agent() {
        let mut f = fighter(WeaponKind::Knife);
        let mut cp = Checkpoint::new(DVec2::ZERO, 10.0);
        assert!(cp.check_in(&mut f));
        assert!(!cp.check_in(&mut f));
        assert_eq!(f.stats.checkpoints_reached, 1);
        assert!(cp.all_checked_in(std::iter::once(&f)));
    }
}

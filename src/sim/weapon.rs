//! Weapons
//!
//! Every fighter owns exactly one weapon. Melee weapons strike the nearest
//! fighter in an arc; firearms spawn bullets that share a damage budget.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::BULLET_TIME_IN_AIR;
use crate::error::ConfigError;

/// Concrete weapon models
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeaponKind {
    ZombieClaws,
    Knife,
    Axe,
    Gun,
    Rifle,
    Shotgun,
}

impl WeaponKind {
    /// Weapons a player may be issued (claws are zombie-only)
    pub const ARSENAL: [WeaponKind; 5] = [
        WeaponKind::Knife,
        WeaponKind::Axe,
        WeaponKind::Gun,
        WeaponKind::Rifle,
        WeaponKind::Shotgun,
    ];

    /// Identifier exposed in the perception vector (divided by 64 there)
    pub fn weapon_id(self) -> u32 {
        match self {
            WeaponKind::ZombieClaws => 1,
            WeaponKind::Knife => 16,
            WeaponKind::Axe => 17,
            WeaponKind::Gun => 32,
            WeaponKind::Rifle => 33,
            WeaponKind::Shotgun => 34,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            WeaponKind::ZombieClaws => "claws",
            WeaponKind::Knife => "knife",
            WeaponKind::Axe => "axe",
            WeaponKind::Gun => "gun",
            WeaponKind::Rifle => "rifle",
            WeaponKind::Shotgun => "shotgun",
        }
    }

    /// Inclusive damage roll bounds
    pub fn damage_range(self) -> (i32, i32) {
        match self {
            WeaponKind::ZombieClaws => (1, 2),
            WeaponKind::Knife => (40, 70),
            WeaponKind::Axe => (75, 100),
            WeaponKind::Gun => (30, 70),
            WeaponKind::Rifle => (80, 200),
            WeaponKind::Shotgun => (60, 120),
        }
    }

    pub fn is_firearm(self) -> bool {
        matches!(self, WeaponKind::Gun | WeaponKind::Rifle | WeaponKind::Shotgun)
    }
}

impl fmt::Display for WeaponKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A weapon name from configuration, `random` resolved at build time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeaponChoice {
    Fixed(WeaponKind),
    Random,
}

impl WeaponChoice {
    pub fn resolve<R: Rng + ?Sized>(self, rng: &mut R) -> WeaponKind {
        match self {
            WeaponChoice::Fixed(kind) => kind,
            WeaponChoice::Random => {
                WeaponKind::ARSENAL[rng.random_range(0..WeaponKind::ARSENAL.len())]
            }
        }
    }
}

impl FromStr for WeaponChoice {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "random" => Ok(WeaponChoice::Random),
            name => WeaponKind::ARSENAL
                .iter()
                .find(|k| k.as_str() == name)
                .map(|&k| WeaponChoice::Fixed(k))
                .ok_or_else(|| ConfigError::UnknownWeapon(s.to_string())),
        }
    }
}

/// Melee or firearm specifics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WeaponClass {
    Melee {
        /// Half-width of the strike arc (degrees)
        max_angle: f64,
    },
    Firearm {
        /// Damage budget shared by everything one bullet penetrates
        max_total_damage: i32,
        bullet_velocity: f64,
        max_ammo: u32,
        ammo: u32,
    },
}

/// A weapon instance owned by one fighter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weapon {
    pub kind: WeaponKind,
    pub damage_range: (i32, i32),
    pub max_range: f64,
    pub class: WeaponClass,
    /// Refuse to attack when an ally would be hurt
    pub friendly_fire_guard: bool,
}

impl Weapon {
    pub fn new(kind: WeaponKind, friendly_fire_guard: bool) -> Self {
        let melee = |max_range: f64, max_angle: f64| (max_range, WeaponClass::Melee { max_angle });
        let firearm = |max_total_damage: i32, bullet_velocity: f64, max_ammo: u32| {
            (
                BULLET_TIME_IN_AIR * bullet_velocity,
                WeaponClass::Firearm {
                    max_total_damage,
                    bullet_velocity,
                    max_ammo,
                    ammo: max_ammo,
                },
            )
        };

        let (max_range, class) = match kind {
            WeaponKind::ZombieClaws => melee(30.0, 45.0),
            WeaponKind::Knife => melee(30.0, 30.0),
            WeaponKind::Axe => melee(40.0, 45.0),
            WeaponKind::Gun => firearm(100, 12_500.0, 150),
            WeaponKind::Rifle => firearm(300, 35_000.0, 270),
            WeaponKind::Shotgun => firearm(150, 18_250.0, 90),
        };

        Self {
            kind,
            damage_range: kind.damage_range(),
            max_range,
            class,
            friendly_fire_guard,
        }
    }

    pub fn is_firearm(&self) -> bool {
        matches!(self.class, WeaponClass::Firearm { .. })
    }

    pub fn weapon_id(&self) -> u32 {
        self.kind.weapon_id()
    }

    /// Uniform roll over the inclusive damage range
    pub fn roll_damage<R: Rng + ?Sized>(&self, rng: &mut R) -> i32 {
        let (lo, hi) = self.damage_range;
        rng.random_range(lo..=hi)
    }

    pub fn ammo(&self) -> Option<u32> {
        match self.class {
            WeaponClass::Firearm { ammo, .. } => Some(ammo),
            WeaponClass::Melee { .. } => None,
        }
    }

    pub fn max_ammo(&self) -> Option<u32> {
        match self.class {
            WeaponClass::Firearm { max_ammo, .. } => Some(max_ammo),
            WeaponClass::Melee { .. } => None,
        }
    }

    /// Loaded fraction for firearms, 0 for melee
    pub fn ammo_fraction(&self) -> f64 {
        match self.class {
            WeaponClass::Firearm { ammo, max_ammo, .. } if max_ammo > 0 => {
                f64::from(ammo) / f64::from(max_ammo)
            }
            _ => 0.0,
        }
    }

    /// Resource life consumed per round picked up
    pub fn ammo_consumption_rate(&self) -> Option<f64> {
        match self.class {
            WeaponClass::Firearm { max_ammo, .. } if max_ammo > 0 => {
                Some(1.0 / f64::from(max_ammo))
            }
            _ => None,
        }
    }

    /// Spend one round; false when empty or melee
    pub fn take_round(&mut self) -> bool {
        match &mut self.class {
            WeaponClass::Firearm { ammo, .. } if *ammo > 0 => {
                *ammo -= 1;
                true
            }
            _ => false,
        }
    }

    /// Add rounds, capped at capacity. Returns how many were loaded.
    pub fn load_rounds(&mut self, rounds: u32) -> u32 {
        match &mut self.class {
            WeaponClass::Firearm { ammo, max_ammo, .. } => {
                let loaded = rounds.min(*max_ammo - *ammo);
                *ammo += loaded;
                loaded
            }
            WeaponClass::Melee { .. } => 0,
        }
    }

    /// Pellet offsets (degrees from heading) fired per shot
    pub fn bullet_angles(&self) -> &'static [f64] {
        match self.kind {
            WeaponKind::Shotgun => &[-1.0, 0.0, 1.0],
            _ => &[0.0],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_weapon_table() {
        let rifle = Weapon::new(WeaponKind::Rifle, false);
        assert_eq!(rifle.weapon_id(), 33);
        assert_eq!(rifle.max_range, 17_500.0);
        assert_eq!(rifle.ammo(), Some(270));
        assert_eq!(rifle.bullet_angles(), &[0.0]);

        let shotgun = Weapon::new(WeaponKind::Shotgun, false);
        assert_eq!(shotgun.bullet_angles().len(), 3);

        let axe = Weapon::new(WeaponKind::Axe, false);
        assert_eq!(axe.max_range, 40.0);
        assert!(!axe.is_firearm());
        assert_eq!(axe.ammo_fraction(), 0.0);
        assert_eq!(axe.ammo_consumption_rate(), None);
    }

    #[test]
    fn test_parse_weapon_choice() {
        assert_eq!(
            "Rifle".parse::<WeaponChoice>().unwrap(),
            WeaponChoice::Fixed(WeaponKind::Rifle)
        );
        assert_eq!("random".parse::<WeaponChoice>().unwrap(), WeaponChoice::Random);
        assert!(matches!(
            "bazooka".parse::<WeaponChoice>(),
            Err(ConfigError::UnknownWeapon(_))
        ));
        // Claws are not issued to players
        assert!("claws".parse::<WeaponChoice>().is_err());
    }

    #[test]
    fn test_random_choice_stays_in_arsenal() {
        let mut rng = Pcg32::seed_from_u64(7);
        for _ in 0..50 {
            let kind = WeaponChoice::Random.resolve(&mut rng);
            assert!(WeaponKind::ARSENAL.contains(&kind));
        }
    }

    #[test]
    fn test_ammo_bookkeeping() {
        let mut gun = Weapon::new(WeaponKind::Gun, false);
        assert!(gun.take_round());
        assert_eq!(gun.ammo(), Some(149));
        assert_eq!(gun.load_rounds(10), 1);
        assert_eq!(gun.ammo(), Some(150));

        if let WeaponClass::Firearm { ammo, .. } = &mut gun.class {
            *ammo = 0;
        }
        assert!(!gun.take_round());
        assert_eq!(gun.load_rounds(500), 150);
        assert_eq!(gun.ammo_fraction(), 1.0);
    }

    #[test]
    fn test_damage_roll_inclusive() {
        let knife = Weapon::new(WeaponKind::Knife, false);
        let mut rng = Pcg32::seed_from_u64(1);
        for _ in 0..200 {
            let d = knife.roll_damage(&mut rng);
            assert!((40..=70).contains(&d));
        }
    }
}

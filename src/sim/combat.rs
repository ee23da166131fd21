//! Combat resolution: melee strikes, firing, healing others
//!
//! Everything here works on fighter indices into `World::fighters`, so an
//! attacker and its target can be mutated one after the other without
//! aliasing.

use glam::DVec2;
use log::debug;

use super::bullet::Bullet;
use super::fighter::Fighter;
use super::geometry::{nearest_point_and_distance, rotate_vector};
use super::state::World;
use super::wall::first_wall_hit;
use super::weapon::WeaponClass;
use crate::consts::{BULLET_TIME_IN_AIR, FRIENDLY_FIRE_BUFFER};
use crate::{angle_and_distance_to_point, rectified_angle};

/// Half-angle of the heal-ally cone (degrees)
pub const HEAL_ANGLE: f64 = 30.0;
/// Heal reach in fighter radii
pub const HEAL_REACH: f64 = 4.0;

/// Nearest living fighter (other than `from`) within `reach` whose angular
/// footprint overlaps `[-half_angle, half_angle]`. On equal distances the
/// first in arena order wins.
fn nearest_in_cone(
    fighters: &[Fighter],
    from: usize,
    reach: f64,
    half_angle: f64,
    eligible: impl Fn(&Fighter) -> bool,
) -> Option<usize> {
    let me = &fighters[from];
    // Above the reach so the first candidate always registers
    let mut min_distance = 1.01 * reach;
    let mut found = None;
    for (i, other) in fighters.iter().enumerate() {
        if i == from || !other.is_alive() || !eligible(other) {
            continue;
        }
        let (angle, distance) = angle_and_distance_to_point(me.pos, me.heading, other.pos);
        if distance >= reach {
            continue;
        }
        if angle.abs() <= half_angle + rectified_angle(other.radius, distance) && distance < min_distance {
            min_distance = distance;
            found = Some(i);
        }
    }
    found
}

/// Target of a melee swing by the fighter at `attacker`
pub fn find_melee_target(fighters: &[Fighter], attacker: usize) -> Option<usize> {
    let weapon = &fighters[attacker].weapon;
    let WeaponClass::Melee { max_angle } = weapon.class else {
        return None;
    };
    nearest_in_cone(fighters, attacker, weapon.max_range, max_angle, |_| true)
}

/// Agent or scripted player the fighter at `healer` would heal
pub fn find_heal_target(fighters: &[Fighter], healer: usize) -> Option<usize> {
    let reach = HEAL_REACH * fighters[healer].radius;
    nearest_in_cone(fighters, healer, reach, HEAL_ANGLE, |f| !f.is_zombie())
}

/// Use whatever weapon the fighter holds
pub fn use_weapon(world: &mut World, idx: usize) {
    if world.fighters[idx].weapon.is_firearm() {
        fire(world, idx);
    } else {
        swing(world, idx);
    }
}

/// Melee attack on the nearest fighter in the weapon's arc
pub fn swing(world: &mut World, idx: usize) {
    let target = find_melee_target(&world.fighters, idx);
    // Zombies keep no accuracy record
    if !world.fighters[idx].is_zombie() {
        world.fighters[idx].stats.attack_count += 1;
    }
    if let Some(target) = target {
        strike(world, idx, target);
    }
}

/// Land a melee blow from `attacker` on `target` and update the attacker's
/// counters. Guarded weapons refuse to hit fighters on the same side.
pub fn strike(world: &mut World, attacker: usize, target: usize) {
    let hostile = world.fighters[attacker].is_zombie() != world.fighters[target].is_zombie();
    if !hostile && world.fighters[attacker].weapon.friendly_fire_guard {
        world.fighters[attacker].stats.friendly_fire_avoided += 1;
        debug!(
            "{} held back from striking {}",
            world.fighters[attacker].id, world.fighters[target].id
        );
        return;
    }

    let damage = world.fighters[attacker].weapon.roll_damage(&mut world.rng);
    world.fighters[target].take_damage(damage);
    let killed = !world.fighters[target].is_alive();
    let target_id = world.fighters[target].id;
    let attacker_id = world.fighters[attacker].id;

    let stats = &mut world.fighters[attacker].stats;
    if hostile {
        stats.attack_hits += 1;
        if killed {
            stats.kills += 1;
        }
    } else if killed {
        stats.fratricide += 1;
        debug!("fratricide: {attacker_id} killed {target_id}");
    } else {
        stats.friendly_fire += 1;
        debug!("friendly fire: {attacker_id} hit {target_id}");
    }
}

/// Whether a bullet leaving `muzzle` along `direction` would pass within the
/// safety buffer of a living ally of the shooter
fn endangers_ally(world: &World, shooter: usize, muzzle: DVec2, direction: DVec2, velocity: f64) -> bool {
    let mut end = muzzle + velocity * BULLET_TIME_IN_AIR * direction;
    if let Some((hit, _)) = first_wall_hit(&world.map.walls, muzzle, end) {
        end = hit;
    }
    world.fighters.iter().enumerate().any(|(i, f)| {
        i != shooter
            && f.is_alive()
            && !f.is_zombie()
            && nearest_point_and_distance(muzzle, end, f.pos).distance < FRIENDLY_FIRE_BUFFER * f.radius
    })
}

/// Fire one round (one bullet per pellet angle). Each bullet takes its
/// first step immediately.
pub fn fire(world: &mut World, idx: usize) {
    let shooter = &world.fighters[idx];
    let WeaponClass::Firearm {
        max_total_damage,
        bullet_velocity,
        ammo,
        ..
    } = shooter.weapon.class
    else {
        return;
    };
    if ammo == 0 {
        return;
    }

    let facing = shooter.facing();
    let muzzle = shooter.pos + 1.01 * shooter.radius * facing;
    let directions: Vec<DVec2> = shooter
        .weapon
        .bullet_angles()
        .iter()
        .map(|a| rotate_vector(facing, a.to_radians()))
        .collect();

    // One unsafe pellet cancels the whole shot
    if shooter.weapon.friendly_fire_guard
        && directions
            .iter()
            .any(|&d| endangers_ally(world, idx, muzzle, d, bullet_velocity))
    {
        world.fighters[idx].stats.friendly_fire_avoided += 1;
        debug!("{} held fire, ally in the line", world.fighters[idx].id);
        return;
    }

    let damage_range = shooter.weapon.damage_range;
    let firer = shooter.id;
    let shooter = &mut world.fighters[idx];
    shooter.weapon.take_round();
    shooter.stats.attack_count += 1;

    for direction in directions {
        let mut bullet = Bullet::new(muzzle, direction, damage_range, max_total_damage, bullet_velocity, firer);
        world.decorations.push(bullet.trail(world.dt));
        bullet.advance(world.dt, &world.map.walls, &mut world.fighters, &mut world.rng, world.size);
        world.bullets.push(bullet);
    }
}

/// Give one life point to the nearest ally in front
pub fn heal_ally(world: &mut World, idx: usize) {
    let Some(target) = find_heal_target(&world.fighters, idx) else {
        return;
    };
    let can_heal = {
        let t = &world.fighters[target];
        t.life < t.max_life && world.fighters[idx].healing_capacity > 0
    };
    if can_heal {
        world.fighters[target].life += 1;
        let healer = &mut world.fighters[idx];
        healer.healing_capacity -= 1;
        healer.stats.healing_of_others += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::fighter::FighterId;
    use crate::sim::map::MapDescriptor;
    use crate::sim::sensor::default_sensor_specs;
    use crate::sim::weapon::{Weapon, WeaponKind};

    fn world(seed: u64) -> World {
        World::new(MapDescriptor::open(600, 600), 0.02, seed)
    }

    fn agent(world: &mut World, pos: DVec2, kind: WeaponKind, guard: bool) -> usize {
        let id = world.next_entity_id();
        let f = Fighter::agent(
            id,
            "robot",
            pos,
            10.0,
            Weapon::new(kind, guard),
            &default_sensor_specs(250.0),
            &world.map.walls,
        );
        world.add_fighter(f)
    }

    fn zombie(world: &mut World, pos: DVec2, life: i32) -> FighterId {
        let id = world.next_entity_id();
        world.add_fighter(Fighter::zombie(id, pos, 10.0, 180.0, life));
        id
    }

    #[test]
    fn test_melee_picks_nearest_in_arc() {
        let mut w = world(1);
        let a = agent(&mut w, DVec2::new(300.0, 300.0), WeaponKind::Knife, false);
        let far = zombie(&mut w, DVec2::new(300.0, 275.0), 100);
        let near = zombie(&mut w, DVec2::new(305.0, 282.0), 100);
        // Behind the attacker, closer but outside the arc
        zombie(&mut w, DVec2::new(300.0, 315.0), 100);

        let target = find_melee_target(&w.fighters, a).unwrap();
        assert_eq!(w.fighters[target].id, near);
        assert_ne!(w.fighters[target].id, far);
    }

    #[test]
    fn test_knife_kill_is_deterministic() {
        let run = |seed| {
            let mut w = world(seed);
            let a = agent(&mut w, DVec2::new(300.0, 300.0), WeaponKind::Knife, false);
            zombie(&mut w, DVec2::new(300.0, 280.0), 50);
            swing(&mut w, a);
            (w.fighters[1].life, w.fighters[a].stats)
        };

        for seed in 0..20 {
            let (life, stats) = run(seed);
            assert_eq!((life, stats), run(seed));
            assert_eq!(stats.attack_count, 1);
            assert_eq!(stats.attack_hits, 1);
            // Knife damage is 40..=70 against 50 life
            assert_eq!(stats.kills, u32::from(life == 0));
            assert!((0..=10).contains(&life));
        }
    }

    #[test]
    fn test_zombie_swing_keeps_no_attack_count() {
        let mut w = world(9);
        // The zombie faces down, towards the agent
        let a = agent(&mut w, DVec2::new(300.0, 320.0), WeaponKind::Knife, false);
        zombie(&mut w, DVec2::new(300.0, 300.0), 100);
        let z = w.fighters.len() - 1;
        swing(&mut w, z);
        assert!(w.fighters[a].life < 100);
        assert_eq!(w.fighters[z].stats.attack_count, 0);
        assert_eq!(w.fighters[z].stats.attack_hits, 1);
    }

    #[test]
    fn test_guarded_melee_spares_ally() {
        let mut w = world(3);
        let a = agent(&mut w, DVec2::new(300.0, 300.0), WeaponKind::Axe, true);
        let b = agent(&mut w, DVec2::new(300.0, 280.0), WeaponKind::Knife, false);
        swing(&mut w, a);
        assert_eq!(w.fighters[b].life, 100);
        assert_eq!(w.fighters[a].stats.friendly_fire_avoided, 1);
        assert_eq!(w.fighters[a].stats.attack_count, 1);
    }

    #[test]
    fn test_unguarded_melee_counts_friendly_fire() {
        let mut w = world(3);
        let a = agent(&mut w, DVec2::new(300.0, 300.0), WeaponKind::Knife, false);
        let b = agent(&mut w, DVec2::new(300.0, 280.0), WeaponKind::Knife, false);
        swing(&mut w, a);
        assert!(w.fighters[b].life <= 60);
        assert_eq!(w.fighters[a].stats.friendly_fire, 1);
    }

    #[test]
    fn test_guarded_shotgun_holds_fire() {
        let mut w = world(5);
        let a = agent(&mut w, DVec2::new(300.0, 500.0), WeaponKind::Shotgun, true);
        let b = agent(&mut w, DVec2::new(300.0, 200.0), WeaponKind::Knife, false);
        zombie(&mut w, DVec2::new(300.0, 100.0), 100);

        fire(&mut w, a);
        assert_eq!(w.fighters[b].life, 100);
        assert_eq!(w.fighters[a].stats.friendly_fire_avoided, 1);
        assert_eq!(w.fighters[a].stats.attack_count, 0);
        assert_eq!(w.fighters[a].weapon.ammo(), Some(90));
        assert!(w.bullets.is_empty());
    }

    #[test]
    fn test_rifle_center_hit() {
        let mut w = world(7);
        let a = agent(&mut w, DVec2::new(300.0, 500.0), WeaponKind::Rifle, false);
        zombie(&mut w, DVec2::new(300.0, 400.0), 100);

        fire(&mut w, a);
        assert_eq!(w.fighters[a].weapon.ammo(), Some(269));
        assert_eq!(w.fighters[a].stats.attack_count, 1);
        assert_eq!(w.fighters[a].stats.kills, 1);
        assert_eq!(w.fighters[1].life, 0);
        assert_eq!(w.bullets.len(), 1);
        assert_eq!(w.bullets[0].remaining_damage, 200);
        // Outer wall stops the bullet on its first step
        assert!(!w.bullets[0].active);
        assert_eq!(w.decorations.len(), 1);
    }

    #[test]
    fn test_empty_firearm_is_noop() {
        let mut w = world(7);
        let a = agent(&mut w, DVec2::new(300.0, 500.0), WeaponKind::Gun, false);
        if let WeaponClass::Firearm { ammo, .. } = &mut w.fighters[a].weapon.class {
            *ammo = 0;
        }
        fire(&mut w, a);
        assert_eq!(w.fighters[a].stats.attack_count, 0);
        assert!(w.bullets.is_empty());
    }

    #[test]
    fn test_heal_ally() {
        let mut w = world(1);
        let a = agent(&mut w, DVec2::new(300.0, 300.0), WeaponKind::Knife, false);
        let b = agent(&mut w, DVec2::new(300.0, 270.0), WeaponKind::Knife, false);
        w.fighters[b].life = 40;

        heal_ally(&mut w, a);
        assert_eq!(w.fighters[b].life, 41);
        assert_eq!(w.fighters[a].healing_capacity, 99);
        assert_eq!(w.fighters[a].stats.healing_of_others, 1);

        // Zombies are never healed
        let mut w = world(1);
        let a = agent(&mut w, DVec2::new(300.0, 300.0), WeaponKind::Knife, false);
        zombie(&mut w, DVec2::new(300.0, 270.0), 50);
        heal_ally(&mut w, a);
        assert_eq!(w.fighters[1].life, 50);
        assert_eq!(w.fighters[a].healing_capacity, 100);
    }
}

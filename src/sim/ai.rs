//! Built-in behaviour for zombies and scripted players
//!
//! Each turn is decided from scratch: look for a target, turn towards it,
//! close in, attack. With nothing in sight the fighter wanders, steered by
//! the navigation estimator.

use rand::Rng;
use rand::distr::Distribution;
use rand::distr::weighted::WeightedIndex;

use super::action::{Action, Direction};
use super::combat;
use super::fighter::{Fighter, FighterKind};
use super::navigation::movement_estimates;
use super::state::World;
use super::wall::{Wall, collides_with_walls};
use crate::{angle_and_distance_to_point, rectified_angle};

/// Sight and turning parameters for one kind of AI fighter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AiProfile {
    pub vision_distance: f64,
    /// Half-angle of the field of view (degrees)
    pub peripheral_angle: f64,
    /// Degrees turned per rotate decision; also the aim tolerance
    pub rotation_step: f64,
    /// Widen the field of view by the target's angular radius
    pub rectify: bool,
}

impl AiProfile {
    pub const ZOMBIE: AiProfile = AiProfile {
        vision_distance: 60.0,
        peripheral_angle: 45.0,
        rotation_step: 15.0,
        rectify: false,
    };

    pub const TERMINATOR: AiProfile = AiProfile {
        vision_distance: 80.0,
        peripheral_angle: 75.0,
        rotation_step: 5.0,
        rectify: true,
    };

    /// Profile driving fighters of `kind`; agents have none
    pub fn for_kind(kind: FighterKind) -> Option<AiProfile> {
        match kind {
            FighterKind::Agent => None,
            FighterKind::ScriptedPlayer => Some(Self::TERMINATOR),
            FighterKind::Zombie => Some(Self::ZOMBIE),
        }
    }

    fn in_view(&self, angle: f64, target_radius: f64, distance: f64) -> bool {
        if self.rectify {
            angle.abs() <= self.peripheral_angle + rectified_angle(target_radius, distance)
        } else {
            angle.abs() < self.peripheral_angle
        }
    }
}

/// A fighter seen by `seek_target`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sighting {
    pub index: usize,
    pub angle: f64,
    pub distance: f64,
}

/// What an AI fighter does this turn
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AiDecision {
    Rotate(f64),
    Forward,
    Backward,
    /// Zombies record who they are clawing; scripted players just fire
    Attack(Option<usize>),
}

/// Nearest visible enemy of the fighter at `idx`. Zombies hunt agents and
/// players, scripted players hunt zombies.
pub fn seek_target(fighters: &[Fighter], idx: usize, walls: &[Wall], profile: &AiProfile) -> Option<Sighting> {
    let me = &fighters[idx];
    let mut min_distance = 2.0 * profile.vision_distance;
    let mut found = None;
    for (i, other) in fighters.iter().enumerate() {
        if i == idx || !other.is_alive() || other.is_zombie() == me.is_zombie() {
            continue;
        }
        let (angle, distance) = angle_and_distance_to_point(me.pos, me.heading, other.pos);
        if distance >= profile.vision_distance + other.radius {
            continue;
        }
        if !profile.in_view(angle, other.radius, distance) {
            continue;
        }
        if collides_with_walls(walls, me.pos, other.pos) {
            continue;
        }
        if distance < min_distance {
            min_distance = distance;
            found = Some(Sighting {
                index: i,
                angle,
                distance,
            });
        }
    }
    found
}

/// Pick a weighted option, falling back to standing still when every
/// weight is zero
fn weighted_choice<R: Rng + ?Sized>(rng: &mut R, options: &[(AiDecision, f64)]) -> AiDecision {
    match WeightedIndex::new(options.iter().map(|(_, w)| *w)) {
        Ok(dist) => options[dist.sample(rng)].0,
        Err(_) => AiDecision::Rotate(0.0),
    }
}

/// Decide the turn of the fighter at `idx`
pub fn decide(world: &mut World, idx: usize, profile: &AiProfile) -> AiDecision {
    let step = profile.rotation_step;
    let me = &world.fighters[idx];

    if let Some(target) = seek_target(&world.fighters, idx, &world.map.walls, profile) {
        return if target.angle < -step {
            AiDecision::Rotate(-step)
        } else if target.angle > step {
            AiDecision::Rotate(step)
        } else if target.distance > me.weapon.max_range {
            AiDecision::Forward
        } else {
            AiDecision::Attack(me.is_zombie().then_some(target.index))
        };
    }

    let r = me.radius;
    let est = movement_estimates(me.pos, r, me.heading, &world.map.walls, profile.vision_distance);
    if est.has_gap_ahead && est.gap_ahead_width >= 3.0 * r {
        let forward = ((est.distance_forward / r).floor() - 2.0).clamp(0.0, 5.0);
        let left = est.gap_ahead_left_angle.is_some_and(|a| a < -step);
        let right = est.gap_ahead_right_angle.is_some_and(|a| a > step);
        weighted_choice(
            &mut world.rng,
            &[
                (AiDecision::Forward, forward),
                (AiDecision::Backward, 1.0),
                (AiDecision::Rotate(-step), if left { 1.0 } else { 0.0 }),
                (AiDecision::Rotate(0.0), 1.0),
                (AiDecision::Rotate(step), if right { 1.0 } else { 0.0 }),
            ],
        )
    } else {
        // Each side is weighted by the other side's gap angle, so the
        // nearer opening is more likely
        weighted_choice(
            &mut world.rng,
            &[
                (AiDecision::Rotate(-step), est.angle_to_right_gap.abs()),
                (AiDecision::Rotate(step), est.angle_to_left_gap.abs()),
            ],
        )
    }
}

/// Decide and carry out one AI turn
pub fn take_turn(world: &mut World, idx: usize) {
    let Some(fighter) = world.fighters.get(idx) else {
        return;
    };
    if !fighter.is_alive() {
        return;
    }
    let Some(profile) = AiProfile::for_kind(fighter.kind) else {
        return;
    };

    match decide(world, idx, &profile) {
        AiDecision::Rotate(delta) => world.execute_action(idx, Action::Rotate(delta)),
        AiDecision::Forward => world.execute_action(idx, Action::Move(Direction::Forward)),
        AiDecision::Backward => world.execute_action(idx, Action::Move(Direction::Backward)),
        // Only zombies pick their own melee target; they keep no attempt count
        AiDecision::Attack(Some(target)) => combat::strike(world, idx, target),
        AiDecision::Attack(None) => world.execute_action(idx, Action::UseWeapon),
    }
}

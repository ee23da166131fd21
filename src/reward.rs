//! Reward shaping for agents
//!
//! The reward of a step is the change of a weighted score computed from the
//! agent's state and cumulative counters.

use serde::{Deserialize, Serialize};

use crate::sim::fighter::Fighter;

/// Attempts before accuracy starts to count
const ACCURACY_WARMUP: f64 = 10.0;
/// Attempts over which the accuracy weight ramps up to 1
const ACCURACY_RAMP: f64 = 40.0;

/// Reward coefficients
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardConfig {
    pub life_coef: f64,
    pub healing_capacity_coef: f64,
    pub zombies_killed_coef: f64,
    pub fratricide_coef: f64,
    pub friendly_fire_coef: f64,
    pub accuracy_coef: f64,
    pub ammo_coef: f64,
    pub healing_of_others_coef: f64,
    pub friendly_fire_avoided_coef: f64,
    /// Only meaningful for safehouse games
    pub at_objective_coef: f64,
    pub checkpoints_coef: f64,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            life_coef: 1.0,
            healing_capacity_coef: 0.5,
            zombies_killed_coef: 5.0,
            fratricide_coef: 100.0,
            friendly_fire_coef: 10.0,
            accuracy_coef: 0.1,
            ammo_coef: 100.0,
            healing_of_others_coef: 1.0,
            friendly_fire_avoided_coef: 0.25,
            at_objective_coef: 10.0,
            checkpoints_coef: 10.0,
        }
    }
}

impl RewardConfig {
    /// Weighted score of `agent`; `at_objective` is whether it stands in one
    pub fn total(&self, agent: &Fighter, at_objective: bool) -> f64 {
        let stats = &agent.stats;
        let ramp = ((f64::from(stats.attack_count) - ACCURACY_WARMUP) / ACCURACY_RAMP).clamp(0.0, 1.0);
        let objective = if at_objective { 1.0 } else { 0.0 };

        self.life_coef * f64::from(agent.life)
            + self.healing_capacity_coef * f64::from(agent.healing_capacity)
            + self.zombies_killed_coef * f64::from(stats.kills)
            - self.fratricide_coef * f64::from(stats.fratricide)
            - self.friendly_fire_coef * f64::from(stats.friendly_fire)
            - self.friendly_fire_avoided_coef * f64::from(stats.friendly_fire_avoided)
            + self.accuracy_coef * ramp * stats.accuracy()
            + self.ammo_coef * agent.weapon.ammo_fraction()
            + self.healing_of_others_coef * f64::from(stats.healing_of_others)
            + self.at_objective_coef * objective
            + self.checkpoints_coef * f64::from(stats.checkpoints_reached)
    }
}

/// Running score of one agent
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentReward {
    config: RewardConfig,
    total: f64,
}

impl AgentReward {
    pub fn new(config: RewardConfig, agent: &Fighter, at_objective: bool) -> Self {
        Self {
            config,
            total: config.total(agent, at_objective),
        }
    }

    /// Recompute the score and return how much it changed
    pub fn update(&mut self, agent: &Fighter, at_objective: bool) -> f64 {
        let previous = self.total;
        self.total = self.config.total(agent, at_objective);
        self.total - previous
    }

    pub fn total(&self) -> f64 {
        self.total
    }
}

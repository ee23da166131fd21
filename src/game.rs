//! Episode driver
//!
//! A `Game` wraps a `World` with everything an episode needs on top of the
//! simulation: map selection, spawning on reset, reward shaping, zombie
//! top-up and the end-of-episode decision.

use log::{info, warn};
use rand::Rng;
use rand::SeedableRng;
use rand::distr::Distribution;
use rand::distr::weighted::WeightedIndex;
use rand_pcg::Pcg32;

use crate::consts::{FEATURES_PER_SENSOR, FIGHTER_RADIUS, FRONT_SENSOR_LENGTH};
use crate::error::{ConfigError, Error};
use crate::reward::{AgentReward, RewardConfig};
use crate::rules::{Rules, RulesKind};
use crate::settings::{GameConfig, MapBuilderConfig};
use crate::sim::action::AgentActions;
use crate::sim::fighter::FighterKind;
use crate::sim::map::{MapDescriptor, MapId};
use crate::sim::perception::sensor_feedback;
use crate::sim::sensor::default_sensor_specs;
use crate::sim::spawn::{AgentBuilder, PlayerBuilder, ZombieBuilder};
use crate::sim::state::World;
use crate::sim::tick::{TickInput, tick};
use crate::sim::weapon::WeaponChoice;

/// Granted to every surviving agent when the rules declare a win
pub const WIN_BONUS: f64 = 100.0;

/// Where the current episode stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EpisodePhase {
    /// Built but never reset
    Uninitialized,
    Running,
    Won,
    Lost,
    /// Stopped by the time limit
    Truncated,
}

/// Result of one `Game::step`
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome {
    /// Reward of each agent for this step, in agent order
    pub rewards: Vec<f64>,
    /// Sensor feedback of each agent, in agent order
    pub observations: Vec<Vec<f32>>,
    pub done: bool,
    pub truncated: bool,
}

/// Map source resolved from `MapBuilderConfig`
#[derive(Debug, Clone)]
enum MapSelector {
    Single {
        map: MapDescriptor,
        loaded: bool,
    },
    Random {
        choices: WeightedIndex<f64>,
        options: Vec<MapSelector>,
        last: Option<usize>,
    },
}

impl MapSelector {
    fn from_config(config: &MapBuilderConfig) -> Result<Self, ConfigError> {
        match config {
            MapBuilderConfig::SingleMap { map_id, w, h } => Ok(MapSelector::Single {
                map: map_id.parse::<MapId>()?.build(*w, *h),
                loaded: false,
            }),
            MapBuilderConfig::RandomMap(entries) => {
                if entries.iter().any(|e| !(e.weight > 0.0)) {
                    return Err(ConfigError::InvalidMapWeights("weights must be positive".into()));
                }
                let choices = WeightedIndex::new(entries.iter().map(|e| e.weight))
                    .map_err(|e| ConfigError::InvalidMapWeights(e.to_string()))?;
                let options = entries
                    .iter()
                    .map(|e| MapSelector::from_config(&e.map_builder))
                    .collect::<Result<_, _>>()?;
                Ok(MapSelector::Random {
                    choices,
                    options,
                    last: None,
                })
            }
        }
    }

    /// Pick the map for the next episode; the flag says it differs from the
    /// one picked last time
    fn select<R: Rng + ?Sized>(&mut self, rng: &mut R) -> (bool, &MapDescriptor) {
        match self {
            MapSelector::Single { map, loaded } => {
                let changed = !*loaded;
                *loaded = true;
                (changed, map)
            }
            MapSelector::Random {
                choices,
                options,
                last,
            } => {
                let idx = choices.sample(rng);
                let switched = *last != Some(idx);
                *last = Some(idx);
                let (changed, map) = options[idx].select(rng);
                (switched || changed, map)
            }
        }
    }
}

pub struct Game {
    world: World,
    config: GameConfig,
    maps: MapSelector,
    rules: Rules,
    reward_config: RewardConfig,
    agent_builder: AgentBuilder,
    agent_weapons: Vec<WeaponChoice>,
    player_builders: Vec<PlayerBuilder>,
    zombie_builder: ZombieBuilder,
    rewards: Vec<AgentReward>,
    phase: EpisodePhase,
    episode: u32,
}

impl Game {
    /// Validate `config` and pick the first map. Call `reset` before stepping.
    pub fn new(config: GameConfig) -> Result<Self, Error> {
        config.validate()?;
        let rules_kind = config.rules()?;
        let agent_weapons = config.agent_weapon_choices()?;

        let player_builders = config
            .players()?
            .into_iter()
            .flat_map(|spec| {
                std::iter::repeat_n(
                    PlayerBuilder {
                        radius: FIGHTER_RADIUS,
                        weapon: spec.weapon,
                        friendly_fire_guard: config.friendly_fire_guard,
                    },
                    spec.count,
                )
            })
            .collect();

        let mut reward_config = config.agent_reward;
        // Objectives only matter when the goal is reaching them
        if rules_kind != RulesKind::SafeHouse {
            reward_config.at_objective_coef = 0.0;
        }

        let seed = config.seed.unwrap_or_else(|| rand::rng().random());
        let mut rng = Pcg32::seed_from_u64(seed);
        let mut maps = MapSelector::from_config(&config.map_builder)?;
        let (_, map) = maps.select(&mut rng);
        let world = World::with_rng(map.clone(), config.dt(), seed, rng);
        info!(
            "Game created: seed {seed}, {} rules, {} agent(s)",
            rules_kind,
            config.agent_ids.len()
        );

        Ok(Self {
            world,
            maps,
            rules: Rules::new(rules_kind),
            reward_config,
            agent_builder: AgentBuilder {
                radius: FIGHTER_RADIUS,
                sensor_specs: default_sensor_specs(FRONT_SENSOR_LENGTH),
                friendly_fire_guard: config.friendly_fire_guard,
            },
            agent_weapons,
            player_builders,
            zombie_builder: ZombieBuilder {
                radius: FIGHTER_RADIUS,
            },
            rewards: Vec::new(),
            phase: EpisodePhase::Uninitialized,
            episode: 0,
            config,
        })
    }

    /// Start a new episode: choose the map, then spawn resources, agents,
    /// scripted players and the initial zombies
    pub fn reset(&mut self) -> Result<(), Error> {
        if self.episode > 0 {
            let (changed, map) = self.maps.select(&mut self.world.rng);
            if changed {
                self.world.load_map(map.clone());
            } else {
                self.world.reset();
            }
        } else {
            self.world.reset();
        }

        self.world.spawn_resources();
        for (label, weapon) in self.config.agent_ids.iter().zip(&self.agent_weapons) {
            self.agent_builder.spawn(&mut self.world, label, *weapon)?;
        }
        for builder in &self.player_builders {
            builder.spawn(&mut self.world)?;
        }
        for _ in 0..self.config.initial_zombies {
            self.zombie_builder.spawn(&mut self.world, true)?;
        }

        self.rules.start_episode(&self.world);
        let world = &self.world;
        self.rewards = world
            .agents()
            .iter()
            .map(|a| AgentReward::new(self.reward_config, a, world.is_at_objective(a.pos)))
            .collect();

        self.episode += 1;
        self.phase = EpisodePhase::Running;
        info!(
            "Episode {} started: {} fighters, {} resources",
            self.episode,
            self.world.fighters.len(),
            self.world.resources.len()
        );
        Ok(())
    }

    /// Advance one tick with one action id per agent
    pub fn step(&mut self, actions: &[usize]) -> StepOutcome {
        let observations = tick(&mut self.world, &TickInput::new(actions));

        let world = &self.world;
        let mut rewards: Vec<f64> = self
            .rewards
            .iter_mut()
            .zip(world.agents())
            .map(|(reward, agent)| reward.update(agent, world.is_at_objective(agent.pos)))
            .collect();

        self.top_up_zombies();

        let mut done = false;
        let mut truncated = false;
        if self.rules.game_ended(&self.world) {
            done = true;
            let (won, description) = self.rules.game_won(&self.world);
            if won {
                for (reward, agent) in rewards.iter_mut().zip(self.world.agents()) {
                    if agent.is_alive() {
                        *reward += WIN_BONUS;
                    }
                }
                self.phase = EpisodePhase::Won;
                info!("Episode {} won: {description}", self.episode);
            } else {
                self.phase = EpisodePhase::Lost;
                info!("Episode {} lost: {description}", self.episode);
            }
        } else if self.world.agents().iter().all(|a| !a.is_alive()) {
            done = true;
            self.phase = EpisodePhase::Lost;
            info!("Episode {} lost: all agents dead", self.episode);
        } else if self.world.time >= self.config.max_episode_seconds {
            truncated = true;
            self.phase = EpisodePhase::Truncated;
            info!(
                "Episode {} truncated after {} seconds",
                self.episode, self.config.max_episode_seconds
            );
        }

        StepOutcome {
            rewards,
            observations,
            done,
            truncated,
        }
    }

    /// Keep at least `minimum_zombies` alive, spawning outside initial-only regions
    fn top_up_zombies(&mut self) {
        let alive = self.world.living(FighterKind::Zombie).count();
        for _ in alive..self.config.minimum_zombies {
            if let Err(e) = self.zombie_builder.spawn(&mut self.world, false) {
                warn!("Zombie top-up stopped: {e}");
                break;
            }
        }
    }

    /// Current feedback of every agent without stepping
    pub fn observations(&self) -> Vec<Vec<f32>> {
        (0..self.world.agent_count())
            .map(|i| sensor_feedback(&self.world, i))
            .collect()
    }

    /// Length of each agent's feedback vector
    pub fn feedback_size(&self) -> usize {
        self.agent_builder.sensor_specs.len() * FEATURES_PER_SENSOR
    }

    /// Number of distinct agent action ids
    pub fn action_count(&self) -> usize {
        AgentActions::COUNT
    }

    /// Running reward totals, in agent order
    pub fn total_rewards(&self) -> Vec<f64> {
        self.rewards.iter().map(AgentReward::total).collect()
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    pub fn reward_config(&self) -> &RewardConfig {
        &self.reward_config
    }

    pub fn phase(&self) -> EpisodePhase {
        self.phase
    }

    /// Episodes started so far
    pub fn episode(&self) -> u32 {
        self.episode
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{AgentWeapons, WeightedMapBuilder};

    fn single(map_id: &str) -> MapBuilderConfig {
        MapBuilderConfig::SingleMap {
            map_id: map_id.to_string(),
            w: 640,
            h: 480,
        }
    }

    fn config() -> GameConfig {
        GameConfig {
            seed: Some(42),
            ..GameConfig::default()
        }
    }

    #[test]
    fn test_reset_spawns_everything() {
        let mut game = Game::new(GameConfig {
            agent_ids: vec!["robot0".into(), "robot1".into()],
            player_specs: "terminator:rifle:2".into(),
            initial_zombies: 5,
            ..config()
        })
        .unwrap();
        assert_eq!(game.phase(), EpisodePhase::Uninitialized);
        game.reset().unwrap();

        let w = game.world();
        assert_eq!(w.agent_count(), 2);
        assert_eq!(w.living(FighterKind::ScriptedPlayer).count(), 2);
        assert_eq!(w.living(FighterKind::Zombie).count(), 5);
        assert_eq!(game.rules().team_size, 4);
        assert_eq!(game.total_rewards().len(), 2);
        assert_eq!(game.phase(), EpisodePhase::Running);
        assert_eq!(game.observations()[0].len(), game.feedback_size());
    }

    #[test]
    fn test_step_shapes() {
        let mut game = Game::new(GameConfig {
            agent_ids: vec!["a".into(), "b".into()],
            initial_zombies: 3,
            ..config()
        })
        .unwrap();
        game.reset().unwrap();
        let out = game.step(&[0, 11]);
        assert_eq!(out.rewards.len(), 2);
        assert_eq!(out.observations.len(), 2);
        assert!(out.observations.iter().all(|o| o.len() == 39 * 8));
    }

    #[test]
    fn test_same_seed_same_episode() {
        let run = || {
            let mut game = Game::new(GameConfig {
                initial_zombies: 8,
                minimum_zombies: 4,
                player_specs: "terminator".into(),
                ..config()
            })
            .unwrap();
            game.reset().unwrap();
            let mut rewards = Vec::new();
            for t in 0..150 {
                let out = game.step(&[(t * 5) % game.action_count()]);
                rewards.extend(out.rewards);
                if out.done {
                    break;
                }
            }
            (rewards, game.world().events.clone())
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_minimum_zombies_maintained() {
        let mut game = Game::new(GameConfig {
            minimum_zombies: 4,
            ..config()
        })
        .unwrap();
        game.reset().unwrap();
        assert_eq!(game.world().living(FighterKind::Zombie).count(), 0);
        game.step(&[AgentActions::no_op_id()]);
        assert_eq!(game.world().living(FighterKind::Zombie).count(), 4);
    }

    #[test]
    fn test_all_agents_dead_ends_episode() {
        let mut game = Game::new(GameConfig {
            player_specs: "terminator:axe".into(),
            ..config()
        })
        .unwrap();
        game.reset().unwrap();
        game.world.fighters[0].life = 0;
        let out = game.step(&[AgentActions::no_op_id()]);
        assert!(out.done);
        assert!(!out.truncated);
        assert_eq!(game.phase(), EpisodePhase::Lost);
        // The dead agent keeps its slot
        assert_eq!(out.rewards.len(), 1);
    }

    #[test]
    fn test_truncated_at_time_limit() {
        let mut game = Game::new(GameConfig {
            max_episode_seconds: 0.05,
            ..config()
        })
        .unwrap();
        game.reset().unwrap();
        let mut steps = 0;
        loop {
            steps += 1;
            let out = game.step(&[AgentActions::no_op_id()]);
            assert!(!out.done);
            if out.truncated {
                break;
            }
            assert!(steps < 10);
        }
        assert!((2..=4).contains(&steps));
        assert_eq!(game.phase(), EpisodePhase::Truncated);
    }

    #[test]
    fn test_win_bonus_for_survivors() {
        let mut game = Game::new(GameConfig {
            map_builder: single("open_room"),
            rules_id: "extermination".into(),
            agent_weapons: AgentWeapons::One("knife".into()),
            ..config()
        })
        .unwrap();
        game.reset().unwrap();
        // No zombies at all: exterminated on the first tick
        let out = game.step(&[AgentActions::no_op_id()]);
        assert!(out.done);
        assert_eq!(game.phase(), EpisodePhase::Won);
        assert!((out.rewards[0] - WIN_BONUS).abs() < 1e-9);
    }

    #[test]
    fn test_objective_reward_only_in_safehouse() {
        let survival = Game::new(config()).unwrap();
        assert_eq!(survival.reward_config().at_objective_coef, 0.0);
        let safehouse = Game::new(GameConfig {
            rules_id: "safehouse".into(),
            ..config()
        })
        .unwrap();
        assert_eq!(safehouse.reward_config().at_objective_coef, 10.0);
    }

    #[test]
    fn test_random_map_builder_picks_listed_maps() {
        let mut game = Game::new(GameConfig {
            map_builder: MapBuilderConfig::RandomMap(vec![
                WeightedMapBuilder {
                    weight: 1.0,
                    map_builder: single("simple_hallway"),
                },
                WeightedMapBuilder {
                    weight: 1.0,
                    map_builder: MapBuilderConfig::SingleMap {
                        map_id: "open_room".into(),
                        w: 800,
                        h: 600,
                    },
                },
            ]),
            ..config()
        })
        .unwrap();
        let mut sizes = Vec::new();
        for _ in 0..20 {
            game.reset().unwrap();
            sizes.push(game.world().map.size);
            assert_eq!(game.world().agent_count(), 1);
        }
        assert!(sizes.iter().all(|s| *s == (640, 480) || *s == (800, 600)));
        assert!(sizes.contains(&(640, 480)));
        assert!(sizes.contains(&(800, 600)));
        assert_eq!(game.episode(), 20);
    }

    #[test]
    fn test_spawn_failure_surfaces_from_reset() {
        let mut game = Game::new(GameConfig {
            initial_zombies: 10_000,
            ..config()
        })
        .unwrap();
        assert!(matches!(game.reset(), Err(Error::Spawn(_))));
    }
}

//! Game configuration
//!
//! Loaded from JSON. Every field has a default so a partial document (or `{}`)
//! is a valid configuration. Identifiers stay as strings here, as they appear
//! in the file, and are resolved by `validate` and the accessors below.

use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_FPS, MAX_EPISODE_SECONDS};
use crate::error::ConfigError;
use crate::reward::RewardConfig;
use crate::rules::RulesKind;
use crate::sim::map::MapId;
use crate::sim::weapon::WeaponChoice;

/// How the map is chosen on every reset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "tag", content = "parameters")]
pub enum MapBuilderConfig {
    /// One fixed map, built once
    SingleMap { map_id: String, w: u32, h: u32 },
    /// A weighted draw among several builders on every reset
    RandomMap(Vec<WeightedMapBuilder>),
}

impl Default for MapBuilderConfig {
    fn default() -> Self {
        MapBuilderConfig::SingleMap {
            map_id: MapId::Demo.as_str().to_string(),
            w: 640,
            h: 480,
        }
    }
}

impl MapBuilderConfig {
    /// Check map ids and weights, recursively
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self {
            MapBuilderConfig::SingleMap { map_id, w, h } => {
                map_id.parse::<MapId>()?;
                let fits = |v: u32| v > 0 && i32::try_from(v).is_ok();
                if !fits(*w) || !fits(*h) {
                    return Err(ConfigError::Invalid(format!("map '{map_id}' has size {w}x{h}")));
                }
                Ok(())
            }
            MapBuilderConfig::RandomMap(entries) => {
                if entries.is_empty() {
                    return Err(ConfigError::InvalidMapWeights("no maps to choose from".into()));
                }
                for entry in entries {
                    if !(entry.weight > 0.0) {
                        return Err(ConfigError::InvalidMapWeights(format!(
                            "weight {} is not positive",
                            entry.weight
                        )));
                    }
                    entry.map_builder.validate()?;
                }
                Ok(())
            }
        }
    }
}

/// One option of a random map builder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedMapBuilder {
    pub weight: f64,
    pub map_builder: MapBuilderConfig,
}

/// A single weapon name for every agent, or a list cycled over the agents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AgentWeapons {
    One(String),
    Many(Vec<String>),
}

impl Default for AgentWeapons {
    fn default() -> Self {
        AgentWeapons::One("random".to_string())
    }
}

/// Scripted players requested by one `kind:weapon:count` entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerSpec {
    pub weapon: WeaponChoice,
    pub count: usize,
}

/// Parse `"terminator:rifle:2,terminator"` style player lists. Empty entries
/// are skipped, the weapon defaults to `random` and the count to 1.
pub fn parse_player_specs(specs: &str) -> Result<Vec<PlayerSpec>, ConfigError> {
    let mut parsed = Vec::new();
    for spec in specs.split(',').map(str::trim) {
        if spec.is_empty() {
            continue;
        }
        let parts: Vec<&str> = spec.split(':').map(str::trim).collect();
        if parts.len() > 3 || parts[0].is_empty() {
            return Err(ConfigError::MalformedPlayerSpec(spec.to_string()));
        }
        if parts[0] != "terminator" {
            return Err(ConfigError::UnknownPlayer(parts[0].to_string()));
        }
        let weapon = match parts.get(1) {
            Some(name) if !name.is_empty() => name.parse()?,
            _ => WeaponChoice::Random,
        };
        let count = match parts.get(2) {
            Some(n) => n
                .parse()
                .map_err(|_| ConfigError::MalformedPlayerSpec(spec.to_string()))?,
            None => 1,
        };
        parsed.push(PlayerSpec { weapon, count });
    }
    Ok(parsed)
}

/// Everything needed to build a `Game`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub map_builder: MapBuilderConfig,
    /// survival, safehouse, extermination or evacuation
    pub rules_id: String,
    /// Zombies spawned on reset, initial-only regions included
    pub initial_zombies: usize,
    /// Zombie count maintained during the episode
    pub minimum_zombies: usize,
    /// One label per agent; also fixes the agent count
    pub agent_ids: Vec<String>,
    pub agent_weapons: AgentWeapons,
    /// `kind:weapon:count,...`
    pub player_specs: String,
    /// Ticks per simulated second
    pub fps: u32,
    /// Weapons refuse to hit allies
    pub friendly_fire_guard: bool,
    pub agent_reward: RewardConfig,
    pub max_episode_seconds: f64,
    /// Fixed seed for reproducible runs; drawn from the OS when absent
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            map_builder: MapBuilderConfig::default(),
            rules_id: "survival".to_string(),
            initial_zombies: 0,
            minimum_zombies: 0,
            agent_ids: vec!["robot".to_string()],
            agent_weapons: AgentWeapons::default(),
            player_specs: String::new(),
            fps: DEFAULT_FPS,
            friendly_fire_guard: false,
            agent_reward: RewardConfig::default(),
            max_episode_seconds: MAX_EPISODE_SECONDS,
            seed: None,
        }
    }
}

impl GameConfig {
    /// Parse and validate a JSON document
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&json)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Resolve every identifier once so errors surface before a game starts
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.map_builder.validate()?;
        self.rules()?;
        self.agent_weapon_choices()?;
        self.players()?;
        if self.fps == 0 {
            return Err(ConfigError::Invalid("fps must be positive".into()));
        }
        if !(self.max_episode_seconds > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "max_episode_seconds must be positive, got {}",
                self.max_episode_seconds
            )));
        }
        Ok(())
    }

    pub fn rules(&self) -> Result<RulesKind, ConfigError> {
        self.rules_id.parse()
    }

    /// Seconds per tick
    pub fn dt(&self) -> f64 {
        1.0 / f64::from(self.fps.max(1))
    }

    /// One weapon choice per agent id
    pub fn agent_weapon_choices(&self) -> Result<Vec<WeaponChoice>, ConfigError> {
        let names: Vec<&str> = match &self.agent_weapons {
            AgentWeapons::One(name) => vec![name.as_str(); self.agent_ids.len()],
            AgentWeapons::Many(names) if names.is_empty() && !self.agent_ids.is_empty() => {
                return Err(ConfigError::Invalid("agent_weapons list is empty".into()));
            }
            AgentWeapons::Many(names) => names
                .iter()
                .map(String::as_str)
                .cycle()
                .take(self.agent_ids.len())
                .collect(),
        };
        names.into_iter().map(str::parse::<WeaponChoice>).collect()
    }

    pub fn players(&self) -> Result<Vec<PlayerSpec>, ConfigError> {
        parse_player_specs(&self.player_specs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::weapon::WeaponKind;

    #[test]
    fn test_empty_document_gives_defaults() {
        let config = GameConfig::from_json_str("{}").unwrap();
        assert_eq!(config, GameConfig::default());
        assert_eq!(config.rules().unwrap(), RulesKind::Survival);
        assert!((config.dt() - 0.02).abs() < 1e-12);
    }

    #[test]
    fn test_map_builder_tags() {
        let json = r#"{
            "map_builder": {
                "tag": "RandomMap",
                "parameters": [
                    {"weight": 1.0, "map_builder": {"tag": "SingleMap", "parameters": {"map_id": "easy_exit", "w": 640, "h": 480}}},
                    {"weight": 3.0, "map_builder": {"tag": "SingleMap", "parameters": {"map_id": "open_room", "w": 800, "h": 600}}}
                ]
            }
        }"#;
        let config = GameConfig::from_json_str(json).unwrap();
        match config.map_builder {
            MapBuilderConfig::RandomMap(entries) => {
                assert_eq!(entries.len(), 2);
                assert_eq!(entries[1].weight, 3.0);
            }
            other => panic!("unexpected builder {other:?}"),
        }
    }

    #[test]
    fn test_bad_weights_rejected() {
        let zero = r#"{"map_builder": {"tag": "RandomMap", "parameters": [
            {"weight": 0.0, "map_builder": {"tag": "SingleMap", "parameters": {"map_id": "demo", "w": 640, "h": 480}}}
        ]}}"#;
        assert!(matches!(
            GameConfig::from_json_str(zero),
            Err(ConfigError::InvalidMapWeights(_))
        ));
        let empty = r#"{"map_builder": {"tag": "RandomMap", "parameters": []}}"#;
        assert!(matches!(
            GameConfig::from_json_str(empty),
            Err(ConfigError::InvalidMapWeights(_))
        ));
    }

    #[test]
    fn test_map_size_must_fit() {
        let huge = r#"{"map_builder": {"tag": "SingleMap", "parameters": {"map_id": "demo", "w": 3000000000, "h": 480}}}"#;
        assert!(matches!(GameConfig::from_json_str(huge), Err(ConfigError::Invalid(_))));
        let flat = r#"{"map_builder": {"tag": "SingleMap", "parameters": {"map_id": "demo", "w": 640, "h": 0}}}"#;
        assert!(matches!(GameConfig::from_json_str(flat), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_unknown_identifiers() {
        let map = r#"{"map_builder": {"tag": "SingleMap", "parameters": {"map_id": "moon", "w": 640, "h": 480}}}"#;
        assert!(matches!(GameConfig::from_json_str(map), Err(ConfigError::UnknownMap(_))));
        assert!(matches!(
            GameConfig::from_json_str(r#"{"rules_id": "chess"}"#),
            Err(ConfigError::UnknownRules(_))
        ));
        assert!(matches!(
            GameConfig::from_json_str(r#"{"agent_weapons": "bazooka"}"#),
            Err(ConfigError::UnknownWeapon(_))
        ));
        assert!(matches!(
            GameConfig::from_json_str(r#"{"fps": 0}"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(GameConfig::from_json_str("{"), Err(ConfigError::Json(_))));
    }

    #[test]
    fn test_agent_weapons_cycle() {
        let config = GameConfig {
            agent_ids: vec!["a".into(), "b".into(), "c".into()],
            agent_weapons: AgentWeapons::Many(vec!["axe".into(), "rifle".into()]),
            ..GameConfig::default()
        };
        assert_eq!(
            config.agent_weapon_choices().unwrap(),
            vec![
                WeaponChoice::Fixed(WeaponKind::Axe),
                WeaponChoice::Fixed(WeaponKind::Rifle),
                WeaponChoice::Fixed(WeaponKind::Axe),
            ]
        );

        let single = GameConfig {
            agent_ids: vec!["a".into(), "b".into()],
            agent_weapons: AgentWeapons::One("knife".into()),
            ..GameConfig::default()
        };
        assert_eq!(single.agent_weapon_choices().unwrap().len(), 2);
    }

    #[test]
    fn test_player_specs() {
        let specs = parse_player_specs("terminator:shotgun:2, ,terminator").unwrap();
        assert_eq!(
            specs,
            vec![
                PlayerSpec {
                    weapon: WeaponChoice::Fixed(WeaponKind::Shotgun),
                    count: 2
                },
                PlayerSpec {
                    weapon: WeaponChoice::Random,
                    count: 1
                },
            ]
        );
        assert!(parse_player_specs("").unwrap().is_empty());
        assert!(matches!(
            parse_player_specs("sniper:rifle"),
            Err(ConfigError::UnknownPlayer(_))
        ));
        assert!(matches!(
            parse_player_specs("terminator:rifle:many"),
            Err(ConfigError::MalformedPlayerSpec(_))
        ));
        assert!(matches!(
            parse_player_specs("terminator:rifle:1:extra"),
            Err(ConfigError::MalformedPlayerSpec(_))
        ));
    }
}

//! Win/loss conditions
//!
//! Rules only read the world. "Players" here means agents and scripted
//! players together; zombies are the opposition.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::sim::fighter::{Fighter, FighterKind};
use crate::sim::state::World;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RulesKind {
    /// Last as long as possible; cannot be won
    Survival,
    /// Get every survivor into an objective
    SafeHouse,
    /// Kill every zombie
    Extermination,
    /// Gather the survivors in one group while at least half the team lives
    Evacuation,
}

impl RulesKind {
    pub const ALL: [RulesKind; 4] = [
        RulesKind::Survival,
        RulesKind::SafeHouse,
        RulesKind::Extermination,
        RulesKind::Evacuation,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RulesKind::Survival => "survival",
            RulesKind::SafeHouse => "safehouse",
            RulesKind::Extermination => "extermination",
            RulesKind::Evacuation => "evacuation",
        }
    }
}

impl fmt::Display for RulesKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RulesKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_lowercase();
        RulesKind::ALL
            .into_iter()
            .find(|k| k.as_str() == name)
            .ok_or_else(|| ConfigError::UnknownRules(s.to_string()))
    }
}

/// Rules bound to the team that started the episode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rules {
    pub kind: RulesKind,
    /// Agents and scripted players spawned at reset
    pub team_size: usize,
}

impl Rules {
    pub fn new(kind: RulesKind) -> Self {
        Self { kind, team_size: 0 }
    }

    /// Remember the starting team; call after spawning
    pub fn start_episode(&mut self, world: &World) {
        self.team_size = world
            .fighters
            .iter()
            .filter(|f| f.kind != FighterKind::Zombie)
            .count();
    }

    pub fn game_ended(&self, world: &World) -> bool {
        let players_alive = world.living_players().next().is_some();
        match self.kind {
            RulesKind::Survival => !players_alive,
            RulesKind::SafeHouse => {
                !players_alive || world.living_players().all(|p| world.is_at_objective(p.pos))
            }
            RulesKind::Extermination => {
                !players_alive || world.living(FighterKind::Zombie).next().is_none()
            }
            RulesKind::Evacuation => {
                if self.half_team_alive(world) {
                    players_together(world.living_players().collect())
                } else {
                    true
                }
            }
        }
    }

    /// Outcome and a one-line description, meaningful once the game ended
    pub fn game_won(&self, world: &World) -> (bool, &'static str) {
        let players_alive = world.living_players().next().is_some();
        match self.kind {
            RulesKind::Survival if players_alive => (true, "you won a game that never ends (?!)"),
            RulesKind::Survival => (false, "everybody is dead :("),
            RulesKind::SafeHouse if players_alive => (true, "everybody made it into the safehouse :)"),
            RulesKind::SafeHouse => (false, "nobody made it into the safehouse :("),
            RulesKind::Extermination if players_alive => (true, "zombies exterminated! :)"),
            RulesKind::Extermination => (false, "players exterminated! :("),
            RulesKind::Evacuation if self.half_team_alive(world) => {
                (true, "players got together and were evacuated :)")
            }
            RulesKind::Evacuation => (false, "too few survivors to send a rescue helicopter :("),
        }
    }

    fn half_team_alive(&self, world: &World) -> bool {
        2 * world.living_players().count() >= self.team_size
    }
}

/// True when the players form a single group, each linked to the next by a
/// distance below twice their combined radii. No players counts as together.
fn players_together(players: Vec<&Fighter>) -> bool {
    let Some(&first) = players.first() else {
        return true;
    };
    let mut reached = vec![false; players.len()];
    reached[0] = true;
    let mut pending = vec![first];
    while let Some(p) = pending.pop() {
        for (i, other) in players.iter().enumerate() {
            if !reached[i] && p.pos.distance(other.pos) < 2.0 * (p.radius + other.radius) {
                reached[i] = true;
                pending.push(*other);
            }
        }
    }
    reached.into_iter().all(|r| r)
}

//! Discrete fighter actions

use serde::{Deserialize, Serialize};

/// Step direction relative to heading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Forward,
    Right,
    Backward,
    Left,
}

/// One action executed by a fighter during a tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Action {
    Move(Direction),
    /// Turn by this many degrees (positive = clockwise)
    Rotate(f64),
    UseWeapon,
    HealSelf,
    HealAlly,
}

impl Action {
    /// Does nothing
    pub const NO_OP: Action = Action::Rotate(0.0);
}

/// The agent action catalogue, indexed by integer id
pub struct AgentActions;

impl AgentActions {
    /// Rotation deltas for ids 4..=10
    pub const ROTATIONS: [f64; 7] = [-30.0, -5.0, -1.0, 0.0, 1.0, 5.0, 30.0];
    const DIRECTIONS: [Direction; 4] = [
        Direction::Forward,
        Direction::Right,
        Direction::Backward,
        Direction::Left,
    ];

    /// Size of the action space
    pub const COUNT: usize = Self::DIRECTIONS.len() + Self::ROTATIONS.len() + 3;

    pub const fn no_op_id() -> usize {
        Self::DIRECTIONS.len() + Self::ROTATIONS.len() / 2
    }

    pub const fn use_weapon_id() -> usize {
        Self::DIRECTIONS.len() + Self::ROTATIONS.len()
    }

    /// Decode an action id. Ids outside the catalogue come from an untrusted
    /// controller and resolve to a no-op.
    pub fn from_id(id: usize) -> Action {
        let n_dir = Self::DIRECTIONS.len();
        let n_rot = Self::ROTATIONS.len();
        if id < n_dir {
            Action::Move(Self::DIRECTIONS[id])
        } else if id < n_dir + n_rot {
            Action::Rotate(Self::ROTATIONS[id - n_dir])
        } else if id == n_dir + n_rot {
            Action::UseWeapon
        } else if id == n_dir + n_rot + 1 {
            Action::HealSelf
        } else if id == n_dir + n_rot + 2 {
            Action::HealAlly
        } else {
            Action::NO_OP
        }
    }
}

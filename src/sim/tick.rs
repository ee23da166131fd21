//! Fixed timestep simulation tick
//!
//! One call advances the world by `dt`. Phases run in a fixed order and
//! never interleave:
//!
//! 1. bullets in flight advance
//! 2. agent actions run, in shuffled order
//! 3. zombies and scripted players take their AI turns, in shuffled order
//! 4. living agents pick up resources and check in at checkpoints
//! 5. sensor feedback is computed for every agent
//! 6. dead and expired things are purged

use rand::seq::SliceRandom;

use super::action::{Action, AgentActions};
use super::ai;
use super::perception::sensor_feedback;
use super::state::World;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// One action id per agent, in agent order. Missing entries are no-ops.
    pub actions: Vec<usize>,
}

impl TickInput {
    pub fn new(actions: impl Into<Vec<usize>>) -> Self {
        Self {
            actions: actions.into(),
        }
    }
}

/// Advance the world by one fixed timestep and return each agent's feedback
/// vector (dead agents included, in agent order)
pub fn tick(world: &mut World, input: &TickInput) -> Vec<Vec<f32>> {
    world.time += world.dt;
    world.time_ticks += 1;

    for bullet in &mut world.bullets {
        bullet.advance(world.dt, &world.map.walls, &mut world.fighters, &mut world.rng, world.size);
    }

    // Agents sit at the front of the arena and never move during a tick
    let agent_count = world.agent_count();
    let mut queued: Vec<(usize, Action)> = (0..agent_count)
        .filter(|&i| world.fighters[i].is_alive())
        .map(|i| {
            let id = input.actions.get(i).copied().unwrap_or(AgentActions::no_op_id());
            (i, AgentActions::from_id(id))
        })
        .collect();
    queued.shuffle(&mut world.rng);
    for (idx, action) in queued {
        world.execute_action(idx, action);
    }

    let mut turns: Vec<usize> = (agent_count..world.fighters.len())
        .filter(|&i| world.fighters[i].is_alive())
        .collect();
    turns.shuffle(&mut world.rng);
    for idx in turns {
        // Killed earlier in this phase
        if world.fighters[idx].is_alive() {
            ai::take_turn(world, idx);
        }
    }

    for idx in 0..agent_count {
        if world.fighters[idx].is_alive() {
            world.consume_resources(idx);
            world.check_in(idx);
        }
    }

    let feedback = (0..agent_count).map(|i| sensor_feedback(world, i)).collect();

    world.purge();
    feedback
}

//! Zombie Arena headless runner
//!
//! Runs episodes with agents that pick uniformly random actions. Useful for
//! smoke-testing maps and configurations; set `RUST_LOG=info` (or `debug` for
//! combat events) to follow along.

#![allow(clippy::print_stdout)]

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use zombie_arena::rules::RulesKind;
use zombie_arena::sim::map::MapId;
use zombie_arena::{Game, GameConfig};

/// Zombie Arena - a top-down zombie survival simulation
#[derive(Parser, Debug)]
#[command(name = "zombie-arena")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run episodes with randomly acting agents
    Run {
        /// JSON game configuration (defaults apply when omitted)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Random seed, overriding the configuration
        #[arg(short, long)]
        seed: Option<u64>,

        /// Episodes to play
        #[arg(short, long, default_value = "1")]
        episodes: u32,

        /// Stop an episode after this many ticks even if it is still running
        #[arg(long)]
        max_ticks: Option<u64>,
    },

    /// List the built-in maps and rule sets
    Maps,

    /// Print the default configuration as JSON
    Config,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    match args.command {
        Commands::Run {
            config,
            seed,
            episodes,
            max_ticks,
        } => run(config, seed, episodes, max_ticks),
        Commands::Maps => {
            for map in MapId::ALL {
                println!("{:<16} {}", map.as_str(), map.description());
            }
            println!();
            let rules: Vec<&str> = RulesKind::ALL.iter().map(|r| r.as_str()).collect();
            println!("rules: {}", rules.join(", "));
            Ok(())
        }
        Commands::Config => {
            println!("{}", GameConfig::default().to_json_pretty()?);
            Ok(())
        }
    }
}

fn run(path: Option<PathBuf>, seed: Option<u64>, episodes: u32, max_ticks: Option<u64>) -> Result<()> {
    let mut config = match &path {
        Some(path) => GameConfig::load(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => GameConfig::default(),
    };
    if seed.is_some() {
        config.seed = seed;
    }
    let seed = config.seed.unwrap_or_else(|| rand::rng().random());
    config.seed = Some(seed);

    let mut game = Game::new(config).context("building game")?;
    // Controller randomness is kept apart from the world's
    let mut controller = Pcg32::seed_from_u64(seed.wrapping_add(1));

    println!("seed {seed}");
    for _ in 0..episodes {
        game.reset().context("resetting game")?;
        let agents = game.world().agent_count();
        let mut returns = vec![0.0; agents];
        let mut ticks = 0u64;

        loop {
            let actions: Vec<usize> = (0..agents)
                .map(|_| controller.random_range(0..game.action_count()))
                .collect();
            let outcome = game.step(&actions);
            for (total, r) in returns.iter_mut().zip(&outcome.rewards) {
                *total += r;
            }
            ticks += 1;
            if outcome.done || outcome.truncated || max_ticks.is_some_and(|m| ticks >= m) {
                break;
            }
        }

        let world = game.world();
        println!(
            "episode {:>3}: {:?} after {} ticks ({:.1}s), zombies killed {}, players lost {}",
            game.episode(),
            game.phase(),
            ticks,
            world.time,
            world.zombie_deaths,
            world.player_deaths,
        );
        for (agent, total) in world.agents().iter().zip(&returns) {
            println!(
                "    {:<12} life {:>3}  kills {:>3}  accuracy {:>5.1}%  return {:>8.2}",
                agent.label,
                agent.life,
                agent.stats.kills,
                agent.stats.accuracy(),
                total
            );
        }
    }
    Ok(())
}

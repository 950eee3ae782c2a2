#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that generates Delve levels and prints them as text.

mod report;

use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use delve_core::{Command, GoalPlacement, LevelConfig};
use delve_world::{apply, query, Level};
use log::info;

/// Generates connected dungeon levels and prints the final layout.
#[derive(Debug, Parser)]
#[command(name = "delve", version, about, long_about = None)]
struct Args {
    /// TOML file providing the base level configuration.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Side length of the square grid.
    #[arg(long)]
    size: Option<u32>,

    /// Fraction of cells to turn into walls, in [0, 1].
    #[arg(long)]
    wall_fraction: Option<f32>,

    /// Number of enemies to place.
    #[arg(long)]
    enemies: Option<u32>,

    /// Where the goal pickup is placed.
    #[arg(long, value_enum)]
    goal: Option<GoalArg>,

    /// Seed for the first episode; later episodes use consecutive seeds.
    #[arg(long)]
    seed: Option<u64>,

    /// Number of episodes to generate before printing.
    #[arg(long, default_value_t = 1)]
    episodes: u32,

    /// Radius of the observation window printed for the start cell.
    #[arg(long)]
    radius: Option<u32>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum GoalArg {
    Corner,
    Scattered,
    Absent,
}

impl From<GoalArg> for GoalPlacement {
    fn from(arg: GoalArg) -> Self {
        match arg {
            GoalArg::Corner => Self::Corner,
            GoalArg::Scattered => Self::Scattered,
            GoalArg::Absent => Self::Absent,
        }
    }
}

/// Entry point for the Delve command-line interface.
fn main() -> Result<()> {
    let env = env_logger::Env::default().default_filter_or("info");
    env_logger::Builder::from_env(env).init();

    let args = Args::parse();
    let config = resolve_config(&args)?;
    let radius = args.radius.unwrap_or(config.observation_radius);
    let first_seed = args.seed.unwrap_or_else(rand::random);

    let mut level = Level::generate(config, first_seed)
        .with_context(|| format!("failed to generate level (seed {first_seed})"))?;

    let mut events = Vec::new();
    for episode in 1..args.episodes {
        events.clear();
        let seed = first_seed.wrapping_add(u64::from(episode));
        apply(&mut level, Command::Regenerate { seed }, &mut events);
        info!("episode {episode} produced {} events", events.len());
    }

    let start = query::start(&level);
    let start_percent = query::position_to_percentage(&level, start.position);
    let window = query::observation_window(&level, start.position, radius);

    println!("{}", report::summary_line(&query::summary(&level)));
    println!();
    println!("{}", report::grid_ascii(query::grid(&level)));
    println!();
    println!("{}", report::pool_table(query::pool(&level)));
    println!();
    println!(
        "{}",
        report::position_line("start", start.cell, start.position, start_percent)
    );
    println!("{}", report::enemy_lines(&query::enemies(&level)));
    println!();
    println!("observation window (radius {radius}) at start:");
    println!("{}", report::window_ascii(&window));

    Ok(())
}

fn resolve_config(args: &Args) -> Result<LevelConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let contents = fs::read_to_string(path).with_context(|| {
                format!("failed to read level configuration at {}", path.display())
            })?;
            parse_config(&contents)?
        }
        None => LevelConfig::default(),
    };

    if let Some(size) = args.size {
        config.size = size;
    }
    if let Some(wall_fraction) = args.wall_fraction {
        config.wall_fraction = wall_fraction;
    }
    if let Some(enemies) = args.enemies {
        config.desired_enemies = enemies;
    }
    if let Some(goal) = args.goal {
        config.goal_placement = goal.into();
    }

    config.validate().context("invalid level configuration")?;
    Ok(config)
}

fn parse_config(contents: &str) -> Result<LevelConfig> {
    toml::from_str(contents)
        .context("failed to parse level configuration")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["delve"];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).expect("arguments parse")
    }

    #[test]
    fn flags_override_defaults() {
        let config = resolve_config(&args(&[
            "--size",
            "12",
            "--wall-fraction",
            "0.5",
            "--enemies",
            "4",
            "--goal",
            "scattered",
        ]))
        .expect("valid configuration");

        assert_eq!(config.size, 12);
        assert_eq!(config.wall_fraction, 0.5);
        assert_eq!(config.desired_enemies, 4);
        assert_eq!(config.goal_placement, GoalPlacement::Scattered);
    }

    #[test]
    fn invalid_overrides_are_reported() {
        let error = resolve_config(&args(&["--size", "1"]));
        let message = format!("{:#}", error.expect_err("size one is invalid"));
        assert!(message.contains("grid size must be at least 2"));
    }

    #[test]
    fn partial_toml_keeps_remaining_defaults() {
        let contents = "size = 6\ngoal_placement = \"absent\"\n";
        let config = parse_config(contents).expect("parses");
        let defaults = LevelConfig::default();
        assert_eq!(config.size, 6);
        assert_eq!(config.goal_placement, GoalPlacement::Absent);
        assert_eq!(config.desired_enemies, defaults.desired_enemies);
    }

    #[test]
    fn malformed_toml_is_rejected_with_context() {
        let error = parse_config("size = \"large\"");
        let message = error.expect_err("size must be numeric").to_string();
        assert!(message.contains("failed to parse level configuration"));
    }

    #[test]
    fn missing_config_file_is_reported() {
        let error = resolve_config(&args(&["--config", "/nonexistent/delve.toml"]))
            .expect_err("file does not exist");
        assert!(error.to_string().contains("/nonexistent/delve.toml"));
    }
}

#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots the Dot Estimate experience.
//!
//! Usage:
//!   dot-estimate [--config game.toml] [--level 4] [--drift 1.5]
//!   dot-estimate --headless --rounds 100 --accuracy 0.7

mod config;
mod headless;
mod window;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use dot_estimate_core::{ColorMode, DemotionPolicy, DotSize, DriftSpeed, Level, ShapeMode, TimeLimit};
use dot_estimate_system_session::GameController;
use dot_estimate_world::query;
use tracing_subscriber::EnvFilter;

use self::config::FileConfig;
use self::headless::ScriptedPlayer;

#[derive(Debug, Parser)]
#[command(name = "dot-estimate")]
#[command(about = "Guess how many dots flashed on screen before the timer runs out")]
struct CliArgs {
    /// TOML file with `[game]`, `[headless]` and `[window]` tables.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Seed for every random stream of the session.
    #[arg(long)]
    seed: Option<u64>,
    /// Starting level.
    #[arg(long)]
    level: Option<u32>,
    /// Countdown length in seconds.
    #[arg(long = "time-limit")]
    time_limit: Option<u32>,
    /// Drift speed between 0 and 4.
    #[arg(long)]
    drift: Option<f32>,
    /// Shape mode: circles, squares or mixed.
    #[arg(long)]
    shapes: Option<ShapeMode>,
    /// Color mode: red, blue, black, mixed or a `#rrggbb` value.
    #[arg(long)]
    colors: Option<ColorMode>,
    /// Dot size in pixels.
    #[arg(long = "dot-size")]
    dot_size: Option<u32>,
    /// Demotion policy: offer or immediate.
    #[arg(long)]
    demotion: Option<DemotionPolicy>,
    /// Log filter; defaults to `RUST_LOG`, then `info`.
    #[arg(long = "log-level")]
    log_level: Option<String>,
    /// Play without a window using a scripted player.
    #[arg(long)]
    headless: bool,
    /// Rounds played by the scripted player.
    #[arg(long)]
    rounds: Option<u32>,
    /// Probability that the scripted player answers correctly.
    #[arg(long)]
    accuracy: Option<f64>,
    /// Mean answer time of the scripted player in milliseconds.
    #[arg(long = "reaction-ms")]
    reaction_ms: Option<u64>,
    /// Print frame timings once per second.
    #[arg(long = "show-fps")]
    show_fps: bool,
    /// Render as fast as possible.
    #[arg(long = "no-vsync")]
    no_vsync: bool,
}

impl CliArgs {
    fn apply(&self, mut file: FileConfig) -> FileConfig {
        let game = &mut file.game;
        if let Some(seed) = self.seed {
            game.seed = seed;
        }
        if let Some(level) = self.level {
            game.starting_level = Level::new(level);
        }
        if let Some(seconds) = self.time_limit {
            game.time_limit = TimeLimit::from_secs(seconds);
        }
        if let Some(speed) = self.drift {
            game.drift_speed = DriftSpeed::new(speed);
        }
        if let Some(mode) = self.shapes {
            game.appearance.shape_mode = mode;
        }
        if let Some(mode) = self.colors {
            game.appearance.color_mode = mode;
        }
        if let Some(size) = self.dot_size {
            game.appearance.dot_size = DotSize::new(size);
        }
        if let Some(policy) = self.demotion {
            game.demotion_policy = policy;
        }

        let headless = &mut file.headless;
        if let Some(rounds) = self.rounds {
            headless.rounds = rounds;
        }
        if let Some(accuracy) = self.accuracy {
            headless.accuracy = accuracy;
        }
        if let Some(reaction_ms) = self.reaction_ms {
            headless.reaction_ms = reaction_ms;
        }

        file.window.show_fps |= self.show_fps;
        if self.no_vsync {
            file.window.vsync = false;
        }
        file
    }
}

fn init_tracing(level: Option<&str>) -> Result<()> {
    let filter = match level {
        Some(level) => {
            EnvFilter::try_new(level).with_context(|| format!("invalid log level `{level}`"))?
        }
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

/// Entry point for the Dot Estimate command-line interface.
fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_tracing(args.log_level.as_deref())?;

    let file = config::load(args.config.as_deref())?;
    let file = args.apply(file);
    tracing::info!(
        seed = file.game.seed,
        starting_level = file.game.starting_level.get(),
        headless = args.headless,
        "configuration loaded"
    );

    let mut controller = GameController::new(&file.game);
    println!("{}", query::welcome_banner(controller.world()));

    if args.headless {
        let mut player = ScriptedPlayer::new(file.game.seed, &file.headless)?;
        let summary = headless::run(&mut controller, &mut player, file.headless.rounds);
        println!("{summary}");
        return Ok(());
    }

    window::run(controller, &file.window)
}

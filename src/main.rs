//! # Delve Main Entry Point
//!
//! Generates a level, places the player and a down stair, optionally walks the
//! player towards the stair and prints the resulting viewport.

use clap::Parser;
use delve::{
    DelveError, DelveResult, Direction, Level, LevelConfig, Overlay, Position, TextDisplay,
};
use rand::rngs::StdRng;
use std::path::PathBuf;
use std::process::ExitCode;
#[cfg(not(feature = "dev-tools"))]
use log::{debug, error, info, warn};
#[cfg(feature = "dev-tools")]
use tracing::{debug, error, info, warn, Level as TraceLevel};

/// Command line arguments for the dungeon viewer.
#[derive(Parser, Debug)]
#[command(name = "delve")]
#[command(about = "Generate a roguelike dungeon level and view it through the player's eyes")]
#[command(version)]
struct Args {
    /// Random seed for dungeon generation
    #[arg(short, long)]
    seed: Option<u64>,

    /// Map width in tiles
    #[arg(long)]
    width: Option<u32>,

    /// Map height in tiles
    #[arg(long)]
    height: Option<u32>,

    /// Consecutive failed placements before generation stops
    #[arg(long)]
    fail_budget: Option<u32>,

    /// Percent chance that a new feature is a corridor
    #[arg(long)]
    corridor_bias: Option<u32>,

    /// Maximum number of rooms and corridors
    #[arg(long)]
    max_features: Option<u32>,

    /// JSON level configuration; flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Steps to walk the player towards the down stair
    #[arg(long, default_value_t = 0)]
    steps: u32,

    /// Start with the whole map explored
    #[arg(long)]
    no_fog: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> ExitCode {
    let args = Args::parse();
    initialize_logging(&args.log_level);

    info!("Starting delve v{}", delve::VERSION);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("delve: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Initializes logging at the requested level.
fn initialize_logging(log_level: &str) {
    #[cfg(feature = "dev-tools")]
    {
        let level = match log_level.to_lowercase().as_str() {
            "error" => TraceLevel::ERROR,
            "warn" => TraceLevel::WARN,
            "info" => TraceLevel::INFO,
            "debug" => TraceLevel::DEBUG,
            "trace" => TraceLevel::TRACE,
            _ => TraceLevel::INFO,
        };

        tracing_subscriber::fmt()
            .with_max_level(level)
            .with_target(false)
            .init();
    }

    #[cfg(not(feature = "dev-tools"))]
    {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
            .init();
    }
}

/// Builds the level configuration from the optional file and the flags.
fn build_config(args: &Args) -> DelveResult<LevelConfig> {
    let mut config = match &args.config {
        Some(path) => LevelConfig::load(path)?,
        None => LevelConfig::default(),
    };

    let generation = &mut config.generation;
    if let Some(seed) = args.seed {
        generation.seed = seed;
    }
    if let Some(width) = args.width {
        generation.width = width;
    }
    if let Some(height) = args.height {
        generation.height = height;
    }
    if let Some(fail_budget) = args.fail_budget {
        generation.fail_budget = fail_budget;
    }
    if let Some(corridor_bias) = args.corridor_bias {
        generation.corridor_bias = corridor_bias;
    }
    if let Some(max_features) = args.max_features {
        generation.max_features = max_features;
    }
    if args.no_fog {
        generation.fog_of_war = false;
    }

    config.validate()?;
    Ok(config)
}

/// Picks a stair position away from the player when the level allows it.
fn place_stair(level: &Level, player: Position, rng: &mut StdRng) -> Position {
    for _ in 0..100 {
        let candidate = level.spawn_point(rng);
        if candidate != player {
            return candidate;
        }
    }
    warn!("No free tile for the stair; placing it under the player");
    player
}

/// Walks up to `steps` tiles along the current path to `goal`.
fn walk_towards(
    level: &mut Level,
    mut player: Position,
    goal: Position,
    steps: u32,
) -> DelveResult<Position> {
    for step in 0..steps {
        let Some(next) = level
            .path_to(player, goal, &[])
            .and_then(|path| path.first().copied())
        else {
            debug!("Walk stopped after {} steps", step);
            break;
        };

        let direction = Direction::from_delta(next - player).ok_or_else(|| {
            DelveError::GenerationFailed(format!("path jumped from {} to {}", player, next))
        })?;
        player = level.step(player, direction, &[]);
        level.update_view(player)?;
    }
    Ok(player)
}

fn run(args: &Args) -> DelveResult<()> {
    let config = build_config(args)?;
    info!(
        "Generating {}x{} level with seed {}",
        config.generation.width, config.generation.height, config.generation.seed
    );

    let mut rng = delve::generation::utils::create_rng(&config.generation);
    let mut level = Level::generate(&config, &mut rng)?;

    let start = level.spawn_point(&mut rng);
    let stair = place_stair(&level, start, &mut rng);
    level.update_view(start)?;

    let player = walk_towards(&mut level, start, stair, args.steps)?;

    let overlays = [Overlay::fixture(stair, '>'), Overlay::new(player, '@')];
    let frame = TextDisplay::new().render(&level, &overlays)?;
    print!("{}", frame.to_ansi_string());

    let under_player = level
        .camera()
        .to_screen(player)
        .and_then(|screen| level.describe_screen_cell(screen));
    println!(
        "seed {} | {} features | {} portals | player {} | stair {}",
        config.generation.seed,
        level.features().len(),
        level.portals().len(),
        player,
        stair
    );
    if let Some(cell) = under_player {
        debug!("Tile under player: {:?}", cell);
    }

    Ok(())
}

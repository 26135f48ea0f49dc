//! Binary entrypoint for the escaperoom CLI.
//!
//! Commands:
//! - `play [--difficulty <d>] [--slot <name>] [--world <json>] [--resume]` - play in the terminal
//! - `init` - create a starter `config.toml` and the save directory
//! - `status` - list save slots with room, time and score
//! - `world [--export <path>] [--check <path>]` - export the built-in world or validate a world file
//!
//! See the library crate docs for module-level details: `escaperoom::`.
use std::io::Write as _;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use log::{info, warn};
use tokio::io::{AsyncBufReadExt, BufReader};

use escaperoom::config::{Config, DifficultySettings};
use escaperoom::game::timer::format_elapsed;
use escaperoom::game::{
    load_world_from_json, score, world_to_json, Clock, DeadlineWatcher, Difficulty, SaveStore,
    Session, SystemClock, World,
};

#[derive(Parser)]
#[command(name = "escaperoom")]
#[command(about = "A text escape room: find the keys, open the doors, get out")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path (can be used before or after subcommand)
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: String,

    /// Verbose logging (-v, -vv for more; may appear before or after subcommand)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a game
    Play {
        /// easy, normal or hard (defaults to the configured difficulty)
        #[arg(short, long)]
        difficulty: Option<String>,

        /// Save slot used by `save` and `load`
        #[arg(short, long)]
        slot: Option<String>,

        /// Play a world loaded from a JSON file instead of the built-in house
        #[arg(short, long)]
        world: Option<String>,

        /// Continue the game stored in the slot
        #[arg(short, long)]
        resume: bool,
    },
    /// Create a default configuration file
    Init,
    /// List saved games
    Status,
    /// Export or validate world files
    World {
        /// Write the built-in world as JSON to this path
        #[arg(long)]
        export: Option<String>,

        /// Validate a JSON world file and print a summary
        #[arg(long)]
        check: Option<String>,
    },
}

enum Event {
    Line(Option<String>),
    Deadline,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Play {
            difficulty,
            slot,
            world,
            resume,
        } => {
            let config = Config::load_or_default(&cli.config).await?;
            init_logging(&Some(config.clone()), cli.verbose);
            info!("Starting escaperoom v{}", env!("CARGO_PKG_VERSION"));
            let difficulty = match difficulty {
                Some(d) => d.parse::<Difficulty>().map_err(|e| anyhow!("{}", e))?,
                None => config.game.default_difficulty,
            };
            let slot = slot.unwrap_or_else(|| config.game.save_slot.clone());
            play(&config, difficulty, &slot, world, resume).await?;
        }
        Commands::Init => {
            init_logging(&None, cli.verbose);
            info!("Initializing new configuration");
            Config::create_default(&cli.config).await?;
            let cfg = Config::default();
            let store = SaveStore::new(&cfg.storage.data_dir);
            tokio::fs::create_dir_all(store.dir()).await?;
            info!("Configuration file created at {}", cli.config);
            println!(
                "Created {} and {}",
                cli.config,
                store.dir().display()
            );
        }
        Commands::Status => {
            let config = Config::load_or_default(&cli.config).await?;
            init_logging(&Some(config.clone()), cli.verbose);
            show_status(&config)?;
        }
        Commands::World { export, check } => {
            let config = Config::load_or_default(&cli.config).await?;
            init_logging(&Some(config.clone()), cli.verbose);
            if export.is_none() && check.is_none() {
                println!("{}", world_to_json(&World::canonical())?);
            }
            if let Some(path) = export {
                let json = world_to_json(&World::canonical())?;
                tokio::fs::write(&path, json).await?;
                info!("World exported to {}", path);
                println!("World written to {}", path);
            }
            if let Some(path) = check {
                let world = load_world_from_json(&path)
                    .map_err(|e| anyhow!("World file {} is invalid: {}", path, e))?;
                println!(
                    "{}: OK ({} rooms, {} furniture, {} treasures, start {}, exit {})",
                    path,
                    world.rooms().len(),
                    world.furniture_count(),
                    world.treasure_count(),
                    world.start_room(),
                    world.target_room()
                );
            }
        }
    }

    Ok(())
}

fn load_world(config: &Config, path: Option<String>) -> Result<World> {
    match path.or_else(|| config.game.world_file.clone()) {
        Some(path) => load_world_from_json(&path)
            .map_err(|e| anyhow!("Failed to load world {}: {}", path, e)),
        None => Ok(World::canonical()),
    }
}

fn arm(session: &Session, settings: DifficultySettings) -> Option<DeadlineWatcher> {
    if !settings.deadline_watcher || session.state().is_over() {
        return None;
    }
    session.deadline_in().map(DeadlineWatcher::spawn)
}

fn show(text: &str, prompt: bool) {
    let mut out = std::io::stdout();
    let _ = write!(out, "{}", text);
    if prompt {
        let _ = write!(out, "> ");
    }
    let _ = out.flush();
}

async fn play(
    config: &Config,
    difficulty: Difficulty,
    slot: &str,
    world_path: Option<String>,
    resume: bool,
) -> Result<()> {
    let world = Arc::new(load_world(config, world_path)?);
    let store = SaveStore::new(&config.storage.data_dir);
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let mut session = if resume {
        Session::resume(world, clock, store, slot, config.game.rng_seed)
            .map_err(|e| anyhow!("Cannot resume slot '{}': {}", slot, e))?
    } else {
        let settings = config.difficulty.for_difficulty(difficulty);
        Session::new(
            world,
            difficulty,
            settings,
            clock,
            store,
            slot,
            config.game.rng_seed,
        )
    };
    let settings = config
        .difficulty
        .for_difficulty(session.state().difficulty);

    show(&session.intro(), true);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut watcher = arm(&session, settings);
    let mut armed_for = session.state().start_time;

    loop {
        let event = match watcher.as_ref() {
            Some(w) => tokio::select! {
                line = lines.next_line() => Event::Line(line?),
                _ = w.fired() => Event::Deadline,
            },
            None => Event::Line(lines.next_line().await?),
        };

        match event {
            Event::Deadline => match session.tick() {
                Some(reply) => {
                    show(&format!("\n{}", reply.text), false);
                    break;
                }
                None => watcher = arm(&session, settings),
            },
            Event::Line(None) => {
                info!("Input closed; leaving session {}", session.state().session_id);
                break;
            }
            Event::Line(Some(line)) => {
                let reply = session.handle_line(&line);
                if reply.is_final() {
                    show(&reply.text, false);
                    break;
                }
                show(&reply.text, true);
                // A load moves the start time, so the watcher has to follow.
                if session.state().start_time != armed_for {
                    armed_for = session.state().start_time;
                    watcher = arm(&session, settings);
                }
            }
        }
    }

    Ok(())
}

fn show_status(config: &Config) -> Result<()> {
    let world = load_world(config, None)?;
    let store = SaveStore::new(&config.storage.data_dir);
    let slots = store.list()?;
    println!("escaperoom v{}", env!("CARGO_PKG_VERSION"));
    println!("Saves in {}", store.dir().display());
    if slots.is_empty() {
        println!("No saved games.");
        return Ok(());
    }
    let now = SystemClock.now();
    for info in slots {
        let saved_at = info.snapshot.saved_at.format("%Y-%m-%d %H:%M");
        let difficulty = info.snapshot.difficulty.as_str();
        match info.snapshot.restore(&world, now) {
            Ok(state) => println!(
                "{:<16} {:<8} {:<12} {} score {} (saved {})",
                info.slot,
                difficulty,
                state.current_room,
                format_elapsed(state.elapsed(now)),
                score(&state, &world, now),
                saved_at
            ),
            Err(e) => {
                warn!("Slot {} does not match the current world: {}", info.slot, e);
                println!("{:<16} unreadable: {}", info.slot, e);
            }
        }
    }
    Ok(())
}

fn init_logging(config: &Option<Config>, verbosity: u8) {
    use std::io::Write;
    let mut builder = env_logger::Builder::new();
    // CLI verbosity overrides the configured level
    let base_level = match verbosity {
        0 => config
            .as_ref()
            .map(|c| c.logging.level_filter())
            .unwrap_or(log::LevelFilter::Info),
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    builder.filter_level(base_level);

    let log_file = config
        .as_ref()
        .and_then(|c| c.logging.file.clone())
        .and_then(|path| {
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .ok()
        });

    match log_file {
        Some(f) => {
            let file = std::sync::Arc::new(std::sync::Mutex::new(f));
            // The terminal belongs to the game; only echo when asked to and attached to one.
            let echo = verbosity > 0 && atty::is(atty::Stream::Stderr);
            builder.format(move |fmt, record| {
                let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
                let line = format!("{} [{}] {}", ts, record.level(), record.args());
                if let Ok(mut guard) = file.lock() {
                    let _ = writeln!(guard, "{}", line);
                }
                if echo {
                    writeln!(fmt, "{}", line)
                } else {
                    Ok(())
                }
            });
        }
        None => {
            builder.format(|fmt, record| {
                writeln!(
                    fmt,
                    "{} [{}] {}",
                    chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ"),
                    record.level(),
                    record.args()
                )
            });
        }
    }
    let _ = builder.try_init();
}

use clap::Parser;
use log::info;
use std::path::PathBuf;
use std::process;
use vivarium_config::{load_config, Config};
use vivarium_core::{World, WorldSettings};

mod render;

#[derive(Parser, Debug)]
#[command(author, version, about = "Toroidal grid life simulation", long_about = None)]
struct Args {
    /// Path to a JSON configuration file; defaults apply when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the number of ticks to simulate
    #[arg(long)]
    ticks: Option<u64>,

    /// Override the RNG seed
    #[arg(long)]
    seed: Option<u64>,

    /// Print per-tick diagnostics and the grid after every tick
    #[arg(short, long)]
    verbose: bool,

    /// Suppress grid rendering entirely
    #[arg(short, long)]
    quiet: bool,
}

fn main() {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let config = match &args.config {
        Some(path) => match load_config(path) {
            Ok(config) => config,
            Err(err) => {
                eprintln!("failed to load config: {err}");
                process::exit(1);
            }
        },
        None => Config::default(),
    };

    let settings = WorldSettings {
        width: config.world.width,
        height: config.world.height,
        people: config.population.people,
        food: config.population.food,
        sight_distance: config.world.sight_distance,
        seed: args.seed.or(config.run.seed),
    };
    let ticks = args.ticks.unwrap_or(config.run.ticks);

    let mut world = World::new(&settings);
    info!(
        "simulating {} ticks on a {}x{} grid ({} people, {} food)",
        ticks, settings.width, settings.height, settings.people, settings.food
    );

    if !args.quiet {
        println!("{}", render::render(&world));
    }
    for _ in 0..ticks {
        world.tick();
        if args.verbose && !args.quiet {
            println!("tick {}", world.tick_count());
            println!("{}", render::render(&world));
        }
    }
    if !args.quiet {
        println!("after {} ticks:", world.tick_count());
        println!("{}", render::render(&world));
        println!("{}", render::summary(&world));
    }
}

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use std::path::PathBuf;

use traffic_manager::simulation::{CityId, LevelData, SimConfig, SimWorld, WorldBounds};

#[derive(Parser)]
#[command(name = "traffic_manager")]
#[command(about = "Headless traffic management simulation")]
struct Cli {
    /// Number of simulation ticks to run
    #[arg(long, default_value = "600")]
    ticks: u32,

    /// Time delta per tick in seconds
    #[arg(long, default_value = "0.1")]
    delta: f32,

    /// Level file listing city positions (TOML)
    #[arg(long)]
    level: Option<PathBuf>,

    /// Simulation config overrides (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// RNG seed, overrides the config
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("warn,traffic_manager=info"),
    )
    .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => SimConfig::load(path)?,
        None => SimConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }

    let level = match &cli.level {
        Some(path) => LevelData::load(path)?,
        None => LevelData::default_level().context("Built-in level is invalid")?,
    };

    let bounds = WorldBounds::from_level(&level, &config);
    info!(
        "World bounds: camera ({:.0}, {:.0})..({:.0}, {:.0}), background {:.0}x{:.0}",
        bounds.camera_min.x,
        bounds.camera_min.y,
        bounds.camera_max.x,
        bounds.camera_max.y,
        bounds.background_width,
        bounds.background_height
    );

    let mut world = SimWorld::from_level(&level, config);
    build_ring_network(&mut world);

    run_headless(&mut world, cli.ticks, cli.delta);
    Ok(())
}

/// Connect the level's cities in a ring of two-way roads and watch the first one
fn build_ring_network(world: &mut SimWorld) {
    let cities: Vec<CityId> = world.road_network.cities().map(|city| city.id).collect();
    if cities.len() < 2 {
        return;
    }

    let mut first_road = None;
    for (index, &from) in cities.iter().enumerate() {
        let to = cities[(index + 1) % cities.len()];
        match world.build_two_way_road(from, to) {
            Ok((forward, _)) => {
                first_road.get_or_insert(forward);
            }
            Err(err) => warn!("Couldn't connect {} to {}: {}", from, to, err),
        }
    }

    if let Some(road) = first_road {
        if let Err(err) = world.build_speed_camera(road, None) {
            warn!("Couldn't place speed camera: {}", err);
        }
    }
}

/// Run the simulation in headless mode (no graphics)
fn run_headless(world: &mut SimWorld, ticks: u32, delta: f32) {
    info!("Running traffic simulation in headless mode...");
    info!("Ticks: {}, Delta: {}s", ticks, delta);

    // Calculate how many ticks equal 1 second of simulation time
    let ticks_per_second = (1.0 / delta.max(f32::EPSILON)).ceil().max(1.0) as u32;

    world.print_summary();

    let mut tick = 0;
    while tick < ticks {
        let ticks_to_run = ticks_per_second.min(ticks - tick);
        for _ in 0..ticks_to_run {
            tick += 1;
            let report = world.tick(delta);
            for _ in 0..report.crash_cues() {
                info!("*crash*");
            }
        }
        world.print_summary();
    }

    let stats = &world.stats;
    info!("=== SIMULATION COMPLETE ===");
    info!("Elapsed time: {:.2}s", world.clock().elapsed());
    info!("Total commuters spawned: {}", stats.total_commuters_spawned);
    info!("Total commuters arrived: {}", stats.total_commuters_arrived);
    info!("Total collisions: {}", stats.total_collisions);
    info!("Total violations: {}", stats.total_violations);
    info!("Fines collected: {}", stats.fines_collected);
    info!("Active commuters: {}", world.commuters.len());
    info!("Total cities: {}", world.road_network.city_count());
    info!("Total roads: {}", world.road_network.road_count());
    info!("{}", world.treasury().summary());
    info!("Arrival rate: {:.1}%", stats.arrival_rate());
}

//! Headless demo: an agent walks around a wall to reach its target

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use gridnav::core::{ConfigError, logging};
use gridnav::prelude::*;

/// Grid navigation demo
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Navigation config (RON, or JSON by extension)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Obstacle map in RON; defaults to a wall with a gap
    #[arg(short, long)]
    obstacles: Option<PathBuf>,

    /// Number of frames to simulate
    #[arg(short, long, default_value_t = 600)]
    ticks: usize,

    /// Seconds per frame
    #[arg(long, default_value_t = 1.0 / 60.0)]
    dt: f32,

    /// Smooth paths by line of sight
    #[arg(short, long)]
    smoothing: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn default_obstacles() -> ObstacleMap {
    ObstacleMap::new()
        .with(Obstacle::rect(Vec2::new(-0.5, -9.0), Vec2::new(0.5, 3.0)))
        .with(Obstacle::circle(Vec2::new(-3.0, 5.0), 1.0))
        .with_sight_clearance(0.3)
}

fn run(args: &Args) -> Result<(), ConfigError> {
    let mut config = match &args.config {
        Some(path) => NavConfig::load(path)?,
        None => NavConfig::default(),
    };
    if args.smoothing {
        config = config.with_smoothing(true);
    }
    let obstacles = match &args.obstacles {
        Some(path) => ObstacleMap::load_ron(path)?,
        None => default_obstacles(),
    };

    let mut navigator = Navigator::new(&config);
    navigator.listeners_mut().subscribe(|event| match event {
        NavEvent::PathAssigned { waypoints } => log::info!("New path with {waypoints} waypoints"),
        NavEvent::PathCompleted => log::info!("Path completed"),
        other => log::debug!("{other:?}"),
    });

    let target = Vec3::new(6.0, 0.0, 0.0);
    let mut agent = Vec3::new(-6.0, 0.0, 0.0);
    log::info!(
        "Walking from ({:.1}, {:.1}) to ({:.1}, {:.1}) around {} obstacles",
        agent.x,
        agent.y,
        target.x,
        target.y,
        obstacles.len()
    );

    for frame in 0..args.ticks {
        agent = navigator.update(&obstacles, agent, target, args.dt);

        if obstacles.is_obstacle(agent, 0.0) {
            log::warn!("Frame {frame}: agent inside an obstacle at ({:.2}, {:.2})", agent.x, agent.y);
        }
        if !navigator.follower().is_following() && agent.distance(target) <= config.grid.character_size {
            log::info!("Arrived after {frame} frames");
            break;
        }
    }

    log::info!("Final position ({:.2}, {:.2})", agent.x, agent.y);
    for line in navigator.debug_lines() {
        log::info!("{line}");
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    logging::init(args.verbose);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("Navigation demo failed: {e}");
            ExitCode::FAILURE
        }
    }
}

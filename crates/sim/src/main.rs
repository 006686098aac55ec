//! Headless guard simulation driver.
//!
//! Loads a level pack, walks a scripted player through it and runs the
//! guard AI with a kinematic host standing in for physics and animation.
//!
//! ```bash
//! cargo run -p guard-sim -- --data-dir data --level dock --ticks 600 \
//!     --waypoint 2,0,18 --waypoint 18,0,18 --save dock.sav
//! ```

mod host;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use glam::Vec3;
use guard_content::ContentFactory;
use guard_core::{Env, OpenField, PcgRng, SimEvent, SimSnapshot, Simulation};

use host::{KinematicHost, ScriptedPlayer};

/// Runs a level headless and reports what the guards did.
#[derive(Parser, Debug)]
#[command(name = "guard-sim")]
#[command(about = "Headless guard AI simulation", long_about = None)]
#[command(version)]
struct Args {
    /// Level pack directory (holds config.toml and levels/)
    #[arg(long, env = "GUARD_DATA_DIR", default_value = "data")]
    data_dir: PathBuf,

    /// Level name under levels/, without extension
    #[arg(long)]
    level: Option<String>,

    /// List the levels of the pack and exit
    #[arg(long)]
    list: bool,

    #[arg(long, default_value_t = 600)]
    ticks: u32,

    /// Seconds per tick
    #[arg(long, default_value_t = 0.05)]
    dt: f32,

    /// Overrides the seed from config.toml
    #[arg(long)]
    seed: Option<u64>,

    /// Player route point as x,y,z; repeat for a looped route
    #[arg(long = "waypoint", value_parser = parse_point)]
    waypoints: Vec<Vec3>,

    /// Player walking speed
    #[arg(long, default_value_t = 2.0)]
    player_speed: f32,

    /// Continue from a bincode save instead of the level's initial state
    #[arg(long)]
    resume: Option<PathBuf>,

    /// Write a bincode save after the last tick
    #[arg(long)]
    save: Option<PathBuf>,

    /// Print the final snapshot as JSON on stdout
    #[arg(long)]
    dump: bool,
}

fn parse_point(text: &str) -> Result<Vec3, String> {
    let parts: Vec<f32> = text
        .split(',')
        .map(|part| part.trim().parse::<f32>())
        .collect::<Result<_, _>>()
        .map_err(|e| format!("invalid coordinate in {text:?}: {e}"))?;
    match parts[..] {
        [x, y, z] => Ok(Vec3::new(x, y, z)),
        [x, z] => Ok(Vec3::new(x, 0.0, z)),
        _ => Err(format!("expected x,y,z or x,z, got {text:?}")),
    }
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let factory = ContentFactory::new(&args.data_dir);

    if args.list {
        for name in factory.level_names()? {
            println!("{name}");
        }
        return Ok(());
    }

    let level = args
        .level
        .as_deref()
        .context("--level is required unless --list is given")?;
    let mut sim = build(&factory, level, args.seed)?;

    if let Some(path) = &args.resume {
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read save {}", path.display()))?;
        let snapshot: SimSnapshot = bincode::deserialize(&bytes)
            .with_context(|| format!("Failed to decode save {}", path.display()))?;
        sim.restore(snapshot)?;
    }

    run(&mut sim, &args)?;

    let snapshot = sim.snapshot();
    if let Some(path) = &args.save {
        let bytes = bincode::serialize(&snapshot)?;
        std::fs::write(path, bytes)
            .with_context(|| format!("Failed to write save {}", path.display()))?;
        tracing::info!(path = %path.display(), "snapshot saved");
    }
    if args.dump {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    }
    Ok(())
}

fn build(factory: &ContentFactory, level: &str, seed: Option<u64>) -> Result<Simulation> {
    let mut config = factory.load_config()?;
    if let Some(seed) = seed {
        config.seed = seed;
    }
    let layout = factory.load_level(level)?;
    Simulation::from_layout(config, &layout)
        .with_context(|| format!("Failed to build level {level}"))
}

fn run(sim: &mut Simulation, args: &Args) -> Result<()> {
    let field = OpenField;
    let rng = PcgRng;
    let env = Env::with_all(&field, &field, &rng).as_sim_env();

    let mut host = KinematicHost::new();
    // A resumed save leaves warps that put bodies back in place.
    let pending = sim.drain_commands();
    host.apply(sim, &pending);
    let mut player = if args.waypoints.is_empty() {
        ScriptedPlayer::new(vec![sim.player().position], args.player_speed)
    } else {
        ScriptedPlayer::new(args.waypoints.clone(), args.player_speed)
    };
    sim.set_player(player.view());

    let mut status = sim.ai_status();
    let mut dropped = 0;
    let mut deaths = 0;
    tracing::info!(agents = sim.agent_count(), ticks = args.ticks, "simulation started");

    for _ in 0..args.ticks {
        sim.set_player(player.step(args.dt));
        let report = sim.tick(&env, args.dt)?;
        dropped += report.dropped_requests;

        let commands = sim.drain_commands();
        host.apply(sim, &commands);
        host.step(sim, args.dt);

        for event in sim.drain_events() {
            match event {
                SimEvent::StateEntered { agent, state } => {
                    tracing::debug!(agent = %agent, %state, frame = report.frame, "state entered");
                }
                SimEvent::Died { agent } => {
                    deaths += 1;
                    tracing::info!(agent = %agent, "agent died");
                }
                SimEvent::PlayerStruck { agent, damage } => {
                    tracing::info!(agent = %agent, damage, "player struck");
                }
                other => tracing::trace!(?other, "event"),
            }
        }

        if report.status.level != status.level {
            tracing::info!(
                frame = report.frame,
                time = report.time,
                from = %status.level,
                to = %report.status.level,
                "alert level changed"
            );
        }
        status = report.status;
    }

    let tally = host.tally();
    tracing::info!(
        frame = sim.clock().frame,
        alert = %status.level,
        shots = tally.shots,
        grenades = tally.grenades,
        strikes = tally.strikes,
        deaths,
        dropped_requests = dropped,
        "simulation finished"
    );
    Ok(())
}

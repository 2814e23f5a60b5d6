#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a headless Piece Arena simulation and
//! prints periodic synchronization frames as JSON lines.

mod scenario;

use std::{
    io::{self, Write},
    path::PathBuf,
    time::Duration,
};

use anyhow::{bail, Context, Result};
use clap::Parser;
use piece_arena_core::{
    Clock, Command, Event, ManualClock, PieceId, PieceOptions, PieceUpdate, Point, RandomIds,
    SystemClock, Timestamp, PROJECTILE_CLASS,
};
use piece_arena_system_ticker::{Config, Ticker};
use piece_arena_world::{self as world, query, Arena, Board};
use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

const MAX_CATCH_UP: u32 = 5;

/// Headless Piece Arena simulation.
#[derive(Debug, Parser)]
#[command(name = "piece-arena", version)]
struct Args {
    /// Scenario file in TOML; a built-in scenario is used when omitted.
    #[arg(long)]
    scenario: Option<PathBuf>,
    /// Number of simulation ticks to run.
    #[arg(long, default_value_t = 200)]
    ticks: u64,
    /// Simulated milliseconds per tick.
    #[arg(long, default_value_t = 50, value_parser = clap::value_parser!(u64).range(1..))]
    tick_ms: u64,
    /// Simulated milliseconds per frame feeding the fixed-step ticker.
    #[arg(long, default_value_t = 16, value_parser = clap::value_parser!(u64).range(1..))]
    frame_ms: u64,
    /// Print a synchronization frame every this many ticks.
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u64).range(1..))]
    report_every: u64,
    /// Seed for projectile identifiers; entropy is used when omitted.
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Debug, Serialize)]
struct SyncFrame<'a> {
    tick: u64,
    now: Timestamp,
    pieces: &'a [PieceUpdate],
}

#[derive(Debug, Default)]
struct RunStats {
    shots: usize,
    expired: usize,
}

/// Entry point for the Piece Arena command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let scenario = match &args.scenario {
        Some(path) => scenario::load(path)?,
        None => scenario::builtin()?,
    };
    let ids = match args.seed {
        Some(seed) => RandomIds::seeded(seed),
        None => RandomIds::from_entropy(),
    };

    let clock = ManualClock::starting_at(SystemClock.now());
    let mut arena = Arena::new(Board::new(scenario.board), clock.clone(), ids);
    let mut events = Vec::new();
    for config in scenario.pieces {
        world::apply(&mut arena, Command::Spawn { config }, &mut events);
    }
    for event in events.drain(..) {
        match event {
            Event::PieceRejected { reason } => {
                bail!("scenario contains an invalid piece: {reason}");
            }
            Event::PieceAdded { options } => {
                debug!(piece = %options.id, class = %options.class, "scenario piece added");
            }
            _ => {}
        }
    }
    info!(
        pieces = arena.board().len(),
        ticks = args.ticks,
        tick_ms = args.tick_ms,
        "simulation starting"
    );

    let mut ticker = Ticker::new(Config::new(
        Duration::from_millis(args.tick_ms),
        MAX_CATCH_UP,
    ));
    let frame = Duration::from_millis(args.frame_ms);
    let mut stats = RunStats::default();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    'frames: while arena.tick_index() < args.ticks {
        for _ in 0..ticker.advance(frame) {
            clock.advance(ticker.tick_interval());
            run_tick(&mut arena, &mut events, &mut stats);

            if arena.tick_index() % args.report_every == 0 {
                write_sync_frame(&mut out, &arena)?;
            }
            if arena.tick_index() >= args.ticks {
                break 'frames;
            }
        }
    }

    out.flush().context("failed to flush synchronization output")?;
    info!(
        ticks = arena.tick_index(),
        shots = stats.shots,
        expired = stats.expired,
        remaining = arena.board().len(),
        "simulation finished"
    );
    Ok(())
}

fn run_tick(
    arena: &mut Arena<ManualClock, RandomIds>,
    events: &mut Vec<Event>,
    stats: &mut RunStats,
) {
    world::apply(arena, Command::ExpireDue, events);

    let pieces = query::all_options(arena);
    for shooter in query::armed_pieces(arena) {
        if let Some(target) = choose_target(&shooter, &pieces) {
            world::apply(
                arena,
                Command::Fire {
                    piece: shooter,
                    target,
                },
                events,
            );
        }
    }

    world::apply(arena, Command::Tick, events);

    for event in events.drain(..) {
        match event {
            Event::ProjectileFired {
                shooter,
                projectile,
            } => {
                stats.shots += 1;
                debug!(shooter = %shooter, projectile = %projectile, "shot fired");
            }
            Event::PieceExpired { piece } => {
                stats.expired += 1;
                debug!(piece = %piece, "piece expired");
            }
            _ => {}
        }
    }
}

/// Picks the position of the first other non-projectile piece.
fn choose_target(shooter: &PieceId, pieces: &[PieceOptions]) -> Option<Point> {
    pieces
        .iter()
        .find(|piece| &piece.id != shooter && piece.class != PROJECTILE_CLASS)
        .map(|piece| piece.position)
}

fn write_sync_frame(
    out: &mut impl Write,
    arena: &Arena<ManualClock, RandomIds>,
) -> Result<()> {
    let pieces = query::piece_updates(arena);
    let frame = SyncFrame {
        tick: arena.tick_index(),
        now: arena.now(),
        pieces: &pieces,
    };
    let line = serde_json::to_string(&frame).context("failed to encode synchronization frame")?;
    writeln!(out, "{line}").context("failed to write synchronization frame")
}

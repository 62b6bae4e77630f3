#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a Cellbound scene and prints the grid.

mod scene;

use anyhow::{ensure, Result};
use cellbound_core::{CellCoord, Command, Event};
use cellbound_world::{self as world, query, World};
use clap::Parser;

use crate::scene::Scene;

const EMPTY_CELL: char = '.';
const MAX_EXTENT: u32 = 4096;

/// Runs a preset scene on a text grid.
#[derive(Debug, Parser)]
#[command(name = "cellbound", version)]
struct Cli {
    /// Number of grid columns.
    #[arg(long, default_value_t = 40)]
    columns: u32,
    /// Number of grid rows.
    #[arg(long, default_value_t = 12)]
    rows: u32,
    /// Number of ticks to simulate.
    #[arg(long, default_value_t = 30)]
    ticks: u32,
    /// Scene to populate the grid with.
    #[arg(long, value_enum, default_value_t = Scene::Rain)]
    scene: Scene,
    /// Seed for scenes with randomized placement.
    #[arg(long, default_value_t = 7)]
    seed: u64,
    /// Prints the grid after every tick instead of only at the end.
    #[arg(long)]
    every_tick: bool,
}

/// Entry point for the Cellbound command-line interface.
fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    validate(&cli)?;

    let mut world = World::new();
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::ConfigureGrid {
            columns: cli.columns,
            rows: cli.rows,
        },
        &mut events,
    );

    for blueprint in scene::blueprints(cli.scene, cli.columns, cli.rows, cli.seed) {
        world::apply(&mut world, Command::Spawn { blueprint }, &mut events);
    }
    for event in events.drain(..) {
        if let Event::SpawnRejected { reason } = event {
            log::warn!("scene object skipped: {reason}");
        }
    }

    let mut moves = 0usize;
    let mut collisions = 0usize;
    for _ in 0..cli.ticks {
        world::apply(&mut world, Command::Tick, &mut events);
        world::apply(&mut world, Command::Reap, &mut events);
        for event in events.drain(..) {
            match event {
                Event::ObjectMoved { .. } => moves += 1,
                Event::ObjectsCollided { .. } | Event::BoundaryReached { .. } => collisions += 1,
                other => log::debug!("{other:?}"),
            }
        }

        if cli.every_tick {
            println!("tick {}\n{}", query::tick_index(&world), render(&world));
        }
    }

    if !cli.every_tick {
        println!("{}", render(&world));
    }
    println!(
        "{} ticks, {} objects left, {moves} moves, {collisions} collisions",
        query::tick_index(&world),
        query::object_view(&world).iter().count(),
    );
    Ok(())
}

fn validate(cli: &Cli) -> Result<()> {
    ensure!(cli.columns > 0, "the grid needs at least one column");
    ensure!(cli.rows > 1, "the grid needs at least two rows");
    ensure!(
        cli.columns <= MAX_EXTENT && cli.rows <= MAX_EXTENT,
        "the grid is limited to {MAX_EXTENT} columns and {MAX_EXTENT} rows"
    );
    Ok(())
}

fn render(world: &World) -> String {
    let (columns, rows) = query::grid(world).dimensions();
    let capacity = (columns as usize + 1).saturating_mul(rows as usize);
    let mut frame = String::with_capacity(capacity);
    for row in 0..rows {
        frame.extend((0..columns).map(|column| {
            query::glyph_at(world, CellCoord::new(column, row)).unwrap_or(EMPTY_CELL)
        }));
        frame.push('\n');
    }
    frame
}

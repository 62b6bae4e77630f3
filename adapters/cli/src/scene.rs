//! Preset scenes the CLI can populate a fresh grid with.

use cellbound_core::{
    CellCoord, ColliderSpec, Footprint, Height, Marker, ModifierSpec, ObjectBlueprint, Velocity,
};
use clap::ValueEnum;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const GROUND: Height = Height::new(0);

/// Scenes available from the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum Scene {
    /// Drops accelerate downward and settle on a floor.
    Rain,
    /// Balls bounce around the grid and off each other.
    Billiards,
    /// Projectiles chip away at a destructible wall.
    Siege,
}

/// Blueprints composing the scene, in spawn order.
pub(crate) fn blueprints(scene: Scene, columns: u32, rows: u32, seed: u64) -> Vec<ObjectBlueprint> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    match scene {
        Scene::Rain => rain(&mut rng, columns, rows),
        Scene::Billiards => billiards(&mut rng, columns, rows),
        Scene::Siege => siege(columns, rows),
    }
}

fn rain(rng: &mut ChaCha8Rng, columns: u32, rows: u32) -> Vec<ObjectBlueprint> {
    let floor_row = rows - 1;
    let mut scene = vec![ObjectBlueprint::new(
        CellCoord::new(0, floor_row),
        GROUND,
        Footprint::Rect {
            width: columns,
            length: 1,
            marker: Marker::new('_'),
        },
    )
    .with_collider(ColliderSpec::Stop)];

    let sky = (floor_row / 2).max(1);
    for column in 0..columns {
        if !rng.gen_bool(0.4) {
            continue;
        }
        let row = rng.gen_range(0..sky).min(floor_row.saturating_sub(1));
        scene.push(
            ObjectBlueprint::point(CellCoord::new(column, row), GROUND, '*')
                .with_modifier(ModifierSpec::Acceleration { ddx: 0, ddy: 1 })
                .with_modifier(ModifierSpec::SpeedLimit { max: 1 })
                .with_collider(ColliderSpec::Stop)
                .with_period(rng.gen_range(0..3)),
        );
    }
    scene
}

fn billiards(rng: &mut ChaCha8Rng, columns: u32, rows: u32) -> Vec<ObjectBlueprint> {
    let count = (columns.saturating_mul(rows) / 40).clamp(1, 16);
    let mut scene = Vec::new();
    for index in 0..count {
        let velocity = Velocity::new(rng.gen_range(-1..=1), rng.gen_range(-1..=1));
        let glyph = char::from(b'a' + (index % 26) as u8);
        scene.push(
            ObjectBlueprint::point(
                CellCoord::new(rng.gen_range(0..columns), rng.gen_range(0..rows)),
                GROUND,
                glyph,
            )
            .with_velocity(velocity)
            .with_collider(ColliderSpec::Bounce),
        );
    }
    scene
}

fn siege(columns: u32, rows: u32) -> Vec<ObjectBlueprint> {
    let wall_column = columns * 2 / 3;
    let mut scene = vec![ObjectBlueprint::new(
        CellCoord::new(wall_column, 0),
        GROUND,
        Footprint::Rect {
            width: 2,
            length: rows,
            marker: Marker::new('#'),
        },
    )
    .with_collider(ColliderSpec::Damage)];

    for row in (0..rows).step_by(2) {
        scene.push(
            ObjectBlueprint::point(CellCoord::new(0, row), GROUND, '>')
                .with_velocity(Velocity::new(1, 0))
                .with_collider(ColliderSpec::TerminalStop)
                .with_period(row % 3),
        );
    }
    scene
}

use cellbound_core::{
    CellCoord, ColliderSpec, Command, Event, Footprint, Height, ModifierSpec, ObjectBlueprint,
    ObjectId, QueryError, Velocity,
};
use cellbound_system_motion::Collider;
use cellbound_world::{self as world, query, World};

const GROUND: Height = Height::new(0);

fn configured(columns: u32, rows: u32) -> World {
    let mut world = World::new();
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::ConfigureGrid { columns, rows },
        &mut events,
    );
    world
}

fn spawn(world: &mut World, blueprint: ObjectBlueprint) -> ObjectId {
    let mut events = Vec::new();
    world::apply(world, Command::Spawn { blueprint }, &mut events);
    match events.as_slice() {
        [Event::ObjectSpawned { object, .. }] => *object,
        other => panic!("unexpected spawn events: {other:?}"),
    }
}

fn tick(world: &mut World) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(world, Command::Tick, &mut events);
    events
}

fn anchor_of(world: &World, object: ObjectId) -> CellCoord {
    query::object(world, object)
        .expect("object should exist")
        .anchor
}

fn assert_occupancy_consistent(world: &World) {
    let grid = query::grid(world);
    for snapshot in query::object_view(world).iter() {
        let mut cached = snapshot.cells.clone();
        cached.sort_by_key(|cell| (cell.row(), cell.column()));
        assert_eq!(
            cached,
            grid.cells_of(snapshot.id),
            "grid and shape disagree for object {}",
            snapshot.id.get()
        );
    }
}

fn assert_shapes_normalized(world: &World) {
    for snapshot in query::object_view(world).iter() {
        if snapshot.cells.is_empty() {
            continue;
        }
        let min_column = snapshot.cells.iter().map(CellCoord::column).min();
        let min_row = snapshot.cells.iter().map(CellCoord::row).min();
        assert_eq!(min_column, Some(snapshot.anchor.column()));
        assert_eq!(min_row, Some(snapshot.anchor.row()));
    }
}

#[test]
fn unobstructed_point_moves_by_its_velocity() {
    let mut world = configured(10, 10);
    let mover = spawn(
        &mut world,
        ObjectBlueprint::point(CellCoord::new(5, 5), GROUND, 'X').with_velocity(Velocity::new(1, 0)),
    );

    let events = tick(&mut world);

    assert!(events.contains(&Event::ObjectMoved {
        object: mover,
        from: CellCoord::new(5, 5),
        to: CellCoord::new(6, 5),
    }));
    let grid = query::grid(&world);
    assert!(grid.contains(CellCoord::new(6, 5), mover));
    assert!(!grid.contains(CellCoord::new(5, 5), mover));
    assert_eq!(
        query::marker_at(&world, mover, CellCoord::new(6, 5)).map(|marker| marker.glyph()),
        Ok('X')
    );
}

#[test]
fn stop_collider_halts_before_an_occupied_cell() {
    let mut world = configured(10, 10);
    let mover = spawn(
        &mut world,
        ObjectBlueprint::point(CellCoord::new(5, 5), GROUND, 'A')
            .with_velocity(Velocity::new(1, 0))
            .with_collider(ColliderSpec::Stop),
    );
    let blocker = spawn(
        &mut world,
        ObjectBlueprint::point(CellCoord::new(6, 5), GROUND, 'B').with_collider(ColliderSpec::Stop),
    );

    let events = tick(&mut world);

    assert!(events.contains(&Event::ObjectsCollided {
        object: mover,
        other: blocker,
        cell: CellCoord::new(6, 5),
    }));
    assert_eq!(anchor_of(&world, mover), CellCoord::new(5, 5));
    assert_eq!(
        query::object(&world, mover).map(|snapshot| snapshot.velocity),
        Some(Velocity::ZERO)
    );

    let hits = |object| {
        query::game_object(&world, object)
            .map(|object| object.colliders().iter().map(Collider::hits).sum::<usize>())
    };
    assert_eq!(hits(mover), Some(1));
    assert_eq!(hits(blocker), Some(1));
    assert_occupancy_consistent(&world);
}

#[test]
fn objects_on_other_layers_pass_through() {
    let mut world = configured(10, 10);
    let mover = spawn(
        &mut world,
        ObjectBlueprint::point(CellCoord::new(5, 5), GROUND, 'A')
            .with_velocity(Velocity::new(1, 0))
            .with_collider(ColliderSpec::Stop),
    );
    let _ = spawn(
        &mut world,
        ObjectBlueprint::point(CellCoord::new(6, 5), Height::new(1), 'B'),
    );

    let events = tick(&mut world);

    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::ObjectsCollided { .. })));
    assert_eq!(anchor_of(&world, mover), CellCoord::new(6, 5));
    assert_eq!(query::glyph_at(&world, CellCoord::new(6, 5)), Some('B'));
    assert_occupancy_consistent(&world);
}

#[test]
fn struck_object_losing_its_only_cell_is_destroyed_in_the_same_tick() {
    let mut world = configured(10, 10);
    let mover = spawn(
        &mut world,
        ObjectBlueprint::point(CellCoord::new(5, 5), GROUND, 'A').with_velocity(Velocity::new(1, 0)),
    );
    let target = spawn(
        &mut world,
        ObjectBlueprint::point(CellCoord::new(6, 5), GROUND, 'B').with_collider(ColliderSpec::Damage),
    );

    let events = tick(&mut world);

    let snapshot = query::object(&world, target).expect("target still held until reaped");
    assert_eq!(snapshot.height, Height::REMOVED);
    assert!(snapshot.cells.is_empty());
    assert!(!snapshot.in_play);
    assert!(!query::is_scheduled(&world, target));
    assert!(query::grid(&world).cells_of(target).is_empty());
    assert!(events.contains(&Event::ObjectIgnored { object: target }));
    assert!(events.contains(&Event::StopColliderInstalled { object: target }));
    assert!(matches!(
        query::game_object(&world, target).and_then(|object| object.colliders().last()),
        Some(Collider::Stop { terminal: false, .. })
    ));

    assert_eq!(anchor_of(&world, mover), CellCoord::new(6, 5));
    assert_occupancy_consistent(&world);
}

#[test]
fn mover_with_damage_collider_is_eroded_at_its_source_cell() {
    let mut world = configured(10, 10);
    let mover = spawn(
        &mut world,
        ObjectBlueprint::point(CellCoord::new(5, 5), GROUND, 'A')
            .with_velocity(Velocity::new(1, 0))
            .with_collider(ColliderSpec::Damage),
    );
    let wall = spawn(
        &mut world,
        ObjectBlueprint::point(CellCoord::new(6, 5), GROUND, '#'),
    );

    let events = tick(&mut world);

    let snapshot = query::object(&world, mover).expect("mover still held until reaped");
    assert_eq!(snapshot.height, Height::REMOVED);
    assert_eq!(snapshot.velocity, Velocity::ZERO);
    assert!(events.contains(&Event::ObjectIgnored { object: mover }));
    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::ObjectMoved { .. })));
    assert_eq!(anchor_of(&world, wall), CellCoord::new(6, 5));
    assert_occupancy_consistent(&world);
}

#[test]
fn boundary_triggers_self_collision_without_touching_the_grid() {
    let mut world = configured(10, 10);
    let corner = spawn(
        &mut world,
        ObjectBlueprint::point(CellCoord::new(0, 0), GROUND, 'C')
            .with_velocity(Velocity::new(0, -1))
            .with_collider(ColliderSpec::Stop),
    );
    let grid_before = query::grid(&world).clone();

    let events = tick(&mut world);

    assert!(events.contains(&Event::BoundaryReached {
        object: corner,
        cell: CellCoord::new(0, 0),
    }));
    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::ObjectMoved { .. })));
    assert_eq!(anchor_of(&world, corner), CellCoord::new(0, 0));
    assert_eq!(query::grid(&world), &grid_before);
    assert_eq!(
        query::object(&world, corner).map(|snapshot| snapshot.velocity),
        Some(Velocity::ZERO)
    );
}

#[test]
fn boundary_ends_the_scan_before_later_cells_collide() {
    let mut world = configured(10, 10);
    let bar = spawn(
        &mut world,
        ObjectBlueprint::new(
            CellCoord::new(0, 0),
            GROUND,
            Footprint::Rect {
                width: 2,
                length: 1,
                marker: cellbound_core::Marker::new('='),
            },
        )
        .with_velocity(Velocity::new(-1, 1))
        .with_collider(ColliderSpec::Stop),
    );
    // The right half of the bar would land here if the scan went on.
    let bystander = spawn(
        &mut world,
        ObjectBlueprint::point(CellCoord::new(0, 1), GROUND, 'o').with_collider(ColliderSpec::Stop),
    );

    let events = tick(&mut world);

    assert!(events.contains(&Event::BoundaryReached {
        object: bar,
        cell: CellCoord::new(0, 0),
    }));
    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::ObjectsCollided { .. })));

    let hits = |object| {
        query::game_object(&world, object)
            .map(|object| object.colliders().iter().map(Collider::hits).sum::<usize>())
    };
    assert_eq!(hits(bar), Some(1));
    assert_eq!(hits(bystander), Some(0));
    assert_eq!(anchor_of(&world, bar), CellCoord::new(0, 0));
    assert_eq!(anchor_of(&world, bystander), CellCoord::new(0, 1));
    assert_occupancy_consistent(&world);
}

#[test]
fn position_never_passes_the_far_edge() {
    let mut world = configured(6, 3);
    let racer = spawn(
        &mut world,
        ObjectBlueprint::new(
            CellCoord::new(0, 1),
            GROUND,
            Footprint::Rect {
                width: 2,
                length: 1,
                marker: cellbound_core::Marker::new('='),
            },
        )
        .with_modifier(ModifierSpec::Acceleration { ddx: 1, ddy: 0 })
        .with_collider(ColliderSpec::Stop),
    );

    for _ in 0..8 {
        let _ = tick(&mut world);
        let snapshot = query::object(&world, racer).expect("racer exists");
        assert!(snapshot.cells.iter().all(|cell| cell.column() < 6));
        assert_occupancy_consistent(&world);
    }
    assert!(anchor_of(&world, racer).column() <= 4);
}

#[test]
fn destroying_twice_matches_destroying_once() {
    let mut once = configured(5, 5);
    let mut twice = configured(5, 5);
    for target in [&mut once, &mut twice] {
        let _ = spawn(
            target,
            ObjectBlueprint::point(CellCoord::new(1, 1), GROUND, 'o'),
        );
    }
    let id = ObjectId::new(0);

    let mut once_events = Vec::new();
    world::apply(&mut once, Command::SelfDestruct { object: id }, &mut once_events);

    let mut twice_events = Vec::new();
    world::apply(&mut twice, Command::SelfDestruct { object: id }, &mut twice_events);
    world::apply(&mut twice, Command::SelfDestruct { object: id }, &mut twice_events);

    assert_eq!(once_events, vec![Event::ObjectIgnored { object: id }]);
    assert_eq!(once_events, twice_events);
    assert_eq!(
        query::object_view(&once).into_vec(),
        query::object_view(&twice).into_vec()
    );
    assert_eq!(query::grid(&once), query::grid(&twice));
    assert!(!query::is_scheduled(&twice, id));
}

#[test]
fn throttled_object_moves_once_every_period_plus_one_ticks() {
    let mut world = configured(20, 1);
    let period = 2;
    let slow = spawn(
        &mut world,
        ObjectBlueprint::point(CellCoord::new(0, 0), GROUND, 's')
            .with_velocity(Velocity::new(1, 0))
            .with_period(period),
    );

    let mut moved_on = Vec::new();
    for tick_number in 1..=9 {
        let events = tick(&mut world);
        if events
            .iter()
            .any(|event| matches!(event, Event::ObjectMoved { object, .. } if *object == slow))
        {
            moved_on.push(tick_number);
        }
    }

    assert_eq!(moved_on, vec![3, 6, 9]);
    assert_eq!(anchor_of(&world, slow), CellCoord::new(3, 0));
}

#[test]
fn set_period_restarts_the_countdown() {
    let mut world = configured(20, 1);
    let object = spawn(
        &mut world,
        ObjectBlueprint::point(CellCoord::new(0, 0), GROUND, 's').with_velocity(Velocity::new(1, 0)),
    );
    let mut events = Vec::new();
    world::apply(&mut world, Command::SetPeriod { object, period: 1 }, &mut events);

    let _ = tick(&mut world);
    assert_eq!(anchor_of(&world, object), CellCoord::new(0, 0));
    let _ = tick(&mut world);
    assert_eq!(anchor_of(&world, object), CellCoord::new(1, 0));
}

#[test]
fn partial_damage_reindexes_without_moving_cells() {
    let mut world = configured(8, 6);
    let wall = spawn(
        &mut world,
        ObjectBlueprint::new(
            CellCoord::new(1, 2),
            GROUND,
            Footprint::Rect {
                width: 3,
                length: 1,
                marker: cellbound_core::Marker::new('#'),
            },
        )
        .with_collider(ColliderSpec::Damage),
    );
    let shot = spawn(
        &mut world,
        ObjectBlueprint::point(CellCoord::new(1, 1), GROUND, '|')
            .with_velocity(Velocity::new(0, 1))
            .with_collider(ColliderSpec::TerminalStop),
    );

    let events = tick(&mut world);

    let snapshot = query::object(&world, wall).expect("wall exists");
    assert_eq!(snapshot.anchor, CellCoord::new(2, 2));
    assert_eq!(snapshot.cells, vec![CellCoord::new(2, 2), CellCoord::new(3, 2)]);
    assert_eq!(snapshot.size, cellbound_core::CellRectSize::new(2, 1));
    assert!(snapshot.in_play);
    assert_eq!(
        query::marker_at(&world, wall, CellCoord::new(1, 2)),
        Err(QueryError::NotOccupied {
            cell: CellCoord::new(1, 2)
        })
    );

    assert!(events.contains(&Event::ObjectIgnored { object: shot }));
    assert!(!events.contains(&Event::StopColliderInstalled { object: shot }));
    assert!(query::grid(&world).cells_of(shot).is_empty());
    assert_occupancy_consistent(&world);
    assert_shapes_normalized(&world);
}

#[test]
fn first_mover_claims_the_contested_cell() {
    let run = |left_first: bool| {
        let mut world = configured(7, 1);
        let left = ObjectBlueprint::point(CellCoord::new(2, 0), GROUND, 'L')
            .with_velocity(Velocity::new(1, 0))
            .with_collider(ColliderSpec::Stop);
        let right = ObjectBlueprint::point(CellCoord::new(4, 0), GROUND, 'R')
            .with_velocity(Velocity::new(-1, 0))
            .with_collider(ColliderSpec::Stop);
        let (left, right) = if left_first {
            let left = spawn(&mut world, left);
            (left, spawn(&mut world, right))
        } else {
            let right = spawn(&mut world, right);
            (spawn(&mut world, left), right)
        };
        let _ = tick(&mut world);
        (anchor_of(&world, left), anchor_of(&world, right))
    };

    assert_eq!(run(true), (CellCoord::new(3, 0), CellCoord::new(4, 0)));
    assert_eq!(run(false), (CellCoord::new(2, 0), CellCoord::new(3, 0)));
}

#[test]
fn colliders_are_reset_at_the_start_of_every_tick() {
    let mut world = configured(5, 5);
    let pusher = spawn(
        &mut world,
        ObjectBlueprint::point(CellCoord::new(1, 1), GROUND, 'p')
            .with_modifier(ModifierSpec::Acceleration { ddx: 1, ddy: 0 })
            .with_modifier(ModifierSpec::SpeedLimit { max: 1 })
            .with_collider(ColliderSpec::Stop),
    );
    let _ = spawn(
        &mut world,
        ObjectBlueprint::point(CellCoord::new(2, 1), GROUND, 'w'),
    );
    let hits = |world: &World| {
        query::game_object(world, pusher)
            .map(|object| object.colliders().iter().map(Collider::hits).sum::<usize>())
    };

    for _ in 0..3 {
        let _ = tick(&mut world);
        assert_eq!(hits(&world), Some(1));
    }
    assert_eq!(anchor_of(&world, pusher), CellCoord::new(1, 1));

    let mut events = Vec::new();
    world::apply(&mut world, Command::ResetColliders, &mut events);
    assert_eq!(hits(&world), Some(0));
}

#[test]
fn falling_objects_settle_on_the_floor() {
    let mut world = configured(10, 6);
    let _ = spawn(
        &mut world,
        ObjectBlueprint::new(
            CellCoord::new(0, 5),
            GROUND,
            Footprint::Rect {
                width: 10,
                length: 1,
                marker: cellbound_core::Marker::new('_'),
            },
        )
        .with_collider(ColliderSpec::Stop),
    );
    let drops: Vec<ObjectId> = (0..5)
        .map(|index| {
            spawn(
                &mut world,
                ObjectBlueprint::point(CellCoord::new(index * 2, index % 3), GROUND, '*')
                    .with_modifier(ModifierSpec::Acceleration { ddx: 0, ddy: 1 })
                    .with_modifier(ModifierSpec::SpeedLimit { max: 1 })
                    .with_collider(ColliderSpec::Stop)
                    .with_period(index % 2),
            )
        })
        .collect();

    for _ in 0..20 {
        let _ = tick(&mut world);
        assert_occupancy_consistent(&world);
        assert_shapes_normalized(&world);
    }

    for drop in drops {
        assert_eq!(anchor_of(&world, drop).row(), 4);
    }
}

#[test]
fn clearing_modifiers_stops_acceleration() {
    let mut world = configured(20, 1);
    let object = spawn(
        &mut world,
        ObjectBlueprint::point(CellCoord::new(0, 0), GROUND, 'a')
            .with_modifier(ModifierSpec::Acceleration { ddx: 1, ddy: 0 }),
    );

    let _ = tick(&mut world);
    let mut events = Vec::new();
    world::apply(&mut world, Command::ClearModifiers { object }, &mut events);
    let _ = tick(&mut world);
    let _ = tick(&mut world);

    assert_eq!(anchor_of(&world, object), CellCoord::new(3, 0));
    assert_eq!(
        query::object(&world, object).map(|snapshot| snapshot.velocity),
        Some(Velocity::new(1, 0))
    );
}

#[test]
fn added_modifier_applies_after_existing_ones() {
    let mut world = configured(20, 1);
    let object = spawn(
        &mut world,
        ObjectBlueprint::point(CellCoord::new(0, 0), GROUND, 'a')
            .with_modifier(ModifierSpec::Acceleration { ddx: 3, ddy: 0 }),
    );
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::AddModifier {
            object,
            modifier: ModifierSpec::SpeedLimit { max: 1 },
        },
        &mut events,
    );

    let _ = tick(&mut world);
    assert_eq!(anchor_of(&world, object), CellCoord::new(1, 0));
}

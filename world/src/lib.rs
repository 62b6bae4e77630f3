#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Cellbound.
//!
//! The world owns the grid, every game object and the schedule of objects
//! that are still driven. It advances objects one at a time in ascending
//! identifier order, so repeated runs resolve collisions identically.

use std::collections::BTreeSet;

use cellbound_core::{Command, Event, Grid, ObjectBlueprint, ObjectId, Registry};
use cellbound_system_motion::{Collider, GameObject, Modifier, Objects, TickContext};

const DEFAULT_GRID_COLUMNS: u32 = 80;
const DEFAULT_GRID_ROWS: u32 = 24;

/// Represents the authoritative Cellbound world state.
#[derive(Debug)]
pub struct World {
    grid: Grid,
    objects: Objects,
    schedule: Schedule,
    next_object: u32,
    tick_index: u64,
}

impl World {
    /// Creates an empty world with the default grid dimensions.
    #[must_use]
    pub fn new() -> Self {
        Self {
            grid: Grid::new(DEFAULT_GRID_COLUMNS, DEFAULT_GRID_ROWS),
            objects: Objects::new(),
            schedule: Schedule::default(),
            next_object: 0,
            tick_index: 0,
        }
    }

    fn spawn(&mut self, blueprint: &ObjectBlueprint, out_events: &mut Vec<Event>) {
        let id = ObjectId::new(self.next_object);
        let placed = GameObject::from_blueprint(id, blueprint, &self.grid)
            .and_then(|object| object.register(&mut self.grid).map(|()| object));
        let object = match placed {
            Ok(object) => object,
            Err(reason) => {
                log::debug!("spawn rejected: {reason}");
                out_events.push(Event::SpawnRejected { reason });
                return;
            }
        };

        self.next_object = self.next_object.saturating_add(1);
        let _ = self.schedule.active.insert(id);
        out_events.push(Event::ObjectSpawned {
            object: id,
            anchor: object.body().anchor(),
            height: object.body().height(),
        });
        let _ = self.objects.insert(id, object);
    }

    fn tick(&mut self, out_events: &mut Vec<Event>) {
        self.tick_index = self.tick_index.saturating_add(1);
        out_events.push(Event::TimeAdvanced {
            tick: self.tick_index,
        });

        for id in &self.schedule.active {
            if let Some(object) = self.objects.get_mut(id) {
                object.reset_colliders();
            }
        }

        let order: Vec<ObjectId> = self.schedule.active.iter().copied().collect();
        for id in order {
            if !self.schedule.active.contains(&id) {
                continue;
            }
            let Some(mut object) = self.objects.remove(&id) else {
                continue;
            };

            let mut ctx = TickContext {
                grid: &mut self.grid,
                registry: &mut self.schedule,
            };
            let outcome = object.advance(&mut ctx, &mut self.objects, out_events);
            log::trace!("tick {}: object {} {outcome:?}", self.tick_index, id.get());

            let _ = self.objects.insert(id, object);
            self.flush_schedule(out_events);
        }
    }

    fn self_destruct(&mut self, id: ObjectId, out_events: &mut Vec<Event>) {
        let Some(object) = self.objects.get_mut(&id) else {
            out_events.push(Event::UnknownObject { object: id });
            return;
        };

        let mut ctx = TickContext {
            grid: &mut self.grid,
            registry: &mut self.schedule,
        };
        if !object.self_destruct(&mut ctx) {
            log::debug!("object {} was already destroyed", id.get());
        }
        self.flush_schedule(out_events);
    }

    fn reap(&mut self, out_events: &mut Vec<Event>) {
        let reaped: Vec<ObjectId> = self
            .objects
            .values()
            .filter(|object| !object.body().in_play())
            .map(GameObject::id)
            .collect();
        for id in reaped {
            let _ = self.objects.remove(&id);
            out_events.push(Event::ObjectReaped { object: id });
        }
    }

    fn object_mut(&mut self, id: ObjectId, out_events: &mut Vec<Event>) -> Option<&mut GameObject> {
        let object = self.objects.get_mut(&id);
        if object.is_none() {
            out_events.push(Event::UnknownObject { object: id });
        }
        object
    }

    /// Applies registry requests raised while objects were being driven.
    fn flush_schedule(&mut self, out_events: &mut Vec<Event>) {
        for id in self.schedule.pending_stops.drain(..) {
            if let Some(object) = self.objects.get_mut(&id) {
                object.add_collider(Collider::stop());
                out_events.push(Event::StopColliderInstalled { object: id });
            }
        }
        out_events.append(&mut self.schedule.notices);
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureGrid { columns, rows } => {
            world.grid = Grid::new(columns, rows);
            world.objects.clear();
            world.schedule = Schedule::default();
            out_events.push(Event::GridConfigured { columns, rows });
        }
        Command::Spawn { blueprint } => world.spawn(&blueprint, out_events),
        Command::Tick => world.tick(out_events),
        Command::ResetColliders => {
            for object in world.objects.values_mut() {
                object.reset_colliders();
            }
        }
        Command::SelfDestruct { object } => world.self_destruct(object, out_events),
        Command::SetVelocity { object, velocity } => {
            if let Some(object) = world.object_mut(object, out_events) {
                object.set_velocity(velocity);
            }
        }
        Command::SetPeriod { object, period } => {
            if let Some(object) = world.object_mut(object, out_events) {
                object.set_period(period);
            }
        }
        Command::AddModifier { object, modifier } => {
            if let Some(object) = world.object_mut(object, out_events) {
                object.add_modifier(Modifier::from(modifier));
            }
        }
        Command::ClearModifiers { object } => {
            if let Some(object) = world.object_mut(object, out_events) {
                object.clear_modifiers();
            }
        }
        Command::AddCollider { object, collider } => {
            if let Some(object) = world.object_mut(object, out_events) {
                object.add_collider(Collider::from(collider));
            }
        }
        Command::Reap => world.reap(out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use cellbound_core::{
        CellCoord, Grid, Height, Marker, ObjectId, ObjectSnapshot, ObjectView, QueryError,
    };
    use cellbound_system_motion::GameObject;

    use super::World;

    /// Provides read-only access to the shared grid.
    #[must_use]
    pub fn grid(world: &World) -> &Grid {
        &world.grid
    }

    /// Number of ticks processed so far.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Provides read-only access to a single object.
    #[must_use]
    pub fn game_object(world: &World, object: ObjectId) -> Option<&GameObject> {
        world.objects.get(&object)
    }

    /// Captures the state of a single object.
    #[must_use]
    pub fn object(world: &World, object: ObjectId) -> Option<ObjectSnapshot> {
        world.objects.get(&object).map(GameObject::snapshot)
    }

    /// Captures a read-only view of every object the world still holds.
    #[must_use]
    pub fn object_view(world: &World) -> ObjectView {
        ObjectView::from_snapshots(world.objects.values().map(GameObject::snapshot).collect())
    }

    /// Reports whether the object is still driven by ticks.
    #[must_use]
    pub fn is_scheduled(world: &World, object: ObjectId) -> bool {
        world.schedule.active.contains(&object)
    }

    /// Marker an object draws at a world cell.
    ///
    /// Unknown objects cover no cells, so they report
    /// [`QueryError::NotOccupied`] too.
    pub fn marker_at(world: &World, object: ObjectId, cell: CellCoord) -> Result<Marker, QueryError> {
        world
            .objects
            .get(&object)
            .ok_or(QueryError::NotOccupied { cell })
            .and_then(|object| object.marker_at(cell))
    }

    /// Objects covering a cell on the provided layer.
    #[must_use]
    pub fn occupants(world: &World, cell: CellCoord, height: Height) -> Vec<ObjectId> {
        world.grid.objects_at_height(cell, height)
    }

    /// Glyph of the topmost object covering a cell.
    #[must_use]
    pub fn glyph_at(world: &World, cell: CellCoord) -> Option<char> {
        let topmost = world.grid.cell(cell)?.topmost()?;
        world
            .objects
            .get(&topmost)
            .and_then(|object| object.marker_at(cell).ok())
            .map(|marker| marker.glyph())
    }
}

/// Registry of objects that are still driven each tick.
#[derive(Debug, Default)]
struct Schedule {
    active: BTreeSet<ObjectId>,
    pending_stops: Vec<ObjectId>,
    notices: Vec<Event>,
}

impl Registry for Schedule {
    fn ignore(&mut self, object: ObjectId) {
        if self.active.remove(&object) {
            self.notices.push(Event::ObjectIgnored { object });
        }
    }

    fn create_stop_collider(&mut self, object: ObjectId) {
        self.pending_stops.push(object);
    }
}

#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Per-object movement and collision pipeline.
//!
//! Every tick the driver calls [`GameObject::advance`] once per scheduled
//! object. The object consumes a throttle tick, lets its modifiers rewrite
//! its velocity, scans the destination of every covered cell for occupants on
//! its layer, lets the colliders of both parties respond, and finally lifts
//! itself out of its old cells and drops into the new ones.
//!
//! Objects move one after another in the order the driver chooses. In a
//! mutual collision the first mover resolves against a stationary opponent,
//! so the outcome depends on that order.

mod body;
mod collider;
mod modifier;
mod shape;
mod throttle;

use std::collections::BTreeMap;

pub use body::Body;
pub use collider::Collider;
pub use modifier::Modifier;
pub use shape::Shape;
pub use throttle::Throttle;

use cellbound_core::{
    CellCoord, Event, Footprint, Grid, Height, Marker, ObjectBlueprint, ObjectId,
    ObjectSnapshot, QueryError, Registry, SpawnError, Velocity,
};

/// Objects other than the one currently moving, keyed by identifier.
pub type Objects = BTreeMap<ObjectId, GameObject>;

/// Services an object may use while it is being advanced.
pub struct TickContext<'a> {
    /// Shared occupancy grid.
    pub grid: &'a mut Grid,
    /// Registry deciding which objects are driven.
    pub registry: &'a mut dyn Registry,
}

/// Result of a single call to [`GameObject::advance`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// The object is out of play; nothing happened.
    Inactive,
    /// The throttle skipped this tick.
    Throttled,
    /// The pipeline ran but the anchor did not change.
    Stayed,
    /// The object committed a move.
    Moved {
        /// Anchor before the move.
        from: CellCoord,
        /// Anchor after the move.
        to: CellCoord,
    },
}

/// A shaped, moving participant of the simulation.
#[derive(Clone, Debug)]
pub struct GameObject {
    body: Body,
    throttle: Throttle,
    modifiers: Vec<Modifier>,
    colliders: Vec<Collider>,
}

impl GameObject {
    /// Builds a stationary object from a footprint requested at `anchor`.
    ///
    /// The object is not registered into the grid; see [`GameObject::register`].
    pub fn new(
        id: ObjectId,
        anchor: CellCoord,
        height: Height,
        footprint: &Footprint,
    ) -> Result<Self, SpawnError> {
        let (shape, anchor) = Shape::from_footprint(footprint, anchor)?;
        Ok(Self {
            body: Body::new(id, anchor, height, shape),
            throttle: Throttle::default(),
            modifiers: Vec::new(),
            colliders: Vec::new(),
        })
    }

    /// Builds a single-cell object.
    #[must_use]
    pub fn point(id: ObjectId, anchor: CellCoord, height: Height, marker: Marker) -> Self {
        Self {
            body: Body::new(id, anchor, height, Shape::point(marker)),
            throttle: Throttle::default(),
            modifiers: Vec::new(),
            colliders: Vec::new(),
        }
    }

    /// Builds an object from a blueprint, rejecting footprints that do not
    /// fit inside `grid`.
    pub fn from_blueprint(
        id: ObjectId,
        blueprint: &ObjectBlueprint,
        grid: &Grid,
    ) -> Result<Self, SpawnError> {
        if blueprint.height.is_removed() {
            return Err(SpawnError::ReservedHeight);
        }

        if let Footprint::Rect { width, length, .. } = blueprint.footprint {
            let (columns, rows) = grid.dimensions();
            let fits = |start: u32, extent: u32, limit: u32| {
                extent == 0 || start.checked_add(extent).is_some_and(|end| end <= limit)
            };
            if !fits(blueprint.anchor.column(), width, columns)
                || !fits(blueprint.anchor.row(), length, rows)
            {
                return Err(SpawnError::OutOfBounds);
            }
        }

        let mut object = Self::new(id, blueprint.anchor, blueprint.height, &blueprint.footprint)?;
        if !object.body.fits(grid) {
            return Err(SpawnError::OutOfBounds);
        }

        object.body.set_velocity(blueprint.velocity);
        object.throttle = Throttle::new(blueprint.period);
        object.modifiers = blueprint.modifiers.iter().copied().map(Modifier::from).collect();
        object.colliders = blueprint.colliders.iter().copied().map(Collider::from).collect();
        Ok(object)
    }

    /// Identifier of the object.
    #[must_use]
    pub const fn id(&self) -> ObjectId {
        self.body.id()
    }

    /// Spatial state of the object.
    #[must_use]
    pub const fn body(&self) -> &Body {
        &self.body
    }

    /// Throttle gating the object's moves.
    #[must_use]
    pub const fn throttle(&self) -> &Throttle {
        &self.throttle
    }

    /// Installed modifiers in application order.
    #[must_use]
    pub fn modifiers(&self) -> &[Modifier] {
        &self.modifiers
    }

    /// Installed colliders in registration order.
    #[must_use]
    pub fn colliders(&self) -> &[Collider] {
        &self.colliders
    }

    /// Replaces the pending velocity.
    pub fn set_velocity(&mut self, velocity: Velocity) {
        self.body.set_velocity(velocity);
    }

    /// Replaces the move period and restarts the throttle countdown.
    pub fn set_period(&mut self, period: u32) {
        self.throttle.set_period(period);
    }

    /// Appends a modifier, applied after the ones already installed.
    pub fn add_modifier(&mut self, modifier: Modifier) {
        self.modifiers.push(modifier);
    }

    /// Drops every modifier.
    pub fn clear_modifiers(&mut self) {
        self.modifiers.clear();
    }

    /// Appends a collider.
    pub fn add_collider(&mut self, collider: Collider) {
        self.colliders.push(collider);
    }

    /// Marker drawn at a world cell.
    pub fn marker_at(&self, cell: CellCoord) -> Result<Marker, QueryError> {
        self.body.marker_at(cell)
    }

    /// Records the object in every cell it covers.
    ///
    /// Nothing is recorded when any covered cell lies outside the grid.
    pub fn register(&self, grid: &mut Grid) -> Result<(), SpawnError> {
        if !self.body.fits(grid) {
            return Err(SpawnError::OutOfBounds);
        }
        self.body.register(grid);
        Ok(())
    }

    /// Clears the per-tick state of every collider.
    pub fn reset_colliders(&mut self) {
        for collider in &mut self.colliders {
            collider.reset_collision();
        }
    }

    /// Forces full removal. Returns `false` when already destroyed.
    pub fn self_destruct(&mut self, ctx: &mut TickContext<'_>) -> bool {
        self.body.destroy(ctx.grid, ctx.registry)
    }

    /// Captures the object's current state.
    #[must_use]
    pub fn snapshot(&self) -> ObjectSnapshot {
        ObjectSnapshot {
            id: self.body.id(),
            anchor: self.body.anchor(),
            height: self.body.height(),
            velocity: self.body.velocity(),
            cells: self.body.occupied_cells().to_vec(),
            size: self.body.size(),
            in_play: self.body.in_play(),
        }
    }

    /// Advances the object by one tick.
    ///
    /// `others` must hold every object the grid may report as an occupant,
    /// except this one.
    pub fn advance(
        &mut self,
        ctx: &mut TickContext<'_>,
        others: &mut Objects,
        out_events: &mut Vec<Event>,
    ) -> TickOutcome {
        if !self.body.in_play() {
            return TickOutcome::Inactive;
        }

        if !self.throttle.ready() {
            return TickOutcome::Throttled;
        }

        self.apply_modifiers();
        self.compute_collisions(ctx, others, out_events);
        let moved = self.move_coords(ctx);

        if self.body.shape().is_empty() && self.body.retire(ctx.grid, ctx.registry) {
            log::debug!("object {} ran out of cells", self.id().get());
        }

        debug_assert!(
            self.body.matches_grid(ctx.grid),
            "occupied cells of object {} diverged from the grid",
            self.id().get()
        );

        match moved {
            Some((from, to)) => {
                out_events.push(Event::ObjectMoved {
                    object: self.id(),
                    from,
                    to,
                });
                TickOutcome::Moved { from, to }
            }
            None => TickOutcome::Stayed,
        }
    }

    fn apply_modifiers(&mut self) {
        let mut velocity = self.body.velocity();
        for modifier in &self.modifiers {
            modifier.apply(&mut velocity);
        }
        self.body.set_velocity(velocity);
    }

    fn run_self_collision(&mut self, ctx: &mut TickContext<'_>) {
        for collider in &mut self.colliders {
            collider.run_collision(&mut self.body, ctx);
        }
    }

    fn damage_collide(&mut self, cell: CellCoord, ctx: &mut TickContext<'_>) {
        for collider in &mut self.colliders {
            collider.collide(&mut self.body, cell, ctx);
        }
    }

    /// Resolves every collision the pending velocity would cause.
    ///
    /// The velocity is re-read for each covered cell, so a response to an
    /// earlier cell changes the destinations of the later ones. Occupants are
    /// damaged at the destination cell, where they are; the mover is damaged
    /// at its own source cell because its anchor has not moved yet.
    fn compute_collisions(
        &mut self,
        ctx: &mut TickContext<'_>,
        others: &mut Objects,
        out_events: &mut Vec<Event>,
    ) {
        let id = self.id();
        let sources = self.body.occupied_cells().to_vec();

        for source in sources {
            if !self.body.in_play() {
                break;
            }
            if !self.body.occupies(source) {
                continue;
            }

            let destination = match ctx.grid.translate(source, self.body.velocity()) {
                Ok(destination) => destination,
                Err(error) => {
                    log::trace!("object {}: {error}", id.get());
                    out_events.push(Event::BoundaryReached {
                        object: id,
                        cell: source,
                    });
                    self.run_self_collision(ctx);
                    break;
                }
            };

            if ctx.grid.contains(destination, id) {
                continue;
            }

            let occupants = ctx.grid.objects_at_height(destination, self.body.height());
            if occupants.is_empty() {
                continue;
            }

            for other_id in occupants {
                let Some(other) = others.get_mut(&other_id) else {
                    continue;
                };
                out_events.push(Event::ObjectsCollided {
                    object: id,
                    other: other_id,
                    cell: destination,
                });
                other.run_self_collision(ctx);
                other.damage_collide(destination, ctx);
            }

            self.run_self_collision(ctx);
            self.damage_collide(source, ctx);
        }

        self.body.recompute_occupancy();
    }

    /// Lifts the object out of its cells and drops it into the destination
    /// cells. Refuses to commit a move that would leave the grid.
    fn move_coords(&mut self, ctx: &mut TickContext<'_>) -> Option<(CellCoord, CellCoord)> {
        let velocity = self.body.velocity();
        if !self.body.in_play() || self.body.shape().is_empty() || velocity.is_zero() {
            return None;
        }

        let escape = self
            .body
            .occupied_cells()
            .iter()
            .find_map(|cell| ctx.grid.translate(*cell, velocity).err());
        if let Some(error) = escape {
            log::warn!("object {} holds position: {error}", self.id().get());
            return None;
        }

        let from = self.body.anchor();
        let to = from.translate(velocity)?;
        self.body.deregister(ctx.grid);
        self.body.relocate(to);
        self.body.register(ctx.grid);
        Some((from, to))
    }
}

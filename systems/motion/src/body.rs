use cellbound_core::{
    CellCoord, CellRectSize, Grid, Height, Marker, ObjectId, Offset, QueryError, Registry,
    Velocity,
};

use crate::shape::Shape;

/// Spatial state of a game object: where it is, what it covers and how it
/// is moving.
///
/// The cached list of occupied cells is rebuilt only by
/// [`Body::recompute_occupancy`], so it always mirrors the shape evaluated at
/// the current anchor.
#[derive(Clone, Debug)]
pub struct Body {
    id: ObjectId,
    anchor: CellCoord,
    height: Height,
    shape: Shape,
    size: CellRectSize,
    velocity: Velocity,
    occupied: Vec<CellCoord>,
    in_play: bool,
}

impl Body {
    pub(crate) fn new(id: ObjectId, anchor: CellCoord, height: Height, shape: Shape) -> Self {
        let mut body = Self {
            id,
            anchor,
            height,
            shape,
            size: CellRectSize::default(),
            velocity: Velocity::ZERO,
            occupied: Vec::new(),
            in_play: true,
        };
        body.recompute_occupancy();
        body
    }

    /// Identifier of the owning object.
    #[must_use]
    pub const fn id(&self) -> ObjectId {
        self.id
    }

    /// Top-left anchor of the bounding box.
    #[must_use]
    pub const fn anchor(&self) -> CellCoord {
        self.anchor
    }

    /// Collision layer; [`Height::REMOVED`] once destroyed.
    #[must_use]
    pub const fn height(&self) -> Height {
        self.height
    }

    /// Current shape mapping.
    #[must_use]
    pub const fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Bounding box recorded by the last recompute.
    #[must_use]
    pub const fn size(&self) -> CellRectSize {
        self.size
    }

    /// Pending velocity.
    #[must_use]
    pub const fn velocity(&self) -> Velocity {
        self.velocity
    }

    /// Replaces the pending velocity.
    pub fn set_velocity(&mut self, velocity: Velocity) {
        self.velocity = velocity;
    }

    /// World cells covered by the shape, in offset order.
    #[must_use]
    pub fn occupied_cells(&self) -> &[CellCoord] {
        &self.occupied
    }

    /// Reports whether the shape covers the world cell.
    #[must_use]
    pub fn occupies(&self, cell: CellCoord) -> bool {
        self.marker_at(cell).is_ok()
    }

    /// Indicates whether the object still participates in the simulation.
    #[must_use]
    pub const fn in_play(&self) -> bool {
        self.in_play
    }

    /// Reports whether the object was removed from the simulation.
    #[must_use]
    pub const fn is_destroyed(&self) -> bool {
        self.height.is_removed()
    }

    /// Renormalizes the shape so its smallest offset is the origin, then
    /// rebuilds the occupied-cell cache and the bounding box.
    pub fn recompute_occupancy(&mut self) {
        if let Some(shift) = self
            .shape
            .min_offset()
            .filter(|shift| *shift != Offset::ORIGIN)
        {
            self.reindex(shift);
        }

        self.size = self.shape.size();
        let anchor = self.anchor;
        self.occupied.clear();
        self.occupied
            .extend(self.shape.offsets().map(|offset| anchor.offset(offset)));
    }

    /// Moves the local frame by `shift` without moving any covered cell.
    ///
    /// `shift` must not exceed the smallest occupied offset.
    pub fn reindex(&mut self, shift: Offset) {
        self.shape.reindex(shift);
        self.anchor = self.anchor.offset(shift);
    }

    /// Marker drawn at a world cell.
    pub fn marker_at(&self, cell: CellCoord) -> Result<Marker, QueryError> {
        cell.relative_to(self.anchor)
            .and_then(|offset| self.shape.marker(offset))
            .ok_or(QueryError::NotOccupied { cell })
    }

    /// Erases one covered cell from the shape and from the grid.
    pub fn remove_cell(&mut self, cell: CellCoord, grid: &mut Grid) -> Result<Marker, QueryError> {
        let marker = cell
            .relative_to(self.anchor)
            .and_then(|offset| self.shape.remove(offset))
            .ok_or(QueryError::NotOccupied { cell })?;
        let _ = grid.remove(cell, self.id);
        self.recompute_occupancy();
        Ok(marker)
    }

    /// Removes the object from the grid and from the schedule.
    ///
    /// Returns `false`, without notifying the registry, when the object had
    /// already been destroyed.
    pub fn destroy(&mut self, grid: &mut Grid, registry: &mut dyn Registry) -> bool {
        if self.is_destroyed() {
            log::trace!("object {} already destroyed", self.id.get());
            return false;
        }

        self.vacate(grid);
        registry.ignore(self.id);
        true
    }

    /// Final bookkeeping for an object whose shape has been eroded away.
    pub(crate) fn retire(&mut self, grid: &mut Grid, registry: &mut dyn Registry) -> bool {
        if self.is_destroyed() {
            return false;
        }

        self.vacate(grid);
        self.velocity = Velocity::ZERO;
        registry.create_stop_collider(self.id);
        registry.ignore(self.id);
        true
    }

    pub(crate) fn fits(&self, grid: &Grid) -> bool {
        self.occupied.iter().all(|cell| grid.in_bounds(*cell))
    }

    pub(crate) fn register(&self, grid: &mut Grid) {
        debug_assert!(self.fits(grid), "object {} registered off the grid", self.id.get());
        for cell in &self.occupied {
            let _ = grid.add(*cell, self.id, self.height);
        }
    }

    pub(crate) fn deregister(&self, grid: &mut Grid) {
        for cell in &self.occupied {
            let _ = grid.remove(*cell, self.id);
        }
    }

    pub(crate) fn relocate(&mut self, anchor: CellCoord) {
        self.anchor = anchor;
        self.recompute_occupancy();
    }

    /// Reports whether the grid lists the object at exactly the cached cells.
    #[must_use]
    pub fn matches_grid(&self, grid: &Grid) -> bool {
        let mut cached = self.occupied.clone();
        cached.sort_by_key(|cell| (cell.row(), cell.column()));
        cached == grid.cells_of(self.id)
    }

    fn vacate(&mut self, grid: &mut Grid) {
        self.deregister(grid);
        self.shape.clear();
        self.occupied.clear();
        self.size = CellRectSize::default();
        self.height = Height::REMOVED;
        self.in_play = false;
    }
}

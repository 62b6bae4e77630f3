#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Cellbound engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and the motion system. Adapters submit [`Command`]
//! values describing desired mutations, the world executes those commands via
//! its `apply` entry point, and then broadcasts [`Event`] values describing
//! what happened. The shared [`Grid`] and the [`Registry`] capability are the
//! two services the per-object movement pipeline is handed on every tick.

mod grid;

pub use grid::{Grid, GridCell};

use serde::{Deserialize, Serialize};

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Replaces the grid with an empty one of the provided dimensions.
    ///
    /// Every object living in the previous grid is dropped.
    ConfigureGrid {
        /// Number of cell columns laid out in the grid.
        columns: u32,
        /// Number of cell rows laid out in the grid.
        rows: u32,
    },
    /// Constructs a new object and registers it into its initial cells.
    Spawn {
        /// Description of the object to construct.
        blueprint: ObjectBlueprint,
    },
    /// Advances every scheduled object by one tick.
    Tick,
    /// Clears the per-tick state of every collider in the world.
    ResetColliders,
    /// Forces the full removal of an object from the simulation.
    SelfDestruct {
        /// Identifier of the object to remove.
        object: ObjectId,
    },
    /// Overwrites the velocity of an object.
    SetVelocity {
        /// Identifier of the object to update.
        object: ObjectId,
        /// Velocity to assign.
        velocity: Velocity,
    },
    /// Changes how many ticks an object waits between moves.
    SetPeriod {
        /// Identifier of the object to update.
        object: ObjectId,
        /// Number of ticks skipped between two move attempts.
        period: u32,
    },
    /// Appends a movement modifier to an object.
    AddModifier {
        /// Identifier of the object to update.
        object: ObjectId,
        /// Modifier to install.
        modifier: ModifierSpec,
    },
    /// Removes every movement modifier owned by an object.
    ClearModifiers {
        /// Identifier of the object to update.
        object: ObjectId,
    },
    /// Appends a collider to an object.
    AddCollider {
        /// Identifier of the object to update.
        object: ObjectId,
        /// Collider to install.
        collider: ColliderSpec,
    },
    /// Drops every object that is no longer in play from the world.
    Reap,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that the grid was replaced.
    GridConfigured {
        /// Number of cell columns in the new grid.
        columns: u32,
        /// Number of cell rows in the new grid.
        rows: u32,
    },
    /// Indicates that the simulation advanced by one tick.
    TimeAdvanced {
        /// Index of the tick that was just processed.
        tick: u64,
    },
    /// Confirms that an object was constructed and registered.
    ObjectSpawned {
        /// Identifier assigned to the object.
        object: ObjectId,
        /// Top-left anchor of the object's bounding box.
        anchor: CellCoord,
        /// Layer the object collides on.
        height: Height,
    },
    /// Reports that a spawn request was rejected.
    SpawnRejected {
        /// Specific reason the spawn failed.
        reason: SpawnError,
    },
    /// Confirms that an object committed a move.
    ObjectMoved {
        /// Identifier of the object that moved.
        object: ObjectId,
        /// Anchor before the move.
        from: CellCoord,
        /// Anchor after the move.
        to: CellCoord,
    },
    /// Reports that a moving object ran into another object on its layer.
    ObjectsCollided {
        /// Identifier of the object that attempted to move.
        object: ObjectId,
        /// Identifier of the object occupying the destination.
        other: ObjectId,
        /// Destination cell where the two objects met.
        cell: CellCoord,
    },
    /// Reports that a moving object would have left the grid.
    BoundaryReached {
        /// Identifier of the object that hit the boundary.
        object: ObjectId,
        /// Occupied cell whose destination fell outside the grid.
        cell: CellCoord,
    },
    /// Confirms that an object stopped being scheduled.
    ObjectIgnored {
        /// Identifier of the object that left the schedule.
        object: ObjectId,
    },
    /// Confirms that a non-terminal stop collider was installed on a destroyed object.
    StopColliderInstalled {
        /// Identifier of the object that received the collider.
        object: ObjectId,
    },
    /// Confirms that an object was dropped from the world.
    ObjectReaped {
        /// Identifier of the dropped object.
        object: ObjectId,
    },
    /// Reports that a command referenced an object the world does not know.
    UnknownObject {
        /// Identifier carried by the rejected command.
        object: ObjectId,
    },
}

/// Capability the movement pipeline uses to talk back to the object registry.
///
/// The registry owns object lifetimes and decides which objects are driven
/// each tick. Objects never hold a reference to it; it is passed in for the
/// duration of a single tick.
pub trait Registry {
    /// Stops scheduling the provided object.
    fn ignore(&mut self, object: ObjectId);

    /// Requests that a terminal stop collider be installed on the object.
    fn create_stop_collider(&mut self, object: ObjectId);
}

/// Unique identifier assigned to a game object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(u32);

impl ObjectId {
    /// Creates a new object identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Shifts the cell by a velocity, returning `None` when either axis
    /// would become negative or overflow.
    #[must_use]
    pub fn translate(self, velocity: Velocity) -> Option<CellCoord> {
        let column = self.column.checked_add_signed(velocity.dx())?;
        let row = self.row.checked_add_signed(velocity.dy())?;
        Some(CellCoord::new(column, row))
    }

    /// World cell reached by applying a local offset to this anchor.
    #[must_use]
    pub const fn offset(self, offset: Offset) -> CellCoord {
        CellCoord::new(
            self.column.saturating_add(offset.column()),
            self.row.saturating_add(offset.row()),
        )
    }

    /// Local offset of this cell relative to the provided anchor, if the cell
    /// does not lie above or to the left of it.
    #[must_use]
    pub fn relative_to(self, anchor: CellCoord) -> Option<Offset> {
        let column = self.column.checked_sub(anchor.column)?;
        let row = self.row.checked_sub(anchor.row)?;
        Some(Offset::new(column, row))
    }
}

/// Position of an occupied cell relative to an object's anchor.
///
/// Offsets are normalized so that the smallest occupied column and row are
/// both zero, hence they are never negative.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Offset {
    row: u32,
    column: u32,
}

impl Offset {
    /// The anchor itself.
    pub const ORIGIN: Offset = Offset::new(0, 0);

    /// Creates a new local offset.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { row, column }
    }

    /// Column distance from the anchor.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Row distance from the anchor.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }
}

/// Integer motion vector applied to an object's anchor when it moves.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Velocity {
    dx: i32,
    dy: i32,
}

impl Velocity {
    /// A velocity that leaves the object in place.
    pub const ZERO: Velocity = Velocity::new(0, 0);

    /// Creates a velocity from a column delta and a row delta.
    #[must_use]
    pub const fn new(dx: i32, dy: i32) -> Self {
        Self { dx, dy }
    }

    /// Column delta; positive values move toward larger column indices.
    #[must_use]
    pub const fn dx(&self) -> i32 {
        self.dx
    }

    /// Row delta; positive values move toward larger row indices.
    #[must_use]
    pub const fn dy(&self) -> i32 {
        self.dy
    }

    /// Reports whether the velocity would leave the object in place.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.dx == 0 && self.dy == 0
    }

    /// Velocity pointing in the opposite direction.
    #[must_use]
    pub const fn reversed(self) -> Self {
        Self::new(self.dx.saturating_neg(), self.dy.saturating_neg())
    }
}

/// Collision layer an object lives on. Only objects sharing a layer collide.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Height(i32);

impl Height {
    /// Sentinel layer of objects that were removed from the simulation.
    pub const REMOVED: Height = Height(-1);

    /// Creates a new layer index.
    #[must_use]
    pub const fn new(value: i32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric layer index.
    #[must_use]
    pub const fn get(&self) -> i32 {
        self.0
    }

    /// Reports whether this is the removal sentinel.
    #[must_use]
    pub const fn is_removed(&self) -> bool {
        self.0 == Self::REMOVED.0
    }
}

/// Glyph recorded for one occupied cell of an object's shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Marker(char);

impl Marker {
    /// Creates a marker drawn with the provided glyph.
    #[must_use]
    pub const fn new(glyph: char) -> Self {
        Self(glyph)
    }

    /// Glyph drawn for the cell.
    #[must_use]
    pub const fn glyph(&self) -> char {
        self.0
    }
}

/// Size of a bounding box measured in whole cells.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRectSize {
    width: u32,
    height: u32,
}

impl CellRectSize {
    /// Creates a new size descriptor with explicit dimensions.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width of the rectangle in cells.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height of the rectangle in cells.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }
}

/// One explicitly listed cell of a [`Footprint::Map`].
///
/// Offsets may be negative; they are normalized when the object is built.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FootprintCell {
    /// Column offset from the requested anchor.
    pub dx: i32,
    /// Row offset from the requested anchor.
    pub dy: i32,
    /// Glyph stored at the offset.
    pub marker: Marker,
}

/// Initial shape of an object.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Footprint {
    /// A single cell at the anchor.
    Point {
        /// Glyph stored at the anchor.
        marker: Marker,
    },
    /// A filled rectangle anchored at its top-left corner.
    Rect {
        /// Number of columns covered.
        width: u32,
        /// Number of rows covered.
        length: u32,
        /// Glyph stored in every cell.
        marker: Marker,
    },
    /// An arbitrary set of cells.
    Map {
        /// Cells composing the shape.
        cells: Vec<FootprintCell>,
    },
}

/// Plain description of a movement modifier to install on an object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModifierSpec {
    /// Adds a constant delta to the velocity every move.
    Acceleration {
        /// Column delta added per move.
        ddx: i32,
        /// Row delta added per move.
        ddy: i32,
    },
    /// Clamps each velocity component to `[-max, max]`.
    SpeedLimit {
        /// Largest magnitude allowed on either axis.
        max: u32,
    },
}

/// Plain description of a collider to install on an object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColliderSpec {
    /// Halts the owner whenever it is about to collide.
    Stop,
    /// Halts the owner and removes it from the simulation.
    TerminalStop,
    /// Reverses the owner's velocity, at most once per tick.
    Bounce,
    /// Erases the struck cell from the owner's shape.
    Damage,
}

/// Everything required to construct and register a new object.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectBlueprint {
    /// Requested top-left anchor.
    pub anchor: CellCoord,
    /// Collision layer.
    pub height: Height,
    /// Initial shape.
    pub footprint: Footprint,
    /// Initial velocity.
    pub velocity: Velocity,
    /// Ticks skipped between two move attempts.
    pub period: u32,
    /// Movement modifiers in application order.
    pub modifiers: Vec<ModifierSpec>,
    /// Colliders in registration order.
    pub colliders: Vec<ColliderSpec>,
}

impl ObjectBlueprint {
    /// Creates a stationary blueprint without modifiers or colliders.
    #[must_use]
    pub fn new(anchor: CellCoord, height: Height, footprint: Footprint) -> Self {
        Self {
            anchor,
            height,
            footprint,
            velocity: Velocity::ZERO,
            period: 0,
            modifiers: Vec::new(),
            colliders: Vec::new(),
        }
    }

    /// Single-cell blueprint drawn with the provided glyph.
    #[must_use]
    pub fn point(anchor: CellCoord, height: Height, glyph: char) -> Self {
        Self::new(
            anchor,
            height,
            Footprint::Point {
                marker: Marker::new(glyph),
            },
        )
    }

    /// Replaces the initial velocity.
    #[must_use]
    pub fn with_velocity(mut self, velocity: Velocity) -> Self {
        self.velocity = velocity;
        self
    }

    /// Replaces the move period.
    #[must_use]
    pub fn with_period(mut self, period: u32) -> Self {
        self.period = period;
        self
    }

    /// Appends a movement modifier.
    #[must_use]
    pub fn with_modifier(mut self, modifier: ModifierSpec) -> Self {
        self.modifiers.push(modifier);
        self
    }

    /// Appends a collider.
    #[must_use]
    pub fn with_collider(mut self, collider: ColliderSpec) -> Self {
        self.colliders.push(collider);
        self
    }
}

/// Immutable representation of a single object's state used for queries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObjectSnapshot {
    /// Unique identifier assigned to the object.
    pub id: ObjectId,
    /// Top-left anchor of the bounding box.
    pub anchor: CellCoord,
    /// Collision layer, [`Height::REMOVED`] once destroyed.
    pub height: Height,
    /// Velocity left over from the most recent tick.
    pub velocity: Velocity,
    /// World cells covered by the shape, in offset order.
    pub cells: Vec<CellCoord>,
    /// Bounding box of the shape.
    pub size: CellRectSize,
    /// Indicates whether the object still participates in the simulation.
    pub in_play: bool,
}

/// Read-only snapshot describing all objects within the world.
#[derive(Clone, Debug, Default)]
pub struct ObjectView {
    snapshots: Vec<ObjectSnapshot>,
}

impl ObjectView {
    /// Creates a new object view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<ObjectSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &ObjectSnapshot> {
        self.snapshots.iter()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<ObjectSnapshot> {
        self.snapshots
    }
}

/// Reasons a spawn request may be rejected by the world.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, thiserror::Error,
)]
pub enum SpawnError {
    /// The footprint does not cover a single cell.
    #[error("footprint does not cover any cell")]
    EmptyFootprint,
    /// Part of the footprint lies outside the grid.
    #[error("footprint extends beyond the grid")]
    OutOfBounds,
    /// The requested layer is the removal sentinel.
    #[error("height -1 is reserved for removed objects")]
    ReservedHeight,
}

/// Failure of a shape lookup.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, thiserror::Error)]
pub enum QueryError {
    /// The world cell is not part of the object's current shape.
    #[error("cell ({}, {}) is not occupied by the shape", .cell.column(), .cell.row())]
    NotOccupied {
        /// Cell that was queried.
        cell: CellCoord,
    },
}

/// Failure to resolve a destination cell inside the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, thiserror::Error)]
pub enum BoundsError {
    /// The destination lies outside the grid extents.
    #[error(
        "moving ({}, {}) by ({}, {}) leaves the grid",
        .from.column(),
        .from.row(),
        .velocity.dx(),
        .velocity.dy()
    )]
    OutOfBounds {
        /// Cell the move started from.
        from: CellCoord,
        /// Velocity that was applied.
        velocity: Velocity,
    },
}

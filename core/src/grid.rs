//! Shared occupancy grid consulted and mutated by every moving object.

use std::collections::{BTreeMap, BTreeSet};

use crate::{BoundsError, CellCoord, Height, ObjectId, Velocity};

/// One slot of the grid, tracking which objects cover it on each layer.
///
/// The cell does not own the objects it lists; it only records identifiers.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GridCell {
    layers: BTreeMap<Height, BTreeSet<ObjectId>>,
}

impl GridCell {
    /// Reports whether the object covers this cell on any layer.
    #[must_use]
    pub fn contains(&self, object: ObjectId) -> bool {
        self.layers.values().any(|layer| layer.contains(&object))
    }

    /// Records the object on the provided layer.
    ///
    /// Returns `false` when the object was already present on that layer.
    pub fn add(&mut self, object: ObjectId, height: Height) -> bool {
        self.layers.entry(height).or_default().insert(object)
    }

    /// Forgets the object on every layer it was recorded on.
    ///
    /// Returns `false` when the object was not present.
    pub fn remove(&mut self, object: ObjectId) -> bool {
        let mut removed = false;
        self.layers.retain(|_, layer| {
            removed |= layer.remove(&object);
            !layer.is_empty()
        });
        removed
    }

    /// Objects covering this cell on the provided layer, in identifier order.
    pub fn objects_at_height(&self, height: Height) -> impl Iterator<Item = ObjectId> + '_ {
        self.layers
            .get(&height)
            .into_iter()
            .flat_map(|layer| layer.iter().copied())
    }

    /// Object drawn on top of this cell: the highest layer, then the largest
    /// identifier within it.
    #[must_use]
    pub fn topmost(&self) -> Option<ObjectId> {
        self.layers
            .values()
            .next_back()
            .and_then(|layer| layer.iter().next_back().copied())
    }

    /// Reports whether no object covers the cell.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

/// Dense grid of [`GridCell`] slots stored in row-major order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    columns: u32,
    rows: u32,
    cells: Vec<GridCell>,
}

impl Grid {
    /// Creates an empty grid with the provided dimensions.
    #[must_use]
    pub fn new(columns: u32, rows: u32) -> Self {
        let capacity_u64 = u64::from(columns) * u64::from(rows);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        Self {
            columns,
            rows,
            cells: vec![GridCell::default(); capacity],
        }
    }

    /// Provides the `(columns, rows)` extents of the grid.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    /// Reports whether the coordinate lies inside the grid.
    #[must_use]
    pub const fn in_bounds(&self, cell: CellCoord) -> bool {
        cell.column() < self.columns && cell.row() < self.rows
    }

    /// Destination of `from` after moving by `velocity`, if it stays inside
    /// the grid.
    pub fn translate(&self, from: CellCoord, velocity: Velocity) -> Result<CellCoord, BoundsError> {
        from.translate(velocity)
            .filter(|cell| self.in_bounds(*cell))
            .ok_or(BoundsError::OutOfBounds { from, velocity })
    }

    /// Slot at the provided coordinate.
    #[must_use]
    pub fn cell(&self, cell: CellCoord) -> Option<&GridCell> {
        self.index(cell).and_then(|index| self.cells.get(index))
    }

    /// Mutable slot at the provided coordinate.
    pub fn cell_mut(&mut self, cell: CellCoord) -> Option<&mut GridCell> {
        self.index(cell).and_then(|index| self.cells.get_mut(index))
    }

    /// Reports whether the object is recorded at the coordinate.
    #[must_use]
    pub fn contains(&self, cell: CellCoord, object: ObjectId) -> bool {
        self.cell(cell).map_or(false, |slot| slot.contains(object))
    }

    /// Records the object at the coordinate. Out-of-bounds coordinates are
    /// ignored and reported as `false`.
    pub fn add(&mut self, cell: CellCoord, object: ObjectId, height: Height) -> bool {
        self.cell_mut(cell)
            .map_or(false, |slot| slot.add(object, height))
    }

    /// Forgets the object at the coordinate.
    pub fn remove(&mut self, cell: CellCoord, object: ObjectId) -> bool {
        self.cell_mut(cell).map_or(false, |slot| slot.remove(object))
    }

    /// Objects recorded at the coordinate on the provided layer.
    #[must_use]
    pub fn objects_at_height(&self, cell: CellCoord, height: Height) -> Vec<ObjectId> {
        self.cell(cell)
            .map(|slot| slot.objects_at_height(height).collect())
            .unwrap_or_default()
    }

    /// Every coordinate that lists the object, in row-major order.
    #[must_use]
    pub fn cells_of(&self, object: ObjectId) -> Vec<CellCoord> {
        let width = self.columns.max(1) as usize;
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.contains(object))
            .map(|(index, _)| CellCoord::new((index % width) as u32, (index / width) as u32))
            .collect()
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if self.in_bounds(cell) {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}

use std::collections::BTreeMap;

use cellbound_core::{CellCoord, CellRectSize, Footprint, Marker, Offset, SpawnError, Velocity};

/// Mapping from local offsets to the marker drawn at each occupied cell.
///
/// Offsets iterate in row-major order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Shape {
    markers: BTreeMap<Offset, Marker>,
}

impl Shape {
    /// Single occupied cell at the anchor.
    #[must_use]
    pub fn point(marker: Marker) -> Self {
        let mut markers = BTreeMap::new();
        let _ = markers.insert(Offset::ORIGIN, marker);
        Self { markers }
    }

    /// Filled `width` x `length` rectangle anchored at its top-left corner.
    #[must_use]
    pub fn rect(width: u32, length: u32, marker: Marker) -> Self {
        let markers = (0..length)
            .flat_map(|row| (0..width).map(move |column| (Offset::new(column, row), marker)))
            .collect();
        Self { markers }
    }

    /// Builds the shape described by a footprint requested at `anchor`.
    ///
    /// Explicit maps may carry negative offsets; they are folded into the
    /// returned anchor so the shape starts at the origin.
    pub(crate) fn from_footprint(
        footprint: &Footprint,
        anchor: CellCoord,
    ) -> Result<(Self, CellCoord), SpawnError> {
        let shape = match footprint {
            Footprint::Point { marker } => Self::point(*marker),
            Footprint::Rect {
                width,
                length,
                marker,
            } => Self::rect(*width, *length, *marker),
            Footprint::Map { cells } => {
                let min_dx = cells.iter().map(|cell| cell.dx).min();
                let min_dy = cells.iter().map(|cell| cell.dy).min();
                let (Some(min_dx), Some(min_dy)) = (min_dx, min_dy) else {
                    return Err(SpawnError::EmptyFootprint);
                };
                let anchor = anchor
                    .translate(Velocity::new(min_dx, min_dy))
                    .ok_or(SpawnError::OutOfBounds)?;
                let markers = cells
                    .iter()
                    .map(|cell| {
                        let column = cell.dx.abs_diff(min_dx);
                        let row = cell.dy.abs_diff(min_dy);
                        (Offset::new(column, row), cell.marker)
                    })
                    .collect();
                return Ok((Self { markers }, anchor));
            }
        };

        if shape.is_empty() {
            return Err(SpawnError::EmptyFootprint);
        }
        Ok((shape, anchor))
    }

    /// Marker stored at a local offset.
    #[must_use]
    pub fn marker(&self, offset: Offset) -> Option<Marker> {
        self.markers.get(&offset).copied()
    }

    /// Occupied offsets in row-major order.
    pub fn offsets(&self) -> impl Iterator<Item = Offset> + '_ {
        self.markers.keys().copied()
    }

    /// Number of occupied cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.markers.len()
    }

    /// Reports whether no cell is occupied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// Smallest occupied column and row, taken independently.
    #[must_use]
    pub fn min_offset(&self) -> Option<Offset> {
        let column = self.markers.keys().map(Offset::column).min()?;
        let row = self.markers.keys().map(Offset::row).min()?;
        Some(Offset::new(column, row))
    }

    /// Inclusive bounding box of the occupied offsets, measured from the origin.
    #[must_use]
    pub fn size(&self) -> CellRectSize {
        let width = self.markers.keys().map(|offset| offset.column() + 1).max();
        let height = self.markers.keys().map(|offset| offset.row() + 1).max();
        CellRectSize::new(width.unwrap_or(0), height.unwrap_or(0))
    }

    pub(crate) fn remove(&mut self, offset: Offset) -> Option<Marker> {
        self.markers.remove(&offset)
    }

    pub(crate) fn clear(&mut self) {
        self.markers.clear();
    }

    /// Subtracts `shift` from every key. Callers guarantee `shift` does not
    /// exceed [`Shape::min_offset`].
    pub(crate) fn reindex(&mut self, shift: Offset) {
        let markers = std::mem::take(&mut self.markers);
        self.markers = markers
            .into_iter()
            .map(|(offset, marker)| {
                let moved = Offset::new(
                    offset.column() - shift.column(),
                    offset.row() - shift.row(),
                );
                (moved, marker)
            })
            .collect();
    }
}

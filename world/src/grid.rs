//! Staggered diamond grid and building placement validation.

use geometropolis_core::{BuildingId, BuildingKind, Footprint, GridIndex, PlacementError};

/// Width of a single diamond tile in canvas pixels.
pub const CELL_WIDTH: u32 = 32;
/// Height of a single diamond tile in canvas pixels.
pub const CELL_HEIGHT: u32 = 16;

/// Derives `(rows, columns)` for a board drawn on a canvas of the given size.
///
/// Rows overlap by half a tile, so a canvas holds `2·height/CELL_HEIGHT − 1`
/// staggered rows.
#[must_use]
pub fn dimensions_for_canvas(width: u32, height: u32) -> (u32, u32) {
    let rows = (height / (CELL_HEIGHT / 2)).saturating_sub(1);
    (rows, width / CELL_WIDTH)
}

/// A building that has been erected on the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlacedBuilding {
    id: BuildingId,
    kind: BuildingKind,
    footprint: Footprint,
}

impl PlacedBuilding {
    /// Identifier allocated by the grid.
    #[must_use]
    pub const fn id(&self) -> BuildingId {
        self.id
    }

    /// Kind of building that was erected.
    #[must_use]
    pub const fn kind(&self) -> BuildingKind {
        self.kind
    }

    /// Cells covered by the building.
    #[must_use]
    pub const fn footprint(&self) -> Footprint {
        self.footprint
    }
}

/// Staggered tile grid where odd rows hold one fewer column.
///
/// Buildings are only ever appended; there is no removal.
#[derive(Clone, Debug)]
pub struct DiamondGrid {
    rows: u32,
    columns: u32,
    buildings: Vec<PlacedBuilding>,
    next_building_id: BuildingId,
}

impl DiamondGrid {
    /// Creates an empty grid.
    #[must_use]
    pub fn new(rows: u32, columns: u32) -> Self {
        Self {
            rows,
            columns,
            buildings: Vec::new(),
            next_building_id: BuildingId::new(0),
        }
    }

    /// Number of rows.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Number of columns in even rows.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of valid columns in `row`.
    #[must_use]
    pub const fn columns_in_row(&self, row: u32) -> u32 {
        self.columns.saturating_sub(row % 2)
    }

    /// Reports whether the index addresses a tile of this grid.
    #[must_use]
    pub fn in_bounds(&self, index: GridIndex) -> bool {
        let (Ok(row), Ok(column)) = (u32::try_from(index.row()), u32::try_from(index.column()))
        else {
            return false;
        };
        row < self.rows && column < self.columns_in_row(row)
    }

    /// Reports whether no building covers the tile.
    #[must_use]
    pub fn is_vacant(&self, index: GridIndex) -> bool {
        self.building_at(index).is_none()
    }

    /// Reports whether the tile exists and is free.
    #[must_use]
    pub fn is_placeable(&self, index: GridIndex) -> bool {
        self.in_bounds(index) && self.is_vacant(index)
    }

    /// Computes the footprint a building anchored at `anchor` would cover.
    #[must_use]
    pub const fn footprint(&self, anchor: GridIndex) -> Footprint {
        Footprint::anchored_at(anchor)
    }

    /// Reports whether every cell of the footprint is placeable.
    #[must_use]
    pub fn footprint_placeable(&self, footprint: &Footprint) -> bool {
        footprint.iter().all(|cell| self.is_placeable(cell))
    }

    /// Explains why a footprint cannot be placed, bounds first.
    pub fn check_footprint(&self, footprint: &Footprint) -> Result<(), PlacementError> {
        if !footprint.iter().all(|cell| self.in_bounds(cell)) {
            return Err(PlacementError::OutOfBounds);
        }
        if !footprint.iter().all(|cell| self.is_vacant(cell)) {
            return Err(PlacementError::Occupied);
        }
        Ok(())
    }

    /// Footprint cells around `anchor` for highlighting, `None` where off the grid.
    #[must_use]
    pub fn neighbors(&self, anchor: GridIndex) -> [Option<GridIndex>; 4] {
        let cells = *self.footprint(anchor).cells();
        cells.map(|cell| self.in_bounds(cell).then_some(cell))
    }

    /// Places a building anchored at `anchor`, leaving the grid untouched on failure.
    pub fn place(
        &mut self,
        kind: BuildingKind,
        anchor: GridIndex,
    ) -> Result<BuildingId, PlacementError> {
        let footprint = self.footprint(anchor);
        self.check_footprint(&footprint)?;

        let id = self.next_building_id;
        self.next_building_id = BuildingId::new(id.get().saturating_add(1));
        self.buildings.push(PlacedBuilding {
            id,
            kind,
            footprint,
        });
        Ok(id)
    }

    /// Building covering the tile, if any.
    #[must_use]
    pub fn building_at(&self, index: GridIndex) -> Option<&PlacedBuilding> {
        self.buildings
            .iter()
            .find(|building| building.footprint.contains(index))
    }

    /// Buildings in placement order.
    #[must_use]
    pub fn buildings(&self) -> &[PlacedBuilding] {
        &self.buildings
    }
}

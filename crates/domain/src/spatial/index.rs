//! Rectangle to cell covering.

use std::collections::BTreeSet;

use super::cell::{tile_x, tile_y, CellId, MAX_ZOOM, MIN_ZOOM};
use crate::error::DomainError;
use crate::value_objects::{LatLng, LatLngRect};

/// Maps geographic rectangles to the fixed-resolution cells covering them.
///
/// Stateless: the same rectangle always yields the same cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpatialIndex {
    zoom: u8,
    max_cells: usize,
}

impl SpatialIndex {
    /// Zoom 15 tiles are roughly 1 km wide at mid latitudes.
    pub const DEFAULT_ZOOM: u8 = 15;
    pub const DEFAULT_MAX_CELLS: usize = 256;

    /// # Errors
    ///
    /// Returns `DomainError::Validation` for an unsupported zoom or a zero
    /// cell budget.
    pub fn new(zoom: u8, max_cells: usize) -> Result<Self, DomainError> {
        if !(MIN_ZOOM..=MAX_ZOOM).contains(&zoom) {
            return Err(DomainError::validation(format!(
                "Zoom {} is outside {}..={}",
                zoom, MIN_ZOOM, MAX_ZOOM
            )));
        }
        if max_cells == 0 {
            return Err(DomainError::validation("max_cells must be positive"));
        }
        Ok(Self { zoom, max_cells })
    }

    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    pub fn max_cells(&self) -> usize {
        self.max_cells
    }

    /// The cell owning `point` at this index's resolution.
    pub fn cell_for(&self, point: &LatLng) -> CellId {
        CellId::containing_at_valid_zoom(point, self.zoom)
    }

    /// Minimal set of cells whose union covers `low`..`high`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidRegion` if `low` is not strictly
    /// southwest of `high`, or if the covering would exceed `max_cells`.
    pub fn covering_cells(&self, low: LatLng, high: LatLng) -> Result<BTreeSet<CellId>, DomainError> {
        let rect = LatLngRect::new(low, high)?;
        self.covering_rect(&rect)
    }

    /// Minimal set of cells whose union covers `rect`.
    ///
    /// Mercator tiles are bounded by meridians and parallels, so the covering
    /// of a lat/lng rectangle is exactly the block of tiles between its
    /// corner tiles.
    pub fn covering_rect(&self, rect: &LatLngRect) -> Result<BTreeSet<CellId>, DomainError> {
        let x_min = tile_x(rect.low().longitude(), self.zoom);
        let x_max = tile_x(rect.high().longitude(), self.zoom);
        // y grows southward
        let y_min = tile_y(rect.high().latitude(), self.zoom);
        let y_max = tile_y(rect.low().latitude(), self.zoom);

        let count = (x_max - x_min + 1) as usize * (y_max - y_min + 1) as usize;
        if count > self.max_cells {
            return Err(DomainError::invalid_region(format!(
                "Region spans {} cells at zoom {}, limit is {}",
                count, self.zoom, self.max_cells
            )));
        }

        let mut cells = BTreeSet::new();
        for y in y_min..=y_max {
            for x in x_min..=x_max {
                cells.insert(CellId::from_grid(self.zoom, x, y));
            }
        }
        Ok(cells)
    }
}

impl Default for SpatialIndex {
    fn default() -> Self {
        Self {
            zoom: Self::DEFAULT_ZOOM,
            max_cells: Self::DEFAULT_MAX_CELLS,
        }
    }
}

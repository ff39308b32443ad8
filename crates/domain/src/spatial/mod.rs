//! Spatial partitioning of the map surface.

mod cell;
mod index;

pub use cell::{CellId, MAX_MERCATOR_LATITUDE, MAX_ZOOM, MIN_ZOOM};
pub use index::SpatialIndex;

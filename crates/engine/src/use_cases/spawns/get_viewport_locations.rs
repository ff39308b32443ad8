//! Viewport query use case.
//!
//! Resolves the cells covering a map rectangle, fetches them concurrently and
//! returns the union of their spawn locations together with any cells that
//! could not be loaded.

use std::collections::HashSet;
use std::sync::Arc;

use futures_util::future::join_all;
use serde::Serialize;
use zoinkies_domain::{CellId, DomainError, LatLng, LocationCriteria, SpatialIndex, SpawnLocation};

use crate::stores::{WorldError, WorldState};

/// A cell whose locations could not be loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CellFailure {
    pub cell: String,
    pub message: String,
}

impl CellFailure {
    fn new(cell: CellId, error: &WorldError) -> Self {
        Self {
            cell: cell.token(),
            message: error.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ViewportLocations {
    pub locations: Vec<SpawnLocation>,
    pub failures: Vec<CellFailure>,
}

/// Get viewport locations use case.
pub struct GetViewportLocations {
    world: Arc<WorldState>,
    index: SpatialIndex,
    default_criteria: LocationCriteria,
}

impl GetViewportLocations {
    pub fn new(world: Arc<WorldState>, index: SpatialIndex, default_criteria: LocationCriteria) -> Self {
        Self {
            world,
            index,
            default_criteria,
        }
    }

    /// Execute the viewport query.
    ///
    /// # Arguments
    /// * `low` - South-west corner
    /// * `high` - North-east corner
    /// * `criteria` - Provider criteria, the configured default when `None`
    ///
    /// # Returns
    /// * `Ok(ViewportLocations)` - Locations of every cell that loaded, plus per-cell failures
    /// * `Err(ViewportError)` - The rectangle is invalid or no cell could be loaded
    pub async fn execute(
        &self,
        low: LatLng,
        high: LatLng,
        criteria: Option<LocationCriteria>,
    ) -> Result<ViewportLocations, ViewportError> {
        let cells = self.index.covering_cells(low, high)?;
        let criteria = criteria.unwrap_or_else(|| self.default_criteria.clone());

        let fetches = cells.iter().map(|&cell| {
            let criteria = &criteria;
            async move { (cell, self.world.get_or_fetch(cell, criteria).await) }
        });
        let results = join_all(fetches).await;

        let mut seen = HashSet::new();
        let mut viewport = ViewportLocations::default();
        for (cell, result) in results {
            match result {
                Ok(locations) => viewport.locations.extend(
                    locations
                        .into_iter()
                        .filter(|location| seen.insert(location.id().clone())),
                ),
                Err(e) => viewport.failures.push(CellFailure::new(cell, &e)),
            }
        }

        if !viewport.failures.is_empty() && viewport.failures.len() == cells.len() {
            tracing::warn!(cells = cells.len(), "Every cell in viewport failed to load");
            return Err(ViewportError::Unavailable(viewport.failures));
        }

        tracing::debug!(
            cells = cells.len(),
            locations = viewport.locations.len(),
            failures = viewport.failures.len(),
            "Viewport resolved"
        );
        Ok(viewport)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ViewportError {
    #[error("Invalid region: {0}")]
    InvalidRegion(String),
    #[error("Provider unavailable for all {} cells", .0.len())]
    Unavailable(Vec<CellFailure>),
}

impl From<DomainError> for ViewportError {
    fn from(e: DomainError) -> Self {
        Self::InvalidRegion(e.to_string())
    }
}

//! In-memory world state.
//!
//! Owns every spawn location, the cell -> locations cache and the provider
//! fetches currently in flight. Location operations lock only that
//! location's map entry. Fetches are single-flight per cell: the first caller
//! installs a shared future and later callers await a clone of it.
//!
//! A fetch writes the cache before it leaves the in-flight map, so a caller
//! that finds neither a cache entry nor an in-flight fetch (while holding the
//! vacant in-flight slot) is guaranteed to be the only one fetching.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures_util::future::{BoxFuture, Shared};
use futures_util::FutureExt;
use serde::Serialize;
use zoinkies_domain::{CellId, DomainError, LocationCriteria, LocationId, SpawnLocation};

use crate::entities::{RespawnScheduler, SpawnCatalog};
use crate::infrastructure::ports::{ClockPort, LocationProviderPort, ProviderError};

/// Default upper bound on one provider fetch, retries included.
pub const DEFAULT_PROVIDER_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorldError {
    #[error("Location not found: {0}")]
    NotFound(String),
    #[error("Location {0} is not available")]
    AlreadyClaimed(String),
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
    #[error("Invalid cooldown: {0}")]
    InvalidCooldown(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Provider unavailable for cell {cell}: {message}")]
    ProviderUnavailable { cell: CellId, message: String },
}

impl WorldError {
    fn not_found(id: &LocationId) -> Self {
        Self::NotFound(id.to_string())
    }

    fn unavailable(cell: CellId, message: impl Into<String>) -> Self {
        Self::ProviderUnavailable {
            cell,
            message: message.into(),
        }
    }
}

impl From<DomainError> for WorldError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::AlreadyClaimed { id } => Self::AlreadyClaimed(id),
            DomainError::InvalidCooldown(msg) => Self::InvalidCooldown(msg),
            DomainError::InvalidStateTransition(msg) => Self::InvalidTransition(msg),
            DomainError::Validation(msg) | DomainError::InvalidRegion(msg) => {
                Self::InvalidInput(msg)
            }
        }
    }
}

/// Respawn progress of one location.
#[derive(Debug, Clone, PartialEq)]
pub struct RespawnStatus {
    pub location_id: LocationId,
    pub respawning: bool,
    pub respawn_time: Option<DateTime<Utc>>,
    /// Zero unless respawning.
    pub remaining: chrono::Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WorldStats {
    pub cached_cells: usize,
    pub locations: usize,
    pub fetches_in_flight: usize,
}

type FetchOutput = Result<Arc<[LocationId]>, WorldError>;
type SharedFetch = Shared<BoxFuture<'static, FetchOutput>>;

struct InFlight {
    epoch: u64,
    fetch: SharedFetch,
}

struct WorldInner {
    locations: DashMap<LocationId, SpawnLocation>,
    cells: DashMap<CellId, Arc<[LocationId]>>,
    in_flight: DashMap<CellId, InFlight>,
    /// Bumped by every reset; fetches started in an older epoch never commit.
    epoch: AtomicU64,
    /// Commits hold it shared, reset holds it exclusively.
    reset_gate: RwLock<()>,
}

pub struct WorldState {
    inner: Arc<WorldInner>,
    provider: Arc<dyn LocationProviderPort>,
    catalog: Arc<SpawnCatalog>,
    scheduler: RespawnScheduler,
    clock: Arc<dyn ClockPort>,
    provider_timeout: Duration,
}

impl WorldState {
    pub fn new(
        provider: Arc<dyn LocationProviderPort>,
        catalog: Arc<SpawnCatalog>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            inner: Arc::new(WorldInner {
                locations: DashMap::new(),
                cells: DashMap::new(),
                in_flight: DashMap::new(),
                epoch: AtomicU64::new(0),
                reset_gate: RwLock::new(()),
            }),
            provider,
            catalog,
            scheduler: RespawnScheduler::new(),
            clock,
            provider_timeout: DEFAULT_PROVIDER_TIMEOUT,
        }
    }

    pub fn with_provider_timeout(mut self, timeout: Duration) -> Self {
        self.provider_timeout = timeout;
        self
    }

    // Cell cache

    /// Locations of `cell`, querying the provider on a cache miss.
    ///
    /// The cache is keyed by cell alone: once a cell is cached, later
    /// criteria do not trigger a refetch.
    pub async fn get_or_fetch(
        &self,
        cell: CellId,
        criteria: &LocationCriteria,
    ) -> Result<Vec<SpawnLocation>, WorldError> {
        if let Some(ids) = self.cached_ids(&cell) {
            return Ok(self.snapshot(&ids));
        }

        let fetch = match self.inner.in_flight.entry(cell) {
            Entry::Occupied(entry) => {
                tracing::debug!(cell = %cell, "Joining in-flight fetch");
                entry.get().fetch.clone()
            }
            Entry::Vacant(entry) => {
                // A fetch may have committed between the cache check and here
                if let Some(ids) = self.cached_ids(&cell) {
                    drop(entry);
                    return Ok(self.snapshot(&ids));
                }
                let epoch = self.inner.epoch.load(Ordering::SeqCst);
                let fetch = self.start_fetch(cell, criteria.clone(), epoch);
                entry.insert(InFlight {
                    epoch,
                    fetch: fetch.clone(),
                });
                fetch
            }
        };

        let ids = fetch.await?;
        Ok(self.snapshot(&ids))
    }

    pub fn is_cached(&self, cell: &CellId) -> bool {
        self.inner.cells.contains_key(cell)
    }

    fn cached_ids(&self, cell: &CellId) -> Option<Arc<[LocationId]>> {
        self.inner.cells.get(cell).map(|ids| Arc::clone(ids.value()))
    }

    fn start_fetch(&self, cell: CellId, criteria: LocationCriteria, epoch: u64) -> SharedFetch {
        let inner = Arc::clone(&self.inner);
        let provider = Arc::clone(&self.provider);
        let catalog = Arc::clone(&self.catalog);
        let timeout = self.provider_timeout;

        async move {
            let result = fetch_cell(&inner, provider.as_ref(), &catalog, cell, &criteria, timeout, epoch).await;
            inner
                .in_flight
                .remove_if(&cell, |_, in_flight| in_flight.epoch == epoch);
            result
        }
        .boxed()
        .shared()
    }

    /// Current state of the given ids, with elapsed respawns resolved. Ids
    /// that vanished in a reset are skipped.
    fn snapshot(&self, ids: &[LocationId]) -> Vec<SpawnLocation> {
        let now = self.clock.now();
        ids.iter()
            .filter_map(|id| {
                self.inner.locations.get_mut(id).map(|mut entry| {
                    resolve_expiry(&mut entry, now);
                    entry.value().clone()
                })
            })
            .collect()
    }

    // Location lifecycle

    /// Available -> Claimed. Exactly one of any number of racing callers wins.
    pub fn claim(&self, id: &LocationId) -> Result<SpawnLocation, WorldError> {
        let now = self.clock.now();
        let mut entry = self
            .inner
            .locations
            .get_mut(id)
            .ok_or_else(|| WorldError::not_found(id))?;

        entry.claim(now)?;
        tracing::info!(location_id = %id, "Location claimed");
        Ok(entry.value().clone())
    }

    /// Claimed -> Respawning until `now + cooldown`.
    pub fn start_respawn(
        &self,
        id: &LocationId,
        cooldown: chrono::Duration,
    ) -> Result<SpawnLocation, WorldError> {
        let now = self.clock.now();
        let mut entry = self
            .inner
            .locations
            .get_mut(id)
            .ok_or_else(|| WorldError::not_found(id))?;

        let deadline = self.scheduler.compute_deadline(now, cooldown)?;
        entry.start_respawn(deadline, now)?;
        if entry.is_available() {
            tracing::info!(location_id = %id, "Zero cooldown, location available again");
        } else {
            tracing::info!(
                location_id = %id,
                respawn_time = %deadline,
                "Location respawning"
            );
        }
        Ok(entry.value().clone())
    }

    /// Whether the location is still respawning. An elapsed respawn is moved
    /// back to available before answering.
    pub fn is_respawning(&self, id: &LocationId) -> Result<bool, WorldError> {
        let now = self.clock.now();
        let mut entry = self
            .inner
            .locations
            .get_mut(id)
            .ok_or_else(|| WorldError::not_found(id))?;

        resolve_expiry(&mut entry, now);
        Ok(entry.state() == zoinkies_domain::SpawnState::Respawning)
    }

    pub fn get(&self, id: &LocationId) -> Result<SpawnLocation, WorldError> {
        let now = self.clock.now();
        let mut entry = self
            .inner
            .locations
            .get_mut(id)
            .ok_or_else(|| WorldError::not_found(id))?;

        resolve_expiry(&mut entry, now);
        Ok(entry.value().clone())
    }

    pub fn respawn_status(&self, id: &LocationId) -> Result<RespawnStatus, WorldError> {
        let now = self.clock.now();
        let location = self.get(id)?;
        let remaining = location
            .respawn_time()
            .map(|deadline| self.scheduler.remaining(deadline, now))
            .unwrap_or_else(chrono::Duration::zero);

        Ok(RespawnStatus {
            location_id: id.clone(),
            respawning: location.respawn_time().is_some(),
            respawn_time: location.respawn_time(),
            remaining,
        })
    }

    pub fn stats(&self) -> WorldStats {
        WorldStats {
            cached_cells: self.inner.cells.len(),
            locations: self.inner.locations.len(),
            fetches_in_flight: self.inner.in_flight.len(),
        }
    }

    /// Forget every cell and location. Fetches still running complete but
    /// never write into the new world.
    pub fn reset(&self) {
        let _gate = self
            .inner
            .reset_gate
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        let epoch = self.inner.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        let cells = self.inner.cells.len();
        let locations = self.inner.locations.len();

        self.inner.in_flight.clear();
        self.inner.cells.clear();
        self.inner.locations.clear();

        tracing::info!(epoch, cells, locations, "World state reset");
    }
}

fn resolve_expiry(location: &mut SpawnLocation, now: DateTime<Utc>) {
    if location.resolve_expiry(now) {
        tracing::debug!(location_id = %location.id(), "Respawn elapsed, location available");
    }
}

async fn fetch_cell(
    inner: &WorldInner,
    provider: &dyn LocationProviderPort,
    catalog: &SpawnCatalog,
    cell: CellId,
    criteria: &LocationCriteria,
    timeout: Duration,
    epoch: u64,
) -> FetchOutput {
    tracing::debug!(cell = %cell, "Fetching playable locations");

    let raws = match tokio::time::timeout(timeout, provider.query(cell, criteria)).await {
        Ok(Ok(raws)) => raws,
        Ok(Err(e)) => {
            tracing::warn!(cell = %cell, error = %e, "Provider query failed");
            return Err(WorldError::unavailable(cell, e.to_string()));
        }
        Err(_) => {
            let e = ProviderError::Timeout(timeout);
            tracing::warn!(cell = %cell, error = %e, "Provider query timed out");
            return Err(WorldError::unavailable(cell, e.to_string()));
        }
    };

    let spawned = catalog.build_cell(cell, &raws);
    commit_cell(inner, cell, spawned, epoch)
}

/// Insert freshly classified locations and cache the cell.
///
/// Ids already present keep their existing state and type. An id owned by a
/// different cell stays with that cell.
fn commit_cell(
    inner: &WorldInner,
    cell: CellId,
    spawned: Vec<SpawnLocation>,
    epoch: u64,
) -> FetchOutput {
    let _gate = inner
        .reset_gate
        .read()
        .unwrap_or_else(PoisonError::into_inner);

    if inner.epoch.load(Ordering::SeqCst) != epoch {
        tracing::info!(cell = %cell, "World reset during fetch, discarding result");
        return Err(WorldError::unavailable(cell, "world was reset while fetching"));
    }

    let mut ids = Vec::with_capacity(spawned.len());
    for location in spawned {
        match inner.locations.entry(location.id().clone()) {
            Entry::Vacant(entry) => {
                ids.push(entry.key().clone());
                entry.insert(location);
            }
            Entry::Occupied(entry) => {
                let owner = entry.get().cell();
                if owner == cell {
                    ids.push(entry.key().clone());
                } else {
                    tracing::debug!(
                        cell = %cell,
                        owner = %owner,
                        location_id = %entry.key(),
                        "Location already owned by another cell"
                    );
                }
            }
        }
    }

    let ids: Arc<[LocationId]> = ids.into();
    inner.cells.insert(cell, Arc::clone(&ids));
    tracing::info!(cell = %cell, locations = ids.len(), "Cell cached");
    Ok(ids)
}

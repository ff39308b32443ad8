//! Common test helpers: a counting fake provider, a manual clock and
//! builders for a wired world and app.
//!
//! # Usage
//!
//! ```rust,ignore
//! use crate::test_fixtures::{self, CountingProvider, ManualClock};
//!
//! let provider = Arc::new(CountingProvider::new(2));
//! let world = test_fixtures::world_state(provider.clone(), Arc::new(ManualClock::at(test_fixtures::t0())));
//! ```

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use zoinkies_domain::{CellId, LatLng, LocationCriteria, RawLocation};

use crate::app::App;
use crate::entities::{CatalogConfig, SpawnCatalog};
use crate::infrastructure::clock::FixedRandom;
use crate::infrastructure::ports::{ClockPort, LocationProviderPort, ProviderError};
use crate::infrastructure::readiness::{Milestone, Readiness};
use crate::infrastructure::settings::AppSettings;
use crate::stores::WorldState;

/// Fixed start instant shared by the tests.
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

// =============================================================================
// Fake Provider
// =============================================================================

/// Provider that returns `per_cell` untagged candidates inside every queried
/// cell and counts its calls.
///
/// Candidate ids are `{cell token}-{index}`, so repeated queries for a cell
/// return the same ids.
pub struct CountingProvider {
    per_cell: usize,
    delay: Duration,
    types: Vec<String>,
    calls: AtomicUsize,
    failing: Mutex<HashSet<CellId>>,
    slow: Mutex<HashMap<CellId, Duration>>,
}

impl CountingProvider {
    pub fn new(per_cell: usize) -> Self {
        Self {
            per_cell,
            delay: Duration::ZERO,
            types: Vec::new(),
            calls: AtomicUsize::new(0),
            failing: Mutex::new(HashSet::new()),
            slow: Mutex::new(HashMap::new()),
        }
    }

    /// Sleep this long inside every query.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Tag every candidate with these place types.
    pub fn with_types(mut self, types: &[&str]) -> Self {
        self.types = types.iter().map(|t| t.to_string()).collect();
        self
    }

    /// Answer queries for `cell` with a 503 until healed.
    pub fn fail_cell(&self, cell: CellId) {
        self.failing.lock().unwrap().insert(cell);
    }

    /// Sleep `delay` inside queries for `cell` only.
    pub fn slow_cell(&self, cell: CellId, delay: Duration) {
        self.slow.lock().unwrap().insert(cell, delay);
    }

    pub fn heal_cell(&self, cell: CellId) {
        self.failing.lock().unwrap().remove(&cell);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn candidates(&self, cell: CellId) -> Vec<RawLocation> {
        let bounds = cell.bounds();
        let (low, high) = (bounds.low(), bounds.high());
        (0..self.per_cell)
            .map(|i| {
                let f = (i + 1) as f64 / (self.per_cell + 1) as f64;
                let point = LatLng::new(
                    low.latitude() + (high.latitude() - low.latitude()) * f,
                    low.longitude() + (high.longitude() - low.longitude()) * f,
                )
                .unwrap();
                RawLocation::new(format!("{}-{}", cell.token(), i))
                    .with_snapped_point(point)
                    .with_types(self.types.clone())
            })
            .collect()
    }
}

#[async_trait]
impl LocationProviderPort for CountingProvider {
    async fn query(
        &self,
        cell: CellId,
        _criteria: &LocationCriteria,
    ) -> Result<Vec<RawLocation>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let cell_delay = self.slow.lock().unwrap().get(&cell).copied();
        let delay = cell_delay.unwrap_or(self.delay);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if self.failing.lock().unwrap().contains(&cell) {
            return Err(ProviderError::status(503, "backend unavailable"));
        }
        Ok(self.candidates(cell))
    }
}

// =============================================================================
// Manual Clock
// =============================================================================

/// Clock that only moves when told to.
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn advance(&self, by: chrono::Duration) {
        let mut now = self.now.lock().unwrap();
        *now += by;
    }
}

impl ClockPort for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

// =============================================================================
// Builders
// =============================================================================

/// Catalog with default rules whose random draws always pick the first
/// option, so untagged candidates become scout minions.
pub fn catalog() -> Arc<SpawnCatalog> {
    Arc::new(SpawnCatalog::new(
        CatalogConfig::default(),
        Arc::new(FixedRandom(0)),
    ))
}

pub fn world_state(
    provider: Arc<dyn LocationProviderPort>,
    clock: Arc<dyn ClockPort>,
) -> WorldState {
    WorldState::new(provider, catalog(), clock)
}

/// Fully ready app over default settings with the given provider and clock.
pub fn app(provider: Arc<dyn LocationProviderPort>, clock: Arc<dyn ClockPort>) -> App {
    let readiness = Arc::new(Readiness::new());
    readiness.mark(Milestone::SettingsLoaded);
    readiness.mark(Milestone::ProviderConfigured);
    App::new(
        AppSettings::default(),
        provider,
        clock,
        Arc::new(FixedRandom(0)),
        readiness,
    )
    .unwrap()
}

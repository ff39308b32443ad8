//! Application state and composition.

use std::sync::Arc;

use crate::entities::SpawnCatalog;
use crate::infrastructure::{
    ports::{ClockPort, LocationProviderPort, RandomPort},
    readiness::{Milestone, Readiness},
    settings::{AppSettings, SettingsError},
};
use crate::stores::WorldState;
use crate::use_cases;
use crate::use_cases::spawns::{
    ClaimAndConsume, GetRespawnStatus, GetViewportLocations, ResetWorld, StartRespawn,
};

/// Main application state.
///
/// Built once at startup and passed to HTTP handlers via Axum state.
pub struct App {
    pub settings: AppSettings,
    pub readiness: Arc<Readiness>,
    pub world: Arc<WorldState>,
    pub use_cases: UseCases,
}

/// Container for all use cases.
pub struct UseCases {
    pub spawns: use_cases::SpawnUseCases,
}

impl App {
    /// Create a new App with all dependencies wired up.
    ///
    /// Marks [`Milestone::WorldStateReady`] on `readiness` once the world
    /// state exists.
    pub fn new(
        settings: AppSettings,
        provider: Arc<dyn LocationProviderPort>,
        clock: Arc<dyn ClockPort>,
        random: Arc<dyn RandomPort>,
        readiness: Arc<Readiness>,
    ) -> Result<Self, SettingsError> {
        let index = settings.spatial_index()?;
        let default_criteria = settings.default_criteria()?;

        let catalog = Arc::new(SpawnCatalog::new(settings.catalog_config(), random));
        let world = Arc::new(
            WorldState::new(provider, catalog, clock)
                .with_provider_timeout(settings.provider_timeout()),
        );

        let spawns = use_cases::SpawnUseCases::new(
            Arc::new(GetViewportLocations::new(
                world.clone(),
                index,
                default_criteria,
            )),
            Arc::new(ClaimAndConsume::new(world.clone())),
            Arc::new(StartRespawn::new(world.clone())),
            Arc::new(GetRespawnStatus::new(world.clone())),
            Arc::new(ResetWorld::new(world.clone())),
        );

        readiness.mark(Milestone::WorldStateReady);

        Ok(Self {
            settings,
            readiness,
            world,
            use_cases: UseCases { spawns },
        })
    }
}

//! Start respawn use case.

use std::sync::Arc;

use zoinkies_domain::{LocationId, SpawnLocation};

use crate::stores::{WorldError, WorldState};

/// Puts a claimed location on cooldown.
pub struct StartRespawn {
    world: Arc<WorldState>,
}

impl StartRespawn {
    pub fn new(world: Arc<WorldState>) -> Self {
        Self { world }
    }

    /// Execute the start respawn use case.
    ///
    /// # Arguments
    /// * `location_id` - A location in the claimed state
    /// * `cooldown` - Override for the cooldown carried by the location's rewards
    ///
    /// # Returns
    /// * `Ok(SpawnLocation)` - The location, now respawning
    /// * `Err(WorldError)` - Unknown id, wrong state, or negative cooldown
    pub async fn execute(
        &self,
        location_id: &LocationId,
        cooldown: Option<chrono::Duration>,
    ) -> Result<SpawnLocation, WorldError> {
        let cooldown = match cooldown {
            Some(cooldown) => cooldown,
            None => self.world.get(location_id)?.rewards().respawn_cooldown(),
        };
        self.world.start_respawn(location_id, cooldown)
    }
}

//! Claim and consume use case.
//!
//! Claims an available spawn location for a player and hands back the
//! rewards the catalog assigned to it. The caller starts the respawn once the
//! encounter is over.

use std::sync::Arc;

use zoinkies_domain::{LocationId, RewardParams};

use crate::stores::{WorldError, WorldState};

pub struct ClaimAndConsume {
    world: Arc<WorldState>,
}

impl ClaimAndConsume {
    pub fn new(world: Arc<WorldState>) -> Self {
        Self { world }
    }

    /// # Returns
    /// * `Ok(RewardParams)` - This caller won the claim
    /// * `Err(WorldError::AlreadyClaimed)` - Someone else holds it, or it is respawning
    /// * `Err(WorldError::NotFound)` - Unknown location
    pub async fn execute(&self, location_id: &LocationId) -> Result<RewardParams, WorldError> {
        let location = self.world.claim(location_id)?;
        tracing::debug!(
            location_id = %location_id,
            game_object = %location.game_object_type(),
            xp = location.rewards().xp,
            "Rewards granted"
        );
        Ok(location.rewards().clone())
    }
}

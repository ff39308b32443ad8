//! Respawn status use case, for "time left" feedback.

use std::sync::Arc;

use zoinkies_domain::LocationId;

use crate::stores::{RespawnStatus, WorldError, WorldState};

pub struct GetRespawnStatus {
    world: Arc<WorldState>,
}

impl GetRespawnStatus {
    pub fn new(world: Arc<WorldState>) -> Self {
        Self { world }
    }

    pub async fn execute(&self, location_id: &LocationId) -> Result<RespawnStatus, WorldError> {
        self.world.respawn_status(location_id)
    }
}

//! Spawn use cases.
//!
//! Viewport queries plus the claim / respawn lifecycle of spawn locations.

mod claim_and_consume;
mod get_viewport_locations;
mod reset_world;
mod respawn_status;
mod start_respawn;

pub use claim_and_consume::ClaimAndConsume;
pub use get_viewport_locations::{CellFailure, GetViewportLocations, ViewportError, ViewportLocations};
pub use reset_world::ResetWorld;
pub use respawn_status::GetRespawnStatus;
pub use start_respawn::StartRespawn;

use std::sync::Arc;

/// Container for spawn use cases.
pub struct SpawnUseCases {
    pub viewport: Arc<GetViewportLocations>,
    pub claim: Arc<ClaimAndConsume>,
    pub start_respawn: Arc<StartRespawn>,
    pub respawn_status: Arc<GetRespawnStatus>,
    pub reset: Arc<ResetWorld>,
}

impl SpawnUseCases {
    pub fn new(
        viewport: Arc<GetViewportLocations>,
        claim: Arc<ClaimAndConsume>,
        start_respawn: Arc<StartRespawn>,
        respawn_status: Arc<GetRespawnStatus>,
        reset: Arc<ResetWorld>,
    ) -> Self {
        Self {
            viewport,
            claim,
            start_respawn,
            respawn_status,
            reset,
        }
    }
}

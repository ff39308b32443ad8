//! Reset world use case ("new game").

use std::sync::Arc;

use crate::stores::{WorldState, WorldStats};

pub struct ResetWorld {
    world: Arc<WorldState>,
}

impl ResetWorld {
    pub fn new(world: Arc<WorldState>) -> Self {
        Self { world }
    }

    /// Clears every cell and location. Returns what was dropped.
    pub async fn execute(&self) -> WorldStats {
        let before = self.world.stats();
        self.world.reset();
        before
    }
}

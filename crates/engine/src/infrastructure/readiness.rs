//! Startup readiness barrier.
//!
//! Initialization marks milestones as they complete, in any order. Anything
//! that must not run before the service is fully wired awaits
//! [`Readiness::wait_ready`].

use std::fmt;

use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Milestone {
    SettingsLoaded,
    ProviderConfigured,
    WorldStateReady,
}

impl Milestone {
    pub const ALL: [Milestone; 3] = [
        Self::SettingsLoaded,
        Self::ProviderConfigured,
        Self::WorldStateReady,
    ];

    fn bit(self) -> u8 {
        match self {
            Self::SettingsLoaded => 1,
            Self::ProviderConfigured => 1 << 1,
            Self::WorldStateReady => 1 << 2,
        }
    }
}

impl fmt::Display for Milestone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SettingsLoaded => write!(f, "settings_loaded"),
            Self::ProviderConfigured => write!(f, "provider_configured"),
            Self::WorldStateReady => write!(f, "world_state_ready"),
        }
    }
}

const ALL_MASK: u8 = 0b111;

/// Tracks which startup milestones have been reached.
pub struct Readiness {
    state: watch::Sender<u8>,
}

impl Readiness {
    pub fn new() -> Self {
        let (state, _) = watch::channel(0);
        Self { state }
    }

    /// Record a milestone. Marking twice is harmless.
    pub fn mark(&self, milestone: Milestone) {
        self.state.send_modify(|mask| *mask |= milestone.bit());
        tracing::debug!(milestone = %milestone, "Readiness milestone reached");
    }

    pub fn is_ready(&self) -> bool {
        *self.state.borrow() == ALL_MASK
    }

    /// Milestones not reached yet.
    pub fn pending(&self) -> Vec<Milestone> {
        let mask = *self.state.borrow();
        Milestone::ALL
            .into_iter()
            .filter(|m| mask & m.bit() == 0)
            .collect()
    }

    /// Resolves once every milestone has been marked.
    pub async fn wait_ready(&self) {
        let mut rx = self.state.subscribe();
        // The sender lives in `self`, so the channel cannot close while we wait
        let _ = rx.wait_for(|mask| *mask == ALL_MASK).await;
    }
}

impl Default for Readiness {
    fn default() -> Self {
        Self::new()
    }
}

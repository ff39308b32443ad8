//! Respawn deadline arithmetic.

use chrono::{DateTime, Duration, Utc};
use zoinkies_domain::DomainError;

/// Computes when a depleted location becomes claimable again.
#[derive(Debug, Clone, Copy, Default)]
pub struct RespawnScheduler;

impl RespawnScheduler {
    pub fn new() -> Self {
        Self
    }

    /// `now + cooldown`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidCooldown` for a negative cooldown or one
    /// that overflows the calendar.
    pub fn compute_deadline(
        &self,
        now: DateTime<Utc>,
        cooldown: Duration,
    ) -> Result<DateTime<Utc>, DomainError> {
        if cooldown < Duration::zero() {
            return Err(DomainError::invalid_cooldown(format!(
                "cooldown must not be negative, got {}s",
                cooldown.num_seconds()
            )));
        }
        now.checked_add_signed(cooldown).ok_or_else(|| {
            DomainError::invalid_cooldown(format!("cooldown of {}s is too large", cooldown.num_seconds()))
        })
    }

    /// Time left until `deadline`, zero once it has passed.
    pub fn remaining(&self, deadline: DateTime<Utc>, now: DateTime<Utc>) -> Duration {
        (deadline - now).max(Duration::zero())
    }
}

//! Unified error types for the domain layer
//!
//! Provides a common error type for value-object validation and spawn-location
//! state transitions, so the engine can map failures without resorting to
//! String or anyhow.

use thiserror::Error;

/// Unified error type for domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Validation failed (e.g., invalid field values)
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Query rectangle is malformed or too large
    #[error("Invalid region: {0}")]
    InvalidRegion(String),

    /// Spawn location is not in a claimable state
    #[error("Location {id} is already claimed")]
    AlreadyClaimed { id: String },

    /// State transition not allowed
    #[error("Invalid state transition: {0}")]
    InvalidStateTransition(String),

    /// Cooldown must not be negative
    #[error("Invalid cooldown: {0}")]
    InvalidCooldown(String),
}

impl DomainError {
    /// Creates a validation error for business rule violations.
    ///
    /// Use this when a value object cannot be constructed:
    /// - Coordinates outside the valid range
    /// - Empty provider identifiers
    /// - Malformed cell tokens
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create an invalid region error
    pub fn invalid_region(msg: impl Into<String>) -> Self {
        Self::InvalidRegion(msg.into())
    }

    /// Create an already claimed error
    pub fn already_claimed(id: impl Into<String>) -> Self {
        Self::AlreadyClaimed { id: id.into() }
    }

    /// Create an invalid state transition error
    pub fn invalid_state_transition(msg: impl Into<String>) -> Self {
        Self::InvalidStateTransition(msg.into())
    }

    /// Create an invalid cooldown error
    pub fn invalid_cooldown(msg: impl Into<String>) -> Self {
        Self::InvalidCooldown(msg.into())
    }
}

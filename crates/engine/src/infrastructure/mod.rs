//! Infrastructure implementations.
//!
//! Contains port trait implementations for external dependencies, plus the
//! settings and readiness plumbing the service starts from.

pub mod clock;
pub mod playable_locations;
pub mod ports;
pub mod readiness;
pub mod resilient_provider;
pub mod settings;

//! In-memory state storage modules.
//!
//! Stores manage runtime state that lives only as long as the process:
//! - `WorldState` - spawn locations, the cell cache and in-flight fetches

pub mod world_state;

pub use world_state::{RespawnStatus, WorldError, WorldState, WorldStats, DEFAULT_PROVIDER_TIMEOUT};

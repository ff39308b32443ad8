//! Zoinkies domain: spawn locations, spatial cells and their invariants.
//!
//! This crate has no I/O. Time is always passed in by the caller, so every
//! lifecycle rule can be exercised deterministically.

pub mod entities;
pub mod error;
pub mod ids;
pub mod spatial;
pub mod value_objects;

pub use entities::{
    ChestTier, GameObjectCategory, GameObjectType, ItemReward, MinionTier, RawLocation,
    RewardItem, RewardParams, SpawnLocation, SpawnState,
};
pub use error::DomainError;
pub use ids::LocationId;
pub use spatial::{CellId, SpatialIndex, MAX_MERCATOR_LATITUDE, MAX_ZOOM, MIN_ZOOM};
pub use value_objects::{
    LatLng, LatLngRect, LocationCriteria, DEFAULT_FIELDS_TO_RETURN, MAX_LOCATION_COUNT,
};

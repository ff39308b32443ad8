//! Entity modules - Domain capability encapsulation.
//!
//! Each module owns one piece of spawn behaviour:
//! - `SpawnCatalog` - classify provider candidates into game objects
//! - `RespawnScheduler` - respawn deadline arithmetic

pub mod respawn_scheduler;
pub mod spawn_catalog;

pub use respawn_scheduler::RespawnScheduler;
pub use spawn_catalog::{
    default_tag_rules, CatalogConfig, Classification, CooldownTable, SelectionPolicy,
    SpawnCatalog, TagRule, Unclassifiable,
};

//! Zoinkies Engine library.
//!
//! Server-side spawn location lifecycle for the Zoinkies game.
//!
//! ## Structure
//!
//! - `entities/` - Spawn classification and respawn arithmetic
//! - `stores/` - In-memory world state
//! - `use_cases/` - User story orchestration across entities and stores
//! - `infrastructure/` - External dependency implementations (ports + adapters)
//! - `api/` - HTTP entry points
//! - `app` - Application composition

pub mod api;
pub mod app;
pub mod entities;
pub mod infrastructure;
pub mod stores;
pub mod use_cases;

/// Test fixtures module for integration testing.
#[cfg(test)]
pub mod test_fixtures;

pub use app::App;

//! Use cases - User story orchestration.
//!
//! Each module contains use cases for a specific domain area.
//! Use cases orchestrate across entity modules and stores to fulfill user stories.

pub mod spawns;

pub use spawns::SpawnUseCases;

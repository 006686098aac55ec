//! Data-driven content for the guard simulation.
//!
//! Provides loaders for the files a level ships with:
//! - Tuning configuration (TOML): perception, timing, manager and zone settings
//! - Level layouts (RON): zones, cover slots, patrol paths, markers and spawns
//!
//! All loaders deserialize guard-core types directly through their serde derives.

#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub use loaders::{ConfigLoader, ContentFactory, LevelLoader, LoadResult};

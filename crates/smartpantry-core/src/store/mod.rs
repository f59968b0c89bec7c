//! Local, persisted user state.
//!
//! This module provides the `PantryStore`, the single source of truth for the
//! pantry, the grocery list and favorite recipes, plus the persistence
//! providers it writes through:
//!
//! - `JsonFileProvider`: one JSON document on disk, replaced atomically
//! - `MemoryProvider`: in-process storage for tests and throwaway sessions

pub mod pantry;
pub mod persistence;

pub use pantry::{PantryStore, StoreSummary};
pub use persistence::{JsonFileProvider, MemoryProvider, PersistenceProvider, STATE_FILE};

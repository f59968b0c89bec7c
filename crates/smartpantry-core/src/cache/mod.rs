//! In-memory caching of remote data.
//!
//! This module provides the `IngredientCache`, a load-once copy of the
//! ingredient catalog searched locally instead of hitting the network
//! on every keystroke.

pub mod ingredients;

pub use ingredients::{filter_catalog, IngredientCache, EMPTY_QUERY_LIMIT, SEARCH_RESULT_LIMIT};

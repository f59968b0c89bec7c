//! SmartPantry core library.
//!
//! Pantry and grocery tracking backed by a local JSON document, plus recipe
//! and ingredient discovery through TheMealDB.
//!
//! - [`api`]: `RecipeClient`, the HTTP client and wire-format decoding
//! - [`cache`]: `IngredientCache`, a load-once searchable ingredient catalog
//! - [`store`]: `PantryStore`, merge-by-name collections persisted on every change
//! - [`models`]: domain types shared by all of the above

pub mod api;
pub mod cache;
pub mod config;
pub mod models;
pub mod store;
pub mod utils;

pub use api::{ApiError, IngredientSource, RecipeClient};
pub use cache::IngredientCache;
pub use config::Config;
pub use models::{
    thumbnail_url, Collection, FavoriteRecipe, Ingredient, IngredientDetail, PantryItem,
    PersistedState, RecipeDetail, RecipeSummary,
};
pub use store::{JsonFileProvider, MemoryProvider, PantryStore, PersistenceProvider, StoreSummary};

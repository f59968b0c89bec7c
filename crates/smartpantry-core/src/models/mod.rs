//! Data models for SmartPantry entities.
//!
//! - `Ingredient`, `IngredientDetail`: catalog entries and their metadata
//! - `RecipeSummary`, `RecipeDetail`: recipe search hits and full recipes
//! - `PantryItem`, `FavoriteRecipe`, `PersistedState`: locally owned user state

pub mod ingredient;
pub mod pantry;
pub mod recipe;

pub use ingredient::{thumbnail_url, Ingredient, IngredientDetail};
pub use pantry::{Collection, FavoriteRecipe, PantryItem, PersistedState};
pub use recipe::{compact_pair, flatten_ingredient_lines, RecipeDetail, RecipeSummary};

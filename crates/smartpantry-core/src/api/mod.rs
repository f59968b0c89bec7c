//! REST API client module for TheMealDB.
//!
//! This module provides the `RecipeClient` for fetching the ingredient
//! catalog, ingredient metadata, recipe searches and full recipes.
//!
//! The service needs no authentication; every endpoint is a plain GET
//! returning JSON with a nullable top-level `meals` or `ingredients` array.

pub mod client;
pub mod error;

pub use client::{IngredientSource, RecipeClient, DEFAULT_API_BASE_URL};
pub use error::ApiError;

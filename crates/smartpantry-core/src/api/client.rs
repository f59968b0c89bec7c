//! API client for communicating with TheMealDB REST API.
//!
//! This module provides the `RecipeClient` struct for fetching ingredient
//! and recipe data, and the `IngredientSource` seam the ingredient cache
//! loads its catalog through.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::models::{
    flatten_ingredient_lines, Ingredient, IngredientDetail, RecipeDetail, RecipeSummary,
};

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Base URL for the public TheMealDB v1 API (test key "1")
pub const DEFAULT_API_BASE_URL: &str = "https://www.themealdb.com/api/json/v1/1";

/// HTTP request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Number of positional ingredient/measure slots in a meal record.
const MAX_INGREDIENT_SLOTS: usize = 20;

/// Anything that can produce the full ingredient catalog.
#[async_trait]
pub trait IngredientSource: Send + Sync {
    async fn list_all_ingredients(&self) -> Result<Vec<Ingredient>>;
}

/// API client for TheMealDB.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct RecipeClient {
    client: Client,
    base_url: String,
}

impl RecipeClient {
    /// Create a client for the public API
    pub fn new() -> Result<Self> {
        Self::with_base_url(DEFAULT_API_BASE_URL)
    }

    /// Create a client for a specific API base (mirrors, test servers)
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(base_url, Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS))
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path_and_query: &str) -> String {
        format!("{}/{}", self.base_url, path_and_query)
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body).into())
        }
    }

    /// GET a URL and return the body. Only transport-level problems are errors.
    async fn get_text(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(ApiError::from)
            .with_context(|| format!("Failed to send GET request to {}", url))?;

        let response = Self::check_response(response).await?;

        response
            .text()
            .await
            .map_err(ApiError::from)
            .with_context(|| format!("Failed to read response body from {}", url))
    }

    // ===== Data Fetching Methods =====

    /// Fetch the full ingredient catalog, sorted by name
    pub async fn list_all_ingredients(&self) -> Result<Vec<Ingredient>> {
        let url = self.endpoint("list.php?i=list");
        let text = self.get_text(&url).await?;
        let ingredients = parse_ingredient_list(&text);
        debug!(count = ingredients.len(), "Ingredient catalog received");
        Ok(ingredients)
    }

    /// Fetch description and type for one ingredient by exact name
    pub async fn fetch_ingredient_detail(&self, name: &str) -> Result<Option<IngredientDetail>> {
        let url = self.endpoint(&format!("search.php?i={}", urlencoding::encode(name)));
        let text = self.get_text(&url).await?;
        debug!(ingredient = name, "Ingredient detail response received");
        Ok(parse_ingredient_detail(&text))
    }

    /// Search recipes by name. Failures of any kind yield an empty list.
    pub async fn search_recipes(&self, query: &str) -> Vec<RecipeSummary> {
        let query = query.trim();
        if query.is_empty() {
            return Vec::new();
        }

        let url = self.endpoint(&format!("search.php?s={}", urlencoding::encode(query)));
        match self.get_text(&url).await {
            Ok(text) => {
                let results = parse_recipe_summaries(&text);
                debug!(query, count = results.len(), "Recipe search response received");
                results
            }
            Err(e) => {
                warn!(query, error = %e, "Recipe search failed");
                Vec::new()
            }
        }
    }

    /// Look up one recipe by id. Failures of any kind yield `None`.
    pub async fn fetch_recipe_detail(&self, id: &str) -> Option<RecipeDetail> {
        let url = self.endpoint(&format!("lookup.php?i={}", urlencoding::encode(id)));
        match self.get_text(&url).await {
            Ok(text) => {
                debug!(recipe_id = id, "Recipe detail response received");
                parse_recipe_detail(&text)
            }
            Err(e) => {
                warn!(recipe_id = id, error = %e, "Recipe lookup failed");
                None
            }
        }
    }

    /// Fetch a random recipe. Failures of any kind yield `None`.
    pub async fn fetch_random_recipe(&self) -> Option<RecipeDetail> {
        let url = self.endpoint("random.php");
        match self.get_text(&url).await {
            Ok(text) => {
                debug!("Random recipe response received");
                parse_recipe_detail(&text)
            }
            Err(e) => {
                warn!(error = %e, "Random recipe request failed");
                None
            }
        }
    }
}

#[async_trait]
impl IngredientSource for RecipeClient {
    async fn list_all_ingredients(&self) -> Result<Vec<Ingredient>> {
        RecipeClient::list_all_ingredients(self).await
    }
}

// ============================================================================
// Response parsing
// ============================================================================

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub(crate) fn parse_ingredient_list(text: &str) -> Vec<Ingredient> {
    let envelope = match serde_json::from_str::<MealsEnvelope<IngredientListItem>>(text) {
        Ok(envelope) => envelope,
        Err(e) => {
            warn!(error = %e, "Failed to parse ingredient catalog");
            return Vec::new();
        }
    };

    let mut ingredients: Vec<Ingredient> = envelope
        .meals
        .unwrap_or_default()
        .into_iter()
        .filter_map(|item| {
            let name = non_blank(item.name)?;
            Some(Ingredient {
                description: non_blank(item.description),
                ..Ingredient::new(name)
            })
        })
        .collect();

    ingredients.sort_by(|a, b| a.name.cmp(&b.name));
    ingredients
}

pub(crate) fn parse_ingredient_detail(text: &str) -> Option<IngredientDetail> {
    let envelope: IngredientsEnvelope = match serde_json::from_str(text) {
        Ok(envelope) => envelope,
        Err(e) => {
            warn!(error = %e, "Failed to parse ingredient detail");
            return None;
        }
    };

    let info = envelope.ingredients?.into_iter().next()?;
    Some(IngredientDetail {
        description: info.description,
        kind: info.kind,
    })
}

pub(crate) fn parse_recipe_summaries(text: &str) -> Vec<RecipeSummary> {
    match serde_json::from_str::<MealsEnvelope<MealSummaryItem>>(text) {
        Ok(envelope) => envelope
            .meals
            .unwrap_or_default()
            .into_iter()
            .map(|m| RecipeSummary {
                id: m.id,
                name: m.name,
                thumb_url: non_blank(m.thumb),
            })
            .collect(),
        Err(e) => {
            warn!(error = %e, "Failed to parse recipe search response");
            Vec::new()
        }
    }
}

pub(crate) fn parse_recipe_detail(text: &str) -> Option<RecipeDetail> {
    let envelope: MealsEnvelope<MealRecord> = match serde_json::from_str(text) {
        Ok(envelope) => envelope,
        Err(e) => {
            warn!(error = %e, "Failed to parse recipe detail");
            return None;
        }
    };

    envelope
        .meals?
        .into_iter()
        .next()
        .map(MealRecord::into_detail)
}

// Internal API response types for parsing

#[derive(Debug, Deserialize)]
struct MealsEnvelope<T> {
    meals: Option<Vec<T>>,
}

#[derive(Debug, Deserialize)]
struct IngredientsEnvelope {
    ingredients: Option<Vec<IngredientInfo>>,
}

#[derive(Debug, Deserialize)]
struct IngredientListItem {
    #[serde(rename = "strIngredient")]
    name: Option<String>,
    #[serde(rename = "strDescription")]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct IngredientInfo {
    #[serde(rename = "strDescription")]
    description: Option<String>,
    #[serde(rename = "strType")]
    kind: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MealSummaryItem {
    #[serde(rename = "idMeal")]
    id: String,
    #[serde(rename = "strMeal")]
    name: String,
    #[serde(rename = "strMealThumb")]
    thumb: Option<String>,
}

/// A meal as the API sends it: named header fields plus up to 20
/// `strIngredientN` / `strMeasureN` pairs kept in the raw map.
#[derive(Debug, Deserialize)]
struct MealRecord {
    #[serde(rename = "idMeal")]
    id: String,
    #[serde(rename = "strMeal")]
    name: String,
    #[serde(rename = "strInstructions")]
    instructions: Option<String>,
    #[serde(rename = "strMealThumb")]
    thumb: Option<String>,
    #[serde(flatten)]
    fields: Map<String, Value>,
}

impl MealRecord {
    fn slot(&self, prefix: &str, index: usize) -> Option<&str> {
        self.fields
            .get(&format!("{}{}", prefix, index))
            .and_then(Value::as_str)
    }

    /// Ingredient/measure pairs in slot order. Slots the endpoint omits read as empty.
    fn ingredient_slots(&self) -> Vec<(Option<&str>, Option<&str>)> {
        (1..=MAX_INGREDIENT_SLOTS)
            .map(|i| (self.slot("strIngredient", i), self.slot("strMeasure", i)))
            .collect()
    }

    fn into_detail(self) -> RecipeDetail {
        let ingredient_lines = flatten_ingredient_lines(self.ingredient_slots());
        RecipeDetail {
            id: self.id,
            name: self.name,
            instructions: self.instructions.unwrap_or_default(),
            thumb_url: non_blank(self.thumb),
            ingredient_lines,
        }
    }
}

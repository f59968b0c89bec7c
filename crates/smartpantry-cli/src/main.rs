//! SmartPantry CLI - pantry, grocery list and recipe finder for the terminal.
//!
//! Ingredient and recipe data come from TheMealDB; the pantry, grocery list
//! and favorites are kept in a local JSON document.

use std::io;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{debug, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use smartpantry_core::utils::truncate_string;
use smartpantry_core::{
    thumbnail_url, Collection, Config, IngredientCache, JsonFileProvider, MemoryProvider,
    PantryItem, PantryStore, RecipeClient, RecipeDetail,
};

// ============================================================================
// Constants
// ============================================================================

/// Environment variable overriding the API base URL
const ENV_API_URL: &str = "SMARTPANTRY_API_URL";

/// Environment variable overriding the data directory
const ENV_DATA_DIR: &str = "SMARTPANTRY_DATA_DIR";

/// Characters of ingredient description shown in listings
const DESCRIPTION_PREVIEW_LEN: usize = 72;

// ============================================================================
// Command line
// ============================================================================

#[derive(Debug, Parser)]
#[command(
    name = "smartpantry",
    version,
    about = "Track your pantry, build grocery lists, find recipes"
)]
struct Cli {
    /// Keep all changes in memory for this run only
    #[arg(long, global = true)]
    ephemeral: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Search the ingredient catalog (first 30 entries without a query)
    Ingredients { query: Option<String> },

    /// Show an ingredient's description and image, optionally adding it to a list
    Ingredient {
        name: String,
        #[arg(long, value_enum)]
        add_to: Option<Target>,
        #[arg(long, default_value_t = 1)]
        quantity: u32,
    },

    /// Search recipes by name
    Recipes {
        #[arg(required = true)]
        query: Vec<String>,
    },

    /// Show a recipe, optionally adding all its ingredients to a list
    Recipe {
        id: String,
        #[arg(long, value_enum)]
        add_to: Option<Target>,
    },

    /// Suggest a random recipe
    Random {
        #[arg(long, value_enum)]
        add_to: Option<Target>,
    },

    /// Manage the pantry
    Pantry {
        #[command(subcommand)]
        action: Option<ItemAction>,
    },

    /// Manage the grocery list
    Grocery {
        #[command(subcommand)]
        action: Option<ItemAction>,
    },

    /// Move everything on the grocery list into the pantry
    Restock,

    /// Add or remove a recipe from favorites
    Favorite { id: String },

    /// List favorite recipes
    Favorites,

    /// Show item and favorite counts
    Summary,

    /// Show or change the saved configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Update values in the config file
    Set {
        #[arg(long)]
        api_url: Option<String>,
        #[arg(long)]
        data_dir: Option<std::path::PathBuf>,
        #[arg(long)]
        timeout_secs: Option<u64>,
    },
}

#[derive(Debug, Subcommand)]
enum ItemAction {
    /// List items
    List,
    /// Add items by name, merging with existing entries
    Add {
        #[arg(required = true)]
        names: Vec<String>,
    },
    /// Add one unit to an item (by id or name)
    Inc { item: String },
    /// Remove one unit from an item; it is dropped at zero
    Dec { item: String },
    /// Set an item's quantity; zero removes it
    Set { item: String, quantity: u32 },
    /// Toggle an item's checked mark
    Check { item: String },
    /// Remove an item
    Remove { item: String },
    /// Remove every item
    Clear,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Target {
    Pantry,
    Grocery,
}

impl From<Target> for Collection {
    fn from(target: Target) -> Self {
        match target {
            Target::Pantry => Collection::Pantry,
            Target::Grocery => Collection::Grocery,
        }
    }
}

// ============================================================================
// Setup
// ============================================================================

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

/// Load the config file and apply environment overrides
fn load_config() -> Result<Config> {
    let mut config = Config::load().context("Failed to load config")?;
    if let Ok(url) = std::env::var(ENV_API_URL) {
        config.api_base_url = Some(url);
    }
    if let Ok(dir) = std::env::var(ENV_DATA_DIR) {
        config.data_dir = Some(dir.into());
    }
    Ok(config)
}

fn open_store(config: &Config, ephemeral: bool) -> Result<PantryStore> {
    if ephemeral {
        debug!("Using in-memory state");
        return Ok(PantryStore::open(MemoryProvider::new()));
    }
    let provider = JsonFileProvider::in_dir(config.data_dir()?);
    debug!(path = %provider.path().display(), "Using state file");
    Ok(PantryStore::open(provider))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    init_tracing();
    let cli = Cli::parse();

    let config = load_config()?;
    let client = RecipeClient::with_timeout(config.api_base_url(), config.request_timeout())?;
    let mut store = open_store(&config, cli.ephemeral)?;
    info!(api = client.base_url(), "SmartPantry starting");

    run(cli.command, &config, &client, &mut store).await
}

// ============================================================================
// Commands
// ============================================================================

async fn run(
    command: Command,
    config: &Config,
    client: &RecipeClient,
    store: &mut PantryStore,
) -> Result<()> {
    match command {
        Command::Ingredients { query } => {
            let cache = IngredientCache::new(std::sync::Arc::new(client.clone()));
            let results = cache.search(query.as_deref().unwrap_or("")).await;
            if results.is_empty() {
                println!("No ingredients found.");
            }
            for ingredient in results {
                match ingredient.description.as_deref() {
                    Some(desc) => println!(
                        "{}  -  {}",
                        ingredient.name,
                        truncate_string(desc, DESCRIPTION_PREVIEW_LEN)
                    ),
                    None => println!("{}", ingredient.name),
                }
            }
        }

        Command::Ingredient { name, add_to, quantity } => {
            println!("{}", name);
            println!("Image: {}", thumbnail_url(&name));
            let detail = match client.fetch_ingredient_detail(&name).await {
                Ok(detail) => detail,
                Err(e) => {
                    warn!(ingredient = %name, error = %e, "Ingredient detail unavailable");
                    None
                }
            };
            match detail.as_ref().and_then(|d| d.description_display()) {
                Some(desc) => println!("\n{}", desc),
                None => println!("\nNo description available."),
            }
            if let Some(kind) = detail.and_then(|d| d.kind) {
                println!("Type: {}", kind);
            }
            if let Some(target) = add_to {
                let collection = Collection::from(target);
                if store.add_quantity(collection, &name, quantity) {
                    println!("Added {} x {} to {}", quantity, name, collection);
                }
            }
        }

        Command::Recipes { query } => {
            let results = client.search_recipes(&query.join(" ")).await;
            if results.is_empty() {
                println!("No recipes found.");
            }
            for recipe in results {
                let marker = if store.is_favorite(&recipe.id) { "*" } else { " " };
                println!("{} {:>6}  {}", marker, recipe.id, recipe.name);
            }
        }

        Command::Recipe { id, add_to } => match client.fetch_recipe_detail(&id).await {
            Some(detail) => show_recipe(&detail, add_to, store),
            None => println!("No recipe with id {}.", id),
        },

        Command::Random { add_to } => match client.fetch_random_recipe().await {
            Some(detail) => show_recipe(&detail, add_to, store),
            None => println!("No recipe returned."),
        },

        Command::Pantry { action } => {
            run_item_action(store, Collection::Pantry, action.unwrap_or(ItemAction::List))?
        }

        Command::Grocery { action } => {
            run_item_action(store, Collection::Grocery, action.unwrap_or(ItemAction::List))?
        }

        Command::Restock => {
            let moved = store.grocery().len();
            if moved == 0 {
                println!("Grocery list is empty.");
            } else {
                store.move_grocery_to_pantry();
                println!("Moved {} grocery item{} into the pantry.", moved, plural(moved));
            }
        }

        Command::Favorite { id } => {
            if store.remove_favorite(&id) {
                println!("Removed {} from favorites.", id);
            } else {
                match client.fetch_recipe_detail(&id).await {
                    Some(detail) => {
                        store.toggle_favorite(&detail);
                        println!("Added {} to favorites.", detail.name);
                    }
                    None => println!("No recipe with id {}.", id),
                }
            }
        }

        Command::Favorites => {
            if store.favorites().is_empty() {
                println!("No favorite recipes yet.");
            }
            for fav in store.favorites() {
                println!("{:>6}  {}", fav.id, fav.name);
            }
        }

        Command::Summary => {
            let summary = store.summary();
            println!("Pantry:    {} items", summary.pantry_items);
            println!("Grocery:   {} items", summary.grocery_items);
            println!("Favorites: {} recipes", summary.favorite_recipes);
        }

        Command::Config { action } => run_config(config, action.unwrap_or(ConfigAction::Show))?,
    }
    Ok(())
}

fn run_config(effective: &Config, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            println!("Config file: {}", Config::config_path()?.display());
            println!("API URL:     {}", effective.api_base_url());
            println!("Data dir:    {}", effective.data_dir()?.display());
            println!("Timeout:     {}s", effective.request_timeout().as_secs());
        }
        ConfigAction::Set { api_url, data_dir, timeout_secs } => {
            // Start from the file alone so environment overrides are not persisted
            let mut saved = Config::load().context("Failed to load config")?;
            if api_url.is_some() {
                saved.api_base_url = api_url;
            }
            if data_dir.is_some() {
                saved.data_dir = data_dir;
            }
            if timeout_secs.is_some() {
                saved.request_timeout_secs = timeout_secs;
            }
            saved.save().context("Failed to save config")?;
            println!("Saved {}", Config::config_path()?.display());
        }
    }
    Ok(())
}

fn show_recipe(detail: &RecipeDetail, add_to: Option<Target>, store: &mut PantryStore) {
    let heart = if store.is_favorite(&detail.id) { " (favorite)" } else { "" };
    println!("{} [{}]{}", detail.name, detail.id, heart);
    if let Some(ref thumb) = detail.thumb_url {
        println!("Image: {}", thumb);
    }

    if !detail.ingredient_lines.is_empty() {
        println!("\nIngredients:");
        for line in &detail.ingredient_lines {
            println!("  - {}", line);
        }
    }
    if !detail.instructions.trim().is_empty() {
        println!("\nInstructions:\n{}", detail.instructions.trim());
    }

    if let Some(target) = add_to {
        let collection = Collection::from(target);
        let added = store.merge_or_append(collection, &detail.ingredient_lines);
        if added > 0 {
            println!("\nAdded {} ingredient{} to {}.", added, plural(added), collection);
        }
    }
}

fn run_item_action(
    store: &mut PantryStore,
    collection: Collection,
    action: ItemAction,
) -> Result<()> {
    match action {
        ItemAction::List => {
            let items: Vec<&PantryItem> = match collection {
                Collection::Pantry => store.pantry_sorted(),
                Collection::Grocery => store.grocery().iter().collect(),
            };
            if items.is_empty() {
                println!("No items in {}.", collection);
            }
            for item in items {
                let mark = if item.checked { "[x]" } else { "[ ]" };
                println!("{} {:>3} x {}  ({})", mark, item.quantity, item.name, item.id);
            }
        }
        ItemAction::Add { names } => {
            let added = store.merge_or_append(collection, &names);
            println!("Added {} item{} to {}.", added, plural(added), collection);
        }
        ItemAction::Inc { item } => {
            let id = resolve(store, collection, &item)?;
            if let Some(quantity) = store.increment(collection, id) {
                println!("{} now at {}.", item, quantity);
            }
        }
        ItemAction::Dec { item } => {
            let id = resolve(store, collection, &item)?;
            match store.decrement(collection, id) {
                Some(0) => println!("Removed {} from {}.", item, collection),
                Some(quantity) => println!("{} now at {}.", item, quantity),
                None => {}
            }
        }
        ItemAction::Set { item, quantity } => {
            let id = resolve(store, collection, &item)?;
            store.set_quantity(collection, id, quantity);
            if quantity == 0 {
                println!("Removed {} from {}.", item, collection);
            } else {
                println!("{} set to {}.", item, quantity);
            }
        }
        ItemAction::Check { item } => {
            let id = resolve(store, collection, &item)?;
            if let Some(checked) = store.toggle_checked(collection, id) {
                println!("{} {}.", item, if checked { "checked" } else { "unchecked" });
            }
        }
        ItemAction::Remove { item } => {
            let id = resolve(store, collection, &item)?;
            if let Some(removed) = store.remove(collection, id) {
                println!("Removed {} from {}.", removed.name, collection);
            }
        }
        ItemAction::Clear => {
            store.clear(collection);
            println!("Cleared {}.", collection);
        }
    }
    Ok(())
}

fn resolve(store: &PantryStore, collection: Collection, key: &str) -> Result<uuid::Uuid> {
    store
        .resolve(collection, key)
        .ok_or_else(|| anyhow::anyhow!("No item '{}' in {}", key, collection))
}

fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

/// Loader for the bundled recipe dataset.
///
/// The dataset is a JSON array of recipe objects. Entries that fail to
/// deserialize are logged and skipped rather than failing the whole load;
/// missing fields take their defaults (see `Recipe`).
use std::collections::HashSet;
use std::path::Path;

use tracing::{info, warn};

use crate::error::AppError;
use crate::model::Recipe;

/// Category labels scraped from the source site's navigation rather than the
/// recipes themselves. Stripped at load time.
const CATEGORY_BLACKLIST: &[&str] = &[
    "inicio",
    "Recetas",
    "ver receta",
    "ver todas las recetas",
    "Empresa Gourmet",
    "Contacto",
    "Seguimiento del envío",
    "Preguntas frecuentes",
    "Política de privacidad",
    "GOURMETCHILE",
    "CLUBGOURMETTV",
    "aquí",
];

/// Load all recipes from a JSON file. Called once at startup; the returned
/// list is immutable for the lifetime of the process.
pub fn load(path: &Path) -> Result<Vec<Recipe>, AppError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| AppError::Dataset(format!("failed to read {}: {e}", path.display())))?;
    let recipes = parse_recipes(&content)?;
    info!(count = recipes.len(), path = %path.display(), "recipe dataset loaded");
    Ok(recipes)
}

/// Parse a JSON array of recipe objects, tolerating malformed entries.
pub fn parse_recipes(content: &str) -> Result<Vec<Recipe>, AppError> {
    let values: Vec<serde_json::Value> = serde_json::from_str(content)
        .map_err(|e| AppError::Dataset(format!("dataset is not a JSON array: {e}")))?;

    let blacklist: HashSet<&str> = CATEGORY_BLACKLIST.iter().copied().collect();

    let mut recipes = Vec::with_capacity(values.len());
    for value in values {
        let mut recipe: Recipe = match serde_json::from_value(value) {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "skipping malformed recipe entry");
                continue;
            }
        };
        recipe
            .categories
            .retain(|c| !c.trim().is_empty() && !blacklist.contains(c.as_str()));
        recipes.push(recipe);
    }
    Ok(recipes)
}

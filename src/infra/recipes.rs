//! Static forge recipe catalog loaded from JSON.

use std::{
    collections::BTreeMap,
    fs, io,
    num::NonZeroU32,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use crate::domain::Recipe;

pub const DEFAULT_RECIPES_FILE: &str = "forge_recipes.json";

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read recipe catalog {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse recipe catalog: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("recipe #{index} ({item_id}) is invalid: {reason}")]
    InvalidRecipe {
        index: usize,
        item_id: String,
        reason: String,
    },
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecipeDto {
    item_id: String,
    time_hours: i64,
    #[serde(default)]
    hotm_requirement: i64,
    #[serde(default)]
    items: BTreeMap<String, i64>,
}

pub fn load_recipes(path: &Path) -> Result<Vec<Recipe>, CatalogError> {
    let raw = fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let recipes = parse_recipes(&raw)?;
    info!("Loaded {} forge recipes from {}", recipes.len(), path.display());
    Ok(recipes)
}

pub fn parse_recipes(raw: &str) -> Result<Vec<Recipe>, CatalogError> {
    let dtos: Vec<RecipeDto> = serde_json::from_str(raw)?;
    dtos.into_iter()
        .enumerate()
        .map(|(index, dto)| validate_recipe(index, dto))
        .collect()
}

fn validate_recipe(index: usize, dto: RecipeDto) -> Result<Recipe, CatalogError> {
    let invalid = |reason: String| CatalogError::InvalidRecipe {
        index,
        item_id: dto.item_id.clone(),
        reason,
    };

    let time_hours = u32::try_from(dto.time_hours)
        .ok()
        .and_then(NonZeroU32::new)
        .ok_or_else(|| invalid(format!("timeHours must be positive, got {}", dto.time_hours)))?;

    let hotm_requirement = u32::try_from(dto.hotm_requirement).map_err(|_| {
        invalid(format!(
            "hotmRequirement must not be negative, got {}",
            dto.hotm_requirement
        ))
    })?;

    let mut ingredients = BTreeMap::new();
    for (ingredient_id, quantity) in &dto.items {
        let quantity = u32::try_from(*quantity)
            .ok()
            .filter(|qty| *qty >= 1)
            .ok_or_else(|| {
                invalid(format!(
                    "ingredient {ingredient_id} needs a quantity of at least 1, got {quantity}"
                ))
            })?;
        ingredients.insert(ingredient_id.clone(), quantity);
    }

    Ok(Recipe {
        item_id: dto.item_id,
        time_hours,
        hotm_requirement,
        ingredients,
    })
}

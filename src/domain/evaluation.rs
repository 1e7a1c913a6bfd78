//! Joins forge recipes against a bazaar snapshot and computes per-recipe profit.

use std::{collections::HashMap, num::NonZeroU32};

use thiserror::Error;
use tracing::{debug, warn};

use super::entities::{
    Diagnostic, EvaluatedRecipe, MissingIngredientPolicy, PriceSnapshot, QuickPrice, Recipe,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("ingredient {ingredient_id} of recipe {item_id} has no bazaar listing")]
    MissingIngredient {
        item_id: String,
        ingredient_id: String,
    },
}

/// Result of one join pass: the recipes that resolved plus everything that didn't.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Evaluation {
    pub recipes: Vec<EvaluatedRecipe>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Whole-coin prices keyed by product id, built once per run.
pub struct PriceIndex<'a> {
    entries: HashMap<&'a str, CoinPrice>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CoinPrice {
    pub buy: i64,
    pub sell: i64,
}

impl From<&QuickPrice> for CoinPrice {
    fn from(price: &QuickPrice) -> Self {
        Self {
            buy: price.buy_coins(),
            sell: price.sell_coins(),
        }
    }
}

impl<'a> PriceIndex<'a> {
    pub fn new(snapshot: &'a PriceSnapshot) -> Self {
        let entries = snapshot
            .prices
            .iter()
            .map(|(id, price)| (id.as_str(), CoinPrice::from(price)))
            .collect();
        Self { entries }
    }

    pub fn get(&self, product_id: &str) -> Option<CoinPrice> {
        self.entries.get(product_id).copied()
    }
}

pub fn evaluate_recipes(
    snapshot: &PriceSnapshot,
    recipes: &[Recipe],
    policy: MissingIngredientPolicy,
) -> Result<Evaluation, EngineError> {
    let index = PriceIndex::new(snapshot);
    let mut evaluation = Evaluation {
        recipes: Vec::with_capacity(recipes.len()),
        diagnostics: Vec::new(),
    };

    for recipe in recipes {
        if let Some(evaluated) =
            evaluate_recipe(recipe, &index, policy, &mut evaluation.diagnostics)?
        {
            evaluation.recipes.push(evaluated);
        }
    }

    debug!(
        resolved = evaluation.recipes.len(),
        total = recipes.len(),
        "recipe evaluation finished"
    );
    Ok(evaluation)
}

/// Evaluates a single recipe. `Ok(None)` means the recipe was skipped and a diagnostic recorded.
pub fn evaluate_recipe(
    recipe: &Recipe,
    index: &PriceIndex<'_>,
    policy: MissingIngredientPolicy,
    diagnostics: &mut Vec<Diagnostic>,
) -> Result<Option<EvaluatedRecipe>, EngineError> {
    let Some(output) = index.get(&recipe.item_id) else {
        let diagnostic = Diagnostic::MissingMarketEntry {
            item_id: recipe.item_id.clone(),
        };
        warn!("{diagnostic}");
        diagnostics.push(diagnostic);
        return Ok(None);
    };

    let Some(cost) = ingredient_cost(recipe, index, policy, diagnostics)? else {
        return Ok(None);
    };

    Ok(Some(EvaluatedRecipe {
        item_id: recipe.item_id.clone(),
        time_hours: recipe.time_hours,
        hotm_requirement: recipe.hotm_requirement,
        ingredients: recipe.ingredients.clone(),
        cost,
        profit_per_hour: profit_per_hour(output.sell, cost, recipe.time_hours),
        profit_total: output.sell.saturating_sub(cost),
    }))
}

/// Sum of `quantity * buy price` over every ingredient.
/// Returns `Ok(None)` when the policy drops a recipe with an unlisted ingredient.
pub fn ingredient_cost(
    recipe: &Recipe,
    index: &PriceIndex<'_>,
    policy: MissingIngredientPolicy,
    diagnostics: &mut Vec<Diagnostic>,
) -> Result<Option<i64>, EngineError> {
    let mut cost: i64 = 0;

    for (ingredient_id, &quantity) in &recipe.ingredients {
        match index.get(ingredient_id) {
            Some(price) => {
                cost = cost.saturating_add(price.buy.saturating_mul(i64::from(quantity)));
            }
            None => match policy {
                MissingIngredientPolicy::Zero | MissingIngredientPolicy::Drop => {
                    let dropped = policy == MissingIngredientPolicy::Drop;
                    let diagnostic = Diagnostic::MissingIngredient {
                        item_id: recipe.item_id.clone(),
                        ingredient_id: ingredient_id.clone(),
                        dropped,
                    };
                    if dropped {
                        warn!("{diagnostic}");
                    } else {
                        debug!("{diagnostic}");
                    }
                    diagnostics.push(diagnostic);
                    if dropped {
                        return Ok(None);
                    }
                }
                MissingIngredientPolicy::Error => {
                    return Err(EngineError::MissingIngredient {
                        item_id: recipe.item_id.clone(),
                        ingredient_id: ingredient_id.clone(),
                    });
                }
            },
        }
    }

    Ok(Some(cost))
}

/// `floor(sell / hours) - floor(cost / hours)`.
///
/// Each term is floored on its own before subtracting, which can differ from flooring the
/// net profit (sell 10, cost 2, 3 hours gives 3, not 2).
pub fn profit_per_hour(sell: i64, cost: i64, time_hours: NonZeroU32) -> i64 {
    let hours = i64::from(time_hours.get());
    sell.div_euclid(hours) - cost.div_euclid(hours)
}

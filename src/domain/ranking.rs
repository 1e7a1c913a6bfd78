//! Skill-gate filtering, slot scaling and ordering of evaluated recipes.

use std::num::NonZeroU32;

use super::entities::{EvaluatedRecipe, RankedRecipe};

impl RankedRecipe {
    /// Scales every additive metric linearly by the number of forge slots.
    pub fn from_evaluated(recipe: &EvaluatedRecipe, slots: NonZeroU32) -> Self {
        let slots = i64::from(slots.get());
        Self {
            item_id: recipe.item_id.clone(),
            cost: recipe.cost,
            profit_per_hour: recipe.profit_per_hour,
            profit_total: recipe.profit_total,
            time_hours: recipe.time_hours.get(),
            hotm_requirement: recipe.hotm_requirement,
            cost_for_slots: recipe.cost.saturating_mul(slots),
            profit_per_hour_for_slots: recipe.profit_per_hour.saturating_mul(slots),
            profit_total_for_slots: recipe.profit_total.saturating_mul(slots),
        }
    }
}

pub fn is_unlocked(recipe: &EvaluatedRecipe, skill_level: u32) -> bool {
    recipe.hotm_requirement <= skill_level
}

/// Drops recipes above `skill_level` and orders the rest by un-scaled profit per hour,
/// highest first. Equal rates keep their catalog order.
pub fn rank_recipes(
    recipes: &[EvaluatedRecipe],
    skill_level: u32,
    slots: NonZeroU32,
) -> Vec<RankedRecipe> {
    let mut ranked: Vec<RankedRecipe> = recipes
        .iter()
        .filter(|recipe| is_unlocked(recipe, skill_level))
        .map(|recipe| RankedRecipe::from_evaluated(recipe, slots))
        .collect();

    // sort_by is stable
    ranked.sort_by(|a, b| b.profit_per_hour.cmp(&a.profit_per_hour));
    ranked
}

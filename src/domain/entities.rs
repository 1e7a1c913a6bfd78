use std::{
    collections::{BTreeMap, HashMap},
    fmt,
    num::NonZeroU32,
    str::FromStr,
    time::{Duration, SystemTime},
};

use serde::{Deserialize, Serialize};

/// Identifier for bazaar products (e.g. `REFINED_DIAMOND`).
pub type ProductId = String;

/// Instant buy/sell prices for one bazaar product.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QuickPrice {
    /// Price paid to acquire one unit right now.
    pub buy_price: f64,
    /// Price received when dumping one unit right now.
    pub sell_price: f64,
}

impl QuickPrice {
    pub fn new(buy_price: f64, sell_price: f64) -> Self {
        Self {
            buy_price,
            sell_price,
        }
    }

    /// Buy price in whole coins. Fractions are truncated.
    pub fn buy_coins(&self) -> i64 {
        self.buy_price as i64
    }

    /// Sell price in whole coins. Fractions are truncated.
    pub fn sell_coins(&self) -> i64 {
        self.sell_price as i64
    }
}

/// Immutable view of the bazaar at one point in time.
#[derive(Clone, Debug, PartialEq)]
pub struct PriceSnapshot {
    pub as_of: SystemTime,
    pub prices: HashMap<ProductId, QuickPrice>,
}

impl PriceSnapshot {
    pub fn new(as_of: SystemTime, prices: HashMap<ProductId, QuickPrice>) -> Self {
        Self { as_of, prices }
    }

    /// Age of the snapshot relative to `now`. A snapshot dated in the future has age zero.
    pub fn age(&self, now: SystemTime) -> Duration {
        now.duration_since(self.as_of).unwrap_or(Duration::ZERO)
    }

    pub fn is_stale(&self, max_age: Duration, now: SystemTime) -> bool {
        self.age(now) > max_age
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }
}

/// A validated forge recipe: one output, a flat list of direct inputs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Recipe {
    pub item_id: ProductId,
    pub time_hours: NonZeroU32,
    pub hotm_requirement: u32,
    /// Ingredient id -> required quantity (always >= 1).
    pub ingredients: BTreeMap<ProductId, u32>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EvaluatedRecipe {
    pub item_id: ProductId,
    pub time_hours: NonZeroU32,
    pub hotm_requirement: u32,
    pub ingredients: BTreeMap<ProductId, u32>,
    /// Coins spent buying every ingredient at its buy price.
    pub cost: i64,
    pub profit_per_hour: i64,
    /// Profit of one finished craft, not normalized by time.
    pub profit_total: i64,
}

/// Row handed to the presentation layer after filtering and slot scaling.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedRecipe {
    pub item_id: ProductId,
    pub cost: i64,
    pub profit_per_hour: i64,
    pub profit_total: i64,
    pub time_hours: u32,
    pub hotm_requirement: u32,
    pub cost_for_slots: i64,
    pub profit_per_hour_for_slots: i64,
    pub profit_total_for_slots: i64,
}

/// How an ingredient that has no bazaar listing is priced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingIngredientPolicy {
    /// Count the ingredient as free and keep the recipe.
    #[default]
    Zero,
    /// Leave the whole recipe out of the results.
    #[serde(alias = "dropRecipe", alias = "drop_recipe")]
    Drop,
    /// Abort the evaluation.
    Error,
}

impl MissingIngredientPolicy {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Zero => "zero",
            Self::Drop => "drop",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for MissingIngredientPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for MissingIngredientPolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "zero" => Ok(Self::Zero),
            "drop" | "droprecipe" | "drop_recipe" => Ok(Self::Drop),
            "error" => Ok(Self::Error),
            other => Err(format!(
                "unknown missing-ingredient policy '{other}' (expected zero, drop or error)"
            )),
        }
    }
}

/// Non-fatal problems found while joining recipes against the snapshot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Diagnostic {
    /// The recipe output has no bazaar listing; the recipe was skipped.
    MissingMarketEntry { item_id: ProductId },
    /// An ingredient has no bazaar listing.
    MissingIngredient {
        item_id: ProductId,
        ingredient_id: ProductId,
        dropped: bool,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingMarketEntry { item_id } => write!(f, "Item not found {item_id}"),
            Self::MissingIngredient {
                item_id,
                ingredient_id,
                dropped: true,
            } => write!(
                f,
                "Ingredient {ingredient_id} of {item_id} not found, recipe skipped"
            ),
            Self::MissingIngredient {
                item_id,
                ingredient_id,
                dropped: false,
            } => write!(
                f,
                "Ingredient {ingredient_id} of {item_id} not found, counted as free"
            ),
        }
    }
}

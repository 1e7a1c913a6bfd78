//! Forge recipe valuation lives here.

pub mod entities;
pub mod evaluation;
pub mod ranking;

pub use entities::{MissingIngredientPolicy, PriceSnapshot, QuickPrice, RankedRecipe, Recipe};
pub use evaluation::{evaluate_recipes, EngineError};
pub use ranking::rank_recipes;

use std::time::Duration;

use crate::models::{Budget, FoodSource};

// ─────────────────────────────────────────────────────────────────────────────
// Constraint defaults
// ─────────────────────────────────────────────────────────────────────────────

/// Maximum mean macro deviation, in percent.
pub const DEFAULT_TOLERANCE_PERCENT: f64 = 5.0;

pub const DEFAULT_MAX_SUGGESTIONS: usize = 10;

/// Foods below this confidence are never proposed.
pub const DEFAULT_MIN_CONFIDENCE: f64 = 0.7;

// ─────────────────────────────────────────────────────────────────────────────
// Score weights (sum to 1.0)
// ─────────────────────────────────────────────────────────────────────────────

pub const MACRO_WEIGHT: f64 = 0.5;
pub const PREFERENCE_WEIGHT: f64 = 0.2;
pub const AVAILABILITY_WEIGHT: f64 = 0.2;
pub const COST_WEIGHT: f64 = 0.1;

/// Macro score points lost per percent of overall deviation.
pub const MACRO_PENALTY_PER_PERCENT: f64 = 2.0;

/// Preference score for any food that passed the filters.
pub const PREFERENCE_BASE: f64 = 80.0;

/// Added when a category tag matches a preferred cuisine.
pub const CUISINE_MATCH_BONUS: f64 = 20.0;

/// Share of the availability score driven by confidence; the rest is source quality.
pub const CONFIDENCE_SHARE: f64 = 0.5;

pub const STAPLE_COST_SCORE: f64 = 90.0;
pub const DEFAULT_COST_SCORE: f64 = 60.0;
pub const LOW_BUDGET_NON_STAPLE_COST_SCORE: f64 = 40.0;

/// Name fragments of cheap, widely stocked foods.
pub const STAPLE_KEYWORDS: &[&str] = &[
    "rice", "oat", "bean", "lentil", "chickpea", "pea", "egg", "potato", "pasta", "bread",
    "flour", "milk", "banana", "apple", "cabbage", "carrot", "onion", "chicken",
];

// ─────────────────────────────────────────────────────────────────────────────
// Reasons
// ─────────────────────────────────────────────────────────────────────────────

/// Overall deviation at or below which a candidate reads "very similar".
pub const VERY_SIMILAR_PERCENT: f64 = 1.0;

/// Overall deviation at or below which a candidate reads "similar".
pub const SIMILAR_PERCENT: f64 = 3.0;

// ─────────────────────────────────────────────────────────────────────────────
// Portion optimization
// ─────────────────────────────────────────────────────────────────────────────

/// Smallest suggested quantity, in the candidate's base unit.
pub const MIN_SUGGESTED_QUANTITY: f64 = 1.0;

// ─────────────────────────────────────────────────────────────────────────────
// Re-ranking
// ─────────────────────────────────────────────────────────────────────────────

/// Boost given to the re-ranker's first pick; later picks get less.
pub const RERANK_MAX_BOOST: f64 = 5.0;

pub const DEFAULT_RERANK_TIMEOUT: Duration = Duration::from_secs(5);

/// How many top candidates are sent to the re-ranker.
pub const DEFAULT_RERANK_TOP_N: usize = 10;

/// Source quality on a 0-100 scale.
pub fn source_quality(source: FoodSource) -> f64 {
    match source {
        FoodSource::Local => 100.0,
        FoodSource::UserContributed => 85.0,
        FoodSource::ExternalBarcode => 80.0,
        FoodSource::ExternalCatalog => 70.0,
    }
}

/// Cost score for a food given whether it is a staple and the user's budget.
pub fn cost_score(is_staple: bool, budget: Option<Budget>) -> f64 {
    match (is_staple, budget) {
        (true, _) => STAPLE_COST_SCORE,
        (false, Some(Budget::Low)) => LOW_BUDGET_NON_STAPLE_COST_SCORE,
        (false, _) => DEFAULT_COST_SCORE,
    }
}

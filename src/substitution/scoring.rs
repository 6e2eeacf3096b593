use crate::models::{
    FoodItem, MacroComparison, MacroProfile, Portion, ScoreBreakdown, UserPreferences,
};
use crate::substitution::constants::*;

/// Percent deviation of `candidate` from `original`.
///
/// A zero original yields 0 when the candidate is also zero, else 100.
pub fn percent_diff(original: f64, candidate: f64) -> f64 {
    if original == 0.0 {
        if candidate == 0.0 { 0.0 } else { 100.0 }
    } else {
        (candidate - original).abs() / original.abs() * 100.0
    }
}

/// Per-macro deviation plus the mean of calories, protein, carbs and fat.
///
/// Fiber and sugar are compared only when both sides carry them; they never
/// enter `overall`.
pub fn compare_macros(original: &MacroProfile, candidate: &MacroProfile) -> MacroComparison {
    let calories_pct = percent_diff(original.calories_kcal, candidate.calories_kcal);
    let protein_pct = percent_diff(original.protein_g, candidate.protein_g);
    let carbs_pct = percent_diff(original.carbs_g, candidate.carbs_g);
    let fat_pct = percent_diff(original.fat_g, candidate.fat_g);

    let optional = |o: Option<f64>, c: Option<f64>| o.zip(c).map(|(o, c)| percent_diff(o, c));

    MacroComparison {
        calories_pct,
        protein_pct,
        carbs_pct,
        fat_pct,
        fiber_pct: optional(original.fiber_g, candidate.fiber_g),
        sugar_pct: optional(original.sugar_g, candidate.sugar_g),
        overall: (calories_pct + protein_pct + carbs_pct + fat_pct) / 4.0,
    }
}

/// Portion of `candidate` whose calories match `target_kcal`.
///
/// Expressed in the candidate's base unit and never below
/// `MIN_SUGGESTED_QUANTITY`. A zero-calorie candidate keeps its base quantity.
pub fn optimize_portion(candidate: &FoodItem, target_kcal: f64) -> Portion {
    let base = candidate.base_portion;
    let kcal_per_base = candidate.macros_per_base.calories_kcal;

    if kcal_per_base <= 0.0 || !target_kcal.is_finite() {
        return base;
    }

    let quantity = (base.quantity * target_kcal / kcal_per_base).max(MIN_SUGGESTED_QUANTITY);
    Portion {
        quantity,
        unit: base.unit,
    }
}

/// 100 for an exact match, minus `MACRO_PENALTY_PER_PERCENT` per percent.
pub fn macro_score(overall: f64) -> f64 {
    (100.0 - MACRO_PENALTY_PER_PERCENT * overall).clamp(0.0, 100.0)
}

pub fn preference_score(food: &FoodItem, prefs: &UserPreferences) -> f64 {
    let cuisine_match = prefs
        .cuisine
        .iter()
        .map(|c| c.trim())
        .filter(|c| !c.is_empty())
        .any(|c| food.has_tag(c));

    if cuisine_match {
        (PREFERENCE_BASE + CUISINE_MATCH_BONUS).min(100.0)
    } else {
        PREFERENCE_BASE
    }
}

pub fn availability_score(food: &FoodItem) -> f64 {
    CONFIDENCE_SHARE * food.confidence() * 100.0
        + (1.0 - CONFIDENCE_SHARE) * source_quality(food.source())
}

/// Staple if any name word is a staple keyword or its plural.
pub fn is_staple(food: &FoodItem) -> bool {
    let name = food.name.to_lowercase();
    name.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .any(|word| {
            STAPLE_KEYWORDS.iter().any(|k| {
                word == *k
                    || word
                        .strip_prefix(*k)
                        .is_some_and(|rest| rest == "s" || rest == "es")
            })
        })
}

/// Weighted total on a 0-100 scale and its components.
pub fn score_candidate(
    food: &FoodItem,
    comparison: &MacroComparison,
    prefs: &UserPreferences,
) -> (f64, ScoreBreakdown) {
    let breakdown = ScoreBreakdown {
        macro_score: macro_score(comparison.overall),
        preference_score: preference_score(food, prefs),
        availability_score: availability_score(food),
        cost_score: cost_score(is_staple(food), prefs.budget),
        rerank_boost: 0.0,
    };

    let total = 100.0
        * (MACRO_WEIGHT * breakdown.macro_score / 100.0
            + PREFERENCE_WEIGHT * breakdown.preference_score / 100.0
            + AVAILABILITY_WEIGHT * breakdown.availability_score / 100.0
            + COST_WEIGHT * breakdown.cost_score / 100.0);

    (total, breakdown)
}

pub fn similarity_label(overall: f64) -> &'static str {
    if overall <= VERY_SIMILAR_PERCENT {
        "very similar"
    } else if overall <= SIMILAR_PERCENT {
        "similar"
    } else {
        "acceptable"
    }
}

/// Human-readable reason for proposing `food`.
pub fn build_reason(food: &FoodItem, comparison: &MacroComparison) -> String {
    format!(
        "{} macros ({:.1}% average deviation), from {}",
        similarity_label(comparison.overall),
        comparison.overall,
        food.source().label()
    )
}

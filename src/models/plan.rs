use serde::{Deserialize, Serialize};

use crate::models::{MacroProfile, Portion};

/// A single entry in a meal: which food and how much of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealItemInput {
    pub food_id: String,
    pub portion: Portion,
}

impl MealItemInput {
    pub fn new(food_id: impl Into<String>, portion: Portion) -> Self {
        Self {
            food_id: food_id.into(),
            portion,
        }
    }
}

/// A meal entry that contributed zero macros because it could not be resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Degradation {
    pub food_id: String,
    pub reason: String,
}

/// Meal total plus the entries that were degraded to zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MealReport {
    pub total: MacroProfile,
    pub unresolved: Vec<Degradation>,
}

impl MealReport {
    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }
}

/// Per-meal and whole-day totals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DayMacros {
    pub total: MacroProfile,
    pub per_meal: Vec<MacroProfile>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unresolved: Vec<Degradation>,
}

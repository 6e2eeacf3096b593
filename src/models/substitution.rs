use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SwapError};
use crate::models::{FoodItem, MacroProfile, Portion};
use crate::substitution::constants::{
    DEFAULT_MAX_SUGGESTIONS, DEFAULT_MIN_CONFIDENCE, DEFAULT_TOLERANCE_PERCENT,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Budget {
    Low,
    Medium,
    High,
}

impl std::str::FromStr for Budget {
    type Err = SwapError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Budget::Low),
            "medium" | "mid" => Ok(Budget::Medium),
            "high" => Ok(Budget::High),
            other => Err(SwapError::Validation(format!("unknown budget: {other}"))),
        }
    }
}

/// Optional user preferences; every field may be left empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserPreferences {
    #[serde(default)]
    pub allergies: Vec<String>,
    #[serde(default)]
    pub dislikes: Vec<String>,
    #[serde(default)]
    pub cuisine: Vec<String>,
    #[serde(default)]
    pub budget: Option<Budget>,
    #[serde(default)]
    pub dietary_restrictions: Vec<String>,
}

/// Knobs for a substitution search. Missing fields take the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubstitutionConstraints {
    /// Maximum mean percentage deviation across calories/protein/carbs/fat.
    pub macro_tolerance_percent: f64,
    pub max_suggestions: usize,
    pub min_confidence: f64,
    pub preferences: Option<UserPreferences>,
    pub include_external_sources: bool,
}

impl Default for SubstitutionConstraints {
    fn default() -> Self {
        Self {
            macro_tolerance_percent: DEFAULT_TOLERANCE_PERCENT,
            max_suggestions: DEFAULT_MAX_SUGGESTIONS,
            min_confidence: DEFAULT_MIN_CONFIDENCE,
            preferences: None,
            include_external_sources: false,
        }
    }
}

impl SubstitutionConstraints {
    pub fn validate(&self) -> Result<()> {
        if !self.macro_tolerance_percent.is_finite() || self.macro_tolerance_percent < 0.0 {
            return Err(SwapError::Validation(format!(
                "macro tolerance must be a non-negative percentage, got {}",
                self.macro_tolerance_percent
            )));
        }
        if self.max_suggestions == 0 {
            return Err(SwapError::Validation(
                "max suggestions must be at least 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.min_confidence) {
            return Err(SwapError::Validation(format!(
                "min confidence must be within [0, 1], got {}",
                self.min_confidence
            )));
        }
        Ok(())
    }

    pub fn preferences(&self) -> UserPreferences {
        self.preferences.clone().unwrap_or_default()
    }
}

/// Percent deviation of a candidate from the original, per macro.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MacroComparison {
    pub calories_pct: f64,
    pub protein_pct: f64,
    pub carbs_pct: f64,
    pub fat_pct: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fiber_pct: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sugar_pct: Option<f64>,
    /// Mean of the four gating percentages.
    pub overall: f64,
}

/// Weighted components of a candidate's score, each on a 0-100 scale.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub macro_score: f64,
    pub preference_score: f64,
    pub availability_score: f64,
    pub cost_score: f64,
    #[serde(default)]
    pub rerank_boost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubstitutionCandidate {
    pub food: FoodItem,
    pub suggested_portion: Portion,
    /// Macros for `suggested_portion`.
    pub macros: MacroProfile,
    pub comparison: MacroComparison,
    pub score: f64,
    pub breakdown: ScoreBreakdown,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubstitutionMetadata {
    pub total_candidates_evaluated: usize,
    pub processing_time_ms: u64,
    pub constraints_applied: SubstitutionConstraints,
    pub reranked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rerank_insights: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubstitutionResult {
    pub original_food: FoodItem,
    pub original_portion: Portion,
    pub original_macros: MacroProfile,
    pub candidates: Vec<SubstitutionCandidate>,
    pub has_viable_substitutions: bool,
    pub metadata: SubstitutionMetadata,
}

impl fmt::Display for Budget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Budget::Low => "low",
            Budget::Medium => "medium",
            Budget::High => "high",
        };
        f.write_str(s)
    }
}

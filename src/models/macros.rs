use std::iter::Sum;
use std::ops::Add;

use serde::{Deserialize, Serialize};

/// kcal per gram used by the 4/4/9 energy cross-check.
const KCAL_PER_G_PROTEIN: f64 = 4.0;
const KCAL_PER_G_CARBS: f64 = 4.0;
const KCAL_PER_G_FAT: f64 = 9.0;

/// Calories and macronutrients for some quantity of food.
///
/// Calories are stored independently of protein/carbs/fat: real foods deviate
/// from the 4/4/9 identity because of fiber, alcohol and label rounding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MacroProfile {
    pub calories_kcal: f64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fiber_g: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sugar_g: Option<f64>,
}

impl MacroProfile {
    pub fn new(calories_kcal: f64, protein_g: f64, carbs_g: f64, fat_g: f64) -> Self {
        Self {
            calories_kcal,
            protein_g,
            carbs_g,
            fat_g,
            fiber_g: None,
            sugar_g: None,
        }
    }

    pub fn with_fiber(mut self, fiber_g: f64) -> Self {
        self.fiber_g = Some(fiber_g);
        self
    }

    pub fn with_sugar(mut self, sugar_g: f64) -> Self {
        self.sugar_g = Some(sugar_g);
        self
    }

    pub fn zero() -> Self {
        Self::default()
    }

    /// True when every required field is zero.
    pub fn is_zero(&self) -> bool {
        self.calories_kcal == 0.0
            && self.protein_g == 0.0
            && self.carbs_g == 0.0
            && self.fat_g == 0.0
    }

    /// Scale every field by `factor`.
    pub fn scale(&self, factor: f64) -> Self {
        Self {
            calories_kcal: self.calories_kcal * factor,
            protein_g: self.protein_g * factor,
            carbs_g: self.carbs_g * factor,
            fat_g: self.fat_g * factor,
            fiber_g: self.fiber_g.map(|v| v * factor),
            sugar_g: self.sugar_g.map(|v| v * factor),
        }
    }

    /// Non-negative, finite values only.
    pub fn is_valid(&self) -> bool {
        let ok = |v: f64| v.is_finite() && v >= 0.0;
        ok(self.calories_kcal)
            && ok(self.protein_g)
            && ok(self.carbs_g)
            && ok(self.fat_g)
            && self.fiber_g.is_none_or(ok)
            && self.sugar_g.is_none_or(ok)
    }

    /// Calories implied by the 4/4/9 rule.
    pub fn energy_from_macros(&self) -> f64 {
        self.protein_g * KCAL_PER_G_PROTEIN
            + self.carbs_g * KCAL_PER_G_CARBS
            + self.fat_g * KCAL_PER_G_FAT
    }

    /// Relative gap between stated calories and the 4/4/9 estimate.
    ///
    /// Returns 0.0 when both are zero and 1.0 when only one side is.
    pub fn energy_discrepancy(&self) -> f64 {
        let estimated = self.energy_from_macros();
        let stated = self.calories_kcal;
        let reference = stated.max(estimated);
        if reference == 0.0 {
            return 0.0;
        }
        (stated - estimated).abs() / reference
    }

    /// Debug string for logging.
    pub fn debug_string(&self) -> String {
        format!(
            "{:.1} kcal, P:{:.1} C:{:.1} F:{:.1}",
            self.calories_kcal, self.protein_g, self.carbs_g, self.fat_g
        )
    }
}

fn add_optional(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    match (a, b) {
        (None, None) => None,
        (a, b) => Some(a.unwrap_or(0.0) + b.unwrap_or(0.0)),
    }
}

impl Add for MacroProfile {
    type Output = MacroProfile;

    fn add(self, other: MacroProfile) -> MacroProfile {
        MacroProfile {
            calories_kcal: self.calories_kcal + other.calories_kcal,
            protein_g: self.protein_g + other.protein_g,
            carbs_g: self.carbs_g + other.carbs_g,
            fat_g: self.fat_g + other.fat_g,
            fiber_g: add_optional(self.fiber_g, other.fiber_g),
            sugar_g: add_optional(self.sugar_g, other.sugar_g),
        }
    }
}

impl Sum for MacroProfile {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(MacroProfile::zero(), |acc, m| acc + m)
    }
}

impl<'a> Sum<&'a MacroProfile> for MacroProfile {
    fn sum<I: Iterator<Item = &'a MacroProfile>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

//! Plausibility guards for macro data coming from external sources.

use tracing::debug;

use crate::models::{FoodItem, FoodMetadata, FoodSource, MacroProfile, Portion};

/// Upper bounds per 100 g.
pub const MAX_KCAL_PER_100G: f64 = 900.0;
pub const MAX_PROTEIN_PER_100G: f64 = 90.0;
pub const MAX_CARBS_PER_100G: f64 = 100.0;
pub const MAX_FAT_PER_100G: f64 = 100.0;
pub const MAX_FIBER_PER_100G: f64 = 80.0;
/// Protein + carbs + fat cannot exceed the mass they are measured in.
pub const MAX_MACRO_MASS_PER_100G: f64 = 100.0;

/// Relative gap between stated kcal and the 4/4/9 estimate that is tolerated.
pub const ENERGY_CROSS_CHECK_TOLERANCE: f64 = 0.20;
/// Confidence removed when the energy cross-check fails.
pub const ENERGY_MISMATCH_PENALTY: f64 = 0.2;

/// Default confidence for external records that arrive without one.
pub const DEFAULT_EXTERNAL_CONFIDENCE: f64 = 0.6;

fn clamp_field(value: f64, max: f64) -> f64 {
    if value.is_finite() { value.clamp(0.0, max) } else { 0.0 }
}

/// Clamp a per-100 g profile into plausible ranges.
pub fn clamp_macros(macros: &MacroProfile) -> MacroProfile {
    let mut out = MacroProfile {
        calories_kcal: clamp_field(macros.calories_kcal, MAX_KCAL_PER_100G),
        protein_g: clamp_field(macros.protein_g, MAX_PROTEIN_PER_100G),
        carbs_g: clamp_field(macros.carbs_g, MAX_CARBS_PER_100G),
        fat_g: clamp_field(macros.fat_g, MAX_FAT_PER_100G),
        fiber_g: macros.fiber_g.map(|v| clamp_field(v, MAX_FIBER_PER_100G)),
        sugar_g: None,
    };

    let mass = out.protein_g + out.carbs_g + out.fat_g;
    if mass > MAX_MACRO_MASS_PER_100G {
        let factor = MAX_MACRO_MASS_PER_100G / mass;
        out.protein_g *= factor;
        out.carbs_g *= factor;
        out.fat_g *= factor;
    }

    out.sugar_g = macros.sugar_g.map(|v| clamp_field(v, out.carbs_g));
    out
}

/// Apply plausibility guards to an externally sourced food.
///
/// Macros are clamped on a per-100 g basis (base portions in other units are
/// left unclamped), metadata is filled in when missing, and confidence drops
/// when the stated calories disagree with the 4/4/9 estimate.
pub fn sanitize_external(mut food: FoodItem, default_source: FoodSource) -> FoodItem {
    let metadata = food
        .metadata
        .take()
        .unwrap_or_else(|| FoodMetadata::new(default_source, DEFAULT_EXTERNAL_CONFIDENCE));
    let mut metadata = FoodMetadata {
        confidence: if metadata.confidence.is_finite() {
            metadata.confidence.clamp(0.0, 1.0)
        } else {
            0.0
        },
        ..metadata
    };

    if food.base_portion == Portion::grams(100.0) {
        let clamped = clamp_macros(&food.macros_per_base);
        if clamped != food.macros_per_base {
            debug!(food_id = %food.id, "clamped implausible macros from external source");
            food.macros_per_base = clamped;
        }
    }

    if food.macros_per_base.energy_discrepancy() > ENERGY_CROSS_CHECK_TOLERANCE {
        debug!(
            food_id = %food.id,
            discrepancy = food.macros_per_base.energy_discrepancy(),
            "energy cross-check failed, lowering confidence"
        );
        metadata.confidence = (metadata.confidence - ENERGY_MISMATCH_PENALTY).max(0.0);
    }

    food.metadata = Some(metadata);
    food.classified()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_out_of_range() {
        let bad = MacroProfile::new(2500.0, -3.0, 40.0, f64::NAN).with_sugar(55.0);
        let clamped = clamp_macros(&bad);
        assert_eq!(clamped.calories_kcal, MAX_KCAL_PER_100G);
        assert_eq!(clamped.protein_g, 0.0);
        assert_eq!(clamped.fat_g, 0.0);
        assert_eq!(clamped.sugar_g, Some(40.0));
    }

    #[test]
    fn test_macro_mass_scaled_down() {
        let bad = MacroProfile::new(800.0, 60.0, 60.0, 80.0);
        let clamped = clamp_macros(&bad);
        let mass = clamped.protein_g + clamped.carbs_g + clamped.fat_g;
        assert!((mass - 100.0).abs() < 1e-9);
        assert!((clamped.protein_g / clamped.fat_g - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_sanitize_fills_metadata_and_penalizes_energy_mismatch() {
        let macros = MacroProfile::new(600.0, 5.0, 10.0, 5.0);
        let food = FoodItem::per_100g("off:1", "Mystery bar", macros);
        let sanitized = sanitize_external(food, FoodSource::ExternalCatalog);
        assert_eq!(sanitized.source(), FoodSource::ExternalCatalog);
        let expected = DEFAULT_EXTERNAL_CONFIDENCE - ENERGY_MISMATCH_PENALTY;
        assert!((sanitized.confidence() - expected).abs() < 1e-9);
    }

    #[test]
    fn test_sanitize_keeps_consistent_food() {
        let food = FoodItem::per_100g("off:2", "Chicken", MacroProfile::new(165.0, 31.0, 0.0, 3.6))
            .with_metadata(FoodMetadata::new(FoodSource::ExternalBarcode, 0.8));
        let sanitized = sanitize_external(food.clone(), FoodSource::ExternalCatalog);
        assert_eq!(sanitized.source(), FoodSource::ExternalBarcode);
        assert_eq!(sanitized.confidence(), 0.8);
        assert_eq!(sanitized.macros_per_base, food.macros_per_base);
    }
}
